//! Multi-provider trip search.
//!
//! A [`TripAggregator`] runs one search against every configured provider
//! whose transport is wanted, each through the shared [`TimeWindowCache`].
//! A provider that cannot serve the search is skipped and a provider that
//! fails is reported; neither stops the others.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::cache::{CacheStore, TimeWindowCache};
use crate::gate::ContextGate;
use crate::identity::{Location, QueryIdentity, Station, StationResolver};
use crate::source::Source;
use crate::trip::{Transport, TripRecord};
use crate::window::TimeWindow;

/// A named, transport-typed source with its station list.
#[derive(Clone)]
pub struct Provider {
    pub name: String,
    pub transport: Transport,
    pub stations: Vec<Station>,
    source: Arc<dyn Source<TripRecord>>,
}

impl Provider {
    pub fn new(
        name: impl Into<String>,
        transport: Transport,
        stations: Vec<Station>,
        source: Arc<dyn Source<TripRecord>>,
    ) -> Self {
        Self {
            name: name.into(),
            transport,
            stations,
            source,
        }
    }

    pub fn source(&self) -> &dyn Source<TripRecord> {
        self.source.as_ref()
    }
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("name", &self.name)
            .field("transport", &self.transport)
            .field("stations", &self.stations.len())
            .finish()
    }
}

/// One search request.
#[derive(Debug, Clone)]
pub struct TripSearch {
    pub origin: Location,
    pub destination: Location,
    pub window: TimeWindow,
    pub passengers: u32,
    /// When set, only these transports are searched.
    pub only: Option<Vec<Transport>>,
    /// Transports never searched.
    pub except: Vec<Transport>,
}

impl TripSearch {
    pub fn new(origin: Location, destination: Location, window: TimeWindow) -> Self {
        Self {
            origin,
            destination,
            window,
            passengers: 1,
            only: None,
            except: Vec::new(),
        }
    }

    pub fn with_passengers(mut self, passengers: u32) -> Self {
        self.passengers = passengers;
        self
    }

    pub fn only(mut self, transports: Vec<Transport>) -> Self {
        self.only = Some(transports);
        self
    }

    pub fn except(mut self, transports: Vec<Transport>) -> Self {
        self.except = transports;
        self
    }

    /// Whether `transport` passes the include and exclude filters.
    pub fn wants(&self, transport: Transport) -> bool {
        let included = self
            .only
            .as_ref()
            .is_none_or(|only| only.contains(&transport));
        included && !self.except.contains(&transport)
    }
}

/// A provider that failed during a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderFailure {
    pub provider: String,
    pub message: String,
}

/// Combined outcome of a search.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResults {
    /// Trips in provider order.
    pub trips: Vec<TripRecord>,
    /// Providers without a station near one of the endpoints.
    pub skipped: Vec<String>,
    pub failures: Vec<ProviderFailure>,
    /// Providers actually queried, failed ones included.
    pub searched: usize,
}

impl SearchResults {
    /// At least one provider was queried and none of them succeeded.
    pub fn all_failed(&self) -> bool {
        self.searched > 0 && self.failures.len() == self.searched
    }
}

/// Runs searches across providers through one cache.
pub struct TripAggregator<S, G> {
    cache: Arc<TimeWindowCache<S, G>>,
    providers: Vec<Provider>,
    resolver: StationResolver,
}

impl<S: CacheStore, G: ContextGate> TripAggregator<S, G> {
    pub fn new(cache: Arc<TimeWindowCache<S, G>>, providers: Vec<Provider>) -> Self {
        Self {
            cache,
            providers,
            resolver: StationResolver::default(),
        }
    }

    pub fn with_resolver(mut self, resolver: StationResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    pub fn cache(&self) -> &TimeWindowCache<S, G> {
        &self.cache
    }

    /// Search every wanted provider.
    pub fn search(&self, search: &TripSearch) -> SearchResults {
        info!(
            "Searching trips from {} to {} in {}",
            search.origin.name, search.destination.name, search.window
        );

        let mut results = SearchResults::default();

        for provider in &self.providers {
            if !search.wants(provider.transport) {
                continue;
            }

            let Some(identity) = self.identity_for(provider, search) else {
                warn!(
                    "Provider {} has no station near the origin or destination",
                    provider.name
                );
                results.skipped.push(provider.name.clone());
                continue;
            };

            results.searched += 1;
            match self.cache.fetch(&identity, &search.window, provider.source()) {
                Ok(trips) => results.trips.extend(trips),
                Err(e) => {
                    error!("Provider {} failed: {}", provider.name, e);
                    results.failures.push(ProviderFailure {
                        provider: provider.name.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        results
    }

    /// Build the cache identity for `provider`, if both endpoints resolve.
    pub fn identity_for(&self, provider: &Provider, search: &TripSearch) -> Option<QueryIdentity> {
        let origin = self.resolver.resolve(&search.origin, &provider.stations)?;
        let destination = self
            .resolver
            .resolve(&search.destination, &provider.stations)?;

        Some(
            QueryIdentity::new(&provider.name, &origin.code, &destination.code)
                .with_param("passengers", search.passengers),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use crate::gate::AlwaysActive;
    use crate::window::DayBounds;

    fn search() -> TripSearch {
        TripSearch::new(
            Location::new("Lisboa", 38.72, -9.14),
            Location::new("Porto", 41.15, -8.61),
            TimeWindow::parse_request("2025-05-01", "2025-05-01", &DayBounds::default()).unwrap(),
        )
    }

    #[test]
    fn no_filters_wants_everything() {
        let s = search();
        assert!(s.wants(Transport::Train));
        assert!(s.wants(Transport::CarRide));
    }

    #[test]
    fn only_restricts_transports() {
        let s = search().only(vec![Transport::Bus]);
        assert!(s.wants(Transport::Bus));
        assert!(!s.wants(Transport::Train));
    }

    #[test]
    fn except_wins_over_only() {
        let s = search()
            .only(vec![Transport::Bus, Transport::Train])
            .except(vec![Transport::Bus]);
        assert!(!s.wants(Transport::Bus));
        assert!(s.wants(Transport::Train));
    }

    #[test]
    fn all_failed_only_when_every_queried_provider_failed() {
        let failure = ProviderFailure {
            provider: "TAP".into(),
            message: "down".into(),
        };
        let one_of_two = SearchResults {
            failures: vec![failure.clone()],
            searched: 2,
            ..Default::default()
        };
        let only_one = SearchResults {
            failures: vec![failure],
            searched: 1,
            ..Default::default()
        };

        assert!(!SearchResults::default().all_failed());
        assert!(!one_of_two.all_failed());
        assert!(only_one.all_failed());
    }

    #[test]
    fn identity_uses_station_codes_and_passengers() {
        let cache = Arc::new(TimeWindowCache::new(MemoryStore::new(), AlwaysActive));
        let provider = Provider::new(
            "CP",
            Transport::Train,
            vec![
                Station::new("LIS", 38.7139, -9.1394),
                Station::new("OPO", 41.1496, -8.6109),
            ],
            Arc::new(crate::source::FixtureSource::from_trips("CP", Vec::new())),
        );
        let aggregator = TripAggregator::new(cache, vec![provider.clone()]);

        let identity = aggregator
            .identity_for(&provider, &search().with_passengers(3))
            .unwrap();
        assert_eq!(identity.origin, "LIS");
        assert_eq!(identity.destination, "OPO");
        assert_eq!(identity.params["passengers"], "3");
    }
}
