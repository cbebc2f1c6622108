//! Query identities and location resolution.
//!
//! A [`QueryIdentity`] is everything that identifies a source query except its
//! time window. The [`StationResolver`] turns raw caller locations into the
//! provider station codes identities are built from.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::window::TimeWindow;

/// Default search radius when matching a location to a station.
pub const DEFAULT_MAX_DISTANCE_KM: f64 = 250.0;

const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Identity of a logical source query, independent of its time window.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryIdentity {
    pub source: String,
    pub origin: String,
    pub destination: String,
    pub params: BTreeMap<String, String>,
}

impl QueryIdentity {
    pub fn new(
        source: impl Into<String>,
        origin: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            origin: origin.into(),
            destination: destination.into(),
            params: BTreeMap::new(),
        }
    }

    /// Add an extra parameter such as the passenger count.
    pub fn with_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    /// Origin and destination resolve to the same place.
    pub fn is_degenerate(&self) -> bool {
        self.origin == self.destination
    }

    /// Store key for this identity, independent of any window.
    ///
    /// Separator characters inside components are percent-escaped, so two
    /// different identities never render the same key.
    pub fn cache_key(&self) -> String {
        let mut key = format!(
            "{}:{}->{}",
            escape_component(&self.source),
            escape_component(&self.origin),
            escape_component(&self.destination)
        );
        if !self.params.is_empty() {
            let params: Vec<String> = self
                .params
                .iter()
                .map(|(k, v)| format!("{}={}", escape_component(k), escape_component(v)))
                .collect();
            key.push('?');
            key.push_str(&params.join("&"));
        }
        key
    }

    /// Store key for this identity scoped to one exact window.
    pub fn window_key(&self, window: &TimeWindow) -> String {
        format!("{}-{}", self.cache_key(), window.key())
    }
}

/// Percent-escape the characters `cache_key` uses as separators.
fn escape_component(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '%' | ':' | '-' | '>' | '?' | '&' | '=' => {
                escaped.push_str(&format!("%{:02X}", c as u32));
            }
            _ => escaped.push(c),
        }
    }
    escaped
}

impl fmt::Display for QueryIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cache_key())
    }
}

/// A caller-supplied place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub fn new(name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lng,
        }
    }

    /// Parse `LAT,LNG`.
    pub fn parse_coords(value: &str) -> Result<Self, String> {
        let (lat, lng) = value
            .split_once(',')
            .ok_or_else(|| format!("expected LAT,LNG, got '{}'", value))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| format!("invalid latitude '{}'", lat.trim()))?;
        let lng: f64 = lng
            .trim()
            .parse()
            .map_err(|_| format!("invalid longitude '{}'", lng.trim()))?;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(format!("coordinates out of range: {}", value));
        }
        Ok(Self::new(value, lat, lng))
    }

    /// Great-circle distance in kilometres.
    pub fn distance_km(&self, lat: f64, lng: f64) -> f64 {
        let (lat1, lat2) = (self.lat.to_radians(), lat.to_radians());
        let dlat = lat2 - lat1;
        let dlng = (lng - self.lng).to_radians();
        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }
}

/// A provider-specific stop with its code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub code: String,
    pub lat: f64,
    pub lng: f64,
}

impl Station {
    pub fn new(code: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            code: code.into(),
            lat,
            lng,
        }
    }
}

/// Resolves caller locations to the nearest provider station.
#[derive(Debug, Clone, Copy)]
pub struct StationResolver {
    max_distance_km: f64,
}

impl Default for StationResolver {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DISTANCE_KM)
    }
}

impl StationResolver {
    pub fn new(max_distance_km: f64) -> Self {
        Self { max_distance_km }
    }

    pub fn max_distance_km(&self) -> f64 {
        self.max_distance_km
    }

    /// Nearest station strictly closer than the search radius.
    ///
    /// A provider with exactly one station always resolves to it.
    pub fn resolve<'a>(&self, location: &Location, stations: &'a [Station]) -> Option<&'a Station> {
        if let [only] = stations {
            return Some(only);
        }

        let mut best: Option<(&Station, f64)> = None;
        for station in stations {
            let distance = location.distance_km(station.lat, station.lng);
            let limit = best.map_or(self.max_distance_km, |(_, d)| d);
            if distance < limit {
                best = Some((station, distance));
            }
        }
        best.map(|(station, _)| station)
    }
}
