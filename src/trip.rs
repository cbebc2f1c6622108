//! Trip records returned by sources.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::window::TimeWindow;

/// A record with a departure and an arrival instant.
///
/// This is all the cache needs to know about a record besides equality.
pub trait Timed {
    fn departure(&self) -> NaiveDateTime;
    fn arrival(&self) -> NaiveDateTime;

    /// The record's own `[departure, arrival)` interval.
    fn interval(&self) -> TimeWindow {
        TimeWindow::new(self.departure(), self.arrival())
    }
}

/// Mode of transport a provider offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Transport {
    #[serde(rename = "train")]
    Train,
    #[serde(rename = "bus")]
    Bus,
    #[serde(rename = "airplane")]
    Airplane,
    #[serde(rename = "rented car")]
    RentedCar,
    #[serde(rename = "car")]
    Car,
    #[serde(rename = "car ride")]
    CarRide,
}

impl Transport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Train => "train",
            Self::Bus => "bus",
            Self::Airplane => "airplane",
            Self::RentedCar => "rented car",
            Self::Car => "car",
            Self::CarRide => "car ride",
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Transport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['_', '-'], " ").as_str() {
            "train" => Ok(Self::Train),
            "bus" => Ok(Self::Bus),
            "airplane" | "plane" | "flight" => Ok(Self::Airplane),
            "rented car" | "rental" => Ok(Self::RentedCar),
            "car" => Ok(Self::Car),
            "car ride" | "ride" => Ok(Self::CarRide),
            _ => Err(format!("unknown transport: {}", s)),
        }
    }
}

/// One travel option between two stations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    /// Provider that offers the trip (e.g. "CP", "FlixBus").
    pub provider: String,
    pub transport: Transport,
    /// Provider station code at departure.
    pub origin: String,
    /// Provider station code at arrival.
    pub destination: String,
    #[serde(with = "timestamp")]
    pub departure: NaiveDateTime,
    #[serde(with = "timestamp")]
    pub arrival: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// Provider-specific fields the cache does not interpret.
    #[serde(flatten)]
    pub details: BTreeMap<String, serde_json::Value>,
}

impl TripRecord {
    pub fn new(
        provider: impl Into<String>,
        transport: Transport,
        origin: impl Into<String>,
        destination: impl Into<String>,
        departure: NaiveDateTime,
        arrival: NaiveDateTime,
    ) -> Self {
        Self {
            provider: provider.into(),
            transport,
            origin: origin.into(),
            destination: destination.into(),
            departure,
            arrival,
            price: None,
            currency: None,
            details: BTreeMap::new(),
        }
    }

    pub fn with_price(mut self, price: f64, currency: impl Into<String>) -> Self {
        self.price = Some(price);
        self.currency = Some(currency.into());
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.details.insert(key.into(), value);
        self
    }

    /// Trip duration in whole minutes.
    pub fn duration_minutes(&self) -> i64 {
        self.arrival.signed_duration_since(self.departure).num_minutes()
    }
}

impl Timed for TripRecord {
    fn departure(&self) -> NaiveDateTime {
        self.departure
    }

    fn arrival(&self) -> NaiveDateTime {
        self.arrival
    }
}

/// Serde adapter for `%Y-%m-%d %H:%M:%S` timestamps.
pub mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::window::TIMESTAMP_FORMAT;

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}
