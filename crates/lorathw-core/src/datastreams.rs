//! Per-device datastream routing table.
//!
//! The table is a JSON object keyed by TTN device id, mapping each sensor
//! of that device to the datastream URL its observations belong to:
//!
//! ```json
//! {"station-01": {"temperature": "https://example.org/Datastreams(1)/Observations"}}
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sensor channels a device can publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sensor {
    Humidity,
    Temperature,
    Windspeed,
}

impl Sensor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sensor::Humidity => "humidity",
            Sensor::Temperature => "temperature",
            Sensor::Windspeed => "windspeed",
        }
    }
}

impl fmt::Display for Sensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum DatastreamsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid datastreams JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Device id -> sensor -> datastream URL, in stable order.
///
/// # Examples
/// ```
/// use lorathw_core::{Datastreams, Sensor};
///
/// let streams = Datastreams::from_json_str(
///     r#"{"station-01": {"humidity": "http://localhost/hum"}}"#,
/// )?;
/// assert!(streams.is_registered("station-01"));
/// assert_eq!(
///     streams.url("station-01", Sensor::Humidity),
///     Some("http://localhost/hum")
/// );
/// # Ok::<(), lorathw_core::DatastreamsError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Datastreams {
    devices: BTreeMap<String, BTreeMap<Sensor, String>>,
}

impl Datastreams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, DatastreamsError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, DatastreamsError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn insert(&mut self, dev_id: impl Into<String>, sensor: Sensor, url: impl Into<String>) {
        self.devices
            .entry(dev_id.into())
            .or_default()
            .insert(sensor, url.into());
    }

    pub fn is_registered(&self, dev_id: &str) -> bool {
        self.devices.contains_key(dev_id)
    }

    /// Configured sensors of a device, ordered by sensor name.
    pub fn sensors(&self, dev_id: &str) -> impl Iterator<Item = (Sensor, &str)> {
        self.devices
            .get(dev_id)
            .into_iter()
            .flat_map(|sensors| sensors.iter().map(|(sensor, url)| (*sensor, url.as_str())))
    }

    pub fn url(&self, dev_id: &str, sensor: Sensor) -> Option<&str> {
        self.devices
            .get(dev_id)
            .and_then(|sensors| sensors.get(&sensor))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
