//! LoRaWAN TFA TH/W weather sensor decoding.
//!
//! This crate turns the 8-byte uplink payload of the TH/W sensor node into a
//! typed reading (humidity, temperature, windspeed, device id) and, for
//! uplink logs captured from the TTN v2 handler, routes each reading to the
//! datastreams configured for its device. The output is a deterministic
//! JSON report; nothing is sent over the network.
//!
//! Decoding is byte-oriented and side-effect free. All file I/O is isolated
//! in `source` and `Datastreams::load`. The payload layout lives in
//! `protocols::thw::layout`, bit-packing conventions in the protocol reader.
//!
//! Invariants:
//! - `decode` is pure and total over payloads of at least 8 bytes.
//! - Report ordering follows input order; observations follow sensor name.
//!
//! # Examples
//! ```
//! use lorathw_core::decode;
//!
//! let reading = decode(&[55, 0xD3, 0x12, 0x01, 0x01, 0x02, 0x03, 0x04], 1)?;
//! assert_eq!(reading.temperature, 22.3);
//! # Ok::<(), lorathw_core::ThwError>(())
//! ```

use serde::{Deserialize, Serialize};

mod datastreams;
mod protocols;
mod source;
mod uplink;

pub use datastreams::{Datastreams, DatastreamsError, Sensor};
pub use protocols::thw::error::ThwError;
pub use protocols::thw::layout::{APP_PORT, PAYLOAD_LEN};
pub use protocols::thw::parser::{DecodedReading, ThwFrame};
pub use protocols::thw::{decode, parse_frame};
pub use source::{JsonLinesSource, SourceError, UplinkEvent, UplinkSource};
pub use uplink::{
    ProcessError, UplinkError, UplinkMessage, UplinkMetadata, process_source, process_uplink,
    process_uplink_file,
};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Default timestamp used when no uplink carries a receive time.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";

/// Uplink processing report with deterministic ordering.
///
/// # Examples
/// ```
/// use lorathw_core::make_stub_report;
///
/// let report = make_stub_report("uplinks.jsonl", 123);
/// assert_eq!(report.report_version, lorathw_core::REPORT_VERSION);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    /// Tool identification metadata.
    pub tool: ToolInfo,
    /// RFC3339 timestamp of the latest uplink in the input.
    pub generated_at: String,

    /// Input file metadata.
    pub input: InputInfo,

    /// Counters over the whole input.
    pub summary: ProcessingSummary,
    /// Decoded uplinks in input order.
    pub uplinks: Vec<UplinkSummary>,
    /// Uplinks that could not be decoded, in input order.
    pub rejected: Vec<RejectedUplink>,
}

/// Tool metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name (e.g., "lorathw").
    pub name: String,
    /// Tool version (semver).
    pub version: String,
}

/// Input file metadata embedded in reports.
///
/// # Examples
/// ```
/// use lorathw_core::InputInfo;
///
/// let input = InputInfo {
///     path: "uplinks.jsonl".to_string(),
///     bytes: 1024,
/// };
/// assert_eq!(input.bytes, 1024);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided to the processor.
    pub path: String,
    /// Input size in bytes.
    pub bytes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingSummary {
    /// Non-blank input records seen.
    pub uplinks_total: u64,
    pub decoded: u64,
    pub rejected: u64,
    /// Decoded uplinks whose device has no datastreams.
    pub unregistered: u64,
}

/// One decoded uplink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UplinkSummary {
    /// TTN device id (not the sensor's own `devid`).
    pub dev_id: String,
    /// LoRaWAN FPort of the uplink.
    pub port: u8,
    /// Receive time normalized to RFC3339, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    /// Decoded payload bytes as lowercase hex.
    pub payload_hex: String,
    pub reading: DecodedReading,
    /// Whether the device has datastreams configured.
    pub registered: bool,
    /// Observations ordered by sensor name.
    pub observations: Vec<Observation>,
}

/// Observation destined for one datastream.
///
/// # Examples
/// ```
/// use lorathw_core::{Observation, Sensor};
///
/// let obs = Observation {
///     sensor: Sensor::Humidity,
///     url: "http://localhost/Datastreams(1)/Observations".to_string(),
///     result: 55.0,
/// };
/// let json = serde_json::to_value(&obs).unwrap();
/// assert_eq!(json["sensor"], "humidity");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub sensor: Sensor,
    /// Datastream URL the observation would be posted to.
    pub url: String,
    pub result: f64,
}

/// Input record that failed to decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedUplink {
    /// 1-based line number in the input.
    pub line: usize,
    /// TTN device id, when the record was valid JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_id: Option<String>,
    /// Human-readable failure reason.
    pub reason: String,
}

/// Build a stub report with base fields filled and empty aggregates.
///
/// # Examples
/// ```
/// use lorathw_core::make_stub_report;
///
/// let report = make_stub_report("uplinks.jsonl", 123);
/// assert!(report.uplinks.is_empty());
/// assert_eq!(report.summary.uplinks_total, 0);
/// ```
pub fn make_stub_report(input_path: &str, input_bytes: u64) -> Report {
    Report {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "lorathw".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: DEFAULT_GENERATED_AT.to_string(),
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
        },
        summary: ProcessingSummary::default(),
        uplinks: vec![],
        rejected: vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_omits_optional_fields_when_none() {
        let mut report = make_stub_report("uplinks.jsonl", 1);
        report.uplinks.push(UplinkSummary {
            dev_id: "station-01".to_string(),
            port: 1,
            time: None,
            payload_hex: "0000000000000000".to_string(),
            reading: DecodedReading {
                humidity: 0,
                temperature: -50.0,
                windspeed: 0.0,
                devid: 0,
            },
            registered: false,
            observations: vec![],
        });
        report.rejected.push(RejectedUplink {
            line: 2,
            dev_id: None,
            reason: "invalid uplink JSON".to_string(),
        });

        let value = serde_json::to_value(&report).expect("report json");
        assert!(value["uplinks"][0].get("time").is_none());
        assert!(value["rejected"][0].get("dev_id").is_none());
    }

    #[test]
    fn reading_serializes_exactly_four_fields() {
        let reading = decode(&[55, 0xD3, 0x12, 0x01, 0x01, 0x02, 0x03, 0x04], 1).unwrap();
        let value = serde_json::to_value(reading).expect("reading json");
        let object = value.as_object().expect("object");
        let mut keys: Vec<_> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["devid", "humidity", "temperature", "windspeed"]);
        assert_eq!(value["temperature"], 22.3);
        assert_eq!(value["devid"], 67_305_985);
    }
}
