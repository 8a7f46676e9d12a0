use std::path::Path;

use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, warn};

use crate::datastreams::Datastreams;
use crate::protocols::thw::error::ThwError;
use crate::protocols::thw::parse_frame;
use crate::source::{JsonLinesSource, SourceError, UplinkSource};
use crate::{
    DEFAULT_GENERATED_AT, ProcessingSummary, RejectedUplink, Report, UplinkSummary,
    make_stub_report,
};

mod message;
mod observations;

pub use message::{UplinkMessage, UplinkMetadata};
use observations::route_observations;

#[derive(Debug, Error)]
pub enum UplinkError {
    #[error("invalid uplink JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error(transparent)]
    Payload(#[from] ThwError),
    #[error("invalid metadata time '{value}': {source}")]
    InvalidTime {
        value: String,
        #[source]
        source: time::error::Parse,
    },
    #[error("time formatting failed: {0}")]
    Format(#[from] time::error::Format),
}

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

/// Decode one uplink and route its reading to the device's datastreams.
///
/// # Examples
/// ```
/// use lorathw_core::{Datastreams, Sensor, UplinkMessage, process_uplink};
///
/// let mut streams = Datastreams::new();
/// streams.insert("station-01", Sensor::Temperature, "http://localhost/temp");
/// let msg = UplinkMessage::from_json_str(
///     r#"{"dev_id":"station-01","port":1,"payload_raw":"N9MSAQECAwQ="}"#,
/// )?;
///
/// let summary = process_uplink(&msg, &streams)?;
/// assert!(summary.registered);
/// assert_eq!(summary.reading.temperature, 22.3);
/// assert_eq!(summary.observations[0].result, 22.3);
/// # Ok::<(), lorathw_core::UplinkError>(())
/// ```
pub fn process_uplink(
    msg: &UplinkMessage,
    datastreams: &Datastreams,
) -> Result<UplinkSummary, UplinkError> {
    decode_uplink(msg, datastreams).map(|(summary, _)| summary)
}

/// Like `process_uplink`, also returning the parsed receive time.
fn decode_uplink(
    msg: &UplinkMessage,
    datastreams: &Datastreams,
) -> Result<(UplinkSummary, Option<OffsetDateTime>), UplinkError> {
    let payload = msg.payload_bytes()?;
    let frame = parse_frame(&payload)?;
    let received_at = msg.received_at()?;
    let time = received_at.map(|ts| ts.format(&Rfc3339)).transpose()?;

    let registered = datastreams.is_registered(&msg.dev_id);
    if !registered {
        warn!(dev_id = %msg.dev_id, "uplink from unregistered device");
    }
    let observations = route_observations(&msg.dev_id, &frame, datastreams);
    debug!(
        dev_id = %msg.dev_id,
        port = msg.port,
        devid = frame.devid,
        observations = observations.len(),
        "decoded uplink"
    );

    let summary = UplinkSummary {
        dev_id: msg.dev_id.clone(),
        port: msg.port,
        time,
        payload_hex: hex::encode(&payload),
        reading: frame.reading(),
        registered,
        observations,
    };
    Ok((summary, received_at))
}

pub fn process_uplink_file(path: &Path, datastreams: &Datastreams) -> Result<Report, ProcessError> {
    let source = JsonLinesSource::open(path)?;
    process_source(path, source, datastreams)
}

pub fn process_source<S: UplinkSource>(
    path: &Path,
    mut source: S,
    datastreams: &Datastreams,
) -> Result<Report, ProcessError> {
    let mut uplinks = Vec::new();
    let mut rejected = Vec::new();
    let mut uplinks_total = 0u64;
    let mut latest: Option<OffsetDateTime> = None;

    while let Some(event) = source.next_uplink()? {
        uplinks_total += 1;
        let msg = match UplinkMessage::from_json_str(&event.text) {
            Ok(msg) => msg,
            Err(err) => {
                debug!(line = event.line, error = %err, "rejected uplink");
                rejected.push(RejectedUplink {
                    line: event.line,
                    dev_id: None,
                    reason: err.to_string(),
                });
                continue;
            }
        };
        match decode_uplink(&msg, datastreams) {
            Ok((summary, received_at)) => {
                latest = latest.max(received_at);
                uplinks.push(summary);
            }
            Err(err) => {
                debug!(line = event.line, dev_id = %msg.dev_id, error = %err, "rejected uplink");
                rejected.push(RejectedUplink {
                    line: event.line,
                    dev_id: Some(msg.dev_id),
                    reason: err.to_string(),
                });
            }
        }
    }

    let mut report = make_stub_report(&path.display().to_string(), path.metadata()?.len());
    report.generated_at = latest
        .and_then(|ts| ts.format(&Rfc3339).ok())
        .unwrap_or_else(|| DEFAULT_GENERATED_AT.to_string());
    report.summary = ProcessingSummary {
        uplinks_total,
        decoded: uplinks.len() as u64,
        rejected: rejected.len() as u64,
        unregistered: uplinks.iter().filter(|uplink| !uplink.registered).count() as u64,
    };
    report.uplinks = uplinks;
    report.rejected = rejected;
    Ok(report)
}
