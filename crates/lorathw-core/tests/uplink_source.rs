use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use lorathw_core::{
    DEFAULT_GENERATED_AT, Datastreams, JsonLinesSource, ProcessError, UplinkSource,
    process_uplink_file,
};

fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn temp_path(name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    path.push(format!("lorathw_{name}_{unique}.jsonl"));
    path
}

#[test]
fn jsonl_source_reads_uplinks_from_fixture() {
    let path = repo_root()
        .join("tests")
        .join("golden")
        .join("ttn_basic")
        .join("input.jsonl");
    let mut source = JsonLinesSource::open(&path).unwrap();

    let mut lines = Vec::new();
    while let Some(event) = source.next_uplink().unwrap() {
        lines.push(event.line);
    }

    assert_eq!(lines, vec![1, 2, 4, 5]);
}

#[test]
fn missing_input_is_an_io_error() {
    let path = temp_path("missing");
    let err = process_uplink_file(&path, &Datastreams::new()).unwrap_err();
    assert!(matches!(err, ProcessError::Source(_) | ProcessError::Io(_)));
}

#[test]
fn malformed_records_are_rejected_not_fatal() {
    let path = temp_path("malformed");
    fs::write(
        &path,
        concat!(
            "not json\n",
            "{\"dev_id\":\"station-01\",\"payload_raw\":\"***\"}\n",
            "{\"dev_id\":\"station-01\",\"payload_raw\":\"N9MSAQECAwQ=\",",
            "\"metadata\":{\"time\":\"soon\"}}\n",
            "{\"dev_id\":\"station-01\",\"payload_raw\":\"N9MSAQECAwQ=\"}\n",
        ),
    )
    .unwrap();
    let report = process_uplink_file(&path, &Datastreams::new());
    let _ = fs::remove_file(&path);
    let report = report.unwrap();

    assert_eq!(report.summary.uplinks_total, 4);
    assert_eq!(report.summary.decoded, 1);
    assert_eq!(report.summary.rejected, 3);
    assert_eq!(report.summary.unregistered, 1);

    let lines: Vec<_> = report.rejected.iter().map(|r| r.line).collect();
    assert_eq!(lines, vec![1, 2, 3]);
    assert!(report.rejected[0].dev_id.is_none());
    assert!(report.rejected[0].reason.contains("invalid uplink JSON"));
    assert!(report.rejected[1].reason.contains("invalid base64 payload"));
    assert!(report.rejected[2].reason.contains("invalid metadata time 'soon'"));

    assert_eq!(report.generated_at, DEFAULT_GENERATED_AT);
    assert_eq!(report.uplinks[0].reading.devid, 67_305_985);
}

#[test]
fn empty_input_yields_empty_report() {
    let path = temp_path("empty");
    fs::write(&path, "\n\n").unwrap();
    let report = process_uplink_file(&path, &Datastreams::new());
    let _ = fs::remove_file(&path);
    let report = report.unwrap();

    assert_eq!(report.summary.uplinks_total, 0);
    assert!(report.uplinks.is_empty());
    assert!(report.rejected.is_empty());
    assert_eq!(report.input.bytes, 2);
}
