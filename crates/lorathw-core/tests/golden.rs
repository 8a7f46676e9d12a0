use std::fs;
use std::path::{Path, PathBuf};

use lorathw_core::{Datastreams, Report, process_uplink_file};

fn golden_dir(dir: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join(dir)
}

fn load_expected_report(dir: &str) -> Report {
    let expected_path = golden_dir(dir).join("expected_report.json");

    let expected_json = fs::read_to_string(&expected_path).expect("read expected_report.json");
    serde_json::from_str(&expected_json).expect("parse expected report")
}

fn run_golden(dir: &str) -> Report {
    let root = golden_dir(dir);
    let input = root.join("input.jsonl");
    let datastreams = Datastreams::load(&root.join("datastreams.json")).expect("load datastreams");
    let expected = load_expected_report(dir);

    let mut actual = process_uplink_file(&input, &datastreams).expect("process uplinks");
    actual.input.path = expected.input.path.clone();

    let actual_value = serde_json::to_value(&actual).expect("serialize actual");
    let expected_value = serde_json::to_value(expected).expect("serialize expected");

    assert_eq!(actual_value, expected_value, "golden mismatch in {dir}");
    actual
}

#[test]
fn golden_ttn_basic() {
    run_golden("tests/golden/ttn_basic");
}

#[test]
fn golden_ttn_basic_counts_are_consistent() {
    let report = run_golden("tests/golden/ttn_basic");
    assert_eq!(
        report.summary.uplinks_total,
        report.summary.decoded + report.summary.rejected
    );
    assert_eq!(report.uplinks.len() as u64, report.summary.decoded);
    assert_eq!(report.generated_at, "2019-03-01T12:15:30.25Z");
}

#[test]
fn golden_ttn_basic_is_deterministic() {
    let root = golden_dir("tests/golden/ttn_basic");
    let datastreams = Datastreams::load(&root.join("datastreams.json")).expect("load datastreams");
    let first = process_uplink_file(&root.join("input.jsonl"), &datastreams).expect("first run");
    let second = process_uplink_file(&root.join("input.jsonl"), &datastreams).expect("second run");
    assert_eq!(
        serde_json::to_string(&first).expect("serialize first"),
        serde_json::to_string(&second).expect("serialize second")
    );
}

#[test]
fn golden_ttn_basic_is_byte_identical_to_regenerated_output() {
    let dir = "tests/golden/ttn_basic";
    let root = golden_dir(dir);
    let datastreams = Datastreams::load(&root.join("datastreams.json")).expect("load datastreams");
    let mut actual = process_uplink_file(&root.join("input.jsonl"), &datastreams).expect("process");
    actual.input.path = format!("{dir}/input.jsonl");

    let expected = fs::read_to_string(root.join("expected_report.json")).expect("read expected");
    assert_eq!(serde_json::to_string(&actual).expect("serialize"), expected);
}
