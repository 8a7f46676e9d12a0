use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use lorathw_core::{Datastreams, process_uplink_file};

fn main() -> ExitCode {
    if let Err(err) = run() {
        eprintln!("error: {}", err);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run() -> Result<(), String> {
    let root = PathBuf::from("tests").join("golden");
    let entries =
        fs::read_dir(&root).map_err(|err| format!("failed to read {}: {}", root.display(), err))?;

    for entry in entries {
        let entry = entry.map_err(|err| format!("failed to read entry: {}", err))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let input = path.join("input.jsonl");
        if !input.exists() {
            continue;
        }
        let datastreams = path.join("datastreams.json");
        let output = path.join("expected_report.json");
        regenerate_one(&input, &datastreams, &output)?;
    }

    Ok(())
}

fn regenerate_one(input: &Path, datastreams: &Path, output: &Path) -> Result<(), String> {
    let streams = if datastreams.exists() {
        Datastreams::load(datastreams)
            .map_err(|err| format!("failed to load {}: {}", datastreams.display(), err))?
    } else {
        Datastreams::new()
    };
    let report = process_uplink_file(input, &streams)
        .map_err(|err| format!("processing failed for {}: {}", input.display(), err))?;
    let json = serde_json::to_string(&report)
        .map_err(|err| format!("JSON serialization failed: {}", err))?;
    fs::write(output, json)
        .map_err(|err| format!("failed to write {}: {}", output.display(), err))?;
    Ok(())
}
