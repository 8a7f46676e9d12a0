use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use clap::{Args, Parser, Subcommand};
use glob::glob;
use lorathw_core::{APP_PORT, Datastreams, PAYLOAD_LEN, Report};
use serde::Serialize;
use tracing::{debug, info, warn};

mod logging;

#[derive(Parser, Debug)]
#[command(name = "lorathw")]
#[command(version)]
#[command(
    about = "Decoder for TFA TH/W LoRaWAN weather sensor payloads.",
    long_about = None,
    after_help = "Examples:\n  lorathw decode 37d3120101020304\n  lorathw decode --base64 N9MSAQECAwQ=\n  lorathw uplink process uplinks.jsonl --datastreams datastreams.json -o report.json"
)]
struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a single payload and print the reading as JSON.
    Decode {
        /// Payload bytes as hex (default) or base64
        payload: String,

        /// LoRaWAN FPort the payload arrived on
        #[arg(long, default_value_t = APP_PORT)]
        port: u8,

        /// Interpret the payload as base64 instead of hex
        #[arg(long)]
        base64: bool,

        #[command(flatten)]
        format: JsonFormat,
    },
    /// Operations on TTN uplink logs.
    Uplink {
        #[command(subcommand)]
        command: UplinkCommands,
    },
}

#[derive(Subcommand, Debug)]
enum UplinkCommands {
    /// Decode a JSON-lines uplink log and route readings to datastreams.
    #[command(alias = "analyse")]
    #[command(
        after_help = "Examples:\n  lorathw uplink process uplinks.jsonl --datastreams datastreams.json -o report.json\n  lorathw uplink process 'logs/*_proxy.jsonl' --datastreams datastreams.json --stdout"
    )]
    Process(ProcessArgs),
}

#[derive(Args, Debug)]
struct JsonFormat {
    /// Pretty-print JSON output
    #[arg(long, conflicts_with = "compact")]
    pretty: bool,

    /// Compact JSON output (default)
    #[arg(long)]
    compact: bool,
}

#[derive(Args, Debug)]
struct ProcessArgs {
    /// Path to a .jsonl uplink log (one TTN uplink JSON object per line)
    input: PathBuf,

    /// Datastream map (JSON: device id -> sensor -> URL)
    #[arg(long)]
    datastreams: PathBuf,

    /// Output report path (JSON)
    #[arg(short = 'o', long, required_unless_present = "stdout")]
    report: Option<PathBuf>,

    /// Write JSON report to stdout
    #[arg(long, conflicts_with = "report")]
    stdout: bool,

    #[command(flatten)]
    format: JsonFormat,

    /// Suppress non-error output
    #[arg(long)]
    quiet: bool,

    /// Exit with a non-zero code if any uplink was rejected or unregistered
    #[arg(long)]
    strict: bool,

    /// List rejected uplinks after processing
    #[arg(long)]
    list_rejected: bool,
}

impl Commands {
    fn quiet(&self) -> bool {
        matches!(
            self,
            Commands::Uplink {
                command: UplinkCommands::Process(args)
            } if args.quiet
        )
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.log_level.as_deref(), cli.command.quiet());

    let result = match cli.command {
        Commands::Decode {
            payload,
            port,
            base64,
            format,
        } => cmd_decode(&payload, port, base64, &format),
        Commands::Uplink {
            command: UplinkCommands::Process(args),
        } => cmd_uplink_process(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

/// Message plus optional remediation hint, printed on failure.
#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            hint: None,
        }
    }

    fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{:#}", err))
    }
}

fn cmd_decode(payload: &str, port: u8, base64: bool, format: &JsonFormat) -> Result<(), CliError> {
    let bytes = if base64 {
        parse_base64_payload(payload)?
    } else {
        parse_hex_payload(payload)?
    };
    if port != APP_PORT {
        warn!(port, "payload not on the sensor's uplink port {}", APP_PORT);
    }
    let reading = lorathw_core::decode(&bytes, port).map_err(|err| {
        CliError::new(format!("failed to decode payload: {}", err))
            .hint(format!("TH/W payloads are {} bytes", PAYLOAD_LEN))
    })?;
    debug!(devid = reading.devid, "decoded payload");
    println!("{}", serialize_json(&reading, format)?);
    Ok(())
}

fn parse_hex_payload(text: &str) -> Result<Vec<u8>, CliError> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let digits = compact
        .strip_prefix("0x")
        .or_else(|| compact.strip_prefix("0X"))
        .unwrap_or(&compact);
    hex::decode(digits).map_err(|err| {
        CliError::new(format!("invalid hex payload '{}': {}", text, err))
            .hint("pass hex digits (e.g. 37d3120101020304) or use --base64")
    })
}

fn parse_base64_payload(text: &str) -> Result<Vec<u8>, CliError> {
    STANDARD.decode(text.trim()).map_err(|err| {
        CliError::new(format!("invalid base64 payload '{}': {}", text, err))
            .hint("pass the uplink's payload_raw field unchanged")
    })
}

fn cmd_uplink_process(args: ProcessArgs) -> Result<(), CliError> {
    let input = resolve_input_path(&args.input)?;
    validate_input_file(&input)?;
    let report_path = match (args.stdout, args.report) {
        (true, _) => None,
        (false, Some(path)) => Some(path),
        (false, None) => {
            return Err(CliError::new("missing output path").hint("use -o/--report or --stdout"));
        }
    };
    if let Some(path) = report_path.as_deref() {
        ensure_distinct_output(path, &input)?;
    }

    let streams = Datastreams::load(&args.datastreams).map_err(|err| {
        CliError::new(format!(
            "failed to load datastreams {}: {}",
            args.datastreams.display(),
            err
        ))
        .hint("expected a JSON object: device id -> sensor -> URL")
    })?;
    info!(devices = streams.len(), "datastreams loaded");

    let rep = lorathw_core::process_uplink_file(&input, &streams)
        .context("uplink processing failed")?;
    info!(
        decoded = rep.summary.decoded,
        rejected = rep.summary.rejected,
        unregistered = rep.summary.unregistered,
        "uplinks processed"
    );
    let json = serialize_json(&rep, &args.format)?;

    match report_path.as_deref() {
        None => print!("{}", json),
        Some(path) => write_report(path, &json)?,
    }
    if args.list_rejected && !args.quiet {
        print_rejected(&rep);
    }
    if let (Some(path), false) = (report_path.as_deref(), args.quiet) {
        eprintln!("OK: report written -> {}", path.display());
    }
    check_strict(&rep, args.strict)
}

/// A report path that does not exist yet cannot alias the input.
fn ensure_distinct_output(report: &Path, input: &Path) -> Result<(), CliError> {
    if !report.exists() {
        return Ok(());
    }
    let report_abs = fs::canonicalize(report)
        .with_context(|| format!("Failed to resolve output path: {}", report.display()))?;
    let input_abs = fs::canonicalize(input)
        .with_context(|| format!("Failed to resolve input path: {}", input.display()))?;
    if report_abs == input_abs {
        return Err(CliError::new(format!(
            "report path must differ from input: {}",
            report.display()
        ))
        .hint("choose a different output path"));
    }
    Ok(())
}

fn write_report(path: &Path, json: &str) -> Result<(), CliError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }
    fs::write(path, json)
        .with_context(|| format!("Failed to write report: {}", path.display()))?;
    Ok(())
}

fn check_strict(rep: &Report, strict: bool) -> Result<(), CliError> {
    if strict && (rep.summary.rejected > 0 || rep.summary.unregistered > 0) {
        return Err(CliError::new(format!(
            "{} rejected and {} unregistered uplinks",
            rep.summary.rejected, rep.summary.unregistered
        ))
        .hint("use --list-rejected to inspect"));
    }
    Ok(())
}

fn serialize_json<T: Serialize>(value: &T, format: &JsonFormat) -> Result<String, CliError> {
    if format.pretty && format.compact {
        return Err(CliError::new("cannot use --pretty and --compact together")
            .hint("choose one output format"));
    }
    let json = if format.pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.context("JSON serialization failed").map_err(Into::into)
}

fn print_rejected(rep: &Report) {
    eprintln!("Rejected uplinks:");
    for rejected in &rep.rejected {
        eprintln!(
            "  line {} {}: {}",
            rejected.line,
            rejected.dev_id.as_deref().unwrap_or("-"),
            rejected.reason
        );
    }
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    let hint = "use a .jsonl, .json or .log uplink log";
    if !input.is_file() {
        let problem = if input.exists() {
            "input is not a file"
        } else {
            "input file not found"
        };
        return Err(CliError::new(format!("{}: {}", problem, input.display())).hint(hint));
    }
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jsonl" | "json" | "log") => Ok(()),
        _ => Err(
            CliError::new(format!("unsupported input format '{}'", input.display())).hint(hint),
        ),
    }
}

/// Expand a glob pattern to exactly one file; plain paths pass through.
fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let invalid = |detail: String| {
        CliError::new(format!("invalid input pattern '{}'", pattern))
            .hint(format!("pattern error: {}", detail))
    };
    let mut matches = Vec::new();
    for entry in glob(&pattern).map_err(|err| invalid(err.msg.to_string()))? {
        let path = entry.map_err(|err| invalid(err.to_string()))?;
        if path.is_file() {
            matches.push(path);
        }
    }

    match matches.len() {
        0 => Err(CliError::new(format!("no files match pattern '{}'", pattern))
            .hint("check the path or quote the pattern")),
        1 => Ok(matches.remove(0)),
        n => Err(CliError::new(format!(
            "multiple files match pattern '{}' ({} matches): {}",
            pattern,
            n,
            matches[0].display()
        ))
        .hint("pass a single uplink log, or run once per file")),
    }
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains(['*', '?', '['])
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{
        ensure_distinct_output, is_glob_pattern, parse_base64_payload, parse_hex_payload,
    };

    #[test]
    fn hex_payload_accepts_prefix_and_spaces() {
        assert_eq!(
            parse_hex_payload("0x37 d3 12 01").unwrap(),
            vec![0x37, 0xD3, 0x12, 0x01]
        );
        assert_eq!(parse_hex_payload("37D3").unwrap(), vec![0x37, 0xD3]);
    }

    #[test]
    fn hex_payload_rejects_odd_length() {
        let err = parse_hex_payload("37d").unwrap_err();
        assert!(err.message.contains("invalid hex payload"));
        assert!(err.hint.is_some());
    }

    #[test]
    fn base64_payload_decodes() {
        assert_eq!(
            parse_base64_payload(" N9MSAQECAwQ= ").unwrap(),
            vec![0x37, 0xD3, 0x12, 0x01, 0x01, 0x02, 0x03, 0x04]
        );
    }

    #[test]
    fn glob_detection() {
        assert!(is_glob_pattern("logs/*.jsonl"));
        assert!(!is_glob_pattern("logs/uplinks.jsonl"));
    }

    #[test]
    fn missing_report_path_never_aliases_input() {
        let report = Path::new("does/not/exist/yet/report.json");
        assert!(ensure_distinct_output(report, Path::new("uplinks.jsonl")).is_ok());
    }
}
