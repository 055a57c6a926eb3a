//! CLI entry point for the SMBus transaction replay binary.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;

use smbus_core::{
    DeviceConfig, RegisterFileDevice, SmbusBus, TraceEvent, TraceSink, XCALIBUR_ADDRESS,
};
use smbus_replay::runner::{run_script, RunReport};
use smbus_replay::script::{parse_number, parse_script};
#[cfg(test)]
use tempfile as _;
use thiserror as _;

const USAGE_TEXT: &str = "\
Usage: smbus-replay <command> [options]

Commands:
  run <script> [--address <addr>] [--trace]  Replay a transaction script

Options:
  -a, --address <addr>  Encoder bus address, hex or decimal (default: 0x70)
  -t, --trace           Print every bus transaction to stderr
  -h, --help            Show this help message

Examples:
  smbus-replay run encoder.smb
  smbus-replay run encoder.smb --address 0x45 --trace
";

#[derive(Debug, PartialEq, Eq)]
struct RunArgs {
    script: PathBuf,
    address: u8,
    trace: bool,
}

#[derive(Debug)]
enum ParseResult {
    Run(RunArgs),
    Help,
}

fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let first = args.next().ok_or_else(|| "missing command".to_string())?;

    if first == "--help" || first == "-h" {
        return Ok(ParseResult::Help);
    }

    let command_str = first.to_string_lossy().to_string();

    match command_str.as_str() {
        "run" => parse_run_args(args).map(ParseResult::Run),
        other => Err(format!("unknown command: {other}")),
    }
}

#[allow(clippy::while_let_on_iterator)]
fn parse_run_args(mut args: impl Iterator<Item = OsString>) -> Result<RunArgs, String> {
    let mut script: Option<PathBuf> = None;
    let mut address = XCALIBUR_ADDRESS;
    let mut trace = false;

    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Err(USAGE_TEXT.to_string());
        }

        if arg == "--trace" || arg == "-t" {
            trace = true;
            continue;
        }

        if arg == "--address" || arg == "-a" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for --address".to_string())?;
            let text = value.to_string_lossy();
            address = parse_number(&text)
                .and_then(|raw| u8::try_from(raw).ok())
                .ok_or_else(|| format!("invalid address: {text}"))?;
            continue;
        }

        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        if script.is_some() {
            return Err("multiple script paths provided".to_string());
        }
        script = Some(PathBuf::from(arg));
    }

    let script = script.ok_or_else(|| "missing script path".to_string())?;
    Ok(RunArgs {
        script,
        address,
        trace,
    })
}

struct StderrTrace {
    enabled: bool,
}

impl TraceSink for StderrTrace {
    fn on_event(&mut self, event: TraceEvent) {
        if self.enabled {
            eprintln!("trace: {event}");
        }
    }
}

fn print_report(report: &RunReport) {
    for line in &report.output {
        println!("{line}");
    }

    if report.expectations.is_empty() {
        return;
    }

    for expectation in &report.expectations {
        if !expectation.passed() {
            println!("{expectation}");
        }
    }

    let total = report.expectations.len();
    let failed = report.failures();
    println!();
    println!(
        "Expectations: {} passed, {failed} failed (total: {total})",
        total - failed
    );
}

fn run(args: &RunArgs) -> Result<(), i32> {
    let source = fs::read_to_string(&args.script).map_err(|e| {
        eprintln!("error: failed to read {}: {e}", args.script.display());
        1
    })?;

    let lines = parse_script(&source).map_err(|e| {
        eprintln!("{}:{e}", args.script.display());
        1
    })?;

    let device = RegisterFileDevice::new(DeviceConfig {
        address: args.address,
    })
    .map_err(|e| {
        eprintln!("error: {e}");
        1
    })?;

    let mut bus = SmbusBus::with_trace(StderrTrace {
        enabled: args.trace,
    })
    .with_device(device)
    .map_err(|e| {
        eprintln!("error: {e}");
        1
    })?;

    let report = run_script(&mut bus, &lines).map_err(|e| {
        eprintln!("{}:{e}", args.script.display());
        1
    })?;

    print_report(&report);

    if report.all_passed() {
        Ok(())
    } else {
        Err(1)
    }
}

fn main() {
    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Run(args)) => match run(&args) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Err(error) => {
            if error.starts_with("Usage:") {
                println!("{error}");
            } else {
                eprintln!("error: {error}");
                eprintln!("{USAGE_TEXT}");
            }
            1
        }
    };

    std::process::exit(exit_code);
}
