//! Thin CLI shell over the adjudication engine (C13)
//!
//! Loads a scenario profile (a small JSON file, or the baseline scenario
//! if none is given), drives the engine over stdin or a file through
//! `LineIngress`, and writes the minimal decision stream to stdout plus,
//! if `--audit <path>` is given, the richer audit stream to a file.
//!
//! Argument parsing is intentionally minimal: no argument-parsing crate,
//! just `std::env::args`. The argument surface itself is not a target of
//! this tool; keeping the shell small is deliberate, not a placeholder.

use load_adjudication_engine::driver::Driver;
use load_adjudication_engine::egress::{AuditEgress, Egress, LineEgress};
use load_adjudication_engine::ingress::{Ingress, LineIngress};
use load_adjudication_engine::money::Money;
use load_adjudication_engine::scenario::{ConfigError, Scenario, ScenarioBuilder};
use serde::Deserialize;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::process::ExitCode;
use thiserror::Error;

/// Scalar scenario settings a profile file may override. Gates are
/// defined in code, not in profiles, since a `GateRule` predicate is a
/// function pointer and has no JSON representation.
#[derive(Debug, Deserialize)]
struct ScenarioProfile {
    #[serde(default)]
    daily_attempt_limit: Option<u64>,
    #[serde(default)]
    daily_amount_limit_minor: Option<i64>,
    #[serde(default)]
    weekly_amount_limit_minor: Option<i64>,
    #[serde(default)]
    multi_reason: Option<bool>,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("usage: adjudicate [--profile <path>] [--input <path>] [--audit <path>]")]
    Usage,
    #[error("failed to read profile {path}: {source}")]
    ProfileRead {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse profile {path}: {source}")]
    ProfileParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid scenario configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to open input {path}: {source}")]
    InputOpen {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to open audit sink {path}: {source}")]
    AuditOpen {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("I/O error while driving the engine: {0}")]
    Run(#[from] io::Error),
}

struct Args {
    profile: Option<String>,
    input: Option<String>,
    audit: Option<String>,
}

fn parse_args(mut raw: impl Iterator<Item = String>) -> Result<Args, CliError> {
    let mut args = Args {
        profile: None,
        input: None,
        audit: None,
    };
    raw.next(); // skip argv[0]
    while let Some(flag) = raw.next() {
        let value = raw.next().ok_or(CliError::Usage)?;
        match flag.as_str() {
            "--profile" => args.profile = Some(value),
            "--input" => args.input = Some(value),
            "--audit" => args.audit = Some(value),
            _ => return Err(CliError::Usage),
        }
    }
    Ok(args)
}

fn build_scenario(profile_path: Option<&str>) -> Result<Scenario, CliError> {
    let mut builder = ScenarioBuilder::baseline();

    if let Some(path) = profile_path {
        let text = std::fs::read_to_string(path).map_err(|source| CliError::ProfileRead {
            path: path.to_string(),
            source,
        })?;
        let profile: ScenarioProfile =
            serde_json::from_str(&text).map_err(|source| CliError::ProfileParse {
                path: path.to_string(),
                source,
            })?;

        if let Some(limit) = profile.daily_attempt_limit {
            builder = builder.daily_attempt_limit(limit);
        }
        if let Some(minor) = profile.daily_amount_limit_minor {
            builder = builder.daily_amount_limit(Money::from_minor_units(minor));
        }
        if let Some(minor) = profile.weekly_amount_limit_minor {
            builder = builder.weekly_amount_limit(Money::from_minor_units(minor));
        }
        if let Some(multi_reason) = profile.multi_reason {
            builder = builder.multi_reason(multi_reason);
        }
    }

    Ok(builder.build()?)
}

fn run() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = parse_args(std::env::args())?;
    let scenario = build_scenario(args.profile.as_deref())?;
    let mut driver = Driver::new(scenario);

    let stdout = io::stdout();
    let mut minimal = LineEgress::new(BufWriter::new(stdout.lock()));

    let mut audit = match &args.audit {
        Some(path) => {
            let file = File::create(path).map_err(|source| CliError::AuditOpen {
                path: path.clone(),
                source,
            })?;
            Some(AuditEgress::new(BufWriter::new(file)))
        }
        None => None,
    };

    macro_rules! drive {
        ($ingress:expr) => {{
            let mut ingress = $ingress;
            while let Some(raw) = ingress.next_record() {
                let decision = driver.process(raw);
                minimal.emit(&decision)?;
                if let Some(audit_sink) = audit.as_mut() {
                    audit_sink.emit(&decision)?;
                }
            }
        }};
    }

    match &args.input {
        Some(path) => {
            let file = File::open(path).map_err(|source| CliError::InputOpen {
                path: path.clone(),
                source,
            })?;
            drive!(LineIngress::new(BufReader::new(file)));
        }
        None => {
            let stdin = io::stdin();
            drive!(LineIngress::new(stdin.lock()));
        }
    }

    minimal.flush_inner()?;
    if let Some(mut audit_sink) = audit {
        audit_sink.flush_inner()?;
    }

    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
