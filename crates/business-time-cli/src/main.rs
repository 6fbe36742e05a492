//! bizhours: business-time arithmetic from the command line.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use business_time::zone::parse_instant;
use business_time::{BusinessDuration, Instant, Interval, Rule, ScheduleConfig};
use chrono::SecondsFormat;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Offset instants by business time and measure business time between them
#[derive(Parser, Debug)]
#[command(name = "bizhours")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Schedule file (JSON); defaults to Mon–Fri 09:00–18:00 UTC
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log rule evaluation to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Spend a business duration after an instant
    Add {
        /// Starting instant (RFC 3339, or naive ISO 8601 read as UTC)
        #[arg(long)]
        from: String,
        /// Duration such as "8h", "1d4h", "-30m"
        #[arg(long, allow_hyphen_values = true)]
        duration: String,
    },
    /// Find the instant a business duration before another
    Subtract {
        /// Ending instant
        #[arg(long)]
        from: String,
        /// Duration such as "8h", "1d4h", "-30m"
        #[arg(long, allow_hyphen_values = true)]
        duration: String,
    },
    /// Business time between two instants
    Span {
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
    },
    /// Next available interval at or after an instant
    Next {
        #[arg(long)]
        at: String,
    },
    /// Previous available interval at or before an instant
    Previous {
        #[arg(long)]
        at: String,
    },
}

#[derive(Serialize)]
struct DurationOutput {
    total_seconds: i64,
    hours: i64,
    seconds: i64,
    display: String,
}

impl From<&BusinessDuration> for DurationOutput {
    fn from(d: &BusinessDuration) -> Self {
        Self {
            total_seconds: d.magnitude().num_seconds(),
            hours: d.hours(),
            seconds: d.seconds(),
            display: d.to_string(),
        }
    }
}

#[derive(Serialize)]
struct OffsetOutput {
    from: String,
    duration: DurationOutput,
    result: String,
}

#[derive(Serialize)]
struct SpanOutput {
    start: String,
    end: String,
    duration: DurationOutput,
}

#[derive(Serialize)]
struct IntervalOutput {
    start: String,
    end: String,
    duration_seconds: i64,
}

impl From<Interval> for IntervalOutput {
    fn from(iv: Interval) -> Self {
        Self {
            start: rfc3339(&iv.start),
            end: rfc3339(&iv.end),
            duration_seconds: iv.duration().num_seconds(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let rule = load_schedule(cli.config.as_ref())?;
    let output = run(&cli.command, rule)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn load_schedule(path: Option<&PathBuf>) -> Result<Rule> {
    let config = match path {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("failed to read schedule {}", path.display()))?;
            ScheduleConfig::from_json(&json)
                .with_context(|| format!("failed to parse schedule {}", path.display()))?
        }
        None => ScheduleConfig::default(),
    };
    let rule = config.build().context("invalid schedule")?;
    tracing::debug!(timezone = %config.timezone, "schedule loaded");
    Ok(rule)
}

fn run(command: &Command, rule: Rule) -> Result<serde_json::Value> {
    let value = match command {
        Command::Add { from, duration } => {
            let from = instant(from)?;
            let td = BusinessDuration::parse(rule, duration)?;
            let result = td.add_to(&from)?;
            serde_json::to_value(OffsetOutput {
                from: rfc3339(&from),
                duration: (&td).into(),
                result: rfc3339(&result),
            })?
        }
        Command::Subtract { from, duration } => {
            let from = instant(from)?;
            let td = BusinessDuration::parse(rule, duration)?;
            let result = td.subtract_from(&from)?;
            serde_json::to_value(OffsetOutput {
                from: rfc3339(&from),
                duration: (&td).into(),
                result: rfc3339(&result),
            })?
        }
        Command::Span { start, end } => {
            let start = instant(start)?;
            let end = instant(end)?;
            let span = rule.span(&start, &end)?;
            serde_json::to_value(SpanOutput {
                start: rfc3339(&start),
                end: rfc3339(&end),
                duration: (&span).into(),
            })?
        }
        Command::Next { at } => {
            serde_json::to_value(IntervalOutput::from(rule.next(&instant(at)?)?))?
        }
        Command::Previous { at } => {
            serde_json::to_value(IntervalOutput::from(rule.previous(&instant(at)?)?))?
        }
    };
    Ok(value)
}

fn instant(s: &str) -> Result<Instant> {
    parse_instant(s).with_context(|| format!("bad instant '{}'", s))
}

fn rfc3339(t: &Instant) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}
