//! pachinko-runner: headless batch runner for the pachinko simulator.
//!
//! Usage:
//!   pachinko-runner --bet 4 --budget 10000 --days 30 --hit 319 \
//!       --bonus-entry 60 --bonus-hit 60 --st 80 --time-limited 100 --seed 42
//!   pachinko-runner --config data/sample_input.json --json
//!   pachinko-runner --ipc-mode

use anyhow::Result;
use pachinko_core::{
    batch::{BatchProgress, BatchRunner},
    config::{RawInput, SimulationConfig},
    error::ValidationError,
    summary::BatchSummary,
    validate::validate,
};
use std::env;
use std::io::{self, BufRead, Write};

/// Command-line flag → raw input field.
const INPUT_FLAGS: [(&str, &str); 9] = [
    ("--bet",          "bet_unit_yen"),
    ("--budget",       "daily_budget_yen"),
    ("--days",         "days"),
    ("--hit",          "base_hit_denominator"),
    ("--bonus-entry",  "bonus_entry_percent"),
    ("--bonus-hit",    "bonus_hit_denominator"),
    ("--st",           "st_continuation_percent"),
    ("--loop",         "loop_continuation_percent"),
    ("--time-limited", "time_limited_spins"),
];

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    Run {
        input: RawInput,
        #[serde(default)]
        seed: Option<u64>,
        #[serde(default)]
        chunk: Option<u64>,
    },
    Quit,
}

#[derive(serde::Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcReply<'a> {
    Progress {
        days_done: u64,
        days_total: u64,
        percent: u64,
    },
    Summary {
        seed: u64,
        config: &'a SimulationConfig,
        summary: &'a BatchSummary,
    },
    Error {
        kind: &'a str,
        message: String,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--ipc-mode") {
        return run_ipc_loop();
    }

    let mut raw = match arg_value(&args, "--config") {
        Some(path) => RawInput::load(path)?,
        None => RawInput::default(),
    };
    for (flag, field) in INPUT_FLAGS {
        if let Some(value) = arg_value(&args, flag) {
            raw.set(field, value);
        }
    }

    let seed = arg_value(&args, "--seed")
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(rand::random::<u64>);
    let chunk = arg_value(&args, "--chunk").and_then(|s| s.parse::<u64>().ok());
    let json = args.iter().any(|a| a == "--json");

    let config = match validate(&raw) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error ({}): {e}", e.kind());
            std::process::exit(2);
        }
    };

    if !json {
        print_config(&config, seed);
    }

    let mut runner = BatchRunner::new(config.clone(), seed);
    if let Some(chunk) = chunk {
        runner = runner.with_chunk_size(chunk);
    }
    let report_progress = !json && config.days > 100;
    runner.run_with_progress(|p| {
        if report_progress {
            eprintln!("  running... {}% ({}/{} days)", p.percent(), p.days_done, p.days_total);
        }
    });
    let days = runner.into_results();
    let summary = BatchSummary::from_days(&days);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    Ok(())
}

/// One JSON command per stdin line; one or more JSON replies per command.
fn run_ipc_loop() -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let reply = IpcReply::Error { kind: "bad_command", message: e.to_string() };
                writeln!(stdout, "{}", serde_json::to_string(&reply)?)?;
                stdout.flush()?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::Run { input, seed, chunk } => {
                handle_run(&mut stdout, &input, seed, chunk)?;
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

fn handle_run(
    out: &mut impl Write,
    input: &RawInput,
    seed: Option<u64>,
    chunk: Option<u64>,
) -> Result<()> {
    let config = match validate(input) {
        Ok(config) => config,
        Err(e) => return write_validation_error(out, &e),
    };

    let seed = seed.unwrap_or_else(rand::random::<u64>);
    let mut runner = BatchRunner::new(config.clone(), seed);
    if let Some(chunk) = chunk {
        runner = runner.with_chunk_size(chunk);
    }

    // Progress lines are the host's chance to stay responsive.
    let mut write_err: Option<anyhow::Error> = None;
    runner.run_with_progress(|p: &BatchProgress| {
        if write_err.is_some() {
            return;
        }
        if let Err(e) = write_progress(&mut *out, p) {
            write_err = Some(e);
        }
    });
    if let Some(e) = write_err {
        return Err(e);
    }

    let days = runner.into_results();
    let summary = BatchSummary::from_days(&days);
    let reply = IpcReply::Summary { seed, config: &config, summary: &summary };
    writeln!(out, "{}", serde_json::to_string(&reply)?)?;
    Ok(())
}

fn write_progress(out: &mut impl Write, p: &BatchProgress) -> Result<()> {
    let reply = IpcReply::Progress {
        days_done:  p.days_done,
        days_total: p.days_total,
        percent:    p.percent(),
    };
    writeln!(out, "{}", serde_json::to_string(&reply)?)?;
    out.flush()?;
    Ok(())
}

fn write_validation_error(out: &mut impl Write, e: &ValidationError) -> Result<()> {
    log::warn!("rejected input: {e}");
    let reply = IpcReply::Error { kind: e.kind(), message: e.to_string() };
    writeln!(out, "{}", serde_json::to_string(&reply)?)?;
    Ok(())
}

fn print_config(config: &SimulationConfig, seed: u64) {
    println!("Pachinko simulator: pachinko-runner");
    println!("  bet unit:        {} yen/ball", config.bet_unit_yen);
    println!("  daily budget:    {} yen", config.daily_budget_yen);
    println!("  days:            {}", config.days);
    println!("  base odds:       1/{:.0}", 1.0 / config.base_hit_probability);
    println!("  bonus entry:     {:.0}%", config.bonus_entry_probability * 100.0);
    println!("  bonus odds:      1/{:.0}", 1.0 / config.bonus_hit_probability);
    println!(
        "  continuation:    {} {:.0}%",
        config.continuation.label(),
        config.continuation.rate() * 100.0
    );
    println!("  time-limited:    {} spins", config.time_limited_spins);
    println!("  seed:            {seed}");
    println!();
}

fn print_summary(summary: &BatchSummary) {
    println!("=== BATCH SUMMARY ({} days) ===", summary.days);
    println!(
        "  {:<22}{:>12}{:>12}{:>12}{:>12}{:>12}{:>14}",
        "metric", "min", "max", "mean", "median", "mode", "sum"
    );
    for row in &summary.metrics {
        let s = &row.stats;
        println!(
            "  {:<22}{:>12}{:>12}{:>12.2}{:>12}{:>12}{:>14}",
            row.label, s.min, s.max, s.mean, s.median, s.mode, s.sum
        );
    }
    println!(
        "  {:<22}{:>12.2} (mean)  {} hits in streaks",
        "Streak length", summary.streaks.mean, summary.streaks.sum
    );

    println!();
    println!("=== HITS ===");
    println!("  normal hits:          {}", summary.hits.normal_hits);
    println!("  bonus hits:           {}", summary.hits.bonus_hits);
    println!("  misses:               {}", summary.hits.misses);
    println!("  bonus entries:        {}", summary.entries.bonus_entries);
    println!("  time-limited entries: {}", summary.entries.time_limited_entries);

    println!();
    println!("=== STREAK HISTOGRAM ===");
    if summary.histogram.counts.is_empty() {
        println!("  (no streaks)");
    }
    for (label, count) in summary.histogram.labels.iter().zip(&summary.histogram.counts) {
        println!("  {label:>10}: {count}");
    }

    if let (Some(payout), Some(profit)) =
        (summary.payout_progress.last(), summary.profit_progress.last())
    {
        println!();
        println!("=== FINAL PROGRESS SAMPLE ===");
        println!(
            "  payout: mean {:.1} / min {} / median {} ({} days)",
            payout.mean, payout.min, payout.median, payout.samples
        );
        println!(
            "  profit: mean {:.1} / min {} / median {} ({} days)",
            profit.mean, profit.min, profit.median, profit.samples
        );
    }
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
