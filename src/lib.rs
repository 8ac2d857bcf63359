pub mod cli;
pub mod error;
pub mod loader;
pub mod model;
pub mod processor;
pub mod writer;

use anyhow::Context;
use clap::Parser;

pub fn run() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // 1. ── Load ───────────────────────────────────────────────────────
    let json = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Reading {}", args.input.display()))?;
    let raw_project = loader::load_from_json(&json).with_context(|| "Parsing input JSON")?;

    // 2. ── Process ────────────────────────────────────────────────────
    let processed = processor::run(&raw_project).with_context(|| "Parsing scripts")?;

    // 3. ── Dry run ────────────────────────────────────────────────────
    let trace = match args.ticks {
        Some(ticks) => Some(
            processor::dry_run(&processed, ticks, args.seed)
                .with_context(|| format!("Running {ticks} ticks"))?,
        ),
        None => None,
    };

    // 4. ── Write outputs ──────────────────────────────────────────────
    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("Creating {}", args.output.display()))?;

    writer::report::emit(&processed, &args.output).with_context(|| "Writing diagnostics")?;
    writer::listing::emit(&processed, &args.output).with_context(|| "Writing listing")?;
    if let Some(trace) = &trace {
        writer::report::emit_trace(trace, &args.output).with_context(|| "Writing trace")?;
    }

    Ok(())
}
