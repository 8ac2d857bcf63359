//! JSON reports: parse diagnostics and dry-run traces.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use crate::model::ProcessedProject;
use crate::processor::ActorTrace;

pub fn emit(project: &ProcessedProject, out_dir: &Path) -> Result<()> {
    write_json(&out_dir.join("diagnostics.json"), &project.diagnostics)?;
    info!("wrote {} diagnostics", project.diagnostics.len());
    Ok(())
}

pub fn emit_trace(traces: &[ActorTrace], out_dir: &Path) -> Result<()> {
    write_json(&out_dir.join("trace.json"), traces)?;
    info!("wrote trace of {} actors", traces.len());
    Ok(())
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Creating {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)
        .with_context(|| format!("Writing {}", path.display()))?;
    Ok(())
}
