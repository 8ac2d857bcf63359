//! Human-readable dump of every parsed script.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::model::ProcessedProject;
use crate::processor::script::Script;

pub fn emit(project: &ProcessedProject, out_dir: &Path) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(out_dir.join("listing.txt"))?);
    for script in project.library.iter() {
        write_script(&mut out, script)?;
    }
    out.flush()
}

pub fn write_script(out: &mut impl Write, script: &Script) -> io::Result<()> {
    writeln!(out, "== {} ==", script.name())?;
    if let Some(d) = script.diagnostic() {
        writeln!(out, "  !! line {}: {}", d.line_number, d.message)?;
        writeln!(out, "  !! {}", d.line_text)?;
        return writeln!(out);
    }

    for (i, command) in script.commands().iter().enumerate() {
        writeln!(out, "  {i:>4}  {command:?}")?;
    }

    let mut labels: Vec<_> = script.label_indices().iter().collect();
    labels.sort();
    if !labels.is_empty() {
        writeln!(out, "  labels:")?;
    }
    for (name, positions) in labels {
        let positions: Vec<String> = positions.iter().map(|p| p.to_string()).collect();
        writeln!(out, "    :{name} -> {}", positions.join(", "))?;
    }
    writeln!(out)
}
