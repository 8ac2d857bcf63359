//! The functional core: scripts in, parsed commands and their interpreter out.
pub mod ast;
pub mod combinator;
pub mod commands;
pub mod direction;
pub mod expression;
pub mod grammar;
pub mod headless;
pub mod lexer;
pub mod owner;
pub mod runtime;
pub mod script;
pub mod vm;

use anyhow::{Result, anyhow};
use log::{info, warn};
use serde::Serialize;

use crate::model::{ProcessedProject, RawProject};
use headless::{Action, HeadlessOwner};
use runtime::Runtime;
use script::ScriptLibrary;

/// Parses every script and returns a read-only structure for writers.
/// Scripts that fail to parse are kept, with a diagnostic.
pub fn run(raw: &RawProject) -> Result<ProcessedProject> {
    let mut library = ScriptLibrary::new();
    for entry in &raw.scripts {
        library.insert(&entry.name, &entry.text);
    }
    let diagnostics = library.diagnostics();
    if !diagnostics.is_empty() {
        warn!(
            "{} of {} scripts failed to parse",
            diagnostics.len(),
            library.len()
        );
    }
    info!("parsed {} scripts", library.len());

    Ok(ProcessedProject {
        library,
        diagnostics,
        actors: raw.actors.clone(),
    })
}

/// Everything one actor did during a dry run.
#[derive(Debug, Clone, Serialize)]
pub struct ActorTrace {
    pub actor: String,
    pub script: String,
    pub actions: Vec<Action>,
}

/// Runs the project's actors against headless owners for `ticks` ticks.
pub fn dry_run(project: &ProcessedProject, ticks: u64, seed: Option<u64>) -> Result<Vec<ActorTrace>> {
    let mut runtime = match seed {
        Some(seed) => Runtime::seeded(seed),
        None => Runtime::new(),
    };
    for actor in &project.actors {
        let script = project
            .library
            .get(&actor.script)
            .ok_or_else(|| anyhow!("actor `{}` runs unknown script `{}`", actor.name, actor.script))?;
        runtime.spawn(&actor.name, script, HeadlessOwner::named(&actor.name), actor.cycle);
    }

    info!("dry run: {} actors for {ticks} ticks", project.actors.len());
    runtime.run(ticks);

    Ok(runtime
        .into_actors()
        .into_iter()
        .map(|a| ActorTrace {
            actor: a.name,
            script: a.context.script().name().to_string(),
            actions: a.owner.actions,
        })
        .collect())
}
