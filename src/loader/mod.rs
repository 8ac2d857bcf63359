use std::collections::HashSet;

use anyhow::{Result, anyhow, bail};
use log::{debug, info};
use serde_json::Value;

use crate::model::{ActorEntry, RawProject, ScriptEntry};

/// Parse the whole project JSON string into `RawProject`.
///
/// The file is expected to contain a top-level `scripts` array of
/// `{ "name", "text" }` objects and, optionally, an `actors` array of
/// `{ "name", "script", "cycle" }` objects naming those scripts.
pub fn load_from_json(json: &str) -> Result<RawProject> {
    debug!("project file size: {} bytes", json.len());
    let root: Value = serde_json::from_str(json)?;

    let scripts = root
        .get("scripts")
        .and_then(|v| v.as_array())
        .ok_or_else(|| anyhow!("file has no `scripts` array"))?;

    let mut entries = Vec::<ScriptEntry>::with_capacity(scripts.len());
    let mut names = HashSet::new();
    for (i, value) in scripts.iter().enumerate() {
        let entry: ScriptEntry = serde_json::from_value(value.clone())
            .map_err(|e| anyhow!("script {i}: {e}"))?;
        if !names.insert(entry.name.clone()) {
            bail!("script {i}: duplicate name `{}`", entry.name);
        }
        entries.push(entry);
    }

    let actors = match root.get("actors") {
        None | Some(Value::Null) => Vec::new(),
        Some(value) => {
            let actors: Vec<ActorEntry> = serde_json::from_value(value.clone())
                .map_err(|e| anyhow!("`actors`: {e}"))?;
            for (i, actor) in actors.iter().enumerate() {
                if !names.contains(&actor.script) {
                    bail!(
                        "actor {i} (`{}`) runs unknown script `{}`",
                        actor.name,
                        actor.script
                    );
                }
                if actor.cycle == 0 {
                    bail!("actor {i} (`{}`) has a cycle of 0", actor.name);
                }
            }
            actors
        }
    };

    info!(
        "loaded {} scripts and {} actors",
        entries.len(),
        actors.len()
    );
    Ok(RawProject {
        scripts: entries,
        actors,
    })
}
