use std::fmt;

use serde::{Deserialize, Serialize};

use crate::processor::script::ScriptLibrary;

/// One named script as it appears in the project file.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptEntry {
    pub name: String,
    pub text: String,
}

/// An actor to spawn for a dry run.
#[derive(Debug, Clone, Deserialize)]
pub struct ActorEntry {
    pub name: String,
    pub script: String,
    /// Runs every `cycle` ticks.
    #[serde(default = "default_cycle")]
    pub cycle: u32,
}

fn default_cycle() -> u32 {
    1
}

/// Entire project as it comes out of the JSON loader.
#[derive(Debug, Clone, Deserialize)]
pub struct RawProject {
    pub scripts: Vec<ScriptEntry>,
    #[serde(default)]
    pub actors: Vec<ActorEntry>,
}

/// Why a script could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub script_name: String,
    /// 1-based.
    pub line_number: usize,
    pub line_text: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {} | {}",
            self.script_name, self.line_number, self.message, self.line_text
        )
    }
}

/// Fully processed output handed to `writer`.
pub struct ProcessedProject {
    pub library: ScriptLibrary,
    pub diagnostics: Vec<Diagnostic>,
    pub actors: Vec<ActorEntry>,
}
