//! Whole-script parsing and the shared script library.

use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use log::{debug, warn};

use super::ast::{Command, Line};
use super::grammar::parse_line;
use super::lexer::{Token, TokenKind, tokenize};
use crate::error::ScriptError;
use crate::model::Diagnostic;

/// A parsed script, shared read-only by every context that runs it.
#[derive(Debug, Clone)]
pub struct Script {
    name: String,
    commands: Vec<Command>,
    /// Label name to the command positions it marks, in source order.
    /// A position is the index of the command before the label, so a
    /// label ahead of every command sits at -1.
    label_indices: HashMap<String, Vec<isize>>,
    diagnostic: Option<Diagnostic>,
}

impl Script {
    /// Parses `raw_text`. A script that fails to parse is still returned,
    /// with no commands and a diagnostic describing the first error.
    pub fn parse(name: &str, raw_text: &str) -> Script {
        match compile(raw_text) {
            Ok((commands, label_indices)) => {
                debug!(
                    "script `{name}`: {} commands, {} labels",
                    commands.len(),
                    label_indices.len()
                );
                Script {
                    name: name.to_string(),
                    commands,
                    label_indices,
                    diagnostic: None,
                }
            }
            Err(e) => {
                let line_number = e.line();
                let diagnostic = Diagnostic {
                    script_name: name.to_string(),
                    line_number,
                    line_text: raw_text
                        .lines()
                        .nth(line_number.saturating_sub(1))
                        .unwrap_or("")
                        .to_string(),
                    message: e.to_string(),
                };
                warn!("{diagnostic}");
                Script {
                    name: name.to_string(),
                    commands: Vec::new(),
                    label_indices: HashMap::new(),
                    diagnostic: Some(diagnostic),
                }
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn label_indices(&self) -> &HashMap<String, Vec<isize>> {
        &self.label_indices
    }

    pub fn label_positions(&self, label: &str) -> Option<&[isize]> {
        self.label_indices.get(label).map(Vec::as_slice)
    }

    pub fn label_names(&self) -> impl Iterator<Item = &str> {
        self.label_indices.keys().map(String::as_str)
    }

    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        self.diagnostic.as_ref()
    }

    pub fn is_executable(&self) -> bool {
        self.diagnostic.is_none()
    }
}

type Compiled = (Vec<Command>, HashMap<String, Vec<isize>>);

fn compile(text: &str) -> Result<Compiled, ScriptError> {
    let tokens = tokenize(text)?;

    let mut lines: Vec<(usize, Vec<Token>)> = vec![(1, Vec::new())];
    for token in tokens {
        if token.kind == TokenKind::NewLine {
            lines.push((token.line + 1, Vec::new()));
        } else if let Some((_, current)) = lines.last_mut() {
            current.push(token);
        }
    }

    let mut commands = Vec::new();
    let mut label_indices: HashMap<String, Vec<isize>> = HashMap::new();
    for (line, tokens) in lines {
        match parse_line(tokens, line)? {
            Line::Command(command) => commands.push(command),
            Line::Label(name) => {
                let position = commands.len() as isize - 1;
                label_indices.entry(name).or_default().push(position);
            }
            Line::Blank => {}
        }
    }
    Ok((commands, label_indices))
}

/// Every script of a project, by name.
#[derive(Debug, Default)]
pub struct ScriptLibrary {
    scripts: BTreeMap<String, Rc<Script>>,
}

impl ScriptLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and stores a script, replacing any previous one of that name.
    pub fn insert(&mut self, name: &str, text: &str) -> Rc<Script> {
        let script = Rc::new(Script::parse(name, text));
        self.scripts.insert(name.to_string(), Rc::clone(&script));
        script
    }

    pub fn get(&self, name: &str) -> Option<Rc<Script>> {
        self.scripts.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    /// Scripts in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Rc<Script>> {
        self.scripts.values()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.iter().filter_map(|s| s.diagnostic().cloned()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::ast::Move;
    use crate::processor::direction::{Direction, DirectionTerminal};

    #[test]
    fn test_label_positions() {
        let script = Script::parse("guard", ":a\nMOVE N\n:a\nMOVE S");
        assert!(script.is_executable());
        assert_eq!(script.commands().len(), 2);
        assert_eq!(script.label_positions("a"), Some(&[-1, 0][..]));

        let script = Script::parse("pacer", "say \"hi\"\n\n:Touch\nend\n:touch\n");
        assert_eq!(script.label_positions("touch"), Some(&[0, 1][..]));
        assert_eq!(script.label_positions("missing"), None);
    }

    #[test]
    fn test_commands_in_order() {
        let script = Script::parse("walker", "// patrol\nmove n 2\n\nwait 3\nend");
        let expected = vec![
            Command::Move(Move {
                direction: crate::processor::ast::DirectionExpression::new(
                    DirectionTerminal::Fixed(Direction::North),
                ),
                count: 2,
                forceful: false,
            }),
            Command::Wait { ticks: 3 },
            Command::End,
        ];
        assert_eq!(script.commands(), expected.as_slice());
    }

    #[test]
    fn test_parse_failure_leaves_diagnostic() {
        let script = Script::parse("broken", "say \"ok\"\nmove n\ndance wildly\nend");
        assert!(!script.is_executable());
        assert!(script.commands().is_empty());
        assert!(script.label_indices().is_empty());

        let diagnostic = script.diagnostic().unwrap();
        assert_eq!(diagnostic.script_name, "broken");
        assert_eq!(diagnostic.line_number, 3);
        assert_eq!(diagnostic.line_text, "dance wildly");
        assert!(diagnostic.message.contains("dance"), "{}", diagnostic.message);
    }

    #[test]
    fn test_lex_failure_reports_line() {
        let script = Script::parse("broken", "end\nsay \"unterminated");
        let diagnostic = script.diagnostic().unwrap();
        assert_eq!(diagnostic.line_number, 2);
        assert_eq!(diagnostic.line_text, "say \"unterminated");
    }

    #[test]
    fn test_library() {
        let mut library = ScriptLibrary::new();
        library.insert("b", "end");
        library.insert("a", "nonsense here");
        assert_eq!(library.len(), 2);
        let names: Vec<&str> = library.iter().map(|s| s.name()).collect();
        assert_eq!(names, ["a", "b"]);
        assert!(library.get("b").unwrap().is_executable());
        assert_eq!(library.diagnostics().len(), 1);
        assert!(library.get("c").is_none());
    }
}
