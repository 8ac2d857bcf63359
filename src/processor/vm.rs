//! Per-actor interpreter state and the tick loop.
//!
//! A `ScriptContext` pairs one shared `Script` with everything that changes
//! while it runs: the command cursor, label cursors, the message queues and
//! the heap that multi-tick commands keep their progress in.

use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use log::{debug, trace};
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::direction::Direction;
use super::owner::Owner;
use super::script::Script;

/// What the tick loop does after a command returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandResult {
    /// Done; advance and end the tick.
    Normal,
    /// Done; advance and run the next command in the same tick.
    Continue,
    /// A jump already placed the cursor; run on from there this tick.
    ContinueAfterJump,
    /// Not done; run the same command again next tick.
    Repeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    /// Stopped by END, DIE or BECOME, or never runnable. Ignores messages.
    Stopped,
    /// Next command to run.
    Running(usize),
    /// Ran off the end of the script. A message can restart it.
    Halted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeapSlot {
    /// Steps or ticks still to go.
    Count,
    /// Direction a forceful move keeps pushing against.
    Stuck,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeapValue {
    Count(i64),
    Direction(Direction),
}

/// Scratch storage of in-progress commands, keyed by command index.
#[derive(Debug, Clone, Default)]
pub struct Heap {
    entries: HashMap<(usize, HeapSlot), HeapValue>,
}

impl Heap {
    pub fn count(&self, command: usize) -> Option<i64> {
        match self.entries.get(&(command, HeapSlot::Count)) {
            Some(HeapValue::Count(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn set_count(&mut self, command: usize, n: i64) {
        self.entries
            .insert((command, HeapSlot::Count), HeapValue::Count(n));
    }

    pub fn stuck(&self, command: usize) -> Option<Direction> {
        match self.entries.get(&(command, HeapSlot::Stuck)) {
            Some(HeapValue::Direction(d)) => Some(*d),
            _ => None,
        }
    }

    pub fn set_stuck(&mut self, command: usize, direction: Direction) {
        self.entries
            .insert((command, HeapSlot::Stuck), HeapValue::Direction(direction));
    }

    pub fn clear_stuck(&mut self, command: usize) {
        self.entries.remove(&(command, HeapSlot::Stuck));
    }

    /// Drops every slot of `command`.
    pub fn clear(&mut self, command: usize) {
        self.entries.retain(|(c, _), _| *c != command);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A message on its way to other actors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// `all`, `others` or an actor name, lower-case.
    pub recipient: String,
    pub text: String,
}

pub struct ScriptContext {
    script: Rc<Script>,
    command_index: Option<usize>,
    label_cursors: HashMap<String, usize>,
    /// Command that asked to be repeated on the next tick.
    stored_command: Option<usize>,
    inbox: VecDeque<String>,
    outbox: Vec<Message>,
    heap: Heap,
    locked: bool,
    rng: StdRng,
}

impl ScriptContext {
    pub fn new(script: Rc<Script>) -> Self {
        Self::with_rng(script, StdRng::from_os_rng())
    }

    /// Context with a reproducible random sequence.
    pub fn with_seed(script: Rc<Script>, seed: u64) -> Self {
        Self::with_rng(script, StdRng::seed_from_u64(seed))
    }

    fn with_rng(script: Rc<Script>, rng: StdRng) -> Self {
        let label_cursors = script.label_names().map(|n| (n.to_string(), 0)).collect();
        let command_index = script.is_executable().then_some(0);
        Self {
            script,
            command_index,
            label_cursors,
            stored_command: None,
            inbox: VecDeque::new(),
            outbox: Vec::new(),
            heap: Heap::default(),
            locked: false,
            rng,
        }
    }

    pub fn script(&self) -> &Rc<Script> {
        &self.script
    }

    pub fn state(&self) -> ContextState {
        match self.command_index {
            None => ContextState::Stopped,
            Some(i) if i < self.script.commands().len() => ContextState::Running(i),
            Some(_) => ContextState::Halted,
        }
    }

    pub fn command_index(&self) -> Option<usize> {
        self.command_index
    }

    pub fn stored_command(&self) -> Option<usize> {
        self.stored_command
    }

    pub fn stop(&mut self) {
        self.command_index = None;
        self.stored_command = None;
        self.inbox.clear();
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Locking also drops every message still waiting in the inbox.
    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
        if locked && !self.inbox.is_empty() {
            debug!(
                "{}: locked, dropping {} queued messages",
                self.script.name(),
                self.inbox.len()
            );
            self.inbox.clear();
        }
    }

    pub fn label_cursor(&self, label: &str) -> Option<usize> {
        self.label_cursors.get(&label.to_ascii_lowercase()).copied()
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn heap_mut(&mut self) -> &mut Heap {
        &mut self.heap
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Queues a message from outside. Dropped while the context is locked
    /// or stopped.
    pub fn send(&mut self, message: &str) {
        if self.locked || self.command_index.is_none() {
            debug!("{}: ignoring message `{message}`", self.script.name());
            return;
        }
        self.inbox.push_back(message.to_ascii_lowercase());
    }

    pub fn pending_messages(&self) -> usize {
        self.inbox.len()
    }

    /// Queues a message for other actors, collected with `take_outbox`.
    pub fn post(&mut self, recipient: &str, text: &str) {
        self.outbox.push(Message {
            recipient: recipient.to_ascii_lowercase(),
            text: text.to_ascii_lowercase(),
        });
    }

    pub fn take_outbox(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.outbox)
    }

    /// Moves the cursor just past the label's active position. `false` when
    /// the label is unknown, fully zapped, or the context is stopped.
    pub fn jump_to_label(&mut self, label: &str) -> bool {
        if self.command_index.is_none() {
            return false;
        }
        let key = label.to_ascii_lowercase();
        let Some(positions) = self.script.label_positions(&key) else {
            return false;
        };
        let cursor = self.label_cursors.get(&key).copied().unwrap_or(0);
        let Some(&position) = positions.get(cursor) else {
            return false;
        };

        if let Some(stored) = self.stored_command.take() {
            self.heap.clear(stored);
        }
        let target = usize::try_from(position + 1).unwrap_or(0);
        trace!("{}: jump to `{key}` -> {target}", self.script.name());
        self.command_index = Some(target);
        true
    }

    /// Disables the label's active position so the next one takes over.
    pub fn zap_label(&mut self, label: &str) {
        let key = label.to_ascii_lowercase();
        let Some(positions) = self.script.label_positions(&key) else {
            return;
        };
        if let Some(cursor) = self.label_cursors.get_mut(&key) {
            *cursor = (*cursor + 1).min(positions.len());
        }
    }

    /// Re-enables the most recently zapped position of the label.
    pub fn restore_label(&mut self, label: &str) {
        if let Some(cursor) = self.label_cursors.get_mut(&label.to_ascii_lowercase()) {
            *cursor = cursor.saturating_sub(1);
        }
    }

    /// Runs one tick: handles at most one queued message, then executes
    /// commands until one ends the tick. A tick runs at most as many
    /// commands as the script has.
    pub fn execute_tick(&mut self, owner: &mut dyn Owner) {
        if let Some(message) = self.inbox.pop_front() {
            if self.jump_to_label(&message) {
                debug!("{}: handling `{message}`", self.script.name());
            } else {
                trace!("{}: no handler for `{message}`", self.script.name());
            }
        }

        let script = Rc::clone(&self.script);
        let mut budget = script.commands().len().max(1);
        while let ContextState::Running(index) = self.state() {
            if budget == 0 {
                debug!("{}: tick budget spent at {index}", script.name());
                break;
            }
            budget -= 1;

            let key = self.stored_command.unwrap_or(index);
            let Some(command) = script.commands().get(key) else {
                break;
            };
            let result = command.execute(key, self, owner);
            trace!("{}: {key} {} -> {result:?}", script.name(), command.keyword());
            match result {
                CommandResult::Normal => {
                    self.finish(key);
                    break;
                }
                CommandResult::Continue => self.finish(key),
                CommandResult::ContinueAfterJump => {}
                CommandResult::Repeat => {
                    self.stored_command = Some(key);
                    break;
                }
            }
        }
    }

    fn finish(&mut self, command: usize) {
        self.stored_command = None;
        self.heap.clear(command);
        if let Some(i) = self.command_index {
            self.command_index = Some(i + 1);
        }
    }
}
