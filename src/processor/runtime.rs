//! Drives a set of actors tick by tick and routes the messages they send.

use std::rc::Rc;

use log::{debug, info};

use super::owner::Owner;
use super::script::Script;
use super::vm::ScriptContext;

pub struct Actor<O> {
    pub name: String,
    pub context: ScriptContext,
    pub owner: O,
    /// Runs on every `cycle`-th tick.
    pub cycle: u32,
}

/// Actors run in the order they were spawned. Messages sent during a tick
/// are delivered after every actor has run, so none sees a message in the
/// tick it was sent.
pub struct Runtime<O: Owner> {
    actors: Vec<Actor<O>>,
    tick: u64,
    seed: Option<u64>,
}

impl<O: Owner> Default for Runtime<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: Owner> Runtime<O> {
    pub fn new() -> Self {
        Self {
            actors: Vec::new(),
            tick: 0,
            seed: None,
        }
    }

    /// Every actor spawned afterwards gets its own seed derived from `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::new()
        }
    }

    pub fn spawn(&mut self, name: &str, script: Rc<Script>, owner: O, cycle: u32) -> usize {
        let context = match self.seed {
            Some(seed) => ScriptContext::with_seed(script, seed.wrapping_add(self.actors.len() as u64)),
            None => ScriptContext::new(script),
        };
        info!("spawned `{name}` running `{}`", context.script().name());
        self.actors.push(Actor {
            name: name.to_string(),
            context,
            owner,
            cycle: cycle.max(1),
        });
        self.actors.len() - 1
    }

    pub fn actors(&self) -> &[Actor<O>] {
        &self.actors
    }

    pub fn actor(&self, name: &str) -> Option<&Actor<O>> {
        self.actors.iter().find(|a| a.name.eq_ignore_ascii_case(name))
    }

    pub fn into_actors(self) -> Vec<Actor<O>> {
        self.actors
    }

    /// Ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    /// Delivers `message` from outside any actor. `recipient` is `all`, or
    /// an actor name.
    pub fn send(&mut self, recipient: &str, message: &str) {
        self.deliver(recipient, message, None);
    }

    fn deliver(&mut self, recipient: &str, message: &str, sender: Option<usize>) {
        let mut delivered = 0;
        for (i, actor) in self.actors.iter_mut().enumerate() {
            let wanted = match recipient {
                "all" => true,
                "others" => Some(i) != sender,
                name => actor.name.eq_ignore_ascii_case(name),
            };
            if wanted {
                actor.context.send(message);
                delivered += 1;
            }
        }
        debug!("`{message}` to `{recipient}`: {delivered} recipients");
    }

    pub fn tick(&mut self) {
        let tick = self.tick;
        let mut mail = Vec::new();
        for (i, actor) in self.actors.iter_mut().enumerate() {
            if tick % u64::from(actor.cycle) == 0 {
                actor.context.execute_tick(&mut actor.owner);
            }
            mail.extend(actor.context.take_outbox().into_iter().map(|m| (i, m)));
        }
        for (sender, m) in mail {
            self.deliver(&m.recipient, &m.text, Some(sender));
        }
        self.tick += 1;
    }

    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.tick();
        }
    }
}
