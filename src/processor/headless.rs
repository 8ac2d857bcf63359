//! An owner with no board behind it.
//!
//! Queries answer from plain fields, effects are appended to `actions`.
//! Used by the `--ticks` dry run and by the tests.

use std::collections::{HashMap, HashSet};

use log::info;
use serde::Serialize;

use super::ast::ThingTemplate;
use super::direction::{Axis, Direction};
use super::owner::Owner;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Moved { direction: Direction },
    Bumped { direction: Direction },
    Said { text: String },
    Scrolled { lines: Vec<String> },
    Removed,
    Replaced { template: String },
    Put { direction: Direction, template: String },
    Changed { from: String, to: String },
    Shot { direction: Direction },
    ThrewStar { direction: Direction },
    Walk { direction: Option<Direction> },
    Char { code: i64 },
    Played { notation: String, exclusive: bool },
    Torch { radius: i64 },
    Counter { name: String, value: i64 },
}

#[derive(Debug, Clone, Default)]
pub struct HeadlessOwner {
    pub name: String,
    pub blocked: HashSet<Direction>,
    pub facing: Option<Direction>,
    /// Direction toward the player; `None` means there is no player.
    pub player: Option<Direction>,
    pub player_distance: i64,
    pub adjacent: bool,
    pub aligned: Option<Axis>,
    /// Tile counts by thing name, color ignored.
    pub things: HashMap<String, usize>,
    pub counters: HashMap<String, i64>,
    pub removed: bool,
    pub actions: Vec<Action>,
}

impl HeadlessOwner {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn record(&mut self, action: Action) {
        info!("{}: {:?}", self.name, action);
        self.actions.push(action);
    }

    pub fn said(&self) -> Vec<&str> {
        self.actions
            .iter()
            .filter_map(|a| match a {
                Action::Said { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn moves(&self) -> Vec<Direction> {
        self.actions
            .iter()
            .filter_map(|a| match a {
                Action::Moved { direction } => Some(*direction),
                _ => None,
            })
            .collect()
    }
}

impl Owner for HeadlessOwner {
    fn move_to(&mut self, direction: Direction) -> bool {
        self.facing = Some(direction);
        if self.blocked.contains(&direction) {
            self.record(Action::Bumped { direction });
            return false;
        }
        self.record(Action::Moved { direction });
        true
    }

    fn is_blocked(&self, direction: Direction) -> bool {
        self.blocked.contains(&direction)
    }

    fn orientation(&self) -> Option<Direction> {
        self.facing
    }

    fn player_direction(&self) -> Option<Direction> {
        self.player
    }

    fn is_player_adjacent(&self) -> bool {
        self.player.is_some() && self.adjacent
    }

    fn is_player_aligned(&self, axis: Option<Axis>) -> bool {
        match axis {
            None => self.aligned.is_some(),
            Some(axis) => self.aligned == Some(axis),
        }
    }

    fn is_player_visible(&self, radius: i64) -> bool {
        self.player.is_some() && self.player_distance <= radius
    }

    fn count_things(&self, template: &ThingTemplate) -> usize {
        self.things.get(&template.thing).copied().unwrap_or(0)
    }

    fn counter_value(&self, name: &str) -> i64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    fn set_counter_value(&mut self, name: &str, value: i64) {
        self.counters.insert(name.to_string(), value);
        self.record(Action::Counter {
            name: name.to_string(),
            value,
        });
    }

    fn say(&mut self, text: &str) {
        self.record(Action::Said {
            text: text.to_string(),
        });
    }

    fn scroll(&mut self, lines: &[String]) {
        self.record(Action::Scrolled {
            lines: lines.to_vec(),
        });
    }

    fn remove(&mut self) {
        self.removed = true;
        self.record(Action::Removed);
    }

    fn replace(&mut self, template: &ThingTemplate) {
        self.record(Action::Replaced {
            template: template.to_string(),
        });
    }

    fn put(&mut self, direction: Direction, template: &ThingTemplate) -> bool {
        if self.blocked.contains(&direction) {
            return false;
        }
        self.record(Action::Put {
            direction,
            template: template.to_string(),
        });
        true
    }

    fn change(&mut self, from: &ThingTemplate, to: &ThingTemplate) {
        if let Some(n) = self.things.remove(&from.thing) {
            *self.things.entry(to.thing.clone()).or_default() += n;
        }
        self.record(Action::Changed {
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    fn shoot(&mut self, direction: Direction) {
        self.record(Action::Shot { direction });
    }

    fn throw_star(&mut self, direction: Direction) {
        self.record(Action::ThrewStar { direction });
    }

    fn set_walk_direction(&mut self, direction: Option<Direction>) {
        self.record(Action::Walk { direction });
    }

    fn set_char(&mut self, code: i64) {
        self.record(Action::Char { code });
    }

    fn play(&mut self, notation: &str, exclusive: bool) {
        self.record(Action::Played {
            notation: notation.to_string(),
            exclusive,
        });
    }

    fn set_torch_radius(&mut self, radius: i64) {
        self.record(Action::Torch { radius });
    }
}
