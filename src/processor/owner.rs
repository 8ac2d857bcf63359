//! Capabilities a command needs from the actor it runs on.
//!
//! The board, audio and display live outside this crate. Queries take
//! `&self`, mutations `&mut self`; failures come back as plain values
//! (`move_to` returns `false`) and never as errors.

use super::ast::ThingTemplate;
use super::direction::{Axis, Direction};

pub trait Owner {
    /// Attempts a single step. `false` when the way is blocked.
    fn move_to(&mut self, direction: Direction) -> bool;

    fn is_blocked(&self, direction: Direction) -> bool;

    fn free_directions(&self) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|d| !self.is_blocked(*d))
            .collect()
    }

    fn blocked_directions(&self) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|d| self.is_blocked(*d))
            .collect()
    }

    /// Direction the actor last moved or faced in.
    fn orientation(&self) -> Option<Direction>;

    /// Principal direction toward the player, `None` without a player.
    fn player_direction(&self) -> Option<Direction>;

    fn is_player_adjacent(&self) -> bool;

    /// Same row or column; `Some(axis)` restricts the check to one of them.
    fn is_player_aligned(&self, axis: Option<Axis>) -> bool;

    fn is_player_visible(&self, radius: i64) -> bool;

    /// Number of board tiles matching `template`.
    fn count_things(&self, template: &ThingTemplate) -> usize;

    fn counter_value(&self, name: &str) -> i64;

    fn set_counter_value(&mut self, name: &str, value: i64);

    fn adjust_counter(&mut self, name: &str, delta: i64) {
        let value = self.counter_value(name);
        self.set_counter_value(name, value.saturating_add(delta));
    }

    fn say(&mut self, text: &str);

    fn scroll(&mut self, lines: &[String]);

    /// Takes the actor off the board.
    fn remove(&mut self);

    /// Turns the actor into another kind of tile.
    fn replace(&mut self, template: &ThingTemplate);

    /// Places a tile next to the actor. `false` when it could not be placed.
    fn put(&mut self, direction: Direction, template: &ThingTemplate) -> bool;

    fn change(&mut self, from: &ThingTemplate, to: &ThingTemplate);

    fn shoot(&mut self, direction: Direction);

    fn throw_star(&mut self, direction: Direction);

    fn set_walk_direction(&mut self, direction: Option<Direction>);

    fn set_char(&mut self, code: i64);

    fn play(&mut self, notation: &str, exclusive: bool);

    fn set_torch_radius(&mut self, radius: i64);
}
