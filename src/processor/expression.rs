//! Evaluating direction and boolean expressions against an owner.

use rand::Rng;
use rand::seq::IndexedRandom;

use super::ast::{DirectionExpression, Expression};
use super::direction::{Direction, DirectionModifier, DirectionTerminal};
use super::owner::Owner;

impl DirectionExpression {
    /// Resolves the terminal, then applies modifiers last-declared first.
    /// `None` when the terminal has nothing to point at.
    pub fn evaluate<R: Rng + ?Sized>(&self, owner: &dyn Owner, rng: &mut R) -> Option<Direction> {
        let mut direction = self.terminal.resolve(owner, rng)?;
        for modifier in self.modifiers.iter().rev() {
            direction = modifier.apply(direction, rng);
        }
        Some(direction)
    }
}

impl DirectionTerminal {
    pub fn resolve<R: Rng + ?Sized>(self, owner: &dyn Owner, rng: &mut R) -> Option<Direction> {
        match self {
            DirectionTerminal::Seek => owner.player_direction(),
            DirectionTerminal::Smart => {
                let seek = owner.player_direction()?;
                if !owner.is_blocked(seek) {
                    return Some(seek);
                }
                let around: Vec<Direction> = seek
                    .perpendiculars()
                    .into_iter()
                    .filter(|d| !owner.is_blocked(*d))
                    .collect();
                around.choose(rng).copied().or(Some(seek))
            }
            DirectionTerminal::Flow => owner.orientation(),
            DirectionTerminal::Rand => Direction::ALL.choose(rng).copied(),
            DirectionTerminal::RandFree => owner.free_directions().choose(rng).copied(),
            DirectionTerminal::RandBlocked => owner.blocked_directions().choose(rng).copied(),
            DirectionTerminal::RandEastWest => [Direction::East, Direction::West].choose(rng).copied(),
            DirectionTerminal::RandNorthSouth => {
                [Direction::North, Direction::South].choose(rng).copied()
            }
            DirectionTerminal::RandNorthEast => {
                [Direction::North, Direction::East].choose(rng).copied()
            }
            DirectionTerminal::Fixed(d) => Some(d),
        }
    }
}

impl DirectionModifier {
    pub fn apply<R: Rng + ?Sized>(self, direction: Direction, rng: &mut R) -> Direction {
        match self {
            DirectionModifier::Clockwise => direction.clockwise(),
            DirectionModifier::CounterClockwise => direction.counter_clockwise(),
            DirectionModifier::Opposite => direction.opposite(),
            DirectionModifier::RandomPerpendicular => {
                let [a, b] = direction.perpendiculars();
                if rng.random_bool(0.5) { a } else { b }
            }
        }
    }
}

impl Expression {
    pub fn evaluate<R: Rng + ?Sized>(&self, owner: &dyn Owner, rng: &mut R) -> bool {
        match self {
            Expression::Not(inner) => !inner.evaluate(owner, rng),
            Expression::Adjacent => owner.is_player_adjacent(),
            // nowhere to go counts as blocked
            Expression::Blocked(dir) => dir
                .evaluate(owner, rng)
                .is_none_or(|d| owner.is_blocked(d)),
            Expression::Aligned(None) => owner.is_player_aligned(None),
            Expression::Aligned(Some(dir)) => dir
                .evaluate(owner, rng)
                .is_some_and(|d| owner.is_player_aligned(Some(d.axis()))),
            Expression::Peep(radius) => owner.is_player_visible(*radius),
            Expression::Exists { template, count } => {
                i64::try_from(owner.count_things(template)).unwrap_or(i64::MAX) >= *count
            }
            Expression::Testing {
                counter,
                comparison,
                value,
            } => comparison.holds(owner.counter_value(counter), *value),
        }
    }
}
