//! Compass directions and the fixed keyword tables that name them.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// North/South movement, i.e. sharing a column.
    Vertical,
    /// East/West movement, i.e. sharing a row.
    Horizontal,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub fn clockwise(self) -> Direction {
        match self {
            Direction::North => Direction::East,
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
        }
    }

    pub fn counter_clockwise(self) -> Direction {
        match self {
            Direction::North => Direction::West,
            Direction::West => Direction::South,
            Direction::South => Direction::East,
            Direction::East => Direction::North,
        }
    }

    pub fn opposite(self) -> Direction {
        self.clockwise().clockwise()
    }

    /// The two directions at right angles to this one.
    pub fn perpendiculars(self) -> [Direction; 2] {
        [self.clockwise(), self.counter_clockwise()]
    }

    pub fn axis(self) -> Axis {
        match self {
            Direction::North | Direction::South => Axis::Vertical,
            Direction::East | Direction::West => Axis::Horizontal,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::North => "NORTH",
            Direction::East => "EAST",
            Direction::South => "SOUTH",
            Direction::West => "WEST",
        };
        write!(f, "{name}")
    }
}

/// Selector at the end of a direction expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectionTerminal {
    /// Toward the player.
    Seek,
    /// Toward the player, stepping around an obstacle when possible.
    Smart,
    /// The actor's current orientation.
    Flow,
    /// Any of the four directions.
    Rand,
    /// Any currently unobstructed direction.
    RandFree,
    /// Any currently obstructed direction.
    RandBlocked,
    RandEastWest,
    RandNorthSouth,
    RandNorthEast,
    Fixed(Direction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectionModifier {
    Clockwise,
    CounterClockwise,
    Opposite,
    RandomPerpendicular,
}

pub const DIRECTION_TERMINALS: &[(&str, DirectionTerminal)] = &[
    ("SEEK", DirectionTerminal::Seek),
    ("SMART", DirectionTerminal::Smart),
    ("FLOW", DirectionTerminal::Flow),
    ("RAND", DirectionTerminal::Rand),
    ("RANDF", DirectionTerminal::RandFree),
    ("RANDB", DirectionTerminal::RandBlocked),
    ("RNDEW", DirectionTerminal::RandEastWest),
    ("RNDNS", DirectionTerminal::RandNorthSouth),
    ("RNDNE", DirectionTerminal::RandNorthEast),
    ("NORTH", DirectionTerminal::Fixed(Direction::North)),
    ("N", DirectionTerminal::Fixed(Direction::North)),
    ("EAST", DirectionTerminal::Fixed(Direction::East)),
    ("E", DirectionTerminal::Fixed(Direction::East)),
    ("SOUTH", DirectionTerminal::Fixed(Direction::South)),
    ("S", DirectionTerminal::Fixed(Direction::South)),
    ("WEST", DirectionTerminal::Fixed(Direction::West)),
    ("W", DirectionTerminal::Fixed(Direction::West)),
];

pub const DIRECTION_MODIFIERS: &[(&str, DirectionModifier)] = &[
    ("CW", DirectionModifier::Clockwise),
    ("CCW", DirectionModifier::CounterClockwise),
    ("OPP", DirectionModifier::Opposite),
    ("RNDP", DirectionModifier::RandomPerpendicular),
];

pub fn terminal_named(word: &str) -> Option<DirectionTerminal> {
    DIRECTION_TERMINALS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(word))
        .map(|(_, t)| *t)
}

pub fn modifier_named(word: &str) -> Option<DirectionModifier> {
    DIRECTION_MODIFIERS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(word))
        .map(|(_, m)| *m)
}

pub fn terminal_names() -> Vec<&'static str> {
    DIRECTION_TERMINALS.iter().map(|(name, _)| *name).collect()
}

pub fn modifier_names() -> Vec<&'static str> {
    DIRECTION_MODIFIERS.iter().map(|(name, _)| *name).collect()
}
