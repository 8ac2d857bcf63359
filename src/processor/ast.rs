//! Parsed form of one script line.
//!
//! Everything here is fixed at parse time and shared by every actor running
//! the script. Progress of a multi-tick command lives in the interpreter's
//! heap, never on the command itself.

use std::fmt;

use serde::Serialize;

use super::direction::{DirectionModifier, DirectionTerminal};

/// `[modifier …] terminal`, e.g. `CW CCW SEEK`.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionExpression {
    pub terminal: DirectionTerminal,
    /// In declaration order; applied last-declared first.
    pub modifiers: Vec<DirectionModifier>,
}

impl DirectionExpression {
    pub fn new(terminal: DirectionTerminal) -> Self {
        Self {
            terminal,
            modifiers: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Color {
    Black,
    Blue,
    Green,
    Cyan,
    Red,
    Magenta,
    Brown,
    LightGray,
    Gray,
    LightBlue,
    LightGreen,
    LightCyan,
    LightRed,
    LightMagenta,
    Yellow,
    White,
}

pub const COLORS: &[(&str, Color)] = &[
    ("BLACK", Color::Black),
    ("BLUE", Color::Blue),
    ("GREEN", Color::Green),
    ("CYAN", Color::Cyan),
    ("RED", Color::Red),
    ("MAGENTA", Color::Magenta),
    ("BROWN", Color::Brown),
    ("LIGHTGRAY", Color::LightGray),
    ("GRAY", Color::Gray),
    ("LIGHTBLUE", Color::LightBlue),
    ("LIGHTGREEN", Color::LightGreen),
    ("LIGHTCYAN", Color::LightCyan),
    ("LIGHTRED", Color::LightRed),
    ("LIGHTMAGENTA", Color::LightMagenta),
    ("YELLOW", Color::Yellow),
    ("WHITE", Color::White),
];

impl Color {
    pub fn named(word: &str) -> Option<Color> {
        COLORS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(word))
            .map(|(_, c)| *c)
    }

    pub fn names() -> Vec<&'static str> {
        COLORS.iter().map(|(name, _)| *name).collect()
    }
}

/// The script keyword in lower case, e.g. `lightgray`.
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = COLORS
            .iter()
            .find(|(_, c)| c == self)
            .map_or("", |(name, _)| *name);
        write!(f, "{}", name.to_ascii_lowercase())
    }
}

/// `[color] thing`, naming a kind of board tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThingTemplate {
    pub color: Option<Color>,
    pub thing: String,
}

impl fmt::Display for ThingTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.color {
            Some(c) => write!(f, "{c} {}", self.thing),
            None => write!(f, "{}", self.thing),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Greater,
    Less,
    GreaterOrEqual,
    LessOrEqual,
    Equal,
}

impl Comparison {
    pub fn from_operator(op: &str) -> Option<Comparison> {
        match op {
            ">" => Some(Comparison::Greater),
            "<" => Some(Comparison::Less),
            ">=" => Some(Comparison::GreaterOrEqual),
            "<=" => Some(Comparison::LessOrEqual),
            "=" => Some(Comparison::Equal),
            _ => None,
        }
    }

    pub fn holds(self, lhs: i64, rhs: i64) -> bool {
        match self {
            Comparison::Greater => lhs > rhs,
            Comparison::Less => lhs < rhs,
            Comparison::GreaterOrEqual => lhs >= rhs,
            Comparison::LessOrEqual => lhs <= rhs,
            Comparison::Equal => lhs == rhs,
        }
    }
}

/// Boolean condition of an `IF`.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Not(Box<Expression>),
    /// Player within one tile.
    Adjacent,
    Blocked(DirectionExpression),
    /// Player shares a row or column, optionally along one axis only.
    Aligned(Option<DirectionExpression>),
    /// Player visible within a radius.
    Peep(i64),
    Exists { template: ThingTemplate, count: i64 },
    Testing {
        counter: String,
        comparison: Comparison,
        value: i64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Move {
    pub direction: DirectionExpression,
    pub count: i64,
    /// Retry a blocked step instead of giving it up.
    pub forceful: bool,
}

/// One executable line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Move(Move),
    Try {
        direction: DirectionExpression,
        otherwise: Option<String>,
    },
    Wait { ticks: i64 },
    Say { text: String },
    Scroll { lines: Vec<String> },
    End,
    Die,
    If {
        condition: Expression,
        label: String,
    },
    Put {
        direction: DirectionExpression,
        template: ThingTemplate,
    },
    Send {
        recipient: Option<String>,
        message: String,
    },
    Set { counter: String, value: i64 },
    Give { counter: String, amount: i64 },
    Take {
        counter: String,
        amount: i64,
        otherwise: Option<String>,
    },
    Become { template: ThingTemplate },
    Change { from: ThingTemplate, to: ThingTemplate },
    Char { code: i64 },
    Torch { radius: i64 },
    Shoot { direction: DirectionExpression },
    ThrowStar { direction: DirectionExpression },
    Walk { direction: DirectionExpression },
    Stand,
    Lock,
    Unlock,
    Restore { label: String },
    Zap { label: String },
    Play { notation: String, exclusive: bool },
}

impl Command {
    /// Upper-case keyword the command is written with.
    pub fn keyword(&self) -> &'static str {
        match self {
            Command::Move(_) => "MOVE",
            Command::Try { .. } => "TRY",
            Command::Wait { .. } => "WAIT",
            Command::Say { .. } => "SAY",
            Command::Scroll { .. } => "SCROLL",
            Command::End => "END",
            Command::Die => "DIE",
            Command::If { .. } => "IF",
            Command::Put { .. } => "PUT",
            Command::Send { .. } => "SEND",
            Command::Set { .. } => "SET",
            Command::Give { .. } => "GIVE",
            Command::Take { .. } => "TAKE",
            Command::Become { .. } => "BECOME",
            Command::Change { .. } => "CHANGE",
            Command::Char { .. } => "CHAR",
            Command::Torch { .. } => "TORCH",
            Command::Shoot { .. } => "SHOOT",
            Command::ThrowStar { .. } => "THROWSTAR",
            Command::Walk { .. } => "WALK",
            Command::Stand => "STAND",
            Command::Lock => "LOCK",
            Command::Unlock => "UNLOCK",
            Command::Restore { .. } => "RESTORE",
            Command::Zap { .. } => "ZAP",
            Command::Play { .. } => "PLAY",
        }
    }
}

/// Result of parsing one line.
#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    Command(Command),
    Label(String),
    Blank,
}
