//! JZTScript grammar, one rule per command keyword.
//!
//! Rules are built once from the combinator engine and shared process-wide.
//! Each rule's assembler turns the tokens it matched into an AST node on the
//! assembly stack; the line parser then takes the single `Line` left there.

use std::sync::LazyLock;

use super::ast::{
    Color, Command, Comparison, DirectionExpression, Expression, Line, Move, ThingTemplate,
};
use super::combinator::{Assembly, MatchError, Parser};
use super::direction::{modifier_named, modifier_names, terminal_named, terminal_names};
use super::lexer::{Token, TokenKind, tokenize};
use crate::error::{ParseError, ScriptError};

/// Item on the assembly stack.
#[derive(Debug, Clone)]
pub enum Node {
    Token(Token),
    Color(Color),
    Direction(DirectionExpression),
    Template(ThingTemplate),
    Expression(Expression),
    Line(Line),
}

impl From<Token> for Node {
    fn from(t: Token) -> Self {
        Node::Token(t)
    }
}

type Rule = Parser<Token, Node>;
type Asm = Assembly<Token, Node>;

const EXPRESSION_KEYWORDS: &[&str] = &[
    "NOT", "ADJACENT", "BLOCKED", "ALIGNED", "PEEP", "EXISTS", "TESTING",
];

const COMPARISON_OPERATORS: &[&str] = &[">", "<", ">=", "<=", "="];

/// Parses the tokens of one line. `line` is used for diagnostics when the
/// line runs out of tokens.
pub fn parse_line(tokens: Vec<Token>, line: usize) -> Result<Line, ParseError> {
    let first = tokens.first().cloned();
    let done = LINE
        .complete_match(Assembly::new(tokens))
        .map_err(|e| match e {
            MatchError::Unexpected(t) => {
                let at_start = first.as_ref().is_some_and(|f| f.position == t.position);
                if at_start && t.kind == TokenKind::Word {
                    ParseError::UnknownCommand {
                        keyword: t.value,
                        line: t.line,
                        column: t.column,
                    }
                } else {
                    ParseError::UnexpectedToken {
                        token: t.to_string(),
                        line: t.line,
                        column: t.column,
                    }
                }
            }
            MatchError::Exhausted => ParseError::TokenExpected { line },
        })?;

    let mut stack = done.into_stack();
    match stack.pop() {
        Some(Node::Line(parsed)) => Ok(parsed),
        None => Ok(Line::Blank),
        Some(_) => Err(match first {
            Some(t) => ParseError::UnexpectedToken {
                token: t.to_string(),
                line: t.line,
                column: t.column,
            },
            None => ParseError::TokenExpected { line },
        }),
    }
}

/// Tokenizes and parses a single line of source.
pub fn parse_command(src: &str) -> Result<Line, ScriptError> {
    let tokens = tokenize(src)?;
    Ok(parse_line(tokens, 1)?)
}

static LINE: LazyLock<Rule> = LazyLock::new(|| {
    let mut rules = commands();
    rules.push(label());
    rules.push(Rule::empty());
    Rule::alternation(rules)
});

static DIRECTION: LazyLock<Rule> = LazyLock::new(|| {
    Rule::alternation(vec![
        Rule::one_of(&terminal_names()).assemble(|a| {
            if let Some(t) = pop_token(a) {
                if let Some(terminal) = terminal_named(&t.value) {
                    a.push(Node::Direction(DirectionExpression::new(terminal)));
                }
            }
        }),
        Rule::sequence(vec![Rule::one_of(&modifier_names()), direction()]).assemble(|a| {
            let Some(mut dir) = pop_direction(a) else {
                return;
            };
            if let Some(m) = pop_token(a).and_then(|t| modifier_named(&t.value)) {
                dir.modifiers.insert(0, m);
            }
            a.push(Node::Direction(dir));
        }),
    ])
});

static EXPRESSION: LazyLock<Rule> = LazyLock::new(|| {
    Rule::alternation(vec![
        Rule::sequence(vec![keyword("NOT"), expression()]).assemble(|a| {
            if let Some(inner) = pop_expression(a) {
                a.push(Node::Expression(Expression::Not(Box::new(inner))));
            }
        }),
        keyword("ADJACENT").assemble(|a| a.push(Node::Expression(Expression::Adjacent))),
        Rule::sequence(vec![keyword("BLOCKED"), direction()]).assemble(|a| {
            if let Some(dir) = pop_direction(a) {
                a.push(Node::Expression(Expression::Blocked(dir)));
            }
        }),
        Rule::sequence(vec![keyword("ALIGNED"), Rule::optional(direction())]).assemble(|a| {
            let dir = pop_direction(a);
            a.push(Node::Expression(Expression::Aligned(dir)));
        }),
        Rule::sequence(vec![keyword("PEEP"), Rule::number()]).assemble(|a| {
            if let Some(radius) = pop_number(a) {
                a.push(Node::Expression(Expression::Peep(radius)));
            }
        }),
        Rule::sequence(vec![
            keyword("EXISTS"),
            template(),
            Rule::optional(Rule::number()),
        ])
        .assemble(|a| {
            let count = pop_number(a).unwrap_or(1);
            if let Some(template) = pop_template(a) {
                a.push(Node::Expression(Expression::Exists { template, count }));
            }
        }),
        Rule::sequence(vec![
            keyword("TESTING"),
            Rule::word(),
            Rule::one_of(COMPARISON_OPERATORS),
            Rule::number(),
        ])
        .assemble(assemble_testing),
        Rule::sequence(vec![
            Rule::word_except(EXPRESSION_KEYWORDS),
            Rule::one_of(COMPARISON_OPERATORS),
            Rule::number(),
        ])
        .assemble(assemble_testing),
    ])
});

fn assemble_testing(a: &mut Asm) {
    let Some(value) = pop_number(a) else {
        return;
    };
    let Some(comparison) = pop_token(a).and_then(|t| Comparison::from_operator(&t.value)) else {
        return;
    };
    if let Some(counter) = pop_token(a) {
        a.push(Node::Expression(Expression::Testing {
            counter: counter.value.to_ascii_lowercase(),
            comparison,
            value,
        }));
    }
}

fn commands() -> Vec<Rule> {
    vec![
        Rule::sequence(vec![
            keyword("MOVE"),
            direction(),
            Rule::optional(Rule::number()),
            Rule::optional(Rule::literal("FORCE")),
        ])
        .assemble(|a| {
            let forceful = pop_word_if(a, |w| w.eq_ignore_ascii_case("FORCE")).is_some();
            let count = pop_number(a).unwrap_or(1);
            if let Some(direction) = pop_direction(a) {
                push_command(
                    a,
                    Command::Move(Move {
                        direction,
                        count,
                        forceful,
                    }),
                );
            }
        }),
        Rule::sequence(vec![
            keyword("TRY"),
            direction(),
            Rule::optional(Rule::word()),
        ])
        .assemble(|a| {
            let otherwise = pop_word_if(a, |_| true).map(label_name);
            if let Some(direction) = pop_direction(a) {
                push_command(a, Command::Try { direction, otherwise });
            }
        }),
        Rule::sequence(vec![keyword("WAIT"), Rule::optional(Rule::number())]).assemble(|a| {
            let ticks = pop_number(a).unwrap_or(1);
            push_command(a, Command::Wait { ticks });
        }),
        Rule::sequence(vec![keyword("SAY"), Rule::quoted()]).assemble(|a| {
            if let Some(t) = pop_token(a) {
                push_command(a, Command::Say { text: t.value });
            }
        }),
        Rule::sequence(vec![
            keyword("SCROLL"),
            Rule::quoted(),
            Rule::repetition(Rule::sequence(vec![
                Rule::literal(",").discard(),
                Rule::quoted(),
            ])),
        ])
        .assemble(|a| {
            let mut lines = Vec::new();
            while let Some(t) = pop_token_of(a, TokenKind::Str) {
                lines.push(t.value);
            }
            lines.reverse();
            push_command(a, Command::Scroll { lines });
        }),
        keyword("END").assemble(|a| push_command(a, Command::End)),
        keyword("DIE").assemble(|a| push_command(a, Command::Die)),
        Rule::sequence(vec![
            keyword("IF"),
            expression(),
            Rule::optional(keyword("THEN")),
            Rule::optional(Rule::literal(":").discard()),
            Rule::word_except(&["THEN"]),
        ])
        .assemble(|a| {
            let Some(label) = pop_token(a) else {
                return;
            };
            if let Some(condition) = pop_expression(a) {
                push_command(
                    a,
                    Command::If {
                        condition,
                        label: label_name(label),
                    },
                );
            }
        }),
        Rule::sequence(vec![keyword("PUT"), direction(), template()]).assemble(|a| {
            let Some(template) = pop_template(a) else {
                return;
            };
            if let Some(direction) = pop_direction(a) {
                push_command(a, Command::Put { direction, template });
            }
        }),
        Rule::sequence(vec![
            keyword("SEND"),
            Rule::word(),
            Rule::optional(Rule::word()),
        ])
        .assemble(|a| {
            let Some(message) = pop_token(a) else {
                return;
            };
            let recipient = pop_word_if(a, |_| true).map(label_name);
            push_command(
                a,
                Command::Send {
                    recipient,
                    message: label_name(message),
                },
            );
        }),
        Rule::sequence(vec![keyword("SET"), Rule::word(), Rule::number()]).assemble(|a| {
            if let Some((counter, value)) = pop_counter_and_number(a) {
                push_command(a, Command::Set { counter, value });
            }
        }),
        Rule::sequence(vec![keyword("GIVE"), Rule::word(), Rule::number()]).assemble(|a| {
            if let Some((counter, amount)) = pop_counter_and_number(a) {
                push_command(a, Command::Give { counter, amount });
            }
        }),
        Rule::sequence(vec![
            keyword("TAKE"),
            Rule::word(),
            Rule::number(),
            Rule::optional(Rule::word()),
        ])
        .assemble(|a| {
            let otherwise = pop_word_if(a, |_| true).map(label_name);
            if let Some((counter, amount)) = pop_counter_and_number(a) {
                push_command(
                    a,
                    Command::Take {
                        counter,
                        amount,
                        otherwise,
                    },
                );
            }
        }),
        Rule::sequence(vec![keyword("BECOME"), template()]).assemble(|a| {
            if let Some(template) = pop_template(a) {
                push_command(a, Command::Become { template });
            }
        }),
        Rule::sequence(vec![keyword("CHANGE"), template(), template()]).assemble(|a| {
            let Some(to) = pop_template(a) else {
                return;
            };
            if let Some(from) = pop_template(a) {
                push_command(a, Command::Change { from, to });
            }
        }),
        Rule::sequence(vec![keyword("CHAR"), Rule::number()]).assemble(|a| {
            if let Some(code) = pop_number(a) {
                push_command(a, Command::Char { code });
            }
        }),
        Rule::sequence(vec![keyword("TORCH"), Rule::number()]).assemble(|a| {
            if let Some(radius) = pop_number(a) {
                push_command(a, Command::Torch { radius });
            }
        }),
        Rule::sequence(vec![keyword("SHOOT"), direction()]).assemble(|a| {
            if let Some(direction) = pop_direction(a) {
                push_command(a, Command::Shoot { direction });
            }
        }),
        Rule::sequence(vec![keyword("THROWSTAR"), direction()]).assemble(|a| {
            if let Some(direction) = pop_direction(a) {
                push_command(a, Command::ThrowStar { direction });
            }
        }),
        Rule::sequence(vec![keyword("WALK"), direction()]).assemble(|a| {
            if let Some(direction) = pop_direction(a) {
                push_command(a, Command::Walk { direction });
            }
        }),
        keyword("STAND").assemble(|a| push_command(a, Command::Stand)),
        keyword("LOCK").assemble(|a| push_command(a, Command::Lock)),
        keyword("UNLOCK").assemble(|a| push_command(a, Command::Unlock)),
        Rule::sequence(vec![keyword("RESTORE"), Rule::word()]).assemble(|a| {
            if let Some(t) = pop_token(a) {
                push_command(a, Command::Restore { label: label_name(t) });
            }
        }),
        Rule::sequence(vec![keyword("ZAP"), Rule::word()]).assemble(|a| {
            if let Some(t) = pop_token(a) {
                push_command(a, Command::Zap { label: label_name(t) });
            }
        }),
        Rule::sequence(vec![
            keyword("PLAY"),
            Rule::quoted(),
            Rule::optional(Rule::literal("EXCLUSIVE")),
        ])
        .assemble(|a| {
            let exclusive = pop_word_if(a, |w| w.eq_ignore_ascii_case("EXCLUSIVE")).is_some();
            if let Some(t) = pop_token(a) {
                push_command(
                    a,
                    Command::Play {
                        notation: t.value,
                        exclusive,
                    },
                );
            }
        }),
    ]
}

/// `:name`
fn label() -> Rule {
    Rule::sequence(vec![Rule::literal(":").discard(), Rule::word()]).assemble(|a| {
        if let Some(t) = pop_token(a) {
            a.push(Node::Line(Line::Label(label_name(t))));
        }
    })
}

/// `[color] thing`
fn template() -> Rule {
    Rule::sequence(vec![
        Rule::optional(Rule::one_of(&Color::names()).assemble(|a| {
            if let Some(c) = pop_token(a).and_then(|t| Color::named(&t.value)) {
                a.push(Node::Color(c));
            }
        })),
        Rule::word(),
    ])
    .assemble(|a| {
        let Some(thing) = pop_token(a) else {
            return;
        };
        let color = match a.pop_if(|n| matches!(n, Node::Color(_))) {
            Some(Node::Color(c)) => Some(c),
            _ => None,
        };
        a.push(Node::Template(ThingTemplate {
            color,
            thing: thing.value.to_ascii_lowercase(),
        }));
    })
}

fn direction() -> Rule {
    Rule::deferred(|| &*DIRECTION)
}

fn expression() -> Rule {
    Rule::deferred(|| &*EXPRESSION)
}

fn keyword(word: &str) -> Rule {
    Rule::literal(word).discard()
}

fn label_name(t: Token) -> String {
    t.value.to_ascii_lowercase()
}

fn push_command(a: &mut Asm, command: Command) {
    a.push(Node::Line(Line::Command(command)));
}

fn pop_token(a: &mut Asm) -> Option<Token> {
    match a.pop() {
        Some(Node::Token(t)) => Some(t),
        _ => None,
    }
}

fn pop_token_of(a: &mut Asm, kind: TokenKind) -> Option<Token> {
    match a.pop_if(|n| matches!(n, Node::Token(t) if t.kind == kind)) {
        Some(Node::Token(t)) => Some(t),
        _ => None,
    }
}

fn pop_word_if(a: &mut Asm, pred: impl Fn(&str) -> bool) -> Option<Token> {
    match a.pop_if(|n| matches!(n, Node::Token(t) if t.kind == TokenKind::Word && pred(&t.value))) {
        Some(Node::Token(t)) => Some(t),
        _ => None,
    }
}

fn pop_number(a: &mut Asm) -> Option<i64> {
    pop_token_of(a, TokenKind::Number).and_then(|t| t.number())
}

fn pop_counter_and_number(a: &mut Asm) -> Option<(String, i64)> {
    let n = pop_number(a)?;
    let counter = pop_token_of(a, TokenKind::Word)?;
    Some((counter.value.to_ascii_lowercase(), n))
}

fn pop_direction(a: &mut Asm) -> Option<DirectionExpression> {
    match a.pop_if(|n| matches!(n, Node::Direction(_))) {
        Some(Node::Direction(d)) => Some(d),
        _ => None,
    }
}

fn pop_template(a: &mut Asm) -> Option<ThingTemplate> {
    match a.pop_if(|n| matches!(n, Node::Template(_))) {
        Some(Node::Template(t)) => Some(t),
        _ => None,
    }
}

fn pop_expression(a: &mut Asm) -> Option<Expression> {
    match a.pop_if(|n| matches!(n, Node::Expression(_))) {
        Some(Node::Expression(e)) => Some(e),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::direction::{Direction, DirectionModifier, DirectionTerminal};

    fn dir(terminal: DirectionTerminal, modifiers: Vec<DirectionModifier>) -> DirectionExpression {
        DirectionExpression {
            terminal,
            modifiers,
        }
    }

    fn north() -> DirectionExpression {
        dir(DirectionTerminal::Fixed(Direction::North), vec![])
    }

    fn cmd(src: &str) -> Command {
        match parse_command(src) {
            Ok(Line::Command(c)) => c,
            other => panic!("{src}: expected command, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_move() {
        let test_cases = vec![
            (
                "move n",
                Move {
                    direction: north(),
                    count: 1,
                    forceful: false,
                },
            ),
            (
                "MOVE Seek 5",
                Move {
                    direction: dir(DirectionTerminal::Seek, vec![]),
                    count: 5,
                    forceful: false,
                },
            ),
            (
                "move cw ccw n",
                Move {
                    direction: dir(
                        DirectionTerminal::Fixed(Direction::North),
                        vec![
                            DirectionModifier::Clockwise,
                            DirectionModifier::CounterClockwise,
                        ],
                    ),
                    count: 1,
                    forceful: false,
                },
            ),
            (
                "move opp rndp randf 2 force",
                Move {
                    direction: dir(
                        DirectionTerminal::RandFree,
                        vec![
                            DirectionModifier::Opposite,
                            DirectionModifier::RandomPerpendicular,
                        ],
                    ),
                    count: 2,
                    forceful: true,
                },
            ),
        ];

        for (src, expected) in test_cases {
            assert_eq!(cmd(src), Command::Move(expected), "source: {src}");
        }
    }

    #[test]
    fn test_parse_simple_commands() {
        let red_key = ThingTemplate {
            color: Some(Color::Red),
            thing: "key".into(),
        };
        let test_cases = vec![
            ("wait", Command::Wait { ticks: 1 }),
            ("wait 3", Command::Wait { ticks: 3 }),
            ("say \"Hello\"", Command::Say { text: "Hello".into() }),
            (
                "scroll \"one\", \"two\", \"three\"",
                Command::Scroll {
                    lines: vec!["one".into(), "two".into(), "three".into()],
                },
            ),
            ("end", Command::End),
            ("die", Command::Die),
            (
                "put n red key",
                Command::Put {
                    direction: north(),
                    template: red_key.clone(),
                },
            ),
            (
                "put n boulder",
                Command::Put {
                    direction: north(),
                    template: ThingTemplate {
                        color: None,
                        thing: "boulder".into(),
                    },
                },
            ),
            (
                "send touch",
                Command::Send {
                    recipient: None,
                    message: "touch".into(),
                },
            ),
            (
                "send Guard Alarm",
                Command::Send {
                    recipient: Some("guard".into()),
                    message: "alarm".into(),
                },
            ),
            (
                "set Score 5",
                Command::Set {
                    counter: "score".into(),
                    value: 5,
                },
            ),
            (
                "give gems 10",
                Command::Give {
                    counter: "gems".into(),
                    amount: 10,
                },
            ),
            (
                "take gems 2 broke",
                Command::Take {
                    counter: "gems".into(),
                    amount: 2,
                    otherwise: Some("broke".into()),
                },
            ),
            (
                "become blue gem",
                Command::Become {
                    template: ThingTemplate {
                        color: Some(Color::Blue),
                        thing: "gem".into(),
                    },
                },
            ),
            (
                "change red key yellow door",
                Command::Change {
                    from: red_key.clone(),
                    to: ThingTemplate {
                        color: Some(Color::Yellow),
                        thing: "door".into(),
                    },
                },
            ),
            ("char 2", Command::Char { code: 2 }),
            ("torch 4", Command::Torch { radius: 4 }),
            ("shoot seek", Command::Shoot { direction: dir(DirectionTerminal::Seek, vec![]) }),
            ("throwstar s", Command::ThrowStar { direction: dir(DirectionTerminal::Fixed(Direction::South), vec![]) }),
            ("walk flow", Command::Walk { direction: dir(DirectionTerminal::Flow, vec![]) }),
            ("stand", Command::Stand),
            ("lock", Command::Lock),
            ("unlock", Command::Unlock),
            ("zap Touch", Command::Zap { label: "touch".into() }),
            ("restore touch", Command::Restore { label: "touch".into() }),
            (
                "play \"cdefg\"",
                Command::Play {
                    notation: "cdefg".into(),
                    exclusive: false,
                },
            ),
            (
                "play \"c\" exclusive",
                Command::Play {
                    notation: "c".into(),
                    exclusive: true,
                },
            ),
            (
                "try e blocked",
                Command::Try {
                    direction: dir(DirectionTerminal::Fixed(Direction::East), vec![]),
                    otherwise: Some("blocked".into()),
                },
            ),
        ];

        for (src, expected) in test_cases {
            assert_eq!(cmd(src), expected, "source: {src}");
        }
    }

    #[test]
    fn test_parse_if() {
        let test_cases = vec![
            ("if adjacent then hit", Expression::Adjacent),
            ("if adjacent hit", Expression::Adjacent),
            ("if adjacent then :hit", Expression::Adjacent),
            (
                "if not not adjacent then hit",
                Expression::Not(Box::new(Expression::Not(Box::new(Expression::Adjacent)))),
            ),
            ("if blocked n then hit", Expression::Blocked(north())),
            ("if aligned then hit", Expression::Aligned(None)),
            ("if aligned n then hit", Expression::Aligned(Some(north()))),
            ("if peep 4 then hit", Expression::Peep(4)),
            (
                "if exists red key then hit",
                Expression::Exists {
                    template: ThingTemplate {
                        color: Some(Color::Red),
                        thing: "key".into(),
                    },
                    count: 1,
                },
            ),
            (
                "if exists gem 3 then hit",
                Expression::Exists {
                    template: ThingTemplate {
                        color: None,
                        thing: "gem".into(),
                    },
                    count: 3,
                },
            ),
            (
                "if ammo >= 10 then hit",
                Expression::Testing {
                    counter: "ammo".into(),
                    comparison: Comparison::GreaterOrEqual,
                    value: 10,
                },
            ),
            (
                "if testing Ammo = 0 hit",
                Expression::Testing {
                    counter: "ammo".into(),
                    comparison: Comparison::Equal,
                    value: 0,
                },
            ),
        ];

        for (src, expected) in test_cases {
            assert_eq!(
                cmd(src),
                Command::If {
                    condition: expected,
                    label: "hit".into()
                },
                "source: {src}"
            );
        }
    }

    #[test]
    fn test_labels_and_blank_lines() {
        assert_eq!(parse_command(":Touch").unwrap(), Line::Label("touch".into()));
        assert_eq!(parse_command("").unwrap(), Line::Blank);
        assert_eq!(parse_command("   // just a note").unwrap(), Line::Blank);
    }

    #[test]
    fn test_parse_errors() {
        let test_cases = vec![
            (
                "dance n",
                ParseError::UnknownCommand {
                    keyword: "dance".into(),
                    line: 1,
                    column: 1,
                },
            ),
            ("move", ParseError::TokenExpected { line: 1 }),
            (
                "move up",
                ParseError::UnexpectedToken {
                    token: "up".into(),
                    line: 1,
                    column: 6,
                },
            ),
            (
                "wait 3 4",
                ParseError::UnexpectedToken {
                    token: "4".into(),
                    line: 1,
                    column: 8,
                },
            ),
            (
                "\"hello\"",
                ParseError::UnexpectedToken {
                    token: "\"hello\"".into(),
                    line: 1,
                    column: 1,
                },
            ),
            ("if adjacent then", ParseError::TokenExpected { line: 1 }),
            (":", ParseError::TokenExpected { line: 1 }),
        ];

        for (src, expected) in test_cases {
            assert_eq!(
                parse_command(src),
                Err(ScriptError::Parse(expected)),
                "source: {src}"
            );
        }
    }

    #[test]
    fn test_best_match_is_deterministic() {
        for _ in 0..10 {
            assert_eq!(
                cmd("change red key blue"),
                Command::Change {
                    from: ThingTemplate {
                        color: Some(Color::Red),
                        thing: "key".into(),
                    },
                    to: ThingTemplate {
                        color: None,
                        thing: "blue".into(),
                    },
                }
            );
        }
    }
}
