//! Small hand-written lexer for JZTScript.
//!
//! The lexer *only* breaks raw source text into `Token`s. No keywords are
//! recognised here – `move`, `if`, `seek`, … all come out as `Word`
//! tokens. The grammar interprets them later.
//
//  Lexical items:
//
//      Word        ::= [A-Za-z_][A-Za-z0-9_]*
//      Number      ::= [0-9]+             (fits in i64)
//      String      ::= '"' ( '\"' | '\n' | [^"\n] )* '"'
//      Operator    ::= '<' | '>' | '<=' | '>=' | '=' | ':'
//      Punctuation ::= ','
//      Comment     ::= '//' .* until end-of-line   (dropped by default)
//
//  Spaces, tabs and carriage returns are discarded; line feeds come out as
//  `NewLine` tokens.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use crate::error::LexError;
use crate::processor::combinator::Lexeme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Word,
    Number,
    Str,
    Operator,
    Punctuation,
    NewLine,
    Comment,
}

/// One lexical item. `value` holds the source text, except for strings where
/// it holds the unescaped contents without the surrounding quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub line: usize,
    pub column: usize,
    pub position: usize,
}

impl Token {
    /// Integer value of a `Number` token.
    pub fn number(&self) -> Option<i64> {
        match self.kind {
            TokenKind::Number => self.value.parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Str => {
                write!(f, "\"")?;
                for c in self.value.chars() {
                    match c {
                        '"' => write!(f, "\\\"")?,
                        '\n' => write!(f, "\\n")?,
                        '\\' => write!(f, "\\\\")?,
                        c => write!(f, "{c}")?,
                    }
                }
                write!(f, "\"")
            }
            TokenKind::NewLine => write!(f, "\\n"),
            TokenKind::Comment => write!(f, "//{}", self.value),
            _ => write!(f, "{}", self.value),
        }
    }
}

impl Lexeme for Token {
    fn text(&self) -> &str {
        &self.value
    }

    fn is_word(&self) -> bool {
        self.kind == TokenKind::Word
    }

    fn is_number(&self) -> bool {
        self.kind == TokenKind::Number
    }

    fn is_quoted(&self) -> bool {
        self.kind == TokenKind::Str
    }
}

/// Tokenizes `src`, dropping comments.
pub fn tokenize(src: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(src).collect()
}

/// Tokenizes `src`, keeping comments as `Comment` tokens.
pub fn tokenize_with_comments(src: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(src).with_comments().collect()
}

#[derive(Clone)]
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
    position: usize,
    keep_comments: bool,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            chars: src.chars().peekable(),
            line: 1,
            column: 1,
            position: 0,
            keep_comments: false,
            finished: false,
        }
    }

    pub fn with_comments(mut self) -> Self {
        self.keep_comments = true;
        self
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.position += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn consume_while<F: Fn(char) -> bool>(&mut self, pred: F, buf: &mut String) {
        while let Some(c) = self.peek_char() {
            if pred(c) {
                buf.push(c);
                self.next_char();
            } else {
                break;
            }
        }
    }

    fn read_word(&mut self, first: char) -> String {
        let mut word = String::new();
        word.push(first);
        self.consume_while(|c| c.is_ascii_alphanumeric() || c == '_', &mut word);
        word
    }

    fn read_number(&mut self, first: char, line: usize, column: usize) -> Result<String, LexError> {
        let mut num = String::new();
        num.push(first);
        self.consume_while(|c| c.is_ascii_digit(), &mut num);
        match num.parse::<i64>() {
            Ok(_) => Ok(num),
            Err(_) => Err(LexError::NumberTooLarge { line, column }),
        }
    }

    /// Reads up to and including the closing quote. The opening quote has
    /// already been consumed.
    fn read_string(&mut self, line: usize, column: usize) -> Result<String, LexError> {
        let unterminated = LexError::UnterminatedString { line, column };
        let mut text = String::new();
        loop {
            match self.next_char() {
                None | Some('\n') => return Err(unterminated),
                Some('"') => return Ok(text),
                Some('\\') => match self.next_char() {
                    Some('"') => text.push('"'),
                    Some('n') => text.push('\n'),
                    Some('\\') => text.push('\\'),
                    None | Some('\n') => return Err(unterminated),
                    Some(other) => {
                        text.push('\\');
                        text.push(other);
                    }
                },
                Some(c) => text.push(c),
            }
        }
    }

    fn read_comment(&mut self) -> String {
        let mut text = String::new();
        self.consume_while(|c| c != '\n', &mut text);
        text
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            // Skip whitespace that isn't newline
            while let Some(c) = self.peek_char() {
                if c == ' ' || c == '\t' || c == '\r' {
                    self.next_char();
                } else {
                    break;
                }
            }

            let (line, column, position) = (self.line, self.column, self.position);
            let ch = self.next_char()?;

            let kind_res = match ch {
                '\n' => Ok((TokenKind::NewLine, "\n".to_string())),
                '/' if self.peek_char() == Some('/') => {
                    self.next_char();
                    let text = self.read_comment();
                    if !self.keep_comments {
                        continue;
                    }
                    Ok((TokenKind::Comment, text))
                }
                '"' => self
                    .read_string(line, column)
                    .map(|s| (TokenKind::Str, s)),
                '<' | '>' => {
                    let mut op = ch.to_string();
                    if self.peek_char() == Some('=') {
                        self.next_char();
                        op.push('=');
                    }
                    Ok((TokenKind::Operator, op))
                }
                '=' | ':' => Ok((TokenKind::Operator, ch.to_string())),
                ',' => Ok((TokenKind::Punctuation, ch.to_string())),
                c if c.is_ascii_digit() => self
                    .read_number(c, line, column)
                    .map(|n| (TokenKind::Number, n)),
                c if c.is_ascii_alphabetic() || c == '_' => {
                    Ok((TokenKind::Word, self.read_word(c)))
                }
                c => Err(LexError::UnrecognizedToken { ch: c, line, column }),
            };

            return Some(match kind_res {
                Ok((kind, value)) => Ok(Token {
                    kind,
                    value,
                    line,
                    column,
                    position,
                }),
                Err(e) => {
                    self.finished = true;
                    Err(e)
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<(TokenKind, String)> {
        tokenize(src)
            .unwrap()
            .into_iter()
            .map(|t| (t.kind, t.value))
            .collect()
    }

    #[test]
    fn test_tokenisation() {
        let test_cases = vec![
            (
                "move seek 3",
                vec![
                    (TokenKind::Word, "move".to_string()),
                    (TokenKind::Word, "seek".to_string()),
                    (TokenKind::Number, "3".to_string()),
                ],
            ),
            (
                "say \"Hello \\\"world\\\"\"",
                vec![
                    (TokenKind::Word, "say".to_string()),
                    (TokenKind::Str, "Hello \"world\"".to_string()),
                ],
            ),
            (
                "if ammo >= 10 then :full",
                vec![
                    (TokenKind::Word, "if".to_string()),
                    (TokenKind::Word, "ammo".to_string()),
                    (TokenKind::Operator, ">=".to_string()),
                    (TokenKind::Number, "10".to_string()),
                    (TokenKind::Word, "then".to_string()),
                    (TokenKind::Operator, ":".to_string()),
                    (TokenKind::Word, "full".to_string()),
                ],
            ),
            (
                "scroll \"a\", \"b\"",
                vec![
                    (TokenKind::Word, "scroll".to_string()),
                    (TokenKind::Str, "a".to_string()),
                    (TokenKind::Punctuation, ",".to_string()),
                    (TokenKind::Str, "b".to_string()),
                ],
            ),
        ];

        for (src, expected) in test_cases {
            assert_eq!(kinds(src), expected, "source: {src}");
        }
    }

    #[test]
    fn test_bare_equals_is_not_extended() {
        assert_eq!(
            kinds("x == 1"),
            vec![
                (TokenKind::Word, "x".to_string()),
                (TokenKind::Operator, "=".to_string()),
                (TokenKind::Operator, "=".to_string()),
                (TokenKind::Number, "1".to_string()),
            ]
        );
    }

    #[test]
    fn test_line_and_column_tracking() {
        let tokens = tokenize("move n\n  say \"hi\"\r\nend").unwrap();
        let positions: Vec<_> = tokens
            .iter()
            .map(|t| (t.kind, t.line, t.column, t.position))
            .collect();
        assert_eq!(
            positions,
            vec![
                (TokenKind::Word, 1, 1, 0),
                (TokenKind::Word, 1, 6, 5),
                (TokenKind::NewLine, 1, 7, 6),
                (TokenKind::Word, 2, 3, 9),
                (TokenKind::Str, 2, 7, 13),
                (TokenKind::NewLine, 2, 12, 18),
                (TokenKind::Word, 3, 1, 19),
            ]
        );
    }

    #[test]
    fn test_comments() {
        let src = "move n // walk north\nend";
        assert_eq!(
            kinds(src),
            vec![
                (TokenKind::Word, "move".to_string()),
                (TokenKind::Word, "n".to_string()),
                (TokenKind::NewLine, "\n".to_string()),
                (TokenKind::Word, "end".to_string()),
            ]
        );

        let tokens = tokenize_with_comments(src).unwrap();
        assert_eq!(tokens[2].kind, TokenKind::Comment);
        assert_eq!(tokens[2].value, " walk north");
        assert_eq!(tokens[3].kind, TokenKind::NewLine);
    }

    #[test]
    fn test_lex_errors() {
        let test_cases = vec![
            (
                "say \"oops\nend",
                LexError::UnterminatedString { line: 1, column: 5 },
            ),
            (
                "move n\nsay \"never closed",
                LexError::UnterminatedString { line: 2, column: 5 },
            ),
            (
                "give gems 5 + 1",
                LexError::UnrecognizedToken {
                    ch: '+',
                    line: 1,
                    column: 13,
                },
            ),
            (
                "wait / 2",
                LexError::UnrecognizedToken {
                    ch: '/',
                    line: 1,
                    column: 6,
                },
            ),
            (
                "wait 99999999999999999999",
                LexError::NumberTooLarge { line: 1, column: 6 },
            ),
        ];

        for (src, expected) in test_cases {
            assert_eq!(tokenize(src), Err(expected), "source: {src}");
        }
    }

    #[test]
    fn test_relexing_displayed_tokens_is_stable() {
        let src = "put n red key\nsay \"a \\\"quoted\\\" word\"\nif x <= 4 then :done";
        let first = tokenize(src).unwrap();
        let rebuilt = first
            .iter()
            .map(|t| match t.kind {
                TokenKind::NewLine => "\n".to_string(),
                _ => t.to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ");
        let second = tokenize(&rebuilt).unwrap();

        let strip = |ts: &[Token]| -> Vec<(TokenKind, String)> {
            ts.iter().map(|t| (t.kind, t.value.clone())).collect()
        };
        assert_eq!(strip(&first), strip(&second));
    }
}
