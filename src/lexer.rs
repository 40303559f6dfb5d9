use std::fmt;

use crate::error::AsmError;
use crate::span::Cursor;

/// A single lexed token with its position in the source stream.
///
/// String tokens keep their surrounding quotes and their escapes unprocessed;
/// interpolation happens when a directive consumes them.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub position: Cursor,
    pub value: String,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TokenKind {
    Ident,
    Directive,
    Str,
    Literal,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TokenKind::Ident => "Identifier",
            TokenKind::Directive => "Directive",
            TokenKind::Str => "String",
            TokenKind::Literal => "Literal",
        })
    }
}

/// Scans one line into tokens, pushing lexical errors as they are found.
///
/// `line` must not contain a newline; `line_byte` is the absolute offset of
/// its first character.
pub fn lex_line(
    line: &str,
    line_no: usize,
    line_byte: usize,
    errors: &mut Vec<AsmError>,
) -> Vec<Token> {
    LineLexer {
        line_no,
        line_byte,
        tokens: Vec::new(),
        value: String::new(),
        state: None,
        token_start: 1,
    }
    .run(line, errors)
}

struct LineLexer {
    line_no: usize,
    line_byte: usize,
    tokens: Vec<Token>,
    value: String,
    /// Kind of the token being built, or `None` between tokens.
    state: Option<TokenKind>,
    /// 1-based column of the first character of the token being built.
    token_start: usize,
}

impl LineLexer {
    fn run(mut self, line: &str, errors: &mut Vec<AsmError>) -> Vec<Token> {
        let mut chars = line.char_indices().peekable();

        while let Some((idx, ch)) = chars.next() {
            let column = idx + 1;
            let at_eol = chars.peek().is_none();

            if self.state.is_none() {
                self.token_start = column;
            }

            match ch {
                ch if ch.is_whitespace() => match self.state {
                    None => continue,
                    Some(TokenKind::Str) => {}
                    _ => {
                        self.flush();
                        continue;
                    }
                },

                // Comment until end of line
                ';' => {
                    if self.state != Some(TokenKind::Str) {
                        self.flush();
                        break;
                    }
                }

                // Assembler directive
                '.' => match self.state {
                    None => self.state = Some(TokenKind::Directive),
                    Some(TokenKind::Str) => {}
                    _ => errors.push(AsmError::UnexpectedCharacter {
                        position: self.char_cursor(column),
                        received: ch,
                    }),
                },

                // Operand separator
                ',' => {
                    if self.state != Some(TokenKind::Str) {
                        if at_eol {
                            errors.push(AsmError::UnexpectedCharacter {
                                position: self.char_cursor(column),
                                received: ch,
                            });
                        }
                        self.flush();
                        continue;
                    }
                }

                // Hex literal marker (also a plain identifier character)
                'x' | 'X' => {
                    if self.state.is_none() {
                        self.state = Some(TokenKind::Literal);
                    }
                }

                // Base-10 literal marker
                '#' => match self.state {
                    None => self.state = Some(TokenKind::Literal),
                    Some(TokenKind::Str) => {}
                    _ => errors.push(AsmError::UnexpectedCharacter {
                        position: self.char_cursor(column),
                        received: ch,
                    }),
                },

                // String delimiter
                '"' => match self.state {
                    None => self.state = Some(TokenKind::Str),
                    Some(TokenKind::Str) => {
                        self.value.push(ch);
                        self.flush();
                        continue;
                    }
                    _ => errors.push(AsmError::UnexpectedCharacter {
                        position: self.char_cursor(column),
                        received: ch,
                    }),
                },

                ch if ch.is_ascii_digit() => {
                    if self.state.is_none() {
                        self.state = Some(TokenKind::Literal);
                    }
                }

                // Numeric sign
                '-' => {
                    if self.state != Some(TokenKind::Literal) {
                        errors.push(AsmError::UnexpectedCharacter {
                            position: self.char_cursor(column),
                            received: ch,
                        });
                    }
                }

                '_' => match self.state {
                    None => self.state = Some(TokenKind::Ident),
                    Some(TokenKind::Ident) | Some(TokenKind::Str) => {}
                    _ => errors.push(AsmError::UnexpectedCharacter {
                        position: self.char_cursor(column),
                        received: ch,
                    }),
                },

                ch if ch.is_alphabetic() => {
                    if !ch.is_ascii() {
                        errors.push(AsmError::OversizedCharacter {
                            position: self.char_cursor(column),
                        });
                    }
                    if self.state.is_none() {
                        self.state = Some(TokenKind::Ident);
                    }
                }

                _ => {
                    if !ch.is_ascii() {
                        errors.push(AsmError::OversizedCharacter {
                            position: self.char_cursor(column),
                        });
                    }
                    if self.state != Some(TokenKind::Str) {
                        errors.push(AsmError::UnexpectedCharacter {
                            position: self.char_cursor(column),
                            received: ch,
                        });
                    }
                }
            }

            self.value.push(ch);
        }

        if self.state == Some(TokenKind::Str) {
            errors.push(AsmError::InvalidString {
                position: Cursor::new(
                    self.line_no,
                    self.token_start,
                    self.line_byte + self.token_start - 1,
                    line.len() - self.token_start + 1,
                    self.line_byte,
                ),
            });
        }
        self.flush();

        self.tokens
    }

    fn flush(&mut self) {
        if !self.value.is_empty() {
            self.tokens.push(Token {
                // Error paths can grow a token without entering a state; the
                // accompanying error already discards the line
                kind: self.state.unwrap_or(TokenKind::Ident),
                position: Cursor::new(
                    self.line_no,
                    self.token_start,
                    self.line_byte + self.token_start - 1,
                    self.value.len(),
                    self.line_byte,
                ),
                value: std::mem::take(&mut self.value),
            });
        }
        self.state = None;
    }

    fn char_cursor(&self, column: usize) -> Cursor {
        Cursor::new(self.line_no, column, self.line_byte + column - 1, 1, self.line_byte)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn lex(line: &str) -> (Vec<Token>, Vec<AsmError>) {
        let mut errors = Vec::new();
        let tokens = lex_line(line, 1, 0, &mut errors);
        (tokens, errors)
    }

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|tok| tok.kind).collect()
    }

    fn values(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|tok| tok.value.as_str()).collect()
    }

    #[test]
    fn instruction_line() {
        let (tokens, errors) = lex("ADD R0, R1, #16");
        assert!(errors.is_empty());
        assert_eq!(values(&tokens), vec!["ADD", "R0", "R1", "#16"]);
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Ident,
                TokenKind::Ident,
                TokenKind::Ident,
                TokenKind::Literal
            ]
        );
    }

    #[test]
    fn hex_literals() {
        let (tokens, errors) = lex("LDR R0 R1 x1F");
        assert!(errors.is_empty());
        assert_eq!(tokens[3].kind, TokenKind::Literal);
        assert_eq!(tokens[3].value, "x1F");

        let (tokens, errors) = lex(".ORIG 0x3000");
        assert!(errors.is_empty());
        assert_eq!(tokens[0].kind, TokenKind::Directive);
        assert_eq!(tokens[1].kind, TokenKind::Literal);
    }

    #[test]
    fn string_keeps_quotes_and_spaces() {
        let (tokens, errors) = lex(r#".STRINGZ "Hello, World""#);
        assert!(errors.is_empty());
        assert_eq!(values(&tokens), vec![".STRINGZ", "\"Hello, World\""]);
        assert_eq!(tokens[1].kind, TokenKind::Str);
    }

    #[test]
    fn comment_is_discarded() {
        let (tokens, errors) = lex("RET; do return");
        assert!(errors.is_empty());
        assert_eq!(values(&tokens), vec!["RET"]);

        let (tokens, errors) = lex("; nothing here");
        assert!(errors.is_empty());
        assert!(tokens.is_empty());
    }

    #[test]
    fn positions() {
        let mut errors = Vec::new();
        let tokens = lex_line("LD R2 THING", 3, 40, &mut errors);
        assert!(errors.is_empty());
        assert_eq!(tokens[0].position, Cursor::new(3, 1, 40, 2, 40));
        assert_eq!(tokens[1].position, Cursor::new(3, 4, 43, 2, 40));
        assert_eq!(tokens[2].position, Cursor::new(3, 7, 46, 5, 40));
    }

    #[test]
    fn trailing_comma() {
        let (tokens, errors) = lex("ADD R0, R1,");
        assert_eq!(values(&tokens), vec!["ADD", "R0", "R1"]);
        assert!(matches!(
            errors.as_slice(),
            [AsmError::UnexpectedCharacter { received: ',', .. }]
        ));
    }

    #[test]
    fn unclosed_string() {
        let (_, errors) = lex(r#".STRINGZ "oops"#);
        assert!(matches!(errors.as_slice(), [AsmError::InvalidString { .. }]));

        // A lone quote at end of line never closes
        let (_, errors) = lex(r#"LABEL ""#);
        assert!(matches!(errors.as_slice(), [AsmError::InvalidString { .. }]));
    }

    #[test]
    fn sign_outside_literal() {
        let (_, errors) = lex("-5");
        assert!(matches!(
            errors.as_slice(),
            [AsmError::UnexpectedCharacter { received: '-', .. }]
        ));

        let (_, errors) = lex("#-5");
        assert!(errors.is_empty());
    }

    #[test]
    fn stray_period() {
        let (tokens, errors) = lex("AB.C");
        assert!(matches!(
            errors.as_slice(),
            [AsmError::UnexpectedCharacter { received: '.', .. }]
        ));
        assert_eq!(values(&tokens), vec!["AB.C"]);
    }

    #[test]
    fn non_ascii_letter() {
        let (_, errors) = lex("caf\u{e9}");
        assert!(matches!(
            errors.as_slice(),
            [AsmError::OversizedCharacter { .. }]
        ));
    }
}
