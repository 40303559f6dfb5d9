use std::fmt;

use miette::{miette, LabeledSpan, Report, Severity};

use crate::lexer::TokenKind;
use crate::span::Cursor;

/// Everything the assembler can object to. Errors are accumulated over the
/// whole single pass and returned as a list; only [`AsmError::OversizedBinary`]
/// aborts assembly outright.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum AsmError {
    /// Operand of the wrong token kind.
    InvalidOperand {
        position: Cursor,
        required: Vec<TokenKind>,
        received: TokenKind,
    },
    /// Statement with too few or too many operands.
    InvalidNumArguments {
        position: Cursor,
        required: usize,
        received: usize,
    },
    /// Label reference further away than its offset field can express.
    OversizedLabel {
        position: Cursor,
        limit: i64,
        offset: i64,
    },
    /// Unparseable numeric literal.
    InvalidLiteral { position: Cursor },
    /// Unterminated or malformed string literal.
    InvalidString { position: Cursor },
    /// Literal that does not fit the operand's bit field.
    OversizedLiteral {
        position: Cursor,
        limit: i32,
        value: i32,
    },
    /// Identifier in register position that is not `R0`..`R7`.
    InvalidRegister { position: Cursor },
    /// Character with no meaning in its lexical context.
    UnexpectedCharacter { position: Cursor, received: char },
    /// Character beyond the ASCII range.
    OversizedCharacter { position: Cursor },
    /// Label declared more than once.
    RedeclaredLabel { position: Cursor, name: String },
    /// Reference to a label never declared.
    UnknownLabel { position: Cursor, name: String },
    /// Statement keyword that is neither instruction nor directive.
    UnknownIdentifier { position: Cursor, name: String },
    /// Emission cursor ran past the end of the address space.
    OversizedBinary,
}

impl AsmError {
    /// Source position of the offending token, where one exists.
    pub fn position(&self) -> Option<Cursor> {
        match self {
            Self::InvalidOperand { position, .. }
            | Self::InvalidNumArguments { position, .. }
            | Self::OversizedLabel { position, .. }
            | Self::InvalidLiteral { position }
            | Self::InvalidString { position }
            | Self::OversizedLiteral { position, .. }
            | Self::InvalidRegister { position }
            | Self::UnexpectedCharacter { position, .. }
            | Self::OversizedCharacter { position }
            | Self::RedeclaredLabel { position, .. }
            | Self::UnknownLabel { position, .. }
            | Self::UnknownIdentifier { position, .. } => Some(*position),
            Self::OversizedBinary => None,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::InvalidOperand { .. } => "asm::operand",
            Self::InvalidNumArguments { .. } => "asm::argc",
            Self::OversizedLabel { .. } => "asm::label_range",
            Self::InvalidLiteral { .. } => "asm::literal",
            Self::InvalidString { .. } => "asm::string",
            Self::OversizedLiteral { .. } => "asm::literal_range",
            Self::InvalidRegister { .. } => "asm::register",
            Self::UnexpectedCharacter { .. } => "lex::unexpected",
            Self::OversizedCharacter { .. } => "lex::ascii",
            Self::RedeclaredLabel { .. } => "asm::duplicate_label",
            Self::UnknownLabel { .. } => "asm::unknown_label",
            Self::UnknownIdentifier { .. } => "asm::unknown_ident",
            Self::OversizedBinary => "asm::binary_size",
        }
    }

    fn help(&self) -> &'static str {
        match self {
            Self::InvalidOperand { .. } => "check the operand kinds this statement accepts",
            Self::InvalidNumArguments { .. } => "check the operand count for this statement",
            Self::OversizedLabel { .. } => {
                "move the label closer to its reference, or load its address with .FILL"
            }
            Self::InvalidLiteral { .. } => "literals look like x3000, 0x3000, #42 or #-42",
            Self::InvalidString { .. } => {
                "close string literals with '\"' and use only \\n \\t \\r \\0 \\\\ \\\" escapes"
            }
            Self::OversizedLiteral { .. } => "this operand's bit field cannot hold the value",
            Self::InvalidRegister { .. } => "register operands are R0 through R7",
            Self::UnexpectedCharacter { .. } => "this character has no meaning here",
            Self::OversizedCharacter { .. } => "only ASCII characters are assemblable",
            Self::RedeclaredLabel { .. } => "labels may only be declared once per file",
            Self::UnknownLabel { .. } => "declare the label somewhere in this file",
            Self::UnknownIdentifier { .. } => "statements start with an instruction or directive",
            Self::OversizedBinary => "the program cursor ran past address 0xFFFF",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::InvalidOperand { .. } => "wrong operand kind",
            Self::InvalidNumArguments { .. } => "wrong operand count",
            Self::OversizedLabel { .. } => "reference too far",
            Self::InvalidLiteral { .. } => "not a literal",
            Self::InvalidString { .. } => "bad string",
            Self::OversizedLiteral { .. } => "out-of-range literal",
            Self::InvalidRegister { .. } => "not a register",
            Self::UnexpectedCharacter { .. } => "unexpected character",
            Self::OversizedCharacter { .. } => "non-ASCII character",
            Self::RedeclaredLabel { .. } => "duplicate label",
            Self::UnknownLabel { .. } => "unknown label",
            Self::UnknownIdentifier { .. } => "unknown identifier",
            Self::OversizedBinary => "",
        }
    }

    /// Renders the error as a miette report against the source it came from.
    pub fn report(&self, src: &str) -> Report {
        let report = match self.position() {
            Some(position) => miette!(
                severity = Severity::Error,
                code = self.code(),
                help = self.help(),
                labels = vec![LabeledSpan::at(position, self.label())],
                "{self}",
            ),
            None => miette!(
                severity = Severity::Error,
                code = self.code(),
                help = self.help(),
                "{self}",
            ),
        };
        report.with_source_code(src.to_owned())
    }
}

fn kind_list(kinds: &[TokenKind]) -> String {
    match kinds {
        [] => String::new(),
        [kind] => kind.to_string(),
        [first, second] => format!("{first} or {second}"),
        [rest @ .., last] => {
            let mut joined = rest
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            joined.push_str(", or ");
            joined.push_str(&last.to_string());
            joined
        }
    }
}

impl fmt::Display for AsmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(position) = self.position() {
            write!(f, "{:02}:{:02}: ", position.line, position.column)?;
        }
        match self {
            Self::InvalidOperand {
                required, received, ..
            } => write!(
                f,
                "Invalid operands\n\twant:{}\n\thave:{}",
                kind_list(required),
                received
            ),
            Self::InvalidNumArguments {
                required, received, ..
            } => write!(
                f,
                "Invalid number of arguments\n\twant:{required}\n\thave:{received}"
            ),
            Self::OversizedLabel { limit, offset, .. } => write!(
                f,
                "Label exceeds allowed distance\n\twant:{limit}\n\thave:{offset}"
            ),
            Self::InvalidLiteral { .. } => write!(f, "Invalid numeric literal"),
            Self::InvalidString { .. } => write!(f, "Invalid string literal"),
            Self::OversizedLiteral { limit, value, .. } => write!(
                f,
                "Literal exceeds allowed size\n\twant:{limit}\n\thave:{value}"
            ),
            Self::InvalidRegister { .. } => write!(f, "Invalid register identifier"),
            Self::UnexpectedCharacter { received, .. } => {
                write!(f, "Unexpected character {received}")
            }
            Self::OversizedCharacter { .. } => write!(f, "Character exceeds ASCII limit"),
            Self::RedeclaredLabel { name, .. } => write!(f, "Redeclaration of label '{name}'"),
            Self::UnknownLabel { name, .. } => write!(f, "Unknown label '{name}'"),
            Self::UnknownIdentifier { name, .. } => write!(f, "Unknown identifier '{name}'"),
            Self::OversizedBinary => write!(f, "Binary exceeds allowed size"),
        }
    }
}

impl std::error::Error for AsmError {}
