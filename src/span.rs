use miette::SourceSpan;

/// Position of a token (or of an offending character) within the source
/// stream. Carried by every token and by every assembler error, and recorded
/// into the symbol table so the debugger can seek back to the line that
/// produced an instruction.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct Cursor {
    /// 1-based source line.
    pub line: usize,
    /// 1-based column of the first character.
    pub column: usize,
    /// Absolute byte offset within the source stream.
    pub byte: usize,
    /// Length in bytes.
    pub size: usize,
    /// Absolute byte offset of the first character of the line.
    pub line_byte: usize,
}

impl Cursor {
    pub fn new(line: usize, column: usize, byte: usize, size: usize, line_byte: usize) -> Self {
        Cursor {
            line,
            column,
            byte,
            size,
            line_byte,
        }
    }
}

// Used for miette conversion
impl From<Cursor> for SourceSpan {
    fn from(value: Cursor) -> Self {
        SourceSpan::new(value.byte.into(), value.size.max(1))
    }
}
