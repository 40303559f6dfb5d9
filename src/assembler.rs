use fxhash::FxHashMap;

use crate::encoding;
use crate::error::AsmError;
use crate::lexer::{self, Token, TokenKind};
use crate::span::Cursor;
use crate::symbol::SymTable;

/// Number of words in an assembled image.
pub const IMAGE_WORDS: usize = 1 << 16;

/// Assembles LC3 source into a full [`IMAGE_WORDS`]-word image.
///
/// The pass is line oriented and never stops at the first problem: every
/// error is collected and the whole list is returned alongside the image.
/// The single exception is [`AsmError::OversizedBinary`], which aborts
/// immediately. A line with lexical errors is skipped without attempting
/// assembly, so one typo does not cascade.
///
/// When a symbol table is supplied, each assembled line records its address
/// against the line's byte offset, and every declared label is recorded
/// against its address.
pub fn assemble(source: &str, symtable: Option<&mut SymTable>) -> (Vec<u16>, Vec<AsmError>) {
    Assembler {
        image: vec![0; IMAGE_WORDS],
        errors: Vec::new(),
        labels: FxHashMap::default(),
        label_refs: Vec::new(),
        fill_refs: Vec::new(),
        program: 0,
        symtable,
    }
    .run(source)
}

/// Bit width of a literal operand field.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Width {
    Imm5,
    Offset6,
    Trapvec8,
    PcOffset9,
    PcOffset11,
    Word,
}

impl Width {
    fn bits(self) -> u32 {
        match self {
            Width::Imm5 => 5,
            Width::Offset6 => 6,
            Width::Trapvec8 => 8,
            Width::PcOffset9 => 9,
            Width::PcOffset11 => 11,
            Width::Word => 16,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum InstrKind {
    Add,
    And,
    /// Branch with its N/Z/P condition mask.
    Br(u16),
    Jmp,
    Jmpt,
    Jsr,
    Jsrr,
    Ld,
    Ldi,
    Ldr,
    Lea,
    Not,
    Ret,
    Rti,
    Rtt,
    St,
    Sti,
    Str,
    Trap,
    Getc,
    Out,
    Puts,
    In,
    Putsp,
    Halt,
}

impl InstrKind {
    fn parse(ident: &str) -> Option<Self> {
        Some(match ident.to_ascii_uppercase().as_str() {
            "ADD" => Self::Add,
            "AND" => Self::And,
            "BR" => Self::Br(0b000),
            "BRN" => Self::Br(0b100),
            "BRZ" => Self::Br(0b010),
            "BRP" => Self::Br(0b001),
            "BRNZ" => Self::Br(0b110),
            "BRZP" => Self::Br(0b011),
            "BRNP" => Self::Br(0b101),
            "BRNZP" => Self::Br(0b111),
            "JMP" => Self::Jmp,
            "JMPT" => Self::Jmpt,
            "JSR" => Self::Jsr,
            "JSRR" => Self::Jsrr,
            "LD" => Self::Ld,
            "LDI" => Self::Ldi,
            "LDR" => Self::Ldr,
            "LEA" => Self::Lea,
            "NOT" => Self::Not,
            "RET" => Self::Ret,
            "RTI" => Self::Rti,
            "RTT" => Self::Rtt,
            "ST" => Self::St,
            "STI" => Self::Sti,
            "STR" => Self::Str,
            "TRAP" => Self::Trap,
            "GETC" => Self::Getc,
            "OUT" => Self::Out,
            "PUTS" => Self::Puts,
            "IN" => Self::In,
            "PUTSP" => Self::Putsp,
            "HALT" => Self::Halt,
            _ => return None,
        })
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum DirKind {
    Orig,
    Fill,
    Blkw,
    Stringz,
    End,
}

impl DirKind {
    fn parse(ident: &str) -> Option<Self> {
        Some(match ident.to_ascii_uppercase().as_str() {
            ".ORIG" => Self::Orig,
            ".FILL" => Self::Fill,
            ".BLKW" => Self::Blkw,
            ".STRINGZ" => Self::Stringz,
            ".END" => Self::End,
            _ => return None,
        })
    }
}

#[derive(Clone, Copy)]
enum Keyword {
    Instr(InstrKind),
    Dir(DirKind),
}

fn parse_keyword(ident: &str) -> Option<Keyword> {
    if let Some(instr) = InstrKind::parse(ident) {
        return Some(Keyword::Instr(instr));
    }
    DirKind::parse(ident).map(Keyword::Dir)
}

fn parse_register(ident: &str) -> Option<u16> {
    match ident.to_ascii_uppercase().as_str() {
        "R0" => Some(0),
        "R1" => Some(1),
        "R2" => Some(2),
        "R3" => Some(3),
        "R4" => Some(4),
        "R5" => Some(5),
        "R6" => Some(6),
        "R7" => Some(7),
        _ => None,
    }
}

/// Range-checks a literal token against the field it is destined for.
///
/// Hex literals are raw bit patterns and must fit unsigned; decimal literals
/// may be negative and are masked down to the field width, so `#16` is a
/// valid imm5 (pattern `10000`) while `0xFF` is not.
fn parse_literal(token: &Token, width: Width) -> Result<u16, AsmError> {
    let bits = width.bits();
    if token.value.contains(['x', 'X']) {
        let Some(value) = encoding::decode_hex(&token.value) else {
            return Err(AsmError::InvalidLiteral {
                position: token.position,
            });
        };
        if bits < 16 {
            let limit = 1u16 << bits;
            if value >= limit {
                return Err(AsmError::OversizedLiteral {
                    position: token.position,
                    limit: limit as i32,
                    value: value as i32,
                });
            }
        }
        Ok(value)
    } else {
        let Some(value) = encoding::decode_int(&token.value) else {
            return Err(AsmError::InvalidLiteral {
                position: token.position,
            });
        };
        if bits < 16 {
            let limit = (1i16 << bits) - 1;
            if value < -limit || value >= limit {
                return Err(AsmError::OversizedLiteral {
                    position: token.position,
                    limit: limit as i32,
                    value: value as i32,
                });
            }
            return Ok((value & limit) as u16);
        }
        Ok(value as u16)
    }
}

fn unescape(s: &str) -> Result<String, ()> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('0') => result.push('\0'),
            Some('\\') => result.push('\\'),
            Some('"') => result.push('"'),
            _ => return Err(()),
        }
    }
    Ok(result)
}

/// Reference to a label from a PC-relative offset field, deferred until the
/// end of the pass in case the label is declared later.
struct LabelRef {
    label: String,
    addr: u16,
    size: Width,
    position: Cursor,
}

/// `.FILL` naming a label that was not yet declared.
struct FillRef {
    label: String,
    addr: u16,
    position: Cursor,
}

enum Flow {
    Next,
    /// `.END` reached; ignore the rest of the input.
    Done,
    /// Emission ran past the address space; abandon everything.
    Abort,
}

struct Assembler<'a> {
    image: Vec<u16>,
    errors: Vec<AsmError>,
    labels: FxHashMap<String, u16>,
    label_refs: Vec<LabelRef>,
    fill_refs: Vec<FillRef>,
    /// Where the next emitted word goes; wider than an address so overflow
    /// is detectable.
    program: u32,
    symtable: Option<&'a mut SymTable>,
}

impl Assembler<'_> {
    fn run(mut self, source: &str) -> (Vec<u16>, Vec<AsmError>) {
        let mut line_no = 0;
        let mut line_byte = 0;

        for raw in source.split('\n') {
            line_no += 1;
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            match self.assemble_line(line, line_no, line_byte) {
                Flow::Next => {}
                Flow::Done => break,
                Flow::Abort => return (self.image, self.errors),
            }
            line_byte += raw.len() + 1;
        }

        self.resolve();
        (self.image, self.errors)
    }

    fn assemble_line(&mut self, line: &str, line_no: usize, line_byte: usize) -> Flow {
        let clean = self.errors.len();
        let tokens = lexer::lex_line(line, line_no, line_byte, &mut self.errors);
        if tokens.is_empty() {
            return Flow::Next;
        }
        // Lexical errors make the token stream untrustworthy; skip assembling
        // this line but keep scanning the rest
        if self.errors.len() > clean {
            return Flow::Next;
        }

        let mut keyword = None;
        let mut operands: &[Token] = &[];

        if let Some(kw) = parse_keyword(&tokens[0].value) {
            keyword = Some((&tokens[0], kw));
            operands = &tokens[1..];
        } else {
            // First token is a label declaration
            let label = &tokens[0];
            if self.labels.contains_key(&label.value) {
                self.errors.push(AsmError::RedeclaredLabel {
                    position: label.position,
                    name: label.value.clone(),
                });
            } else {
                self.labels.insert(label.value.clone(), self.program as u16);
            }

            if tokens.len() == 1 {
                return Flow::Next;
            }
            if let Some(kw) = parse_keyword(&tokens[1].value) {
                keyword = Some((&tokens[1], kw));
                operands = &tokens[2..];
            }
        }

        let Some((keyword_token, keyword)) = keyword else {
            self.errors.push(AsmError::UnknownIdentifier {
                position: tokens[0].position,
                name: tokens[0].value.clone(),
            });
            self.record_symbol(line_byte);
            return Flow::Next;
        };

        let mut emitted = None;
        match keyword {
            Keyword::Dir(DirKind::End) => {
                if !operands.is_empty() {
                    self.errors.push(AsmError::InvalidNumArguments {
                        position: keyword_token.position,
                        required: 0,
                        received: operands.len(),
                    });
                }
                return Flow::Done;
            }
            Keyword::Dir(dir) => self.directive(dir, keyword_token.position, operands),
            Keyword::Instr(kind) => {
                emitted = Some(self.instruction(kind, keyword_token.position, operands));
            }
        }

        self.record_symbol(line_byte);

        if let Some(word) = emitted {
            self.emit(self.program, word);
            self.program += 1;
        }

        if self.program >= 0xFFFF {
            self.errors.push(AsmError::OversizedBinary);
            return Flow::Abort;
        }
        Flow::Next
    }

    fn directive(&mut self, dir: DirKind, position: Cursor, operands: &[Token]) {
        match dir {
            DirKind::Fill => {
                let Some(operand) = self.sole_operand(position, operands) else {
                    return;
                };
                match operand.kind {
                    TokenKind::Literal => {
                        let literal = self.literal(operand, Width::Word);
                        self.emit(self.program, literal);
                    }
                    TokenKind::Ident => match self.labels.get(&operand.value) {
                        Some(&addr) => self.emit(self.program, addr),
                        // Forward reference; resolvable once the label appears
                        None => self.fill_refs.push(FillRef {
                            label: operand.value.clone(),
                            addr: self.program as u16,
                            position: operand.position,
                        }),
                    },
                    _ => self.wrong_operand(operand, &[TokenKind::Literal, TokenKind::Ident]),
                }
                self.program += 1;
            }

            DirKind::Blkw => {
                let Some(operand) = self.sole_operand(position, operands) else {
                    return;
                };
                if operand.kind != TokenKind::Literal {
                    self.wrong_operand(operand, &[TokenKind::Literal]);
                    return;
                }
                let literal = self.literal(operand, Width::Word);
                self.program += literal as u32;
            }

            DirKind::Stringz => {
                let Some(operand) = self.sole_operand(position, operands) else {
                    return;
                };
                if operand.kind != TokenKind::Str {
                    self.wrong_operand(operand, &[TokenKind::Str]);
                    return;
                }
                // Strip the delimiting quotes the lexer kept
                let raw = operand.value.get(1..operand.value.len() - 1).unwrap_or("");
                match unescape(raw) {
                    Ok(text) => {
                        for ch in text.chars() {
                            self.emit(self.program, ch as u16);
                            self.program += 1;
                        }
                    }
                    Err(()) => self.errors.push(AsmError::InvalidString {
                        position: operand.position,
                    }),
                }
                self.emit(self.program, 0);
                self.program += 1;
            }

            DirKind::Orig => {
                let Some(operand) = self.sole_operand(position, operands) else {
                    return;
                };
                if operand.kind != TokenKind::Literal {
                    self.wrong_operand(operand, &[TokenKind::Literal]);
                    return;
                }
                let literal = self.literal(operand, Width::Word);
                self.program = literal as u32;
            }

            DirKind::End => unreachable!("handled before dispatch"),
        }
    }

    fn instruction(&mut self, kind: InstrKind, position: Cursor, operands: &[Token]) -> u16 {
        let mut scratch: u16 = 0;

        match kind {
            // ADD: DR, SR1, SR2 | DR, SR1, imm5
            // AND: DR, SR1, SR2 | DR, SR1, imm5
            InstrKind::Add | InstrKind::And => {
                if !self.expect_argc(position, operands, 3) {
                    return scratch;
                }
                scratch |= if kind == InstrKind::Add { 0b0001 } else { 0b0101 };
                self.register_fields(&operands[..2], &mut scratch);

                let last = &operands[2];
                match last.kind {
                    TokenKind::Ident => {
                        let reg = self.register(last);
                        scratch <<= 6;
                        scratch |= reg & 0x7;
                    }
                    TokenKind::Literal => {
                        let literal = self.literal(last, Width::Imm5);
                        scratch <<= 1;
                        scratch |= 0x1;
                        scratch <<= 5;
                        scratch |= literal & 0x1F;
                    }
                    _ => self.wrong_operand(last, &[TokenKind::Literal, TokenKind::Ident]),
                }
            }

            // BR[nzp]: LABEL
            InstrKind::Br(flags) => {
                if !self.expect_argc(position, operands, 1) {
                    return scratch;
                }
                scratch |= flags;
                if operands[0].kind != TokenKind::Ident {
                    self.wrong_operand(&operands[0], &[TokenKind::Ident]);
                    return scratch;
                }
                self.defer_label(&operands[0], Width::PcOffset9);
                scratch <<= 9;
            }

            // JMP: BaseR. JMPT additionally drops privilege (bit 0)
            InstrKind::Jmp | InstrKind::Jmpt => {
                if !self.expect_argc(position, operands, 1) {
                    return scratch;
                }
                if operands[0].kind != TokenKind::Ident {
                    self.wrong_operand(&operands[0], &[TokenKind::Ident]);
                    return scratch;
                }
                scratch |= 0b1100;
                scratch <<= 6;
                scratch |= self.register(&operands[0]) & 0x7;
                scratch <<= 6;
                if kind == InstrKind::Jmpt {
                    scratch |= 0x1;
                }
            }

            // RET / RTT: JMP through R7
            InstrKind::Ret => {
                self.expect_argc(position, operands, 0);
                scratch = 0b1100_000_111_000000;
            }
            InstrKind::Rtt => {
                self.expect_argc(position, operands, 0);
                scratch = 0b1100_000_111_000001;
            }

            // JSR: LABEL (PCoffset11)
            InstrKind::Jsr => {
                if !self.expect_argc(position, operands, 1) {
                    return scratch;
                }
                if operands[0].kind != TokenKind::Ident {
                    self.wrong_operand(&operands[0], &[TokenKind::Ident]);
                    return scratch;
                }
                scratch |= 0b0100;
                scratch <<= 1;
                scratch |= 0x1;
                self.defer_label(&operands[0], Width::PcOffset11);
                scratch <<= 11;
            }

            // JSRR: BaseR
            InstrKind::Jsrr => {
                if !self.expect_argc(position, operands, 1) {
                    return scratch;
                }
                if operands[0].kind != TokenKind::Ident {
                    self.wrong_operand(&operands[0], &[TokenKind::Ident]);
                    return scratch;
                }
                scratch |= 0b0100;
                scratch <<= 6;
                scratch |= self.register(&operands[0]) & 0x7;
                scratch <<= 6;
            }

            // LD/LDI/LEA/ST/STI: reg, LABEL (PCoffset9)
            InstrKind::Ld | InstrKind::Ldi | InstrKind::Lea | InstrKind::St | InstrKind::Sti => {
                if !self.expect_argc(position, operands, 2) {
                    return scratch;
                }
                scratch |= match kind {
                    InstrKind::Ld => 0b0010,
                    InstrKind::Ldi => 0b1010,
                    InstrKind::Lea => 0b1110,
                    InstrKind::St => 0b0011,
                    InstrKind::Sti => 0b1011,
                    _ => unreachable!(),
                };

                if operands[0].kind != TokenKind::Ident {
                    self.wrong_operand(&operands[0], &[TokenKind::Ident]);
                } else {
                    match parse_register(&operands[0].value) {
                        Some(reg) => {
                            scratch <<= 3;
                            scratch |= reg & 0x7;
                        }
                        None => self.errors.push(AsmError::InvalidRegister {
                            position: operands[0].position,
                        }),
                    }
                }

                if operands[1].kind != TokenKind::Ident {
                    self.wrong_operand(&operands[1], &[TokenKind::Ident]);
                    return scratch;
                }
                self.defer_label(&operands[1], Width::PcOffset9);
                scratch <<= 9;
            }

            // LDR/STR: reg, BaseR, offset6
            InstrKind::Ldr | InstrKind::Str => {
                if !self.expect_argc(position, operands, 3) {
                    return scratch;
                }
                scratch |= if kind == InstrKind::Ldr { 0b0110 } else { 0b0111 };
                self.register_fields(&operands[..2], &mut scratch);

                if operands[2].kind != TokenKind::Literal {
                    self.wrong_operand(&operands[2], &[TokenKind::Literal]);
                    return scratch;
                }
                let literal = self.literal(&operands[2], Width::Offset6);
                scratch <<= 6;
                scratch |= literal & 0x3F;
            }

            // NOT: DR, SR
            InstrKind::Not => {
                if !self.expect_argc(position, operands, 2) {
                    return scratch;
                }
                scratch |= 0b1001;
                self.register_fields(&operands[..2], &mut scratch);
                scratch <<= 6;
                scratch |= 0x3F;
            }

            InstrKind::Rti => {
                if !self.expect_argc(position, operands, 0) {
                    return scratch;
                }
                scratch = 0b1000_0000_0000_0000;
            }

            // TRAP and the named service routines it aliases
            InstrKind::Trap
            | InstrKind::Getc
            | InstrKind::Out
            | InstrKind::Puts
            | InstrKind::In
            | InstrKind::Putsp
            | InstrKind::Halt => {
                if kind == InstrKind::Trap {
                    if !self.expect_argc(position, operands, 1) {
                        return scratch;
                    }
                    if operands[0].kind != TokenKind::Literal {
                        self.wrong_operand(&operands[0], &[TokenKind::Literal]);
                        return scratch;
                    }
                } else {
                    self.expect_argc(position, operands, 0);
                }

                scratch |= 0b1111;
                let trap = match kind {
                    InstrKind::Getc => 0x20,
                    InstrKind::Out => 0x21,
                    InstrKind::Puts => 0x22,
                    InstrKind::In => 0x23,
                    InstrKind::Putsp => 0x24,
                    InstrKind::Halt => 0x25,
                    _ => self.literal(&operands[0], Width::Trapvec8),
                };
                scratch <<= 12;
                scratch |= trap & 0xFF;
            }
        }

        scratch
    }

    /// Resolves deferred label and fill references, now that every label
    /// declaration has been seen, and copies labels into the symbol table.
    fn resolve(&mut self) {
        for r in std::mem::take(&mut self.label_refs) {
            match self.labels.get(&r.label) {
                None => self.errors.push(AsmError::UnknownLabel {
                    position: r.position,
                    name: r.label,
                }),
                Some(&addr) => {
                    let limit = 1i64 << (r.size.bits() - 1);
                    // Offsets are relative to the incremented PC
                    let offset = addr as i64 - r.addr as i64 - 1;
                    if offset < -limit || offset >= limit {
                        self.errors.push(AsmError::OversizedLabel {
                            position: r.position,
                            limit,
                            offset,
                        });
                    } else if let Some(slot) = self.image.get_mut(r.addr as usize) {
                        *slot |= (offset as u16) & ((1u16 << r.size.bits()) - 1);
                    }
                }
            }
        }

        if let Some(table) = self.symtable.as_deref_mut() {
            for (label, addr) in &self.labels {
                table.labels.insert(*addr, label.clone());
            }
        }

        for r in std::mem::take(&mut self.fill_refs) {
            match self.labels.get(&r.label) {
                None => self.errors.push(AsmError::UnknownLabel {
                    position: r.position,
                    name: r.label,
                }),
                Some(&addr) => {
                    if let Some(slot) = self.image.get_mut(r.addr as usize) {
                        *slot = addr;
                    }
                }
            }
        }
    }

    fn emit(&mut self, addr: u32, word: u16) {
        // Out-of-range emission is reported as OversizedBinary at the end of
        // the line; never let it write out of bounds
        if let Some(slot) = self.image.get_mut(addr as usize) {
            *slot = word;
        }
    }

    fn record_symbol(&mut self, line_byte: usize) {
        if let Some(table) = self.symtable.as_deref_mut() {
            table.symbols.insert(self.program as u16, line_byte as i64);
        }
    }

    fn defer_label(&mut self, token: &Token, size: Width) {
        self.label_refs.push(LabelRef {
            label: token.value.clone(),
            addr: self.program as u16,
            size,
            position: token.position,
        });
    }

    /// Encodes two register operands into consecutive 3-bit fields, skipping
    /// the shift for operands of the wrong kind so one bad operand yields
    /// exactly one error.
    fn register_fields(&mut self, operands: &[Token], scratch: &mut u16) {
        for tok in operands {
            if tok.kind != TokenKind::Ident {
                self.wrong_operand(tok, &[TokenKind::Ident]);
                continue;
            }
            let reg = self.register(tok);
            *scratch <<= 3;
            *scratch |= reg & 0x7;
        }
    }

    fn register(&mut self, token: &Token) -> u16 {
        match parse_register(&token.value) {
            Some(reg) => reg,
            None => {
                self.errors.push(AsmError::InvalidRegister {
                    position: token.position,
                });
                0
            }
        }
    }

    fn literal(&mut self, token: &Token, width: Width) -> u16 {
        match parse_literal(token, width) {
            Ok(value) => value,
            Err(err) => {
                self.errors.push(err);
                0
            }
        }
    }

    fn expect_argc(&mut self, position: Cursor, operands: &[Token], required: usize) -> bool {
        if operands.len() != required {
            self.errors.push(AsmError::InvalidNumArguments {
                position,
                required,
                received: operands.len(),
            });
            return false;
        }
        true
    }

    fn sole_operand<'t>(&mut self, position: Cursor, operands: &'t [Token]) -> Option<&'t Token> {
        if operands.len() != 1 {
            self.errors.push(AsmError::InvalidNumArguments {
                position,
                required: 1,
                received: operands.len(),
            });
            return None;
        }
        Some(&operands[0])
    }

    fn wrong_operand(&mut self, token: &Token, required: &[TokenKind]) {
        self.errors.push(AsmError::InvalidOperand {
            position: token.position,
            required: required.to_vec(),
            received: token.kind,
        });
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn assemble_clean(src: &str) -> Vec<u16> {
        let (image, errors) = assemble(src, None);
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
        image
    }

    #[test]
    fn add_register() {
        let image = assemble_clean("ADD R0, R1, R2");
        assert_eq!(image[0], 0b0001_000_001_0_00_010);
        assert_eq!(image.len(), IMAGE_WORDS);
    }

    #[test]
    fn add_immediate() {
        let image = assemble_clean("ADD R0, R1, #16");
        assert_eq!(image[0], 0b0001_000_001_1_10000);
    }

    #[test]
    fn forward_branch() {
        let image = assemble_clean("BR LABEL\nHALT\nHALT\nLABEL");
        assert_eq!(image[0], 0b0000_000_000000010);
    }

    #[test]
    fn fill_label_forward() {
        let image = assemble_clean(".FILL LABEL\nLABEL RET\nHALT");
        assert_eq!(image[0], 0x0001);
        assert_eq!(image[1], 0b1100_000_111_000000);
    }

    #[test]
    fn lexical_error_suppresses_line() {
        // The stray '-' is a lexical error, so the ADD is not type-checked
        let (_, errors) = assemble("ADD R0, R1, -", None);
        assert!(matches!(
            errors.as_slice(),
            [AsmError::UnexpectedCharacter { received: '-', .. }]
        ));
    }

    #[test]
    fn unknown_statement() {
        let (_, errors) = assemble("FOO BAR", None);
        assert!(
            matches!(errors.as_slice(), [AsmError::UnknownIdentifier { name, .. }] if name == "FOO")
        );
    }
}
