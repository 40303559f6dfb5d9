use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Debug information produced alongside an assembled image.
///
/// `symbols` maps a code address to the byte offset of the source line that
/// produced the word at that address, letting the debugger list source around
/// any instruction. `labels` maps a code address to the label declared there.
/// Persistence is plain serde; the whole table round-trips verbatim.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize, Debug)]
pub struct SymTable {
    /// Absolute path of the origin assembly file; empty when the source was
    /// not a file.
    pub source: String,
    pub symbols: FxHashMap<u16, i64>,
    pub labels: FxHashMap<u16, String>,
}

impl SymTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Address a label was declared at.
    pub fn address_of(&self, label: &str) -> Option<u16> {
        self.labels
            .iter()
            .find(|(_, name)| name.as_str() == label)
            .map(|(addr, _)| *addr)
    }

    /// Address that maps to the given source line offset, if any instruction
    /// was produced by that line.
    pub fn address_at_offset(&self, offset: i64) -> Option<u16> {
        self.symbols
            .iter()
            .find(|(_, line_byte)| **line_byte == offset)
            .map(|(addr, _)| *addr)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trip() {
        let mut table = SymTable::new();
        table.source = "/tmp/program.asm".to_string();
        table.symbols.insert(0x3000, 13);
        table.symbols.insert(0x300B, 54);
        table.labels.insert(0x3000, "START".to_string());
        table.labels.insert(0x300B, "DONE".to_string());

        let encoded = serde_json::to_string(&table).unwrap();
        let decoded: SymTable = serde_json::from_str(&encoded).unwrap();
        assert_eq!(table, decoded);
    }

    #[test]
    fn label_lookup() {
        let mut table = SymTable::new();
        table.labels.insert(0x3004, "LOOP".to_string());
        assert_eq!(table.address_of("LOOP"), Some(0x3004));
        assert_eq!(table.address_of("NOPE"), None);
    }
}
