use std::ops::Range;

use strum::{Display, EnumIter, EnumString};

/// A whitespace-delimited piece of a source line, with its byte range in the whole source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub range: Range<usize>,
}

impl Token {
    pub fn new(text: impl Into<String>, range: Range<usize>) -> Self {
        Self {
            text: text.into(),
            range,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// The fixed instruction set understood by the assembler.
#[derive(EnumString, EnumIter, Display, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[strum(serialize_all = "lowercase")]
pub enum Mnemonic {
    Nop,
    Add,
    Addi,
    Andi,
    Beq,
    Bne,
    Srl,
    Sll,
}

impl Mnemonic {
    pub fn parse(value: impl AsRef<str>) -> Option<Self> {
        value.as_ref().parse().ok()
    }

    /// Number of operand tokens the mnemonic consumes.
    pub fn operand_count(self) -> usize {
        match self {
            Mnemonic::Nop => 0,
            _ => 3,
        }
    }
}
