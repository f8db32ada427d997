use derive_more::{Deref, Display, From, Into};

use crate::{analyze::Error, analyze::lex::Line, config::Config};

pub mod mips;

/// A base-relative byte address in the text segment.
#[derive(Debug, Display, From, Into, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[display("0x{_0:08x}")]
pub struct Address(pub u32);

/// The assembled program image: one 32-bit word per source line, in execution order.
///
/// Built once by an [Assemble] implementation and read-only afterwards.
#[derive(Debug, Clone, Deref, PartialEq, Eq)]
pub struct Program {
    #[deref]
    words: Vec<u32>,
    base_address: Address,
}

impl Program {
    pub fn new(words: Vec<u32>, base_address: Address) -> Self {
        Self {
            words,
            base_address,
        }
    }

    pub fn words(&self) -> &[u32] {
        &self.words
    }

    pub fn base_address(&self) -> Address {
        self.base_address
    }

    /// Address of the word at `index`. Indices outside the image are still mapped, since the
    /// program counter is derived from the cursor even after execution leaves the program.
    pub fn address_of(&self, index: i64) -> Address {
        let offset = index.wrapping_mul(4);
        Address((i64::from(self.base_address.0).wrapping_add(offset)) as u32)
    }

    /// Fetches the word at `index`, or `None` once the index falls outside the image.
    pub fn fetch(&self, index: i64) -> Option<u32> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.words.get(i).copied())
    }

    /// `(address, word)` pairs in program order.
    pub fn listing(&self) -> impl Iterator<Item = (Address, u32)> + '_ {
        self.words
            .iter()
            .enumerate()
            .map(|(i, word)| (self.address_of(i as i64), *word))
    }
}

pub trait Assemble {
    fn assemble(lines: &[Line], config: &Config) -> Result<Program, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program() -> Program {
        Program::new(vec![0x2008_0005, 0, 0x1528_fffe], Address(0x0040_0000))
    }

    #[test]
    fn addresses_are_word_aligned_from_base() {
        let program = program();
        assert_eq!(program.address_of(0), Address(0x0040_0000));
        assert_eq!(program.address_of(2), Address(0x0040_0008));
        assert_eq!(program.address_of(3), Address(0x0040_000c));
        assert_eq!(program.address_of(-1), Address(0x003f_fffc));
    }

    #[test]
    fn fetch_outside_image_is_none() {
        let program = program();
        assert_eq!(program.fetch(0), Some(0x2008_0005));
        assert_eq!(program.fetch(1), Some(0));
        assert_eq!(program.fetch(3), None);
        assert_eq!(program.fetch(-1), None);
    }

    #[test]
    fn listing_pairs_addresses_with_words() {
        let listing: Vec<_> = program().listing().collect();
        assert_eq!(
            listing,
            vec![
                (Address(0x0040_0000), 0x2008_0005),
                (Address(0x0040_0004), 0),
                (Address(0x0040_0008), 0x1528_fffe),
            ]
        );
    }

    #[test]
    fn address_displays_as_hex() {
        assert_eq!(Address(0x0040_0004).to_string(), "0x00400004");
    }

    #[test]
    fn derefs_to_words() {
        let program = program();
        assert_eq!(program.len(), 3);
        assert!(!program.is_empty());
    }
}
