use crate::synthesize::arch::Address;

pub const MAX_PROGRAM_LEN: usize = 250;
pub const MAX_LINE_LEN: usize = 50;
pub const MAX_TOKEN_LEN: usize = 20;
/// Start of the text segment the program is loaded into.
pub const TEXT_BASE: u32 = 0x0040_0000;

/// Capacity limits for source programs and the address the image is loaded at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub max_program_len: usize,
    /// Characters per line, not counting the line terminator.
    pub max_line_len: usize,
    pub max_token_len: usize,
    pub base_address: Address,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_program_len: MAX_PROGRAM_LEN,
            max_line_len: MAX_LINE_LEN,
            max_token_len: MAX_TOKEN_LEN,
            base_address: Address(TEXT_BASE),
        }
    }
}
