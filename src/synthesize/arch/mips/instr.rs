#![allow(clippy::unusual_byte_groupings)]

use std::fmt;

use ux::u5;

use super::reg::Register;

const OPCODE_LSB: u32 = 26;
const RS_LSB: u32 = 21;
const RT_LSB: u32 = 16;
const RD_LSB: u32 = 11;
const SHAMT_LSB: u32 = 6;

const FUNCT_MASK: u32 = 0b111111;
const SHAMT_MASK: u32 = 0b11111;
const IMM_MASK: u32 = 0xffff;

/// Primary opcode field (bits 31-26).
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Special = 0x00,
    Beq = 0x04,
    Bne = 0x05,
    Addi = 0x08,
    Andi = 0x0C,
}

/// Function field (bits 5-0) of words whose opcode is [Special](Opcode::Special).
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Funct {
    Sll = 0x00,
    Srl = 0x02,
    Add = 0x20,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("unsupported opcode {0:#04x}")]
    Opcode(u32),
    #[error("unsupported function code {0:#04x}")]
    Funct(u32),
}

/// One decoded machine instruction.
///
/// Encoding, R-type (opcode 0):
/// 31 30 29 28 27 26 25 24 23 22 21 20 19 18 17 16 15 14 13 12 11 10 9  8  7  6  5  4  3  2  1  0
/// 0  0  0  0  0  0  rs             rt             rd             shamt          funct
///
/// Encoding, I-type:
/// 31 30 29 28 27 26 25 24 23 22 21 20 19 18 17 16 15 14 13 12 11 10 9  8  7  6  5  4  3  2  1  0
/// opcode            rs             rt             imm16
///
/// - imm16: two's complement, sign-extended on decode. For branches it counts instructions past
///   the one following the branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Nop,
    /// `rd = rt + rs`
    Add {
        rd: Register,
        rs: Register,
        rt: Register,
    },
    Sll {
        rd: Register,
        rt: Register,
        shamt: u5,
    },
    /// Logical right shift.
    Srl {
        rd: Register,
        rt: Register,
        shamt: u5,
    },
    Addi {
        rt: Register,
        rs: Register,
        imm: i16,
    },
    Andi {
        rt: Register,
        rs: Register,
        imm: i16,
    },
    Beq {
        rs: Register,
        rt: Register,
        offset: i16,
    },
    Bne {
        rs: Register,
        rt: Register,
        offset: i16,
    },
}

impl Instruction {
    pub fn encode(&self) -> u32 {
        match *self {
            Self::Nop => 0,
            Self::Add { rd, rs, rt } => r_type(rs, rt, rd, 0, Funct::Add),
            Self::Sll { rd, rt, shamt } => {
                r_type(Register::Zero, rt, rd, shamt.into(), Funct::Sll)
            }
            Self::Srl { rd, rt, shamt } => {
                r_type(Register::Zero, rt, rd, shamt.into(), Funct::Srl)
            }
            Self::Addi { rt, rs, imm } => i_type(Opcode::Addi, rs, rt, imm),
            Self::Andi { rt, rs, imm } => i_type(Opcode::Andi, rs, rt, imm),
            Self::Beq { rs, rt, offset } => i_type(Opcode::Beq, rs, rt, offset),
            Self::Bne { rs, rt, offset } => i_type(Opcode::Bne, rs, rt, offset),
        }
    }

    /// Classifies a machine word by its opcode (and function field for opcode 0).
    ///
    /// An all-zero word is always a NOP, without looking at any field.
    pub fn decode(word: u32) -> Result<Self, DecodeError> {
        if word == 0 {
            return Ok(Self::Nop);
        }

        let rs = Register::from_field(word, RS_LSB);
        let rt = Register::from_field(word, RT_LSB);
        let rd = Register::from_field(word, RD_LSB);
        let shamt = u5::new(((word >> SHAMT_LSB) & SHAMT_MASK) as u8);
        let imm = (word & IMM_MASK) as u16 as i16;

        let instr = match word >> OPCODE_LSB {
            0x00 => match word & FUNCT_MASK {
                0x20 => Self::Add { rd, rs, rt },
                0x00 => Self::Sll { rd, rt, shamt },
                0x02 => Self::Srl { rd, rt, shamt },
                funct => return Err(DecodeError::Funct(funct)),
            },
            0x08 => Self::Addi { rt, rs, imm },
            0x0C => Self::Andi { rt, rs, imm },
            0x04 => Self::Beq { rs, rt, offset: imm },
            0x05 => Self::Bne { rs, rt, offset: imm },
            opcode => return Err(DecodeError::Opcode(opcode)),
        };

        Ok(instr)
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            Self::Nop => "nop",
            Self::Add { .. } => "add",
            Self::Sll { .. } => "sll",
            Self::Srl { .. } => "srl",
            Self::Addi { .. } => "addi",
            Self::Andi { .. } => "andi",
            Self::Beq { .. } => "beq",
            Self::Bne { .. } => "bne",
        }
    }

    pub fn format(&self) -> Format {
        match self {
            Self::Nop | Self::Add { .. } | Self::Sll { .. } | Self::Srl { .. } => Format::R,
            Self::Addi { .. } | Self::Andi { .. } | Self::Beq { .. } | Self::Bne { .. } => {
                Format::I
            }
        }
    }
}

/// Instruction class, recovered from the opcode field alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Format {
    #[display("R")]
    R,
    #[display("I")]
    I,
}

/// Disassembles back into source syntax. Branch targets print as raw offsets.
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.mnemonic();
        match *self {
            Self::Nop => write!(f, "{m}"),
            Self::Add { rd, rs, rt } => write!(f, "{m} {rd}, {rs}, {rt}"),
            Self::Sll { rd, rt, shamt } | Self::Srl { rd, rt, shamt } => {
                write!(f, "{m} {rd}, {rt}, {shamt}")
            }
            Self::Addi { rt, rs, imm } | Self::Andi { rt, rs, imm } => {
                write!(f, "{m} {rt}, {rs}, {imm}")
            }
            Self::Beq { rs, rt, offset } | Self::Bne { rs, rt, offset } => {
                write!(f, "{m} {rs}, {rt}, {offset:+}")
            }
        }
    }
}

fn r_type(rs: Register, rt: Register, rd: Register, shamt: u32, funct: Funct) -> u32 {
    ((Opcode::Special as u32) << OPCODE_LSB)
        | rs.to_field(RS_LSB)
        | rt.to_field(RT_LSB)
        | rd.to_field(RD_LSB)
        | ((shamt & SHAMT_MASK) << SHAMT_LSB)
        | funct as u32
}

fn i_type(opcode: Opcode, rs: Register, rt: Register, imm: i16) -> u32 {
    ((opcode as u32) << OPCODE_LSB)
        | rs.to_field(RS_LSB)
        | rt.to_field(RT_LSB)
        | (imm as u16 as u32)
}
