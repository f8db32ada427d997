use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use strum::{Display, EnumCount, EnumIter, EnumString, IntoStaticStr};

pub type Reg = Register;

/// The 32 general-purpose registers, named the way assembly source refers to them.
///
/// The discriminant is the 5-bit index stored in the rs/rt/rd fields of a machine word.
#[repr(u32)]
#[derive(
    EnumIter,
    EnumString,
    EnumCount,
    Display,
    IntoStaticStr,
    FromPrimitive,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
)]
pub enum Register {
    #[strum(to_string = "$zero")]
    Zero = 0,
    #[strum(to_string = "$at")]
    At = 1, // assembler temporary
    #[strum(to_string = "$v0")]
    V0 = 2, // return values
    #[strum(to_string = "$v1")]
    V1 = 3,
    #[strum(to_string = "$a0")]
    A0 = 4, // arguments
    #[strum(to_string = "$a1")]
    A1 = 5,
    #[strum(to_string = "$a2")]
    A2 = 6,
    #[strum(to_string = "$a3")]
    A3 = 7,
    #[strum(to_string = "$t0")]
    T0 = 8, // caller-saved temporaries
    #[strum(to_string = "$t1")]
    T1 = 9,
    #[strum(to_string = "$t2")]
    T2 = 10,
    #[strum(to_string = "$t3")]
    T3 = 11,
    #[strum(to_string = "$t4")]
    T4 = 12,
    #[strum(to_string = "$t5")]
    T5 = 13,
    #[strum(to_string = "$t6")]
    T6 = 14,
    #[strum(to_string = "$t7")]
    T7 = 15,
    #[strum(to_string = "$s0")]
    S0 = 16, // callee-saved
    #[strum(to_string = "$s1")]
    S1 = 17,
    #[strum(to_string = "$s2")]
    S2 = 18,
    #[strum(to_string = "$s3")]
    S3 = 19,
    #[strum(to_string = "$s4")]
    S4 = 20,
    #[strum(to_string = "$s5")]
    S5 = 21,
    #[strum(to_string = "$s6")]
    S6 = 22,
    #[strum(to_string = "$s7")]
    S7 = 23,
    #[strum(to_string = "$t8")]
    T8 = 24,
    #[strum(to_string = "$t9")]
    T9 = 25,
    #[strum(to_string = "$k0")]
    K0 = 26, // kernel reserved
    #[strum(to_string = "$k1")]
    K1 = 27,
    #[strum(to_string = "$gp")]
    GP = 28, // global pointer
    #[strum(to_string = "$sp")]
    SP = 29, // stack pointer
    #[strum(to_string = "$fp")]
    FP = 30, // frame pointer
    #[strum(to_string = "$ra")]
    RA = 31, // return address
}

const FIELD_MASK: u32 = 0b11111;

impl Register {
    /// Looks up a register by its assembly name (`$t0`, `$zero`, ...). Matching is exact.
    pub fn parse(name: impl AsRef<str>) -> Option<Self> {
        name.as_ref().parse().ok()
    }

    pub fn index(self) -> u32 {
        self as u32
    }

    /// Reads the 5-bit register field whose least significant bit sits at `lsb`.
    pub fn from_field(word: u32, lsb: u32) -> Self {
        let index = (word >> lsb) & FIELD_MASK;
        Self::from_u32(index)
            .unwrap_or_else(|| unreachable!("5-bit register field holds {}", index))
    }

    /// Places this register's index into the field whose least significant bit sits at `lsb`.
    pub fn to_field(self, lsb: u32) -> u32 {
        (self.index() & FIELD_MASK) << lsb
    }

    pub fn name(self) -> &'static str {
        self.into()
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn name_table_has_32_entries() {
        assert_eq!(Register::COUNT, 32);
        assert_eq!(Register::iter().count(), 32);
    }

    #[test]
    fn names_follow_conventional_order() {
        assert_eq!(Register::parse("$zero"), Some(Register::Zero));
        assert_eq!(Register::parse("$t0"), Some(Register::T0));
        assert_eq!(Register::parse("$t8"), Some(Register::T8));
        assert_eq!(Register::parse("$ra"), Some(Register::RA));
        assert_eq!(Register::T0.index(), 8);
        assert_eq!(Register::T8.index(), 24);
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert_eq!(Register::parse("t0"), None);
        assert_eq!(Register::parse("$T0"), None);
        assert_eq!(Register::parse("$32"), None);
        assert_eq!(Register::parse(""), None);
    }

    #[test]
    fn every_register_survives_every_field_position() {
        for reg in Register::iter() {
            let name = reg.to_string();
            let parsed = Register::parse(&name).unwrap();
            assert_eq!(parsed, reg);
            assert_eq!(parsed.name(), name);

            for lsb in [11, 16, 21] {
                let word = reg.to_field(lsb);
                assert_eq!(Register::from_field(word, lsb), reg);
            }
        }
    }

    #[test]
    fn from_field_ignores_neighbouring_bits() {
        let word = (0xffff_ffff & !(FIELD_MASK << 16)) | Register::S3.to_field(16);
        assert_eq!(Register::from_field(word, 16), Register::S3);
    }
}
