use std::fmt;

use crate::{
    exec::RegisterFile,
    synthesize::arch::mips::{instr::Instruction, reg::Register},
};

/// What executing one instruction did to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    Write { reg: Register, value: u32 },
    Branch { taken: bool, offset: i16 },
}

impl Effect {
    /// Extra instructions to skip on top of the normal one-instruction advance.
    pub fn delta(&self) -> i64 {
        match *self {
            Effect::Branch {
                taken: true,
                offset,
            } => i64::from(offset),
            _ => 0,
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Effect::None => write!(f, "-"),
            Effect::Write { reg, value } => write!(f, "{reg} = {}", value as i32),
            Effect::Branch {
                taken: true,
                offset,
            } => write!(f, "taken ({offset:+})"),
            Effect::Branch { taken: false, .. } => write!(f, "not taken"),
        }
    }
}

/// Applies `instr` to the register file.
///
/// Arithmetic wraps on overflow; no instruction traps.
pub fn execute(instr: Instruction, regs: &mut RegisterFile) -> Effect {
    match instr {
        Instruction::Nop => Effect::None,
        Instruction::Add { rd, rs, rt } => {
            let value = regs[rt].wrapping_add(regs[rs]);
            write(regs, rd, value)
        }
        Instruction::Sll { rd, rt, shamt } => {
            let value = regs[rt] << u32::from(shamt);
            write(regs, rd, value)
        }
        Instruction::Srl { rd, rt, shamt } => {
            let value = regs[rt] >> u32::from(shamt);
            write(regs, rd, value)
        }
        Instruction::Addi { rt, rs, imm } => {
            let value = (regs[rs] as i32).wrapping_add(i32::from(imm));
            write(regs, rt, value as u32)
        }
        Instruction::Andi { rt, rs, imm } => {
            let value = regs[rs] & (i32::from(imm) as u32);
            write(regs, rt, value)
        }
        Instruction::Beq { rs, rt, offset } => Effect::Branch {
            taken: regs[rt] == regs[rs],
            offset,
        },
        Instruction::Bne { rs, rt, offset } => Effect::Branch {
            taken: regs[rt] != regs[rs],
            offset,
        },
    }
}

fn write(regs: &mut RegisterFile, reg: Register, value: u32) -> Effect {
    regs[reg] = value;
    Effect::Write { reg, value }
}

#[cfg(test)]
mod tests {
    use ux::u5;

    use super::*;
    use crate::synthesize::arch::mips::reg::Reg;

    fn regs(values: &[(Register, u32)]) -> RegisterFile {
        let mut regs = RegisterFile::default();
        for (reg, value) in values {
            regs[*reg] = *value;
        }
        regs
    }

    // ---- arithmetic ----

    #[test]
    fn add_sums_rt_and_rs() {
        let mut r = regs(&[(Reg::T1, 40), (Reg::T2, 2)]);
        let effect = execute(
            Instruction::Add {
                rd: Reg::T0,
                rs: Reg::T1,
                rt: Reg::T2,
            },
            &mut r,
        );

        assert_eq!(r[Reg::T0], 42);
        assert_eq!(
            effect,
            Effect::Write {
                reg: Reg::T0,
                value: 42
            }
        );
        assert_eq!(effect.delta(), 0);
    }

    #[test]
    fn add_wraps() {
        let mut r = regs(&[(Reg::T1, u32::MAX), (Reg::T2, 2)]);
        execute(
            Instruction::Add {
                rd: Reg::T0,
                rs: Reg::T1,
                rt: Reg::T2,
            },
            &mut r,
        );
        assert_eq!(r[Reg::T0], 1);
    }

    #[test]
    fn addi_sign_extends() {
        let mut r = regs(&[(Reg::T1, 3)]);
        execute(
            Instruction::Addi {
                rt: Reg::T0,
                rs: Reg::T1,
                imm: -5,
            },
            &mut r,
        );
        assert_eq!(r[Reg::T0] as i32, -2);
        assert_eq!(r.signed(Reg::T0), -2);
    }

    #[test]
    fn andi_uses_sign_extended_immediate() {
        let mut r = regs(&[(Reg::T1, 0xdead_beef)]);

        execute(
            Instruction::Andi {
                rt: Reg::T0,
                rs: Reg::T1,
                imm: 0x00ff,
            },
            &mut r,
        );
        assert_eq!(r[Reg::T0], 0xef);

        execute(
            Instruction::Andi {
                rt: Reg::T0,
                rs: Reg::T1,
                imm: -16,
            },
            &mut r,
        );
        assert_eq!(r[Reg::T0], 0xdead_bee0);
    }

    // ---- shifts ----

    #[test]
    fn sll_shifts_rt() {
        let mut r = regs(&[(Reg::T1, 0b1011)]);
        execute(
            Instruction::Sll {
                rd: Reg::T0,
                rt: Reg::T1,
                shamt: u5::new(4),
            },
            &mut r,
        );
        assert_eq!(r[Reg::T0], 0b1011_0000);
    }

    #[test]
    fn srl_is_logical() {
        let mut r = regs(&[(Reg::T1, 0x8000_0000)]);
        execute(
            Instruction::Srl {
                rd: Reg::T0,
                rt: Reg::T1,
                shamt: u5::new(31),
            },
            &mut r,
        );
        assert_eq!(r[Reg::T0], 1);
    }

    // ---- branches ----

    #[test]
    fn beq_taken_only_when_equal() {
        let mut r = regs(&[(Reg::T0, 7), (Reg::T1, 7)]);
        let beq = Instruction::Beq {
            rs: Reg::T0,
            rt: Reg::T1,
            offset: -3,
        };

        assert_eq!(execute(beq, &mut r).delta(), -3);

        r[Reg::T1] = 8;
        let effect = execute(beq, &mut r);
        assert_eq!(
            effect,
            Effect::Branch {
                taken: false,
                offset: -3
            }
        );
        assert_eq!(effect.delta(), 0);
    }

    #[test]
    fn bne_taken_only_when_different() {
        let mut r = regs(&[(Reg::T0, 1), (Reg::T1, 2)]);
        let bne = Instruction::Bne {
            rs: Reg::T0,
            rt: Reg::T1,
            offset: 5,
        };

        assert_eq!(execute(bne, &mut r).delta(), 5);

        r[Reg::T0] = 2;
        assert_eq!(execute(bne, &mut r).delta(), 0);
    }

    #[test]
    fn nop_changes_nothing() {
        let mut r = regs(&[(Reg::T0, 9)]);
        let before = r.clone();
        assert_eq!(execute(Instruction::Nop, &mut r), Effect::None);
        assert_eq!(r, before);
    }

    // ---- display ----

    #[test]
    fn effects_display() {
        let write = Effect::Write {
            reg: Reg::T1,
            value: (-4i32) as u32,
        };
        assert_eq!(write.to_string(), "$t1 = -4");
        assert_eq!(
            Effect::Branch {
                taken: true,
                offset: -2
            }
            .to_string(),
            "taken (-2)"
        );
        assert_eq!(Effect::None.to_string(), "-");
    }
}
