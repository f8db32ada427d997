use std::fmt;

use crate::{
    exec::alu::Effect,
    synthesize::arch::{Address, mips::instr::Instruction},
};

/// A record of one executed instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trace {
    pub address: Address,
    pub word: u32,
    pub instruction: Instruction,
    pub effect: Effect,
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let disasm = self.instruction.to_string();
        write!(
            f,
            "{}  {:#010x}  [{}] {:<22} {}",
            self.address,
            self.word,
            self.instruction.format(),
            disasm,
            self.effect
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthesize::arch::mips::reg::Reg;

    #[test]
    fn trace_line_shows_class_registers_and_value() {
        let trace = Trace {
            address: Address(0x0040_0008),
            word: 0x2129_0001,
            instruction: Instruction::Addi {
                rt: Reg::T1,
                rs: Reg::T1,
                imm: 1,
            },
            effect: Effect::Write {
                reg: Reg::T1,
                value: 1,
            },
        };

        let line = trace.to_string();
        assert!(line.starts_with("0x00400008  0x21290001  [I] addi $t1, $t1, 1"));
        assert!(line.ends_with("$t1 = 1"));
    }
}
