use std::ops::{Index, IndexMut};

use strum::IntoEnumIterator;
use tracing::{info, trace};

use crate::{
    exec::{alu::Effect, trace::Trace},
    synthesize::arch::{
        Address, Program,
        mips::{
            instr::{DecodeError, Instruction},
            reg::Register,
        },
    },
};

pub mod alu;
pub mod trace;

/// The 32 general-purpose registers, all zero at power-on.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RegisterFile {
    regs: [u32; 32],
}

impl RegisterFile {
    pub fn signed(&self, reg: Register) -> i32 {
        self[reg] as i32
    }

    pub fn iter(&self) -> impl Iterator<Item = (Register, u32)> + '_ {
        Register::iter().map(|reg| (reg, self[reg]))
    }
}

impl Index<Register> for RegisterFile {
    type Output = u32;

    fn index(&self, reg: Register) -> &Self::Output {
        &self.regs[reg.index() as usize]
    }
}

impl IndexMut<Register> for RegisterFile {
    fn index_mut(&mut self, reg: Register) -> &mut Self::Output {
        &mut self.regs[reg.index() as usize]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecError {
    #[error("illegal instruction {word:#010x} at {address}")]
    IllegalInstruction {
        address: Address,
        word: u32,
        source: DecodeError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub steps: u64,
    /// Cursor after the last step; outside the program image.
    pub cursor: i64,
    pub pc: Address,
}

/// Fetch-decode-execute loop over a [Program].
///
/// The cursor indexes the program image. The program counter is derived from it and carries no
/// state of its own. Execution ends once the cursor leaves the image in either direction.
pub struct Machine<'p> {
    program: &'p Program,
    registers: RegisterFile,
    cursor: i64,
}

impl<'p> Machine<'p> {
    pub fn new(program: &'p Program) -> Self {
        Self {
            program,
            registers: RegisterFile::default(),
            cursor: 0,
        }
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    pub fn pc(&self) -> Address {
        self.program.address_of(self.cursor)
    }

    pub fn is_halted(&self) -> bool {
        self.program.fetch(self.cursor).is_none()
    }

    /// Executes the instruction under the cursor. Returns `None` once the machine has halted.
    pub fn step(&mut self) -> Result<Option<Trace>, ExecError> {
        let Some(word) = self.program.fetch(self.cursor) else {
            return Ok(None);
        };

        let address = self.pc();
        let instruction =
            Instruction::decode(word).map_err(|source| ExecError::IllegalInstruction {
                address,
                word,
                source,
            })?;

        let effect = alu::execute(instruction, &mut self.registers);
        self.advance(effect);

        let step = Trace {
            address,
            word,
            instruction,
            effect,
        };
        trace!(%step, "executed");

        Ok(Some(step))
    }

    /// Steps until the cursor leaves the program, handing every trace to `observe`.
    pub fn run(&mut self, mut observe: impl FnMut(&Trace)) -> Result<RunSummary, ExecError> {
        let mut steps = 0;
        while let Some(step) = self.step()? {
            observe(&step);
            steps += 1;
        }

        let summary = RunSummary {
            steps,
            cursor: self.cursor,
            pc: self.pc(),
        };
        info!(steps, pc = %summary.pc, "execution finished");

        Ok(summary)
    }

    fn advance(&mut self, effect: Effect) {
        self.cursor = self.cursor.wrapping_add(1).wrapping_add(effect.delta());
    }
}
