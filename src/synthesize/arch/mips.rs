use std::num::IntErrorKind;

use tracing::{debug, info};
use ux::u5;

use crate::{
    analyze::{
        Error, ErrorKind,
        label::LabelTable,
        lex::{
            Line,
            token::{Mnemonic, Token},
        },
    },
    config::Config,
    synthesize::arch::{
        Assemble, Program,
        mips::{instr::Instruction, reg::Register},
    },
};

pub mod instr;
pub mod reg;

/// Two-pass assembler: the first pass declares every label, the second encodes every line
/// against the finished label table.
#[derive(Default)]
pub struct MipsAssembler {
    labels: LabelTable,
    words: Vec<u32>,
}

impl Assemble for MipsAssembler {
    fn assemble(lines: &[Line], config: &Config) -> Result<Program, Error> {
        let mut asm = MipsAssembler::default();

        for line in lines {
            asm.declare_label(line)?;
        }

        for line in lines {
            let instr = asm.encode_line(line)?;
            asm.emit(line, instr);
        }

        info!(
            instructions = asm.words.len(),
            labels = asm.labels.len(),
            "assembled program"
        );

        Ok(Program::new(asm.words, config.base_address))
    }
}

impl MipsAssembler {
    fn declare_label(&mut self, line: &Line) -> Result<(), Error> {
        let Some(label) = &line.label else {
            return Ok(());
        };

        self.labels
            .declare(label.as_str(), line.index)
            .map_err(|kind| line.error_at(label.range.clone(), kind))
    }

    fn emit(&mut self, line: &Line, instr: Instruction) {
        let word = instr.encode();
        debug!(
            line = line.index,
            word = %format_args!("{word:#010x}"),
            %instr,
            "encoded"
        );
        self.words.push(word);
    }

    fn encode_line(&self, line: &Line) -> Result<Instruction, Error> {
        let Some(mnemonic) = Mnemonic::parse(line.mnemonic.as_str()) else {
            return Err(line.error_at(
                line.mnemonic.range.clone(),
                ErrorKind::UnknownOpcode(line.mnemonic.text.clone()),
            ));
        };

        let ops = Operands { line, mnemonic };

        let instr = match mnemonic {
            Mnemonic::Nop => Instruction::Nop,
            Mnemonic::Add => Instruction::Add {
                rd: ops.reg(0)?,
                rs: ops.reg(1)?,
                rt: ops.reg(2)?,
            },
            Mnemonic::Sll => Instruction::Sll {
                rd: ops.reg(0)?,
                rt: ops.reg(1)?,
                shamt: ops.shamt(2)?,
            },
            Mnemonic::Srl => Instruction::Srl {
                rd: ops.reg(0)?,
                rt: ops.reg(1)?,
                shamt: ops.shamt(2)?,
            },
            Mnemonic::Addi => Instruction::Addi {
                rt: ops.reg(0)?,
                rs: ops.reg(1)?,
                imm: ops.imm(2)?,
            },
            Mnemonic::Andi => Instruction::Andi {
                rt: ops.reg(0)?,
                rs: ops.reg(1)?,
                imm: ops.imm(2)?,
            },
            Mnemonic::Beq => Instruction::Beq {
                rs: ops.reg(0)?,
                rt: ops.reg(1)?,
                offset: ops.branch_offset(2, &self.labels)?,
            },
            Mnemonic::Bne => Instruction::Bne {
                rs: ops.reg(0)?,
                rt: ops.reg(1)?,
                offset: ops.branch_offset(2, &self.labels)?,
            },
        };

        Ok(instr)
    }
}

/// Operand accessors for one line, each reporting errors at the offending token.
struct Operands<'l> {
    line: &'l Line,
    mnemonic: Mnemonic,
}

impl Operands<'_> {
    fn get(&self, n: usize) -> Result<&Token, Error> {
        self.line.operand(n).ok_or_else(|| {
            self.line.error(ErrorKind::parse(format!(
                "`{}` expects {} operands, found {}",
                self.mnemonic,
                self.mnemonic.operand_count(),
                self.line.operands.len()
            )))
        })
    }

    fn reg(&self, n: usize) -> Result<Register, Error> {
        let token = self.get(n)?;
        Register::parse(token.as_str()).ok_or_else(|| {
            self.line.error_at(
                token.range.clone(),
                ErrorKind::InvalidRegister(token.text.clone()),
            )
        })
    }

    fn imm(&self, n: usize) -> Result<i16, Error> {
        let token = self.get(n)?;
        let value = self.int(token, ErrorKind::ImmediateOutOfRange)?;

        i16::try_from(value).map_err(|_| {
            self.line
                .error_at(token.range.clone(), ErrorKind::ImmediateOutOfRange(value))
        })
    }

    fn shamt(&self, n: usize) -> Result<u5, Error> {
        let token = self.get(n)?;
        let value = self.int(token, ErrorKind::InvalidShiftAmount)?;

        match u8::try_from(value) {
            Ok(shamt) if shamt <= 31 => Ok(u5::new(shamt)),
            _ => Err(self
                .line
                .error_at(token.range.clone(), ErrorKind::InvalidShiftAmount(value))),
        }
    }

    fn branch_offset(&self, n: usize, labels: &LabelTable) -> Result<i16, Error> {
        let token = self.get(n)?;
        labels
            .branch_offset(self.line.index, token.as_str())
            .map_err(|kind| self.line.error_at(token.range.clone(), kind))
    }

    /// Parses a decimal literal. Literals too large for any field report through `overflow`.
    fn int(&self, token: &Token, overflow: fn(i64) -> ErrorKind) -> Result<i64, Error> {
        token.as_str().parse::<i64>().map_err(|e| {
            let kind = match e.kind() {
                IntErrorKind::PosOverflow => overflow(i64::MAX),
                IntErrorKind::NegOverflow => overflow(i64::MIN),
                _ => ErrorKind::parse(format!("`{}` is not a decimal integer", token.text)),
            };

            self.line.error_at(token.range.clone(), kind)
        })
    }
}
