use std::{fmt::Display, io, ops::Range, rc::Rc};

use ariadne::{Color, Label, Report, ReportKind, Source};

pub mod label;
pub mod lex;

pub type Span = (Rc<String>, Range<usize>);

/// An assembly failure. Every one aborts the whole run before anything executes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {kind} (assembly: {assembly})")]
pub struct Error {
    /// 0-based index of the offending source line.
    pub line: usize,
    pub kind: ErrorKind,
    pub span: Span,
    /// Mnemonic and operands as written on the offending line.
    pub assembly: String,
}

impl Error {
    pub fn new(line: usize, kind: ErrorKind, span: Span, assembly: impl Into<String>) -> Self {
        Self {
            line,
            kind,
            span,
            assembly: assembly.into(),
        }
    }

    pub fn report(&self) -> Report<'static, Span> {
        Report::build(ReportKind::Error, self.span.clone())
            .with_code(self.kind.code())
            .with_message(format!("{} on line {}", self.kind, self.line))
            .with_label(
                Label::new(self.span.clone())
                    .with_color(Color::Red)
                    .with_message(self.kind.hint()),
            )
            .finish()
    }

    /// Prints the diagnostic to stderr, quoting `source`.
    pub fn eprint(&self, source: &str) -> io::Result<()> {
        self.report()
            .eprint((self.span.0.clone(), Source::from(source)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    #[error("parse error: {0}")]
    Parse(String),
    #[error("unknown opcode `{0}`")]
    UnknownOpcode(String),
    #[error("invalid register `{0}`")]
    InvalidRegister(String),
    #[error("immediate {0} does not fit in a signed 16-bit field")]
    ImmediateOutOfRange(i64),
    #[error("shift amount {0} is outside 0..=31")]
    InvalidShiftAmount(i64),
    #[error("unresolved label `{0}`")]
    UnresolvedLabel(String),
    #[error("label `{0}` is already declared on line {1}")]
    DuplicateLabel(String, usize),
    #[error("program is longer than {0} lines")]
    ProgramTooLong(usize),
}

impl ErrorKind {
    pub fn parse(msg: impl Display) -> Self {
        Self::Parse(msg.to_string())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ErrorKind::Parse(_) => ErrorCode::Parse,
            ErrorKind::UnknownOpcode(_) => ErrorCode::UnknownOpcode,
            ErrorKind::InvalidRegister(_) => ErrorCode::InvalidRegister,
            ErrorKind::ImmediateOutOfRange(_) => ErrorCode::ImmediateOutOfRange,
            ErrorKind::InvalidShiftAmount(_) => ErrorCode::InvalidShiftAmount,
            ErrorKind::UnresolvedLabel(_) => ErrorCode::UnresolvedLabel,
            ErrorKind::DuplicateLabel(..) => ErrorCode::DuplicateLabel,
            ErrorKind::ProgramTooLong(_) => ErrorCode::ProgramTooLong,
        }
    }

    fn hint(&self) -> &'static str {
        match self {
            ErrorKind::Parse(_) => "can't make sense of this",
            ErrorKind::UnknownOpcode(_) => {
                "expected one of nop, add, addi, andi, beq, bne, srl, sll"
            }
            ErrorKind::InvalidRegister(_) => "expected a register such as $t0 or $zero",
            ErrorKind::ImmediateOutOfRange(_) => "must be within -32768..=32767",
            ErrorKind::InvalidShiftAmount(_) => "must be within 0..=31",
            ErrorKind::UnresolvedLabel(_) => "no line declares this label",
            ErrorKind::DuplicateLabel(..) => "declared again here",
            ErrorKind::ProgramTooLong(_) => "this line is past the end",
        }
    }
}

#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    Parse,
    UnknownOpcode,
    InvalidRegister,
    ImmediateOutOfRange,
    InvalidShiftAmount,
    UnresolvedLabel,
    DuplicateLabel,
    ProgramTooLong,
}

impl Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "E{:02}", *self as u32)
    }
}
