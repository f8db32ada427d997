use std::{path::Path, rc::Rc};

use crate::{
    analyze::lex::Lexer,
    config::Config,
    exec::{ExecError, Machine, RunSummary, trace::Trace},
    synthesize::arch::{Assemble, Program, mips::MipsAssembler},
};

pub mod analyze;
pub mod config;
pub mod exec;
pub mod synthesize;

/// One assemble-then-execute session.
#[derive(Default)]
pub struct Emulator {
    config: Config,
}

impl Emulator {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Assembles a source file, printing a diagnostic to stderr if it doesn't assemble.
    pub fn assemble(&self, path: impl AsRef<Path>) -> Result<Program, Error> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;

        let source_name = Rc::new(
            path.file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or(String::from("unknown")),
        );

        self.assemble_source(source_name, &source).map_err(|e| {
            e.eprint(&source).ok();
            Error::Assembly(e)
        })
    }

    /// Tokenizes and assembles `source`. Nothing is produced unless every line encodes.
    pub fn assemble_source(
        &self,
        name: Rc<String>,
        source: &str,
    ) -> Result<Program, analyze::Error> {
        let lines = Lexer::new(name, &self.config).lex(source)?;
        MipsAssembler::assemble(&lines, &self.config)
    }

    /// Runs `program` to completion on a fresh machine.
    pub fn run<'p>(
        &self,
        program: &'p Program,
        observe: impl FnMut(&Trace),
    ) -> Result<(Machine<'p>, RunSummary), ExecError> {
        let mut machine = Machine::new(program);
        let summary = machine.run(observe)?;
        Ok((machine, summary))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error")]
    Io(#[from] std::io::Error),
    #[error("assembly failed")]
    Assembly(#[source] analyze::Error),
    #[error("execution failed")]
    Execution(#[from] ExecError),
}
