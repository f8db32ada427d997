use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use colored::Colorize;
use mipsemu::{
    Emulator,
    config::Config,
    exec::{RegisterFile, RunSummary},
    synthesize::{
        arch::{Address, Program},
        image::{HexImage, ImageFormat, RawImage},
    },
};
use tracing::Level;

#[derive(Parser)]
#[command(version, about = "Assemble and run a program for an 8-instruction MIPS subset")]
struct Cli {
    /// Assembly source, one instruction per line
    file: PathBuf,

    /// Write the assembled image to this path
    #[arg(long)]
    emit: Option<PathBuf>,

    /// Image format used by --emit
    #[arg(long, value_enum, default_value_t = Format::Raw)]
    format: Format,

    /// Don't print a trace line per executed instruction
    #[arg(short, long)]
    quiet: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[arg(long)]
    max_program_len: Option<usize>,

    #[arg(long)]
    max_line_len: Option<usize>,

    #[arg(long)]
    max_token_len: Option<usize>,

    /// Address of the first instruction, e.g. 0x00400000
    #[arg(long, value_parser = parse_address)]
    base_address: Option<u32>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// Flat 32-bit words in host byte order
    Raw,
    /// One hex word per line
    Hex,
}

impl Cli {
    fn config(&self) -> Config {
        let defaults = Config::default();
        Config {
            max_program_len: self.max_program_len.unwrap_or(defaults.max_program_len),
            max_line_len: self.max_line_len.unwrap_or(defaults.max_line_len),
            max_token_len: self.max_token_len.unwrap_or(defaults.max_token_len),
            base_address: self
                .base_address
                .map(Address)
                .unwrap_or(defaults.base_address),
        }
    }

    fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

fn main() -> Result<(), mipsemu::Error> {
    let args = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .with_writer(std::io::stderr)
        .init();

    let emulator = Emulator::new(args.config());
    let program = emulator.assemble(&args.file)?;

    println!(
        "{:>12} {} ({} instructions)",
        "Assembled".bright_green(),
        args.file.display(),
        program.len()
    );
    print_listing(&program);

    if let Some(path) = &args.emit {
        match args.format {
            Format::Raw => RawImage.save(&program, path)?,
            Format::Hex => HexImage.save(&program, path)?,
        }
        println!("{:>12} {}", "Wrote".bright_green(), path.display());
    }

    println!("{:>12}", "Running".bright_green());
    let quiet = args.quiet;
    let (machine, summary) = emulator.run(&program, |trace| {
        if !quiet {
            println!("  {trace}");
        }
    })?;

    print_registers(machine.registers(), &summary);

    Ok(())
}

fn print_listing(program: &Program) {
    for (address, word) in program.listing() {
        println!("  {address}  {}", format!("{word:#010x}").dimmed());
    }
}

fn print_registers(registers: &RegisterFile, summary: &RunSummary) {
    println!(
        "{:>12} after {} steps",
        "Finished".bright_green(),
        summary.steps
    );
    println!("registers:");
    for (reg, value) in registers.iter() {
        println!(" {:>2} {:<5} {}", reg.index(), reg.name(), value as i32);
    }
    println!(" Program Counter: {}", summary.pc.to_string().bold());
}

fn parse_address(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };

    let address = parsed.map_err(|e| e.to_string())?;
    if address % 4 != 0 {
        return Err(String::from("address must be word aligned"));
    }

    Ok(address)
}
