use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tinyboy_core::{Machine, RunConfig, RunSummary};

/// Step budget when `--max-steps` is not given. The boot image spins on the
/// LY register forever without a PPU, so an unbounded run never ends.
pub const DEFAULT_MAX_STEPS: u64 = 10_000_000;

#[derive(Debug, Parser)]
#[command(name = "tinyboy", version, about = "Run a program image on the TinyBoy CPU core")]
pub struct Args {
    /// Path to program image
    pub program: Option<PathBuf>,

    /// Do not map the boot image at 0x0000
    #[arg(long)]
    pub no_boot: bool,

    /// Start from the register state the boot image leaves behind
    #[arg(long)]
    pub post_boot: bool,

    /// Load address of the program image, in hex
    #[arg(long, value_name = "HEX", value_parser = parse_hex_u16, default_value = "0000")]
    pub origin: u16,

    /// Stop after this many steps (0 = unlimited)
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_STEPS)]
    pub max_steps: u64,

    /// Keep running past the end of the loaded image
    #[arg(long)]
    pub keep_going: bool,

    /// Log every instruction (needs RUST_LOG=trace)
    #[arg(long)]
    pub trace: bool,
}

fn parse_hex_u16(value: &str) -> Result<u16, std::num::ParseIntError> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    u16::from_str_radix(digits, 16)
}

impl Args {
    pub fn run_config(&self) -> RunConfig {
        RunConfig::builder()
            .load_boot_image(!self.no_boot)
            .post_boot_state(self.post_boot)
            .program_origin(self.origin)
            .max_steps((self.max_steps > 0).then_some(self.max_steps))
            .stop_at_end_of_image(!self.keep_going)
            .trace(self.trace)
            .build()
    }
}

/// Load the requested images, run until a stop condition and print the
/// final CPU state.
pub fn run(args: &Args) -> Result<RunSummary> {
    let mut machine = Machine::new(args.run_config());

    match &args.program {
        Some(path) => {
            log::info!("Running program image '{}'", path.display());
            machine
                .load_file(path)
                .with_context(|| format!("failed to load '{}'", path.display()))?;
        }
        None => {
            log::info!("No program image given, running the boot image only");
            machine.load(&[]).context("failed to load boot image")?;
        }
    }

    let summary = machine.run();

    let pc = machine.cpu.regs.pc;
    let opcode = machine.mmu.read_byte(pc);
    let clock = machine.cpu.clock();
    println!("{}", machine.cpu.trace(opcode));
    println!(
        "stopped: {:?} after {} steps ({} M-cycles, {} T-cycles)",
        summary.reason, summary.steps, clock.m, clock.t
    );

    Ok(summary)
}
