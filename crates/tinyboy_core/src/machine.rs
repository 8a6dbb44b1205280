use std::path::Path;

use typed_builder::TypedBuilder;

use crate::boot::{BOOT_ROM_SIZE, DMG_BOOT_ROM};
use crate::cpu::{Cpu, HaltReason, Sleep, Timing};
use crate::error::LoadError;
use crate::interrupt::Interrupt;
use crate::memory::{read_program_file, Mmu, MEMORY_SIZE};
use crate::opcodes;

/// How a `Machine` loads images and when `run` gives control back.
#[derive(Clone, Debug, TypedBuilder)]
pub struct RunConfig {
    /// Map the boot image at address 0 before the program image is applied.
    #[builder(default = true)]
    pub load_boot_image: bool,
    /// Start from the register state the boot image hands to the cartridge
    /// (PC=0x0100, SP=0xFFFE, ...) instead of all zeroes.
    #[builder(default = false)]
    pub post_boot_state: bool,
    /// Address the program image is copied to.
    #[builder(default = 0x0000)]
    pub program_origin: u16,
    /// Upper bound on steps taken by one `run` call. A step is one
    /// instruction, one interrupt entry or one idle HALT/STOP cycle.
    #[builder(default)]
    pub max_steps: Option<u64>,
    /// Stop once PC leaves the loaded content.
    #[builder(default = true)]
    pub stop_at_end_of_image: bool,
    /// Log every instruction at trace level.
    #[builder(default = false)]
    pub trace: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// An opcode outside the decode table was dispatched.
    Halted(HaltReason),
    /// PC reached the end of the loaded content.
    EndOfImage,
    /// `max_steps` steps were taken.
    StepLimit,
    /// HALT or STOP with no interrupt pending. Nothing inside the run loop
    /// can raise one, so the CPU would sleep forever.
    Asleep,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub steps: u64,
    pub reason: StopReason,
}

/// CPU core plus the memory it executes against.
///
/// This is the host-loop side of the core: it loads images, resets the CPU
/// and steps it until a stop condition is met. Memory and registers may be
/// inspected freely between steps.
pub struct Machine {
    pub cpu: Cpu,
    pub mmu: Mmu,
    config: RunConfig,
    /// One past the highest address written by the last load.
    image_end: usize,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new(RunConfig::default())
    }
}

impl Machine {
    pub fn new(config: RunConfig) -> Self {
        Self {
            cpu: Cpu::new(),
            mmu: Mmu::new(),
            config,
            image_end: 0,
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn image_end(&self) -> usize {
        self.image_end
    }

    /// Clear memory, map the boot image (if configured), copy `program` to
    /// the configured origin and reset the CPU.
    pub fn load(&mut self, program: &[u8]) -> Result<(), LoadError> {
        let origin = self.config.program_origin;
        let end = origin as usize + program.len();
        if end > MEMORY_SIZE {
            return Err(LoadError::TooLarge {
                len: program.len(),
                origin,
                capacity: MEMORY_SIZE,
            });
        }

        self.mmu.initialize();
        self.image_end = 0;
        if self.config.load_boot_image {
            self.mmu.load_boot_image(&DMG_BOOT_ROM);
            self.image_end = BOOT_ROM_SIZE;
        }
        self.mmu.load_program_image_at(origin, program)?;
        self.image_end = self.image_end.max(end);

        self.reset();
        Ok(())
    }

    /// Read `path` and `load` it. Memory is untouched when the read fails.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<usize, LoadError> {
        let program = read_program_file(path)?;
        self.load(&program)?;
        Ok(program.len())
    }

    /// Reset the CPU, keeping memory as it is.
    pub fn reset(&mut self) {
        self.cpu.reset();
        if self.config.post_boot_state {
            self.cpu.apply_post_boot_state();
        }
    }

    /// Raise interrupt lines on behalf of a peripheral. Takes effect at the
    /// next `step`.
    pub fn request_interrupt(&mut self, lines: Interrupt) {
        Interrupt::request(&mut self.mmu, lines);
    }

    /// Run one instruction (or interrupt entry, or idle cycle).
    pub fn step(&mut self) -> Timing {
        if self.config.trace && log::log_enabled!(log::Level::Trace) {
            let pc = self.cpu.regs.pc;
            let opcode = self.mmu.read_byte(pc);
            let operands = [
                self.mmu.read_byte(pc.wrapping_add(1)),
                self.mmu.read_byte(pc.wrapping_add(2)),
            ];
            log::trace!(
                "{} | {}",
                self.cpu.trace(opcode),
                opcodes::disassemble(opcode, operands)
            );
        }
        self.cpu.step(&mut self.mmu)
    }

    /// Step until the CPU halts, leaves the image, falls asleep for good or
    /// exhausts `max_steps`.
    pub fn run(&mut self) -> RunSummary {
        let mut steps = 0u64;

        let reason = loop {
            if let Some(reason) = self.cpu.halt_reason() {
                break StopReason::Halted(reason);
            }
            if self.config.stop_at_end_of_image && self.cpu.regs.pc as usize >= self.image_end {
                break StopReason::EndOfImage;
            }
            if self.config.max_steps.is_some_and(|max| steps >= max) {
                break StopReason::StepLimit;
            }
            if self.sleeps_forever() {
                break StopReason::Asleep;
            }

            self.step();
            steps += 1;
        };

        log::info!(
            "Stopped after {steps} steps ({reason:?}), PC=0x{:04X}, {} clock ticks",
            self.cpu.regs.pc,
            self.cpu.clock().t
        );
        RunSummary { steps, reason }
    }

    fn sleeps_forever(&mut self) -> bool {
        let pending = Interrupt::pending(&mut self.mmu);
        match self.cpu.sleep() {
            None => false,
            Some(Sleep::Halt) => pending.is_empty(),
            Some(Sleep::Stop) => !pending.contains(Interrupt::JOYPAD),
        }
    }
}
