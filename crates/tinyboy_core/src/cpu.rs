mod alu;
mod cb;
mod exec;
mod helpers;
mod interrupts;
mod regs;
mod trace;

#[cfg(test)]
mod tests;

pub use regs::{Flag, Registers};

use crate::opcodes::{self, PREFIX_CB};

/// Abstraction over the address space the CPU executes against.
///
/// The CPU never owns memory: every entry point borrows a bus for the
/// duration of one call, so a display or debugger can inspect the same memory
/// between calls.
pub trait Bus {
    fn read8(&mut self, addr: u16) -> u8;
    fn write8(&mut self, addr: u16, value: u8);

    /// Little-endian word read.
    fn read16(&mut self, addr: u16) -> u16 {
        let lo = self.read8(addr);
        let hi = self.read8(addr.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    /// Store a word below `stack_addr`: low byte at `stack_addr - 1`, high
    /// byte at `stack_addr - 2`.
    fn push16(&mut self, stack_addr: u16, value: u16) {
        let [hi, lo] = value.to_be_bytes();
        self.write8(stack_addr.wrapping_sub(1), lo);
        self.write8(stack_addr.wrapping_sub(2), hi);
    }

    /// Inverse of `push16` once the stack pointer has moved down by two.
    fn pop16(&mut self, stack_addr: u16) -> u16 {
        let hi = self.read8(stack_addr);
        let lo = self.read8(stack_addr.wrapping_add(1));
        u16::from_be_bytes([hi, lo])
    }
}

/// Cost of the last dispatched instruction (or interrupt entry / idle step).
///
/// For an instruction, `m` is its length in bytes (opcode, prefix and
/// operands) and `t` its documented clock-tick cost. Interrupt entry and idle
/// HALT/STOP steps fetch nothing and record fixed costs instead (5/20 and
/// 1/4).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Timing {
    pub m: u32,
    pub t: u32,
}

/// Running totals since the last reset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Clock {
    pub m: u64,
    pub t: u64,
}

/// Why the CPU stopped accepting instructions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HaltReason {
    pub opcode: u8,
    pub address: u16,
}

/// Low-power wait entered by the HALT and STOP instructions.
///
/// Unlike the terminal halted state, both are left again when an interrupt
/// becomes pending.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sleep {
    Halt,
    Stop,
}

/// Instruction-level Game Boy CPU (LR35902).
#[derive(Clone, Debug, Default)]
pub struct Cpu {
    pub regs: Registers,
    /// Timing of the most recent dispatch.
    pub last: Timing,
    clock: Clock,
    ime: bool,
    ime_enable_pending: bool,
    ime_enable_delay: bool,
    sleep: Option<Sleep>,
    /// Set once an opcode outside the decode table has been dispatched.
    /// Only `reset` clears it.
    halted: Option<HaltReason>,
}

impl Cpu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero every register, both timing counters and all control state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Load the register values the boot image leaves behind when it hands
    /// control to the cartridge at 0x0100.
    ///
    /// Useful for running a program image without executing the boot image
    /// first. Values follow Pan Docs for the DMG.
    pub fn apply_post_boot_state(&mut self) {
        self.regs.a = 0x01;
        self.regs.f = 0xB0;
        self.regs.b = 0x00;
        self.regs.c = 0x13;
        self.regs.d = 0x00;
        self.regs.e = 0xD8;
        self.regs.h = 0x01;
        self.regs.l = 0x4D;
        self.regs.sp = 0xFFFE;
        self.regs.pc = 0x0100;
        self.ime = false;
    }

    #[inline]
    pub fn is_halted(&self) -> bool {
        self.halted.is_some()
    }

    #[inline]
    pub fn halt_reason(&self) -> Option<HaltReason> {
        self.halted
    }

    #[inline]
    pub fn sleep(&self) -> Option<Sleep> {
        self.sleep
    }

    #[inline]
    pub fn ime(&self) -> bool {
        self.ime
    }

    #[inline]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Execute exactly one instruction whose opcode byte is `opcode`.
    ///
    /// `Pc` must point at that opcode. Operand bytes are read from `Pc + 1`
    /// and `Pc + 2`, `Pc` then moves past the instruction unless the
    /// instruction transferred control. Dispatching an opcode hole enters
    /// the halted state without touching registers or memory; once halted,
    /// further calls do nothing until `reset`.
    pub fn dispatch<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> Timing {
        if let Some(reason) = self.halted {
            log::warn!(
                "dispatch of 0x{opcode:02X} ignored: CPU halted on 0x{:02X} at 0x{:04X}",
                reason.opcode,
                reason.address
            );
            return Timing::default();
        }

        let pc = self.regs.pc;

        let timing = if opcode == PREFIX_CB {
            let instr = opcodes::decode_cb(bus.read8(pc.wrapping_add(1)));
            self.regs.pc = pc.wrapping_add(2);
            self.exec_cb(bus, instr);
            self.record(2, instr.cycles() as u32)
        } else {
            let Some(instr) = opcodes::decode(opcode) else {
                self.halt_on_unknown(opcode);
                return self.last;
            };

            let operands = helpers::Operands::fetch(bus, pc, instr.width);
            self.regs.pc = pc.wrapping_add(instr.len());
            let taken = self.exec_opcode(bus, opcode, operands);
            if self.is_halted() {
                return self.last;
            }

            let cycles = match instr.cycles_taken {
                Some(cycles_taken) if taken => cycles_taken,
                _ => instr.cycles,
            };
            self.record(instr.len() as u32, cycles as u32)
        };

        self.apply_ime_delay();
        timing
    }

    /// Service interrupts, idle while sleeping, or fetch the opcode at `Pc`
    /// and dispatch it.
    pub fn step<B: Bus>(&mut self, bus: &mut B) -> Timing {
        if self.is_halted() {
            return Timing::default();
        }

        if let Some(timing) = self.service_interrupts(bus) {
            return timing;
        }

        if self.sleep.is_some() {
            return self.record(1, 4);
        }

        let opcode = bus.read8(self.regs.pc);
        self.dispatch(bus, opcode)
    }

    fn record(&mut self, m: u32, t: u32) -> Timing {
        self.last = Timing { m, t };
        self.clock.m += m as u64;
        self.clock.t += t as u64;
        self.last
    }

    fn halt_on_unknown(&mut self, opcode: u8) {
        let address = self.regs.pc;
        log::error!(
            "CPU halted: unknown opcode 0x{opcode:02X} at PC=0x{address:04X} (SP=0x{sp:04X} AF=0x{af:04X} BC=0x{bc:04X} DE=0x{de:04X} HL=0x{hl:04X})",
            sp = self.regs.sp,
            af = self.regs.af(),
            bc = self.regs.bc(),
            de = self.regs.de(),
            hl = self.regs.hl(),
        );
        self.halted = Some(HaltReason { opcode, address });
        self.last = Timing::default();
    }
}
