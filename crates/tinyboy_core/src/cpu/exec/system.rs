use crate::cpu::{Cpu, Sleep};

impl Cpu {
    pub(super) fn exec_halt(&mut self) {
        log::debug!("HALT at PC=0x{:04X}", self.regs.pc.wrapping_sub(1));
        self.sleep = Some(Sleep::Halt);
    }

    /// STOP is a two-byte instruction; its padding byte was consumed as the
    /// operand. The CPU sleeps until a joypad interrupt is requested.
    pub(super) fn exec_stop(&mut self) {
        log::debug!("STOP at PC=0x{:04X}", self.regs.pc.wrapping_sub(2));
        self.sleep = Some(Sleep::Stop);
    }

    pub(super) fn exec_di(&mut self) {
        self.ime = false;
        self.ime_enable_pending = false;
        self.ime_enable_delay = false;
    }

    pub(super) fn exec_ei(&mut self) {
        // IME becomes 1 after the *next* instruction completes.
        self.ime_enable_pending = true;
    }
}
