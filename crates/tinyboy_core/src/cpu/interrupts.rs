use super::{Bus, Cpu, Sleep, Timing};
use crate::interrupt::Interrupt;

impl Cpu {
    /// Handle a pending interrupt between two instructions.
    ///
    /// A pending line (`IE & IF`) always ends a HALT; STOP only ends on a
    /// joypad request. When IME is set the highest-priority line is
    /// serviced: IME is cleared, its IF bit acknowledged, PC pushed and the
    /// vector loaded. Returns the timing of the entry sequence when one ran.
    pub fn service_interrupts<B: Bus>(&mut self, bus: &mut B) -> Option<Timing> {
        if self.is_halted() {
            return None;
        }

        let pending = Interrupt::pending(bus);
        let line = pending.highest_priority()?;

        if self.sleep == Some(Sleep::Stop) && !pending.contains(Interrupt::JOYPAD) {
            return None;
        }

        if !self.ime {
            if let Some(sleep) = self.sleep.take() {
                log::debug!("{sleep:?} ended by {line:?} with IME clear");
            }
            return None;
        }

        self.ime = false;
        self.sleep = None;
        Interrupt::acknowledge(bus, line);

        let pc = self.regs.pc;
        let vector = line.vector();
        self.push_u16(bus, pc);
        self.regs.pc = vector;

        log::debug!(
            "interrupt {line:?}: vector=0x{vector:04X} pc=0x{pc:04X} sp=0x{:04X}",
            self.regs.sp
        );

        Some(self.record(5, 20))
    }

    /// Apply delayed IME change requested by EI.
    #[inline]
    pub(super) fn apply_ime_delay(&mut self) {
        if self.ime_enable_delay {
            // Second step after EI: actually enable IME.
            self.ime = true;
            self.ime_enable_delay = false;
        } else if self.ime_enable_pending {
            // First step after EI: arm the delayed enable.
            self.ime_enable_pending = false;
            self.ime_enable_delay = true;
        }
    }
}
