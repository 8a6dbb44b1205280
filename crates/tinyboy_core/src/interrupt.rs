use bitflags::bitflags;

use crate::cpu::Bus;

/// Interrupt enable register.
pub const IE_ADDR: u16 = 0xFFFF;
/// Interrupt request (flag) register.
pub const IF_ADDR: u16 = 0xFF0F;

bitflags! {
    /// Interrupt lines as laid out in IE and IF. Lower bits win when several
    /// lines are pending at once.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Interrupt: u8 {
        const VBLANK = 0b0000_0001;
        const LCD_STAT = 0b0000_0010;
        const TIMER = 0b0000_0100;
        const SERIAL = 0b0000_1000;
        const JOYPAD = 0b0001_0000;
    }
}

impl Interrupt {
    /// Lines both enabled in IE and requested in IF.
    pub fn pending<B: Bus>(bus: &mut B) -> Interrupt {
        let ie = bus.read8(IE_ADDR);
        let iflags = bus.read8(IF_ADDR);
        Interrupt::from_bits_truncate(ie & iflags)
    }

    /// Raise the given lines in IF on behalf of a peripheral.
    pub fn request<B: Bus>(bus: &mut B, lines: Interrupt) {
        let iflags = bus.read8(IF_ADDR);
        bus.write8(IF_ADDR, iflags | lines.bits());
    }

    /// Clear the given lines in IF once the CPU has taken them.
    pub fn acknowledge<B: Bus>(bus: &mut B, lines: Interrupt) {
        let iflags = bus.read8(IF_ADDR);
        bus.write8(IF_ADDR, iflags & !lines.bits());
    }

    /// The single lowest-numbered line in `self`.
    pub fn highest_priority(self) -> Option<Interrupt> {
        if self.is_empty() {
            return None;
        }
        Some(Interrupt::from_bits_retain(1 << self.bits().trailing_zeros()))
    }

    /// Handler address of the lowest-numbered line in `self`.
    pub fn vector(self) -> u16 {
        0x0040 + 8 * self.bits().trailing_zeros().min(4) as u16
    }
}
