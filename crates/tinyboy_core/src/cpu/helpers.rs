use super::{Bus, Cpu, Flag};

/// Operand bytes that follow an opcode, fetched before execution starts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(super) struct Operands([u8; 2]);

impl Operands {
    /// Read `width` bytes (0, 1 or 2) starting at `pc + 1`.
    pub(super) fn fetch<B: Bus>(bus: &mut B, pc: u16, width: u8) -> Self {
        let mut bytes = [0u8; 2];
        for (i, byte) in bytes.iter_mut().enumerate().take(width as usize) {
            *byte = bus.read8(pc.wrapping_add(1 + i as u16));
        }
        Self(bytes)
    }

    #[inline]
    pub(super) fn d8(self) -> u8 {
        self.0[0]
    }

    #[inline]
    pub(super) fn r8(self) -> i8 {
        self.0[0] as i8
    }

    #[inline]
    pub(super) fn d16(self) -> u16 {
        u16::from_le_bytes(self.0)
    }
}

impl Cpu {
    /// Helper to read an 8-bit register or (HL) by index.
    ///
    /// The encoding matches the standard Game Boy register order used by
    /// opcode tables:
    /// 0=B, 1=C, 2=D, 3=E, 4=H, 5=L, 6=(HL), 7=A.
    #[inline]
    pub(super) fn read_reg8<B: Bus>(&mut self, bus: &mut B, index: u8) -> u8 {
        match index & 0x07 {
            0 => self.regs.b,
            1 => self.regs.c,
            2 => self.regs.d,
            3 => self.regs.e,
            4 => self.regs.h,
            5 => self.regs.l,
            6 => bus.read8(self.regs.hl()),
            _ => self.regs.a,
        }
    }

    /// Helper to write an 8-bit register or (HL) by index.
    ///
    /// The encoding matches `read_reg8`.
    #[inline]
    pub(super) fn write_reg8<B: Bus>(&mut self, bus: &mut B, index: u8, value: u8) {
        match index & 0x07 {
            0 => self.regs.b = value,
            1 => self.regs.c = value,
            2 => self.regs.d = value,
            3 => self.regs.e = value,
            4 => self.regs.h = value,
            5 => self.regs.l = value,
            6 => bus.write8(self.regs.hl(), value),
            _ => self.regs.a = value,
        }
    }

    /// 16-bit register by `rp` index: 0=BC, 1=DE, 2=HL, 3=SP.
    #[inline]
    pub(super) fn read_rp(&self, index: u8) -> u16 {
        match index & 0x03 {
            0 => self.regs.bc(),
            1 => self.regs.de(),
            2 => self.regs.hl(),
            _ => self.regs.sp,
        }
    }

    #[inline]
    pub(super) fn write_rp(&mut self, index: u8, value: u16) {
        match index & 0x03 {
            0 => self.regs.set_bc(value),
            1 => self.regs.set_de(value),
            2 => self.regs.set_hl(value),
            _ => self.regs.sp = value,
        }
    }

    /// Push `value` at SP, then move SP down by two.
    #[inline]
    pub(super) fn push_u16<B: Bus>(&mut self, bus: &mut B, value: u16) {
        bus.push16(self.regs.sp, value);
        self.regs.sp = self.regs.sp.wrapping_sub(2);
    }

    #[inline]
    pub(super) fn pop_u16<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let value = bus.pop16(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(2);
        value
    }

    /// Branch condition from bits 3-4 of a conditional opcode.
    #[inline]
    pub(super) fn condition(&self, opcode: u8) -> bool {
        match (opcode >> 3) & 0x03 {
            0 => !self.get_flag(Flag::Z), // NZ
            1 => self.get_flag(Flag::Z),  // Z
            2 => !self.get_flag(Flag::C), // NC
            _ => self.get_flag(Flag::C),  // C
        }
    }

    /// Relative jump from the address after the operand.
    pub(super) fn jr(&mut self, offset: i8, cond: bool) -> bool {
        if cond {
            self.regs.pc = self.regs.pc.wrapping_add(offset as u16);
        }
        cond
    }

    pub(super) fn jp(&mut self, addr: u16, cond: bool) -> bool {
        if cond {
            self.regs.pc = addr;
        }
        cond
    }

    /// Push the return address (already in PC) and jump, only when `cond`
    /// holds. A failed condition leaves SP and the stack untouched.
    pub(super) fn call<B: Bus>(&mut self, bus: &mut B, addr: u16, cond: bool) -> bool {
        if cond {
            let ret = self.regs.pc;
            self.push_u16(bus, ret);
            self.regs.pc = addr;
        }
        cond
    }

    pub(super) fn ret<B: Bus>(&mut self, bus: &mut B, cond: bool) -> bool {
        if cond {
            self.regs.pc = self.pop_u16(bus);
        }
        cond
    }
}
