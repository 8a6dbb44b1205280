use crate::cpu::{Bus, Cpu};

impl Cpu {
    /// 16-bit register by `rp2` index, where AF replaces SP.
    fn read_rp2(&self, opcode: u8) -> u16 {
        match (opcode >> 4) & 0x03 {
            3 => self.regs.af(),
            rp => self.read_rp(rp),
        }
    }

    pub(super) fn exec_push_rr<B: Bus>(&mut self, bus: &mut B, opcode: u8) {
        debug_assert!(matches!(opcode, 0xC5 | 0xD5 | 0xE5 | 0xF5));
        let value = self.read_rp2(opcode);
        self.push_u16(bus, value);
    }

    pub(super) fn exec_pop_rr<B: Bus>(&mut self, bus: &mut B, opcode: u8) {
        debug_assert!(matches!(opcode, 0xC1 | 0xD1 | 0xE1 | 0xF1));
        let value = self.pop_u16(bus);
        match (opcode >> 4) & 0x03 {
            3 => self.regs.set_af(value),
            rp => self.write_rp(rp, value),
        }
    }

    /// RST n: call one of the eight fixed vectors at `opcode & 0x38`.
    pub(super) fn exec_rst<B: Bus>(&mut self, bus: &mut B, opcode: u8) {
        debug_assert!(matches!(
            opcode,
            0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF
        ));
        self.call(bus, (opcode & 0x38) as u16, true);
    }

    pub(super) fn exec_reti<B: Bus>(&mut self, bus: &mut B) -> bool {
        self.ime = true;
        self.ime_enable_pending = false;
        self.ime_enable_delay = false;
        self.ret(bus, true)
    }
}
