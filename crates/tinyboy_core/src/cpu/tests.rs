use super::*;
use crate::interrupt::{Interrupt, IE_ADDR, IF_ADDR};
use crate::memory::Mmu;

const OPCODE_HOLES: [u8; 11] = [
    0xD3, 0xDB, 0xDD, 0xE3, 0xE4, 0xEB, 0xEC, 0xED, 0xF4, 0xFC, 0xFD,
];

/// Fresh CPU plus memory with `program` copied to address 0.
fn setup(program: &[u8]) -> (Cpu, Mmu) {
    let mut mmu = Mmu::new();
    mmu.load_program_image(program).unwrap();
    (Cpu::new(), mmu)
}

/// Place `program` at `origin` and point PC at it.
fn setup_at(origin: u16, program: &[u8]) -> (Cpu, Mmu) {
    let mut mmu = Mmu::new();
    mmu.load_program_image_at(origin, program).unwrap();
    let mut cpu = Cpu::new();
    cpu.regs.pc = origin;
    (cpu, mmu)
}

fn step_n(cpu: &mut Cpu, mmu: &mut Mmu, n: usize) {
    for _ in 0..n {
        cpu.step(mmu);
    }
}

fn timing(m: u32, t: u32) -> Timing {
    Timing { m, t }
}

#[test]
fn reset_zeroes_registers_and_timing() {
    let (mut cpu, mut mmu) = setup(&[0x01, 0x34, 0x12, 0x3E, 0x77, 0xFB, 0x76]);
    cpu.regs.sp = 0xC000;
    step_n(&mut cpu, &mut mmu, 4);
    assert_ne!(cpu.regs, Registers::default());
    assert_ne!(cpu.clock(), Clock::default());

    cpu.reset();

    assert_eq!(cpu.regs, Registers::default());
    assert_eq!(cpu.last, Timing::default());
    assert_eq!(cpu.clock(), Clock::default());
    assert_eq!(cpu.sleep(), None);
    assert!(!cpu.ime());
    assert!(!cpu.is_halted());
}

#[test]
fn reset_clears_halted_state() {
    let (mut cpu, mut mmu) = setup(&[0xD3]);
    cpu.step(&mut mmu);
    assert!(cpu.is_halted());

    cpu.reset();
    assert!(!cpu.is_halted());
    assert_eq!(cpu.halt_reason(), None);
}

#[test]
fn register_pairs_round_trip() {
    let mut regs = Registers::default();

    regs.set_bc(0x1234);
    assert_eq!((regs.b, regs.c), (0x12, 0x34));
    assert_eq!(regs.bc(), 0x1234);

    regs.set_de(0xBEEF);
    assert_eq!((regs.d, regs.e), (0xBE, 0xEF));
    assert_eq!(regs.de(), 0xBEEF);

    regs.set_hl(0x0150);
    assert_eq!((regs.h, regs.l), (0x01, 0x50));
    assert_eq!(regs.hl(), 0x0150);

    // The low nibble of F does not exist in hardware.
    regs.set_af(0x12FF);
    assert_eq!((regs.a, regs.f), (0x12, 0xF0));
    assert_eq!(regs.af(), 0x12F0);
}

#[test]
fn post_boot_state_matches_dmg() {
    let mut cpu = Cpu::new();
    cpu.apply_post_boot_state();
    assert_eq!(cpu.regs.af(), 0x01B0);
    assert_eq!(cpu.regs.bc(), 0x0013);
    assert_eq!(cpu.regs.de(), 0x00D8);
    assert_eq!(cpu.regs.hl(), 0x014D);
    assert_eq!(cpu.regs.sp, 0xFFFE);
    assert_eq!(cpu.regs.pc, 0x0100);
}

#[test]
fn set_flag_is_idempotent_and_clears() {
    let mut cpu = Cpu::new();

    cpu.set_flag(Flag::Z, true);
    cpu.set_flag(Flag::Z, true);
    assert!(cpu.get_flag(Flag::Z));
    assert_eq!(cpu.regs.f, 0x80);

    cpu.set_carry_flag(true);
    cpu.set_flag(Flag::Z, false);
    assert!(!cpu.get_flag(Flag::Z));
    assert!(cpu.get_flag(Flag::C));
    assert_eq!(cpu.regs.f, 0x10);

    // Clearing an already-clear flag must not set it.
    cpu.set_half_carry_flag(false);
    assert!(!cpu.get_flag(Flag::H));

    cpu.set_subtract_flag(true);
    cpu.set_zero_flag(true);
    assert_eq!(cpu.regs.f, 0xD0);

    cpu.clear_flags();
    assert_eq!(cpu.regs.f, 0);
}

#[test]
fn nop_advances_pc() {
    let (mut cpu, mut mmu) = setup(&[0x00]);
    assert_eq!(cpu.step(&mut mmu), timing(1, 4));
    assert_eq!(cpu.regs.pc, 0x0001);
    assert_eq!(cpu.last, timing(1, 4));
}

#[test]
fn ld_bc_d16_reads_little_endian_operand() {
    let (mut cpu, mut mmu) = setup(&[0x01, 0x50, 0x01]);
    assert_eq!(cpu.dispatch(&mut mmu, 0x01), timing(3, 12));
    assert_eq!(cpu.regs.bc(), 0x0150);
    assert_eq!((cpu.regs.b, cpu.regs.c), (0x01, 0x50));
    assert_eq!(cpu.regs.pc, 0x0003);
}

#[test]
fn ld_bc_indirect_stores_a() {
    let (mut cpu, mut mmu) = setup(&[0x02]);
    cpu.regs.a = 0x33;
    cpu.regs.set_bc(0x0150);

    assert_eq!(cpu.dispatch(&mut mmu, 0x02), timing(1, 8));
    assert_eq!(mmu.read_byte(0x0150), 0x33);
    assert_eq!(cpu.regs.pc, 0x0001);
}

#[test]
fn inc_bc_leaves_flags_alone() {
    let (mut cpu, mut mmu) = setup(&[0x03]);
    cpu.regs.set_bc(0x0150);
    cpu.regs.f = 0xF0;

    assert_eq!(cpu.dispatch(&mut mmu, 0x03), timing(1, 8));
    assert_eq!(cpu.regs.bc(), 0x0151);
    assert_eq!(cpu.regs.f, 0xF0);
}

#[test]
fn inc_bc_wraps() {
    let (mut cpu, mut mmu) = setup(&[0x03]);
    cpu.regs.set_bc(0xFFFF);
    cpu.step(&mut mmu);
    assert_eq!(cpu.regs.bc(), 0x0000);
}

#[test]
fn opcode_holes_halt_without_side_effects() {
    for opcode in OPCODE_HOLES {
        let (mut cpu, mut mmu) = setup_at(0x0200, &[opcode, 0x12, 0x34]);
        cpu.regs.set_bc(0xBEEF);
        cpu.regs.sp = 0xD000;
        let regs_before = cpu.regs;
        let mem_before = mmu.as_slice().to_vec();

        assert_eq!(cpu.step(&mut mmu), Timing::default(), "opcode {opcode:#04x}");
        assert_eq!(
            cpu.halt_reason(),
            Some(HaltReason {
                opcode,
                address: 0x0200
            })
        );
        assert_eq!(cpu.regs, regs_before);
        assert_eq!(mmu.as_slice(), &mem_before[..]);
        assert_eq!(cpu.clock(), Clock::default());
    }
}

#[test]
fn halted_cpu_ignores_further_dispatches() {
    let (mut cpu, mut mmu) = setup(&[0xDD, 0x00, 0x3C]);
    cpu.step(&mut mmu);
    assert!(cpu.is_halted());

    assert_eq!(cpu.dispatch(&mut mmu, 0x3C), Timing::default());
    assert_eq!(cpu.step(&mut mmu), Timing::default());
    assert_eq!(cpu.regs.a, 0);
    assert_eq!(cpu.regs.pc, 0x0000);
}

#[test]
fn cp_d8_compares_against_immediate() {
    let (mut cpu, mut mmu) = setup(&[0xFE, 0x34, 0xFE, 0x40, 0xFE, 0x25]);
    cpu.regs.a = 0x34;

    assert_eq!(cpu.step(&mut mmu), timing(2, 8));
    assert_eq!(cpu.regs.pc, 0x0002);
    assert_eq!(cpu.regs.a, 0x34);
    assert!(cpu.get_flag(Flag::Z));
    assert!(cpu.get_flag(Flag::N));
    assert!(!cpu.get_flag(Flag::H));
    assert!(!cpu.get_flag(Flag::C));

    // 0x34 < 0x40: borrow out of bit 7 only.
    cpu.step(&mut mmu);
    assert!(!cpu.get_flag(Flag::Z));
    assert!(!cpu.get_flag(Flag::H));
    assert!(cpu.get_flag(Flag::C));

    // 0x4 < 0x5: borrow out of bit 4 only.
    cpu.step(&mut mmu);
    assert!(cpu.get_flag(Flag::H));
    assert!(!cpu.get_flag(Flag::C));
    assert_eq!(cpu.regs.a, 0x34);
}

#[test]
fn sub_and_sbc_update_a() {
    // LD A,0x10 ; SUB 0x01 ; SCF ; SBC A,0x0E
    let (mut cpu, mut mmu) = setup(&[0x3E, 0x10, 0xD6, 0x01, 0x37, 0xDE, 0x0E]);
    step_n(&mut cpu, &mut mmu, 2);
    assert_eq!(cpu.regs.a, 0x0F);
    assert!(cpu.get_flag(Flag::H));
    assert!(!cpu.get_flag(Flag::C));

    step_n(&mut cpu, &mut mmu, 2);
    assert_eq!(cpu.regs.a, 0x00);
    assert!(cpu.get_flag(Flag::Z));
}

#[test]
fn add_and_daa_produce_bcd() {
    // LD A,0x15 ; ADD A,0x27 ; DAA
    let (mut cpu, mut mmu) = setup(&[0x3E, 0x15, 0xC6, 0x27, 0x27]);
    step_n(&mut cpu, &mut mmu, 2);
    assert_eq!(cpu.regs.a, 0x3C);
    cpu.step(&mut mmu);
    assert_eq!(cpu.regs.a, 0x42);
    assert!(!cpu.get_flag(Flag::C));
}

#[test]
fn daa_after_subtraction() {
    // LD A,0x42 ; SUB 0x15 ; DAA
    let (mut cpu, mut mmu) = setup(&[0x3E, 0x42, 0xD6, 0x15, 0x27]);
    step_n(&mut cpu, &mut mmu, 2);
    assert_eq!(cpu.regs.a, 0x2D);
    assert!(cpu.get_flag(Flag::H));

    cpu.step(&mut mmu);
    assert_eq!(cpu.regs.a, 0x27);
    assert!(cpu.get_flag(Flag::N), "DAA keeps N");
    assert!(!cpu.get_flag(Flag::H));
    assert!(!cpu.get_flag(Flag::C));
    assert!(!cpu.get_flag(Flag::Z));
}

#[test]
fn daa_after_subtraction_with_borrow() {
    // LD A,0x10 ; SUB 0x20 ; DAA
    let (mut cpu, mut mmu) = setup(&[0x3E, 0x10, 0xD6, 0x20, 0x27]);
    step_n(&mut cpu, &mut mmu, 2);
    assert_eq!(cpu.regs.a, 0xF0);
    assert!(cpu.get_flag(Flag::C));

    cpu.step(&mut mmu);
    assert_eq!(cpu.regs.a, 0x90);
    assert!(cpu.get_flag(Flag::C));
}

#[test]
fn sbc_borrows_through_carry_in() {
    // SBC A,0x0F ; SBC A,0x00 ; SBC A,0xFF
    let (mut cpu, mut mmu) = setup(&[0xDE, 0x0F, 0xDE, 0x00, 0xDE, 0xFF]);

    cpu.regs.a = 0x10;
    cpu.set_carry_flag(true);
    cpu.step(&mut mmu);
    assert_eq!(cpu.regs.a, 0x00);
    assert!(cpu.get_flag(Flag::Z));
    assert!(cpu.get_flag(Flag::N));
    assert!(cpu.get_flag(Flag::H));
    assert!(!cpu.get_flag(Flag::C));

    // The borrow comes only from the carry-in.
    cpu.regs.a = 0x10;
    cpu.set_carry_flag(true);
    cpu.step(&mut mmu);
    assert_eq!(cpu.regs.a, 0x0F);
    assert!(!cpu.get_flag(Flag::Z));
    assert!(cpu.get_flag(Flag::H));
    assert!(!cpu.get_flag(Flag::C));

    cpu.regs.a = 0x00;
    cpu.set_carry_flag(true);
    cpu.step(&mut mmu);
    assert_eq!(cpu.regs.a, 0x00);
    assert!(cpu.get_flag(Flag::Z));
    assert!(cpu.get_flag(Flag::H));
    assert!(cpu.get_flag(Flag::C));
}

#[test]
fn xor_a_clears_a_and_sets_zero() {
    let (mut cpu, mut mmu) = setup(&[0xAF]);
    cpu.regs.a = 0x5A;
    cpu.regs.f = 0x70;
    assert_eq!(cpu.step(&mut mmu), timing(1, 4));
    assert_eq!(cpu.regs.a, 0);
    assert_eq!(cpu.regs.f, 0x80);
}

#[test]
fn dec_b_sets_subtract_and_half_carry() {
    let (mut cpu, mut mmu) = setup(&[0x05, 0x05]);
    cpu.regs.b = 0x10;
    cpu.set_carry_flag(true);

    assert_eq!(cpu.step(&mut mmu), timing(1, 4));
    assert_eq!(cpu.regs.b, 0x0F);
    assert!(cpu.get_flag(Flag::N));
    assert!(cpu.get_flag(Flag::H));
    assert!(!cpu.get_flag(Flag::Z));
    assert!(cpu.get_flag(Flag::C), "DEC must not touch carry");

    cpu.regs.b = 0x01;
    cpu.step(&mut mmu);
    assert_eq!(cpu.regs.b, 0x00);
    assert!(cpu.get_flag(Flag::Z));
    assert!(!cpu.get_flag(Flag::H));
}

#[test]
fn inc_hl_indirect_updates_memory() {
    let (mut cpu, mut mmu) = setup(&[0x34]);
    cpu.regs.set_hl(0xC000);
    mmu.write_byte(0xC000, 0xFF);

    assert_eq!(cpu.step(&mut mmu), timing(1, 12));
    assert_eq!(mmu.read_byte(0xC000), 0x00);
    assert!(cpu.get_flag(Flag::Z));
    assert!(cpu.get_flag(Flag::H));
}

#[test]
fn ld_hl_decrement_stores_a() {
    let (mut cpu, mut mmu) = setup(&[0x32, 0x22]);
    cpu.regs.a = 0x5A;
    cpu.regs.set_hl(0xC000);

    assert_eq!(cpu.step(&mut mmu), timing(1, 8));
    assert_eq!(mmu.read_byte(0xC000), 0x5A);
    assert_eq!(cpu.regs.hl(), 0xBFFF);

    cpu.step(&mut mmu);
    assert_eq!(mmu.read_byte(0xBFFF), 0x5A);
    assert_eq!(cpu.regs.hl(), 0xC000);
}

#[test]
fn ld_a_from_hl_increment() {
    let (mut cpu, mut mmu) = setup(&[0x2A]);
    cpu.regs.set_hl(0xC100);
    mmu.write_byte(0xC100, 0x99);

    cpu.step(&mut mmu);
    assert_eq!(cpu.regs.a, 0x99);
    assert_eq!(cpu.regs.hl(), 0xC101);
}

#[test]
fn ld_r_r_copies_between_registers() {
    // LD B,0x42 ; LD D,B ; LD (HL),D ; LD E,(HL)
    let (mut cpu, mut mmu) = setup(&[0x06, 0x42, 0x50, 0x72, 0x5E]);
    cpu.regs.set_hl(0xC000);
    step_n(&mut cpu, &mut mmu, 4);
    assert_eq!(cpu.regs.d, 0x42);
    assert_eq!(mmu.read_byte(0xC000), 0x42);
    assert_eq!(cpu.regs.e, 0x42);
}

#[test]
fn ldh_uses_high_page() {
    // LD A,0x91 ; LDH (0x40),A ; LD C,0x40 ; LD A,(C)
    let (mut cpu, mut mmu) = setup(&[0x3E, 0x91, 0xE0, 0x40, 0x0E, 0x40, 0xF2]);
    step_n(&mut cpu, &mut mmu, 2);
    assert_eq!(mmu.read_byte(0xFF40), 0x91);

    cpu.regs.a = 0;
    step_n(&mut cpu, &mut mmu, 2);
    assert_eq!(cpu.regs.a, 0x91);
}

#[test]
fn call_pushes_return_address_and_ret_pops_it() {
    let (mut cpu, mut mmu) = setup(&[0xCD, 0x00, 0x02]);
    mmu.write_byte(0x0200, 0xC9);
    cpu.regs.sp = 0xFFFE;

    assert_eq!(cpu.step(&mut mmu), timing(3, 24));
    assert_eq!(cpu.regs.pc, 0x0200);
    assert_eq!(cpu.regs.sp, 0xFFFC);
    // Low byte just below the old SP, high byte below that.
    assert_eq!(mmu.read_byte(0xFFFD), 0x03);
    assert_eq!(mmu.read_byte(0xFFFC), 0x00);

    assert_eq!(cpu.step(&mut mmu), timing(1, 16));
    assert_eq!(cpu.regs.pc, 0x0003);
    assert_eq!(cpu.regs.sp, 0xFFFE);
}

#[test]
fn call_z_pushes_only_when_taken() {
    let (mut cpu, mut mmu) = setup(&[0xCC, 0x00, 0x02]);
    cpu.regs.sp = 0xD000;

    assert_eq!(cpu.step(&mut mmu), timing(3, 12));
    assert_eq!(cpu.regs.pc, 0x0003);
    assert_eq!(cpu.regs.sp, 0xD000);
    assert_eq!(mmu.read_byte(0xCFFF), 0x00);

    cpu.regs.pc = 0x0000;
    cpu.set_zero_flag(true);
    assert_eq!(cpu.step(&mut mmu), timing(3, 24));
    assert_eq!(cpu.regs.pc, 0x0200);
    assert_eq!(cpu.regs.sp, 0xCFFE);
    assert_eq!(mmu.pop_word(cpu.regs.sp), 0x0003);
}

#[test]
fn ret_cc_timing_depends_on_condition() {
    let (mut cpu, mut mmu) = setup_at(0x0100, &[0xC0, 0xC8]);
    cpu.regs.sp = 0xD000;
    cpu.push_u16(&mut mmu, 0x1234);
    cpu.set_zero_flag(true);

    // RET NZ falls through.
    assert_eq!(cpu.step(&mut mmu), timing(1, 8));
    assert_eq!(cpu.regs.pc, 0x0101);

    // RET Z returns.
    assert_eq!(cpu.step(&mut mmu), timing(1, 20));
    assert_eq!(cpu.regs.pc, 0x1234);
    assert_eq!(cpu.regs.sp, 0xD000);
}

#[test]
fn rst_pushes_address_of_next_instruction() {
    let (mut cpu, mut mmu) = setup_at(0x0120, &[0xEF]);
    cpu.regs.sp = 0xD000;

    assert_eq!(cpu.step(&mut mmu), timing(1, 16));
    assert_eq!(cpu.regs.pc, 0x0028);
    assert_eq!(cpu.regs.sp, 0xCFFE);
    assert_eq!(mmu.pop_word(0xCFFE), 0x0121);
}

#[test]
fn push_pop_round_trip_masks_flags() {
    // PUSH BC ; POP AF ; PUSH AF ; POP DE
    let (mut cpu, mut mmu) = setup(&[0xC5, 0xF1, 0xF5, 0xD1]);
    cpu.regs.sp = 0xD000;
    cpu.regs.set_bc(0x12FF);

    assert_eq!(cpu.step(&mut mmu), timing(1, 16));
    assert_eq!(cpu.regs.sp, 0xCFFE);
    assert_eq!(cpu.step(&mut mmu), timing(1, 12));
    assert_eq!(cpu.regs.af(), 0x12F0);

    step_n(&mut cpu, &mut mmu, 2);
    assert_eq!(cpu.regs.de(), 0x12F0);
    assert_eq!(cpu.regs.sp, 0xD000);
}

#[test]
fn jr_is_relative_to_next_instruction() {
    let (mut cpu, mut mmu) = setup_at(0x0010, &[0x18, 0xFE]);
    assert_eq!(cpu.step(&mut mmu), timing(2, 12));
    assert_eq!(cpu.regs.pc, 0x0010);

    let (mut cpu, mut mmu) = setup_at(0x0010, &[0x18, 0x05]);
    cpu.step(&mut mmu);
    assert_eq!(cpu.regs.pc, 0x0017);
}

#[test]
fn jr_nz_falls_through_when_zero_set() {
    let (mut cpu, mut mmu) = setup(&[0x20, 0xFB]);
    cpu.set_zero_flag(true);
    assert_eq!(cpu.step(&mut mmu), timing(2, 8));
    assert_eq!(cpu.regs.pc, 0x0002);

    cpu.regs.pc = 0x0000;
    cpu.set_zero_flag(false);
    assert_eq!(cpu.step(&mut mmu), timing(2, 12));
    assert_eq!(cpu.regs.pc, 0xFFFD);
}

#[test]
fn jp_absolute_and_hl() {
    let (mut cpu, mut mmu) = setup(&[0xC3, 0x50, 0x01]);
    mmu.write_byte(0x0150, 0xE9);
    cpu.regs.set_hl(0x4000);

    assert_eq!(cpu.step(&mut mmu), timing(3, 16));
    assert_eq!(cpu.regs.pc, 0x0150);
    assert_eq!(cpu.step(&mut mmu), timing(1, 4));
    assert_eq!(cpu.regs.pc, 0x4000);
}

#[test]
fn add_hl_and_sp_offsets() {
    // ADD HL,BC ; ADD SP,-2 ; LD HL,SP+3
    let (mut cpu, mut mmu) = setup(&[0x09, 0xE8, 0xFE, 0xF8, 0x03]);
    cpu.regs.set_hl(0x0FFF);
    cpu.regs.set_bc(0x0001);
    cpu.regs.sp = 0xD000;
    cpu.set_zero_flag(true);

    cpu.step(&mut mmu);
    assert_eq!(cpu.regs.hl(), 0x1000);
    assert!(cpu.get_flag(Flag::H));
    assert!(cpu.get_flag(Flag::Z), "ADD HL keeps Z");

    assert_eq!(cpu.step(&mut mmu), timing(2, 16));
    assert_eq!(cpu.regs.sp, 0xCFFE);
    assert!(!cpu.get_flag(Flag::Z));

    assert_eq!(cpu.step(&mut mmu), timing(2, 12));
    assert_eq!(cpu.regs.hl(), 0xD001);
    assert_eq!(cpu.regs.sp, 0xCFFE);
}

#[test]
fn ld_a16_sp_stores_little_endian() {
    let (mut cpu, mut mmu) = setup(&[0x08, 0x00, 0xC0]);
    cpu.regs.sp = 0xBEEF;
    assert_eq!(cpu.step(&mut mmu), timing(3, 20));
    assert_eq!(mmu.read_word(0xC000), 0xBEEF);
}

#[test]
fn rotate_a_clears_zero() {
    // RLCA ; RRA
    let (mut cpu, mut mmu) = setup(&[0x07, 0x1F]);
    cpu.regs.a = 0x80;

    cpu.step(&mut mmu);
    assert_eq!(cpu.regs.a, 0x01);
    assert!(cpu.get_flag(Flag::C));
    assert!(!cpu.get_flag(Flag::Z));

    cpu.regs.a = 0x01;
    cpu.step(&mut mmu);
    assert_eq!(cpu.regs.a, 0x80);
    assert!(cpu.get_flag(Flag::C));
    assert!(!cpu.get_flag(Flag::Z));
}

#[test]
fn cpl_scf_ccf() {
    let (mut cpu, mut mmu) = setup(&[0x2F, 0x37, 0x3F]);
    cpu.regs.a = 0x0F;

    cpu.step(&mut mmu);
    assert_eq!(cpu.regs.a, 0xF0);
    assert!(cpu.get_flag(Flag::N) && cpu.get_flag(Flag::H));

    cpu.step(&mut mmu);
    assert!(cpu.get_flag(Flag::C));
    assert!(!cpu.get_flag(Flag::N) && !cpu.get_flag(Flag::H));

    cpu.step(&mut mmu);
    assert!(!cpu.get_flag(Flag::C));
}

#[test]
fn cb_bit_tests_register() {
    let (mut cpu, mut mmu) = setup(&[0xCB, 0x7C, 0xCB, 0x7C]);
    cpu.regs.h = 0x80;
    cpu.set_carry_flag(true);

    assert_eq!(cpu.step(&mut mmu), timing(2, 8));
    assert_eq!(cpu.regs.pc, 0x0002);
    assert!(!cpu.get_flag(Flag::Z));
    assert!(!cpu.get_flag(Flag::N));
    assert!(cpu.get_flag(Flag::H));
    assert!(cpu.get_flag(Flag::C));

    cpu.regs.h = 0x7F;
    cpu.step(&mut mmu);
    assert!(cpu.get_flag(Flag::Z));
}

#[test]
fn cb_rl_shifts_through_carry() {
    let (mut cpu, mut mmu) = setup(&[0xCB, 0x11, 0xCB, 0x11]);
    cpu.regs.c = 0x80;

    cpu.step(&mut mmu);
    assert_eq!(cpu.regs.c, 0x00);
    assert!(cpu.get_flag(Flag::Z));
    assert!(cpu.get_flag(Flag::C));

    cpu.step(&mut mmu);
    assert_eq!(cpu.regs.c, 0x01);
    assert!(!cpu.get_flag(Flag::Z));
    assert!(!cpu.get_flag(Flag::C));
}

#[test]
fn cb_hl_operands_cost_more() {
    // SET 0,(HL) ; BIT 0,(HL) ; SWAP (HL) ; RES 4,(HL)
    let (mut cpu, mut mmu) = setup(&[0xCB, 0xC6, 0xCB, 0x46, 0xCB, 0x36, 0xCB, 0xA6]);
    cpu.regs.set_hl(0xC000);

    assert_eq!(cpu.step(&mut mmu), timing(2, 16));
    assert_eq!(mmu.read_byte(0xC000), 0x01);

    assert_eq!(cpu.step(&mut mmu), timing(2, 12));
    assert!(!cpu.get_flag(Flag::Z));

    cpu.step(&mut mmu);
    assert_eq!(mmu.read_byte(0xC000), 0x10);

    cpu.step(&mut mmu);
    assert_eq!(mmu.read_byte(0xC000), 0x00);
}

#[test]
fn cb_shifts_and_bit_writes() {
    // SLA E ; SRA B ; SWAP C ; SRL (HL) ; RES 7,A ; SET 3,(HL)
    let (mut cpu, mut mmu) = setup(&[
        0xCB, 0x23, 0xCB, 0x28, 0xCB, 0x31, 0xCB, 0x3E, 0xCB, 0xBF, 0xCB, 0xDE,
    ]);
    cpu.regs.e = 0x80;
    cpu.regs.b = 0x81;
    cpu.regs.c = 0xF0;
    cpu.regs.a = 0xFF;
    cpu.regs.set_hl(0xC000);
    mmu.write_byte(0xC000, 0x01);

    cpu.step(&mut mmu);
    assert_eq!(cpu.regs.e, 0x00);
    assert!(cpu.get_flag(Flag::Z));
    assert!(cpu.get_flag(Flag::C));

    // SRA keeps bit 7.
    cpu.step(&mut mmu);
    assert_eq!(cpu.regs.b, 0xC0);
    assert!(!cpu.get_flag(Flag::Z));
    assert!(cpu.get_flag(Flag::C));

    cpu.step(&mut mmu);
    assert_eq!(cpu.regs.c, 0x0F);
    assert_eq!(cpu.regs.f, 0x00);

    assert_eq!(cpu.step(&mut mmu), timing(2, 16));
    assert_eq!(mmu.read_byte(0xC000), 0x00);
    assert!(cpu.get_flag(Flag::Z));
    assert!(cpu.get_flag(Flag::C));

    // RES and SET leave flags alone.
    let flags = cpu.regs.f;
    assert_eq!(cpu.step(&mut mmu), timing(2, 8));
    assert_eq!(cpu.regs.a, 0x7F);
    assert_eq!(cpu.regs.f, flags);

    assert_eq!(cpu.step(&mut mmu), timing(2, 16));
    assert_eq!(mmu.read_byte(0xC000), 0x08);
    assert_eq!(cpu.regs.f, flags);
    assert_eq!(cpu.regs.pc, 0x000C);
}

#[test]
fn sp_offset_flags_with_negative_offset() {
    // ADD SP,-1 ; LD HL,SP-1
    let (mut cpu, mut mmu) = setup(&[0xE8, 0xFF, 0xF8, 0xFF]);
    cpu.regs.sp = 0xD001;
    cpu.set_zero_flag(true);
    cpu.set_subtract_flag(true);

    // Low byte 0x01 + 0xFF carries out of bits 3 and 7.
    cpu.step(&mut mmu);
    assert_eq!(cpu.regs.sp, 0xD000);
    assert!(cpu.get_flag(Flag::H));
    assert!(cpu.get_flag(Flag::C));
    assert!(!cpu.get_flag(Flag::Z));
    assert!(!cpu.get_flag(Flag::N));

    // Low byte 0x00 + 0xFF carries out of neither.
    cpu.step(&mut mmu);
    assert_eq!(cpu.regs.hl(), 0xCFFF);
    assert_eq!(cpu.regs.sp, 0xD000);
    assert!(!cpu.get_flag(Flag::H));
    assert!(!cpu.get_flag(Flag::C));
}

#[test]
fn every_decoded_opcode_has_a_handler() {
    for opcode in 0..=0xFFu8 {
        if opcode == opcodes::PREFIX_CB || opcodes::decode(opcode).is_none() {
            continue;
        }
        let (mut cpu, mut mmu) = setup_at(0x0200, &[opcode, 0x00, 0xC0]);
        cpu.regs.sp = 0xD000;
        cpu.dispatch(&mut mmu, opcode);
        assert!(!cpu.is_halted(), "opcode {opcode:#04x} halted");
    }
}

#[test]
fn missing_handler_halts_instead_of_panicking() {
    let (mut cpu, mut mmu) = setup_at(0x0200, &[0xD3]);
    // As if dispatch had already moved past a one-byte instruction.
    cpu.regs.pc = 0x0201;

    cpu.exec_opcode(&mut mmu, 0xD3, helpers::Operands::default());

    assert_eq!(
        cpu.halt_reason(),
        Some(HaltReason {
            opcode: 0xD3,
            address: 0x0200
        })
    );
    assert_eq!(cpu.regs.pc, 0x0200);
    assert_eq!(cpu.last, Timing::default());
}

#[test]
fn clock_accumulates_across_steps() {
    let (mut cpu, mut mmu) = setup(&[0x00, 0x01, 0x50, 0x01, 0x03]);
    step_n(&mut cpu, &mut mmu, 3);
    assert_eq!(cpu.clock(), Clock { m: 5, t: 24 });
    assert_eq!(cpu.last, timing(1, 8));
}

#[test]
fn ei_takes_effect_after_next_instruction() {
    // EI ; NOP ; NOP
    let (mut cpu, mut mmu) = setup(&[0xFB, 0x00, 0x00]);
    cpu.regs.sp = 0xD000;
    mmu.write_byte(IE_ADDR, Interrupt::VBLANK.bits());
    mmu.write_byte(IF_ADDR, Interrupt::VBLANK.bits());

    cpu.step(&mut mmu);
    assert!(!cpu.ime());
    assert_eq!(cpu.regs.pc, 0x0001);

    // The instruction after EI still runs before the interrupt.
    cpu.step(&mut mmu);
    assert!(cpu.ime());
    assert_eq!(cpu.regs.pc, 0x0002);

    assert_eq!(cpu.step(&mut mmu), timing(5, 20));
    assert_eq!(cpu.regs.pc, 0x0040);
    assert!(!cpu.ime());
    assert_eq!(mmu.read_byte(IF_ADDR), 0x00);
    assert_eq!(mmu.pop_word(cpu.regs.sp), 0x0002);
}

#[test]
fn di_cancels_pending_ei() {
    let (mut cpu, mut mmu) = setup(&[0xFB, 0xF3, 0x00, 0x00]);
    step_n(&mut cpu, &mut mmu, 4);
    assert!(!cpu.ime());
}

#[test]
fn reti_returns_and_enables_interrupts() {
    let (mut cpu, mut mmu) = setup_at(0x0300, &[0x00]);
    mmu.write_byte(0x0048, 0xD9);
    cpu.regs.sp = 0xD000;
    cpu.ime = true;
    mmu.write_byte(IE_ADDR, 0x1F);
    Interrupt::request(&mut mmu, Interrupt::LCD_STAT);

    cpu.step(&mut mmu);
    assert_eq!(cpu.regs.pc, 0x0048);

    assert_eq!(cpu.step(&mut mmu), timing(1, 16));
    assert_eq!(cpu.regs.pc, 0x0300);
    assert!(cpu.ime());
}

#[test]
fn interrupts_are_taken_by_priority() {
    let (mut cpu, mut mmu) = setup(&[0x00]);
    cpu.regs.sp = 0xD000;
    cpu.ime = true;
    mmu.write_byte(IE_ADDR, 0x1F);
    Interrupt::request(&mut mmu, Interrupt::JOYPAD | Interrupt::TIMER);

    cpu.step(&mut mmu);
    assert_eq!(cpu.regs.pc, 0x0050);
    assert_eq!(Interrupt::pending(&mut mmu), Interrupt::JOYPAD);
}

#[test]
fn disabled_lines_are_not_serviced() {
    let (mut cpu, mut mmu) = setup(&[0x00]);
    cpu.ime = true;
    mmu.write_byte(IE_ADDR, Interrupt::SERIAL.bits());
    Interrupt::request(&mut mmu, Interrupt::VBLANK);

    assert_eq!(cpu.step(&mut mmu), timing(1, 4));
    assert_eq!(cpu.regs.pc, 0x0001);
}

#[test]
fn halt_idles_until_a_line_is_pending() {
    let (mut cpu, mut mmu) = setup(&[0x76, 0x3C]);

    assert_eq!(cpu.step(&mut mmu), timing(1, 4));
    assert_eq!(cpu.sleep(), Some(Sleep::Halt));
    assert_eq!(cpu.regs.pc, 0x0001);

    step_n(&mut cpu, &mut mmu, 3);
    assert_eq!(cpu.regs.pc, 0x0001);
    assert_eq!(cpu.regs.a, 0x00);
    assert_eq!(cpu.clock().m, 4);

    // IME is clear: the line wakes the CPU but is not serviced.
    mmu.write_byte(IE_ADDR, Interrupt::TIMER.bits());
    Interrupt::request(&mut mmu, Interrupt::TIMER);
    cpu.step(&mut mmu);
    assert_eq!(cpu.sleep(), None);
    assert_eq!(cpu.regs.a, 0x01);
    assert_eq!(cpu.regs.pc, 0x0002);
    assert_eq!(mmu.read_byte(IF_ADDR), Interrupt::TIMER.bits());
}

#[test]
fn stop_wakes_only_on_joypad() {
    let (mut cpu, mut mmu) = setup(&[0x10, 0x00, 0x00]);
    cpu.regs.sp = 0xD000;
    cpu.ime = true;
    mmu.write_byte(IE_ADDR, 0x1F);

    assert_eq!(cpu.step(&mut mmu), timing(2, 4));
    assert_eq!(cpu.sleep(), Some(Sleep::Stop));
    assert_eq!(cpu.regs.pc, 0x0002);

    Interrupt::request(&mut mmu, Interrupt::TIMER);
    cpu.step(&mut mmu);
    assert_eq!(cpu.sleep(), Some(Sleep::Stop));
    assert_eq!(cpu.regs.pc, 0x0002);

    // Once joypad wakes the CPU, the higher-priority timer goes first.
    Interrupt::request(&mut mmu, Interrupt::JOYPAD);
    assert_eq!(cpu.step(&mut mmu), timing(5, 20));
    assert_eq!(cpu.sleep(), None);
    assert_eq!(cpu.regs.pc, 0x0050);
}

#[test]
fn trace_line_after_reset() {
    let cpu = Cpu::new();
    assert_eq!(
        cpu.trace(0x31),
        "PC:0000 OP:31 A:00 B:00 C:00 D:00 E:00 H:00 L:00 SP:0000 F:00 ---- LD SP,d16"
    );
}

#[test]
fn trace_line_shows_flags_and_unknown_opcodes() {
    let mut cpu = Cpu::new();
    cpu.regs.pc = 0x0150;
    cpu.regs.a = 0x12;
    cpu.regs.sp = 0xFFFE;
    cpu.set_zero_flag(true);
    cpu.set_carry_flag(true);

    assert_eq!(
        cpu.trace(0xD3),
        "PC:0150 OP:D3 A:12 B:00 C:00 D:00 E:00 H:00 L:00 SP:FFFE F:90 Z--C UNKNOWN OPCODE"
    );
}

#[test]
fn works_with_any_bus() {
    struct CountingBus {
        memory: Vec<u8>,
        writes: usize,
    }

    impl Bus for CountingBus {
        fn read8(&mut self, addr: u16) -> u8 {
            self.memory[addr as usize]
        }

        fn write8(&mut self, addr: u16, value: u8) {
            self.writes += 1;
            self.memory[addr as usize] = value;
        }
    }

    let mut bus = CountingBus {
        memory: vec![0; 0x10000],
        writes: 0,
    };
    // CALL 0x0010 ; ... ; 0x0010: RET
    bus.memory[..3].copy_from_slice(&[0xCD, 0x10, 0x00]);
    bus.memory[0x10] = 0xC9;

    let mut cpu = Cpu::new();
    cpu.regs.sp = 0x8000;
    cpu.step(&mut bus);
    cpu.step(&mut bus);

    assert_eq!(bus.writes, 2);
    assert_eq!(cpu.regs.pc, 0x0003);
    assert_eq!(cpu.regs.sp, 0x8000);
    assert_eq!(bus.memory[0x7FFF], 0x03);
}
