//! ALU behavior: add/subtract with carry, compares, logic, shifts, and
//! increments, with the flag outcomes the table entries promise.

use super::{cpu_with_program, step};
use crate::bus::Bus;
use crate::flags::{is_flag_set, FLAG_C, FLAG_N, FLAG_V, FLAG_Z};

#[test]
fn adc_sets_signed_overflow_on_like_sign_operands() {
    // LDA #$50; ADC #$50 -- 0x50 + 0x50 = 0xA0: positive + positive
    // yielding negative is overflow.
    let (mut cpu, _bus) = cpu_with_program(0x8000, &[0xA9, 0x50, 0x69, 0x50]);
    step(&mut cpu);
    step(&mut cpu);
    assert_eq!(cpu.a, 0xA0);
    assert!(is_flag_set(cpu.status, FLAG_V));
    assert!(is_flag_set(cpu.status, FLAG_N));
    assert!(!is_flag_set(cpu.status, FLAG_C));
}

#[test]
fn adc_sets_carry_and_zero_on_wraparound() {
    // LDA #$FF; ADC #$01
    let (mut cpu, _bus) = cpu_with_program(0x8000, &[0xA9, 0xFF, 0x69, 0x01]);
    step(&mut cpu);
    step(&mut cpu);
    assert_eq!(cpu.a, 0x00);
    assert!(is_flag_set(cpu.status, FLAG_C));
    assert!(is_flag_set(cpu.status, FLAG_Z));
    assert!(!is_flag_set(cpu.status, FLAG_V));
}

#[test]
fn adc_consumes_carry_in() {
    // SEC; LDA #$01; ADC #$01
    let (mut cpu, _bus) = cpu_with_program(0x8000, &[0x38, 0xA9, 0x01, 0x69, 0x01]);
    step(&mut cpu);
    step(&mut cpu);
    step(&mut cpu);
    assert_eq!(cpu.a, 0x03);
}

#[test]
fn sbc_with_carry_set_subtracts_exactly() {
    // SEC; LDA #$10; SBC #$05
    let (mut cpu, _bus) = cpu_with_program(0x8000, &[0x38, 0xA9, 0x10, 0xE9, 0x05]);
    step(&mut cpu);
    step(&mut cpu);
    step(&mut cpu);
    assert_eq!(cpu.a, 0x0B);
    // No borrow occurred, so carry stays set.
    assert!(is_flag_set(cpu.status, FLAG_C));
}

#[test]
fn sbc_with_carry_clear_subtracts_one_more() {
    // CLC; LDA #$10; SBC #$05
    let (mut cpu, _bus) = cpu_with_program(0x8000, &[0x18, 0xA9, 0x10, 0xE9, 0x05]);
    step(&mut cpu);
    step(&mut cpu);
    step(&mut cpu);
    assert_eq!(cpu.a, 0x0A);
}

#[test]
fn sbc_clears_carry_on_borrow() {
    // SEC; LDA #$05; SBC #$10
    let (mut cpu, _bus) = cpu_with_program(0x8000, &[0x38, 0xA9, 0x05, 0xE9, 0x10]);
    step(&mut cpu);
    step(&mut cpu);
    step(&mut cpu);
    assert_eq!(cpu.a, 0xF5);
    assert!(!is_flag_set(cpu.status, FLAG_C));
    assert!(is_flag_set(cpu.status, FLAG_N));
}

#[test]
fn sbc_sets_overflow_crossing_sign_boundary() {
    // SEC; LDA #$80; SBC #$01 -- negative minus positive giving positive.
    let (mut cpu, _bus) = cpu_with_program(0x8000, &[0x38, 0xA9, 0x80, 0xE9, 0x01]);
    step(&mut cpu);
    step(&mut cpu);
    step(&mut cpu);
    assert_eq!(cpu.a, 0x7F);
    assert!(is_flag_set(cpu.status, FLAG_V));
    assert!(is_flag_set(cpu.status, FLAG_C));
}

#[test]
fn cmp_flag_matrix() {
    // LDA #$40; CMP #$40; CMP #$41; CMP #$3F
    let (mut cpu, _bus) =
        cpu_with_program(0x8000, &[0xA9, 0x40, 0xC9, 0x40, 0xC9, 0x41, 0xC9, 0x3F]);
    step(&mut cpu);

    step(&mut cpu); // equal
    assert!(is_flag_set(cpu.status, FLAG_Z));
    assert!(is_flag_set(cpu.status, FLAG_C));

    step(&mut cpu); // less than operand
    assert!(!is_flag_set(cpu.status, FLAG_Z));
    assert!(!is_flag_set(cpu.status, FLAG_C));
    assert!(is_flag_set(cpu.status, FLAG_N));

    step(&mut cpu); // greater than operand
    assert!(!is_flag_set(cpu.status, FLAG_Z));
    assert!(is_flag_set(cpu.status, FLAG_C));
}

#[test]
fn cpx_and_cpy_compare_their_registers() {
    // LDX #$05; CPX #$05; LDY #$01; CPY #$02
    let (mut cpu, _bus) =
        cpu_with_program(0x8000, &[0xA2, 0x05, 0xE0, 0x05, 0xA0, 0x01, 0xC0, 0x02]);
    step(&mut cpu);
    step(&mut cpu);
    assert!(is_flag_set(cpu.status, FLAG_Z));
    assert!(is_flag_set(cpu.status, FLAG_C));
    step(&mut cpu);
    step(&mut cpu);
    assert!(!is_flag_set(cpu.status, FLAG_C));
}

#[test]
fn logic_operations_set_zero_and_negative() {
    // LDA #$F0; AND #$0F; LDA #$F0; ORA #$0F; LDA #$FF; EOR #$FF
    let (mut cpu, _bus) = cpu_with_program(
        0x8000,
        &[0xA9, 0xF0, 0x29, 0x0F, 0xA9, 0xF0, 0x09, 0x0F, 0xA9, 0xFF, 0x49, 0xFF],
    );
    step(&mut cpu);
    step(&mut cpu);
    assert_eq!(cpu.a, 0x00);
    assert!(is_flag_set(cpu.status, FLAG_Z));

    step(&mut cpu);
    step(&mut cpu);
    assert_eq!(cpu.a, 0xFF);
    assert!(is_flag_set(cpu.status, FLAG_N));

    step(&mut cpu);
    step(&mut cpu);
    assert_eq!(cpu.a, 0x00);
    assert!(is_flag_set(cpu.status, FLAG_Z));
}

#[test]
fn bit_copies_memory_bits_into_v_and_n() {
    // LDA #$00; BIT $10 with memory 0xC0.
    let (mut cpu, bus) = cpu_with_program(0x8000, &[0xA9, 0x00, 0x24, 0x10]);
    bus.borrow_mut().write(0x0010, 0xC0);

    step(&mut cpu);
    step(&mut cpu);
    assert!(is_flag_set(cpu.status, FLAG_Z));
    assert!(is_flag_set(cpu.status, FLAG_V));
    assert!(is_flag_set(cpu.status, FLAG_N));
    // BIT never touches the accumulator.
    assert_eq!(cpu.a, 0x00);
}

#[test]
fn bit_zero_flag_tracks_the_and_result() {
    // LDA #$40; BIT $10 with memory 0x40.
    let (mut cpu, bus) = cpu_with_program(0x8000, &[0xA9, 0x40, 0x24, 0x10]);
    bus.borrow_mut().write(0x0010, 0x40);

    step(&mut cpu);
    step(&mut cpu);
    assert!(!is_flag_set(cpu.status, FLAG_Z));
    assert!(is_flag_set(cpu.status, FLAG_V));
    assert!(!is_flag_set(cpu.status, FLAG_N));
}

#[test]
fn inc_and_dec_memory_wrap() {
    // INC $10 (0xFF -> 0x00); DEC $10 (0x00 -> 0xFF)
    let (mut cpu, bus) = cpu_with_program(0x8000, &[0xE6, 0x10, 0xC6, 0x10]);
    bus.borrow_mut().write(0x0010, 0xFF);

    step(&mut cpu);
    assert_eq!(bus.borrow().read(0x0010), 0x00);
    assert!(is_flag_set(cpu.status, FLAG_Z));

    step(&mut cpu);
    assert_eq!(bus.borrow().read(0x0010), 0xFF);
    assert!(is_flag_set(cpu.status, FLAG_N));
}

#[test]
fn register_increments_wrap() {
    // LDX #$FF; INX; DEX
    let (mut cpu, _bus) = cpu_with_program(0x8000, &[0xA2, 0xFF, 0xE8, 0xCA]);
    step(&mut cpu);
    step(&mut cpu);
    assert_eq!(cpu.x, 0x00);
    assert!(is_flag_set(cpu.status, FLAG_Z));
    step(&mut cpu);
    assert_eq!(cpu.x, 0xFF);
    assert!(is_flag_set(cpu.status, FLAG_N));
}

#[test]
fn asl_accumulator_shifts_bit7_into_carry() {
    // LDA #$81; ASL A
    let (mut cpu, _bus) = cpu_with_program(0x8000, &[0xA9, 0x81, 0x0A]);
    step(&mut cpu);
    step(&mut cpu);
    assert_eq!(cpu.a, 0x02);
    assert!(is_flag_set(cpu.status, FLAG_C));
    assert!(!is_flag_set(cpu.status, FLAG_N));
}

#[test]
fn asl_memory_writes_result_back() {
    // ASL $10 with memory 0x40.
    let (mut cpu, bus) = cpu_with_program(0x8000, &[0x06, 0x10]);
    bus.borrow_mut().write(0x0010, 0x40);

    step(&mut cpu);
    assert_eq!(bus.borrow().read(0x0010), 0x80);
    assert!(is_flag_set(cpu.status, FLAG_N));
    assert!(!is_flag_set(cpu.status, FLAG_C));
}

#[test]
fn lsr_shifts_bit0_into_carry() {
    // LDA #$01; LSR A
    let (mut cpu, _bus) = cpu_with_program(0x8000, &[0xA9, 0x01, 0x4A]);
    step(&mut cpu);
    step(&mut cpu);
    assert_eq!(cpu.a, 0x00);
    assert!(is_flag_set(cpu.status, FLAG_C));
    assert!(is_flag_set(cpu.status, FLAG_Z));
}

#[test]
fn rol_rotates_through_carry() {
    // SEC; LDA #$80; ROL A -- bit7 out to carry, old carry into bit0.
    let (mut cpu, _bus) = cpu_with_program(0x8000, &[0x38, 0xA9, 0x80, 0x2A]);
    step(&mut cpu);
    step(&mut cpu);
    step(&mut cpu);
    assert_eq!(cpu.a, 0x01);
    assert!(is_flag_set(cpu.status, FLAG_C));
}

#[test]
fn ror_rotates_through_carry() {
    // SEC; LDA #$01; ROR A
    let (mut cpu, _bus) = cpu_with_program(0x8000, &[0x38, 0xA9, 0x01, 0x6A]);
    step(&mut cpu);
    step(&mut cpu);
    step(&mut cpu);
    assert_eq!(cpu.a, 0x80);
    assert!(is_flag_set(cpu.status, FLAG_C));
    assert!(is_flag_set(cpu.status, FLAG_N));
}
