//! Operand resolution: zero-page wraparound, indexing, indirection, and
//! the JMP pointer page-wrap bug.

use super::{cpu_with_program, step};
use crate::bus::Bus;

#[test]
fn zero_page_x_wraps_within_page_zero() {
    // LDX #$02; LDA $FF,X -- effective address is 0x0001, not 0x0101.
    let (mut cpu, bus) = cpu_with_program(0x8000, &[0xA2, 0x02, 0xB5, 0xFF]);
    bus.borrow_mut().write(0x0001, 0x5A);
    bus.borrow_mut().write(0x0101, 0x77);

    step(&mut cpu);
    step(&mut cpu);
    assert_eq!(cpu.a, 0x5A);
}

#[test]
fn zero_page_y_wraps_within_page_zero() {
    // LDY #$03; LDX $FE,Y
    let (mut cpu, bus) = cpu_with_program(0x8000, &[0xA0, 0x03, 0xB6, 0xFE]);
    bus.borrow_mut().write(0x0001, 0x9C);

    step(&mut cpu);
    step(&mut cpu);
    assert_eq!(cpu.x, 0x9C);
}

#[test]
fn absolute_operand_is_little_endian() {
    // LDA $1234
    let (mut cpu, bus) = cpu_with_program(0x8000, &[0xAD, 0x34, 0x12]);
    bus.borrow_mut().write(0x1234, 0x99);

    step(&mut cpu);
    assert_eq!(cpu.a, 0x99);
}

#[test]
fn absolute_x_adds_index_across_pages() {
    // LDX #$01; LDA $00FF,X -- effective address 0x0100.
    let (mut cpu, bus) = cpu_with_program(0x8000, &[0xA2, 0x01, 0xBD, 0xFF, 0x00]);
    bus.borrow_mut().write(0x0100, 0x66);

    step(&mut cpu);
    step(&mut cpu);
    assert_eq!(cpu.a, 0x66);
}

#[test]
fn indirect_x_reads_pointer_from_indexed_zero_page() {
    // LDX #$04; LDA ($20,X) -- pointer at 0x24/0x25.
    let (mut cpu, bus) = cpu_with_program(0x8000, &[0xA2, 0x04, 0xA1, 0x20]);
    bus.borrow_mut().write(0x0024, 0x00);
    bus.borrow_mut().write(0x0025, 0x40);
    bus.borrow_mut().write(0x4000, 0x77);

    step(&mut cpu);
    step(&mut cpu);
    assert_eq!(cpu.a, 0x77);
}

#[test]
fn indirect_x_pointer_high_byte_wraps_in_zero_page() {
    // LDX #$02; LDA ($FD,X) -- pointer low at 0x00FF, high at 0x0000.
    let (mut cpu, bus) = cpu_with_program(0x8000, &[0xA2, 0x02, 0xA1, 0xFD]);
    bus.borrow_mut().write(0x00FF, 0x34);
    bus.borrow_mut().write(0x0000, 0x12);
    bus.borrow_mut().write(0x1234, 0x5C);

    step(&mut cpu);
    step(&mut cpu);
    assert_eq!(cpu.a, 0x5C);
}

#[test]
fn indirect_y_adds_y_to_pointer_base() {
    // LDY #$10; LDA ($30),Y -- base 0x2000 from zero page, plus 0x10.
    let (mut cpu, bus) = cpu_with_program(0x8000, &[0xA0, 0x10, 0xB1, 0x30]);
    bus.borrow_mut().write(0x0030, 0x00);
    bus.borrow_mut().write(0x0031, 0x20);
    bus.borrow_mut().write(0x2010, 0x42);

    step(&mut cpu);
    step(&mut cpu);
    assert_eq!(cpu.a, 0x42);
}

#[test]
fn jmp_indirect_reproduces_page_wrap_bug() {
    // JMP ($30FF): low byte from 0x30FF, high byte from 0x3000 (not
    // 0x3100) because the pointer increment wraps within the page.
    let (mut cpu, bus) = cpu_with_program(0x8000, &[0x6C, 0xFF, 0x30]);
    bus.borrow_mut().write(0x30FF, 0x40);
    bus.borrow_mut().write(0x3000, 0x80);
    bus.borrow_mut().write(0x3100, 0x50);

    step(&mut cpu);
    assert_eq!(cpu.pc, 0x8040);
}

#[test]
fn jmp_indirect_without_page_boundary_is_straightforward() {
    // JMP ($3000)
    let (mut cpu, bus) = cpu_with_program(0x8000, &[0x6C, 0x00, 0x30]);
    bus.borrow_mut().write(0x3000, 0x34);
    bus.borrow_mut().write(0x3001, 0x12);

    step(&mut cpu);
    assert_eq!(cpu.pc, 0x1234);
}

#[test]
fn jmp_absolute_sets_pc_to_operand() {
    let (mut cpu, _bus) = cpu_with_program(0x8000, &[0x4C, 0x00, 0x90]);
    step(&mut cpu);
    assert_eq!(cpu.pc, 0x9000);
}
