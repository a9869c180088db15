//! Status register bit helpers for the 2A03/6502.
//!
//! The status register is kept as a bare `u8` everywhere in this crate so
//! dumps and trace comparisons stay bit-exact against hardware references.
//! These helpers are pure functions over that byte, not methods on the CPU.

/// Carry flag: carry out of bit 7 in arithmetic, borrow-complement in
/// subtraction, shifted-out bit in shifts and rotates.
pub const FLAG_C: u8 = 0x01;
/// Zero flag: set when an operation produces 0x00.
pub const FLAG_Z: u8 = 0x02;
/// Interrupt disable flag.
pub const FLAG_I: u8 = 0x04;
/// Decimal mode flag. Present as a bit on the 2A03 but has no effect on
/// ADC/SBC (the BCD circuitry was removed from this chip variant).
pub const FLAG_D: u8 = 0x08;
/// Break flag: set on the pushed copy of the status byte by BRK/PHP.
pub const FLAG_B: u8 = 0x10;
/// Unused bit 5. Reads as 1 at all times.
pub const FLAG_U: u8 = 0x20;
/// Overflow flag: signed overflow out of bit 7.
pub const FLAG_V: u8 = 0x40;
/// Negative/sign flag: copy of bit 7 of the result.
pub const FLAG_N: u8 = 0x80;

/// Returns a copy of `flags` with the given flag bit(s) set.
#[inline]
pub fn set_flag(flags: u8, flag: u8) -> u8 {
    flags | flag
}

/// Returns a copy of `flags` with the given flag bit(s) cleared.
#[inline]
pub fn clear_flag(flags: u8, flag: u8) -> u8 {
    flags & !flag
}

/// Returns true if any of the given flag bit(s) are set in `flags`.
#[inline]
pub fn is_flag_set(flags: u8, flag: u8) -> bool {
    flags & flag != 0
}

/// Set or clear a flag depending on `condition`.
#[inline]
pub fn assign_flag(flags: u8, flag: u8, condition: bool) -> u8 {
    if condition {
        set_flag(flags, flag)
    } else {
        clear_flag(flags, flag)
    }
}
