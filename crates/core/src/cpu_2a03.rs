//! 2A03 CPU core (6502 without decimal mode).
//!
//! The engine is table-driven: every opcode byte indexes a fixed
//! 256-entry [`INSTRUCTION_TABLE`] of `{mnemonic, operation, addressing
//! mode, base cycles, page-cross extra}` records. One [`Cpu2a03::tick`]
//! models one master clock pulse delivered to the CPU; a full instruction
//! occupies exactly as many ticks as its total cycle cost.
//!
//! The CPU holds a non-owning reference to a [`Bus`] shared with other
//! memory-mapped components. Running without a connected bus is defined
//! behavior: reads return 0 and writes are ignored, so `reset`/`tick`
//! can never fault. Reserved opcodes dispatch to a zero-cost no-op, so
//! the fetch loop makes forward progress on any byte stream.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bus::Bus;
use crate::clock::Tickable;
use crate::flags::{
    assign_flag, clear_flag, is_flag_set, set_flag, FLAG_B, FLAG_C, FLAG_D, FLAG_I, FLAG_N,
    FLAG_U, FLAG_V, FLAG_Z,
};
use crate::logging::{log, LogCategory, LogLevel};
use crate::StateError;

/// Address of the reset vector low byte; the high byte follows at +1.
pub const RESET_VECTOR: u16 = 0xFFFC;
/// Address of the BRK/IRQ vector low byte.
pub const IRQ_VECTOR: u16 = 0xFFFE;
/// The stack lives in page one; SP is an offset into it.
const STACK_BASE: u16 = 0x0100;
/// Power-on/reset stack pointer value.
const RESET_SP: u8 = 0xFD;
/// Documented reset latency in cycles.
const RESET_CYCLES: u8 = 6;

/// Assemble a 16-bit address from its high and low bytes.
#[inline]
pub fn address_from_bytes(hi: u8, lo: u8) -> u16 {
    (hi as u16) << 8 | lo as u16
}

/// The 13 operand-resolution strategies of the 6502.
///
/// Resolution consumes 0, 1, or 2 bytes at the program counter and
/// produces `(operand value, effective address, page crossed)`. The PC
/// advance happens before any page-cross arithmetic so the opcode stream
/// stays aligned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrMode {
    /// No operand.
    Implied,
    /// Operand is the accumulator.
    Accumulator,
    /// Operand is the byte following the opcode.
    Immediate,
    /// One byte, zero-extended to a page-zero address.
    ZeroPage,
    /// Zero-page base plus X, wrapping within page zero.
    ZeroPageX,
    /// Zero-page base plus Y, wrapping within page zero.
    ZeroPageY,
    /// One byte signed displacement for branches.
    Relative,
    /// Two bytes, low byte first.
    Absolute,
    /// Absolute base plus X; +1 cycle on page cross for flagged opcodes.
    AbsoluteX,
    /// Absolute base plus Y; +1 cycle on page cross for flagged opcodes.
    AbsoluteY,
    /// JMP only: pointer dereference with the page-wrap hardware bug.
    Indirect,
    /// Pre-indexed: pointer = zero page at (operand + X).
    IndirectX,
    /// Post-indexed: base from zero page at operand, then + Y.
    IndirectY,
}

/// Operation body: `(operand value, effective address) -> extra cycles`.
///
/// The return value is *additional* cycles beyond the table's base cost,
/// used by instructions whose cost depends on outcome (branches).
type Operation = fn(&mut Cpu2a03, u8, u16) -> u8;

/// One immutable slot of the 256-entry dispatch table.
#[derive(Clone, Copy)]
pub struct Instruction {
    /// Mnemonic, diagnostic only ("XXX" for reserved opcodes).
    pub name: &'static str,
    execute: Operation,
    pub mode: AddrMode,
    /// Base cycle cost latched into `cycles_remaining` at dispatch.
    pub cycles: u8,
    /// Extra cycles added when addressing crossed a page (0 or 1).
    pub page_cross_cycles: u8,
}

/// Registers and cycle counter snapshot.
///
/// Diagnostics take this copy instead of holding a live reference into
/// the CPU, so observers on another thread see a consistent state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuState {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub status: u8,
    pub cycles_remaining: u8,
}

/// 2A03 CPU: registers, status flags, and the cycle-accounting engine.
pub struct Cpu2a03 {
    /// Accumulator.
    pub a: u8,
    /// X index register.
    pub x: u8,
    /// Y index register.
    pub y: u8,
    /// Stack pointer, an offset into page 0x0100.
    pub sp: u8,
    /// Program counter.
    pub pc: u16,
    /// Status register. The unused bit is set at all times.
    pub status: u8,
    /// Cycles left before the next fetch/decode/execute.
    cycles_remaining: u8,
    bus: Option<Rc<RefCell<dyn Bus>>>,
}

impl Cpu2a03 {
    pub fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            sp: RESET_SP,
            pc: 0,
            status: FLAG_U,
            cycles_remaining: 0,
            bus: None,
        }
    }

    /// Bind a bus. Must happen before `reset`/`tick` do anything useful;
    /// until then reads return 0 and writes are dropped.
    pub fn connect_bus(&mut self, bus: Rc<RefCell<dyn Bus>>) {
        self.bus = Some(bus);
    }

    /// Cycles the current instruction still has to burn.
    pub fn cycles_remaining(&self) -> u8 {
        self.cycles_remaining
    }

    fn read(&self, addr: u16) -> u8 {
        match &self.bus {
            Some(bus) => bus.borrow().read(addr),
            None => 0,
        }
    }

    fn write(&mut self, addr: u16, val: u8) {
        if let Some(bus) = &self.bus {
            bus.borrow_mut().write(addr, val);
        }
    }

    fn read_u16(&self, addr: u16) -> u16 {
        let lo = self.read(addr);
        let hi = self.read(addr.wrapping_add(1));
        address_from_bytes(hi, lo)
    }

    /// Read the byte at PC and advance PC.
    fn fetch(&mut self) -> u8 {
        let v = self.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        v
    }

    fn fetch_u16(&mut self) -> u16 {
        let lo = self.fetch();
        let hi = self.fetch();
        address_from_bytes(hi, lo)
    }

    /// Dereference a JMP pointer, reproducing the hardware bug: when the
    /// pointer's low byte is 0xFF the high byte is fetched from the start
    /// of the same page instead of the next one.
    fn read_indirect_bug(&self, ptr: u16) -> u16 {
        let lo = self.read(ptr);
        let hi_addr = (ptr & 0xFF00) | (ptr.wrapping_add(1) & 0x00FF);
        let hi = self.read(hi_addr);
        address_from_bytes(hi, lo)
    }

    /// Reinitialize to the documented power-on/reset state.
    ///
    /// PC comes from the reset vector (low byte at 0xFFFC), registers
    /// clear, the status byte keeps only the unused bit, and the CPU is
    /// busy for the 6-cycle reset latency.
    pub fn reset(&mut self) {
        let lo = self.read(RESET_VECTOR);
        let hi = self.read(RESET_VECTOR.wrapping_add(1));
        self.pc = address_from_bytes(hi, lo);
        self.status = set_flag(0x00, FLAG_U);
        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.sp = RESET_SP;
        self.cycles_remaining = RESET_CYCLES;
    }

    /// Advance the CPU by one cycle.
    ///
    /// When no cycles are pending this performs one full fetch, decode,
    /// address resolution, and execution, latching the instruction's
    /// total cycle cost; otherwise it just burns one pending cycle. The
    /// decrement saturates so a zero-cost reserved opcode consumes
    /// exactly the tick that dispatched it.
    pub fn tick(&mut self) {
        if self.cycles_remaining == 0 {
            let pc = self.pc;
            let opcode = self.fetch();
            let instruction = &INSTRUCTION_TABLE[opcode as usize];
            log(LogCategory::Cpu, LogLevel::Trace, || {
                format!("{:04X}  {:02X}  {}", pc, opcode, instruction.name)
            });

            self.cycles_remaining = instruction.cycles;
            let (value, address, page_crossed) = self.resolve(instruction.mode);
            if page_crossed {
                self.cycles_remaining += instruction.page_cross_cycles;
            }
            self.cycles_remaining += (instruction.execute)(self, value, address);
        }
        self.cycles_remaining = self.cycles_remaining.saturating_sub(1);
    }

    /// Set the program counter from an address split into bytes.
    pub fn set_program_counter(&mut self, hi: u8, lo: u8) {
        self.pc = address_from_bytes(hi, lo);
    }

    /// Multi-line diagnostic rendering of the register file.
    ///
    /// Read-only: calling this never changes CPU or bus state.
    pub fn dump(&self) -> String {
        format!(
            "PC: {:04X}\nA : {:02X}\nX : {:02X}\nY : {:02X}\nSP: {:02X}\nStatus: {:08b}\nCycles: {}",
            self.pc, self.a, self.x, self.y, self.sp, self.status, self.cycles_remaining
        )
    }

    /// Consistent copy of the register file for diagnostics.
    pub fn registers(&self) -> CpuState {
        CpuState {
            a: self.a,
            x: self.x,
            y: self.y,
            sp: self.sp,
            pc: self.pc,
            status: self.status,
            cycles_remaining: self.cycles_remaining,
        }
    }

    /// JSON snapshot of the register file.
    pub fn save_state(&self) -> Value {
        serde_json::to_value(self.registers()).unwrap_or(Value::Null)
    }

    /// Restore registers from a [`Cpu2a03::save_state`] snapshot.
    pub fn load_state(&mut self, v: &Value) -> Result<(), StateError> {
        let state: CpuState = serde_json::from_value(v.clone())?;
        self.a = state.a;
        self.x = state.x;
        self.y = state.y;
        self.sp = state.sp;
        self.pc = state.pc;
        // The unused bit is an invariant of the live register, whatever
        // the snapshot says.
        self.status = set_flag(state.status, FLAG_U);
        self.cycles_remaining = state.cycles_remaining;
        Ok(())
    }

    /// Resolve an addressing mode: consume operand bytes at PC and
    /// produce `(operand value, effective address, page crossed)`.
    fn resolve(&mut self, mode: AddrMode) -> (u8, u16, bool) {
        match mode {
            AddrMode::Implied => (0, 0, false),
            AddrMode::Accumulator => (self.a, 0, false),
            AddrMode::Immediate => {
                let addr = self.pc;
                let value = self.fetch();
                (value, addr, false)
            }
            AddrMode::ZeroPage => {
                let addr = self.fetch() as u16;
                (self.read(addr), addr, false)
            }
            AddrMode::ZeroPageX => {
                let addr = self.fetch().wrapping_add(self.x) as u16;
                (self.read(addr), addr, false)
            }
            AddrMode::ZeroPageY => {
                let addr = self.fetch().wrapping_add(self.y) as u16;
                (self.read(addr), addr, false)
            }
            AddrMode::Relative => {
                let addr = self.pc;
                let value = self.fetch();
                (value, addr, false)
            }
            AddrMode::Absolute => {
                let addr = self.fetch_u16();
                (self.read(addr), addr, false)
            }
            AddrMode::AbsoluteX => {
                let base = self.fetch_u16();
                let addr = base.wrapping_add(self.x as u16);
                let crossed = addr & 0xFF00 != base & 0xFF00;
                (self.read(addr), addr, crossed)
            }
            AddrMode::AbsoluteY => {
                let base = self.fetch_u16();
                let addr = base.wrapping_add(self.y as u16);
                let crossed = addr & 0xFF00 != base & 0xFF00;
                (self.read(addr), addr, crossed)
            }
            AddrMode::Indirect => {
                let ptr = self.fetch_u16();
                let addr = self.read_indirect_bug(ptr);
                (self.read(addr), addr, false)
            }
            AddrMode::IndirectX => {
                let zp = self.fetch().wrapping_add(self.x);
                let lo = self.read(zp as u16);
                let hi = self.read(zp.wrapping_add(1) as u16);
                let addr = address_from_bytes(hi, lo);
                (self.read(addr), addr, false)
            }
            AddrMode::IndirectY => {
                let zp = self.fetch();
                let lo = self.read(zp as u16);
                let hi = self.read(zp.wrapping_add(1) as u16);
                let base = address_from_bytes(hi, lo);
                let addr = base.wrapping_add(self.y as u16);
                let crossed = addr & 0xFF00 != base & 0xFF00;
                (self.read(addr), addr, crossed)
            }
        }
    }

    // ---- stack helpers (page 0x0100) ----

    fn push(&mut self, v: u8) {
        self.write(STACK_BASE + self.sp as u16, v);
        self.sp = self.sp.wrapping_sub(1);
    }

    fn pop(&mut self) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        self.read(STACK_BASE + self.sp as u16)
    }

    fn push_u16(&mut self, v: u16) {
        self.push((v >> 8) as u8);
        self.push((v & 0xFF) as u8);
    }

    fn pop_u16(&mut self) -> u16 {
        let lo = self.pop();
        let hi = self.pop();
        address_from_bytes(hi, lo)
    }

    // ---- flag/ALU helpers ----

    fn set_zn(&mut self, value: u8) {
        self.status = assign_flag(self.status, FLAG_Z, value == 0);
        self.status = assign_flag(self.status, FLAG_N, value & 0x80 != 0);
    }

    /// A + value + C, setting C, V, Z, N. The decimal flag is ignored:
    /// the 2A03 has no BCD circuitry.
    fn add_with_carry(&mut self, value: u8) {
        let carry_in = if is_flag_set(self.status, FLAG_C) { 1u16 } else { 0 };
        let sum = self.a as u16 + value as u16 + carry_in;
        let result = sum as u8;
        self.status = assign_flag(self.status, FLAG_C, sum > 0xFF);
        // Signed overflow: operands agree in sign, result disagrees.
        let overflow = (!(self.a ^ value)) & (self.a ^ result) & 0x80 != 0;
        self.status = assign_flag(self.status, FLAG_V, overflow);
        self.a = result;
        self.set_zn(result);
    }

    fn compare(&mut self, register: u8, value: u8) {
        self.status = assign_flag(self.status, FLAG_C, register >= value);
        self.set_zn(register.wrapping_sub(value));
    }

    fn shift_left(&mut self, value: u8) -> u8 {
        self.status = assign_flag(self.status, FLAG_C, value & 0x80 != 0);
        let result = value << 1;
        self.set_zn(result);
        result
    }

    fn shift_right(&mut self, value: u8) -> u8 {
        self.status = assign_flag(self.status, FLAG_C, value & 0x01 != 0);
        let result = value >> 1;
        self.set_zn(result);
        result
    }

    fn rotate_left(&mut self, value: u8) -> u8 {
        let carry_in = if is_flag_set(self.status, FLAG_C) { 1 } else { 0 };
        self.status = assign_flag(self.status, FLAG_C, value & 0x80 != 0);
        let result = (value << 1) | carry_in;
        self.set_zn(result);
        result
    }

    fn rotate_right(&mut self, value: u8) -> u8 {
        let carry_in = if is_flag_set(self.status, FLAG_C) { 0x80 } else { 0 };
        self.status = assign_flag(self.status, FLAG_C, value & 0x01 != 0);
        let result = (value >> 1) | carry_in;
        self.set_zn(result);
        result
    }

    /// Take a branch to PC + sign-extended displacement. Costs one extra
    /// cycle, two when the target lands on another page than the PC the
    /// branch falls through to.
    fn branch_if(&mut self, condition: bool, displacement: u8) -> u8 {
        if !condition {
            return 0;
        }
        let origin = self.pc;
        let target = origin.wrapping_add(displacement as i8 as u16);
        self.pc = target;
        if target & 0xFF00 != origin & 0xFF00 {
            2
        } else {
            1
        }
    }

    // ---- operations ----
    //
    // Signature fixed by the dispatch table: (operand value, effective
    // address) -> extra cycles beyond the table's base cost.

    // Loads and stores

    fn lda(&mut self, value: u8, _addr: u16) -> u8 {
        self.a = value;
        self.set_zn(value);
        0
    }

    fn ldx(&mut self, value: u8, _addr: u16) -> u8 {
        self.x = value;
        self.set_zn(value);
        0
    }

    fn ldy(&mut self, value: u8, _addr: u16) -> u8 {
        self.y = value;
        self.set_zn(value);
        0
    }

    fn sta(&mut self, _value: u8, addr: u16) -> u8 {
        self.write(addr, self.a);
        0
    }

    fn stx(&mut self, _value: u8, addr: u16) -> u8 {
        self.write(addr, self.x);
        0
    }

    fn sty(&mut self, _value: u8, addr: u16) -> u8 {
        self.write(addr, self.y);
        0
    }

    // Register transfers

    fn tax(&mut self, _value: u8, _addr: u16) -> u8 {
        self.x = self.a;
        self.set_zn(self.x);
        0
    }

    fn tay(&mut self, _value: u8, _addr: u16) -> u8 {
        self.y = self.a;
        self.set_zn(self.y);
        0
    }

    fn txa(&mut self, _value: u8, _addr: u16) -> u8 {
        self.a = self.x;
        self.set_zn(self.a);
        0
    }

    fn tya(&mut self, _value: u8, _addr: u16) -> u8 {
        self.a = self.y;
        self.set_zn(self.a);
        0
    }

    fn tsx(&mut self, _value: u8, _addr: u16) -> u8 {
        self.x = self.sp;
        self.set_zn(self.x);
        0
    }

    // TXS sets no flags.
    fn txs(&mut self, _value: u8, _addr: u16) -> u8 {
        self.sp = self.x;
        0
    }

    // Stack operations

    fn pha(&mut self, _value: u8, _addr: u16) -> u8 {
        let a = self.a;
        self.push(a);
        0
    }

    // PHP pushes with B and the unused bit set.
    fn php(&mut self, _value: u8, _addr: u16) -> u8 {
        let pushed = self.status | FLAG_B | FLAG_U;
        self.push(pushed);
        0
    }

    fn pla(&mut self, _value: u8, _addr: u16) -> u8 {
        let v = self.pop();
        self.a = v;
        self.set_zn(v);
        0
    }

    // B is not a real latch; the unused bit always reads 1.
    fn plp(&mut self, _value: u8, _addr: u16) -> u8 {
        let v = self.pop();
        self.status = clear_flag(set_flag(v, FLAG_U), FLAG_B);
        0
    }

    // Logical

    fn and(&mut self, value: u8, _addr: u16) -> u8 {
        self.a &= value;
        let a = self.a;
        self.set_zn(a);
        0
    }

    fn eor(&mut self, value: u8, _addr: u16) -> u8 {
        self.a ^= value;
        let a = self.a;
        self.set_zn(a);
        0
    }

    fn ora(&mut self, value: u8, _addr: u16) -> u8 {
        self.a |= value;
        let a = self.a;
        self.set_zn(a);
        0
    }

    fn bit(&mut self, value: u8, _addr: u16) -> u8 {
        self.status = assign_flag(self.status, FLAG_Z, self.a & value == 0);
        self.status = assign_flag(self.status, FLAG_V, value & FLAG_V != 0);
        self.status = assign_flag(self.status, FLAG_N, value & FLAG_N != 0);
        0
    }

    // Arithmetic

    fn adc(&mut self, value: u8, _addr: u16) -> u8 {
        self.add_with_carry(value);
        0
    }

    // A - M - (1 - C) as A + !M + C; carry and overflow fall out of the
    // same addition.
    fn sbc(&mut self, value: u8, _addr: u16) -> u8 {
        self.add_with_carry(value ^ 0xFF);
        0
    }

    fn cmp(&mut self, value: u8, _addr: u16) -> u8 {
        let a = self.a;
        self.compare(a, value);
        0
    }

    fn cpx(&mut self, value: u8, _addr: u16) -> u8 {
        let x = self.x;
        self.compare(x, value);
        0
    }

    fn cpy(&mut self, value: u8, _addr: u16) -> u8 {
        let y = self.y;
        self.compare(y, value);
        0
    }

    // Increments and decrements

    fn inc(&mut self, value: u8, addr: u16) -> u8 {
        let result = value.wrapping_add(1);
        self.write(addr, result);
        self.set_zn(result);
        0
    }

    fn dec(&mut self, value: u8, addr: u16) -> u8 {
        let result = value.wrapping_sub(1);
        self.write(addr, result);
        self.set_zn(result);
        0
    }

    fn inx(&mut self, _value: u8, _addr: u16) -> u8 {
        self.x = self.x.wrapping_add(1);
        let x = self.x;
        self.set_zn(x);
        0
    }

    fn iny(&mut self, _value: u8, _addr: u16) -> u8 {
        self.y = self.y.wrapping_add(1);
        let y = self.y;
        self.set_zn(y);
        0
    }

    fn dex(&mut self, _value: u8, _addr: u16) -> u8 {
        self.x = self.x.wrapping_sub(1);
        let x = self.x;
        self.set_zn(x);
        0
    }

    fn dey(&mut self, _value: u8, _addr: u16) -> u8 {
        self.y = self.y.wrapping_sub(1);
        let y = self.y;
        self.set_zn(y);
        0
    }

    // Shifts and rotates. The accumulator forms get their own table
    // entries so the writeback target is decided by the table.

    fn asl_a(&mut self, value: u8, _addr: u16) -> u8 {
        self.a = self.shift_left(value);
        0
    }

    fn asl(&mut self, value: u8, addr: u16) -> u8 {
        let result = self.shift_left(value);
        self.write(addr, result);
        0
    }

    fn lsr_a(&mut self, value: u8, _addr: u16) -> u8 {
        self.a = self.shift_right(value);
        0
    }

    fn lsr(&mut self, value: u8, addr: u16) -> u8 {
        let result = self.shift_right(value);
        self.write(addr, result);
        0
    }

    fn rol_a(&mut self, value: u8, _addr: u16) -> u8 {
        self.a = self.rotate_left(value);
        0
    }

    fn rol(&mut self, value: u8, addr: u16) -> u8 {
        let result = self.rotate_left(value);
        self.write(addr, result);
        0
    }

    fn ror_a(&mut self, value: u8, _addr: u16) -> u8 {
        self.a = self.rotate_right(value);
        0
    }

    fn ror(&mut self, value: u8, addr: u16) -> u8 {
        let result = self.rotate_right(value);
        self.write(addr, result);
        0
    }

    // Jumps and subroutines

    fn jmp(&mut self, _value: u8, addr: u16) -> u8 {
        self.pc = addr;
        0
    }

    fn jsr(&mut self, _value: u8, addr: u16) -> u8 {
        // Pushes the address of the last operand byte, per hardware.
        let ret = self.pc.wrapping_sub(1);
        self.push_u16(ret);
        self.pc = addr;
        0
    }

    fn rts(&mut self, _value: u8, _addr: u16) -> u8 {
        let ret = self.pop_u16();
        self.pc = ret.wrapping_add(1);
        0
    }

    // BRK is a two-byte instruction; the padding byte after the opcode is
    // skipped by the pushed return address.
    fn brk(&mut self, _value: u8, _addr: u16) -> u8 {
        let ret = self.pc.wrapping_add(1);
        self.push_u16(ret);
        let pushed = self.status | FLAG_B | FLAG_U;
        self.push(pushed);
        self.status = set_flag(self.status, FLAG_I);
        self.pc = self.read_u16(IRQ_VECTOR);
        0
    }

    fn rti(&mut self, _value: u8, _addr: u16) -> u8 {
        let v = self.pop();
        self.status = clear_flag(set_flag(v, FLAG_U), FLAG_B);
        self.pc = self.pop_u16();
        0
    }

    // Branches. Extra cycles come from the taken/page-cross outcome, not
    // from the table.

    fn bcc(&mut self, value: u8, _addr: u16) -> u8 {
        let taken = !is_flag_set(self.status, FLAG_C);
        self.branch_if(taken, value)
    }

    fn bcs(&mut self, value: u8, _addr: u16) -> u8 {
        let taken = is_flag_set(self.status, FLAG_C);
        self.branch_if(taken, value)
    }

    fn beq(&mut self, value: u8, _addr: u16) -> u8 {
        let taken = is_flag_set(self.status, FLAG_Z);
        self.branch_if(taken, value)
    }

    fn bne(&mut self, value: u8, _addr: u16) -> u8 {
        let taken = !is_flag_set(self.status, FLAG_Z);
        self.branch_if(taken, value)
    }

    fn bmi(&mut self, value: u8, _addr: u16) -> u8 {
        let taken = is_flag_set(self.status, FLAG_N);
        self.branch_if(taken, value)
    }

    fn bpl(&mut self, value: u8, _addr: u16) -> u8 {
        let taken = !is_flag_set(self.status, FLAG_N);
        self.branch_if(taken, value)
    }

    fn bvc(&mut self, value: u8, _addr: u16) -> u8 {
        let taken = !is_flag_set(self.status, FLAG_V);
        self.branch_if(taken, value)
    }

    fn bvs(&mut self, value: u8, _addr: u16) -> u8 {
        let taken = is_flag_set(self.status, FLAG_V);
        self.branch_if(taken, value)
    }

    // Flag operations

    fn clc(&mut self, _value: u8, _addr: u16) -> u8 {
        self.status = clear_flag(self.status, FLAG_C);
        0
    }

    fn cld(&mut self, _value: u8, _addr: u16) -> u8 {
        self.status = clear_flag(self.status, FLAG_D);
        0
    }

    fn cli(&mut self, _value: u8, _addr: u16) -> u8 {
        self.status = clear_flag(self.status, FLAG_I);
        0
    }

    fn clv(&mut self, _value: u8, _addr: u16) -> u8 {
        self.status = clear_flag(self.status, FLAG_V);
        0
    }

    fn sec(&mut self, _value: u8, _addr: u16) -> u8 {
        self.status = set_flag(self.status, FLAG_C);
        0
    }

    fn sed(&mut self, _value: u8, _addr: u16) -> u8 {
        self.status = set_flag(self.status, FLAG_D);
        0
    }

    fn sei(&mut self, _value: u8, _addr: u16) -> u8 {
        self.status = set_flag(self.status, FLAG_I);
        0
    }

    fn nop(&mut self, _value: u8, _addr: u16) -> u8 {
        0
    }

    /// Reserved opcode: zero-cost no-op so the dispatch loop never halts
    /// on a byte the instruction set leaves undefined.
    fn xxx(&mut self, _value: u8, _addr: u16) -> u8 {
        let pc = self.pc.wrapping_sub(1);
        log(LogCategory::Cpu, LogLevel::Warn, || {
            format!("reserved opcode dispatched at {pc:04X}")
        });
        0
    }
}

impl Default for Cpu2a03 {
    fn default() -> Self {
        Self::new()
    }
}

impl Tickable for Cpu2a03 {
    fn tick(&mut self) {
        Cpu2a03::tick(self);
    }
}

const fn instr(
    name: &'static str,
    execute: Operation,
    mode: AddrMode,
    cycles: u8,
    page_cross_cycles: u8,
) -> Instruction {
    Instruction {
        name,
        execute,
        mode,
        cycles,
        page_cross_cycles,
    }
}

/// Reserved/undefined opcode slot: dispatches at zero cost.
const XXX: Instruction = instr("XXX", Cpu2a03::xxx, AddrMode::Implied, 0, 0);

/// The fixed 256-entry dispatch table, indexed directly by opcode byte.
///
/// Covers all 151 documented opcodes; the remaining 105 reserved slots
/// are the zero-cost [`XXX`] entry. Cycle counts are the documented base
/// costs; `page_cross_cycles` marks the opcodes that pay one extra cycle
/// when addressing crosses a page.
#[rustfmt::skip]
pub static INSTRUCTION_TABLE: [Instruction; 256] = {
    use AddrMode::*;
    type C = Cpu2a03;
    [
        /* 0x00 */ instr("BRK", C::brk, Implied, 7, 0),
        /* 0x01 */ instr("ORA", C::ora, IndirectX, 6, 0),
        /* 0x02 */ XXX,
        /* 0x03 */ XXX,
        /* 0x04 */ XXX,
        /* 0x05 */ instr("ORA", C::ora, ZeroPage, 3, 0),
        /* 0x06 */ instr("ASL", C::asl, ZeroPage, 5, 0),
        /* 0x07 */ XXX,
        /* 0x08 */ instr("PHP", C::php, Implied, 3, 0),
        /* 0x09 */ instr("ORA", C::ora, Immediate, 2, 0),
        /* 0x0A */ instr("ASL", C::asl_a, Accumulator, 2, 0),
        /* 0x0B */ XXX,
        /* 0x0C */ XXX,
        /* 0x0D */ instr("ORA", C::ora, Absolute, 4, 0),
        /* 0x0E */ instr("ASL", C::asl, Absolute, 6, 0),
        /* 0x0F */ XXX,
        /* 0x10 */ instr("BPL", C::bpl, Relative, 2, 0),
        /* 0x11 */ instr("ORA", C::ora, IndirectY, 5, 1),
        /* 0x12 */ XXX,
        /* 0x13 */ XXX,
        /* 0x14 */ XXX,
        /* 0x15 */ instr("ORA", C::ora, ZeroPageX, 4, 0),
        /* 0x16 */ instr("ASL", C::asl, ZeroPageX, 6, 0),
        /* 0x17 */ XXX,
        /* 0x18 */ instr("CLC", C::clc, Implied, 2, 0),
        /* 0x19 */ instr("ORA", C::ora, AbsoluteY, 4, 1),
        /* 0x1A */ XXX,
        /* 0x1B */ XXX,
        /* 0x1C */ XXX,
        /* 0x1D */ instr("ORA", C::ora, AbsoluteX, 4, 1),
        /* 0x1E */ instr("ASL", C::asl, AbsoluteX, 7, 0),
        /* 0x1F */ XXX,
        /* 0x20 */ instr("JSR", C::jsr, Absolute, 6, 0),
        /* 0x21 */ instr("AND", C::and, IndirectX, 6, 0),
        /* 0x22 */ XXX,
        /* 0x23 */ XXX,
        /* 0x24 */ instr("BIT", C::bit, ZeroPage, 3, 0),
        /* 0x25 */ instr("AND", C::and, ZeroPage, 3, 0),
        /* 0x26 */ instr("ROL", C::rol, ZeroPage, 5, 0),
        /* 0x27 */ XXX,
        /* 0x28 */ instr("PLP", C::plp, Implied, 4, 0),
        /* 0x29 */ instr("AND", C::and, Immediate, 2, 0),
        /* 0x2A */ instr("ROL", C::rol_a, Accumulator, 2, 0),
        /* 0x2B */ XXX,
        /* 0x2C */ instr("BIT", C::bit, Absolute, 4, 0),
        /* 0x2D */ instr("AND", C::and, Absolute, 4, 0),
        /* 0x2E */ instr("ROL", C::rol, Absolute, 6, 0),
        /* 0x2F */ XXX,
        /* 0x30 */ instr("BMI", C::bmi, Relative, 2, 0),
        /* 0x31 */ instr("AND", C::and, IndirectY, 5, 1),
        /* 0x32 */ XXX,
        /* 0x33 */ XXX,
        /* 0x34 */ XXX,
        /* 0x35 */ instr("AND", C::and, ZeroPageX, 4, 0),
        /* 0x36 */ instr("ROL", C::rol, ZeroPageX, 6, 0),
        /* 0x37 */ XXX,
        /* 0x38 */ instr("SEC", C::sec, Implied, 2, 0),
        /* 0x39 */ instr("AND", C::and, AbsoluteY, 4, 1),
        /* 0x3A */ XXX,
        /* 0x3B */ XXX,
        /* 0x3C */ XXX,
        /* 0x3D */ instr("AND", C::and, AbsoluteX, 4, 1),
        /* 0x3E */ instr("ROL", C::rol, AbsoluteX, 7, 0),
        /* 0x3F */ XXX,
        /* 0x40 */ instr("RTI", C::rti, Implied, 6, 0),
        /* 0x41 */ instr("EOR", C::eor, IndirectX, 6, 0),
        /* 0x42 */ XXX,
        /* 0x43 */ XXX,
        /* 0x44 */ XXX,
        /* 0x45 */ instr("EOR", C::eor, ZeroPage, 3, 0),
        /* 0x46 */ instr("LSR", C::lsr, ZeroPage, 5, 0),
        /* 0x47 */ XXX,
        /* 0x48 */ instr("PHA", C::pha, Implied, 3, 0),
        /* 0x49 */ instr("EOR", C::eor, Immediate, 2, 0),
        /* 0x4A */ instr("LSR", C::lsr_a, Accumulator, 2, 0),
        /* 0x4B */ XXX,
        /* 0x4C */ instr("JMP", C::jmp, Absolute, 3, 0),
        /* 0x4D */ instr("EOR", C::eor, Absolute, 4, 0),
        /* 0x4E */ instr("LSR", C::lsr, Absolute, 6, 0),
        /* 0x4F */ XXX,
        /* 0x50 */ instr("BVC", C::bvc, Relative, 2, 0),
        /* 0x51 */ instr("EOR", C::eor, IndirectY, 5, 1),
        /* 0x52 */ XXX,
        /* 0x53 */ XXX,
        /* 0x54 */ XXX,
        /* 0x55 */ instr("EOR", C::eor, ZeroPageX, 4, 0),
        /* 0x56 */ instr("LSR", C::lsr, ZeroPageX, 6, 0),
        /* 0x57 */ XXX,
        /* 0x58 */ instr("CLI", C::cli, Implied, 2, 0),
        /* 0x59 */ instr("EOR", C::eor, AbsoluteY, 4, 1),
        /* 0x5A */ XXX,
        /* 0x5B */ XXX,
        /* 0x5C */ XXX,
        /* 0x5D */ instr("EOR", C::eor, AbsoluteX, 4, 1),
        /* 0x5E */ instr("LSR", C::lsr, AbsoluteX, 7, 0),
        /* 0x5F */ XXX,
        /* 0x60 */ instr("RTS", C::rts, Implied, 6, 0),
        /* 0x61 */ instr("ADC", C::adc, IndirectX, 6, 0),
        /* 0x62 */ XXX,
        /* 0x63 */ XXX,
        /* 0x64 */ XXX,
        /* 0x65 */ instr("ADC", C::adc, ZeroPage, 3, 0),
        /* 0x66 */ instr("ROR", C::ror, ZeroPage, 5, 0),
        /* 0x67 */ XXX,
        /* 0x68 */ instr("PLA", C::pla, Implied, 4, 0),
        /* 0x69 */ instr("ADC", C::adc, Immediate, 2, 0),
        /* 0x6A */ instr("ROR", C::ror_a, Accumulator, 2, 0),
        /* 0x6B */ XXX,
        /* 0x6C */ instr("JMP", C::jmp, Indirect, 5, 0),
        /* 0x6D */ instr("ADC", C::adc, Absolute, 4, 0),
        /* 0x6E */ instr("ROR", C::ror, Absolute, 6, 0),
        /* 0x6F */ XXX,
        /* 0x70 */ instr("BVS", C::bvs, Relative, 2, 0),
        /* 0x71 */ instr("ADC", C::adc, IndirectY, 5, 1),
        /* 0x72 */ XXX,
        /* 0x73 */ XXX,
        /* 0x74 */ XXX,
        /* 0x75 */ instr("ADC", C::adc, ZeroPageX, 4, 0),
        /* 0x76 */ instr("ROR", C::ror, ZeroPageX, 6, 0),
        /* 0x77 */ XXX,
        /* 0x78 */ instr("SEI", C::sei, Implied, 2, 0),
        /* 0x79 */ instr("ADC", C::adc, AbsoluteY, 4, 1),
        /* 0x7A */ XXX,
        /* 0x7B */ XXX,
        /* 0x7C */ XXX,
        /* 0x7D */ instr("ADC", C::adc, AbsoluteX, 4, 1),
        /* 0x7E */ instr("ROR", C::ror, AbsoluteX, 7, 0),
        /* 0x7F */ XXX,
        /* 0x80 */ XXX,
        /* 0x81 */ instr("STA", C::sta, IndirectX, 6, 0),
        /* 0x82 */ XXX,
        /* 0x83 */ XXX,
        /* 0x84 */ instr("STY", C::sty, ZeroPage, 3, 0),
        /* 0x85 */ instr("STA", C::sta, ZeroPage, 3, 0),
        /* 0x86 */ instr("STX", C::stx, ZeroPage, 3, 0),
        /* 0x87 */ XXX,
        /* 0x88 */ instr("DEY", C::dey, Implied, 2, 0),
        /* 0x89 */ XXX,
        /* 0x8A */ instr("TXA", C::txa, Implied, 2, 0),
        /* 0x8B */ XXX,
        /* 0x8C */ instr("STY", C::sty, Absolute, 4, 0),
        /* 0x8D */ instr("STA", C::sta, Absolute, 4, 0),
        /* 0x8E */ instr("STX", C::stx, Absolute, 4, 0),
        /* 0x8F */ XXX,
        /* 0x90 */ instr("BCC", C::bcc, Relative, 2, 0),
        /* 0x91 */ instr("STA", C::sta, IndirectY, 6, 0),
        /* 0x92 */ XXX,
        /* 0x93 */ XXX,
        /* 0x94 */ instr("STY", C::sty, ZeroPageX, 4, 0),
        /* 0x95 */ instr("STA", C::sta, ZeroPageX, 4, 0),
        /* 0x96 */ instr("STX", C::stx, ZeroPageY, 4, 0),
        /* 0x97 */ XXX,
        /* 0x98 */ instr("TYA", C::tya, Implied, 2, 0),
        /* 0x99 */ instr("STA", C::sta, AbsoluteY, 5, 0),
        /* 0x9A */ instr("TXS", C::txs, Implied, 2, 0),
        /* 0x9B */ XXX,
        /* 0x9C */ XXX,
        /* 0x9D */ instr("STA", C::sta, AbsoluteX, 5, 0),
        /* 0x9E */ XXX,
        /* 0x9F */ XXX,
        /* 0xA0 */ instr("LDY", C::ldy, Immediate, 2, 0),
        /* 0xA1 */ instr("LDA", C::lda, IndirectX, 6, 0),
        /* 0xA2 */ instr("LDX", C::ldx, Immediate, 2, 0),
        /* 0xA3 */ XXX,
        /* 0xA4 */ instr("LDY", C::ldy, ZeroPage, 3, 0),
        /* 0xA5 */ instr("LDA", C::lda, ZeroPage, 3, 0),
        /* 0xA6 */ instr("LDX", C::ldx, ZeroPage, 3, 0),
        /* 0xA7 */ XXX,
        /* 0xA8 */ instr("TAY", C::tay, Implied, 2, 0),
        /* 0xA9 */ instr("LDA", C::lda, Immediate, 2, 0),
        /* 0xAA */ instr("TAX", C::tax, Implied, 2, 0),
        /* 0xAB */ XXX,
        /* 0xAC */ instr("LDY", C::ldy, Absolute, 4, 0),
        /* 0xAD */ instr("LDA", C::lda, Absolute, 4, 0),
        /* 0xAE */ instr("LDX", C::ldx, Absolute, 4, 0),
        /* 0xAF */ XXX,
        /* 0xB0 */ instr("BCS", C::bcs, Relative, 2, 0),
        /* 0xB1 */ instr("LDA", C::lda, IndirectY, 5, 1),
        /* 0xB2 */ XXX,
        /* 0xB3 */ XXX,
        /* 0xB4 */ instr("LDY", C::ldy, ZeroPageX, 4, 0),
        /* 0xB5 */ instr("LDA", C::lda, ZeroPageX, 4, 0),
        /* 0xB6 */ instr("LDX", C::ldx, ZeroPageY, 4, 0),
        /* 0xB7 */ XXX,
        /* 0xB8 */ instr("CLV", C::clv, Implied, 2, 0),
        /* 0xB9 */ instr("LDA", C::lda, AbsoluteY, 4, 1),
        /* 0xBA */ instr("TSX", C::tsx, Implied, 2, 0),
        /* 0xBB */ XXX,
        /* 0xBC */ instr("LDY", C::ldy, AbsoluteX, 4, 1),
        /* 0xBD */ instr("LDA", C::lda, AbsoluteX, 4, 1),
        /* 0xBE */ instr("LDX", C::ldx, AbsoluteY, 4, 1),
        /* 0xBF */ XXX,
        /* 0xC0 */ instr("CPY", C::cpy, Immediate, 2, 0),
        /* 0xC1 */ instr("CMP", C::cmp, IndirectX, 6, 0),
        /* 0xC2 */ XXX,
        /* 0xC3 */ XXX,
        /* 0xC4 */ instr("CPY", C::cpy, ZeroPage, 3, 0),
        /* 0xC5 */ instr("CMP", C::cmp, ZeroPage, 3, 0),
        /* 0xC6 */ instr("DEC", C::dec, ZeroPage, 5, 0),
        /* 0xC7 */ XXX,
        /* 0xC8 */ instr("INY", C::iny, Implied, 2, 0),
        /* 0xC9 */ instr("CMP", C::cmp, Immediate, 2, 0),
        /* 0xCA */ instr("DEX", C::dex, Implied, 2, 0),
        /* 0xCB */ XXX,
        /* 0xCC */ instr("CPY", C::cpy, Absolute, 4, 0),
        /* 0xCD */ instr("CMP", C::cmp, Absolute, 4, 0),
        /* 0xCE */ instr("DEC", C::dec, Absolute, 6, 0),
        /* 0xCF */ XXX,
        /* 0xD0 */ instr("BNE", C::bne, Relative, 2, 0),
        /* 0xD1 */ instr("CMP", C::cmp, IndirectY, 5, 1),
        /* 0xD2 */ XXX,
        /* 0xD3 */ XXX,
        /* 0xD4 */ XXX,
        /* 0xD5 */ instr("CMP", C::cmp, ZeroPageX, 4, 0),
        /* 0xD6 */ instr("DEC", C::dec, ZeroPageX, 6, 0),
        /* 0xD7 */ XXX,
        /* 0xD8 */ instr("CLD", C::cld, Implied, 2, 0),
        /* 0xD9 */ instr("CMP", C::cmp, AbsoluteY, 4, 1),
        /* 0xDA */ XXX,
        /* 0xDB */ XXX,
        /* 0xDC */ XXX,
        /* 0xDD */ instr("CMP", C::cmp, AbsoluteX, 4, 1),
        /* 0xDE */ instr("DEC", C::dec, AbsoluteX, 7, 0),
        /* 0xDF */ XXX,
        /* 0xE0 */ instr("CPX", C::cpx, Immediate, 2, 0),
        /* 0xE1 */ instr("SBC", C::sbc, IndirectX, 6, 0),
        /* 0xE2 */ XXX,
        /* 0xE3 */ XXX,
        /* 0xE4 */ instr("CPX", C::cpx, ZeroPage, 3, 0),
        /* 0xE5 */ instr("SBC", C::sbc, ZeroPage, 3, 0),
        /* 0xE6 */ instr("INC", C::inc, ZeroPage, 5, 0),
        /* 0xE7 */ XXX,
        /* 0xE8 */ instr("INX", C::inx, Implied, 2, 0),
        /* 0xE9 */ instr("SBC", C::sbc, Immediate, 2, 0),
        /* 0xEA */ instr("NOP", C::nop, Implied, 2, 0),
        /* 0xEB */ XXX,
        /* 0xEC */ instr("CPX", C::cpx, Absolute, 4, 0),
        /* 0xED */ instr("SBC", C::sbc, Absolute, 4, 0),
        /* 0xEE */ instr("INC", C::inc, Absolute, 6, 0),
        /* 0xEF */ XXX,
        /* 0xF0 */ instr("BEQ", C::beq, Relative, 2, 0),
        /* 0xF1 */ instr("SBC", C::sbc, IndirectY, 5, 1),
        /* 0xF2 */ XXX,
        /* 0xF3 */ XXX,
        /* 0xF4 */ XXX,
        /* 0xF5 */ instr("SBC", C::sbc, ZeroPageX, 4, 0),
        /* 0xF6 */ instr("INC", C::inc, ZeroPageX, 6, 0),
        /* 0xF7 */ XXX,
        /* 0xF8 */ instr("SED", C::sed, Implied, 2, 0),
        /* 0xF9 */ instr("SBC", C::sbc, AbsoluteY, 4, 1),
        /* 0xFA */ XXX,
        /* 0xFB */ XXX,
        /* 0xFC */ XXX,
        /* 0xFD */ instr("SBC", C::sbc, AbsoluteX, 4, 1),
        /* 0xFE */ instr("INC", C::inc, AbsoluteX, 7, 0),
        /* 0xFF */ XXX,
    ]
};
