//! Master clock and component scheduling.
//!
//! The clock is a logical cycle counter, not a timer: one [`Clock::tick`]
//! is one master clock pulse, and each registered component is ticked
//! whenever its divisor evenly divides the running count. The CPU of the
//! modeled console runs at one tick per 3 master pulses, so it registers
//! with divisor 3.

use std::cell::RefCell;
use std::rc::Rc;

/// A component that advances by one step per invocation.
///
/// For the CPU this is one fetch/decode/execute cycle slot; other
/// components define their own unit of work.
pub trait Tickable {
    fn tick(&mut self);
}

struct Registration {
    divisor: u64,
    component: Rc<RefCell<dyn Tickable>>,
}

/// Free-running cycle counter that drives registered components.
///
/// The count is monotonically non-decreasing and never resets during a
/// run. Components are referenced, not owned, so the same component can
/// also be reachable by the host for diagnostics.
pub struct Clock {
    clock_count: u64,
    registered: Vec<Registration>,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            clock_count: 0,
            registered: Vec::new(),
        }
    }

    /// Register a component to be ticked every `divisor` master pulses.
    ///
    /// A divisor of 0 never divides a positive count, so such a
    /// registration simply never fires.
    pub fn register_component(&mut self, component: Rc<RefCell<dyn Tickable>>, divisor: u64) {
        self.registered.push(Registration { divisor, component });
    }

    /// Total master pulses issued so far.
    pub fn clock_count(&self) -> u64 {
        self.clock_count
    }

    /// Advance to the next master pulse, ticking every component whose
    /// divisor divides the new count.
    pub fn tick(&mut self) {
        self.clock_count += 1;
        for reg in &self.registered {
            if reg.divisor != 0 && self.clock_count % reg.divisor == 0 {
                reg.component.borrow_mut().tick();
            }
        }
    }

    /// Drive the clock until `stop` returns true. The stop condition is
    /// checked before every pulse, so `run_until(|_| true)` issues none.
    pub fn run_until<F>(&mut self, mut stop: F)
    where
        F: FnMut(&Clock) -> bool,
    {
        while !stop(self) {
            self.tick();
        }
    }

    /// Issue exactly `ticks` master pulses.
    pub fn run_for(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    /// Drive the clock forever. Callers that need to regain control
    /// (rendering loops, tests) should use [`Clock::run_until`] instead.
    pub fn start(&mut self) {
        self.run_until(|_| false);
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
