//! Frame timer interrupt state
//!
//! [`FrameScheduler`] is the state shared between the frame timer interrupt
//! and the foreground grayscale driver. It lives in a `static` and is
//! accessed only inside critical sections.
//!
//! The interrupt handler is one call:
//!
//! ```
//! use ssd1306_gray::{FrameScheduler, FrameTimer};
//!
//! static SCHEDULER: FrameScheduler = FrameScheduler::new();
//!
//! struct Tc3;
//! impl FrameTimer for Tc3 {
//!     fn start(&mut self, _compare: u16) {}
//!     fn set_compare(&mut self, _compare: u16) {}
//! }
//!
//! // #[interrupt]
//! fn tc3_compare() {
//!     SCHEDULER.on_timer_interrupt_with(&mut Tc3);
//! }
//! # tc3_compare();
//! ```
//!
//! In the three-phase strategy every plane spans three ticks. The delay
//! after phase 1 and after phase 3 is a sixteenth of the frame (four rows),
//! the delay after phase 2 is the full frame.

use core::cell::Cell;

use critical_section::{CriticalSection, Mutex};

use crate::config::{FrameTimerSelect, SyncStrategy};

/// Compare values for the frame timer
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimerCounts {
    /// Ticks per frame
    pub long: u16,
    /// Ticks for four rows, used around the three-phase park window
    pub short: u16,
}

impl TimerCounts {
    /// Derive compare values from CPU clock, timer prescaler and refresh rate
    ///
    /// ```
    /// use ssd1306_gray::{FrameTimerSelect, TimerCounts};
    ///
    /// let counts = TimerCounts::derive(16_000_000, FrameTimerSelect::Timer3, 156);
    /// assert_eq!(counts.long, 1602);
    /// assert_eq!(counts.short, 101);
    /// ```
    pub const fn derive(cpu_hz: u32, timer: FrameTimerSelect, refresh_hz: u16) -> Self {
        let hz = if refresh_hz == 0 { 1 } else { refresh_hz as u32 };
        let ticks = cpu_hz / timer.prescaler() / hz;
        let long = if ticks > u16::MAX as u32 {
            u16::MAX
        } else {
            ticks as u16
        };
        Self {
            long,
            short: (long >> 4) + 1,
        }
    }
}

/// Hardware timer running the frame interrupt
pub trait FrameTimer {
    /// Start counting from zero in clear-on-compare mode with its interrupt enabled
    fn start(&mut self, compare: u16);

    /// Set the compare value for the next period
    fn set_compare(&mut self, compare: u16);
}

/// Low-power wait used by [`GrayDisplay::wait_for_next_plane`](crate::GrayDisplay::wait_for_next_plane)
///
/// Called inside a critical section, with interrupts masked. The
/// implementation must return once an interrupt is pending without servicing
/// it, like the Cortex-M `wfi` instruction. Where the core only wakes with
/// interrupts enabled (AVR `sleep`), unmask them atomically with the sleep
/// (`sei` immediately before `sleep`) and mask them again on wake. The
/// caller leaves the critical section afterwards so the interrupt runs.
pub trait WaitForInterrupt {
    /// Sleep until an interrupt is pending
    fn wait_for_interrupt(&mut self);
}

#[derive(Clone, Copy, Debug, Default)]
struct State {
    armed: bool,
    three_phase: bool,
    phase: u8,
    pending: bool,
    counts: TimerCounts,
}

/// State shared by the frame interrupt and the grayscale driver
pub struct FrameScheduler {
    state: Mutex<Cell<State>>,
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScheduler {
    /// Create an idle scheduler, suitable for a `static`
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(Cell::new(State {
                armed: false,
                three_phase: false,
                phase: 0,
                pending: false,
                counts: TimerCounts { long: 0, short: 0 },
            })),
        }
    }

    /// Prepare for a new run of the frame timer
    ///
    /// Phase restarts at 0 and any pending tick is dropped.
    pub fn arm(&self, cs: CriticalSection<'_>, sync: SyncStrategy, counts: TimerCounts) {
        self.state.borrow(cs).set(State {
            armed: true,
            three_phase: sync == SyncStrategy::ThreePhase,
            phase: 0,
            pending: false,
            counts,
        });
    }

    /// Frame timer interrupt body
    ///
    /// Advances the phase, flags a pending step and returns the compare value
    /// for the next period. Ticks that arrive before the foreground has taken
    /// the previous one coalesce. Before [`arm`](Self::arm) this does nothing
    /// and returns `u16::MAX`.
    pub fn on_timer_interrupt(&self) -> u16 {
        self.tick().unwrap_or(u16::MAX)
    }

    /// Frame timer interrupt body that also reprograms `timer`
    pub fn on_timer_interrupt_with<T: FrameTimer>(&self, timer: &mut T) {
        if let Some(compare) = self.tick() {
            timer.set_compare(compare);
        }
    }

    fn tick(&self) -> Option<u16> {
        critical_section::with(|cs| {
            let cell = self.state.borrow(cs);
            let mut state = cell.get();
            if !state.armed {
                return None;
            }

            let compare = if state.three_phase {
                state.phase = if state.phase >= 3 { 1 } else { state.phase + 1 };
                match state.phase {
                    2 => state.counts.long,
                    _ => state.counts.short,
                }
            } else {
                state.counts.long
            };
            state.pending = true;
            cell.set(state);
            Some(compare)
        })
    }

    /// Clear the pending flag, returning the current phase if a tick was pending
    pub fn take_pending(&self, cs: CriticalSection<'_>) -> Option<u8> {
        let cell = self.state.borrow(cs);
        let mut state = cell.get();
        if !state.pending {
            return None;
        }
        state.pending = false;
        cell.set(state);
        Some(state.phase)
    }

    /// Whether a tick is waiting to be handled
    pub fn is_pending(&self) -> bool {
        critical_section::with(|cs| self.state.borrow(cs).get().pending)
    }

    /// Current three-phase phase: 0 before the first tick, then 1, 2, 3
    pub fn phase(&self) -> u8 {
        critical_section::with(|cs| self.state.borrow(cs).get().phase)
    }

    /// Whether [`arm`](Self::arm) has been called
    pub fn is_armed(&self) -> bool {
        critical_section::with(|cs| self.state.borrow(cs).get().armed)
    }

    /// Compare values of the current run
    pub fn counts(&self) -> TimerCounts {
        critical_section::with(|cs| self.state.borrow(cs).get().counts)
    }
}
