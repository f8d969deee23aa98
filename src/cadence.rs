//! Update cadence
//!
//! Decouples game logic rate from the plane rate. Every completed plane cycle
//! adds `denom` to an accumulator; [`UpdateCadence::needs_update`] succeeds
//! and subtracts `every_n` once the accumulator reaches it. The leftover is
//! kept, so `every_n / denom` need not be a whole number of cycles.
//!
//! ```
//! use ssd1306_gray::UpdateCadence;
//!
//! // Two updates every three cycles
//! let mut cadence = UpdateCadence::new(3, 2);
//! let mut updates = 0;
//! for _ in 0..3 {
//!     cadence.record_cycle();
//!     if cadence.needs_update() {
//!         updates += 1;
//!     }
//! }
//! assert_eq!(updates, 2);
//! ```

/// Update fraction for `hz` updates per second
///
/// One plane cycle lasts `planes` refreshes, so the threshold is the cycle
/// rate and the increment is `hz`, clamped to the refresh rate.
///
/// ```
/// use ssd1306_gray::cadence::update_fraction;
///
/// assert_eq!(update_fraction(156, 2, 60), (78, 60));
/// ```
pub const fn update_fraction(refresh_hz: u16, planes: u8, hz: u8) -> (u8, u8) {
    let planes = if planes == 0 { 1 } else { planes as u16 };
    let cycle_hz = refresh_hz / planes;
    let every_n = if cycle_hz > u8::MAX as u16 {
        u8::MAX
    } else if cycle_hz == 0 {
        1
    } else {
        cycle_hz as u8
    };
    let denom = if hz as u16 > refresh_hz {
        refresh_hz as u8
    } else {
        hz
    };
    (every_n, denom)
}

/// Fractional update divider
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpdateCadence {
    counter: u16,
    every_n: u8,
    denom: u8,
}

impl Default for UpdateCadence {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl UpdateCadence {
    /// Update every `every_n / denom` cycles
    ///
    /// Zero for either value is treated as 1.
    pub const fn new(every_n: u8, denom: u8) -> Self {
        Self {
            counter: 0,
            every_n: if every_n == 0 { 1 } else { every_n },
            denom: if denom == 0 { 1 } else { denom },
        }
    }

    /// Account for one completed plane cycle
    pub fn record_cycle(&mut self) {
        self.counter = self.counter.saturating_add(self.denom as u16);
    }

    /// Whether an update is due, consuming it if so
    pub fn needs_update(&mut self) -> bool {
        let n = self.every_n as u16;
        if self.counter >= n {
            self.counter -= n;
            true
        } else {
            false
        }
    }

    /// Change the ratio and restart counting from zero
    pub fn set_every_n(&mut self, every_n: u8, denom: u8) {
        *self = Self::new(every_n, denom);
    }

    /// Update threshold
    pub const fn every_n(&self) -> u8 {
        self.every_n
    }

    /// Per-cycle increment
    pub const fn denom(&self) -> u8 {
        self.denom
    }
}
