//! Display configuration types and builder

use crate::command::{
    CHARGE_PUMP, CHARGE_PUMP_ON, COM_SCAN_REMAPPED, DISPLAY_ON, MEMORY_MODE,
    MEMORY_MODE_HORIZONTAL, SEGMENT_REMAP_FLIPPED, SET_CLOCK_DIV, SET_CONTRAST, SET_PRECHARGE,
};
pub use crate::error::BuilderError;
use crate::plane::{L3Conversion, PlaneMode};

/// Panel width in pixels (columns)
pub const WIDTH: usize = 128;
/// Panel height in pixels (rows)
pub const HEIGHT: usize = 64;
/// Number of 8-row pages
pub const PAGES: usize = HEIGHT / 8;
/// Framebuffer size in bytes
pub const BUFFER_SIZE: usize = WIDTH * PAGES;

/// Default CPU clock the timer counts are derived from
pub const DEFAULT_CPU_HZ: u32 = 16_000_000;
/// Default refresh rate for the SSD1306
pub const DEFAULT_REFRESH_HZ: u16 = 156;
/// Default refresh rate for the SH1106, whose row drive is slower
pub const DEFAULT_REFRESH_HZ_SH1106: u16 = 120;

/// Boot sequence sent after a hardware reset
///
/// Clock divider, charge pump on, flipped orientation, contrast, precharge,
/// display on, horizontal addressing.
pub const DEFAULT_BOOT_SEQUENCE: &[u8] = &[
    SET_CLOCK_DIV,
    0xF0,
    CHARGE_PUMP,
    CHARGE_PUMP_ON,
    SEGMENT_REMAP_FLIPPED,
    COM_SCAN_REMAPPED,
    SET_CONTRAST,
    0xCF,
    SET_PRECHARGE,
    0xF1,
    DISPLAY_ON,
    MEMORY_MODE,
    MEMORY_MODE_HORIZONTAL,
];

/// Strategy used to hide the plane transition from the row scan
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SyncStrategy {
    /// Spread each plane over three timer phases, looping an extra 8 rows
    /// around the park row. Full 64-row height at a lower refresh rate.
    #[default]
    ThreePhase,
    /// Sacrifice the bottom row as the parking row. Fast, 63 usable rows.
    ParkRow,
    /// Stall the row drive while parked so the park row can be rewritten.
    /// Fast with 64 rows, at the cost of slight glitches on the park row.
    SlowDrive,
}

impl SyncStrategy {
    /// Number of framebuffer rows that are actually shown
    pub const fn usable_height(self) -> u8 {
        match self {
            Self::ParkRow => HEIGHT as u8 - 1,
            Self::ThreePhase | Self::SlowDrive => HEIGHT as u8,
        }
    }
}

/// Controller wired to the panel
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Controller {
    /// SSD1306: horizontal addressing with a page window
    #[default]
    Ssd1306,
    /// SH1106: page addressing, page and column set before every page
    Sh1106,
}

/// Hardware timer driving the frame interrupt
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FrameTimerSelect {
    /// 16-bit timer 1, prescaler /64
    Timer1,
    /// 16-bit timer 3, prescaler /64
    #[default]
    Timer3,
    /// 10-bit high speed timer 4, prescaler /256
    Timer4,
}

impl FrameTimerSelect {
    /// Clock prescaler the timer runs with
    pub const fn prescaler(self) -> u32 {
        match self {
            Self::Timer1 | Self::Timer3 => 64,
            Self::Timer4 => 256,
        }
    }

    /// Largest compare value the timer can hold
    pub const fn max_count(self) -> u32 {
        match self {
            Self::Timer1 | Self::Timer3 => u16::MAX as u32,
            Self::Timer4 => 0x3FF,
        }
    }
}

/// Per-plane contrast tables
///
/// Only used with [`PlaneMode::L3`] and [`PlaneMode::L4Triplane`] when
/// enabled with [`Builder::plane_contrast`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaneContrast {
    /// Contrast for planes 0 and 1 in [`PlaneMode::L3`]
    pub l3: [u8; 2],
    /// Contrast for planes 0, 1 and 2 in [`PlaneMode::L4Triplane`]
    pub l4: [u8; 3],
}

impl Default for PlaneContrast {
    fn default() -> Self {
        Self {
            l3: [64, 255],
            l4: [25, 85, 255],
        }
    }
}

/// Display configuration
///
/// Fixed for the lifetime of the grayscale driver; the sync strategy in
/// particular cannot change once started. Use [`Builder`] to create one.
#[derive(Clone, Debug)]
pub struct Config {
    /// Plane transition strategy
    pub sync: SyncStrategy,
    /// Plane layout
    pub mode: PlaneMode,
    /// Three-level folding of the triplane mode
    pub l3_conversion: L3Conversion,
    /// Panel controller
    pub controller: Controller,
    /// Target refresh rate in Hz
    pub refresh_hz: u16,
    /// CPU clock in Hz
    pub cpu_hz: u32,
    /// Timer used for the frame interrupt
    pub timer: FrameTimerSelect,
    /// Update threshold: updates happen every `update_every_n / update_denom` cycles
    pub update_every_n: u8,
    /// Update increment added per completed cycle
    pub update_denom: u8,
    /// Precharge (phase 1) period in display clocks, 1..=15
    pub precharge_cycles: u8,
    /// Discharge (phase 2) period in display clocks, 1..=15
    pub discharge_cycles: u8,
    /// Contrast for [`PlaneMode::L4Contrast`] (odd planes; even planes get half)
    pub contrast: u8,
    /// Per-plane contrast tables, `None` when disabled
    pub plane_contrast: Option<PlaneContrast>,
    /// Commands sent after a hardware reset
    pub boot_sequence: &'static [u8],
}

impl Config {
    /// Number of planes in one full display cycle
    pub const fn planes(&self) -> u8 {
        self.l3_conversion.planes_for(self.mode)
    }

    /// Timer compare values derived from refresh rate, CPU clock and timer
    pub fn timer_counts(&self) -> crate::scheduler::TimerCounts {
        crate::scheduler::TimerCounts::derive(self.cpu_hz, self.timer, self.refresh_hz)
    }

    /// Parameter byte of the precharge command
    pub const fn precharge_param(&self) -> u8 {
        crate::command::precharge_param(self.precharge_cycles, self.discharge_cycles)
    }
}

/// Builder for constructing display configuration
///
/// Combinations the scheduler cannot run are rejected by [`build`](Self::build),
/// so an invalid configuration never reaches the hardware.
///
/// # Example
///
/// ```rust
/// use ssd1306_gray::{Builder, PlaneMode, SyncStrategy};
///
/// let config = match Builder::new()
///     .mode(PlaneMode::L4Contrast)
///     .sync(SyncStrategy::ParkRow)
///     .update_every_n(2, 1)
///     .build()
/// {
///     Ok(config) => config,
///     Err(_) => return,
/// };
/// assert_eq!(config.planes(), 2);
/// ```
#[must_use]
pub struct Builder {
    /// Plane transition strategy
    sync: SyncStrategy,
    /// Plane layout
    mode: PlaneMode,
    /// Three-level folding of the triplane mode
    l3_conversion: L3Conversion,
    /// Panel controller
    controller: Controller,
    /// Target refresh rate in Hz, controller default when `None`
    refresh_hz: Option<u16>,
    /// CPU clock in Hz
    cpu_hz: u32,
    /// Frame interrupt timer
    timer: FrameTimerSelect,
    /// Update threshold
    update_every_n: u8,
    /// Update increment
    update_denom: u8,
    /// Update rate in Hz, overrides every-N when set
    update_hz: Option<u8>,
    /// Precharge period
    precharge_cycles: u8,
    /// Discharge period
    discharge_cycles: u8,
    /// Contrast for the contrast mode
    contrast: u8,
    /// Per-plane contrast tables
    plane_contrast: Option<PlaneContrast>,
    /// Boot command sequence
    boot_sequence: &'static [u8],
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            sync: SyncStrategy::ThreePhase,
            mode: PlaneMode::L3,
            l3_conversion: L3Conversion::None,
            controller: Controller::Ssd1306,
            refresh_hz: None,
            cpu_hz: DEFAULT_CPU_HZ,
            timer: FrameTimerSelect::Timer3,
            update_every_n: 1,
            update_denom: 1,
            update_hz: None,
            precharge_cycles: 1,
            discharge_cycles: 2,
            contrast: 255,
            plane_contrast: None,
            boot_sequence: DEFAULT_BOOT_SEQUENCE,
        }
    }
}

impl Builder {
    /// Create a new Builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the plane transition strategy
    pub fn sync(mut self, sync: SyncStrategy) -> Self {
        self.sync = sync;
        self
    }

    /// Set the plane mode
    pub fn mode(mut self, mode: PlaneMode) -> Self {
        self.mode = mode;
        self
    }

    /// Fold [`PlaneMode::L4Triplane`] down to three levels
    pub fn l3_conversion(mut self, conversion: L3Conversion) -> Self {
        self.l3_conversion = conversion;
        self
    }

    /// Set the panel controller
    ///
    /// Also selects the controller's default refresh rate unless one was set
    /// explicitly.
    pub fn controller(mut self, controller: Controller) -> Self {
        self.controller = controller;
        self
    }

    /// Set the target refresh rate in Hz
    pub fn refresh_hz(mut self, hz: u16) -> Self {
        self.refresh_hz = Some(hz);
        self
    }

    /// Set the CPU clock in Hz
    pub fn cpu_hz(mut self, hz: u32) -> Self {
        self.cpu_hz = hz;
        self
    }

    /// Select the frame interrupt timer
    pub fn timer(mut self, timer: FrameTimerSelect) -> Self {
        self.timer = timer;
        self
    }

    /// Run logic updates every `n / denom` plane cycles
    pub fn update_every_n(mut self, n: u8, denom: u8) -> Self {
        self.update_every_n = n;
        self.update_denom = denom;
        self.update_hz = None;
        self
    }

    /// Run logic updates at `hz` times per second
    ///
    /// Clamped to the refresh rate.
    pub fn update_hz(mut self, hz: u8) -> Self {
        self.update_hz = Some(hz);
        self
    }

    /// Set precharge and discharge periods in display clocks
    pub fn precharge(mut self, precharge_cycles: u8, discharge_cycles: u8) -> Self {
        self.precharge_cycles = precharge_cycles;
        self.discharge_cycles = discharge_cycles;
        self
    }

    /// Set contrast for [`PlaneMode::L4Contrast`]
    pub fn contrast(mut self, contrast: u8) -> Self {
        self.contrast = contrast;
        self
    }

    /// Enable per-plane contrast with the given tables
    pub fn plane_contrast(mut self, tables: PlaneContrast) -> Self {
        self.plane_contrast = Some(tables);
        self
    }

    /// Replace the boot command sequence
    pub fn boot_sequence(mut self, sequence: &'static [u8]) -> Self {
        self.boot_sequence = sequence;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns a [`BuilderError`] describing the first conflicting option.
    pub fn build(self) -> Result<Config, BuilderError> {
        if self.l3_conversion != L3Conversion::None && self.mode != PlaneMode::L4Triplane {
            return Err(BuilderError::ConversionRequiresTriplane { mode: self.mode });
        }
        if self.plane_contrast.is_some() && self.mode == PlaneMode::L4Contrast {
            return Err(BuilderError::PlaneContrastUnsupported { mode: self.mode });
        }
        for cycles in [self.precharge_cycles, self.discharge_cycles] {
            if cycles == 0 || cycles > 15 {
                return Err(BuilderError::InvalidPrecharge { cycles });
            }
        }

        let refresh_hz = self.refresh_hz.unwrap_or(match self.controller {
            Controller::Ssd1306 => DEFAULT_REFRESH_HZ,
            Controller::Sh1106 => DEFAULT_REFRESH_HZ_SH1106,
        });
        if refresh_hz == 0 || self.cpu_hz == 0 {
            return Err(BuilderError::InvalidTiming {
                cpu_hz: self.cpu_hz,
                refresh_hz,
            });
        }
        let count = self.cpu_hz / self.timer.prescaler() / refresh_hz as u32;
        // The three-phase short delay is count / 16, so anything under 16 ticks
        // collapses the short phases to a single tick.
        if count < 16 || count > self.timer.max_count() {
            return Err(BuilderError::InvalidTiming {
                cpu_hz: self.cpu_hz,
                refresh_hz,
            });
        }

        let planes = self.l3_conversion.planes_for(self.mode);
        let (update_every_n, update_denom) = match self.update_hz {
            Some(hz) => crate::cadence::update_fraction(refresh_hz, planes, hz),
            None => (self.update_every_n, self.update_denom),
        };
        if update_every_n == 0 || update_denom == 0 {
            return Err(BuilderError::InvalidUpdateRate {
                every_n: update_every_n,
                denom: update_denom,
            });
        }

        Ok(Config {
            sync: self.sync,
            mode: self.mode,
            l3_conversion: self.l3_conversion,
            controller: self.controller,
            refresh_hz,
            cpu_hz: self.cpu_hz,
            timer: self.timer,
            update_every_n,
            update_denom,
            precharge_cycles: self.precharge_cycles,
            discharge_cycles: self.discharge_cycles,
            contrast: self.contrast,
            plane_contrast: self.plane_contrast,
            boot_sequence: self.boot_sequence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Builder::new().build().unwrap();
        assert_eq!(config.sync, SyncStrategy::ThreePhase);
        assert_eq!(config.mode, PlaneMode::L3);
        assert_eq!(config.refresh_hz, DEFAULT_REFRESH_HZ);
        assert_eq!(config.precharge_param(), 0x21);
        assert_eq!(config.contrast, 255);
        assert_eq!(config.planes(), 2);
    }

    #[test]
    fn test_sh1106_defaults_to_slower_refresh() {
        let config = Builder::new().controller(Controller::Sh1106).build().unwrap();
        assert_eq!(config.refresh_hz, DEFAULT_REFRESH_HZ_SH1106);

        let config = Builder::new()
            .controller(Controller::Sh1106)
            .refresh_hz(100)
            .build()
            .unwrap();
        assert_eq!(config.refresh_hz, 100);
    }

    #[test]
    fn test_conversion_without_triplane_is_rejected() {
        let result = Builder::new()
            .mode(PlaneMode::L3)
            .l3_conversion(L3Conversion::Mix)
            .build();
        assert!(matches!(
            result,
            Err(BuilderError::ConversionRequiresTriplane { .. })
        ));
    }

    #[test]
    fn test_plane_contrast_in_contrast_mode_is_rejected() {
        let result = Builder::new()
            .mode(PlaneMode::L4Contrast)
            .plane_contrast(PlaneContrast::default())
            .build();
        assert!(matches!(
            result,
            Err(BuilderError::PlaneContrastUnsupported { .. })
        ));
    }

    #[test]
    fn test_zero_refresh_is_rejected() {
        let result = Builder::new().refresh_hz(0).build();
        assert!(matches!(result, Err(BuilderError::InvalidTiming { .. })));
    }

    #[test]
    fn test_timer4_range_is_checked() {
        // 16 MHz / 256 / 30 Hz = 2083 ticks, beyond the 10-bit timer
        let result = Builder::new()
            .timer(FrameTimerSelect::Timer4)
            .refresh_hz(30)
            .build();
        assert!(matches!(result, Err(BuilderError::InvalidTiming { .. })));

        let config = Builder::new().timer(FrameTimerSelect::Timer4).build().unwrap();
        assert_eq!(config.timer_counts().long, 400);
    }

    #[test]
    fn test_zero_update_rate_is_rejected() {
        let result = Builder::new().update_every_n(0, 1).build();
        assert!(matches!(
            result,
            Err(BuilderError::InvalidUpdateRate { every_n: 0, .. })
        ));
    }

    #[test]
    fn test_update_hz_derives_fraction() {
        let config = Builder::new().update_hz(60).build().unwrap();
        assert_eq!(config.update_every_n, 78);
        assert_eq!(config.update_denom, 60);

        // Clamped to the refresh rate, not the cycle rate
        let config = Builder::new().update_hz(200).build().unwrap();
        assert_eq!(config.update_denom, 156);
    }

    #[test]
    fn test_invalid_precharge_is_rejected() {
        let result = Builder::new().precharge(0, 2).build();
        assert!(matches!(
            result,
            Err(BuilderError::InvalidPrecharge { cycles: 0 })
        ));
        let result = Builder::new().precharge(1, 16).build();
        assert!(matches!(
            result,
            Err(BuilderError::InvalidPrecharge { cycles: 16 })
        ));
    }

    #[test]
    fn test_park_row_loses_one_row() {
        assert_eq!(SyncStrategy::ParkRow.usable_height(), 63);
        assert_eq!(SyncStrategy::ThreePhase.usable_height(), 64);
        assert_eq!(SyncStrategy::SlowDrive.usable_height(), 64);
    }
}
