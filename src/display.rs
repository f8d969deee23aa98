//! Core display operations

use embedded_hal::delay::DelayNs;
use log::debug;

use crate::command::{
    CLOCK_DIV_FAST, COLUMN_ADDRESS, COM_SCAN_NORMAL, COM_SCAN_REMAPPED, DISPLAY_OFF, DISPLAY_ON,
    INVERT_DISPLAY, NORMAL_DISPLAY, PAGE_ADDRESS, SEGMENT_REMAP_FLIPPED, SEGMENT_REMAP_NORMAL,
    SET_CLOCK_DIV, SET_COLUMN_HIGH, SET_CONTRAST, SET_MULTIPLEX, SET_PAGE_START, SET_PRECHARGE,
};
use crate::config::{BUFFER_SIZE, Config, Controller, PAGES, SyncStrategy, WIDTH};
use crate::error::Error;
use crate::gray::GrayDisplay;
use crate::interface::DisplayInterface;
use crate::scheduler::{FrameScheduler, FrameTimer};

type DisplayResult<I> = core::result::Result<(), Error<I>>;

/// SH1106 RAM is 132 columns wide; the visible 128 start at column 2
const SH1106_COLUMN_OFFSET: u8 = 0x02;

/// Core display driver for SSD1306 / SH1106
///
/// Provides plain monochrome operation. Call [`start_gray`](Self::start_gray)
/// to hand the panel over to the grayscale plane scheduler, which consumes
/// this driver so monochrome frame pushing can no longer interfere.
pub struct Display<I>
where
    I: DisplayInterface,
{
    /// Hardware interface
    interface: I,
    /// Display configuration
    config: Config,
}

impl<I> Display<I>
where
    I: DisplayInterface,
{
    /// Create a new Display instance
    pub fn new(interface: I, config: Config) -> Self {
        Self { interface, config }
    }

    /// Perform hardware reset and send the boot sequence
    pub fn reset<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        debug!(
            "resetting {:?} panel, {} boot bytes",
            self.config.controller,
            self.config.boot_sequence.len()
        );
        self.interface.reset(delay);
        self.send_commands(self.config.boot_sequence)
    }

    /// Send a full monochrome frame
    ///
    /// With `clear` set the buffer is zeroed once sent.
    pub fn paint_screen(&mut self, buffer: &mut [u8], clear: bool) -> DisplayResult<I> {
        if buffer.len() < BUFFER_SIZE {
            return Err(Error::BufferTooSmall {
                required: BUFFER_SIZE,
                provided: buffer.len(),
            });
        }

        match self.config.controller {
            Controller::Ssd1306 => {
                self.send_commands(&[PAGE_ADDRESS, 0, PAGES as u8 - 1])?;
                self.send_commands(&[COLUMN_ADDRESS, 0, WIDTH as u8 - 1])?;
                self.send_data(&buffer[..BUFFER_SIZE])?;
            }
            Controller::Sh1106 => {
                for (page, bytes) in buffer[..BUFFER_SIZE].chunks_exact(WIDTH).enumerate() {
                    self.send_commands(&[
                        SET_PAGE_START | page as u8,
                        SH1106_COLUMN_OFFSET,
                        SET_COLUMN_HIGH,
                    ])?;
                    self.send_data(bytes)?;
                }
            }
        }

        if clear {
            buffer[..BUFFER_SIZE].fill(0);
        }
        Ok(())
    }

    /// Set panel contrast
    pub fn set_contrast(&mut self, contrast: u8) -> DisplayResult<I> {
        self.send_commands(&[SET_CONTRAST, contrast])
    }

    /// Invert all pixels
    pub fn invert(&mut self, inverted: bool) -> DisplayResult<I> {
        self.send_commands(&[if inverted {
            INVERT_DISPLAY
        } else {
            NORMAL_DISPLAY
        }])
    }

    /// Turn the panel on or put it to sleep
    pub fn set_display_on(&mut self, on: bool) -> DisplayResult<I> {
        self.send_commands(&[if on { DISPLAY_ON } else { DISPLAY_OFF }])
    }

    /// Mirror the image top to bottom
    pub fn flip_vertical(&mut self, flipped: bool) -> DisplayResult<I> {
        self.send_commands(&[if flipped {
            COM_SCAN_NORMAL
        } else {
            COM_SCAN_REMAPPED
        }])
    }

    /// Mirror the image left to right
    pub fn flip_horizontal(&mut self, flipped: bool) -> DisplayResult<I> {
        self.send_commands(&[if flipped {
            SEGMENT_REMAP_NORMAL
        } else {
            SEGMENT_REMAP_FLIPPED
        }])
    }

    /// Switch to grayscale operation
    ///
    /// Puts the panel in the unflipped orientation the bus painter streams
    /// for, programs the precharge periods, parks the row scan on row 0,
    /// arms `scheduler` and starts `timer`. Arming and starting happen in one
    /// critical section so the first tick cannot observe a stale phase.
    pub fn start_gray<'s, T: FrameTimer>(
        mut self,
        scheduler: &'s FrameScheduler,
        timer: &mut T,
    ) -> Result<GrayDisplay<'s, I>, Error<I>> {
        let head = [
            COM_SCAN_NORMAL,
            SEGMENT_REMAP_NORMAL,
            SET_PRECHARGE,
            self.config.precharge_param(),
        ];
        let clock: &[u8] = match self.config.controller {
            Controller::Sh1106 => &[SET_CLOCK_DIV, CLOCK_DIV_FAST],
            Controller::Ssd1306 => &[],
        };
        let contrast = [SET_CONTRAST, self.config.contrast];
        let contrast: &[u8] = match self.config.sync {
            SyncStrategy::ThreePhase => &[],
            SyncStrategy::ParkRow | SyncStrategy::SlowDrive => &contrast,
        };

        let mut sequence = [0u8; 12];
        let mut len = 0;
        for &byte in head
            .iter()
            .chain(clock)
            .chain(contrast)
            .chain(&[SET_MULTIPLEX, 0])
        {
            sequence[len] = byte;
            len += 1;
        }
        self.send_commands(&sequence[..len])?;

        let counts = self.config.timer_counts();
        critical_section::with(|cs| {
            scheduler.arm(cs, self.config.sync, counts);
            timer.start(counts.long);
        });

        debug!(
            "grayscale started: {:?} {:?}, {} Hz, compare {}/{}",
            self.config.mode, self.config.sync, self.config.refresh_hz, counts.long, counts.short
        );
        Ok(GrayDisplay::new(self.interface, self.config, scheduler))
    }

    /// Get reference to the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Release the interface
    pub fn release(self) -> I {
        self.interface
    }

    fn send_commands(&mut self, commands: &[u8]) -> DisplayResult<I> {
        self.interface
            .send_commands(commands)
            .map_err(Error::Interface)
    }

    fn send_data(&mut self, data: &[u8]) -> DisplayResult<I> {
        self.interface.send_data(data).map_err(Error::Interface)
    }
}
