//! SSD1306 / SH1106 Grayscale Driver
//!
//! Shows gray shades on a 128x64 monochrome OLED by alternating bit-planes
//! in sync with the panel row scan.
//!
//! ## Features
//!
//! - `no_std` compatible
//! - `embedded-hal` v1.0 support
//! - `embedded-graphics` integration (with `graphics` feature)
//! - Three or four gray levels, with contrast or triplane encoding
//! - Three-phase, park-row and slow-drive sync strategies
//! - SSD1306 and SH1106 controllers
//! - Fractional game update rate independent of the plane rate
//!
//! ## Usage
//!
//! A hardware timer drives the scheduler from its interrupt; the main loop
//! renders one plane at a time and hands it over.
//!
//! ```rust,no_run
//! use core::convert::Infallible;
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::OutputPin;
//! use embedded_hal::spi::{Operation, SpiDevice};
//! use ssd1306_gray::{
//!     Builder, Display, FrameScheduler, FrameTimer, Interface, PlaneMode, Shade, SyncStrategy,
//!     WaitForInterrupt,
//! };
//!
//! # struct MockSpi;
//! # impl embedded_hal::spi::ErrorType for MockSpi { type Error = Infallible; }
//! # impl SpiDevice for MockSpi {
//! #     fn transaction(
//! #         &mut self,
//! #         _operations: &mut [Operation<'_, u8>],
//! #     ) -> Result<(), Self::Error> {
//! #         Ok(())
//! #     }
//! # }
//! # struct MockPin;
//! # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
//! # impl OutputPin for MockPin {
//! #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # struct MockDelay;
//! # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! # struct Tc3;
//! # impl FrameTimer for Tc3 {
//! #     fn start(&mut self, _: u16) {}
//! #     fn set_compare(&mut self, _: u16) {}
//! # }
//! # struct Wfi;
//! # impl WaitForInterrupt for Wfi { fn wait_for_interrupt(&mut self) {} }
//! # let spi = MockSpi;
//! # let dc = MockPin;
//! # let rst = MockPin;
//! # let mut delay = MockDelay;
//! static SCHEDULER: FrameScheduler = FrameScheduler::new();
//!
//! // In the timer interrupt handler:
//! // SCHEDULER.on_timer_interrupt_with(&mut tc3);
//!
//! let interface = Interface::new(spi, dc, rst);
//! let config = match Builder::new()
//!     .mode(PlaneMode::L4Contrast)
//!     .sync(SyncStrategy::ParkRow)
//!     .update_hz(30)
//!     .build()
//! {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//!
//! let mut display = Display::new(interface, config);
//! let _ = display.reset(&mut delay);
//! let mut gray = match display.start_gray(&SCHEDULER, &mut Tc3) {
//!     Ok(gray) => gray,
//!     Err(_) => return,
//! };
//!
//! let mut buffer = [0u8; 1024];
//! loop {
//!     if gray.needs_update() {
//!         // game logic
//!     }
//!     if gray.color(Shade::LightGray) {
//!         buffer[0] = 0xFF;
//!     }
//!     let _ = gray.wait_for_next_plane(&mut buffer, Shade::Black, &mut Wfi);
//! }
//! ```

#![no_std]

#[cfg(any(test, feature = "alloc"))]
extern crate alloc;

/// Update cadence
pub mod cadence;
/// Logical shades for grayscale rendering
pub mod color;
/// SSD1306 / SH1106 command definitions
pub mod command;
/// Display configuration types and builder
pub mod config;
/// Core display operations
pub mod display;
/// Error types for the driver
pub mod error;
/// Grayscale plane scheduler
pub mod gray;
/// Hardware interface abstraction
pub mod interface;
/// Framebuffer layout
pub mod layout;
/// Bus painter
pub mod painter;
/// Plane modes and the shade-to-plane mapper
pub mod plane;
/// Frame timer interrupt state
pub mod scheduler;

/// Graphics support via embedded-graphics (requires `graphics` feature)
#[cfg(feature = "graphics")]
pub mod graphics;

pub use cadence::UpdateCadence;
pub use color::Shade;
pub use config::{
    BUFFER_SIZE, Builder, Config, Controller, FrameTimerSelect, HEIGHT, PlaneContrast,
    SyncStrategy, WIDTH,
};
pub use display::Display;
pub use error::{BuilderError, Error};
pub use gray::GrayDisplay;
pub use interface::{BitOrder, DisplayInterface, Interface, InterfaceError};
pub use plane::{L3Conversion, PlaneMode};
pub use scheduler::{FrameScheduler, FrameTimer, TimerCounts, WaitForInterrupt};

#[cfg(feature = "graphics")]
pub use graphics::GraphicDisplay;
