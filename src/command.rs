//! SSD1306 / SH1106 command definitions
//!
//! Command bytes are sent over SPI with the DC pin low. Unlike e-paper
//! controllers, parameters of an OLED command are sent in command mode too,
//! so a complete command such as "set multiplex ratio to 63" is the byte
//! sequence `[SET_MULTIPLEX, 63]` with DC held low.
//!
//! ## Example
//!
//! ```rust,no_run
//! use ssd1306_gray::{command, DisplayInterface, Interface};
//! # use core::convert::Infallible;
//! # use embedded_hal::digital::OutputPin;
//! # use embedded_hal::spi::{Operation, SpiDevice};
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
//! # let mut interface = Interface::new(MockSpi, MockPin, MockPin);
//! // Park the row scan at row 0
//! let _ = interface.send_commands(&[command::SET_MULTIPLEX, 0]);
//!
//! // Full contrast
//! let _ = interface.send_commands(&[command::SET_CONTRAST, 0xFF]);
//! ```

// Fundamental commands

/// Set contrast control (0x81)
///
/// Followed by 1 byte: contrast value 0..=255.
pub const SET_CONTRAST: u8 = 0x81;

/// Display follows RAM content (0xA4)
pub const DISPLAY_ALL_ON_RESUME: u8 = 0xA4;

/// Normal display, 1 in RAM = lit pixel (0xA6)
pub const NORMAL_DISPLAY: u8 = 0xA6;

/// Inverted display, 0 in RAM = lit pixel (0xA7)
pub const INVERT_DISPLAY: u8 = 0xA7;

/// Display off / sleep (0xAE)
pub const DISPLAY_OFF: u8 = 0xAE;

/// Display on (0xAF)
pub const DISPLAY_ON: u8 = 0xAF;

// Addressing

/// Memory addressing mode (0x20)
///
/// Followed by 1 byte: 0x00 = horizontal, 0x01 = vertical, 0x02 = page.
pub const MEMORY_MODE: u8 = 0x20;

/// Horizontal addressing mode parameter for [`MEMORY_MODE`]
pub const MEMORY_MODE_HORIZONTAL: u8 = 0x00;

/// Set column address window (0x21, SSD1306 only)
///
/// Followed by 2 bytes: start column, end column.
pub const COLUMN_ADDRESS: u8 = 0x21;

/// Set page address window (0x22, SSD1306 only)
///
/// Followed by 2 bytes: start page, end page.
pub const PAGE_ADDRESS: u8 = 0x22;

/// Set page start address for page addressing mode (0xB0..=0xB7)
///
/// The page number is added to this opcode. Used by the SH1106, which has
/// no page window command.
pub const SET_PAGE_START: u8 = 0xB0;

/// Set column start address, high nibble (0x10..=0x1F)
///
/// The high nibble is added to this opcode.
pub const SET_COLUMN_HIGH: u8 = 0x10;

// Hardware configuration

/// Set multiplex ratio (0xA8)
///
/// Followed by 1 byte: number of driven rows minus one. The grayscale
/// driver abuses this as the "park row" selector: with a ratio of 0 the
/// row scan only ever drives row 0 and stays there.
pub const SET_MULTIPLEX: u8 = 0xA8;

/// Segment remap, column 0 mapped to SEG0 (0xA0)
pub const SEGMENT_REMAP_NORMAL: u8 = 0xA0;

/// Segment remap, column 127 mapped to SEG0 (0xA1)
pub const SEGMENT_REMAP_FLIPPED: u8 = 0xA1;

/// COM output scan direction, normal (0xC0)
pub const COM_SCAN_NORMAL: u8 = 0xC0;

/// COM output scan direction, remapped (0xC8)
pub const COM_SCAN_REMAPPED: u8 = 0xC8;

// Timing and driving scheme

/// Set display clock divide ratio / oscillator frequency (0xD5)
///
/// Followed by 1 byte: high nibble = oscillator frequency, low nibble =
/// divide ratio minus one.
pub const SET_CLOCK_DIV: u8 = 0xD5;

/// Normal clock divider value used while the grayscale driver is running
pub const CLOCK_DIV_FAST: u8 = 0xF0;

/// Slowest clock divider value, used to stall row drive while parked
pub const CLOCK_DIV_SLOWEST: u8 = 0x0F;

/// Set pre-charge period (0xD9)
///
/// Followed by 1 byte: low nibble = phase 1 (precharge) cycles, high
/// nibble = phase 2 (discharge) cycles.
pub const SET_PRECHARGE: u8 = 0xD9;

/// Longest possible precharge/discharge periods
pub const PRECHARGE_SLOWEST: u8 = 0xFF;

/// Precharge restored after a slow-drive park page write
///
/// One precharge and three discharge cycles, independent of the configured
/// grayscale periods.
pub const PRECHARGE_SLOW_DRIVE_RESTORE: u8 = 0x31;

/// Charge pump setting (0x8D)
///
/// Followed by 1 byte: [`CHARGE_PUMP_ON`] or [`CHARGE_PUMP_OFF`].
pub const CHARGE_PUMP: u8 = 0x8D;

/// Charge pump enabled parameter for [`CHARGE_PUMP`]
pub const CHARGE_PUMP_ON: u8 = 0x14;

/// Charge pump disabled parameter for [`CHARGE_PUMP`]
pub const CHARGE_PUMP_OFF: u8 = 0x00;

/// Build the [`SET_PRECHARGE`] parameter from precharge and discharge cycles
///
/// ```
/// use ssd1306_gray::command::precharge_param;
///
/// assert_eq!(precharge_param(1, 2), 0x21);
/// assert_eq!(precharge_param(1, 3), 0x31);
/// ```
pub const fn precharge_param(precharge: u8, discharge: u8) -> u8 {
    (precharge & 0x0F) | ((discharge & 0x0F) << 4)
}
