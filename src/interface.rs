//! Hardware interface abstraction
//!
//! This module provides the [`DisplayInterface`] trait and the [`Interface`] struct
//! for communicating with an SSD1306 or SH1106 controller over SPI.
//!
//! ## Hardware Requirements
//!
//! The panel requires:
//! - SPI bus (MOSI + SCK), write only
//! - 2 GPIO pins:
//!   - **DC**: Data/Command select (output)
//!   - **RST**: Reset (output, active low)
//!
//! OLED controllers have no BUSY line; every command takes effect as soon as
//! its last byte is clocked in.
//!
//! ## Example
//!
//! ```rust,no_run
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::OutputPin;
//! use embedded_hal::spi::{Operation, SpiDevice};
//! use ssd1306_gray::{DisplayInterface, Interface};
//! # use core::convert::Infallible;
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
//! # let mut delay = MockDelay;
//! // Create interface with SPI and GPIO pins
//! let mut interface = Interface::new(MockSpi, MockPin, MockPin);
//! interface.reset(&mut delay);
//!
//! // Send a command with its parameter
//! let _ = interface.send_commands(&[0x81, 0xFF]); // Contrast
//!
//! // Send pixel data
//! let _ = interface.send_data(&[0xFF, 0x00, 0xFF]);
//! ```

use core::fmt::Debug;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;

type InterfaceResult<T, E> = core::result::Result<T, E>;

/// Bit order used to shift bytes out on the serial bus
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BitOrder {
    /// Most significant bit first (the panel's native order)
    #[default]
    MsbFirst,
    /// Least significant bit first
    LsbFirst,
}

/// Trait for hardware interface to the OLED controller
///
/// This trait abstracts over different hardware implementations,
/// allowing the [`Display`](crate::display::Display) and the grayscale
/// scheduler to work with any SPI + GPIO implementation.
///
/// ## Implementing
///
/// For most cases, use the provided [`Interface`] struct. Implement this
/// trait yourself when the bus peripheral can switch its shift direction
/// (see [`set_bit_order`](Self::set_bit_order)), which lets the bus painter
/// skip reversing bits in software.
pub trait DisplayInterface {
    /// Error type for interface operations
    ///
    /// Must implement [`Debug`] for error reporting.
    type Error: Debug;

    /// Send command bytes (opcodes and their parameters) to the controller
    ///
    /// The implementation must:
    /// 1. Set DC pin low (command mode)
    /// 2. Send the bytes over SPI
    /// 3. Set DC pin high again (data mode)
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication or GPIO fails.
    #[allow(clippy::type_complexity)]
    fn send_commands(&mut self, commands: &[u8]) -> InterfaceResult<(), Self::Error>;

    /// Send pixel data bytes to the controller
    ///
    /// The implementation must:
    /// 1. Set DC pin high (data mode)
    /// 2. Send the data bytes over SPI
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication or GPIO fails.
    #[allow(clippy::type_complexity)]
    fn send_data(&mut self, data: &[u8]) -> InterfaceResult<(), Self::Error>;

    /// Switch the bus shift direction
    ///
    /// Returns `Ok(true)` if the hardware now shifts in the requested order
    /// and `Ok(false)` if bit order cannot be changed, in which case callers
    /// reverse bits in software. The default implementation reports no
    /// support.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus peripheral rejects the reconfiguration.
    #[allow(clippy::type_complexity)]
    fn set_bit_order(&mut self, order: BitOrder) -> InterfaceResult<bool, Self::Error> {
        let _ = order;
        Ok(false)
    }

    /// Perform hardware reset
    ///
    /// The implementation must:
    /// 1. Set RST pin low
    /// 2. Wait at least 10ms
    /// 3. Set RST pin high
    /// 4. Wait at least 10ms
    fn reset<D: DelayNs>(&mut self, delay: &mut D);
}

/// Errors that can occur at the interface level
///
/// Generic over SPI and GPIO error types.
#[derive(Debug)]
pub enum InterfaceError<SpiErr, PinErr> {
    /// SPI communication error
    Spi(SpiErr),
    /// GPIO pin error
    Pin(PinErr),
}

impl<SpiErr: Debug, PinErr: Debug> core::fmt::Display for InterfaceError<SpiErr, PinErr> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Spi(e) => write!(f, "SPI error: {e:?}"),
            Self::Pin(e) => write!(f, "Pin error: {e:?}"),
        }
    }
}

impl<SpiErr: Debug, PinErr: Debug> core::error::Error for InterfaceError<SpiErr, PinErr> {}

/// Hardware interface implementation for SSD1306 / SH1106
///
/// Implements [`DisplayInterface`] for embedded-hal v1.0 SPI and GPIO traits.
/// `SpiDevice` has no notion of bit order, so this interface always reports
/// MSB-first and leaves bit reversal to the bus painter.
///
/// ## Type Parameters
///
/// * `SPI` - SPI device implementing [`SpiDevice`]
/// * `DC` - Data/Command pin implementing [`OutputPin`]
/// * `RST` - Reset pin implementing [`OutputPin`]
pub struct Interface<SPI, DC, RST> {
    /// SPI device for communication
    spi: SPI,
    /// Data/Command select pin (low=command, high=data)
    dc: DC,
    /// Reset pin (active low)
    rst: RST,
}

impl<SPI, DC, RST> Interface<SPI, DC, RST>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
{
    /// Create a new Interface
    ///
    /// # Arguments
    ///
    /// * `spi` - SPI device (must implement [`SpiDevice`])
    /// * `dc` - Data/Command pin (output, low=command, high=data)
    /// * `rst` - Reset pin (output, active low)
    pub fn new(spi: SPI, dc: DC, rst: RST) -> Self {
        Self { spi, dc, rst }
    }

    /// Release the SPI device and pins
    pub fn release(self) -> (SPI, DC, RST) {
        (self.spi, self.dc, self.rst)
    }
}

impl<SPI, DC, RST, PinErr> DisplayInterface for Interface<SPI, DC, RST>
where
    SPI: SpiDevice,
    SPI::Error: Debug,
    DC: OutputPin<Error = PinErr>,
    RST: OutputPin<Error = PinErr>,
    PinErr: Debug,
{
    type Error = InterfaceError<SPI::Error, PinErr>;

    fn send_commands(&mut self, commands: &[u8]) -> InterfaceResult<(), Self::Error> {
        self.dc.set_low().map_err(InterfaceError::Pin)?;
        self.spi.write(commands).map_err(InterfaceError::Spi)?;
        self.dc.set_high().map_err(InterfaceError::Pin)?;
        Ok(())
    }

    fn send_data(&mut self, data: &[u8]) -> InterfaceResult<(), Self::Error> {
        self.dc.set_high().map_err(InterfaceError::Pin)?;
        self.spi.write(data).map_err(InterfaceError::Spi)?;
        Ok(())
    }

    fn reset<D: DelayNs>(&mut self, delay: &mut D) {
        // Reset sequence: LOW -> wait 10ms -> HIGH -> wait 10ms
        let _ = self.rst.set_low();
        delay.delay_ms(10);
        let _ = self.rst.set_high();
        delay.delay_ms(10);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use core::cell::RefCell;
    use core::convert::Infallible;
    use embedded_hal::spi::Operation;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        DcLow,
        DcHigh,
        Write(Vec<u8>),
    }

    struct MockSpi<'a>(&'a RefCell<Vec<Event>>);
    struct MockDc<'a>(&'a RefCell<Vec<Event>>);
    struct MockRst;

    impl embedded_hal::spi::ErrorType for MockSpi<'_> {
        type Error = Infallible;
    }

    impl SpiDevice for MockSpi<'_> {
        fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
            for op in operations {
                if let Operation::Write(bytes) = op {
                    self.0.borrow_mut().push(Event::Write(bytes.to_vec()));
                }
            }
            Ok(())
        }
    }

    impl embedded_hal::digital::ErrorType for MockDc<'_> {
        type Error = Infallible;
    }

    impl OutputPin for MockDc<'_> {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.0.borrow_mut().push(Event::DcLow);
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.0.borrow_mut().push(Event::DcHigh);
            Ok(())
        }
    }

    impl embedded_hal::digital::ErrorType for MockRst {
        type Error = Infallible;
    }

    impl OutputPin for MockRst {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[test]
    fn test_send_commands_wraps_dc_low_then_high() {
        let log = RefCell::new(Vec::new());
        let mut interface = Interface::new(MockSpi(&log), MockDc(&log), MockRst);
        interface.send_commands(&[0xA8, 0x00]).unwrap();
        assert_eq!(
            *log.borrow(),
            alloc::vec![
                Event::DcLow,
                Event::Write(alloc::vec![0xA8, 0x00]),
                Event::DcHigh
            ]
        );
    }

    #[test]
    fn test_send_data_sets_dc_high() {
        let log = RefCell::new(Vec::new());
        let mut interface = Interface::new(MockSpi(&log), MockDc(&log), MockRst);
        interface.send_data(&[1, 2, 3]).unwrap();
        assert_eq!(
            *log.borrow(),
            alloc::vec![Event::DcHigh, Event::Write(alloc::vec![1, 2, 3])]
        );
    }

    #[test]
    fn test_default_bit_order_is_unsupported() {
        let log = RefCell::new(Vec::new());
        let mut interface = Interface::new(MockSpi(&log), MockDc(&log), MockRst);
        assert_eq!(interface.set_bit_order(BitOrder::LsbFirst).unwrap(), false);
        assert!(log.borrow().is_empty());
    }
}
