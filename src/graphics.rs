//! Graphics support via embedded-graphics
//!
//! This module provides the [`GraphicDisplay`] struct which wraps [`GrayDisplay`]
//! and implements the [`DrawTarget`](embedded_graphics_core::draw_target::DrawTarget) trait from
//! the embedded-graphics ecosystem, with [`Shade`] as its color.
//!
//! Drawing renders the current plane only: each shade becomes a lit or unlit
//! pixel according to the plane being prepared. Redraw the scene once per
//! plane, between calls to [`wait_for_next_plane`](GraphicDisplay::wait_for_next_plane).
//!
//! ## Example
//!
//! ```rust,no_run
//! use embedded_graphics::{
//!     prelude::*,
//!     primitives::{Circle, PrimitiveStyle, Rectangle},
//! };
//! use ssd1306_gray::{GraphicDisplay, Shade};
//! # use core::convert::Infallible;
//! # use embedded_hal::digital::OutputPin;
//! # use embedded_hal::spi::{Operation, SpiDevice};
//! # use ssd1306_gray::{Builder, Display, FrameScheduler, FrameTimer, Interface, WaitForInterrupt};
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
//! # struct Timer;
//! # impl FrameTimer for Timer {
//! #     fn start(&mut self, _: u16) {}
//! #     fn set_compare(&mut self, _: u16) {}
//! # }
//! # struct Wfi;
//! # impl WaitForInterrupt for Wfi { fn wait_for_interrupt(&mut self) {} }
//! # static SCHEDULER: FrameScheduler = FrameScheduler::new();
//! # let config = match Builder::new().build() {
//! #     Ok(config) => config,
//! #     Err(_) => return,
//! # };
//! # let display = Display::new(Interface::new(MockSpi, MockPin, MockPin), config);
//! # let gray = match display.start_gray(&SCHEDULER, &mut Timer) {
//! #     Ok(gray) => gray,
//! #     Err(_) => return,
//! # };
//! let mut display = match GraphicDisplay::try_new(gray, [0u8; 1024]) {
//!     Ok(display) => display,
//!     Err(_) => return,
//! };
//!
//! loop {
//!     let _ = Rectangle::new(Point::new(10, 10), Size::new(50, 30))
//!         .into_styled(PrimitiveStyle::with_fill(Shade::GRAY))
//!         .draw(&mut display);
//!
//!     let _ = Circle::new(Point::new(80, 20), 30)
//!         .into_styled(PrimitiveStyle::with_stroke(Shade::White, 2))
//!         .draw(&mut display);
//!
//!     // Send this plane and clear the buffer for the next one
//!     let _ = display.wait_for_next_plane(Shade::Black, &mut Wfi);
//! }
//! ```

use core::convert::Infallible;
use embedded_graphics_core::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Point, Size},
    prelude::Pixel,
};

use crate::color::Shade;
use crate::config::{BUFFER_SIZE, WIDTH};
use crate::error::Error;
use crate::gray::GrayDisplay;
use crate::interface::DisplayInterface;
use crate::layout::set_pixel;
use crate::scheduler::WaitForInterrupt;

/// Grayscale display with a framebuffer
///
/// ## Type Parameters
///
/// * `I` - Interface type implementing [`DisplayInterface`]
/// * `B` - Buffer type implementing `AsMut<[u8]>`, at least 1024 bytes
pub struct GraphicDisplay<'s, I, B>
where
    I: DisplayInterface,
    B: AsMut<[u8]>,
{
    /// The underlying grayscale driver
    display: GrayDisplay<'s, I>,
    /// Page-major framebuffer
    buffer: B,
}

type GraphicsResult<I> = core::result::Result<(), Error<I>>;
type GraphicsNewResult<I, T> = core::result::Result<T, Error<I>>;

impl<'s, I, B> GraphicDisplay<'s, I, B>
where
    I: DisplayInterface,
    B: AsMut<[u8]>,
{
    /// Create a new GraphicDisplay
    ///
    /// # Panics
    ///
    /// Panics if `buffer` is smaller than [`BUFFER_SIZE`].
    pub fn new(display: GrayDisplay<'s, I>, mut buffer: B) -> Self {
        assert!(
            buffer.as_mut().len() >= BUFFER_SIZE,
            "buffer too small: required {} bytes, got {}",
            BUFFER_SIZE,
            buffer.as_mut().len()
        );
        Self { display, buffer }
    }

    /// Try to create a new GraphicDisplay, returning an error if the buffer is too small
    ///
    /// This is the fallible version of [`new`](Self::new).
    ///
    /// # Errors
    ///
    /// Returns `Error::BufferTooSmall` if `buffer` is smaller than [`BUFFER_SIZE`].
    pub fn try_new(display: GrayDisplay<'s, I>, mut buffer: B) -> GraphicsNewResult<I, Self> {
        let provided = buffer.as_mut().len();
        if provided < BUFFER_SIZE {
            return Err(Error::BufferTooSmall {
                required: BUFFER_SIZE,
                provided,
            });
        }
        Ok(Self { display, buffer })
    }

    /// Poll for the next plane, see [`GrayDisplay::next_plane`]
    pub fn next_plane(&mut self, clear: Shade) -> Result<bool, Error<I>> {
        self.display.next_plane(self.buffer.as_mut(), clear)
    }

    /// Wait for the next plane, see [`GrayDisplay::wait_for_next_plane`]
    pub fn wait_for_next_plane<W: WaitForInterrupt>(
        &mut self,
        clear: Shade,
        waiter: &mut W,
    ) -> GraphicsResult<I> {
        self.display
            .wait_for_next_plane(self.buffer.as_mut(), clear, waiter)
    }

    /// Get reference to the grayscale driver
    pub fn display(&self) -> &GrayDisplay<'s, I> {
        &self.display
    }

    /// Get mutable reference to the grayscale driver
    pub fn display_mut(&mut self) -> &mut GrayDisplay<'s, I> {
        &mut self.display
    }

    /// Get mutable access to the raw framebuffer
    pub fn buffer_mut(&mut self) -> &mut [u8] {
        self.buffer.as_mut()
    }

    /// Release the driver and buffer
    pub fn release(self) -> (GrayDisplay<'s, I>, B) {
        (self.display, self.buffer)
    }
}

impl<I, B> DrawTarget for GraphicDisplay<'_, I, B>
where
    I: DisplayInterface,
    B: AsMut<[u8]>,
{
    type Color = Shade;
    type Error = Infallible;

    fn draw_iter<Iter>(&mut self, pixels: Iter) -> Result<(), Self::Error>
    where
        Iter: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let sz = self.size();
        let buffer = self.buffer.as_mut();

        for Pixel(Point { x, y }, shade) in pixels {
            if x < 0 || y < 0 {
                continue;
            }

            let x = x as u32;
            let y = y as u32;

            if x >= sz.width || y >= sz.height {
                continue;
            }

            set_pixel(buffer, x, y, self.display.color(shade));
        }

        Ok(())
    }

    fn clear(&mut self, shade: Self::Color) -> Result<(), Self::Error> {
        let fill = if self.display.color(shade) { 0xFF } else { 0x00 };
        self.buffer.as_mut()[..BUFFER_SIZE].fill(fill);
        Ok(())
    }
}

impl<I, B> OriginDimensions for GraphicDisplay<'_, I, B>
where
    I: DisplayInterface,
    B: AsMut<[u8]>,
{
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, self.display.usable_height() as u32)
    }
}
