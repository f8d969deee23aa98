//! Bus painter
//!
//! Streams framebuffer pages to the panel while optionally clearing the bytes
//! it has sent and masking what goes out on the wire.
//!
//! Pages are sent from the last byte to the first. The grayscale driver runs
//! the panel unflipped (`A0`/`C0`), so a buffer laid out for the flipped boot
//! orientation comes out right side up when streamed backwards with each
//! byte's bits reversed. Bits are reversed by the bus peripheral when
//! [`DisplayInterface::set_bit_order`] supports it, in software otherwise.
//!
//! ## Example
//!
//! ```
//! use ssd1306_gray::painter::{Clear, Paint, Painter};
//! use ssd1306_gray::{Controller, DisplayInterface};
//! # struct Null;
//! # impl DisplayInterface for Null {
//! #     type Error = core::convert::Infallible;
//! #     fn send_commands(&mut self, _: &[u8]) -> Result<(), Self::Error> { Ok(()) }
//! #     fn send_data(&mut self, _: &[u8]) -> Result<(), Self::Error> { Ok(()) }
//! #     fn reset<D: embedded_hal::delay::DelayNs>(&mut self, _: &mut D) {}
//! # }
//! # let mut interface = Null;
//! let mut buffer = [0xAAu8; 1024];
//! let painter = Painter::new(Controller::Ssd1306);
//!
//! // Send pages 0..7 and zero them behind the stream
//! let _ = painter.paint(&mut interface, &mut buffer, Paint::pages(0, 7).clear(Clear::Fill(0)));
//! assert!(buffer[..896].iter().all(|&b| b == 0));
//! assert!(buffer[896..].iter().all(|&b| b == 0xAA));
//! ```

use crate::command::{SET_COLUMN_HIGH, SET_PAGE_START};
use crate::config::{Controller, WIDTH};
use crate::layout::page_offset;
use crate::error::Error;
use crate::interface::{BitOrder, DisplayInterface};

type PaintResult<I> = core::result::Result<(), Error<I>>;

/// What happens to buffer bytes after they are sent
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Clear {
    /// Leave the buffer untouched
    #[default]
    Keep,
    /// Overwrite every sent byte with this value
    Fill(u8),
}

/// Number of pages to send and where they land on the panel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageSpan {
    /// Number of 128-byte pages
    pub count: u8,
    /// First panel page for controllers addressed page by page (SH1106)
    ///
    /// Ignored by the SSD1306, whose page window is set by command.
    pub panel_start: u8,
}

/// One painter invocation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Paint {
    /// First framebuffer page
    pub first_page: u8,
    /// Pages to send
    pub pages: PageSpan,
    /// Clear behavior
    pub clear: Clear,
    /// AND mask applied to every byte on the wire
    pub mask: u8,
}

impl Paint {
    /// Send `count` pages starting at `first_page`, unmasked, keeping the buffer
    pub const fn pages(first_page: u8, count: u8) -> Self {
        Self {
            first_page,
            pages: PageSpan {
                count,
                panel_start: 0,
            },
            clear: Clear::Keep,
            mask: 0xFF,
        }
    }

    /// Send a single page
    pub const fn page(page: u8) -> Self {
        Self::pages(page, 1)
    }

    /// Set the clear behavior
    pub const fn clear(mut self, clear: Clear) -> Self {
        self.clear = clear;
        self
    }

    /// Set the wire mask
    pub const fn mask(mut self, mask: u8) -> Self {
        self.mask = mask;
        self
    }

    /// Set the first panel page (SH1106)
    pub const fn panel_start(mut self, page: u8) -> Self {
        self.pages.panel_start = page;
        self
    }

    fn byte_range(&self) -> core::ops::Range<usize> {
        page_offset(self.first_page)..page_offset(self.first_page + self.pages.count)
    }
}

/// Streams framebuffer pages to a controller
#[derive(Clone, Copy, Debug)]
pub struct Painter {
    controller: Controller,
}

impl Painter {
    /// Create a painter for `controller`
    pub const fn new(controller: Controller) -> Self {
        Self { controller }
    }

    /// Send the pages selected by `paint`
    ///
    /// The transfer runs inside a critical section so the frame interrupt
    /// cannot stretch it. Sending zero pages touches neither the bus nor the
    /// buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferTooSmall`] if the pages extend past `buffer`,
    /// or [`Error::Interface`] if the bus fails.
    pub fn paint<I: DisplayInterface>(
        &self,
        interface: &mut I,
        buffer: &mut [u8],
        paint: Paint,
    ) -> PaintResult<I> {
        if paint.pages.count == 0 {
            return Ok(());
        }
        let range = paint.byte_range();
        if buffer.len() < range.end {
            return Err(Error::BufferTooSmall {
                required: range.end,
                provided: buffer.len(),
            });
        }
        let region = &mut buffer[range];

        critical_section::with(|_| {
            let hardware = interface
                .set_bit_order(BitOrder::LsbFirst)
                .map_err(Error::Interface)?;
            let result = self.send_pages(interface, region, paint, hardware);
            if hardware {
                interface
                    .set_bit_order(BitOrder::MsbFirst)
                    .map_err(Error::Interface)?;
            }
            result
        })
    }

    fn send_pages<I: DisplayInterface>(
        &self,
        interface: &mut I,
        region: &mut [u8],
        paint: Paint,
        hardware: bool,
    ) -> PaintResult<I> {
        let mut chunk = [0u8; WIDTH];
        let mut panel_page = paint.pages.panel_start;

        for page in region.chunks_exact_mut(WIDTH).rev() {
            if self.controller == Controller::Sh1106 {
                // Commands always go out MSB first
                if hardware {
                    interface
                        .set_bit_order(BitOrder::MsbFirst)
                        .map_err(Error::Interface)?;
                }
                interface
                    .send_commands(&[SET_PAGE_START | (panel_page & 0x07), SET_COLUMN_HIGH])
                    .map_err(Error::Interface)?;
                if hardware {
                    interface
                        .set_bit_order(BitOrder::LsbFirst)
                        .map_err(Error::Interface)?;
                }
                panel_page = panel_page.wrapping_add(1);
            }

            for (out, byte) in chunk.iter_mut().zip(page.iter_mut().rev()) {
                let value = *byte & paint.mask;
                if let Clear::Fill(fill) = paint.clear {
                    *byte = fill;
                }
                *out = if hardware { value } else { value.reverse_bits() };
            }
            interface.send_data(&chunk).map_err(Error::Interface)?;
        }

        Ok(())
    }
}
