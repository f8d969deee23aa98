//! Framebuffer layout
//!
//! The framebuffer is page-major: eight pages of 128 column bytes. Bit `n` of
//! a byte is row `page * 8 + n`, so one byte covers a vertical strip of eight
//! pixels.
//!
//! ```
//! use ssd1306_gray::layout::pixel_index;
//!
//! assert_eq!(pixel_index(0, 0), Some((0, 0x01)));
//! assert_eq!(pixel_index(5, 9), Some((133, 0x02)));
//! assert_eq!(pixel_index(127, 63), Some((1023, 0x80)));
//! assert_eq!(pixel_index(128, 0), None);
//! ```

use crate::config::{HEIGHT, WIDTH};

/// Byte offset of the first byte of `page`
pub const fn page_offset(page: u8) -> usize {
    page as usize * WIDTH
}

/// Byte index and bit mask of pixel (`x`, `y`), `None` if off-panel
pub const fn pixel_index(x: u32, y: u32) -> Option<(usize, u8)> {
    if x >= WIDTH as u32 || y >= HEIGHT as u32 {
        return None;
    }
    let index = x as usize + (y as usize / 8) * WIDTH;
    Some((index, 1 << (y % 8)))
}

/// Set or clear pixel (`x`, `y`) in `buffer`
///
/// Off-panel pixels and pixels past the end of a short buffer are ignored.
pub fn set_pixel(buffer: &mut [u8], x: u32, y: u32, on: bool) {
    let Some((index, bit)) = pixel_index(x, y) else {
        return;
    };
    if let Some(byte) = buffer.get_mut(index) {
        if on {
            *byte |= bit;
        } else {
            *byte &= !bit;
        }
    }
}

/// Read pixel (`x`, `y`) from `buffer`
#[cfg(test)]
pub(crate) fn pixel(buffer: &[u8], x: u32, y: u32) -> bool {
    pixel_index(x, y)
        .and_then(|(index, bit)| buffer.get(index).map(|byte| byte & bit != 0))
        .unwrap_or(false)
}
