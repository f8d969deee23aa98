//! Logical shades for grayscale rendering
//!
//! This module defines the [`Shade`] enum used by application drawing code.
//! A shade is not a pixel value: it is turned into one binary pixel per
//! bit-plane by the [plane mapper](crate::plane), and the panel shows the
//! planes in quick succession.
//!
//! | Shade       | Level | Alias  |
//! |-------------|-------|--------|
//! | `Black`     | 0     |        |
//! | `DarkGray`  | 1     | `GRAY` |
//! | `LightGray` | 2     |        |
//! | `White`     | 3     |        |
//!
//! In [`PlaneMode::L3`](crate::PlaneMode::L3) only three shades are
//! distinct: `LightGray` renders like `White`.
//!
//! ## Example
//!
//! ```
//! use ssd1306_gray::Shade;
//!
//! assert_eq!(Shade::DarkGray.level(), 1);
//! assert_eq!(Shade::GRAY, Shade::DarkGray);
//! assert_eq!(Shade::from_level(3), Some(Shade::White));
//! assert_eq!(Shade::from_level(4), None);
//! ```

/// Logical shade, from black to white
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Shade {
    /// Unlit on every plane
    #[default]
    Black = 0,
    /// Darkest gray level
    DarkGray = 1,
    /// Lightest gray level
    LightGray = 2,
    /// Lit on every plane
    White = 3,
}

#[cfg(feature = "graphics")]
impl embedded_graphics_core::prelude::PixelColor for Shade {
    type Raw = embedded_graphics_core::pixelcolor::raw::RawU2;
}

#[cfg(feature = "graphics")]
impl From<embedded_graphics_core::pixelcolor::BinaryColor> for Shade {
    fn from(color: embedded_graphics_core::pixelcolor::BinaryColor) -> Self {
        match color {
            embedded_graphics_core::pixelcolor::BinaryColor::Off => Self::Black,
            embedded_graphics_core::pixelcolor::BinaryColor::On => Self::White,
        }
    }
}

impl Shade {
    /// The middle shade of three-level modes
    pub const GRAY: Self = Self::DarkGray;

    /// Numeric level, 0 (black) to 3 (white)
    pub const fn level(self) -> u8 {
        self as u8
    }

    /// Shade for a numeric level, `None` if the level is above 3
    pub const fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(Self::Black),
            1 => Some(Self::DarkGray),
            2 => Some(Self::LightGray),
            3 => Some(Self::White),
            _ => None,
        }
    }
}
