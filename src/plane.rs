//! Plane modes and the shade-to-plane mapper
//!
//! A plane is one binary full-screen image. Gray shades are produced by
//! lighting a pixel on some planes and not others; the eye averages the
//! planes shown in quick succession.
//!
//! | Mode          | Shade      | Plane 0 | Plane 1 | Plane 2 |
//! |---------------|------------|---------|---------|---------|
//! | `L4Contrast`  | Black      | .       | .       |         |
//! | `L4Contrast`  | DarkGray   | X       | .       |         |
//! | `L4Contrast`  | LightGray  | .       | X       |         |
//! | `L4Contrast`  | White      | X       | X       |         |
//! | `L4Triplane`  | Black      | .       | .       | .       |
//! | `L4Triplane`  | DarkGray   | X       | .       | .       |
//! | `L4Triplane`  | LightGray  | X       | X       | .       |
//! | `L4Triplane`  | White      | X       | X       | X       |
//! | `L3`          | Black      | .       | .       |         |
//! | `L3`          | Gray       | X       | .       |         |
//! | `L3`          | White      | X       | X       |         |
//!
//! `L4Contrast` is a binary code: the panel contrast is switched with the
//! plane so plane 1 weighs more than plane 0. The other two modes use a
//! thermometer code.
//!
//! ## Example
//!
//! ```
//! use ssd1306_gray::{plane::plane_color, PlaneMode, Shade};
//!
//! let mode = PlaneMode::L4Contrast;
//! assert!(plane_color(mode, 0, Shade::DarkGray));
//! assert!(!plane_color(mode, 1, Shade::DarkGray));
//! ```

use crate::color::Shade;

/// How shades are spread across bit-planes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaneMode {
    /// 4 levels from 2 planes, contrast toggled per plane
    L4Contrast,
    /// 4 levels from 3 planes; visible strobing from the lower image rate
    L4Triplane,
    /// 3 levels from 2 planes; best image quality
    #[default]
    L3,
}

impl PlaneMode {
    /// Number of planes a full display cycle is made of
    pub const fn num_planes(self) -> u8 {
        match self {
            Self::L4Contrast => 2,
            Self::L4Triplane => 3,
            Self::L3 => 2,
        }
    }
}

/// Folding of [`PlaneMode::L4Triplane`] down to three levels
///
/// The plane layout of the triplane mode is kept (so triplane artwork can
/// be reused) but only two of its planes are shown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum L3Conversion {
    /// Show all three planes
    #[default]
    None,
    /// Planes 0 and 1: light gray becomes white, dark gray becomes gray
    Lighten,
    /// Planes 0 and 2: both grays become gray
    Mix,
    /// Planes 1 and 2: light gray becomes gray, dark gray becomes black
    Darken,
}

impl L3Conversion {
    /// Number of planes cycled through for `mode`
    pub const fn planes_for(self, mode: PlaneMode) -> u8 {
        match (mode, self) {
            (PlaneMode::L4Triplane, Self::None) => 3,
            (PlaneMode::L4Triplane, _) => 2,
            (mode, _) => mode.num_planes(),
        }
    }

    /// Map a cycled plane index to the plane it represents
    pub const fn effective_plane(self, plane: u8) -> u8 {
        match self {
            Self::None | Self::Lighten => plane,
            Self::Mix => plane << 1,
            Self::Darken => plane + 1,
        }
    }
}

/// Whether `shade` is lit on the statically known plane `PLANE`
///
/// This is the branch-free fast path for drawing code that renders one
/// plane at a time with the plane index as a constant.
///
/// ```
/// use ssd1306_gray::{plane::plane_color_const, PlaneMode, Shade};
///
/// assert!(plane_color_const::<2>(PlaneMode::L4Triplane, Shade::White));
/// assert!(!plane_color_const::<2>(PlaneMode::L4Triplane, Shade::LightGray));
/// ```
#[inline(always)]
pub const fn plane_color_const<const PLANE: u8>(mode: PlaneMode, shade: Shade) -> bool {
    let level = shade as u8;
    match mode {
        PlaneMode::L4Contrast => level & (PLANE + 1) != 0,
        PlaneMode::L4Triplane | PlaneMode::L3 => level > PLANE,
    }
}

/// Whether `shade` is lit on `plane`
///
/// Plane indices past the last plane of two-plane modes are treated as
/// plane 1.
#[inline]
pub const fn plane_color(mode: PlaneMode, plane: u8, shade: Shade) -> bool {
    if plane == 0 {
        plane_color_const::<0>(mode, shade)
    } else if plane == 1 || !matches!(mode, PlaneMode::L4Triplane) {
        plane_color_const::<1>(mode, shade)
    } else {
        plane_color_const::<2>(mode, shade)
    }
}
