//! Error types for the driver
//!
//! This module defines error types for configuration building ([`BuilderError`])
//! and display operations ([`Error`]).
//!
//! ## Error Types
//!
//! - [`BuilderError`] - Errors during configuration construction
//! - [`Error`] - Runtime errors during display operations
//! - [`InterfaceError`](crate::interface::InterfaceError) - Low-level hardware communication errors
//!
//! A missed frame tick is not an error: ticks coalesce into a single pending
//! flag and the next step simply runs late.
//!
//! ## Example
//!
//! ```
//! use ssd1306_gray::{Builder, BuilderError, L3Conversion, PlaneMode};
//!
//! // Conversion only applies to the triplane mode
//! let result = Builder::new()
//!     .mode(PlaneMode::L3)
//!     .l3_conversion(L3Conversion::Mix)
//!     .build();
//! assert!(matches!(result, Err(BuilderError::ConversionRequiresTriplane { .. })));
//!
//! // Refresh rate must be non-zero
//! let result = Builder::new().refresh_hz(0).build();
//! assert!(result.is_err());
//! ```

use crate::interface::DisplayInterface;
use crate::plane::PlaneMode;

/// Errors that can occur when interacting with the display
///
/// Generic over the interface type to preserve the specific error type.
/// This allows error handling code to match on the underlying hardware error.
#[derive(Debug)]
pub enum Error<I: DisplayInterface> {
    /// Interface error (SPI/GPIO)
    ///
    /// Wraps the underlying hardware error from the [`DisplayInterface`] implementation.
    Interface(I::Error),
    /// Buffer is too small for the painted pages
    ///
    /// The framebuffer must be at least [`BUFFER_SIZE`](crate::config::BUFFER_SIZE) bytes.
    BufferTooSmall {
        /// Required buffer size in bytes
        required: usize,
        /// Provided buffer size in bytes
        provided: usize,
    },
    /// Operation not available in the configured plane mode
    Unsupported {
        /// Name of the rejected operation
        operation: &'static str,
        /// Configured plane mode
        mode: PlaneMode,
    },
    /// Plane index out of range for the configured mode
    InvalidPlane {
        /// Requested plane
        plane: u8,
        /// Number of planes in the mode
        planes: u8,
    },
}

impl<I: DisplayInterface> core::fmt::Display for Error<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Interface(_) => write!(f, "Interface error"),
            Self::BufferTooSmall { required, provided } => {
                write!(
                    f,
                    "Buffer too small: required {required} bytes, provided {provided}"
                )
            }
            Self::Unsupported { operation, mode } => {
                write!(f, "{operation} is not supported in {mode:?} mode")
            }
            Self::InvalidPlane { plane, planes } => {
                write!(f, "Invalid plane {plane}: mode has {planes} planes")
            }
        }
    }
}

impl<I: DisplayInterface + core::fmt::Debug> core::error::Error for Error<I> {}

/// Errors that can occur when building configuration
///
/// These errors occur during the builder pattern before the display is created.
#[derive(Debug, PartialEq, Eq)]
pub enum BuilderError {
    /// Refresh rate, CPU clock or timer combination gives an unusable compare value
    ///
    /// The frame timer count must be at least 16 ticks and fit the selected timer.
    InvalidTiming {
        /// CPU clock in Hz
        cpu_hz: u32,
        /// Requested refresh rate in Hz
        refresh_hz: u16,
    },
    /// An L3 conversion was requested for a mode other than [`PlaneMode::L4Triplane`]
    ConversionRequiresTriplane {
        /// Configured plane mode
        mode: PlaneMode,
    },
    /// Per-plane contrast was requested for [`PlaneMode::L4Contrast`]
    ///
    /// That mode already drives contrast per plane.
    PlaneContrastUnsupported {
        /// Configured plane mode
        mode: PlaneMode,
    },
    /// Update threshold or increment is zero
    InvalidUpdateRate {
        /// Update threshold
        every_n: u8,
        /// Update increment
        denom: u8,
    },
    /// Precharge or discharge period outside 1..=15 display clocks
    InvalidPrecharge {
        /// Offending period
        cycles: u8,
    },
}

impl core::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidTiming { cpu_hz, refresh_hz } => write!(
                f,
                "Refresh rate {refresh_hz} Hz is not reachable from a {cpu_hz} Hz clock"
            ),
            Self::ConversionRequiresTriplane { mode } => {
                write!(f, "L3 conversion requires L4Triplane mode, got {mode:?}")
            }
            Self::PlaneContrastUnsupported { mode } => {
                write!(f, "Per-plane contrast is not supported in {mode:?} mode")
            }
            Self::InvalidUpdateRate { every_n, denom } => {
                write!(f, "Invalid update rate {every_n}/{denom}")
            }
            Self::InvalidPrecharge { cycles } => {
                write!(f, "Invalid precharge period {cycles} (must be 1..=15)")
            }
        }
    }
}

impl core::error::Error for BuilderError {}
