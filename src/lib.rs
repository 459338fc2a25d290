//! Driver for ILI9341 TFT panels with an RGB888 framebuffer.
//!
//! Drawing happens in an off-screen framebuffer that stores 3 bytes per pixel.
//! [`TftDriver::refresh`] pushes the whole framebuffer to the panel: each
//! horizontal band of [`BAND_HEIGHT`] rows is converted to the panel's native
//! RGB565 format into one of two alternating staging slots and streamed with a
//! column-address, page-address, memory-write sequence.
//!
//! # Architecture
//!
//! ```text
//!  write_pixel / write_char / write_string / embedded-graphics
//!        │
//!        ▼
//!  ┌─────────────┐  band   ┌──────────────┐  slot 0/1  ┌───────────────┐
//!  │ FrameBuffer │ ──────▶ │ StagingBands │ ─────────▶ │ ili9341 bands │
//!  │  (RGB888)   │         │  (RGB565 BE) │            └───────┬───────┘
//!  └─────────────┘         └──────────────┘                    ▼
//!                                                      ┌──────────────┐
//!                                                      │ PanelBackend │
//!                                                      └──────────────┘
//! ```
//!
//! The transport is abstracted by [`PanelBackend`] (command, data, reset,
//! delay). [`interface::SpiInterface`] implements it with `embedded-hal`
//! SPI, GPIO and delay traits. Fonts come from a [`FontProvider`].
//!
//! ## Available Feature Flags
//!
//! ### `log` Feature
//! Emits driver events through the `log` crate.
//!
//! ### `defmt` Feature
//! Emits driver events through `defmt` and implements `defmt::Format` for the
//! public types. Takes precedence over `log` when both are enabled.
#![no_std]

extern crate alloc;

use embedded_graphics::pixelcolor::raw::RawU24;
use embedded_graphics::pixelcolor::Rgb888;

#[macro_use]
mod fmt;

pub mod driver;
pub mod font;
pub mod framebuffer;
pub mod ili9341;
pub mod interface;
pub mod text;

pub use driver::TftDriver;
pub use font::FontProvider;
pub use font::FontSize;
pub use font::Glyph;
pub use framebuffer::band::BAND_HEIGHT;
pub use framebuffer::FrameBuffer;
pub use interface::PanelBackend;
pub use interface::ResetLevel;
pub use text::Cursor;

pub type Color = Rgb888;

/// Build a [`Color`] from a `0xRRGGBB` value. Bits above 24 are ignored.
#[must_use]
pub fn rgb(value: u32) -> Color {
    Color::from(RawU24::new(value & 0x00FF_FFFF))
}

/// Panel geometry fixed at configuration time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TftConfig {
    pub width: u16,
    pub height: u16,
}

impl TftConfig {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Reject geometries no buffer can be allocated for.
    pub fn validate<E>(&self) -> Result<(), TftError<E>> {
        if self.width == 0 || self.height == 0 {
            return Err(TftError::InvalidConfig);
        }
        Ok(())
    }
}

impl Default for TftConfig {
    /// 320x240, the landscape orientation selected by the power-up sequence.
    fn default() -> Self {
        Self::new(320, 240)
    }
}

/// Driver errors. `E` is the [`PanelBackend`] error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TftError<E> {
    /// Operation attempted before [`TftDriver::configure`].
    NotConfigured,
    /// [`TftDriver::configure`] called on a configured driver.
    AlreadyConfigured,
    /// Zero width or height.
    InvalidConfig,
    /// The font has no glyph for the character.
    GlyphNotFound,
    /// Pixel coordinate outside the panel.
    CoordinateOutOfRange,
    /// A backend primitive failed.
    Backend(E),
}

impl<E> From<text::GlyphNotFound> for TftError<E> {
    fn from(_: text::GlyphNotFound) -> Self {
        Self::GlyphNotFound
    }
}

impl<E: core::fmt::Debug> core::fmt::Display for TftError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotConfigured => f.write_str("driver not configured"),
            Self::AlreadyConfigured => f.write_str("driver already configured"),
            Self::InvalidConfig => f.write_str("invalid panel geometry"),
            Self::GlyphNotFound => f.write_str("glyph not found"),
            Self::CoordinateOutOfRange => f.write_str("coordinate out of range"),
            Self::Backend(e) => write!(f, "panel backend failed: {e:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::format;

    use super::*;
    use embedded_graphics::pixelcolor::RgbColor;

    #[test]
    fn test_rgb() {
        assert_eq!(rgb(0xFF_0000), Color::RED);
        assert_eq!(rgb(0xFFFF_FFFF), Color::WHITE);
        assert_eq!(rgb(0x12_3456), Color::new(0x12, 0x34, 0x56));
    }

    #[test]
    fn test_config() {
        assert_eq!(TftConfig::default(), TftConfig::new(320, 240));
        assert_eq!(TftConfig::new(320, 240).validate::<()>(), Ok(()));
        assert_eq!(
            TftConfig::new(0, 240).validate::<()>(),
            Err(TftError::InvalidConfig)
        );
        assert_eq!(
            TftConfig::new(320, 0).validate::<()>(),
            Err(TftError::InvalidConfig)
        );
    }

    #[test]
    fn test_error_display() {
        let err: TftError<u8> = TftError::Backend(3);
        assert_eq!(format!("{err}"), "panel backend failed: 3");
        let err: TftError<u8> = text::GlyphNotFound { code: b'x' }.into();
        assert_eq!(err, TftError::GlyphNotFound);
    }
}
