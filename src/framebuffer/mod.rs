//! Off-screen RGB888 framebuffer for TFT panels.
//!
//! The framebuffer holds one 3-byte `R, G, B` triple per pixel in row-major
//! order with the origin in the top left corner. It is allocated once when the
//! driver is configured and never resized.
//!
//! Refreshing the panel does not read this buffer directly: it is converted one
//! horizontal band at a time into the panel's native RGB565 format by
//! [`StagingBands`](band::StagingBands) and streamed from there.
//!
//! # Example
//! ```rust
//! use embedded_graphics::prelude::*;
//! use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
//! use tft_driver::framebuffer::FrameBuffer;
//! use tft_driver::Color;
//!
//! let mut fb = FrameBuffer::new(32, 16);
//! fb.fill(Color::BLUE);
//!
//! // the framebuffer is an embedded-graphics canvas
//! Rectangle::new(Point::new(2, 2), Size::new(4, 4))
//!     .into_styled(PrimitiveStyle::with_fill(Color::RED))
//!     .draw(&mut fb)
//!     .unwrap();
//!
//! assert_eq!(fb.get_pixel(3, 3), Some(Color::RED));
//! ```

use alloc::vec;
use alloc::vec::Vec;
use core::convert::Infallible;

use embedded_graphics::pixelcolor::RgbColor;
use embedded_graphics::prelude::OriginDimensions;
use embedded_graphics::prelude::Size;
use embedded_graphics::Pixel;

use crate::Color;

pub mod band;

/// Bytes used by one framebuffer pixel.
pub const BYTES_PER_PIXEL: usize = 3;

/// Size in bytes of a `width` x `height` framebuffer.
#[must_use]
pub const fn compute_buffer_size(width: usize, height: usize) -> usize {
    width * height * BYTES_PER_PIXEL
}

/// RGB888 framebuffer.
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl FrameBuffer {
    /// Allocate a black framebuffer of `width` x `height` pixels.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; compute_buffer_size(width, height)],
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns true if `(x, y)` lies on the panel.
    #[must_use]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    /// Byte offset of pixel `(x, y)`. The caller checks bounds.
    #[inline]
    fn offset(&self, x: usize, y: usize) -> usize {
        (x + y * self.width) * BYTES_PER_PIXEL
    }

    /// Byte range covering `rows` full rows starting at `row`.
    pub(crate) fn rows(&self, row: usize, rows: usize) -> &[u8] {
        let start = self.offset(0, row);
        let end = self.offset(0, row + rows);
        &self.data[start..end]
    }

    /// Store `color` at `(x, y)`.
    ///
    /// Returns `false` and leaves the buffer untouched when the coordinate is
    /// outside the panel.
    pub fn set_pixel(&mut self, x: usize, y: usize, color: Color) -> bool {
        if !self.contains(x, y) {
            return false;
        }
        let offset = self.offset(x, y);
        self.data[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&[
            color.r(),
            color.g(),
            color.b(),
        ]);
        true
    }

    /// Read back the pixel at `(x, y)`.
    #[must_use]
    pub fn get_pixel(&self, x: usize, y: usize) -> Option<Color> {
        if !self.contains(x, y) {
            return None;
        }
        let p = &self.data[self.offset(x, y)..];
        Some(Color::new(p[0], p[1], p[2]))
    }

    /// Set every pixel to `color`.
    pub fn fill(&mut self, color: Color) {
        let rgb = [color.r(), color.g(), color.b()];
        for pixel in self.data.chunks_exact_mut(BYTES_PER_PIXEL) {
            pixel.copy_from_slice(&rgb);
        }
    }

    /// Raw `R, G, B` bytes, row-major.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(self.width as u32, self.height as u32)
    }
}

impl embedded_graphics::draw_target::DrawTarget for FrameBuffer {
    type Color = Color;

    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, c) in pixels {
            if p.x < 0 || p.y < 0 {
                continue;
            }
            self.set_pixel(p.x as usize, p.y as usize, c);
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill(color);
        Ok(())
    }
}

impl core::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("size", &self.data.len())
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for FrameBuffer {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "FrameBuffer<{}, {}>", self.width, self.height);
        defmt::write!(f, " size: {}", self.data.len());
    }
}
