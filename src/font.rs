//! Bitmap font lookup.
//!
//! Fonts are supplied by the application through [`FontProvider`]. A glyph is a
//! 1 bit per pixel bitmap: each row is `stride` bytes, the most significant
//! bit of each byte is the leftmost pixel.

/// Font size classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FontSize {
    Size6x8,
    Size8x16,
    Size12x24,
    Size16x32,
}

/// A borrowed glyph bitmap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Glyph<'a> {
    /// Visible glyph width in pixels.
    pub width: u16,
    /// Number of bitmap rows.
    pub height: u16,
    /// Packed rows, `height * stride` bytes.
    pub data: &'a [u8],
}

impl<'a> Glyph<'a> {
    pub const fn new(width: u16, height: u16, data: &'a [u8]) -> Self {
        Self {
            width,
            height,
            data,
        }
    }

    /// Bytes per bitmap row.
    #[must_use]
    pub const fn stride(&self) -> usize {
        if self.height == 0 {
            0
        } else {
            self.data.len() / self.height as usize
        }
    }

    /// Iterate the set pixels as `(column, row)` offsets from the glyph origin.
    ///
    /// Every bit of every row byte is visited, so a glyph reports pixels up to
    /// `8 * stride` columns wide regardless of [`Glyph::width`].
    pub fn pixels(&self) -> impl Iterator<Item = (usize, usize)> + 'a {
        let stride = self.stride();
        let data = self.data;
        (0..self.height as usize).flat_map(move |row| {
            (0..stride * 8).filter_map(move |column| {
                let byte = data[row * stride + column / 8];
                if (byte << (column % 8)) & 0x80 != 0 {
                    Some((column, row))
                } else {
                    None
                }
            })
        })
    }
}

/// Source of glyph bitmaps.
pub trait FontProvider {
    /// Look up the glyph for `code` in size class `size`.
    fn glyph(&self, code: u8, size: FontSize) -> Option<Glyph<'_>>;
}

impl<F> FontProvider for F
where
    F: Fn(u8, FontSize) -> Option<Glyph<'static>>,
{
    fn glyph(&self, code: u8, size: FontSize) -> Option<Glyph<'_>> {
        self(code, size)
    }
}
