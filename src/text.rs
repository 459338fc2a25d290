//! Text rasterization into the framebuffer.
//!
//! Glyph bits are drawn at the cursor in the requested color; clear bits are
//! transparent. Pixels that would land outside the panel are clipped.
//!
//! The cursor advance differs between single characters and strings: a
//! character moves the cursor by `glyph.width + stride` while each character of
//! a string moves it by `glyph.width + 1`. Existing screen layouts depend on
//! both, so they are kept as is.

use crate::font::FontProvider;
use crate::font::FontSize;
use crate::font::Glyph;
use crate::framebuffer::FrameBuffer;
use crate::Color;

/// Text cursor position in panel pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cursor {
    pub x: u16,
    pub y: u16,
}

impl Cursor {
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

/// The font had no glyph for the character.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GlyphNotFound {
    pub code: u8,
}

fn draw_glyph(fb: &mut FrameBuffer, cursor: Cursor, glyph: &Glyph<'_>, color: Color) {
    for (column, row) in glyph.pixels() {
        // clipped pixels are dropped by set_pixel
        fb.set_pixel(
            cursor.x as usize + column,
            cursor.y as usize + row,
            color,
        );
    }
}

/// Draw one character and advance the cursor by `glyph.width + stride`.
///
/// On a lookup miss nothing is drawn and the cursor is left alone.
pub fn write_char<F: FontProvider + ?Sized>(
    fb: &mut FrameBuffer,
    font: &F,
    cursor: &mut Cursor,
    size: FontSize,
    code: u8,
    color: Color,
) -> Result<(), GlyphNotFound> {
    let glyph = font.glyph(code, size).ok_or(GlyphNotFound { code })?;
    draw_glyph(fb, *cursor, &glyph, color);
    cursor.x = cursor
        .x
        .wrapping_add(glyph.width)
        .wrapping_add(glyph.stride() as u16);
    Ok(())
}

/// Draw `text` byte by byte, advancing the cursor by `glyph.width + 1` per
/// character.
///
/// Stops at the first byte without a glyph. Characters before it stay drawn
/// and the cursor stays after the last one drawn.
pub fn write_string<F: FontProvider + ?Sized>(
    fb: &mut FrameBuffer,
    font: &F,
    cursor: &mut Cursor,
    size: FontSize,
    text: &[u8],
    color: Color,
) -> Result<(), GlyphNotFound> {
    for &code in text {
        let glyph = font.glyph(code, size).ok_or(GlyphNotFound { code })?;
        draw_glyph(fb, *cursor, &glyph, color);
        cursor.x = cursor.x.wrapping_add(glyph.width).wrapping_add(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::font::tests::test_font;
    use crate::font::tests::GLYPH_A;
    use embedded_graphics::pixelcolor::RgbColor;

    fn lit(fb: &FrameBuffer, color: Color) -> usize {
        let mut count = 0;
        for y in 0..fb.height() {
            for x in 0..fb.width() {
                if fb.get_pixel(x, y) == Some(color) {
                    count += 1;
                }
            }
        }
        count
    }

    #[test]
    fn test_write_char_draws_set_bits_only() {
        let mut fb = FrameBuffer::new(32, 16);
        fb.fill(Color::BLUE);
        let mut cursor = Cursor::new(4, 2);

        write_char(&mut fb, &test_font, &mut cursor, FontSize::Size6x8, b'A', Color::WHITE)
            .unwrap();

        // apex of the A
        assert_eq!(fb.get_pixel(4 + 2, 2), Some(Color::WHITE));
        // clear bits keep the background
        assert_eq!(fb.get_pixel(4, 2), Some(Color::BLUE));
        let expected: u32 = GLYPH_A.iter().map(|b| b.count_ones()).sum();
        assert_eq!(lit(&fb, Color::WHITE), expected as usize);
    }

    #[test]
    fn test_write_char_advance_uses_stride() {
        let mut fb = FrameBuffer::new(64, 16);
        let mut cursor = Cursor::new(0, 0);
        write_char(&mut fb, &test_font, &mut cursor, FontSize::Size6x8, b'A', Color::WHITE)
            .unwrap();
        assert_eq!(cursor, Cursor::new(6 + 1, 0));

        write_char(&mut fb, &test_font, &mut cursor, FontSize::Size6x8, b'-', Color::WHITE)
            .unwrap();
        assert_eq!(cursor, Cursor::new(7 + 12 + 2, 0));
    }

    #[test]
    fn test_write_char_unknown_leaves_state() {
        let mut fb = FrameBuffer::new(16, 16);
        fb.fill(Color::GREEN);
        let before = fb.clone();
        let mut cursor = Cursor::new(3, 3);

        let result = write_char(
            &mut fb,
            &test_font,
            &mut cursor,
            FontSize::Size6x8,
            b'?',
            Color::RED,
        );

        assert_eq!(result, Err(GlyphNotFound { code: b'?' }));
        assert_eq!(cursor, Cursor::new(3, 3));
        assert_eq!(fb, before);
    }

    #[test]
    fn test_write_string_advance_uses_width_plus_one() {
        let mut fb = FrameBuffer::new(64, 16);
        let mut cursor = Cursor::new(1, 0);
        write_string(&mut fb, &test_font, &mut cursor, FontSize::Size6x8, b"A-A", Color::WHITE)
            .unwrap();
        assert_eq!(cursor, Cursor::new(1 + 7 + 13 + 7, 0));
    }

    #[test]
    fn test_write_string_empty_is_noop() {
        let mut fb = FrameBuffer::new(8, 8);
        let before = fb.clone();
        let mut cursor = Cursor::new(2, 5);
        write_string(&mut fb, &test_font, &mut cursor, FontSize::Size6x8, b"", Color::WHITE)
            .unwrap();
        assert_eq!(cursor, Cursor::new(2, 5));
        assert_eq!(fb, before);
    }

    #[test]
    fn test_write_string_partial_on_miss() {
        let mut fb = FrameBuffer::new(64, 16);
        let mut cursor = Cursor::new(0, 0);
        let result = write_string(
            &mut fb,
            &test_font,
            &mut cursor,
            FontSize::Size6x8,
            b"AA?A",
            Color::WHITE,
        );

        assert_eq!(result, Err(GlyphNotFound { code: b'?' }));
        assert_eq!(cursor, Cursor::new(14, 0));
        let per_glyph: u32 = GLYPH_A.iter().map(|b| b.count_ones()).sum();
        assert_eq!(lit(&fb, Color::WHITE), 2 * per_glyph as usize);
    }

    #[test]
    fn test_glyph_clipped_at_panel_edge() {
        let mut fb = FrameBuffer::new(8, 4);
        let mut cursor = Cursor::new(5, 0);
        write_char(&mut fb, &test_font, &mut cursor, FontSize::Size6x8, b'A', Color::WHITE)
            .unwrap();
        // only rows 0..4 and columns 5..8 exist
        assert_eq!(fb.get_pixel(7, 0), Some(Color::WHITE));
        assert_eq!(cursor, Cursor::new(12, 0));
    }
}
