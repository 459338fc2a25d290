//! Band conversion and double-buffered staging.
//!
//! The panel is refreshed in horizontal bands of [`BAND_HEIGHT`] rows. Each
//! band is converted from RGB888 into the panel's native RGB565 format and
//! written into one of two staging slots. Slots are chosen by a parity counter
//! so consecutive bands always alternate `0, 1, 0, 1, ...`: a slot handed to the
//! panel for band N is not written again until band N + 2. The counter lives in
//! [`StagingBands`] and carries over from one refresh pass to the next.
//!
//! # Wire format
//! The ILI9341 expects each 16-bit pixel high byte first. A native pixel is
//! packed as `RRRRRGGG GGGBBBBB` and stored byte swapped relative to the
//! in-memory `u16`, so the staging bytes for pure red (`0xF800`) are
//! `[0xF8, 0x00]`.

use alloc::vec;
use alloc::vec::Vec;

use bitfield::bitfield;

use super::FrameBuffer;
use super::BYTES_PER_PIXEL;
use crate::Color;

/// Number of panel rows converted and transferred per band.
pub const BAND_HEIGHT: usize = 16;

/// Number of staging slots.
pub const SLOT_COUNT: usize = 2;

/// Bytes used by one native pixel.
pub const BYTES_PER_NATIVE_PIXEL: usize = 2;

/// Size in bytes of one staging slot for a panel `width` pixels wide.
#[must_use]
pub const fn compute_band_size(width: usize) -> usize {
    width * BAND_HEIGHT * BYTES_PER_NATIVE_PIXEL
}

/// Number of bands needed to cover `height` rows.
#[must_use]
pub const fn compute_band_count(height: usize) -> usize {
    height.div_ceil(BAND_HEIGHT)
}

bitfield! {
    /// A native RGB565 pixel as the panel interprets it.
    ///
    /// - Bits 15-11: red, top 5 bits of the 8-bit channel
    /// - Bits 10-5: green, top 6 bits
    /// - Bits 4-0: blue, top 5 bits
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[repr(transparent)]
    pub struct Rgb565Word(u16);
    impl Debug;
    pub u8, red, set_red: 15, 11;
    pub u8, green, set_green: 10, 5;
    pub u8, blue, set_blue: 4, 0;
}

#[cfg(feature = "defmt")]
impl defmt::Format for Rgb565Word {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Rgb565Word({=u16:#x})", self.0)
    }
}

impl Rgb565Word {
    /// Truncate an RGB888 triple to RGB565.
    #[must_use]
    pub fn from_rgb888(r: u8, g: u8, b: u8) -> Self {
        let mut word = Self(0);
        word.set_red(r >> 3);
        word.set_green(g >> 2);
        word.set_blue(b >> 3);
        word
    }

    /// The packed 16-bit value.
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// The packed value with its bytes exchanged, as stored in a staging slot.
    #[must_use]
    pub const fn swapped(self) -> u16 {
        self.0.swap_bytes()
    }

    /// Bytes in transmission order, high byte first.
    #[must_use]
    pub const fn to_wire(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }
}

impl From<Color> for Rgb565Word {
    fn from(color: Color) -> Self {
        use embedded_graphics::pixelcolor::RgbColor;
        Self::from_rgb888(color.r(), color.g(), color.b())
    }
}

/// Position of one band within a refresh pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Band {
    /// First panel row of the band.
    pub row: usize,
    /// Rows in the band, [`BAND_HEIGHT`] except possibly for the last band.
    pub rows: usize,
    /// Staging slot the band is converted into.
    pub slot: usize,
}

/// Iterator over the bands of one full-frame refresh, top to bottom.
///
/// The last band is clamped to the panel height when `height` is not a
/// multiple of [`BAND_HEIGHT`]. Slots alternate starting at `first_slot`.
#[derive(Clone, Debug)]
pub struct BandSchedule {
    height: usize,
    row: usize,
    parity: usize,
}

impl BandSchedule {
    #[must_use]
    pub const fn new(height: usize, first_slot: usize) -> Self {
        Self {
            height,
            row: 0,
            parity: first_slot % SLOT_COUNT,
        }
    }
}

impl Iterator for BandSchedule {
    type Item = Band;

    fn next(&mut self) -> Option<Band> {
        if self.row >= self.height {
            return None;
        }
        let band = Band {
            row: self.row,
            rows: BAND_HEIGHT.min(self.height - self.row),
            slot: self.parity % SLOT_COUNT,
        };
        self.row += BAND_HEIGHT;
        self.parity += 1;
        Some(band)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = compute_band_count(self.height.saturating_sub(self.row));
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BandSchedule {}

/// The two native-format staging slots.
pub struct StagingBands {
    width: usize,
    slots: [Vec<u8>; SLOT_COUNT],
    next_slot: usize,
}

impl StagingBands {
    /// Allocate both slots for a panel `width` pixels wide. The first band
    /// converted goes into slot 0.
    #[must_use]
    pub fn new(width: usize) -> Self {
        Self {
            width,
            slots: [
                vec![0; compute_band_size(width)],
                vec![0; compute_band_size(width)],
            ],
            next_slot: 0,
        }
    }

    /// Slot the next converted band goes into.
    #[must_use]
    pub fn next_slot(&self) -> usize {
        self.next_slot
    }

    /// Bands of a full pass over a panel `height` rows tall, continuing the
    /// slot alternation where the previous pass stopped.
    #[must_use]
    pub fn schedule(&self, height: usize) -> BandSchedule {
        BandSchedule::new(height, self.next_slot)
    }

    /// Convert `band` of `fb` into its staging slot and return the bytes that
    /// make up the band payload. The following band goes into the other slot.
    ///
    /// `band` must come from [`StagingBands::schedule`] over `fb`.
    pub(crate) fn convert_band(&mut self, fb: &FrameBuffer, band: Band) -> &[u8] {
        debug_assert_eq!(fb.width(), self.width, "staging width mismatch");
        debug_assert!(band.rows <= BAND_HEIGHT);
        self.next_slot = (band.slot + 1) % SLOT_COUNT;

        let src = fb.rows(band.row, band.rows);
        let len = src.len() / BYTES_PER_PIXEL * BYTES_PER_NATIVE_PIXEL;
        let dst = &mut self.slots[band.slot][..len];

        for (rgb, native) in src
            .chunks_exact(BYTES_PER_PIXEL)
            .zip(dst.chunks_exact_mut(BYTES_PER_NATIVE_PIXEL))
        {
            let word = Rgb565Word::from_rgb888(rgb[0], rgb[1], rgb[2]);
            native.copy_from_slice(&word.to_wire());
        }

        &self.slots[band.slot][..len]
    }

    /// Raw contents of staging slot `slot`.
    #[must_use]
    pub fn slot(&self, slot: usize) -> &[u8] {
        &self.slots[slot]
    }

    /// Native pixel `index` of `slot` as the swapped in-memory word.
    #[must_use]
    pub fn word(&self, slot: usize, index: usize) -> u16 {
        let bytes = &self.slots[slot][index * BYTES_PER_NATIVE_PIXEL..];
        u16::from_le_bytes([bytes[0], bytes[1]])
    }
}

impl core::fmt::Debug for StagingBands {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StagingBands")
            .field("width", &self.width)
            .field("slot_size", &self.slots[0].len())
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for StagingBands {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "StagingBands<{}>", self.width);
        defmt::write!(f, " slot_size: {}", self.slots[0].len());
    }
}
