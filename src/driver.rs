//! The TFT driver: framebuffer, staging bands, cursor and panel backend.
//!
//! # Example
//! ```rust,no_run
//! # fn demo<B: tft_driver::PanelBackend>(backend: B) -> Result<(), tft_driver::TftError<B::Error>> {
//! use embedded_graphics::pixelcolor::RgbColor;
//! use tft_driver::font::{FontSize, Glyph};
//! use tft_driver::{Color, TftConfig, TftDriver};
//!
//! fn font(code: u8, _size: FontSize) -> Option<Glyph<'static>> {
//!     static SOLID: [u8; 8] = [0xFC; 8];
//!     (code == b'#').then(|| Glyph::new(6, 8, &SOLID))
//! }
//!
//! let mut tft = TftDriver::new(backend, font);
//! tft.configure(TftConfig::default())?;
//!
//! tft.fill(Color::BLACK)?;
//! tft.set_position(10, 10)?;
//! tft.write_string(FontSize::Size6x8, "###", Color::GREEN)?;
//! tft.refresh()?;
//! # Ok(())
//! # }
//! ```

use crate::font::FontProvider;
use crate::font::FontSize;
use crate::framebuffer::band::StagingBands;
use crate::framebuffer::FrameBuffer;
use crate::ili9341;
use crate::interface::PanelBackend;
use crate::text;
use crate::text::Cursor;
use crate::Color;
use crate::TftConfig;
use crate::TftError;

/// Buffers that exist only between `configure` and teardown.
struct Surface {
    config: TftConfig,
    framebuffer: FrameBuffer,
    staging: StagingBands,
    cursor: Cursor,
}

/// ILI9341 TFT driver.
///
/// Created unconfigured with its backend and font bound; [`TftDriver::configure`]
/// allocates the framebuffer and staging bands and powers up the panel. Every
/// other operation fails with [`TftError::NotConfigured`] before that.
pub struct TftDriver<B, F> {
    backend: B,
    font: F,
    surface: Option<Surface>,
}

impl<B, F> TftDriver<B, F>
where
    B: PanelBackend,
    F: FontProvider,
{
    /// Bind the panel backend and font provider.
    pub fn new(backend: B, font: F) -> Self {
        Self {
            backend,
            font,
            surface: None,
        }
    }

    /// Allocate the buffers for `config` and run the panel power-up sequence.
    pub fn configure(&mut self, config: TftConfig) -> Result<(), TftError<B::Error>> {
        if self.surface.is_some() {
            return Err(TftError::AlreadyConfigured);
        }
        config.validate()?;

        let width = usize::from(config.width);
        let height = usize::from(config.height);
        debug!("allocating {}x{} framebuffer", config.width, config.height);
        let framebuffer = FrameBuffer::new(width, height);
        let staging = StagingBands::new(width);

        ili9341::init(&mut self.backend).map_err(TftError::Backend)?;
        info!("panel configured {}x{}", config.width, config.height);

        self.surface = Some(Surface {
            config,
            framebuffer,
            staging,
            cursor: Cursor::default(),
        });
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.surface.is_some()
    }

    fn surface(&self) -> Result<&Surface, TftError<B::Error>> {
        self.surface.as_ref().ok_or(TftError::NotConfigured)
    }

    fn surface_mut(&mut self) -> Result<&mut Surface, TftError<B::Error>> {
        self.surface.as_mut().ok_or(TftError::NotConfigured)
    }

    /// Push the whole framebuffer to the panel, one band at a time.
    ///
    /// Staging slots keep alternating across passes: when a pass ends on slot
    /// 0 the next one starts on slot 1.
    ///
    /// Aborts on the first backend failure; bands sent before it stay on the
    /// panel.
    pub fn refresh(&mut self) -> Result<(), TftError<B::Error>> {
        let surface = self.surface.as_mut().ok_or(TftError::NotConfigured)?;
        let width = surface.config.width;
        let schedule = surface.staging.schedule(surface.framebuffer.height());
        trace!("refresh {} bands from slot {}", schedule.len(), surface.staging.next_slot());

        for band in schedule {
            trace!("band row {} slot {}", band.row, band.slot);
            let payload = surface.staging.convert_band(&surface.framebuffer, band);
            // rows and band.row are bounded by the u16 panel height
            ili9341::write_band(
                &mut self.backend,
                width,
                band.row as u16,
                band.rows as u16,
                payload,
            )
            .map_err(|e| {
                warn!("refresh aborted at row {}", band.row);
                TftError::Backend(e)
            })?;
        }
        Ok(())
    }

    /// Set every framebuffer pixel to `color`.
    pub fn fill(&mut self, color: Color) -> Result<(), TftError<B::Error>> {
        self.surface_mut()?.framebuffer.fill(color);
        Ok(())
    }

    /// Set one framebuffer pixel.
    pub fn write_pixel(&mut self, x: u16, y: u16, color: Color) -> Result<(), TftError<B::Error>> {
        let surface = self.surface_mut()?;
        if surface
            .framebuffer
            .set_pixel(usize::from(x), usize::from(y), color)
        {
            Ok(())
        } else {
            Err(TftError::CoordinateOutOfRange)
        }
    }

    /// Read one framebuffer pixel.
    pub fn pixel(&self, x: u16, y: u16) -> Result<Color, TftError<B::Error>> {
        self.surface()?
            .framebuffer
            .get_pixel(usize::from(x), usize::from(y))
            .ok_or(TftError::CoordinateOutOfRange)
    }

    /// Draw one character at the cursor. See [`text::write_char`].
    pub fn write_char(
        &mut self,
        size: FontSize,
        code: u8,
        color: Color,
    ) -> Result<(), TftError<B::Error>> {
        let surface = self.surface.as_mut().ok_or(TftError::NotConfigured)?;
        text::write_char(
            &mut surface.framebuffer,
            &self.font,
            &mut surface.cursor,
            size,
            code,
            color,
        )?;
        Ok(())
    }

    /// Draw a string at the cursor. See [`text::write_string`].
    pub fn write_string<T: AsRef<[u8]>>(
        &mut self,
        size: FontSize,
        text: T,
        color: Color,
    ) -> Result<(), TftError<B::Error>> {
        let surface = self.surface.as_mut().ok_or(TftError::NotConfigured)?;
        text::write_string(
            &mut surface.framebuffer,
            &self.font,
            &mut surface.cursor,
            size,
            text.as_ref(),
            color,
        )?;
        Ok(())
    }

    /// Move the text cursor.
    pub fn set_position(&mut self, x: u16, y: u16) -> Result<(), TftError<B::Error>> {
        self.surface_mut()?.cursor = Cursor::new(x, y);
        Ok(())
    }

    /// Current text cursor.
    pub fn position(&self) -> Result<Cursor, TftError<B::Error>> {
        Ok(self.surface()?.cursor)
    }

    /// Raw RGB888 framebuffer bytes.
    pub fn buffer(&self) -> Result<&[u8], TftError<B::Error>> {
        Ok(self.surface()?.framebuffer.as_bytes())
    }

    /// The framebuffer as an embedded-graphics draw target.
    pub fn framebuffer_mut(&mut self) -> Result<&mut FrameBuffer, TftError<B::Error>> {
        Ok(&mut self.surface_mut()?.framebuffer)
    }

    /// Configured panel size.
    pub fn dimensions(&self) -> Result<TftConfig, TftError<B::Error>> {
        Ok(self.surface()?.config)
    }

    /// Drop the buffers and hand back the backend and font.
    pub fn release(self) -> (B, F) {
        (self.backend, self.font)
    }
}

#[cfg(feature = "defmt")]
impl<B, F> defmt::Format for TftDriver<B, F> {
    fn format(&self, f: defmt::Formatter) {
        match &self.surface {
            Some(s) => defmt::write!(f, "TftDriver<{}, {}>", s.config.width, s.config.height),
            None => defmt::write!(f, "TftDriver<unconfigured>"),
        }
    }
}
