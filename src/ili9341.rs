//! ILI9341 panel protocol.
//!
//! The power-up sequence and the band write, expressed in terms of the
//! [`PanelBackend`] primitives.

use crate::interface::PanelBackend;
use crate::interface::ResetLevel;

/// ILI9341 commands used by the driver.
pub mod cmd {
    pub const SLPOUT: u8 = 0x11;
    pub const GAMSET: u8 = 0x26;
    pub const DISPON: u8 = 0x29;
    pub const CASET: u8 = 0x2A; // Column address set
    pub const PASET: u8 = 0x2B; // Page address set
    pub const RAMWR: u8 = 0x2C; // Memory write
    pub const MADCTL: u8 = 0x36; // Memory access control
    pub const PIXFMT: u8 = 0x3A; // Pixel format
    pub const FRMCTR1: u8 = 0xB1;
    pub const DISCTRL: u8 = 0xB6;
    pub const ETMOD: u8 = 0xB7;
    pub const PWCTR1: u8 = 0xC0;
    pub const PWCTR2: u8 = 0xC1;
    pub const VMCTR1: u8 = 0xC5;
    pub const VMCTR2: u8 = 0xC7;
    pub const PWCTRA: u8 = 0xCB;
    pub const PWCTRB: u8 = 0xCF;
    pub const GMCTRP1: u8 = 0xE0;
    pub const GMCTRN1: u8 = 0xE1;
    pub const DTCTRA: u8 = 0xE8;
    pub const DTCTRB: u8 = 0xEA;
    pub const PWOSEQ: u8 = 0xED;
    pub const EN3G: u8 = 0xF2;
    pub const PUMPCTR: u8 = 0xF7;
}

/// Time the reset line is held in each state during power-up.
pub const RESET_DELAY_MS: u32 = 100;

/// Wait after commands flagged with [`InitCommand::delay`].
pub const COMMAND_DELAY_MS: u32 = 100;

/// One entry of the power-up sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InitCommand {
    pub command: u8,
    pub data: &'static [u8],
    /// Wait [`COMMAND_DELAY_MS`] after the command instead of sending data.
    pub delay: bool,
}

impl InitCommand {
    const fn new(command: u8, data: &'static [u8]) -> Self {
        Self {
            command,
            data,
            delay: false,
        }
    }

    const fn with_delay(command: u8) -> Self {
        Self {
            command,
            data: &[],
            delay: true,
        }
    }
}

/// Power-up register writes, in order.
pub const INIT_SEQUENCE: &[InitCommand] = &[
    // power control B, DC_ENA = 1
    InitCommand::new(cmd::PWCTRB, &[0x00, 0x83, 0x30]),
    // power on sequence: cp1 keeps 1 frame, vcl = 0, ddvdh = 3, vgh = 1, vgl = 2
    InitCommand::new(cmd::PWOSEQ, &[0x64, 0x03, 0x12, 0x81]),
    // driver timing control A
    InitCommand::new(cmd::DTCTRA, &[0x85, 0x01, 0x79]),
    // power control A, Vcore = 1.6V, DDVDH = 5.6V
    InitCommand::new(cmd::PWCTRA, &[0x39, 0x2C, 0x00, 0x34, 0x02]),
    // pump ratio, DDVDH = 2xVCl
    InitCommand::new(cmd::PUMPCTR, &[0x20]),
    InitCommand::new(cmd::DTCTRB, &[0x00, 0x00]),
    // GVDD = 4.75V
    InitCommand::new(cmd::PWCTR1, &[0x26]),
    InitCommand::new(cmd::PWCTR2, &[0x11]),
    // VCOMH = 4.025V, VCOML = -0.950V
    InitCommand::new(cmd::VMCTR1, &[0x35, 0x3E]),
    InitCommand::new(cmd::VMCTR2, &[0xBE]),
    // MV = 1 (landscape), BGR = 1
    InitCommand::new(cmd::MADCTL, &[0x28]),
    // 16 bits per pixel
    InitCommand::new(cmd::PIXFMT, &[0x55]),
    // 70Hz
    InitCommand::new(cmd::FRMCTR1, &[0x00, 0x1B]),
    // 3G disabled
    InitCommand::new(cmd::EN3G, &[0x08]),
    InitCommand::new(cmd::GAMSET, &[0x01]),
    InitCommand::new(
        cmd::GMCTRP1,
        &[
            0x1F, 0x1A, 0x18, 0x0A, 0x0F, 0x06, 0x45, 0x87, 0x32, 0x0A, 0x07, 0x02, 0x07, 0x05,
            0x00,
        ],
    ),
    InitCommand::new(
        cmd::GMCTRN1,
        &[
            0x00, 0x25, 0x27, 0x05, 0x10, 0x09, 0x3A, 0x78, 0x4D, 0x05, 0x18, 0x0D, 0x38, 0x3A,
            0x1F,
        ],
    ),
    InitCommand::new(cmd::CASET, &[0x00, 0x00, 0x00, 0xEF]),
    InitCommand::new(cmd::PASET, &[0x00, 0x00, 0x01, 0x3F]),
    InitCommand::new(cmd::RAMWR, &[]),
    InitCommand::new(cmd::ETMOD, &[0x07]),
    InitCommand::new(cmd::DISCTRL, &[0x0A, 0x82, 0x27, 0x00]),
    InitCommand::with_delay(cmd::SLPOUT),
    InitCommand::with_delay(cmd::DISPON),
];

/// Hardware reset followed by [`INIT_SEQUENCE`].
pub fn init<B: PanelBackend>(backend: &mut B) -> Result<(), B::Error> {
    backend.set_reset(ResetLevel::Active)?;
    backend.delay_ms(RESET_DELAY_MS)?;
    backend.set_reset(ResetLevel::Inactive)?;
    backend.delay_ms(RESET_DELAY_MS)?;

    for entry in INIT_SEQUENCE {
        backend.send_command(entry.command)?;
        if entry.delay {
            backend.delay_ms(COMMAND_DELAY_MS)?;
        } else if !entry.data.is_empty() {
            backend.send_data(entry.data)?;
        }
    }
    Ok(())
}

/// Split a 16-bit address pair into the 4 bytes CASET/PASET expect.
fn address_bytes(start: u16, end: u16) -> [u8; 4] {
    let [start_hi, start_lo] = start.to_be_bytes();
    let [end_hi, end_lo] = end.to_be_bytes();
    [start_hi, start_lo, end_hi, end_lo]
}

/// Stream one band of native pixels starting at panel row `row`.
///
/// The column window ends at `width` and the page window at `row + rows`,
/// one past the last pixel, as the panel has always been driven.
pub fn write_band<B: PanelBackend>(
    backend: &mut B,
    width: u16,
    row: u16,
    rows: u16,
    payload: &[u8],
) -> Result<(), B::Error> {
    backend.send_command(cmd::CASET)?;
    backend.send_data(&address_bytes(0, width))?;

    backend.send_command(cmd::PASET)?;
    backend.send_data(&address_bytes(row, row.wrapping_add(rows)))?;

    backend.send_command(cmd::RAMWR)?;
    backend.send_data(payload)
}
