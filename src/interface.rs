//! Panel backend: the four transport primitives the driver is built on.
//!
//! Everything the driver sends to the panel goes through [`PanelBackend`]:
//! command bytes, data bytes, the reset line and blocking delays. The panel
//! protocol in [`crate::ili9341`] is written purely in terms of these.
//!
//! [`SpiInterface`] implements the backend for a 4-wire SPI panel using the
//! `embedded-hal` 1.0 traits.
//!
//! # Example
//! ```rust,no_run
//! # fn demo<SPI, DC, RST, D>(spi: SPI, dc: DC, rst: RST, delay: D)
//! # where
//! #     SPI: embedded_hal::spi::SpiDevice,
//! #     DC: embedded_hal::digital::OutputPin,
//! #     RST: embedded_hal::digital::OutputPin,
//! #     D: embedded_hal::delay::DelayNs,
//! # {
//! use tft_driver::interface::SpiInterface;
//!
//! let backend = SpiInterface::new(spi, dc, rst, delay);
//! # let _ = backend;
//! # }
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::digital::PinState;
use embedded_hal::spi::SpiDevice;

/// Level of the panel's reset line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResetLevel {
    /// Panel held in reset (line low).
    Active,
    /// Normal operation (line high).
    Inactive,
}

impl From<ResetLevel> for PinState {
    fn from(level: ResetLevel) -> Self {
        match level {
            ResetLevel::Active => PinState::Low,
            ResetLevel::Inactive => PinState::High,
        }
    }
}

/// Transport primitives for a command/data panel.
pub trait PanelBackend {
    type Error;

    /// Send one command byte with data/command select low.
    fn send_command(&mut self, command: u8) -> Result<(), Self::Error>;

    /// Send data bytes with data/command select high.
    fn send_data(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Drive the hardware reset line.
    fn set_reset(&mut self, level: ResetLevel) -> Result<(), Self::Error>;

    /// Block for `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32) -> Result<(), Self::Error>;
}

impl<T: PanelBackend + ?Sized> PanelBackend for &mut T {
    type Error = T::Error;

    fn send_command(&mut self, command: u8) -> Result<(), Self::Error> {
        T::send_command(self, command)
    }

    fn send_data(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        T::send_data(self, data)
    }

    fn set_reset(&mut self, level: ResetLevel) -> Result<(), Self::Error> {
        T::set_reset(self, level)
    }

    fn delay_ms(&mut self, ms: u32) -> Result<(), Self::Error> {
        T::delay_ms(self, ms)
    }
}

/// Errors from [`SpiInterface`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpiInterfaceError<S, P, R> {
    /// The SPI transfer failed.
    Spi(S),
    /// The data/command select pin could not be driven.
    DataCommand(P),
    /// The reset pin could not be driven.
    Reset(R),
}

impl<S, P, R> core::fmt::Display for SpiInterfaceError<S, P, R>
where
    S: core::fmt::Debug,
    P: core::fmt::Debug,
    R: core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Spi(e) => write!(f, "SPI transfer failed: {e:?}"),
            Self::DataCommand(e) => write!(f, "data/command pin failed: {e:?}"),
            Self::Reset(e) => write!(f, "reset pin failed: {e:?}"),
        }
    }
}

/// 4-wire SPI panel backend.
///
/// Chip select is owned by the [`SpiDevice`]; `dc` selects command (low) or
/// data (high) and `rst` drives the panel reset line.
pub struct SpiInterface<SPI, DC, RST, D> {
    spi: SPI,
    dc: DC,
    rst: RST,
    delay: D,
}

impl<SPI, DC, RST, D> SpiInterface<SPI, DC, RST, D>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
    D: DelayNs,
{
    pub fn new(spi: SPI, dc: DC, rst: RST, delay: D) -> Self {
        Self { spi, dc, rst, delay }
    }

    /// Give back the peripherals.
    pub fn release(self) -> (SPI, DC, RST, D) {
        (self.spi, self.dc, self.rst, self.delay)
    }
}

impl<SPI, DC, RST, D> PanelBackend for SpiInterface<SPI, DC, RST, D>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
    D: DelayNs,
{
    type Error = SpiInterfaceError<SPI::Error, DC::Error, RST::Error>;

    fn send_command(&mut self, command: u8) -> Result<(), Self::Error> {
        self.dc.set_low().map_err(SpiInterfaceError::DataCommand)?;
        self.spi.write(&[command]).map_err(SpiInterfaceError::Spi)
    }

    fn send_data(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.dc.set_high().map_err(SpiInterfaceError::DataCommand)?;
        self.spi.write(data).map_err(SpiInterfaceError::Spi)
    }

    fn set_reset(&mut self, level: ResetLevel) -> Result<(), Self::Error> {
        self.rst
            .set_state(level.into())
            .map_err(SpiInterfaceError::Reset)
    }

    fn delay_ms(&mut self, ms: u32) -> Result<(), Self::Error> {
        self.delay.delay_ms(ms);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    extern crate std;

    use core::convert::Infallible;
    use std::vec;
    use std::vec::Vec;

    use super::*;
    use embedded_hal::digital::ErrorType as PinErrorType;
    use embedded_hal::spi::ErrorKind;
    use embedded_hal::spi::ErrorType as SpiErrorType;
    use embedded_hal::spi::Operation;

    /// One primitive call seen by [`RecordingBackend`].
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub(crate) enum Call {
        Command(u8),
        Data(Vec<u8>),
        Reset(ResetLevel),
        Delay(u32),
    }

    /// Backend that records every primitive and can fail on demand.
    #[derive(Default)]
    pub(crate) struct RecordingBackend {
        pub calls: Vec<Call>,
        /// Fail the n-th `send_data` call (0 based).
        pub fail_data_at: Option<usize>,
        pub data_count: usize,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub(crate) struct BackendFault;

    impl RecordingBackend {
        pub fn commands(&self) -> Vec<u8> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    Call::Command(cmd) => Some(*cmd),
                    _ => None,
                })
                .collect()
        }
    }

    impl PanelBackend for RecordingBackend {
        type Error = BackendFault;

        fn send_command(&mut self, command: u8) -> Result<(), Self::Error> {
            self.calls.push(Call::Command(command));
            Ok(())
        }

        fn send_data(&mut self, data: &[u8]) -> Result<(), Self::Error> {
            let n = self.data_count;
            self.data_count += 1;
            if self.fail_data_at == Some(n) {
                return Err(BackendFault);
            }
            self.calls.push(Call::Data(data.to_vec()));
            Ok(())
        }

        fn set_reset(&mut self, level: ResetLevel) -> Result<(), Self::Error> {
            self.calls.push(Call::Reset(level));
            Ok(())
        }

        fn delay_ms(&mut self, ms: u32) -> Result<(), Self::Error> {
            self.calls.push(Call::Delay(ms));
            Ok(())
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    enum Event {
        Dc(bool),
        Rst(bool),
        Write(Vec<u8>),
        DelayNs(u32),
    }

    type Log = std::rc::Rc<std::cell::RefCell<Vec<Event>>>;

    struct FakeSpi {
        log: Log,
        fail: bool,
    }

    impl SpiErrorType for FakeSpi {
        type Error = ErrorKind;
    }

    impl SpiDevice for FakeSpi {
        fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), ErrorKind> {
            if self.fail {
                return Err(ErrorKind::Other);
            }
            for op in operations {
                if let Operation::Write(data) = op {
                    self.log.borrow_mut().push(Event::Write(data.to_vec()));
                }
            }
            Ok(())
        }
    }

    struct FakePin {
        log: Log,
        dc: bool,
    }

    impl PinErrorType for FakePin {
        type Error = Infallible;
    }

    impl OutputPin for FakePin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            let event = if self.dc { Event::Dc(false) } else { Event::Rst(false) };
            self.log.borrow_mut().push(event);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            let event = if self.dc { Event::Dc(true) } else { Event::Rst(true) };
            self.log.borrow_mut().push(event);
            Ok(())
        }
    }

    struct FakeDelay {
        log: Log,
    }

    impl DelayNs for FakeDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.log.borrow_mut().push(Event::DelayNs(ns));
        }
    }

    fn spi_interface(fail: bool) -> (SpiInterface<FakeSpi, FakePin, FakePin, FakeDelay>, Log) {
        let log = Log::default();
        let iface = SpiInterface::new(
            FakeSpi { log: log.clone(), fail },
            FakePin { log: log.clone(), dc: true },
            FakePin { log: log.clone(), dc: false },
            FakeDelay { log: log.clone() },
        );
        (iface, log)
    }

    #[test]
    fn test_command_drives_dc_low() {
        let (mut iface, log) = spi_interface(false);
        iface.send_command(0x2A).unwrap();
        assert_eq!(*log.borrow(), vec![Event::Dc(false), Event::Write(vec![0x2A])]);
    }

    #[test]
    fn test_data_drives_dc_high() {
        let (mut iface, log) = spi_interface(false);
        iface.send_data(&[1, 2, 3]).unwrap();
        assert_eq!(*log.borrow(), vec![Event::Dc(true), Event::Write(vec![1, 2, 3])]);
    }

    #[test]
    fn test_reset_levels() {
        let (mut iface, log) = spi_interface(false);
        iface.set_reset(ResetLevel::Active).unwrap();
        iface.set_reset(ResetLevel::Inactive).unwrap();
        assert_eq!(*log.borrow(), vec![Event::Rst(false), Event::Rst(true)]);
    }

    #[test]
    fn test_delay_forwards_to_delay_ns() {
        let (mut iface, log) = spi_interface(false);
        iface.delay_ms(2).unwrap();
        let total: u64 = log
            .borrow()
            .iter()
            .map(|e| match e {
                Event::DelayNs(ns) => u64::from(*ns),
                _ => 0,
            })
            .sum();
        assert_eq!(total, 2_000_000);
    }

    #[test]
    fn test_spi_failure_is_reported() {
        let (mut iface, _log) = spi_interface(true);
        assert_eq!(
            iface.send_data(&[0]),
            Err(SpiInterfaceError::Spi(ErrorKind::Other))
        );
    }

    /// Reset line on another pin source, e.g. an I/O expander.
    struct ExpanderPin;

    impl PinErrorType for ExpanderPin {
        type Error = embedded_hal::digital::ErrorKind;
    }

    impl OutputPin for ExpanderPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            Err(embedded_hal::digital::ErrorKind::Other)
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[test]
    fn test_reset_pin_with_own_error_type() {
        let log = Log::default();
        let mut iface = SpiInterface::new(
            FakeSpi { log: log.clone(), fail: false },
            FakePin { log: log.clone(), dc: true },
            ExpanderPin,
            FakeDelay { log: log.clone() },
        );

        iface.set_reset(ResetLevel::Inactive).unwrap();
        assert_eq!(
            iface.set_reset(ResetLevel::Active),
            Err(SpiInterfaceError::Reset(embedded_hal::digital::ErrorKind::Other))
        );
        iface.send_command(0x01).unwrap();
        assert_eq!(*log.borrow(), vec![Event::Dc(false), Event::Write(vec![0x01])]);
    }

    #[test]
    fn test_recording_backend_through_mut_ref() {
        fn display_on<B: PanelBackend>(mut backend: B) -> Result<(), B::Error> {
            backend.send_command(0x29)
        }

        let mut backend = RecordingBackend::default();
        display_on(&mut backend).unwrap();
        assert_eq!(backend.calls, vec![Call::Command(0x29)]);
    }
}
