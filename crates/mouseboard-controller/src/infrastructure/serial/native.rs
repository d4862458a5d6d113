//! [`PortOpener`] backed by the operating system's serial ports.

use serialport::{ClearBuffer, DataBits, FlowControl, Parity, StopBits};

use super::{LineSettings, OpenError, PortOpener, SerialLink};

/// Opens real serial devices with the `serialport` crate.
///
/// Ports are configured raw: 8 data bits, no parity, one stop bit, no flow
/// control, and the read timeout from [`LineSettings`]. Bytes left over from
/// an earlier session are discarded before the link is handed out.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativePortOpener;

impl PortOpener for NativePortOpener {
    fn open(&self, path: &str, settings: &LineSettings) -> Result<Box<dyn SerialLink>, OpenError> {
        let port = serialport::new(path, settings.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(settings.read_timeout)
            .open()
            .map_err(|source| OpenError::Open {
                path: path.to_string(),
                source,
            })?;

        port.clear(ClearBuffer::All)
            .map_err(|source| OpenError::Configure {
                path: path.to_string(),
                source,
            })?;

        Ok(Box::new(port))
    }
}
