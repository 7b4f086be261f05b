use embedded_hal::i2c::I2c;

/// Fixed 7 bit address of the SHT40-A (the only address the driver supports).
pub const ADDRESS: u8 = 0x44;

pub(crate) mod command {
    /// Measure T & RH with high precision (high repeatability)
    pub const MEASURE_HIGH_PRECISION: u8 = 0xFD;
    pub const READ_SERIAL: u8 = 0x89;
}

/// Writes `[command]` or `[command, data0, data1]` in a single transaction.
pub(crate) fn write_command<I: I2c>(
    bus: &mut I,
    command: u8,
    data: Option<[u8; 2]>,
) -> Result<(), I::Error> {
    let mut buf = [command, 0, 0];
    let len = match data {
        Some(data) => {
            buf[1..].copy_from_slice(&data);
            3
        }
        None => 1,
    };
    tracing::trace!("writing {:02x?} to sensor", &buf[..len]);
    bus.write(ADDRESS, &buf[..len])
}

pub(crate) fn read_bytes<I: I2c>(bus: &mut I, buf: &mut [u8]) -> Result<(), I::Error> {
    bus.read(ADDRESS, buf)?;
    tracing::trace!("read {buf:02x?} from sensor");
    Ok(())
}
