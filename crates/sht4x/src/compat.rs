//! The classic sentinel based interface.
//!
//! Failures are logged and then collapsed into `0.0` (or a `0` serial). A
//! caller can not tell a failed read from a sensor that really reads
//! `0.0`, use the methods on [`Sht4x`] when that matters.
//!
//! These always wait for the sensor lock without a timeout, regardless of
//! the handle's [`Config`](crate::Config).

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::convert::Channels;
use crate::device::{LockWait, Sht4x};

/// Relative humidity in percent, `0.0` if the measurement failed.
pub fn read_humidity<I: I2c, D: DelayNs>(dev: &Sht4x<I, D>) -> f32 {
    match dev.measure_waiting(Channels::Humidity, LockWait::Forever) {
        Ok(measurement) => measurement.relative_humidity().unwrap_or(0.0),
        Err(e) => {
            tracing::debug!("humidity read failed, reporting 0.0: {e}");
            0.0
        }
    }
}

/// Temperature in degrees celsius, `0.0` if the measurement failed.
pub fn read_temperature<I: I2c, D: DelayNs>(dev: &Sht4x<I, D>) -> f32 {
    match dev.measure_waiting(Channels::Temperature, LockWait::Forever) {
        Ok(measurement) => measurement.celsius().unwrap_or(0.0),
        Err(e) => {
            tracing::debug!("temperature read failed, reporting 0.0: {e}");
            0.0
        }
    }
}

pub fn read_serial<I: I2c, D: DelayNs>(dev: &Sht4x<I, D>) -> u32 {
    dev.serial_number_waiting(LockWait::Forever)
        .inspect_err(|e| tracing::debug!("serial read failed, reporting 0: {e}"))
        .unwrap_or(0)
}
