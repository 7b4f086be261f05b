//! Blocking driver for the Sensirion SHT4x temperature and humidity sensor.
//!
//! The sensor answers at a fixed I2C address. A measurement is a command
//! write, a fixed conversion wait and a 6 byte read of two CRC protected
//! words. A [`Sht4x`] handle owns the bus and serializes those sequences
//! so it can be shared between threads.
//!
//! ```no_run
//! # #[cfg(feature = "linux")]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use sht4x::{Channels, Config, LinuxBuses, Sht4x};
//!
//! let lookup = LinuxBuses::default();
//! let sensor = Sht4x::init(&lookup, "i2c-1", linux_embedded_hal::Delay, Config::default())?;
//! let measurement = sensor.measure(Channels::Both)?;
//! println!("{measurement:?}");
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "linux"))]
//! # fn main() {}
//! ```

pub mod compat;
mod convert;
mod crc;
mod device;
mod error;
mod frame;
mod lookup;
mod transport;

pub use convert::{humidity_milli_percent, temperature_milli_celsius, Channels, Measurement};
pub use crc::crc8;
pub use device::{Config, LockWait, SerialByteOrder, Sht4x};
pub use error::{Error, InitError};
pub use frame::{Frame, Half, RawWords, FRAME_LEN};
pub use lookup::BusLookup;
#[cfg(feature = "linux")]
pub use lookup::LinuxBuses;
pub use transport::ADDRESS;
