use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};
use std::time::{Duration, Instant};

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use tracing::{debug, instrument};

use crate::convert::{humidity_milli_percent, temperature_milli_celsius, Channels, Measurement};
use crate::error::{Error, InitError};
use crate::frame::{Frame, RawWords, FRAME_LEN};
use crate::lookup::BusLookup;
use crate::transport::{command, read_bytes, write_command};

/// Conversion time of a high precision measurement
const MEASURE_DURATION_MS: u32 = 40;
const SERIAL_DURATION_MS: u32 = 10;
const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// How long to wait for another thread's measurement to finish.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LockWait {
    #[default]
    Forever,
    Timeout(Duration),
}

/// How the 4 bytes answered to the serial number command become a number.
///
/// `Native` reinterprets the bytes as they arrive in the platform's byte
/// order, so the same sensor reads differently on big and little endian
/// hosts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SerialByteOrder {
    #[default]
    Native,
    BigEndian,
}

impl SerialByteOrder {
    fn to_u32(self, raw: [u8; 4]) -> u32 {
        match self {
            SerialByteOrder::Native => u32::from_ne_bytes(raw),
            SerialByteOrder::BigEndian => u32::from_be_bytes(raw),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Config {
    pub lock: LockWait,
    pub serial_order: SerialByteOrder,
}

impl Config {
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock = LockWait::Timeout(timeout);
        self
    }

    pub fn with_serial_order(mut self, order: SerialByteOrder) -> Self {
        self.serial_order = order;
        self
    }
}

struct Parts<I, D> {
    bus: I,
    delay: D,
}

/// Handle to one sensor. All bus traffic goes through a lock so a
/// measurement (command, conversion wait, read) is never interleaved with
/// another one, the handle can be shared between threads.
pub struct Sht4x<I, D> {
    bus_name: String,
    config: Config,
    parts: Mutex<Parts<I, D>>,
}

impl<I, D> fmt::Debug for Sht4x<I, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sht4x")
            .field("bus_name", &self.bus_name)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<I: I2c, D: DelayNs> Sht4x<I, D> {
    pub fn new(bus_name: impl Into<String>, bus: I, delay: D, config: Config) -> Self {
        Self {
            bus_name: bus_name.into(),
            config,
            parts: Mutex::new(Parts { bus, delay }),
        }
    }

    /// Looks up the bus by name and creates a handle for the sensor on it.
    #[instrument(skip(lookup, delay))]
    pub fn init<L>(lookup: &L, bus_name: &str, delay: D, config: Config) -> Result<Self, InitError>
    where
        L: BusLookup<Bus = I>,
    {
        let bus = lookup
            .find(bus_name)
            .inspect_err(|e| tracing::error!("Could not set up sht4x on {bus_name}: {e}"))?;
        debug!("found bus for sht4x");
        Ok(Self::new(bus_name, bus, delay, config))
    }

    /// Gives back the bus and delay, the handle is gone after this.
    pub fn release(self) -> (I, D) {
        let Parts { bus, delay } = self.parts.into_inner().unwrap_or_else(recover);
        (bus, delay)
    }

    pub fn bus_name(&self) -> &str {
        &self.bus_name
    }

    pub fn config(&self) -> Config {
        self.config
    }

    /// Triggers a measurement and converts the requested channels. Both
    /// checksums in the frame are verified regardless of `channels`.
    pub fn measure(&self, channels: Channels) -> Result<Measurement, Error<I::Error>> {
        self.measure_waiting(channels, self.config.lock)
    }

    /// Like [`measure`](Self::measure) but gives up with
    /// [`Error::LockTimeout`] if another measurement holds the sensor for
    /// longer than `timeout`.
    pub fn measure_timeout(
        &self,
        channels: Channels,
        timeout: Duration,
    ) -> Result<Measurement, Error<I::Error>> {
        self.measure_waiting(channels, LockWait::Timeout(timeout))
    }

    pub(crate) fn measure_waiting(
        &self,
        channels: Channels,
        wait: LockWait,
    ) -> Result<Measurement, Error<I::Error>> {
        let words = self.lock(wait)?.read_words()?;
        Ok(Measurement::from_words(words, channels))
    }

    /// Temperature in milli degrees celsius
    pub fn temperature(&self) -> Result<i32, Error<I::Error>> {
        let words = self.lock(self.config.lock)?.read_words()?;
        Ok(temperature_milli_celsius(words.temperature))
    }

    /// Relative humidity in milli percent
    pub fn humidity(&self) -> Result<i32, Error<I::Error>> {
        let words = self.lock(self.config.lock)?.read_words()?;
        Ok(humidity_milli_percent(words.humidity))
    }

    /// The sensor does not protect the serial number by checksums in the
    /// 4 bytes read here, nothing is validated.
    pub fn serial_number(&self) -> Result<u32, Error<I::Error>> {
        self.serial_number_waiting(self.config.lock)
    }

    pub(crate) fn serial_number_waiting(&self, wait: LockWait) -> Result<u32, Error<I::Error>> {
        let raw = self.lock(wait)?.read_serial()?;
        Ok(self.config.serial_order.to_u32(raw))
    }

    fn lock(&self, wait: LockWait) -> Result<MutexGuard<'_, Parts<I, D>>, Error<I::Error>> {
        let LockWait::Timeout(timeout) = wait else {
            return Ok(self.parts.lock().unwrap_or_else(recover));
        };

        let deadline = Instant::now() + timeout;
        loop {
            match self.parts.try_lock() {
                Ok(guard) => return Ok(guard),
                Err(TryLockError::Poisoned(poisoned)) => return Ok(recover(poisoned)),
                Err(TryLockError::WouldBlock) if Instant::now() >= deadline => {
                    debug!("gave up waiting on sensor lock after {timeout:?}");
                    return Err(Error::LockTimeout(timeout));
                }
                Err(TryLockError::WouldBlock) => std::thread::sleep(LOCK_POLL_INTERVAL),
            }
        }
    }
}

// every sequence starts with a fresh command so whatever a panicking
// thread left on the bus does not carry over
fn recover<T>(poisoned: PoisonError<T>) -> T {
    tracing::warn!("A thread panicked while using the sensor, reusing the bus");
    poisoned.into_inner()
}

impl<I: I2c, D: DelayNs> Parts<I, D> {
    fn read_words(&mut self) -> Result<RawWords, Error<I::Error>> {
        write_command(&mut self.bus, command::MEASURE_HIGH_PRECISION, None).map_err(Error::Bus)?;
        self.delay.delay_ms(MEASURE_DURATION_MS);

        let mut frame = [0u8; FRAME_LEN];
        read_bytes(&mut self.bus, &mut frame).map_err(Error::Bus)?;
        Frame(frame).validate()
    }

    fn read_serial(&mut self) -> Result<[u8; 4], Error<I::Error>> {
        write_command(&mut self.bus, command::READ_SERIAL, None).map_err(Error::Bus)?;
        self.delay.delay_ms(SERIAL_DURATION_MS);

        let mut raw = [0u8; 4];
        read_bytes(&mut self.bus, &mut raw).map_err(Error::Bus)?;
        Ok(raw)
    }
}
