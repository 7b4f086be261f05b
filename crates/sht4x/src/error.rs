use std::time::Duration;

use crate::frame::Half;

/// Error while talking to an initialized sensor. `E` is the error of the
/// underlying I2C bus.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error<E> {
    #[error("I2C transaction with the sensor failed: {0:?}")]
    Bus(E),
    #[error(
        "Checksum mismatch in the {half} word, sensor sent {received:#04x} \
        while the data hashes to {computed:#04x}"
    )]
    Crc { half: Half, received: u8, computed: u8 },
    #[error("Another measurement held the sensor for longer than {0:?}")]
    LockTimeout(Duration),
}

/// Resource error while creating a handle. Locks can not fail to allocate
/// so only resolving the bus can go wrong.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("No I2C bus named: {0}")]
    BusNotFound(String),
    #[error("Could not open I2C bus {name}")]
    OpenBus {
        name: String,
        #[source]
        cause: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}
