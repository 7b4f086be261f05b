use crate::crc::crc8;
use crate::error::Error;

/// Bytes returned by a measurement: `[T_MSB, T_LSB, T_CRC, RH_MSB, RH_LSB, RH_CRC]`
pub const FRAME_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Half {
    Temperature,
    Humidity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawWords {
    pub temperature: u16,
    pub humidity: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame(pub [u8; FRAME_LEN]);

impl Frame {
    /// Builds the frame the sensor would send for these words, checksums
    /// included.
    pub fn from_words(words: RawWords) -> Self {
        let [t_msb, t_lsb] = words.temperature.to_be_bytes();
        let [rh_msb, rh_lsb] = words.humidity.to_be_bytes();
        Self([
            t_msb,
            t_lsb,
            crc8(&[t_msb, t_lsb]),
            rh_msb,
            rh_lsb,
            crc8(&[rh_msb, rh_lsb]),
        ])
    }

    /// Both halves are always checked, even if the caller only needs one of
    /// the values.
    pub fn validate<E>(&self) -> Result<RawWords, Error<E>> {
        let bytes = &self.0;
        check(Half::Temperature, [bytes[0], bytes[1]], bytes[2])?;
        check(Half::Humidity, [bytes[3], bytes[4]], bytes[5])?;

        Ok(RawWords {
            temperature: u16::from_be_bytes([bytes[0], bytes[1]]),
            humidity: u16::from_be_bytes([bytes[3], bytes[4]]),
        })
    }
}

fn check<E>(half: Half, word: [u8; 2], received: u8) -> Result<(), Error<E>> {
    let computed = crc8(&word);
    if computed == received {
        Ok(())
    } else {
        tracing::warn!(
            "sht4x checksum mismatch in {half} word (ours: {computed:#04x} != sensor's: {received:#04x})"
        );
        Err(Error::Crc {
            half,
            received,
            computed,
        })
    }
}
