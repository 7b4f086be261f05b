use crate::frame::RawWords;

/// `175 * S_T / 65535 - 45` in milli degrees celsius, optimized for fixed
/// point algebra. The shift based result is what the sensor readings are
/// defined as, it may differ from the floating point formula by one.
pub fn temperature_milli_celsius(word: u16) -> i32 {
    ((21875 * i32::from(word)) >> 13) - 45000
}

/// `125 * S_RH / 65535 - 6` in milli percent relative humidity, optimized
/// for fixed point algebra. Words below the offset give negative values.
pub fn humidity_milli_percent(word: u16) -> i32 {
    ((15625 * i32::from(word)) >> 13) - 6000
}

/// Which of the two values in a frame the caller wants converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channels {
    Temperature,
    Humidity,
    Both,
}

impl Channels {
    fn temperature(self) -> bool {
        matches!(self, Self::Temperature | Self::Both)
    }

    fn humidity(self) -> bool {
        matches!(self, Self::Humidity | Self::Both)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measurement {
    /// milli degrees celsius
    pub temperature: Option<i32>,
    /// milli percent relative humidity
    pub humidity: Option<i32>,
}

impl Measurement {
    pub(crate) fn from_words(words: RawWords, channels: Channels) -> Self {
        Self {
            temperature: channels
                .temperature()
                .then(|| temperature_milli_celsius(words.temperature)),
            humidity: channels
                .humidity()
                .then(|| humidity_milli_percent(words.humidity)),
        }
    }

    pub fn celsius(&self) -> Option<f32> {
        self.temperature.map(|t| t as f32 / 1000.0)
    }

    pub fn relative_humidity(&self) -> Option<f32> {
        self.humidity.map(|h| h as f32 / 1000.0)
    }
}
