use embedded_hal::i2c::I2c;

use crate::error::InitError;

/// Resolves the name of an I2C bus to a live bus.
pub trait BusLookup {
    type Bus: I2c;

    fn find(&self, name: &str) -> Result<Self::Bus, InitError>;
}

#[cfg(feature = "linux")]
pub use linux::LinuxBuses;

#[cfg(feature = "linux")]
mod linux {
    use std::path::{Path, PathBuf};

    use linux_embedded_hal::I2cdev;

    use super::BusLookup;
    use crate::error::InitError;

    /// Buses exposed by the `i2c-dev` kernel module. Names like `i2c-1` are
    /// looked up in the device directory, names containing a `/` are used as
    /// paths directly.
    #[derive(Debug, Clone)]
    pub struct LinuxBuses {
        dev_dir: PathBuf,
    }

    impl Default for LinuxBuses {
        fn default() -> Self {
            Self::new("/dev")
        }
    }

    impl LinuxBuses {
        pub fn new(dev_dir: impl Into<PathBuf>) -> Self {
            Self {
                dev_dir: dev_dir.into(),
            }
        }

        pub(crate) fn path(&self, name: &str) -> PathBuf {
            if name.contains('/') {
                PathBuf::from(name)
            } else {
                self.dev_dir.join(name)
            }
        }
    }

    impl BusLookup for LinuxBuses {
        type Bus = I2cdev;

        fn find(&self, name: &str) -> Result<I2cdev, InitError> {
            let path = self.path(name);
            if !Path::exists(&path) {
                return Err(InitError::BusNotFound(name.to_owned()));
            }

            I2cdev::new(&path).map_err(|cause| InitError::OpenBus {
                name: name.to_owned(),
                cause: Box::new(cause),
            })
        }
    }

}
