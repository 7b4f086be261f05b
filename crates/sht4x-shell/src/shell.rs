use std::io::{self, Write};

use embedded_hal::delay::DelayNs;
use sht4x::{BusLookup, Config, Sht4x};
use tracing::{debug, error, info};

const PROBE_USAGE: &str = "probe <bus_name>   - probe sensor on the given i2c bus";
const READ_USAGE: &str = "read               - read humidity and temperature";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Exit,
}

/// Owns at most one probed sensor, probing another bus replaces it.
pub(crate) struct Shell<L: BusLookup, D> {
    lookup: L,
    new_delay: fn() -> D,
    config: Config,
    sensor: Option<Sht4x<L::Bus, D>>,
}

pub(crate) fn usage(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Usage:")?;
    writeln!(out, "{PROBE_USAGE}")?;
    writeln!(out, "{READ_USAGE}")
}

impl<L: BusLookup, D: DelayNs> Shell<L, D> {
    pub(crate) fn new(lookup: L, new_delay: fn() -> D, config: Config) -> Self {
        Self {
            lookup,
            new_delay,
            config,
            sensor: None,
        }
    }

    pub(crate) fn execute(&mut self, line: &str, out: &mut impl Write) -> io::Result<Flow> {
        let mut args = line.split_whitespace();
        match args.next() {
            None => (),
            Some("probe") => match args.next() {
                Some(bus_name) => self.probe(bus_name),
                None => writeln!(out, "{PROBE_USAGE}")?,
            },
            Some("read") => self.read(out)?,
            Some("help") => usage(out)?,
            Some("exit" | "quit") => return Ok(Flow::Exit),
            Some(other) => writeln!(out, "Unknown command '{other}'. Enter 'help' for usage")?,
        }
        Ok(Flow::Continue)
    }

    pub(crate) fn probe(&mut self, bus_name: &str) {
        if self
            .sensor
            .as_ref()
            .is_some_and(|sensor| sensor.bus_name() == bus_name)
        {
            debug!("sht4x on {bus_name} already probed");
            return;
        }

        if let Some(previous) = self.sensor.take() {
            debug!("releasing sht4x on {}", previous.bus_name());
            drop(previous.release());
        }

        // init logs why it failed
        let Ok(sensor) = Sht4x::init(&self.lookup, bus_name, (self.new_delay)(), self.config)
        else {
            return;
        };

        match sensor.serial_number() {
            Ok(serial) if serial != 0 => info!("sht4x serial: {serial:#x}"),
            Ok(_) => error!("sht4x read serial error: serial reads as zero"),
            Err(e) => error!("sht4x read serial error: {e}"),
        }
        self.sensor = Some(sensor);
    }

    fn read(&self, out: &mut impl Write) -> io::Result<()> {
        let Some(sensor) = &self.sensor else {
            return writeln!(out, "Please use 'probe <bus_name>' first");
        };

        let humidity = milli_or_zero(sensor.humidity(), "humidity");
        writeln!(out, "read sht4x sensor humidity   : {} %", one_decimal(humidity))?;

        let temperature = milli_or_zero(sensor.temperature(), "temperature");
        writeln!(out, "read sht4x sensor temperature: {} ℃", one_decimal(temperature))
    }
}

/// Failed reads show up as 0.0 like they always have, the cause goes to
/// the log.
fn milli_or_zero<E: std::fmt::Display>(reading: Result<i32, E>, what: &str) -> f32 {
    match reading {
        Ok(milli) => milli as f32 / 1000.0,
        Err(e) => {
            error!("Could not read sht4x {what}: {e}");
            0.0
        }
    }
}

/// One decimal, truncated toward zero.
fn one_decimal(value: f32) -> String {
    let tenths = (value * 10.0) as i32;
    let sign = if tenths < 0 { "-" } else { "" };
    format!("{sign}{}.{}", (tenths / 10).abs(), (tenths % 10).abs())
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;
    use std::time::Duration;

    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::i2c::{Mock, Transaction};
    use sht4x::{Frame, InitError, LockWait, RawWords, SerialByteOrder, ADDRESS};

    use super::*;

    struct MockBuses(HashMap<String, Mock>);

    impl BusLookup for MockBuses {
        type Bus = Mock;

        fn find(&self, name: &str) -> Result<Mock, InitError> {
            self.0
                .get(name)
                .cloned()
                .ok_or_else(|| InitError::BusNotFound(name.to_owned()))
        }
    }

    fn serial(bytes: [u8; 4]) -> Vec<Transaction> {
        vec![
            Transaction::write(ADDRESS, vec![0x89]),
            Transaction::read(ADDRESS, bytes.to_vec()),
        ]
    }

    fn measurement(temperature: u16, humidity: u16) -> Vec<Transaction> {
        let frame = Frame::from_words(RawWords {
            temperature,
            humidity,
        });
        vec![
            Transaction::write(ADDRESS, vec![0xFD]),
            Transaction::read(ADDRESS, frame.0.to_vec()),
        ]
    }

    fn shell(buses: &[(&str, Vec<Transaction>)]) -> Shell<MockBuses, NoopDelay> {
        shell_with(buses, Config::default())
    }

    fn shell_with(
        buses: &[(&str, Vec<Transaction>)],
        config: Config,
    ) -> Shell<MockBuses, NoopDelay> {
        let buses = buses
            .iter()
            .map(|(name, expectations)| (name.to_string(), Mock::new(expectations)))
            .collect();
        Shell::new(MockBuses(buses), NoopDelay::new, config)
    }

    fn run(shell: &mut Shell<MockBuses, NoopDelay>, line: &str) -> String {
        let mut out = Vec::new();
        let flow = shell.execute(line, &mut out).unwrap();
        assert_eq!(flow, Flow::Continue);
        String::from_utf8(out).unwrap()
    }

    fn done(shell: Shell<MockBuses, NoopDelay>) {
        for (_, mut bus) in shell.lookup.0 {
            bus.done();
        }
    }

    #[test]
    fn truncates_toward_zero() {
        assert_eq!(one_decimal(56.5), "56.5");
        assert_eq!(one_decimal(24.998), "24.9");
        assert_eq!(one_decimal(0.0), "0.0");
        assert_eq!(one_decimal(-5.96), "-5.9");
        assert_eq!(one_decimal(-0.5), "-0.5");
        assert_eq!(one_decimal(-45.0), "-45.0");
    }

    #[test]
    fn read_needs_probe() {
        let mut shell = shell(&[]);
        assert_eq!(run(&mut shell, "read"), "Please use 'probe <bus_name>' first\n");
        done(shell);
    }

    #[test]
    fn probe_then_read() {
        let mut expectations = serial([0x12, 0x34, 0x56, 0x78]);
        expectations.extend(measurement(0x6666, 0x8000));
        expectations.extend(measurement(0x6666, 0x8000));
        let mut shell = shell(&[("i2c-1", expectations)]);

        assert_eq!(run(&mut shell, "probe i2c-1"), "");
        assert_eq!(
            run(&mut shell, "read"),
            "read sht4x sensor humidity   : 56.5 %\n\
             read sht4x sensor temperature: 24.9 ℃\n"
        );
        done(shell);
    }

    #[test]
    fn reprobe_same_bus_is_noop() {
        let mut shell = shell(&[("i2c-1", serial([0, 0, 0, 1]))]);

        run(&mut shell, "probe i2c-1");
        run(&mut shell, "probe i2c-1");
        assert_eq!(shell.sensor.as_ref().map(Sht4x::bus_name), Some("i2c-1"));
        done(shell);
    }

    #[test]
    fn probe_other_bus_replaces_sensor() {
        let mut shell = shell(&[
            ("i2c-1", serial([0, 0, 0, 1])),
            ("i2c-2", serial([0, 0, 0, 2])),
        ]);

        run(&mut shell, "probe i2c-1");
        run(&mut shell, "probe i2c-2");
        assert_eq!(shell.sensor.as_ref().map(Sht4x::bus_name), Some("i2c-2"));
        done(shell);
    }

    #[test]
    fn failed_probe_leaves_no_sensor() {
        let mut shell = shell(&[("i2c-1", serial([0, 0, 0, 1]))]);

        run(&mut shell, "probe i2c-1");
        run(&mut shell, "probe i2c-7");
        assert!(shell.sensor.is_none());
        assert_eq!(run(&mut shell, "read"), "Please use 'probe <bus_name>' first\n");
        done(shell);
    }

    #[test]
    fn sensor_kept_when_serial_fails() {
        let mut shell = shell(&[(
            "i2c-1",
            vec![Transaction::write(ADDRESS, vec![0x89]).with_error(ErrorKind::Other)],
        )]);

        run(&mut shell, "probe i2c-1");
        assert!(shell.sensor.is_some());
        done(shell);
    }

    #[test]
    fn failed_reads_print_zero() {
        let mut expectations = serial([0, 0, 0, 1]);
        expectations.push(Transaction::write(ADDRESS, vec![0xFD]).with_error(ErrorKind::Other));
        expectations.push(Transaction::write(ADDRESS, vec![0xFD]).with_error(ErrorKind::Other));
        let mut shell = shell(&[("i2c-1", expectations)]);

        run(&mut shell, "probe i2c-1");
        assert_eq!(
            run(&mut shell, "read"),
            "read sht4x sensor humidity   : 0.0 %\n\
             read sht4x sensor temperature: 0.0 ℃\n"
        );
        done(shell);
    }

    #[test]
    fn probed_sensor_uses_shell_config() {
        let config = Config::default()
            .with_lock_timeout(Duration::from_millis(250))
            .with_serial_order(SerialByteOrder::BigEndian);
        let mut shell = shell_with(&[("i2c-1", serial([0, 0, 0, 1]))], config);

        run(&mut shell, "probe i2c-1");
        let sensor = shell.sensor.as_ref().expect("probe succeeded");
        assert_eq!(sensor.config(), config);
        assert_eq!(sensor.config().lock, LockWait::Timeout(Duration::from_millis(250)));
        done(shell);
    }

    #[test]
    fn usage_and_unknown_commands() {
        let mut shell = shell(&[]);

        assert_eq!(run(&mut shell, "probe"), format!("{PROBE_USAGE}\n"));
        assert_eq!(run(&mut shell, ""), "");
        assert!(run(&mut shell, "help").starts_with("Usage:\n"));
        assert_eq!(
            run(&mut shell, "calibrate"),
            "Unknown command 'calibrate'. Enter 'help' for usage\n"
        );

        let flow = shell.execute("exit", &mut Vec::new()).unwrap();
        assert_eq!(flow, Flow::Exit);
        done(shell);
    }
}
