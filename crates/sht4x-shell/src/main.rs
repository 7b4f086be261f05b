use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use linux_embedded_hal::Delay;
use sht4x::{Config, LinuxBuses, SerialByteOrder};

use shell::{Flow, Shell};

mod shell;

#[derive(Parser)]
#[command(name = "sht4x shell")]
#[command(version = "1.0")]
#[command(about = "probe and read a sht4x sensor attached to a linux i2c bus")]
struct Cli {
    /// directory holding the i2c bus device files
    #[arg(long, default_value = "/dev")]
    dev_dir: PathBuf,

    /// give up on a read if another read holds the sensor longer than this,
    /// by default reads wait as long as it takes
    #[arg(long)]
    lock_timeout_ms: Option<u64>,

    /// how to turn the serial number bytes into a number
    #[arg(long, value_enum, default_value_t = SerialOrder::Native)]
    serial_order: SerialOrder,

    /// probe the sensor on this bus before reading commands, for example: i2c-1
    #[arg(short, long)]
    bus: Option<String>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum SerialOrder {
    /// bytes as they arrive in the byte order of this machine
    Native,
    BigEndian,
}

impl From<SerialOrder> for SerialByteOrder {
    fn from(order: SerialOrder) -> Self {
        match order {
            SerialOrder::Native => SerialByteOrder::Native,
            SerialOrder::BigEndian => SerialByteOrder::BigEndian,
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    setup_tracing();

    let mut config = Config::default().with_serial_order(cli.serial_order.into());
    if let Some(ms) = cli.lock_timeout_ms {
        config = config.with_lock_timeout(Duration::from_millis(ms));
    }
    let mut shell = Shell::new(LinuxBuses::new(cli.dev_dir), || Delay, config);

    let mut stdout = io::stdout().lock();
    if let Some(bus) = cli.bus {
        shell.probe(&bus);
    }
    shell::usage(&mut stdout).wrap_err("Could not write to stdout")?;

    let mut lines = io::stdin().lines();
    loop {
        write!(stdout, "sht4x> ")
            .and_then(|()| stdout.flush())
            .wrap_err("Could not write to stdout")?;
        let Some(line) = lines.next() else {
            writeln!(stdout).wrap_err("Could not write to stdout")?;
            break;
        };
        let line = line.wrap_err("Could not read command from stdin")?;
        let flow = shell
            .execute(&line, &mut stdout)
            .wrap_err("Could not write to stdout")?;
        if flow == Flow::Exit {
            break;
        }
    }

    Ok(())
}

fn setup_tracing() {
    use tracing::level_filters::LevelFilter;
    use tracing_error::ErrorLayer;
    use tracing_subscriber::filter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{layer::SubscriberExt, Layer};

    let env_filter = filter::EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    // stdout belongs to the prompt
    let fmt = fmt::layer().with_writer(std::io::stderr).with_target(false);

    tracing_subscriber::Registry::default()
        .with(ErrorLayer::default())
        .with(fmt.with_filter(env_filter))
        .init();
}
