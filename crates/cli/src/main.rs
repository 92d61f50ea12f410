//! pwrusbctl: command-line control and energy logging for PowerUSB strips.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use pwrusb_core::config::Config;
use pwrusb_core::device::PowerStrip;
use pwrusb_core::protocol::SocketState;
use pwrusb_core::safety;
use pwrusb_core::telemetry::TelemetrySample;
use pwrusb_core::transport::{HidSession, HidTransport};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "pwrusbctl",
    version,
    about = "Control PowerUSB power strip outlets and log energy use",
    group(ArgGroup::new("telemetry").args(["current", "energy"]).multiple(true))
)]
struct Cli {
    /// Switch an outlet on (0-2). May be repeated.
    #[arg(long = "on", value_name = "INDEX")]
    on: Vec<usize>,
    /// Switch an outlet off (0-2). May be repeated.
    #[arg(long = "off", value_name = "INDEX")]
    off: Vec<usize>,
    /// Make an outlet come up on when the strip powers up.
    #[arg(long, value_name = "INDEX")]
    default_on: Vec<usize>,
    /// Make an outlet come up off when the strip powers up.
    #[arg(long, value_name = "INDEX")]
    default_off: Vec<usize>,
    /// Log the instantaneous current.
    #[arg(long)]
    current: bool,
    /// Log the accumulated charge and estimated energy.
    #[arg(long)]
    energy: bool,
    /// Reset the charge accumulator.
    #[arg(long)]
    reset: bool,
    /// Print device information.
    #[arg(long)]
    info: bool,
    /// Number of samples to log (default 1); 0 logs until interrupted.
    #[arg(long, requires = "telemetry")]
    count: Option<u64>,
    /// Seconds between samples.
    #[arg(long, value_name = "SECS", requires = "telemetry")]
    interval: Option<u64>,
    /// Estimated AC line voltage for energy conversion.
    #[arg(long, value_name = "VOLTS")]
    line_voltage: Option<f32>,
    /// JSON config file with line_voltage and interval_secs.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Print samples as JSON, one object per line.
    #[arg(long)]
    json: bool,
}

impl Cli {
    /// File settings overlaid with command-line flags.
    fn resolve_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Some(volts) = self.line_voltage {
            config.line_voltage = volts;
        }
        if let Some(secs) = self.interval {
            config.interval_secs = secs;
        }
        config.validate()?;
        Ok(config)
    }

    fn validate_indices(&self) -> Result<()> {
        for &index in self
            .on
            .iter()
            .chain(&self.off)
            .chain(&self.default_on)
            .chain(&self.default_off)
        {
            safety::validate_socket_index(index)?;
        }
        Ok(())
    }

    fn sample_count(&self) -> u64 {
        self.count.unwrap_or(1)
    }

    fn wants_telemetry(&self) -> bool {
        self.current || self.energy
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    cli.validate_indices()?;

    let session = HidSession::new()?;
    let strip = PowerStrip::open(&session);
    if !strip.is_initialized() {
        anyhow::bail!("Power USB device not found");
    }

    run(&strip, &cli, &config)
}

fn run<T: HidTransport>(strip: &PowerStrip<T>, cli: &Cli, config: &Config) -> Result<()> {
    if cli.info {
        let device_type = strip.device_type().context("read device type")?;
        println!("Device type: PowerUSB {device_type}");
        println!(
            "USB ID: {:04x}:{:04x}",
            pwrusb_core::VENDOR_ID,
            pwrusb_core::PRODUCT_ID
        );
        println!("Switchable outlets: {}", strip.socket_count());
    }

    for &index in &cli.on {
        strip
            .set_socket_state(index, SocketState::On)
            .with_context(|| format!("switch outlet {index} on"))?;
        println!("Outlet {index}: on");
    }
    for &index in &cli.off {
        strip
            .set_socket_state(index, SocketState::Off)
            .with_context(|| format!("switch outlet {index} off"))?;
        println!("Outlet {index}: off");
    }
    for &index in &cli.default_on {
        strip
            .set_default_socket_state(index, SocketState::On)
            .with_context(|| format!("set outlet {index} default on"))?;
        println!("Outlet {index} default: on");
    }
    for &index in &cli.default_off {
        strip
            .set_default_socket_state(index, SocketState::Off)
            .with_context(|| format!("set outlet {index} default off"))?;
        println!("Outlet {index} default: off");
    }

    if cli.reset {
        strip
            .reset_charge_accumulator()
            .context("reset charge accumulator")?;
        println!("Charge accumulator reset");
    }

    if cli.wants_telemetry() {
        log_telemetry(strip, cli, config)?;
    }

    Ok(())
}

fn log_telemetry<T: HidTransport>(
    strip: &PowerStrip<T>,
    cli: &Cli,
    config: &Config,
) -> Result<()> {
    let interval = Duration::from_secs(config.interval_secs);
    let count = cli.sample_count();
    let mut logged = 0u64;
    loop {
        log_once(strip, cli, config)?;
        logged += 1;
        if count != 0 && logged >= count {
            return Ok(());
        }
        debug!(
            logged,
            interval_secs = config.interval_secs,
            "Waiting for next sample"
        );
        std::thread::sleep(interval);
    }
}

fn log_once<T: HidTransport>(strip: &PowerStrip<T>, cli: &Cli, config: &Config) -> Result<()> {
    if cli.json || cli.energy {
        let sample =
            TelemetrySample::read(strip, config.line_voltage).context("read telemetry")?;
        if cli.json {
            println!("{}", serde_json::to_string(&sample)?);
        } else {
            print!("{}", format_sample(&sample, cli.current, cli.energy));
        }
    } else {
        let current = strip
            .instantaneous_current()
            .context("read instantaneous current")?;
        println!("Current: {current} mA");
    }
    Ok(())
}

fn format_sample(sample: &TelemetrySample, current: bool, energy: bool) -> String {
    let mut out = String::new();
    if current {
        out.push_str(&format!("Current: {} mA\n", sample.current_ma));
    }
    if energy {
        out.push_str(&format!("Charge: {} mA·min\n", sample.charge_ma_min));
        out.push_str(&format!("Estimated energy: {:.6} kWh\n", sample.energy_kwh));
    }
    out
}
