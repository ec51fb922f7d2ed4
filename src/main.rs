use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use industrial_telemetry_sim::async_impl::sensor_task;
use industrial_telemetry_sim::config::{
    load_config, EmitterSettings, OutputFormat, RuntimeKind, SimulatorConfig,
};
use industrial_telemetry_sim::error::ConfigError;
use industrial_telemetry_sim::ipc::{reading_channel, SharedGenerator};
use industrial_telemetry_sim::metrics::{EmissionMetrics, MetricsReport};
use industrial_telemetry_sim::sink::ReadingSink;
use industrial_telemetry_sim::threaded_impl::spawn_sensor_thread;
use industrial_telemetry_sim::TelemetryGenerator;

const DEFAULT_CONFIG_PATH: &str = "config/simulator.toml";

/// Emit synthetic industrial sensor readings as JSON lines on stdout.
#[derive(Parser, Debug)]
#[command(name = "industrial-telemetry-sim", version, about)]
struct Cli {
    /// TOML config file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Seed for a reproducible stream
    #[arg(long)]
    seed: Option<u64>,

    /// Starting band: 0 = normal, 1 = anomalous
    #[arg(long)]
    target: Option<u8>,

    /// Stop after this many readings
    #[arg(long, short = 'n')]
    count: Option<u64>,

    /// Stop after this many seconds
    #[arg(long)]
    duration_secs: Option<u64>,

    /// Pause between readings
    #[arg(long)]
    interval_ms: Option<u64>,

    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    #[arg(long, value_enum)]
    runtime: Option<RuntimeKind>,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(long, short)]
    verbose: bool,
}

impl Cli {
    fn apply(&self, config: &mut SimulatorConfig) {
        if self.seed.is_some() {
            config.generator.seed = self.seed;
        }
        if let Some(target) = self.target {
            config.generator.target = target;
        }
        if self.count.is_some() {
            config.emitter.count = self.count;
        }
        if self.duration_secs.is_some() {
            config.emitter.duration_secs = self.duration_secs;
        }
        if let Some(interval_ms) = self.interval_ms {
            config.emitter.interval_ms = interval_ms;
        }
        if let Some(format) = self.format {
            config.emitter.format = format;
        }
        if let Some(runtime) = self.runtime {
            config.emitter.runtime = runtime;
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn resolve_config(path: Option<&PathBuf>) -> anyhow::Result<SimulatorConfig> {
    match path {
        Some(path) => load_config(path).with_context(|| format!("loading {}", path.display())),
        None => match load_config(DEFAULT_CONFIG_PATH) {
            Ok(config) => Ok(config),
            Err(ConfigError::Io { .. }) => {
                warn!(path = DEFAULT_CONFIG_PATH, "config file not found, using defaults");
                Ok(SimulatorConfig::default())
            }
            Err(err) => Err(err).context("loading default config"),
        },
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = resolve_config(cli.config.as_ref())?;
    cli.apply(&mut config);
    config.validate().context("invalid configuration")?;

    let schedule = config.generator.schedule()?;
    let band = config.generator.seed_band()?;
    let settings = config.emitter.settings()?;
    let generator = TelemetryGenerator::with_options(config.generator.seed, band, schedule);
    let metrics = EmissionMetrics::new()?;

    info!(
        seed = ?config.generator.seed,
        band = ?band,
        onset_probability = schedule.onset_probability(),
        runtime = ?config.emitter.runtime,
        "starting telemetry simulator"
    );

    let sink = ReadingSink::new(io::stdout().lock(), config.emitter.format);
    let written = match config.emitter.runtime {
        RuntimeKind::Threaded => {
            run_threaded(generator, sink, settings, config.emitter.channel_capacity, &metrics)?
        }
        RuntimeKind::Async => {
            run_async(generator, sink, settings, config.emitter.channel_capacity, &metrics)?
        }
    };

    log_report(written, &metrics.report());
    Ok(())
}

fn run_threaded<W: io::Write>(
    generator: TelemetryGenerator,
    mut sink: ReadingSink<W>,
    settings: EmitterSettings,
    capacity: usize,
    metrics: &EmissionMetrics,
) -> anyhow::Result<u64> {
    let (tx, rx) = reading_channel(capacity);
    let (handle, stats) = spawn_sensor_thread(generator, tx, settings, metrics.clone());

    let result = sink.drain(&rx);
    if result.is_err() {
        stats.request_shutdown();
    }
    // Unblock a sender stuck on a full channel before joining.
    drop(rx);
    if handle.join().is_err() {
        anyhow::bail!("sensor thread panicked");
    }
    result.context("writing readings")
}

fn run_async<W: io::Write>(
    generator: TelemetryGenerator,
    mut sink: ReadingSink<W>,
    settings: EmitterSettings,
    capacity: usize,
    metrics: &EmissionMetrics,
) -> anyhow::Result<u64> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("building tokio runtime")?;

    runtime.block_on(async {
        let (tx, mut rx) = tokio::sync::mpsc::channel(capacity.max(1));
        let task = tokio::spawn(sensor_task(
            SharedGenerator::new(generator),
            tx,
            settings,
            metrics.clone(),
        ));

        let mut written = 0u64;
        while let Some(reading) = rx.recv().await {
            if let Err(err) = sink.write(&reading) {
                rx.close();
                task.abort();
                return Err(err).context("writing readings");
            }
            written += 1;
        }
        task.await.context("sensor task failed")?;
        Ok::<u64, anyhow::Error>(written)
    })
}

fn log_report(written: u64, report: &MetricsReport) {
    info!(
        written,
        anomalous = report.anomalous_readings,
        episodes = report.anomaly_episodes,
        longest_episode = report.longest_episode,
        anomalous_fraction = report.anomalous_fraction(),
        generation_p50 = ?report.generation_p50,
        generation_p99 = ?report.generation_p99,
        "telemetry run complete"
    );
}
