//! Sampling driver CLI for the reprise archive engine.
//!
//! Reads CPU utilization and memory figures from procfs at a fixed
//! cadence, records them into round-robin databases, and dumps the
//! archives to `.rrd` artifacts when the run ends.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use clap::{Parser, Subcommand, ValueEnum};
use reprise::{ArchiveConfig, ConsolidationFn, Database, DumpOptions};

/// reprise — fixed-memory round-robin time-series sampling driver.
#[derive(Parser)]
#[command(name = "reprise", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Sample CPU and memory usage from procfs, then dump all archives.
    Monitor {
        /// Seconds between samples.
        #[arg(long, default_value = "1")]
        interval: u64,

        /// Total measurement duration in seconds.
        #[arg(long, default_value = "60")]
        duration: u64,

        /// Raw samples per consolidated entry in the min/max/avg archives.
        #[arg(long, default_value = "5")]
        steps: u32,

        /// Retained entries in the all-raw-samples archive.
        #[arg(long, default_value = "30")]
        rows_all: u32,

        /// Retained entries in the consolidated archives.
        #[arg(long, default_value = "1440")]
        rows: u32,

        /// Prefix for the dump artifacts.
        #[arg(long, default_value = "")]
        prefix: String,

        /// JSON file with an archive set overriding the defaults.
        #[arg(long)]
        archives: Option<PathBuf>,

        /// Timestamp rendering for dumped entries.
        #[arg(long, default_value = "epoch-millis")]
        time_format: TimeFormatArg,

        /// Value rendering for dumped entries.
        #[arg(long, default_value = "default")]
        value_format: ValueFormatArg,
    },

    /// Run a synthetic write-path benchmark.
    Synth {
        /// Number of samples to record.
        #[arg(long, default_value = "1000000")]
        points: u64,

        /// Raw samples per consolidated entry.
        #[arg(long, default_value = "10")]
        steps: u32,
    },
}

/// Timestamp rendering choices.
#[derive(Clone, Copy, ValueEnum)]
enum TimeFormatArg {
    /// Milliseconds since the Unix epoch.
    EpochMillis,
    /// Local calendar time with UTC offset.
    Iso8601,
}

/// Value rendering choices.
#[derive(Clone, Copy, ValueEnum)]
enum ValueFormatArg {
    /// Shortest round-trippable representation.
    Default,
    /// Fixed-point with six fractional digits.
    Fixed,
    /// Scientific notation.
    Scientific,
}

impl From<TimeFormatArg> for reprise::TimeFormat {
    fn from(arg: TimeFormatArg) -> Self {
        match arg {
            TimeFormatArg::EpochMillis => Self::EpochMillis,
            TimeFormatArg::Iso8601 => Self::Iso8601,
        }
    }
}

impl From<ValueFormatArg> for reprise::ValueFormat {
    fn from(arg: ValueFormatArg) -> Self {
        match arg {
            ValueFormatArg::Default => Self::Default,
            ValueFormatArg::Fixed => Self::Fixed,
            ValueFormatArg::Scientific => Self::Scientific,
        }
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Monitor {
            interval,
            duration,
            steps,
            rows_all,
            rows,
            prefix,
            archives,
            time_format,
            value_format,
        } => cmd_monitor(
            interval,
            duration,
            steps,
            rows_all,
            rows,
            &prefix,
            archives.as_deref(),
            DumpOptions {
                time_format: time_format.into(),
                value_format: value_format.into(),
            },
        ),
        Commands::Synth { points, steps } => cmd_synth(points, steps),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Default archive set: every raw sample plus min/max/avg consolidation.
fn default_archives(
    steps: u32,
    rows_all: u32,
    rows: u32,
) -> Result<Vec<ArchiveConfig>, Box<dyn std::error::Error>> {
    Ok(vec![
        ArchiveConfig::new("all", 1, rows_all, ConsolidationFn::Average)?,
        ArchiveConfig::new("min", steps, rows, ConsolidationFn::Min)?,
        ArchiveConfig::new("max", steps, rows, ConsolidationFn::Max)?,
        ArchiveConfig::new("avg", steps, rows, ConsolidationFn::Average)?,
    ])
}

/// Loads an archive set from a JSON file and validates every entry.
fn load_archives(path: &std::path::Path) -> Result<Vec<ArchiveConfig>, Box<dyn std::error::Error>> {
    let data = fs::read_to_string(path)?;
    let configs: Vec<ArchiveConfig> = serde_json::from_str(&data)?;
    for config in &configs {
        config.validate()?;
    }
    Ok(configs)
}

/// Implements `reprise monitor`.
#[allow(clippy::too_many_arguments)]
fn cmd_monitor(
    interval: u64,
    duration: u64,
    steps: u32,
    rows_all: u32,
    rows: u32,
    prefix: &str,
    archives: Option<&std::path::Path>,
    options: DumpOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let configs = match archives {
        Some(path) => load_archives(path)?,
        None => default_archives(steps, rows_all, rows)?,
    };

    let mut databases = vec![
        Database::new("cpu_usage", configs.clone())?,
        Database::new("mem_available", configs.clone())?,
        Database::new("mem_buffers", configs.clone())?,
        Database::new("mem_cached", configs)?,
    ];

    let interval = Duration::from_secs(interval.max(1));
    let ticks = duration / interval.as_secs();

    let mut cpu = CpuSampler::new();
    // the first CPU reading averages since boot, throw it away
    let _ = cpu.sample()?;
    std::thread::sleep(interval);

    println!(
        "creating {ticks} data points, this will take {} seconds",
        ticks * interval.as_secs()
    );

    for _ in 0..ticks {
        let tick_start = Instant::now();
        let timestamp_ns = epoch_nanos()?;
        print!(".");
        io::stdout().flush()?;

        let cpu_usage = cpu.sample()?;
        let mem = read_meminfo()?;

        databases[0].record(cpu_usage, timestamp_ns);
        databases[1].record(mem.available, timestamp_ns);
        databases[2].record(mem.buffers, timestamp_ns);
        databases[3].record(mem.cached, timestamp_ns);

        if let Some(remaining) = interval.checked_sub(tick_start.elapsed()) {
            std::thread::sleep(remaining);
        }
    }
    println!();

    let mut failed = false;
    for db in &databases {
        let outcome = db.dump(&format!("{prefix}{}_", db.name()), &options);
        for failure in outcome.failures() {
            tracing::error!(
                "dump of {}/{} failed: {}",
                db.name(),
                failure.archive,
                failure.error
            );
            failed = true;
        }
    }

    if failed {
        return Err("one or more archives failed to dump".into());
    }
    Ok(())
}

/// Implements `reprise synth`.
#[allow(clippy::cast_precision_loss)] // benchmark stats are fine with f64 precision
fn cmd_synth(points: u64, steps: u32) -> Result<(), Box<dyn std::error::Error>> {
    println!("reprise write-path benchmark");
    println!("  Points: {points}");
    println!("  Window: {steps} samples per entry");
    println!();

    let mut db = Database::new("synth", default_archives(steps, 1800, 1440)?)?;

    let base_time = 1_700_000_000_000_000_000u64;
    let start = Instant::now();

    for i in 0..points {
        db.record((i % 100) as f64, base_time + i * 1_000_000_000);
    }

    let elapsed = start.elapsed();
    let ns_per_record = elapsed.as_nanos() as f64 / points as f64;
    let records_per_sec = points as f64 / elapsed.as_secs_f64();

    println!("Results:");
    println!("  Elapsed: {elapsed:.3?}");
    println!("  Avg latency: {ns_per_record:.1} ns/record");
    println!("  Throughput: {records_per_sec:.0} records/sec");

    Ok(())
}

/// Returns the current wall-clock time in nanoseconds since the epoch.
#[allow(clippy::cast_possible_truncation)] // current epoch nanos fit in u64 until year 2554
fn epoch_nanos() -> Result<u64, Box<dyn std::error::Error>> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos() as u64)
}

/// CPU utilization sampler over `/proc/stat` jiffy deltas.
struct CpuSampler {
    last_total: u64,
    last_work: u64,
}

impl CpuSampler {
    fn new() -> Self {
        Self {
            last_total: 0,
            last_work: 0,
        }
    }

    /// Returns CPU utilization in percent since the previous call.
    ///
    /// The first reading covers the whole time since boot and should be
    /// discarded.
    #[allow(clippy::cast_precision_loss)]
    fn sample(&mut self) -> Result<f64, Box<dyn std::error::Error>> {
        let stat = fs::read_to_string("/proc/stat")?;
        let line = stat.lines().next().ok_or("empty /proc/stat")?;

        // cpu  user nice system idle iowait irq softirq ...
        let jiffies: Vec<u64> = line
            .split_whitespace()
            .skip(1)
            .take(7)
            .map(str::parse)
            .collect::<Result<_, _>>()?;
        if jiffies.len() < 7 {
            return Err("malformed /proc/stat cpu line".into());
        }

        let cur_total: u64 = jiffies.iter().sum();
        let cur_work = cur_total - jiffies[3]; // everything but idle

        let total = cur_total - self.last_total;
        let work = cur_work - self.last_work;

        self.last_total = cur_total;
        self.last_work = cur_work;

        if total == 0 {
            return Ok(0.0);
        }
        Ok(work as f64 / total as f64 * 100.0)
    }
}

/// Memory figures from `/proc/meminfo`, in kilobytes.
struct MemInfo {
    available: f64,
    buffers: f64,
    cached: f64,
}

/// Reads `MemAvailable`, `Buffers`, and `Cached` from `/proc/meminfo`.
fn read_meminfo() -> Result<MemInfo, Box<dyn std::error::Error>> {
    let meminfo = fs::read_to_string("/proc/meminfo")?;

    let mut info = MemInfo {
        available: 0.0,
        buffers: 0.0,
        cached: 0.0,
    };

    for line in meminfo.lines() {
        let mut parts = line.split_whitespace();
        let Some(key) = parts.next() else { continue };
        let Some(value) = parts.next() else { continue };

        match key {
            "MemAvailable:" => info.available = value.parse()?,
            "Buffers:" => info.buffers = value.parse()?,
            "Cached:" => {
                info.cached = value.parse()?;
                break;
            }
            _ => {}
        }
    }

    Ok(info)
}
