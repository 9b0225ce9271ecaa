use chrono::{SecondsFormat, Utc};
use clap::{ArgAction, Parser, ValueEnum};
use crossbeam_channel::tick;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;
use std::time::Duration;
use tpg26x_driver::{format_pressure, Measurement, Tpg26x, Tpg26xError, DEFAULT_TIMEOUT_MS};
use tracing::{error, info, Level};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum GaugeSelection {
    #[value(name = "1")]
    One,
    #[value(name = "2")]
    Two,
    Both,
}

/// Reads pressure from a Pfeiffer TPG26x gauge controller.
#[derive(Debug, Parser)]
#[command(name = "tpg26x", disable_version_flag = true)]
struct Args {
    /// The device path to a serial port
    port: String,
    /// Gauge to read
    #[arg(short, long, value_enum, default_value_t = GaugeSelection::One)]
    gauge: GaugeSelection,
    /// Seconds between readings
    #[arg(short, long, default_value_t = 0.5)]
    interval: f64,
    /// Number of readings. Runs until interrupted when omitted
    #[arg(short = 'n', long)]
    count: Option<u64>,
    /// Output file, `-` for stdout
    #[arg(short, long, default_value = "-")]
    output: String,
    /// Time allowed for each reply line, in milliseconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_MS)]
    timeout_ms: u64,
    /// Print one JSON object per reading
    #[arg(long)]
    json: bool,
    /// Report failed readings and continue instead of exiting
    #[arg(long)]
    keep_going: bool,
    /// Log verbosity, repeat for more
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn setup_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .init();
}

fn open_output(path: &str) -> io::Result<Box<dyn Write>> {
    if path == "-" {
        return Ok(Box::new(io::stdout()));
    }
    Ok(Box::new(BufWriter::new(File::create(path)?)))
}

fn describe(m: &Measurement) -> String {
    if m.status.is_ok() {
        format!("{} {}", format_pressure(m.pressure), m.unit)
    } else {
        format!("measurement failed, {}", m.status)
    }
}

fn read(tpg: &mut Tpg26x, gauge: GaugeSelection) -> Result<Vec<Measurement>, Tpg26xError> {
    match gauge {
        GaugeSelection::One => Ok(vec![tpg.read_gauge1()?]),
        GaugeSelection::Two => Ok(vec![tpg.read_gauge2()?]),
        GaugeSelection::Both => {
            let (m1, m2) = tpg.read_both()?;
            Ok(vec![m1, m2])
        }
    }
}

fn write_record(
    out: &mut dyn Write,
    measurements: &[Measurement],
    json: bool,
) -> Result<(), Tpg26xError> {
    let time = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    if json {
        let record = serde_json::json!({ "time": time, "measurements": measurements });
        writeln!(out, "{}", record)?;
    } else {
        let values = measurements
            .iter()
            .map(|m| format!("Gauge {}: {}", m.gauge.channel(), describe(m)))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(out, "Time: {}, {}", time, values)?;
    }
    out.flush()?;
    Ok(())
}

/// Errors after which a later reading may still succeed.
fn is_transient(e: &Tpg26xError) -> bool {
    matches!(
        e,
        Tpg26xError::Timeout(_)
            | Tpg26xError::Device { .. }
            | Tpg26xError::Protocol(_)
            | Tpg26xError::NegativeAcknowledge(_)
    )
}

fn run(args: &Args) -> Result<(), Tpg26xError> {
    let interval = Duration::try_from_secs_f64(args.interval).map_err(|_| {
        Tpg26xError::InvalidArgument(format!("invalid interval {}", args.interval))
    })?;
    let mut out = open_output(&args.output)?;
    let mut tpg = tpg26x_driver::new(&args.port)
        .timeout(Duration::from_millis(args.timeout_ms))
        .open()?;

    let unit = tpg.pressure_unit()?;
    info!(%unit, "controller pressure unit");

    let ticker = tick(interval);
    let mut n_readings: u64 = 0;
    loop {
        match read(&mut tpg, args.gauge) {
            Ok(measurements) => write_record(&mut out, &measurements, args.json)?,
            Err(e) if args.keep_going && is_transient(&e) => {
                error!(error = %e, "reading failed");
                eprintln!("{e}");
            }
            Err(e) => return Err(e),
        }

        n_readings += 1;
        if args.count.is_some_and(|count| n_readings >= count) {
            break;
        }
        if ticker.recv().is_err() {
            break;
        }
    }
    tpg.close();
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    setup_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "exiting");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
