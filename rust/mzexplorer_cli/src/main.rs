mod cli;
mod errors;

use clap::Parser;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use tracing::level_filters::LevelFilter;
use tracing::subscriber::set_global_default;
use tracing::{
    error,
    info,
};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::Registry;

use cli::Cli;
use errors::CliError;
use mzexplorer::events::ChartEvent;
use mzexplorer::{
    ExplorationState,
    Explorer,
    ExplorerCommand,
    ExplorerConfig,
    ExplorerError,
    HttpGateway,
    XicInput,
};

#[cfg(target_os = "windows")]
use mimalloc::MiMalloc;

#[cfg(target_os = "windows")]
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn level_from_counts(verbose: u8, quiet: u8) -> LevelFilter {
    match i16::from(verbose) - i16::from(quiet) {
        i16::MIN..=-2 => LevelFilter::ERROR,
        -1 => LevelFilter::WARN,
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

fn init_logging(verbose: u8, quiet: u8) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(level_from_counts(verbose, quiet).into())
        .from_env_lossy();
    // Stdout carries the JSON report.
    let subscriber = Registry::default().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_span_events(FmtSpan::CLOSE),
    );

    if let Err(e) = set_global_default(subscriber) {
        eprintln!("Setting default subscriber failed: {e}");
    }
}

fn load_config(args: &Cli) -> Result<ExplorerConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => ExplorerConfig::from_path(path)?,
        None => ExplorerConfig::default(),
    };

    // Override config with command line arguments if provided
    if let Some(url) = &args.backend_url {
        config.backend_url = url.clone();
    }
    if let Some(ppm) = args.ppm {
        config.ppm_tolerance = ppm;
    }
    if args.normalize {
        config.normalize_ms1 = true;
    }
    if let Some(path) = &args.session_log {
        config.session_log = Some(path.clone());
    }
    Ok(config)
}

/// Commands for one headless exploration, in the order a user would click.
fn build_commands(args: &Cli, config: &ExplorerConfig) -> Result<Vec<ExplorerCommand>, CliError> {
    let mut commands = Vec::new();

    if let Some(file) = &args.file {
        commands.push(ExplorerCommand::OpenFile(file.clone()));
    } else if args.demo {
        commands.push(ExplorerCommand::OpenDemoDataset);
    } else if let Some(path) = &args.upload {
        let payload = std::fs::read(path).map_err(|source| CliError::Io {
            path: path.clone(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        commands.push(ExplorerCommand::UploadFile { file_name, payload });
    }

    if let Some(mz) = args.xic_mz {
        let input = XicInput {
            target_mz: mz,
            ppm: config.ppm_tolerance,
        };
        if input.window().is_none() {
            return Err(ExplorerError::InvalidInput(format!(
                "cannot extract around m/z {} with {} ppm",
                input.target_mz, input.ppm
            ))
            .into());
        }
        commands.push(ExplorerCommand::SetXicInput(input));
        commands.push(ExplorerCommand::ExtractChromatogram);
    }
    if let Some((start, end)) = args.integrate {
        commands.push(ExplorerCommand::SetIntegrationMode(true));
        commands.push(ExplorerCommand::Chart(ChartEvent::RangeSelect {
            min_x: start,
            max_x: end,
        }));
    }
    if let Some(minutes) = args.rt_minutes {
        commands.push(ExplorerCommand::SelectRetentionTime { minutes });
    }
    if let Some(mz) = args.precursor_mz {
        commands.push(ExplorerCommand::ClickMs1Peak { mz });
    }
    Ok(commands)
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    file: Option<&'a str>,
    chromatogram_points: usize,
    /// First and last retention time of the active chromatogram, in seconds.
    chromatogram_span_seconds: Option<(f64, f64)>,
    extracted_points: Option<usize>,
    scans: usize,
    current_scan: Option<usize>,
    spectrum_rt_seconds: Option<f64>,
    spectrum_peaks: usize,
    highlighted_peaks: usize,
    fragment_precursor_mz: Option<f64>,
    fragment_peaks: usize,
    integrated_area: Option<f64>,
    error: Option<&'a str>,
}

impl<'a> Report<'a> {
    fn from_state(state: &'a ExplorationState) -> Self {
        let sticks = state.ms1_sticks().unwrap_or_default();
        Self {
            file: state.file(),
            chromatogram_points: state.total_chromatogram().map_or(0, |c| c.len()),
            chromatogram_span_seconds: state.active_chromatogram().and_then(|c| {
                let times = c.times_seconds();
                Some((*times.first()?, *times.last()?))
            }),
            extracted_points: state.extracted_chromatogram().map(|c| c.len()),
            scans: state.scans().len(),
            current_scan: state.current_scan_index(),
            spectrum_rt_seconds: state.spectrum().map(|s| s.retention_time_seconds()),
            spectrum_peaks: sticks.peak_count(),
            highlighted_peaks: sticks.highlighted_peak_count(),
            fragment_precursor_mz: state.fragment_spectrum().map(|f| f.precursor_mz()),
            fragment_peaks: state.fragment_spectrum().map_or(0, |f| f.mzs().len()),
            integrated_area: state.integration().map(|i| i.area),
            error: state.error_banner(),
        }
    }
}

fn main() -> std::result::Result<(), CliError> {
    // Parse command line arguments
    let args = Cli::parse();
    init_logging(args.verbose, args.quiet);

    let config = load_config(&args)?;
    info!("Parsed configuration: {:#?}", config);

    let gateway = HttpGateway::new(&config.backend_url, config.request_timeout())?;
    info!("Using data service at {}", gateway.base_url());
    let mut explorer = Explorer::new(gateway, &config);

    if let Some(path) = &config.session_log {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| CliError::Io {
                path: path.clone(),
                source,
            })?;
        explorer = explorer.with_session_log(Box::new(file));
    }

    for command in build_commands(&args, &config)? {
        explorer.submit(command);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    runtime.block_on(explorer.handle_commands());

    let state = explorer.state();
    let mut stdout = std::io::stdout().lock();
    if args.full_state {
        serde_json::to_writer_pretty(&mut stdout, state)?;
    } else {
        serde_json::to_writer_pretty(&mut stdout, &Report::from_state(state))?;
    }
    if let Err(e) = writeln!(stdout) {
        error!("Failed to write output: {}", e);
    }

    match state.error_banner() {
        Some(banner) => Err(CliError::Session(banner.to_string())),
        None => Ok(()),
    }
}
