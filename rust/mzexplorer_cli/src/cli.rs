use clap::{
    ArgGroup,
    Parser,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("source").args(["file", "demo", "upload"])))]
pub struct Cli {
    /// Increase logging verbosity (can be repeated: -v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease logging verbosity (can be repeated: -q for warn, -qq for error)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Path to the JSON configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Root URL of the data service (will over-write the config file)
    #[arg(long, value_name = "URL")]
    pub backend_url: Option<String>,

    /// Service-side path of the file to open
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<String>,

    /// Open the service's bundled demo dataset
    #[arg(long)]
    pub demo: bool,

    /// Upload a local file to the service and open it
    #[arg(long, value_name = "FILE")]
    pub upload: Option<PathBuf>,

    /// Extract a chromatogram around this m/z
    #[arg(long, value_name = "MZ")]
    pub xic_mz: Option<f64>,

    /// Tolerance for --xic-mz in ppm (will over-write the config file)
    #[arg(long, value_name = "PPM")]
    pub ppm: Option<f64>,

    /// Show the MS1 spectrum closest to this retention time
    #[arg(long, value_name = "MINUTES")]
    pub rt_minutes: Option<f64>,

    /// Request the MS2 spectrum of a flagged precursor within 0.1 Da of this m/z
    #[arg(long, value_name = "MZ", requires = "rt_minutes")]
    pub precursor_mz: Option<f64>,

    /// Integrate the active chromatogram over START:END minutes
    #[arg(long, value_name = "START:END", value_parser = parse_minutes_range)]
    pub integrate: Option<(f64, f64)>,

    /// Show MS1 intensities as percent of the base peak
    #[arg(long)]
    pub normalize: bool,

    /// Append handled commands as JSON lines to this file
    #[arg(long, value_name = "FILE")]
    pub session_log: Option<PathBuf>,

    /// Print the whole exploration state instead of a summary
    #[arg(long)]
    pub full_state: bool,
}

fn parse_minutes_range(s: &str) -> Result<(f64, f64), String> {
    let (start, end) = s
        .split_once(':')
        .ok_or_else(|| format!("expected START:END, got '{s}'"))?;
    let start: f64 = start
        .trim()
        .parse()
        .map_err(|e| format!("invalid start '{start}': {e}"))?;
    let end: f64 = end
        .trim()
        .parse()
        .map_err(|e| format!("invalid end '{end}': {e}"))?;
    if !start.is_finite() || !end.is_finite() {
        return Err(format!("range bounds must be finite, got '{s}'"));
    }
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_invocation() {
        let cli = Cli::try_parse_from(["mzexplorer", "--file", "/data/run.mzML"]).unwrap();
        assert_eq!(cli.file.as_deref(), Some("/data/run.mzML"));
        assert_eq!(cli.verbose, 0);
        assert!(cli.integrate.is_none());
    }

    #[test]
    fn test_verbosity_counts() {
        let cli = Cli::try_parse_from(["mzexplorer", "-vv", "--demo"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.demo);
    }

    #[test]
    fn test_sources_are_exclusive() {
        let res = Cli::try_parse_from(["mzexplorer", "--demo", "--file", "/data/run.mzML"]);
        assert!(res.is_err());
    }

    #[test]
    fn test_integrate_range_parsing() {
        let cli =
            Cli::try_parse_from(["mzexplorer", "--demo", "--integrate", "12.5:13"]).unwrap();
        assert_eq!(cli.integrate, Some((12.5, 13.0)));
        assert!(parse_minutes_range("12.5").is_err());
        assert!(parse_minutes_range("a:1").is_err());
        assert!(parse_minutes_range("inf:1").is_err());
    }

    #[test]
    fn test_precursor_requires_rt() {
        let res = Cli::try_parse_from(["mzexplorer", "--demo", "--precursor-mz", "445.12"]);
        assert!(res.is_err());
    }
}
