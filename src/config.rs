use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

use crate::analysis::{EdgeMode, ReductionError, SmoothingParams};

pub const BOLTZMANN: f64 = 1.38e-23;
pub const ELEMENTARY_CHARGE: f64 = 1.602e-19;
pub const KELVIN_PER_EV: f64 = 1.16e4;

/// Bohm sheath factor applied to the ion saturation current.
const SHEATH_FACTOR: f64 = 0.6;

/// Diagnostic that produced the data under the input directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProbeKind {
    Langmuir,
    Rpa,
    Faraday,
}

impl std::fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ProbeKind::Langmuir => "Langmuir",
            ProbeKind::Rpa => "RPA",
            ProbeKind::Faraday => "Faraday",
        };
        f.write_str(name)
    }
}

/// Command-line configuration for the probe data reduction tool.
#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct AppConfig {
    /// Root directory holding one sub-directory of shot files per condition.
    #[arg(short = 'i', long = "input", value_name = "DIR")]
    pub input_dir: PathBuf,

    /// Probe type whose reduction should run.
    #[arg(long, value_enum, default_value_t = ProbeKind::Langmuir)]
    pub probe: ProbeKind,

    /// Moving-average window length in samples.
    #[arg(long, default_value_t = 500)]
    pub window: usize,

    /// Calibration multiplier applied to the RMS voltage.
    #[arg(long, default_value_t = 0.004)]
    pub calibration: f64,

    /// Boundary handling of the moving average.
    #[arg(long, value_enum, default_value_t = EdgeMode::Truncate)]
    pub edge_mode: EdgeMode,

    /// Assumed electron temperature (eV).
    #[arg(long, default_value_t = 10.0)]
    pub electron_temp_ev: f64,

    /// Probe collection area (m^2).
    #[arg(long, default_value_t = 1.749e-5)]
    pub probe_area: f64,

    /// Working-gas ion mass (kg). Defaults to argon.
    #[arg(long, default_value_t = 6.67e-26)]
    pub ion_mass: f64,

    /// Seconds between samples; plots and exports use sample index when absent.
    #[arg(long, value_name = "SECONDS")]
    pub sample_period: Option<f64>,

    /// Write the reduced signals to this tab-delimited file.
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,

    /// Render the density curves to this SVG file.
    #[arg(long, value_name = "FILE")]
    pub plot: Option<PathBuf>,

    /// Chart title.
    #[arg(long, default_value = "Plasma Density")]
    pub title: String,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl AppConfig {
    pub fn smoothing(&self) -> SmoothingParams {
        SmoothingParams {
            window: self.window,
            calibration: self.calibration,
            edge_mode: self.edge_mode,
        }
    }

    pub fn probe_setup(&self) -> ProbeSetup {
        ProbeSetup {
            electron_temp_ev: self.electron_temp_ev,
            probe_area: self.probe_area,
            ion_mass: self.ion_mass,
        }
    }

    /// Reject configurations that would make the reduction meaningless.
    pub fn validate(&self) -> Result<(), ReductionError> {
        self.smoothing().validate()?;
        self.probe_setup().validate()?;
        if let Some(period) = self.sample_period {
            if !period.is_finite() || period <= 0.0 {
                return Err(ReductionError::InvalidConstant {
                    name: "sample period",
                    value: period,
                });
            }
        }
        Ok(())
    }
}

/// Probe geometry and plasma assumptions feeding the density constant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeSetup {
    pub electron_temp_ev: f64,
    pub probe_area: f64,
    pub ion_mass: f64,
}

impl Default for ProbeSetup {
    fn default() -> Self {
        Self {
            electron_temp_ev: 10.0,
            probe_area: 1.749e-5,
            ion_mass: 6.67e-26,
        }
    }
}

impl ProbeSetup {
    pub fn validate(&self) -> Result<(), ReductionError> {
        let checks = [
            ("electron temperature", self.electron_temp_ev),
            ("probe area", self.probe_area),
            ("ion mass", self.ion_mass),
        ];
        for (name, value) in checks {
            if !value.is_finite() || value <= 0.0 {
                return Err(ReductionError::InvalidConstant { name, value });
            }
        }
        Ok(())
    }

    pub fn electron_temp_kelvin(&self) -> f64 {
        self.electron_temp_ev * KELVIN_PER_EV
    }

    /// `C = 0.6 * e * A * sqrt(kB * T / m_ion)`, the ion saturation current per
    /// unit density.
    pub fn density_constant(&self) -> f64 {
        let bohm_speed = (BOLTZMANN * self.electron_temp_kelvin() / self.ion_mass).sqrt();
        SHEATH_FACTOR * ELEMENTARY_CHARGE * self.probe_area * bohm_speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> AppConfig {
        let mut argv = vec!["langmuir-reduce"];
        argv.extend_from_slice(args);
        AppConfig::parse_from(argv)
    }

    #[test]
    fn defaults_match_the_lab_probe() {
        let config = parse(&["-i", "data"]);
        assert_eq!(config.window, 500);
        assert_eq!(config.calibration, 0.004);
        assert_eq!(config.probe, ProbeKind::Langmuir);
        assert_eq!(config.edge_mode, EdgeMode::Truncate);
        assert_eq!(config.probe_setup(), ProbeSetup::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn density_constant_uses_argon_at_ten_ev() {
        let setup = ProbeSetup::default();
        let expected = 0.6 * 1.602e-19 * 1.749e-5 * (1.38e-23 * 10.0 * 1.16e4 / 6.67e-26_f64).sqrt();
        assert!(((setup.density_constant() - expected) / expected).abs() < 1e-12);
        assert!(setup.density_constant() > 0.0);
    }

    #[test]
    fn rejects_zero_window() {
        let config = parse(&["-i", "data", "--window", "0"]);
        assert!(matches!(
            config.validate(),
            Err(ReductionError::InvalidWindow { window: 0 })
        ));
    }

    #[test]
    fn rejects_non_positive_physical_constants() {
        let config = parse(&["-i", "data", "--probe-area=-1.0"]);
        assert!(matches!(
            config.validate(),
            Err(ReductionError::InvalidConstant { name: "probe area", .. })
        ));
    }

    #[test]
    fn parses_probe_and_edge_mode() {
        let config = parse(&["-i", "data", "--probe", "rpa", "--edge-mode", "zero-pad", "-vv"]);
        assert_eq!(config.probe, ProbeKind::Rpa);
        assert_eq!(config.edge_mode, EdgeMode::ZeroPad);
        assert_eq!(config.verbose, 2);
    }
}
