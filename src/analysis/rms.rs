use clap::ValueEnum;

use crate::analysis::ReductionError;

/// How the moving average treats windows that overhang the signal ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum EdgeMode {
    /// Average only the samples the clipped window actually covers.
    #[default]
    Truncate,
    /// Treat samples beyond the ends as zero and always divide by the window length.
    ZeroPad,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingParams {
    pub window: usize,
    pub calibration: f64,
    pub edge_mode: EdgeMode,
}

impl Default for SmoothingParams {
    fn default() -> Self {
        Self {
            window: 500,
            calibration: 0.004,
            edge_mode: EdgeMode::Truncate,
        }
    }
}

impl SmoothingParams {
    pub fn validate(&self) -> Result<(), ReductionError> {
        if self.window == 0 {
            return Err(ReductionError::InvalidWindow {
                window: self.window,
            });
        }
        if !self.calibration.is_finite() || self.calibration <= 0.0 {
            return Err(ReductionError::InvalidConstant {
                name: "calibration",
                value: self.calibration,
            });
        }
        Ok(())
    }
}

/// Calibrated sliding-window RMS of a voltage trace.
///
/// `rms[i] = K * sqrt(mean(v[j]^2))` over the window centered on `i`. The
/// window at index `i` spans `i - W/2 ..= i + (W-1)/2`, the alignment of a
/// same-length convolution with a uniform kernel. Output length always equals
/// input length, including when the window is longer than the trace.
pub fn smooth_rms(voltages: &[f64], params: &SmoothingParams) -> Vec<f64> {
    let n = voltages.len();
    let window = params.window.max(1);
    let lead = window / 2;
    let trail = (window - 1) / 2;

    // prefix[k] holds the sum of the first k squared samples.
    let mut prefix = Vec::with_capacity(n + 1);
    prefix.push(0.0);
    let mut running = 0.0;
    for v in voltages {
        running += v * v;
        prefix.push(running);
    }

    (0..n)
        .map(|i| {
            let start = i.saturating_sub(lead);
            let end = (i + trail + 1).min(n);
            let sum = prefix[end] - prefix[start];
            let divisor = match params.edge_mode {
                EdgeMode::Truncate => (end - start) as f64,
                EdgeMode::ZeroPad => window as f64,
            };
            // The prefix is non-decreasing, so `sum` is never negative.
            params.calibration * (sum / divisor).sqrt()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use super::*;

    fn params(window: usize, edge_mode: EdgeMode) -> SmoothingParams {
        SmoothingParams {
            window,
            calibration: 0.004,
            edge_mode,
        }
    }

    /// Direct O(N*W) evaluation used to check the prefix-sum version.
    fn brute_force(voltages: &[f64], params: &SmoothingParams) -> Vec<f64> {
        let n = voltages.len() as isize;
        let lead = (params.window / 2) as isize;
        let trail = ((params.window - 1) / 2) as isize;
        (0..n)
            .map(|i| {
                let mut sum = 0.0;
                let mut count = 0usize;
                for j in (i - lead)..=(i + trail) {
                    if j >= 0 && j < n {
                        sum += voltages[j as usize].powi(2);
                        count += 1;
                    }
                }
                let divisor = match params.edge_mode {
                    EdgeMode::Truncate => count as f64,
                    EdgeMode::ZeroPad => params.window as f64,
                };
                params.calibration * (sum / divisor).sqrt()
            })
            .collect()
    }

    #[test]
    fn constant_voltage_gives_scaled_magnitude_everywhere() {
        let voltages = vec![-10.0; 1000];
        let rms = smooth_rms(&voltages, &params(500, EdgeMode::Truncate));
        assert_eq!(rms.len(), 1000);
        for value in rms {
            assert!((value - 0.04).abs() < 1e-12, "got {value}");
        }
    }

    #[test]
    fn output_length_matches_input_for_any_window() {
        let voltages: Vec<f64> = (0..37).map(|i| i as f64 * 0.25).collect();
        for window in [1, 2, 3, 10, 36, 37, 80] {
            for mode in [EdgeMode::Truncate, EdgeMode::ZeroPad] {
                assert_eq!(smooth_rms(&voltages, &params(window, mode)).len(), 37);
            }
        }
    }

    #[test]
    fn window_of_one_is_calibrated_absolute_value() {
        let voltages = [3.0, -4.0, 0.5];
        let rms = smooth_rms(&voltages, &params(1, EdgeMode::ZeroPad));
        let expected = [0.012, 0.016, 0.002];
        for (got, want) in rms.iter().zip(expected) {
            assert!((got - want).abs() < 1e-12);
        }
    }

    #[test]
    fn matches_direct_evaluation() {
        let voltages: Vec<f64> = (0..200)
            .map(|i| ((i * 37 % 17) as f64 - 8.0) * 0.3)
            .collect();
        for window in [4, 5, 50, 199] {
            for mode in [EdgeMode::Truncate, EdgeMode::ZeroPad] {
                let p = params(window, mode);
                let fast = smooth_rms(&voltages, &p);
                let slow = brute_force(&voltages, &p);
                for (a, b) in fast.iter().zip(slow.iter()) {
                    assert!((a - b).abs() < 1e-12, "window {window} {mode:?}: {a} vs {b}");
                }
            }
        }
    }

    #[test]
    fn zero_pad_tapers_at_the_edges() {
        let voltages = vec![10.0; 1000];
        let rms = smooth_rms(&voltages, &params(500, EdgeMode::ZeroPad));
        // First window covers samples 0..=249 only.
        let expected_first = 0.004 * (100.0 * 250.0 / 500.0_f64).sqrt();
        assert!((rms[0] - expected_first).abs() < 1e-12);
        assert!((rms[500] - 0.04).abs() < 1e-12);
        assert!(rms[0] < rms[500]);
    }

    #[test]
    fn sinusoid_matches_analytic_rms() {
        // 50 samples per period; a 500-sample window spans ten full periods.
        let amplitude = 5.0;
        let voltages: Vec<f64> = (0..5000)
            .map(|i| amplitude * (2.0 * PI * i as f64 / 50.0).sin())
            .collect();
        let rms = smooth_rms(&voltages, &params(500, EdgeMode::Truncate));
        let analytic = 0.004 * amplitude / 2.0_f64.sqrt();
        for value in &rms[250..4750] {
            assert!((value - analytic).abs() < 1e-9 * analytic.max(1.0) + 1e-6);
        }
    }

    #[test]
    fn non_finite_input_is_not_reported_as_zero() {
        let voltages = [1.0, f64::NAN, 2.0];
        let rms = smooth_rms(&voltages, &params(1, EdgeMode::Truncate));
        assert!((rms[0] - 0.004).abs() < 1e-12);
        assert!(rms[1].is_nan());
        assert!(rms[2].is_nan(), "prefix sums carry NaN forward, got {}", rms[2]);
    }

    #[test]
    fn window_after_large_values_stays_non_negative() {
        let mut voltages = vec![1e8, 3.3, 1e8];
        voltages.extend([0.0; 10]);
        let rms = smooth_rms(&voltages, &params(1, EdgeMode::Truncate));
        assert!(rms[3..].iter().all(|value| *value == 0.0));
    }

    #[test]
    fn empty_trace_gives_empty_signal() {
        assert!(smooth_rms(&[], &SmoothingParams::default()).is_empty());
    }
}
