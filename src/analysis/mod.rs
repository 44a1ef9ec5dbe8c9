pub mod average;
pub mod density;
pub mod rms;

use thiserror::Error;

pub use average::average_signals;
pub use density::to_density;
pub use rms::{smooth_rms, EdgeMode, SmoothingParams};

#[derive(Debug, Error)]
pub enum ReductionError {
    #[error("condition '{condition}' has no shots to average")]
    EmptyCondition { condition: String },

    #[error(
        "condition '{condition}': shot '{file}' has {found} samples but '{first}' has {expected}"
    )]
    ShapeMismatch {
        condition: String,
        file: String,
        first: String,
        expected: usize,
        found: usize,
    },

    #[error("smoothing window must be at least one sample (got {window})")]
    InvalidWindow { window: usize },

    #[error("{name} must be finite and positive (got {value})")]
    InvalidConstant { name: &'static str, value: f64 },

    #[error("{probe} probe reduction is not implemented")]
    UnsupportedProbe { probe: String },
}
