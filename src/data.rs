use std::collections::BTreeMap;

/// One digitiser sample: acquisition time and probe voltage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub time: f64,
    pub voltage: f64,
}

/// A single probe measurement file.
#[derive(Debug, Clone)]
pub struct Shot {
    pub name: String,
    pub samples: Vec<Sample>,
}

impl Shot {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Time spanned by the recorded samples, from the file's time column.
    pub fn duration(&self) -> f64 {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => last.time - first.time,
            _ => 0.0,
        }
    }

    pub fn voltages(&self) -> Vec<f64> {
        self.samples.iter().map(|sample| sample.voltage).collect()
    }
}

/// Repeated shots taken under one experimental configuration.
#[derive(Debug, Clone)]
pub struct Condition {
    pub name: String,
    pub shots: Vec<Shot>,
}

/// Conditions keyed by folder name, ordered lexicographically.
pub type ConditionSet = BTreeMap<String, Condition>;

/// Smoothed RMS signal of one shot, tagged with its file name.
#[derive(Debug, Clone, PartialEq)]
pub struct ShotSignal {
    pub shot: String,
    pub rms: Vec<f64>,
}

/// Everything derived during one reduction, keyed by condition name.
///
/// A fresh value is built for every invocation so repeated runs never observe
/// results from an earlier one.
#[derive(Debug, Clone, Default)]
pub struct ReductionRun {
    /// Density scaling constant used for every conversion in this run.
    pub density_constant: f64,
    pub rms: BTreeMap<String, Vec<ShotSignal>>,
    pub averaged: BTreeMap<String, Vec<f64>>,
    pub density: BTreeMap<String, Vec<f64>>,
}

impl ReductionRun {
    pub fn new(density_constant: f64) -> Self {
        Self {
            density_constant,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.density.is_empty()
    }

    pub fn condition_names(&self) -> impl Iterator<Item = &str> {
        self.density.keys().map(String::as_str)
    }
}

/// Horizontal coordinate used when exporting or plotting a signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleAxis {
    Index,
    Time { period: f64 },
}

impl SampleAxis {
    pub fn from_period(period: Option<f64>) -> Self {
        match period {
            Some(period) => SampleAxis::Time { period },
            None => SampleAxis::Index,
        }
    }

    pub fn value(&self, index: usize) -> f64 {
        match self {
            SampleAxis::Index => index as f64,
            SampleAxis::Time { period } => index as f64 * period,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SampleAxis::Index => "Sample index",
            SampleAxis::Time { .. } => "Time (s)",
        }
    }
}
