use std::path::Path;

use anyhow::{Context, Result};
use itertools::Itertools;
use log::{debug, info, trace};

use crate::analysis::{average_signals, smooth_rms, to_density, ReductionError, SmoothingParams};
use crate::config::{ProbeKind, ProbeSetup};
use crate::data::{ConditionSet, ReductionRun, ShotSignal};
use crate::loader::{load_conditions, resolve_data_root};

/// A probe-specific reduction from loaded shots to per-condition signals.
pub trait ProbeReduction {
    fn probe(&self) -> ProbeKind;

    fn reduce(&self, conditions: &ConditionSet) -> Result<ReductionRun, ReductionError>;
}

/// Sliding RMS, shot averaging and density conversion for Langmuir probe traces.
#[derive(Debug, Clone, Copy, Default)]
pub struct LangmuirReduction {
    pub smoothing: SmoothingParams,
    pub setup: ProbeSetup,
}

impl ProbeReduction for LangmuirReduction {
    fn probe(&self) -> ProbeKind {
        ProbeKind::Langmuir
    }

    fn reduce(&self, conditions: &ConditionSet) -> Result<ReductionRun, ReductionError> {
        self.smoothing.validate()?;
        self.setup.validate()?;

        let mut run = ReductionRun::new(self.setup.density_constant());
        for condition in conditions.values() {
            let name = &condition.name;
            let rms: Vec<ShotSignal> = condition
                .shots
                .iter()
                .map(|shot| {
                    trace!(
                        "{}/{}: {} samples over {:.3e} s",
                        name,
                        shot.name,
                        shot.len(),
                        shot.duration()
                    );
                    ShotSignal {
                        shot: shot.name.clone(),
                        rms: smooth_rms(&shot.voltages(), &self.smoothing),
                    }
                })
                .collect();
            let averaged = average_signals(name, &rms)?;
            let density = to_density(&averaged, run.density_constant)?;
            debug!(
                "condition '{}': {} shot(s) x {} samples",
                name,
                rms.len(),
                averaged.len()
            );

            run.rms.insert(name.clone(), rms);
            run.averaged.insert(name.clone(), averaged);
            run.density.insert(name.clone(), density);
        }
        Ok(run)
    }
}

/// Placeholder for probes whose reduction has not been written yet.
#[derive(Debug, Clone, Copy)]
pub struct PendingReduction {
    probe: ProbeKind,
}

impl ProbeReduction for PendingReduction {
    fn probe(&self) -> ProbeKind {
        self.probe
    }

    fn reduce(&self, _conditions: &ConditionSet) -> Result<ReductionRun, ReductionError> {
        Err(ReductionError::UnsupportedProbe {
            probe: self.probe.to_string(),
        })
    }
}

pub fn reduction_for(
    probe: ProbeKind,
    smoothing: SmoothingParams,
    setup: ProbeSetup,
) -> Box<dyn ProbeReduction> {
    match probe {
        ProbeKind::Langmuir => Box::new(LangmuirReduction { smoothing, setup }),
        ProbeKind::Rpa | ProbeKind::Faraday => Box::new(PendingReduction { probe }),
    }
}

/// Load the condition folders under `input` and run `reduction` over them.
pub fn reduce_directory(input: &Path, reduction: &dyn ProbeReduction) -> Result<ReductionRun> {
    let root = resolve_data_root(input);
    let conditions = load_conditions(&root)
        .with_context(|| format!("failed to load shots from {:?}", root))?;
    let shot_count: usize = conditions.values().map(|c| c.shots.len()).sum();
    info!(
        "loaded {} condition(s), {} shot(s) from {:?}",
        conditions.len(),
        shot_count,
        root
    );

    let run = reduction
        .reduce(&conditions)
        .with_context(|| format!("{} reduction failed", reduction.probe()))?;
    info!(
        "reduced {} condition(s) [{}] with density constant {:.4e}",
        run.density.len(),
        run.condition_names().join(", "),
        run.density_constant
    );
    Ok(run)
}
