use crate::analysis::ReductionError;
use crate::data::ShotSignal;

/// Element-wise mean of the RMS signals of one condition.
///
/// Every signal must have the length of the first one; a mismatch is reported
/// with the file name of the first offending shot rather than truncated away.
pub fn average_signals(condition: &str, signals: &[ShotSignal]) -> Result<Vec<f64>, ReductionError> {
    let (first, rest) = signals
        .split_first()
        .ok_or_else(|| ReductionError::EmptyCondition {
            condition: condition.to_string(),
        })?;

    let expected = first.rms.len();
    if let Some(bad) = rest.iter().find(|signal| signal.rms.len() != expected) {
        return Err(ReductionError::ShapeMismatch {
            condition: condition.to_string(),
            file: bad.shot.clone(),
            first: first.shot.clone(),
            expected,
            found: bad.rms.len(),
        });
    }

    let mut sum = first.rms.clone();
    for signal in rest {
        for (acc, value) in sum.iter_mut().zip(&signal.rms) {
            *acc += value;
        }
    }

    let count = signals.len() as f64;
    sum.iter_mut().for_each(|acc| *acc /= count);
    Ok(sum)
}
