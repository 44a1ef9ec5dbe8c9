use crate::analysis::ReductionError;

/// Scale an averaged RMS signal to electron density (m^-3).
pub fn to_density(averaged: &[f64], density_constant: f64) -> Result<Vec<f64>, ReductionError> {
    if !density_constant.is_finite() || density_constant <= 0.0 {
        return Err(ReductionError::InvalidConstant {
            name: "density constant",
            value: density_constant,
        });
    }
    Ok(averaged.iter().map(|value| value / density_constant).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProbeSetup;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn divides_by_the_constant() {
        let c = ProbeSetup::default().density_constant();
        let density = to_density(&[0.04, 0.0], c).unwrap();
        assert!(close(density[0], 0.04 / c));
        assert_eq!(density[1], 0.0);
    }

    #[test]
    fn is_linear() {
        let c = ProbeSetup::default().density_constant();
        let a = [0.01, 0.02, 0.5];
        let b = [0.3, 0.0, 0.25];
        let scale = 3.5;

        let scaled: Vec<f64> = a.iter().map(|v| v * scale).collect();
        let lhs = to_density(&scaled, c).unwrap();
        let rhs: Vec<f64> = to_density(&a, c).unwrap().iter().map(|v| v * scale).collect();
        assert!(lhs.iter().zip(&rhs).all(|(x, y)| close(*x, *y)));

        let summed: Vec<f64> = a.iter().zip(&b).map(|(x, y)| x + y).collect();
        let lhs = to_density(&summed, c).unwrap();
        let da = to_density(&a, c).unwrap();
        let db = to_density(&b, c).unwrap();
        assert!(lhs
            .iter()
            .zip(da.iter().zip(&db))
            .all(|(s, (x, y))| close(*s, x + y)));
    }

    #[test]
    fn rejects_zero_constant() {
        assert!(matches!(
            to_density(&[1.0], 0.0),
            Err(ReductionError::InvalidConstant { .. })
        ));
    }
}
