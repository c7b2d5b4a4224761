//! Minimum-norm linear least squares for the taste mixing problem.
//!
//! The system is `A · w ≈ b` with `A` of shape 5 × n: one row per taste axis,
//! one column per ingredient. `n` is anything from 1 to a few hundred, so the
//! system is usually under-determined and often rank-deficient (duplicate
//! ingredients, all-zero ingredients).
//!
//! ## Algorithm
//! One-sided Jacobi SVD (Hestenes) on `M = Aᵀ` (n × 5):
//! 1. Rotate pairs of the five columns of `M` until they are mutually
//!    orthogonal, accumulating the rotations in `V` (5 × 5). Then `M·V = U·Σ`.
//! 2. The column norms of `M·V` are the singular values `σᵢ`.
//! 3. `w = A⁺·b = U·Σ⁺·Vᵀ·b = Σᵢ (M·V)ᵢ · (vᵢ·b) / σᵢ²`, skipping every
//!    `σᵢ` below `ε · max(5, n) · σ_max`.
//!
//! Working on `M` directly (never forming `A·Aᵀ`) keeps the condition number
//! from being squared.

use catalog::{TASTE_DIMS, TasteVector};

/// Upper bound on Jacobi sweeps; five columns converge in well under ten
const MAX_SWEEPS: usize = 60;

/// Solve `min ‖A·w − b‖²` for the minimum-norm `w`
///
/// `columns[j]` is column `j` of `A` (the taste vector of ingredient `j`).
/// Returns one weight per column, in input order. An empty input yields an
/// empty solution.
pub fn solve_min_norm(columns: &[TasteVector], b: &TasteVector) -> Vec<f64> {
    let n = columns.len();
    if n == 0 {
        return Vec::new();
    }

    // M = Aᵀ, row r is ingredient r
    let mut m: Vec<[f64; TASTE_DIMS]> = columns.iter().map(|c| *c.as_array()).collect();
    let mut v = identity();

    for _ in 0..MAX_SWEEPS {
        let mut rotated = false;

        for p in 0..TASTE_DIMS {
            for q in (p + 1)..TASTE_DIMS {
                let (mut alpha, mut beta, mut gamma) = (0.0, 0.0, 0.0);
                for row in &m {
                    alpha += row[p] * row[p];
                    beta += row[q] * row[q];
                    gamma += row[p] * row[q];
                }

                if gamma == 0.0 || gamma.abs() <= f64::EPSILON * (alpha * beta).sqrt() {
                    continue;
                }
                rotated = true;

                let zeta = (beta - alpha) / (2.0 * gamma);
                let t = zeta.signum() / (zeta.abs() + (1.0 + zeta * zeta).sqrt());
                let c = 1.0 / (1.0 + t * t).sqrt();
                let s = c * t;

                for row in m.iter_mut() {
                    rotate(row, p, q, c, s);
                }
                for row in v.iter_mut() {
                    rotate(row, p, q, c, s);
                }
            }
        }

        if !rotated {
            break;
        }
    }

    let sigma: Vec<f64> = (0..TASTE_DIMS)
        .map(|col| m.iter().map(|row| row[col] * row[col]).sum::<f64>().sqrt())
        .collect();
    let sigma_max = sigma.iter().copied().fold(0.0, f64::max);
    let cutoff = f64::EPSILON * n.max(TASTE_DIMS) as f64 * sigma_max;

    let b = b.as_array();
    let mut w = vec![0.0; n];
    for (i, &sigma_i) in sigma.iter().enumerate() {
        if sigma_i <= cutoff || sigma_i == 0.0 {
            continue;
        }
        // vᵢ · b
        let projection: f64 = (0..TASTE_DIMS).map(|axis| v[axis][i] * b[axis]).sum();
        let coef = projection / (sigma_i * sigma_i);
        for (weight, row) in w.iter_mut().zip(m.iter()) {
            *weight += row[i] * coef;
        }
    }

    w
}

/// Residual sum of squares `‖A·w − b‖²`
pub fn residual(columns: &[TasteVector], weights: &[f64], b: &TasteVector) -> f64 {
    let mut fitted = [0.0; TASTE_DIMS];
    for (column, weight) in columns.iter().zip(weights) {
        for (axis, value) in column.as_array().iter().enumerate() {
            fitted[axis] += value * weight;
        }
    }
    fitted
        .iter()
        .zip(b.as_array())
        .map(|(f, t)| (f - t) * (f - t))
        .sum()
}

fn identity() -> [[f64; TASTE_DIMS]; TASTE_DIMS] {
    let mut v = [[0.0; TASTE_DIMS]; TASTE_DIMS];
    for (i, row) in v.iter_mut().enumerate() {
        row[i] = 1.0;
    }
    v
}

#[inline]
fn rotate(row: &mut [f64; TASTE_DIMS], p: usize, q: usize, c: f64, s: f64) {
    let (xp, xq) = (row[p], row[q]);
    row[p] = c * xp - s * xq;
    row[q] = s * xp + c * xq;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(axis: usize) -> TasteVector {
        let mut values = [0.0; TASTE_DIMS];
        values[axis] = 1.0;
        TasteVector::new(values)
    }

    #[test]
    fn test_empty_system() {
        assert!(solve_min_norm(&[], &TasteVector::zeros()).is_empty());
    }

    #[test]
    fn test_identity_system_is_exact() {
        let columns: Vec<TasteVector> = (0..TASTE_DIMS).map(unit).collect();
        let b = TasteVector::new([0.1, 0.2, 0.3, 0.4, 0.5]);

        let w = solve_min_norm(&columns, &b);
        for (weight, expected) in w.iter().zip(b.as_array()) {
            assert!((weight - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_well_posed_system_recovers_weights() {
        let columns = vec![
            TasteVector::new([0.9, 0.1, 0.1, 0.1, 0.3]),
            TasteVector::new([0.1, 0.2, 0.1, 0.1, 0.1]),
            TasteVector::new([0.2, 0.1, 0.7, 0.2, 0.8]),
        ];
        let truth = [0.5, 0.3, 0.2];
        let mut b = TasteVector::zeros();
        for (column, weight) in columns.iter().zip(truth) {
            b.add_assign(&column.scale(weight));
        }

        let w = solve_min_norm(&columns, &b);
        for (weight, expected) in w.iter().zip(truth) {
            assert!((weight - expected).abs() < 1e-9, "{:?}", w);
        }
        assert!(residual(&columns, &w, &b) < 1e-18);
    }

    #[test]
    fn test_duplicate_columns_split_evenly() {
        // Rank-deficient: the minimum-norm solution shares the weight equally
        let column = TasteVector::new([0.5, 0.0, 0.5, 0.0, 0.0]);
        let b = TasteVector::new([1.0, 0.0, 1.0, 0.0, 0.0]);

        let w = solve_min_norm(&[column, column], &b);
        assert!((w[0] - 1.0).abs() < 1e-9);
        assert!((w[1] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_column_gets_zero_weight() {
        let columns = vec![TasteVector::zeros(), unit(0)];
        let b = TasteVector::new([0.7, 0.0, 0.0, 0.0, 0.0]);

        let w = solve_min_norm(&columns, &b);
        assert_eq!(w[0], 0.0);
        assert!((w[1] - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_overdetermined_single_column_projection() {
        // One column: w = (a·b) / (a·a)
        let a = TasteVector::new([1.0, 1.0, 0.0, 0.0, 0.0]);
        let b = TasteVector::new([1.0, 0.0, 0.0, 0.0, 0.0]);

        let w = solve_min_norm(&[a], &b);
        assert!((w[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_underdetermined_minimum_norm() {
        // Seven columns spanning only the first two axes
        let columns: Vec<TasteVector> = (0..7)
            .map(|i| TasteVector::new([1.0, i as f64 / 6.0, 0.0, 0.0, 0.0]))
            .collect();
        let b = TasteVector::new([1.0, 0.5, 0.0, 0.0, 0.0]);

        let w = solve_min_norm(&columns, &b);
        assert!(residual(&columns, &w, &b) < 1e-18);

        // Any perturbation inside the null space can only grow the norm
        let norm: f64 = w.iter().map(|x| x * x).sum();
        let mut shifted = w.clone();
        shifted[0] += 0.1;
        shifted[1] -= 0.2;
        shifted[2] += 0.1;
        assert!(residual(&columns, &shifted, &b) < 1e-18);
        let shifted_norm: f64 = shifted.iter().map(|x| x * x).sum();
        assert!(shifted_norm > norm);
    }
}
