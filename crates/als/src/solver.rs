//! Dense symmetric positive-definite solves for the ALS normal equations.

use crate::{AlsError, Result};
use ndarray::{Array1, Array2, ArrayView1};

/// Solve `a * x = b` for symmetric positive-definite `a` (Cholesky).
pub fn solve_cholesky(a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>> {
    let n = a.nrows();
    let mut l = Array2::<f64>::zeros((n, n));

    // a = l * l^T
    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }

            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 || !diag.is_finite() {
                    return Err(AlsError::NotPositiveDefinite {
                        pivot: i,
                        value: diag,
                    });
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // l * y = b
    let mut y = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // l^T * x = y
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }

    Ok(x)
}

/// Least-squares update for one factor row.
///
/// Solves `(Σ v vᵀ + λ·n·I) x = Σ r v` where the sums run over the row's
/// observations `(other row, value)` against the fixed `factors` matrix and
/// `n` is the observation count.
pub fn solve_row(
    observations: &[(usize, f32)],
    factors: &Array2<f32>,
    regularization: f64,
) -> Result<Array1<f32>> {
    let k = factors.ncols();
    let mut a = Array2::<f64>::zeros((k, k));
    let mut b = Array1::<f64>::zeros(k);

    for &(other, value) in observations {
        let v: ArrayView1<f32> = factors.row(other);
        for i in 0..k {
            let vi = v[i] as f64;
            for j in 0..=i {
                a[[i, j]] += vi * v[j] as f64;
            }
            b[i] += value as f64 * vi;
        }
    }

    // Mirror the lower triangle
    for i in 0..k {
        for j in 0..i {
            a[[j, i]] = a[[i, j]];
        }
    }

    let lambda = regularization * observations.len() as f64;
    for i in 0..k {
        a[[i, i]] += lambda;
    }

    let x = solve_cholesky(&a, &b)?;
    Ok(x.mapv(|v| v as f32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_solve_cholesky_known_system() {
        // [4 2; 2 3] x = [2; 1]  =>  x = [0.5; 0]
        let a = array![[4.0, 2.0], [2.0, 3.0]];
        let b = array![2.0, 1.0];
        let x = solve_cholesky(&a, &b).unwrap();

        assert!((x[0] - 0.5).abs() < 1e-12);
        assert!(x[1].abs() < 1e-12);
    }

    #[test]
    fn test_solve_cholesky_rejects_indefinite() {
        let a = array![[1.0, 2.0], [2.0, 1.0]];
        let b = array![1.0, 1.0];
        let err = solve_cholesky(&a, &b).unwrap_err();
        assert!(matches!(err, AlsError::NotPositiveDefinite { pivot: 1, .. }));
    }

    #[test]
    fn test_solve_row_single_factor() {
        // One latent factor, fixed creative factors 1 and 2, values 2 and 4:
        // (1 + 4 + λ·2) x = 2 + 8  =>  x = 10 / (5 + 2λ)
        let factors = array![[1.0_f32], [2.0_f32]];
        let x = solve_row(&[(0, 2.0), (1, 4.0)], &factors, 0.5).unwrap();
        assert!((x[0] - 10.0 / 6.0).abs() < 1e-5);
    }
}
