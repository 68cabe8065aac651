//! Eigenvalue spectrum of a return covariance
//!
//! Short or collinear return histories produce covariances that are singular
//! or slightly indefinite. Such a matrix leaves the Sharpe objective with
//! flat directions, so the engine inspects the spectrum before searching.

use super::CovarianceError;
use ndarray::{Array1, Array2};

const MAX_SWEEPS: usize = 64;

/// Eigenvalues of a symmetric matrix, largest first.
#[derive(Debug, Clone, PartialEq)]
pub struct CovarianceSpectrum {
    eigenvalues: Array1<f64>,
}

impl CovarianceSpectrum {
    /// Eigenvalues of the symmetric matrix `cov`.
    ///
    /// Uses cyclic Jacobi sweeps, rotating every off-diagonal pair in turn
    /// until the off-diagonal mass is negligible against the diagonal.
    ///
    /// # Errors
    /// * `DimensionMismatch` if `cov` is not square
    /// * `NonFinite` if `cov` holds NaN or infinite entries
    pub fn of(cov: &Array2<f64>) -> Result<Self, CovarianceError> {
        let n = cov.nrows();
        if cov.ncols() != n {
            return Err(CovarianceError::DimensionMismatch {
                expected: n,
                actual: cov.ncols(),
            });
        }
        if cov.iter().any(|v| !v.is_finite()) {
            return Err(CovarianceError::NonFinite);
        }

        let mut a = cov.clone();
        for _ in 0..MAX_SWEEPS {
            let off: f64 = (0..n)
                .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
                .map(|(i, j)| a[[i, j]] * a[[i, j]])
                .sum();
            let diag: f64 = a.diag().iter().map(|d| d * d).sum();
            if off <= f64::EPSILON * f64::EPSILON * diag || off == 0.0 {
                break;
            }

            for p in 0..n {
                for q in p + 1..n {
                    rotate(&mut a, p, q);
                }
            }
        }

        let mut eigenvalues = a.diag().to_vec();
        eigenvalues.sort_by(|x, y| y.total_cmp(x));

        Ok(Self {
            eigenvalues: Array1::from(eigenvalues),
        })
    }

    /// Eigenvalues in descending order
    pub const fn eigenvalues(&self) -> &Array1<f64> {
        &self.eigenvalues
    }

    /// Largest eigenvalue (zero for an empty matrix)
    pub fn largest(&self) -> f64 {
        self.eigenvalues.first().copied().unwrap_or(0.0)
    }

    /// Smallest eigenvalue (zero for an empty matrix)
    pub fn smallest(&self) -> f64 {
        self.eigenvalues.last().copied().unwrap_or(0.0)
    }

    /// No eigenvalue lies below `-tolerance`.
    pub fn is_positive_semidefinite(&self, tolerance: f64) -> bool {
        self.smallest() >= -tolerance
    }

    /// Ratio of the largest to the smallest eigenvalue.
    ///
    /// Infinite when the smallest eigenvalue is zero or negative, i.e. when
    /// some portfolio has no estimated variance.
    pub fn condition_number(&self) -> f64 {
        let smallest = self.smallest();
        if smallest <= 0.0 {
            f64::INFINITY
        } else {
            self.largest() / smallest
        }
    }
}

/// Zero `a[p][q]` with a similarity rotation in the (p, q) plane.
fn rotate(a: &mut Array2<f64>, p: usize, q: usize) {
    let apq = a[[p, q]];
    if apq == 0.0 {
        return;
    }

    // Smaller root of t² + 2θt - 1 = 0 keeps the rotation angle below π/4
    let theta = (a[[q, q]] - a[[p, p]]) / (2.0 * apq);
    let t = theta.signum() / (theta.abs() + theta.hypot(1.0));
    let c = 1.0 / t.hypot(1.0);
    let s = t * c;

    a[[p, p]] -= t * apq;
    a[[q, q]] += t * apq;
    a[[p, q]] = 0.0;
    a[[q, p]] = 0.0;

    for k in 0..a.nrows() {
        if k == p || k == q {
            continue;
        }
        let akp = a[[k, p]];
        let akq = a[[k, q]];
        let new_kp = c * akp - s * akq;
        let new_kq = s * akp + c * akq;
        a[[k, p]] = new_kp;
        a[[p, k]] = new_kp;
        a[[k, q]] = new_kq;
        a[[q, k]] = new_kq;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_diagonal_covariance() {
        let cov = Array2::from_diag(&array![0.04, 0.09, 0.0625]);
        let spectrum = CovarianceSpectrum::of(&cov).unwrap();

        assert_eq!(spectrum.eigenvalues(), &array![0.09, 0.0625, 0.04]);
        assert_abs_diff_eq!(spectrum.condition_number(), 0.09 / 0.04, epsilon = 1e-12);
    }

    #[test]
    fn test_equicorrelated_assets() {
        // Eigenvalues 4, 1, 1
        let cov = array![[2.0, 1.0, 1.0], [1.0, 2.0, 1.0], [1.0, 1.0, 2.0]];
        let spectrum = CovarianceSpectrum::of(&cov).unwrap();

        assert_abs_diff_eq!(spectrum.largest(), 4.0, epsilon = 1e-10);
        assert_abs_diff_eq!(spectrum.eigenvalues()[1], 1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(spectrum.smallest(), 1.0, epsilon = 1e-10);
        // Trace is preserved by the rotations
        assert_abs_diff_eq!(spectrum.eigenvalues().sum(), 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_single_asset() {
        let spectrum = CovarianceSpectrum::of(&array![[0.25]]).unwrap();
        assert_eq!(spectrum.largest(), 0.25);
        assert_eq!(spectrum.condition_number(), 1.0);
        assert!(spectrum.is_positive_semidefinite(0.0));
    }

    #[test]
    fn test_perfectly_correlated_assets_are_singular() {
        // Second asset is half the first: rank one
        let cov = array![[1.0, 0.5], [0.5, 0.25]];
        let spectrum = CovarianceSpectrum::of(&cov).unwrap();

        assert!(spectrum.is_positive_semidefinite(1e-12));
        assert_abs_diff_eq!(spectrum.largest(), 1.25, epsilon = 1e-12);
        assert!(spectrum.condition_number() > 1e12);
    }

    #[test]
    fn test_indefinite_matrix() {
        // Eigenvalues 3 and -1
        let spectrum = CovarianceSpectrum::of(&array![[1.0, 2.0], [2.0, 1.0]]).unwrap();

        assert!(!spectrum.is_positive_semidefinite(1e-12));
        assert_abs_diff_eq!(spectrum.smallest(), -1.0, epsilon = 1e-12);
        assert!(spectrum.condition_number().is_infinite());
    }

    #[test]
    fn test_invalid_input() {
        assert!(matches!(
            CovarianceSpectrum::of(&Array2::zeros((2, 3))),
            Err(CovarianceError::DimensionMismatch { expected: 2, actual: 3 })
        ));
        assert!(matches!(
            CovarianceSpectrum::of(&array![[f64::NAN]]),
            Err(CovarianceError::NonFinite)
        ));
    }
}
