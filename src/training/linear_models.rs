//! Ordinary least squares regression

use crate::error::{Result, TrainerError};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Pivots below this fraction of the largest diagonal entry count as zero.
const PIVOT_TOLERANCE: f64 = 1e-10;

/// Eigenvalues below this fraction of the largest one are dropped from the pseudo-inverse.
const EIGEN_RCOND: f64 = 1e-10;

const MAX_JACOBI_SWEEPS: usize = 100;

/// Solve symmetric positive-definite system Ax = b using Cholesky decomposition.
/// Returns `None` when A is not numerically positive definite.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    let max_diag = a.diag().iter().fold(0.0f64, |m, v| m.max(v.abs()));
    let tol = PIVOT_TOLERANCE * max_diag.max(f64::MIN_POSITIVE);

    // A = L * L^T
    let mut l = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }

            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= tol {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // Forward substitution: L * y = b
    let mut y = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // Backward substitution: L^T * x = y
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }

    Some(x)
}

/// Cyclic Jacobi eigen-decomposition of a symmetric matrix.
/// Returns eigenvalues and the matrix whose columns are the eigenvectors.
fn symmetric_eigen(m: &Array2<f64>) -> (Array1<f64>, Array2<f64>) {
    let n = m.nrows();
    let mut a = m.clone();
    let mut v = Array2::<f64>::eye(n);

    let scale: f64 = m.iter().map(|x| x * x).sum();

    for _ in 0..MAX_JACOBI_SWEEPS {
        let mut off = 0.0;
        for p in 0..n {
            for q in (p + 1)..n {
                off += a[[p, q]] * a[[p, q]];
            }
        }
        if off <= f64::EPSILON * f64::EPSILON * scale {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[[p, q]];
                if apq == 0.0 {
                    continue;
                }

                let theta = (a[[q, q]] - a[[p, p]]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for k in 0..n {
                    let akp = a[[k, p]];
                    let akq = a[[k, q]];
                    a[[k, p]] = c * akp - s * akq;
                    a[[k, q]] = s * akp + c * akq;
                }
                for k in 0..n {
                    let apk = a[[p, k]];
                    let aqk = a[[q, k]];
                    a[[p, k]] = c * apk - s * aqk;
                    a[[q, k]] = s * apk + c * aqk;
                }
                for k in 0..n {
                    let vkp = v[[k, p]];
                    let vkq = v[[k, q]];
                    v[[k, p]] = c * vkp - s * vkq;
                    v[[k, q]] = s * vkp + c * vkq;
                }
            }
        }
    }

    (a.diag().to_owned(), v)
}

/// Pseudo-inverse solution of the symmetric system Ax = b.
/// Also returns the eigenvectors spanning the numerical null space of A.
fn pseudo_inverse_solve(a: &Array2<f64>, b: &Array1<f64>) -> (Array1<f64>, Vec<Array1<f64>>) {
    let (eigenvalues, vectors) = symmetric_eigen(a);
    let max_eig = eigenvalues.iter().fold(0.0f64, |m, v| m.max(v.abs()));
    let cutoff = EIGEN_RCOND * max_eig;

    // x = V diag(1/λ) V^T b, skipping the null space
    let projected = vectors.t().dot(b);
    let weighted = Array1::from_iter(
        projected
            .iter()
            .zip(eigenvalues.iter())
            .map(|(p, &lambda)| if lambda > cutoff { p / lambda } else { 0.0 }),
    );
    let null_space = eigenvalues
        .iter()
        .enumerate()
        .filter(|&(_, &lambda)| lambda <= cutoff)
        .map(|(k, _)| vectors.column(k).to_owned())
        .collect();

    (vectors.dot(&weighted), null_space)
}

/// Remove from `w` its components along `directions` (Gram-Schmidt projection).
fn remove_components(mut w: Array1<f64>, directions: Vec<Array1<f64>>) -> Array1<f64> {
    let mut basis: Vec<Array1<f64>> = Vec::with_capacity(directions.len());
    for mut d in directions {
        for q in &basis {
            let overlap = q.dot(&d);
            d.scaled_add(-overlap, q);
        }
        let norm = d.dot(&d).sqrt();
        if norm > f64::EPSILON {
            basis.push(d / norm);
        }
    }
    for q in &basis {
        let overlap = q.dot(&w);
        w.scaled_add(-overlap, q);
    }
    w
}

/// Solve least squares via normal equations: (X^T X) w = X^T y.
///
/// Columns are scaled to unit norm first so the rank tolerances do not depend
/// on the units each feature is measured in. Cholesky handles the full-rank
/// case; rank-deficient systems get the minimum-norm solution in the original
/// units.
fn solve_least_squares(x: &Array2<f64>, y: &Array1<f64>) -> (Array1<f64>, bool) {
    let norms = Array1::from_iter(x.columns().into_iter().map(|c| {
        let norm = c.dot(&c).sqrt();
        if norm > 0.0 {
            norm
        } else {
            1.0
        }
    }));
    let x_unit = x / &norms;
    let xtx = x_unit.t().dot(&x_unit);
    let xty = x_unit.t().dot(y);

    if let Some(u) = cholesky_solve(&xtx, &xty) {
        return (u / &norms, true);
    }

    // Null directions of the unit-norm system map back through the same scaling.
    let (u, null_space) = pseudo_inverse_solve(&xtx, &xty);
    let null_space = null_space.into_iter().map(|v| v / &norms).collect();
    (remove_components(u / &norms, null_space), false)
}

/// Linear regression fitted by ordinary least squares, with intercept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    /// Fitted coefficients (weights)
    pub coefficients: Option<Array1<f64>>,
    /// Fitted intercept (bias)
    pub intercept: Option<f64>,
    /// False when the design matrix was rank deficient
    pub full_rank: bool,
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearRegression {
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: None,
            full_rank: true,
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.coefficients.is_some()
    }

    /// Fit the model to training data
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();

        if n_samples != y.len() {
            return Err(TrainerError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(TrainerError::TrainingError(
                "cannot fit on an empty data set".to_string(),
            ));
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(TrainerError::TrainingError(
                "training data contains non-finite values".to_string(),
            ));
        }

        // Centering absorbs the intercept
        let x_mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| TrainerError::TrainingError("empty feature matrix".to_string()))?;
        let y_mean = y.mean().unwrap_or(0.0);
        let x_centered = x - &x_mean;
        let y_centered = y - y_mean;

        let (coefficients, full_rank) = solve_least_squares(&x_centered, &y_centered);
        if coefficients.iter().any(|v| !v.is_finite()) {
            return Err(TrainerError::TrainingError(
                "least squares solution is not finite".to_string(),
            ));
        }

        self.intercept = Some(y_mean - coefficients.dot(&x_mean));
        self.coefficients = Some(coefficients);
        self.full_rank = full_rank;

        Ok(self)
    }

    /// Make predictions
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let coefficients = self.coefficients.as_ref().ok_or(TrainerError::ModelNotFitted)?;
        if x.ncols() != coefficients.len() {
            return Err(TrainerError::ShapeError {
                expected: format!("{} features", coefficients.len()),
                actual: format!("{} features", x.ncols()),
            });
        }

        Ok(x.dot(coefficients) + self.intercept.unwrap_or(0.0))
    }

    /// Get R² score
    pub fn score(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        let y_pred = self.predict(x)?;

        let y_mean = y.mean().unwrap_or(0.0);
        let ss_res = (&y_pred - y).mapv(|v| v * v).sum();
        let ss_tot = y.mapv(|v| (v - y_mean) * (v - y_mean)).sum();

        if ss_tot == 0.0 {
            return Ok(1.0);
        }

        Ok(1.0 - ss_res / ss_tot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_linear_regression_simple() {
        let x = array![
            [1.0, 1.0],
            [2.0, 1.0],
            [1.0, 2.0],
            [2.0, 2.0],
            [3.0, 1.0],
        ];
        // y = 2*x1 + 3*x2 + 1
        let y = array![6.0, 8.0, 9.0, 11.0, 10.0];

        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();

        assert!(model.is_fitted());
        assert!(model.full_rank);

        let coef = model.coefficients.as_ref().unwrap();
        assert!((coef[0] - 2.0).abs() < 1e-9);
        assert!((coef[1] - 3.0).abs() < 1e-9);
        assert!((model.intercept.unwrap() - 1.0).abs() < 1e-9);

        let r2 = model.score(&x, &y).unwrap();
        assert!(r2 > 0.999_999, "R² should be close to 1, got {}", r2);
    }

    #[test]
    fn test_least_squares_with_noise() {
        // y = x + noise; OLS slope = cov(x, y) / var(x)
        let x = array![[0.0], [1.0], [2.0], [3.0]];
        let y = array![0.0, 2.0, 1.0, 3.0];

        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();

        // x̄ = 1.5, ȳ = 1.5, Sxy = 4, Sxx = 5
        let slope = model.coefficients.as_ref().unwrap()[0];
        assert!((slope - 0.8).abs() < 1e-12);
        assert!((model.intercept.unwrap() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_collinear_features_use_minimum_norm() {
        // Second column duplicates the first: any split of the weight fits,
        // the minimum-norm one splits it evenly.
        let x = array![[1.0, 1.0], [2.0, 2.0], [3.0, 3.0], [4.0, 4.0]];
        let y = array![3.0, 5.0, 7.0, 9.0];

        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();

        assert!(!model.full_rank);
        let coef = model.coefficients.as_ref().unwrap();
        assert!((coef[0] - 1.0).abs() < 1e-8);
        assert!((coef[1] - 1.0).abs() < 1e-8);
        assert!((model.intercept.unwrap() - 1.0).abs() < 1e-8);

        let pred = model.predict(&array![[5.0, 5.0]]).unwrap();
        assert!((pred[0] - 11.0).abs() < 1e-8);
    }

    #[test]
    fn test_feature_units_do_not_hide_full_rank() {
        // sq_footage in square inches dwarfs the other columns
        let rows = [
            (3.0, 2.0, 1500.0),
            (4.0, 3.0, 2000.0),
            (2.0, 1.0, 900.0),
            (5.0, 3.0, 2600.0),
            (3.0, 1.0, 1200.0),
            (4.0, 2.0, 1850.0),
        ];
        let x = Array2::from_shape_fn((rows.len(), 3), |(r, c)| match c {
            0 => rows[r].0,
            1 => rows[r].1,
            _ => rows[r].2 * 144.0,
        });
        let y = x
            .rows()
            .into_iter()
            .map(|r| 20000.0 * r[0] + 10000.0 * r[1] + 0.7 * r[2] + 5000.0)
            .collect::<Array1<f64>>();

        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();

        assert!(model.full_rank);
        let coef = model.coefficients.as_ref().unwrap();
        assert!((coef[0] - 20000.0).abs() < 1e-6 * 20000.0, "bedrooms {}", coef[0]);
        assert!((coef[1] - 10000.0).abs() < 1e-6 * 10000.0, "bathrooms {}", coef[1]);
        assert!((coef[2] - 0.7).abs() < 1e-6, "sq_footage {}", coef[2]);

        let pred = model.predict(&x).unwrap();
        for (p, t) in pred.iter().zip(y.iter()) {
            assert!((p - t).abs() < 1e-4, "prediction {} vs target {}", p, t);
        }
    }

    #[test]
    fn test_rank_deficient_solution_is_minimum_norm_in_original_units() {
        // Second column is ten times the first: the minimum-norm weights are
        // proportional to (1, 10) whatever the column scales are.
        let x = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0], [4.0, 40.0]];
        let y = array![2.0, 4.0, 6.0, 8.0];

        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();

        assert!(!model.full_rank);
        let coef = model.coefficients.as_ref().unwrap();
        // 2 = w0 + 10 w1 with w ∝ (1, 10) ⇒ w = (2/101, 20/101)
        assert!((coef[0] - 2.0 / 101.0).abs() < 1e-8, "w0 {}", coef[0]);
        assert!((coef[1] - 20.0 / 101.0).abs() < 1e-8, "w1 {}", coef[1]);
        assert!(model.intercept.unwrap().abs() < 1e-8);
    }

    #[test]
    fn test_constant_column_gets_zero_weight() {
        let x = array![[1.0, 7.0], [2.0, 7.0], [3.0, 7.0], [4.0, 7.0]];
        let y = array![3.0, 5.0, 7.0, 9.0];

        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();

        let coef = model.coefficients.as_ref().unwrap();
        assert!((coef[0] - 2.0).abs() < 1e-9);
        assert!(coef[1].abs() < 1e-12);
        assert!((model.intercept.unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_more_features_than_rows_fits_exactly() {
        let x = array![[3.0, 2.0, 1500.0], [4.0, 3.0, 2000.0], [2.0, 1.0, 900.0]];
        let y = array![300000.0, 400000.0, 180000.0];

        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();

        let pred = model.predict(&x).unwrap();
        for (p, t) in pred.iter().zip(y.iter()) {
            assert!((p - t).abs() < 1e-3, "prediction {} vs target {}", p, t);
        }
    }

    #[test]
    fn test_fit_is_deterministic() {
        let x = array![[1.0, 5.0], [2.0, 3.0], [4.0, 4.0], [6.0, 1.0], [7.0, 9.0]];
        let y = array![2.0, 3.5, 4.0, 8.0, 11.0];

        let mut a = LinearRegression::new();
        let mut b = LinearRegression::new();
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
    }

    #[test]
    fn test_shape_mismatch() {
        let mut model = LinearRegression::new();
        let err = model.fit(&array![[1.0], [2.0]], &array![1.0]).unwrap_err();
        assert!(matches!(err, TrainerError::ShapeError { .. }));
    }

    #[test]
    fn test_empty_data() {
        let mut model = LinearRegression::new();
        let x = Array2::<f64>::zeros((0, 3));
        let y = Array1::<f64>::zeros(0);
        assert!(matches!(
            model.fit(&x, &y),
            Err(TrainerError::TrainingError(_))
        ));
    }

    #[test]
    fn test_predict_before_fit() {
        let model = LinearRegression::new();
        assert!(matches!(
            model.predict(&array![[1.0]]),
            Err(TrainerError::ModelNotFitted)
        ));
    }

    #[test]
    fn test_symmetric_eigen_reconstructs_matrix() {
        let m = array![[4.0, 1.0, 2.0], [1.0, 3.0, 0.5], [2.0, 0.5, 5.0]];
        let (values, vectors) = symmetric_eigen(&m);
        let rebuilt = vectors.dot(&Array2::from_diag(&values)).dot(&vectors.t());
        for (a, b) in m.iter().zip(rebuilt.iter()) {
            assert!((a - b).abs() < 1e-10);
        }
    }
}
