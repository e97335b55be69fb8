//! Graph Laplacian and its eigen-decomposition.
//!
//! `L = D − A` where `D` holds the out-degrees (row sums of `A`). Because
//! `A` is directed, `L` is generally not symmetric. The decomposition always
//! goes through `nalgebra::SymmetricEigen`, which reads only the lower
//! triangle and the diagonal of its input; [`SpectrumPolicy`] decides what
//! that input is.

use nalgebra::{DMatrix, SymmetricEigen};

use super::matrix::Matrix;
use crate::error::{PipelineError, PipelineResult};

/// QR sweeps allowed per row before the solver gives up.
const SWEEPS_PER_ROW: usize = 1000;

/// What the symmetric eigensolver is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpectrumPolicy {
    /// `L` as is; the upper triangle is ignored by the solver.
    LowerTriangle,
    /// `(L + Lᵀ) / 2`.
    Symmetrize,
}

impl SpectrumPolicy {
    pub fn from_flag(symmetrize: bool) -> Self {
        if symmetrize {
            SpectrumPolicy::Symmetrize
        } else {
            SpectrumPolicy::LowerTriangle
        }
    }
}

/// Ascending eigenvalues with eigenvectors as aligned columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    pub eigenvalues: Vec<f64>,
    pub eigenvectors: Matrix<f64>,
}

/// `D − A` for a square 0/1 adjacency matrix.
pub fn laplacian(adjacency: &Matrix<u8>) -> DMatrix<f64> {
    let a = adjacency.to_dmatrix();
    let degrees = a.column_sum();
    DMatrix::from_diagonal(&degrees) - a
}

/// Laplacian spectrum of one partition's adjacency matrix.
///
/// `partition` is only used to label errors.
pub fn laplacian_spectrum(
    adjacency: &Matrix<u8>,
    policy: SpectrumPolicy,
    partition: usize,
) -> PipelineResult<Spectrum> {
    let n = adjacency.nrows();
    if n == 0 {
        return Err(PipelineError::computation(partition, 0, "empty adjacency matrix"));
    }
    if !adjacency.is_square() {
        return Err(PipelineError::computation(
            partition,
            n,
            format!("adjacency matrix is {}x{}", n, adjacency.ncols()),
        ));
    }

    let mut lap = laplacian(adjacency);
    if policy == SpectrumPolicy::Symmetrize {
        lap = (&lap + lap.transpose()) * 0.5;
    }

    decompose(lap, SWEEPS_PER_ROW * n, partition)
}

/// Sorted eigen-decomposition of `lap`, failing after `max_niter` sweeps.
fn decompose(lap: DMatrix<f64>, max_niter: usize, partition: usize) -> PipelineResult<Spectrum> {
    let n = lap.nrows();
    let eigen = SymmetricEigen::try_new(lap, f64::EPSILON, max_niter).ok_or_else(|| {
        PipelineError::computation(
            partition,
            n,
            format!("eigensolver did not converge in {max_niter} iterations"),
        )
    })?;

    if eigen.eigenvalues.iter().any(|v| !v.is_finite())
        || eigen.eigenvectors.iter().any(|v| !v.is_finite())
    {
        return Err(PipelineError::computation(
            partition,
            n,
            "non-finite value in eigen-decomposition",
        ));
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]));

    let eigenvalues = order.iter().map(|&k| eigen.eigenvalues[k]).collect();
    let eigenvectors = eigen.eigenvectors.select_columns(order.iter());

    Ok(Spectrum {
        eigenvalues,
        eigenvectors: Matrix::from(&eigenvectors),
    })
}
