use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Dense row-major matrix, the storage format of the dataset artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "MatrixParts<T>",
    bound(deserialize = "T: Deserialize<'de>")
)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

/// Unchecked wire form; becomes a [`Matrix`] only if the shape matches.
#[derive(Deserialize)]
struct MatrixParts<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T> TryFrom<MatrixParts<T>> for Matrix<T> {
    type Error = String;

    fn try_from(parts: MatrixParts<T>) -> Result<Self, Self::Error> {
        let MatrixParts { rows, cols, data } = parts;
        let len = data.len();
        Matrix::from_row_major(rows, cols, data)
            .ok_or_else(|| format!("{rows}x{cols} matrix has {len} elements"))
    }
}

impl<T: Copy + Default> Matrix<T> {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Matrix {
            rows,
            cols,
            data: vec![T::default(); rows * cols],
        }
    }

    pub fn square(n: usize) -> Self {
        Self::zeros(n, n)
    }

    pub fn get(&self, i: usize, j: usize) -> T {
        self.data[i * self.cols + j]
    }

    pub fn set(&mut self, i: usize, j: usize, value: T) {
        self.data[i * self.cols + j] = value;
    }

    /// Row `i` as a slice.
    pub fn row(&self, i: usize) -> &[T] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }
}

impl<T> Matrix<T> {
    /// Build from row-major data; `None` if the length does not match.
    pub fn from_row_major(rows: usize, cols: usize, data: Vec<T>) -> Option<Self> {
        (data.len() == rows * cols).then_some(Matrix { rows, cols, data })
    }

    pub fn nrows(&self) -> usize {
        self.rows
    }

    pub fn ncols(&self) -> usize {
        self.cols
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl Matrix<u8> {
    /// Number of non-zero entries.
    pub fn count_nonzero(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    pub fn to_dmatrix(&self) -> DMatrix<f64> {
        DMatrix::from_fn(self.rows, self.cols, |i, j| self.get(i, j) as f64)
    }
}

impl From<&DMatrix<f64>> for Matrix<f64> {
    fn from(m: &DMatrix<f64>) -> Self {
        let (rows, cols) = m.shape();
        let mut out = Matrix::zeros(rows, cols);
        for i in 0..rows {
            for j in 0..cols {
                out.set(i, j, m[(i, j)]);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_major_layout() {
        let m = Matrix::from_row_major(2, 3, vec![1u8, 0, 1, 0, 1, 1]).unwrap();
        assert_eq!(m.row(1), &[0, 1, 1]);
        assert_eq!(m.get(0, 2), 1);
        assert_eq!(m.count_nonzero(), 4);
        assert!(!m.is_square());
        assert!(Matrix::from_row_major(2, 2, vec![0u8; 3]).is_none());
    }

    #[test]
    fn from_nalgebra_keeps_orientation() {
        let d = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let m = Matrix::from(&d);
        assert_eq!(m.as_slice(), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(m.get(1, 0), 3.0);
    }

    #[test]
    fn deserialize_checks_shape() {
        let ok: Matrix<u8> =
            serde_json::from_str(r#"{"rows":1,"cols":2,"data":[0,1]}"#).unwrap();
        assert_eq!(ok.row(0), &[0, 1]);

        let err = serde_json::from_str::<Matrix<u8>>(r#"{"rows":2,"cols":2,"data":[0]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("2x2 matrix has 1 elements"));
    }
}
