//! The dataset artifact: per-partition matrices and spectra plus global
//! summary scalars, consumed by the downstream graph model.
//!
//! Field order is part of the format and must not change:
//!
//! ```text
//! 0 adjacency_matrices   Vec<Matrix<u8>>   square, entries in {0, 1}
//! 1 eigenvalues          Vec<Vec<f64>>     ascending, one per node
//! 2 eigenvectors         Vec<Matrix<f64>>  column k pairs with eigenvalue k
//! 3 num_nodes_list       Vec<usize>        size of each adjacency matrix
//! 4 max_eigenvalue       f64               over all partitions (0 if none)
//! 5 min_eigenvalue       f64               over all partitions (0 if none)
//! 6 reserved             bool              always false
//! 7 max_num_nodes        usize             max of num_nodes_list (0 if none)
//! ```

use std::fmt::Display;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::{PipelineError, PipelineResult};
use crate::graph::matrix::Matrix;
use crate::graph::PartitionSpectrum;

/// Serialized aggregate of every retained partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub adjacency_matrices: Vec<Matrix<u8>>,
    pub eigenvalues: Vec<Vec<f64>>,
    pub eigenvectors: Vec<Matrix<f64>>,
    pub num_nodes_list: Vec<usize>,
    pub max_eigenvalue: f64,
    pub min_eigenvalue: f64,
    pub reserved: bool,
    pub max_num_nodes: usize,
}

/// Sizes the downstream model reads from the artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelDims {
    pub num_nodes: usize,
    pub feature_dim: usize,
}

/// On-disk encodings, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Json,
    Bincode,
}

impl ArtifactFormat {
    pub fn from_path(path: &Path) -> PipelineResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "json" => Ok(ArtifactFormat::Json),
            "bin" | "bincode" => Ok(ArtifactFormat::Bincode),
            other => Err(PipelineError::serialize(
                path,
                format!("unsupported artifact extension: .{other}"),
            )),
        }
    }
}

impl Dataset {
    /// Aggregate per-partition results, keeping their order.
    pub fn from_partitions(parts: Vec<PartitionSpectrum>) -> Self {
        let n = parts.len();
        let mut adjacency_matrices = Vec::with_capacity(n);
        let mut eigenvalues = Vec::with_capacity(n);
        let mut eigenvectors = Vec::with_capacity(n);
        let mut num_nodes_list = Vec::with_capacity(n);

        for part in parts {
            num_nodes_list.push(part.num_nodes());
            adjacency_matrices.push(part.adjacency);
            eigenvalues.push(part.eigenvalues);
            eigenvectors.push(part.eigenvectors);
        }

        let all = eigenvalues.iter().flatten().copied();
        let max_eigenvalue = all.clone().reduce(f64::max).unwrap_or(0.0);
        let min_eigenvalue = all.reduce(f64::min).unwrap_or(0.0);
        let max_num_nodes = num_nodes_list.iter().copied().max().unwrap_or(0);

        if n == 0 {
            warn!("no partition retained; writing an empty dataset");
        }

        Dataset {
            adjacency_matrices,
            eigenvalues,
            eigenvectors,
            num_nodes_list,
            max_eigenvalue,
            min_eigenvalue,
            reserved: false,
            max_num_nodes,
        }
    }

    /// Number of partitions in the artifact.
    pub fn len(&self) -> usize {
        self.adjacency_matrices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency_matrices.is_empty()
    }

    /// Node count and feature width for sizing the downstream model; both
    /// are the size of the largest partition.
    pub fn model_dims(&self) -> ModelDims {
        ModelDims {
            num_nodes: self.max_num_nodes,
            feature_dim: self.max_num_nodes,
        }
    }

    /// Check the alignment and shape invariants of the four sequences.
    pub fn validate(&self) -> Result<(), String> {
        let n = self.adjacency_matrices.len();
        if self.eigenvalues.len() != n
            || self.eigenvectors.len() != n
            || self.num_nodes_list.len() != n
        {
            return Err(format!(
                "sequence lengths differ: {} adjacency, {} eigenvalue, {} eigenvector, {} node counts",
                n,
                self.eigenvalues.len(),
                self.eigenvectors.len(),
                self.num_nodes_list.len()
            ));
        }

        for (i, adj) in self.adjacency_matrices.iter().enumerate() {
            let nodes = self.num_nodes_list[i];
            if !adj.is_square() || adj.nrows() != nodes {
                return Err(format!(
                    "partition {i}: adjacency is {}x{} but node count is {nodes}",
                    adj.nrows(),
                    adj.ncols()
                ));
            }
            if adj.as_slice().iter().any(|&v| v > 1) {
                return Err(format!("partition {i}: adjacency entry outside {{0, 1}}"));
            }
            let vals = &self.eigenvalues[i];
            if vals.len() != nodes {
                return Err(format!(
                    "partition {i}: {} eigenvalues for {nodes} nodes",
                    vals.len()
                ));
            }
            if vals.windows(2).any(|w| w[0] > w[1]) {
                return Err(format!("partition {i}: eigenvalues not ascending"));
            }
            if vals
                .iter()
                .any(|&v| v > self.max_eigenvalue || v < self.min_eigenvalue)
            {
                return Err(format!("partition {i}: eigenvalue outside global bounds"));
            }
            let vecs = &self.eigenvectors[i];
            if vecs.nrows() != nodes || vecs.ncols() != nodes {
                return Err(format!(
                    "partition {i}: eigenvectors are {}x{} for {nodes} nodes",
                    vecs.nrows(),
                    vecs.ncols()
                ));
            }
        }

        if self.max_num_nodes != self.num_nodes_list.iter().copied().max().unwrap_or(0) {
            return Err("max_num_nodes does not match node counts".to_string());
        }
        if self.reserved {
            return Err("reserved flag is set".to_string());
        }
        Ok(())
    }

    /// Write the artifact; the encoding follows the file extension.
    pub fn save(&self, path: &Path) -> PipelineResult<()> {
        let format = ArtifactFormat::from_path(path)?;
        let err = |e: &dyn Display| PipelineError::serialize(path, e.to_string());

        // Written next to the target and renamed over it once complete.
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| err(&e))?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            match format {
                ArtifactFormat::Json => {
                    serde_json::to_writer(&mut writer, self).map_err(|e| err(&e))?
                }
                ArtifactFormat::Bincode => {
                    bincode::serde::encode_into_std_write(
                        self,
                        &mut writer,
                        bincode::config::standard(),
                    )
                    .map_err(|e| err(&e))?;
                }
            }
            writer.flush().map_err(|e| err(&e))?;
        }
        tmp.persist(path).map_err(|e| err(&e))?;

        info!(
            "wrote {} partitions to {} ({format:?})",
            self.len(),
            path.display()
        );
        Ok(())
    }

    /// Read an artifact back and check its invariants.
    pub fn load(path: &Path) -> PipelineResult<Self> {
        let format = ArtifactFormat::from_path(path)?;
        let err = |e: &dyn Display| PipelineError::serialize(path, e.to_string());

        let file = File::open(path).map_err(|e| err(&e))?;
        let mut reader = BufReader::new(file);
        let dataset: Dataset = match format {
            ArtifactFormat::Json => serde_json::from_reader(reader).map_err(|e| err(&e))?,
            ArtifactFormat::Bincode => {
                bincode::serde::decode_from_std_read(&mut reader, bincode::config::standard())
                    .map_err(|e| err(&e))?
            }
        };
        dataset.validate().map_err(|e| err(&e))?;
        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(index: usize, n: usize, eigenvalues: Vec<f64>) -> PartitionSpectrum {
        let mut adjacency = Matrix::square(n);
        if n > 1 {
            adjacency.set(0, 1, 1);
        }
        let mut eigenvectors = Matrix::square(n);
        for i in 0..n {
            eigenvectors.set(i, i, 1.0);
        }
        PartitionSpectrum {
            index,
            adjacency,
            eigenvalues,
            eigenvectors,
        }
    }

    fn sample() -> Dataset {
        Dataset::from_partitions(vec![
            part(0, 3, vec![-0.25, 0.0, 1.0 / 3.0]),
            part(1, 2, vec![0.0, 2.5]),
            part(2, 4, vec![0.0, 0.1, 0.2, 0.30000000000000004]),
        ])
    }

    #[test]
    fn aggregates_keep_order_and_bounds() {
        let ds = sample();
        assert_eq!(ds.num_nodes_list, vec![3, 2, 4]);
        assert_eq!(ds.max_num_nodes, 4);
        assert_eq!(ds.max_eigenvalue, 2.5);
        assert_eq!(ds.min_eigenvalue, -0.25);
        assert!(!ds.reserved);
        assert_eq!(ds.eigenvalues[1], vec![0.0, 2.5]);
        assert_eq!(
            ds.model_dims(),
            ModelDims {
                num_nodes: 4,
                feature_dim: 4
            }
        );
        ds.validate().unwrap();
    }

    #[test]
    fn empty_dataset() {
        let ds = Dataset::from_partitions(Vec::new());
        assert!(ds.is_empty());
        assert!(ds.eigenvalues.is_empty());
        assert!(ds.eigenvectors.is_empty());
        assert!(ds.num_nodes_list.is_empty());
        assert_eq!(ds.max_num_nodes, 0);
        assert_eq!(ds.max_eigenvalue, 0.0);
        assert_eq!(ds.min_eigenvalue, 0.0);
        ds.validate().unwrap();
    }

    #[test]
    fn json_round_trip_is_exact() {
        let ds = sample();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.json");
        ds.save(&path).unwrap();
        assert_eq!(Dataset::load(&path).unwrap(), ds);
    }

    #[test]
    fn bincode_round_trip_is_exact() {
        let ds = sample();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.bin");
        ds.save(&path).unwrap();
        assert_eq!(Dataset::load(&path).unwrap(), ds);
    }

    #[test]
    fn json_field_order_is_fixed() {
        let text = serde_json::to_string(&Dataset::from_partitions(Vec::new())).unwrap();
        let fields = [
            "adjacency_matrices",
            "eigenvalues",
            "eigenvectors",
            "num_nodes_list",
            "max_eigenvalue",
            "min_eigenvalue",
            "reserved",
            "max_num_nodes",
        ];
        let positions: Vec<usize> = fields.iter().map(|f| text.find(f).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{text}");
    }

    #[test]
    fn unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let err = sample().save(&dir.path().join("dataset.pt")).unwrap_err();
        assert!(matches!(err, PipelineError::Serialize { .. }));
    }

    #[test]
    fn load_rejects_misaligned_artifact() {
        let mut ds = sample();
        ds.num_nodes_list.pop();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        ds.save(&path).unwrap();
        assert!(matches!(
            Dataset::load(&path),
            Err(PipelineError::Serialize { .. })
        ));
    }

    #[test]
    fn save_leaves_only_the_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.json");
        sample().save(&path).unwrap();
        Dataset::from_partitions(Vec::new()).save(&path).unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("dataset.json")]);
        assert!(Dataset::load(&path).unwrap().is_empty());
    }

    #[test]
    fn load_rejects_truncated_matrix() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("truncated.json");
        std::fs::write(
            &path,
            r#"{"adjacency_matrices":[{"rows":2,"cols":2,"data":[0]}],
               "eigenvalues":[[0.0,0.0]],
               "eigenvectors":[{"rows":2,"cols":2,"data":[1.0,0.0,0.0,1.0]}],
               "num_nodes_list":[2],
               "max_eigenvalue":0.0,
               "min_eigenvalue":0.0,
               "reserved":false,
               "max_num_nodes":2}"#,
        )
        .unwrap();
        match Dataset::load(&path) {
            Err(PipelineError::Serialize { message, .. }) => {
                assert!(message.contains("2x2 matrix has 1 elements"), "{message}")
            }
            other => panic!("expected a serialize error, got {other:?}"),
        }
    }
}
