use std::collections::{HashMap, HashSet};

use crate::data::model::Record;

use super::matrix::Matrix;
use super::partition::Partition;

// ---------------------------------------------------------------------------
// EndpointIndex – source id → targets, built once per run
// ---------------------------------------------------------------------------

/// Outgoing relationships grouped by source identifier.
///
/// Targets are deduplicated per source and kept in first-seen order.
#[derive(Debug, Default)]
pub struct EndpointIndex<'a> {
    targets: HashMap<&'a str, Vec<&'a str>>,
}

impl<'a> EndpointIndex<'a> {
    pub fn build(records: &'a [Record]) -> Self {
        let mut targets: HashMap<&'a str, Vec<&'a str>> = HashMap::new();
        let mut seen: HashSet<(&'a str, &'a str)> = HashSet::with_capacity(records.len());
        for r in records {
            let edge = (r.source.as_str(), r.target.as_str());
            if seen.insert(edge) {
                targets.entry(edge.0).or_default().push(edge.1);
            }
        }
        EndpointIndex { targets }
    }

    /// Targets of `source`, empty if it never appears as a source.
    pub fn targets_of(&self, source: &str) -> &[&'a str] {
        self.targets.get(source).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct sources.
    pub fn source_count(&self) -> usize {
        self.targets.len()
    }
}

// ---------------------------------------------------------------------------
// Adjacency construction
// ---------------------------------------------------------------------------

/// Directed binary adjacency of `partition`: `(i, j) = 1` iff some record
/// goes from member `i` to member `j`. Relationships leaving the partition
/// are ignored; self-loops land on the diagonal.
pub fn build_adjacency(partition: &Partition, index: &EndpointIndex<'_>) -> Matrix<u8> {
    let nodes = &partition.nodes;
    let mut adj = Matrix::square(nodes.len());

    for (i, source) in nodes.ids().iter().enumerate() {
        for target in index.targets_of(source) {
            if let Some(j) = nodes.index_of(target) {
                adj.set(i, j, 1);
            }
        }
    }

    adj
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::partition::NodeIndex;

    fn partition(ids: &[&str]) -> Partition {
        Partition {
            index: 0,
            nodes: NodeIndex::new(ids.iter().map(|s| s.to_string()).collect()),
        }
    }

    /// Full scan of every record, the straightforward definition.
    fn scan_adjacency(partition: &Partition, records: &[Record]) -> Matrix<u8> {
        let mut adj = Matrix::square(partition.len());
        for r in records {
            if let (Some(i), Some(j)) = (
                partition.nodes.index_of(&r.source),
                partition.nodes.index_of(&r.target),
            ) {
                adj.set(i, j, 1);
            }
        }
        adj
    }

    #[test]
    fn directed_and_idempotent() {
        let records = vec![
            Record::new("A", "B"),
            Record::new("A", "B"),
            Record::new("C", "A"),
        ];
        let index = EndpointIndex::build(&records);
        assert_eq!(index.targets_of("A"), &["B"]);

        let adj = build_adjacency(&partition(&["A", "B", "C"]), &index);
        assert_eq!(adj.row(0), &[0, 1, 0]);
        assert_eq!(adj.row(1), &[0, 0, 0]);
        assert_eq!(adj.row(2), &[1, 0, 0]);
    }

    #[test]
    fn self_loop_sets_one_diagonal_entry() {
        let records = vec![Record::new("B", "B"), Record::new("A", "C")];
        let index = EndpointIndex::build(&records);
        let adj = build_adjacency(&partition(&["A", "B", "C"]), &index);

        let diagonal: Vec<u8> = (0..3).map(|i| adj.get(i, i)).collect();
        assert_eq!(diagonal, vec![0, 1, 0]);
        assert_eq!(adj.row(1), &[0, 1, 0]);
        assert_eq!(adj.count_nonzero(), 2);
    }

    #[test]
    fn cross_partition_records_are_ignored() {
        let records = vec![Record::new("A", "X"), Record::new("X", "B")];
        let index = EndpointIndex::build(&records);
        let adj = build_adjacency(&partition(&["A", "B"]), &index);
        assert_eq!(adj.count_nonzero(), 0);
    }

    #[test]
    fn index_matches_full_scan() {
        let ids: Vec<String> = (0..12).map(|i| format!("e{i:02}")).collect();
        let records: Vec<Record> = (0..60)
            .map(|k| Record::new(ids[(k * 7) % 12].clone(), ids[(k * 5 + 3) % 12].clone()))
            .collect();
        let index = EndpointIndex::build(&records);

        for chunk in ids.chunks(4) {
            let part = Partition {
                index: 0,
                nodes: NodeIndex::new(chunk.to_vec()),
            };
            assert_eq!(build_adjacency(&part, &index), scan_adjacency(&part, &records));
        }
    }

    #[test]
    fn hub_source_with_repeated_targets() {
        let targets: Vec<String> = (0..2000).map(|i| format!("t{i:04}")).collect();
        let mut records: Vec<Record> = Vec::new();
        for round in 0..3 {
            for (k, t) in targets.iter().enumerate() {
                if round == 0 || k % 3 == 0 {
                    records.push(Record::new("hub", t.clone()));
                }
            }
        }
        records.push(Record::new("hub", "hub"));
        let index = EndpointIndex::build(&records);

        // first-seen order, one entry per distinct target
        let got = index.targets_of("hub");
        assert_eq!(got.len(), targets.len() + 1);
        assert_eq!(got[0], "t0000");
        assert_eq!(got[targets.len()], "hub");
        assert_eq!(index.source_count(), 1);

        let mut members = vec!["hub".to_string()];
        members.extend(targets.iter().step_by(50).cloned());
        let part = Partition {
            index: 0,
            nodes: NodeIndex::new(members),
        };
        let adj = build_adjacency(&part, &index);
        assert_eq!(adj, scan_adjacency(&part, &records));
        assert_eq!(adj.count_nonzero(), part.len());
    }
}
