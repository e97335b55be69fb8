use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// Record – one row of the relationship table
// ---------------------------------------------------------------------------

/// A directed relationship: `source` (entity) → `target` (counterparty).
/// Both identifiers are opaque strings taken verbatim from the input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    pub source: String,
    pub target: String,
}

impl Record {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Record {
            source: source.into(),
            target: target.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// RelationTable – the loaded, filtered input
// ---------------------------------------------------------------------------

/// The relationship table after missing-value filtering.
#[derive(Debug, Clone, Default)]
pub struct RelationTable {
    /// Complete rows, in file order.
    pub records: Vec<Record>,
    /// Rows read from the file, before filtering.
    pub rows_read: usize,
    /// Rows dropped because either field was missing.
    pub rows_dropped: usize,
}

impl RelationTable {
    /// Number of retained records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no record survived filtering.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every distinct identifier appearing as source or target.
    pub fn node_universe(&self) -> NodeUniverse {
        NodeUniverse::from_records(&self.records)
    }
}

// ---------------------------------------------------------------------------
// NodeUniverse – sorted distinct identifiers
// ---------------------------------------------------------------------------

/// The distinct entity identifiers of a record set, sorted lexicographically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeUniverse {
    nodes: Vec<String>,
}

impl NodeUniverse {
    pub fn from_records(records: &[Record]) -> Self {
        let set: BTreeSet<&str> = records
            .iter()
            .flat_map(|r| [r.source.as_str(), r.target.as_str()])
            .collect();
        NodeUniverse {
            nodes: set.into_iter().map(str::to_string).collect(),
        }
    }

    /// Build from arbitrary identifiers; duplicates are removed and order is sorted.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = ids.into_iter().map(Into::into).collect();
        NodeUniverse {
            nodes: set.into_iter().collect(),
        }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn universe_is_sorted_and_distinct() {
        let records = vec![
            Record::new("delta", "alpha"),
            Record::new("alpha", "charlie"),
            Record::new("bravo", "bravo"),
        ];
        let universe = NodeUniverse::from_records(&records);
        assert_eq!(universe.as_slice(), ["alpha", "bravo", "charlie", "delta"]);
    }
}
