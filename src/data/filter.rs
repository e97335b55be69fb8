use log::{debug, warn};

use super::model::{Record, RelationTable};
use crate::config::PipelineConfig;

// ---------------------------------------------------------------------------
// Raw rows: what a loader extracts before any filtering
// ---------------------------------------------------------------------------

/// The two relevant cells of one input row. `None` means the cell was
/// absent or null at the format level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub entity: Option<String>,
    pub counterparty: Option<String>,
}

impl RawRow {
    pub fn new(entity: Option<String>, counterparty: Option<String>) -> Self {
        RawRow {
            entity,
            counterparty,
        }
    }
}

// ---------------------------------------------------------------------------
// Missing-value filter
// ---------------------------------------------------------------------------

/// Keep a cell only when it is present and not one of the NA tokens.
/// Present values are returned verbatim (no trimming).
fn present(cell: Option<String>, cfg: &PipelineConfig) -> Option<String> {
    cell.filter(|v| !cfg.is_na(v))
}

/// Drop every row whose entity or counterparty is missing and build the
/// [`RelationTable`] from what remains, preserving row order.
pub fn retain_complete<I>(rows: I, cfg: &PipelineConfig) -> RelationTable
where
    I: IntoIterator<Item = RawRow>,
{
    let mut records = Vec::new();
    let mut rows_read = 0usize;

    for (row_no, row) in rows.into_iter().enumerate() {
        rows_read += 1;
        match (present(row.entity, cfg), present(row.counterparty, cfg)) {
            (Some(source), Some(target)) => records.push(Record { source, target }),
            _ => debug!("row {row_no}: missing entity or counterparty, dropped"),
        }
    }

    let rows_dropped = rows_read - records.len();
    if rows_dropped > 0 {
        warn!(
            "dropped {rows_dropped} of {rows_read} rows with a missing '{}' or '{}' value",
            cfg.entity_column, cfg.counterparty_column
        );
    }

    RelationTable {
        records,
        rows_read,
        rows_dropped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(e: Option<&str>, c: Option<&str>) -> RawRow {
        RawRow::new(e.map(String::from), c.map(String::from))
    }

    #[test]
    fn drops_rows_with_either_field_missing() {
        let cfg = PipelineConfig::default();
        let table = retain_complete(
            vec![
                row(Some("A"), Some("B")),
                row(None, Some("B")),
                row(Some("A"), None),
                row(Some(""), Some("C")),
                row(Some("C"), Some("NaN")),
                row(Some("C"), Some("A")),
            ],
            &cfg,
        );
        assert_eq!(table.rows_read, 6);
        assert_eq!(table.rows_dropped, 4);
        assert_eq!(
            table.records,
            vec![Record::new("A", "B"), Record::new("C", "A")]
        );
    }

    #[test]
    fn keeps_values_verbatim() {
        let cfg = PipelineConfig::default();
        let table = retain_complete(vec![row(Some(" A "), Some("b"))], &cfg);
        assert_eq!(table.records[0].source, " A ");
        assert_eq!(table.records[0].target, "b");
    }

    #[test]
    fn custom_na_tokens() {
        let cfg = PipelineConfig {
            na_values: vec!["-".to_string()],
            ..Default::default()
        };
        let table = retain_complete(
            vec![row(Some("-"), Some("B")), row(Some("NaN"), Some("B"))],
            &cfg,
        );
        assert_eq!(table.records, vec![Record::new("NaN", "B")]);
    }
}
