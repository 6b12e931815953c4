use crate::error::ParseError;

/// One decoded CSV row: a mapping from column index to cell text.
/// Cell access trims whitespace and treats blank cells as absent, which is
/// what every downstream marker/extractor check wants.
#[derive(Debug, Clone, Default)]
pub struct Row {
    cells: Vec<String>,
}

impl Row {
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    /// Trimmed cell at `idx`, or None when the column is absent or blank.
    pub fn cell(&self, idx: usize) -> Option<&str> {
        let trimmed = self.cells.get(idx)?.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }

    /// Iterate (column index, trimmed non-blank cell) pairs.
    pub fn cells(&self) -> impl Iterator<Item = (usize, &str)> {
        self.cells.iter().enumerate().filter_map(|(idx, cell)| {
            let trimmed = cell.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some((idx, trimmed))
            }
        })
    }

    /// Uppercased comma-joined row text, the form the keyword matchers scan.
    pub fn joined_upper(&self) -> String {
        self.cells.join(",").to_uppercase()
    }
}

/// The whole input materialized as an ordered sequence of rows. No streaming:
/// one parse invocation loads everything up front and works on slices.
#[derive(Debug, Clone)]
pub struct RowGrid {
    rows: Vec<Row>,
}

impl RowGrid {
    /// Decode CSV text into a row grid. Ragged rows are accepted (human
    /// templates rarely pad trailing columns); blank lines and `#` comment
    /// lines are skipped.
    pub fn from_csv(content: &str) -> Result<Self, ParseError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .comment(Some(b'#'))
            .from_reader(content.as_bytes());

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(Row::new(record.iter().map(str::to_string).collect()));
        }
        Ok(Self { rows })
    }

    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, idx: usize) -> Option<&Row> {
        self.rows.get(idx)
    }

    /// Sub-grid covering `start..end` (clamped to the grid bounds).
    pub fn slice(&self, start: usize, end: usize) -> Self {
        let end = end.min(self.rows.len());
        let start = start.min(end);
        Self {
            rows: self.rows.get(start..end).unwrap_or_default().to_vec(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn loads_rows_and_trims_cells() {
        let grid = RowGrid::from_csv("a, b ,\nc,,d\n").unwrap();
        assert_eq!(grid.len(), 2);
        let first = grid.row(0).unwrap();
        assert_eq!(first.cell(0), Some("a"));
        assert_eq!(first.cell(1), Some("b"));
        assert_eq!(first.cell(2), None);
        assert_eq!(grid.row(1).unwrap().cell(1), None);
    }

    #[test]
    fn skips_blank_and_comment_lines() {
        let grid = RowGrid::from_csv("a,b\n\n# note to self\nc,d\n").unwrap();
        assert_eq!(grid.len(), 2);
        assert_eq!(grid.row(1).unwrap().cell(0), Some("c"));
    }

    #[test]
    fn tolerates_ragged_rows() {
        let grid = RowGrid::from_csv("a,b,c\nd\n").unwrap();
        assert_eq!(grid.len(), 2);
        assert_eq!(grid.row(1).unwrap().cell(2), None);
    }

    #[test]
    fn joined_upper_spans_all_cells() {
        let grid = RowGrid::from_csv("x,Scene Setting,y\n").unwrap();
        assert!(grid.row(0).unwrap().joined_upper().contains("SCENE SETTING"));
    }

    #[test]
    fn slice_clamps_to_bounds() {
        let grid = RowGrid::from_csv("a\nb\nc\n").unwrap();
        assert_eq!(grid.slice(1, 10).len(), 2);
        assert_eq!(grid.slice(5, 10).len(), 0);
    }
}
