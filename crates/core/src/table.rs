use serde::{Deserialize, Serialize};

use crate::error::BillingError;

/// Rows returned by a generated query, every cell as nullable text
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl ResultTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Stringify the rows as a list of tuples, e.g. `[('Smith', 3), (None,)]`.
    ///
    /// An empty result renders as an empty string. This is the text the
    /// second prompt sees and the length the format policy measures.
    pub fn render(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        let rows: Vec<String> = self
            .rows
            .iter()
            .map(|row| {
                let cells: Vec<String> = row.iter().map(|cell| render_cell(cell.as_deref())).collect();
                if cells.len() == 1 {
                    format!("({},)", cells[0])
                } else {
                    format!("({})", cells.join(", "))
                }
            })
            .collect();

        format!("[{}]", rows.join(", "))
    }

    /// Export as CSV with a leading zero-based index column.
    ///
    /// The header starts with an empty cell above the index, NULL cells are empty.
    pub fn to_csv(&self) -> Result<String, BillingError> {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        let mut header = Vec::with_capacity(self.columns.len() + 1);
        header.push("");
        header.extend(self.columns.iter().map(String::as_str));
        writer.write_record(&header)?;

        for (index, row) in self.rows.iter().enumerate() {
            let mut record = Vec::with_capacity(row.len() + 1);
            record.push(index.to_string());
            record.extend(row.iter().map(|cell| cell.clone().unwrap_or_default()));
            writer.write_record(&record)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| BillingError::Internal(format!("CSV flush failed: {}", e)))?;
        Ok(String::from_utf8(bytes)?)
    }
}

fn render_cell(cell: Option<&str>) -> String {
    match cell {
        None => "None".to_string(),
        Some(text) if looks_numeric(text) => text.to_string(),
        Some(text) => format!("'{}'", text.replace('\\', "\\\\").replace('\'', "\\'")),
    }
}

/// Cells arrive as text without their column type, so numbers are recognized
/// by shape. A number printed by the database never has a leading zero before
/// another digit, so text like a `01234` zip code stays quoted. A text column
/// holding `1234` still renders bare.
fn looks_numeric(text: &str) -> bool {
    let unsigned = text.strip_prefix(['-', '+']).unwrap_or(text);
    let mut leading = unsigned.bytes();
    if leading.next() == Some(b'0') && leading.next().is_some_and(|b| b.is_ascii_digit()) {
        return false;
    }

    !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E'))
        && text.parse::<f64>().is_ok()
}
