use crate::model::Candidate;
use crate::{Error, Result};

/// The editable landmark table. Rows are addressed by position since names
/// may repeat.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionStore {
    rows: Vec<Candidate>,
}

impl SelectionStore {
    pub fn new(rows: Vec<Candidate>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Candidate] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn toggle_include(&mut self, row: usize, value: bool) -> Result<()> {
        let len = self.rows.len();
        let candidate = self
            .rows
            .get_mut(row)
            .ok_or(Error::RowOutOfRange { row, len })?;
        candidate.include = value;
        Ok(())
    }

    /// Included rows in table order.
    pub fn selected(&self) -> Vec<Candidate> {
        self.rows.iter().filter(|c| c.include).cloned().collect()
    }

    pub fn selected_count(&self) -> usize {
        self.rows.iter().filter(|c| c.include).count()
    }
}
