//! Sort configuration.

use super::TableRow;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Active sort column and direction. No key means insertion order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortConfig {
    pub key: Option<&'static str>,
    pub direction: SortDirection,
}

impl SortConfig {
    /// Same key while ascending flips to descending; anything else starts
    /// ascending on `key`.
    pub fn toggled(self, key: &'static str) -> Self {
        let direction = if self.key == Some(key) && self.direction == SortDirection::Ascending {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        Self {
            key: Some(key),
            direction,
        }
    }

    /// Indices of `rows` in display order. Stable: equal values keep their
    /// original relative order in both directions.
    pub fn order<R: TableRow>(&self, rows: &[R]) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..rows.len()).collect();
        let Some(key) = self.key else {
            return indices;
        };

        let values: Vec<_> = rows.iter().map(|row| row.field(key)).collect();
        indices.sort_by(|&a, &b| {
            let ordering = values[a].compare(&values[b]);
            match self.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
        indices
    }
}
