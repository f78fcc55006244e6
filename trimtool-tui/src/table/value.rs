//! Raw cell values and row identity.

use std::cmp::Ordering;
use std::fmt;

/// A raw field value, as used for sorting and default cell text.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    /// Ordering used by column sorting.
    ///
    /// Numbers compare numerically (integers and floats together), text
    /// lexicographically, `false` before `true`. Values of different kinds
    /// order by kind: null, bool, number, text. Always a total order.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Null, Self::Null) => Ordering::Equal,
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (a, b) => match (a.as_number(), b.as_number()) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                _ => a.rank().cmp(&b.rank()),
            },
        }
    }

    /// Identity text, or `None` when the value would not identify a row
    /// (null, empty, zero, false).
    pub fn key_text(&self) -> Option<String> {
        match self {
            Self::Null | Self::Bool(false) | Self::Int(0) => None,
            Self::Float(f) if *f == 0.0 || f.is_nan() => None,
            Self::Text(s) if s.is_empty() => None,
            other => Some(other.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Int(_) | Self::Float(_) => 2,
            Self::Text(_) => 3,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(n) => write!(f, "{}", n),
            Self::Float(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for CellValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

/// A record that can be shown in a [`TabularView`](super::TabularView).
pub trait TableRow {
    /// The raw value of a named field; [`CellValue::Null`] for unknown keys.
    fn field(&self, key: &str) -> CellValue;
}

/// Stable identity of a rendered row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RowKey {
    Id(String),
    AdId(String),
    /// Position within the current page.
    Index(usize),
}

/// Row identity: `id`, else `ad_id`, else the row's position on the page.
pub fn row_key<R: TableRow + ?Sized>(row: &R, index: usize) -> RowKey {
    if let Some(id) = row.field("id").key_text() {
        RowKey::Id(id)
    } else if let Some(ad_id) = row.field("ad_id").key_text() {
        RowKey::AdId(ad_id)
    } else {
        RowKey::Index(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_compare_across_kinds() {
        assert_eq!(CellValue::Int(2).compare(&CellValue::Float(1.5)), Ordering::Greater);
        assert_eq!(CellValue::Float(0.5).compare(&CellValue::Int(1)), Ordering::Less);
        assert_eq!(CellValue::Int(3).compare(&CellValue::Int(3)), Ordering::Equal);
    }

    #[test]
    fn test_mixed_kinds_order_by_rank() {
        assert_eq!(CellValue::Null.compare(&CellValue::from("a")), Ordering::Less);
        assert_eq!(CellValue::from("2019").compare(&CellValue::Int(2020)), Ordering::Greater);
        assert_eq!(CellValue::Bool(true).compare(&CellValue::Null), Ordering::Greater);
    }

    #[test]
    fn test_text_is_lexicographic() {
        assert_eq!(CellValue::from("B").compare(&CellValue::from("a")), Ordering::Less);
        assert_eq!(CellValue::from("10").compare(&CellValue::from("9")), Ordering::Less);
    }

    #[test]
    fn test_key_text_skips_falsy_values() {
        assert_eq!(CellValue::Null.key_text(), None);
        assert_eq!(CellValue::from("").key_text(), None);
        assert_eq!(CellValue::Int(0).key_text(), None);
        assert_eq!(CellValue::Int(7).key_text().as_deref(), Some("7"));
        assert_eq!(CellValue::from("ad-1").key_text().as_deref(), Some("ad-1"));
    }

    #[test]
    fn test_display_of_null_is_blank() {
        assert_eq!(CellValue::Null.to_string(), "");
        assert_eq!(CellValue::from(Some(0.93)).to_string(), "0.93");
        assert_eq!(CellValue::from(None::<i64>), CellValue::Null);
    }
}
