// src/dataset.rs

use serde::{Deserialize, Serialize};

use crate::schema::ColumnType;

/// One homogeneous column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnData {
    Integer(Vec<i64>),
    Float(Vec<f64>),
    Text(Vec<String>),
}

impl ColumnData {
    pub fn empty(ty: ColumnType) -> Self {
        match ty {
            ColumnType::Integer => ColumnData::Integer(Vec::new()),
            ColumnType::Float => ColumnData::Float(Vec::new()),
            ColumnType::FixedString(_) => ColumnData::Text(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::Integer(v) => v.len(),
            ColumnData::Float(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether this column can hold values of `ty`.
    pub fn matches(&self, ty: ColumnType) -> bool {
        matches!(
            (self, ty),
            (ColumnData::Integer(_), ColumnType::Integer)
                | (ColumnData::Float(_), ColumnType::Float)
                | (ColumnData::Text(_), ColumnType::FixedString(_))
        )
    }

    /// Append `other` to the end of `self`. Returns `false` (and leaves
    /// `self` untouched) when the two columns hold different types.
    pub fn extend_from(&mut self, other: &ColumnData) -> bool {
        match (self, other) {
            (ColumnData::Integer(a), ColumnData::Integer(b)) => a.extend_from_slice(b),
            (ColumnData::Float(a), ColumnData::Float(b)) => a.extend_from_slice(b),
            (ColumnData::Text(a), ColumnData::Text(b)) => a.extend_from_slice(b),
            _ => return false,
        }
        true
    }

    pub fn as_integers(&self) -> Option<&[i64]> {
        match self {
            ColumnData::Integer(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_floats(&self) -> Option<&[f64]> {
        match self {
            ColumnData::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_texts(&self) -> Option<&[String]> {
        match self {
            ColumnData::Text(v) => Some(v),
            _ => None,
        }
    }
}

/// Parsed records of one region: one column per schema column plus the
/// trailing region column, all of the same length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionDataset {
    pub region: String,
    pub columns: Vec<ColumnData>,
}

impl RegionDataset {
    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, ColumnData::len)
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Check the dataset against the expected output column types.
    /// Returns a description of the first violation found.
    pub fn validate(&self, types: &[ColumnType]) -> Result<(), String> {
        if self.columns.len() != types.len() {
            return Err(format!(
                "expected {} columns, found {}",
                types.len(),
                self.columns.len()
            ));
        }
        let rows = self.num_rows();
        for (idx, (col, ty)) in self.columns.iter().zip(types).enumerate() {
            if !col.matches(*ty) {
                return Err(format!("column {} is not of type {:?}", idx, ty));
            }
            if col.len() != rows {
                return Err(format!(
                    "column {} has {} rows, column 0 has {}",
                    idx,
                    col.len(),
                    rows
                ));
            }
        }
        match self.columns.last().and_then(ColumnData::as_texts) {
            Some(regions) if regions.iter().all(|r| *r == self.region) => Ok(()),
            _ => Err(format!("region column does not hold `{}`", self.region)),
        }
    }
}

/// Column-wise concatenation of several regions, in request order.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedDataset {
    pub names: Vec<String>,
    pub columns: Vec<ColumnData>,
}

impl AggregatedDataset {
    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, ColumnData::len)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnData> {
        self.names
            .iter()
            .position(|n| n == name)
            .and_then(|idx| self.columns.get(idx))
    }

    /// The `(column names, column arrays)` pair handed to downstream consumers.
    pub fn into_parts(self) -> (Vec<String>, Vec<ColumnData>) {
        (self.names, self.columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(region: &str, ids: Vec<i64>) -> RegionDataset {
        let n = ids.len();
        RegionDataset {
            region: region.to_string(),
            columns: vec![
                ColumnData::Integer(ids),
                ColumnData::Text(vec![region.to_string(); n]),
            ],
        }
    }

    #[test]
    fn extend_rejects_mismatched_types() {
        let mut ints = ColumnData::Integer(vec![1]);
        assert!(!ints.extend_from(&ColumnData::Float(vec![2.0])));
        assert_eq!(ints, ColumnData::Integer(vec![1]));
        assert!(ints.extend_from(&ColumnData::Integer(vec![2, 3])));
        assert_eq!(ints.as_integers(), Some(&[1, 2, 3][..]));
    }

    #[test]
    fn validate_detects_ragged_columns() {
        let types = [ColumnType::Integer, ColumnType::FixedString(64)];
        let ok = sample("PHA", vec![1, 2]);
        assert!(ok.validate(&types).is_ok());

        let mut ragged = ok.clone();
        ragged.columns[0] = ColumnData::Integer(vec![1]);
        assert!(ragged.validate(&types).is_err());

        let mut retyped = ok.clone();
        retyped.columns[0] = ColumnData::Float(vec![1.0, 2.0]);
        assert!(retyped.validate(&types).is_err());

        let mut relabelled = ok;
        relabelled.region = "STC".into();
        assert!(relabelled.validate(&types).is_err());
    }
}
