// src/schema/types.rs

use serde::{Deserialize, Serialize};

/// Semantic type of one declared column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    /// Base-10 integer, stored as `i64`.
    Integer,
    /// Decimal with `,` as separator in the raw text, stored as `f64`.
    Float,
    /// Text kept verbatim, truncated to the given number of characters.
    FixedString(usize),
}

/// A single declared column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
}

impl Column {
    pub const fn int(name: &'static str) -> Self {
        Self {
            name,
            ty: ColumnType::Integer,
        }
    }

    pub const fn float(name: &'static str) -> Self {
        Self {
            name,
            ty: ColumnType::Float,
        }
    }

    pub const fn text(name: &'static str, width: usize) -> Self {
        Self {
            name,
            ty: ColumnType::FixedString(width),
        }
    }
}

/// Ordered list of typed cell columns. The region column is not part of it;
/// it is appended by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Number of typed cell columns (region column excluded).
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Output column names: every declared column followed by `region`.
    pub fn output_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .map(|c| c.name.to_string())
            .chain(std::iter::once(super::REGION_COLUMN.to_string()))
            .collect()
    }

    /// Output column types, region column included.
    pub fn output_types(&self) -> Vec<ColumnType> {
        self.columns
            .iter()
            .map(|c| c.ty)
            .chain(std::iter::once(super::REGION_COLUMN_TYPE))
            .collect()
    }
}
