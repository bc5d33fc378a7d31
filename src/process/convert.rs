use tracing::debug;

use crate::dataset::{ColumnData, RegionDataset};
use crate::process::RawRecord;
use crate::schema::{ColumnType, Schema};

/// Stored in place of an integer cell that does not parse.
pub const SENTINEL: i64 = -9999;
/// Stored in place of a float cell that does not parse.
pub const FLOAT_SENTINEL: f64 = -9999.0;

pub fn coerce_integer(raw: &str) -> i64 {
    raw.trim().parse().unwrap_or(SENTINEL)
}

/// Raw floats use `,` as decimal separator.
pub fn coerce_float(raw: &str) -> f64 {
    raw.trim().replace(',', ".").parse().unwrap_or(FLOAT_SENTINEL)
}

/// Keep at most `width` characters of `raw`.
pub fn coerce_fixed(raw: &str, width: usize) -> String {
    match raw.char_indices().nth(width) {
        Some((cut, _)) => raw[..cut].to_string(),
        None => raw.to_string(),
    }
}

/// Typed accumulator for one column. A missing cell (short row) is treated
/// as malformed.
enum ColumnBuilder {
    Integer(Vec<i64>),
    Float(Vec<f64>),
    Text { width: usize, values: Vec<String> },
}

impl ColumnBuilder {
    fn new(ty: ColumnType, capacity: usize) -> Self {
        match ty {
            ColumnType::Integer => ColumnBuilder::Integer(Vec::with_capacity(capacity)),
            ColumnType::Float => ColumnBuilder::Float(Vec::with_capacity(capacity)),
            ColumnType::FixedString(width) => ColumnBuilder::Text {
                width,
                values: Vec::with_capacity(capacity),
            },
        }
    }

    fn push(&mut self, raw: Option<&str>) {
        match self {
            ColumnBuilder::Integer(v) => v.push(raw.map_or(SENTINEL, coerce_integer)),
            ColumnBuilder::Float(v) => v.push(raw.map_or(FLOAT_SENTINEL, coerce_float)),
            ColumnBuilder::Text { width, values } => {
                values.push(raw.map(|s| coerce_fixed(s, *width)).unwrap_or_default())
            }
        }
    }

    fn finish(self) -> ColumnData {
        match self {
            ColumnBuilder::Integer(v) => ColumnData::Integer(v),
            ColumnBuilder::Float(v) => ColumnData::Float(v),
            ColumnBuilder::Text { values, .. } => ColumnData::Text(values),
        }
    }
}

/// Coerce `rows` into one typed column per schema column and append the
/// constant region column. Never fails: malformed cells become sentinels.
#[tracing::instrument(level = "debug", skip(rows, schema), fields(rows = rows.len()))]
pub fn parse_records(rows: &[RawRecord], schema: &Schema, region: &str) -> RegionDataset {
    let mut builders: Vec<ColumnBuilder> = schema
        .columns()
        .iter()
        .map(|col| ColumnBuilder::new(col.ty, rows.len()))
        .collect();

    let mut ragged = 0usize;
    for row in rows {
        if row.len() < schema.len() {
            ragged += 1;
        }
        for (idx, builder) in builders.iter_mut().enumerate() {
            builder.push(row.get(idx).map(String::as_str));
        }
    }
    if ragged > 0 {
        debug!(ragged, "rows shorter than the schema");
    }

    let mut columns: Vec<ColumnData> = builders.into_iter().map(ColumnBuilder::finish).collect();
    columns.push(ColumnData::Text(vec![region.to_string(); rows.len()]));

    RegionDataset {
        region: region.to_string(),
        columns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Column, REGION_COLUMN_TYPE};

    fn small_schema() -> Schema {
        Schema::new(vec![
            Column::int("id"),
            Column::float("x"),
            Column::text("label", 4),
        ])
    }

    fn row(cells: &[&str]) -> RawRecord {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn integer_coercion() {
        assert_eq!(coerce_integer("42"), 42);
        assert_eq!(coerce_integer(" -7 "), -7);
        assert_eq!(coerce_integer("abc"), SENTINEL);
        assert_eq!(coerce_integer(""), SENTINEL);
        assert_eq!(coerce_integer("1.0"), SENTINEL);
    }

    #[test]
    fn float_coercion_uses_comma_separator() {
        assert_eq!(coerce_float("1,5"), 1.5);
        assert_eq!(coerce_float("-1128312,25"), -1128312.25);
        assert_eq!(coerce_float("x,y"), FLOAT_SENTINEL);
        assert_eq!(coerce_float(""), FLOAT_SENTINEL);
    }

    #[test]
    fn fixed_strings_truncate_by_characters() {
        assert_eq!(coerce_fixed("abc", 4), "abc");
        assert_eq!(coerce_fixed("Žďárek", 4), "Žďár");
        assert_eq!(coerce_fixed("", 4), "");
    }

    #[test]
    fn parses_typed_columns_and_appends_region() {
        let rows = vec![row(&["1", "1,5", "a"]), row(&["abc", "x,y", "longer"])];
        let ds = parse_records(&rows, &small_schema(), "JHM");

        assert_eq!(ds.num_columns(), 4);
        assert_eq!(ds.columns[0].as_integers(), Some(&[1, SENTINEL][..]));
        assert_eq!(ds.columns[1].as_floats(), Some(&[1.5, FLOAT_SENTINEL][..]));
        assert_eq!(
            ds.columns[2].as_texts(),
            Some(&["a".to_string(), "long".to_string()][..])
        );
        assert_eq!(
            ds.columns[3].as_texts(),
            Some(&["JHM".to_string(), "JHM".to_string()][..])
        );
    }

    #[test]
    fn column_lengths_hold_for_malformed_and_ragged_rows() {
        let schema = small_schema();
        let rows = vec![
            row(&["?", "?", "?"]),
            row(&["?"]),
            row(&[]),
            row(&["1", "2", "3", "surplus"]),
        ];
        let ds = parse_records(&rows, &schema, "PHA");

        let types = schema.output_types();
        assert_eq!(types.last(), Some(&REGION_COLUMN_TYPE));
        assert!(ds.validate(&types).is_ok());
        assert!(ds.columns.iter().all(|c| c.len() == rows.len()));
        assert_eq!(
            ds.columns[0].as_integers(),
            Some(&[SENTINEL, SENTINEL, SENTINEL, 1][..])
        );
    }

    #[test]
    fn empty_input_yields_empty_columns() {
        let ds = parse_records(&[], &small_schema(), "PHA");
        assert_eq!(ds.num_columns(), 4);
        assert_eq!(ds.num_rows(), 0);
    }
}
