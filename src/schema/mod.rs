pub mod regions;
pub mod types;

pub use regions::{entry_name, region_codes, REGIONS};
pub use types::{Column, ColumnType, Schema};

/// Name of the column appended after parsing.
pub const REGION_COLUMN: &str = "region";

/// Width of every text column, region included.
pub const TEXT_WIDTH: usize = 64;

pub const REGION_COLUMN_TYPE: ColumnType = ColumnType::FixedString(TEXT_WIDTH);

/// Positional layout of the accident CSV files.
pub const ACCIDENT_COLUMNS: &[Column] = &[
    Column::int("p1"),
    Column::int("p36"),
    Column::int("p37"),
    Column::text("p2a", TEXT_WIDTH),
    Column::int("weekday(p2a)"),
    Column::int("p2b"),
    Column::int("p6"),
    Column::int("p7"),
    Column::int("p8"),
    Column::int("p9"),
    Column::int("p10"),
    Column::int("p11"),
    Column::int("p12"),
    Column::int("p13a"),
    Column::int("p13b"),
    Column::int("p13c"),
    Column::int("p14"),
    Column::int("p15"),
    Column::int("p16"),
    Column::int("p17"),
    Column::int("p18"),
    Column::int("p19"),
    Column::int("p20"),
    Column::int("p21"),
    Column::int("p22"),
    Column::int("p23"),
    Column::int("p24"),
    Column::int("p27"),
    Column::int("p28"),
    Column::int("p34"),
    Column::int("p35"),
    Column::int("p39"),
    Column::int("p44"),
    Column::int("p45a"),
    Column::text("p47", TEXT_WIDTH),
    Column::int("p48a"),
    Column::int("p49"),
    Column::int("p50a"),
    Column::int("p50b"),
    Column::int("p51"),
    Column::int("p52"),
    Column::int("p53"),
    Column::int("p55a"),
    Column::int("p57"),
    Column::int("p58"),
    Column::float("a"),
    Column::float("b"),
    Column::float("d"),
    Column::float("e"),
    Column::float("f"),
    Column::float("g"),
    Column::text("h", TEXT_WIDTH),
    Column::text("i", TEXT_WIDTH),
    Column::text("j", TEXT_WIDTH),
    Column::text("k", TEXT_WIDTH),
    Column::text("l", TEXT_WIDTH),
    Column::text("n", TEXT_WIDTH),
    Column::float("o"),
    Column::text("p", TEXT_WIDTH),
    Column::text("q", TEXT_WIDTH),
    Column::text("r", TEXT_WIDTH),
    Column::int("s"),
    Column::text("t", TEXT_WIDTH),
    Column::int("p5a"),
];

impl Schema {
    /// The accident record layout shared by every region and year.
    pub fn accidents() -> Self {
        Schema::new(ACCIDENT_COLUMNS.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accident_schema_has_65_output_columns() {
        let schema = Schema::accidents();
        assert_eq!(schema.len(), 64);

        let names = schema.output_names();
        assert_eq!(names.len(), 65);
        assert_eq!(names.first().map(String::as_str), Some("p1"));
        assert_eq!(names.last().map(String::as_str), Some(REGION_COLUMN));
        assert_eq!(schema.output_types().len(), names.len());
    }

    #[test]
    fn column_names_are_unique() {
        let mut names = Schema::accidents().output_names();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 65);
    }
}
