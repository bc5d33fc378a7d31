// src/export.rs

use arrow::{
    array::{ArrayRef, Float64Array, Int64Array, StringArray},
    datatypes::{DataType, Field, Schema as ArrowSchema},
    record_batch::RecordBatch,
};
use parquet::{
    arrow::ArrowWriter, basic::Compression, file::properties::WriterProperties,
};
use std::{fs::File, path::Path, sync::Arc};
use tracing::info;

use crate::dataset::{AggregatedDataset, ColumnData};
use crate::error::{PipelineError, Result};

fn arrow_type(col: &ColumnData) -> DataType {
    match col {
        ColumnData::Integer(_) => DataType::Int64,
        ColumnData::Float(_) => DataType::Float64,
        ColumnData::Text(_) => DataType::Utf8,
    }
}

fn to_array(col: &ColumnData) -> ArrayRef {
    match col {
        ColumnData::Integer(v) => Arc::new(Int64Array::from(v.clone())),
        ColumnData::Float(v) => Arc::new(Float64Array::from(v.clone())),
        ColumnData::Text(v) => Arc::new(StringArray::from_iter_values(v.iter())),
    }
}

/// Build one record batch holding every row of `data`.
pub fn to_record_batch(data: &AggregatedDataset) -> Result<RecordBatch> {
    let fields: Vec<Field> = data
        .names
        .iter()
        .zip(&data.columns)
        .map(|(name, col)| Field::new(name, arrow_type(col), false))
        .collect();
    let arrays: Vec<ArrayRef> = data.columns.iter().map(to_array).collect();

    RecordBatch::try_new(Arc::new(ArrowSchema::new(fields)), arrays)
        .map_err(|e| PipelineError::Export(format!("building record batch: {}", e)))
}

/// Write `data` as a Snappy-compressed Parquet file at `path`.
pub fn write_parquet(data: &AggregatedDataset, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let batch = to_record_batch(data)?;
    let export_err = |what: &str, e: &dyn std::fmt::Display| {
        PipelineError::Export(format!("{} {}: {}", what, path.display(), e))
    };

    let file = File::create(path).map_err(|e| export_err("creating", &e))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))
        .map_err(|e| export_err("opening writer for", &e))?;
    writer.write(&batch).map_err(|e| export_err("writing", &e))?;
    writer.close().map_err(|e| export_err("closing", &e))?;

    info!(path = %path.display(), rows = batch.num_rows(), "wrote parquet export");
    Ok(())
}
