//! Column-level helpers applied to raw batches before alignment

use super::align::cast_column;
use crate::error::Result;
use crate::types::CastMode;
use arrow::array::{Array, ArrayRef, StringArray, TimestampMicrosecondArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Lower-case every column name
pub fn lowercase_columns(batch: &RecordBatch) -> Result<RecordBatch> {
    rename_with(batch, |name| Some(name.to_lowercase()))
}

/// Rename columns found in `renames`; other columns keep their name
pub fn rename_columns(
    batch: &RecordBatch,
    renames: &BTreeMap<String, String>,
) -> Result<RecordBatch> {
    if renames.is_empty() {
        return Ok(batch.clone());
    }
    rename_with(batch, |name| renames.get(name).cloned())
}

/// Cast every column to a string
///
/// Used for heterogeneous sources whose files disagree on column types;
/// the declared types are applied later by alignment.
pub fn stringify_columns(batch: &RecordBatch) -> Result<RecordBatch> {
    let schema = batch.schema();
    let mut fields = Vec::with_capacity(schema.fields().len());
    let mut columns = Vec::with_capacity(schema.fields().len());

    for (field, column) in schema.fields().iter().zip(batch.columns()) {
        columns.push(cast_column(
            field.name(),
            column,
            &DataType::Utf8,
            CastMode::Lossy,
        )?);
        fields.push(Field::new(field.name(), DataType::Utf8, true));
    }

    build(batch, fields, columns)
}

/// Set a column to the same string value on every row
///
/// An existing column of that name is replaced in place.
pub fn with_literal_column(batch: &RecordBatch, name: &str, value: &str) -> Result<RecordBatch> {
    let array: ArrayRef = Arc::new(StringArray::from(vec![value; batch.num_rows()]));
    with_column(batch, Field::new(name, DataType::Utf8, true), array)
}

/// Set a timestamp column to `at` on every row
pub fn with_timestamp_column(
    batch: &RecordBatch,
    name: &str,
    at: DateTime<Utc>,
) -> Result<RecordBatch> {
    let micros = at.timestamp_micros();
    let array: ArrayRef = Arc::new(TimestampMicrosecondArray::from(vec![
        micros;
        batch.num_rows()
    ]));
    let field = Field::new(name, array.data_type().clone(), true);
    with_column(batch, field, array)
}

/// Set a column to `array`, replacing an existing column of that name
pub fn with_array_column(batch: &RecordBatch, name: &str, array: ArrayRef) -> Result<RecordBatch> {
    let field = Field::new(name, array.data_type().clone(), true);
    with_column(batch, field, array)
}

fn with_column(batch: &RecordBatch, field: Field, array: ArrayRef) -> Result<RecordBatch> {
    let schema = batch.schema();
    let mut fields: Vec<Field> = schema.fields().iter().map(|f| f.as_ref().clone()).collect();
    let mut columns = batch.columns().to_vec();

    match schema.index_of(field.name()) {
        Ok(idx) => {
            fields[idx] = field;
            columns[idx] = array;
        }
        Err(_) => {
            fields.push(field);
            columns.push(array);
        }
    }

    build(batch, fields, columns)
}

fn rename_with<F>(batch: &RecordBatch, rename: F) -> Result<RecordBatch>
where
    F: Fn(&str) -> Option<String>,
{
    let schema = batch.schema();
    let fields: Vec<Field> = schema
        .fields()
        .iter()
        .map(|field| match rename(field.name()) {
            Some(new_name) => field.as_ref().clone().with_name(new_name),
            None => field.as_ref().clone(),
        })
        .collect();

    build(batch, fields, batch.columns().to_vec())
}

fn build(source: &RecordBatch, fields: Vec<Field>, columns: Vec<ArrayRef>) -> Result<RecordBatch> {
    let schema = Schema::new_with_metadata(fields, source.schema().metadata().clone());
    let options = RecordBatchOptions::new().with_row_count(Some(source.num_rows()));
    Ok(RecordBatch::try_new_with_options(
        Arc::new(schema),
        columns,
        &options,
    )?)
}
