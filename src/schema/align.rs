//! Batch alignment against a target schema

use super::types::TargetSchema;
use crate::error::{Error, Result};
use crate::types::CastMode;
use arrow::array::{new_null_array, Array, ArrayRef};
use arrow::compute::{can_cast_types, cast_with_options, concat_batches, CastOptions};
use arrow::datatypes::DataType;
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use arrow::util::display::FormatOptions;
use std::sync::Arc;

/// Align a batch to the target schema
///
/// The result has exactly the target's columns, in the target's order and
/// with the target's types. Missing columns are filled with nulls, extra
/// columns are dropped.
pub fn align_batch(
    batch: &RecordBatch,
    target: &TargetSchema,
    cast_mode: CastMode,
) -> Result<RecordBatch> {
    let schema = target.arrow_schema();
    let num_rows = batch.num_rows();

    let mut columns: Vec<ArrayRef> = Vec::with_capacity(schema.fields().len());
    for field in schema.fields() {
        let array = match batch.column_by_name(field.name()) {
            Some(source) => cast_column(field.name(), source, field.data_type(), cast_mode)?,
            None => new_null_array(field.data_type(), num_rows),
        };
        columns.push(array);
    }

    let options = RecordBatchOptions::new().with_row_count(Some(num_rows));
    Ok(RecordBatch::try_new_with_options(schema, columns, &options)?)
}

/// Cast one column to `to_type`
///
/// In lossy mode values that cannot be represented become null; in strict
/// mode they fail the cast. Type pairs Arrow cannot cast at all are always
/// an error.
pub fn cast_column(
    name: &str,
    array: &ArrayRef,
    to_type: &DataType,
    cast_mode: CastMode,
) -> Result<ArrayRef> {
    if array.data_type() == to_type {
        return Ok(Arc::clone(array));
    }

    if !can_cast_types(array.data_type(), to_type) {
        return Err(Error::schema(format!(
            "column '{name}' cannot be cast from {} to {to_type}",
            array.data_type()
        )));
    }

    let options = CastOptions {
        safe: cast_mode.is_lossy(),
        format_options: FormatOptions::default(),
    };
    cast_with_options(array.as_ref(), to_type, &options).map_err(|e| {
        Error::schema(format!(
            "column '{name}' failed to cast to {to_type}: {e}"
        ))
    })
}

/// Align several batches and concatenate them
///
/// Batches may come from files with different column sets; each is
/// aligned first, which makes the union by column name.
pub fn concat_aligned(
    batches: &[RecordBatch],
    target: &TargetSchema,
    cast_mode: CastMode,
) -> Result<RecordBatch> {
    let aligned = batches
        .iter()
        .map(|batch| align_batch(batch, target, cast_mode))
        .collect::<Result<Vec<_>>>()?;

    Ok(concat_batches(&target.arrow_schema(), &aligned)?)
}
