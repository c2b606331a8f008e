//! Target schema types

use crate::error::{Error, Result};
use crate::types::ColumnType;
use arrow::datatypes::{Field, Schema, SchemaRef};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// A single column of a table definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name (lower case by convention)
    pub name: String,
    /// Declared type
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

impl ColumnDef {
    /// Create a new column definition
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }

    /// Nullable Arrow field for this column
    pub fn to_field(&self) -> Field {
        Field::new(&self.name, self.column_type.to_arrow(), true)
    }
}

/// Ordered list of columns a batch must be aligned to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSchema {
    columns: Vec<ColumnDef>,
    arrow: SchemaRef,
}

impl TargetSchema {
    /// Build a target schema, rejecting empty or duplicate column names
    pub fn new(columns: Vec<ColumnDef>) -> Result<Self> {
        if columns.is_empty() {
            return Err(Error::schema("target schema has no columns"));
        }

        let mut seen = HashSet::new();
        for column in &columns {
            if column.name.is_empty() {
                return Err(Error::schema("column name cannot be empty"));
            }
            if !seen.insert(column.name.as_str()) {
                return Err(Error::schema(format!(
                    "duplicate column '{}'",
                    column.name
                )));
            }
        }

        let fields: Vec<Field> = columns.iter().map(ColumnDef::to_field).collect();
        Ok(Self {
            arrow: Arc::new(Schema::new(fields)),
            columns,
        })
    }

    /// Shorthand for building a schema from `(name, type)` pairs
    pub fn from_pairs(pairs: &[(&str, ColumnType)]) -> Result<Self> {
        Self::new(
            pairs
                .iter()
                .map(|(name, ty)| ColumnDef::new(*name, *ty))
                .collect(),
        )
    }

    /// Columns in declared order
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Column names in declared order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Whether the schema declares `name`
    pub fn contains(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the schema has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// The Arrow schema every aligned batch carries
    pub fn arrow_schema(&self) -> SchemaRef {
        Arc::clone(&self.arrow)
    }
}
