//! Table definition types

use crate::error::{Error, Result};
use crate::partition::DEFAULT_PARTITION_KEY;
use crate::schema::{ColumnDef, TargetSchema};
use crate::storage::join_key;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A catalog table: where it lives and what its rows look like
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableDefinition {
    /// Qualified name, `<db>.<table>`
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: Option<String>,

    /// Storage URL of the table root; derived from the warehouse when unset
    #[serde(default)]
    pub location: Option<String>,

    /// Hive partition column
    #[serde(default = "default_partition_column")]
    pub partition_column: String,

    /// Column stamped with the processing time on ingestion
    #[serde(default)]
    pub ingestion_column: Option<String>,

    /// Source column renames applied after lower-casing
    #[serde(default)]
    pub column_renames: BTreeMap<String, String>,

    /// Columns in table order
    pub columns: Vec<ColumnDef>,
}

fn default_partition_column() -> String {
    DEFAULT_PARTITION_KEY.to_string()
}

impl TableDefinition {
    /// Database part of the name
    pub fn database(&self) -> &str {
        self.name.split_once('.').map_or("default", |(db, _)| db)
    }

    /// Table part of the name
    pub fn table_name(&self) -> &str {
        self.name
            .split_once('.')
            .map_or(self.name.as_str(), |(_, table)| table)
    }

    /// Target schema used for alignment
    pub fn schema(&self) -> Result<TargetSchema> {
        TargetSchema::new(self.columns.clone())
            .map_err(|e| Error::table(&self.name, e.to_string()))
    }

    /// Resolve the storage location of the table
    ///
    /// An explicit `location` wins; otherwise `<warehouse>/<db>/<table>`.
    pub fn resolve_location(&self, warehouse: Option<&str>) -> Result<String> {
        if let Some(location) = &self.location {
            return Ok(location.clone());
        }

        let warehouse = warehouse.ok_or_else(|| {
            Error::table(
                &self.name,
                "table has no location and no warehouse was given (use --warehouse)",
            )
        })?;
        let root = warehouse.trim_end_matches('/');
        Ok(format!(
            "{root}/{}",
            join_key(self.database(), self.table_name())
        ))
    }

    /// Set an explicit location
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}
