//! YAML loader for table definitions
//!
//! Resolves a table by name (catalog directory, then built-ins) or by path.

use super::builtin;
use super::types::TableDefinition;
use crate::error::{Error, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Load a table definition
///
/// `name` is either a path to a YAML file or a qualified `<db>.<table>`
/// name. Qualified names are looked up as `<catalog_dir>/<db>/<table>.yaml`
/// first and fall back to the built-in definitions.
///
/// # Examples
///
/// ```ignore
/// // Built-in table
/// let table = load_table(None, "bronze_db.nyc_taxi_data_yellow")?;
///
/// // Table from a catalog directory
/// let table = load_table(Some(Path::new("catalog")), "bronze_db.my_table")?;
/// ```
pub fn load_table(catalog_dir: Option<&Path>, name: &str) -> Result<TableDefinition> {
    if name.ends_with(".yaml") || name.ends_with(".yml") {
        return load_table_file(Path::new(name));
    }

    if let (Some(dir), Some((db, table))) = (catalog_dir, name.split_once('.')) {
        let path = dir.join(db).join(format!("{table}.yaml"));
        if path.exists() {
            debug!("Loading table {name} from {}", path.display());
            return load_table_file(&path);
        }
    }

    if let Some(yaml) = builtin::get_builtin(name) {
        debug!("Using built-in definition for table {name}");
        return load_table_from_str(yaml);
    }

    Err(Error::table(
        name,
        format!(
            "not found. Built-in tables: {}. Or provide --catalog-dir or a path to a YAML file.",
            builtin::list_builtin().join(", ")
        ),
    ))
}

fn load_table_file(path: &Path) -> Result<TableDefinition> {
    let content = fs::read_to_string(path).map_err(|e| {
        Error::config(format!(
            "Failed to read table file '{}': {e}",
            path.display()
        ))
    })?;
    load_table_from_str(&content)
}

/// Load a table definition from a YAML string
pub fn load_table_from_str(yaml: &str) -> Result<TableDefinition> {
    let def: TableDefinition = serde_yaml::from_str(yaml)
        .map_err(|e| Error::config(format!("Failed to parse table YAML: {e}")))?;

    validate_table(&def)?;
    Ok(def)
}

/// Validate a table definition
fn validate_table(def: &TableDefinition) -> Result<()> {
    if def.name.is_empty() {
        return Err(Error::config("Table name cannot be empty"));
    }

    if def.columns.is_empty() {
        return Err(Error::table(&def.name, "must declare at least one column"));
    }

    let mut names = HashSet::new();
    for column in &def.columns {
        if column.name.is_empty() {
            return Err(Error::table(&def.name, "column name cannot be empty"));
        }
        if column.name != column.name.to_lowercase() {
            return Err(Error::table(
                &def.name,
                format!("column '{}' must be lower case", column.name),
            ));
        }
        if !names.insert(column.name.as_str()) {
            return Err(Error::table(
                &def.name,
                format!("duplicate column '{}'", column.name),
            ));
        }
    }

    if !names.contains(def.partition_column.as_str()) {
        return Err(Error::table(
            &def.name,
            format!(
                "partition column '{}' is not a declared column",
                def.partition_column
            ),
        ));
    }

    if let Some(ingestion) = &def.ingestion_column {
        if !names.contains(ingestion.as_str()) {
            return Err(Error::table(
                &def.name,
                format!("ingestion column '{ingestion}' is not a declared column"),
            ));
        }
    }

    Ok(())
}
