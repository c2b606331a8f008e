//! Row-level derivations of the silver trip table

use crate::error::Result;
use crate::schema::{
    align_batch, cast_column, rename_columns, with_array_column, with_literal_column,
    with_timestamp_column, TargetSchema,
};
use crate::types::CastMode;
use arrow::array::{new_null_array, Array, ArrayRef, Int64Array, StringArray};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Fallback vendor name
pub const UNKNOWN_VENDOR: &str = "FORNECEDOR NÃO IDENTIFICADO";

/// Fallback payment description
pub const UNKNOWN_PAYMENT: &str = "TIPO DE PAGAMENTO NÃO IDENTIFICADO";

/// Payment type of a cancelled trip
const PAYMENT_CANCELLED: i64 = 6;

/// Payment type of a trip without charge
const PAYMENT_NO_CHARGE: i64 = 3;

/// Taxi service a bronze table belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceType {
    /// Yellow cabs, `tpep_*` timestamps
    Yellow,
    /// Green cabs, `lpep_*` timestamps
    Green,
}

impl ServiceType {
    /// Value of the `tipo_servico` column
    pub fn label(self) -> &'static str {
        match self {
            ServiceType::Yellow => "YELLOW",
            ServiceType::Green => "GREEN",
        }
    }

    fn timestamp_prefix(self) -> &'static str {
        match self {
            ServiceType::Yellow => "tpep",
            ServiceType::Green => "lpep",
        }
    }

    /// Bronze to silver column names
    pub fn column_mapping(self) -> BTreeMap<String, String> {
        let prefix = self.timestamp_prefix();
        [
            ("vendorid".to_string(), "id_fornecedor"),
            ("passenger_count".to_string(), "quantidade_passageiros"),
            ("total_amount".to_string(), "valor_corrida"),
            (format!("{prefix}_pickup_datetime"), "data_hora_embarque"),
            (format!("{prefix}_dropoff_datetime"), "data_hora_desembarque"),
            ("payment_type".to_string(), "id_tipo_pagamento"),
        ]
        .into_iter()
        .map(|(from, to)| (from, to.to_string()))
        .collect()
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Vendor name for a vendor id
pub fn vendor_name(id: Option<i64>) -> &'static str {
    match id {
        Some(1) => "Creative Mobile Technologies, LLC",
        Some(2) => "Curb Mobility, LLC",
        Some(6) => "Myle Technologies Inc",
        Some(7) => "Helix",
        _ => UNKNOWN_VENDOR,
    }
}

/// Description of a payment type
pub fn payment_description(id: Option<i64>) -> &'static str {
    match id {
        Some(0) => "Viagem com tarifa flexível",
        Some(1) => "Cartão de crédito",
        Some(2) => "Dinheiro",
        Some(3) => "Sem cobrança",
        Some(4) => "Contestação",
        Some(5) => "Desconhecido",
        Some(6) => "Viagem cancelada",
        _ => UNKNOWN_PAYMENT,
    }
}

fn indicator(flag: bool) -> &'static str {
    if flag {
        "S"
    } else {
        "N"
    }
}

/// Project a bronze batch onto the silver table
///
/// Every row gets a fresh UUID and `created_at` as its creation time. The
/// result is aligned to `target`.
pub fn to_silver(
    batch: &RecordBatch,
    service: ServiceType,
    created_at: DateTime<Utc>,
    target: &TargetSchema,
    cast_mode: CastMode,
) -> Result<RecordBatch> {
    let rows = batch.num_rows();
    let mut silver = rename_columns(batch, &service.column_mapping())?;

    let vendors = int_column(&silver, "id_fornecedor")?;
    let payments = int_column(&silver, "id_tipo_pagamento")?;

    let vendor_names: StringArray = vendors.iter().map(|id| Some(vendor_name(id))).collect();
    let descriptions: StringArray = payments
        .iter()
        .map(|id| Some(payment_description(id)))
        .collect();
    let cancelled: StringArray = payments
        .iter()
        .map(|id| Some(indicator(id == Some(PAYMENT_CANCELLED))))
        .collect();
    let no_charge: StringArray = payments
        .iter()
        .map(|id| Some(indicator(id == Some(PAYMENT_NO_CHARGE))))
        .collect();
    let ids: StringArray = (0..rows)
        .map(|_| Some(Uuid::new_v4().to_string()))
        .collect();

    silver = with_array_column(&silver, "id", Arc::new(ids))?;
    silver = with_array_column(&silver, "nome_fornecedor", Arc::new(vendor_names))?;
    silver = with_array_column(&silver, "descricao_tipo_pagamento", Arc::new(descriptions))?;
    silver = with_array_column(&silver, "indicador_cancelamento", Arc::new(cancelled))?;
    silver = with_array_column(&silver, "indicador_viagem_sem_cobranca", Arc::new(no_charge))?;
    silver = with_literal_column(&silver, "tipo_servico", service.label())?;
    silver = with_timestamp_column(&silver, "data_hora_criacao_registro", created_at)?;

    align_batch(&silver, target, cast_mode)
}

/// Integer view of a column; all null when the column is absent
fn int_column(batch: &RecordBatch, name: &str) -> Result<Int64Array> {
    let array: ArrayRef = match batch.column_by_name(name) {
        Some(column) => cast_column(name, column, &DataType::Int64, CastMode::Lossy)?,
        None => new_null_array(&DataType::Int64, batch.num_rows()),
    };
    Ok(Int64Array::from(array.to_data()))
}
