//! Upload and table browsing.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use tabula::store::{ImportSummary, Row, TableImport, TableInfo};
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::response::ApiResponse;
use crate::state::AppState;

const DEFAULT_DATA_LIMIT: u32 = 100;
const MAX_DATA_LIMIT: u32 = 1000;

/// Rows of one table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableData {
    /// The table read.
    pub table_name: String,
    /// Rows in insertion order.
    pub data: Vec<Row>,
    /// Number of rows returned.
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub(super) struct DataQuery {
    limit: Option<u32>,
}

pub(super) async fn upload(
    State(state): State<AppState>,
    body: Result<Json<TableImport>, JsonRejection>,
) -> AppResult<ApiResponse<ImportSummary>> {
    let Json(upload) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let summary = state.store.import_table(upload).await?;
    info!(
        table = %summary.table_name,
        rows = summary.rows_inserted,
        "Stored upload"
    );
    Ok(ApiResponse::ok(summary, "File uploaded and stored successfully"))
}

pub(super) async fn list_tables(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<String>>> {
    let tables = state.store.get_all_tables().await?;
    Ok(ApiResponse::ok(tables, "Tables retrieved successfully"))
}

pub(super) async fn table_info(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<ApiResponse<TableInfo>> {
    let info = state.store.table_info(&name).await?;
    Ok(ApiResponse::ok(info, "Table info retrieved successfully"))
}

pub(super) async fn table_data(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<DataQuery>,
) -> AppResult<ApiResponse<TableData>> {
    let limit = query.limit.unwrap_or(DEFAULT_DATA_LIMIT);
    if !(1..=MAX_DATA_LIMIT).contains(&limit) {
        return Err(AppError::BadRequest(format!(
            "limit must be between 1 and {MAX_DATA_LIMIT}, got {limit}"
        )));
    }
    let rows = state.store.sample(&name, limit).await?.rows;
    let data = TableData {
        table_name: name,
        count: rows.len(),
        data: rows,
    };
    Ok(ApiResponse::ok(data, "Table data retrieved successfully"))
}
