// src/import_export.rs
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::handlers::{add_draft, ApiResponse};
use crate::models::{ExportFormat, InventoryItem, ItemDraft};
use crate::storage::encode_items;

// ==================== EXPORT ====================

#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    pub format: Option<ExportFormat>,
}

const CSV_HEADERS: [&str; 8] = [
    "ID", "Name", "Category", "Quantity", "Price", "Min Stock Threshold", "Status", "Last Updated",
];

/// Renders the collection as CSV, one row per item in store order.
pub fn items_to_csv(items: &[InventoryItem]) -> ApiResult<Vec<u8>> {
    let mut csv_data = Vec::new();
    {
        let mut writer = csv::Writer::from_writer(&mut csv_data);

        writer.write_record(CSV_HEADERS)
            .map_err(|e| ApiError::InternalServerError(e.to_string()))?;

        for item in items {
            writer.write_record(&[
                item.id.clone(),
                item.name.clone(),
                item.category.clone(),
                item.quantity.to_string(),
                format!("{:.2}", item.price),
                item.min_stock_threshold.to_string(),
                item.status().display_name().to_string(),
                item.last_updated.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            ]).map_err(|e| ApiError::InternalServerError(e.to_string()))?;
        }

        writer.flush().map_err(|e| ApiError::InternalServerError(e.to_string()))?;
    }
    Ok(csv_data)
}

pub async fn export_items(
    app_state: web::Data<Arc<AppState>>,
    query: web::Query<ExportQuery>,
) -> ApiResult<HttpResponse> {
    let items = app_state.store.lock()?.items().to_vec();
    let format = query.format.unwrap_or_default();

    log::info!("Exporting {} inventory items as {}", items.len(), format);

    match format {
        ExportFormat::Csv => Ok(HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header(("Content-Disposition", "attachment; filename=\"inventory.csv\""))
            .body(items_to_csv(&items)?)),
        // same payload as the storage slot, so an export can be restored by hand
        ExportFormat::Json => Ok(HttpResponse::Ok()
            .content_type("application/json")
            .insert_header(("Content-Disposition", "attachment; filename=\"inventory.json\""))
            .body(encode_items(&items)?)),
    }
}

// ==================== IMPORT ====================

#[derive(Debug, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub total: usize,
    pub errors: Vec<String>,
}

pub async fn import_items(
    app_state: web::Data<Arc<AppState>>,
    data: web::Json<Vec<ItemDraft>>,
) -> ApiResult<HttpResponse> {
    let drafts = data.into_inner();
    let total = drafts.len();
    let id_format = app_state.config.inventory.id_format;

    let mut store = app_state.store.lock()?;
    let mut imported = 0;
    let mut errors = Vec::new();

    for (idx, draft) in drafts.into_iter().enumerate() {
        let name = draft.name.clone();
        match add_draft(&mut store, draft, id_format) {
            Ok(_) => imported += 1,
            Err(err) => errors.push(format!("Row {} ({}): {}", idx + 1, name.trim(), err)),
        }
    }

    log::info!("Imported {} of {} inventory items", imported, total);

    Ok(HttpResponse::Ok().json(ApiResponse::success(ImportSummary { imported, total, errors })))
}
