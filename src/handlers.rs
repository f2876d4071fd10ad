// src/handlers.rs
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

use crate::AppState;
use crate::derivation::{compute_stats, compute_view, recent_items, CategoryFilter, DashboardStats, InventoryQuery, QueryPatch};
use crate::error::{ApiError, ApiResult};
use crate::import_export::{export_items, import_items};
use crate::models::{
    generate_item_id, timestamp_now, IdFormat, InventoryItem, ItemDraft, ItemRow, SortField, SortOrder,
    View, CATEGORIES,
};
use crate::store::ItemStore;
use crate::validator::validate_draft;

// ==================== COMMON STRUCTURES ====================

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn success_with_message(data: T, message: String) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message),
        }
    }
}

/// Query-string overrides for the list view. Absent parameters fall back to
/// the session query.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemsQueryParams {
    pub search: Option<String>,
    pub category: Option<String>,
    pub sort_field: Option<String>,
    pub sort_order: Option<String>,
}

impl ItemsQueryParams {
    pub fn to_patch(&self) -> ApiResult<QueryPatch> {
        let sort_field = match &self.sort_field {
            Some(field) => Some(
                SortField::from_str(field).map_err(|_| ApiError::invalid_sort_field(field))?,
            ),
            None => None,
        };
        let sort_order = match &self.sort_order {
            Some(order) => Some(SortOrder::from_str(order).map_err(|_| {
                ApiError::BadRequest(format!("Unknown sort order '{}'", order))
            })?),
            None => None,
        };

        Ok(QueryPatch {
            search_term: self.search.clone(),
            category_filter: self.category.as_deref().map(CategoryFilter::from),
            sort_field,
            sort_order,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemListResponse {
    pub query: InventoryQuery,
    pub items: Vec<ItemRow>,
    pub total: usize,
    pub matched: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub title: &'static str,
    pub stats: DashboardStats,
    pub recent_items: Vec<ItemRow>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub id: String,
    pub deleted: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ViewPayload {
    pub view: View,
}

#[derive(Debug, Serialize)]
pub struct ViewResponse {
    pub view: View,
    pub title: &'static str,
}

impl From<View> for ViewResponse {
    fn from(view: View) -> Self {
        Self { view, title: view.title() }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaResponse {
    pub categories: &'static [&'static str],
    pub default_min_stock_threshold: u32,
    pub sort_fields: Vec<SortField>,
    pub views: Vec<ViewResponse>,
    pub id_format: IdFormat,
}

// ==================== ROUTES ====================

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(|| async { HttpResponse::Ok().body("OK") }))
        .service(
            web::scope("/api/v1")
                .route("/dashboard", web::get().to(get_dashboard))
                .route("/dashboard/stats", web::get().to(get_stats))
                .service(
                    web::scope("/items")
                        .route("", web::get().to(list_items))
                        .route("", web::post().to(create_item))
                        .route("/export", web::get().to(export_items))
                        .route("/import", web::post().to(import_items))
                        .route("/{id}", web::get().to(get_item))
                        .route("/{id}", web::put().to(update_item))
                        .route("/{id}", web::delete().to(delete_item))
                )
                .service(
                    web::scope("/session")
                        .route("/query", web::get().to(get_session_query))
                        .route("/query", web::patch().to(patch_session_query))
                        .route("/query", web::delete().to(reset_session_query))
                        .route("/sort/{field}", web::post().to(toggle_sort))
                        .route("/view", web::get().to(get_view))
                        .route("/view", web::put().to(change_view))
                )
                .route("/storage/status", web::get().to(get_storage_status))
                .route("/meta", web::get().to(get_meta))
        );
}

// ==================== DASHBOARD ====================

pub async fn get_dashboard(app_state: web::Data<Arc<AppState>>) -> ApiResult<HttpResponse> {
    let store = app_state.store.lock()?;
    let limit = app_state.config.inventory.recent_items_limit;

    let response = DashboardResponse {
        title: View::Dashboard.title(),
        stats: compute_stats(store.items()),
        recent_items: recent_items(store.items(), limit)
            .into_iter()
            .map(ItemRow::from)
            .collect(),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(response)))
}

pub async fn get_stats(app_state: web::Data<Arc<AppState>>) -> ApiResult<HttpResponse> {
    let store = app_state.store.lock()?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(compute_stats(store.items()))))
}

// ==================== ITEMS ====================

pub async fn list_items(
    app_state: web::Data<Arc<AppState>>,
    params: web::Query<ItemsQueryParams>,
) -> ApiResult<HttpResponse> {
    let patch = params.to_patch()?;
    let query = app_state.session.lock()?.query.patched(patch);

    let store = app_state.store.lock()?;
    let rows: Vec<ItemRow> = compute_view(store.items(), &query)
        .into_iter()
        .map(ItemRow::from)
        .collect();

    let response = ItemListResponse {
        matched: rows.len(),
        total: store.len(),
        items: rows,
        query,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(response)))
}

pub async fn get_item(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    let store = app_state.store.lock()?;
    let item = store.get(&id).cloned().ok_or_else(|| ApiError::item_not_found(&id))?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(ItemRow::from(item))))
}

/// Validates a draft and prepends it to the store under a fresh id.
pub fn add_draft(store: &mut ItemStore, draft: ItemDraft, id_format: IdFormat) -> ApiResult<InventoryItem> {
    let validation = validate_draft(&draft);
    if !validation.is_valid() {
        return Err(validation.to_api_error());
    }
    for (field, warnings) in &validation.warnings {
        log::warn!("Item draft {}: {}", field, warnings.join("; "));
    }

    let id = generate_item_id(id_format, |candidate| store.contains(candidate));
    let item = draft.into_item(id, timestamp_now())?;
    store.upsert(item.clone());
    Ok(item)
}

pub async fn create_item(
    app_state: web::Data<Arc<AppState>>,
    draft: web::Json<ItemDraft>,
) -> ApiResult<HttpResponse> {
    let mut store = app_state.store.lock()?;
    let item = add_draft(&mut store, draft.into_inner(), app_state.config.inventory.id_format)?;

    log::info!("Inventory item created: {} ({})", item.name, item.id);

    let message = persistence_message(&store, "Item created successfully");
    Ok(HttpResponse::Created().json(ApiResponse::success_with_message(ItemRow::from(item), message)))
}

pub async fn update_item(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    draft: web::Json<ItemDraft>,
) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    let draft = draft.into_inner();

    let validation = validate_draft(&draft);
    if !validation.is_valid() {
        return Err(validation.to_api_error());
    }

    let mut store = app_state.store.lock()?;
    if !store.contains(&id) {
        return Err(ApiError::item_not_found(&id));
    }

    let item = draft.into_item(id, timestamp_now())?;
    let outcome = store.upsert(item.clone());

    log::info!("Inventory item updated: {} ({}, {:?})", item.name, item.id, outcome);

    let message = persistence_message(&store, "Item updated successfully");
    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(ItemRow::from(item), message)))
}

pub async fn delete_item(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    let mut store = app_state.store.lock()?;
    let removed = store.remove(&id);

    let message = match &removed {
        Some(item) => {
            log::info!("Inventory item deleted: {} ({})", item.name, item.id);
            persistence_message(&store, "Item deleted successfully")
        }
        None => {
            log::debug!("Delete requested for unknown item {}", id);
            "No item with that ID; nothing deleted".to_string()
        }
    };

    let response = DeleteResponse { id, deleted: removed.is_some() };
    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(response, message)))
}

fn persistence_message(store: &ItemStore, message: &str) -> String {
    if store.persistence_status().durable {
        message.to_string()
    } else {
        format!("{} (not saved to storage, changes will be lost on restart)", message)
    }
}

// ==================== SESSION ====================

pub async fn get_session_query(app_state: web::Data<Arc<AppState>>) -> ApiResult<HttpResponse> {
    let session = app_state.session.lock()?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(session.query.clone())))
}

pub async fn patch_session_query(
    app_state: web::Data<Arc<AppState>>,
    patch: web::Json<QueryPatch>,
) -> ApiResult<HttpResponse> {
    let mut session = app_state.session.lock()?;
    let query = session.set_query(patch.into_inner()).clone();
    Ok(HttpResponse::Ok().json(ApiResponse::success(query)))
}

pub async fn reset_session_query(app_state: web::Data<Arc<AppState>>) -> ApiResult<HttpResponse> {
    let mut session = app_state.session.lock()?;
    let query = session.reset_query().clone();
    Ok(HttpResponse::Ok().json(ApiResponse::success(query)))
}

pub async fn toggle_sort(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let field = path.into_inner();
    let field = SortField::from_str(&field).map_err(|_| ApiError::invalid_sort_field(&field))?;

    let mut session = app_state.session.lock()?;
    let query = session.toggle_sort(field).clone();
    Ok(HttpResponse::Ok().json(ApiResponse::success(query)))
}

pub async fn get_view(app_state: web::Data<Arc<AppState>>) -> ApiResult<HttpResponse> {
    let session = app_state.session.lock()?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(ViewResponse::from(session.view))))
}

pub async fn change_view(
    app_state: web::Data<Arc<AppState>>,
    payload: web::Json<ViewPayload>,
) -> ApiResult<HttpResponse> {
    let mut session = app_state.session.lock()?;
    let view = session.change_view(payload.view);
    Ok(HttpResponse::Ok().json(ApiResponse::success(ViewResponse::from(view))))
}

// ==================== STORAGE & META ====================

pub async fn get_storage_status(app_state: web::Data<Arc<AppState>>) -> ApiResult<HttpResponse> {
    let store = app_state.store.lock()?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({
        "backend": store.gateway().describe(),
        "key": store.gateway().key().as_str(),
        "items": store.len(),
        "status": store.persistence_status(),
    }))))
}

pub async fn get_meta(app_state: web::Data<Arc<AppState>>) -> ApiResult<HttpResponse> {
    let inventory = &app_state.config.inventory;
    let response = MetaResponse {
        categories: CATEGORIES,
        default_min_stock_threshold: inventory.default_min_stock_threshold,
        sort_fields: SortField::ALL.to_vec(),
        views: vec![View::Dashboard.into(), View::Inventory.into()],
        id_format: inventory.id_format,
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(response)))
}
