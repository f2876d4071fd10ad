use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::storage::StorageError;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    InternalServerError(String),
    ValidationError(String),
    /// Per-field form errors, shown inline next to each input
    InvalidFields(BTreeMap<String, Vec<String>>),
    StorageError(StorageError),
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<BTreeMap<String, Vec<String>>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            ApiError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            ApiError::InvalidFields(fields) => {
                let summary = fields
                    .iter()
                    .map(|(field, errors)| format!("{}: {}", field, errors.join(", ")))
                    .collect::<Vec<_>>()
                    .join("; ");
                write!(f, "Validation Error: {}", summary)
            }
            ApiError::StorageError(err) => write!(f, "Storage Error: {}", err),
        }
    }
}

impl ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse {
        let fields = match self {
            ApiError::InvalidFields(fields) => Some(fields.clone()),
            _ => None,
        };
        let error_response = ErrorResponse {
            success: false,
            message: self.to_string(),
            fields,
        };

        match self {
            ApiError::BadRequest(_) => HttpResponse::BadRequest().json(error_response),
            ApiError::NotFound(_) => HttpResponse::NotFound().json(error_response),
            ApiError::ValidationError(_) | ApiError::InvalidFields(_) => {
                HttpResponse::UnprocessableEntity().json(error_response)
            }
            ApiError::StorageError(_) => HttpResponse::InternalServerError().json(error_response),
            ApiError::InternalServerError(_) => HttpResponse::InternalServerError().json(error_response),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError::StorageError(err)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut fields: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (field, errors) in err.field_errors() {
            let messages = errors
                .iter()
                .map(|e| match &e.message {
                    Some(message) => message.to_string(),
                    None => e.code.to_string(),
                })
                .collect::<Vec<_>>();
            fields.entry(camel_case(field)).or_default().extend(messages);
        }
        ApiError::InvalidFields(fields)
    }
}

/// Derive errors are keyed by Rust field names; the JSON payload is camelCase.
fn camel_case(field: &str) -> String {
    let mut parts = field.split('_');
    let mut out = parts.next().unwrap_or_default().to_string();
    for part in parts {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

impl<T> From<std::sync::PoisonError<T>> for ApiError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        ApiError::InternalServerError("Inventory state lock poisoned".to_string())
    }
}

impl ApiError {
    pub fn item_not_found(id: &str) -> Self {
        ApiError::NotFound(format!("Item with ID '{}' not found", id))
    }

    pub fn invalid_sort_field(field: &str) -> Self {
        ApiError::BadRequest(format!("Unknown sort field '{}'", field))
    }

    pub fn validation_failed(field: &str) -> Self {
        ApiError::ValidationError(format!("Validation failed for field: {}", field))
    }
}
