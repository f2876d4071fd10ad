// src/validator.rs - Centralized validation module
use std::collections::BTreeMap;
use serde::Serialize;
use regex::Regex;
use lazy_static::lazy_static;
use ::validator::Validate;
use crate::error::ApiError;
use crate::models::ItemDraft;

lazy_static! {
    static ref STORAGE_KEY_REGEX: Regex = Regex::new(r"^[a-z][a-z0-9_]*_v[0-9]+$").unwrap();
}

// ==================== VALIDATION RESULT ====================

#[derive(Debug, Default, Serialize)]
pub struct ValidationResult {
    pub errors: BTreeMap<String, Vec<String>>,
    pub warnings: BTreeMap<String, Vec<String>>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let messages = self.errors.entry(field.into()).or_default();
        let message = message.into();
        if !messages.contains(&message) {
            messages.push(message);
        }
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn merge(&mut self, other: ValidationResult) {
        for (field, errors) in other.errors {
            for error in errors {
                self.add_error(field.clone(), error);
            }
        }
        for (field, warnings) in other.warnings {
            self.warnings.entry(field).or_default().extend(warnings);
        }
    }

    pub fn to_api_error(&self) -> ApiError {
        ApiError::InvalidFields(self.errors.clone())
    }
}

impl From<::validator::ValidationErrors> for ValidationResult {
    fn from(err: ::validator::ValidationErrors) -> Self {
        let mut result = ValidationResult::new();
        if let ApiError::InvalidFields(fields) = ApiError::from(err) {
            for (field, messages) in fields {
                for message in messages {
                    result.add_error(field.clone(), message);
                }
            }
        }
        result
    }
}

// ==================== FIELD VALIDATORS ====================

pub struct FieldValidator;

impl FieldValidator {
    pub fn not_empty(value: &str, field: &str) -> Result<(), String> {
        if value.trim().is_empty() {
            Err(format!("{} cannot be empty", field))
        } else {
            Ok(())
        }
    }

    pub fn range<T: PartialOrd + std::fmt::Display>(
        value: T,
        field: &str,
        min: Option<T>,
        max: Option<T>
    ) -> Result<(), String> {
        if let Some(min_val) = min {
            if value < min_val {
                return Err(format!("{} must be at least {}", field, min_val));
            }
        }

        if let Some(max_val) = max {
            if value > max_val {
                return Err(format!("{} must not exceed {}", field, max_val));
            }
        }

        Ok(())
    }

    pub fn price(value: f64) -> Result<(), String> {
        if !value.is_finite() {
            Err("Price must be a finite number".to_string())
        } else if value < 0.0 {
            Err("Price cannot be negative".to_string())
        } else {
            Ok(())
        }
    }

    pub fn storage_key(value: &str) -> Result<(), String> {
        if STORAGE_KEY_REGEX.is_match(value) {
            Ok(())
        } else {
            Err(format!(
                "Invalid storage key '{}' (expected lowercase name with version suffix, e.g. stockflow_inventory_v1)",
                value
            ))
        }
    }
}

// ==================== CUSTOM VALIDATION ====================

pub trait CustomValidate {
    fn custom_validate(&self) -> ValidationResult;
}

impl CustomValidate for ItemDraft {
    fn custom_validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        let max_count = i64::from(u32::MAX);

        if FieldValidator::not_empty(&self.name, "name").is_err() {
            result.add_error("name", "Product name is required");
        }

        if let Err(e) = FieldValidator::range(self.quantity, "Quantity", None, Some(max_count)) {
            result.add_error("quantity", e);
        }

        if let Err(e) = FieldValidator::price(self.price) {
            result.add_error("price", e);
        }

        if let Some(threshold) = self.min_stock_threshold {
            if let Err(e) = FieldValidator::range(threshold, "Low stock threshold", None, Some(max_count)) {
                result.add_error("minStockThreshold", e);
            }
        }

        if !crate::models::CATEGORIES.contains(&self.category.as_str()) && !self.category.trim().is_empty() {
            result.add_warning("category", format!("'{}' is not one of the standard categories", self.category));
        }

        result
    }
}

/// Runs derive and custom checks on a form draft.
pub fn validate_draft(draft: &ItemDraft) -> ValidationResult {
    let mut result = match draft.validate() {
        Ok(()) => ValidationResult::new(),
        Err(errors) => ValidationResult::from(errors),
    };
    result.merge(draft.custom_validate());
    result
}
