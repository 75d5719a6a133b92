//! Common types used throughout soql-extract
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// A single record returned by the remote API, keyed by field name
pub type Record = JsonObject;

// ============================================================================
// Record Normalization
// ============================================================================

/// Metadata key the remote system attaches to every record object
pub const ATTRIBUTES_KEY: &str = "attributes";

/// Remove remote metadata from a record.
///
/// Relationship fields (`Owner.Name`) and child sub-query results come back
/// as nested objects with their own `attributes`, so the walk is recursive.
pub fn strip_attributes(record: &mut Record) {
    record.remove(ATTRIBUTES_KEY);
    for value in record.values_mut() {
        strip_value(value);
    }
}

fn strip_value(value: &mut JsonValue) {
    match value {
        JsonValue::Object(map) => strip_attributes(map),
        JsonValue::Array(items) => items.iter_mut().for_each(strip_value),
        _ => {}
    }
}

// ============================================================================
// Backoff Type
// ============================================================================

/// Type of backoff for retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    #[default]
    Exponential,
}
