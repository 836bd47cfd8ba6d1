//! Input checks run before any request leaves the process.

use crate::vector::schema::{IndexConfig, ReturnMetadata, Vector};
use crate::vector::{VectorizeError, VectorizeResult};
use regex::Regex;
use std::sync::OnceLock;

pub const MAX_INDEX_NAME_LENGTH: usize = 63;
pub const MAX_PROPERTY_NAME_LENGTH: usize = 64;
pub const MAX_TOP_K: usize = 100;
pub const MAX_TOP_K_WITH_PAYLOAD: usize = 50;
pub const MAX_LIST_LIMIT: usize = 1000;

fn index_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-z0-9][a-z0-9-]*[a-z0-9]$").expect("index name pattern is valid")
    })
}

pub fn validate_index_name(name: &str) -> VectorizeResult<()> {
    if name.is_empty() {
        return Err(VectorizeError::invalid("index name must not be empty"));
    }
    if name.len() > MAX_INDEX_NAME_LENGTH {
        return Err(VectorizeError::invalid(format!(
            "index name '{}' exceeds {} characters",
            name, MAX_INDEX_NAME_LENGTH
        )));
    }

    let valid = if name.len() == 1 {
        name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    } else {
        index_name_pattern().is_match(name)
    };

    if !valid {
        return Err(VectorizeError::invalid(format!(
            "index name '{}' must contain only lowercase letters, digits and inner hyphens",
            name
        )));
    }
    Ok(())
}

pub fn validate_index_config(config: &IndexConfig) -> VectorizeResult<()> {
    if config.dimensions == 0 {
        return Err(VectorizeError::invalid("index dimensions must be a positive integer"));
    }
    Ok(())
}

/// Checks every vector, stopping at the first offender.
///
/// `expected_dimensions` is only known when the caller supplies it; the index
/// configuration is not fetched here.
pub fn validate_vectors(
    vectors: &[Vector],
    expected_dimensions: Option<usize>,
) -> VectorizeResult<()> {
    if vectors.is_empty() {
        return Err(VectorizeError::invalid("at least one vector is required"));
    }

    for (position, vector) in vectors.iter().enumerate() {
        if vector.id.is_empty() {
            return Err(VectorizeError::invalid(format!(
                "vector at position {} is missing an id",
                position
            )));
        }
        if vector.values.is_empty() {
            return Err(VectorizeError::invalid(format!(
                "vector '{}' has no values",
                vector.id
            )));
        }
        if vector.values.iter().any(|v| !v.is_finite()) {
            return Err(VectorizeError::invalid(format!(
                "vector '{}' contains a non-finite value",
                vector.id
            )));
        }
        if let Some(expected) = expected_dimensions {
            if vector.values.len() != expected {
                return Err(VectorizeError::DimensionMismatch {
                    id: vector.id.clone(),
                    expected,
                    actual: vector.values.len(),
                });
            }
        }
    }
    Ok(())
}

pub fn validate_ids(ids: &[String]) -> VectorizeResult<()> {
    if ids.is_empty() {
        return Err(VectorizeError::invalid("at least one vector id is required"));
    }
    if let Some(position) = ids.iter().position(|id| id.trim().is_empty()) {
        return Err(VectorizeError::invalid(format!(
            "vector id at position {} is empty",
            position
        )));
    }
    Ok(())
}

pub fn validate_top_k(
    top_k: usize,
    return_values: bool,
    return_metadata: ReturnMetadata,
) -> VectorizeResult<()> {
    let limit = if return_values || return_metadata == ReturnMetadata::All {
        MAX_TOP_K_WITH_PAYLOAD
    } else {
        MAX_TOP_K
    };
    if top_k == 0 || top_k > limit {
        return Err(VectorizeError::invalid(format!(
            "topK must be between 1 and {}, got {}",
            limit, top_k
        )));
    }
    Ok(())
}

pub fn validate_property_name(property_name: &str) -> VectorizeResult<()> {
    if property_name.trim().is_empty() {
        return Err(VectorizeError::invalid("metadata property name must not be empty"));
    }
    if property_name.chars().count() > MAX_PROPERTY_NAME_LENGTH {
        return Err(VectorizeError::invalid(format!(
            "metadata property name '{}' exceeds {} characters",
            property_name, MAX_PROPERTY_NAME_LENGTH
        )));
    }
    Ok(())
}

pub fn validate_list_limit(limit: usize) -> VectorizeResult<()> {
    if limit == 0 || limit > MAX_LIST_LIMIT {
        return Err(VectorizeError::invalid(format!(
            "list limit must be between 1 and {}, got {}",
            MAX_LIST_LIMIT, limit
        )));
    }
    Ok(())
}
