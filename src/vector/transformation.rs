//! Shapes loosely-typed vector payloads into `Vector`s and splits large sets
//! into request-sized chunks.

use crate::vector::schema::Vector;
use crate::vector::{VectorizeError, VectorizeResult};
use serde_json::{Number, Value};
use std::slice::Chunks;

/// Per-request vector limit documented by the service.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Converts raw JSON objects (as parsed from upstream input) into typed vectors.
///
/// Each element needs a truthy `id` (non-empty string or non-zero number, coerced
/// to a string) and a `values` array of numbers. `metadata` and `namespace` are
/// carried over only when present and non-null.
pub fn format_vectors(raw_vectors: &[Value]) -> VectorizeResult<Vec<Vector>> {
    raw_vectors
        .iter()
        .enumerate()
        .map(|(position, raw)| format_vector(position, raw))
        .collect()
}

fn format_vector(position: usize, raw: &Value) -> VectorizeResult<Vector> {
    let object = raw.as_object().ok_or_else(|| {
        VectorizeError::invalid(format!("vector at position {} is not an object", position))
    })?;

    let id = match object.get("id") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) if n.as_f64() != Some(0.0) => numeric_id(n),
        _ => {
            return Err(VectorizeError::invalid(format!(
                "vector at position {} is missing a valid id",
                position
            )))
        }
    };

    let values = match object.get("values") {
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(offset, item)| component(&id, position, offset, item))
            .collect::<VectorizeResult<Vec<f32>>>()?,
        _ => {
            return Err(VectorizeError::invalid(format!(
                "vector '{}' at position {} is missing a values array",
                id, position
            )))
        }
    };

    let mut vector = Vector::new(id, values);

    match object.get("metadata") {
        None | Some(Value::Null) => {}
        Some(Value::Object(map)) => vector.metadata = Some(map.clone()),
        Some(_) => {
            return Err(VectorizeError::invalid(format!(
                "vector '{}' at position {} has metadata that is not an object",
                vector.id, position
            )))
        }
    }

    match object.get("namespace") {
        None | Some(Value::Null) => {}
        Some(Value::String(ns)) => vector.namespace = Some(ns.clone()),
        Some(_) => {
            return Err(VectorizeError::invalid(format!(
                "vector '{}' at position {} has a namespace that is not a string",
                vector.id, position
            )))
        }
    }

    Ok(vector)
}

// Integral ids render without a fraction, so `1` and `1.0` both become "1".
fn numeric_id(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 => format!("{:.0}", f),
        _ => n.to_string(),
    }
}

fn component(id: &str, position: usize, offset: usize, item: &Value) -> VectorizeResult<f32> {
    let value = item.as_f64().ok_or_else(|| {
        VectorizeError::invalid(format!(
            "vector '{}' at position {} has a non-numeric value at index {}",
            id, position, offset
        ))
    })?;
    if !value.is_finite() || value.abs() > f64::from(f32::MAX) {
        return Err(VectorizeError::invalid(format!(
            "vector '{}' at position {} has value {} at index {} outside the f32 range",
            id, position, value, offset
        )));
    }
    Ok(value as f32)
}

/// Splits `items` into contiguous chunks of at most `batch_size`, preserving order.
///
/// The returned iterator is lazy; call again to restart.
pub fn batch_vectors<T>(items: &[T], batch_size: usize) -> VectorizeResult<Chunks<'_, T>> {
    if batch_size == 0 {
        return Err(VectorizeError::invalid("batch size must be at least 1"));
    }
    Ok(items.chunks(batch_size))
}
