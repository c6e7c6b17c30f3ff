//! Response shaping
//!
//! Turns a raw backend result into the JSON object the browser expects,
//! according to the method's [`ResponseShape`].

use ims_core::{EntityKind, ResponseShape, RpcValue};
use serde_json::{Map, Value};
use thiserror::Error;

/// Why a backend result could not be shaped
#[derive(Debug, Error, PartialEq)]
pub enum ShapeError {
    /// A single-entity read returned nothing
    #[error("{0} not found")]
    NotFound(EntityKind),

    /// The backend returned something other than a row of the expected width
    #[error("expected {expected} columns for {kind}, got {found}")]
    ShortRow {
        kind: EntityKind,
        expected: usize,
        found: usize,
    },

    #[error("expected a row for {0}, got a non-array value")]
    NotARow(EntityKind),
}

/// Shape a successful backend result
pub fn shape_response(shape: ResponseShape, value: RpcValue) -> Result<Value, ShapeError> {
    let mut body = Map::new();
    match shape {
        ResponseShape::List => {
            body.insert("list".to_string(), value.into());
        }
        ResponseShape::Created(kind) => {
            body.insert(kind.id_field().to_string(), value.into());
        }
        ResponseShape::Entity(kind) => {
            let record = project_row(kind, value)?;
            body.insert(kind.name().to_string(), Value::Object(record));
        }
        ResponseShape::Ack => {
            body.insert("result".to_string(), value.into());
        }
    }
    Ok(Value::Object(body))
}

/// Map a positional row onto the entity's named fields.
///
/// Extra trailing columns are ignored.
pub fn project_row(kind: EntityKind, value: RpcValue) -> Result<Map<String, Value>, ShapeError> {
    let row = match value {
        RpcValue::Nil => return Err(ShapeError::NotFound(kind)),
        RpcValue::Array(row) => row,
        _ => return Err(ShapeError::NotARow(kind)),
    };

    let fields = kind.projection();
    if row.len() < fields.len() {
        return Err(ShapeError::ShortRow {
            kind,
            expected: fields.len(),
            found: row.len(),
        });
    }

    Ok(fields
        .iter()
        .zip(row)
        .map(|(field, column)| (field.to_string(), column.into()))
        .collect())
}
