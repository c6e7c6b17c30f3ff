//! Envelope dispatch
//!
//! One inbound envelope becomes at most one backend call. The `meth` field
//! selects a row of [`METHODS`](ims_core::METHODS); that row alone decides
//! which fields are forwarded, in what order, and how the result is shaped.

use ims_core::{lookup_method, MethodSpec, RpcBackend, RpcValue};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::shape::{shape_response, ShapeError};

/// Name of the envelope field carrying the method
pub const METH_FIELD: &str = "meth";

/// Resolve the envelope's method.
///
/// A missing or non-string `meth` is a malformed request; a string that names
/// no known method is reported with the offending name.
pub fn resolve_method(envelope: &Map<String, Value>) -> Result<&'static MethodSpec, ApiError> {
    let meth = envelope
        .get(METH_FIELD)
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::BadRequest("Missing or invalid 'meth' field.".to_string()))?;

    lookup_method(meth).ok_or_else(|| ApiError::NotFound(format!("Method not found: {}", meth)))
}

/// Collect the positional arguments for `spec` from the envelope.
///
/// Fields are taken in the table's order. Absent fields are sent as nil and
/// fields the method does not use are ignored.
pub fn extract_args(spec: &MethodSpec, envelope: &Map<String, Value>) -> Vec<RpcValue> {
    spec.params
        .iter()
        .map(|field| envelope.get(*field).map(RpcValue::from_json).unwrap_or(RpcValue::Nil))
        .collect()
}

/// Handle one envelope end to end
pub async fn dispatch(backend: &dyn RpcBackend, envelope: &Value) -> Result<Value, ApiError> {
    let envelope = envelope
        .as_object()
        .ok_or_else(|| ApiError::BadRequest("Request body must be a JSON object.".to_string()))?;

    let spec = resolve_method(envelope)?;
    let args = extract_args(spec, envelope);

    debug!(method = spec.name, args = args.len(), "Dispatching");

    let result = backend.call(spec.name, &args).await.map_err(|e| {
        warn!(
            method = spec.name,
            endpoint = backend.endpoint(),
            kind = e.kind(),
            error = %e,
            "Backend call failed"
        );
        ApiError::BadRequest(spec.failure.to_string())
    })?;

    shape_response(spec.shape, result).map_err(|e| match e {
        ShapeError::NotFound(_) => ApiError::NotFound(spec.failure.to_string()),
        other => {
            warn!(method = spec.name, error = %other, "Unexpected backend result");
            ApiError::BadRequest(spec.failure.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ims_core::{BackendError, BackendResult};
    use parking_lot::Mutex;
    use serde_json::json;

    /// Backend that records calls and answers with a fixed result
    struct Recording {
        calls: Mutex<Vec<(String, Vec<RpcValue>)>>,
        reply: fn(&str) -> BackendResult<RpcValue>,
    }

    impl Recording {
        fn new(reply: fn(&str) -> BackendResult<RpcValue>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                reply,
            }
        }
    }

    #[async_trait]
    impl RpcBackend for Recording {
        fn endpoint(&self) -> &str {
            "recording"
        }

        async fn call(&self, method: &str, params: &[RpcValue]) -> BackendResult<RpcValue> {
            self.calls.lock().push((method.to_string(), params.to_vec()));
            (self.reply)(method)
        }
    }

    fn status(err: &ApiError) -> u16 {
        err.status().as_u16()
    }

    #[test]
    fn args_follow_table_order() {
        let spec = lookup_method("product_update").unwrap();
        let envelope = json!({
            "price": 9.5,
            "quantity": 3,
            "meth": "product_update",
            "name": "Phone",
            "p_id": "7",
            "description": "Smart",
            "unused": true
        });
        let args = extract_args(spec, envelope.as_object().unwrap());
        assert_eq!(
            args,
            vec![
                RpcValue::from("7"),
                RpcValue::from("Phone"),
                RpcValue::from("Smart"),
                RpcValue::Int(3),
                RpcValue::Double(9.5),
            ]
        );
    }

    #[test]
    fn missing_fields_become_nil() {
        let spec = lookup_method("supplier_create").unwrap();
        let envelope = json!({"meth": "supplier_create", "name": "Acme"});
        let args = extract_args(spec, envelope.as_object().unwrap());
        assert_eq!(args, vec![RpcValue::from("Acme"), RpcValue::Nil]);
    }

    #[test]
    fn resolve_rejects_missing_and_unknown() {
        let err = resolve_method(json!({}).as_object().unwrap()).unwrap_err();
        assert_eq!(status(&err), 400);

        let err = resolve_method(json!({"meth": 5}).as_object().unwrap()).unwrap_err();
        assert_eq!(status(&err), 400);

        let err = resolve_method(json!({"meth": "product_drop"}).as_object().unwrap()).unwrap_err();
        assert_eq!(status(&err), 404);
        assert_eq!(err.message(), "Method not found: product_drop");
    }

    #[tokio::test]
    async fn success_makes_exactly_one_call() {
        let backend = Recording::new(|_| Ok(RpcValue::Int(11)));
        let body = dispatch(
            &backend,
            &json!({"meth": "category_create", "name": "Tools", "description": "Hand"}),
        )
        .await
        .unwrap();

        assert_eq!(body, json!({"c_id": 11}));
        let calls = backend.calls.lock();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "category_create");
    }

    #[tokio::test]
    async fn unknown_method_never_reaches_backend() {
        let backend = Recording::new(|_| Ok(RpcValue::Nil));
        let err = dispatch(&backend, &json!({"meth": "drop_tables"}))
            .await
            .unwrap_err();
        assert_eq!(status(&err), 404);
        assert!(backend.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn non_object_body_is_bad_request() {
        let backend = Recording::new(|_| Ok(RpcValue::Nil));
        let err = dispatch(&backend, &json!(["meth", "products_read"]))
            .await
            .unwrap_err();
        assert_eq!(status(&err), 400);
        assert!(backend.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn backend_failure_uses_fixed_message() {
        let backend = Recording::new(|_| {
            Err(BackendError::Fault {
                code: 1,
                message: "UNIQUE constraint failed".into(),
            })
        });
        let err = dispatch(&backend, &json!({"meth": "product_create", "name": "x"}))
            .await
            .unwrap_err();
        assert_eq!(status(&err), 400);
        assert_eq!(err.message(), "Failed to create product.");
        assert_eq!(backend.calls.lock().len(), 1);
    }

    #[tokio::test]
    async fn nil_read_is_not_found() {
        let backend = Recording::new(|_| Ok(RpcValue::Nil));
        let err = dispatch(&backend, &json!({"meth": "supplier_read", "s_id": 99}))
            .await
            .unwrap_err();
        assert_eq!(status(&err), 404);
        assert_eq!(err.message(), "Failed to read supplier.");
    }

    #[tokio::test]
    async fn short_row_is_bad_request() {
        let backend = Recording::new(|_| Ok(RpcValue::Array(vec![RpcValue::Int(1)])));
        let err = dispatch(&backend, &json!({"meth": "image_read", "i_id": 1}))
            .await
            .unwrap_err();
        assert_eq!(status(&err), 400);
        assert_eq!(err.message(), "Failed to read image.");
    }
}
