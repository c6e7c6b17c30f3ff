//! End-to-end tests for the gateway with a real XML-RPC hop
//!
//! Stack under test:
//! 1. `MockRpcServer` - XML-RPC server on an ephemeral port
//! 2. `XmlRpcClient` - the production backend pointed at it
//! 3. `create_router` - the gateway, served by `TestServer`
//!
//! Steps 1-3 are wired together by `ims_tests::Gateway`.
//! 4. Requests sent with `GatewayClient` or raw `reqwest`

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use ims_api::{create_router, AppState, StaticFiles};
use ims_client::testing::TestServer;
use ims_client::ClientError;
use ims_core::{RpcValue, METHODS};
use ims_rpc::testing::MockRpcServer;
use ims_rpc::{MethodResponse, XmlRpcClient};
use ims_tests::Gateway;
use pretty_assertions::assert_eq;
use serde_json::{json, Map, Value};

/// Send a browser-style envelope through the gateway client
async fn call(gateway: &Gateway, envelope: Value) -> Result<Value, ClientError> {
    let mut fields = match envelope {
        Value::Object(map) => map,
        other => panic!("envelope must be an object, got {}", other),
    };
    let meth = match fields.remove("meth") {
        Some(Value::String(meth)) => meth,
        other => panic!("envelope needs a string meth, got {:?}", other),
    };
    gateway.server.client.call(&meth, fields).await
}

fn phone_row() -> RpcValue {
    RpcValue::Array(vec![
        RpcValue::Int(7),
        "phone".into(),
        "mobile device".into(),
        RpcValue::Int(3),
        RpcValue::Double(34.5),
    ])
}

#[tokio::test]
async fn test_product_read_through_xml_rpc() {
    let harness = Gateway::start(|method, _| match method {
        "product_read" => MethodResponse::Success(phone_row()),
        _ => MethodResponse::fault(1, "unexpected"),
    })
    .await
    .unwrap();

    let body = call(&harness, json!({"meth": "product_read", "p_id": 7}))
        .await
        .unwrap();

    assert_eq!(
        body,
        json!({"product": {
            "p_id": 7,
            "name": "phone",
            "description": "mobile device",
            "quantity": 3,
            "price": 34.5
        }})
    );

    let calls = harness.backend.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, "product_read");
    assert_eq!(calls[0].params, vec![RpcValue::Int(7)]);
}

#[tokio::test]
async fn test_create_forwards_arguments_in_order() {
    let harness = Gateway::start(|method, _| match method {
        "product_create" => MethodResponse::Success("3f2a".into()),
        _ => MethodResponse::fault(1, "unexpected"),
    })
    .await
    .unwrap();

    let envelope = json!({
        "price": 34.5,
        "quantity": 0,
        "description": "mobile device",
        "name": "phone",
        "meth": "product_create"
    });
    let body = call(&harness, envelope).await.unwrap();
    assert_eq!(body, json!({"p_id": "3f2a"}));

    let calls = harness.backend.calls();
    assert_eq!(
        calls[0].params,
        vec![
            RpcValue::from("phone"),
            RpcValue::from("mobile device"),
            RpcValue::Int(0),
            RpcValue::Double(34.5),
        ]
    );
}

#[tokio::test]
async fn test_absent_fields_travel_as_nil() {
    let harness = Gateway::start(|_, _| MethodResponse::Success(RpcValue::Int(1)))
        .await
        .unwrap();

    call(&harness, json!({"meth": "supplier_create", "name": "Acme"}))
        .await
        .unwrap();

    assert_eq!(
        harness.backend.calls()[0].params,
        vec![RpcValue::from("Acme"), RpcValue::Nil]
    );
}

#[tokio::test]
async fn test_fault_becomes_fixed_message() {
    let harness = Gateway::start(|_, _| {
        MethodResponse::fault(1, "<class 'Exception'>:Failed to create product: duplicate key")
    })
    .await
    .unwrap();

    let err = call(&harness, json!({"meth": "product_create", "name": "phone"}))
        .await
        .unwrap_err();

    match err {
        ClientError::ServerError { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Failed to create product.");
        }
        other => panic!("expected server error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_backend_is_bad_request() {
    // Nothing listens on the discard port
    let client = XmlRpcClient::with_config(
        "http://127.0.0.1:9/",
        Duration::from_secs(2),
        Duration::from_secs(1),
    )
    .unwrap();
    let state = AppState::new(Arc::new(client));
    let gateway = TestServer::start(create_router(state)).await.unwrap();

    let err = gateway
        .client
        .call("categories_read", Map::new())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert!(err.to_string().contains("Failed to list categories."));
}

#[tokio::test]
async fn test_unknown_method_never_reaches_backend() {
    let harness = Gateway::start(|_, _| MethodResponse::Success(RpcValue::Nil))
        .await
        .unwrap();

    let err = call(&harness, json!({"meth": "bogus_op"}))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::MethodNotFound(_)));
    assert!(err.to_string().contains("bogus_op"));
    assert!(harness.backend.calls().is_empty());
}

#[tokio::test]
async fn test_list_passes_through() {
    let mut responses = HashMap::new();
    responses.insert(
        "products_read".to_string(),
        MethodResponse::Success(RpcValue::Array(vec!["a".into(), "b".into()])),
    );
    let backend = MockRpcServer::with_responses(responses).await.unwrap();
    let harness = Gateway::with_backend(backend, StaticFiles::default())
        .await
        .unwrap();

    let body = call(&harness, json!({"meth": "products_read"})).await.unwrap();
    assert_eq!(body, json!({"list": ["a", "b"]}));

    // Anything the backend does not register is a fault
    let err = call(&harness, json!({"meth": "images_read"}))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(400));
}

#[tokio::test]
async fn test_missing_row_is_not_found() {
    let harness = Gateway::start(|_, _| MethodResponse::Success(RpcValue::Nil))
        .await
        .unwrap();

    let err = call(&harness, json!({"meth": "category_read", "c_id": "nope"}))
        .await
        .unwrap_err();

    match err {
        ClientError::ServerError { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Failed to read category.");
        }
        other => panic!("expected server error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_every_method_is_one_backend_call() {
    let harness = Gateway::start(|method, _| {
        let row = RpcValue::Array(vec![RpcValue::Int(1); 5]);
        match method {
            "product_read" | "supplier_read" | "category_read" | "image_read" => {
                MethodResponse::Success(row)
            }
            _ => MethodResponse::Success(RpcValue::Nil),
        }
    })
    .await
    .unwrap();

    let mut fields = Map::new();
    for field in ["p_id", "s_id", "c_id", "i_id", "name", "description", "contact", "url"] {
        fields.insert(field.to_string(), json!(format!("{}-value", field)));
    }
    fields.insert("quantity".to_string(), json!(2));
    fields.insert("price".to_string(), json!(9.99));

    for spec in METHODS {
        harness
            .server
            .client
            .call(spec.name, fields.clone())
            .await
            .unwrap_or_else(|e| panic!("{} failed: {}", spec.name, e));
    }

    let calls = harness.backend.calls();
    assert_eq!(calls.len(), METHODS.len());
    for (spec, recorded) in METHODS.iter().zip(&calls) {
        assert_eq!(recorded.method, spec.name);
        let expected: Vec<RpcValue> = spec
            .params
            .iter()
            .map(|field| RpcValue::from_json(&fields[*field]))
            .collect();
        assert_eq!(recorded.params, expected, "arguments of {}", spec.name);
    }
}

#[tokio::test]
async fn test_spa_fallback_serves_entry_document() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<div id=\"root\"></div>").unwrap();

    let backend = MockRpcServer::start(|_, _| MethodResponse::Success(RpcValue::Nil))
        .await
        .unwrap();
    let harness = Gateway::with_backend(backend, StaticFiles::new(dir.path()))
        .await
        .unwrap();

    let response = reqwest::get(format!("{}/anything-unmatched", harness.base_url()))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "<div id=\"root\"></div>");

    assert!(harness.backend.calls().is_empty());
}
