//! Lifecycle dispatcher tests

use std::sync::Arc;

use serde_json::{json, Value};

use smartapp::context::RequestContext;
use smartapp::dispatch::{DispatcherConfig, LifecycleDispatcher};
use smartapp::errors::SmartAppError;
use smartapp::models::lifecycle::LifecyclePhase;

use crate::common::*;

const CORRELATION: &str = "AAAA";

fn unsigned_config() -> DispatcherConfig {
    DispatcherConfig {
        check_signatures: false,
        clock_skew_sec: None,
        keyserver_url: KEYSERVER_URL.to_string(),
        log_json: true,
    }
}

fn dispatcher(handler: Arc<RecordingHandler>, config: DispatcherConfig, keys: StaticKeys) -> LifecycleDispatcher {
    LifecycleDispatcher::new(load_definition(), config, handler, Arc::new(keys))
}

fn context(body: &str) -> RequestContext {
    RequestContext::new(headers(&[("X-ST-Correlation", CORRELATION)]), body)
}

fn page_request(page_id: &str) -> String {
    let mut value: Value = serde_json::from_str(&load_request("CONFIGURATION-PAGE.json")).unwrap();
    value["configurationData"]["pageId"] = json!(page_id);
    value.to_string()
}

async fn dispatch_ok(body: &str) -> (Value, Arc<RecordingHandler>) {
    let handler = Arc::new(RecordingHandler::default());
    let dispatcher = dispatcher(handler.clone(), unsigned_config(), StaticKeys::unavailable());
    let json = dispatcher.dispatch(&context(body)).await.unwrap();
    (serde_json::from_str(&json).unwrap(), handler)
}

#[tokio::test]
async fn test_confirmation() {
    let (response, handler) = dispatch_ok(&load_request("CONFIRMATION.json")).await;

    assert_eq!(response, json!({"targetUrl": SMARTAPP_URL}));
    assert_eq!(
        handler.seen(),
        vec![(LifecyclePhase::Confirmation, Some(CORRELATION.to_string()))]
    );
}

#[tokio::test]
async fn test_configuration_initialize() {
    let (response, handler) = dispatch_ok(&load_request("CONFIGURATION-INITIALIZE.json")).await;

    assert_eq!(
        response,
        json!({
            "configurationData": {
                "initialize": {
                    "id": "id",
                    "name": "name",
                    "description": "description",
                    "permissions": ["permission"],
                    "firstPageId": "1"
                }
            }
        })
    );
    assert_eq!(handler.seen()[0].0, LifecyclePhase::Configuration);
}

#[tokio::test]
async fn test_configuration_first_of_two_pages() {
    let (response, _) = dispatch_ok(&page_request("1")).await;

    assert_eq!(
        response,
        json!({
            "configurationData": {
                "page": {
                    "pageId": "1",
                    "name": "First page",
                    "previousPageId": null,
                    "nextPageId": "2",
                    "complete": false,
                    "sections": [{
                        "name": "Section 1",
                        "settings": [{
                            "type": "PARAGRAPH",
                            "id": "paragraph-id",
                            "name": "paragraph-name",
                            "description": "paragraph-description",
                            "defaultValue": "paragraph-text"
                        }]
                    }]
                }
            }
        })
    );
}

#[tokio::test]
async fn test_configuration_second_of_two_pages() {
    let (response, _) = dispatch_ok(&page_request("2")).await;
    let page = &response["configurationData"]["page"];

    assert_eq!(page["pageId"], "2");
    assert_eq!(page["name"], "Second page");
    assert_eq!(page["previousPageId"], "1");
    assert_eq!(page["nextPageId"], Value::Null);
    assert_eq!(page["complete"], true);
    assert_eq!(
        page["sections"][0]["settings"][0],
        json!({
            "type": "DECIMAL",
            "id": "decimal-id",
            "name": "decimal-name",
            "description": "decimal-description",
            "required": false
        })
    );
}

#[tokio::test]
async fn test_configuration_page_not_found() {
    for page_id in ["0", "3", "two", ""] {
        let handler = Arc::new(RecordingHandler::default());
        let dispatcher = dispatcher(handler.clone(), unsigned_config(), StaticKeys::unavailable());

        match dispatcher.dispatch(&context(&page_request(page_id))).await {
            Err(SmartAppError::BadRequest { message, correlation_id }) => {
                assert_eq!(message, format!("Page not found: {}", page_id));
                assert_eq!(correlation_id.as_deref(), Some(CORRELATION));
            }
            other => panic!("unexpected result for page {:?}: {:?}", page_id, other),
        }

        // The handler still sees the request
        assert_eq!(handler.seen().len(), 1);
    }
}

#[tokio::test]
async fn test_empty_responses() {
    let cases = [
        ("INSTALL.json", LifecyclePhase::Install, json!({"installData": {}})),
        ("UPDATE.json", LifecyclePhase::Update, json!({"updateData": {}})),
        ("UNINSTALL.json", LifecyclePhase::Uninstall, json!({"uninstallData": {}})),
        ("OAUTH_CALLBACK.json", LifecyclePhase::OauthCallback, json!({"oAuthCallbackData": {}})),
        ("EVENT-DEVICE.json", LifecyclePhase::Event, json!({"eventData": {}})),
        ("EVENT-TIMER.json", LifecyclePhase::Event, json!({"eventData": {}})),
    ];

    for (fixture, phase, expected) in cases {
        let (response, handler) = dispatch_ok(&load_request(fixture)).await;
        assert_eq!(response, expected, "response to {}", fixture);
        assert_eq!(handler.seen()[0].0, phase);
    }
}

#[tokio::test]
async fn test_handler_error_is_internal() {
    let handler = Arc::new(RecordingHandler::failing());
    let dispatcher = dispatcher(handler.clone(), unsigned_config(), StaticKeys::unavailable());

    let err = dispatcher
        .dispatch(&context(&load_request("INSTALL.json")))
        .await
        .unwrap_err();
    assert!(matches!(err, SmartAppError::Internal { .. }), "{:?}", err);
    assert_eq!(err.correlation_id(), Some(CORRELATION));
}

#[tokio::test]
async fn test_invalid_json_is_bad_request() {
    let handler = Arc::new(RecordingHandler::default());
    let dispatcher = dispatcher(handler.clone(), unsigned_config(), StaticKeys::unavailable());

    let err = dispatcher.dispatch(&context("bogus")).await.unwrap_err();
    assert!(matches!(err, SmartAppError::BadRequest { .. }), "{:?}", err);
    assert_eq!(err.correlation_id(), Some(CORRELATION));
    assert!(handler.seen().is_empty());
}

#[tokio::test]
async fn test_unknown_lifecycle_is_bad_request() {
    let handler = Arc::new(RecordingHandler::default());
    let dispatcher = dispatcher(handler, unsigned_config(), StaticKeys::unavailable());
    let body = load_request("CONFIRMATION.json").replace("\"CONFIRMATION\"", "\"BOGUS\"");

    let err = dispatcher.dispatch(&context(&body)).await.unwrap_err();
    assert!(matches!(err, SmartAppError::BadRequest { .. }), "{:?}", err);
}

fn signed_config() -> DispatcherConfig {
    DispatcherConfig {
        check_signatures: true,
        ..unsigned_config()
    }
}

#[tokio::test]
async fn test_signed_request_is_dispatched() {
    // The default signature covers only the date, so any body will do
    let handler = Arc::new(RecordingHandler::default());
    let dispatcher = dispatcher(handler.clone(), signed_config(), StaticKeys::new(PUBLIC_KEY));
    let context = signed_context(DEFAULT_AUTHORIZATION, DATE, &load_request("CONFIRMATION.json"));

    let json = dispatcher.dispatch(&context).await.unwrap();
    let response: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(response["targetUrl"], SMARTAPP_URL);
    assert_eq!(
        handler.seen(),
        vec![(LifecyclePhase::Confirmation, Some(CORRELATION_ID.to_string()))]
    );
}

#[tokio::test]
async fn test_bad_signature_is_rejected_before_parsing() {
    let handler = Arc::new(RecordingHandler::default());
    let dispatcher = dispatcher(handler.clone(), signed_config(), StaticKeys::new(WRONG_KEY));
    let context = signed_context(DEFAULT_AUTHORIZATION, DATE, "bogus");

    match dispatcher.dispatch(&context).await {
        Err(SmartAppError::Signature(e)) => {
            assert_eq!(e.message, "Signature is not valid");
            assert_eq!(e.correlation_id.as_deref(), Some(CORRELATION_ID));
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(handler.seen().is_empty());
}

#[tokio::test]
async fn test_unsigned_request_is_rejected() {
    let handler = Arc::new(RecordingHandler::default());
    let dispatcher = dispatcher(handler, signed_config(), StaticKeys::new(PUBLIC_KEY));

    let err = dispatcher
        .dispatch(&context(&load_request("CONFIRMATION.json")))
        .await
        .unwrap_err();
    assert!(matches!(err, SmartAppError::Signature(_)), "{:?}", err);
}
