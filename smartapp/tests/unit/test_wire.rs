//! Wire format tests

use serde_json::{json, Value};

use smartapp::models::config::{
    BasicSetting, ConfigSection, ConfigSetting, ConfigValue, DeviceSetting, DeviceValue,
    ParagraphSetting, StringValue,
};
use smartapp::models::event::EventType;
use smartapp::models::lifecycle::{
    ConfigInit, ConfigInitData, ConfigPage, ConfigPageData, ConfigPhase,
    ConfigurationInitResponse, ConfigurationPageResponse, ConfirmationResponse, EventResponse, InstallResponse, LifecyclePhase,
    LifecycleRequest, LifecycleResponse, OauthCallbackResponse, UninstallResponse,
    UpdateResponse,
};
use smartapp::wire::{from_json, parse_request, to_json};

use crate::common::load_request;

fn parse_fixture(name: &str) -> LifecycleRequest {
    let json = load_request(name);
    let request = parse_request(&json).unwrap();

    // Serializing and parsing again gives back an equal request
    let reparsed = parse_request(&to_json(&request).unwrap()).unwrap();
    assert_eq!(reparsed, request, "round trip of {}", name);

    request
}

#[test]
fn test_confirmation_request() {
    let request = parse_fixture("CONFIRMATION.json");
    assert_eq!(request.phase(), LifecyclePhase::Confirmation);
    assert_eq!(request.execution_id(), "8F8FA33E-2A5B-4BC5-826C-4B2AB73FE9DD");

    let LifecycleRequest::Confirmation(r) = request else {
        panic!("expected confirmation");
    };
    assert_eq!(r.app_id, "fd9949ee-a3bf-4069-b4b3-3e9c1c922e29");
    assert_eq!(r.confirmation_data.confirmation_url, "{CONFIRMATION_URL}");
    assert_eq!(r.settings["property1"], "string");
}

#[test]
fn test_configuration_requests() {
    let LifecycleRequest::Configuration(init) = parse_fixture("CONFIGURATION-INITIALIZE.json") else {
        panic!("expected configuration");
    };
    assert_eq!(init.configuration_data.phase, ConfigPhase::Initialize);
    assert_eq!(
        init.configuration_data.config["property1"],
        vec![ConfigValue::Device {
            device_config: DeviceValue {
                device_id: "31192dc9-eb45-4d90-b606-21e9b66d8c2b".to_string(),
                component_id: "main".to_string(),
            }
        }]
    );

    let LifecycleRequest::Configuration(page) = parse_fixture("CONFIGURATION-PAGE.json") else {
        panic!("expected configuration");
    };
    assert_eq!(page.configuration_data.phase, ConfigPhase::Page);
    assert_eq!(page.configuration_data.page_id, "2");
    assert_eq!(page.configuration_data.previous_page_id, "1");
    assert_eq!(
        page.configuration_data.config["minutes"],
        vec![ConfigValue::String {
            string_config: StringValue { value: "3".to_string() }
        }]
    );
    assert!(page.settings.is_empty());
}

#[test]
fn test_install_request() {
    let LifecycleRequest::Install(r) = parse_fixture("INSTALL.json") else {
        panic!("expected install");
    };
    let app = &r.install_data.installed_app;
    assert_eq!(r.install_data.auth_token.expose(), "install-auth-token");
    assert_eq!(r.install_data.refresh_token.expose(), "install-refresh-token");
    assert_eq!(app.installed_app_id, "d692699d-e7a6-400d-a0b7-d5be96e7a564");
    assert_eq!(app.location_id, "e675a3d9-2499-406c-86dc-8a492a886494");
    assert_eq!(app.config.len(), 3);
    assert_eq!(app.permissions.len(), 3);
}

#[test]
fn test_update_request() {
    let LifecycleRequest::Update(r) = parse_fixture("UPDATE.json") else {
        panic!("expected update");
    };
    let previous = r.update_data.previous_config.as_ref().unwrap();
    assert_eq!(
        previous["minutes"],
        vec![ConfigValue::String {
            string_config: StringValue { value: "10".to_string() }
        }]
    );
    assert_eq!(r.update_data.previous_permissions.len(), 1);
}

#[test]
fn test_uninstall_request() {
    let request = parse_fixture("UNINSTALL.json");
    assert_eq!(request.phase(), LifecyclePhase::Uninstall);
}

#[test]
fn test_oauth_callback_request() {
    let json = load_request("OAUTH_CALLBACK.json");
    let LifecycleRequest::OauthCallback(r) = parse_fixture("OAUTH_CALLBACK.json") else {
        panic!("expected oauth callback");
    };
    assert_eq!(r.oauth_callback_data.installed_app_id, "string");
    assert_eq!(r.oauth_callback_data.url_path, "string");

    // The payload key keeps its odd capitalization in both directions
    let value: Value = serde_json::from_str(&to_json(&r).unwrap()).unwrap();
    assert!(value.get("oAuthCallbackData").is_some());
    assert!(value.get("oauthCallbackData").is_none());

    let renamed = json.replace("oAuthCallbackData", "oauthCallbackData");
    assert!(parse_request(&renamed).is_err());
}

#[test]
fn test_event_requests() {
    let LifecycleRequest::Event(device) = parse_fixture("EVENT-DEVICE.json") else {
        panic!("expected event");
    };
    let event = &device.event_data.events[0];
    assert_eq!(event.event_type(), EventType::DeviceEvent);
    assert!(event.event_time.is_none());
    assert_eq!(event.payload.body()["capability"], "motionSensor");
    assert_eq!(event.payload.body()["stateChange"], true);

    let LifecycleRequest::Event(timer) = parse_fixture("EVENT-TIMER.json") else {
        panic!("expected event");
    };
    let event = &timer.event_data.events[0];
    assert_eq!(event.event_type(), EventType::TimerEvent);
    assert_eq!(
        event.event_time.as_ref().unwrap().to_string(),
        "2017-09-13T04:18:12.469Z"
    );
    assert_eq!(event.payload.body()["name"], "lights_off_timeout");
}

#[test]
fn test_secrets_redacted_in_debug() {
    for (name, secrets) in [
        ("INSTALL.json", vec!["install-auth-token", "install-refresh-token"]),
        ("UPDATE.json", vec!["update-auth-token", "update-refresh-token"]),
        ("EVENT-DEVICE.json", vec!["event-auth-token"]),
    ] {
        let request = parse_request(&load_request(name)).unwrap();
        let debug = format!("{:?}", request);
        let json = to_json(&request).unwrap();
        for secret in secrets {
            assert!(!debug.contains(secret), "{} leaked in debug output of {}", secret, name);
            assert!(json.contains(secret), "{} missing from JSON of {}", secret, name);
        }
    }
}

#[test]
fn test_rejected_requests() {
    let confirmation = load_request("CONFIRMATION.json");

    // Unknown lifecycle phase
    let unknown = confirmation.replace("\"CONFIRMATION\"", "\"BOGUS\"");
    assert!(parse_request(&unknown).is_err());

    // Missing required field
    let mut value: Value = serde_json::from_str(&confirmation).unwrap();
    value.as_object_mut().unwrap().remove("confirmationData");
    assert!(parse_request(&value.to_string()).is_err());

    // Unknown value type
    let install = load_request("INSTALL.json").replacen("\"DEVICE\"", "\"MODE\"", 1);
    assert!(parse_request(&install).is_err());

    // Unknown event type
    let event = load_request("EVENT-DEVICE.json").replace("\"DEVICE_EVENT\"", "\"ALARM_EVENT\"");
    assert!(parse_request(&event).is_err());
}

#[test]
fn test_empty_responses() {
    let cases: Vec<(LifecycleResponse, Value)> = vec![
        (
            LifecycleResponse::Install(InstallResponse::default()),
            json!({"installData": {}}),
        ),
        (
            LifecycleResponse::Update(UpdateResponse::default()),
            json!({"updateData": {}}),
        ),
        (
            LifecycleResponse::Uninstall(UninstallResponse::default()),
            json!({"uninstallData": {}}),
        ),
        (
            LifecycleResponse::OauthCallback(OauthCallbackResponse::default()),
            json!({"oAuthCallbackData": {}}),
        ),
        (
            LifecycleResponse::Event(EventResponse::default()),
            json!({"eventData": {}}),
        ),
    ];

    for (response, expected) in cases {
        let json = to_json(&response).unwrap();
        assert_eq!(serde_json::from_str::<Value>(&json).unwrap(), expected);

        let parsed: LifecycleResponse = from_json(&json).unwrap();
        assert_eq!(parsed, response);
        assert_eq!(parsed.phase(), response.phase());
    }
}

#[test]
fn test_confirmation_response() {
    let response = LifecycleResponse::Confirmation(ConfirmationResponse {
        target_url: "https://example.com/smartapp".to_string(),
    });
    let json = to_json(&response).unwrap();
    assert_eq!(
        serde_json::from_str::<Value>(&json).unwrap(),
        json!({"targetUrl": "https://example.com/smartapp"})
    );
    assert_eq!(from_json::<LifecycleResponse>(&json).unwrap(), response);
}

#[test]
fn test_configuration_init_response() {
    let response = LifecycleResponse::ConfigurationInit(ConfigurationInitResponse {
        configuration_data: ConfigInitData {
            initialize: ConfigInit {
                id: "app".to_string(),
                name: "Lights".to_string(),
                description: "Turns the lights off".to_string(),
                permissions: vec!["r:devices:*".to_string()],
                first_page_id: "1".to_string(),
            },
        },
    });

    let json = to_json(&response).unwrap();
    let value: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["configurationData"]["initialize"]["firstPageId"], "1");

    let parsed: LifecycleResponse = from_json(&json).unwrap();
    assert_eq!(parsed, response);
    assert_eq!(parsed.phase(), LifecyclePhase::Configuration);
}

#[test]
fn test_configuration_page_response() {
    let response = LifecycleResponse::ConfigurationPage(ConfigurationPageResponse {
        configuration_data: ConfigPageData {
            page: ConfigPage {
                page_id: "2".to_string(),
                name: "Timing".to_string(),
                previous_page_id: Some("1".to_string()),
                next_page_id: None,
                complete: true,
                sections: vec![ConfigSection {
                    name: "Options".to_string(),
                    settings: vec![
                        ConfigSetting::Paragraph(ParagraphSetting {
                            id: "intro".to_string(),
                            name: "Intro".to_string(),
                            description: "How long to wait".to_string(),
                            required: None,
                            default_value: "".to_string(),
                        }),
                        ConfigSetting::Device(DeviceSetting {
                            id: "contact".to_string(),
                            name: "Contact sensor".to_string(),
                            description: "Which door".to_string(),
                            required: Some(true),
                            multiple: false,
                            capabilities: vec!["contactSensor".to_string()],
                            permissions: vec!["r".to_string()],
                        }),
                        ConfigSetting::Decimal(BasicSetting {
                            id: "minutes".to_string(),
                            name: "Minutes".to_string(),
                            description: "Delay".to_string(),
                            required: Some(false),
                        }),
                    ],
                }],
            },
        },
    });

    let json = to_json(&response).unwrap();
    let value: Value = serde_json::from_str(&json).unwrap();
    let page = &value["configurationData"]["page"];
    assert_eq!(page["pageId"], "2");
    assert_eq!(page["sections"][0]["settings"][1]["type"], "DEVICE");
    assert_eq!(page["sections"][0]["settings"][2]["type"], "DECIMAL");

    // Shares the configurationData key with the init response
    let parsed: LifecycleResponse = from_json(&json).unwrap();
    assert!(matches!(parsed, LifecycleResponse::ConfigurationPage(_)));
    assert_eq!(parsed, response);
}
