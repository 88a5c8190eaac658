//! Events delivered in EVENT lifecycle requests
//!
//! Only the reference SDK documents event structure, and live traffic
//! carries attributes it does not mention, so event bodies are kept as
//! JSON objects rather than typed structs. The event type itself is
//! strict: an unknown `eventType` fails the whole request.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::timestamp::Timestamp;

/// Free-form attributes of an event body
pub type EventBody = Map<String, Value>;

/// A single triggered event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_time: Option<Timestamp>,

    #[serde(flatten)]
    pub payload: EventPayload,
}

/// The event body, discriminated by `eventType`; exactly one body field is
/// present on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "eventType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPayload {
    #[serde(rename_all = "camelCase")]
    DeviceEvent { device_event: EventBody },

    #[serde(rename_all = "camelCase")]
    DeviceLifecycleEvent { device_lifecycle_event: EventBody },

    #[serde(rename_all = "camelCase")]
    DeviceHealthEvent { device_health_event: EventBody },

    #[serde(rename_all = "camelCase")]
    HubHealthEvent { hub_health_event: EventBody },

    #[serde(rename_all = "camelCase")]
    DeviceCommandsEvent { device_commands_event: EventBody },

    #[serde(rename_all = "camelCase")]
    ModeEvent { mode_event: EventBody },

    #[serde(rename_all = "camelCase")]
    TimerEvent { timer_event: EventBody },

    #[serde(rename_all = "camelCase")]
    SecurityArmStateEvent { security_arm_state_event: EventBody },

    #[serde(rename_all = "camelCase")]
    InstalledAppLifecycleEvent { installed_app_lifecycle_event: EventBody },

    #[serde(rename_all = "camelCase")]
    SceneLifecycleEvent { scene_lifecycle_event: EventBody },

    #[serde(rename_all = "camelCase")]
    WeatherEvent {
        weather_event: EventBody,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        weather_data: Option<EventBody>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        air_quality_data: Option<EventBody>,
    },
}

/// Event type names as they appear in `eventType`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    DeviceEvent,
    DeviceLifecycleEvent,
    DeviceHealthEvent,
    HubHealthEvent,
    DeviceCommandsEvent,
    ModeEvent,
    TimerEvent,
    SecurityArmStateEvent,
    InstalledAppLifecycleEvent,
    SceneLifecycleEvent,
    WeatherEvent,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::DeviceEvent => "DEVICE_EVENT",
            EventType::DeviceLifecycleEvent => "DEVICE_LIFECYCLE_EVENT",
            EventType::DeviceHealthEvent => "DEVICE_HEALTH_EVENT",
            EventType::HubHealthEvent => "HUB_HEALTH_EVENT",
            EventType::DeviceCommandsEvent => "DEVICE_COMMANDS_EVENT",
            EventType::ModeEvent => "MODE_EVENT",
            EventType::TimerEvent => "TIMER_EVENT",
            EventType::SecurityArmStateEvent => "SECURITY_ARM_STATE_EVENT",
            EventType::InstalledAppLifecycleEvent => "INSTALLED_APP_LIFECYCLE_EVENT",
            EventType::SceneLifecycleEvent => "SCENE_LIFECYCLE_EVENT",
            EventType::WeatherEvent => "WEATHER_EVENT",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Event {
    pub fn event_type(&self) -> EventType {
        self.payload.event_type()
    }
}

impl EventPayload {
    pub fn event_type(&self) -> EventType {
        match self {
            EventPayload::DeviceEvent { .. } => EventType::DeviceEvent,
            EventPayload::DeviceLifecycleEvent { .. } => EventType::DeviceLifecycleEvent,
            EventPayload::DeviceHealthEvent { .. } => EventType::DeviceHealthEvent,
            EventPayload::HubHealthEvent { .. } => EventType::HubHealthEvent,
            EventPayload::DeviceCommandsEvent { .. } => EventType::DeviceCommandsEvent,
            EventPayload::ModeEvent { .. } => EventType::ModeEvent,
            EventPayload::TimerEvent { .. } => EventType::TimerEvent,
            EventPayload::SecurityArmStateEvent { .. } => EventType::SecurityArmStateEvent,
            EventPayload::InstalledAppLifecycleEvent { .. } => {
                EventType::InstalledAppLifecycleEvent
            }
            EventPayload::SceneLifecycleEvent { .. } => EventType::SceneLifecycleEvent,
            EventPayload::WeatherEvent { .. } => EventType::WeatherEvent,
        }
    }

    /// The main body of the event, whatever its type
    pub fn body(&self) -> &EventBody {
        match self {
            EventPayload::DeviceEvent { device_event: body }
            | EventPayload::DeviceLifecycleEvent { device_lifecycle_event: body }
            | EventPayload::DeviceHealthEvent { device_health_event: body }
            | EventPayload::HubHealthEvent { hub_health_event: body }
            | EventPayload::DeviceCommandsEvent { device_commands_event: body }
            | EventPayload::ModeEvent { mode_event: body }
            | EventPayload::TimerEvent { timer_event: body }
            | EventPayload::SecurityArmStateEvent { security_arm_state_event: body }
            | EventPayload::InstalledAppLifecycleEvent { installed_app_lifecycle_event: body }
            | EventPayload::SceneLifecycleEvent { scene_lifecycle_event: body } => body,
            EventPayload::WeatherEvent { weather_event, .. } => weather_event,
        }
    }
}
