//! Configuration settings and values
//!
//! Settings describe what the SmartApp asks the user for on each
//! configuration page; values are what the user chose, sent back on the
//! INSTALL, UPDATE, EVENT and CONFIGURATION requests.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Configured values keyed by setting id
pub type ConfigMap = BTreeMap<String, Vec<ConfigValue>>;

/// A configured value, discriminated by `valueType`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "valueType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfigValue {
    #[serde(rename_all = "camelCase")]
    Device { device_config: DeviceValue },

    #[serde(rename_all = "camelCase")]
    String { string_config: StringValue },
}

/// A device chosen for a DEVICE setting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceValue {
    pub device_id: String,
    pub component_id: String,
}

/// A string entered for a STRING-valued setting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringValue {
    pub value: String,
}

/// A setting on a configuration page, discriminated by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfigSetting {
    Device(DeviceSetting),
    Text(TextSetting),
    Boolean(BooleanSetting),
    Enum(EnumSetting),
    Link(LinkSetting),
    Page(PageSetting),
    Image(ImageSetting),
    Icon(IconSetting),
    Time(BasicSetting),
    Paragraph(ParagraphSetting),
    Email(BasicSetting),
    Decimal(BasicSetting),
    Number(BasicSetting),
    Phone(BasicSetting),
    Oauth(OauthSetting),
}

impl ConfigSetting {
    /// The setting id, common to every variant
    pub fn id(&self) -> &str {
        match self {
            ConfigSetting::Device(s) => &s.id,
            ConfigSetting::Text(s) => &s.id,
            ConfigSetting::Boolean(s) => &s.id,
            ConfigSetting::Enum(s) => &s.id,
            ConfigSetting::Link(s) => &s.id,
            ConfigSetting::Page(s) => &s.id,
            ConfigSetting::Image(s) => &s.id,
            ConfigSetting::Icon(s) => &s.id,
            ConfigSetting::Paragraph(s) => &s.id,
            ConfigSetting::Oauth(s) => &s.id,
            ConfigSetting::Time(s)
            | ConfigSetting::Email(s)
            | ConfigSetting::Decimal(s)
            | ConfigSetting::Number(s)
            | ConfigSetting::Phone(s) => &s.id,
        }
    }
}

/// Settings with no fields beyond the common ones (TIME, EMAIL, DECIMAL,
/// NUMBER, PHONE)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicSetting {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

/// Lets the user pick one or more devices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSetting {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    pub multiple: bool,
    /// Treated as AND: only devices with every capability are offered
    pub capabilities: Vec<String>,
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSetting {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    pub default_value: String,
}

/// Boolean defaults travel as the strings "true" and "false"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BooleanValue {
    True,
    False,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BooleanSetting {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    pub default_value: BooleanValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumOption {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumOptionGroup {
    pub name: String,
    pub options: Vec<EnumOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumSetting {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    pub multiple: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<EnumOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grouped_options: Option<Vec<EnumOptionGroup>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSetting {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    pub url: String,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSetting {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    pub page: String,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSetting {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconSetting {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphSetting {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    pub default_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OauthSetting {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    pub browser: bool,
    pub url_template: String,
}

/// A titled group of settings within a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSection {
    pub name: String,
    pub settings: Vec<ConfigSetting>,
}
