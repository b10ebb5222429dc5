//! `Emulation` domain: viewport, device metrics and timezone overrides a
//! `BrowserConfig`/`Tab` can set per target.

use std::borrow::Cow;

use corvid_types::{Command, Method};
use serde::Serialize;

#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenOrientation {
    pub r#type: String,
    pub angle: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetDeviceMetricsOverrideParams {
    pub width: i64,
    pub height: i64,
    pub device_scale_factor: f64,
    pub mobile: bool,
    pub screen_orientation: Option<ScreenOrientation>,
}

impl SetDeviceMetricsOverrideParams {
    pub fn new(width: i64, height: i64) -> Self {
        Self {
            width,
            height,
            device_scale_factor: 1.0,
            mobile: false,
            screen_orientation: None,
        }
    }
}

impl Method for SetDeviceMetricsOverrideParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Emulation.setDeviceMetricsOverride".into()
    }
}
impl Command for SetDeviceMetricsOverrideParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearDeviceMetricsOverrideParams {}

impl Method for ClearDeviceMetricsOverrideParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Emulation.clearDeviceMetricsOverride".into()
    }
}
impl Command for ClearDeviceMetricsOverrideParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetTimezoneOverrideParams {
    pub timezone_id: String,
}

impl SetTimezoneOverrideParams {
    pub fn new(timezone_id: impl Into<String>) -> Self {
        Self {
            timezone_id: timezone_id.into(),
        }
    }
}

impl Method for SetTimezoneOverrideParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Emulation.setTimezoneOverride".into()
    }
}
impl Command for SetTimezoneOverrideParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetGeolocationOverrideParams {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub accuracy: Option<f64>,
}

impl Method for SetGeolocationOverrideParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Emulation.setGeolocationOverride".into()
    }
}
impl Command for SetGeolocationOverrideParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetScriptExecutionDisabledParams {
    pub value: bool,
}

impl SetScriptExecutionDisabledParams {
    pub fn new(value: bool) -> Self {
        Self { value }
    }
}

impl Method for SetScriptExecutionDisabledParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Emulation.setScriptExecutionDisabled".into()
    }
}
impl Command for SetScriptExecutionDisabledParams {
    type Response = serde_json::Value;
}
