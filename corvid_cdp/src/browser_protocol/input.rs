//! `Input` domain: synthetic mouse and keyboard events dispatched against a
//! target's rendered viewport (spec §4.G `WebElement::click`/`type_text`).

use std::borrow::Cow;

use corvid_types::{Command, Method};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MouseButton {
    None,
    Left,
    Middle,
    Right,
    Back,
    Forward,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchMouseEventParams {
    pub r#type: String,
    pub x: f64,
    pub y: f64,
    pub button: Option<MouseButton>,
    pub click_count: Option<i64>,
    pub modifiers: Option<i64>,
}

impl DispatchMouseEventParams {
    pub fn moved(x: f64, y: f64) -> Self {
        Self {
            r#type: "mouseMoved".into(),
            x,
            y,
            button: None,
            click_count: None,
            modifiers: None,
        }
    }

    pub fn pressed(x: f64, y: f64) -> Self {
        Self {
            r#type: "mousePressed".into(),
            x,
            y,
            button: Some(MouseButton::Left),
            click_count: Some(1),
            modifiers: None,
        }
    }

    pub fn released(x: f64, y: f64) -> Self {
        Self {
            r#type: "mouseReleased".into(),
            x,
            y,
            button: Some(MouseButton::Left),
            click_count: Some(1),
            modifiers: None,
        }
    }
}

impl Method for DispatchMouseEventParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Input.dispatchMouseEvent".into()
    }
}
impl Command for DispatchMouseEventParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchKeyEventParams {
    pub r#type: String,
    pub text: Option<String>,
    pub unmodified_text: Option<String>,
    pub key: Option<String>,
    pub code: Option<String>,
    pub windows_virtual_key_code: Option<i64>,
    pub native_virtual_key_code: Option<i64>,
}

impl DispatchKeyEventParams {
    /// A single printable character, sent as the teacher's "type a char"
    /// helper does it: one `keyDown`/`char`/`keyUp` triple per rune, here
    /// split into the `char` event the CDP side actually renders.
    pub fn char_event(ch: char) -> Self {
        Self {
            r#type: "char".into(),
            text: Some(ch.to_string()),
            unmodified_text: Some(ch.to_string()),
            key: None,
            code: None,
            windows_virtual_key_code: None,
            native_virtual_key_code: None,
        }
    }

    pub fn key_down(key: impl Into<String>) -> Self {
        Self {
            r#type: "keyDown".into(),
            text: None,
            unmodified_text: None,
            key: Some(key.into()),
            code: None,
            windows_virtual_key_code: None,
            native_virtual_key_code: None,
        }
    }

    pub fn key_up(key: impl Into<String>) -> Self {
        Self {
            r#type: "keyUp".into(),
            text: None,
            unmodified_text: None,
            key: Some(key.into()),
            code: None,
            windows_virtual_key_code: None,
            native_virtual_key_code: None,
        }
    }
}

impl Method for DispatchKeyEventParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Input.dispatchKeyEvent".into()
    }
}
impl Command for DispatchKeyEventParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertTextParams {
    pub text: String,
}

impl InsertTextParams {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Method for InsertTextParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Input.insertText".into()
    }
}
impl Command for InsertTextParams {
    type Response = serde_json::Value;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_sequence_uses_left_button() {
        let down = DispatchMouseEventParams::pressed(10.0, 20.0);
        assert_eq!(down.button, Some(MouseButton::Left));
        assert_eq!(down.r#type, "mousePressed");
    }
}
