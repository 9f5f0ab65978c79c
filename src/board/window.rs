//! The rendering surface as seen by effect programs.
//!
//! The engine never draws. A `Window` only carries the attributes that
//! queries may read or write through `WINDOW.<attr>`; the game copies
//! them to its real window after each tick.

use serde::{Deserialize, Serialize};

use crate::core::{Attributes, Value};
use crate::error::EvalResult;

use super::host::{self, Scriptable};

/// Window attributes exposed to effect programs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    /// Window title.
    pub title: String,
    /// Width in pixels.
    pub width: i64,
    /// Height in pixels.
    pub height: i64,
    /// Custom attributes.
    pub attributes: Attributes,
}

impl Window {
    /// Create a window description.
    #[must_use]
    pub fn new(title: impl Into<String>, width: i64, height: i64) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            attributes: Attributes::default(),
        }
    }

    /// Attach a custom attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::new("phaseboard", 800, 640)
    }
}

impl Scriptable for Window {
    fn label(&self) -> String {
        "WINDOW".to_string()
    }

    fn has_attr(&self, attr: &str) -> bool {
        matches!(attr, "title" | "width" | "height") || self.attributes.contains_key(attr)
    }

    fn get_attr(&self, attr: &str) -> EvalResult<Value> {
        match attr {
            "title" => Ok(Value::Text(self.title.clone())),
            "width" => Ok(Value::Int(self.width)),
            "height" => Ok(Value::Int(self.height)),
            _ => self
                .attributes
                .get(attr)
                .cloned()
                .ok_or_else(|| host::unknown_attr(self, attr)),
        }
    }

    fn set_attr(&mut self, attr: &str, value: Value) -> EvalResult<()> {
        match attr {
            "title" => self.title = host::expect_text(value)?,
            "width" => self.width = host::expect_int(&value)?,
            "height" => self.height = host::expect_int(&value)?,
            _ => {
                self.attributes.insert(attr.to_string(), value);
            }
        }
        Ok(())
    }

    fn call_method(&mut self, method: &str, _args: &[Value]) -> EvalResult<Value> {
        Err(host::unknown_method(self, method))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_attributes() {
        let mut window = Window::new("Test", 800, 640).with_attribute("score", 0i64);

        assert_eq!(window.get_attr("title"), Ok(Value::from("Test")));
        assert_eq!(window.get_attr("width"), Ok(Value::Int(800)));
        assert_eq!(window.get_attr("score"), Ok(Value::Int(0)));
        assert!(window.get_attr("fps").is_err());

        window.set_attr("title", Value::from("Round 2")).unwrap();
        window.set_attr("fps", Value::Int(60)).unwrap();
        assert_eq!(window.title, "Round 2");
        assert!(window.has_attr("fps"));
        assert!(window.set_attr("width", Value::from("wide")).is_err());
    }
}
