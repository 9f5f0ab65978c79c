//! `THIS`: per-phase attribute store.

use serde::{Deserialize, Serialize};

use crate::board::Scriptable;
use crate::core::{Attributes, Value};
use crate::error::EvalResult;

/// Attributes a phase's effect program keeps between fires.
///
/// Reading an attribute that was never written yields `None`, so programs
/// can initialise lazily (`if THIS.count == None: THIS.count = 0`).
/// `remaining` and `fires` are maintained by the phase and read-only.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseMemory {
    /// Program-defined attributes.
    pub attributes: Attributes,
    remaining: Option<u32>,
    fires: u32,
}

impl PhaseMemory {
    /// Fires since the phase was last armed.
    #[must_use]
    pub fn fires(&self) -> u32 {
        self.fires
    }

    pub(crate) fn record(&mut self, remaining: Option<u32>, fires: u32) {
        self.remaining = remaining;
        self.fires = fires;
    }
}

impl Scriptable for PhaseMemory {
    fn label(&self) -> String {
        "THIS".to_string()
    }

    fn has_attr(&self, attr: &str) -> bool {
        matches!(attr, "remaining" | "fires") || self.attributes.contains_key(attr)
    }

    fn get_attr(&self, attr: &str) -> EvalResult<Value> {
        Ok(match attr {
            "remaining" => self.remaining.map(i64::from).into(),
            "fires" => Value::Int(i64::from(self.fires)),
            _ => self.attributes.get(attr).cloned().unwrap_or_default(),
        })
    }

    fn set_attr(&mut self, attr: &str, value: Value) -> EvalResult<()> {
        if matches!(attr, "remaining" | "fires") {
            return Err(crate::board::host::read_only(self, attr));
        }
        self.attributes.insert(attr.to_string(), value);
        Ok(())
    }

    fn call_method(&mut self, method: &str, _args: &[Value]) -> EvalResult<Value> {
        Err(crate::board::host::unknown_method(self, method))
    }
}
