use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::{NodeError, Result};
use crate::nodes::value::NodeInputs;

/// Socket types a node input or output can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InputType {
    Image,
    Int,
    Float,
    Audio,
    String,
    Video,
}

impl InputType {
    /// Host name of the type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "IMAGE",
            Self::Int => "INT",
            Self::Float => "FLOAT",
            Self::Audio => "AUDIO",
            Self::String => "STRING",
            Self::Video => "VIDEO",
        }
    }

    /// Whether a value of type `found` may feed a socket of this type
    ///
    /// Integers widen to floats, and strings are accepted as video paths.
    pub fn accepts(&self, found: InputType) -> bool {
        *self == found
            || matches!(
                (self, found),
                (Self::Float, Self::Int) | (Self::Video, Self::String)
            )
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int | Self::Float)
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared input socket with its widget hints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSpec {
    pub name: String,

    #[serde(rename = "type")]
    pub ty: InputType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
}

impl InputSpec {
    pub fn new(name: impl Into<String>, ty: InputType) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
            min: None,
            max: None,
            step: None,
        }
    }

    pub fn with_default(mut self, default: f64) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn with_step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    /// `[TYPE, {default, min, max, step}]`, the host's input declaration
    pub fn to_json(&self) -> Value {
        let mut options = Map::new();
        let hints = [
            ("default", self.default),
            ("min", self.min),
            ("max", self.max),
            ("step", self.step),
        ];
        for (key, hint) in hints {
            if let Some(v) = hint {
                options.insert(key.to_string(), self.number_json(v));
            }
        }

        if options.is_empty() {
            json!([self.ty.as_str()])
        } else {
            json!([self.ty.as_str(), options])
        }
    }

    fn number_json(&self, v: f64) -> Value {
        if self.ty == InputType::Int {
            json!(v as i64)
        } else {
            json!(v)
        }
    }

    /// Check one supplied value against this declaration
    fn check(&self, inputs: &NodeInputs) -> Result<()> {
        let Some(value) = inputs.get(&self.name) else {
            return Ok(());
        };

        let found = value.input_type();
        if !self.ty.accepts(found) {
            return Err(NodeError::TypeMismatch {
                input: self.name.clone(),
                expected: self.ty.to_string(),
                found: found.to_string(),
            }.into());
        }

        if let Some(number) = value.as_number() {
            let min = self.min.unwrap_or(f64::NEG_INFINITY);
            let max = self.max.unwrap_or(f64::INFINITY);
            if !number.is_finite() || number < min || number > max {
                return Err(NodeError::OutOfRange {
                    input: self.name.clone(),
                    value: number,
                    min,
                    max,
                }.into());
            }
        }

        Ok(())
    }
}

/// Declared interface of a node class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSchema {
    pub required: Vec<InputSpec>,
    pub optional: Vec<InputSpec>,
    pub return_types: Vec<InputType>,
    pub return_names: Vec<String>,

    /// Entry point name reported to the host
    pub function: String,
    pub category: String,

    /// Terminal nodes that only produce UI output
    pub output_node: bool,
}

impl NodeSchema {
    /// Find an input declaration by name
    pub fn input(&self, name: &str) -> Option<&InputSpec> {
        self.required
            .iter()
            .chain(self.optional.iter())
            .find(|spec| spec.name == name)
    }

    /// Check that every required input is present and every supplied input
    /// has an acceptable type and lies within its declared range
    pub fn validate(&self, inputs: &NodeInputs) -> Result<()> {
        for spec in &self.required {
            if !inputs.contains(&spec.name) {
                return Err(NodeError::MissingInput {
                    input: spec.name.clone(),
                }.into());
            }
        }

        for spec in self.required.iter().chain(self.optional.iter()) {
            spec.check(inputs)?;
        }

        Ok(())
    }

    /// Host-facing object info for one node class
    pub fn to_json(&self, class_name: &str, display_name: &str) -> Value {
        let section = |specs: &[InputSpec]| -> Map<String, Value> {
            specs
                .iter()
                .map(|spec| (spec.name.clone(), spec.to_json()))
                .collect()
        };

        json!({
            "name": class_name,
            "display_name": display_name,
            "category": self.category,
            "function": self.function,
            "output_node": self.output_node,
            "input": {
                "required": section(&self.required),
                "optional": section(&self.optional),
            },
            "output": self.return_types.iter().map(|t| t.as_str()).collect::<Vec<_>>(),
            "output_name": self.return_names,
        })
    }
}
