use std::collections::HashMap;

use crate::audio::AudioAsset;
use crate::error::{LivePhotoError, NodeError, Result};
use crate::frame::ImageBatch;
use crate::nodes::schema::InputType;
use crate::preview::{PreviewInput, PreviewPayload};

/// A value flowing along a node graph edge
#[derive(Debug, Clone)]
pub enum NodeValue {
    Image(ImageBatch),

    /// Image batch wrapped in a redundant outer batch dimension
    NestedImage(Vec<ImageBatch>),

    Int(i64),
    Float(f64),
    Audio(AudioAsset),
    String(String),
    Video(PreviewInput),
}

impl NodeValue {
    pub fn input_type(&self) -> InputType {
        match self {
            Self::Image(_) | Self::NestedImage(_) => InputType::Image,
            Self::Int(_) => InputType::Int,
            Self::Float(_) => InputType::Float,
            Self::Audio(_) => InputType::Audio,
            Self::String(_) => InputType::String,
            Self::Video(_) => InputType::Video,
        }
    }

    /// Numeric view of `Int` and `Float` values
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageBatch> {
        match self {
            Self::Image(batch) => Some(batch),
            _ => None,
        }
    }

    pub fn as_video(&self) -> Option<&PreviewInput> {
        match self {
            Self::Video(input) => Some(input),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Named inputs of one node invocation
#[derive(Debug, Clone, Default)]
pub struct NodeInputs {
    values: HashMap<String, NodeValue>,
}

impl NodeInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: NodeValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: NodeValue) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&NodeValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn required(&self, name: &str) -> Result<&NodeValue> {
        self.values.get(name).ok_or_else(|| {
            NodeError::MissingInput {
                input: name.to_string(),
            }
            .into()
        })
    }

    fn mismatch(name: &str, expected: InputType, found: &NodeValue) -> LivePhotoError {
        NodeError::TypeMismatch {
            input: name.to_string(),
            expected: expected.to_string(),
            found: found.input_type().to_string(),
        }
        .into()
    }

    /// Image input; a nested batch must have an outer size of 1
    pub fn image(&self, name: &str) -> Result<&ImageBatch> {
        match self.required(name)? {
            NodeValue::Image(batch) => Ok(batch),
            NodeValue::NestedImage(nested) => ImageBatch::squeeze_leading(nested),
            other => Err(Self::mismatch(name, InputType::Image, other)),
        }
    }

    pub fn int(&self, name: &str) -> Result<i64> {
        match self.required(name)? {
            NodeValue::Int(v) => Ok(*v),
            other => Err(Self::mismatch(name, InputType::Int, other)),
        }
    }

    /// Float input; integer values are widened
    pub fn float(&self, name: &str) -> Result<f64> {
        match self.required(name)? {
            NodeValue::Float(v) => Ok(*v),
            NodeValue::Int(v) => Ok(*v as f64),
            other => Err(Self::mismatch(name, InputType::Float, other)),
        }
    }

    /// Video path input; a plain string is taken as a path
    pub fn video(&self, name: &str) -> Result<PreviewInput> {
        match self.required(name)? {
            NodeValue::Video(input) => Ok(input.clone()),
            NodeValue::String(path) => Ok(PreviewInput::Path(path.clone())),
            other => Err(Self::mismatch(name, InputType::Video, other)),
        }
    }

    /// Optional audio input
    pub fn audio(&self, name: &str) -> Result<Option<&AudioAsset>> {
        match self.values.get(name) {
            None => Ok(None),
            Some(NodeValue::Audio(asset)) => Ok(Some(asset)),
            Some(other) => Err(Self::mismatch(name, InputType::Audio, other)),
        }
    }
}

/// What a node invocation produces
#[derive(Debug, Clone)]
pub enum NodeOutput {
    /// Positional outputs matching the schema's return types
    Values(Vec<NodeValue>),

    /// UI-only payload of an output node
    Ui(PreviewPayload),
}

impl NodeOutput {
    pub fn values(&self) -> Option<&[NodeValue]> {
        match self {
            Self::Values(values) => Some(values),
            Self::Ui(_) => None,
        }
    }

    pub fn ui(&self) -> Option<&PreviewPayload> {
        match self {
            Self::Ui(payload) => Some(payload),
            Self::Values(_) => None,
        }
    }
}
