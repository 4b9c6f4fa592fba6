use crate::config::{Config, TransitionConfig};
use crate::error::{NodeError, Result};
use crate::nodes::schema::{InputSpec, InputType, NodeSchema};
use crate::nodes::traits::Node;
use crate::nodes::value::{NodeInputs, NodeOutput, NodeValue};
use crate::transition::WipeTransition;

const MAX_FPS: f64 = 60.0;

/// Wipe between two images, for before/after comparisons
pub struct ImageCompareTransition {
    wipe: WipeTransition,
    config: TransitionConfig,
}

impl ImageCompareTransition {
    pub const CLASS_NAME: &'static str = "ImageCompareTransition";

    pub fn new(config: &Config) -> Self {
        Self {
            wipe: WipeTransition::new(&config.transition),
            config: config.transition.clone(),
        }
    }
}

impl Node for ImageCompareTransition {
    fn class_name(&self) -> &str {
        Self::CLASS_NAME
    }

    fn display_name(&self) -> &str {
        "Image Compare Transition"
    }

    fn schema(&self) -> NodeSchema {
        NodeSchema {
            required: vec![
                InputSpec::new("image1", InputType::Image),
                InputSpec::new("image2", InputType::Image),
                InputSpec::new("frames", InputType::Int)
                    .with_default(self.config.default_frames as f64)
                    .with_range(self.config.min_frames as f64, self.config.max_frames as f64)
                    .with_step(1.0),
                InputSpec::new("fps", InputType::Float)
                    .with_default(self.config.default_fps)
                    .with_range(1.0, MAX_FPS)
                    .with_step(1.0),
            ],
            optional: Vec::new(),
            return_types: vec![InputType::Image],
            return_names: vec!["frames".to_string()],
            function: "create_transition".to_string(),
            category: "image/animation".to_string(),
            output_node: false,
        }
    }

    fn execute(&self, inputs: &NodeInputs) -> Result<NodeOutput> {
        let frames = inputs.int("frames")?;
        let frame_count = u32::try_from(frames).map_err(|_| NodeError::OutOfRange {
            input: "frames".to_string(),
            value: frames as f64,
            min: self.config.min_frames as f64,
            max: self.config.max_frames as f64,
        })?;

        let sequence = self.wipe.synthesize(
            inputs.image("image1")?,
            inputs.image("image2")?,
            frame_count,
            inputs.float("fps")?,
        )?;

        Ok(NodeOutput::Values(vec![NodeValue::Image(sequence)]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FrameError, LivePhotoError};
    use crate::frame::{Frame, ImageBatch};

    fn solid(v: f32) -> NodeValue {
        NodeValue::Image(ImageBatch::single(Frame::filled(4, 8, &[v, v, v])))
    }

    fn inputs(frames: i64) -> NodeInputs {
        NodeInputs::new()
            .with("image1", solid(0.0))
            .with("image2", solid(1.0))
            .with("frames", NodeValue::Int(frames))
            .with("fps", NodeValue::Float(8.0))
    }

    #[test]
    fn test_schema_defaults() {
        let node = ImageCompareTransition::new(&Config::default());
        let schema = node.schema();
        let frames = schema.input("frames").unwrap();
        assert_eq!(frames.default, Some(30.0));
        assert_eq!((frames.min, frames.max), (Some(2.0), Some(120.0)));
        assert_eq!(schema.input("fps").unwrap().default, Some(8.0));
        assert_eq!(schema.return_names, vec!["frames"]);
    }

    #[test]
    fn test_invoke_produces_wipe() {
        let node = ImageCompareTransition::new(&Config::default());
        let output = node.invoke(&inputs(5)).unwrap();
        let batch = output.values().unwrap()[0].as_image().unwrap();

        assert_eq!(batch.len(), 5);
        assert_eq!(batch.frames()[0].get(0, 0, 0), 0.0);
        assert_eq!(batch.frames()[4].get(0, 7, 0), 1.0);
    }

    #[test]
    fn test_nested_inputs_are_squeezed() {
        let node = ImageCompareTransition::new(&Config::default());
        let nested = |v: f32| NodeValue::NestedImage(vec![ImageBatch::single(Frame::filled(4, 8, &[v, v, v]))]);
        let mut inputs = inputs(3);
        inputs.insert("image1", nested(0.0));
        inputs.insert("image2", nested(1.0));

        let output = node.invoke(&inputs).unwrap();
        let batch = output.values().unwrap()[0].as_image().unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.frames()[2].get(0, 7, 0), 1.0);
    }

    #[test]
    fn test_nested_input_with_several_batches_is_rejected() {
        let node = ImageCompareTransition::new(&Config::default());
        let batch = ImageBatch::single(Frame::filled(4, 8, &[0.5, 0.5, 0.5]));
        let mut inputs = inputs(3);
        inputs.insert("image1", NodeValue::NestedImage(vec![batch.clone(), batch]));

        let err = node.invoke(&inputs).unwrap_err();
        assert!(matches!(err, LivePhotoError::Frame(FrameError::NotSqueezable { len: 2 })));
    }

    #[test]
    fn test_frame_count_out_of_range() {
        let node = ImageCompareTransition::new(&Config::default());
        for frames in [1, 121] {
            let err = node.invoke(&inputs(frames)).unwrap_err();
            assert!(matches!(err, LivePhotoError::Node(NodeError::OutOfRange { .. })));
        }
    }
}
