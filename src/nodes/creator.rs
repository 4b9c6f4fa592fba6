use tracing::info;

use crate::config::{Config, LivePhotoConfig};
use crate::error::{NodeError, Result};
use crate::live_photo::{LivePhotoAssembler, LivePhotoRequest};
use crate::nodes::schema::{InputSpec, InputType, NodeSchema};
use crate::nodes::traits::Node;
use crate::nodes::value::{NodeInputs, NodeOutput, NodeValue};
use crate::preview::PreviewInput;

const MAX_FPS: f64 = 60.0;

/// Turns an image batch (and optional soundtrack) into a Live Photo pair
///
/// Outputs the key frame, the video path and the result directory.
pub struct LivePhotoCreator {
    assembler: LivePhotoAssembler,
    config: LivePhotoConfig,
}

impl LivePhotoCreator {
    pub const CLASS_NAME: &'static str = "LivePhotoCreator";

    pub fn new(config: &Config) -> Self {
        Self::with_assembler(config, LivePhotoAssembler::new(config))
    }

    pub fn with_assembler(config: &Config, assembler: LivePhotoAssembler) -> Self {
        Self {
            assembler,
            config: config.live_photo.clone(),
        }
    }
}

impl Node for LivePhotoCreator {
    fn class_name(&self) -> &str {
        Self::CLASS_NAME
    }

    fn display_name(&self) -> &str {
        "Create Live Photo"
    }

    fn schema(&self) -> NodeSchema {
        NodeSchema {
            required: vec![
                InputSpec::new("images", InputType::Image),
                InputSpec::new("key_frame_index", InputType::Int)
                    .with_default(0.0)
                    .with_min(0.0)
                    .with_step(1.0),
                InputSpec::new("duration", InputType::Float)
                    .with_default(self.config.default_duration)
                    .with_range(self.config.min_duration, self.config.max_duration)
                    .with_step(0.1),
                InputSpec::new("fps", InputType::Float)
                    .with_default(self.config.default_fps)
                    .with_range(1.0, MAX_FPS)
                    .with_step(1.0),
            ],
            optional: vec![InputSpec::new("audio", InputType::Audio)],
            return_types: vec![InputType::Image, InputType::Video, InputType::String],
            return_names: vec![
                "photo".to_string(),
                "video".to_string(),
                "output_path".to_string(),
            ],
            function: "create_live_photo".to_string(),
            category: "image/animation".to_string(),
            output_node: false,
        }
    }

    fn execute(&self, inputs: &NodeInputs) -> Result<NodeOutput> {
        let key_frame = inputs.int("key_frame_index")?;
        let key_frame_index = usize::try_from(key_frame).map_err(|_| NodeError::OutOfRange {
            input: "key_frame_index".to_string(),
            value: key_frame as f64,
            min: 0.0,
            max: f64::INFINITY,
        })?;

        let request = LivePhotoRequest {
            images: inputs.image("images")?.clone(),
            key_frame_index,
            duration: inputs.float("duration")?,
            fps: inputs.float("fps")?,
            audio: inputs.audio("audio")?.cloned(),
        };

        let output = self.assembler.create(request)?;
        info!(
            "Live photo ready in {} (audio: {})",
            output.output_dir.display(),
            output.had_audio
        );

        Ok(NodeOutput::Values(vec![
            NodeValue::Image(output.photo),
            NodeValue::Video(PreviewInput::from(output.video_path.as_path())),
            NodeValue::String(output.output_dir.display().to_string()),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LivePhotoError;
    use crate::frame::{Frame, ImageBatch};
    use crate::video::{MediaEncoder, TranscodeJob};
    use std::path::{Path, PathBuf};
    use tempfile::{tempdir, TempDir};

    struct PlaceholderEncoder;

    impl MediaEncoder for PlaceholderEncoder {
        fn name(&self) -> &str {
            "placeholder"
        }

        fn encode_frames(&self, _frames: &ImageBatch, _fps: f64, output: &Path) -> Result<()> {
            std::fs::write(output, b"mp4")?;
            Ok(())
        }

        fn transcode(&self, job: &TranscodeJob) -> Result<()> {
            std::fs::write(&job.output, b"mov")?;
            Ok(())
        }
    }

    fn creator() -> (TempDir, LivePhotoCreator) {
        let dir = tempdir().unwrap();
        let mut config = Config::default();
        config.paths.output_root = dir.path().join("output");
        config.paths.temp_root = dir.path().join("tmp");
        let assembler = LivePhotoAssembler::with_encoder(&config, Box::new(PlaceholderEncoder));
        (dir, LivePhotoCreator::with_assembler(&config, assembler))
    }

    fn frames(n: usize) -> ImageBatch {
        ImageBatch::new((0..n).map(|i| Frame::filled(4, 4, &[i as f32 / 10.0, 0.0, 0.0])).collect()).unwrap()
    }

    fn inputs(key_frame: i64) -> NodeInputs {
        NodeInputs::new()
            .with("images", NodeValue::Image(frames(5)))
            .with("key_frame_index", NodeValue::Int(key_frame))
            .with("duration", NodeValue::Float(3.0))
            .with("fps", NodeValue::Float(30.0))
    }

    #[test]
    fn test_schema() {
        let (_dir, creator) = creator();
        let schema = creator.schema();
        assert_eq!(schema.return_types, vec![InputType::Image, InputType::Video, InputType::String]);
        assert_eq!(schema.return_names, vec!["photo", "video", "output_path"]);

        let duration = schema.input("duration").unwrap();
        assert_eq!(duration.default, Some(3.0));
        assert_eq!((duration.min, duration.max), (Some(1.0), Some(5.0)));
        assert_eq!(schema.optional[0].ty, InputType::Audio);
        assert!(!schema.output_node);
    }

    #[test]
    fn test_invoke_returns_photo_video_and_directory() {
        let (_dir, creator) = creator();
        let output = creator.invoke(&inputs(2)).unwrap();
        let values = output.values().unwrap();
        assert_eq!(values.len(), 3);

        let photo = values[0].as_image().unwrap();
        assert_eq!(photo.len(), 1);
        assert!((photo.frames()[0].get(0, 0, 0) - 0.2).abs() < 1e-6);

        let video = PathBuf::from(values[1].as_video().unwrap().joined());
        assert!(video.ends_with("IMG.MOV"));
        assert!(video.exists());

        let dir = PathBuf::from(values[2].as_str().unwrap());
        assert_eq!(video.parent().unwrap(), dir.as_path());
        assert!(dir.join("IMG.JPG").exists());
    }

    #[test]
    fn test_duration_outside_range_is_rejected() {
        let (_dir, creator) = creator();
        let mut inputs = inputs(0);
        inputs.insert("duration", NodeValue::Float(6.0));
        let err = creator.invoke(&inputs).unwrap_err();
        assert!(matches!(err, LivePhotoError::Node(NodeError::OutOfRange { .. })));
    }

    #[test]
    fn test_negative_key_frame_is_rejected() {
        let (_dir, creator) = creator();
        assert!(creator.invoke(&inputs(-1)).is_err());
    }
}
