use crate::config::Config;
use crate::error::Result;
use crate::nodes::schema::{InputSpec, InputType, NodeSchema};
use crate::nodes::traits::Node;
use crate::nodes::value::{NodeInputs, NodeOutput};
use crate::preview::PairPreviewer;

/// Terminal node that shows the video of a Live Photo pair in the UI
pub struct LivePhotoPreview {
    previewer: PairPreviewer,
}

impl LivePhotoPreview {
    pub const CLASS_NAME: &'static str = "LivePhotoPreview";

    pub fn new(config: &Config) -> Self {
        Self {
            previewer: PairPreviewer::new(&config.live_photo),
        }
    }
}

impl Node for LivePhotoPreview {
    fn class_name(&self) -> &str {
        Self::CLASS_NAME
    }

    fn display_name(&self) -> &str {
        "Preview Live Photo"
    }

    fn schema(&self) -> NodeSchema {
        NodeSchema {
            required: vec![InputSpec::new("video", InputType::Video)],
            optional: Vec::new(),
            return_types: Vec::new(),
            return_names: Vec::new(),
            function: "preview".to_string(),
            category: "image".to_string(),
            output_node: true,
        }
    }

    fn execute(&self, inputs: &NodeInputs) -> Result<NodeOutput> {
        let video = inputs.video("video")?;
        Ok(NodeOutput::Ui(self.previewer.preview(&video)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::value::NodeValue;
    use crate::preview::PreviewInput;
    use std::path::Path;

    #[test]
    fn test_schema_is_output_node() {
        let node = LivePhotoPreview::new(&Config::default());
        let schema = node.schema();
        assert!(schema.output_node);
        assert!(schema.return_types.is_empty());
        assert_eq!(schema.required[0].ty, InputType::Video);
    }

    #[test]
    fn test_preview_of_missing_directory_still_succeeds() {
        let node = LivePhotoPreview::new(&Config::default());
        let inputs = NodeInputs::new().with("video", NodeValue::Video(PreviewInput::from("/nowhere/livephoto_x")));
        let output = node.invoke(&inputs).unwrap();
        assert_eq!(
            output.ui().unwrap().video_path(),
            Path::new("/nowhere/livephoto_x/IMG.MOV")
        );
    }

    #[test]
    fn test_preview_accepts_path_fragments() {
        let node = LivePhotoPreview::new(&Config::default());
        let fragments = vec!["/out/".to_string(), "run/IMG.MOV".to_string()];
        let inputs = NodeInputs::new().with("video", NodeValue::Video(fragments.into()));
        let output = node.invoke(&inputs).unwrap();
        assert_eq!(output.ui().unwrap().video_path(), Path::new("/out/run/IMG.MOV"));
    }
}
