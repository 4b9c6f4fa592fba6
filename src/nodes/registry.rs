use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value};

use crate::config::Config;
use crate::error::{NodeError, Result};
use crate::nodes::{ImageCompareTransition, LivePhotoCreator, LivePhotoPreview, Node};

type NodeFactory = Box<dyn Fn() -> Box<dyn Node> + Send + Sync>;

/// Registry of the node classes exposed to the host
///
/// Nodes are registered by class name and instantiated on demand, each with
/// its own copy of the configuration the registry was built from.
pub struct NodeRegistry {
    nodes: HashMap<String, NodeFactory>,
}

impl NodeRegistry {
    /// Create a registry with all built-in nodes
    pub fn new(config: &Config) -> Self {
        let mut registry = Self {
            nodes: HashMap::new(),
        };

        registry.register_builtin_nodes(config);
        registry
    }

    fn register_builtin_nodes(&mut self, config: &Config) {
        let creator = config.clone();
        self.register(LivePhotoCreator::CLASS_NAME, move || {
            Box::new(LivePhotoCreator::new(&creator))
        });

        let preview = config.clone();
        self.register(LivePhotoPreview::CLASS_NAME, move || {
            Box::new(LivePhotoPreview::new(&preview))
        });

        let transition = config.clone();
        self.register(ImageCompareTransition::CLASS_NAME, move || {
            Box::new(ImageCompareTransition::new(&transition))
        });
    }

    /// Register a node class
    ///
    /// # Arguments
    ///
    /// * `class_name` - Unique class name; an existing entry is replaced
    /// * `factory` - Function that creates new instances of the node
    pub fn register<F>(&mut self, class_name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn Node> + Send + Sync + 'static,
    {
        self.nodes.insert(class_name.into(), Box::new(factory));
    }

    /// Get a node by class name
    pub fn get_node(&self, class_name: &str) -> Option<Box<dyn Node>> {
        self.nodes.get(class_name).map(|factory| factory())
    }

    /// Like [`NodeRegistry::get_node`], failing for unknown classes
    pub fn create(&self, class_name: &str) -> Result<Box<dyn Node>> {
        self.get_node(class_name).ok_or_else(|| {
            NodeError::UnknownNode {
                name: class_name.to_string(),
            }
            .into()
        })
    }

    /// Registered class names, sorted
    pub fn available_nodes(&self) -> Vec<String> {
        let mut names: Vec<String> = self.nodes.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn has_node(&self, class_name: &str) -> bool {
        self.nodes.contains_key(class_name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Class name to menu name
    pub fn display_names(&self) -> BTreeMap<String, String> {
        self.nodes
            .iter()
            .map(|(name, factory)| (name.clone(), factory().display_name().to_string()))
            .collect()
    }

    /// Schemas of every registered node, keyed by class name
    pub fn object_info(&self) -> Value {
        let info: Map<String, Value> = self
            .available_nodes()
            .into_iter()
            .filter_map(|name| {
                let node = self.get_node(&name)?;
                let schema = node.schema().to_json(node.class_name(), node.display_name());
                Some((name, schema))
            })
            .collect();
        Value::Object(info)
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LivePhotoError;
    use serde_json::json;

    #[test]
    fn test_builtin_nodes_available() {
        let registry = NodeRegistry::default();

        assert!(registry.has_node("LivePhotoCreator"));
        assert!(registry.has_node("LivePhotoPreview"));
        assert!(registry.has_node("ImageCompareTransition"));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_unknown_node() {
        let registry = NodeRegistry::default();
        assert!(registry.get_node("Upscaler").is_none());

        let err = registry.create("Upscaler").err().unwrap();
        assert!(matches!(err, LivePhotoError::Node(NodeError::UnknownNode { .. })));
        assert!(err.user_message().contains("LivePhotoCreator"));
    }

    #[test]
    fn test_display_names() {
        let names = NodeRegistry::default().display_names();
        assert_eq!(names["LivePhotoCreator"], "Create Live Photo");
        assert_eq!(names["LivePhotoPreview"], "Preview Live Photo");
        assert_eq!(names["ImageCompareTransition"], "Image Compare Transition");
    }

    #[test]
    fn test_object_info() {
        let info = NodeRegistry::default().object_info();

        let creator = &info["LivePhotoCreator"];
        assert_eq!(creator["output"], json!(["IMAGE", "VIDEO", "STRING"]));
        assert_eq!(creator["category"], json!("image/animation"));
        assert_eq!(creator["input"]["optional"]["audio"], json!(["AUDIO"]));

        let preview = &info["LivePhotoPreview"];
        assert_eq!(preview["output_node"], json!(true));
        assert_eq!(preview["function"], json!("preview"));

        let transition = &info["ImageCompareTransition"];
        assert_eq!(
            transition["input"]["required"]["frames"],
            json!(["INT", {"default": 30, "min": 2, "max": 120, "step": 1}])
        );
    }

    #[test]
    fn test_custom_node_registration() {
        let mut registry = NodeRegistry::default();
        registry.register("LivePhotoPreviewCopy", || {
            Box::new(LivePhotoPreview::new(&Config::default()))
        });

        assert!(registry.has_node("LivePhotoPreviewCopy"));
        assert_eq!(registry.len(), 4);
    }
}
