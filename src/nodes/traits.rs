use crate::error::Result;
use crate::nodes::schema::NodeSchema;
use crate::nodes::value::{NodeInputs, NodeOutput};

/// Core trait that every graph node implements
pub trait Node: Send + Sync {
    /// Unique class name the host registers the node under
    fn class_name(&self) -> &str;

    /// Human-readable name shown in the node menu
    fn display_name(&self) -> &str;

    /// Declared inputs, outputs and category
    fn schema(&self) -> NodeSchema;

    /// Run the node on already validated inputs
    ///
    /// # Arguments
    ///
    /// * `inputs` - Named input values, checked against [`Node::schema`]
    ///
    /// # Returns
    ///
    /// Positional values in the order of the schema's return types, or a UI
    /// payload for output nodes.
    fn execute(&self, inputs: &NodeInputs) -> Result<NodeOutput>;

    /// Validate `inputs` against the schema, then execute
    fn invoke(&self, inputs: &NodeInputs) -> Result<NodeOutput> {
        self.schema().validate(inputs)?;
        self.execute(inputs)
    }
}
