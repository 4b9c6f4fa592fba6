//! Graph nodes exposed to the host
//!
//! Each node declares a [`NodeSchema`] and runs on named [`NodeInputs`].
//! The [`NodeRegistry`] is what a host enumerates and invokes:
//!
//! | Class                    | Menu name                | Category          |
//! |--------------------------|--------------------------|-------------------|
//! | `LivePhotoCreator`       | Create Live Photo        | `image/animation` |
//! | `LivePhotoPreview`       | Preview Live Photo       | `image`           |
//! | `ImageCompareTransition` | Image Compare Transition | `image/animation` |

pub mod creator;
pub mod previewer;
pub mod registry;
pub mod schema;
pub mod traits;
pub mod transition;
pub mod value;

pub use creator::LivePhotoCreator;
pub use previewer::LivePhotoPreview;
pub use registry::NodeRegistry;
pub use schema::{InputSpec, InputType, NodeSchema};
pub use traits::Node;
pub use transition::ImageCompareTransition;
pub use value::{NodeInputs, NodeOutput, NodeValue};
