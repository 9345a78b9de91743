pub mod math;
pub mod node;
pub mod render;
pub mod scene;

pub use node::{NodeId, NodeKind, SceneNode};
pub use render::Renderer;
pub use scene::{Scene, SceneConfig, SceneError};
