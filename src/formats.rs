mod json;
mod scene;

pub use json::JsonError;
pub use scene::{dump_scene, load_scene, SceneParseError};
