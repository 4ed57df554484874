pub mod follow_rig;
pub mod formats;
pub mod host;
pub mod install;
pub mod math;
pub mod node;
pub mod panel;
pub mod rename;
pub mod scene;

pub const RIGTOOLS_VERSION: &str = env!("CARGO_PKG_VERSION");
