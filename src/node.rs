use std::fmt;

use glam::Mat4;

use crate::math::transform::TransformChannels;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
	Transform,
	Locator,
	Mesh,
	ParentConstraint,
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown node type {0:?}")]
pub struct UnknownNodeKindError(pub String);

impl NodeKind {
	pub fn type_name(self) -> &'static str {
		match self {
			NodeKind::Transform => "transform",
			NodeKind::Locator => "locator",
			NodeKind::Mesh => "mesh",
			NodeKind::ParentConstraint => "parentConstraint",
		}
	}

	/// Shapes are owned by a transform and never stand on their own in the outliner.
	pub fn is_shape(self) -> bool {
		matches!(self, NodeKind::Locator | NodeKind::Mesh)
	}
}

impl TryFrom<&str> for NodeKind {
	type Error = UnknownNodeKindError;

	fn try_from(value: &str) -> Result<Self, Self::Error> {
		match value {
			"transform" => Ok(NodeKind::Transform),
			"locator" => Ok(NodeKind::Locator),
			"mesh" => Ok(NodeKind::Mesh),
			"parentConstraint" => Ok(NodeKind::ParentConstraint),
			unknown => Err(UnknownNodeKindError(unknown.to_owned())),
		}
	}
}

impl fmt::Display for NodeKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.type_name())
	}
}

#[derive(Debug, Clone)]
pub struct SceneNode {
	pub name: String,
	pub kind: NodeKind,
	pub channels: TransformChannels,
	/// Placement baked in by a freeze, applied between the parent and the channels.
	pub frozen: Mat4,
}

impl SceneNode {
	pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
		Self {
			name: name.into(),
			kind,
			channels: TransformChannels::IDENTITY,
			frozen: Mat4::IDENTITY,
		}
	}

	pub fn with_channels(mut self, channels: TransformChannels) -> Self {
		self.channels = channels;
		self
	}

	/// Matrix relative to the parent.
	pub fn local_matrix(&self) -> Mat4 {
		self.frozen * self.channels.to_matrix()
	}
}
