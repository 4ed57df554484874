//! The narrow set of scene-graph verbs the tools need from their host application.
//!
//! Tools only ever talk to a [`SceneHost`]. [`crate::scene::Scene`] is the in-memory implementation.

use std::ops::{Deref, DerefMut};

use glam::Mat4;

use crate::node::NodeKind;

pub type HostResult<T> = Result<T, HostError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
	#[error("No object matches name: {0}")]
	NoSuchNode(String),
	#[error("More than one object matches name: {0}")]
	AmbiguousName(String),
	#[error("{0} is not a transform")]
	NotATransform(String),
	#[error("Invalid object name {0:?}")]
	InvalidName(String),
	#[error("Name {0:?} is already used by a sibling")]
	NameTaken(String),
	#[error("World matrix of {0} cannot be inverted")]
	SingularMatrix(String),
	#[error("Constraining {driven} to {driver} would create a cycle")]
	Cycle { driver: String, driven: String },
	#[error("Cannot parent {0} under itself or one of its descendants")]
	ParentLoop(String),
}

pub trait SceneHost {
	/// Current selection in selection order. `long` returns full `|`-separated paths.
	fn selection(&self, long: bool) -> Vec<String>;

	/// Replace the selection.
	fn select(&mut self, names: &[String]) -> HostResult<()>;

	fn node_type(&self, name: &str) -> HostResult<NodeKind>;

	/// Long name of the parent, `None` for nodes directly under the world.
	fn parent(&self, name: &str) -> HostResult<Option<String>>;

	/// Create a locator at the origin. `#` in the pattern is replaced to make the name unique.
	/// Returns the long name of the locator's transform.
	fn create_locator(&mut self, name_pattern: &str) -> HostResult<String>;

	/// Group `children` under a new transform, keeping their world placement.
	fn group(&mut self, children: &[String], name_pattern: &str) -> HostResult<String>;

	fn world_matrix(&self, name: &str) -> HostResult<Mat4>;

	fn set_world_matrix(&mut self, name: &str, mat: Mat4) -> HostResult<()>;

	/// Bake translate/rotate/scale to identity without moving the node.
	fn freeze_transform(&mut self, name: &str) -> HostResult<()>;

	/// Make `driven` follow `driver`. Returns the constraint node's long name.
	fn parent_constraint(&mut self, driver: &str, driven: &str, maintain_offset: bool) -> HostResult<String>;

	/// Rename in place, returning the new long name.
	fn rename(&mut self, name: &str, new_name: &str) -> HostResult<String>;

	/// Whether `name` resolves to at least one node.
	fn exists(&self, name: &str) -> bool;

	/// Long names of every node matching `pattern` (`*` and `?` wildcards allowed).
	fn ls(&self, pattern: &str) -> Vec<String>;

	fn open_undo_chunk(&mut self);

	fn close_undo_chunk(&mut self);

	/// Non-fatal, user-visible warning.
	fn warning(&mut self, message: &str);

	fn info(&mut self, message: &str);
}

/// Brackets host mutations into one undo step. The chunk is closed on drop.
pub struct UndoChunk<'a, H: SceneHost + ?Sized> {
	host: &'a mut H,
}

impl<'a, H: SceneHost + ?Sized> UndoChunk<'a, H> {
	pub fn open(host: &'a mut H) -> Self {
		host.open_undo_chunk();
		Self { host }
	}
}

impl<H: SceneHost + ?Sized> Deref for UndoChunk<'_, H> {
	type Target = H;

	fn deref(&self) -> &Self::Target {
		self.host
	}
}

impl<H: SceneHost + ?Sized> DerefMut for UndoChunk<'_, H> {
	fn deref_mut(&mut self) -> &mut Self::Target {
		self.host
	}
}

impl<H: SceneHost + ?Sized> Drop for UndoChunk<'_, H> {
	fn drop(&mut self) {
		self.host.close_undo_chunk();
	}
}

/// Long name of the transform owning `name`, or `name` itself when it already is one.
/// Names that cannot be resolved are handed back untouched.
pub fn owning_transform<H: SceneHost + ?Sized>(host: &H, name: &str) -> String {
	match host.node_type(name) {
		Ok(NodeKind::Transform) | Err(_) => name.to_owned(),
		Ok(_) => match host.parent(name) {
			Ok(Some(parent)) => parent,
			_ => name.to_owned(),
		},
	}
}
