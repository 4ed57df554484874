use std::fmt::Display;

use glam::Mat4;
use indextree::{Arena, NodeId};

use crate::node::{NodeKind, SceneNode};

/// DAG hierarchy under an unnamed world root.
#[derive(Debug)]
pub struct SceneTree {
	root: NodeId,
	arena: Arena<SceneNode>,
}

impl Default for SceneTree {
	fn default() -> Self {
		Self::new()
	}
}

impl SceneTree {
	pub fn new() -> Self {
		let mut arena = Arena::new();
		let root = arena.new_node(SceneNode::new("", NodeKind::Transform));
		Self { root, arena }
	}

	pub fn root(&self) -> NodeId {
		self.root
	}

	pub fn add(&mut self, parent: NodeId, node: SceneNode) -> NodeId {
		let id = self.arena.new_node(node);
		parent.append(id, &mut self.arena);
		id
	}

	pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
		Some(self.arena.get(id)?.get())
	}

	pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
		Some(self.arena.get_mut(id)?.get_mut())
	}

	/// Parent in the arena, the world root included.
	pub fn parent_id(&self, id: NodeId) -> Option<NodeId> {
		self.arena.get(id)?.parent()
	}

	/// Parent DAG node, `None` directly under the world.
	pub fn parent(&self, id: NodeId) -> Option<NodeId> {
		self.parent_id(id).filter(|parent| *parent != self.root)
	}

	pub fn children(&self, id: NodeId) -> Vec<NodeId> {
		id.children(&self.arena).collect()
	}

	/// Move `id` under `new_parent`, keeping its local channels.
	pub fn reparent(&mut self, id: NodeId, new_parent: NodeId) {
		id.detach(&mut self.arena);
		new_parent.append(id, &mut self.arena);
	}

	/// Every DAG node in pre-order, the world root excluded.
	pub fn dag_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
		self.root.descendants(&self.arena).skip(1)
	}

	pub fn len(&self) -> usize {
		self.dag_nodes().count()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// `true` if `ancestor` is `id` or one of its parents.
	pub fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
		id.ancestors(&self.arena).any(|a| a == ancestor)
	}

	pub fn short_name(&self, id: NodeId) -> &str {
		self.get(id).map(|node| node.name.as_str()).unwrap_or_default()
	}

	pub fn long_name(&self, id: NodeId) -> String {
		let mut names = id
			.ancestors(&self.arena)
			.filter(|a| *a != self.root)
			.map(|a| self.short_name(a))
			.collect::<Vec<_>>();
		names.reverse();

		let mut long = String::new();
		for name in names {
			long.push('|');
			long.push_str(name);
		}
		long
	}

	/// Nodes matching a long name (`|a|b`), a trailing partial path (`a|b`) or a short name.
	pub fn find(&self, name: &str) -> Vec<NodeId> {
		if name.is_empty() {
			return Vec::new();
		}

		if name.starts_with('|') {
			return self.find_long(name).into_iter().collect();
		}

		if name.contains('|') {
			let tail = format!("|{name}");
			return self.dag_nodes().filter(|id| self.long_name(*id).ends_with(&tail)).collect();
		}

		self.dag_nodes().filter(|id| self.short_name(*id) == name).collect()
	}

	fn find_long(&self, long: &str) -> Option<NodeId> {
		let mut current = self.root;
		for part in long.split('|').skip(1) {
			current = current
				.children(&self.arena)
				.find(|child| self.short_name(*child) == part)?;
		}
		(current != self.root).then_some(current)
	}

	/// Whether any DAG node is called `name`.
	pub fn short_name_taken(&self, name: &str) -> bool {
		self.dag_nodes().any(|id| self.short_name(id) == name)
	}

	/// Whether a child of `parent` other than `except` is called `name`.
	pub fn sibling_has_name(&self, parent: NodeId, name: &str, except: Option<NodeId>) -> bool {
		parent
			.children(&self.arena)
			.any(|child| Some(child) != except && self.short_name(child) == name)
	}

	pub fn world_matrix(&self, id: NodeId) -> Mat4 {
		let mut chain = id.ancestors(&self.arena).collect::<Vec<_>>();
		chain.reverse();
		chain
			.into_iter()
			.filter_map(|a| self.get(a))
			.fold(Mat4::IDENTITY, |world, node| world * node.local_matrix())
	}

	/// World matrix of the space the node's channels live in.
	pub fn parent_space(&self, id: NodeId) -> Mat4 {
		let parent_world = match self.parent_id(id) {
			Some(parent) => self.world_matrix(parent),
			None => Mat4::IDENTITY,
		};
		let frozen = self.get(id).map(|node| node.frozen).unwrap_or(Mat4::IDENTITY);
		parent_world * frozen
	}
}

fn rec_fmt(indent: usize, f: &mut std::fmt::Formatter<'_>, node_id: NodeId, arena: &Arena<SceneNode>) -> std::fmt::Result {
	let Some(node) = arena.get(node_id) else {
		return Ok(());
	};

	let node = node.get();

	let type_name = node.kind.type_name();
	#[cfg(feature = "owo")]
	let type_name = {
		use owo_colors::OwoColorize;
		type_name.magenta()
	};

	writeln!(f, "{}- [{}] {}", "  ".repeat(indent), type_name, node.name)?;
	for child in node_id.children(arena) {
		rec_fmt(indent + 1, f, child, arena)?;
	}

	Ok(())
}

impl Display for SceneTree {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		if self.root.children(&self.arena).next().is_none() {
			return write!(f, "(empty)");
		}

		for child in self.root.children(&self.arena) {
			rec_fmt(0, f, child, &self.arena)?;
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use glam::Vec3;

	use super::*;
	use crate::math::transform::TransformChannels;

	fn transform(name: &str) -> SceneNode {
		SceneNode::new(name, NodeKind::Transform)
	}

	#[test]
	fn long_names_and_lookup() {
		let mut tree = SceneTree::new();
		let a = tree.add(tree.root(), transform("a"));
		let b = tree.add(a, transform("b"));
		let c = tree.add(tree.root(), transform("c"));
		let b2 = tree.add(c, transform("b"));

		assert_eq!(tree.long_name(b), "|a|b");
		assert_eq!(tree.find("|a|b"), vec![b]);
		assert_eq!(tree.find("c|b"), vec![b2]);
		assert_eq!(tree.find("b").len(), 2);
		assert!(tree.find("|b").is_empty());
		assert!(tree.find("").is_empty());
		assert_eq!(tree.parent(b), Some(a));
		assert_eq!(tree.parent(a), None);
		assert_eq!(tree.len(), 4);
	}

	#[test]
	fn world_matrix_accumulates_parents() {
		let mut tree = SceneTree::new();
		let a = tree.add(
			tree.root(),
			transform("a").with_channels(TransformChannels::new().with_translation(Vec3::new(1.0, 0.0, 0.0))),
		);
		let b = tree.add(
			a,
			transform("b").with_channels(TransformChannels::new().with_translation(Vec3::new(0.0, 2.0, 0.0))),
		);

		let world = tree.world_matrix(b);
		assert!(world.w_axis.truncate().abs_diff_eq(Vec3::new(1.0, 2.0, 0.0), 1e-6));
	}

	#[test]
	fn reparent_moves_subtree() {
		let mut tree = SceneTree::new();
		let a = tree.add(tree.root(), transform("a"));
		let b = tree.add(tree.root(), transform("b"));
		let shape = tree.add(b, SceneNode::new("bShape", NodeKind::Mesh));

		tree.reparent(b, a);
		assert_eq!(tree.long_name(shape), "|a|b|bShape");
		assert!(tree.is_ancestor_or_self(a, shape));
		assert!(tree.sibling_has_name(a, "b", None));
		assert!(!tree.sibling_has_name(a, "b", Some(b)));
	}

	#[test]
	fn display_tree() {
		let mut tree = SceneTree::new();
		assert_eq!(tree.to_string(), "(empty)");

		let a = tree.add(tree.root(), transform("a"));
		tree.add(a, SceneNode::new("aShape", NodeKind::Locator));

		#[cfg(not(feature = "owo"))]
		assert_eq!(tree.to_string(), "- [transform] a\n  - [locator] aShape\n");
	}
}
