//! In-memory DAG scene implementing [`SceneHost`].

mod tree;

use std::collections::HashSet;
use std::fmt;

use glam::Mat4;
use indextree::NodeId;
use tracing::{debug, info, warn};

use crate::host::{HostError, HostResult, SceneHost};
use crate::math::transform::{is_invertible, TransformChannels};
use crate::node::{NodeKind, SceneNode};

pub use tree::SceneTree;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostMessage {
	Warning(String),
	Info(String),
}

#[derive(Debug, Clone)]
struct ParentConstraint {
	driver: NodeId,
	driven: NodeId,
	/// `driver_world⁻¹ × driven_world` at bind time.
	offset: Mat4,
}

#[derive(Debug, Default)]
pub struct Scene {
	tree: SceneTree,
	selection: Vec<NodeId>,
	constraints: Vec<ParentConstraint>,
	undo_depth: usize,
	undo_chunks: usize,
	messages: Vec<HostMessage>,
}

/// Scene node names: a letter or underscore, then letters, digits and underscores.
pub fn is_valid_name(name: &str) -> bool {
	let mut chars = name.chars();
	match chars.next() {
		Some(c) if c.is_ascii_alphabetic() || c == '_' => chars.all(|c| c.is_ascii_alphanumeric() || c == '_'),
		_ => false,
	}
}

impl Scene {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn tree(&self) -> &SceneTree {
		&self.tree
	}

	/// Add a node under `parent` (a name) or under the world. Returns the node's long name.
	pub fn add_node(&mut self, parent: Option<&str>, node: SceneNode) -> HostResult<String> {
		let parent_id = match parent {
			Some(parent) => self.resolve(parent)?,
			None => self.tree.root(),
		};
		if !is_valid_name(&node.name) {
			return Err(HostError::InvalidName(node.name));
		}
		if self.tree.sibling_has_name(parent_id, &node.name, None) {
			return Err(HostError::NameTaken(node.name));
		}

		let id = self.tree.add(parent_id, node);
		Ok(self.tree.long_name(id))
	}

	/// Add a transform with a shape under it, the way modeling tools create objects.
	pub fn add_shape(&mut self, name: &str, shape: NodeKind, channels: TransformChannels) -> HostResult<String> {
		let transform = self.add_node(None, SceneNode::new(name, NodeKind::Transform).with_channels(channels))?;
		self.add_node(Some(&transform), SceneNode::new(format!("{name}Shape"), shape))?;
		Ok(transform)
	}

	pub fn channels(&self, name: &str) -> HostResult<TransformChannels> {
		let id = self.resolve(name)?;
		Ok(self.node(id).channels)
	}

	/// Overwrite local channels, then re-solve constraints.
	pub fn set_channels(&mut self, name: &str, channels: TransformChannels) -> HostResult<()> {
		let id = self.resolve(name)?;
		self.node_mut(id).channels = channels;
		self.evaluate()
	}

	pub fn messages(&self) -> &[HostMessage] {
		&self.messages
	}

	pub fn warnings(&self) -> impl Iterator<Item = &str> {
		self.messages.iter().filter_map(|message| match message {
			HostMessage::Warning(text) => Some(text.as_str()),
			HostMessage::Info(_) => None,
		})
	}

	/// Depth of currently open undo chunks.
	pub fn undo_depth(&self) -> usize {
		self.undo_depth
	}

	/// Number of outermost undo chunks closed so far.
	pub fn undo_chunks(&self) -> usize {
		self.undo_chunks
	}

	pub fn constraint_count(&self) -> usize {
		self.constraints.len()
	}

	/// Re-solve every parent constraint. Runs enough passes for chained constraints
	/// to see their drivers' final placement.
	pub fn evaluate(&mut self) -> HostResult<()> {
		let constraints = self.constraints.clone();
		for _ in 0..constraints.len() {
			for constraint in &constraints {
				let target = self.tree.world_matrix(constraint.driver) * constraint.offset;
				self.set_local_from_world(constraint.driven, target)?;
			}
		}
		Ok(())
	}

	fn resolve(&self, name: &str) -> HostResult<NodeId> {
		let found = self.tree.find(name);
		match found.as_slice() {
			[id] => Ok(*id),
			[] => Err(HostError::NoSuchNode(name.to_owned())),
			_ => Err(HostError::AmbiguousName(name.to_owned())),
		}
	}

	fn node(&self, id: NodeId) -> &SceneNode {
		self.tree.get(id).expect("resolved ids stay in the arena")
	}

	fn node_mut(&mut self, id: NodeId) -> &mut SceneNode {
		self.tree.get_mut(id).expect("resolved ids stay in the arena")
	}

	/// Expand `#` in `pattern` (or append a number) until no node uses the name.
	fn unique_name(&self, pattern: &str) -> HostResult<String> {
		if pattern.contains('#') {
			if !is_valid_name(&pattern.replace('#', "1")) {
				return Err(HostError::InvalidName(pattern.to_owned()));
			}
			let mut n = 1_u32;
			loop {
				let candidate = pattern.replace('#', &n.to_string());
				if !self.tree.short_name_taken(&candidate) {
					return Ok(candidate);
				}
				n += 1;
			}
		}

		if !is_valid_name(pattern) {
			return Err(HostError::InvalidName(pattern.to_owned()));
		}
		if !self.tree.short_name_taken(pattern) {
			return Ok(pattern.to_owned());
		}

		let stem = pattern.trim_end_matches(|c: char| c.is_ascii_digit());
		let mut n = 1_u32;
		loop {
			let candidate = format!("{stem}{n}");
			if !self.tree.short_name_taken(&candidate) {
				return Ok(candidate);
			}
			n += 1;
		}
	}

	fn set_local_from_world(&mut self, id: NodeId, world: Mat4) -> HostResult<()> {
		let parent_space = self.tree.parent_space(id);
		if !is_invertible(&parent_space) {
			return Err(HostError::SingularMatrix(self.tree.long_name(id)));
		}
		self.node_mut(id).channels = TransformChannels::from_matrix(parent_space.inverse() * world);
		Ok(())
	}

	/// Whether the world placement of `node` is influenced by `target`,
	/// through the hierarchy or through constraints.
	fn depends_on(&self, node: NodeId, target: NodeId) -> bool {
		let mut stack = vec![node];
		let mut seen = HashSet::new();
		while let Some(current) = stack.pop() {
			if !seen.insert(current) {
				continue;
			}
			let mut ancestor = Some(current);
			while let Some(a) = ancestor {
				if a == target {
					return true;
				}
				stack.extend(self.constraints.iter().filter(|c| c.driven == a).map(|c| c.driver));
				ancestor = self.tree.parent(a);
			}
		}
		false
	}
}

impl SceneHost for Scene {
	fn selection(&self, long: bool) -> Vec<String> {
		self.selection
			.iter()
			.map(|id| {
				let short = self.tree.short_name(*id);
				if !long && self.tree.find(short).len() == 1 {
					short.to_owned()
				} else {
					self.tree.long_name(*id)
				}
			})
			.collect()
	}

	fn select(&mut self, names: &[String]) -> HostResult<()> {
		let ids = names.iter().map(|name| self.resolve(name)).collect::<HostResult<Vec<_>>>()?;
		self.selection = ids;
		Ok(())
	}

	fn node_type(&self, name: &str) -> HostResult<NodeKind> {
		Ok(self.node(self.resolve(name)?).kind)
	}

	fn parent(&self, name: &str) -> HostResult<Option<String>> {
		let id = self.resolve(name)?;
		Ok(self.tree.parent(id).map(|parent| self.tree.long_name(parent)))
	}

	fn create_locator(&mut self, name_pattern: &str) -> HostResult<String> {
		let name = self.unique_name(name_pattern)?;
		let shape_name = self.unique_name(&format!("{name}Shape"))?;

		let root = self.tree.root();
		let transform = self.tree.add(root, SceneNode::new(name, NodeKind::Transform));
		self.tree.add(transform, SceneNode::new(shape_name, NodeKind::Locator));

		let long = self.tree.long_name(transform);
		debug!("Created locator {long}");
		Ok(long)
	}

	fn group(&mut self, children: &[String], name_pattern: &str) -> HostResult<String> {
		let child_ids = children.iter().map(|name| self.resolve(name)).collect::<HostResult<Vec<_>>>()?;
		let parent = match child_ids.first() {
			Some(first) => self.tree.parent_id(*first).unwrap_or(self.tree.root()),
			None => self.tree.root(),
		};
		for child in &child_ids {
			if self.tree.is_ancestor_or_self(*child, parent) {
				return Err(HostError::ParentLoop(self.tree.long_name(*child)));
			}
		}

		let name = self.unique_name(name_pattern)?;
		let group = self.tree.add(parent, SceneNode::new(name, NodeKind::Transform));
		for child in child_ids {
			let world = self.tree.world_matrix(child);
			self.tree.reparent(child, group);
			self.set_local_from_world(child, world)?;
		}

		let long = self.tree.long_name(group);
		debug!("Created group {long}");
		Ok(long)
	}

	fn world_matrix(&self, name: &str) -> HostResult<Mat4> {
		Ok(self.tree.world_matrix(self.resolve(name)?))
	}

	fn set_world_matrix(&mut self, name: &str, mat: Mat4) -> HostResult<()> {
		let id = self.resolve(name)?;
		self.set_local_from_world(id, mat)?;
		self.evaluate()
	}

	fn freeze_transform(&mut self, name: &str) -> HostResult<()> {
		let id = self.resolve(name)?;
		let node = self.node_mut(id);
		if node.kind != NodeKind::Transform {
			return Err(HostError::NotATransform(name.to_owned()));
		}
		node.frozen *= node.channels.to_matrix();
		node.channels = TransformChannels::IDENTITY;
		Ok(())
	}

	fn parent_constraint(&mut self, driver: &str, driven: &str, maintain_offset: bool) -> HostResult<String> {
		let driver_id = self.resolve(driver)?;
		let driven_id = self.resolve(driven)?;
		if self.node(driven_id).kind != NodeKind::Transform {
			return Err(HostError::NotATransform(driven.to_owned()));
		}
		if self.depends_on(driver_id, driven_id) {
			return Err(HostError::Cycle {
				driver: driver.to_owned(),
				driven: driven.to_owned(),
			});
		}

		let offset = if maintain_offset {
			let driver_world = self.tree.world_matrix(driver_id);
			if !is_invertible(&driver_world) {
				return Err(HostError::SingularMatrix(driver.to_owned()));
			}
			driver_world.inverse() * self.tree.world_matrix(driven_id)
		} else {
			Mat4::IDENTITY
		};

		let name = self.unique_name(&format!("{}_parentConstraint#", self.tree.short_name(driven_id)))?;
		let node = self.tree.add(driven_id, SceneNode::new(name, NodeKind::ParentConstraint));
		self.constraints.push(ParentConstraint {
			driver: driver_id,
			driven: driven_id,
			offset,
		});
		self.evaluate()?;

		Ok(self.tree.long_name(node))
	}

	fn rename(&mut self, name: &str, new_name: &str) -> HostResult<String> {
		let id = self.resolve(name)?;
		if !is_valid_name(new_name) {
			return Err(HostError::InvalidName(new_name.to_owned()));
		}
		let parent = self.tree.parent_id(id).unwrap_or(self.tree.root());
		if self.tree.sibling_has_name(parent, new_name, Some(id)) {
			return Err(HostError::NameTaken(new_name.to_owned()));
		}

		new_name.clone_into(&mut self.node_mut(id).name);
		Ok(self.tree.long_name(id))
	}

	fn exists(&self, name: &str) -> bool {
		!self.tree.find(name).is_empty()
	}

	fn ls(&self, pattern: &str) -> Vec<String> {
		if !pattern.contains(['*', '?']) {
			return self.tree.find(pattern).into_iter().map(|id| self.tree.long_name(id)).collect();
		}

		let (pattern, match_long) = if pattern.starts_with('|') {
			(pattern.to_owned(), true)
		} else if pattern.contains('|') {
			(format!("*|{pattern}"), true)
		} else {
			(pattern.to_owned(), false)
		};
		let Ok(pattern) = glob::Pattern::new(&pattern) else {
			return Vec::new();
		};

		self.tree
			.dag_nodes()
			.filter(|id| {
				if match_long {
					pattern.matches(&self.tree.long_name(*id))
				} else {
					pattern.matches(self.tree.short_name(*id))
				}
			})
			.map(|id| self.tree.long_name(id))
			.collect()
	}

	fn open_undo_chunk(&mut self) {
		self.undo_depth += 1;
	}

	fn close_undo_chunk(&mut self) {
		match self.undo_depth {
			0 => warn!("Undo chunk closed without being opened"),
			1 => {
				self.undo_depth = 0;
				self.undo_chunks += 1;
			}
			_ => self.undo_depth -= 1,
		}
	}

	fn warning(&mut self, message: &str) {
		warn!("{message}");
		self.messages.push(HostMessage::Warning(message.to_owned()));
	}

	fn info(&mut self, message: &str) {
		info!("{message}");
		self.messages.push(HostMessage::Info(message.to_owned()));
	}
}

impl fmt::Display for Scene {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(&self.tree, f)
	}
}

#[cfg(test)]
mod tests {
	use glam::Vec3;

	use super::*;

	fn at(x: f32, y: f32, z: f32) -> TransformChannels {
		TransformChannels::new().with_translation(Vec3::new(x, y, z))
	}

	fn translation(mat: Mat4) -> Vec3 {
		mat.w_axis.truncate()
	}

	#[test]
	fn valid_names() {
		assert!(is_valid_name("GEO_arm_jnt_01"));
		assert!(is_valid_name("_hidden"));
		assert!(!is_valid_name("01"));
		assert!(!is_valid_name(""));
		assert!(!is_valid_name("has space"));
		assert!(!is_valid_name("a|b"));
	}

	#[test]
	fn locator_names_are_numbered() {
		let mut scene = Scene::new();
		let first = scene.create_locator("ao_follow_loc#").unwrap();
		let second = scene.create_locator("ao_follow_loc#").unwrap();

		assert_eq!(first, "|ao_follow_loc1");
		assert_eq!(second, "|ao_follow_loc2");
		assert_eq!(scene.node_type("ao_follow_loc1Shape").unwrap(), NodeKind::Locator);
		assert_eq!(scene.parent("ao_follow_loc1Shape").unwrap().as_deref(), Some("|ao_follow_loc1"));
		assert_eq!(scene.create_locator("bad name#"), Err(HostError::InvalidName("bad name#".to_owned())));
	}

	#[test]
	fn taken_plain_name_gets_a_number() {
		let mut scene = Scene::new();
		scene.add_node(None, SceneNode::new("grp", NodeKind::Transform)).unwrap();
		let long = scene.group(&[], "grp").unwrap();
		assert_eq!(long, "|grp1");
	}

	#[test]
	fn group_keeps_world_placement() {
		let mut scene = Scene::new();
		let parent = scene
			.add_node(None, SceneNode::new("parent", NodeKind::Transform).with_channels(at(1.0, 0.0, 0.0)))
			.unwrap();
		let child = scene
			.add_node(Some(&parent), SceneNode::new("child", NodeKind::Transform).with_channels(at(0.0, 2.0, 0.0)))
			.unwrap();
		let before = scene.world_matrix(&child).unwrap();

		let group = scene.group(&[child], "grp#").unwrap();
		assert_eq!(group, "|parent|grp1");
		assert!(scene.exists("|parent|grp1|child"));
		assert!(scene.world_matrix("child").unwrap().abs_diff_eq(before, 1e-5));
	}

	#[test]
	fn group_rejects_parent_loops() {
		let mut scene = Scene::new();
		let a = scene.add_node(None, SceneNode::new("a", NodeKind::Transform)).unwrap();
		let b = scene.add_node(Some(&a), SceneNode::new("b", NodeKind::Transform)).unwrap();

		assert_eq!(
			scene.group(&[b, a.clone()], "grp#"),
			Err(HostError::ParentLoop(a))
		);
		assert!(!scene.exists("grp1"));
	}

	#[test]
	fn set_world_matrix_under_rotated_parent() {
		let mut scene = Scene::new();
		let parent = scene
			.add_node(
				None,
				SceneNode::new("parent", NodeKind::Transform).with_channels(
					at(3.0, 0.0, 0.0)
						.with_rotation(Vec3::new(0.0, 0.0, 1.0))
						.with_scale(Vec3::splat(2.0)),
				),
			)
			.unwrap();
		let child = scene
			.add_node(Some(&parent), SceneNode::new("child", NodeKind::Transform))
			.unwrap();

		let target = at(-4.0, 5.0, 6.0).with_rotation(Vec3::new(0.5, 0.0, 0.0)).to_matrix();
		scene.set_world_matrix(&child, target).unwrap();
		assert!(scene.world_matrix(&child).unwrap().abs_diff_eq(target, 1e-4));
	}

	#[test]
	fn freeze_keeps_world_and_clears_channels() {
		let mut scene = Scene::new();
		let node = scene
			.add_node(
				None,
				SceneNode::new("node", NodeKind::Transform)
					.with_channels(at(1.0, 2.0, 3.0).with_rotation(Vec3::new(0.2, 0.4, 0.0))),
			)
			.unwrap();
		let before = scene.world_matrix(&node).unwrap();

		scene.freeze_transform(&node).unwrap();
		assert!(scene.channels(&node).unwrap().is_identity());
		assert!(scene.world_matrix(&node).unwrap().abs_diff_eq(before, 1e-5));

		let shape = scene
			.add_node(Some(&node), SceneNode::new("nodeShape", NodeKind::Mesh))
			.unwrap();
		assert_eq!(
			scene.freeze_transform(&shape),
			Err(HostError::NotATransform(shape.clone()))
		);
	}

	#[test]
	fn constraint_with_offset_follows_driver() {
		let mut scene = Scene::new();
		let driver = scene.add_shape("driver", NodeKind::Mesh, at(1.0, 0.0, 0.0)).unwrap();
		let driven = scene.add_shape("driven", NodeKind::Mesh, at(5.0, 0.0, 0.0)).unwrap();

		let constraint = scene.parent_constraint(&driver, &driven, true).unwrap();
		assert_eq!(constraint, "|driven|driven_parentConstraint1");
		assert_eq!(scene.node_type(&constraint).unwrap(), NodeKind::ParentConstraint);
		assert!(translation(scene.world_matrix(&driven).unwrap()).abs_diff_eq(Vec3::new(5.0, 0.0, 0.0), 1e-5));

		scene.set_channels(&driver, at(1.0, 3.0, 0.0)).unwrap();
		assert!(translation(scene.world_matrix(&driven).unwrap()).abs_diff_eq(Vec3::new(5.0, 3.0, 0.0), 1e-5));
	}

	#[test]
	fn constraint_without_offset_snaps() {
		let mut scene = Scene::new();
		let driver = scene.add_shape("driver", NodeKind::Mesh, at(1.0, 2.0, 3.0)).unwrap();
		let driven = scene.add_shape("driven", NodeKind::Mesh, at(5.0, 0.0, 0.0)).unwrap();

		scene.parent_constraint(&driver, &driven, false).unwrap();
		assert!(scene
			.world_matrix(&driven)
			.unwrap()
			.abs_diff_eq(scene.world_matrix(&driver).unwrap(), 1e-5));
	}

	#[test]
	fn constraint_cycles_are_rejected() {
		let mut scene = Scene::new();
		let a = scene.add_shape("a", NodeKind::Mesh, at(0.0, 0.0, 0.0)).unwrap();
		let b = scene.add_shape("b", NodeKind::Mesh, at(1.0, 0.0, 0.0)).unwrap();
		scene.parent_constraint(&a, &b, true).unwrap();

		assert!(matches!(scene.parent_constraint(&b, &a, true), Err(HostError::Cycle { .. })));
		assert!(matches!(scene.parent_constraint(&a, &a, true), Err(HostError::Cycle { .. })));
		assert!(matches!(
			scene.parent_constraint("bShape", &a, true),
			Err(HostError::Cycle { .. })
		));
		assert_eq!(scene.constraint_count(), 1);
	}

	#[test]
	fn rename_checks_siblings_only() {
		let mut scene = Scene::new();
		let a = scene.add_node(None, SceneNode::new("a", NodeKind::Transform)).unwrap();
		let b = scene.add_node(None, SceneNode::new("b", NodeKind::Transform)).unwrap();
		let child = scene.add_node(Some(&a), SceneNode::new("child", NodeKind::Transform)).unwrap();

		assert_eq!(scene.rename(&b, "a"), Err(HostError::NameTaken("a".to_owned())));
		assert_eq!(scene.rename(&child, "b").unwrap(), "|a|b");
		assert_eq!(scene.rename(&a, "01"), Err(HostError::InvalidName("01".to_owned())));
		assert_eq!(scene.rename("|a", "renamed").unwrap(), "|renamed");
		assert!(scene.exists("|renamed|b"));
	}

	#[test]
	fn exists_and_ls() {
		let mut scene = Scene::new();
		scene.add_shape("GEO_arm_01", NodeKind::Mesh, at(0.0, 0.0, 0.0)).unwrap();
		scene.add_shape("GEO_leg_01", NodeKind::Mesh, at(0.0, 0.0, 0.0)).unwrap();

		assert!(scene.exists("GEO_arm_01"));
		assert!(scene.exists("|GEO_arm_01|GEO_arm_01Shape"));
		assert!(!scene.exists("GEO_arm_02"));
		assert_eq!(scene.ls("GEO_*_01").len(), 2);
		assert_eq!(scene.ls("GEO_arm_??"), vec!["|GEO_arm_01".to_owned()]);
		assert_eq!(scene.ls("*|GEO_leg_01Shape"), vec!["|GEO_leg_01|GEO_leg_01Shape".to_owned()]);
		assert!(scene.ls("[").is_empty());
	}

	#[test]
	fn selection_names() {
		let mut scene = Scene::new();
		let a = scene.add_node(None, SceneNode::new("a", NodeKind::Transform)).unwrap();
		let c = scene.add_node(None, SceneNode::new("c", NodeKind::Transform)).unwrap();
		let dup_a = scene.add_node(Some(&c), SceneNode::new("a", NodeKind::Transform)).unwrap();

		scene.select(&[c.clone(), dup_a.clone()]).unwrap();
		assert_eq!(scene.selection(false), vec!["c".to_owned(), "|c|a".to_owned()]);
		assert_eq!(scene.selection(true), vec![c, dup_a]);
		assert_eq!(scene.select(&["a".to_owned()]), Err(HostError::AmbiguousName("a".to_owned())));
		assert!(scene.select(&[a]).is_ok());
	}

	#[test]
	fn undo_chunks_nest() {
		let mut scene = Scene::new();
		scene.open_undo_chunk();
		scene.open_undo_chunk();
		scene.close_undo_chunk();
		assert_eq!(scene.undo_depth(), 1);
		assert_eq!(scene.undo_chunks(), 0);
		scene.close_undo_chunk();
		assert_eq!(scene.undo_depth(), 0);
		assert_eq!(scene.undo_chunks(), 1);
		scene.close_undo_chunk();
		assert_eq!(scene.undo_chunks(), 1);
	}
}
