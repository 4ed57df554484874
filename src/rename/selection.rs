use std::collections::HashSet;

use crate::host::SceneHost;
use crate::node::NodeKind;

/// Reduce a selection to the transforms it refers to.
///
/// Shapes are swapped for their parent transform, missing or unresolvable entries are dropped
/// and duplicates collapse onto their first occurrence.
pub fn resolve_targets<H: SceneHost + ?Sized>(host: &H, selection: &[String]) -> Vec<String> {
	let mut seen = HashSet::new();
	let mut targets = Vec::new();

	for name in selection {
		if !host.exists(name) {
			continue;
		}

		let transform = match host.node_type(name) {
			Ok(NodeKind::Transform) => Some(name.clone()),
			Ok(_) => host.parent(name).ok().flatten(),
			Err(_) => None,
		};
		let Some(transform) = transform else {
			continue;
		};

		if !host.exists(&transform) || !matches!(host.node_type(&transform), Ok(NodeKind::Transform)) {
			continue;
		}

		if seen.insert(transform.clone()) {
			targets.push(transform);
		}
	}

	targets
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::math::transform::TransformChannels;
	use crate::node::SceneNode;
	use crate::scene::Scene;

	#[test]
	fn shapes_resolve_to_their_transform() {
		let mut scene = Scene::new();
		let a = scene.add_shape("objA", NodeKind::Mesh, TransformChannels::IDENTITY).unwrap();
		let b = scene.add_shape("objB", NodeKind::Mesh, TransformChannels::IDENTITY).unwrap();

		let selection = vec![
			"|objA|objAShape".to_owned(),
			b.clone(),
			a.clone(),
			"|objB|objBShape".to_owned(),
		];
		assert_eq!(resolve_targets(&scene, &selection), vec![a, b]);
	}

	#[test]
	fn two_shapes_collapse_to_one_target() {
		let mut scene = Scene::new();
		let a = scene.add_shape("objA", NodeKind::Mesh, TransformChannels::IDENTITY).unwrap();
		scene
			.add_node(Some(&a), SceneNode::new("objAShapeOrig", NodeKind::Mesh))
			.unwrap();

		let selection = vec!["|objA|objAShape".to_owned(), "|objA|objAShapeOrig".to_owned()];
		assert_eq!(resolve_targets(&scene, &selection), vec![a]);
	}

	#[test]
	fn missing_and_orphan_entries_are_dropped() {
		let mut scene = Scene::new();
		scene.add_node(None, SceneNode::new("looseShape", NodeKind::Mesh)).unwrap();
		let a = scene.add_node(None, SceneNode::new("a", NodeKind::Transform)).unwrap();
		let constraint_owner = scene.add_node(None, SceneNode::new("b", NodeKind::Transform)).unwrap();
		let constraint = scene
			.add_node(
				Some(&constraint_owner),
				SceneNode::new("b_parentConstraint1", NodeKind::ParentConstraint),
			)
			.unwrap();

		let selection = vec!["|gone".to_owned(), "|looseShape".to_owned(), a.clone(), constraint];
		assert_eq!(resolve_targets(&scene, &selection), vec![a, constraint_owner]);
	}
}
