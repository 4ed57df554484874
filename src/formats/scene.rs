use glam::Vec3;
use indextree::NodeId;
use json::JsonValue;

use crate::host::{HostError, SceneHost};
use crate::math::transform::TransformChannels;
use crate::node::{NodeKind, SceneNode, UnknownNodeKindError};
use crate::scene::{Scene, SceneTree};

use super::json::{JsonError, JsonObject};

pub type SceneParseResult<T> = Result<T, SceneParseError>;

#[derive(Debug, thiserror::Error)]
pub enum SceneParseError {
	#[error(transparent)]
	JsonParse(#[from] json::Error),
	#[error(transparent)]
	Json(#[from] JsonError),
	#[error(transparent)]
	UnknownNodeKind(#[from] UnknownNodeKindError),
	#[error("Could not build scene: {0}")]
	Host(#[from] HostError),
}

impl SceneParseError {
	fn nested(self, key: &str) -> Self {
		match self {
			SceneParseError::Json(err) => SceneParseError::Json(err.nested(key)),
			_ => self,
		}
	}

	fn in_list(self, index: usize) -> Self {
		match self {
			SceneParseError::Json(err) => SceneParseError::Json(err.in_list(index)),
			_ => self,
		}
	}
}

fn vals<T>(key: &str, res: SceneParseResult<T>) -> SceneParseResult<T> {
	res.map_err(|e| e.nested(key))
}

/// Parse a scene description:
///
/// ```json
/// {
///   "nodes": [{ "name": "objA", "type": "transform", "translation": [0, 1, 0],
///               "children": [{ "name": "objAShape", "type": "mesh" }] }],
///   "selection": ["objA"]
/// }
/// ```
///
/// `type` defaults to `transform`, missing channels to identity.
pub fn load_scene(text: &str) -> SceneParseResult<Scene> {
	let payload = json::parse(text)?;
	let obj = JsonObject::from_value(&payload, "scene")?;

	let mut scene = Scene::new();
	vals("nodes", deserialize_children(&mut scene, None, obj.get_list_or_empty("nodes")?))?;

	let mut selection = Vec::new();
	for (index, value) in obj.get_list_or_empty("selection")?.iter().enumerate() {
		match value.as_str() {
			Some(name) => selection.push(name.to_owned()),
			None => {
				return Err(SceneParseError::from(
					JsonError::ValueIsNotString("selection".to_owned()).in_list(index),
				))
			}
		}
	}
	scene.select(&selection)?;

	Ok(scene)
}

fn deserialize_children(scene: &mut Scene, parent: Option<&str>, list: &[JsonValue]) -> SceneParseResult<()> {
	for (index, value) in list.iter().enumerate() {
		deserialize_node(scene, parent, value).map_err(|e| e.in_list(index))?;
	}
	Ok(())
}

fn deserialize_node(scene: &mut Scene, parent: Option<&str>, value: &JsonValue) -> SceneParseResult<()> {
	let obj = JsonObject::from_value(value, "node")?;

	let name = obj.get_str("name")?;
	let kind = match obj.get_nullable_str("type")? {
		Some(type_name) => NodeKind::try_from(type_name)?,
		None => NodeKind::Transform,
	};
	let channels = TransformChannels::new()
		.with_translation(obj.get_vec3_or("translation", Vec3::ZERO)?)
		.with_rotation(obj.get_vec3_or("rotation", Vec3::ZERO)?)
		.with_scale(obj.get_vec3_or("scale", Vec3::ONE)?);

	let long = scene.add_node(parent, SceneNode::new(name, kind).with_channels(channels))?;
	vals(
		"children",
		deserialize_children(scene, Some(&long), obj.get_list_or_empty("children")?),
	)
}

fn vec3_json(v: Vec3) -> JsonValue {
	JsonValue::Array(vec![v.x.into(), v.y.into(), v.z.into()])
}

/// Constraint nodes are rebuilt by tools, never stored.
fn stored_children(tree: &SceneTree, id: NodeId) -> Vec<NodeId> {
	tree.children(id)
		.into_iter()
		.filter(|child| tree.get(*child).map_or(false, |node| node.kind != NodeKind::ParentConstraint))
		.collect()
}

fn serialize_node(tree: &SceneTree, id: NodeId) -> JsonValue {
	let mut obj = JsonValue::new_object();

	if let Some(node) = tree.get(id) {
		obj["name"] = node.name.as_str().into();
		obj["type"] = node.kind.type_name().into();
		if !node.kind.is_shape() {
			// frozen offsets fold back into plain channels
			let channels = TransformChannels::from_matrix(node.local_matrix());
			obj["translation"] = vec3_json(channels.translation);
			obj["rotation"] = vec3_json(channels.rotation);
			obj["scale"] = vec3_json(channels.scale);
		}
	}

	let children = stored_children(tree, id)
		.into_iter()
		.map(|child| serialize_node(tree, child))
		.collect::<Vec<_>>();
	if !children.is_empty() {
		obj["children"] = JsonValue::Array(children);
	}

	obj
}

/// Write the hierarchy and selection back out. Constraints are not kept.
pub fn dump_scene(scene: &Scene) -> String {
	let tree = scene.tree();
	let nodes = stored_children(tree, tree.root())
		.into_iter()
		.map(|id| serialize_node(tree, id))
		.collect::<Vec<_>>();
	let selection = scene
		.selection(true)
		.into_iter()
		.map(JsonValue::from)
		.collect::<Vec<_>>();

	let mut payload = JsonValue::new_object();
	payload["nodes"] = JsonValue::Array(nodes);
	payload["selection"] = JsonValue::Array(selection);
	json::stringify_pretty(payload, 2)
}

#[cfg(test)]
mod tests {
	use super::*;

	const SCENE: &str = r#"{
		"nodes": [
			{ "name": "rig", "children": [
				{ "name": "objA", "translation": [1, 0, 0],
				  "children": [{ "name": "objAShape", "type": "mesh" }] }
			] },
			{ "name": "objB", "type": "transform", "translation": [5, 2, 0], "rotation": [0, 0.5, 0] }
		],
		"selection": ["objA", "|objB"]
	}"#;

	#[test]
	fn loads_hierarchy_and_selection() {
		let scene = load_scene(SCENE).unwrap();

		assert_eq!(scene.tree().len(), 4);
		assert_eq!(scene.node_type("objAShape").unwrap(), NodeKind::Mesh);
		assert_eq!(scene.parent("objA").unwrap().as_deref(), Some("|rig"));
		assert_eq!(scene.selection(true), vec!["|rig|objA".to_owned(), "|objB".to_owned()]);
		assert_eq!(
			scene.channels("objB").unwrap().rotation,
			Vec3::new(0.0, 0.5, 0.0)
		);
		assert!(scene.channels("rig").unwrap().is_identity());
	}

	#[test]
	fn dump_then_load_keeps_placement() {
		let mut scene = load_scene(SCENE).unwrap();
		scene.freeze_transform("objB").unwrap();

		let reloaded = load_scene(&dump_scene(&scene)).unwrap();
		assert_eq!(reloaded.tree().len(), scene.tree().len());
		assert_eq!(reloaded.selection(true), scene.selection(true));
		assert!(reloaded
			.world_matrix("objB")
			.unwrap()
			.abs_diff_eq(scene.world_matrix("objB").unwrap(), 1e-5));
	}

	#[test]
	fn constraints_are_not_written() {
		let mut scene = load_scene(SCENE).unwrap();
		scene.parent_constraint("objA", "objB", true).unwrap();
		assert_eq!(scene.tree().len(), 5);

		let dumped = dump_scene(&scene);
		assert!(!dumped.contains("parentConstraint"));
		assert_eq!(load_scene(&dumped).unwrap().tree().len(), 4);
	}

	#[test]
	fn errors_point_at_the_node() {
		let err = load_scene(r#"{ "nodes": [{ "name": "a" }, { "type": "mesh" }] }"#).unwrap_err();
		assert_eq!(
			err.to_string(),
			"Error in object at \"nodes\"\n  - Error in list at index 1\n  - Key \"name\" does not exist"
		);

		let err = load_scene(r#"{ "nodes": [{ "name": "a", "type": "joint" }] }"#).unwrap_err();
		assert!(matches!(err, SceneParseError::UnknownNodeKind(_)));

		let err = load_scene(r#"{ "nodes": [], "selection": ["ghost"] }"#).unwrap_err();
		assert!(matches!(err, SceneParseError::Host(HostError::NoSuchNode(_))));

		assert!(matches!(load_scene("{"), Err(SceneParseError::JsonParse(_))));
	}
}
