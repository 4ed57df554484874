//! Thin typed accessors over `json` values, reporting the key path on failure.

use glam::Vec3;
use json::JsonValue;

pub type JsonResult<T> = Result<T, JsonError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JsonError {
	#[error("Key {0:?} does not exist")]
	KeyDoesNotExist(String),
	#[error("Value at {0:?} is not an object")]
	ValueIsNotObject(String),
	#[error("Value at {0:?} is not a list")]
	ValueIsNotList(String),
	#[error("Value at {0:?} is not a string")]
	ValueIsNotString(String),
	#[error("Error while parsing vec3 at {key:?}\n  - {msg}")]
	ParseVec3Error { key: String, msg: String },
	#[error("Error in list at index {index}\n  - {inner}")]
	ErrorInList { index: usize, inner: Box<JsonError> },
	#[error("Error in object at {key:?}\n  - {inner}")]
	ErrorInObject { key: String, inner: Box<JsonError> },
}

impl JsonError {
	pub fn nested(self, key: &str) -> Self {
		Self::ErrorInObject {
			key: key.to_owned(),
			inner: Box::new(self),
		}
	}

	pub fn in_list(self, index: usize) -> Self {
		Self::ErrorInList {
			index,
			inner: Box::new(self),
		}
	}
}

pub struct JsonObject<'a>(pub &'a json::object::Object);

impl<'a> JsonObject<'a> {
	/// Wrap a value that must be an object. `key` names it in the error.
	pub fn from_value(value: &'a JsonValue, key: &str) -> JsonResult<Self> {
		match value {
			JsonValue::Object(obj) => Ok(JsonObject(obj)),
			_ => Err(JsonError::ValueIsNotObject(key.to_owned())),
		}
	}

	fn get(&self, key: &str) -> JsonResult<&'a JsonValue> {
		match self.0.get(key) {
			Some(value) => Ok(value),
			None => Err(JsonError::KeyDoesNotExist(key.to_owned())),
		}
	}

	/// `Ok(None)` for a missing or null key.
	fn get_opt(&self, key: &str) -> Option<&'a JsonValue> {
		self.0.get(key).filter(|value| !value.is_null())
	}

	pub fn get_list(&self, key: &str) -> JsonResult<&'a [JsonValue]> {
		match self.get(key)? {
			JsonValue::Array(arr) => Ok(arr),
			_ => Err(JsonError::ValueIsNotList(key.to_owned())),
		}
	}

	/// Missing keys read as an empty list.
	pub fn get_list_or_empty(&self, key: &str) -> JsonResult<&'a [JsonValue]> {
		match self.get_opt(key) {
			None => Ok(&[]),
			Some(JsonValue::Array(arr)) => Ok(arr),
			Some(_) => Err(JsonError::ValueIsNotList(key.to_owned())),
		}
	}

	pub fn get_str(&self, key: &str) -> JsonResult<&'a str> {
		match self.get(key)?.as_str() {
			Some(val) => Ok(val),
			None => Err(JsonError::ValueIsNotString(key.to_owned())),
		}
	}

	pub fn get_nullable_str(&self, key: &str) -> JsonResult<Option<&'a str>> {
		match self.get_opt(key) {
			None => Ok(None),
			Some(val) => match val.as_str() {
				Some(val) => Ok(Some(val)),
				None => Err(JsonError::ValueIsNotString(key.to_owned())),
			},
		}
	}

	/// Missing keys read as `default`.
	pub fn get_vec3_or(&self, key: &str, default: Vec3) -> JsonResult<Vec3> {
		if self.get_opt(key).is_none() {
			return Ok(default);
		}
		self.get_vec3(key)
	}

	pub fn get_vec3(&self, key: &str) -> JsonResult<Vec3> {
		let list = self.get_list(key)?;
		if list.len() != 3 {
			return Err(JsonError::ParseVec3Error {
				key: key.to_owned(),
				msg: format!("expected list of length 3, but has length {}", list.len()),
			});
		}

		let mut xyz = [0.0_f32; 3];
		for (value, out) in list.iter().zip(xyz.iter_mut()) {
			*out = match value.as_f32() {
				Some(val) => val,
				None => {
					return Err(JsonError::ParseVec3Error {
						key: key.to_owned(),
						msg: "expected float, but did not get a number".to_owned(),
					})
				}
			};
		}

		Ok(Vec3::from_array(xyz))
	}
}
