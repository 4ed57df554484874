use crate::host::SceneHost;

use super::compose::compose_name;
use super::{RenameError, RenameInput};

/// Highest index tried before giving up on a template.
pub const MAX_INDEX: u32 = 999_999;

/// Whether any node already answers to `name`, either as an identifier or as a pattern.
pub fn name_exists<H: SceneHost + ?Sized>(host: &H, name: &str) -> bool {
	if name.is_empty() {
		return false;
	}
	host.exists(name) || !host.ls(name).is_empty()
}

/// First name built from `input` at `start_index` or above that no node uses yet.
/// Returns the name with the index it was built from.
pub fn find_unique<H: SceneHost + ?Sized>(
	host: &H,
	input: &RenameInput,
	start_index: u32,
) -> Result<(String, u32), RenameError> {
	let padding = input.padding.max(1);
	let mut index = start_index.max(1);

	while index <= MAX_INDEX {
		let candidate = compose_name(&input.prefix, &input.base_name, &input.suffix, index, padding);
		if !name_exists(host, &candidate) {
			return Ok((candidate, index));
		}
		index += 1;
	}

	Err(RenameError::IndexOverflow)
}
