//! Batch renaming of selected transforms with a `[PREFIX]_[base]_[suffix]_[index]` template.
//!
//! Every name is checked against the scene before use and the index is bumped until it is free.
//! Targets are processed in selection order and no index is used twice in one pass.

mod compose;
mod selection;
mod unique;

use std::fmt;

use tracing::{debug, info};

use crate::host::SceneHost;

pub use compose::{compose_name, format_base, format_prefix, format_suffix, sanitize_token};
pub use selection::resolve_targets;
pub use unique::{find_unique, name_exists, MAX_INDEX};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenameError {
	#[error("Could not find unique name (index overflow).")]
	IndexOverflow,
}

/// Naming template, rebuilt from the form on every action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameInput {
	pub prefix: String,
	pub base_name: String,
	pub suffix: String,
	pub start_index: u32,
	/// Index digits, `2` gives `01, 02, ...`
	pub padding: usize,
}

impl Default for RenameInput {
	fn default() -> Self {
		Self {
			prefix: String::new(),
			base_name: String::new(),
			suffix: String::new(),
			start_index: 1,
			padding: 2,
		}
	}
}

impl RenameInput {
	pub fn compose(&self, index: u32) -> String {
		compose_name(&self.prefix, &self.base_name, &self.suffix, index, self.padding)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameStatus {
	Renamed,
	Skipped,
	Failed,
}

impl RenameStatus {
	pub fn as_str(self) -> &'static str {
		match self {
			RenameStatus::Renamed => "renamed",
			RenameStatus::Skipped => "skipped",
			RenameStatus::Failed => "failed",
		}
	}
}

impl fmt::Display for RenameStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameItemResult {
	/// Long name after the pass.
	pub node: String,
	pub old_name: String,
	pub new_name: Option<String>,
	pub status: RenameStatus,
	pub message: String,
}

impl RenameItemResult {
	fn renamed(node: String, old_name: String, new_name: String, used_index: u32) -> Self {
		Self {
			node,
			old_name,
			new_name: Some(new_name),
			status: RenameStatus::Renamed,
			message: format!("Used index: {used_index}"),
		}
	}

	fn unchanged(node: String, status: RenameStatus, message: impl Into<String>) -> Self {
		Self {
			old_name: node.clone(),
			node,
			new_name: None,
			status,
			message: message.into(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameSummary {
	pub inputs: RenameInput,
	pub total_selected: usize,
	pub total_targets: usize,
	pub renamed: usize,
	pub skipped: usize,
	pub failed: usize,
	pub results: Vec<RenameItemResult>,
}

impl RenameSummary {
	fn new(inputs: RenameInput, total_selected: usize, total_targets: usize, results: Vec<RenameItemResult>) -> Self {
		let count = |status: RenameStatus| results.iter().filter(|r| r.status == status).count();
		Self {
			renamed: count(RenameStatus::Renamed),
			skipped: count(RenameStatus::Skipped),
			failed: count(RenameStatus::Failed),
			inputs,
			total_selected,
			total_targets,
			results,
		}
	}
}

/// Rename every selected transform in selection order.
///
/// The index cursor starts at `input.start_index` and moves to `used + 1` after each rename.
/// A target that vanished before its turn leaves the cursor alone, a failed rename still
/// moves it one step so the same slot is not retried forever.
pub fn run_rename<H: SceneHost + ?Sized>(host: &mut H, input: &RenameInput) -> RenameSummary {
	let selected = host.selection(true);
	let targets = resolve_targets(&*host, &selected);

	let mut results = Vec::with_capacity(targets.len());
	let mut index = input.start_index.max(1);

	for node in &targets {
		if !host.exists(node) {
			results.push(RenameItemResult::unchanged(
				node.clone(),
				RenameStatus::Failed,
				"Node does not exist.",
			));
			continue;
		}

		let (new_name, used_index) = match find_unique(&*host, input, index) {
			Ok(found) => found,
			Err(err) => {
				results.push(RenameItemResult::unchanged(node.clone(), RenameStatus::Failed, err.to_string()));
				index = index.saturating_add(1);
				continue;
			}
		};

		if new_name.is_empty() {
			results.push(RenameItemResult::unchanged(
				node.clone(),
				RenameStatus::Skipped,
				"New name is empty.",
			));
			continue;
		}

		match host.rename(node, &new_name) {
			Ok(renamed) => {
				debug!("{node} -> {renamed}");
				results.push(RenameItemResult::renamed(renamed, node.clone(), new_name, used_index));
				index = used_index.saturating_add(1);
			}
			Err(err) => {
				results.push(RenameItemResult::unchanged(node.clone(), RenameStatus::Failed, err.to_string()));
				index = index.saturating_add(1);
			}
		}
	}

	let summary = RenameSummary::new(input.clone(), selected.len(), targets.len(), results);
	info!(
		"Renamed {} of {} targets ({} skipped, {} failed)",
		summary.renamed, summary.total_targets, summary.skipped, summary.failed
	);
	summary
}

/// Names `run_rename` would pick against the current scene, without renaming anything.
///
/// Candidates are not reserved between targets, so a later target may be shown a name an earlier
/// rename would take from it.
pub fn preview_names<H: SceneHost + ?Sized>(
	host: &H,
	input: &RenameInput,
) -> Result<Vec<(String, String)>, RenameError> {
	let selected = host.selection(true);
	let targets = resolve_targets(host, &selected);

	let mut previews = Vec::with_capacity(targets.len());
	let mut index = input.start_index.max(1);
	for node in targets {
		let (new_name, used_index) = find_unique(host, input, index)?;
		previews.push((node, new_name));
		index = used_index.saturating_add(1);
	}

	Ok(previews)
}
