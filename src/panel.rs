//! Toolkit-free models of the two tool panels.
//!
//! A GUI layer binds widgets to these fields and forwards button clicks to the actions.

use crate::follow_rig::{build_follow_rig, FollowRig};
use crate::host::SceneHost;
use crate::rename::{preview_names, run_rename, RenameInput, RenameStatus, RenameSummary, MAX_INDEX};
use crate::RIGTOOLS_VERSION;

pub const NO_SELECTION_TITLE: &str = "No Selection";
pub const NO_SELECTION_MESSAGE: &str = "Nothing is selected.";

/// A dockable panel.
pub trait Panel {
	const TITLE: &'static str;
	const OBJECT_NAME: &'static str;

	/// Name of the dock control hosting the panel.
	fn workspace_control_name() -> String {
		format!("{}WorkspaceControl", Self::OBJECT_NAME)
	}

	fn is_open(&self) -> bool;

	fn close(&mut self);
}

/// Owns at most one open panel of a kind.
#[derive(Debug)]
pub struct DockSlot<P: Panel> {
	panel: Option<P>,
	floating: bool,
}

impl<P: Panel> Default for DockSlot<P> {
	fn default() -> Self {
		Self {
			panel: None,
			floating: true,
		}
	}
}

impl<P: Panel> DockSlot<P> {
	pub fn new() -> Self {
		Self::default()
	}

	/// Close the current panel, if any, and show `panel` in its place.
	pub fn show(&mut self, panel: P) -> &mut P {
		if let Some(mut previous) = self.panel.take() {
			tracing::debug!("Closing previous {} ({})", P::TITLE, P::workspace_control_name());
			previous.close();
		}
		self.panel.insert(panel)
	}

	pub fn get(&self) -> Option<&P> {
		self.panel.as_ref().filter(|panel| panel.is_open())
	}

	pub fn get_mut(&mut self) -> Option<&mut P> {
		self.panel.as_mut().filter(|panel| panel.is_open())
	}

	pub fn is_floating(&self) -> bool {
		self.floating
	}
}

/// What a panel action produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelOutcome {
	/// The log was updated.
	Logged,
	/// A modal warning should be shown; nothing else happened.
	Warned { title: &'static str, message: &'static str },
}

/// Read-only, scrollable text log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogView {
	text: String,
}

impl LogView {
	pub fn set(&mut self, text: &str) {
		text.clone_into(&mut self.text);
	}

	pub fn append(&mut self, text: &str) {
		let current = self.text.trim_end();
		self.text = if current.is_empty() {
			text.to_owned()
		} else {
			format!("{current}\n{text}")
		};
	}

	pub fn text(&self) -> &str {
		&self.text
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamerPanel {
	pub prefix: String,
	pub base_name: String,
	pub suffix: String,
	start_index: u32,
	padding: usize,
	pub log: LogView,
	open: bool,
}

impl Default for RenamerPanel {
	fn default() -> Self {
		let defaults = RenameInput::default();
		Self {
			prefix: defaults.prefix,
			base_name: defaults.base_name,
			suffix: defaults.suffix,
			start_index: defaults.start_index,
			padding: defaults.padding,
			log: LogView::default(),
			open: true,
		}
	}
}

impl Panel for RenamerPanel {
	const TITLE: &'static str = "ao_renamer_poc";
	const OBJECT_NAME: &'static str = "ao_renamer_poc";

	fn is_open(&self) -> bool {
		self.open
	}

	fn close(&mut self) {
		self.open = false;
	}
}

impl RenamerPanel {
	pub const PADDING_RANGE: (usize, usize) = (1, 6);

	pub fn new() -> Self {
		Self::default()
	}

	pub fn version_label() -> String {
		format!("v{RIGTOOLS_VERSION}")
	}

	pub fn start_index(&self) -> u32 {
		self.start_index
	}

	/// Clamped to `1..=999_999` like the spin box.
	pub fn set_start_index(&mut self, start_index: u32) {
		self.start_index = start_index.clamp(1, MAX_INDEX);
	}

	pub fn padding(&self) -> usize {
		self.padding
	}

	/// Clamped to `1..=6` like the spin box.
	pub fn set_padding(&mut self, padding: usize) {
		let (min, max) = Self::PADDING_RANGE;
		self.padding = padding.clamp(min, max);
	}

	pub fn collect_inputs(&self) -> RenameInput {
		RenameInput {
			prefix: self.prefix.clone(),
			base_name: self.base_name.clone(),
			suffix: self.suffix.clone(),
			start_index: self.start_index,
			padding: self.padding,
		}
	}

	pub fn preview<H: SceneHost + ?Sized>(&mut self, host: &H) -> PanelOutcome {
		if host.selection(false).is_empty() {
			return no_selection();
		}

		match preview_names(host, &self.collect_inputs()) {
			Ok(pairs) if pairs.is_empty() => self.log.set("Preview: no transform targets."),
			Ok(pairs) => {
				let mut lines = vec!["=== Preview ===".to_owned()];
				lines.extend(pairs.iter().map(|(node, new_name)| format!("{node}  ->  {new_name}")));
				self.log.set(&lines.join("\n"));
			}
			Err(err) => self.log.append(&format!("[Preview Failed] {err}")),
		}
		PanelOutcome::Logged
	}

	pub fn rename<H: SceneHost + ?Sized>(&mut self, host: &mut H) -> PanelOutcome {
		if host.selection(false).is_empty() {
			return no_selection();
		}

		let summary = run_rename(host, &self.collect_inputs());
		self.log.set(&format_summary(&summary));
		PanelOutcome::Logged
	}
}

fn no_selection() -> PanelOutcome {
	PanelOutcome::Warned {
		title: NO_SELECTION_TITLE,
		message: NO_SELECTION_MESSAGE,
	}
}

/// Log text for one rename pass.
pub fn format_summary(summary: &RenameSummary) -> String {
	let mut lines = vec![
		"=== Rename Result ===".to_owned(),
		format!("version: {}", RenamerPanel::version_label()),
		format!(
			"selected: {} / targets(transform): {}",
			summary.total_selected, summary.total_targets
		),
		format!(
			"renamed: {}  skipped: {}  failed: {}",
			summary.renamed, summary.skipped, summary.failed
		),
		String::new(),
	];

	for result in &summary.results {
		lines.push(match result.status {
			RenameStatus::Renamed => format!(
				"[OK] {} -> {} ({})",
				result.old_name,
				result.new_name.as_deref().unwrap_or_default(),
				result.message
			),
			RenameStatus::Skipped => format!("[SKIP] {} ({})", result.old_name, result.message),
			RenameStatus::Failed => format!("[FAIL] {} ({})", result.old_name, result.message),
		});
	}

	lines.join("\n")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowRigPanel {
	/// Freeze the group before constraining. On by default.
	pub freeze: bool,
	open: bool,
}

impl Default for FollowRigPanel {
	fn default() -> Self {
		Self {
			freeze: true,
			open: true,
		}
	}
}

impl Panel for FollowRigPanel {
	const TITLE: &'static str = "ao Locator Follow Rig Tool";
	const OBJECT_NAME: &'static str = "aoLocatorFollowRigTool_UI";

	fn is_open(&self) -> bool {
		self.open
	}

	fn close(&mut self) {
		self.open = false;
	}
}

impl FollowRigPanel {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn apply<H: SceneHost + ?Sized>(&self, host: &mut H) -> Option<FollowRig> {
		build_follow_rig(host, self.freeze)
	}
}
