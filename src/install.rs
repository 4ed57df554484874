//! Drag-and-drop installation: copy the tool into the user's script directory, drop its icon
//! into the preference icon folders and put one button for it on the tool shelf.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

/// What gets installed for one tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolManifest {
	pub shelf: &'static str,
	pub files: &'static [&'static str],
	pub icon: &'static str,
	pub label: &'static str,
	/// Tooltip text. Buttons with the same annotation are treated as older copies of this one.
	pub annotation: &'static str,
	pub overlay_label: &'static str,
	pub command: &'static str,
}

pub const FOLLOW_RIG_TOOL: ToolManifest = ToolManifest {
	shelf: "tool",
	files: &["ao_follow_rig.plugin", "ao_follow_rig_panel.json"],
	icon: "ao_LocatorFollowRigTool_icon.png",
	label: "ao Locator Follow Rig Tool",
	annotation: "ao Locator Follow Rig Tool",
	overlay_label: "",
	command: "rigtools follow-rig",
};

pub const RENAMER_TOOL: ToolManifest = ToolManifest {
	shelf: "tool",
	files: &["ao_renamer.plugin", "ao_renamer_panel.json"],
	icon: "ao_renamer_poc_icon.png",
	label: "ao_renamer_poc",
	annotation: "ao_renamer_poc",
	overlay_label: "",
	command: "rigtools renamer",
};

/// Where the host keeps per-user files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
	/// e.g. `~/Documents/maya`
	pub user_app_dir: PathBuf,
	/// e.g. `2025`
	pub version: String,
}

impl InstallLayout {
	pub fn new(user_app_dir: impl Into<PathBuf>, version: impl Into<String>) -> Self {
		Self {
			user_app_dir: user_app_dir.into(),
			version: version.into(),
		}
	}

	/// Scripts only ever go to one place, so no stale copy shadows the new one.
	pub fn scripts_dir(&self) -> PathBuf {
		self.user_app_dir.join("scripts")
	}

	/// Icon lookup differs between installs, so the icon goes to both the plain and the
	/// Japanese-locale preference folders.
	pub fn icon_dirs(&self) -> [PathBuf; 2] {
		let version_dir = self.user_app_dir.join(&self.version);
		[
			version_dir.join("prefs").join("icons"),
			version_dir.join("ja_JP").join("prefs").join("icons"),
		]
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShelfButton {
	pub label: String,
	pub annotation: String,
	pub image: String,
	pub overlay_label: String,
	pub command: String,
}

impl ShelfButton {
	pub fn for_tool(tool: &ToolManifest) -> Self {
		Self {
			label: tool.label.to_owned(),
			annotation: tool.annotation.to_owned(),
			image: tool.icon.to_owned(),
			overlay_label: tool.overlay_label.to_owned(),
			command: tool.command.to_owned(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShelfError {
	#[error("Shelf {0:?} does not exist")]
	NoSuchShelf(String),
	#[error("Shelf {shelf:?} has no button at {index}")]
	NoSuchButton { shelf: String, index: usize },
}

/// Shelf operations of the host UI.
pub trait ShelfHost {
	fn shelf_exists(&self, shelf: &str) -> bool;

	fn create_shelf(&mut self, shelf: &str);

	fn buttons(&self, shelf: &str) -> Result<Vec<ShelfButton>, ShelfError>;

	fn remove_button(&mut self, shelf: &str, index: usize) -> Result<ShelfButton, ShelfError>;

	fn add_button(&mut self, shelf: &str, button: ShelfButton) -> Result<(), ShelfError>;
}

/// In-memory shelves, in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Shelves {
	shelves: Vec<(String, Vec<ShelfButton>)>,
}

impl Shelves {
	pub fn new() -> Self {
		Self::default()
	}

	fn shelf_mut(&mut self, shelf: &str) -> Result<&mut Vec<ShelfButton>, ShelfError> {
		self.shelves
			.iter_mut()
			.find(|(name, _)| name == shelf)
			.map(|(_, buttons)| buttons)
			.ok_or_else(|| ShelfError::NoSuchShelf(shelf.to_owned()))
	}
}

impl ShelfHost for Shelves {
	fn shelf_exists(&self, shelf: &str) -> bool {
		self.shelves.iter().any(|(name, _)| name == shelf)
	}

	fn create_shelf(&mut self, shelf: &str) {
		if !self.shelf_exists(shelf) {
			self.shelves.push((shelf.to_owned(), Vec::new()));
		}
	}

	fn buttons(&self, shelf: &str) -> Result<Vec<ShelfButton>, ShelfError> {
		self.shelves
			.iter()
			.find(|(name, _)| name == shelf)
			.map(|(_, buttons)| buttons.clone())
			.ok_or_else(|| ShelfError::NoSuchShelf(shelf.to_owned()))
	}

	fn remove_button(&mut self, shelf: &str, index: usize) -> Result<ShelfButton, ShelfError> {
		let buttons = self.shelf_mut(shelf)?;
		if index >= buttons.len() {
			return Err(ShelfError::NoSuchButton {
				shelf: shelf.to_owned(),
				index,
			});
		}
		Ok(buttons.remove(index))
	}

	fn add_button(&mut self, shelf: &str, button: ShelfButton) -> Result<(), ShelfError> {
		self.shelf_mut(shelf)?.push(button);
		Ok(())
	}
}

/// Put exactly one button for `tool` on its shelf, creating the shelf when needed.
/// Returns how many older buttons were replaced.
pub fn register_shelf_button<S: ShelfHost + ?Sized>(shelves: &mut S, tool: &ToolManifest) -> Result<usize, ShelfError> {
	if !shelves.shelf_exists(tool.shelf) {
		shelves.create_shelf(tool.shelf);
	}

	let stale = shelves
		.buttons(tool.shelf)?
		.iter()
		.enumerate()
		.filter(|(_, button)| button.annotation == tool.annotation)
		.map(|(index, _)| index)
		.collect::<Vec<_>>();
	// back to front so earlier indices stay valid
	for index in stale.iter().rev() {
		shelves.remove_button(tool.shelf, *index)?;
	}

	shelves.add_button(tool.shelf, ShelfButton::for_tool(tool))?;
	Ok(stale.len())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
	pub copied_scripts: Vec<PathBuf>,
	pub copied_icons: Vec<PathBuf>,
	pub replaced_buttons: usize,
	pub shelf_registered: bool,
	pub warnings: Vec<String>,
}

impl InstallReport {
	fn warn(&mut self, message: String) {
		warn!("{message}");
		self.warnings.push(message);
	}
}

fn copy_into(src: &Path, dst_dir: &Path) -> io::Result<PathBuf> {
	fs::create_dir_all(dst_dir)?;
	let file_name = src
		.file_name()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "source has no file name"))?;
	let dst = dst_dir.join(file_name);
	fs::copy(src, &dst)?;
	Ok(dst)
}

/// Install `tool` from `source_dir`. Missing files and failed copies are reported as warnings
/// and the remaining steps still run.
pub fn install<S: ShelfHost + ?Sized>(
	source_dir: &Path,
	layout: &InstallLayout,
	shelves: &mut S,
	tool: &ToolManifest,
) -> InstallReport {
	let mut report = InstallReport::default();

	let scripts_dir = layout.scripts_dir();
	for file in tool.files {
		let src = source_dir.join(file);
		if !src.is_file() {
			report.warn(format!("missing file: {}", src.display()));
			continue;
		}
		match copy_into(&src, &scripts_dir) {
			Ok(dst) => report.copied_scripts.push(dst),
			Err(err) => report.warn(format!("copy failed: {} ({err})", scripts_dir.display())),
		}
	}

	let icon = source_dir.join(tool.icon);
	if icon.is_file() {
		for dst_dir in layout.icon_dirs() {
			match copy_into(&icon, &dst_dir) {
				Ok(dst) => report.copied_icons.push(dst),
				Err(err) => report.warn(format!("icon copy failed: {} ({err})", dst_dir.display())),
			}
		}
	} else {
		report.warn(format!("missing icon: {}", icon.display()));
	}

	match register_shelf_button(shelves, tool) {
		Ok(replaced) => {
			report.replaced_buttons = replaced;
			report.shelf_registered = true;
		}
		Err(err) => report.warn(format!("shelf button failed: {err}")),
	}

	info!(
		"Installed {}: {} scripts, {} icons, shelf {:?}",
		tool.label,
		report.copied_scripts.len(),
		report.copied_icons.len(),
		tool.shelf
	);
	report
}
