//! Locator follow rig.
//!
//! With two objects selected (Selection1 then Selection2), builds
//!
//! ```text
//! ao_follow_grp#        <- parent-constrained to Selection1, placed on Selection2
//! └── ao_follow_loc#    <- drives Selection2 through a parent constraint
//! ```
//!
//! Both constraints keep their bind-time offset, so nothing moves when the rig is built.

use crate::host::{owning_transform, HostResult, SceneHost, UndoChunk};

pub const LOCATOR_NAME: &str = "ao_follow_loc#";
pub const GROUP_NAME: &str = "ao_follow_grp#";

pub const SELECTION_WARNING: &str = "Select exactly 2 objects (Selection1 -> Selection2)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowRig {
	/// Long name of the locator, the rig's handle.
	pub locator: String,
	pub group: String,
}

/// Build the rig from the current selection.
///
/// Returns `None` after a host warning when the selection is not exactly two objects or when a
/// step fails. Work done before a failing step is left in place; the undo chunk always closes.
pub fn build_follow_rig<H: SceneHost + ?Sized>(host: &mut H, freeze: bool) -> Option<FollowRig> {
	let selection = host.selection(true);
	let [first, second] = selection.as_slice() else {
		host.warning(SELECTION_WARNING);
		return None;
	};

	let driver = owning_transform(&*host, first);
	let follower = owning_transform(&*host, second);

	let mut chunk = UndoChunk::open(host);
	match build(&mut *chunk, &driver, &follower, freeze) {
		Ok(rig) => {
			chunk.info(&format!(
				"Done: locator={}, group={}, freeze={freeze}",
				rig.locator, rig.group
			));
			Some(rig)
		}
		Err(err) => {
			chunk.warning(&format!("Failed: {err}"));
			None
		}
	}
}

fn build<H: SceneHost + ?Sized>(host: &mut H, driver: &str, follower: &str, freeze: bool) -> HostResult<FollowRig> {
	let locator = host.create_locator(LOCATOR_NAME)?;
	let group = host.group(&[locator.clone()], GROUP_NAME)?;
	// grouping moved the locator, its long name now goes through the group
	let locator = match locator.rsplit('|').next() {
		Some(short) => format!("{group}|{short}"),
		None => locator,
	};

	let placement = host.world_matrix(follower)?;
	host.set_world_matrix(&group, placement)?;

	if freeze {
		host.freeze_transform(&group)?;
	}

	host.parent_constraint(driver, &group, true)?;
	host.parent_constraint(&locator, follower, true)?;

	host.select(&[locator.clone()])?;

	Ok(FollowRig { locator, group })
}
