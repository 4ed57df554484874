use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Parser;
use rigtools::formats::{dump_scene, load_scene};
use rigtools::host::SceneHost;
use rigtools::panel::FollowRigPanel;
use rigtools::scene::HostMessage;
use tracing::{info, warn};
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
	#[arg(help = "Path to a .json scene description with two selected objects")]
	scene_path: PathBuf,
	#[arg(long, help = "Leave the group's transform unfrozen")]
	no_freeze: bool,
	#[arg(long, help = "Select these objects instead of the stored selection")]
	select: Vec<String>,
	#[arg(long, help = "Write the rigged scene here")]
	out: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
	let cli = Cli::parse();

	tracing_subscriber::registry()
		.with(fmt::layer())
		.with(LevelFilter::INFO)
		.init();

	info!("Loading scene");
	let mut scene = load_scene(&fs::read_to_string(&cli.scene_path)?)?;
	if !cli.select.is_empty() {
		scene.select(&cli.select)?;
	}

	let mut panel = FollowRigPanel::new();
	panel.freeze = !cli.no_freeze;

	match panel.apply(&mut scene) {
		Some(rig) => info!("Built rig: locator {} in group {}", rig.locator, rig.group),
		None => warn!("No rig was built"),
	}

	for message in scene.messages() {
		match message {
			HostMessage::Warning(text) => println!("[warning] {text}"),
			HostMessage::Info(text) => println!("{text}"),
		}
	}
	println!("\n== Scene ==\n{scene}");

	if let Some(out) = cli.out {
		fs::write(&out, dump_scene(&scene))?;
		info!("Wrote {}", out.display());
	}

	Ok(())
}
