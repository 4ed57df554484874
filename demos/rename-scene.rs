use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Parser;
use rigtools::formats::{dump_scene, load_scene};
use rigtools::panel::{PanelOutcome, RenamerPanel};
use tracing::info;
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
	#[arg(help = "Path to a .json scene description")]
	scene_path: PathBuf,
	#[arg(long, default_value = "")]
	prefix: String,
	#[arg(long = "base", default_value = "")]
	base_name: String,
	#[arg(long, default_value = "")]
	suffix: String,
	#[arg(long, default_value_t = 1)]
	start: u32,
	#[arg(long, default_value_t = 2)]
	padding: usize,
	#[arg(long, help = "Only show the names that would be used")]
	preview: bool,
	#[arg(long, help = "Write the renamed scene here")]
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

	let mut panel = RenamerPanel::new();
	panel.prefix = cli.prefix;
	panel.base_name = cli.base_name;
	panel.suffix = cli.suffix;
	panel.set_start_index(cli.start);
	panel.set_padding(cli.padding);

	let outcome = if cli.preview {
		panel.preview(&scene)
	} else {
		panel.rename(&mut scene)
	};

	match outcome {
		PanelOutcome::Logged => println!("{}", panel.log.text()),
		PanelOutcome::Warned { title, message } => {
			println!("{title}: {message}");
			return Ok(());
		}
	}

	println!("\n== Scene ==\n{scene}");

	if let Some(out) = cli.out {
		fs::write(&out, dump_scene(&scene))?;
		info!("Wrote {}", out.display());
	}

	Ok(())
}
