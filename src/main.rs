//! Webcam face glow mesh sketch.

use anyhow::Result;
use clap::Parser;
use face_glow_mesh::{
    app::{AppConfig, SketchApp, VideoSource},
    config::{Config, EXAMPLE_CONFIG},
};
use log::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Camera index to use
    #[arg(long, default_value = "0")]
    cam: i32,

    /// Video file to process
    #[arg(short, long)]
    video: Option<String>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<String>,

    /// Canvas width, overrides the config file
    #[arg(long)]
    width: Option<i32>,

    /// Canvas height, overrides the config file
    #[arg(long)]
    height: Option<i32>,

    /// Mirror the camera horizontally
    #[arg(short, long)]
    mirror: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Print an example configuration file and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_config {
        print!("{EXAMPLE_CONFIG}");
        return Ok(());
    }

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    info!("Face Glow Mesh");

    let mut settings = match &args.config {
        Some(path) => {
            info!("Loading configuration from: {}", path);
            Config::from_file(path).unwrap_or_else(|e| {
                warn!("Failed to load config file: {}. Using defaults.", e);
                Config::default()
            })
        }
        None => Config::default(),
    };

    if let Some(width) = args.width {
        settings.display.canvas_width = width;
    }
    if let Some(height) = args.height {
        settings.display.canvas_height = height;
    }
    settings.display.mirror |= args.mirror;
    settings.validate()?;

    let config = AppConfig {
        video_source: args.video.map_or(VideoSource::Camera(args.cam), VideoSource::File),
        settings,
    };

    let mut app = SketchApp::new(config)?;
    app.run()?;

    Ok(())
}
