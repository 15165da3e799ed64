mod app;
mod candidate;
mod celestial;
mod config;
mod drawing;
mod http_client;
mod logging;
mod math;
mod orbit;
mod prediction;
mod scene;
mod settings;
mod starfield;
mod texture;

use app::App;
use clap::Parser;
use config::{AppConfig, ConfigOverrides};
use eframe::egui;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Interactive solar system with an exoplanet candidate classifier"
)]
struct Cli {
    /// TOML config file; missing files fall back to defaults
    #[arg(short, long, default_value = "exo-viz.toml")]
    config: PathBuf,

    /// Base URL of the classifier service
    #[arg(long)]
    backend_url: Option<String>,

    /// Directory holding the planet textures
    #[arg(long)]
    assets_dir: Option<PathBuf>,

    /// Overall prediction request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<f64>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            backend_url: self.backend_url.clone(),
            assets_dir: self.assets_dir.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}

fn load_config(cli: &Cli) -> AppConfig {
    let mut config = AppConfig::load(&cli.config).unwrap_or_else(|err| {
        log::error!("{err}; using defaults");
        AppConfig::default()
    });
    for err in config.apply_overrides(cli.overrides()) {
        log::error!("{err}; ignoring that command-line override");
    }
    config
}

fn main() -> eframe::Result<()> {
    logging::init();
    let cli = Cli::parse();
    let config = load_config(&cli);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1400.0, 900.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Exoplanet Simulator",
        options,
        Box::new(|cc| Ok(Box::new(App::new(cc, config)))),
    )
}
