use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;

use jpq::app::App;
use jpq::config::Config;
use jpq::logging;
use jpq::routes::Route;

#[derive(Parser, Debug)]
#[command(name = "jpq")]
#[command(about = "A terminal client for the JSONPlaceholder demo API")]
#[command(version)]
struct Args {
  /// Path to config file (default: ./jpq.yaml or $XDG_CONFIG_HOME/jpq/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Screen to open first: /, /posts or /users
  #[arg(short, long)]
  route: Option<String>,

  /// API base URL
  #[arg(long)]
  base_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  let mut config = Config::load(args.config.as_deref())?;

  // Command line wins over the config file
  if let Some(route) = args.route {
    if Route::from_path(&route).is_none() {
      return Err(eyre!("Unknown route: {}", route));
    }
    config.ui.start_route = route;
  }
  if let Some(base_url) = args.base_url {
    config.api.base_url = base_url;
  }

  // Held until exit so buffered log lines get flushed
  let _log_guard = logging::init(&config.log)?;
  tracing::info!(base_url = %config.api.base_url, "Starting jpq");

  let mut app = App::new(config)?;
  app.run().await?;

  Ok(())
}
