use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::{eyre::eyre, Result};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

use fieldsync::api::HttpFieldApi;
use fieldsync::config::Config;
use fieldsync::device::ConfiguredDevice;
use fieldsync::model::LANGUAGES;
use fieldsync::store::{MemoryStore, SqliteStore, Store};
use fieldsync::{logging, FieldSync, SyncNotice};

#[derive(Parser, Debug)]
#[command(name = "fieldsync")]
#[command(about = "Offline-first field data for the farm dashboard")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/fieldsync/config.yaml)
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  /// Keep everything in memory for this run
  #[arg(long, global = true)]
  ephemeral: bool,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Print the cached dashboard without touching the network
  Show,
  /// Refresh one domain, or location then weather
  Refresh {
    #[arg(value_enum, default_value_t = Target::All)]
    target: Target,
  },
  /// Refresh the soil and recommendation tiles side by side
  Tiles,
  /// Estimate inputs and yield for a crop over an area in hectares
  PredictYield {
    #[arg(long)]
    crop: String,
    #[arg(long, allow_hyphen_values = true)]
    area: String,
    /// Air temperature in °C (default: the cached reading)
    #[arg(long)]
    temperature: Option<f64>,
  },
  /// Ask for a crop suited to the cached field conditions
  Recommend {
    /// Select the recommended crop
    #[arg(long)]
    accept: bool,
  },
  /// Select or clear the crop being grown
  Crop {
    #[command(subcommand)]
    action: CropAction,
  },
  /// Show or change the interface language
  Language { code: Option<String> },
  /// Forget the stored location
  ClearLocation,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Target {
  All,
  Location,
  Weather,
  Soil,
}

#[derive(Subcommand, Debug)]
enum CropAction {
  Set { name: String },
  Clear,
}

fn print<T: Serialize>(value: &T) -> Result<()> {
  let out = serde_json::to_string_pretty(value)
    .map_err(|e| eyre!("Failed to serialize output: {}", e))?;
  println!("{}", out);
  Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let config = Config::load(args.config.as_deref())?;
  let data_dir = config.data_dir()?;
  let _log_guard = logging::init(&data_dir.join("logs"))?;

  let store: Arc<dyn Store> = if args.ephemeral {
    Arc::new(MemoryStore::new())
  } else {
    Arc::new(SqliteStore::open_at(&data_dir.join("store.db"))?)
  };

  let api = Arc::new(HttpFieldApi::new(&config.endpoints)?);
  let device = ConfiguredDevice::new(config.device.clone());
  let (notice_tx, mut notice_rx) = mpsc::unbounded_channel::<SyncNotice>();
  let sync = FieldSync::new(store, device, api)
    .with_timeout(config.fetch_timeout())
    .with_notices(notice_tx);

  let command = args.command.unwrap_or(Command::Show);
  info!(?command, "running");

  match command {
    Command::Show => print(&sync.snapshot())?,
    Command::Refresh { target } => match target {
      Target::All => print(&sync.refresh_all().await)?,
      Target::Location => print(&sync.refresh_location().await)?,
      Target::Weather => print(&sync.refresh_weather().await)?,
      Target::Soil => print(&sync.refresh_soil().await)?,
    },
    Command::Tiles => {
      let (soil, recommendation) =
        tokio::join!(sync.refresh_soil(), sync.refresh_recommendation());
      print(&json!({ "soil": soil, "recommendation": recommendation }))?;
    }
    Command::PredictYield {
      crop,
      area,
      temperature,
    } => {
      let prediction = sync.predict_yield(&crop, &area, temperature).await?;
      print(&prediction)?;
    }
    Command::Recommend { accept } => {
      let recommendation = sync.refresh_recommendation().await;
      if accept {
        let crop = sync.accept_recommendation();
        print(&json!({ "recommendation": recommendation, "crop": crop }))?;
      } else {
        print(&recommendation)?;
      }
    }
    Command::Crop { action } => match action {
      CropAction::Set { name } => print(&sync.set_crop(&name)?)?,
      CropAction::Clear => {
        sync.clear_crop();
        print(&sync.cached_crop())?;
      }
    },
    Command::Language { code } => {
      if let Some(code) = code {
        sync.set_language(&code)?;
      }
      let current = sync.language();
      let name = LANGUAGES
        .iter()
        .find(|(c, _)| *c == current)
        .map(|(_, name)| *name);
      print(&json!({ "code": current, "name": name }))?;
    }
    Command::ClearLocation => {
      sync.clear_location();
      print(&sync.snapshot())?;
    }
  }

  // Fallbacks are recoverable; tell the user a retry may help
  drop(sync);
  while let Some(notice) = notice_rx.recv().await {
    eprintln!("{} unavailable ({}), using offline data", notice.domain, notice.error);
  }

  Ok(())
}
