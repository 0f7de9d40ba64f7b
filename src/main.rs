mod command_define;
mod commands;
mod configs;
mod data_source;
mod errors;
mod events;
mod lastfm;
mod services;
mod tables;
mod utils;
#[cfg(test)]
mod test_support;

use std::error::Error;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use log::{error, info, LevelFilter};
use once_cell::sync::Lazy;
use sea_orm::Database;
use serenity::all::GatewayIntents;
use serenity::Client;
use tokio::sync::Mutex;
use migration::{Migrator, MigratorTrait};
use crate::configs::ConfigData;
use crate::events::route::Router;
use crate::lastfm::LastfmClient;
use crate::services::Services;
use crate::utils::client::Components;

pub static STATIC_COMPONENTS: Lazy<Mutex<Components>> = Lazy::new(|| Mutex::new(Components::new()));

fn setup_logger(config: &ConfigData) -> Result<(), fern::InitError> {
	let mut dispatch = fern::Dispatch::new()
		.format(|out, message, record| {
			out.finish(format_args!(
				"[{}][{}][{}] {}",
				chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
				record.level(),
				record.target(),
				message
			))
		})
		.level(config.get_log_level())
		.level_for("serenity", LevelFilter::Warn)
		.level_for("tracing", LevelFilter::Warn)
		.level_for("sqlx", LevelFilter::Warn)
		.level_for("sea_orm", LevelFilter::Warn)
		.chain(std::io::stdout());

	if let Some(path) = config.get_log_file() {
		dispatch = dispatch.chain(fern::log_file(path)?);
	}

	dispatch.apply()?;

	Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
	let mut is_debug = false;
	for arg in std::env::args() {
		match arg.as_str() {
			"--debug" => {
				is_debug = true;
			},
			_ => {}
		}
	}

	let config_path = if is_debug { "../../configs/config.yaml" } else { "./config.yaml" };

	let config_string = fs::read_to_string(Path::new(config_path))?;
	let config = serde_yaml::from_str::<ConfigData>(&config_string)?;

	setup_logger(&config)?;
	info!("Starting...");

	let db = Database::connect(config.get_db_url()).await?;
	Migrator::up(&db, None).await?;

	let live = Arc::new(LastfmClient::new(config.get_lastfm_api_url(), config.get_lastfm_api_key())?);
	let services = Services::new(db, &config, live);

	let mut lsc = STATIC_COMPONENTS.lock().await;
	lsc.sets(services);
	std::mem::drop(lsc);

	let intents = GatewayIntents::GUILDS | GatewayIntents::GUILD_MEMBERS;
	let mut client = Client::builder(config.get_token(), intents)
		.event_handler(Router)
		.await?;

	let mut lsc = STATIC_COMPONENTS.lock().await;
	lsc.set_shard_manager(client.shard_manager.clone());
	std::mem::drop(lsc);

	let shard_manager = client.shard_manager.clone();
	tokio::spawn(async move {
		if tokio::signal::ctrl_c().await.is_ok() {
			info!("Shutting down");
			shard_manager.shutdown_all().await;
		}
	});

	if let Err(error) = client.start().await {
		error!("Stop Error: {}", error);
	}

	Ok(())
}
