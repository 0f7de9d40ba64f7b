use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use log::{error, info};
use serenity::all::{ActivityData, Command};
use serenity::client::Context;
use serenity::model::gateway::Ready;
use tokio::task::JoinHandle;
use crate::commands;
use crate::utils::client;

const PRUNE_INTERVAL: Duration = Duration::from_secs(60 * 60 * 24);
const PRUNE_PAUSE: Duration = Duration::from_millis(800);

static PRUNE_STARTED: AtomicBool = AtomicBool::new(false);

pub async fn execute(ctx: Context, data_about_bot: Ready) {
	ctx.dnd();
	ctx.set_activity(Some(ActivityData::playing("Starting...")));

	info!("Logged in as {} in {} guilds", data_about_bot.user.name, data_about_bot.guilds.len());
	match Command::set_global_commands(&ctx.http, vec![commands::app_commands_build()]).await {
		Ok(registered) => info!("Registered {} application commands", registered.len()),
		Err(e) => error!("Registering commands failed: {:?}", e),
	}

	ctx.online();
	ctx.set_activity(Some(ActivityData::listening("/fm")));

	if !PRUNE_STARTED.swap(true, Ordering::SeqCst) {
		prune_inactive_task();
	}
}

/// Once a day, deletes users that stopped using the bot and lost their Last.fm account.
fn prune_inactive_task() -> JoinHandle<()> {
	tokio::spawn(async move {
		let mut interval = tokio::time::interval(PRUNE_INTERVAL);
		interval.tick().await;

		loop {
			interval.tick().await;

			let services = match client::services().await {
				Ok(services) => services,
				Err(e) => {
					error!("{:?}", e);
					continue;
				},
			};
			match services.users.delete_inactive_users(services.live.as_ref(), PRUNE_PAUSE).await {
				Ok(deleted) => info!("Inactive user prune deleted {} users", deleted),
				Err(e) => error!("DB Error: {:?}", e),
			}
		}
	})
}
