use log::{error, info};
use serenity::client::Context;
use serenity::model::id::GuildId;
use serenity::model::user::User;
use crate::errors::BotResult;
use crate::utils::client;

async fn remove_member(guild_id: GuildId, discord_user: &User) -> BotResult<bool> {
	let services = client::services().await?;

	let Some(user) = services.users.get_user(discord_user.id.get()).await? else {
		return Ok(false);
	};
	let Some(guild) = services.guilds.get_guild(guild_id.get()).await? else {
		return Ok(false);
	};

	services.guilds.remove_guild_user(guild.guild_id, user.user_id).await
}

pub async fn execute(_ctx: Context, guild_id: GuildId, user: User) {
	match remove_member(guild_id, &user).await {
		Ok(true) => info!("Removed member {} from guild {}", user.id, guild_id),
		Ok(false) => {},
		Err(e) => error!("DB Error: {:?}", e),
	}
}
