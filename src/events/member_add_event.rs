use log::{error, info};
use serenity::client::Context;
use serenity::model::guild::Member;
use crate::errors::BotResult;
use crate::services::guild::GuildMemberInfo;
use crate::utils::client;
use crate::utils::convert::db_to_discord_id;

async fn store_member(member: &Member) -> BotResult<bool> {
	let services = client::services().await?;

	let Some(user) = services.users.get_user(member.user.id.get()).await? else {
		return Ok(false);
	};
	let Some(guild) = services.guilds.get_guild(member.guild_id.get()).await? else {
		return Ok(false);
	};

	let whitelisted = guild.who_knows_whitelist_role_id
		.map(|role| member.roles.iter().any(|r| r.get() == db_to_discord_id(role)));
	services.guilds.add_or_update_guild_user(guild.guild_id, GuildMemberInfo {
		user_id: user.user_id,
		user_name: Some(member.display_name().to_string()),
		bot: member.user.bot,
		who_knows_whitelisted: whitelisted,
	}).await?;

	Ok(true)
}

pub async fn execute(_ctx: Context, member: Member) {
	match store_member(&member).await {
		Ok(true) => info!("Added member {} to guild {}", member.user.id, member.guild_id),
		Ok(false) => {},
		Err(e) => error!("DB Error: {:?}", e),
	}
}
