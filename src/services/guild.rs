use chrono::Utc;
use log::info;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
	ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter, TransactionTrait,
};
use entity::{
	channels, guild_blocked_users, guild_users, guilds, Channel, ChannelBehavior, Guild, GuildBehavior, GuildBlockedUserBehavior,
	GuildUser, GuildUserBehavior,
};
use crate::errors::BotResult;
use crate::utils::convert::{discord_id_to_db, join_command_list, parse_command_list};

/// A Discord member that has a bot account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildMemberInfo {
	pub user_id: i32,
	pub user_name: Option<String>,
	pub bot: bool,
	pub who_knows_whitelisted: Option<bool>,
}

impl GuildMemberInfo {
	fn into_active_model(self, guild_id: i32) -> guild_users::ActiveModel {
		guild_users::ActiveModel {
			guild_id: ActiveValue::Set(guild_id),
			user_id: ActiveValue::Set(self.user_id),
			user_name: ActiveValue::Set(self.user_name),
			bot: ActiveValue::Set(self.bot),
			who_knows_whitelisted: ActiveValue::Set(self.who_knows_whitelisted),
		}
	}
}

fn member_upsert() -> OnConflict {
	OnConflict::columns([guild_users::Column::GuildId, guild_users::Column::UserId])
		.update_columns([guild_users::Column::UserName, guild_users::Column::Bot, guild_users::Column::WhoKnowsWhitelisted])
		.to_owned()
}

/// Adds `command` when absent, removes it otherwise. Returns whether it is now disabled.
fn toggle_in_list(list: Option<&str>, command: &str) -> (bool, Option<String>) {
	let command = command.trim().to_lowercase();
	let mut commands = parse_command_list(list);

	let disabled = match commands.iter().position(|c| *c == command) {
		Some(index) => {
			commands.remove(index);
			false
		},
		None => {
			commands.push(command);
			true
		},
	};

	(disabled, join_command_list(&commands))
}

#[derive(Clone)]
pub struct GuildService {
	db: DatabaseConnection,
}

impl GuildService {
	pub fn new(db: DatabaseConnection) -> Self {
		Self { db }
	}

	pub async fn get_guild(&self, discord_guild_id: u64) -> BotResult<Option<Guild>> {
		Ok(GuildBehavior::find()
			.filter(guilds::Column::DiscordGuildId.eq(discord_id_to_db(discord_guild_id)))
			.one(&self.db)
			.await?)
	}

	pub async fn get_or_create_guild(&self, discord_guild_id: u64, name: Option<&str>) -> BotResult<Guild> {
		if let Some(guild) = self.get_guild(discord_guild_id).await? {
			return Ok(guild);
		}

		let guild = guilds::ActiveModel {
			guild_id: ActiveValue::NotSet,
			discord_guild_id: ActiveValue::Set(discord_id_to_db(discord_guild_id)),
			name: ActiveValue::Set(name.map(str::to_string)),
			last_indexed: ActiveValue::Set(None),
			disabled_commands: ActiveValue::Set(None),
			who_knows_whitelist_role_id: ActiveValue::Set(None),
		}.insert(&self.db).await?;

		info!("Added guild {} ({})", discord_guild_id, name.unwrap_or_default());
		Ok(guild)
	}

	pub async fn set_guild_indexed(&self, guild: Guild) -> BotResult<Guild> {
		let mut active = guild.into_active_model();
		active.last_indexed = ActiveValue::Set(Some(Utc::now()));
		Ok(active.update(&self.db).await?)
	}

	pub async fn set_who_knows_whitelist_role(&self, guild: Guild, role_id: Option<u64>) -> BotResult<Guild> {
		let mut active = guild.into_active_model();
		active.who_knows_whitelist_role_id = ActiveValue::Set(role_id.map(discord_id_to_db));
		Ok(active.update(&self.db).await?)
	}

	pub async fn toggle_guild_command(&self, guild: Guild, command: &str) -> BotResult<bool> {
		let (disabled, list) = toggle_in_list(guild.disabled_commands.as_deref(), command);

		let mut active = guild.into_active_model();
		active.disabled_commands = ActiveValue::Set(list);
		active.update(&self.db).await?;

		Ok(disabled)
	}

	pub async fn get_channel(&self, discord_channel_id: u64) -> BotResult<Option<Channel>> {
		Ok(ChannelBehavior::find()
			.filter(channels::Column::DiscordChannelId.eq(discord_id_to_db(discord_channel_id)))
			.one(&self.db)
			.await?)
	}

	pub async fn toggle_channel_command(&self, guild: &Guild, discord_channel_id: u64, command: &str) -> BotResult<bool> {
		let channel = match self.get_channel(discord_channel_id).await? {
			Some(channel) => channel,
			None => channels::ActiveModel {
				channel_id: ActiveValue::NotSet,
				discord_channel_id: ActiveValue::Set(discord_id_to_db(discord_channel_id)),
				guild_id: ActiveValue::Set(guild.guild_id),
				disabled_commands: ActiveValue::Set(None),
			}.insert(&self.db).await?,
		};

		let (disabled, list) = toggle_in_list(channel.disabled_commands.as_deref(), command);

		let mut active = channel.into_active_model();
		active.disabled_commands = ActiveValue::Set(list);
		active.update(&self.db).await?;

		Ok(disabled)
	}

	pub async fn channel_disabled_commands(&self, discord_channel_id: u64) -> BotResult<Vec<String>> {
		Ok(self
			.get_channel(discord_channel_id)
			.await?
			.map(|c| parse_command_list(c.disabled_commands.as_deref()))
			.unwrap_or_default())
	}

	pub async fn get_guild_users(&self, guild_id: i32) -> BotResult<Vec<GuildUser>> {
		Ok(GuildUserBehavior::find()
			.filter(guild_users::Column::GuildId.eq(guild_id))
			.all(&self.db)
			.await?)
	}

	pub async fn add_or_update_guild_user(&self, guild_id: i32, member: GuildMemberInfo) -> BotResult<()> {
		GuildUserBehavior::insert(member.into_active_model(guild_id))
			.on_conflict(member_upsert())
			.exec(&self.db)
			.await?;

		Ok(())
	}

	pub async fn remove_guild_user(&self, guild_id: i32, user_id: i32) -> BotResult<bool> {
		let deleted = GuildUserBehavior::delete_by_id((guild_id, user_id)).exec(&self.db).await?;
		Ok(deleted.rows_affected > 0)
	}

	/// Replaces the cached member list of a guild.
	pub async fn store_guild_members(&self, guild_id: i32, members: Vec<GuildMemberInfo>) -> BotResult<usize> {
		let count = members.len();
		let txn = self.db.begin().await?;

		GuildUserBehavior::delete_many()
			.filter(guild_users::Column::GuildId.eq(guild_id))
			.exec(&txn)
			.await?;

		let models: Vec<guild_users::ActiveModel> = members.into_iter().map(|m| m.into_active_model(guild_id)).collect();
		for chunk in models.chunks(500) {
			GuildUserBehavior::insert_many(chunk.to_vec())
				.on_conflict(member_upsert())
				.exec(&txn)
				.await?;
		}

		txn.commit().await?;
		Ok(count)
	}

	pub async fn block_user_from_who_knows(&self, guild_id: i32, user_id: i32) -> BotResult<bool> {
		let existing = GuildBlockedUserBehavior::find_by_id((guild_id, user_id)).one(&self.db).await?;

		match existing {
			Some(blocked) if blocked.blocked_from_who_knows => Ok(false),
			Some(blocked) => {
				let mut active = blocked.into_active_model();
				active.blocked_from_who_knows = ActiveValue::Set(true);
				active.update(&self.db).await?;
				Ok(true)
			},
			None => {
				GuildBlockedUserBehavior::insert(guild_blocked_users::ActiveModel {
					guild_id: ActiveValue::Set(guild_id),
					user_id: ActiveValue::Set(user_id),
					blocked_from_who_knows: ActiveValue::Set(true),
				}).exec(&self.db).await?;
				Ok(true)
			},
		}
	}

	pub async fn unblock_user_from_who_knows(&self, guild_id: i32, user_id: i32) -> BotResult<bool> {
		let deleted = GuildBlockedUserBehavior::delete_by_id((guild_id, user_id)).exec(&self.db).await?;
		Ok(deleted.rows_affected > 0)
	}
}

#[cfg(test)]
mod tests {
	use crate::test_support::*;
	use crate::utils::convert::parse_command_list;
	use super::*;

	fn member(user_id: i32, name: &str) -> GuildMemberInfo {
		GuildMemberInfo { user_id, user_name: Some(name.to_string()), bot: false, who_knows_whitelisted: None }
	}

	#[test]
	fn toggling_adds_then_removes() {
		let (disabled, list) = toggle_in_list(None, " NP ");
		assert!(disabled);
		assert_eq!(list.as_deref(), Some("np"));

		let (disabled, list) = toggle_in_list(Some("np,whoknows"), "np");
		assert!(!disabled);
		assert_eq!(list.as_deref(), Some("whoknows"));

		let (_, list) = toggle_in_list(Some("np"), "np");
		assert_eq!(list, None);
	}

	#[tokio::test]
	async fn guild_rows_are_created_once() {
		let db = setup_db().await;
		let service = GuildService::new(db);

		let first = service.get_or_create_guild(1234, Some("Listening Club")).await.unwrap();
		let second = service.get_or_create_guild(1234, None).await.unwrap();

		assert_eq!(first.guild_id, second.guild_id);
		assert_eq!(second.name.as_deref(), Some("Listening Club"));

		let indexed = service.set_guild_indexed(second).await.unwrap();
		assert!(indexed.last_indexed.is_some());
	}

	#[tokio::test]
	async fn commands_toggle_per_guild_and_channel() {
		let db = setup_db().await;
		let service = GuildService::new(db);
		let guild = service.get_or_create_guild(1, None).await.unwrap();

		assert!(service.toggle_guild_command(guild.clone(), "whoknows").await.unwrap());
		let guild = service.get_guild(1).await.unwrap().unwrap();
		assert_eq!(parse_command_list(guild.disabled_commands.as_deref()), vec!["whoknows"]);

		assert!(service.toggle_channel_command(&guild, 55, "np").await.unwrap());
		assert_eq!(service.channel_disabled_commands(55).await.unwrap(), vec!["np"]);
		assert!(!service.toggle_channel_command(&guild, 55, "np").await.unwrap());
		assert!(service.channel_disabled_commands(55).await.unwrap().is_empty());
		assert!(service.channel_disabled_commands(56).await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn members_are_replaced_and_upserted() {
		let db = setup_db().await;
		let a = seed_user(&db, 1, "a").await;
		let b = seed_user(&db, 2, "b").await;
		let service = GuildService::new(db);
		let guild = service.get_or_create_guild(1, None).await.unwrap();

		service.store_guild_members(guild.guild_id, vec![member(a.user_id, "A"), member(b.user_id, "B")]).await.unwrap();
		service.add_or_update_guild_user(guild.guild_id, member(a.user_id, "A renamed")).await.unwrap();
		assert!(service.remove_guild_user(guild.guild_id, b.user_id).await.unwrap());

		let users = service.get_guild_users(guild.guild_id).await.unwrap();
		assert_eq!(users.len(), 1);
		assert_eq!(users[0].user_name.as_deref(), Some("A renamed"));

		service.store_guild_members(guild.guild_id, vec![member(b.user_id, "B")]).await.unwrap();
		let users = service.get_guild_users(guild.guild_id).await.unwrap();
		assert_eq!(users.iter().map(|u| u.user_id).collect::<Vec<_>>(), vec![b.user_id]);
	}

	#[tokio::test]
	async fn blocking_is_idempotent() {
		let db = setup_db().await;
		let user = seed_user(&db, 1, "a").await;
		let service = GuildService::new(db);
		let guild = service.get_or_create_guild(1, None).await.unwrap();

		assert!(service.block_user_from_who_knows(guild.guild_id, user.user_id).await.unwrap());
		assert!(!service.block_user_from_who_knows(guild.guild_id, user.user_id).await.unwrap());
		assert!(service.unblock_user_from_who_knows(guild.guild_id, user.user_id).await.unwrap());
		assert!(!service.unblock_user_from_who_knows(guild.guild_id, user.user_id).await.unwrap());
	}
}
