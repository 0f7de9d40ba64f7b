use std::collections::HashMap;
use log::{info, warn};
use serenity::all::{CommandDataOption, CommandInteraction, GuildId, Member, RoleId, UserId};
use serenity::async_trait;
use serenity::client::Context;
use entity::enums::{CommandResponse, DataSource};
use entity::User;
use crate::command_define::{BaseCommand, Command, CommandRequirements, Invocation};
use crate::commands::reply;
use crate::errors::{BotError, BotResult};
use crate::lastfm::{TimeSettings, TopList};
use crate::services::guild::GuildMemberInfo;
use crate::services::user::{index_completed_description, IndexedUserStats, UpdateType};
use crate::services::Services;
use crate::utils::color;
use crate::utils::convert::db_to_discord_id;

const MEMBER_PAGE: u64 = 1000;
const TOP_COUNT: usize = 1000;

pub struct IndexCommand;

impl BaseCommand for IndexCommand {
	fn new() -> Self {
		Self {}
	}

	fn get_name(&self) -> String {
		"index".to_string()
	}

	fn get_description(&self) -> String {
		"Stores this server's members and refreshes your own plays".to_string()
	}
}

/// Members with a bot account, flagged against the WhoKnows whitelist role.
fn member_infos(members: &[Member], users: &HashMap<u64, User>, whitelist_role: Option<RoleId>) -> Vec<GuildMemberInfo> {
	members
		.iter()
		.filter_map(|member| {
			let user = users.get(&member.user.id.get())?;
			Some(GuildMemberInfo {
				user_id: user.user_id,
				user_name: Some(member.display_name().to_string()),
				bot: member.user.bot,
				who_knows_whitelisted: whitelist_role.map(|role| member.roles.contains(&role)),
			})
		})
		.collect()
}

async fn fetch_members(ctx: &Context, guild_id: GuildId) -> BotResult<Vec<Member>> {
	let mut members = vec![];
	let mut after: Option<UserId> = None;

	loop {
		let page = guild_id.members(&ctx.http, Some(MEMBER_PAGE), after).await?;
		let page_len = page.len();
		after = page.last().map(|m| m.user.id);
		members.extend(page);

		if (page_len as u64) < MEMBER_PAGE {
			break;
		}
	}

	Ok(members)
}

fn top_or_fail(result: BotResult<TopList>, update: UpdateType, stats: &mut IndexedUserStats, user_name: &str) -> TopList {
	match result {
		Ok(list) => list,
		Err(error) => {
			warn!("Index of {} failed for {:?}: {:?}", user_name, update, error);
			stats.failed_updates.push(update);
			TopList::default()
		},
	}
}

/// Refreshes the stored top lists of one user.
async fn index_user(services: &Services, user: &User) -> IndexedUserStats {
	let name = &user.user_name_last_fm;
	let time = TimeSettings::all_time();
	let data_source = &services.data_source;
	let mut stats = IndexedUserStats::default();

	let lastfm_user = match data_source.user_info(name).await {
		Ok(Some(lastfm_user)) => Some(lastfm_user),
		Ok(None) | Err(_) => {
			stats.failed_updates.push(UpdateType::Full);
			None
		},
	};

	let artists = top_or_fail(data_source.top_artists(name, &time, TOP_COUNT, 1).await, UpdateType::Artists, &mut stats, name);
	let albums = top_or_fail(data_source.top_albums(name, &time, TOP_COUNT, 1).await, UpdateType::Albums, &mut stats, name);
	let tracks = top_or_fail(data_source.top_tracks(name, &time, TOP_COUNT, 1).await, UpdateType::Tracks, &mut stats, name);

	if !stats.failed_updates.is_empty() {
		return stats;
	}

	if let Err(error) = services.users.store_user_aggregates(user.user_id, &artists, &albums, &tracks).await {
		warn!("Storing aggregates for {} failed: {:?}", name, error);
		stats.failed_updates.push(UpdateType::Full);
		return stats;
	}
	if let Err(error) = services.users.set_last_indexed(user.user_id, lastfm_user.as_ref().and_then(|u| u.registered)).await {
		warn!("Setting last indexed for {} failed: {:?}", name, error);
	}

	stats.play_count = lastfm_user.as_ref().map(|u| u.playcount);
	stats.artist_count = Some(artists.entries.len() as i64);
	stats.album_count = Some(albums.entries.len() as i64);
	stats.track_count = Some(tracks.entries.len() as i64);

	if user.data_source != DataSource::LastFm {
		match services.plays.import_summary(user.user_id).await {
			Ok(summary) if summary.total() > 0 => {
				stats.import_count = Some(summary.total() as i64);
				stats.total_count = stats.play_count;
			},
			Ok(_) => {},
			Err(error) => warn!("Import summary for {} failed: {:?}", name, error),
		}
	}

	stats
}

#[async_trait]
impl Command for IndexCommand {
	fn requirements(&self) -> CommandRequirements {
		CommandRequirements { guild_only: true, ..Default::default() }
	}

	async fn execute(&self, ctx: &Context, command: &CommandInteraction, _args: Vec<CommandDataOption>, invocation: &Invocation) -> BotResult<CommandResponse> {
		let services = &invocation.services;
		let guild = invocation.require_guild()?;
		let guild_id = command.guild_id.ok_or_else(|| BotError::Validation("command used outside of a server".to_string()))?;

		reply::defer(ctx, command).await?;

		let members = fetch_members(ctx, guild_id).await?;
		let discord_ids: Vec<u64> = members.iter().map(|m| m.user.id.get()).collect();
		let users: HashMap<u64, User> = services.users.get_users_for_discord_ids(&discord_ids).await?
			.into_iter()
			.map(|u| (db_to_discord_id(u.discord_user_id), u))
			.collect();

		let whitelist_role = guild.who_knows_whitelist_role_id.map(|r| RoleId::new(db_to_discord_id(r)));
		let stored = services.guilds.store_guild_members(guild.guild_id, member_infos(&members, &users, whitelist_role)).await?;
		services.guilds.set_guild_indexed(guild.clone()).await?;
		info!("Indexed guild {}: {} of {} members have an account", guild_id, stored, members.len());

		let mut description = format!("Stored **{}** members with a connected Last.fm account.\n\n", stored);
		if let Some(user) = &invocation.user {
			let stats = index_user(services, user).await;
			let (promo, text) = index_completed_description(user, Some(&stats));
			if promo {
				services.tracker.mark_hint_shown(command.id.get()).await;
			}
			description.push_str(&text);
		}

		reply::edit_embed(ctx, command, reply::embed("Server indexed", description, color::success_color())).await?;

		Ok(CommandResponse::Ok)
	}
}
