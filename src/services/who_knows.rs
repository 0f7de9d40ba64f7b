use std::collections::HashSet;
use std::sync::Arc;
use chrono::{DateTime, Duration, Utc};
use log::debug;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use serenity::all::{GuildId, Http, UserId};
use serenity::async_trait;
use entity::{user_plays, Guild, UserPlayBehavior};
use crate::errors::{BotError, BotResult};
use crate::lastfm::TopKind;
use crate::tables::quaryfn::{self, GuildTopRow, WhoKnowsRow};
use crate::utils::convert::db_to_discord_id;

const MAX_KEY_LENGTH: usize = 512;
pub const GUILD_TOP_LIMIT: u64 = 14;

/// What a leaderboard is about. Names compare case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MusicKey {
	Artist { name: String },
	Album { artist: String, name: String },
	Track { artist: String, name: String },
}

fn validate_part(label: &str, value: &str) -> BotResult<String> {
	let trimmed = value.trim();
	if trimmed.is_empty() {
		return Err(BotError::Validation(format!("{} can't be empty", label)));
	}
	if trimmed.chars().count() > MAX_KEY_LENGTH {
		return Err(BotError::Validation(format!("{} is longer than {} characters", label, MAX_KEY_LENGTH)));
	}

	Ok(trimmed.to_string())
}

impl MusicKey {
	pub fn artist(name: &str) -> BotResult<Self> {
		Ok(MusicKey::Artist { name: validate_part("Artist name", name)? })
	}

	pub fn album(artist: &str, name: &str) -> BotResult<Self> {
		Ok(MusicKey::Album {
			artist: validate_part("Artist name", artist)?,
			name: validate_part("Album name", name)?,
		})
	}

	pub fn track(artist: &str, name: &str) -> BotResult<Self> {
		Ok(MusicKey::Track {
			artist: validate_part("Artist name", artist)?,
			name: validate_part("Track name", name)?,
		})
	}

	pub fn title(&self) -> String {
		match self {
			MusicKey::Artist { name } => name.clone(),
			MusicKey::Album { artist, name } | MusicKey::Track { artist, name } => format!("{} - {}", artist, name),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderType {
	Playcount,
	Listeners,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhoKnowsScope {
	Guild { guild_id: i32, whitelist_only: bool },
	Global,
	Friends { user_id: i32 },
}

impl WhoKnowsScope {
	pub fn for_guild(guild: &Guild) -> Self {
		WhoKnowsScope::Guild {
			guild_id: guild.guild_id,
			whitelist_only: guild.who_knows_whitelist_role_id.is_some(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhoKnowsEntry {
	pub user_id: i32,
	pub discord_user_id: u64,
	pub display_name: String,
	pub user_name_last_fm: String,
	pub playcount: i32,
}

/// Looks up the name a member currently shows in the invoking guild.
#[async_trait]
pub trait NameResolver: Send + Sync {
	async fn display_name(&self, discord_user_id: u64) -> BotResult<Option<String>>;
}

pub struct GuildMemberResolver {
	http: Arc<Http>,
	guild_id: GuildId,
}

impl GuildMemberResolver {
	pub fn new(http: Arc<Http>, guild_id: GuildId) -> Self {
		Self { http, guild_id }
	}
}

#[async_trait]
impl NameResolver for GuildMemberResolver {
	async fn display_name(&self, discord_user_id: u64) -> BotResult<Option<String>> {
		let member = self.guild_id.member(self.http.as_ref(), UserId::new(discord_user_id)).await?;
		Ok(Some(member.display_name().to_string()))
	}
}

/// Keeps the first row per lowercased Last.fm name.
pub fn dedup_by_lastfm_name(rows: Vec<WhoKnowsRow>) -> Vec<WhoKnowsRow> {
	let mut seen = HashSet::new();
	rows
		.into_iter()
		.filter(|row| seen.insert(row.user_name_last_fm.to_lowercase()))
		.collect()
}

#[derive(Clone)]
pub struct WhoKnowsService {
	db: DatabaseConnection,
	resolve_limit: usize,
}

impl WhoKnowsService {
	pub fn new(db: DatabaseConnection, resolve_limit: usize) -> Self {
		Self { db, resolve_limit }
	}

	pub async fn who_knows(&self, scope: WhoKnowsScope, key: &MusicKey, resolver: Option<&dyn NameResolver>) -> BotResult<Vec<WhoKnowsEntry>> {
		let rows = match scope {
			WhoKnowsScope::Guild { guild_id, whitelist_only } => {
				quaryfn::get_guild_who_knows(&self.db, guild_id, key, whitelist_only).await?
			},
			WhoKnowsScope::Global => {
				let mut rows = dedup_by_lastfm_name(quaryfn::get_global_who_knows(&self.db, key).await?);
				rows.sort_by(|a, b| b.playcount.cmp(&a.playcount).then(a.user_id.cmp(&b.user_id)));
				rows
			},
			WhoKnowsScope::Friends { user_id } => {
				quaryfn::get_friends_who_knows(&self.db, user_id, key).await?
			},
		};

		Ok(self.resolve_names(rows, resolver).await)
	}

	async fn resolve_names(&self, rows: Vec<WhoKnowsRow>, resolver: Option<&dyn NameResolver>) -> Vec<WhoKnowsEntry> {
		let mut entries = Vec::with_capacity(rows.len());

		for (index, row) in rows.into_iter().enumerate() {
			let discord_user_id = db_to_discord_id(row.discord_user_id);
			let mut display_name = None;

			if let Some(resolver) = resolver.filter(|_| index < self.resolve_limit) {
				match resolver.display_name(discord_user_id).await {
					Ok(name) => display_name = name,
					Err(error) => debug!("Could not resolve display name for {}: {}", discord_user_id, error),
				}
			}

			let display_name = display_name
				.or(row.user_name)
				.unwrap_or_else(|| row.user_name_last_fm.clone());

			entries.push(WhoKnowsEntry {
				user_id: row.user_id,
				discord_user_id,
				display_name,
				user_name_last_fm: row.user_name_last_fm,
				playcount: row.playcount,
			});
		}

		entries
	}

	pub async fn top_all_time_for_guild(&self, guild_id: i32, kind: TopKind, order: OrderType) -> BotResult<Vec<GuildTopRow>> {
		Ok(quaryfn::get_top_all_time_for_guild(&self.db, guild_id, kind, order, GUILD_TOP_LIMIT).await?)
	}

	pub async fn play_count_for_user(&self, user_id: i32, key: &MusicKey) -> BotResult<Option<i32>> {
		Ok(quaryfn::get_play_count_for_user(&self.db, user_id, key).await?)
	}

	/// Plays of one track by the given users during the seven days before `now`.
	pub async fn week_playcount_for_guild(&self, user_ids: &[i32], artist_name: &str, track_name: &str, now: DateTime<Utc>) -> BotResult<u64> {
		if user_ids.is_empty() {
			return Ok(0);
		}

		let count = UserPlayBehavior::find()
			.filter(user_plays::Column::UserId.is_in(user_ids.iter().copied()))
			.filter(user_plays::Column::TimePlayed.gt(now - Duration::days(7)))
			.filter(user_plays::Column::TimePlayed.lte(now))
			.filter(
				Expr::expr(Func::lower(Expr::col((user_plays::Entity, user_plays::Column::TrackName))))
					.eq(Func::lower(Expr::val(track_name)))
			)
			.filter(
				Expr::expr(Func::lower(Expr::col((user_plays::Entity, user_plays::Column::ArtistName))))
					.eq(Func::lower(Expr::val(artist_name)))
			)
			.count(&self.db)
			.await?;

		Ok(count)
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;
	use sea_orm::{ActiveModelTrait, IntoActiveModel, Set};
	use entity::enums::{PlaySource, PrivacyLevel};
	use entity::GuildBlockedUserBehavior;
	use crate::test_support::*;
	use super::*;

	struct FakeResolver {
		names: HashMap<u64, String>,
		failing: HashSet<u64>,
	}

	#[async_trait]
	impl NameResolver for FakeResolver {
		async fn display_name(&self, discord_user_id: u64) -> BotResult<Option<String>> {
			if self.failing.contains(&discord_user_id) {
				return Err(BotError::Validation("member lookup failed".to_string()));
			}
			Ok(self.names.get(&discord_user_id).cloned())
		}
	}

	fn names(entries: &[WhoKnowsEntry]) -> Vec<&str> {
		entries.iter().map(|e| e.user_name_last_fm.as_str()).collect()
	}

	fn counts(entries: &[WhoKnowsEntry]) -> Vec<i32> {
		entries.iter().map(|e| e.playcount).collect()
	}

	#[test]
	fn keys_are_trimmed_and_bounded() {
		assert_eq!(MusicKey::artist("  Radiohead ").unwrap(), MusicKey::Artist { name: "Radiohead".to_string() });
		assert!(matches!(MusicKey::artist("   "), Err(BotError::Validation(_))));
		assert!(matches!(MusicKey::track("Radiohead", &"a".repeat(513)), Err(BotError::Validation(_))));
		assert!(MusicKey::album("Radiohead", &"a".repeat(512)).is_ok());
	}

	#[tokio::test]
	async fn guild_ranking_is_case_insensitive() {
		let db = setup_db().await;
		let guild = seed_guild(&db, 900).await;
		for (i, count) in [40, 25, 10].into_iter().enumerate() {
			let user = seed_user(&db, 100 + i as u64, &format!("user{}", i)).await;
			seed_guild_user(&db, guild.guild_id, user.user_id, None).await;
			seed_artist(&db, user.user_id, "Radiohead", count).await;
		}

		let service = WhoKnowsService::new(db, 15);
		let scope = WhoKnowsScope::for_guild(&guild);
		let mut results = vec![];
		for spelling in ["Radiohead", "radiohead", "RADIOHEAD"] {
			results.push(service.who_knows(scope, &MusicKey::artist(spelling).unwrap(), None).await.unwrap());
		}

		assert_eq!(counts(&results[0]), vec![40, 25, 10]);
		assert_eq!(results[0], results[1]);
		assert_eq!(results[1], results[2]);
	}

	#[tokio::test]
	async fn guild_ties_break_on_user_id() {
		let db = setup_db().await;
		let guild = seed_guild(&db, 900).await;
		let first = seed_user(&db, 1, "first").await;
		let second = seed_user(&db, 2, "second").await;
		let third = seed_user(&db, 3, "third").await;
		for (user, count) in [(&third, 40), (&second, 25), (&first, 25)] {
			seed_guild_user(&db, guild.guild_id, user.user_id, None).await;
			seed_track(&db, user.user_id, "Radiohead", "Reckoner", count).await;
		}

		let service = WhoKnowsService::new(db, 15);
		let entries = service
			.who_knows(WhoKnowsScope::for_guild(&guild), &MusicKey::track("radiohead", "reckoner").unwrap(), None)
			.await
			.unwrap();

		assert_eq!(counts(&entries), vec![40, 25, 25]);
		assert_eq!(names(&entries), vec!["third", "first", "second"]);
	}

	#[tokio::test]
	async fn blocking_top_user_keeps_remaining_order() {
		let db = setup_db().await;
		let guild = seed_guild(&db, 900).await;
		let mut users = vec![];
		for (i, count) in [50, 30, 20].into_iter().enumerate() {
			let user = seed_user(&db, 10 + i as u64, &format!("user{}", i)).await;
			seed_guild_user(&db, guild.guild_id, user.user_id, None).await;
			seed_album(&db, user.user_id, "Radiohead", "Kid A", count).await;
			users.push(user);
		}

		let service = WhoKnowsService::new(db.clone(), 15);
		let key = MusicKey::album("Radiohead", "Kid A").unwrap();
		let before = service.who_knows(WhoKnowsScope::for_guild(&guild), &key, None).await.unwrap();

		GuildBlockedUserBehavior::insert(entity::guild_blocked_users::ActiveModel {
			guild_id: Set(guild.guild_id),
			user_id: Set(users[0].user_id),
			blocked_from_who_knows: Set(true),
		}).exec(&db).await.unwrap();

		let after = service.who_knows(WhoKnowsScope::for_guild(&guild), &key, None).await.unwrap();

		assert_eq!(names(&before), vec!["user0", "user1", "user2"]);
		assert_eq!(names(&after), vec!["user1", "user2"]);
	}

	#[tokio::test]
	async fn globally_blocked_and_bot_members_are_excluded() {
		let db = setup_db().await;
		let guild = seed_guild(&db, 900).await;
		let blocked = seed_user(&db, 1, "blocked").await;
		let bot = seed_user(&db, 2, "bot").await;
		let normal = seed_user(&db, 3, "normal").await;
		for user in [&blocked, &bot, &normal] {
			seed_guild_user(&db, guild.guild_id, user.user_id, None).await;
			seed_artist(&db, user.user_id, "Björk", 10).await;
		}

		let mut blocked = blocked.into_active_model();
		blocked.blocked = Set(true);
		blocked.update(&db).await.unwrap();

		let mut bot_member = entity::GuildUserBehavior::find_by_id((guild.guild_id, bot.user_id)).one(&db).await.unwrap().unwrap().into_active_model();
		bot_member.bot = Set(true);
		bot_member.update(&db).await.unwrap();

		let service = WhoKnowsService::new(db, 15);
		let entries = service.who_knows(WhoKnowsScope::for_guild(&guild), &MusicKey::artist("björk").unwrap(), None).await.unwrap();

		assert_eq!(names(&entries), vec!["normal"]);
	}

	#[tokio::test]
	async fn whitelist_limits_guild_scope() {
		let db = setup_db().await;
		let mut guild = seed_guild(&db, 900).await;
		let listed = seed_user(&db, 1, "listed").await;
		let unlisted = seed_user(&db, 2, "unlisted").await;
		seed_guild_user(&db, guild.guild_id, listed.user_id, None).await;
		seed_guild_user(&db, guild.guild_id, unlisted.user_id, None).await;
		seed_artist(&db, listed.user_id, "Low", 5).await;
		seed_artist(&db, unlisted.user_id, "Low", 9).await;

		let mut member = entity::GuildUserBehavior::find_by_id((guild.guild_id, listed.user_id)).one(&db).await.unwrap().unwrap().into_active_model();
		member.who_knows_whitelisted = Set(Some(true));
		member.update(&db).await.unwrap();
		guild.who_knows_whitelist_role_id = Some(77);

		let service = WhoKnowsService::new(db, 15);
		let entries = service.who_knows(WhoKnowsScope::for_guild(&guild), &MusicKey::artist("Low").unwrap(), None).await.unwrap();

		assert_eq!(names(&entries), vec!["listed"]);
	}

	#[tokio::test]
	async fn global_ranking_dedups_lastfm_names() {
		let db = setup_db().await;
		let older = seed_user(&db, 1, "frikandel_").await;
		let newer = seed_user(&db, 2, "Frikandel_").await;
		let other = seed_user(&db, 3, "other").await;
		let private = seed_user(&db, 4, "private").await;
		for (user, count) in [(&older, 10), (&newer, 30), (&other, 20), (&private, 99)] {
			seed_artist(&db, user.user_id, "Deftones", count).await;
		}
		for user in [&older, &newer, &other] {
			let mut user = user.clone().into_active_model();
			user.privacy_level = Set(PrivacyLevel::Global);
			user.update(&db).await.unwrap();
		}

		let service = WhoKnowsService::new(db, 15);
		let entries = service.who_knows(WhoKnowsScope::Global, &MusicKey::artist("deftones").unwrap(), None).await.unwrap();

		assert_eq!(counts(&entries), vec![30, 20]);
		assert_eq!(entries[0].user_id, newer.user_id);
	}

	#[tokio::test]
	async fn friends_scope_includes_requester_and_friends() {
		let db = setup_db().await;
		let me = seed_user(&db, 1, "me").await;
		let friend = seed_user(&db, 2, "friend").await;
		let stranger = seed_user(&db, 3, "stranger").await;
		for (user, count) in [(&me, 3), (&friend, 8), (&stranger, 50)] {
			seed_artist(&db, user.user_id, "Slowdive", count).await;
		}
		seed_friend(&db, me.user_id, friend.user_id).await;

		let service = WhoKnowsService::new(db, 15);
		let entries = service
			.who_knows(WhoKnowsScope::Friends { user_id: me.user_id }, &MusicKey::artist("Slowdive").unwrap(), None)
			.await
			.unwrap();

		assert_eq!(names(&entries), vec!["friend", "me"]);
	}

	#[tokio::test]
	async fn empty_scope_returns_empty_list() {
		let db = setup_db().await;
		let guild = seed_guild(&db, 900).await;
		let service = WhoKnowsService::new(db, 15);

		let guild_entries = service.who_knows(WhoKnowsScope::for_guild(&guild), &MusicKey::artist("Nobody").unwrap(), None).await.unwrap();
		let global_entries = service.who_knows(WhoKnowsScope::Global, &MusicKey::artist("Nobody").unwrap(), None).await.unwrap();
		let top = service.top_all_time_for_guild(guild.guild_id, TopKind::Artists, OrderType::Playcount).await.unwrap();

		assert!(guild_entries.is_empty());
		assert!(global_entries.is_empty());
		assert!(top.is_empty());
	}

	#[tokio::test]
	async fn display_names_fall_back_per_entry() {
		let db = setup_db().await;
		let guild = seed_guild(&db, 900).await;
		let live = seed_user(&db, 1, "live_lfm").await;
		let failing = seed_user(&db, 2, "failing_lfm").await;
		let beyond = seed_user(&db, 3, "beyond_lfm").await;
		seed_guild_user(&db, guild.guild_id, live.user_id, Some("cached live")).await;
		seed_guild_user(&db, guild.guild_id, failing.user_id, Some("cached failing")).await;
		seed_guild_user(&db, guild.guild_id, beyond.user_id, None).await;
		for (user, count) in [(&live, 30), (&failing, 20), (&beyond, 10)] {
			seed_artist(&db, user.user_id, "Mogwai", count).await;
		}

		let resolver = FakeResolver {
			names: HashMap::from([(1, "Live Name".to_string()), (3, "Never Asked".to_string())]),
			failing: HashSet::from([2]),
		};

		let service = WhoKnowsService::new(db, 2);
		let entries = service
			.who_knows(WhoKnowsScope::for_guild(&guild), &MusicKey::artist("Mogwai").unwrap(), Some(&resolver))
			.await
			.unwrap();

		let display: Vec<&str> = entries.iter().map(|e| e.display_name.as_str()).collect();
		assert_eq!(display, vec!["Live Name", "cached failing", "beyond_lfm"]);
	}

	#[tokio::test]
	async fn guild_top_lists_only_break_ties_on_the_other_measure() {
		let db = setup_db().await;
		let guild = seed_guild(&db, 900).await;
		let mut users = vec![];
		for i in 0..3u64 {
			let user = seed_user(&db, 20 + i, &format!("user{}", i)).await;
			seed_guild_user(&db, guild.guild_id, user.user_id, None).await;
			users.push(user);
		}
		seed_artist(&db, users[0].user_id, "Solo", 60).await;
		for user in &users {
			seed_artist(&db, user.user_id, "Shared", 20).await;
		}
		seed_artist(&db, users[0].user_id, "Pair", 30).await;
		seed_artist(&db, users[1].user_id, "Pair", 10).await;

		let service = WhoKnowsService::new(db, 15);
		let by_plays = service.top_all_time_for_guild(guild.guild_id, TopKind::Artists, OrderType::Playcount).await.unwrap();
		let by_listeners = service.top_all_time_for_guild(guild.guild_id, TopKind::Artists, OrderType::Listeners).await.unwrap();

		let plays: Vec<(&str, i64, i64)> = by_plays.iter().map(|r| (r.name.as_str(), r.total_playcount, r.listener_count)).collect();
		let listeners: Vec<&str> = by_listeners.iter().map(|r| r.name.as_str()).collect();

		assert_eq!(plays, vec![("Shared", 60, 3), ("Solo", 60, 1), ("Pair", 40, 2)]);
		assert_eq!(listeners, vec!["Shared", "Pair", "Solo"]);
	}

	#[tokio::test]
	async fn play_count_and_week_plays() {
		let db = setup_db().await;
		let user = seed_user(&db, 1, "someone").await;
		seed_track(&db, user.user_id, "Portishead", "Roads", 17).await;
		let now = Utc::now();
		seed_play(&db, user.user_id, "Portishead", "Roads", now - Duration::days(1), PlaySource::LastFm).await;
		seed_play(&db, user.user_id, "portishead", "ROADS", now - Duration::days(2), PlaySource::LastFm).await;
		seed_play(&db, user.user_id, "Portishead", "Roads", now - Duration::days(9), PlaySource::LastFm).await;

		let service = WhoKnowsService::new(db, 15);

		assert_eq!(service.play_count_for_user(user.user_id, &MusicKey::track("PORTISHEAD", "roads").unwrap()).await.unwrap(), Some(17));
		assert_eq!(service.play_count_for_user(user.user_id, &MusicKey::track("Portishead", "Glory Box").unwrap()).await.unwrap(), None);
		assert_eq!(service.week_playcount_for_guild(&[user.user_id], "Portishead", "Roads", now).await.unwrap(), 2);
		assert_eq!(service.week_playcount_for_guild(&[], "Portishead", "Roads", now).await.unwrap(), 0);
	}
}
