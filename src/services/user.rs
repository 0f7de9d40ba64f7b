use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use chrono::{Datelike, DateTime, NaiveDate, Utc};
use log::{error, info, warn};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
	ActiveModelTrait, ActiveValue, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
	PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, Value,
};
use tokio::sync::Mutex;
use entity::enums::{CommandResponse, DataSource, FmEmbedType, InteractionType, PrivacyLevel, UserType};
use entity::{
	featured_logs, friends, user_albums, user_artists, user_interactions, user_tracks, users, FeaturedLogBehavior,
	FriendBehavior, User, UserAlbumBehavior, UserArtistBehavior, UserBehavior, UserInteractionBehavior, UserTrackBehavior,
};
use crate::errors::{BotError, BotResult};
use crate::lastfm::{LiveHistory, TopList};
use crate::services::interactions::{InteractionTracker, ReferencedMusic};
use crate::tables::quaryfn;
use crate::utils::cache::TtlCache;
use crate::utils::convert::{db_to_discord_id, discord_id_to_db};

const INACTIVE_AFTER_DAYS: i64 = 30;
const INACTIVE_BATCH: u64 = 100;
const AGGREGATE_CHUNK: usize = 500;

fn clamp_playcount(playcount: i64) -> i32 {
	playcount.clamp(0, i32::MAX as i64) as i32
}

/// Extra lines shown under a now playing embed, stored as a bit mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FooterOption {
	TotalScrobbles,
	ArtistPlays,
	AlbumPlays,
	TrackPlays,
	ServerArtistRank,
	ServerArtistListeners,
	GlobalArtistRank,
	ServerTrackWeekPlays,
}

impl FooterOption {
	pub const ALL: [FooterOption; 8] = [
		FooterOption::TotalScrobbles,
		FooterOption::ArtistPlays,
		FooterOption::AlbumPlays,
		FooterOption::TrackPlays,
		FooterOption::ServerArtistRank,
		FooterOption::ServerArtistListeners,
		FooterOption::GlobalArtistRank,
		FooterOption::ServerTrackWeekPlays,
	];

	pub fn bit(&self) -> i64 {
		match self {
			FooterOption::TotalScrobbles => 1,
			FooterOption::ArtistPlays => 2,
			FooterOption::AlbumPlays => 4,
			FooterOption::TrackPlays => 8,
			FooterOption::ServerArtistRank => 16,
			FooterOption::ServerArtistListeners => 32,
			FooterOption::GlobalArtistRank => 64,
			FooterOption::ServerTrackWeekPlays => 128,
		}
	}

	pub fn key(&self) -> &'static str {
		match self {
			FooterOption::TotalScrobbles => "total-scrobbles",
			FooterOption::ArtistPlays => "artist-plays",
			FooterOption::AlbumPlays => "album-plays",
			FooterOption::TrackPlays => "track-plays",
			FooterOption::ServerArtistRank => "server-artist-rank",
			FooterOption::ServerArtistListeners => "server-artist-listeners",
			FooterOption::GlobalArtistRank => "global-artist-rank",
			FooterOption::ServerTrackWeekPlays => "server-track-week-plays",
		}
	}

	pub fn from_key(key: &str) -> Option<FooterOption> {
		FooterOption::ALL.into_iter().find(|o| o.key() == key)
	}

	pub fn from_mask(mask: i64) -> Vec<FooterOption> {
		FooterOption::ALL.into_iter().filter(|o| mask & o.bit() != 0).collect()
	}

	pub fn to_mask(options: &[FooterOption]) -> i64 {
		options.iter().fold(0, |mask, o| mask | o.bit())
	}
}

/// Lays out footer options over lines, optionally with small markdown.
pub fn create_footer(options: &[String], genres: Option<&str>, small_markdown: bool) -> String {
	let prefix = if small_markdown { "-# " } else { "" };
	let mut footer = String::new();

	let mut genres_added = false;
	if let Some(genres) = genres.filter(|g| g.chars().count() <= 48 && options.len() > 2) {
		footer.push_str(prefix);
		footer.push_str(genres);
		footer.push('\n');
		footer.push_str(prefix);
		genres_added = true;
	}

	let mut line_length = 0;
	for (index, option) in options.iter().enumerate() {
		let option_length = option.chars().count();
		let has_next = index + 1 < options.len();

		if (line_length > 38 || (line_length > 28 && option_length > 18)) && has_next {
			footer.push('\n');
			footer.push_str(prefix);
			line_length = option_length;
			footer.push_str(option);
		} else {
			if line_length != 0 {
				footer.push_str(" · ");
			}
			footer.push_str(option);
			line_length += option_length;
		}

		if !has_next {
			footer.push('\n');
		}
	}

	if let Some(genres) = genres.filter(|_| !genres_added) {
		footer.push_str(prefix);
		footer.push_str(genres);
		footer.push('\n');
	}

	footer
}

pub fn age_in_years(birth: NaiveDate, today: NaiveDate) -> i32 {
	let mut age = today.year() - birth.year();
	if today.month() < birth.month() || (today.month() == birth.month() && today.day() < birth.day()) {
		age -= 1;
	}

	age
}

pub fn get_user_title(name: &str, user_type: UserType) -> String {
	format!("{}{}", name, user_type.icon())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateType {
	Full,
	Artists,
	Albums,
	Tracks,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexedUserStats {
	pub play_count: Option<i64>,
	pub artist_count: Option<i64>,
	pub album_count: Option<i64>,
	pub track_count: Option<i64>,
	pub import_count: Option<i64>,
	pub total_count: Option<i64>,
	pub failed_updates: Vec<UpdateType>,
}

/// Text shown after an index run, and whether it ends with a supporter promo.
pub fn index_completed_description(user: &User, stats: Option<&IndexedUserStats>) -> (bool, String) {
	let mut lines: Vec<String> = vec![];

	let Some(stats) = stats else {
		return (false, "Full update could not complete, something went wrong. Please try again later.\n".to_string());
	};

	if !stats.failed_updates.is_empty() {
		lines.push(format!("❌ A (Last.fm) error occurred while attempting to update `{}`:", user.user_name_last_fm));
		for (update, text) in [
			(UpdateType::Full, "- Could not fetch user info from Last.fm"),
			(UpdateType::Artists, "- Could not fetch top artists"),
			(UpdateType::Albums, "- Could not fetch top albums"),
			(UpdateType::Tracks, "- Could not fetch top tracks"),
		] {
			if stats.failed_updates.contains(&update) {
				lines.push(text.to_string());
			}
		}
		lines.push("Please try again later.".to_string());

		return (false, lines.join("\n") + "\n");
	}

	lines.push(format!("✅ `{}` has been fully updated.", user.user_name_last_fm));
	lines.push(String::new());
	lines.push("Cached the following playcounts:".to_string());

	let counts = [
		(stats.play_count, "Last **{}** plays", "**{}** Last.fm plays"),
		(stats.artist_count, "Top **{}** artists", "**{}** top artists"),
		(stats.album_count, "Top **{}** albums", "**{}** top albums"),
		(stats.track_count, "Top **{}** tracks", "**{}** top tracks"),
	];
	let regular = user.user_type == UserType::User;

	for (count, user_text, supporter_text) in counts {
		if let Some(count) = count {
			let template = if regular { user_text } else { supporter_text };
			lines.push(format!("- {}", template.replace("{}", &count.to_string())));
		}
	}

	if !regular {
		if let Some(import_count) = stats.import_count {
			lines.push(String::new());
			lines.push(format!("Import setting: {}", user.data_source));
			lines.push(format!(
				"Combined with your **{}** imported plays you have a total of **{}** plays.",
				import_count,
				stats.total_count.unwrap_or(import_count)
			));
		}
	}

	let promo = regular
		&& (stats.play_count.map_or(false, |c| c >= 49900)
			|| stats.track_count.map_or(false, |c| c >= 5900)
			|| stats.album_count.map_or(false, |c| c >= 4900)
			|| stats.artist_count.map_or(false, |c| c >= 3900));

	if promo {
		lines.push(String::new());
		lines.push("Want your full Last.fm history to be stored in the bot? Become a supporter to unlock it.".to_string());
	}

	(promo, lines.join("\n") + "\n")
}

/// User records keyed by internal id, with lookup indexes by Discord id and Last.fm name.
pub struct UserCache {
	users: TtlCache<i32, User>,
	by_discord_id: TtlCache<i64, i32>,
	by_lastfm_name: TtlCache<String, i32>,
	/// Bumped on every invalidation.
	generation: u64,
}

impl UserCache {
	pub fn new(ttl: Duration, capacity: usize) -> Self {
		Self {
			users: TtlCache::new(ttl, capacity),
			by_discord_id: TtlCache::new(ttl, capacity),
			by_lastfm_name: TtlCache::new(ttl, capacity),
			generation: 0,
		}
	}

	pub fn generation(&self) -> u64 {
		self.generation
	}

	pub fn get_by_discord_id(&mut self, discord_user_id: i64) -> Option<User> {
		let user_id = self.by_discord_id.get(&discord_user_id)?;
		self.users.get(&user_id).filter(|u| u.discord_user_id == discord_user_id)
	}

	pub fn get_by_lastfm_name(&mut self, user_name: &str) -> Option<User> {
		let key = user_name.to_lowercase();
		let user_id = self.by_lastfm_name.get(&key)?;
		self.users.get(&user_id).filter(|u| u.user_name_last_fm.to_lowercase() == key)
	}

	pub fn insert(&mut self, user: User) {
		self.by_discord_id.insert(user.discord_user_id, user.user_id);
		self.by_lastfm_name.insert(user.user_name_last_fm.to_lowercase(), user.user_id);
		self.users.insert(user.user_id, user);
	}

	/// Inserts a row read from the database unless something was invalidated since `generation`.
	pub fn insert_if_current(&mut self, user: User, generation: u64) -> bool {
		if generation != self.generation {
			return false;
		}

		self.insert(user);
		true
	}

	pub fn invalidate(&mut self, user: &User) {
		self.generation += 1;
		self.users.remove(&user.user_id);
		self.by_discord_id.remove(&user.discord_user_id);
		self.by_lastfm_name.remove(&user.user_name_last_fm.to_lowercase());
	}

	pub fn invalidate_discord_id(&mut self, discord_user_id: i64) {
		match self.get_by_discord_id(discord_user_id) {
			Some(user) => self.invalidate(&user),
			None => {
				self.generation += 1;
				self.by_discord_id.remove(&discord_user_id);
			}
		}
	}

	pub fn len(&self) -> usize {
		self.users.len()
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastfmSettings {
	pub user_name_last_fm: String,
	pub session_key: Option<String>,
	pub fm_embed_type: FmEmbedType,
}

/// One command invocation to be stored once its outcome is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionRecord {
	pub interaction_id: u64,
	pub user_id: i32,
	pub command_name: String,
	pub command_options: Option<String>,
	pub discord_guild_id: Option<u64>,
	pub discord_channel_id: Option<u64>,
	pub interaction_type: InteractionType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextMessage {
	pub context_id: u64,
	pub message_id: u64,
	pub discord_user_id: u64,
}

async fn deletion_stage<T>(user_id: i32, stage: &'static str, query: impl Future<Output = Result<T, DbErr>>) -> BotResult<T> {
	query.await.map_err(|source| {
		error!("Deleting user {} failed at stage {}: {:?}", user_id, stage, source);
		BotError::Deletion { stage, source }
	})
}

#[derive(Clone)]
pub struct UserService {
	db: DatabaseConnection,
	cache: Arc<Mutex<UserCache>>,
	tracker: InteractionTracker,
	interaction_wait: Duration,
}

impl UserService {
	pub fn new(db: DatabaseConnection, cache: UserCache, tracker: InteractionTracker, interaction_wait: Duration) -> Self {
		Self {
			db,
			cache: Arc::new(Mutex::new(cache)),
			tracker,
			interaction_wait,
		}
	}

	async fn invalidate(&self, user: &User) {
		self.cache.lock().await.invalidate(user);
	}

	pub async fn get_user(&self, discord_user_id: u64) -> BotResult<Option<User>> {
		let discord_user_id = discord_id_to_db(discord_user_id);

		let generation = {
			let mut cache = self.cache.lock().await;
			if let Some(user) = cache.get_by_discord_id(discord_user_id) {
				return Ok(Some(user));
			}
			cache.generation()
		};

		let user = UserBehavior::find()
			.filter(users::Column::DiscordUserId.eq(discord_user_id))
			.one(&self.db)
			.await?;

		if let Some(user) = &user {
			self.cache.lock().await.insert_if_current(user.clone(), generation);
		}

		Ok(user)
	}

	pub async fn get_user_for_id(&self, user_id: i32) -> BotResult<Option<User>> {
		Ok(UserBehavior::find_by_id(user_id).one(&self.db).await?)
	}

	pub async fn get_user_for_lastfm_username(&self, user_name: &str) -> BotResult<Option<User>> {
		let generation = {
			let mut cache = self.cache.lock().await;
			if let Some(user) = cache.get_by_lastfm_name(user_name) {
				return Ok(Some(user));
			}
			cache.generation()
		};

		let user = UserBehavior::find()
			.filter(
				Expr::expr(Func::upper(Expr::col((users::Entity, users::Column::UserNameLastFm))))
					.eq(Func::upper(Expr::val(user_name)))
			)
			.order_by_desc(users::Column::LastUsed)
			.one(&self.db)
			.await?;

		if let Some(user) = &user {
			self.cache.lock().await.insert_if_current(user.clone(), generation);
		}

		Ok(user)
	}

	pub async fn get_multiple_users(&self, user_ids: &HashSet<i32>) -> BotResult<HashMap<i32, User>> {
		if user_ids.is_empty() {
			return Ok(HashMap::new());
		}

		let users = UserBehavior::find()
			.filter(users::Column::UserId.is_in(user_ids.iter().copied()))
			.all(&self.db)
			.await?;

		Ok(users.into_iter().map(|u| (u.user_id, u)).collect())
	}

	pub async fn get_users_for_discord_ids(&self, discord_user_ids: &[u64]) -> BotResult<Vec<User>> {
		if discord_user_ids.is_empty() {
			return Ok(vec![]);
		}

		Ok(UserBehavior::find()
			.filter(users::Column::DiscordUserId.is_in(discord_user_ids.iter().map(|id| discord_id_to_db(*id))))
			.all(&self.db)
			.await?)
	}

	/// Replaces the stored artist, album and track totals of a user.
	pub async fn store_user_aggregates(&self, user_id: i32, artists: &TopList, albums: &TopList, tracks: &TopList) -> BotResult<()> {
		let txn = self.db.begin().await?;

		UserArtistBehavior::delete_many().filter(user_artists::Column::UserId.eq(user_id)).exec(&txn).await?;
		UserAlbumBehavior::delete_many().filter(user_albums::Column::UserId.eq(user_id)).exec(&txn).await?;
		UserTrackBehavior::delete_many().filter(user_tracks::Column::UserId.eq(user_id)).exec(&txn).await?;

		let artist_rows: Vec<_> = artists.entries.iter().map(|e| user_artists::ActiveModel {
			user_artist_id: ActiveValue::NotSet,
			user_id: ActiveValue::Set(user_id),
			name: ActiveValue::Set(e.name.clone()),
			playcount: ActiveValue::Set(clamp_playcount(e.playcount)),
		}).collect();
		for chunk in artist_rows.chunks(AGGREGATE_CHUNK) {
			UserArtistBehavior::insert_many(chunk.to_vec()).exec(&txn).await?;
		}

		let album_rows: Vec<_> = albums.entries.iter().map(|e| user_albums::ActiveModel {
			user_album_id: ActiveValue::NotSet,
			user_id: ActiveValue::Set(user_id),
			name: ActiveValue::Set(e.name.clone()),
			artist_name: ActiveValue::Set(e.artist_name.clone().unwrap_or_default()),
			playcount: ActiveValue::Set(clamp_playcount(e.playcount)),
		}).collect();
		for chunk in album_rows.chunks(AGGREGATE_CHUNK) {
			UserAlbumBehavior::insert_many(chunk.to_vec()).exec(&txn).await?;
		}

		let track_rows: Vec<_> = tracks.entries.iter().map(|e| user_tracks::ActiveModel {
			user_track_id: ActiveValue::NotSet,
			user_id: ActiveValue::Set(user_id),
			name: ActiveValue::Set(e.name.clone()),
			artist_name: ActiveValue::Set(e.artist_name.clone().unwrap_or_default()),
			playcount: ActiveValue::Set(clamp_playcount(e.playcount)),
		}).collect();
		for chunk in track_rows.chunks(AGGREGATE_CHUNK) {
			UserTrackBehavior::insert_many(chunk.to_vec()).exec(&txn).await?;
		}

		txn.commit().await?;
		info!("Stored aggregates for user {}: {} artists, {} albums, {} tracks", user_id, artist_rows.len(), album_rows.len(), track_rows.len());

		Ok(())
	}

	pub async fn user_registered(&self, discord_user_id: u64) -> BotResult<bool> {
		Ok(self.get_user(discord_user_id).await?.is_some())
	}

	pub async fn user_blocked(&self, discord_user_id: u64) -> BotResult<bool> {
		Ok(self.get_user(discord_user_id).await?.map_or(false, |u| u.blocked))
	}

	pub async fn user_has_session(&self, discord_user_id: u64) -> BotResult<bool> {
		Ok(self
			.get_user(discord_user_id)
			.await?
			.and_then(|u| u.session_key_last_fm)
			.map_or(false, |key| !key.is_empty()))
	}

	pub async fn update_user_last_used(&self, discord_user_id: u64) -> BotResult<()> {
		let discord_user_id = discord_id_to_db(discord_user_id);

		UserBehavior::update_many()
			.col_expr(users::Column::LastUsed, Expr::value(Utc::now()))
			.filter(users::Column::DiscordUserId.eq(discord_user_id))
			.exec(&self.db)
			.await?;

		self.cache.lock().await.invalidate_discord_id(discord_user_id);
		Ok(())
	}

	/// Links a Last.fm account, creating the user on first link.
	pub async fn set_lastfm(&self, discord_user_id: u64, settings: LastfmSettings, update_session_key: bool) -> BotResult<User> {
		let db_discord_id = discord_id_to_db(discord_user_id);

		let existing = UserBehavior::find()
			.filter(users::Column::DiscordUserId.eq(db_discord_id))
			.one(&self.db)
			.await?;

		let user = match existing {
			None => {
				let user = users::ActiveModel {
					user_id: ActiveValue::NotSet,
					discord_user_id: ActiveValue::Set(db_discord_id),
					user_name_last_fm: ActiveValue::Set(settings.user_name_last_fm),
					session_key_last_fm: ActiveValue::Set(settings.session_key),
					user_type: ActiveValue::Set(UserType::User),
					data_source: ActiveValue::Set(DataSource::LastFm),
					privacy_level: ActiveValue::Set(PrivacyLevel::Server),
					fm_embed_type: ActiveValue::Set(settings.fm_embed_type),
					fm_footer_options: ActiveValue::Set(FooterOption::TotalScrobbles.bit()),
					time_zone: ActiveValue::Set(None),
					blocked: ActiveValue::Set(false),
					music_bot_tracking_disabled: ActiveValue::Set(None),
					registered_last_fm: ActiveValue::Set(None),
					last_indexed: ActiveValue::Set(None),
					last_used: ActiveValue::Set(Some(Utc::now())),
				};

				let user = user.insert(&self.db).await?;
				info!("Registered user {} for Discord user {}", user.user_name_last_fm, discord_user_id);
				user
			},
			Some(user) => {
				self.invalidate(&user).await;

				let mut active = user.into_active_model();
				active.user_name_last_fm = ActiveValue::Set(settings.user_name_last_fm);
				active.fm_embed_type = ActiveValue::Set(settings.fm_embed_type);
				if update_session_key {
					active.session_key_last_fm = ActiveValue::Set(settings.session_key);
				}

				active.update(&self.db).await?
			},
		};

		self.invalidate(&user).await;
		Ok(user)
	}

	async fn update_user(&self, user_id: i32, f: impl FnOnce(&mut users::ActiveModel)) -> BotResult<Option<User>> {
		let Some(user) = UserBehavior::find_by_id(user_id).one(&self.db).await? else {
			return Ok(None);
		};
		self.invalidate(&user).await;

		let mut active = user.into_active_model();
		f(&mut active);
		let user = active.update(&self.db).await?;

		self.invalidate(&user).await;
		Ok(Some(user))
	}

	pub async fn set_privacy_level(&self, user_id: i32, level: PrivacyLevel) -> BotResult<Option<User>> {
		self.update_user(user_id, |u| u.privacy_level = ActiveValue::Set(level)).await
	}

	pub async fn set_data_source(&self, user_id: i32, data_source: DataSource) -> BotResult<Option<User>> {
		self.update_user(user_id, |u| u.data_source = ActiveValue::Set(data_source)).await
	}

	pub async fn set_footer_options(&self, user_id: i32, options: &[FooterOption]) -> BotResult<Option<User>> {
		let mask = FooterOption::to_mask(options);
		self.update_user(user_id, |u| u.fm_footer_options = ActiveValue::Set(mask)).await
	}

	pub async fn set_settings(&self, user_id: i32, embed_type: FmEmbedType) -> BotResult<Option<User>> {
		self.update_user(user_id, |u| u.fm_embed_type = ActiveValue::Set(embed_type)).await
	}

	/// `"null"` clears the time zone.
	pub async fn set_time_zone(&self, user_id: i32, time_zone: &str) -> BotResult<Option<User>> {
		let time_zone = (time_zone != "null").then(|| time_zone.to_string());
		self.update_user(user_id, |u| u.time_zone = ActiveValue::Set(time_zone)).await
	}

	pub async fn toggle_bot_scrobbling(&self, user_id: i32, disabled: Option<bool>) -> BotResult<Option<User>> {
		self.update_user(user_id, |u| u.music_bot_tracking_disabled = ActiveValue::Set(disabled)).await
	}

	pub async fn set_last_indexed(&self, user_id: i32, registered: Option<DateTime<Utc>>) -> BotResult<Option<User>> {
		self.update_user(user_id, |u| {
			u.last_indexed = ActiveValue::Set(Some(Utc::now()));
			if registered.is_some() {
				u.registered_last_fm = ActiveValue::Set(registered);
			}
		}).await
	}

	/// Returns false when the friend is already added or is the user themselves.
	pub async fn add_friend(&self, user_id: i32, friend_user_id: i32) -> BotResult<bool> {
		if user_id == friend_user_id {
			return Ok(false);
		}

		let existing = FriendBehavior::find()
			.filter(friends::Column::UserId.eq(user_id))
			.filter(friends::Column::FriendUserId.eq(friend_user_id))
			.one(&self.db)
			.await?;

		if existing.is_some() {
			return Ok(false);
		}

		friends::ActiveModel {
			friend_id: ActiveValue::NotSet,
			user_id: ActiveValue::Set(user_id),
			friend_user_id: ActiveValue::Set(friend_user_id),
		}.insert(&self.db).await?;

		Ok(true)
	}

	pub async fn remove_friend(&self, user_id: i32, friend_user_id: i32) -> BotResult<bool> {
		let deleted = FriendBehavior::delete_many()
			.filter(friends::Column::UserId.eq(user_id))
			.filter(friends::Column::FriendUserId.eq(friend_user_id))
			.exec(&self.db)
			.await?;

		Ok(deleted.rows_affected > 0)
	}

	pub async fn get_friends(&self, user_id: i32) -> BotResult<Vec<User>> {
		let friend_ids: Vec<i32> = FriendBehavior::find()
			.filter(friends::Column::UserId.eq(user_id))
			.all(&self.db)
			.await?
			.into_iter()
			.map(|f| f.friend_user_id)
			.collect();

		if friend_ids.is_empty() {
			return Ok(vec![]);
		}

		Ok(UserBehavior::find()
			.filter(users::Column::UserId.is_in(friend_ids))
			.order_by_asc(users::Column::UserNameLastFm)
			.all(&self.db)
			.await?)
	}

	/// Removes a user and everything that points at them in one transaction.
	/// Returns false when the user does not exist.
	pub async fn delete_user(&self, user_id: i32) -> BotResult<bool> {
		let txn = self.db.begin().await?;

		let Some(user) = UserBehavior::find_by_id(user_id).one(&txn).await? else {
			return Ok(false);
		};

		deletion_stage(user_id, "user_artists", UserArtistBehavior::delete_many()
			.filter(user_artists::Column::UserId.eq(user_id))
			.exec(&txn)).await?;
		deletion_stage(user_id, "user_albums", UserAlbumBehavior::delete_many()
			.filter(user_albums::Column::UserId.eq(user_id))
			.exec(&txn)).await?;
		deletion_stage(user_id, "user_tracks", UserTrackBehavior::delete_many()
			.filter(user_tracks::Column::UserId.eq(user_id))
			.exec(&txn)).await?;
		deletion_stage(user_id, "friends", FriendBehavior::delete_many()
			.filter(Condition::any()
				.add(friends::Column::UserId.eq(user_id))
				.add(friends::Column::FriendUserId.eq(user_id)))
			.exec(&txn)).await?;
		deletion_stage(user_id, "featured_logs", FeaturedLogBehavior::update_many()
			.col_expr(featured_logs::Column::UserId, Expr::value(Value::Int(None)))
			.filter(featured_logs::Column::UserId.eq(user_id))
			.exec(&txn)).await?;
		deletion_stage(user_id, "users", UserBehavior::delete_by_id(user_id).exec(&txn)).await?;
		deletion_stage(user_id, "commit", txn.commit()).await?;

		self.invalidate(&user).await;
		info!("Deleted user {} - {} - {}", user.user_id, user.discord_user_id, user.user_name_last_fm);

		Ok(true)
	}

	/// Deletes users unused for a month whose Last.fm account is gone.
	pub async fn delete_inactive_users(&self, live: &dyn LiveHistory, pause: Duration) -> BotResult<usize> {
		let cutoff = Utc::now() - chrono::Duration::days(INACTIVE_AFTER_DAYS);

		let candidates = UserBehavior::find()
			.filter(Condition::any()
				.add(users::Column::LastUsed.is_null())
				.add(users::Column::LastUsed.lt(cutoff)))
			.order_by_asc(users::Column::UserId)
			.limit(INACTIVE_BATCH)
			.all(&self.db)
			.await?;

		let mut deleted = 0;
		for (index, user) in candidates.into_iter().enumerate() {
			if index > 0 && !pause.is_zero() {
				tokio::time::sleep(pause).await;
			}

			match live.user_exists(&user.user_name_last_fm).await {
				Ok(false) => {
					if self.delete_user(user.user_id).await? {
						info!("DeleteInactiveUsers: User {} | {} deleted", user.user_name_last_fm, user.user_id);
						deleted += 1;
					}
				},
				Ok(true) => info!("DeleteInactiveUsers: User {} exists, so deletion cancelled", user.user_name_last_fm),
				Err(error) => warn!("DeleteInactiveUsers: Could not check {}: {}", user.user_name_last_fm, error),
			}
		}

		Ok(deleted)
	}

	pub async fn total_user_count(&self) -> BotResult<u64> {
		Ok(UserBehavior::find().count(&self.db).await?)
	}

	pub async fn total_active_user_count(&self, days: i64) -> BotResult<u64> {
		let since = Utc::now() - chrono::Duration::days(days);

		Ok(UserBehavior::find()
			.filter(users::Column::LastUsed.gte(since))
			.count(&self.db)
			.await?)
	}

	pub async fn total_authorized_user_count(&self) -> BotResult<u64> {
		Ok(UserBehavior::find()
			.filter(users::Column::SessionKeyLastFm.is_not_null())
			.count(&self.db)
			.await?)
	}

	pub async fn total_grouped_lastfm_user_count(&self) -> BotResult<i64> {
		Ok(quaryfn::get_grouped_lastfm_user_count(&self.db).await?)
	}

	/// Waits for the command to finish, then stores its outcome.
	pub async fn add_user_interaction(&self, record: InteractionRecord) -> BotResult<()> {
		let outcome = self.tracker
			.wait_for_completion(record.interaction_id, self.interaction_wait)
			.await
			.map(|tracked| tracked.outcome)
			.unwrap_or_default();

		let referenced = outcome.referenced.clone();

		user_interactions::ActiveModel {
			id: ActiveValue::NotSet,
			timestamp: ActiveValue::Set(Utc::now()),
			user_id: ActiveValue::Set(record.user_id),
			command_name: ActiveValue::Set(record.command_name),
			command_options: ActiveValue::Set(record.command_options),
			discord_guild_id: ActiveValue::Set(record.discord_guild_id.map(discord_id_to_db)),
			discord_channel_id: ActiveValue::Set(record.discord_channel_id.map(discord_id_to_db)),
			discord_id: ActiveValue::Set(Some(discord_id_to_db(record.interaction_id))),
			discord_response_id: ActiveValue::Set(outcome.response_message_id.map(discord_id_to_db)),
			response: ActiveValue::Set(outcome.response),
			interaction_type: ActiveValue::Set(record.interaction_type),
			error_reference_id: ActiveValue::Set(outcome.error_reference),
			artist: ActiveValue::Set(referenced.as_ref().map(|m| m.artist.clone())),
			album: ActiveValue::Set(referenced.as_ref().and_then(|m| m.album.clone())),
			track: ActiveValue::Set(referenced.and_then(|m| m.track)),
			hint_shown: ActiveValue::Set(Some(outcome.hint_shown)),
		}.insert(&self.db).await?;

		Ok(())
	}

	pub async fn update_interaction_context(&self, interaction_id: u64, music: ReferencedMusic) -> BotResult<()> {
		self.tracker.set_referenced_music(interaction_id, music.clone()).await;

		UserInteractionBehavior::update_many()
			.col_expr(user_interactions::Column::Artist, Expr::value(music.artist))
			.col_expr(user_interactions::Column::Album, Expr::value(music.album))
			.col_expr(user_interactions::Column::Track, Expr::value(music.track))
			.filter(user_interactions::Column::DiscordId.eq(discord_id_to_db(interaction_id)))
			.exec(&self.db)
			.await?;

		Ok(())
	}

	async fn find_interaction(&self, lookup_id: u64) -> BotResult<Option<user_interactions::Model>> {
		let lookup_id = discord_id_to_db(lookup_id);

		Ok(UserInteractionBehavior::find()
			.filter(Condition::any()
				.add(user_interactions::Column::DiscordId.eq(lookup_id))
				.add(user_interactions::Column::DiscordResponseId.eq(lookup_id)))
			.order_by_desc(user_interactions::Column::Id)
			.one(&self.db)
			.await?)
	}

	pub async fn interaction_exists(&self, interaction_id: u64) -> BotResult<bool> {
		if let Some(tracked) = self.tracker.get(interaction_id).await {
			if tracked.outcome.response_message_id.is_some() {
				return Ok(true);
			}
		}

		let interaction = UserInteractionBehavior::find()
			.filter(user_interactions::Column::DiscordId.eq(discord_id_to_db(interaction_id)))
			.filter(user_interactions::Column::DiscordResponseId.is_not_null())
			.one(&self.db)
			.await?;

		Ok(interaction.is_some())
	}

	pub async fn get_referenced_music(&self, lookup_id: u64) -> BotResult<Option<ReferencedMusic>> {
		if let Some(music) = self.tracker.get(lookup_id).await.and_then(|t| t.outcome.referenced) {
			return Ok(Some(music));
		}
		if let Some((_, tracked)) = self.tracker.find_by_response_message(lookup_id).await {
			if let Some(music) = tracked.outcome.referenced {
				return Ok(Some(music));
			}
		}

		Ok(self.find_interaction(lookup_id).await?.and_then(|interaction| {
			interaction.artist.map(|artist| ReferencedMusic {
				artist,
				album: interaction.album,
				track: interaction.track,
			})
		}))
	}

	/// Resolves either a command id or its response message id to both ids and the invoking user.
	pub async fn get_message_id_to_delete(&self, lookup_id: u64) -> BotResult<Option<ContextMessage>> {
		if let Some((context_id, tracked)) = self.tracker.find_by_response_message(lookup_id).await {
			return Ok(Some(ContextMessage { context_id, message_id: lookup_id, discord_user_id: tracked.discord_user_id }));
		}

		if let Some(tracked) = self.tracker.get(lookup_id).await {
			if let Some(message_id) = tracked.outcome.response_message_id {
				return Ok(Some(ContextMessage { context_id: lookup_id, message_id, discord_user_id: tracked.discord_user_id }));
			}
		}

		let Some(interaction) = self.find_interaction(lookup_id).await? else {
			return Ok(None);
		};
		let (Some(context_id), Some(message_id)) = (interaction.discord_id, interaction.discord_response_id) else {
			return Ok(None);
		};

		Ok(self.get_user_for_id(interaction.user_id).await?.map(|user| ContextMessage {
			context_id: db_to_discord_id(context_id),
			message_id: db_to_discord_id(message_id),
			discord_user_id: db_to_discord_id(user.discord_user_id),
		}))
	}

	pub async fn get_command_executed_amount(&self, user_id: i32, command: &str, since: DateTime<Utc>) -> BotResult<u64> {
		Ok(UserInteractionBehavior::find()
			.filter(user_interactions::Column::UserId.eq(user_id))
			.filter(user_interactions::Column::Timestamp.gte(since))
			.filter(user_interactions::Column::Response.eq(CommandResponse::Ok))
			.filter(user_interactions::Column::CommandName.eq(command))
			.count(&self.db)
			.await?)
	}

	pub async fn hint_shown_before(&self, user_id: i32, command: &str) -> BotResult<bool> {
		let shown = UserInteractionBehavior::find()
			.filter(user_interactions::Column::UserId.eq(user_id))
			.filter(user_interactions::Column::Response.eq(CommandResponse::Ok))
			.filter(user_interactions::Column::CommandName.eq(command))
			.filter(user_interactions::Column::HintShown.eq(true))
			.one(&self.db)
			.await?;

		Ok(shown.is_some())
	}
}
