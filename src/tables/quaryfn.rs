use sea_orm::sea_query::{Expr, Func};
use sea_orm::{ActiveEnum, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, FromQueryResult, QueryFilter, QueryOrder, Statement, Value};
use entity::enums::{DataSource, PlaySource, PrivacyLevel};
use entity::{user_plays, users, UserBehavior, UserPlayBehavior};
use crate::data_source::ImportUser;
use crate::services::who_knows::{MusicKey, OrderType};
use crate::lastfm::TopKind;

/// One row of a WhoKnows leaderboard before display names are resolved.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct WhoKnowsRow {
	pub user_id: i32,
	pub playcount: i32,
	pub user_name_last_fm: String,
	pub discord_user_id: i64,
	pub user_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct GuildTopRow {
	pub name: String,
	pub artist_name: Option<String>,
	pub total_playcount: i64,
	pub listener_count: i64,
}

#[derive(Debug, FromQueryResult)]
struct PlaycountRow {
	playcount: i32,
}

/// Aggregate table plus the case-insensitive match clause for `key`.
fn key_source(key: &MusicKey) -> (&'static str, &'static str, Vec<Value>) {
	match key {
		MusicKey::Artist { name } => (
			"user_artists",
			"UPPER(t.name) = UPPER(?)",
			vec![name.clone().into()],
		),
		MusicKey::Album { artist, name } => (
			"user_albums",
			"UPPER(t.name) = UPPER(?) AND UPPER(t.artist_name) = UPPER(?)",
			vec![name.clone().into(), artist.clone().into()],
		),
		MusicKey::Track { artist, name } => (
			"user_tracks",
			"UPPER(t.name) = UPPER(?) AND UPPER(t.artist_name) = UPPER(?)",
			vec![name.clone().into(), artist.clone().into()],
		),
	}
}

fn kind_table(kind: TopKind) -> (&'static str, &'static str) {
	match kind {
		TopKind::Artists => ("user_artists", "NULL"),
		TopKind::Albums => ("user_albums", "t.artist_name"),
		TopKind::Tracks => ("user_tracks", "t.artist_name"),
	}
}

/// select func

pub async fn get_guild_who_knows<C: ConnectionTrait>(db: &C, guild_id: i32, key: &MusicKey, whitelist_only: bool) -> Result<Vec<WhoKnowsRow>, DbErr> {
	let (table, key_clause, key_values) = key_source(key);

	let mut sql = format!(
		"SELECT t.user_id, t.playcount, u.user_name_last_fm, u.discord_user_id, gu.user_name \
		FROM {table} AS t \
		INNER JOIN users AS u ON t.user_id = u.user_id \
		INNER JOIN guild_users AS gu ON gu.user_id = u.user_id \
		WHERE gu.guild_id = ? AND {key_clause} \
		AND gu.bot = ? AND u.blocked = ? \
		AND t.user_id NOT IN (SELECT gbu.user_id FROM guild_blocked_users AS gbu WHERE gbu.guild_id = ? AND gbu.blocked_from_who_knows = ?) "
	);

	let mut values: Vec<Value> = vec![guild_id.into()];
	values.extend(key_values);
	values.extend([false.into(), false.into(), guild_id.into(), true.into()]);

	if whitelist_only {
		sql.push_str("AND gu.who_knows_whitelisted = ? ");
		values.push(true.into());
	}

	sql.push_str("ORDER BY t.playcount DESC, t.user_id ASC");

	WhoKnowsRow::find_by_statement(Statement::from_sql_and_values(db.get_database_backend(), sql, values))
		.all(db)
		.await
}

/// Rows come back ordered so that the first row per Last.fm name is the one to keep.
pub async fn get_global_who_knows<C: ConnectionTrait>(db: &C, key: &MusicKey) -> Result<Vec<WhoKnowsRow>, DbErr> {
	let (table, key_clause, key_values) = key_source(key);

	let sql = format!(
		"SELECT t.user_id, t.playcount, u.user_name_last_fm, u.discord_user_id, NULL AS user_name \
		FROM {table} AS t \
		INNER JOIN users AS u ON t.user_id = u.user_id \
		WHERE {key_clause} AND u.blocked = ? AND u.privacy_level = ? \
		ORDER BY t.playcount DESC, u.last_used DESC, t.user_id ASC"
	);

	let mut values: Vec<Value> = key_values;
	values.extend([false.into(), PrivacyLevel::Global.to_value().into()]);

	WhoKnowsRow::find_by_statement(Statement::from_sql_and_values(db.get_database_backend(), sql, values))
		.all(db)
		.await
}

pub async fn get_friends_who_knows<C: ConnectionTrait>(db: &C, user_id: i32, key: &MusicKey) -> Result<Vec<WhoKnowsRow>, DbErr> {
	let (table, key_clause, key_values) = key_source(key);

	let sql = format!(
		"SELECT t.user_id, t.playcount, u.user_name_last_fm, u.discord_user_id, NULL AS user_name \
		FROM {table} AS t \
		INNER JOIN users AS u ON t.user_id = u.user_id \
		WHERE {key_clause} AND u.blocked = ? \
		AND (t.user_id = ? OR t.user_id IN (SELECT f.friend_user_id FROM friends AS f WHERE f.user_id = ?)) \
		ORDER BY t.playcount DESC, t.user_id ASC"
	);

	let mut values: Vec<Value> = key_values;
	values.extend([false.into(), user_id.into(), user_id.into()]);

	WhoKnowsRow::find_by_statement(Statement::from_sql_and_values(db.get_database_backend(), sql, values))
		.all(db)
		.await
}

pub async fn get_top_all_time_for_guild<C: ConnectionTrait>(db: &C, guild_id: i32, kind: TopKind, order: OrderType, limit: u64) -> Result<Vec<GuildTopRow>, DbErr> {
	let (table, artist_column) = kind_table(kind);
	let group_by = if matches!(kind, TopKind::Artists) { "t.name" } else { "t.name, t.artist_name" };
	let order_by = match order {
		OrderType::Playcount => "total_playcount DESC, listener_count DESC",
		OrderType::Listeners => "listener_count DESC, total_playcount DESC",
	};

	let sql = format!(
		"SELECT t.name AS name, {artist_column} AS artist_name, \
		CAST(SUM(t.playcount) AS SIGNED) AS total_playcount, COUNT(t.user_id) AS listener_count \
		FROM {table} AS t \
		INNER JOIN users AS u ON t.user_id = u.user_id \
		INNER JOIN guild_users AS gu ON gu.user_id = u.user_id \
		WHERE gu.guild_id = ? AND gu.bot = ? AND u.blocked = ? \
		AND t.user_id NOT IN (SELECT gbu.user_id FROM guild_blocked_users AS gbu WHERE gbu.guild_id = ? AND gbu.blocked_from_who_knows = ?) \
		GROUP BY {group_by} \
		ORDER BY {order_by}, t.name ASC \
		LIMIT {limit}"
	);

	let values: Vec<Value> = vec![guild_id.into(), false.into(), false.into(), guild_id.into(), true.into()];

	GuildTopRow::find_by_statement(Statement::from_sql_and_values(db.get_database_backend(), sql, values))
		.all(db)
		.await
}

pub async fn get_play_count_for_user<C: ConnectionTrait>(db: &C, user_id: i32, key: &MusicKey) -> Result<Option<i32>, DbErr> {
	let (table, key_clause, key_values) = key_source(key);

	let sql = format!("SELECT t.playcount FROM {table} AS t WHERE t.user_id = ? AND {key_clause}");

	let mut values: Vec<Value> = vec![user_id.into()];
	values.extend(key_values);

	let row = PlaycountRow::find_by_statement(Statement::from_sql_and_values(db.get_database_backend(), sql, values))
		.one(db)
		.await?;

	Ok(row.map(|r| r.playcount))
}

/// The most recently used account with this Last.fm name that reads from imports,
/// paired with its own latest imported play.
pub async fn get_import_user_for_lastfm_username<C: ConnectionTrait>(db: &C, user_name_last_fm: &str) -> Result<Option<ImportUser>, DbErr> {
	let user = UserBehavior::find()
		.filter(
			Expr::expr(Func::upper(Expr::col((users::Entity, users::Column::UserNameLastFm))))
				.eq(Func::upper(Expr::val(user_name_last_fm)))
		)
		.filter(users::Column::LastUsed.is_not_null())
		.filter(users::Column::DataSource.ne(DataSource::LastFm))
		.order_by_desc(users::Column::LastUsed)
		.one(db)
		.await?;

	match user {
		None => Ok(None),
		Some(user) => with_last_import_play(db, user).await,
	}
}

async fn with_last_import_play<C: ConnectionTrait>(db: &C, user: users::Model) -> Result<Option<ImportUser>, DbErr> {
	let last_import_play = UserPlayBehavior::find()
		.filter(user_plays::Column::UserId.eq(user.user_id))
		.filter(user_plays::Column::PlaySource.ne(PlaySource::LastFm))
		.order_by_desc(user_plays::Column::TimePlayed)
		.one(db)
		.await?;

	Ok(last_import_play.map(|play| ImportUser {
		user_id: user.user_id,
		discord_user_id: user.discord_user_id,
		user_name_last_fm: user.user_name_last_fm,
		data_source: user.data_source,
		last_import_play: play.time_played,
	}))
}

#[derive(Debug, FromQueryResult)]
struct CountRow {
	count: i64,
}

/// Distinct Last.fm accounts, ignoring case.
pub async fn get_grouped_lastfm_user_count<C: ConnectionTrait>(db: &C) -> Result<i64, DbErr> {
	let sql = "SELECT COUNT(DISTINCT UPPER(user_name_last_fm)) AS count FROM users";

	let row = CountRow::find_by_statement(Statement::from_string(db.get_database_backend(), sql))
		.one(db)
		.await?;

	Ok(row.map_or(0, |r| r.count))
}
