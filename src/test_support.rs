use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue, Database, DatabaseConnection, EntityTrait};
use migration::{Migrator, MigratorTrait};
use entity::enums::{DataSource, FmEmbedType, PlaySource, PrivacyLevel, UserType};
use entity::{
	featured_logs, friends, guild_users, guilds, user_albums, user_artists, user_plays, user_tracks, users, FeaturedLog,
	Guild, GuildUserBehavior, User,
};

pub async fn setup_db() -> DatabaseConnection {
	let db = Database::connect("sqlite::memory:").await.unwrap();
	Migrator::up(&db, None).await.unwrap();
	db
}

pub async fn seed_user(db: &DatabaseConnection, discord_user_id: u64, user_name_last_fm: &str) -> User {
	users::ActiveModel {
		user_id: ActiveValue::NotSet,
		discord_user_id: ActiveValue::Set(discord_user_id as i64),
		user_name_last_fm: ActiveValue::Set(user_name_last_fm.to_string()),
		session_key_last_fm: ActiveValue::Set(None),
		user_type: ActiveValue::Set(UserType::User),
		data_source: ActiveValue::Set(DataSource::LastFm),
		privacy_level: ActiveValue::Set(PrivacyLevel::Server),
		fm_embed_type: ActiveValue::Set(FmEmbedType::EmbedMini),
		fm_footer_options: ActiveValue::Set(1),
		time_zone: ActiveValue::Set(None),
		blocked: ActiveValue::Set(false),
		music_bot_tracking_disabled: ActiveValue::Set(None),
		registered_last_fm: ActiveValue::Set(None),
		last_indexed: ActiveValue::Set(None),
		last_used: ActiveValue::Set(Some(Utc::now())),
	}.insert(db).await.unwrap()
}

pub async fn seed_guild(db: &DatabaseConnection, discord_guild_id: u64) -> Guild {
	guilds::ActiveModel {
		guild_id: ActiveValue::NotSet,
		discord_guild_id: ActiveValue::Set(discord_guild_id as i64),
		name: ActiveValue::Set(Some("test guild".to_string())),
		last_indexed: ActiveValue::Set(Some(Utc::now())),
		disabled_commands: ActiveValue::Set(None),
		who_knows_whitelist_role_id: ActiveValue::Set(None),
	}.insert(db).await.unwrap()
}

pub async fn seed_guild_user(db: &DatabaseConnection, guild_id: i32, user_id: i32, user_name: Option<&str>) {
	GuildUserBehavior::insert(guild_users::ActiveModel {
		guild_id: ActiveValue::Set(guild_id),
		user_id: ActiveValue::Set(user_id),
		user_name: ActiveValue::Set(user_name.map(str::to_string)),
		bot: ActiveValue::Set(false),
		who_knows_whitelisted: ActiveValue::Set(None),
	}).exec(db).await.unwrap();
}

pub async fn seed_artist(db: &DatabaseConnection, user_id: i32, name: &str, playcount: i32) {
	user_artists::ActiveModel {
		user_artist_id: ActiveValue::NotSet,
		user_id: ActiveValue::Set(user_id),
		name: ActiveValue::Set(name.to_string()),
		playcount: ActiveValue::Set(playcount),
	}.insert(db).await.unwrap();
}

pub async fn seed_album(db: &DatabaseConnection, user_id: i32, artist_name: &str, name: &str, playcount: i32) {
	user_albums::ActiveModel {
		user_album_id: ActiveValue::NotSet,
		user_id: ActiveValue::Set(user_id),
		name: ActiveValue::Set(name.to_string()),
		artist_name: ActiveValue::Set(artist_name.to_string()),
		playcount: ActiveValue::Set(playcount),
	}.insert(db).await.unwrap();
}

pub async fn seed_track(db: &DatabaseConnection, user_id: i32, artist_name: &str, name: &str, playcount: i32) {
	user_tracks::ActiveModel {
		user_track_id: ActiveValue::NotSet,
		user_id: ActiveValue::Set(user_id),
		name: ActiveValue::Set(name.to_string()),
		artist_name: ActiveValue::Set(artist_name.to_string()),
		playcount: ActiveValue::Set(playcount),
	}.insert(db).await.unwrap();
}

pub async fn seed_play(db: &DatabaseConnection, user_id: i32, artist_name: &str, track_name: &str, time_played: DateTime<Utc>, play_source: PlaySource) {
	user_plays::ActiveModel {
		user_play_id: ActiveValue::NotSet,
		user_id: ActiveValue::Set(user_id),
		track_name: ActiveValue::Set(track_name.to_string()),
		album_name: ActiveValue::Set(None),
		artist_name: ActiveValue::Set(artist_name.to_string()),
		time_played: ActiveValue::Set(time_played),
		play_source: ActiveValue::Set(play_source),
	}.insert(db).await.unwrap();
}

pub async fn seed_friend(db: &DatabaseConnection, user_id: i32, friend_user_id: i32) {
	friends::ActiveModel {
		friend_id: ActiveValue::NotSet,
		user_id: ActiveValue::Set(user_id),
		friend_user_id: ActiveValue::Set(friend_user_id),
	}.insert(db).await.unwrap();
}

pub async fn seed_featured_log(db: &DatabaseConnection, user_id: Option<i32>) -> FeaturedLog {
	featured_logs::ActiveModel {
		featured_log_id: ActiveValue::NotSet,
		user_id: ActiveValue::Set(user_id),
		description: ActiveValue::Set(Some("featured".to_string())),
		date_time: ActiveValue::Set(Utc::now()),
	}.insert(db).await.unwrap()
}
