use std::collections::{BTreeMap, HashMap, HashSet};
use chrono::{DateTime, Datelike, Utc};
use log::info;
use sea_orm::{ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait};
use serde::Deserialize;
use serenity::async_trait;
use entity::enums::{DataSource, PlaySource};
use entity::{user_plays, UserPlay, UserPlayBehavior};
use crate::data_source::{ImportHistory, ImportUser};
use crate::errors::{BotError, BotResult};
use crate::lastfm::{TimeSettings, TopEntry, TopKind, TopList};
use crate::utils::convert::plays_string;

const MIN_SPOTIFY_MS_PLAYED: i64 = 30_000;
const INSERT_CHUNK: usize = 500;

/// One entry of a Spotify extended streaming history file.
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyEntry {
	pub ts: String,
	pub ms_played: i64,
	pub master_metadata_track_name: Option<String>,
	pub master_metadata_album_artist_name: Option<String>,
	pub master_metadata_album_album_name: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportResult {
	pub imported: usize,
	pub skipped_short: usize,
	pub skipped_invalid: usize,
	pub skipped_existing: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
	pub spotify: u64,
	pub apple_music: u64,
}

impl ImportSummary {
	pub fn total(&self) -> u64 {
		self.spotify + self.apple_music
	}
}

pub fn parse_spotify_history(json: &str) -> BotResult<Vec<SpotifyEntry>> {
	serde_json::from_str(json).map_err(|e| BotError::Validation(format!("Not a Spotify streaming history file: {}", e)))
}

type DedupKey = (DateTime<Utc>, String, String);

fn dedup_key(play: &UserPlay) -> DedupKey {
	(play.time_played, play.artist_name.to_lowercase(), play.track_name.to_lowercase())
}

fn source_rank(source: PlaySource) -> u8 {
	match source {
		PlaySource::SpotifyImport => 0,
		PlaySource::AppleMusicImport => 1,
		PlaySource::LastFm => 2,
	}
}

/// Import plays in time order, one per dedup key, Spotify winning over Apple Music.
pub fn dedup_imports(mut imports: Vec<UserPlay>) -> Vec<UserPlay> {
	imports.sort_by(|a, b| a.time_played.cmp(&b.time_played).then(source_rank(a.play_source).cmp(&source_rank(b.play_source))));

	let mut seen = HashSet::new();
	imports.retain(|play| seen.insert(dedup_key(play)));
	imports
}

/// Combines live scrobbles and imports into one chronological history.
pub fn merge_timeline(mode: DataSource, plays: Vec<UserPlay>) -> Vec<UserPlay> {
	let (mut live, imports): (Vec<_>, Vec<_>) = plays.into_iter().partition(|p| p.play_source == PlaySource::LastFm);
	live.sort_by_key(|p| p.time_played);

	match mode {
		DataSource::LastFm => live,
		DataSource::ImportThenFullLastFm => {
			let first_live = live.first().map(|p| p.time_played);
			let mut merged: Vec<UserPlay> = dedup_imports(imports)
				.into_iter()
				.filter(|p| first_live.map_or(true, |first| p.time_played < first))
				.collect();
			merged.extend(live);
			merged
		},
		DataSource::FullImportThenLastFm => {
			let mut merged = dedup_imports(imports);
			let last_import = merged.last().map(|p| p.time_played);
			merged.extend(live.into_iter().filter(|p| last_import.map_or(true, |last| p.time_played > last)));
			merged
		},
	}
}

pub fn plays_per_year(plays: &[UserPlay], source: PlaySource) -> Vec<(i32, usize)> {
	let mut years = BTreeMap::new();
	for play in plays.iter().filter(|p| p.play_source == source) {
		*years.entry(play.time_played.year()).or_insert(0) += 1;
	}

	years.into_iter().collect()
}

/// Counts merged plays per entity, most played first.
pub fn aggregate_top(plays: &[UserPlay], kind: TopKind, time: &TimeSettings, count: usize) -> TopList {
	let mut counted: HashMap<(String, String), TopEntry> = HashMap::new();

	for play in plays.iter().filter(|p| time.contains(&p.time_played)) {
		let (name, artist_name) = match kind {
			TopKind::Artists => (play.artist_name.clone(), None),
			TopKind::Albums => match &play.album_name {
				Some(album) => (album.clone(), Some(play.artist_name.clone())),
				None => continue,
			},
			TopKind::Tracks => (play.track_name.clone(), Some(play.artist_name.clone())),
		};

		let key = (name.to_lowercase(), artist_name.as_deref().unwrap_or_default().to_lowercase());
		counted
			.entry(key)
			.or_insert_with(|| TopEntry { name, artist_name, playcount: 0 })
			.playcount += 1;
	}

	let mut entries: Vec<TopEntry> = counted.into_values().collect();
	entries.sort_by(|a, b| b.playcount.cmp(&a.playcount).then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase())));
	entries.truncate(count);

	TopList { entries }
}

#[derive(Clone)]
pub struct PlayService {
	db: DatabaseConnection,
}

impl PlayService {
	pub fn new(db: DatabaseConnection) -> Self {
		Self { db }
	}

	/// Chronological plays of one user. An empty `sources` slice means every source.
	pub async fn get_all_user_plays(&self, user_id: i32, sources: &[PlaySource]) -> BotResult<Vec<UserPlay>> {
		let mut query = UserPlayBehavior::find().filter(user_plays::Column::UserId.eq(user_id));
		if !sources.is_empty() {
			query = query.filter(user_plays::Column::PlaySource.is_in(sources.iter().copied()));
		}

		Ok(query
			.order_by_asc(user_plays::Column::TimePlayed)
			.order_by_asc(user_plays::Column::UserPlayId)
			.all(&self.db)
			.await?)
	}

	pub async fn imported_years_description(&self, user_id: i32, source: PlaySource) -> BotResult<Option<String>> {
		let plays = self.get_all_user_plays(user_id, &[source]).await?;
		let years = plays_per_year(&plays, source);

		if years.is_empty() {
			return Ok(None);
		}

		let mut description = String::new();
		for (year, count) in years {
			description.push_str(&format!("**`{}`** - **{}** {}\n", year, count, plays_string(count as i64)));
		}

		Ok(Some(description))
	}

	pub async fn import_summary(&self, user_id: i32) -> BotResult<ImportSummary> {
		let count = |source: PlaySource| {
			UserPlayBehavior::find()
				.filter(user_plays::Column::UserId.eq(user_id))
				.filter(user_plays::Column::PlaySource.eq(source))
				.count(&self.db)
		};

		Ok(ImportSummary {
			spotify: count(PlaySource::SpotifyImport).await?,
			apple_music: count(PlaySource::AppleMusicImport).await?,
		})
	}

	pub async fn merged_plays(&self, import_user: &ImportUser) -> BotResult<Vec<UserPlay>> {
		let plays = self.get_all_user_plays(import_user.user_id, &[]).await?;
		Ok(merge_timeline(import_user.data_source, plays))
	}

	pub async fn insert_spotify_import(&self, user_id: i32, entries: Vec<SpotifyEntry>) -> BotResult<ImportResult> {
		let mut result = ImportResult::default();

		let existing = self.get_all_user_plays(user_id, &[PlaySource::SpotifyImport, PlaySource::AppleMusicImport]).await?;
		let mut seen: HashSet<DedupKey> = existing.iter().map(dedup_key).collect();
		let mut new_plays = vec![];

		for entry in entries {
			if entry.ms_played < MIN_SPOTIFY_MS_PLAYED {
				result.skipped_short += 1;
				continue;
			}

			let (Some(track_name), Some(artist_name)) = (entry.master_metadata_track_name, entry.master_metadata_album_artist_name) else {
				result.skipped_invalid += 1;
				continue;
			};

			let Ok(time_played) = DateTime::parse_from_rfc3339(&entry.ts) else {
				result.skipped_invalid += 1;
				continue;
			};
			let time_played = time_played.with_timezone(&Utc);

			if !seen.insert((time_played, artist_name.to_lowercase(), track_name.to_lowercase())) {
				result.skipped_existing += 1;
				continue;
			}

			new_plays.push(user_plays::ActiveModel {
				user_play_id: ActiveValue::NotSet,
				user_id: ActiveValue::Set(user_id),
				track_name: ActiveValue::Set(track_name),
				album_name: ActiveValue::Set(entry.master_metadata_album_album_name),
				artist_name: ActiveValue::Set(artist_name),
				time_played: ActiveValue::Set(time_played),
				play_source: ActiveValue::Set(PlaySource::SpotifyImport),
			});
		}

		result.imported = new_plays.len();

		let txn = self.db.begin().await?;
		for chunk in new_plays.chunks(INSERT_CHUNK) {
			UserPlayBehavior::insert_many(chunk.to_vec()).exec(&txn).await?;
		}
		txn.commit().await?;

		info!("Imported {} Spotify plays for user {} ({:?})", result.imported, user_id, result);
		Ok(result)
	}

	pub async fn delete_imported_plays(&self, user_id: i32, source: PlaySource) -> BotResult<u64> {
		if !source.is_import() {
			return Err(BotError::Validation("Only imported plays can be deleted".to_string()));
		}

		let deleted = UserPlayBehavior::delete_many()
			.filter(user_plays::Column::UserId.eq(user_id))
			.filter(user_plays::Column::PlaySource.eq(source))
			.exec(&self.db)
			.await?;

		Ok(deleted.rows_affected)
	}
}

#[async_trait]
impl ImportHistory for PlayService {
	async fn top(&self, import_user: &ImportUser, kind: TopKind, time: &TimeSettings, count: usize) -> BotResult<TopList> {
		let plays = self.merged_plays(import_user).await?;
		Ok(aggregate_top(&plays, kind, time, count))
	}

	async fn import_play_count(&self, import_user: &ImportUser, before: Option<DateTime<Utc>>) -> BotResult<i64> {
		let imports = self.get_all_user_plays(import_user.user_id, &[PlaySource::SpotifyImport, PlaySource::AppleMusicImport]).await?;
		let count = dedup_imports(imports)
			.iter()
			.filter(|p| before.map_or(true, |b| p.time_played < b))
			.count();

		Ok(count as i64)
	}

	async fn live_play_count_after(&self, import_user: &ImportUser, after: DateTime<Utc>) -> BotResult<i64> {
		let count = UserPlayBehavior::find()
			.filter(user_plays::Column::UserId.eq(import_user.user_id))
			.filter(user_plays::Column::PlaySource.eq(PlaySource::LastFm))
			.filter(user_plays::Column::TimePlayed.gt(after))
			.count(&self.db)
			.await?;

		Ok(count as i64)
	}
}

#[cfg(test)]
mod tests {
	use chrono::{Duration, TimeZone};
	use crate::test_support::*;
	use super::*;

	fn at(day: u32, hour: u32) -> DateTime<Utc> {
		Utc.with_ymd_and_hms(2023, 3, day, hour, 0, 0).unwrap()
	}

	fn play(id: i32, artist: &str, track: &str, time: DateTime<Utc>, source: PlaySource) -> UserPlay {
		UserPlay {
			user_play_id: id,
			user_id: 1,
			track_name: track.to_string(),
			album_name: Some(format!("{} album", artist)),
			artist_name: artist.to_string(),
			time_played: time,
			play_source: source,
		}
	}

	fn ids(plays: &[UserPlay]) -> Vec<i32> {
		plays.iter().map(|p| p.user_play_id).collect()
	}

	fn sample() -> Vec<UserPlay> {
		vec![
			play(1, "Radiohead", "Creep", at(1, 10), PlaySource::SpotifyImport),
			play(2, "radiohead", "CREEP", at(1, 10), PlaySource::AppleMusicImport),
			play(3, "Low", "Words", at(2, 10), PlaySource::AppleMusicImport),
			play(4, "Low", "Words", at(3, 10), PlaySource::LastFm),
			play(5, "Low", "Lazy", at(4, 10), PlaySource::SpotifyImport),
			play(6, "Low", "Lazy", at(5, 10), PlaySource::LastFm),
		]
	}

	#[test]
	fn lastfm_mode_keeps_only_live() {
		assert_eq!(ids(&merge_timeline(DataSource::LastFm, sample())), vec![4, 6]);
	}

	#[test]
	fn import_then_live_cuts_at_first_scrobble() {
		assert_eq!(ids(&merge_timeline(DataSource::ImportThenFullLastFm, sample())), vec![1, 3, 4, 6]);
	}

	#[test]
	fn full_import_then_live_cuts_at_last_import() {
		assert_eq!(ids(&merge_timeline(DataSource::FullImportThenLastFm, sample())), vec![1, 3, 5, 6]);
	}

	#[test]
	fn duplicate_imports_prefer_spotify() {
		let plays = vec![
			play(2, "radiohead", "creep", at(1, 10), PlaySource::AppleMusicImport),
			play(1, "Radiohead", "Creep", at(1, 10), PlaySource::SpotifyImport),
		];

		let deduped = dedup_imports(plays);

		assert_eq!(deduped.len(), 1);
		assert_eq!(deduped[0].play_source, PlaySource::SpotifyImport);
	}

	#[test]
	fn plays_are_bucketed_by_year() {
		let mut plays = sample();
		plays.push(play(7, "Low", "Words", Utc.with_ymd_and_hms(2021, 5, 1, 0, 0, 0).unwrap(), PlaySource::SpotifyImport));

		assert_eq!(plays_per_year(&plays, PlaySource::SpotifyImport), vec![(2021, 1), (2023, 2)]);
		assert_eq!(plays_per_year(&plays, PlaySource::LastFm), vec![(2023, 2)]);
		assert!(plays_per_year(&[], PlaySource::AppleMusicImport).is_empty());
	}

	#[test]
	fn top_lists_group_case_insensitively() {
		let plays = merge_timeline(DataSource::FullImportThenLastFm, sample());

		let artists = aggregate_top(&plays, TopKind::Artists, &TimeSettings::all_time(), 10);
		let names: Vec<(&str, i64)> = artists.entries.iter().map(|e| (e.name.as_str(), e.playcount)).collect();
		assert_eq!(names, vec![("Low", 3), ("Radiohead", 1)]);

		let window = TimeSettings::custom(at(3, 0), at(6, 0));
		let tracks = aggregate_top(&plays, TopKind::Tracks, &window, 1);
		assert_eq!(tracks.entries.len(), 1);
		assert_eq!(tracks.entries[0].name, "Lazy");
		assert_eq!(tracks.entries[0].playcount, 2);
	}

	#[test]
	fn spotify_history_parses() {
		let json = r#"[
			{"ts": "2023-03-01T10:00:00Z", "ms_played": 200000, "master_metadata_track_name": "Creep",
			 "master_metadata_album_artist_name": "Radiohead", "master_metadata_album_album_name": "Pablo Honey",
			 "spotify_track_uri": "spotify:track:1"},
			{"ts": "2023-03-01T11:00:00Z", "ms_played": 5000, "master_metadata_track_name": null,
			 "master_metadata_album_artist_name": null, "master_metadata_album_album_name": null}
		]"#;

		let entries = parse_spotify_history(json).unwrap();

		assert_eq!(entries.len(), 2);
		assert_eq!(entries[0].master_metadata_track_name.as_deref(), Some("Creep"));
		assert!(matches!(parse_spotify_history("{}"), Err(BotError::Validation(_))));
	}

	fn entry(ts: &str, ms_played: i64, track: Option<&str>) -> SpotifyEntry {
		SpotifyEntry {
			ts: ts.to_string(),
			ms_played,
			master_metadata_track_name: track.map(str::to_string),
			master_metadata_album_artist_name: Some("Radiohead".to_string()),
			master_metadata_album_album_name: Some("OK Computer".to_string()),
		}
	}

	#[tokio::test]
	async fn spotify_import_skips_short_invalid_and_existing() {
		let db = setup_db().await;
		let user = seed_user(&db, 1, "someone").await;
		let service = PlayService::new(db);

		let first = service.insert_spotify_import(user.user_id, vec![
			entry("2023-03-01T10:00:00Z", 240000, Some("Airbag")),
			entry("2023-03-01T10:05:00Z", 1000, Some("Paranoid Android")),
			entry("2023-03-01T10:10:00Z", 240000, None),
			entry("not a date", 240000, Some("Lucky")),
		]).await.unwrap();
		let second = service.insert_spotify_import(user.user_id, vec![
			entry("2023-03-01T10:00:00Z", 240000, Some("airbag")),
			entry("2023-03-02T10:00:00Z", 240000, Some("Let Down")),
		]).await.unwrap();

		assert_eq!(first, ImportResult { imported: 1, skipped_short: 1, skipped_invalid: 2, skipped_existing: 0 });
		assert_eq!(second, ImportResult { imported: 1, skipped_short: 0, skipped_invalid: 0, skipped_existing: 1 });
		assert_eq!(service.import_summary(user.user_id).await.unwrap(), ImportSummary { spotify: 2, apple_music: 0 });
	}

	#[tokio::test]
	async fn years_description_and_deletion() {
		let db = setup_db().await;
		let user = seed_user(&db, 1, "someone").await;
		seed_play(&db, user.user_id, "Low", "Words", Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap(), PlaySource::SpotifyImport).await;
		seed_play(&db, user.user_id, "Low", "Lazy", Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(), PlaySource::SpotifyImport).await;
		seed_play(&db, user.user_id, "Low", "Lullaby", Utc.with_ymd_and_hms(2020, 2, 1, 0, 0, 0).unwrap(), PlaySource::SpotifyImport).await;
		seed_play(&db, user.user_id, "Low", "Words", Utc::now() - Duration::days(1), PlaySource::LastFm).await;
		let service = PlayService::new(db);

		let description = service.imported_years_description(user.user_id, PlaySource::SpotifyImport).await.unwrap();
		assert_eq!(description.as_deref(), Some("**`2019`** - **1** play\n**`2020`** - **2** plays\n"));
		assert_eq!(service.imported_years_description(user.user_id, PlaySource::AppleMusicImport).await.unwrap(), None);

		assert_eq!(service.delete_imported_plays(user.user_id, PlaySource::SpotifyImport).await.unwrap(), 3);
		assert!(service.delete_imported_plays(user.user_id, PlaySource::LastFm).await.is_err());
		assert_eq!(service.get_all_user_plays(user.user_id, &[]).await.unwrap().len(), 1);
	}

	#[tokio::test]
	async fn import_counts_for_user_info() {
		let db = setup_db().await;
		let user = seed_user(&db, 1, "someone").await;
		seed_play(&db, user.user_id, "Low", "Words", at(1, 10), PlaySource::SpotifyImport).await;
		seed_play(&db, user.user_id, "low", "words", at(1, 10), PlaySource::AppleMusicImport).await;
		seed_play(&db, user.user_id, "Low", "Lazy", at(4, 10), PlaySource::SpotifyImport).await;
		seed_play(&db, user.user_id, "Low", "Lazy", at(5, 10), PlaySource::LastFm).await;
		seed_play(&db, user.user_id, "Low", "Lazy", at(3, 10), PlaySource::LastFm).await;

		let import_user = ImportUser {
			user_id: user.user_id,
			discord_user_id: user.discord_user_id,
			user_name_last_fm: user.user_name_last_fm.clone(),
			data_source: DataSource::FullImportThenLastFm,
			last_import_play: at(4, 10),
		};
		let service = PlayService::new(db);

		assert_eq!(service.import_play_count(&import_user, None).await.unwrap(), 2);
		assert_eq!(service.import_play_count(&import_user, Some(at(2, 0))).await.unwrap(), 1);
		assert_eq!(service.live_play_count_after(&import_user, at(4, 10)).await.unwrap(), 1);

		let top = ImportHistory::top(&service, &import_user, TopKind::Tracks, &TimeSettings::all_time(), 5).await.unwrap();
		assert_eq!(top.entries[0].name, "Lazy");
		assert_eq!(top.entries[0].playcount, 2);
	}
}
