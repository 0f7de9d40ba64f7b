use std::sync::Arc;
use chrono::{DateTime, Utc};
use log::warn;
use sea_orm::DatabaseConnection;
use serenity::async_trait;
use entity::enums::DataSource;
use crate::errors::BotResult;
use crate::lastfm::{LastfmUser, LiveHistory, RecentTrack, TimeSettings, TopKind, TopList};
use crate::tables::quaryfn;

/// A user whose history partly comes from imported plays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportUser {
	pub user_id: i32,
	pub discord_user_id: i64,
	pub user_name_last_fm: String,
	pub data_source: DataSource,
	pub last_import_play: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
	Live,
	Import,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendReason {
	NoImport,
	WindowStartsBeforeImportEnd,
	WindowStartsAfterImport,
	ImportLookupFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendChoice {
	pub backend: Backend,
	pub reason: BackendReason,
}

/// Picks the backend for a window starting at `window_start` (`None` is all time).
pub fn select_backend(import_user: Option<&ImportUser>, window_start: Option<DateTime<Utc>>) -> BackendChoice {
	let Some(import_user) = import_user else {
		return BackendChoice { backend: Backend::Live, reason: BackendReason::NoImport };
	};

	match window_start {
		Some(start) if start >= import_user.last_import_play => BackendChoice {
			backend: Backend::Live,
			reason: BackendReason::WindowStartsAfterImport,
		},
		_ => BackendChoice {
			backend: Backend::Import,
			reason: BackendReason::WindowStartsBeforeImportEnd,
		},
	}
}

/// Listening history stored from imports, merged with stored scrobbles.
#[async_trait]
pub trait ImportHistory: Send + Sync {
	async fn top(&self, import_user: &ImportUser, kind: TopKind, time: &TimeSettings, count: usize) -> BotResult<TopList>;

	/// Deduplicated import plays, optionally only those before `before`.
	async fn import_play_count(&self, import_user: &ImportUser, before: Option<DateTime<Utc>>) -> BotResult<i64>;

	async fn live_play_count_after(&self, import_user: &ImportUser, after: DateTime<Utc>) -> BotResult<i64>;
}

#[derive(Clone)]
pub struct DataSourceFactory {
	db: DatabaseConnection,
	live: Arc<dyn LiveHistory>,
	import: Arc<dyn ImportHistory>,
}

impl DataSourceFactory {
	pub fn new(db: DatabaseConnection, live: Arc<dyn LiveHistory>, import: Arc<dyn ImportHistory>) -> Self {
		Self { db, live, import }
	}

	async fn import_user(&self, user_name: &str) -> BotResult<Option<ImportUser>> {
		Ok(quaryfn::get_import_user_for_lastfm_username(&self.db, user_name).await?)
	}

	async fn resolve(&self, user_name: &str, window_start: Option<DateTime<Utc>>) -> (BackendChoice, Option<ImportUser>) {
		match self.import_user(user_name).await {
			Ok(import_user) => (select_backend(import_user.as_ref(), window_start), import_user),
			Err(error) => {
				warn!("Import lookup for {} failed, falling back to Last.fm: {:?}", user_name, error);
				(BackendChoice { backend: Backend::Live, reason: BackendReason::ImportLookupFailed }, None)
			},
		}
	}

	pub async fn choose_backend(&self, user_name: &str, window_start: Option<DateTime<Utc>>) -> BackendChoice {
		self.resolve(user_name, window_start).await.0
	}

	async fn top(&self, kind: TopKind, user_name: &str, time: &TimeSettings, count: usize, pages: usize) -> BotResult<TopList> {
		match self.resolve(user_name, time.start).await {
			(BackendChoice { backend: Backend::Import, .. }, Some(import_user)) => {
				self.import.top(&import_user, kind, time, count * pages).await
			},
			_ => Ok(self.live.top(kind, user_name, time, count, pages).await?),
		}
	}

	pub async fn top_artists(&self, user_name: &str, time: &TimeSettings, count: usize, pages: usize) -> BotResult<TopList> {
		self.top(TopKind::Artists, user_name, time, count, pages).await
	}

	pub async fn top_albums(&self, user_name: &str, time: &TimeSettings, count: usize, pages: usize) -> BotResult<TopList> {
		self.top(TopKind::Albums, user_name, time, count, pages).await
	}

	pub async fn top_tracks(&self, user_name: &str, time: &TimeSettings, count: usize, pages: usize) -> BotResult<TopList> {
		self.top(TopKind::Tracks, user_name, time, count, pages).await
	}

	pub async fn recent_tracks(&self, user_name: &str, count: usize, session_key: Option<&str>) -> BotResult<Vec<RecentTrack>> {
		Ok(self.live.recent_tracks(user_name, count, session_key).await?)
	}

	pub async fn user_exists(&self, user_name: &str) -> BotResult<bool> {
		Ok(self.live.user_exists(user_name).await?)
	}

	/// Live account info; the playcount includes imports when the user reads from them.
	pub async fn user_info(&self, user_name: &str) -> BotResult<Option<LastfmUser>> {
		let Some(mut user) = self.live.user_info(user_name).await? else {
			return Ok(None);
		};

		let import_user = match self.import_user(user_name).await {
			Ok(Some(import_user)) => import_user,
			Ok(None) => return Ok(Some(user)),
			Err(error) => {
				warn!("Import lookup for {} failed, showing Last.fm totals only: {:?}", user_name, error);
				return Ok(Some(user));
			},
		};

		match import_user.data_source {
			DataSource::ImportThenFullLastFm => {
				user.playcount += self.import.import_play_count(&import_user, user.registered).await?;
			},
			DataSource::FullImportThenLastFm => {
				let imported = self.import.import_play_count(&import_user, None).await?;
				let live_after = self.import.live_play_count_after(&import_user, import_user.last_import_play).await?;
				user.playcount = imported + live_after;
			},
			DataSource::LastFm => {},
		}

		Ok(Some(user))
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Mutex;
	use chrono::{Duration, TimeZone};
	use sea_orm::{ActiveModelTrait, ConnectionTrait, IntoActiveModel, Set};
	use entity::enums::PlaySource;
	use crate::lastfm::{LastfmError, TopEntry};
	use crate::test_support::*;
	use super::*;

	fn import_user(last_import_play: DateTime<Utc>) -> ImportUser {
		ImportUser {
			user_id: 1,
			discord_user_id: 10,
			user_name_last_fm: "someone".to_string(),
			data_source: DataSource::FullImportThenLastFm,
			last_import_play,
		}
	}

	fn list(name: &str) -> TopList {
		TopList { entries: vec![TopEntry { name: name.to_string(), artist_name: None, playcount: 1 }] }
	}

	#[derive(Default)]
	struct FakeLive {
		top_calls: Mutex<Vec<(usize, usize)>>,
		playcount: i64,
	}

	#[async_trait]
	impl LiveHistory for FakeLive {
		async fn user_info(&self, user_name: &str) -> Result<Option<LastfmUser>, LastfmError> {
			Ok(Some(LastfmUser {
				name: user_name.to_string(),
				playcount: self.playcount,
				registered: Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()),
			}))
		}

		async fn top(&self, _kind: TopKind, _user_name: &str, _time: &TimeSettings, count: usize, pages: usize) -> Result<TopList, LastfmError> {
			self.top_calls.lock().unwrap().push((count, pages));
			Ok(list("live"))
		}

		async fn recent_tracks(&self, _user_name: &str, _count: usize, _session_key: Option<&str>) -> Result<Vec<RecentTrack>, LastfmError> {
			Ok(vec![])
		}
	}

	#[derive(Default)]
	struct FakeImport {
		top_counts: Mutex<Vec<usize>>,
	}

	#[async_trait]
	impl ImportHistory for FakeImport {
		async fn top(&self, _import_user: &ImportUser, _kind: TopKind, _time: &TimeSettings, count: usize) -> BotResult<TopList> {
			self.top_counts.lock().unwrap().push(count);
			Ok(list("import"))
		}

		async fn import_play_count(&self, _import_user: &ImportUser, before: Option<DateTime<Utc>>) -> BotResult<i64> {
			Ok(if before.is_some() { 100 } else { 300 })
		}

		async fn live_play_count_after(&self, _import_user: &ImportUser, _after: DateTime<Utc>) -> BotResult<i64> {
			Ok(7)
		}
	}

	#[test]
	fn no_import_is_always_live() {
		let now = Utc::now();
		for start in [None, Some(now), Some(now - Duration::days(3650))] {
			let choice = select_backend(None, start);
			assert_eq!(choice, BackendChoice { backend: Backend::Live, reason: BackendReason::NoImport });
		}
	}

	#[test]
	fn window_start_decides_between_import_and_live() {
		let end = Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap();
		let user = import_user(end);

		assert_eq!(select_backend(Some(&user), Some(end - Duration::days(1))).backend, Backend::Import);
		assert_eq!(select_backend(Some(&user), None).backend, Backend::Import);
		assert_eq!(select_backend(Some(&user), Some(end)).reason, BackendReason::WindowStartsAfterImport);
		assert_eq!(select_backend(Some(&user), Some(end + Duration::days(1))).backend, Backend::Live);
	}

	async fn seed_import_user(db: &DatabaseConnection, last_import: DateTime<Utc>) -> entity::User {
		let user = seed_user(db, 10, "someone").await;
		let mut active = user.into_active_model();
		active.data_source = Set(DataSource::FullImportThenLastFm);
		let user = active.update(db).await.unwrap();
		seed_play(db, user.user_id, "Radiohead", "Creep", last_import, PlaySource::SpotifyImport).await;
		user
	}

	#[tokio::test]
	async fn import_backend_gets_count_times_pages() {
		let db = setup_db().await;
		let last_import = Utc::now() - Duration::days(30);
		seed_import_user(&db, last_import).await;

		let live = Arc::new(FakeLive::default());
		let import = Arc::new(FakeImport::default());
		let factory = DataSourceFactory::new(db, live.clone(), import.clone());

		let all_time = factory.top_artists("SOMEONE", &TimeSettings::all_time(), 50, 3).await.unwrap();
		let recent = TimeSettings::for_period(crate::lastfm::TimePeriod::Week, Utc::now());
		let week = factory.top_tracks("someone", &recent, 10, 2).await.unwrap();

		assert_eq!(all_time, list("import"));
		assert_eq!(week, list("live"));
		assert_eq!(*import.top_counts.lock().unwrap(), vec![150]);
		assert_eq!(*live.top_calls.lock().unwrap(), vec![(10, 2)]);
	}

	#[tokio::test]
	async fn unknown_user_reads_live() {
		let db = setup_db().await;
		let factory = DataSourceFactory::new(db, Arc::new(FakeLive::default()), Arc::new(FakeImport::default()));

		let choice = factory.choose_backend("nobody", None).await;

		assert_eq!(choice.reason, BackendReason::NoImport);
	}

	#[tokio::test]
	async fn failed_lookup_falls_back_to_live() {
		let db = setup_db().await;
		seed_import_user(&db, Utc::now()).await;
		db.execute_unprepared("DROP TABLE user_plays").await.unwrap();

		let factory = DataSourceFactory::new(db, Arc::new(FakeLive::default()), Arc::new(FakeImport::default()));
		let choice = factory.choose_backend("someone", None).await;

		assert_eq!(choice, BackendChoice { backend: Backend::Live, reason: BackendReason::ImportLookupFailed });
	}

	#[tokio::test]
	async fn user_info_merges_import_totals() {
		let db = setup_db().await;
		let user = seed_import_user(&db, Utc::now() - Duration::days(1)).await;
		let live = Arc::new(FakeLive { playcount: 1000, ..Default::default() });
		let factory = DataSourceFactory::new(db.clone(), live, Arc::new(FakeImport::default()));

		let full_import = factory.user_info("someone").await.unwrap().unwrap();
		assert_eq!(full_import.playcount, 307);

		let mut active = user.into_active_model();
		active.data_source = Set(DataSource::ImportThenFullLastFm);
		active.update(&db).await.unwrap();

		let import_then_live = factory.user_info("someone").await.unwrap().unwrap();
		assert_eq!(import_then_live.playcount, 1100);
	}

	#[tokio::test]
	async fn user_info_keeps_live_totals_when_lookup_fails() {
		let db = setup_db().await;
		seed_import_user(&db, Utc::now() - Duration::days(1)).await;
		db.execute_unprepared("DROP TABLE user_plays").await.unwrap();

		let live = Arc::new(FakeLive { playcount: 1000, ..Default::default() });
		let factory = DataSourceFactory::new(db, live, Arc::new(FakeImport::default()));

		assert_eq!(factory.user_info("someone").await.unwrap().unwrap().playcount, 1000);
	}
}
