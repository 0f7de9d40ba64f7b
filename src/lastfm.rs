use std::time::Duration;
use chrono::{DateTime, TimeZone, Utc};
use log::debug;
use serde::Deserialize;
use serenity::async_trait;
use thiserror::Error;

const USER_AGENT: &str = concat!("fmcord/", env!("CARGO_PKG_VERSION"));
const ERROR_INVALID_PARAMETERS: i64 = 6;

#[derive(Debug, Error)]
pub enum LastfmError {
	#[error("Network error: {0}")]
	Network(#[from] reqwest::Error),

	#[error("API error {code}: {message}")]
	Api { code: i64, message: String },

	#[error("Parse error: {0}")]
	Parse(#[from] serde_json::Error),
}

impl LastfmError {
	/// Last.fm answers unknown users with "invalid parameters".
	pub fn is_not_found(&self) -> bool {
		matches!(self, LastfmError::Api { code: ERROR_INVALID_PARAMETERS, .. })
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimePeriod {
	Overall,
	Week,
	Month,
	Quarter,
	Half,
	Year,
	Custom,
}

impl TimePeriod {
	fn api_value(&self) -> &'static str {
		match self {
			TimePeriod::Overall | TimePeriod::Custom => "overall",
			TimePeriod::Week => "7day",
			TimePeriod::Month => "1month",
			TimePeriod::Quarter => "3month",
			TimePeriod::Half => "6month",
			TimePeriod::Year => "12month",
		}
	}

	fn days(&self) -> Option<i64> {
		match self {
			TimePeriod::Week => Some(7),
			TimePeriod::Month => Some(30),
			TimePeriod::Quarter => Some(90),
			TimePeriod::Half => Some(180),
			TimePeriod::Year => Some(365),
			TimePeriod::Overall | TimePeriod::Custom => None,
		}
	}
}

/// Window a top list covers. `start == None` means all time.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSettings {
	pub period: TimePeriod,
	pub start: Option<DateTime<Utc>>,
	pub end: Option<DateTime<Utc>>,
}

impl TimeSettings {
	pub fn all_time() -> Self {
		Self { period: TimePeriod::Overall, start: None, end: None }
	}

	pub fn for_period(period: TimePeriod, now: DateTime<Utc>) -> Self {
		Self {
			period,
			start: period.days().map(|d| now - chrono::Duration::days(d)),
			end: period.days().map(|_| now),
		}
	}

	pub fn custom(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
		Self { period: TimePeriod::Custom, start: Some(start), end: Some(end) }
	}

	pub fn contains(&self, time: &DateTime<Utc>) -> bool {
		self.start.map_or(true, |s| *time >= s) && self.end.map_or(true, |e| *time <= e)
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopEntry {
	pub name: String,
	pub artist_name: Option<String>,
	pub playcount: i64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TopList {
	pub entries: Vec<TopEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecentTrack {
	pub artist_name: String,
	pub album_name: Option<String>,
	pub track_name: String,
	pub played_at: Option<DateTime<Utc>>,
	pub now_playing: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LastfmUser {
	pub name: String,
	pub playcount: i64,
	pub registered: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopKind {
	Artists,
	Albums,
	Tracks,
}

/// The live listening history behind a Last.fm account.
#[async_trait]
pub trait LiveHistory: Send + Sync {
	async fn user_info(&self, user_name: &str) -> Result<Option<LastfmUser>, LastfmError>;

	async fn user_exists(&self, user_name: &str) -> Result<bool, LastfmError> {
		Ok(self.user_info(user_name).await?.is_some())
	}

	async fn top(&self, kind: TopKind, user_name: &str, time: &TimeSettings, count: usize, pages: usize) -> Result<TopList, LastfmError>;

	async fn recent_tracks(&self, user_name: &str, count: usize, session_key: Option<&str>) -> Result<Vec<RecentTrack>, LastfmError>;
}

pub struct LastfmClient {
	http_client: reqwest::Client,
	api_url: String,
	api_key: String,
}

#[derive(Deserialize)]
struct ApiError {
	error: i64,
	message: String,
}

#[derive(Deserialize)]
struct NameRef {
	#[serde(alias = "#text")]
	name: String,
}

#[derive(Deserialize)]
struct ApiTopItem {
	name: String,
	playcount: String,
	#[serde(default)]
	artist: Option<NameRef>,
}

#[derive(Deserialize)]
struct ApiTopArtists {
	#[serde(default)]
	artist: Vec<ApiTopItem>,
}

#[derive(Deserialize)]
struct ApiTopAlbums {
	#[serde(default)]
	album: Vec<ApiTopItem>,
}

#[derive(Deserialize)]
struct ApiTopTracks {
	#[serde(default)]
	track: Vec<ApiTopItem>,
}

#[derive(Deserialize)]
struct ApiDate {
	uts: String,
}

#[derive(Deserialize)]
struct ApiNowPlaying {
	nowplaying: String,
}

#[derive(Deserialize)]
struct ApiRecentTrack {
	name: String,
	artist: NameRef,
	#[serde(default)]
	album: Option<NameRef>,
	#[serde(default)]
	date: Option<ApiDate>,
	#[serde(rename = "@attr", default)]
	attr: Option<ApiNowPlaying>,
}

#[derive(Deserialize)]
struct ApiRecentTracks {
	#[serde(default)]
	track: Vec<ApiRecentTrack>,
}

#[derive(Deserialize)]
struct ApiRegistered {
	unixtime: String,
}

#[derive(Deserialize)]
struct ApiUser {
	name: String,
	playcount: String,
	#[serde(default)]
	registered: Option<ApiRegistered>,
}

fn parse_count(value: &str) -> i64 {
	value.parse().unwrap_or(0)
}

fn parse_unix(value: &str) -> Option<DateTime<Utc>> {
	value.parse::<i64>().ok().and_then(|ts| Utc.timestamp_opt(ts, 0).single())
}

fn to_top_list(items: Vec<ApiTopItem>) -> TopList {
	TopList {
		entries: items
			.into_iter()
			.map(|item| TopEntry {
				name: item.name,
				artist_name: item.artist.map(|a| a.name),
				playcount: parse_count(&item.playcount),
			})
			.collect(),
	}
}

/// Pulls the body under `key` out of a Last.fm response, or the API error it carries.
fn extract<T: serde::de::DeserializeOwned>(body: &str, key: &str) -> Result<T, LastfmError> {
	let value: serde_json::Value = serde_json::from_str(body)?;

	if let Ok(error) = serde_json::from_value::<ApiError>(value.clone()) {
		return Err(LastfmError::Api { code: error.error, message: error.message });
	}

	Ok(serde_json::from_value(value.get(key).cloned().unwrap_or(serde_json::Value::Null))?)
}

fn parse_top(kind: TopKind, custom: bool, body: &str) -> Result<TopList, LastfmError> {
	let items = match (kind, custom) {
		(TopKind::Artists, false) => extract::<ApiTopArtists>(body, "topartists")?.artist,
		(TopKind::Artists, true) => extract::<ApiTopArtists>(body, "weeklyartistchart")?.artist,
		(TopKind::Albums, false) => extract::<ApiTopAlbums>(body, "topalbums")?.album,
		(TopKind::Albums, true) => extract::<ApiTopAlbums>(body, "weeklyalbumchart")?.album,
		(TopKind::Tracks, false) => extract::<ApiTopTracks>(body, "toptracks")?.track,
		(TopKind::Tracks, true) => extract::<ApiTopTracks>(body, "weeklytrackchart")?.track,
	};

	Ok(to_top_list(items))
}

fn parse_recent_tracks(body: &str) -> Result<Vec<RecentTrack>, LastfmError> {
	let tracks = extract::<ApiRecentTracks>(body, "recenttracks")?.track;

	Ok(tracks
		.into_iter()
		.map(|t| RecentTrack {
			artist_name: t.artist.name,
			album_name: t.album.map(|a| a.name).filter(|a| !a.is_empty()),
			track_name: t.name,
			played_at: t.date.and_then(|d| parse_unix(&d.uts)),
			now_playing: t.attr.map_or(false, |a| a.nowplaying == "true"),
		})
		.collect())
}

fn parse_user(body: &str) -> Result<LastfmUser, LastfmError> {
	let user = extract::<ApiUser>(body, "user")?;

	Ok(LastfmUser {
		name: user.name,
		playcount: parse_count(&user.playcount),
		registered: user.registered.and_then(|r| parse_unix(&r.unixtime)),
	})
}

impl LastfmClient {
	pub fn new(api_url: &str, api_key: &str) -> Result<Self, LastfmError> {
		let http_client = reqwest::Client::builder()
			.user_agent(USER_AGENT)
			.timeout(Duration::from_secs(20))
			.build()?;

		Ok(Self {
			http_client,
			api_url: api_url.to_string(),
			api_key: api_key.to_string(),
		})
	}

	async fn call(&self, method: &str, params: &[(&str, String)]) -> Result<String, LastfmError> {
		debug!("Last.fm call: {}", method);

		let mut query: Vec<(&str, String)> = vec![
			("method", method.to_string()),
			("api_key", self.api_key.clone()),
			("format", "json".to_string()),
		];
		query.extend(params.iter().cloned());

		let response = self.http_client
			.get(&self.api_url)
			.query(&query)
			.send()
			.await?;

		// Error bodies carry the API error code, so they are parsed like any other body.
		Ok(response.text().await?)
	}
}

#[async_trait]
impl LiveHistory for LastfmClient {
	async fn user_info(&self, user_name: &str) -> Result<Option<LastfmUser>, LastfmError> {
		let body = self.call("user.getinfo", &[("user", user_name.to_string())]).await?;

		match parse_user(&body) {
			Ok(user) => Ok(Some(user)),
			Err(error) if error.is_not_found() => Ok(None),
			Err(error) => Err(error),
		}
	}

	async fn top(&self, kind: TopKind, user_name: &str, time: &TimeSettings, count: usize, pages: usize) -> Result<TopList, LastfmError> {
		if let (TimePeriod::Custom, Some(start), Some(end)) = (time.period, time.start, time.end) {
			let method = match kind {
				TopKind::Artists => "user.getweeklyartistchart",
				TopKind::Albums => "user.getweeklyalbumchart",
				TopKind::Tracks => "user.getweeklytrackchart",
			};
			let body = self.call(method, &[
				("user", user_name.to_string()),
				("from", start.timestamp().to_string()),
				("to", end.timestamp().to_string()),
			]).await?;

			let mut list = parse_top(kind, true, &body)?;
			list.entries.truncate(count);
			return Ok(list);
		}

		let method = match kind {
			TopKind::Artists => "user.gettopartists",
			TopKind::Albums => "user.gettopalbums",
			TopKind::Tracks => "user.gettoptracks",
		};

		let mut list = TopList::default();
		for page in 1..=pages.max(1) {
			let body = self.call(method, &[
				("user", user_name.to_string()),
				("period", time.period.api_value().to_string()),
				("limit", count.to_string()),
				("page", page.to_string()),
			]).await?;

			let page_list = parse_top(kind, false, &body)?;
			let last_page = page_list.entries.len() < count;
			list.entries.extend(page_list.entries);
			if last_page {
				break;
			}
		}

		Ok(list)
	}

	async fn recent_tracks(&self, user_name: &str, count: usize, session_key: Option<&str>) -> Result<Vec<RecentTrack>, LastfmError> {
		let mut params = vec![
			("user", user_name.to_string()),
			("limit", count.to_string()),
			("extended", "0".to_string()),
		];
		if let Some(session_key) = session_key {
			params.push(("sk", session_key.to_string()));
		}

		let body = self.call("user.getrecenttracks", &params).await?;
		parse_recent_tracks(&body)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_top_artists() {
		let body = r#"{"topartists":{"artist":[{"name":"Radiohead","playcount":"120"},{"name":"Björk","playcount":"7"}],"@attr":{"page":"1"}}}"#;
		let list = parse_top(TopKind::Artists, false, body).unwrap();

		assert_eq!(list.entries.len(), 2);
		assert_eq!(list.entries[0].name, "Radiohead");
		assert_eq!(list.entries[0].playcount, 120);
		assert_eq!(list.entries[1].artist_name, None);
	}

	#[test]
	fn parses_albums_with_either_artist_shape() {
		let top = r#"{"topalbums":{"album":[{"name":"OK Computer","playcount":"50","artist":{"name":"Radiohead"}}]}}"#;
		let weekly = r##"{"weeklyalbumchart":{"album":[{"name":"Kid A","playcount":"3","artist":{"#text":"Radiohead"}}]}}"##;

		let top = parse_top(TopKind::Albums, false, top).unwrap();
		let weekly = parse_top(TopKind::Albums, true, weekly).unwrap();

		assert_eq!(top.entries[0].artist_name.as_deref(), Some("Radiohead"));
		assert_eq!(weekly.entries[0].artist_name.as_deref(), Some("Radiohead"));
		assert_eq!(weekly.entries[0].playcount, 3);
	}

	#[test]
	fn parses_recent_tracks_with_now_playing() {
		let body = r##"{"recenttracks":{"track":[
			{"name":"Airbag","artist":{"#text":"Radiohead"},"album":{"#text":"OK Computer"},"@attr":{"nowplaying":"true"}},
			{"name":"Lucky","artist":{"#text":"Radiohead"},"album":{"#text":""},"date":{"uts":"1700000000"}}
		]}}"##;
		let tracks = parse_recent_tracks(body).unwrap();

		assert!(tracks[0].now_playing);
		assert_eq!(tracks[0].played_at, None);
		assert_eq!(tracks[1].album_name, None);
		assert_eq!(tracks[1].played_at.map(|t| t.timestamp()), Some(1_700_000_000));
	}

	#[test]
	fn parses_user_info() {
		let body = r##"{"user":{"name":"frikandel_","playcount":"4567","registered":{"unixtime":"1400000000","#text":1400000000}}}"##;
		let user = parse_user(body).unwrap();

		assert_eq!(user.name, "frikandel_");
		assert_eq!(user.playcount, 4567);
		assert_eq!(user.registered.map(|t| t.timestamp()), Some(1_400_000_000));
	}

	#[test]
	fn api_errors_are_surfaced() {
		let body = r#"{"error":6,"message":"User not found"}"#;
		let error = parse_user(body).unwrap_err();

		assert!(error.is_not_found());
		assert!(matches!(parse_top(TopKind::Tracks, false, r#"{"error":29,"message":"Rate limit"}"#), Err(LastfmError::Api { code: 29, .. })));
	}

	#[test]
	fn period_windows() {
		let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
		let week = TimeSettings::for_period(TimePeriod::Week, now);

		assert_eq!(week.start, Some(now - chrono::Duration::days(7)));
		assert!(week.contains(&(now - chrono::Duration::days(1))));
		assert!(!week.contains(&(now - chrono::Duration::days(8))));
		assert_eq!(TimeSettings::for_period(TimePeriod::Overall, now).start, None);
		assert!(TimeSettings::all_time().contains(&now));
	}
}
