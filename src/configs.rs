use serde::{Serialize, Deserialize};

const DEFAULT_LASTFM_API_URL: &str = "https://ws.audioscrobbler.com/2.0/";

#[derive(Clone, Serialize, Deserialize)]
pub struct ConfigData {
	token: String,
	db_url: String,

	lastfm_api_key: String,
	#[serde(default = "default_lastfm_api_url")]
	lastfm_api_url: String,

	#[serde(default = "default_log_level")]
	log_level: String,
	#[serde(default)]
	log_file: Option<String>,

	#[serde(default = "default_user_cache_ttl_secs")]
	user_cache_ttl_secs: u64,
	#[serde(default = "default_user_cache_capacity")]
	user_cache_capacity: usize,

	#[serde(default = "default_interaction_ttl_secs")]
	interaction_ttl_secs: u64,
	#[serde(default = "default_interaction_capacity")]
	interaction_capacity: usize,
	#[serde(default = "default_interaction_wait_secs")]
	interaction_wait_secs: u64,

	#[serde(default = "default_who_knows_resolve_limit")]
	who_knows_resolve_limit: usize,
}

fn default_lastfm_api_url() -> String {
	DEFAULT_LASTFM_API_URL.to_string()
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_user_cache_ttl_secs() -> u64 {
	5
}

fn default_user_cache_capacity() -> usize {
	10_000
}

fn default_interaction_ttl_secs() -> u64 {
	60 * 10
}

fn default_interaction_capacity() -> usize {
	5_000
}

fn default_interaction_wait_secs() -> u64 {
	12
}

fn default_who_knows_resolve_limit() -> usize {
	15
}

impl ConfigData {
	pub fn get_token(&self) -> &str {
		&self.token
	}

	pub fn get_db_url(&self) -> &str {
		&self.db_url
	}

	pub fn get_lastfm_api_key(&self) -> &str {
		&self.lastfm_api_key
	}

	pub fn get_lastfm_api_url(&self) -> &str {
		&self.lastfm_api_url
	}

	pub fn get_log_level(&self) -> log::LevelFilter {
		self.log_level.parse().unwrap_or(log::LevelFilter::Info)
	}

	pub fn get_log_file(&self) -> Option<&str> {
		self.log_file.as_deref()
	}

	pub fn get_user_cache_ttl(&self) -> std::time::Duration {
		std::time::Duration::from_secs(self.user_cache_ttl_secs)
	}

	pub fn get_user_cache_capacity(&self) -> usize {
		self.user_cache_capacity
	}

	pub fn get_interaction_ttl(&self) -> std::time::Duration {
		std::time::Duration::from_secs(self.interaction_ttl_secs)
	}

	pub fn get_interaction_capacity(&self) -> usize {
		self.interaction_capacity
	}

	pub fn get_interaction_wait(&self) -> std::time::Duration {
		std::time::Duration::from_secs(self.interaction_wait_secs)
	}

	pub fn get_who_knows_resolve_limit(&self) -> usize {
		self.who_knows_resolve_limit
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn missing_optional_keys_take_defaults() {
		let yaml = "token: abc\ndb_url: \"sqlite::memory:\"\nlastfm_api_key: key\n";
		let config = serde_yaml::from_str::<ConfigData>(yaml).unwrap();

		assert_eq!(config.get_token(), "abc");
		assert_eq!(config.get_db_url(), "sqlite::memory:");
		assert_eq!(config.get_lastfm_api_url(), DEFAULT_LASTFM_API_URL);
		assert_eq!(config.get_log_level(), log::LevelFilter::Info);
		assert_eq!(config.get_user_cache_ttl(), std::time::Duration::from_secs(5));
		assert_eq!(config.get_who_knows_resolve_limit(), 15);
		assert!(config.get_log_file().is_none());
	}

	#[test]
	fn explicit_values_override_defaults() {
		let yaml = "token: abc\ndb_url: x\nlastfm_api_key: key\nlog_level: debug\nuser_cache_ttl_secs: 30\nwho_knows_resolve_limit: 3\n";
		let config = serde_yaml::from_str::<ConfigData>(yaml).unwrap();

		assert_eq!(config.get_log_level(), log::LevelFilter::Debug);
		assert_eq!(config.get_user_cache_ttl(), std::time::Duration::from_secs(30));
		assert_eq!(config.get_who_knows_resolve_limit(), 3);
	}

	#[test]
	fn missing_token_is_rejected() {
		let yaml = "db_url: x\nlastfm_api_key: key\n";
		assert!(serde_yaml::from_str::<ConfigData>(yaml).is_err());
	}
}
