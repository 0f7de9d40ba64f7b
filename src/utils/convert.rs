use chrono::{DateTime, Utc};
use serenity::all::User;

/// Discord snowflakes are stored bit cast into signed BIGINT columns.
pub fn discord_id_to_db(id: u64) -> i64 {
	id as i64
}

pub fn db_to_discord_id(id: i64) -> u64 {
	id as u64
}

pub fn format_discord_username(user: &User) -> String {
	format!(
		"{}{}",
		user.name,
		match user.discriminator {
			None => String::new(),
			Some(n) => format!("#{:04}", n),
		}
	)
}

/// `<t:..:R>` style markdown that Discord renders in the reader's locale.
pub fn discord_relative_time(time: &DateTime<Utc>) -> String {
	format!("<t:{}:R>", time.timestamp())
}

pub fn plays_string(count: i64) -> &'static str {
	if count == 1 { "play" } else { "plays" }
}

pub fn parse_command_list(value: Option<&str>) -> Vec<String> {
	value
		.map(|v| {
			v.split(',')
				.map(|s| s.trim().to_lowercase())
				.filter(|s| !s.is_empty())
				.collect()
		})
		.unwrap_or_default()
}

pub fn join_command_list(commands: &[String]) -> Option<String> {
	if commands.is_empty() {
		None
	}
	else {
		Some(commands.join(","))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn snowflakes_survive_signed_storage() {
		let id = u64::MAX - 42;
		assert_eq!(db_to_discord_id(discord_id_to_db(id)), id);
		assert_eq!(discord_id_to_db(1234), 1234);
	}

	#[test]
	fn command_lists_are_normalized() {
		assert_eq!(parse_command_list(Some(" WhoKnows,np,,")), vec!["whoknows".to_string(), "np".to_string()]);
		assert!(parse_command_list(None).is_empty());
		assert_eq!(join_command_list(&["np".to_string(), "servertop".to_string()]).as_deref(), Some("np,servertop"));
		assert_eq!(join_command_list(&[]), None);
	}

	#[test]
	fn plays_string_is_singular_for_one() {
		assert_eq!(plays_string(1), "play");
		assert_eq!(plays_string(0), "plays");
		assert_eq!(plays_string(12), "plays");
	}
}
