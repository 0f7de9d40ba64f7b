use chrono::{DateTime, Duration, Utc};
use entity::enums::CommandResponse;
use entity::User;
use crate::command_define::CommandRequirements;

pub const INDEX_OUTDATED_DAYS: i64 = 120;

pub struct GuardInput<'a> {
	pub requirements: CommandRequirements,
	/// Root level name, compared against the disabled lists.
	pub command_name: &'a str,
	pub user: Option<&'a User>,
	pub in_guild: bool,
	pub guild_disabled: &'a [String],
	pub channel_disabled: &'a [String],
	pub has_manage_guild: bool,
	pub guild_last_indexed: Option<DateTime<Utc>>,
	pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
	pub response: CommandResponse,
	pub message: String,
}

impl Rejection {
	fn new(response: CommandResponse, message: &str) -> Self {
		Self { response, message: message.to_string() }
	}
}

fn listed(list: &[String], command_name: &str) -> bool {
	list.iter().any(|c| c.eq_ignore_ascii_case(command_name))
}

/// First failing check wins.
pub fn check(input: &GuardInput) -> Result<(), Rejection> {
	let req = &input.requirements;

	if input.user.map_or(false, |u| u.blocked) {
		return Err(Rejection::new(CommandResponse::UserBlocked, "You have been blocked from using this bot."));
	}
	if listed(input.guild_disabled, input.command_name) {
		return Err(Rejection::new(CommandResponse::Disabled, "This command has been disabled in this server."));
	}
	if listed(input.channel_disabled, input.command_name) {
		return Err(Rejection::new(CommandResponse::Disabled, "This command has been disabled in this channel."));
	}
	if req.username_required && input.user.is_none() {
		return Err(Rejection::new(
			CommandResponse::UsernameNotSet,
			"You haven't connected your Last.fm account yet. Use `/fm login` to get started.",
		));
	}
	if req.session_required && input.user.map_or(true, |u| u.session_key_last_fm.is_none()) {
		return Err(Rejection::new(
			CommandResponse::SessionRequired,
			"This command needs an authorized Last.fm session. Use `/fm login` to authorize the bot.",
		));
	}
	if req.guild_only && !input.in_guild {
		return Err(Rejection::new(CommandResponse::NotSupportedInDm, "This command is not supported in DMs."));
	}
	if req.manage_guild && input.in_guild && !input.has_manage_guild {
		return Err(Rejection::new(
			CommandResponse::NoPermission,
			"You need the `Manage Server` permission to use this command.",
		));
	}
	if req.requires_index && input.in_guild {
		match input.guild_last_indexed {
			None => {
				return Err(Rejection::new(
					CommandResponse::IndexRequired,
					"This server hasn't been indexed yet. Run `/fm index` to store its members.",
				));
			},
			Some(indexed) if indexed < input.now - Duration::days(INDEX_OUTDATED_DAYS) => {
				return Err(Rejection::new(
					CommandResponse::IndexRequired,
					"This server hasn't been indexed in a while. Run `/fm index` to update its members.",
				));
			},
			Some(_) => {},
		}
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use chrono::TimeZone;
	use entity::enums::{DataSource, FmEmbedType, PrivacyLevel, UserType};
	use super::*;

	fn user() -> User {
		User {
			user_id: 1,
			discord_user_id: 10,
			user_name_last_fm: "lowfan".to_string(),
			session_key_last_fm: None,
			user_type: UserType::User,
			data_source: DataSource::LastFm,
			privacy_level: PrivacyLevel::Server,
			fm_embed_type: FmEmbedType::EmbedMini,
			fm_footer_options: 1,
			time_zone: None,
			blocked: false,
			music_bot_tracking_disabled: None,
			registered_last_fm: None,
			last_indexed: None,
			last_used: None,
		}
	}

	fn now() -> DateTime<Utc> {
		Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
	}

	fn input<'a>(requirements: CommandRequirements, user: Option<&'a User>) -> GuardInput<'a> {
		GuardInput {
			requirements,
			command_name: "whoknows",
			user,
			in_guild: true,
			guild_disabled: &[],
			channel_disabled: &[],
			has_manage_guild: false,
			guild_last_indexed: Some(now() - Duration::days(1)),
			now: now(),
		}
	}

	fn all() -> CommandRequirements {
		CommandRequirements {
			username_required: true,
			session_required: true,
			guild_only: true,
			requires_index: true,
			manage_guild: true,
		}
	}

	fn rejected(input: &GuardInput) -> CommandResponse {
		check(input).unwrap_err().response
	}

	#[test]
	fn satisfied_requirements_pass() {
		let mut u = user();
		u.session_key_last_fm = Some("sk".to_string());
		let mut i = input(all(), Some(&u));
		i.has_manage_guild = true;

		assert_eq!(check(&i), Ok(()));
		assert_eq!(check(&input(CommandRequirements::default(), None)), Ok(()));
	}

	#[test]
	fn blocked_user_is_checked_first() {
		let mut u = user();
		u.blocked = true;
		let disabled = vec!["whoknows".to_string()];
		let mut i = input(all(), Some(&u));
		i.guild_disabled = &disabled;

		assert_eq!(rejected(&i), CommandResponse::UserBlocked);
	}

	#[test]
	fn disabled_lists_are_case_insensitive() {
		let u = user();
		let disabled = vec!["WhoKnows".to_string()];

		let mut in_guild = input(CommandRequirements::default(), Some(&u));
		in_guild.guild_disabled = &disabled;
		assert_eq!(check(&in_guild).unwrap_err().message, "This command has been disabled in this server.");

		let mut in_channel = input(CommandRequirements::default(), Some(&u));
		in_channel.channel_disabled = &disabled;
		assert_eq!(check(&in_channel).unwrap_err().message, "This command has been disabled in this channel.");
	}

	#[test]
	fn missing_user_and_session() {
		let u = user();

		assert_eq!(rejected(&input(all(), None)), CommandResponse::UsernameNotSet);
		assert_eq!(rejected(&input(all(), Some(&u))), CommandResponse::SessionRequired);
	}

	#[test]
	fn guild_only_rejects_dms() {
		let req = CommandRequirements { guild_only: true, requires_index: true, ..Default::default() };
		let mut i = input(req, None);
		i.in_guild = false;
		i.guild_last_indexed = None;

		assert_eq!(rejected(&i), CommandResponse::NotSupportedInDm);
	}

	#[test]
	fn manage_guild_needs_permission() {
		let req = CommandRequirements { manage_guild: true, ..Default::default() };
		let mut i = input(req, None);
		assert_eq!(rejected(&i), CommandResponse::NoPermission);

		i.has_manage_guild = true;
		assert_eq!(check(&i), Ok(()));
	}

	#[test]
	fn index_must_exist_and_be_recent() {
		let req = CommandRequirements { requires_index: true, ..Default::default() };

		let mut never = input(req, None);
		never.guild_last_indexed = None;
		assert_eq!(check(&never).unwrap_err().message, "This server hasn't been indexed yet. Run `/fm index` to store its members.");

		let mut outdated = input(req, None);
		outdated.guild_last_indexed = Some(now() - Duration::days(INDEX_OUTDATED_DAYS + 1));
		assert_eq!(rejected(&outdated), CommandResponse::IndexRequired);

		let mut recent = input(req, None);
		recent.guild_last_indexed = Some(now() - Duration::days(INDEX_OUTDATED_DAYS - 1));
		assert_eq!(check(&recent), Ok(()));
	}

	#[test]
	fn index_is_not_checked_in_dms() {
		let req = CommandRequirements { requires_index: true, ..Default::default() };
		let mut i = input(req, None);
		i.in_guild = false;
		i.guild_last_indexed = None;

		assert_eq!(check(&i), Ok(()));
	}
}
