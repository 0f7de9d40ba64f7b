use serenity::all::{CommandDataOption, CommandInteraction, CommandOptionType};
use serenity::async_trait;
use serenity::builder::CreateEmbedFooter;
use serenity::client::Context;
use entity::enums::CommandResponse;
use crate::command_define::{string_arg, ArgParam, BaseCommand, Command, CommandRequirements, Invocation};
use crate::commands::reply;
use crate::errors::BotResult;
use crate::services::interactions::ReferencedMusic;
use crate::services::who_knows::{GuildMemberResolver, MusicKey, NameResolver, WhoKnowsEntry, WhoKnowsScope};
use crate::utils::color;
use crate::utils::convert::plays_string;

const LIST_SIZE: usize = 14;

const MODES: [(&str, &str); 3] = [
	("Server", "server"),
	("Global", "global"),
	("Friends", "friends"),
];

const ARTIST_PARAMS: [ArgParam; 2] = [
	("artist", "The artist", CommandOptionType::String, true),
	("mode", "Whose plays to rank", CommandOptionType::String, false),
];

const ALBUM_PARAMS: [ArgParam; 3] = [
	("artist", "The album artist", CommandOptionType::String, true),
	("album", "The album", CommandOptionType::String, true),
	("mode", "Whose plays to rank", CommandOptionType::String, false),
];

const TRACK_PARAMS: [ArgParam; 3] = [
	("artist", "The track artist", CommandOptionType::String, true),
	("track", "The track", CommandOptionType::String, true),
	("mode", "Whose plays to rank", CommandOptionType::String, false),
];

fn mode_choices(name: &str) -> &'static [(&'static str, &'static str)] {
	match name {
		"mode" => &MODES,
		_ => &[],
	}
}

fn who_knows_requirements() -> CommandRequirements {
	CommandRequirements { username_required: true, requires_index: true, ..Default::default() }
}

/// Leaderboard lines with the caller's own name in bold.
fn leaderboard_lines(entries: &[WhoKnowsEntry], caller_user_id: i32) -> Vec<String> {
	entries
		.iter()
		.take(LIST_SIZE)
		.enumerate()
		.map(|(index, entry)| {
			let name = if entry.user_id == caller_user_id {
				format!("**{}**", entry.display_name)
			}
			else {
				entry.display_name.clone()
			};
			format!(
				"{}. [{}](https://www.last.fm/user/{}) - **{}** {}",
				index + 1,
				name,
				entry.user_name_last_fm,
				entry.playcount,
				plays_string(entry.playcount as i64),
			)
		})
		.collect()
}

fn listeners_footer(entries: &[WhoKnowsEntry]) -> String {
	let total: i64 = entries.iter().map(|e| e.playcount as i64).sum();
	let listeners = if entries.len() == 1 { "listener" } else { "listeners" };

	format!("{} {} - {} total {}", entries.len(), listeners, total, plays_string(total))
}

async fn who_knows_reply(
	ctx: &Context,
	command: &CommandInteraction,
	invocation: &Invocation,
	key: MusicKey,
	mode: Option<String>,
) -> BotResult<CommandResponse> {
	let services = &invocation.services;
	let user = invocation.require_user()?;

	let (scope, place) = match (mode.as_deref(), &invocation.guild) {
		(Some("global"), _) => (WhoKnowsScope::Global, "on the bot".to_string()),
		(Some("friends"), _) => (WhoKnowsScope::Friends { user_id: user.user_id }, "among your friends".to_string()),
		(_, Some(guild)) => (
			WhoKnowsScope::for_guild(guild),
			format!("in {}", guild.name.clone().unwrap_or_else(|| "this server".to_string())),
		),
		(_, None) => {
			reply::send_embed(ctx, command, reply::embed(
				"WhoKnows",
				"Server rankings only work inside a server. Try the `global` or `friends` mode.",
				color::failed_color(),
			), true).await?;
			return Ok(CommandResponse::NotSupportedInDm);
		},
	};

	reply::defer(ctx, command).await?;

	let referenced = match &key {
		MusicKey::Artist { name } => ReferencedMusic { artist: name.clone(), album: None, track: None },
		MusicKey::Album { artist, name } => ReferencedMusic { artist: artist.clone(), album: Some(name.clone()), track: None },
		MusicKey::Track { artist, name } => ReferencedMusic { artist: artist.clone(), album: None, track: Some(name.clone()) },
	};
	services.tracker.set_referenced_music(command.id.get(), referenced).await;

	let resolver = command.guild_id.map(|guild_id| GuildMemberResolver::new(ctx.http.clone(), guild_id));
	let entries = services.who_knows
		.who_knows(scope, &key, resolver.as_ref().map(|r| r as &dyn NameResolver))
		.await?;

	if entries.is_empty() {
		reply::edit_embed(ctx, command, reply::embed(
			format!("{} {}", key.title(), place),
			format!("Nobody {} has listened to **{}** yet.", place, key.title()),
			color::warning_color(),
		)).await?;
		return Ok(CommandResponse::NotFound);
	}

	let embed = reply::embed(
		format!("{} {}", key.title(), place),
		leaderboard_lines(&entries, user.user_id).join("\n"),
		color::lastfm_color(),
	).footer(CreateEmbedFooter::new(listeners_footer(&entries)));
	reply::edit_embed(ctx, command, embed).await?;

	Ok(CommandResponse::Ok)
}

pub struct WhoKnowsCommand;

impl BaseCommand for WhoKnowsCommand {
	fn new() -> Self {
		Self {}
	}

	fn get_name(&self) -> String {
		"whoknows".to_string()
	}

	fn get_description(&self) -> String {
		"Shows who listens to an artist the most".to_string()
	}
}

#[async_trait]
impl Command for WhoKnowsCommand {
	fn args_param(&self) -> &'static [ArgParam] {
		&ARTIST_PARAMS
	}

	fn arg_choices(&self, name: &str) -> &'static [(&'static str, &'static str)] {
		mode_choices(name)
	}

	fn requirements(&self) -> CommandRequirements {
		who_knows_requirements()
	}

	async fn execute(&self, ctx: &Context, command: &CommandInteraction, args: Vec<CommandDataOption>, invocation: &Invocation) -> BotResult<CommandResponse> {
		let key = MusicKey::artist(&string_arg(&args, "artist").unwrap_or_default())?;
		who_knows_reply(ctx, command, invocation, key, string_arg(&args, "mode")).await
	}
}

pub struct WhoKnowsAlbumCommand;

impl BaseCommand for WhoKnowsAlbumCommand {
	fn new() -> Self {
		Self {}
	}

	fn get_name(&self) -> String {
		"whoknowsalbum".to_string()
	}

	fn get_description(&self) -> String {
		"Shows who listens to an album the most".to_string()
	}
}

#[async_trait]
impl Command for WhoKnowsAlbumCommand {
	fn args_param(&self) -> &'static [ArgParam] {
		&ALBUM_PARAMS
	}

	fn arg_choices(&self, name: &str) -> &'static [(&'static str, &'static str)] {
		mode_choices(name)
	}

	fn requirements(&self) -> CommandRequirements {
		who_knows_requirements()
	}

	async fn execute(&self, ctx: &Context, command: &CommandInteraction, args: Vec<CommandDataOption>, invocation: &Invocation) -> BotResult<CommandResponse> {
		let key = MusicKey::album(
			&string_arg(&args, "artist").unwrap_or_default(),
			&string_arg(&args, "album").unwrap_or_default(),
		)?;
		who_knows_reply(ctx, command, invocation, key, string_arg(&args, "mode")).await
	}
}

pub struct WhoKnowsTrackCommand;

impl BaseCommand for WhoKnowsTrackCommand {
	fn new() -> Self {
		Self {}
	}

	fn get_name(&self) -> String {
		"whoknowstrack".to_string()
	}

	fn get_description(&self) -> String {
		"Shows who listens to a track the most".to_string()
	}
}

#[async_trait]
impl Command for WhoKnowsTrackCommand {
	fn args_param(&self) -> &'static [ArgParam] {
		&TRACK_PARAMS
	}

	fn arg_choices(&self, name: &str) -> &'static [(&'static str, &'static str)] {
		mode_choices(name)
	}

	fn requirements(&self) -> CommandRequirements {
		who_knows_requirements()
	}

	async fn execute(&self, ctx: &Context, command: &CommandInteraction, args: Vec<CommandDataOption>, invocation: &Invocation) -> BotResult<CommandResponse> {
		let key = MusicKey::track(
			&string_arg(&args, "artist").unwrap_or_default(),
			&string_arg(&args, "track").unwrap_or_default(),
		)?;
		who_knows_reply(ctx, command, invocation, key, string_arg(&args, "mode")).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn entry(user_id: i32, name: &str, playcount: i32) -> WhoKnowsEntry {
		WhoKnowsEntry {
			user_id,
			discord_user_id: user_id as u64,
			display_name: name.to_string(),
			user_name_last_fm: name.to_lowercase(),
			playcount,
		}
	}

	#[test]
	fn caller_is_highlighted() {
		let entries = vec![entry(1, "Ann", 40), entry(2, "Bob", 1)];

		assert_eq!(leaderboard_lines(&entries, 2), vec![
			"1. [Ann](https://www.last.fm/user/ann) - **40** plays".to_string(),
			"2. [**Bob**](https://www.last.fm/user/bob) - **1** play".to_string(),
		]);
	}

	#[test]
	fn leaderboard_is_capped() {
		let entries: Vec<WhoKnowsEntry> = (1..=20).map(|i| entry(i, "User", 100 - i)).collect();

		assert_eq!(leaderboard_lines(&entries, 0).len(), LIST_SIZE);
	}

	#[test]
	fn footer_counts_everyone() {
		let entries = vec![entry(1, "Ann", 40), entry(2, "Bob", 2)];

		assert_eq!(listeners_footer(&entries), "2 listeners - 42 total plays");
		assert_eq!(listeners_footer(&entries[..1]), "1 listener - 40 total plays");
	}
}
