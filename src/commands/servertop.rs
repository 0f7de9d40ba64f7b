use serenity::all::{CommandDataOption, CommandInteraction, CommandOptionType};
use serenity::async_trait;
use serenity::client::Context;
use entity::enums::CommandResponse;
use crate::command_define::{string_arg, ArgParam, BaseCommand, Command, CommandRequirements, Invocation};
use crate::commands::reply;
use crate::errors::BotResult;
use crate::lastfm::TopKind;
use crate::services::who_knows::OrderType;
use crate::tables::quaryfn::GuildTopRow;
use crate::utils::color;

pub struct ServerTopCommand;

const PARAMS: [ArgParam; 2] = [
	("kind", "Artists, albums or tracks", CommandOptionType::String, false),
	("order", "Sort by plays or by listeners", CommandOptionType::String, false),
];

const KINDS: [(&str, &str); 3] = [
	("Artists", "artists"),
	("Albums", "albums"),
	("Tracks", "tracks"),
];

const ORDERS: [(&str, &str); 2] = [
	("Plays", "plays"),
	("Listeners", "listeners"),
];

impl BaseCommand for ServerTopCommand {
	fn new() -> Self {
		Self {}
	}

	fn get_name(&self) -> String {
		"servertop".to_string()
	}

	fn get_description(&self) -> String {
		"Shows the most listened music in this server".to_string()
	}
}

fn parse_kind(value: Option<&str>) -> TopKind {
	match value {
		Some("albums") => TopKind::Albums,
		Some("tracks") => TopKind::Tracks,
		_ => TopKind::Artists,
	}
}

fn parse_order(value: Option<&str>) -> OrderType {
	match value {
		Some("listeners") => OrderType::Listeners,
		_ => OrderType::Playcount,
	}
}

fn top_lines(rows: &[GuildTopRow]) -> Vec<String> {
	rows
		.iter()
		.enumerate()
		.map(|(index, row)| {
			let name = match &row.artist_name {
				Some(artist) => format!("**{}** by {}", row.name, artist),
				None => format!("**{}**", row.name),
			};
			format!("{}. {} - {} plays, {} listeners", index + 1, name, row.total_playcount, row.listener_count)
		})
		.collect()
}

#[async_trait]
impl Command for ServerTopCommand {
	fn args_param(&self) -> &'static [ArgParam] {
		&PARAMS
	}

	fn arg_choices(&self, name: &str) -> &'static [(&'static str, &'static str)] {
		match name {
			"kind" => &KINDS,
			"order" => &ORDERS,
			_ => &[],
		}
	}

	fn requirements(&self) -> CommandRequirements {
		CommandRequirements { guild_only: true, requires_index: true, ..Default::default() }
	}

	async fn execute(&self, ctx: &Context, command: &CommandInteraction, args: Vec<CommandDataOption>, invocation: &Invocation) -> BotResult<CommandResponse> {
		let guild = invocation.require_guild()?;
		let kind = parse_kind(string_arg(&args, "kind").as_deref());
		let order = parse_order(string_arg(&args, "order").as_deref());

		reply::defer(ctx, command).await?;

		let rows = invocation.services.who_knows.top_all_time_for_guild(guild.guild_id, kind, order).await?;
		let title = format!(
			"Top {} in {}",
			match kind {
				TopKind::Artists => "artists",
				TopKind::Albums => "albums",
				TopKind::Tracks => "tracks",
			},
			guild.name.clone().unwrap_or_else(|| "this server".to_string()),
		);

		if rows.is_empty() {
			reply::edit_embed(ctx, command, reply::embed(title, "Nobody in this server has listened to anything yet.", color::warning_color())).await?;
			return Ok(CommandResponse::NotFound);
		}

		reply::edit_embed(ctx, command, reply::embed(title, top_lines(&rows).join("\n"), color::lastfm_color())).await?;

		Ok(CommandResponse::Ok)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_to_artists_by_plays() {
		assert_eq!(parse_kind(None), TopKind::Artists);
		assert_eq!(parse_kind(Some("tracks")), TopKind::Tracks);
		assert_eq!(parse_order(None), OrderType::Playcount);
		assert_eq!(parse_order(Some("listeners")), OrderType::Listeners);
	}

	#[test]
	fn rows_render_with_artist_when_present() {
		let rows = vec![
			GuildTopRow { name: "Low".to_string(), artist_name: None, total_playcount: 90, listener_count: 3 },
			GuildTopRow { name: "Words".to_string(), artist_name: Some("Low".to_string()), total_playcount: 12, listener_count: 2 },
		];

		assert_eq!(top_lines(&rows), vec![
			"1. **Low** - 90 plays, 3 listeners".to_string(),
			"2. **Words** by Low - 12 plays, 2 listeners".to_string(),
		]);
	}
}
