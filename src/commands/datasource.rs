use serenity::all::{CommandDataOption, CommandInteraction, CommandOptionType};
use serenity::async_trait;
use serenity::client::Context;
use entity::enums::{CommandResponse, DataSource};
use crate::command_define::{string_arg, ArgParam, BaseCommand, Command, CommandRequirements, Invocation};
use crate::commands::reply;
use crate::errors::BotResult;
use crate::utils::color;

pub struct DataSourceCommand;

const PARAMS: [ArgParam; 1] = [
	("source", "How imported plays are combined with your Last.fm history", CommandOptionType::String, true),
];

const SOURCES: [(&str, &str); 3] = [
	("Last.fm only", "lastfm"),
	("Full imports, then Last.fm", "full-import-then-lastfm"),
	("Imports until full Last.fm", "import-then-full-lastfm"),
];

impl BaseCommand for DataSourceCommand {
	fn new() -> Self {
		Self {}
	}

	fn get_name(&self) -> String {
		"datasource".to_string()
	}

	fn get_description(&self) -> String {
		"Chooses where your listening history comes from".to_string()
	}
}

fn parse_source(value: &str) -> Option<DataSource> {
	match value {
		"lastfm" => Some(DataSource::LastFm),
		"full-import-then-lastfm" => Some(DataSource::FullImportThenLastFm),
		"import-then-full-lastfm" => Some(DataSource::ImportThenFullLastFm),
		_ => None,
	}
}

fn describe(source: DataSource) -> &'static str {
	match source {
		DataSource::LastFm => "Only your Last.fm scrobbles are used.",
		DataSource::FullImportThenLastFm => "All imported plays are used, with Last.fm scrobbles after your last import.",
		DataSource::ImportThenFullLastFm => "Imported plays are used until your first Last.fm scrobble, then Last.fm takes over.",
	}
}

#[async_trait]
impl Command for DataSourceCommand {
	fn args_param(&self) -> &'static [ArgParam] {
		&PARAMS
	}

	fn arg_choices(&self, name: &str) -> &'static [(&'static str, &'static str)] {
		match name {
			"source" => &SOURCES,
			_ => &[],
		}
	}

	fn requirements(&self) -> CommandRequirements {
		CommandRequirements { username_required: true, ..Default::default() }
	}

	async fn execute(&self, ctx: &Context, command: &CommandInteraction, args: Vec<CommandDataOption>, invocation: &Invocation) -> BotResult<CommandResponse> {
		let user = invocation.require_user()?;
		let Some(source) = string_arg(&args, "source").as_deref().and_then(parse_source) else {
			reply::send_embed(ctx, command, reply::embed("Data source", "Unknown data source.", color::failed_color()), true).await?;
			return Ok(CommandResponse::WrongInput);
		};

		let mut description = describe(source).to_string();
		if source != DataSource::LastFm && invocation.services.plays.import_summary(user.user_id).await?.total() == 0 {
			description.push_str("\nYou have no imported plays yet. Use `/fm import spotify` to add them.");
		}

		invocation.services.users.set_data_source(user.user_id, source).await?;
		reply::send_embed(ctx, command, reply::embed(format!("Data source set to {}", source), description, color::success_color()), true).await?;

		Ok(CommandResponse::Ok)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn every_choice_parses() {
		for (_, value) in SOURCES {
			assert!(parse_source(value).is_some());
		}
		assert_eq!(parse_source("spotify"), None);
	}
}
