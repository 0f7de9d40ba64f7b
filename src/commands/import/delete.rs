use log::info;
use serenity::all::{CommandDataOption, CommandInteraction, CommandOptionType};
use serenity::async_trait;
use serenity::client::Context;
use entity::enums::{CommandResponse, DataSource, PlaySource};
use crate::command_define::{string_arg, ArgParam, BaseCommand, Command, CommandRequirements, Invocation};
use crate::commands::reply;
use crate::errors::BotResult;
use crate::utils::color;

pub struct DeleteImportCommand;

const PARAMS: [ArgParam; 1] = [
	("source", "Which imported plays to delete", CommandOptionType::String, true),
];

const SOURCES: [(&str, &str); 2] = [
	("Spotify", "spotify"),
	("Apple Music", "applemusic"),
];

impl BaseCommand for DeleteImportCommand {
	fn new() -> Self {
		Self {}
	}

	fn get_name(&self) -> String {
		"delete".to_string()
	}

	fn get_description(&self) -> String {
		"Deletes imported plays".to_string()
	}
}

fn parse_source(value: &str) -> Option<PlaySource> {
	match value {
		"spotify" => Some(PlaySource::SpotifyImport),
		"applemusic" => Some(PlaySource::AppleMusicImport),
		_ => None,
	}
}

#[async_trait]
impl Command for DeleteImportCommand {
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
		let services = &invocation.services;
		let user = invocation.require_user()?;
		let Some(source) = string_arg(&args, "source").as_deref().and_then(parse_source) else {
			reply::send_embed(ctx, command, reply::embed("Delete imports", "Unknown import source.", color::failed_color()), true).await?;
			return Ok(CommandResponse::WrongInput);
		};

		reply::defer(ctx, command).await?;

		let deleted = services.plays.delete_imported_plays(user.user_id, source).await?;
		info!("Deleted {} {} plays of user {}", deleted, source, user.user_id);

		let mut description = format!("Deleted **{}** imported {} plays.", deleted, source);
		if user.data_source != DataSource::LastFm && services.plays.import_summary(user.user_id).await?.total() == 0 {
			services.users.set_data_source(user.user_id, DataSource::LastFm).await?;
			description.push_str("\nYou have no imports left, so your data source has been reset to Last.fm.");
		}

		reply::edit_embed(ctx, command, reply::embed("Delete imports", description, color::success_color())).await?;

		Ok(if deleted == 0 { CommandResponse::NotFound } else { CommandResponse::Ok })
	}
}
