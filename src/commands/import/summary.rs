use serenity::all::{CommandDataOption, CommandInteraction};
use serenity::async_trait;
use serenity::client::Context;
use entity::enums::{CommandResponse, PlaySource};
use crate::command_define::{BaseCommand, Command, CommandRequirements, Invocation};
use crate::commands::reply;
use crate::errors::BotResult;
use crate::utils::color;

pub struct ImportSummaryCommand;

impl BaseCommand for ImportSummaryCommand {
	fn new() -> Self {
		Self {}
	}

	fn get_name(&self) -> String {
		"summary".to_string()
	}

	fn get_description(&self) -> String {
		"Shows what you have imported".to_string()
	}
}

#[async_trait]
impl Command for ImportSummaryCommand {
	fn requirements(&self) -> CommandRequirements {
		CommandRequirements { username_required: true, ..Default::default() }
	}

	async fn execute(&self, ctx: &Context, command: &CommandInteraction, _args: Vec<CommandDataOption>, invocation: &Invocation) -> BotResult<CommandResponse> {
		let plays = &invocation.services.plays;
		let user = invocation.require_user()?;

		reply::defer(ctx, command).await?;

		let summary = plays.import_summary(user.user_id).await?;
		if summary.total() == 0 {
			reply::edit_embed(ctx, command, reply::embed(
				"Imports",
				"You haven't imported anything yet. Use `/fm import spotify` to get started.",
				color::warning_color(),
			)).await?;
			return Ok(CommandResponse::NotFound);
		}

		let mut description = format!("Data source: **{}**\n", user.data_source);
		for source in [PlaySource::SpotifyImport, PlaySource::AppleMusicImport] {
			if let Some(years) = plays.imported_years_description(user.user_id, source).await? {
				description.push_str(&format!("\n**{}**\n{}", source, years));
			}
		}

		reply::edit_embed(ctx, command, reply::embed(
			format!("{} imported plays", summary.total()),
			description,
			color::lastfm_color(),
		)).await?;

		Ok(CommandResponse::Ok)
	}
}
