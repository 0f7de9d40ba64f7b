use log::info;
use serenity::all::{CommandDataOption, CommandInteraction, CommandOptionType};
use serenity::async_trait;
use serenity::client::Context;
use entity::enums::{CommandResponse, DataSource, PlaySource};
use crate::command_define::{attachment_arg, ArgParam, BaseCommand, Command, CommandRequirements, Invocation};
use crate::commands::reply;
use crate::errors::{BotError, BotResult};
use crate::services::play::{parse_spotify_history, ImportResult};
use crate::utils::color;

const MAX_FILE_SIZE: u32 = 50 * 1024 * 1024;

pub struct SpotifyImportCommand;

const PARAMS: [ArgParam; 1] = [
	("file", "A Spotify extended streaming history file (Streaming_History_Audio_*.json)", CommandOptionType::Attachment, true),
];

impl BaseCommand for SpotifyImportCommand {
	fn new() -> Self {
		Self {}
	}

	fn get_name(&self) -> String {
		"spotify".to_string()
	}

	fn get_description(&self) -> String {
		"Imports your Spotify streaming history".to_string()
	}
}

fn result_description(result: &ImportResult) -> String {
	let mut lines = vec![format!("Imported **{}** new plays.", result.imported)];
	if result.skipped_existing > 0 {
		lines.push(format!("- {} plays were already imported", result.skipped_existing));
	}
	if result.skipped_short > 0 {
		lines.push(format!("- {} plays were shorter than 30 seconds", result.skipped_short));
	}
	if result.skipped_invalid > 0 {
		lines.push(format!("- {} entries had no track information", result.skipped_invalid));
	}

	lines.join("\n")
}

#[async_trait]
impl Command for SpotifyImportCommand {
	fn args_param(&self) -> &'static [ArgParam] {
		&PARAMS
	}

	fn requirements(&self) -> CommandRequirements {
		CommandRequirements { username_required: true, ..Default::default() }
	}

	async fn execute(&self, ctx: &Context, command: &CommandInteraction, args: Vec<CommandDataOption>, invocation: &Invocation) -> BotResult<CommandResponse> {
		let services = &invocation.services;
		let user = invocation.require_user()?;

		let attachment = attachment_arg(&args, "file")
			.and_then(|id| command.data.resolved.attachments.get(&id))
			.ok_or_else(|| BotError::Validation("Please attach your streaming history file.".to_string()))?;
		if !attachment.filename.to_lowercase().ends_with(".json") {
			return Err(BotError::Validation("Only `.json` files from a Spotify data export can be imported.".to_string()));
		}
		if attachment.size > MAX_FILE_SIZE {
			return Err(BotError::Validation("That file is too large to import.".to_string()));
		}

		reply::defer(ctx, command).await?;

		let bytes = attachment.download().await?;
		let json = String::from_utf8(bytes).map_err(|_| BotError::Validation("The file is not valid text.".to_string()))?;
		let entries = parse_spotify_history(&json)?;

		let result = services.plays.insert_spotify_import(user.user_id, entries).await?;
		info!("Spotify import by {} from {}: {:?}", user.user_name_last_fm, attachment.filename, result);

		let mut description = result_description(&result);
		if let Some(years) = services.plays.imported_years_description(user.user_id, PlaySource::SpotifyImport).await? {
			description.push_str("\n\n**Imported Spotify plays per year**\n");
			description.push_str(&years);
		}
		if user.data_source == DataSource::LastFm {
			description.push_str("\nYour imports are not used yet. Pick how to combine them with `/fm datasource`.");
			services.tracker.mark_hint_shown(command.id.get()).await;
		}

		reply::edit_embed(ctx, command, reply::embed("Spotify import", description, color::success_color())).await?;

		Ok(CommandResponse::Ok)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn only_nonzero_skips_are_listed() {
		let result = ImportResult { imported: 12, skipped_short: 3, skipped_invalid: 0, skipped_existing: 0 };

		assert_eq!(result_description(&result), "Imported **12** new plays.\n- 3 plays were shorter than 30 seconds");
	}
}
