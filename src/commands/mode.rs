use serenity::all::{CommandDataOption, CommandInteraction, CommandOptionType};
use serenity::async_trait;
use serenity::client::Context;
use entity::enums::{CommandResponse, FmEmbedType};
use crate::command_define::{string_arg, ArgParam, BaseCommand, Command, CommandRequirements, Invocation};
use crate::commands::reply;
use crate::errors::BotResult;
use crate::utils::color;

pub struct ModeCommand;

const PARAMS: [ArgParam; 1] = [
	("mode", "How `/fm np` shows your track", CommandOptionType::String, true),
];

const MODES: [(&str, &str); 4] = [
	("Embed (mini)", "embed-mini"),
	("Embed (full)", "embed-full"),
	("Text (mini)", "text-mini"),
	("Text (full)", "text-full"),
];

impl BaseCommand for ModeCommand {
	fn new() -> Self {
		Self {}
	}

	fn get_name(&self) -> String {
		"mode".to_string()
	}

	fn get_description(&self) -> String {
		"Changes how your now playing message looks".to_string()
	}
}

fn parse_mode(value: &str) -> Option<FmEmbedType> {
	match value {
		"embed-mini" => Some(FmEmbedType::EmbedMini),
		"embed-full" => Some(FmEmbedType::EmbedFull),
		"text-mini" => Some(FmEmbedType::TextMini),
		"text-full" => Some(FmEmbedType::TextFull),
		_ => None,
	}
}

#[async_trait]
impl Command for ModeCommand {
	fn args_param(&self) -> &'static [ArgParam] {
		&PARAMS
	}

	fn arg_choices(&self, name: &str) -> &'static [(&'static str, &'static str)] {
		match name {
			"mode" => &MODES,
			_ => &[],
		}
	}

	fn requirements(&self) -> CommandRequirements {
		CommandRequirements { username_required: true, ..Default::default() }
	}

	async fn execute(&self, ctx: &Context, command: &CommandInteraction, args: Vec<CommandDataOption>, invocation: &Invocation) -> BotResult<CommandResponse> {
		let user = invocation.require_user()?;
		let value = string_arg(&args, "mode").unwrap_or_default();
		let Some(mode) = parse_mode(&value) else {
			reply::send_embed(ctx, command, reply::embed("Mode", "Unknown mode.", color::failed_color()), true).await?;
			return Ok(CommandResponse::WrongInput);
		};

		invocation.services.users.set_settings(user.user_id, mode).await?;
		reply::send_embed(ctx, command, reply::embed("Mode", format!("Your `/fm np` mode is now `{}`.", value), color::success_color()), true).await?;

		Ok(CommandResponse::Ok)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn every_choice_parses() {
		for (_, value) in MODES {
			assert!(parse_mode(value).is_some());
		}
		assert_eq!(parse_mode("embed"), None);
	}
}
