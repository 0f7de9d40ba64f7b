use serenity::all::{CommandDataOption, CommandInteraction, CommandOptionType};
use serenity::async_trait;
use serenity::client::Context;
use entity::enums::{CommandResponse, PrivacyLevel};
use crate::command_define::{string_arg, ArgParam, BaseCommand, Command, CommandRequirements, Invocation};
use crate::commands::reply;
use crate::errors::BotResult;
use crate::utils::color;

pub struct PrivacyCommand;

const PARAMS: [ArgParam; 1] = [
	("level", "Who can see you in WhoKnows lists", CommandOptionType::String, true),
];

const LEVELS: [(&str, &str); 2] = [
	("Server: only visible in servers you share", "server"),
	("Global: also visible in global WhoKnows", "global"),
];

impl BaseCommand for PrivacyCommand {
	fn new() -> Self {
		Self {}
	}

	fn get_name(&self) -> String {
		"privacy".to_string()
	}

	fn get_description(&self) -> String {
		"Changes your WhoKnows visibility".to_string()
	}
}

fn parse_level(value: &str) -> Option<PrivacyLevel> {
	match value {
		"server" => Some(PrivacyLevel::Server),
		"global" => Some(PrivacyLevel::Global),
		_ => None,
	}
}

#[async_trait]
impl Command for PrivacyCommand {
	fn args_param(&self) -> &'static [ArgParam] {
		&PARAMS
	}

	fn arg_choices(&self, name: &str) -> &'static [(&'static str, &'static str)] {
		match name {
			"level" => &LEVELS,
			_ => &[],
		}
	}

	fn requirements(&self) -> CommandRequirements {
		CommandRequirements { username_required: true, ..Default::default() }
	}

	async fn execute(&self, ctx: &Context, command: &CommandInteraction, args: Vec<CommandDataOption>, invocation: &Invocation) -> BotResult<CommandResponse> {
		let user = invocation.require_user()?;
		let Some(level) = string_arg(&args, "level").as_deref().and_then(parse_level) else {
			reply::send_embed(ctx, command, reply::embed("Privacy", "Unknown privacy level.", color::failed_color()), true).await?;
			return Ok(CommandResponse::WrongInput);
		};

		invocation.services.users.set_privacy_level(user.user_id, level).await?;

		let description = match level {
			PrivacyLevel::Global => "You are now visible in global WhoKnows lists.",
			PrivacyLevel::Server => "You are now only visible in WhoKnows lists of servers you are in.",
		};
		reply::send_embed(ctx, command, reply::embed(format!("Privacy set to {}", level), description, color::success_color()), true).await?;

		Ok(CommandResponse::Ok)
	}
}
