use serenity::all::{CommandDataOption, CommandInteraction, CommandOptionType};
use serenity::async_trait;
use serenity::client::Context;
use entity::enums::CommandResponse;
use crate::command_define::{string_arg, ArgParam, BaseCommand, Command, CommandRequirements, Invocation};
use crate::commands::{self, reply};
use crate::errors::BotResult;
use crate::utils::color;

pub struct ToggleCommandCommand;

const PARAMS: [ArgParam; 2] = [
	("command", "The command to enable or disable", CommandOptionType::String, true),
	("scope", "Toggle for the whole server or only this channel", CommandOptionType::String, false),
];

const SCOPES: [(&str, &str); 2] = [
	("Server", "server"),
	("Channel", "channel"),
];

impl BaseCommand for ToggleCommandCommand {
	fn new() -> Self {
		Self {}
	}

	fn get_name(&self) -> String {
		"togglecommand".to_string()
	}

	fn get_description(&self) -> String {
		"Enables or disables a command in this server or channel".to_string()
	}
}

/// Lowercased name if it can be toggled.
fn toggleable(name: &str, known: &[String], own_name: &str) -> Option<String> {
	let name = name.trim().to_lowercase();
	if name == own_name || !known.contains(&name) {
		return None;
	}

	Some(name)
}

#[async_trait]
impl Command for ToggleCommandCommand {
	fn args_param(&self) -> &'static [ArgParam] {
		&PARAMS
	}

	fn arg_choices(&self, name: &str) -> &'static [(&'static str, &'static str)] {
		match name {
			"scope" => &SCOPES,
			_ => &[],
		}
	}

	fn requirements(&self) -> CommandRequirements {
		CommandRequirements { guild_only: true, manage_guild: true, ..Default::default() }
	}

	async fn execute(&self, ctx: &Context, command: &CommandInteraction, args: Vec<CommandDataOption>, invocation: &Invocation) -> BotResult<CommandResponse> {
		let guild = invocation.require_guild()?;
		let requested = string_arg(&args, "command").unwrap_or_default();

		let Some(name) = toggleable(&requested, &commands::command_names(), &self.get_name()) else {
			reply::send_embed(ctx, command, reply::embed(
				"Toggle command",
				format!("`{}` is not a command that can be toggled.", requested),
				color::failed_color(),
			), true).await?;
			return Ok(CommandResponse::WrongInput);
		};

		let channel_scope = string_arg(&args, "scope").as_deref() == Some("channel");
		let guilds = &invocation.services.guilds;
		let disabled = if channel_scope {
			guilds.toggle_channel_command(guild, command.channel_id.get(), &name).await?
		}
		else {
			guilds.toggle_guild_command(guild.clone(), &name).await?
		};

		let place = if channel_scope { "this channel" } else { "this server" };
		let state = if disabled { "disabled" } else { "enabled" };
		reply::send_embed(ctx, command, reply::embed(
			"Toggle command",
			format!("`{}` is now {} in {}.", name, state, place),
			color::success_color(),
		), false).await?;

		Ok(CommandResponse::Ok)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn only_known_commands_toggle() {
		let known = vec!["np".to_string(), "whoknows".to_string(), "togglecommand".to_string()];

		assert_eq!(toggleable(" NP ", &known, "togglecommand").as_deref(), Some("np"));
		assert_eq!(toggleable("missing", &known, "togglecommand"), None);
		assert_eq!(toggleable("togglecommand", &known, "togglecommand"), None);
	}
}
