use serenity::all::{CommandDataOption, CommandInteraction, CommandOptionType};
use serenity::async_trait;
use serenity::client::Context;
use entity::enums::CommandResponse;
use crate::command_define::{string_arg, user_arg, ArgParam, BaseCommand, Command, CommandRequirements, Invocation};
use crate::commands::reply;
use crate::errors::BotResult;
use crate::utils::color;

pub struct WhoKnowsBlockCommand;

const PARAMS: [ArgParam; 2] = [
	("user", "The member to block or unblock", CommandOptionType::User, true),
	("action", "Block or unblock", CommandOptionType::String, false),
];

const ACTIONS: [(&str, &str); 2] = [
	("Block", "block"),
	("Unblock", "unblock"),
];

impl BaseCommand for WhoKnowsBlockCommand {
	fn new() -> Self {
		Self {}
	}

	fn get_name(&self) -> String {
		"wkblock".to_string()
	}

	fn get_description(&self) -> String {
		"Hides a member from this server's WhoKnows lists".to_string()
	}
}

#[async_trait]
impl Command for WhoKnowsBlockCommand {
	fn args_param(&self) -> &'static [ArgParam] {
		&PARAMS
	}

	fn arg_choices(&self, name: &str) -> &'static [(&'static str, &'static str)] {
		match name {
			"action" => &ACTIONS,
			_ => &[],
		}
	}

	fn requirements(&self) -> CommandRequirements {
		CommandRequirements { guild_only: true, manage_guild: true, ..Default::default() }
	}

	async fn execute(&self, ctx: &Context, command: &CommandInteraction, args: Vec<CommandDataOption>, invocation: &Invocation) -> BotResult<CommandResponse> {
		let services = &invocation.services;
		let guild = invocation.require_guild()?;

		let target = match user_arg(&args, "user") {
			Some(id) => services.users.get_user(id.get()).await?,
			None => None,
		};
		let Some(target) = target else {
			reply::send_embed(ctx, command, reply::embed("WhoKnows block", "That user hasn't connected a Last.fm account.", color::failed_color()), true).await?;
			return Ok(CommandResponse::NotFound);
		};

		let unblock = string_arg(&args, "action").as_deref() == Some("unblock");
		let (changed, text) = if unblock {
			(services.guilds.unblock_user_from_who_knows(guild.guild_id, target.user_id).await?, "unblocked from")
		}
		else {
			(services.guilds.block_user_from_who_knows(guild.guild_id, target.user_id).await?, "blocked from")
		};

		if !changed {
			reply::send_embed(ctx, command, reply::embed(
				"WhoKnows block",
				format!("`{}` was already {} WhoKnows here.", target.user_name_last_fm, text),
				color::warning_color(),
			), true).await?;
			return Ok(CommandResponse::WrongInput);
		}

		reply::send_embed(ctx, command, reply::embed(
			"WhoKnows block",
			format!("`{}` has been {} WhoKnows in this server.", target.user_name_last_fm, text),
			color::success_color(),
		), true).await?;

		Ok(CommandResponse::Ok)
	}
}
