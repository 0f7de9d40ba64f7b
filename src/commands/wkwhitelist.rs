use serenity::all::{CommandDataOption, CommandInteraction, CommandOptionType};
use serenity::async_trait;
use serenity::client::Context;
use entity::enums::CommandResponse;
use crate::command_define::{role_arg, ArgParam, BaseCommand, Command, CommandRequirements, Invocation};
use crate::commands::reply;
use crate::errors::BotResult;
use crate::utils::color;

pub struct WhoKnowsWhitelistCommand;

const PARAMS: [ArgParam; 1] = [
	("role", "Only members with this role show up in WhoKnows. Leave empty to clear", CommandOptionType::Role, false),
];

impl BaseCommand for WhoKnowsWhitelistCommand {
	fn new() -> Self {
		Self {}
	}

	fn get_name(&self) -> String {
		"wkwhitelist".to_string()
	}

	fn get_description(&self) -> String {
		"Limits this server's WhoKnows lists to one role".to_string()
	}
}

#[async_trait]
impl Command for WhoKnowsWhitelistCommand {
	fn args_param(&self) -> &'static [ArgParam] {
		&PARAMS
	}

	fn requirements(&self) -> CommandRequirements {
		CommandRequirements { guild_only: true, manage_guild: true, ..Default::default() }
	}

	async fn execute(&self, ctx: &Context, command: &CommandInteraction, args: Vec<CommandDataOption>, invocation: &Invocation) -> BotResult<CommandResponse> {
		let guild = invocation.require_guild()?;
		let role = role_arg(&args, "role");

		invocation.services.guilds.set_who_knows_whitelist_role(guild.clone(), role.map(|r| r.get())).await?;

		let description = match role {
			Some(role) => format!("Only members with <@&{}> are shown in WhoKnows. Run `/fm index` to apply it to stored members.", role),
			None => "The WhoKnows whitelist has been removed.".to_string(),
		};
		reply::send_embed(ctx, command, reply::embed("WhoKnows whitelist", description, color::success_color()), true).await?;

		Ok(CommandResponse::Ok)
	}
}
