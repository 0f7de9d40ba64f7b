use serenity::all::{CommandDataOption, CommandInteraction};
use serenity::async_trait;
use serenity::client::Context;
use entity::enums::CommandResponse;
use crate::command_define::{BaseCommand, Command, CommandRequirements, Invocation};
use crate::commands::reply;
use crate::errors::BotResult;
use crate::utils::color;

pub struct LogoutCommand;

impl BaseCommand for LogoutCommand {
	fn new() -> Self {
		Self {}
	}

	fn get_name(&self) -> String {
		"logout".to_string()
	}

	fn get_description(&self) -> String {
		"Removes your Last.fm account and everything stored about it".to_string()
	}
}

#[async_trait]
impl Command for LogoutCommand {
	fn requirements(&self) -> CommandRequirements {
		CommandRequirements { username_required: true, ..Default::default() }
	}

	async fn execute(&self, ctx: &Context, command: &CommandInteraction, _args: Vec<CommandDataOption>, invocation: &Invocation) -> BotResult<CommandResponse> {
		let user = invocation.require_user()?;

		reply::defer(ctx, command).await?;
		invocation.services.users.delete_user(user.user_id).await?;

		reply::edit_embed(ctx, command, reply::embed(
			"Logout",
			format!("Your account `{}` and all data stored for it have been removed.", user.user_name_last_fm),
			color::success_color(),
		)).await?;

		Ok(CommandResponse::Ok)
	}
}
