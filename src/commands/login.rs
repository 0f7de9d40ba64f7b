use log::info;
use serenity::all::{CommandDataOption, CommandInteraction, CommandOptionType};
use serenity::async_trait;
use serenity::client::Context;
use entity::enums::{CommandResponse, FmEmbedType};
use crate::command_define::{string_arg, ArgParam, BaseCommand, Command, Invocation};
use crate::commands::reply;
use crate::errors::BotResult;
use crate::services::user::LastfmSettings;
use crate::utils::color;
use crate::utils::convert::{discord_relative_time, format_discord_username};

pub struct LoginCommand;

const PARAMS: [ArgParam; 1] = [
	("username", "Your Last.fm username", CommandOptionType::String, true),
];

impl BaseCommand for LoginCommand {
	fn new() -> Self {
		Self {}
	}

	fn get_name(&self) -> String {
		"login".to_string()
	}

	fn get_description(&self) -> String {
		"Connects your Last.fm account".to_string()
	}
}

#[async_trait]
impl Command for LoginCommand {
	fn args_param(&self) -> &'static [ArgParam] {
		&PARAMS
	}

	async fn execute(&self, ctx: &Context, command: &CommandInteraction, args: Vec<CommandDataOption>, invocation: &Invocation) -> BotResult<CommandResponse> {
		let user_name = string_arg(&args, "username").unwrap_or_default();
		let user_name = user_name.trim();
		if user_name.is_empty() {
			reply::send_embed(ctx, command, reply::embed("Login", "Please enter a Last.fm username.", color::failed_color()), true).await?;
			return Ok(CommandResponse::WrongInput);
		}

		reply::defer(ctx, command).await?;

		let Some(lastfm_user) = invocation.services.live.user_info(user_name).await? else {
			reply::edit_embed(ctx, command, reply::embed(
				"Login",
				format!("The Last.fm user `{}` could not be found. Please check that you spelled it correctly.", user_name),
				color::failed_color(),
			)).await?;
			return Ok(CommandResponse::NotFound);
		};

		let settings = LastfmSettings {
			user_name_last_fm: lastfm_user.name.clone(),
			session_key: None,
			fm_embed_type: invocation.user.as_ref().map_or(FmEmbedType::EmbedMini, |u| u.fm_embed_type),
		};
		let user = invocation.services.users.set_lastfm(command.user.id.get(), settings, false).await?;
		info!("User {} linked Last.fm account {}", format_discord_username(&command.user), user.user_name_last_fm);

		let mut description = format!(
			"Your Last.fm account has been set to [{}](https://www.last.fm/user/{}).",
			user.user_name_last_fm,
			user.user_name_last_fm,
		);
		if let Some(registered) = &lastfm_user.registered {
			description.push_str(&format!("\nScrobbling since {}.", discord_relative_time(registered)));
		}
		description.push_str("\nRun `/fm index` in a server to show up in its WhoKnows lists.");

		reply::edit_embed(ctx, command, reply::embed("Login", description, color::lastfm_color())).await?;

		Ok(CommandResponse::Ok)
	}
}
