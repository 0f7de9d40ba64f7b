use serenity::all::{CommandDataOption, CommandInteraction, CommandOptionType};
use serenity::async_trait;
use serenity::client::Context;
use entity::enums::CommandResponse;
use crate::command_define::{string_arg, user_arg, ArgParam, BaseCommand, Command, CommandRequirements, Invocation};
use crate::commands::reply;
use crate::errors::BotResult;
use crate::utils::color;

pub struct FriendCommand;

const PARAMS: [ArgParam; 2] = [
	("action", "Add, remove or list friends", CommandOptionType::String, true),
	("user", "The friend to add or remove", CommandOptionType::User, false),
];

const ACTIONS: [(&str, &str); 3] = [
	("Add", "add"),
	("Remove", "remove"),
	("List", "list"),
];

impl BaseCommand for FriendCommand {
	fn new() -> Self {
		Self {}
	}

	fn get_name(&self) -> String {
		"friend".to_string()
	}

	fn get_description(&self) -> String {
		"Manages the friends shown in friends WhoKnows".to_string()
	}
}

#[async_trait]
impl Command for FriendCommand {
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
		CommandRequirements { username_required: true, ..Default::default() }
	}

	async fn execute(&self, ctx: &Context, command: &CommandInteraction, args: Vec<CommandDataOption>, invocation: &Invocation) -> BotResult<CommandResponse> {
		let services = &invocation.services;
		let user = invocation.require_user()?;
		let action = string_arg(&args, "action").unwrap_or_default();

		if action == "list" {
			let friends = services.users.get_friends(user.user_id).await?;
			let description = if friends.is_empty() {
				"You haven't added any friends yet.".to_string()
			}
			else {
				friends
					.iter()
					.map(|f| format!("- [{}](https://www.last.fm/user/{})", f.user_name_last_fm, f.user_name_last_fm))
					.collect::<Vec<_>>()
					.join("\n")
			};
			reply::send_embed(ctx, command, reply::embed("Friends", description, color::lastfm_color()), true).await?;
			return Ok(CommandResponse::Ok);
		}

		let Some(target_id) = user_arg(&args, "user") else {
			reply::send_embed(ctx, command, reply::embed("Friends", "Pick a user to add or remove.", color::failed_color()), true).await?;
			return Ok(CommandResponse::WrongInput);
		};
		let Some(target) = services.users.get_user(target_id.get()).await? else {
			reply::send_embed(ctx, command, reply::embed("Friends", "That user hasn't connected a Last.fm account.", color::failed_color()), true).await?;
			return Ok(CommandResponse::NotFound);
		};

		let (changed, done, unchanged) = match action.as_str() {
			"add" => (
				services.users.add_friend(user.user_id, target.user_id).await?,
				"was added as a friend",
				"is already your friend or is you",
			),
			"remove" => (
				services.users.remove_friend(user.user_id, target.user_id).await?,
				"was removed from your friends",
				"is not one of your friends",
			),
			_ => {
				reply::send_embed(ctx, command, reply::embed("Friends", "Unknown action.", color::failed_color()), true).await?;
				return Ok(CommandResponse::WrongInput);
			},
		};

		let (text, colour) = if changed { (done, color::success_color()) } else { (unchanged, color::warning_color()) };
		reply::send_embed(ctx, command, reply::embed("Friends", format!("`{}` {}.", target.user_name_last_fm, text), colour), true).await?;

		Ok(if changed { CommandResponse::Ok } else { CommandResponse::WrongInput })
	}
}
