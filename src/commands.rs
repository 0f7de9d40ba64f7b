use chrono::Utc;
use log::{debug, error, info, warn};
use once_cell::sync::Lazy;
use serenity::all::{CommandDataOption, CommandInteraction};
use serenity::builder::CreateCommand;
use serenity::client::Context;
use entity::enums::{CommandResponse, InteractionType};
use entity::{Guild, User};
use crate::command_define::{resolve_in, BaseCommand, BuildCommandOption, CommonCommandType, Invocation, ResolvedCommand};
use crate::commands::guard::GuardInput;
use crate::errors::{BotError, BotResult};
use crate::services::interactions::InteractionTracker;
use crate::services::user::InteractionRecord;
use crate::services::Services;
use crate::utils::{client, color};
use crate::utils::convert::parse_command_list;

mod datasource;
mod footer;
mod friend;
mod guard;
mod import;
mod index;
mod login;
mod logout;
mod mode;
mod np;
mod ping;
mod privacy;
mod reply;
mod servertop;
mod togglecommand;
mod whoknows;
mod wkblock;
mod wkwhitelist;

const ROOT_NAME: &str = "fm";

static COMMANDS: Lazy<Vec<CommonCommandType>> = Lazy::new(|| vec![
	CommonCommandType::Command(ping::PingCommand::new().to_box()),
	CommonCommandType::Command(login::LoginCommand::new().to_box()),
	CommonCommandType::Command(logout::LogoutCommand::new().to_box()),
	CommonCommandType::Command(np::NowPlayingCommand::new().to_box()),
	CommonCommandType::Command(whoknows::WhoKnowsCommand::new().to_box()),
	CommonCommandType::Command(whoknows::WhoKnowsAlbumCommand::new().to_box()),
	CommonCommandType::Command(whoknows::WhoKnowsTrackCommand::new().to_box()),
	CommonCommandType::Command(servertop::ServerTopCommand::new().to_box()),
	CommonCommandType::Command(privacy::PrivacyCommand::new().to_box()),
	CommonCommandType::Command(datasource::DataSourceCommand::new().to_box()),
	CommonCommandType::Command(footer::FooterCommand::new().to_box()),
	CommonCommandType::Command(mode::ModeCommand::new().to_box()),
	CommonCommandType::Command(friend::FriendCommand::new().to_box()),
	CommonCommandType::Command(togglecommand::ToggleCommandCommand::new().to_box()),
	CommonCommandType::Command(wkblock::WhoKnowsBlockCommand::new().to_box()),
	CommonCommandType::Command(wkwhitelist::WhoKnowsWhitelistCommand::new().to_box()),
	CommonCommandType::Command(index::IndexCommand::new().to_box()),
	CommonCommandType::SubCommand(import::ImportCommand::new().to_box()),
]);

/// Names directly under `/fm`.
pub fn command_names() -> Vec<String> {
	COMMANDS.iter().map(|c| c.get_name()).collect()
}

fn root_name(path: &str) -> &str {
	path.split(' ').next().unwrap_or(path)
}

fn options_json(args: &[CommandDataOption]) -> Option<String> {
	if args.is_empty() {
		return None;
	}

	serde_json::to_string(args).ok()
}

pub async fn interaction_route(ctx: Context, command: CommandInteraction) {
	debug!("\ncommandID: {}\nname: {}", command.id, command.data.name);

	if command.user.bot {
		return;
	}
	if command.data.name != ROOT_NAME {
		error!("No Exist Command! {}", command.data.name);
		return;
	}
	let Some(resolved) = command.data.options.first().and_then(|option| resolve_in(&COMMANDS, option)) else {
		error!("No Exist Command!");
		return;
	};

	let services = match client::services().await {
		Ok(services) => services,
		Err(e) => {
			error!("{:?}", e);
			return;
		},
	};

	if let Err(e) = run(&ctx, &command, resolved, services).await {
		error!("Routing of {} failed: {:?}", command.id, e);
	}
}

struct CommandContext {
	user: Option<User>,
	guild: Option<Guild>,
	channel_disabled: Vec<String>,
}

async fn load_context(services: &Services, command: &CommandInteraction) -> BotResult<CommandContext> {
	let user = services.users.get_user(command.user.id.get()).await?;
	let guild = match command.guild_id {
		Some(guild_id) => Some(services.guilds.get_or_create_guild(guild_id.get(), None).await?),
		None => None,
	};
	let channel_disabled = services.guilds.channel_disabled_commands(command.channel_id.get()).await?;

	Ok(CommandContext { user, guild, channel_disabled })
}

fn failure_message(reference: &str) -> String {
	format!("Something went wrong while running this command. Reference: `{}`", reference)
}

/// Answers with the generic failure embed and returns the error reference shown to the user.
async fn report_failure(ctx: &Context, command: &CommandInteraction, path: &str) -> String {
	let reference = command.id.get().to_string();
	let embed = reply::embed(path, failure_message(&reference), color::failed_color());
	if let Err(e) = reply::send_or_edit_embed(ctx, command, embed).await {
		error!("{:?}", e);
	}

	reference
}

async fn record_failure(tracker: &InteractionTracker, interaction_id: u64, reference: String) {
	tracker.set_response(interaction_id, CommandResponse::Error).await;
	tracker.set_error_reference(interaction_id, reference).await;
	tracker.complete(interaction_id).await;
}

async fn run(ctx: &Context, command: &CommandInteraction, resolved: ResolvedCommand<'_>, services: Services) -> BotResult<()> {
	let interaction_id = command.id.get();
	let discord_user_id = command.user.id.get();
	services.tracker.track(interaction_id, discord_user_id).await;

	let CommandContext { user, guild, channel_disabled } = match load_context(&services, command).await {
		Ok(context) => context,
		Err(e) => {
			error!("Command {} of {} failed before running: {:?}", resolved.path, command.user.id, e);
			let reference = report_failure(ctx, command, &resolved.path).await;
			record_failure(&services.tracker, interaction_id, reference).await;
			return Ok(());
		},
	};
	let guild_disabled = parse_command_list(guild.as_ref().and_then(|g| g.disabled_commands.as_deref()));
	let has_manage_guild = command.member
		.as_ref()
		.and_then(|m| m.permissions)
		.map_or(false, |p| p.manage_guild());

	if let Some(user) = &user {
		let users = services.users.clone();
		let record = InteractionRecord {
			interaction_id,
			user_id: user.user_id,
			command_name: resolved.path.clone(),
			command_options: options_json(&resolved.args),
			discord_guild_id: command.guild_id.map(|g| g.get()),
			discord_channel_id: Some(command.channel_id.get()),
			interaction_type: if command.guild_id.is_some() { InteractionType::SlashCommandGuild } else { InteractionType::SlashCommandUser },
		};
		tokio::spawn(async move {
			if let Err(e) = users.add_user_interaction(record).await {
				warn!("Storing interaction {} failed: {:?}", interaction_id, e);
			}
		});
	}

	let requirements = resolved.command.requirements();
	let guard_input = GuardInput {
		requirements,
		command_name: root_name(&resolved.path),
		user: user.as_ref(),
		in_guild: guild.is_some(),
		guild_disabled: &guild_disabled,
		channel_disabled: &channel_disabled,
		has_manage_guild,
		guild_last_indexed: guild.as_ref().and_then(|g| g.last_indexed),
		now: Utc::now(),
	};

	let response = match guard::check(&guard_input) {
		Err(rejection) => {
			info!("{} rejected for {}: {:?}", resolved.path, discord_user_id, rejection.response);
			if let Err(e) = reply::send_embed(ctx, command, reply::embed(resolved.path.as_str(), rejection.message, color::warning_color()), true).await {
				error!("{:?}", e);
			}
			rejection.response
		},
		Ok(()) => {
			let invocation = Invocation { services: services.clone(), user, guild };
			execute(ctx, command, resolved, &invocation).await
		},
	};

	services.tracker.set_response(interaction_id, response).await;
	if let Ok(message) = command.get_response(&ctx.http).await {
		services.tracker.set_response_message(interaction_id, message.id.get()).await;
	}
	services.tracker.complete(interaction_id).await;

	services.users.update_user_last_used(discord_user_id).await?;

	Ok(())
}

async fn execute(ctx: &Context, command: &CommandInteraction, resolved: ResolvedCommand<'_>, invocation: &Invocation) -> CommandResponse {
	let path = resolved.path;

	match resolved.command.execute(ctx, command, resolved.args, invocation).await {
		Ok(response) => response,
		Err(BotError::Validation(message)) => {
			if let Err(e) = reply::send_or_edit_embed(ctx, command, reply::embed(path.as_str(), message, color::warning_color())).await {
				error!("{:?}", e);
			}
			CommandResponse::WrongInput
		},
		Err(e) => {
			error!("Command {} of {} failed: {:?}", path, command.user.id, e);
			let reference = report_failure(ctx, command, &path).await;
			invocation.services.tracker.set_error_reference(command.id.get(), reference).await;
			CommandResponse::Error
		},
	}
}

fn root_command_build(command: CreateCommand) -> CreateCommand {
	COMMANDS.iter().fold(
		command
			.name(ROOT_NAME)
			.description("Last.fm in Discord"),
		|command, sub| command.add_option(sub.build_command_option())
	)
}

pub fn app_commands_build() -> CreateCommand {
	root_command_build(CreateCommand::new(ROOT_NAME))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn every_root_name_is_unique() {
		let mut names = command_names();
		let count = names.len();
		names.sort();
		names.dedup();

		assert_eq!(names.len(), count);
		assert!(names.contains(&"import".to_string()));
		assert!(names.contains(&"whoknows".to_string()));
	}

	#[tokio::test]
	async fn failures_before_running_complete_as_errors() {
		let tracker = InteractionTracker::new(std::time::Duration::from_secs(60), 10);
		tracker.track(7, 42).await;

		record_failure(&tracker, 7, "7".to_string()).await;

		let tracked = tracker.get(7).await.unwrap();
		assert!(tracked.completed);
		assert_eq!(tracked.outcome.response, CommandResponse::Error);
		assert_eq!(tracked.outcome.error_reference.as_deref(), Some("7"));
		assert!(failure_message("7").ends_with("Reference: `7`"));
	}

	#[test]
	fn group_paths_map_to_their_root() {
		assert_eq!(root_name("import spotify"), "import");
		assert_eq!(root_name("np"), "np");
	}
}
