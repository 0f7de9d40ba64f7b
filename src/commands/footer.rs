use serenity::all::{CommandDataOption, CommandInteraction, CommandOptionType};
use serenity::async_trait;
use serenity::client::Context;
use entity::enums::CommandResponse;
use crate::command_define::{string_arg, ArgParam, BaseCommand, Command, CommandRequirements, Invocation};
use crate::commands::reply;
use crate::errors::BotResult;
use crate::services::user::FooterOption;
use crate::utils::color;

pub struct FooterCommand;

const PARAMS: [ArgParam; 1] = [
	("option", "The footer line to show or hide", CommandOptionType::String, true),
];

const OPTIONS: [(&str, &str); 8] = [
	("Total scrobbles", "total-scrobbles"),
	("Artist plays", "artist-plays"),
	("Album plays", "album-plays"),
	("Track plays", "track-plays"),
	("Server artist rank", "server-artist-rank"),
	("Server artist listeners", "server-artist-listeners"),
	("Global artist rank", "global-artist-rank"),
	("Server track plays this week", "server-track-week-plays"),
];

impl BaseCommand for FooterCommand {
	fn new() -> Self {
		Self {}
	}

	fn get_name(&self) -> String {
		"footer".to_string()
	}

	fn get_description(&self) -> String {
		"Toggles a line in the footer of your now playing embed".to_string()
	}
}

/// Flips `option` in the list, keeping the canonical order.
fn toggle(current: &[FooterOption], option: FooterOption) -> Vec<FooterOption> {
	let mut options: Vec<FooterOption> = current.iter().copied().filter(|o| *o != option).collect();
	if !current.contains(&option) {
		options.push(option);
	}

	FooterOption::from_mask(FooterOption::to_mask(&options))
}

fn label(option: FooterOption) -> &'static str {
	OPTIONS
		.iter()
		.find(|(_, key)| *key == option.key())
		.map_or(option.key(), |(label, _)| *label)
}

#[async_trait]
impl Command for FooterCommand {
	fn args_param(&self) -> &'static [ArgParam] {
		&PARAMS
	}

	fn arg_choices(&self, name: &str) -> &'static [(&'static str, &'static str)] {
		match name {
			"option" => &OPTIONS,
			_ => &[],
		}
	}

	fn requirements(&self) -> CommandRequirements {
		CommandRequirements { username_required: true, ..Default::default() }
	}

	async fn execute(&self, ctx: &Context, command: &CommandInteraction, args: Vec<CommandDataOption>, invocation: &Invocation) -> BotResult<CommandResponse> {
		let user = invocation.require_user()?;
		let Some(option) = string_arg(&args, "option").as_deref().and_then(FooterOption::from_key) else {
			reply::send_embed(ctx, command, reply::embed("Footer", "Unknown footer option.", color::failed_color()), true).await?;
			return Ok(CommandResponse::WrongInput);
		};

		let options = toggle(&FooterOption::from_mask(user.fm_footer_options), option);
		invocation.services.users.set_footer_options(user.user_id, &options).await?;

		let enabled = if options.is_empty() {
			"None".to_string()
		}
		else {
			options.iter().map(|o| format!("- {}", label(*o))).collect::<Vec<_>>().join("\n")
		};
		let state = if options.contains(&option) { "enabled" } else { "disabled" };

		reply::send_embed(ctx, command, reply::embed(
			"Footer options",
			format!("**{}** {}.\n\nCurrently shown:\n{}", label(option), state, enabled),
			color::success_color(),
		), true).await?;

		Ok(CommandResponse::Ok)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn every_choice_is_a_footer_option() {
		for (_, key) in OPTIONS {
			assert!(FooterOption::from_key(key).is_some());
		}
	}

	#[test]
	fn toggling_adds_and_removes() {
		let current = vec![FooterOption::TotalScrobbles, FooterOption::TrackPlays];

		assert_eq!(
			toggle(&current, FooterOption::ArtistPlays),
			vec![FooterOption::TotalScrobbles, FooterOption::ArtistPlays, FooterOption::TrackPlays]
		);
		assert_eq!(toggle(&current, FooterOption::TrackPlays), vec![FooterOption::TotalScrobbles]);
	}
}
