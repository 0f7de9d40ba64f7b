use log::debug;
use serenity::all::Interaction;
use serenity::client::Context;
use crate::commands;

pub async fn execute(ctx: Context, interaction: Interaction) {
	if let Interaction::Command(command) = interaction {
		commands::interaction_route(ctx, command).await;
	}
	else {
		debug!("Ignored interaction {:?}", interaction.id());
	}
}
