use serenity::all::{CommandInteraction, CreateInteractionResponse};
use serenity::builder::{CreateEmbed, CreateInteractionResponseMessage, EditInteractionResponse};
use serenity::client::Context;
use serenity::model::colour::Color;

pub fn embed(title: impl Into<String>, description: impl Into<String>, color: Color) -> CreateEmbed {
	CreateEmbed::new()
		.title(title)
		.description(description)
		.color(color)
}

pub async fn defer(ctx: &Context, command: &CommandInteraction) -> serenity::Result<()> {
	command.create_response(&ctx.http,
		CreateInteractionResponse::Defer(CreateInteractionResponseMessage::new())
	).await
}

pub async fn send_embed(ctx: &Context, command: &CommandInteraction, embed: CreateEmbed, ephemeral: bool) -> serenity::Result<()> {
	command.create_response(&ctx.http,
		CreateInteractionResponse::Message(
			CreateInteractionResponseMessage::new()
				.add_embed(embed)
				.ephemeral(ephemeral)
		)
	).await
}

pub async fn edit_embed(ctx: &Context, command: &CommandInteraction, embed: CreateEmbed) -> serenity::Result<()> {
	command.edit_response(&ctx.http, EditInteractionResponse::new().add_embed(embed)).await?;

	Ok(())
}

/// Answers whether or not the command already responded or deferred.
pub async fn send_or_edit_embed(ctx: &Context, command: &CommandInteraction, embed: CreateEmbed) -> serenity::Result<()> {
	if send_embed(ctx, command, embed.clone(), true).await.is_err() {
		edit_embed(ctx, command, embed).await?;
	}

	Ok(())
}

pub async fn edit_text(ctx: &Context, command: &CommandInteraction, content: String) -> serenity::Result<()> {
	command.edit_response(&ctx.http, EditInteractionResponse::new().content(content)).await?;

	Ok(())
}
