use log::info;
use serenity::all::Interaction;
use serenity::async_trait;
use serenity::client::{Context, EventHandler};
use serenity::model::gateway::Ready;
use serenity::model::guild::Member;
use serenity::model::id::GuildId;
use serenity::model::user::User;
use crate::events::{interaction_event, member_add_event, member_remove_event, ready_event};

pub struct Router;

#[async_trait]
impl EventHandler for Router {
	async fn guild_member_addition(&self, ctx: Context, new_member: Member) {
		member_add_event::execute(ctx, new_member).await;
	}

	async fn guild_member_removal(&self, ctx: Context, guild_id: GuildId, user: User, _member_data_if_available: Option<Member>) {
		member_remove_event::execute(ctx, guild_id, user).await;
	}

	async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
		interaction_event::execute(ctx, interaction).await;
	}

	async fn ready(&self, ctx: Context, data_about_bot: Ready) {
		info!("Ready event start");
		ready_event::execute(ctx, data_about_bot).await;
		info!("Ready event end");
	}
}
