use log::error;
use serenity::all::{CommandDataOption, CommandInteraction};
use serenity::async_trait;
use serenity::client::Context;
use entity::enums::CommandResponse;
use crate::command_define::{BaseCommand, Command, Invocation};
use crate::commands::reply;
use crate::errors::BotResult;
use crate::utils::color;
use crate::STATIC_COMPONENTS;

pub struct PingCommand;

impl BaseCommand for PingCommand {
	fn new() -> Self {
		Self {}
	}

	fn get_name(&self) -> String {
		"ping".to_string()
	}

	fn get_description(&self) -> String {
		"Shows the bot's response time".to_string()
	}
}

impl PingCommand {
	async fn get_ping(&self, ctx: &Context, command: &CommandInteraction) -> i64 {
		match command.get_response(&ctx.http).await {
			Ok(command_res) => {
				command_res.timestamp.timestamp_millis() - command.id.created_at().timestamp_millis()
			},
			Err(error) => {
				error!("{}", error);
				-1
			}
		}
	}

	async fn get_gateway_latency(&self, ctx: &Context) -> Option<u128> {
		let lsc = STATIC_COMPONENTS.lock().await;
		let shard_manager = lsc.get_sm().ok().cloned();
		std::mem::drop(lsc);

		let runners = shard_manager?.runners.clone();
		let runners = runners.lock().await;
		runners.get(&ctx.shard_id)?.latency.map(|latency| latency.as_millis())
	}
}

#[async_trait]
impl Command for PingCommand {
	async fn execute(&self, ctx: &Context, command: &CommandInteraction, _args: Vec<CommandDataOption>, _invocation: &Invocation) -> BotResult<CommandResponse> {
		reply::defer(ctx, command).await?;

		let ping = self.get_ping(ctx, command).await;
		let gateway = match self.get_gateway_latency(ctx).await {
			Some(latency) => format!("{}ms", latency),
			None => "unknown".to_string(),
		};

		reply::edit_embed(ctx, command, reply::embed(
			"Pong",
			format!("Response: {}ms\nGateway: {}", ping, gateway),
			color::normal_color(),
		)).await?;

		Ok(CommandResponse::Ok)
	}
}
