use serenity::{
	all::{
		AttachmentId, CommandDataOption, CommandDataOptionValue, CommandInteraction, CommandOptionType, Context,
		CreateCommandOption, RoleId, UserId,
	},
	async_trait,
};
use entity::enums::CommandResponse;
use entity::{Guild, User};
use crate::errors::{BotError, BotResult};
use crate::services::Services;

pub trait BuildCommandOption {
	fn build_command_option(&self) -> CreateCommandOption;
}

impl BuildCommandOption for CommonCommandType {
	fn build_command_option(&self) -> CreateCommandOption {
		match self {
			CommonCommandType::Command(command) => command.command_build(),
			CommonCommandType::SubCommand(sub_command) => sub_command.command_build(),
		}
	}
}

pub trait BaseCommand {
	fn new() -> Self
	where
		Self: Sized;

	fn get_name(&self) -> String;
	fn get_description(&self) -> String;

	fn to_box(self) -> Box<Self>
	where
		Self: Sized, {
		Box::new(self)
	}
}

/// What must hold before a command body runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandRequirements {
	pub username_required: bool,
	pub session_required: bool,
	pub guild_only: bool,
	pub requires_index: bool,
	pub manage_guild: bool,
}

/// Per call state handed to every command body.
pub struct Invocation {
	pub services: Services,
	pub user: Option<User>,
	pub guild: Option<Guild>,
}

impl Invocation {
	pub fn require_user(&self) -> BotResult<&User> {
		self.user.as_ref().ok_or_else(|| BotError::Validation("no Last.fm account is connected".to_string()))
	}

	pub fn require_guild(&self) -> BotResult<&Guild> {
		self.guild.as_ref().ok_or_else(|| BotError::Validation("command used outside of a server".to_string()))
	}
}

/// name, description, type, required
pub type ArgParam = (&'static str, &'static str, CommandOptionType, bool);

const PARAMS: [ArgParam; 0] = [];

#[async_trait]
pub trait Command: BaseCommand {
	fn args_param(&self) -> &'static [ArgParam] {
		&PARAMS
	}

	/// Fixed string choices for the argument `name`, as (label, value).
	fn arg_choices(&self, _name: &str) -> &'static [(&'static str, &'static str)] {
		&[]
	}

	fn requirements(&self) -> CommandRequirements {
		CommandRequirements::default()
	}

	fn build_args(&self, option: CreateCommandOption) -> CreateCommandOption {
		let mut option = option;

		for (name, desc, option_type, req) in self.args_param() {
			let mut arg = CreateCommandOption::new(*option_type, *name, *desc).required(*req);
			for (label, value) in self.arg_choices(name) {
				arg = arg.add_string_choice(*label, *value);
			}
			option = option.add_sub_option(arg);
		}

		option
	}

	async fn execute(
		&self,
		ctx: &Context,
		command: &CommandInteraction,
		args: Vec<CommandDataOption>,
		invocation: &Invocation,
	) -> BotResult<CommandResponse>;

	fn command_build(&self) -> CreateCommandOption {
		let res = CreateCommandOption::new(CommandOptionType::SubCommand, self.get_name(), self.get_description());

		self.build_args(res)
	}
}

/// A leaf command found for an invocation, with its arguments and full name (`import spotify`).
pub struct ResolvedCommand<'a> {
	pub command: &'a (dyn Command + Sync + Send),
	pub args: Vec<CommandDataOption>,
	pub path: String,
}

pub fn resolve_in<'a>(commands: &'a [CommonCommandType], option: &CommandDataOption) -> Option<ResolvedCommand<'a>> {
	match &option.value {
		CommandDataOptionValue::SubCommand(args) => {
			commands.iter().find_map(|cmd| match cmd {
				CommonCommandType::Command(cmd) if cmd.get_name() == option.name => Some(ResolvedCommand {
					command: cmd.as_ref(),
					args: args.clone(),
					path: option.name.clone(),
				}),
				_ => None,
			})
		},
		CommandDataOptionValue::SubCommandGroup(options) => {
			let inner = options.first()?;
			commands.iter().find_map(|cmd| match cmd {
				CommonCommandType::SubCommand(cmd) if cmd.get_name() == option.name => {
					cmd.resolve(inner).map(|resolved| ResolvedCommand {
						path: format!("{} {}", option.name, resolved.path),
						..resolved
					})
				},
				_ => None,
			})
		},
		_ => None,
	}
}

#[async_trait]
pub trait SubCommand: BaseCommand {
	fn get_sub_commands(&self) -> &Vec<CommonCommandType>;
	fn make_sub_commands_option(&self) -> Vec<CreateCommandOption> {
		let mut res = vec![];

		for cmd in self.get_sub_commands() {
			res.push(cmd.build_command_option());
		}

		res
	}

	fn resolve(&self, sub_command: &CommandDataOption) -> Option<ResolvedCommand<'_>> {
		resolve_in(self.get_sub_commands(), sub_command)
	}

	fn command_build(&self) -> CreateCommandOption {
		let mut co = CreateCommandOption::new(
			CommandOptionType::SubCommandGroup,
			self.get_name(),
			self.get_description(),
		);

		for sub_command in self.make_sub_commands_option() {
			co = co.add_sub_option(sub_command);
		}

		co
	}
}

pub enum CommonCommandType {
	Command(Box<dyn Command + Sync + Send>),
	SubCommand(Box<dyn SubCommand + Sync + Send>),
}

impl CommonCommandType {
	pub fn get_name(&self) -> String {
		match self {
			CommonCommandType::Command(cmd) => cmd.get_name(),
			CommonCommandType::SubCommand(cmd) => cmd.get_name(),
		}
	}
}

impl Into<CommonCommandType> for Box<dyn SubCommand + Sync + Send> {
	fn into(self) -> CommonCommandType {
		CommonCommandType::SubCommand(self)
	}
}

impl Into<CommonCommandType> for Box<dyn Command + Sync + Send> {
	fn into(self) -> CommonCommandType {
		CommonCommandType::Command(self)
	}
}

fn find_arg<'a>(args: &'a [CommandDataOption], name: &str) -> Option<&'a CommandDataOptionValue> {
	args.iter().find(|arg| arg.name == name).map(|arg| &arg.value)
}

pub fn string_arg(args: &[CommandDataOption], name: &str) -> Option<String> {
	find_arg(args, name).and_then(|value| value.as_str()).map(|value| value.to_string())
}

pub fn user_arg(args: &[CommandDataOption], name: &str) -> Option<UserId> {
	find_arg(args, name).and_then(|value| value.as_user_id())
}

pub fn role_arg(args: &[CommandDataOption], name: &str) -> Option<RoleId> {
	find_arg(args, name).and_then(|value| value.as_role_id())
}

pub fn attachment_arg(args: &[CommandDataOption], name: &str) -> Option<AttachmentId> {
	find_arg(args, name).and_then(|value| value.as_attachment_id())
}

#[cfg(test)]
mod tests {
	use super::*;

	struct Echo;

	impl BaseCommand for Echo {
		fn new() -> Self {
			Self
		}

		fn get_name(&self) -> String {
			"echo".to_string()
		}

		fn get_description(&self) -> String {
			"echo".to_string()
		}
	}

	#[async_trait]
	impl Command for Echo {
		async fn execute(&self, _: &Context, _: &CommandInteraction, _: Vec<CommandDataOption>, _: &Invocation) -> BotResult<CommandResponse> {
			Ok(CommandResponse::Ok)
		}
	}

	struct Group {
		commands: Vec<CommonCommandType>,
	}

	impl BaseCommand for Group {
		fn new() -> Self {
			Self { commands: vec![CommonCommandType::Command(Echo::new().to_box())] }
		}

		fn get_name(&self) -> String {
			"group".to_string()
		}

		fn get_description(&self) -> String {
			"group".to_string()
		}
	}

	impl SubCommand for Group {
		fn get_sub_commands(&self) -> &Vec<CommonCommandType> {
			&self.commands
		}
	}

	fn commands() -> Vec<CommonCommandType> {
		vec![
			CommonCommandType::Command(Echo::new().to_box()),
			CommonCommandType::SubCommand(Group::new().to_box()),
		]
	}

	fn option(json: serde_json::Value) -> CommandDataOption {
		serde_json::from_value(json).unwrap()
	}

	#[test]
	fn leaf_commands_resolve_with_args() {
		let commands = commands();
		let invoked = option(serde_json::json!({
			"name": "echo",
			"type": 1,
			"options": [{ "name": "artist", "type": 3, "value": "Low" }]
		}));

		let resolved = resolve_in(&commands, &invoked).unwrap();

		assert_eq!(resolved.path, "echo");
		assert_eq!(string_arg(&resolved.args, "artist").as_deref(), Some("Low"));
		assert!(string_arg(&resolved.args, "album").is_none());
	}

	#[test]
	fn groups_resolve_to_their_leaf() {
		let commands = commands();
		let invoked = option(serde_json::json!({
			"name": "group",
			"type": 2,
			"options": [{ "name": "echo", "type": 1, "options": [] }]
		}));

		let resolved = resolve_in(&commands, &invoked).unwrap();

		assert_eq!(resolved.path, "group echo");
		assert_eq!(resolved.command.get_name(), "echo");
	}

	#[test]
	fn unknown_names_do_not_resolve() {
		let commands = commands();
		let invoked = option(serde_json::json!({ "name": "missing", "type": 1, "options": [] }));

		assert!(resolve_in(&commands, &invoked).is_none());
	}

	#[test]
	fn default_requirements_allow_everything() {
		assert_eq!(Echo::new().requirements(), CommandRequirements::default());
		assert!(!CommandRequirements::default().username_required);
	}
}
