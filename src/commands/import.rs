use crate::command_define::{BaseCommand, CommonCommandType, SubCommand};

pub mod delete;
pub mod spotify;
pub mod summary;

pub struct ImportCommand {
	commands: Vec<CommonCommandType>,
}

impl BaseCommand for ImportCommand {
	fn new() -> Self {
		Self {
			commands: vec![
				CommonCommandType::Command(spotify::SpotifyImportCommand::new().to_box()),
				CommonCommandType::Command(summary::ImportSummaryCommand::new().to_box()),
				CommonCommandType::Command(delete::DeleteImportCommand::new().to_box()),
			],
		}
	}

	fn get_name(&self) -> String {
		"import".to_string()
	}

	fn get_description(&self) -> String {
		"Manages plays imported from other services".to_string()
	}
}

impl SubCommand for ImportCommand {
	fn get_sub_commands(&self) -> &Vec<CommonCommandType> {
		&self.commands
	}
}
