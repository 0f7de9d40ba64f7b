use sea_orm::DbErr;
use thiserror::Error;
use crate::lastfm::LastfmError;

pub type BotResult<T> = Result<T, BotError>;

#[derive(Debug, Error)]
pub enum BotError {
	#[error("Database error: {0}")]
	Database(#[from] DbErr),

	#[error("Last.fm error: {0}")]
	Lastfm(#[from] LastfmError),

	/// Input rejected before any query ran.
	#[error("Invalid input: {0}")]
	Validation(String),

	#[error("User deletion failed at stage `{stage}`: {source}")]
	Deletion {
		stage: &'static str,
		#[source]
		source: DbErr,
	},

	#[error("Discord error: {0}")]
	Discord(#[from] serenity::Error),

	#[error("Components are not initialized: {0}")]
	Uninitialized(&'static str),
}
