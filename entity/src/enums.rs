use std::fmt::Display;
use sea_orm::entity::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum PlaySource {
	#[sea_orm(num_value = 0)]
	LastFm,
	#[sea_orm(num_value = 1)]
	SpotifyImport,
	#[sea_orm(num_value = 2)]
	AppleMusicImport,
}

impl PlaySource {
	pub fn is_import(&self) -> bool {
		!matches!(self, PlaySource::LastFm)
	}
}

impl Display for PlaySource {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", match self {
			PlaySource::LastFm => "Last.fm",
			PlaySource::SpotifyImport => "Spotify",
			PlaySource::AppleMusicImport => "Apple Music",
		})
	}
}

/// How imported plays are combined with Last.fm scrobbles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum DataSource {
	#[sea_orm(num_value = 1)]
	LastFm,
	#[sea_orm(num_value = 2)]
	FullImportThenLastFm,
	#[sea_orm(num_value = 3)]
	ImportThenFullLastFm,
}

impl Display for DataSource {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", match self {
			DataSource::LastFm => "Last.fm",
			DataSource::FullImportThenLastFm => "Full imports, then Last.fm",
			DataSource::ImportThenFullLastFm => "Imports until full Last.fm",
		})
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum PrivacyLevel {
	#[sea_orm(num_value = 1)]
	Server,
	#[sea_orm(num_value = 2)]
	Global,
}

impl Display for PrivacyLevel {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", match self {
			PrivacyLevel::Server => "Server",
			PrivacyLevel::Global => "Global",
		})
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum UserType {
	#[sea_orm(num_value = 1)]
	User,
	#[sea_orm(num_value = 2)]
	Supporter,
	#[sea_orm(num_value = 3)]
	Contributor,
	#[sea_orm(num_value = 4)]
	Admin,
	#[sea_orm(num_value = 5)]
	Owner,
}

impl UserType {
	pub fn icon(&self) -> &'static str {
		match self {
			UserType::User => "",
			UserType::Supporter => " ⭐",
			UserType::Contributor => " 🔥",
			UserType::Admin => " 🛡️",
			UserType::Owner => " 👑",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum FmEmbedType {
	#[sea_orm(num_value = 1)]
	EmbedMini,
	#[sea_orm(num_value = 2)]
	EmbedFull,
	#[sea_orm(num_value = 3)]
	TextMini,
	#[sea_orm(num_value = 4)]
	TextFull,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum CommandResponse {
	#[sea_orm(num_value = 1)]
	Ok,
	#[sea_orm(num_value = 2)]
	Help,
	#[sea_orm(num_value = 3)]
	WrongInput,
	#[sea_orm(num_value = 4)]
	NotFound,
	#[sea_orm(num_value = 5)]
	UsernameNotSet,
	#[sea_orm(num_value = 6)]
	SessionRequired,
	#[sea_orm(num_value = 7)]
	NotSupportedInDm,
	#[sea_orm(num_value = 8)]
	IndexRequired,
	#[sea_orm(num_value = 9)]
	NoPermission,
	#[sea_orm(num_value = 10)]
	Disabled,
	#[sea_orm(num_value = 11)]
	UserBlocked,
	#[sea_orm(num_value = 12)]
	SupporterRequired,
	#[sea_orm(num_value = 13)]
	Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum InteractionType {
	#[sea_orm(num_value = 1)]
	TextCommand,
	#[sea_orm(num_value = 2)]
	SlashCommandGuild,
	#[sea_orm(num_value = 3)]
	SlashCommandUser,
}
