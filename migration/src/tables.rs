use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
pub enum Users {
	Table,

	// Column
	UserId,
	DiscordUserId,
	UserNameLastFm,
	SessionKeyLastFm,
	UserType,
	DataSource,
	PrivacyLevel,
	FmEmbedType,
	FmFooterOptions,
	TimeZone,
	Blocked,
	MusicBotTrackingDisabled,
	RegisteredLastFm,
	LastIndexed,
	LastUsed,
}

#[derive(DeriveIden)]
pub enum UserArtists {
	Table,

	// Column
	UserArtistId,
	UserId,
	Name,
	Playcount,
}

#[derive(DeriveIden)]
pub enum UserAlbums {
	Table,

	// Column
	UserAlbumId,
	UserId,
	Name,
	ArtistName,
	Playcount,
}

#[derive(DeriveIden)]
pub enum UserTracks {
	Table,

	// Column
	UserTrackId,
	UserId,
	Name,
	ArtistName,
	Playcount,
}

#[derive(DeriveIden)]
pub enum UserPlays {
	Table,

	// Column
	UserPlayId,
	UserId,
	TrackName,
	AlbumName,
	ArtistName,
	TimePlayed,
	PlaySource,
}

#[derive(DeriveIden)]
pub enum Guilds {
	Table,

	// Column
	GuildId,
	DiscordGuildId,
	Name,
	LastIndexed,
	DisabledCommands,
	WhoKnowsWhitelistRoleId,
}

#[derive(DeriveIden)]
pub enum GuildUsers {
	Table,

	// Column
	GuildId,
	UserId,
	UserName,
	Bot,
	WhoKnowsWhitelisted,
}

#[derive(DeriveIden)]
pub enum GuildBlockedUsers {
	Table,

	// Column
	GuildId,
	UserId,
	BlockedFromWhoKnows,
}

#[derive(DeriveIden)]
pub enum Channels {
	Table,

	// Column
	ChannelId,
	DiscordChannelId,
	GuildId,
	DisabledCommands,
}

#[derive(DeriveIden)]
pub enum Friends {
	Table,

	// Column
	FriendId,
	UserId,
	FriendUserId,
}

#[derive(DeriveIden)]
pub enum UserInteractions {
	Table,

	// Column
	Id,
	Timestamp,
	UserId,
	CommandName,
	CommandOptions,
	DiscordGuildId,
	DiscordChannelId,
	DiscordId,
	DiscordResponseId,
	Response,
	Type,
	ErrorReferenceId,
	Artist,
	Album,
	Track,
	HintShown,
}

#[derive(DeriveIden)]
pub enum FeaturedLogs {
	Table,

	// Column
	FeaturedLogId,
	UserId,
	Description,
	DateTime,
}
