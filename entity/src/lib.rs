pub mod enums;

pub mod channels;
pub mod featured_logs;
pub mod friends;
pub mod guild_blocked_users;
pub mod guild_users;
pub mod guilds;
pub mod user_albums;
pub mod user_artists;
pub mod user_interactions;
pub mod user_plays;
pub mod user_tracks;
pub mod users;

pub type Channel = channels::Model;
pub type ChannelBehavior = channels::Entity;

pub type FeaturedLog = featured_logs::Model;
pub type FeaturedLogBehavior = featured_logs::Entity;

pub type Friend = friends::Model;
pub type FriendBehavior = friends::Entity;

pub type GuildBlockedUser = guild_blocked_users::Model;
pub type GuildBlockedUserBehavior = guild_blocked_users::Entity;

pub type GuildUser = guild_users::Model;
pub type GuildUserBehavior = guild_users::Entity;

pub type Guild = guilds::Model;
pub type GuildBehavior = guilds::Entity;

pub type UserAlbum = user_albums::Model;
pub type UserAlbumBehavior = user_albums::Entity;

pub type UserArtist = user_artists::Model;
pub type UserArtistBehavior = user_artists::Entity;

pub type UserInteraction = user_interactions::Model;
pub type UserInteractionBehavior = user_interactions::Entity;

pub type UserPlay = user_plays::Model;
pub type UserPlayBehavior = user_plays::Entity;

pub type UserTrack = user_tracks::Model;
pub type UserTrackBehavior = user_tracks::Entity;

pub type User = users::Model;
pub type UserBehavior = users::Entity;
