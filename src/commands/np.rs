use chrono::Utc;
use log::warn;
use serenity::all::{CommandDataOption, CommandInteraction, CommandOptionType};
use serenity::async_trait;
use serenity::builder::{CreateEmbedAuthor, CreateEmbedFooter};
use serenity::client::Context;
use entity::enums::{CommandResponse, FmEmbedType};
use entity::User;
use crate::command_define::{user_arg, ArgParam, BaseCommand, Command, CommandRequirements, Invocation};
use crate::commands::reply;
use crate::errors::BotResult;
use crate::lastfm::RecentTrack;
use crate::services::interactions::ReferencedMusic;
use crate::services::user::{create_footer, get_user_title, FooterOption};
use crate::services::who_knows::{MusicKey, WhoKnowsScope};
use crate::utils::color;

pub struct NowPlayingCommand;

const PARAMS: [ArgParam; 1] = [
	("user", "Show someone else's track instead", CommandOptionType::User, false),
];

impl BaseCommand for NowPlayingCommand {
	fn new() -> Self {
		Self {}
	}

	fn get_name(&self) -> String {
		"np".to_string()
	}

	fn get_description(&self) -> String {
		"Shows what you're listening to".to_string()
	}
}

/// Values behind the optional footer lines. Only enabled options are filled in.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct FooterStats {
	total_scrobbles: Option<i64>,
	artist_plays: Option<i32>,
	album_plays: Option<i32>,
	track_plays: Option<i32>,
	server_artist_rank: Option<usize>,
	server_artist_listeners: Option<usize>,
	global_artist_rank: Option<usize>,
	server_track_week_plays: Option<u64>,
}

fn footer_lines(options: &[FooterOption], stats: &FooterStats) -> Vec<String> {
	options
		.iter()
		.filter_map(|option| match option {
			FooterOption::TotalScrobbles => stats.total_scrobbles.map(|c| format!("{} total scrobbles", c)),
			FooterOption::ArtistPlays => stats.artist_plays.map(|c| format!("{} artist scrobbles", c)),
			FooterOption::AlbumPlays => stats.album_plays.map(|c| format!("{} album scrobbles", c)),
			FooterOption::TrackPlays => stats.track_plays.map(|c| format!("{} track scrobbles", c)),
			FooterOption::ServerArtistRank => stats.server_artist_rank.map(|r| format!("Server artist rank #{}", r)),
			FooterOption::ServerArtistListeners => stats.server_artist_listeners.map(|c| format!("{} server artist listeners", c)),
			FooterOption::GlobalArtistRank => stats.global_artist_rank.map(|r| format!("Global artist rank #{}", r)),
			FooterOption::ServerTrackWeekPlays => stats.server_track_week_plays.filter(|c| *c > 0).map(|c| format!("{} server plays last week", c)),
		})
		.collect()
}

fn track_line(track: &RecentTrack, markdown_album: bool) -> String {
	let mut line = format!("**{}** by **{}**", track.track_name, track.artist_name);
	if let Some(album) = &track.album_name {
		if markdown_album {
			line.push_str(&format!(" | *{}*", album));
		}
		else {
			line.push_str(&format!(" | {}", album));
		}
	}

	line
}

impl NowPlayingCommand {
	async fn collect_stats(&self, invocation: &Invocation, user: &User, track: &RecentTrack, options: &[FooterOption]) -> BotResult<FooterStats> {
		let services = &invocation.services;
		let mut stats = FooterStats::default();
		let artist_key = MusicKey::artist(&track.artist_name)?;

		if options.contains(&FooterOption::TotalScrobbles) {
			stats.total_scrobbles = services.data_source.user_info(&user.user_name_last_fm).await?.map(|u| u.playcount);
		}
		if options.contains(&FooterOption::ArtistPlays) {
			stats.artist_plays = services.who_knows.play_count_for_user(user.user_id, &artist_key).await?;
		}
		if let (true, Some(album)) = (options.contains(&FooterOption::AlbumPlays), &track.album_name) {
			let key = MusicKey::album(&track.artist_name, album)?;
			stats.album_plays = services.who_knows.play_count_for_user(user.user_id, &key).await?;
		}
		if options.contains(&FooterOption::TrackPlays) {
			let key = MusicKey::track(&track.artist_name, &track.track_name)?;
			stats.track_plays = services.who_knows.play_count_for_user(user.user_id, &key).await?;
		}

		if let Some(guild) = &invocation.guild {
			if options.contains(&FooterOption::ServerArtistRank) || options.contains(&FooterOption::ServerArtistListeners) {
				let entries = services.who_knows.who_knows(WhoKnowsScope::for_guild(guild), &artist_key, None).await?;
				stats.server_artist_rank = entries.iter().position(|e| e.user_id == user.user_id).map(|i| i + 1);
				stats.server_artist_listeners = Some(entries.len());
			}
			if options.contains(&FooterOption::ServerTrackWeekPlays) {
				let user_ids: Vec<i32> = services.guilds.get_guild_users(guild.guild_id).await?
					.into_iter()
					.map(|gu| gu.user_id)
					.collect();
				stats.server_track_week_plays = Some(
					services.who_knows.week_playcount_for_guild(&user_ids, &track.artist_name, &track.track_name, Utc::now()).await?
				);
			}
		}

		if options.contains(&FooterOption::GlobalArtistRank) {
			let entries = services.who_knows.who_knows(WhoKnowsScope::Global, &artist_key, None).await?;
			stats.global_artist_rank = entries.iter().position(|e| e.user_id == user.user_id).map(|i| i + 1);
		}

		Ok(stats)
	}
}

#[async_trait]
impl Command for NowPlayingCommand {
	fn args_param(&self) -> &'static [ArgParam] {
		&PARAMS
	}

	fn requirements(&self) -> CommandRequirements {
		CommandRequirements { username_required: true, ..Default::default() }
	}

	async fn execute(&self, ctx: &Context, command: &CommandInteraction, args: Vec<CommandDataOption>, invocation: &Invocation) -> BotResult<CommandResponse> {
		let services = &invocation.services;

		let user = match user_arg(&args, "user") {
			Some(other) => match services.users.get_user(other.get()).await? {
				Some(user) => user,
				None => {
					reply::send_embed(ctx, command, reply::embed("Now playing", "That user hasn't connected a Last.fm account.", color::failed_color()), true).await?;
					return Ok(CommandResponse::NotFound);
				},
			},
			None => invocation.require_user()?.clone(),
		};

		reply::defer(ctx, command).await?;

		let tracks = services.data_source
			.recent_tracks(&user.user_name_last_fm, 1, user.session_key_last_fm.as_deref())
			.await?;
		let Some(track) = tracks.into_iter().next() else {
			reply::edit_embed(ctx, command, reply::embed(
				"Now playing",
				format!("No scrobbles found for `{}`.", user.user_name_last_fm),
				color::warning_color(),
			)).await?;
			return Ok(CommandResponse::NotFound);
		};

		services.tracker.set_referenced_music(command.id.get(), ReferencedMusic {
			artist: track.artist_name.clone(),
			album: track.album_name.clone(),
			track: Some(track.track_name.clone()),
		}).await;

		let options = FooterOption::from_mask(user.fm_footer_options);
		let stats = match self.collect_stats(invocation, &user, &track, &options).await {
			Ok(stats) => stats,
			Err(error) => {
				warn!("Footer stats failed for {}: {:?}", user.user_name_last_fm, error);
				FooterStats::default()
			},
		};
		let lines = footer_lines(&options, &stats);
		let title = get_user_title(&user.user_name_last_fm, user.user_type);
		let heading = if track.now_playing { "Now playing" } else { "Last played" };

		match user.fm_embed_type {
			FmEmbedType::TextMini | FmEmbedType::TextFull => {
				let mut content = format!("{} - {}\n{}\n", heading, title, track_line(&track, true));
				content.push_str(&create_footer(&lines, None, true));
				reply::edit_text(ctx, command, content).await?;
			},
			FmEmbedType::EmbedMini | FmEmbedType::EmbedFull => {
				let mut embed = reply::embed(heading, track_line(&track, user.fm_embed_type == FmEmbedType::EmbedFull), color::lastfm_color())
					.author(CreateEmbedAuthor::new(title).url(format!("https://www.last.fm/user/{}", user.user_name_last_fm)));
				let footer = create_footer(&lines, None, false);
				if !footer.is_empty() {
					embed = embed.footer(CreateEmbedFooter::new(footer.trim_end()));
				}
				reply::edit_embed(ctx, command, embed).await?;
			},
		}

		Ok(CommandResponse::Ok)
	}
}
