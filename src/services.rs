pub mod guild;
pub mod interactions;
pub mod play;
pub mod user;
pub mod who_knows;

use std::sync::Arc;
use sea_orm::DatabaseConnection;
use crate::configs::ConfigData;
use crate::data_source::DataSourceFactory;
use crate::lastfm::LiveHistory;
use self::guild::GuildService;
use self::interactions::InteractionTracker;
use self::play::PlayService;
use self::user::{UserCache, UserService};
use self::who_knows::WhoKnowsService;

/// Everything a command needs, cheap to clone per invocation.
#[derive(Clone)]
pub struct Services {
	pub users: UserService,
	pub guilds: GuildService,
	pub plays: PlayService,
	pub who_knows: WhoKnowsService,
	pub data_source: DataSourceFactory,
	pub tracker: InteractionTracker,
	pub live: Arc<dyn LiveHistory>,
}

impl Services {
	pub fn new(db: DatabaseConnection, config: &ConfigData, live: Arc<dyn LiveHistory>) -> Self {
		let tracker = InteractionTracker::new(config.get_interaction_ttl(), config.get_interaction_capacity());
		let plays = PlayService::new(db.clone());

		Self {
			users: UserService::new(
				db.clone(),
				UserCache::new(config.get_user_cache_ttl(), config.get_user_cache_capacity()),
				tracker.clone(),
				config.get_interaction_wait(),
			),
			guilds: GuildService::new(db.clone()),
			who_knows: WhoKnowsService::new(db.clone(), config.get_who_knows_resolve_limit()),
			data_source: DataSourceFactory::new(db, live.clone(), Arc::new(plays.clone())),
			plays,
			tracker,
			live,
		}
	}
}
