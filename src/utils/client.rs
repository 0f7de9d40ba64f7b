use std::sync::Arc;
use serenity::gateway::ShardManager;
use crate::errors::{BotError, BotResult};
use crate::services::Services;
use crate::STATIC_COMPONENTS;

pub struct Components {
	services: Option<Services>,
	shard_manager: Option<Arc<ShardManager>>,
}

impl Components {
	pub fn new() -> Components {
		Components {
			services: None,
			shard_manager: None,
		}
	}

	pub fn sets(&mut self, services: Services) {
		self.services = Some(services);
	}

	pub fn set_shard_manager(&mut self, shard_manager: Arc<ShardManager>) {
		self.shard_manager = Some(shard_manager);
	}

	pub fn get_services(&self) -> BotResult<&Services> {
		self.services.as_ref().ok_or(BotError::Uninitialized("services"))
	}

	pub fn get_sm(&self) -> BotResult<&Arc<ShardManager>> {
		self.shard_manager.as_ref().ok_or(BotError::Uninitialized("shard manager"))
	}
}

/// Clones the services out of the global holder so the lock is not held across awaits.
pub async fn services() -> BotResult<Services> {
	let lsc = STATIC_COMPONENTS.lock().await;
	let services = lsc.get_services().cloned();
	std::mem::drop(lsc);
	services
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_components_report_what_is_missing() {
		let components = Components::new();

		assert!(matches!(components.get_services(), Err(BotError::Uninitialized("services"))));
		assert!(matches!(components.get_sm(), Err(BotError::Uninitialized("shard manager"))));
	}
}
