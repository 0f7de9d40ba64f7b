use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use log::debug;
use tokio::sync::{watch, Mutex};
use tokio::time::Instant;
use entity::enums::CommandResponse;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferencedMusic {
	pub artist: String,
	pub album: Option<String>,
	pub track: Option<String>,
}

/// What a command did, filled in while it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
	pub response: CommandResponse,
	pub referenced: Option<ReferencedMusic>,
	pub response_message_id: Option<u64>,
	pub error_reference: Option<String>,
	pub hint_shown: bool,
}

impl Default for CommandOutcome {
	fn default() -> Self {
		Self {
			response: CommandResponse::Ok,
			referenced: None,
			response_message_id: None,
			error_reference: None,
			hint_shown: false,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedCommand {
	pub discord_user_id: u64,
	pub outcome: CommandOutcome,
	pub completed: bool,
}

struct Entry {
	created: Instant,
	discord_user_id: u64,
	outcome: CommandOutcome,
	done_tx: watch::Sender<bool>,
}

impl Entry {
	fn snapshot(&self) -> TrackedCommand {
		TrackedCommand {
			discord_user_id: self.discord_user_id,
			outcome: self.outcome.clone(),
			completed: *self.done_tx.borrow(),
		}
	}
}

/// Outcomes of recent commands keyed by interaction id.
/// Entries expire after `ttl` and the oldest is evicted once `capacity` is reached.
#[derive(Clone)]
pub struct InteractionTracker {
	entries: Arc<Mutex<HashMap<u64, Entry>>>,
	ttl: Duration,
	capacity: usize,
}

impl InteractionTracker {
	pub fn new(ttl: Duration, capacity: usize) -> Self {
		Self {
			entries: Arc::new(Mutex::new(HashMap::new())),
			ttl,
			capacity: capacity.max(1),
		}
	}

	pub async fn track(&self, interaction_id: u64, discord_user_id: u64) {
		let mut entries = self.entries.lock().await;

		if !entries.contains_key(&interaction_id) && entries.len() >= self.capacity {
			let ttl = self.ttl;
			entries.retain(|_, entry| entry.created.elapsed() < ttl);

			if entries.len() >= self.capacity {
				let oldest = entries.iter().min_by_key(|(_, e)| e.created).map(|(id, _)| *id);
				if let Some(id) = oldest {
					entries.remove(&id);
				}
			}
		}

		let (done_tx, _) = watch::channel(false);
		entries.insert(interaction_id, Entry {
			created: Instant::now(),
			discord_user_id,
			outcome: CommandOutcome::default(),
			done_tx,
		});
	}

	async fn update(&self, interaction_id: u64, f: impl FnOnce(&mut CommandOutcome)) {
		let mut entries = self.entries.lock().await;
		if let Some(entry) = entries.get_mut(&interaction_id) {
			f(&mut entry.outcome);
		}
	}

	pub async fn set_response(&self, interaction_id: u64, response: CommandResponse) {
		self.update(interaction_id, |o| o.response = response).await;
	}

	pub async fn set_referenced_music(&self, interaction_id: u64, music: ReferencedMusic) {
		self.update(interaction_id, |o| o.referenced = Some(music)).await;
	}

	pub async fn set_response_message(&self, interaction_id: u64, message_id: u64) {
		self.update(interaction_id, |o| o.response_message_id = Some(message_id)).await;
	}

	pub async fn set_error_reference(&self, interaction_id: u64, reference: String) {
		self.update(interaction_id, |o| o.error_reference = Some(reference)).await;
	}

	pub async fn mark_hint_shown(&self, interaction_id: u64) {
		self.update(interaction_id, |o| o.hint_shown = true).await;
	}

	pub async fn complete(&self, interaction_id: u64) {
		let entries = self.entries.lock().await;
		if let Some(entry) = entries.get(&interaction_id) {
			entry.done_tx.send_replace(true);
		}
	}

	pub async fn get(&self, interaction_id: u64) -> Option<TrackedCommand> {
		let entries = self.entries.lock().await;
		entries
			.get(&interaction_id)
			.filter(|entry| entry.created.elapsed() < self.ttl)
			.map(Entry::snapshot)
	}

	/// The command whose response is `message_id`, with its interaction id.
	pub async fn find_by_response_message(&self, message_id: u64) -> Option<(u64, TrackedCommand)> {
		let entries = self.entries.lock().await;
		entries
			.iter()
			.filter(|(_, entry)| entry.created.elapsed() < self.ttl)
			.find(|(_, entry)| entry.outcome.response_message_id == Some(message_id))
			.map(|(id, entry)| (*id, entry.snapshot()))
	}

	/// Waits until the command completes or `timeout` passes, then returns what is known.
	pub async fn wait_for_completion(&self, interaction_id: u64, timeout: Duration) -> Option<TrackedCommand> {
		let mut done_rx = {
			let entries = self.entries.lock().await;
			entries.get(&interaction_id)?.done_tx.subscribe()
		};

		let completed = matches!(tokio::time::timeout(timeout, done_rx.wait_for(|done| *done)).await, Ok(Ok(_)));
		if !completed {
			debug!("Interaction {} did not complete within {:?}", interaction_id, timeout);
		}

		self.get(interaction_id).await
	}

	pub async fn len(&self) -> usize {
		self.entries.lock().await.len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn tracker() -> InteractionTracker {
		InteractionTracker::new(Duration::from_secs(60), 3)
	}

	#[tokio::test]
	async fn outcome_is_recorded() {
		let tracker = tracker();
		tracker.track(1, 42).await;
		tracker.set_response(1, CommandResponse::NotFound).await;
		tracker.set_referenced_music(1, ReferencedMusic { artist: "Low".to_string(), album: None, track: Some("Words".to_string()) }).await;
		tracker.set_response_message(1, 500).await;
		tracker.mark_hint_shown(1).await;

		let tracked = tracker.get(1).await.unwrap();

		assert_eq!(tracked.discord_user_id, 42);
		assert_eq!(tracked.outcome.response, CommandResponse::NotFound);
		assert!(tracked.outcome.hint_shown);
		assert!(!tracked.completed);
		assert_eq!(tracker.find_by_response_message(500).await.map(|(id, _)| id), Some(1));
		assert!(tracker.find_by_response_message(501).await.is_none());
	}

	#[tokio::test]
	async fn untracked_ids_are_ignored() {
		let tracker = tracker();
		tracker.set_response(9, CommandResponse::Error).await;
		tracker.complete(9).await;

		assert!(tracker.get(9).await.is_none());
		assert!(tracker.wait_for_completion(9, Duration::from_secs(1)).await.is_none());
	}

	#[tokio::test]
	async fn capacity_evicts_oldest() {
		let tracker = tracker();
		for id in 1..=4 {
			tracker.track(id, id).await;
			tokio::task::yield_now().await;
		}

		assert_eq!(tracker.len().await, 3);
	}

	#[tokio::test(start_paused = true)]
	async fn entries_expire() {
		let tracker = tracker();
		tracker.track(1, 42).await;
		tokio::time::advance(Duration::from_secs(61)).await;

		assert!(tracker.get(1).await.is_none());
	}

	#[tokio::test(start_paused = true)]
	async fn completion_wakes_waiter() {
		let tracker = tracker();
		tracker.track(1, 42).await;

		let waiter = {
			let tracker = tracker.clone();
			tokio::spawn(async move { tracker.wait_for_completion(1, Duration::from_secs(12)).await })
		};

		tokio::time::sleep(Duration::from_secs(1)).await;
		tracker.set_response(1, CommandResponse::WrongInput).await;
		tracker.complete(1).await;

		let tracked = waiter.await.unwrap().unwrap();
		assert!(tracked.completed);
		assert_eq!(tracked.outcome.response, CommandResponse::WrongInput);
	}

	#[tokio::test(start_paused = true)]
	async fn wait_gives_up_after_timeout() {
		let tracker = tracker();
		tracker.track(1, 42).await;

		let started = Instant::now();
		let tracked = tracker.wait_for_completion(1, Duration::from_secs(12)).await.unwrap();

		assert!(!tracked.completed);
		assert!(started.elapsed() >= Duration::from_secs(12));
	}
}
