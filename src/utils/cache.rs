use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;
use tokio::time::Instant;

struct CacheEntry<V> {
	inserted: Instant,
	value: V,
}

/// Bounded map whose entries expire a fixed time after insertion.
pub struct TtlCache<K, V> {
	entries: HashMap<K, CacheEntry<V>>,
	ttl: Duration,
	capacity: usize,
}

impl<K: Eq + Hash + Clone, V: Clone> TtlCache<K, V> {
	pub fn new(ttl: Duration, capacity: usize) -> Self {
		Self {
			entries: HashMap::new(),
			ttl,
			capacity: capacity.max(1),
		}
	}

	pub fn get(&mut self, key: &K) -> Option<V> {
		let expired = match self.entries.get(key) {
			None => return None,
			Some(entry) => entry.inserted.elapsed() >= self.ttl,
		};

		if expired {
			self.entries.remove(key);
			return None;
		}

		self.entries.get(key).map(|entry| entry.value.clone())
	}

	pub fn insert(&mut self, key: K, value: V) {
		if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
			self.purge_expired();
			if self.entries.len() >= self.capacity {
				self.evict_oldest();
			}
		}

		self.entries.insert(key, CacheEntry { inserted: Instant::now(), value });
	}

	pub fn remove(&mut self, key: &K) -> Option<V> {
		self.entries.remove(key).map(|entry| entry.value)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn purge_expired(&mut self) {
		let ttl = self.ttl;
		self.entries.retain(|_, entry| entry.inserted.elapsed() < ttl);
	}

	fn evict_oldest(&mut self) {
		let oldest = self.entries
			.iter()
			.min_by_key(|(_, entry)| entry.inserted)
			.map(|(key, _)| key.clone());

		if let Some(key) = oldest {
			self.entries.remove(&key);
		}
	}
}
