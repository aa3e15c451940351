use crate::error::ChatResult;
use crate::storage::KeyValueStore;
use crate::types::ThreadId;
use uuid::Uuid;

/// Storage key holding the per-profile thread id.
pub const THREAD_ID_KEY: &str = "thread_id";

/// Hands out the durable conversation id for one profile.
///
/// The id is generated on first use and written once; every later call reads
/// it back unchanged.
pub struct ThreadIdProvider<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> ThreadIdProvider<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    pub fn try_get_or_create(&self) -> ChatResult<ThreadId> {
        if let Some(existing) = self.store.get(THREAD_ID_KEY)? {
            let existing = existing.trim();
            if !existing.is_empty() {
                return Ok(ThreadId::new(existing));
            }
        }

        let fresh = Uuid::new_v4().to_string();
        self.store.set(THREAD_ID_KEY, &fresh)?;
        tracing::info!("created thread id {fresh}");
        Ok(ThreadId::new(fresh))
    }

    /// Like `try_get_or_create`, but a storage failure is logged and reported
    /// as "no id yet" instead of an error.
    pub fn get_or_create(&self) -> Option<ThreadId> {
        match self.try_get_or_create() {
            Ok(id) => Some(id),
            Err(err) => {
                tracing::error!("cannot resolve thread id: {err}");
                None
            }
        }
    }
}

/// Convenience wrapper around [`ThreadIdProvider::get_or_create`].
pub fn get_or_create_thread_id(store: &dyn KeyValueStore) -> Option<ThreadId> {
    ThreadIdProvider::new(store).get_or_create()
}
