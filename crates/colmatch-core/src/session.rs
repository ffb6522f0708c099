//! Named sessions, each with its own matching task.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};

use colmatch_map::{EmbeddingProvider, HashingEmbedder};
use colmatch_model::{MatchError, Result};
use lru::LruCache;
use tracing::info;

use crate::config::MatchingConfig;
use crate::task::{DEFAULT_SESSION, MatchingTask};

/// Shared handle to one session's task. Lock it for every read-modify-write.
pub type SessionHandle = Arc<Mutex<MatchingTask>>;

/// Bounded least-recently-used map of sessions.
///
/// The default session exists from construction, lives outside the LRU and
/// is never evicted; it counts toward `max_sessions`. A newly added session
/// is always kept, even with `max_sessions` of 1.
#[derive(Debug)]
pub struct SessionRegistry {
    config: MatchingConfig,
    provider: Arc<dyn EmbeddingProvider>,
    default: SessionHandle,
    sessions: Mutex<LruCache<String, SessionHandle>>,
}

impl SessionRegistry {
    pub fn new(config: MatchingConfig) -> Result<Self> {
        Self::with_provider(config, Arc::new(HashingEmbedder::default()))
    }

    pub fn with_provider(config: MatchingConfig, provider: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        let default_task = MatchingTask::with_provider(config.clone(), DEFAULT_SESSION, provider.clone())?;
        let capacity =
            NonZeroUsize::new(config.max_sessions.saturating_sub(1)).unwrap_or(NonZeroUsize::MIN);
        Ok(Self {
            config,
            provider,
            default: Arc::new(Mutex::new(default_task)),
            sessions: Mutex::new(LruCache::new(capacity)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, LruCache<String, SessionHandle>>> {
        self.sessions.lock().map_err(|_| MatchError::LockPoisoned)
    }

    /// Returns the named session, creating it when absent. Either way it
    /// becomes the most recently used one.
    pub fn add_session(&self, name: &str) -> Result<SessionHandle> {
        if name == DEFAULT_SESSION {
            return Ok(self.default.clone());
        }
        let mut sessions = self.lock()?;
        if let Some(handle) = sessions.get(name) {
            return Ok(handle.clone());
        }

        let task = MatchingTask::with_provider(self.config.clone(), name, self.provider.clone())?;
        let handle = Arc::new(Mutex::new(task));
        if let Some((evicted, _)) = sessions.push(name.to_string(), handle.clone()) {
            info!(session = %evicted, "evicted least recently used session");
        }
        info!(session = %name, "session created");
        Ok(handle)
    }

    /// Looks a session up without changing its recency.
    pub fn get_session(&self, name: &str) -> Result<Option<SessionHandle>> {
        if name == DEFAULT_SESSION {
            return Ok(Some(self.default.clone()));
        }
        Ok(self.lock()?.peek(name).cloned())
    }

    pub fn default_session(&self) -> Result<SessionHandle> {
        Ok(self.default.clone())
    }

    /// Drops a session. The default session cannot be removed.
    pub fn remove_session(&self, name: &str) -> Result<bool> {
        if name == DEFAULT_SESSION {
            return Ok(false);
        }
        Ok(self.lock()?.pop(name).is_some())
    }

    /// Session names in sorted order, the default one included.
    pub fn active_sessions(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.lock()?.iter().map(|(name, _)| name.clone()).collect();
        names.push(DEFAULT_SESSION.to_string());
        names.sort();
        Ok(names)
    }

    pub fn session_count(&self) -> Result<usize> {
        Ok(self.lock()?.len() + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(max_sessions: usize) -> SessionRegistry {
        SessionRegistry::new(MatchingConfig {
            max_sessions,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn default_session_exists() {
        let registry = registry(10);
        assert_eq!(registry.active_sessions().unwrap(), ["default"]);
        assert!(registry.default_session().is_ok());
        assert!(!registry.remove_session("default").unwrap());
    }

    #[test]
    fn evicts_least_recently_used() {
        let registry = registry(3);
        registry.add_session("a").unwrap();
        registry.add_session("b").unwrap();
        registry.add_session("a").unwrap();
        registry.add_session("c").unwrap();

        let active = registry.active_sessions().unwrap();
        assert_eq!(active, ["a", "c", "default"]);
        assert!(registry.get_session("b").unwrap().is_none());
    }

    #[test]
    fn lookups_do_not_refresh_recency() {
        let registry = registry(3);
        registry.add_session("a").unwrap();
        registry.add_session("b").unwrap();
        assert!(registry.get_session("a").unwrap().is_some());
        registry.add_session("c").unwrap();

        assert_eq!(registry.active_sessions().unwrap(), ["b", "c", "default"]);
    }

    #[test]
    fn default_session_survives_a_full_registry() {
        let registry = registry(1);
        let default = registry.default_session().unwrap();
        registry.add_session("a").unwrap();
        registry.add_session("b").unwrap();

        assert_eq!(registry.active_sessions().unwrap(), ["b", "default"]);
        assert!(Arc::ptr_eq(&default, &registry.add_session("default").unwrap()));
    }

    #[test]
    fn same_name_returns_same_task() {
        let registry = registry(10);
        let first = registry.add_session("s").unwrap();
        let second = registry.add_session("s").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(registry.remove_session("s").unwrap());
        assert_eq!(registry.session_count().unwrap(), 1);
    }
}
