// Session registry for concurrent conversations

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tokio_util::sync::CancellationToken;

use super::session::CrisisSession;
use crate::config::EngineConfig;

struct RegistryEntry {
    session: Arc<CrisisSession>,
    last_activity: DateTime<Utc>,
}

impl RegistryEntry {
    fn is_expired(&self, idle_timeout: Duration, now: DateTime<Utc>) -> bool {
        let elapsed = now.signed_duration_since(self.last_activity);
        elapsed.to_std().map_or(false, |e| e >= idle_timeout)
    }
}

/// One `CrisisSession` per conversation id
///
/// Sessions idle for longer than the timeout are disposed and dropped by
/// `cleanup_expired`, which `start_cleanup_task` runs once a minute.
pub struct SessionRegistry {
    sessions: Arc<DashMap<String, RegistryEntry>>,
    /// Slots claimed against `max_sessions`; kept in step with the map
    occupied: Arc<AtomicUsize>,
    config: EngineConfig,
    max_sessions: usize,
    idle_timeout: Duration,
    shutdown: CancellationToken,
}

impl SessionRegistry {
    pub fn new(config: EngineConfig, max_sessions: usize, idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            occupied: Arc::new(AtomicUsize::new(0)),
            config,
            max_sessions,
            idle_timeout,
            shutdown: CancellationToken::new(),
        }
    }

    /// Existing session for `id`, or a fresh one built from the registry config
    pub fn get_or_create(&self, id: &str) -> anyhow::Result<Arc<CrisisSession>> {
        // The shard stays write-locked while the entry is held, so nothing in
        // here may touch the map as a whole (len, iter).
        let session = match self.sessions.entry(id.to_string()) {
            Entry::Occupied(mut occupied) => {
                occupied.get_mut().last_activity = Utc::now();
                return Ok(Arc::clone(&occupied.get().session));
            }
            Entry::Vacant(vacant) => {
                if !self.claim_slot() {
                    anyhow::bail!("Maximum session limit reached ({})", self.max_sessions);
                }
                let session = match CrisisSession::from_config(self.config.clone()) {
                    Ok(session) => Arc::new(session),
                    Err(e) => {
                        self.occupied.fetch_sub(1, Ordering::SeqCst);
                        return Err(e);
                    }
                };
                vacant.insert(RegistryEntry {
                    session: Arc::clone(&session),
                    last_activity: Utc::now(),
                });
                session
            }
        };

        tracing::info!(active = self.sessions.len(), "Created crisis session");
        Ok(session)
    }

    fn claim_slot(&self) -> bool {
        let max = self.max_sessions;
        self.occupied
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n < max).then_some(n + 1)
            })
            .is_ok()
    }

    /// Look up without creating or touching
    pub fn get(&self, id: &str) -> Option<Arc<CrisisSession>> {
        self.sessions.get(id).map(|e| Arc::clone(&e.session))
    }

    /// Dispose and drop the session; returns false if none existed
    pub fn remove(&self, id: &str) -> bool {
        match self.sessions.remove(id) {
            Some((_, entry)) => {
                self.occupied.fetch_sub(1, Ordering::SeqCst);
                entry.session.dispose();
                true
            }
            None => false,
        }
    }

    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }

    /// Dispose sessions idle past the timeout; returns how many were removed
    pub fn cleanup_expired(&self) -> usize {
        cleanup(&self.sessions, &self.occupied, self.idle_timeout)
    }

    /// Run `cleanup_expired` every minute until the registry is dropped
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start_cleanup_task(&self) {
        let sessions = Arc::clone(&self.sessions);
        let occupied = Arc::clone(&self.occupied);
        let idle_timeout = self.idle_timeout;
        let shutdown = self.shutdown.clone();

        tokio::spawn(async move {
            let mut interval = time::interval(Duration::from_secs(60));
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = interval.tick() => {
                        cleanup(&sessions, &occupied, idle_timeout);
                    }
                }
            }
        });
    }
}

impl Drop for SessionRegistry {
    fn drop(&mut self) {
        self.shutdown.cancel();
        for entry in self.sessions.iter() {
            entry.session.dispose();
        }
    }
}

fn cleanup(
    sessions: &DashMap<String, RegistryEntry>,
    occupied: &AtomicUsize,
    idle_timeout: Duration,
) -> usize {
    let now = Utc::now();
    let expired: Vec<String> = sessions
        .iter()
        .filter(|entry| entry.value().is_expired(idle_timeout, now))
        .map(|entry| entry.key().clone())
        .collect();

    let mut removed = 0;
    for id in expired {
        if let Some((_, entry)) = sessions.remove(&id) {
            occupied.fetch_sub(1, Ordering::SeqCst);
            entry.session.dispose();
            removed += 1;
        }
    }

    if removed > 0 {
        tracing::info!(
            removed,
            active = sessions.len(),
            "Cleaned up idle crisis sessions"
        );
    }
    removed
}
