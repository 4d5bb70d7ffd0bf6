// Typed events and the listener registry
//
// Listeners are called synchronously, in subscription order, after the
// session state has been updated and its lock released. A listener may
// subscribe or unsubscribe from inside its own callback.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use super::result::CrisisAnalysisResult;
use crate::interventions::InterventionRecommendation;

/// Events emitted by a `CrisisSession`
#[derive(Debug, Clone, PartialEq)]
pub enum CrisisEvent {
    /// Risk reached the configured crisis floor
    CrisisDetected { analysis: CrisisAnalysisResult },
    /// Risk jumped by more than the escalation delta since the previous analysis
    RiskEscalation {
        analysis_id: String,
        previous: f64,
        current: f64,
    },
    /// The recommender produced at least one intervention
    InterventionRecommended {
        analysis_id: String,
        recommendations: Vec<InterventionRecommendation>,
    },
}

impl CrisisEvent {
    pub fn name(&self) -> &'static str {
        match self {
            CrisisEvent::CrisisDetected { .. } => "crisis_detected",
            CrisisEvent::RiskEscalation { .. } => "risk_escalation",
            CrisisEvent::InterventionRecommended { .. } => "intervention_recommended",
        }
    }
}

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(&CrisisEvent) + Send + Sync>;

/// Ordered set of event listeners
#[derive(Default)]
pub struct EventRegistry {
    listeners: RwLock<Vec<(SubscriptionId, Listener)>>,
    next_id: AtomicU64,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for every event
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&CrisisEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener; returns false if it was not registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.write().unwrap_or_else(|e| e.into_inner());
        let before = listeners.len();
        listeners.retain(|(sid, _)| *sid != id);
        listeners.len() != before
    }

    /// Deliver an event to every listener
    pub fn emit(&self, event: &CrisisEvent) {
        // Clone the list so listeners can (un)subscribe re-entrantly
        let listeners: Vec<Listener> = self
            .listeners
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();

        tracing::debug!(event = event.name(), listeners = listeners.len(), "Emitting event");
        for listener in listeners {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every listener
    pub fn clear(&self) {
        self.listeners
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn escalation(current: f64) -> CrisisEvent {
        CrisisEvent::RiskEscalation {
            analysis_id: "a".to_string(),
            previous: 0.0,
            current,
        }
    }

    #[test]
    fn test_emit_in_subscription_order() {
        let registry = EventRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second"] {
            let log = Arc::clone(&log);
            registry.subscribe(move |_| log.lock().unwrap().push(tag));
        }

        registry.emit(&escalation(50.0));
        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_unsubscribe() {
        let registry = EventRegistry::new();
        let count = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&count);
        let id = registry.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        registry.emit(&escalation(50.0));
        assert!(registry.unsubscribe(id));
        assert!(!registry.unsubscribe(id));
        registry.emit(&escalation(60.0));

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_reentrant_unsubscribe() {
        let registry = Arc::new(EventRegistry::new());
        let slot: Arc<Mutex<Option<SubscriptionId>>> = Arc::new(Mutex::new(None));

        let reg = Arc::clone(&registry);
        let own_id = Arc::clone(&slot);
        let id = registry.subscribe(move |_| {
            if let Some(id) = *own_id.lock().unwrap() {
                reg.unsubscribe(id);
            }
        });
        *slot.lock().unwrap() = Some(id);

        registry.emit(&escalation(50.0));
        assert!(registry.is_empty());
    }
}
