// Escalation detection between consecutive analyses

/// Remembers the previous risk level and flags sudden jumps
#[derive(Debug, Clone)]
pub struct EscalationTracker {
    previous: Option<f64>,
    delta: f64,
}

impl EscalationTracker {
    pub fn new(delta: f64) -> Self {
        Self {
            previous: None,
            delta,
        }
    }

    /// Record a new risk level
    ///
    /// Returns the previous level when `current - previous` exceeds the delta.
    /// The first observation only sets the baseline.
    pub fn observe(&mut self, current: f64) -> Option<f64> {
        let previous = self.previous.replace(current)?;
        if current - previous > self.delta {
            Some(previous)
        } else {
            None
        }
    }

    pub fn previous(&self) -> Option<f64> {
        self.previous
    }

    /// Forget the baseline
    pub fn reset(&mut self) {
        self.previous = None;
    }
}
