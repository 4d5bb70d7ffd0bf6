// Severity/alert state machine

mod banner;
mod escalation;
mod severity;

pub use banner::CrisisAlert;
pub use escalation::EscalationTracker;
pub use severity::CrisisSeverity;
