// Per-conversation orchestration: analysis, alerting, events, debouncing

mod debounce;
mod events;
mod monitor;
mod registry;
mod result;
mod session;

pub use debounce::Debouncer;
pub use events::{CrisisEvent, EventRegistry, SubscriptionId};
pub use monitor::{InputEvent, MonitorHandle};
pub use registry::SessionRegistry;
pub use result::{AnalyzeOptions, CrisisAnalysisResult, SessionSnapshot};
pub use session::{CrisisSession, CrisisSessionBuilder};
