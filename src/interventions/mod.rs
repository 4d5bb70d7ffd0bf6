// Intervention recommendations and crisis resources

mod recommender;
mod resources;

pub use recommender::{
    InterventionPriority, InterventionRecommendation, InterventionRecommender, InterventionType,
    CRISIS_LINE_RISK, PROFESSIONAL_SUPPORT_RISK,
};
pub use resources::{CrisisResource, ResourceDirectory};
