// Crisis keyword detection

mod detector;

pub use detector::{
    CrisisDetector, CrisisKeywords, ABUSE, DEFAULT_DETECTOR, HOPELESSNESS, ISOLATION, SELF_HARM,
    SUBSTANCE_USE, VIOLENCE,
};
