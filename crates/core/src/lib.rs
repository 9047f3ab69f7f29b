pub mod intent;
pub mod keywords;
pub mod models;
pub mod reply;
pub mod slots;
pub mod validate;

pub use intent::{classify_intent, Classification, IntentClassifier, IntentScore, DEFAULT_PRIORITY};
pub use keywords::extract_keywords;
pub use models::*;
pub use reply::{compose_reply, rejection_reply};
pub use slots::{extract_slots, Slots};
pub use validate::{sanitize, validate, QueryRejection, QueryValidator};
