pub mod analytics_event;
pub mod crop_rule;
pub mod place_cache;
pub mod user;
