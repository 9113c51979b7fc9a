pub mod analytics;
pub mod auth;
pub mod crop_rules;
pub mod guidance;
pub mod health;
pub mod places;
