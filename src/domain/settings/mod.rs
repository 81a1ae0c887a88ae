// Application settings domain module

pub mod tab_visibility;

pub use tab_visibility::TabVisibility;

/// Key of the application settings row holding suspension rules
pub const SUSPENSION_RULES_KEY: &str = "suspension_rules";
