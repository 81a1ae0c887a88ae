// Infrastructure layer module
// Database adapters and outbound integrations

pub mod repositories;
