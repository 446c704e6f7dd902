pub mod dashboard;
pub mod webhooks;
