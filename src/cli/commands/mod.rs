pub mod agents;
pub mod config;
pub mod history;
pub mod init;
pub mod missing;
pub mod score;
