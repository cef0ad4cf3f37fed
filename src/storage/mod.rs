pub mod database;

pub use database::{
    Database, LeaderboardEntry, PoolConfig, ScoringSummary, SharedDatabase, StoredAgentConfig,
};
