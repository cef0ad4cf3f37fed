//! Database Layer with Connection Pooling
//!
//! SQLite persistence for agent configuration overrides and scoring reports:
//! - Connection pooling via r2d2 for concurrent access
//! - Version-tracked migrations (`PRAGMA user_version`)
//! - WAL mode for concurrent readers during writes

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OptionalExtension, params};

use crate::config::{AgentConfig, AgentConfigSource};
use crate::types::{AgentId, Result, ResultExt, ScoreError, ScoringReport, log_filter_error};

/// Shared database handle for async contexts.
pub type SharedDatabase = Arc<Database>;

const SCHEMA: &str = include_str!("schema.sql");

/// Current schema version for migration tracking
const SCHEMA_VERSION: u32 = 2;

struct Migration {
    version: u32,
    description: &'static str,
    up: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 2,
    description: "Keep raw agent results with each scoring",
    up: "ALTER TABLE scorings ADD COLUMN agent_results_json TEXT NOT NULL DEFAULT '{}'",
}];

// =============================================================================
// Row Types
// =============================================================================

/// Persisted agent override with its bookkeeping
#[derive(Debug, Clone, PartialEq)]
pub struct StoredAgentConfig {
    pub agent: AgentId,
    pub config: AgentConfig,
    pub updated_at: String,
}

/// One line of scoring history
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringSummary {
    pub id: String,
    pub subject_id: String,
    pub total_score: f64,
    pub created_at: String,
}

/// Best result per subject
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardEntry {
    pub subject_id: String,
    pub best_score: f64,
    pub scorings: usize,
    pub last_scored_at: String,
}

/// Connection pool configuration
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub max_size: u32,
    pub min_idle: u32,
    /// Timeout for acquiring a connection (seconds)
    pub connection_timeout_secs: u64,
}

impl PoolConfig {
    const MIN_POOL_SIZE: u32 = 2;
    const MAX_POOL_SIZE: u32 = 16;

    /// One connection per core, within bounds
    pub fn auto() -> Self {
        let cores = std::thread::available_parallelism()
            .map(|p| p.get() as u32)
            .unwrap_or(4);
        let max_size = cores.clamp(Self::MIN_POOL_SIZE, Self::MAX_POOL_SIZE);
        Self {
            max_size,
            min_idle: 1,
            connection_timeout_secs: 30,
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::auto()
    }
}

// =============================================================================
// Database
// =============================================================================

/// Thread-safe database with connection pooling.
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
}

impl Database {
    /// Open database with connection pooling at the specified path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_config(path, PoolConfig::default())
    }

    pub fn open_with_config<P: AsRef<Path>>(path: P, config: PoolConfig) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let manager =
            SqliteConnectionManager::file(path.as_ref()).with_init(Self::configure_connection);

        let pool = Pool::builder()
            .max_size(config.max_size)
            .min_idle(Some(config.min_idle))
            .connection_timeout(std::time::Duration::from_secs(
                config.connection_timeout_secs,
            ))
            .build(manager)
            .map_err(|e| ScoreError::Storage(format!("Failed to create connection pool: {}", e)))?;

        Ok(Self { pool })
    }

    /// Open an in-memory database for testing or temporary use.
    pub fn open_in_memory() -> Result<Self> {
        let manager = SqliteConnectionManager::memory().with_init(|conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            Ok(())
        });

        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e| ScoreError::Storage(format!("Failed to create in-memory pool: {}", e)))?;

        Ok(Self { pool })
    }

    fn configure_connection(conn: &mut Connection) -> std::result::Result<(), rusqlite::Error> {
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA busy_timeout = 5000;
            "#,
        )?;
        Ok(())
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>> {
        self.pool.get().map_err(|e| {
            ScoreError::Storage(format!("Failed to acquire database connection: {}", e))
        })
    }

    /// Create tables on a fresh database, migrate an older one.
    pub fn initialize(&self) -> Result<()> {
        let conn = self.conn()?;
        let current_version: u32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap_or(0);

        conn.execute_batch(SCHEMA)
            .with_context("Failed to initialize database schema")?;

        if current_version == 0 {
            // schema.sql already carries every column
            conn.pragma_update(None, "user_version", SCHEMA_VERSION)
                .with_context("Failed to set schema version")?;
            return Ok(());
        }

        Self::migrate(&conn, current_version)
    }

    fn migrate(conn: &Connection, current_version: u32) -> Result<()> {
        for migration in MIGRATIONS {
            if migration.version > current_version {
                conn.execute_batch(migration.up).with_context_fn(|| {
                    format!(
                        "Failed to apply migration {}: {}",
                        migration.version, migration.description
                    )
                })?;

                tracing::info!(
                    "Applied migration {}: {}",
                    migration.version,
                    migration.description
                );
            }
        }

        if current_version < SCHEMA_VERSION {
            conn.pragma_update(None, "user_version", SCHEMA_VERSION)
                .with_context("Failed to update schema version")?;
        }
        Ok(())
    }

    /// Get a raw connection for advanced operations.
    pub fn connection(&self) -> Result<PooledConnection<SqliteConnectionManager>> {
        self.conn()
    }

    // =========================================================================
    // Agent Configuration Overrides
    // =========================================================================

    /// Insert or replace the persisted override for one agent.
    pub fn upsert_agent_config(&self, agent: AgentId, config: &AgentConfig) -> Result<()> {
        let prompts = serde_json::to_string(&config.prompts)
            .with_context("Failed to serialize agent prompts")?;
        let now = now_rfc3339();

        self.conn()?
            .execute(
                "INSERT INTO agent_configs
                 (agent_id, model, system_prompt, prompts_json, temperature, max_tokens, is_active, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(agent_id) DO UPDATE SET
                    model = excluded.model,
                    system_prompt = excluded.system_prompt,
                    prompts_json = excluded.prompts_json,
                    temperature = excluded.temperature,
                    max_tokens = excluded.max_tokens,
                    is_active = excluded.is_active,
                    updated_at = excluded.updated_at",
                params![
                    agent.as_str(),
                    config.model,
                    config.system_prompt,
                    prompts,
                    f64::from(config.temperature),
                    config.max_tokens,
                    config.is_active,
                    now,
                ],
            )
            .with_context("Failed to store agent config")?;

        tracing::debug!("Stored agent config override: {}", agent);
        Ok(())
    }

    /// Persisted override for one agent, active or not.
    pub fn load_agent_config(&self, agent: AgentId) -> Result<Option<StoredAgentConfig>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT agent_id, model, system_prompt, prompts_json, temperature, max_tokens, is_active, updated_at
                 FROM agent_configs WHERE agent_id = ?1",
                params![agent.as_str()],
                Self::map_agent_config_row,
            )
            .optional()
            .with_context("Failed to load agent config")?;

        row.map(Self::decode_agent_config).transpose()
    }

    /// Every persisted override, in agent order.
    pub fn list_agent_configs(&self) -> Result<Vec<StoredAgentConfig>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT agent_id, model, system_prompt, prompts_json, temperature, max_tokens, is_active, updated_at
                 FROM agent_configs",
            )
            .with_context("Failed to prepare agent config query")?;

        let rows: Vec<_> = stmt
            .query_map([], Self::map_agent_config_row)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .with_context("Failed to fetch agent configs")?;

        // Rows with an unknown agent id or corrupt prompts are skipped
        let mut configs: Vec<StoredAgentConfig> = rows
            .into_iter()
            .map(Self::decode_agent_config)
            .filter_map(|r| log_filter_error(r, "Skipping stored agent config"))
            .collect();
        configs.sort_by_key(|c| c.agent);
        Ok(configs)
    }

    /// Remove an override. Returns whether one existed.
    pub fn delete_agent_config(&self, agent: AgentId) -> Result<bool> {
        let affected = self
            .conn()?
            .execute(
                "DELETE FROM agent_configs WHERE agent_id = ?1",
                params![agent.as_str()],
            )
            .with_context("Failed to delete agent config")?;
        Ok(affected > 0)
    }

    fn map_agent_config_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AgentConfigRow> {
        Ok(AgentConfigRow {
            agent_id: row.get(0)?,
            model: row.get(1)?,
            system_prompt: row.get(2)?,
            prompts_json: row.get(3)?,
            temperature: row.get(4)?,
            max_tokens: row.get(5)?,
            is_active: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }

    fn decode_agent_config(row: AgentConfigRow) -> Result<StoredAgentConfig> {
        let agent: AgentId = row.agent_id.parse().map_err(ScoreError::Storage)?;
        let prompts: BTreeMap<String, String> = serde_json::from_str(&row.prompts_json)
            .with_context_fn(|| format!("Corrupted prompts JSON for agent '{}'", agent))?;

        Ok(StoredAgentConfig {
            agent,
            config: AgentConfig {
                model: row.model,
                system_prompt: row.system_prompt,
                prompts,
                temperature: row.temperature as f32,
                max_tokens: row.max_tokens,
                is_active: row.is_active,
            },
            updated_at: row.updated_at,
        })
    }

    // =========================================================================
    // Scoring Reports
    // =========================================================================

    /// Persist a report. Returns the new scoring id.
    pub fn store_scoring(&self, report: &ScoringReport) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();
        let to_json = |what: &str, value: serde_json::Result<String>| {
            value.with_context_fn(|| format!("Failed to serialize {}", what))
        };

        let breakdown = to_json("breakdown", serde_json::to_string(&report.breakdown))?;
        let risks = to_json("risks", serde_json::to_string(&report.risks))?;
        let recommendations = to_json(
            "recommendations",
            serde_json::to_string(&report.recommendations),
        )?;
        let team_info = report
            .team_info
            .as_ref()
            .map(|t| to_json("team info", serde_json::to_string(t)))
            .transpose()?;
        let agent_results = to_json(
            "agent results",
            serde_json::to_string(&report.agent_results),
        )?;

        self.conn()?
            .execute(
                "INSERT INTO scorings
                 (id, subject_id, total_score, breakdown_json, risks_json, recommendations_json,
                  team_info_json, agent_results_json, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    id,
                    report.subject_id,
                    report.total_score,
                    breakdown,
                    risks,
                    recommendations,
                    team_info,
                    agent_results,
                    report.scored_at.to_rfc3339_opts(SecondsFormat::Nanos, true),
                ],
            )
            .with_context("Failed to store scoring")?;

        tracing::debug!(
            "Stored scoring {}: subject={}, total={:.2}",
            id,
            report.subject_id,
            report.total_score
        );
        Ok(id)
    }

    /// Full report by scoring id.
    pub fn load_scoring(&self, id: &str) -> Result<Option<ScoringReport>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT subject_id, total_score, breakdown_json, risks_json, recommendations_json,
                        team_info_json, agent_results_json, created_at
                 FROM scorings WHERE id = ?1",
                params![id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, f64>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, Option<String>>(5)?,
                        row.get::<_, String>(6)?,
                        row.get::<_, String>(7)?,
                    ))
                },
            )
            .optional()
            .with_context("Failed to load scoring")?;

        let Some((subject_id, total_score, breakdown, risks, recs, team, results, created_at)) = row
        else {
            return Ok(None);
        };
        let corrupted = || format!("Corrupted scoring '{}'", id);

        Ok(Some(ScoringReport {
            subject_id,
            total_score,
            breakdown: serde_json::from_str(&breakdown).with_context_fn(corrupted)?,
            risks: serde_json::from_str(&risks).with_context_fn(corrupted)?,
            recommendations: serde_json::from_str(&recs).with_context_fn(corrupted)?,
            team_info: team
                .map(|t| serde_json::from_str(&t))
                .transpose()
                .with_context_fn(corrupted)?,
            agent_results: serde_json::from_str(&results).with_context_fn(corrupted)?,
            scored_at: DateTime::parse_from_rfc3339(&created_at)
                .with_context_fn(corrupted)?
                .with_timezone(&Utc),
        }))
    }

    /// Most recent scorings first.
    pub fn list_recent(&self, limit: usize) -> Result<Vec<ScoringSummary>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, subject_id, total_score, created_at
                 FROM scorings
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT ?1",
            )
            .with_context("Failed to prepare history query")?;

        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok(ScoringSummary {
                    id: row.get(0)?,
                    subject_id: row.get(1)?,
                    total_score: row.get(2)?,
                    created_at: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()
            .with_context("Failed to fetch scoring history")?;
        Ok(rows)
    }

    /// Best score per subject, highest first.
    pub fn leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT subject_id, MAX(total_score) AS best, COUNT(*), MAX(created_at)
                 FROM scorings
                 GROUP BY subject_id
                 ORDER BY best DESC, subject_id ASC
                 LIMIT ?1",
            )
            .with_context("Failed to prepare leaderboard query")?;

        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok(LeaderboardEntry {
                    subject_id: row.get(0)?,
                    best_score: row.get(1)?,
                    scorings: row.get::<_, i64>(2)? as usize,
                    last_scored_at: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()
            .with_context("Failed to fetch leaderboard")?;
        Ok(rows)
    }
}

/// Active persisted overrides take precedence over packaged defaults
impl AgentConfigSource for Database {
    fn name(&self) -> &str {
        "database"
    }

    fn load(&self, agent: AgentId) -> Result<Option<AgentConfig>> {
        Ok(self
            .load_agent_config(agent)?
            .map(|stored| stored.config)
            .filter(|config| config.is_active))
    }
}

struct AgentConfigRow {
    agent_id: String,
    model: String,
    system_prompt: String,
    prompts_json: String,
    temperature: f64,
    max_tokens: u32,
    is_active: bool,
    updated_at: String,
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
