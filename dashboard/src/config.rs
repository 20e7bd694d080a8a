/// Dashboard configuration from environment variables
///
/// Defaults target Algorand TestNet through algonode and Bitquery.

use algo_dashboard::{AlgodConfig, ConfirmationPolicy, HistoryWindow, IndexerConfig};
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct DashboardConfig {
    pub algod: AlgodConfig,
    pub indexer: IndexerConfig,
    pub history_window: HistoryWindow,
    /// How contract calls poll for confirmation
    pub confirmation: ConfirmationPolicy,
    /// Directory holding the persisted connected address
    pub data_dir: PathBuf,
    /// Hex-encoded 32-byte Ed25519 seed of the local wallet
    pub wallet_seed: String,
    /// Approve connect and sign requests without asking
    pub auto_approve: bool,
    pub bind_address: String,
    /// Empty means any origin
    pub allowed_origins: Vec<String>,
}

impl DashboardConfig {
    /// Load configuration from the process environment (and `.env`)
    ///
    /// Environment variables:
    /// - `ALGOD_URL`, `ALGOD_TOKEN`: node endpoint and optional API token
    /// - `BITQUERY_URL`, `BITQUERY_API_KEY`: history indexer
    /// - `ALGORAND_NETWORK`: indexer network name (default `algorand_testnet`)
    /// - `HISTORY_YEARS`, or `HISTORY_FROM` with `HISTORY_TILL`
    /// - `CONFIRMATION_POLL_MS`, `CONFIRMATION_ATTEMPTS`: contract call waiting
    /// - `DATA_DIR` (default `./data`), also holding the wallet session file
    /// - `WALLET_SEED` (required)
    /// - `AUTO_APPROVE`: `true` to skip approvals
    /// - `BIND_ADDRESS` (default `0.0.0.0:3000`)
    /// - `ALLOWED_ORIGINS`: comma-separated CORS origins
    ///
    /// # Examples
    ///
    /// ```bash
    /// # Against the local mock node
    /// ALGOD_URL=http://localhost:4001 BITQUERY_URL=http://localhost:4001/graphql \
    ///   WALLET_SEED=$(openssl rand -hex 32) cargo run -p dashboard
    /// ```
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let algod_defaults = AlgodConfig::default();
        let algod = AlgodConfig {
            url: var("ALGOD_URL").unwrap_or(algod_defaults.url),
            token: var("ALGOD_TOKEN"),
        };
        log::info!("📡 algod URL: {}", algod.url);

        let indexer_defaults = IndexerConfig::default();
        let indexer = IndexerConfig {
            url: var("BITQUERY_URL").unwrap_or(indexer_defaults.url),
            api_key: var("BITQUERY_API_KEY").unwrap_or_default(),
            network: var("ALGORAND_NETWORK").unwrap_or(indexer_defaults.network),
        };
        log::info!("🔎 Indexer URL: {} ({})", indexer.url, indexer.network);

        let history_window = match (var("HISTORY_FROM"), var("HISTORY_TILL")) {
            (Some(from), Some(till)) => HistoryWindow::Fixed {
                from: parse_bound(&from, false).context("Invalid HISTORY_FROM")?,
                till: parse_bound(&till, true).context("Invalid HISTORY_TILL")?,
            },
            (None, None) => match var("HISTORY_YEARS") {
                Some(years) => HistoryWindow::Rolling {
                    years: years.parse().context("Invalid HISTORY_YEARS")?,
                },
                None => HistoryWindow::default(),
            },
            _ => return Err(anyhow!("HISTORY_FROM and HISTORY_TILL must be set together")),
        };

        let confirmation_defaults = ConfirmationPolicy::default();
        let confirmation = ConfirmationPolicy {
            poll_interval: match var("CONFIRMATION_POLL_MS") {
                Some(ms) => Duration::from_millis(ms.parse().context("Invalid CONFIRMATION_POLL_MS")?),
                None => confirmation_defaults.poll_interval,
            },
            max_attempts: match var("CONFIRMATION_ATTEMPTS") {
                Some(n) => n.parse().context("Invalid CONFIRMATION_ATTEMPTS")?,
                None => confirmation_defaults.max_attempts,
            },
        };
        if confirmation.max_attempts == 0 {
            return Err(anyhow!("CONFIRMATION_ATTEMPTS must be at least 1"));
        }

        let data_dir = PathBuf::from(var("DATA_DIR").unwrap_or_else(|| "./data".to_string()));

        let wallet_seed =
            var("WALLET_SEED").context("WALLET_SEED environment variable not set")?;

        let auto_approve = match var("AUTO_APPROVE").as_deref() {
            None => false,
            Some(v) => matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"),
        };
        if auto_approve {
            log::warn!("⚠️  AUTO_APPROVE is on, every connect and signature is approved");
        }

        let bind_address = var("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());

        let allowed_origins = var("ALLOWED_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            algod,
            indexer,
            history_window,
            confirmation,
            data_dir,
            wallet_seed,
            auto_approve,
            bind_address,
            allowed_origins,
        })
    }
}

/// RFC 3339 timestamp or plain `YYYY-MM-DD` date
///
/// A plain date as the upper bound covers the whole day.
fn parse_bound(value: &str, end_of_day: bool) -> Result<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")?;
    let time = if end_of_day {
        date.and_hms_opt(23, 59, 59)
    } else {
        date.and_hms_opt(0, 0, 0)
    };
    time.map(|t| t.and_utc())
        .ok_or_else(|| anyhow!("invalid date {}", value))
}
