use crate::error::ConfigError;
use crate::http::var;
use crate::social::category::CategoryRules;
use std::path::PathBuf;
use std::time::Duration;

/// Quote API root, overridable with `CHART_API_URL`.
pub const CHART_API_URL: &str = "https://query1.finance.yahoo.com";

/// SEC data API root, overridable with `SEC_API_URL`.
pub const SEC_API_URL: &str = "https://data.sec.gov";

/// Browser user agent; the chart endpoint rejects library defaults.
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// The SEC asks for a contact in the user agent; overridable with `USER_AGENT`.
pub const SEC_USER_AGENT: &str = "scout ETF analyzer admin@example.com";

pub const DEFAULT_ETFS: [&str; 10] = [
    "SPY", "QQQ", "VOO", "VTI", "IWM", "XLK", "XLF", "XLE", "XLV", "ARKK",
];

/// ETF → SEC Central Index Key.
pub const DEFAULT_ETF_CIKS: [(&str, &str); 5] = [
    ("SPY", "0000884394"),
    ("QQQ", "0001067839"),
    ("VOO", "0001297989"),
    ("VTI", "0001297989"),
    ("IWM", "0001100663"),
];

pub const DEFAULT_SEED_ACCOUNTS: [&str; 20] = [
    "elonmusk",
    "cathiedwood",
    "jimcramer",
    "chamath",
    "GaryBlack00",
    "SawyerMerritt",
    "TroyTeslike",
    "KobeissiLetter",
    "unusual_whales",
    "DeItaone",
    "zerohedge",
    "carlquintanilla",
    "SquawkCNBC",
    "markets",
    "WSJ",
    "FT",
    "business",
    "Reuters",
    "Fxhedgers",
    "BespokeTrades",
];

pub const DEFAULT_MIN_FOLLOWERS: u64 = 5_000;
pub const DEFAULT_TARGET_COUNT: usize = 100;
pub const DEFAULT_SNAPSHOT_PATH: &str = "./data/twitter-influencers-100.json";

/// Minimum spacing between external calls, and between groups of calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pacing {
    pub per_call: Duration,
    pub per_group: Duration,
}

impl Pacing {
    pub const fn new(per_call: Duration, per_group: Duration) -> Self {
        Self {
            per_call,
            per_group,
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::new(Duration::from_millis(200), Duration::from_millis(1000))
    }
}

/// Settings for the ETF holdings market-cap refresh.
#[derive(Clone, Debug)]
pub struct HoldingsConfig {
    pub database_url: String,
    pub chart_url: String,
    pub etfs: Vec<String>,
    pub pacing: Pacing,
}

impl HoldingsConfig {
    /// Reads `DATABASE_URL` (required) and `CHART_API_URL` from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
        if database_url.trim().is_empty() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        Ok(Self {
            database_url,
            chart_url: base_url("CHART_API_URL", var("CHART_API_URL").ok(), CHART_API_URL)?,
            etfs: DEFAULT_ETFS.iter().map(|etf| etf.to_string()).collect(),
            pacing: Pacing::default(),
        })
    }
}

/// Settings for influencer discovery.
#[derive(Clone, Debug)]
pub struct InfluencerConfig {
    pub profile_url: String,
    pub seeds: Vec<String>,
    pub min_followers: u64,
    pub target_count: usize,
    pub rules: CategoryRules,
    pub output: PathBuf,
    pub pacing: Pacing,
}

impl InfluencerConfig {
    /// Reads the social-profile API root from `PROFILE_API_URL` (required).
    pub fn from_env() -> Result<Self, ConfigError> {
        let profile_url =
            var("PROFILE_API_URL").map_err(|_| ConfigError::Missing("PROFILE_API_URL"))?;
        let profile_url = base_url("PROFILE_API_URL", Some(profile_url), "")?;

        Ok(Self {
            profile_url,
            ..Self::default()
        })
    }
}

impl Default for InfluencerConfig {
    fn default() -> Self {
        Self {
            profile_url: String::new(),
            seeds: DEFAULT_SEED_ACCOUNTS.iter().map(|s| s.to_string()).collect(),
            min_followers: DEFAULT_MIN_FOLLOWERS,
            target_count: DEFAULT_TARGET_COUNT,
            rules: CategoryRules::default(),
            output: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
            // unpaced unless --call-delay-ms is given
            pacing: Pacing::new(Duration::ZERO, Duration::ZERO),
        }
    }
}

/// Settings for the SEC N-PORT filing lookup.
#[derive(Clone, Debug)]
pub struct FilingsConfig {
    pub sec_url: String,
    pub user_agent: String,
    pub etf_ciks: Vec<(String, String)>,
    pub pacing: Pacing,
}

impl FilingsConfig {
    /// Reads `SEC_API_URL` and `USER_AGENT`; both have defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            sec_url: base_url("SEC_API_URL", var("SEC_API_URL").ok(), SEC_API_URL)?,
            user_agent: var("USER_AGENT").unwrap_or_else(|_| SEC_USER_AGENT.to_string()),
            ..Self::default()
        })
    }
}

impl Default for FilingsConfig {
    fn default() -> Self {
        Self {
            sec_url: SEC_API_URL.to_string(),
            user_agent: SEC_USER_AGENT.to_string(),
            etf_ciks: DEFAULT_ETF_CIKS
                .iter()
                .map(|(etf, cik)| (etf.to_string(), cik.to_string()))
                .collect(),
            pacing: Pacing::default(),
        }
    }
}

/// An API root: `value` when set, else `default`; must be an http(s) URL.
fn base_url(
    name: &'static str,
    value: Option<String>,
    default: &str,
) -> Result<String, ConfigError> {
    let url = value.unwrap_or_else(|| default.to_string());
    let url = url.trim().trim_end_matches('/');

    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(url.to_string())
    } else {
        Err(ConfigError::Invalid {
            name,
            value: url.to_string(),
        })
    }
}

//////////////////////////////////////////////////////////////
// -- TESTS --
//////////////////////////////////////////////////////////////
