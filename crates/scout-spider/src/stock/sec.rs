use crate::config::FilingsConfig;
use crate::error::{ConfigError, FetchError};
use crate::fetch::{Fetch, RateLimitedFetcher};
use crate::http::HttpClient;
use crate::pipeline::{Pipeline, RunSummary};
use crate::source::{StaticSource, TargetEntity};
use crate::transform::Transform;
use crate::tui::{self, Progress};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, trace, warn};

/// Periodic fund-holdings report filed with the SEC.
pub const NPORT_FORM: &str = "NPORT-P";

// scrape
// ----------------------------------------------------------------------------

/// Look up the latest N-PORT filing of every ETF with a known CIK.
///
/// The filings are reported, and handed to [`parse_nport_holdings`]; nothing is persisted.
pub async fn scrape(config: &FilingsConfig, tui: bool) -> anyhow::Result<RunSummary> {
    let time = std::time::Instant::now();

    let api = SubmissionsApi::new(&config.sec_url, &config.user_agent)?;
    let fetcher = RateLimitedFetcher::new(api, config.pacing.per_call);
    let mut pipeline = Pipeline::new(fetcher, NportTransformer);

    let source = StaticSource::new(
        config
            .etf_ciks
            .iter()
            .map(|(etf, cik)| TargetEntity::new(etf).with_key(cik))
            .collect(),
    );

    if tui {
        println!("{}", tui::banner("SEC EDGAR N-PORT filings"));
    }

    info!("fetching SEC submissions for {} ETFs ...", source.len());
    let progress = Progress::new(source.len(), tui)?;
    let batch = pipeline.collect(&source, &progress).await;
    progress.finish();

    for filing in &batch.records {
        let holdings = parse_nport_holdings(&filing.cik, &filing.accession);
        debug!(
            "[{}] {} parsed into {} holdings",
            filing.etf,
            filing.accession,
            holdings.len()
        );
    }

    info!(
        "SEC filings lookup finished ({}), {}",
        batch.summary,
        crate::time_elapsed(time)
    );

    Ok(batch.summary)
}

/// Holdings listed in an N-PORT filing.
///
/// Filing documents are not parsed; the result is always empty.
pub fn parse_nport_holdings(cik: &str, accession: &str) -> Vec<NportHolding> {
    trace!("N-PORT parsing is not implemented; CIK{cik} {accession} yields no holdings");
    Vec::new()
}

/// One constituent of an N-PORT filing.
#[derive(Clone, Debug, PartialEq)]
pub struct NportHolding {
    pub ticker: String,
    pub weight: f64,
}

// fetch
// ----------------------------------------------------------------------------

/// `data.sec.gov/submissions/CIK##########.json`, keyed by the entity's CIK.
pub struct SubmissionsApi {
    client: HttpClient,
    base: String,
}

impl SubmissionsApi {
    pub fn new(base: impl Into<String>, user_agent: &str) -> Result<Self, ConfigError> {
        let client = reqwest::ClientBuilder::new()
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base: base.into(),
        })
    }
}

#[async_trait]
impl Fetch for SubmissionsApi {
    async fn fetch(&self, entity: &TargetEntity) -> Result<Value, FetchError> {
        let cik = entity
            .key
            .as_deref()
            .ok_or_else(|| FetchError::Api(format!("no CIK known for {}", entity.id)))?;

        let url = format!(
            "{}/submissions/CIK{cik}.json",
            self.base.trim_end_matches('/')
        );
        trace!("fetching filings from {url}");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

// transform
// ----------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Filing {
    pub etf: String,
    pub cik: String,
    pub form: String,

    /// Accession number with its dashes removed.
    pub accession: String,
    pub filing_date: String,
}

impl std::fmt::Display for Filing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} filing {} (Date: {})",
            self.etf, self.form, self.accession, self.filing_date
        )
    }
}

/// Picks the latest N-PORT filing out of a submissions document.
#[derive(Clone, Copy, Debug, Default)]
pub struct NportTransformer;

impl Transform for NportTransformer {
    type Record = Filing;

    fn accept(&self, entity: &TargetEntity, payload: &Value) -> Option<Filing> {
        let submissions = match Submissions::deserialize(payload) {
            Ok(submissions) => submissions,
            Err(err) => {
                warn!("unexpected submissions document for {entity}, error({err})");
                return None;
            }
        };

        let cik = entity.key.clone().unwrap_or_default();
        let filing = latest_filing(&submissions, NPORT_FORM, &entity.id, &cik);
        if filing.is_none() {
            debug!("no {NPORT_FORM} filing found for {entity}");
        }
        filing
    }
}

/// The first (most recent) filing of `form` among the recent filings.
pub fn latest_filing(
    submissions: &Submissions,
    form: &str,
    etf: &str,
    cik: &str,
) -> Option<Filing> {
    let recent = &submissions.filings.recent;
    let i = recent.form.iter().position(|f| f == form)?;

    Some(Filing {
        etf: etf.to_string(),
        cik: cik.to_string(),
        form: form.to_string(),
        accession: recent.accession_number.get(i)?.replace('-', ""),
        filing_date: recent.filing_date.get(i)?.clone(),
    })
}

// de
// ----------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct Submissions {
    #[serde(default)]
    filings: Filings,
}

#[derive(Debug, Default, Deserialize)]
struct Filings {
    #[serde(default)]
    recent: Recent,
}

// column-oriented: the i-th entry of each list belongs to the i-th filing
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Recent {
    #[serde(default)]
    form: Vec<String>,
    #[serde(default)]
    accession_number: Vec<String>,
    #[serde(default)]
    filing_date: Vec<String>,
}

//////////////////////////////////////////////////////////////
// -- TESTS --
//////////////////////////////////////////////////////////////
