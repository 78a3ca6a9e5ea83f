use super::category::{Category, CategoryRules};
use super::profile::{Profile, ProfileApi};
use crate::config::InfluencerConfig;
use crate::fetch::RateLimitedFetcher;
use crate::pipeline::{Pipeline, RunSummary};
use crate::sink::{Sink, SnapshotSink};
use crate::source::{StaticSource, TargetEntity};
use crate::transform::Transform;
use crate::tui::{self, Progress};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{info, trace, warn};

// scrape
// ----------------------------------------------------------------------------

/// Check every seed account, keep the credible ones, and write them to the snapshot file.
pub async fn scrape(config: &InfluencerConfig, tui: bool) -> anyhow::Result<RunSummary> {
    let time = std::time::Instant::now();

    let api = ProfileApi::new(&config.profile_url)?;
    let fetcher = RateLimitedFetcher::new(api, config.pacing.per_call);
    let transformer = InfluencerTransformer::new(config.min_followers, config.rules.clone());
    let mut pipeline = Pipeline::new(fetcher, transformer);
    let source = StaticSource::from_ids(&config.seeds);

    if tui {
        println!("{}", tui::banner("Processing seed accounts"));
    }

    info!("checking {} seed accounts ...", source.len());
    let progress = Progress::new(source.len(), tui)?;
    let batch = pipeline.collect(&source, &progress).await;
    progress.finish();

    let mut sink = SnapshotSink::new(&config.output);
    sink.flush(&batch.records).await?;

    let distribution = distribution(&batch.records);
    info!(
        "{} influencers saved to {} ({}), {}",
        batch.records.len(),
        sink.path().display(),
        batch.summary,
        crate::time_elapsed(time)
    );

    if tui {
        println!("\nCollected {} influencers", batch.records.len());
        println!("\nCategory distribution:");
        for (category, count) in &distribution {
            println!("  {category}: {count}");
        }
        println!("\nSaved to {}", sink.path().display());
    }

    if let Some(missing) = shortfall(batch.records.len(), config.target_count) {
        warn!(
            "found {} of {} target influencers; {missing} more needed",
            batch.records.len(),
            config.target_count,
        );
        if tui {
            println!("Need {missing} more influencers to reach {}", config.target_count);
        }
    }

    Ok(batch.summary)
}

/// How many influencers a run came up short of `target`, if any.
pub fn shortfall(found: usize, target: usize) -> Option<usize> {
    (found < target).then(|| target - found)
}

/// Record count per category, largest first; ties keep category order.
pub fn distribution(records: &[InfluencerRecord]) -> Vec<(Category, usize)> {
    let mut counts: HashMap<Category, usize> = HashMap::new();
    for record in records {
        *counts.entry(record.category).or_default() += 1;
    }

    let mut counts: Vec<(Category, usize)> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    counts
}

// transform
// ----------------------------------------------------------------------------

/// One credible account, in snapshot file form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InfluencerRecord {
    pub username: String,
    pub name: String,
    pub category: Category,
    pub followers: u64,
    pub verified: bool,
}

impl std::fmt::Display for InfluencerRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Added: {} ({}, {} followers)",
            self.name, self.category, self.followers
        )
    }
}

/// Credibility gate, then bio categorization.
#[derive(Clone, Debug)]
pub struct InfluencerTransformer {
    min_followers: u64,
    rules: CategoryRules,
}

impl InfluencerTransformer {
    pub fn new(min_followers: u64, rules: CategoryRules) -> Self {
        Self {
            min_followers,
            rules,
        }
    }
}

impl Transform for InfluencerTransformer {
    type Record = InfluencerRecord;

    fn accept(&self, entity: &TargetEntity, payload: &Value) -> Option<InfluencerRecord> {
        let Some(profile) = Profile::from_payload(payload) else {
            trace!("no user found for @{}", entity.id);
            return None;
        };

        if profile.followers < self.min_followers {
            trace!(
                "@{} below credibility gate ({} < {})",
                entity.id,
                profile.followers,
                self.min_followers
            );
            return None;
        }

        if profile.username.is_empty() {
            trace!("no screen name for @{}", entity.id);
            return None;
        }

        let category = self.rules.categorize(&profile.description);
        Some(InfluencerRecord {
            username: profile.username,
            name: profile.name,
            category,
            followers: profile.followers,
            verified: profile.verified,
        })
    }
}

//////////////////////////////////////////////////////////////
// -- TESTS --
//////////////////////////////////////////////////////////////
