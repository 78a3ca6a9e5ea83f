use crate::pipeline::{Outcome, RunSummary};
use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

/// Terminal progress for one batch: a total bar, plus success & failure bars beneath it.
///
/// Hidden progress swallows everything, so library code can report unconditionally.
pub struct Progress {
    multi: Option<MultiProgress>,
    total: ProgressBar,
    success: ProgressBar,
    fails: ProgressBar,
}

impl Progress {
    pub fn new(len: usize, tui: bool) -> anyhow::Result<Self> {
        if !tui {
            return Ok(Self::hidden());
        }

        // overall multi progress bar
        let multi = MultiProgress::new();

        // total number of entities to collect
        let total = multi.add(
            ProgressBar::new(len as u64).with_style(
                ProgressStyle::default_bar()
                    .template(
                        "{spinner:.magenta}\n \
                        {msg:>9.white} |{bar:57.white/grey}| {pos:<2} / {human_len} \
                        ({percent_precise}%) [Time: {elapsed}, Rate: {per_sec}, ETA: {eta}]",
                    )?
                    .progress_chars("## "),
            ),
        );
        total.set_message("total");
        total.enable_steady_tick(Duration::from_millis(100));

        // total successful collections
        let success = multi.insert_after(
            &total,
            ProgressBar::new(len as u64).with_style(
                ProgressStyle::default_bar()
                    .template(" {msg:>9.green} |{bar:57.green}| {pos:<2.green}")?
                    .progress_chars("## "),
            ),
        );
        success.set_message("successes");

        // total failed collections
        let fails = multi.insert_after(
            &success,
            ProgressBar::new(len as u64).with_style(
                ProgressStyle::default_bar()
                    .template(" {msg:>9.red} |{bar:57.red}| {pos:<2.red}")?
                    .progress_chars("## "),
            ),
        );
        fails.set_message("failures");

        Ok(Self {
            multi: Some(multi),
            total,
            success,
            fails,
        })
    }

    pub fn hidden() -> Self {
        Self {
            multi: None,
            total: ProgressBar::hidden(),
            success: ProgressBar::hidden(),
            fails: ProgressBar::hidden(),
        }
    }

    /// Print a line above the bars.
    pub fn println(&self, msg: impl AsRef<str>) {
        if let Some(multi) = &self.multi {
            let _ = multi.println(msg);
        }
    }

    pub fn record(&self, outcome: Outcome) {
        self.total.inc(1);
        match outcome {
            Outcome::Accepted => self.success.inc(1),
            Outcome::Failed => self.fails.inc(1),
            Outcome::Filtered => {}
        }
    }

    pub fn finish(&self) {
        self.total.finish_and_clear();
        self.success.finish_and_clear();
        self.fails.finish_and_clear();
    }
}

/// `====` banner around a title, as printed between job stages.
pub fn banner(title: &str) -> String {
    format!("{bar}\n{title}\n{bar}", bar = "=".repeat(60))
}

/// Multi-line run summary; failures are highlighted when present.
pub fn summary_lines(label: &str, summary: &RunSummary) -> String {
    let failed = format!("failed:    {}", summary.failed);
    let failed = if summary.failed > 0 {
        failed.red().bold().to_string()
    } else {
        failed
    };

    format!(
        "{label}\n  attempted: {}\n  succeeded: {}\n  filtered:  {}\n  {failed}",
        summary.attempted, summary.succeeded, summary.filtered,
    )
}
