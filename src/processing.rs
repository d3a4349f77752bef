use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

use crate::config::Config;
use crate::danmaku::{aggregate, parse_comments, CommentRetriever, IdentifierExtractor};
use crate::error::{DanmakuError, Result};
use crate::fetch::{Fetch, HttpFetcher};
use crate::report::ChartReporter;

/// Outcome of one page-to-chart run
#[derive(Debug, Clone, Serialize)]
pub struct ChartReport {
    pub cid: String,
    pub duration_seconds: usize,
    pub comment_count: usize,
    pub total_in_chart: u64,
    pub peak: Option<(usize, u64)>,
    pub output_path: PathBuf,
}

/// Sequential page -> identifiers -> comments -> histogram -> chart pipeline
pub struct ChartProcessor<F: Fetch> {
    config: Config,
    fetcher: F,
    extractor: IdentifierExtractor,
    reporter: ChartReporter,
}

impl ChartProcessor<HttpFetcher> {
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.http)?;
        Self::with_fetcher(config, fetcher)
    }
}

impl<F: Fetch> ChartProcessor<F> {
    pub fn with_fetcher(config: Config, fetcher: F) -> Result<Self> {
        let extractor = IdentifierExtractor::from_config(&config.source)?;
        let reporter = ChartReporter::new(&config.output);

        Ok(Self {
            config,
            fetcher,
            extractor,
            reporter,
        })
    }

    pub async fn run(&self, url: &str) -> Result<ChartReport> {
        let url = url.trim();
        if url.is_empty() {
            return Err(DanmakuError::Usage("No url".to_string()));
        }
        url::Url::parse(url).map_err(|e| DanmakuError::Usage(format!("invalid url {:?}: {}", url, e)))?;

        let start_time = Instant::now();

        info!("🌐 Fetching video page: {}", url);
        let page = self.fetcher.fetch(url).await?;
        let page = String::from_utf8_lossy(&page);

        let identity = self.extractor.extract(&page)?;
        info!(
            "🔍 cid {} with {} one-second buckets ({}ms)",
            identity.cid, identity.duration_seconds, identity.duration_millis
        );

        let retriever = CommentRetriever::new(&self.fetcher, self.config.source.comment_url_template.as_str());
        let xml = retriever.retrieve(&identity.cid).await?;

        let list = parse_comments(&xml)?;
        info!("📝 Parsed {} comments", list.comments.len());
        debug!("chatid={} maxlimit={}", list.chatid, list.maxlimit);

        let histogram = aggregate(&list.comments, identity.duration_seconds)?;
        let peak = histogram.peak();
        if let Some((second, count)) = peak {
            info!("📈 Peak: {} comments at {}", count, histogram.labels[second]);
        }

        let output_path = self
            .reporter
            .write(&histogram, &self.config.output.dir, &identity.cid)
            .await?;

        info!("🎉 Completed in {:.2}s", start_time.elapsed().as_secs_f64());

        Ok(ChartReport {
            cid: identity.cid,
            duration_seconds: identity.duration_seconds,
            comment_count: list.comments.len(),
            total_in_chart: histogram.total(),
            peak,
            output_path,
        })
    }
}
