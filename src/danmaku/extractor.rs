//! Pulls the content identifier and duration out of a raw video page
use crate::config::SourceConfig;
use crate::error::{DanmakuError, Result};
use regex::Regex;
use tracing::debug;

/// Identity of a video as far as the comment API is concerned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoIdentity {
    /// Content identifier (cid) keying the comment stream
    pub cid: String,
    /// Duration as embedded in the page
    pub duration_millis: u64,
    /// `duration_millis / 1000 + padding`, one histogram bucket per second
    pub duration_seconds: usize,
}

/// Fixed-pattern extractor over an undocumented page format
///
/// Example chunk URL: `https://cn-sh-ix-bcache-06.bilivideo.com/upgcxcode/53/29/170132953/170132953-1-30112.m4s`
/// matches `upgcxcode/53/29/170132953/`, whose fourth `/` field is the cid.
/// Example duration: `"format":"flv360","timelength":2539267,"accept_format"`.
#[derive(Debug, Clone)]
pub struct IdentifierExtractor {
    cid_pattern: Regex,
    length_pattern: Regex,
    digits: Regex,
    padding_seconds: u64,
    max_seconds: u64,
}

impl IdentifierExtractor {
    /// Extractor using the built-in bilibili patterns and 2s padding
    pub fn new() -> Result<Self> {
        Self::from_config(&SourceConfig::default())
    }

    pub fn from_config(config: &SourceConfig) -> Result<Self> {
        Ok(
            Self::with_patterns(&config.cid_pattern, &config.length_pattern, config.duration_padding_seconds)?
                .with_max_duration(config.max_duration_seconds),
        )
    }

    pub fn with_patterns(cid_pattern: &str, length_pattern: &str, padding_seconds: u64) -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern)
                .map_err(|e| DanmakuError::Config(format!("invalid pattern {:?}: {}", pattern, e)))
        };

        Ok(Self {
            cid_pattern: compile(cid_pattern)?,
            length_pattern: compile(length_pattern)?,
            digits: compile(r"[\d]+")?,
            padding_seconds,
            max_seconds: SourceConfig::default().max_duration_seconds,
        })
    }

    /// Reject pages whose padded duration exceeds `seconds`
    pub fn with_max_duration(mut self, seconds: u64) -> Self {
        self.max_seconds = seconds;
        self
    }

    /// Extract cid and padded duration from page text
    pub fn extract(&self, page: &str) -> Result<VideoIdentity> {
        let cid = self.extract_cid(page)?;
        let duration_millis = self.extract_duration_millis(page)?;
        let padded = (duration_millis / 1000)
            .checked_add(self.padding_seconds)
            .filter(|&seconds| seconds <= self.max_seconds)
            .ok_or_else(|| {
                DanmakuError::Parse(format!(
                    "timelength {}ms exceeds the {}s limit",
                    duration_millis, self.max_seconds
                ))
            })?;
        let duration_seconds = usize::try_from(padded)
            .map_err(|_| DanmakuError::Parse(format!("duration {}s does not fit in memory", padded)))?;

        debug!("cid={} timelength={}ms buckets={}", cid, duration_millis, duration_seconds);

        Ok(VideoIdentity {
            cid,
            duration_millis,
            duration_seconds,
        })
    }

    /// First chunk-path match, split on `/`, field index 3
    pub fn extract_cid(&self, page: &str) -> Result<String> {
        let fragment = self
            .cid_pattern
            .find(page)
            .ok_or(DanmakuError::Extraction("cid"))?
            .as_str();
        debug!("Matched cid fragment: {}", fragment);

        fragment
            .split('/')
            .nth(3)
            .filter(|field| !field.is_empty())
            .map(str::to_string)
            .ok_or(DanmakuError::Extraction("cid"))
    }

    /// First `timelength":N,` match, digits parsed as milliseconds
    pub fn extract_duration_millis(&self, page: &str) -> Result<u64> {
        let fragment = self
            .length_pattern
            .find(page)
            .ok_or(DanmakuError::Extraction("length"))?
            .as_str();
        debug!("Matched length fragment: {}", fragment);

        let digits = self
            .digits
            .find(fragment)
            .ok_or_else(|| DanmakuError::Parse(format!("no digits in {:?}", fragment)))?
            .as_str();

        Ok(digits.parse::<u64>()?)
    }
}
