//! Danmaku Chart
//!
//! Fetches a bilibili video page, locates its comment stream, counts the
//! timed comments (danmaku) landing in each second of playback and renders
//! the counts as a bar chart.

pub mod config;
pub mod danmaku;
pub mod error;
pub mod fetch;
pub mod processing;
pub mod report;

// Re-export main types for easy access
pub use crate::config::{Config, ConfigBuilder};
pub use crate::danmaku::{aggregate, axis_label, parse_comments, Danmaku, DanmakuList, Histogram};
pub use crate::danmaku::{CommentRetriever, IdentifierExtractor, VideoIdentity};
pub use crate::error::{DanmakuError, Result};
pub use crate::fetch::{Fetch, HttpFetcher};
pub use crate::processing::{ChartProcessor, ChartReport};
pub use crate::report::ChartReporter;
