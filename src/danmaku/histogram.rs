//! Per-second comment counts and their time-axis labels
use super::Danmaku;
use crate::error::{DanmakuError, Result};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Histogram {
    /// `buckets[t]` = number of comments at whole second `t`
    pub buckets: Vec<u64>,
    /// `labels[t]` = rendering of `t` seconds, same length as `buckets`
    pub labels: Vec<String>,
}

impl Histogram {
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.buckets.iter().sum()
    }

    /// Busiest second and its count; earliest second on ties
    pub fn peak(&self) -> Option<(usize, u64)> {
        self.buckets
            .iter()
            .copied()
            .enumerate()
            .fold(None, |best, (second, count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((second, count)),
            })
    }
}

/// Count comments per whole second over `[0, duration_seconds)`
///
/// A position outside the range is an error; it is never clamped or dropped,
/// and no partial histogram is returned.
pub fn aggregate(comments: &[Danmaku], duration_seconds: usize) -> Result<Histogram> {
    if duration_seconds == 0 {
        return Err(DanmakuError::Parse("video duration is zero seconds".to_string()));
    }

    let mut buckets: Vec<u64> = Vec::new();
    buckets.try_reserve_exact(duration_seconds).map_err(|e| {
        DanmakuError::Parse(format!("cannot allocate {} buckets: {}", duration_seconds, e))
    })?;
    buckets.resize(duration_seconds, 0);

    for comment in comments {
        let second = comment.second()?;
        match usize::try_from(second).ok().filter(|&index| index < duration_seconds) {
            Some(index) => buckets[index] += 1,
            None => {
                return Err(DanmakuError::Index {
                    position: second,
                    len: duration_seconds,
                })
            }
        }
    }

    let mut labels = Vec::new();
    labels.try_reserve_exact(duration_seconds).map_err(|e| {
        DanmakuError::Parse(format!("cannot allocate {} labels: {}", duration_seconds, e))
    })?;
    labels.extend((0..duration_seconds as u64).map(axis_label));

    Ok(Histogram { buckets, labels })
}

/// `0s`, `59s`, `1m0s`, `1h2m3s`
pub fn axis_label(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{}h{}m{}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}
