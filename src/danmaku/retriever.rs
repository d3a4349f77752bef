//! Downloads the comment document for a content identifier
use crate::error::{DanmakuError, Result};
use crate::fetch::Fetch;
use tracing::info;

pub struct CommentRetriever<'a, F: Fetch + ?Sized> {
    fetcher: &'a F,
    url_template: String,
}

impl<'a, F: Fetch + ?Sized> CommentRetriever<'a, F> {
    pub fn new(fetcher: &'a F, url_template: impl Into<String>) -> Self {
        Self {
            fetcher,
            url_template: url_template.into(),
        }
    }

    /// Comment document URL for `cid`
    pub fn comment_url(&self, cid: &str) -> Result<String> {
        if !self.url_template.contains("{cid}") {
            return Err(DanmakuError::Config(format!(
                "comment URL template has no {{cid}} placeholder: {}",
                self.url_template
            )));
        }
        Ok(self.url_template.replace("{cid}", cid))
    }

    /// Fetch the (already inflated) comment XML
    pub async fn retrieve(&self, cid: &str) -> Result<Vec<u8>> {
        let url = self.comment_url(cid)?;
        info!("💬 Downloading comments: {}", url);
        self.fetcher.fetch(&url).await
    }
}
