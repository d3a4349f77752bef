//! Single-shot authenticated HTTP GET with transparent raw-DEFLATE decoding
use crate::config::HttpConfig;
use crate::error::{DanmakuError, Result};
use async_trait::async_trait;
use flate2::read::DeflateDecoder;
use reqwest::header::{CONTENT_ENCODING, COOKIE};
use reqwest::Client;
use std::io::Read;
use std::time::Duration;
use tracing::{debug, warn};

/// Anything able to turn a URL into a fully read, decoded body
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// reqwest-backed fetcher carrying the fixed User-Agent and session cookie
pub struct HttpFetcher {
    client: Client,
    cookie: String,
    check_status: bool,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.as_str());
        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            cookie: config.cookie.clone(),
            check_status: config.check_status,
        })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        debug!("GET {}", url);

        let mut request = self.client.get(url);
        if !self.cookie.is_empty() {
            request = request.header(COOKIE, self.cookie.as_str());
        }

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            if self.check_status {
                return Err(DanmakuError::HttpStatus {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }
            warn!("⚠️ {} answered {}, reading body anyway", url, status);
        }

        let deflate = response
            .headers()
            .get(CONTENT_ENCODING)
            .and_then(|v| v.to_str().ok())
            .map(is_deflate)
            .unwrap_or(false);

        let body = response.bytes().await?;
        debug!("Received {} bytes (deflate: {})", body.len(), deflate);

        if deflate {
            inflate(&body)
        } else {
            Ok(body.to_vec())
        }
    }
}

fn is_deflate(encoding: &str) -> bool {
    encoding.trim().eq_ignore_ascii_case("deflate")
}

/// Decode a raw DEFLATE stream (no zlib header)
pub fn inflate(compressed: &[u8]) -> Result<Vec<u8>> {
    let mut decoded = Vec::new();
    DeflateDecoder::new(compressed)
        .read_to_end(&mut decoded)
        .map_err(DanmakuError::Decompress)?;
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::DeflateEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn test_inflate_raw_deflate() {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all("<i><d p=\"1.0\">草</d></i>".as_bytes()).unwrap();
        let compressed = encoder.finish().unwrap();

        let decoded = inflate(&compressed).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), "<i><d p=\"1.0\">草</d></i>");
    }

    #[test]
    fn test_inflate_rejects_garbage() {
        let result = inflate(&[0xff, 0xff, 0xff, 0xff]);
        assert!(matches!(result, Err(DanmakuError::Decompress(_))));
    }

    #[test]
    fn test_content_encoding_match() {
        assert!(is_deflate("deflate"));
        assert!(is_deflate(" Deflate "));
        assert!(!is_deflate("gzip"));
        assert!(!is_deflate(""));
    }

    #[test]
    fn test_fetcher_builds_with_timeout() {
        let config = HttpConfig {
            timeout_seconds: Some(5),
            ..HttpConfig::default()
        };
        assert!(HttpFetcher::new(&config).is_ok());
    }
}
