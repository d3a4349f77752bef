use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the danmaku chart generator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Outbound request settings
    pub http: HttpConfig,

    /// Upstream page and comment source settings
    pub source: SourceConfig,

    /// Chart output settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Session cookie sent with every request (omitted when empty)
    pub cookie: String,

    /// Request timeout in seconds (None = wait forever)
    pub timeout_seconds: Option<u64>,

    /// Fail on non-2xx responses instead of reading the body regardless
    pub check_status: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Comment document URL, `{cid}` is replaced by the content identifier
    pub comment_url_template: String,

    /// Pattern locating the chunk path that carries the cid
    pub cid_pattern: String,

    /// Pattern locating the millisecond duration
    pub length_pattern: String,

    /// Seconds added to the computed duration
    pub duration_padding_seconds: u64,

    /// Longest padded duration accepted, one histogram bucket per second
    pub max_duration_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving `<cid>.html`
    pub dir: PathBuf,

    /// Chart title
    pub title: String,

    /// Name of the bar series
    pub series_name: String,

    /// Chart width in pixels
    pub width: u32,

    /// Chart height in pixels
    pub height: u32,

    /// ECharts script location embedded in the page
    pub echarts_url: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (X11; Linux x86_64; rv:74.0) Gecko/20100101 Firefox/74.0"
                .to_string(),
            cookie: String::new(),
            timeout_seconds: None,
            check_status: false,
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            comment_url_template: "https://api.bilibili.com/x/v1/dm/list.so?oid={cid}".to_string(),
            cid_pattern: r"upgcxcode/[\d]+/[\d]+/[\d]+/".to_string(),
            length_pattern: r#"timelength":[\d]+,"#.to_string(),
            duration_padding_seconds: 2,
            max_duration_seconds: 86_400,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            title: "弹幕分布图".to_string(),
            series_name: "弹幕量".to_string(),
            width: 1000,
            height: 500,
            echarts_url: "https://cdn.jsdelivr.net/npm/echarts@5/dist/echarts.min.js".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            source: SourceConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the first readable default location, or defaults
    pub fn load() -> Result<Self> {
        let config_paths = ["danmaku-chart.toml", "config/danmaku-chart.toml"];

        let mut config = None;
        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str::<Config>(&config_str) {
                    Ok(parsed) => {
                        tracing::info!("📄 Loaded configuration from: {}", path);
                        config = Some(parsed);
                        break;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        let mut config = config.unwrap_or_default();
        config.apply_env();
        Ok(config)
    }

    /// Load configuration from an explicit file; unlike `load`, failures are errors
    pub fn load_from(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read config file {}", path.display()))?;
        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        tracing::info!("📄 Loaded configuration from: {}", path.display());
        config.apply_env();
        Ok(config)
    }

    /// Override with environment variables
    pub fn apply_env(&mut self) {
        if let Ok(cookie) = std::env::var("DANMAKU_CHART_COOKIE") {
            self.http.cookie = cookie;
        }

        if let Ok(user_agent) = std::env::var("DANMAKU_CHART_USER_AGENT") {
            self.http.user_agent = user_agent;
        }

        if let Ok(timeout) = std::env::var("DANMAKU_CHART_TIMEOUT") {
            match timeout.parse() {
                Ok(secs) => self.http.timeout_seconds = Some(secs),
                Err(_) => tracing::warn!("Ignoring non-numeric DANMAKU_CHART_TIMEOUT: {}", timeout),
            }
        }

        if let Ok(output_dir) = std::env::var("DANMAKU_CHART_OUTPUT_DIR") {
            self.output.dir = PathBuf::from(output_dir);
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(anyhow!("user_agent must not be empty"));
        }

        if !self.source.comment_url_template.contains("{cid}") {
            return Err(anyhow!(
                "comment_url_template must contain a {{cid}} placeholder: {}",
                self.source.comment_url_template
            ));
        }

        regex::Regex::new(&self.source.cid_pattern)
            .with_context(|| format!("Invalid cid_pattern: {}", self.source.cid_pattern))?;
        regex::Regex::new(&self.source.length_pattern)
            .with_context(|| format!("Invalid length_pattern: {}", self.source.length_pattern))?;

        if self.source.max_duration_seconds == 0 {
            return Err(anyhow!("max_duration_seconds must be greater than 0"));
        }

        if self.output.width == 0 || self.output.height == 0 {
            return Err(anyhow!("chart width and height must be greater than 0"));
        }

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Danmaku Chart Configuration:\n\
            - User-Agent: {}\n\
            - Cookie: {}\n\
            - Timeout: {}\n\
            - Status Check: {}\n\
            - Comment URL: {}\n\
            - Duration Padding: {}s\n\
            - Max Duration: {}s\n\
            - Output Directory: {}\n\
            - Chart Size: {}x{}",
            self.http.user_agent,
            if self.http.cookie.is_empty() { "not set" } else { "set" },
            self.http
                .timeout_seconds
                .map(|s| format!("{}s", s))
                .unwrap_or_else(|| "unbounded".to_string()),
            self.http.check_status,
            self.source.comment_url_template,
            self.source.duration_padding_seconds,
            self.source.max_duration_seconds,
            self.output.dir.display(),
            self.output.width,
            self.output.height
        )
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.config.http.cookie = cookie.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.http.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.config.http.timeout_seconds = Some(seconds);
        self
    }

    pub fn check_status(mut self, enable: bool) -> Self {
        self.config.http.check_status = enable;
        self
    }

    pub fn with_comment_url_template(mut self, template: impl Into<String>) -> Self {
        self.config.source.comment_url_template = template.into();
        self
    }

    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.config.output.dir = dir;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
