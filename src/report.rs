//! Bar chart rendering to a standalone ECharts HTML page
use crate::config::OutputConfig;
use crate::danmaku::Histogram;
use crate::error::Result;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct ChartReporter {
    title: String,
    series_name: String,
    width: u32,
    height: u32,
    echarts_url: String,
}

impl ChartReporter {
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            title: config.title.clone(),
            series_name: config.series_name.clone(),
            width: config.width,
            height: config.height,
            echarts_url: config.echarts_url.clone(),
        }
    }

    /// ECharts option object: title, toolbox, time axis, one bar series
    pub fn chart_option(&self, histogram: &Histogram) -> serde_json::Value {
        json!({
            "title": { "text": self.title },
            "toolbox": {
                "show": true,
                "feature": {
                    "saveAsImage": {},
                    "dataZoom": {},
                    "restore": {}
                }
            },
            "tooltip": { "trigger": "axis" },
            "legend": { "data": [self.series_name] },
            "xAxis": { "type": "category", "data": histogram.labels },
            "yAxis": { "type": "value" },
            "series": [{
                "name": self.series_name,
                "type": "bar",
                "data": histogram.buckets
            }]
        })
    }

    pub fn render(&self, histogram: &Histogram) -> String {
        // `</` must not appear verbatim inside the inline script
        let option = self.chart_option(histogram).to_string().replace("</", "<\\/");
        let generated = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{script}"></script>
</head>
<body>
<!-- generated {generated} -->
<div id="danmaku-chart" style="width:{width}px;height:{height}px;"></div>
<script type="text/javascript">
  var chart = echarts.init(document.getElementById("danmaku-chart"));
  chart.setOption({option});
</script>
</body>
</html>
"#,
            title = html_escape::encode_text(&self.title),
            script = html_escape::encode_double_quoted_attribute(&self.echarts_url),
            generated = generated,
            width = self.width,
            height = self.height,
            option = option,
        )
    }

    /// Write `<dir>/<cid>.html`
    pub async fn write(&self, histogram: &Histogram, dir: &Path, cid: &str) -> Result<PathBuf> {
        let path = dir.join(format!("{}.html", cid));
        let html = self.render(histogram);
        debug!("Rendered {} bytes of HTML", html.len());

        tokio::fs::write(&path, html).await?;
        info!("📊 Chart written to: {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::danmaku::{aggregate, Danmaku};

    fn histogram() -> Histogram {
        aggregate(&[Danmaku::new("1.2,1", "a"), Danmaku::new("1.8,1", "b")], 3).unwrap()
    }

    #[test]
    fn test_chart_option() {
        let reporter = ChartReporter::new(&OutputConfig::default());
        let option = reporter.chart_option(&histogram());

        assert_eq!(option["title"]["text"], "弹幕分布图");
        assert_eq!(option["toolbox"]["show"], true);
        assert_eq!(option["xAxis"]["data"], json!(["0s", "1s", "2s"]));
        assert_eq!(option["series"][0]["name"], "弹幕量");
        assert_eq!(option["series"][0]["type"], "bar");
        assert_eq!(option["series"][0]["data"], json!([0, 2, 0]));
    }

    #[test]
    fn test_render_sizes_and_escapes() {
        let config = OutputConfig {
            title: "<b>&</b>".to_string(),
            ..OutputConfig::default()
        };
        let html = ChartReporter::new(&config).render(&histogram());

        assert!(html.contains("width:1000px;height:500px;"));
        assert!(html.contains("<title>&lt;b&gt;&amp;&lt;/b&gt;</title>"));
        assert!(!html.contains(r#""text":"<b>&</b>""#));
        assert!(html.contains("echarts.min.js"));
    }

    #[test]
    fn test_render_escapes_script_attribute() {
        let config = OutputConfig {
            echarts_url: r#"https://cdn.example.com/echarts.js?a=1&b="2""#.to_string(),
            ..OutputConfig::default()
        };
        let html = ChartReporter::new(&config).render(&histogram());

        assert!(html.contains(r#"<script src="https://cdn.example.com/echarts.js?a=1&amp;b=&quot;2&quot;"></script>"#));
    }

    #[tokio::test]
    async fn test_write_uses_cid_filename() {
        let dir = tempfile::TempDir::new().unwrap();
        let reporter = ChartReporter::new(&OutputConfig::default());

        let path = reporter.write(&histogram(), dir.path(), "170132953").await.unwrap();

        assert_eq!(path, dir.path().join("170132953.html"));
        let html = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#""data":[0,2,0]"#));
    }

    #[tokio::test]
    async fn test_write_into_missing_dir_fails() {
        let reporter = ChartReporter::new(&OutputConfig::default());
        let result = reporter
            .write(&histogram(), Path::new("/nonexistent/danmaku-chart"), "1")
            .await;
        assert!(result.is_err());
    }
}
