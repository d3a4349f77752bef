//! Danmaku (timed comment) documents and the stages that turn them into a histogram
//!
//! The comment API returns an XML document rooted at `<i>` with a handful of
//! metadata elements followed by one `<d p="...">text</d>` per comment. The
//! `p` attribute is a comma separated parameter list whose first field is the
//! playback position in seconds.

pub mod extractor;
pub mod retriever;
pub mod histogram;

// Re-export main types
pub use extractor::{IdentifierExtractor, VideoIdentity};
pub use retriever::CommentRetriever;
pub use histogram::{aggregate, axis_label, Histogram};

use crate::error::{DanmakuError, Result};
use serde::{Deserialize, Serialize};
use xml::reader::{EventReader, XmlEvent};

/// Root element of every comment document
const ROOT_ELEMENT: &str = "i";

/// Parsed comment document
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DanmakuList {
    #[serde(default)]
    pub chatserver: String,
    #[serde(default)]
    pub chatid: u64,
    #[serde(default)]
    pub mission: i64,
    #[serde(default)]
    pub maxlimit: i64,
    #[serde(default)]
    pub state: i64,
    #[serde(default)]
    pub real_name: i64,
    #[serde(default)]
    pub source: String,
    /// Comments in document order
    #[serde(rename = "d", default)]
    pub comments: Vec<Danmaku>,
}

/// A single timed comment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Danmaku {
    /// Raw parameter string: position, mode, font size, color, send time, ...
    pub p: String,
    /// Comment text
    #[serde(rename = "$value", default)]
    pub text: String,
}

impl Danmaku {
    pub fn new(p: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            p: p.into(),
            text: text.into(),
        }
    }

    /// Whole-second playback position: the text before the first `.` of the
    /// first parameter, so `10.9` is second 10 (truncation, not rounding)
    pub fn second(&self) -> Result<i64> {
        let field = self.position_field();
        let whole = field.split('.').next().unwrap_or(field);
        whole.parse::<i64>().map_err(|e| {
            DanmakuError::Parse(format!("comment position {:?} is not numeric: {}", field, e))
        })
    }

    /// Full-precision playback position in seconds
    pub fn position(&self) -> Result<f64> {
        let field = self.position_field();
        field.parse::<f64>().map_err(|e| {
            DanmakuError::Parse(format!("comment position {:?} is not numeric: {}", field, e))
        })
    }

    fn position_field(&self) -> &str {
        self.p.split(',').next().unwrap_or("")
    }
}

/// Local name of the first element in the document
fn root_element(text: &str) -> Result<String> {
    for event in EventReader::from_str(text) {
        match event.map_err(|e| DanmakuError::Parse(format!("malformed comment XML: {}", e)))? {
            XmlEvent::StartElement { name, .. } => return Ok(name.local_name),
            XmlEvent::EndDocument => break,
            _ => {}
        }
    }
    Err(DanmakuError::Parse("comment XML has no root element".to_string()))
}

/// Deserialize a comment document; either the whole list or an error
pub fn parse_comments(xml: &[u8]) -> Result<DanmakuList> {
    let text = std::str::from_utf8(xml)
        .map_err(|e| DanmakuError::Parse(format!("comment XML is not UTF-8: {}", e)))?;

    if text.trim().is_empty() {
        return Err(DanmakuError::Parse("comment XML is empty".to_string()));
    }

    // serde-xml-rs ignores the root element name
    let root = root_element(text)?;
    if root != ROOT_ELEMENT {
        return Err(DanmakuError::Parse(format!(
            "comment XML root is <{}>, expected <{}>",
            root, ROOT_ELEMENT
        )));
    }

    let list: DanmakuList = serde_xml_rs::from_str(text)?;
    Ok(list)
}
