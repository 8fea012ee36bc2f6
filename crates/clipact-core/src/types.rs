use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::color::Color;

// =============================================================================
// Enums
// =============================================================================

/// Classification of a clipboard entry, used for default-action resolution
/// and for per-action content filters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// Plain text.
    Text,
    /// A URL with an explicit scheme.
    Url,
    /// A textual color value (`#ff0000`, `rgb(...)`, `teal`, ...).
    Color,
    /// Image data; the entry content is a path or reference.
    Image,
    /// One or more file references.
    File,
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKind::Text => write!(f, "text"),
            ContentKind::Url => write!(f, "url"),
            ContentKind::Color => write!(f, "color"),
            ContentKind::Image => write!(f, "image"),
            ContentKind::File => write!(f, "file"),
        }
    }
}

impl std::str::FromStr for ContentKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(ContentKind::Text),
            "url" => Ok(ContentKind::Url),
            "color" => Ok(ContentKind::Color),
            "image" => Ok(ContentKind::Image),
            "file" => Ok(ContentKind::File),
            _ => Err(format!("Unknown content kind: {}", s)),
        }
    }
}

// =============================================================================
// Domain Structs
// =============================================================================

/// The subject of an action: one clipboard entry.
///
/// Entries are created by the clipboard source and handed to the engine per
/// invocation. The engine only ever borrows them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentEntry {
    pub content: String,
    /// Explicit classification from the clipboard source. When absent the
    /// kind is derived from the content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ContentKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl ContentEntry {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            kind: None,
            mime_type: None,
        }
    }

    pub fn with_kind(mut self, kind: ContentKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// The entry's classification.
    ///
    /// An explicit kind wins. Otherwise the content is classified as a color
    /// if it parses as one, as a URL if it carries a scheme, and as text.
    pub fn kind(&self) -> ContentKind {
        if let Some(kind) = self.kind {
            return kind;
        }
        if let Some(mime) = self.mime_type.as_deref() {
            if mime.starts_with("image/") {
                return ContentKind::Image;
            }
            if mime == "text/uri-list" {
                return ContentKind::File;
            }
        }
        classify(&self.content)
    }
}

/// Classify raw text content.
pub fn classify(content: &str) -> ContentKind {
    static URL: OnceLock<Regex> = OnceLock::new();
    let url = URL.get_or_init(|| {
        Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.\-]*://\S+$").expect("Invalid URL regex")
    });

    let trimmed = content.trim();
    if Color::parse(trimmed).is_some() {
        ContentKind::Color
    } else if url.is_match(trimmed) {
        ContentKind::Url
    } else {
        ContentKind::Text
    }
}
