use std::fmt;

use serde::Deserialize;
use url::Url;

use crate::errors::SaverError;

/// Base every comment permalink is resolved against.
pub const REDDIT_BASE_URL: &str = "https://reddit.com";

/// Fullname prefix reddit uses for comments; every other kind exports as a link.
const COMMENT_KIND: &str = "t1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemType {
    Link,
    Comment,
}

impl ItemType {
    pub const ALL: [ItemType; 2] = [ItemType::Link, ItemType::Comment];

    pub const fn as_str(self) -> &'static str {
        match self {
            ItemType::Link => "Link",
            ItemType::Comment => "Comment",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const fn labels_equal(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

const _: () = {
    let mut i = 0;
    while i < ItemType::ALL.len() {
        let mut j = i + 1;
        while j < ItemType::ALL.len() {
            assert!(
                !labels_equal(ItemType::ALL[i].as_str(), ItemType::ALL[j].as_str()),
                "ItemType labels must be unique"
            );
            j += 1;
        }
        i += 1;
    }
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkItem {
    pub id: String,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentItem {
    pub id: String,
    pub link_title: String,
    /// Path relative to [`REDDIT_BASE_URL`], e.g. `/r/rust/comments/abc/_/def/`.
    pub permalink: String,
}

/// A saved post or comment, classified by its listing kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SavedItem {
    Link(LinkItem),
    Comment(CommentItem),
}

impl SavedItem {
    pub fn item_type(&self) -> ItemType {
        match self {
            SavedItem::Link(_) => ItemType::Link,
            SavedItem::Comment(_) => ItemType::Comment,
        }
    }
}

impl fmt::Display for SavedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SavedItem::Link(link) => write!(f, "Link(id={})", link.id),
            SavedItem::Comment(comment) => write!(f, "Comment(id={})", comment.id),
        }
    }
}

impl TryFrom<RawThing> for SavedItem {
    type Error = SaverError;

    fn try_from(raw: RawThing) -> Result<Self, Self::Error> {
        let data = raw.data;
        if raw.kind == COMMENT_KIND {
            Ok(SavedItem::Comment(CommentItem {
                id: data.id,
                link_title: require(data.link_title, "comment", "link_title")?,
                permalink: require(data.permalink, "comment", "permalink")?,
            }))
        } else {
            Ok(SavedItem::Link(LinkItem {
                id: data.id,
                title: require(data.title, "link", "title")?,
                url: require(data.url, "link", "url")?,
            }))
        }
    }
}

fn require(
    value: Option<String>,
    kind: &'static str,
    field: &'static str,
) -> Result<String, SaverError> {
    value.ok_or(SaverError::MissingAttribute { kind, field })
}

/// One output line: `title,url,type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub title: String,
    pub url: String,
    pub kind: ItemType,
}

impl ExportRow {
    pub fn from_item(item: &SavedItem) -> Result<Self, SaverError> {
        let row = match item {
            SavedItem::Link(link) => ExportRow {
                title: link.title.clone(),
                url: link.url.clone(),
                kind: ItemType::Link,
            },
            SavedItem::Comment(comment) => ExportRow {
                title: comment.link_title.clone(),
                url: resolve_permalink(&comment.permalink)?,
                kind: ItemType::Comment,
            },
        };
        Ok(row)
    }

    pub fn as_record(&self) -> [&str; 3] {
        [self.title.as_str(), self.url.as_str(), self.kind.as_str()]
    }
}

/// Joins `permalink` onto [`REDDIT_BASE_URL`].
///
/// Absolute URLs come back verbatim and root-relative paths are appended as-is,
/// so non-ASCII slugs and spaces are never percent-encoded.
pub fn resolve_permalink(permalink: &str) -> Result<String, SaverError> {
    if Url::parse(permalink).is_ok() {
        return Ok(permalink.to_string());
    }
    if permalink.starts_with('/') && !permalink.starts_with("//") {
        return Ok(format!("{REDDIT_BASE_URL}{permalink}"));
    }
    let base = Url::parse(REDDIT_BASE_URL)
        .map_err(|err| SaverError::InvalidUrl(format!("{REDDIT_BASE_URL}: {err}")))?;
    base.join(permalink)
        .map(|url| url.to_string())
        .map_err(|err| SaverError::InvalidUrl(format!("{permalink}: {err}")))
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeResponse {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Listing {
    pub data: ListingData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub children: Vec<RawThing>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawThing {
    pub kind: String,
    pub data: RawThingData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawThingData {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub link_title: Option<String>,
    #[serde(default)]
    pub permalink: Option<String>,
}
