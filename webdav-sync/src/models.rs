use crate::error::ValidationError;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// Name of the synchronized document below the configured server URL
pub const REMOTE_FILE_NAME: &str = "quick_release_video_config.json";

/// A named URL in the site list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SiteEntry {
    pub name: String,
    pub url: String,
}

impl SiteEntry {
    /// Builds an entry from user input: trims both fields, rejects empty ones
    /// and prepends `https://` when no http(s) scheme is given.
    pub fn new(name: &str, url: &str) -> Result<Self, ValidationError> {
        let name = name.trim();
        let url = url.trim();

        if name.is_empty() {
            return Err(ValidationError::MissingField {
                index: None,
                field: "name",
            });
        }
        if url.is_empty() {
            return Err(ValidationError::MissingField {
                index: None,
                field: "url",
            });
        }

        Ok(Self {
            name: name.to_string(),
            url: normalize_url(url),
        })
    }
}

/// Default-scheme normalization applied to user-entered URLs
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

/// Ordered site list. Order is display order and open order.
///
/// There is no `Deserialize` impl on purpose: documents from disk, from an
/// import file or from the server go through [`SiteList::from_json`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SiteList(Vec<SiteEntry>);

impl SiteList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Parses and validates the JSON array form.
    ///
    /// Every element must be an object with non-empty string `name` and `url`.
    /// Unknown fields are ignored. The first violation rejects the whole document.
    pub fn from_json(text: &str) -> Result<Self, ValidationError> {
        let value: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| ValidationError::InvalidJson(e.to_string()))?;

        let items = match value {
            serde_json::Value::Array(items) => items,
            _ => return Err(ValidationError::NotAnArray),
        };

        let mut entries = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let obj = item
                .as_object()
                .ok_or(ValidationError::NotAnObject { index })?;
            let name = required_str(obj, "name", index)?;
            let url = required_str(obj, "url", index)?;
            entries.push(SiteEntry {
                name: name.to_string(),
                url: url.to_string(),
            });
        }

        Ok(Self(entries))
    }

    /// Compact JSON, used for the local mirror
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.0)
    }

    /// Two-space indented JSON, used for upload and export
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SiteEntry> {
        self.0.iter()
    }

    pub fn get(&self, index: usize) -> Option<&SiteEntry> {
        self.0.get(index)
    }

    /// Exact string match on `url`
    pub fn contains_url(&self, url: &str) -> bool {
        self.0.iter().any(|site| site.url == url)
    }

    pub fn urls(&self) -> Vec<String> {
        self.0.iter().map(|site| site.url.clone()).collect()
    }

    pub fn push(&mut self, entry: SiteEntry) {
        self.0.push(entry);
    }

    pub fn remove(&mut self, index: usize) -> Option<SiteEntry> {
        if index < self.0.len() {
            Some(self.0.remove(index))
        } else {
            None
        }
    }

    /// Moves the entry at `from` so that it ends up at position `to`.
    /// Returns false when either index is out of range.
    pub fn move_entry(&mut self, from: usize, to: usize) -> bool {
        if from >= self.0.len() || to >= self.0.len() {
            return false;
        }
        let entry = self.0.remove(from);
        self.0.insert(to, entry);
        true
    }
}

impl From<Vec<SiteEntry>> for SiteList {
    fn from(entries: Vec<SiteEntry>) -> Self {
        Self(entries)
    }
}

impl<'a> IntoIterator for &'a SiteList {
    type Item = &'a SiteEntry;
    type IntoIter = std::slice::Iter<'a, SiteEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

fn required_str<'a>(
    obj: &'a serde_json::Map<String, serde_json::Value>,
    field: &'static str,
    index: usize,
) -> Result<&'a str, ValidationError> {
    obj.get(field)
        .and_then(serde_json::Value::as_str)
        .filter(|value| !value.trim().is_empty())
        .ok_or(ValidationError::MissingField {
            index: Some(index),
            field,
        })
}

/// WebDAV endpoint settings.
///
/// Treated as an immutable value: sync operations work on a clone taken at
/// their start, and changes are published as a whole new value.
#[derive(Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub server: String,
    pub username: String,
    pub password: String,
    pub sync_enabled: bool,
    pub auto_sync: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            server: String::new(),
            username: String::new(),
            password: String::new(),
            sync_enabled: false,
            auto_sync: true,
        }
    }
}

impl SyncConfig {
    /// Creates a disabled config with a normalized server URL
    pub fn new(server: &str, username: &str, password: &str) -> Self {
        Self {
            server: server.trim().to_string(),
            username: username.trim().to_string(),
            password: password.to_string(),
            ..Self::default()
        }
        .with_trailing_separator()
    }

    /// Ensures a non-empty server URL ends with `/`
    pub fn with_trailing_separator(mut self) -> Self {
        if !self.server.is_empty() && !self.server.ends_with('/') {
            self.server.push('/');
        }
        self
    }

    /// The collection URL, always with a trailing separator
    pub fn collection_url(&self) -> String {
        self.clone().with_trailing_separator().server
    }

    /// The URL of the synchronized document
    pub fn resource_url(&self) -> String {
        format!("{}{}", self.collection_url(), REMOTE_FILE_NAME)
    }

    pub fn has_credentials(&self) -> bool {
        !self.server.trim().is_empty()
            && !self.username.trim().is_empty()
            && !self.password.is_empty()
    }

    pub fn is_auto_sync_active(&self) -> bool {
        self.sync_enabled && self.auto_sync
    }

    /// `Basic base64(username:password)`
    pub fn authorization_header(&self) -> String {
        let credentials = format!("{}:{}", self.username, self.password);
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(credentials)
        )
    }
}

impl std::fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncConfig")
            .field("server", &self.server)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("sync_enabled", &self.sync_enabled)
            .field("auto_sync", &self.auto_sync)
            .finish()
    }
}
