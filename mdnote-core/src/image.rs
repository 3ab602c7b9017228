//! Out-of-band image payloads referenced from the document as `img:<id>`
//!
//! Pasted or dropped images are stored here under a short random id and the
//! document only carries the placeholder. Payloads are substituted back in
//! at render time.

use anyhow::{bail, Context, Result};
use base64::Engine as _;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

/// Prefix of an image placeholder token in document text
pub const PLACEHOLDER_PREFIX: &str = "img:";

/// Length of a generated image id
pub const ID_LEN: usize = 8;

fn placeholder_pattern() -> &'static Regex {
    static RE_IMG: OnceLock<Regex> = OnceLock::new();
    RE_IMG.get_or_init(|| Regex::new(r"img:([a-f0-9]{8})").expect("valid placeholder pattern"))
}

/// Short id to payload map
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageStore {
    images: BTreeMap<String, String>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a payload and return the id to embed as `img:<id>`
    pub fn save(&mut self, payload: impl Into<String>) -> String {
        let id = loop {
            let candidate = generate_id();
            if !self.images.contains_key(&candidate) {
                break candidate;
            }
            log::debug!("Image id collision on {candidate}, regenerating");
        };
        self.images.insert(id.clone(), payload.into());
        id
    }

    /// Look up a payload by id
    pub fn get(&self, id: &str) -> Option<&str> {
        self.images.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Replace every `img:<id>` token with its payload.
    ///
    /// Tokens without a stored payload are left as they are so a broken
    /// reference stays visible and recoverable.
    pub fn resolve(&self, text: &str) -> String {
        placeholder_pattern()
            .replace_all(text, |caps: &Captures<'_>| match self.get(&caps[1]) {
                Some(payload) => payload.to_string(),
                None => {
                    log::warn!("No stored image for placeholder {}", &caps[0]);
                    caps[0].to_string()
                }
            })
            .into_owned()
    }

    /// Load a store from a TOML file, returning an empty store if it is missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read image store: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse image store: {}", path.display()))
    }

    /// Write the store to a TOML file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string(self).context("Failed to serialize image store")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write image store: {}", path.display()))
    }
}

/// First eight hex digits of a random v4 UUID
fn generate_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(ID_LEN);
    id
}

/// Markdown image construct referencing a stored payload
pub fn image_markdown(alt: &str, id: &str) -> String {
    format!("![{alt}]({PLACEHOLDER_PREFIX}{id})")
}

/// Alt text for an image file: its name without the extension
pub fn alt_text(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// MIME type for an image file name, if it is a supported image
pub fn image_mime(file_name: &str) -> Option<&'static str> {
    let ext = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        _ => return None,
    };
    Some(mime)
}

/// Encode an image file as a base64 data URL.
///
/// Fails when the payload cannot be turned into an image reference: unknown
/// file type, empty content, or content over `max_bytes`.
pub fn data_url(file_name: &str, bytes: &[u8], max_bytes: u64) -> Result<String> {
    let Some(mime) = image_mime(file_name) else {
        bail!("Image payload could not be decoded: {file_name} is not a supported image type");
    };
    if bytes.is_empty() {
        bail!("Image payload could not be decoded: {file_name} is empty");
    }
    if bytes.len() as u64 > max_bytes {
        bail!(
            "Image payload could not be decoded: {file_name} is {} bytes (limit {max_bytes})",
            bytes.len()
        );
    }

    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    Ok(format!("data:{mime};base64,{encoded}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_generates_short_hex_id() {
        let mut store = ImageStore::new();
        let id = store.save("data:image/png;base64,AAAA");

        assert_eq!(id.len(), ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(store.get(&id), Some("data:image/png;base64,AAAA"));
    }

    #[test]
    fn test_ids_are_unique() {
        let mut store = ImageStore::new();
        for i in 0..200 {
            store.save(format!("payload-{i}"));
        }
        assert_eq!(store.len(), 200);
    }

    #[test]
    fn test_resolve_replaces_placeholder() {
        let mut store = ImageStore::new();
        let id = store.save("data:image/gif;base64,R0lG");
        let text = format!("before {} after", image_markdown("cat", &id));

        assert_eq!(
            store.resolve(&text),
            "before ![cat](data:image/gif;base64,R0lG) after"
        );
    }

    #[test]
    fn test_resolve_without_placeholders_is_identity() {
        let store = ImageStore::new();
        let text = "# Title\n\nimg: not a token, img:XYZ\n";
        assert_eq!(store.resolve(text), text);
    }

    #[test]
    fn test_missing_id_stays_literal() {
        let mut store = ImageStore::new();
        store.save("x");
        let text = "![gone](img:deadbeef)";
        assert_eq!(store.resolve(text), text);
    }

    #[test]
    fn test_alt_text_strips_extension() {
        assert_eq!(alt_text("holiday.photo.png"), "holiday.photo");
        assert_eq!(alt_text("screenshot"), "screenshot");
    }

    #[test]
    fn test_data_url_encoding() -> Result<()> {
        let url = data_url("pixel.PNG", &[0x89, b'P', b'N', b'G'], 1024)?;
        assert_eq!(url, "data:image/png;base64,iVBORw==");
        Ok(())
    }

    #[test]
    fn test_data_url_rejects_bad_payloads() {
        assert!(data_url("notes.txt", b"hello", 1024).is_err());
        assert!(data_url("empty.png", b"", 1024).is_err());
        assert!(data_url("big.jpg", &[0u8; 16], 8).is_err());
    }

    #[test]
    fn test_store_round_trips_through_file() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("images.toml");

        let mut store = ImageStore::new();
        let id = store.save("data:image/png;base64,AAAA");
        store.save_to(&path)?;

        let loaded = ImageStore::load_from(&path)?;
        assert_eq!(loaded, store);
        assert_eq!(loaded.get(&id), Some("data:image/png;base64,AAAA"));
        Ok(())
    }

    #[test]
    fn test_load_missing_file_is_empty() -> Result<()> {
        let dir = TempDir::new()?;
        let store = ImageStore::load_from(&dir.path().join("missing.toml"))?;
        assert!(store.is_empty());
        Ok(())
    }
}
