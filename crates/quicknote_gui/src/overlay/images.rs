//! Image resolution collaborator and the session image cache.

use crate::error::GuiError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Where a resolved image was loaded from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageLocation {
    File(PathBuf),
}

impl ImageLocation {
    /// URL handed to the system viewer.
    pub fn to_url(&self) -> String {
        match self {
            Self::File(path) => format!("file://{}", path.display()),
        }
    }
}

/// Decoded image ready for display.
#[derive(Clone, Debug)]
pub struct ResolvedImage {
    pub location: ImageLocation,
    /// `[width, height]` in pixels.
    pub size: [u32; 2],
    /// Unpremultiplied RGBA8 pixels, row-major.
    pub rgba: Arc<Vec<u8>>,
}

/// Turns markdown image sources into loadable images.
pub trait ImageResolver {
    /// Base directory for vault-relative sources.
    fn set_vault_root(&mut self, root: Option<PathBuf>);

    /// # Returns
    /// `None` when the source cannot be found or decoded.
    fn resolve(&self, source: &str) -> Option<ResolvedImage>;
}

/// Filesystem resolver: `file://` URLs, then vault-relative paths, then
/// plain filesystem paths.
#[derive(Debug, Default)]
pub struct VaultImageResolver {
    vault_root: Option<PathBuf>,
}

impl VaultImageResolver {
    pub fn new(vault_root: Option<PathBuf>) -> Self {
        Self { vault_root }
    }

    /// Path a source points at, if any candidate exists on disk.
    pub fn locate(&self, source: &str) -> Result<PathBuf, GuiError> {
        let source = source.trim();
        if let Some((scheme, rest)) = split_scheme(source) {
            if !scheme.eq_ignore_ascii_case("file") {
                return Err(GuiError::UnsupportedLocation(source.to_string()));
            }
            let path = PathBuf::from(rest.strip_prefix("localhost").unwrap_or(rest));
            return if path.is_file() {
                Ok(path)
            } else {
                Err(not_found(&path))
            };
        }
        if let Some(root) = self.vault_root.as_ref() {
            let candidate = root.join(source);
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
        let path = PathBuf::from(source);
        if path.is_file() {
            Ok(path)
        } else {
            Err(not_found(&path))
        }
    }

    fn load(&self, source: &str) -> Result<ResolvedImage, GuiError> {
        let path = self.locate(source)?;
        let decoded = image::open(&path).map_err(|err| GuiError::ImageDecode {
            path: path.clone(),
            message: err.to_string(),
        })?;
        let rgba = decoded.to_rgba8();
        let size = [rgba.width(), rgba.height()];
        Ok(ResolvedImage {
            location: ImageLocation::File(path),
            size,
            rgba: Arc::new(rgba.into_raw()),
        })
    }
}

impl ImageResolver for VaultImageResolver {
    fn set_vault_root(&mut self, root: Option<PathBuf>) {
        self.vault_root = root;
    }

    fn resolve(&self, source: &str) -> Option<ResolvedImage> {
        match self.load(source) {
            Ok(image) => Some(image),
            Err(err) => {
                debug!("image '{}' not resolved: {}", source, err);
                None
            }
        }
    }
}

fn not_found(path: &Path) -> GuiError {
    GuiError::io(
        path,
        std::io::Error::new(std::io::ErrorKind::NotFound, "image file not found"),
    )
}

/// `("scheme", rest)` for `scheme://rest` sources.
fn split_scheme(source: &str) -> Option<(&str, &str)> {
    let (scheme, rest) = source.split_once("://")?;
    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some((scheme, rest))
}

/// Successful resolutions keyed by source string.
///
/// Entries live for the whole session; changing the vault root does not
/// evict them.
#[derive(Debug, Default)]
pub struct ImageCache {
    entries: HashMap<String, Arc<ResolvedImage>>,
}

impl ImageCache {
    pub fn get_or_resolve(
        &mut self,
        source: &str,
        resolver: &dyn ImageResolver,
    ) -> Option<Arc<ResolvedImage>> {
        if let Some(image) = self.entries.get(source) {
            return Some(Arc::clone(image));
        }
        let image = Arc::new(resolver.resolve(source)?);
        self.entries.insert(source.to_string(), Arc::clone(&image));
        Some(image)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
