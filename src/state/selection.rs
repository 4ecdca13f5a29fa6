/// Selection store: the one image the user has picked
///
/// Holds exactly one `SelectedFile` at a time. Every selection owns a
/// `PreviewRef`; replacing the selection or dropping the store releases
/// it. The live count in `PreviewRegistry` lets callers check that
/// creates and releases stay paired.

use iced::widget::image::Handle;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// Tracks outstanding preview references
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    inner: Arc<RegistryInner>,
}

#[derive(Debug, Default)]
struct RegistryInner {
    next_id: AtomicU64,
    live: AtomicUsize,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a preview reference for `bytes`
    pub fn acquire(&self, bytes: Vec<u8>) -> PreviewRef {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.inner.live.fetch_add(1, Ordering::Relaxed);
        PreviewRef {
            id,
            handle: Handle::from_bytes(bytes),
            registry: self.inner.clone(),
        }
    }

    /// Number of preview references not yet released
    pub fn live(&self) -> usize {
        self.inner.live.load(Ordering::Relaxed)
    }
}

/// Revocable preview of a selected image
///
/// Released exactly once, when dropped.
#[derive(Debug)]
pub struct PreviewRef {
    id: u64,
    handle: Handle,
    registry: Arc<RegistryInner>,
}

impl PreviewRef {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Image handle for rendering
    pub fn handle(&self) -> &Handle {
        &self.handle
    }
}

impl Drop for PreviewRef {
    fn drop(&mut self) {
        self.registry.live.fetch_sub(1, Ordering::Relaxed);
        log::debug!("🧹 Released preview #{}", self.id);
    }
}

/// Best-effort metadata sniffed from the image bytes
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInfo {
    pub format: String,
    pub width: u32,
    pub height: u32,
}

impl ImageInfo {
    /// Sniff format and dimensions. `None` if the bytes aren't recognised;
    /// content is not validated here, the endpoint decides.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        let reader = image::ImageReader::new(std::io::Cursor::new(bytes))
            .with_guessed_format()
            .ok()?;
        let format = reader.format()?;
        let (width, height) = reader.into_dimensions().ok()?;
        Some(Self {
            format: format!("{:?}", format).to_uppercase(),
            width,
            height,
        })
    }
}

/// A picked image, pending submission
#[derive(Debug)]
pub struct SelectedFile {
    /// File name sent with the upload (e.g. "cat.png")
    pub name: String,
    /// Where it came from, if it came from disk
    pub path: Option<PathBuf>,
    /// Raw bytes of the file
    pub content: Vec<u8>,
    pub info: Option<ImageInfo>,
    preview: PreviewRef,
}

impl SelectedFile {
    pub fn preview(&self) -> &PreviewRef {
        &self.preview
    }

    /// MIME type guessed from the file name
    pub fn mime_type(&self) -> &'static str {
        image::ImageFormat::from_path(&self.name)
            .map(|format| format.to_mime_type())
            .unwrap_or("application/octet-stream")
    }
}

/// Bytes read from disk, not yet turned into a selection
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub name: String,
    pub path: Option<PathBuf>,
    pub content: Vec<u8>,
}

/// Holds the current selection
#[derive(Debug, Default)]
pub struct SelectionStore {
    registry: PreviewRegistry,
    current: Option<SelectedFile>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: PreviewRegistry) -> Self {
        Self {
            registry,
            current: None,
        }
    }

    /// Replace the selection. The previous preview is released here.
    pub fn select_file(&mut self, file: LoadedFile) -> &SelectedFile {
        let info = ImageInfo::sniff(&file.content);
        let preview = self.registry.acquire(file.content.clone());
        log::info!(
            "🖼️  Selected {} ({} bytes, preview #{})",
            file.name,
            file.content.len(),
            preview.id()
        );

        // Assigning drops the old SelectedFile and with it the old preview
        self.current.insert(SelectedFile {
            name: file.name,
            path: file.path,
            content: file.content,
            info,
            preview,
        })
    }

    pub fn current_file(&self) -> Option<&SelectedFile> {
        self.current.as_ref()
    }

    /// Drop the selection and its preview
    pub fn release(&mut self) {
        self.current = None;
    }

    pub fn registry(&self) -> &PreviewRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(name: &str) -> LoadedFile {
        LoadedFile {
            name: name.to_string(),
            path: None,
            content: name.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_select_replaces_previous() {
        let mut store = SelectionStore::new();
        assert!(store.current_file().is_none());

        store.select_file(loaded("cat.png"));
        store.select_file(loaded("dog.png"));

        assert_eq!(store.current_file().unwrap().name, "dog.png");
        assert_eq!(store.registry().live(), 1);
    }

    #[test]
    fn test_previews_are_released_on_replace_and_teardown() {
        let registry = PreviewRegistry::new();
        {
            let mut store = SelectionStore::with_registry(registry.clone());
            for i in 0..10 {
                store.select_file(loaded(&format!("img{}.png", i)));
                assert_eq!(registry.live(), 1);
            }
        }
        assert_eq!(registry.live(), 0);
    }

    #[test]
    fn test_release_clears_selection() {
        let mut store = SelectionStore::new();
        store.select_file(loaded("cat.png"));
        store.release();
        assert!(store.current_file().is_none());
        assert_eq!(store.registry().live(), 0);
    }

    #[test]
    fn test_mime_type_from_name() {
        let mut store = SelectionStore::new();
        assert_eq!(store.select_file(loaded("cat.png")).mime_type(), "image/png");
        assert_eq!(store.select_file(loaded("fake.JPG")).mime_type(), "image/jpeg");
        assert_eq!(
            store.select_file(loaded("mystery")).mime_type(),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_sniff_ignores_non_images() {
        assert!(ImageInfo::sniff(b"definitely not an image").is_none());
    }

    #[test]
    fn test_sniff_reads_png_dimensions() {
        let img = image::RgbImage::new(4, 3);
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let info = ImageInfo::sniff(&bytes).unwrap();
        assert_eq!(info.format, "PNG");
        assert_eq!((info.width, info.height), (4, 3));
    }
}
