use std::path::Path;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{info, warn};

use super::DraftStore;
use crate::api::RecipeApi;
use crate::error::{ApiError, UploadError};
use crate::models::MediaSlot;

const FALLBACK_MIME: &str = "application/octet-stream";

/// A file picked by the user, already read into memory.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl LocalFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Reads `path` and sniffs its MIME type from the content, falling back
    /// to the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, UploadError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|source| UploadError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let content_type = infer::get(&bytes)
            .map(|kind| kind.mime_type())
            .or_else(|| mime_from_extension(path))
            .unwrap_or(FALLBACK_MIME)
            .to_string();

        if !content_type.starts_with("image/") && !content_type.starts_with("video/") {
            warn!(path = %path.display(), %content_type, "uploading a file that is not an image");
        }

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        Ok(Self {
            name,
            content_type,
            bytes,
        })
    }
}

fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        _ => return None,
    };
    Some(mime)
}

/// How one file of a batch went.
#[derive(Debug)]
pub struct SlotUpload {
    pub file_name: String,
    pub put_url: String,
    pub result: Result<(), ApiError>,
}

#[derive(Debug, Default)]
pub struct UploadReport {
    pub uploads: Vec<SlotUpload>,
}

impl UploadReport {
    pub fn succeeded(&self) -> usize {
        self.uploads.iter().filter(|u| u.result.is_ok()).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &SlotUpload> {
        self.uploads.iter().filter(|u| u.result.is_err())
    }
}

/// Moves local files into the draft's pre-allocated media slots.
pub struct UploadCoordinator {
    api: Arc<dyn RecipeApi>,
    draft: Arc<DraftStore>,
}

impl UploadCoordinator {
    pub fn new(api: Arc<dyn RecipeApi>, draft: Arc<DraftStore>) -> Self {
        Self { api, draft }
    }

    /// Uploads the whole batch or nothing.
    ///
    /// file[i] goes to empty slot[i]. All uploads run at once; once every
    /// one has settled the draft is refreshed, whatever the individual
    /// results were.
    pub async fn upload(&self, files: Vec<LocalFile>) -> Result<UploadReport, UploadError> {
        if files.is_empty() {
            return Ok(UploadReport::default());
        }

        let draft = self.draft.draft().await.ok_or(UploadError::DraftNotLoaded)?;
        let put_urls: Vec<String> = draft
            .empty_slots()
            .into_iter()
            .filter_map(|slot| slot.put_url.clone())
            .collect();

        if put_urls.len() < files.len() {
            warn!(
                files = files.len(),
                slots = put_urls.len(),
                "Not enough slots to upload files"
            );
            return Err(UploadError::InsufficientSlots {
                files: files.len(),
                slots: put_urls.len(),
            });
        }

        let uploads = files.into_iter().zip(put_urls).map(|(file, put_url)| {
            let api = Arc::clone(&self.api);
            async move {
                let result = api
                    .upload_to_slot(&put_url, &file.content_type, file.bytes)
                    .await;
                if let Err(err) = &result {
                    warn!(file = %file.name, "Upload failed: {err}");
                }
                SlotUpload {
                    file_name: file.name,
                    put_url,
                    result,
                }
            }
        });
        let report = UploadReport {
            uploads: join_all(uploads).await,
        };

        info!(
            succeeded = report.succeeded(),
            total = report.uploads.len(),
            "upload batch settled"
        );
        self.refresh().await;
        Ok(report)
    }

    /// Removes an uploaded item. The draft is refreshed even if the delete
    /// failed. Returns false for slots that have nothing to delete.
    pub async fn delete(&self, slot: &MediaSlot) -> Result<bool, ApiError> {
        let Some(delete_url) = slot.delete_url.as_deref() else {
            return Ok(false);
        };

        let result = self.api.delete_media(delete_url).await;
        self.refresh().await;
        result.map(|()| true)
    }

    async fn refresh(&self) {
        // the store keeps the error for display
        let _ = self.draft.refresh().await;
    }
}
