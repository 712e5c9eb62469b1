use super::actor::CaptureController;
use super::session::{with_trailing_slash, CapturePhase, Sequence};
use crate::canvas::{payload_from_data_url, Canvas};
use crate::error::{CaptureError, GalleryError, Result, SelfcamError};
use crate::events::SelfcamEvent;
use crate::storage::{ContentEncoding, FileHandle};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

const NO_IMAGE_SOURCE_ALERT: &str = "Data source error: No image source";

impl CaptureController {
    /// Advance the sequence, snapshot the preview and save it as the next photo.
    ///
    /// When the snapshot cannot be taken the sequence and file name are put
    /// back, since nothing was written.
    pub async fn take_photo(&mut self) -> Result<FileHandle> {
        let previous = (self.session.sequence, self.session.filename.clone());

        self.session.phase = CapturePhase::Capturing;
        self.session.sequence = self.session.sequence.next();
        self.session.filename = format!("{}{}.png", self.config.file_prefix, self.session.sequence);
        info!("Taking photo {}", self.session.filename);

        let result = match self.capture_image().await {
            Ok(canvas) => self.save_photo(&canvas).await,
            Err(e) => {
                warn!("Snapshot failed, keeping {:?}: {}", previous.1, e);
                (self.session.sequence, self.session.filename) = previous;
                self.load_thumbnail();
                Err(e)
            }
        };

        self.session.phase = CapturePhase::Idle;
        result
    }

    /// Draw the current preview frame onto a canvas the size of the display
    pub async fn capture_image(&self) -> Result<Canvas> {
        let preview = self.preview.as_ref().ok_or(CaptureError::PreviewDetached)?;
        let frame = preview.snapshot().await?;

        let (width, height) = self.display_resolution;
        let mut canvas = Canvas::new(width, height);
        canvas.draw_frame(&frame)?;

        self.publish(SelfcamEvent::PhotoCaptured {
            filename: self.session.filename.clone(),
        });
        Ok(canvas)
    }

    /// Save `canvas` under the current file name in the save directory
    pub async fn save_photo(&mut self, canvas: &Canvas) -> Result<FileHandle> {
        let path = self.session.save_path();
        self.save_canvas(canvas, &path).await
    }

    /// Serialize `canvas` as PNG and write it to `file_path`, replacing any
    /// existing file. Updates the thumbnail on success.
    pub async fn save_canvas(&mut self, canvas: &Canvas, file_path: &str) -> Result<FileHandle> {
        let data_url = match canvas.to_data_url() {
            Ok(data_url) => data_url,
            Err(e) => return Err(self.abort_save(e)),
        };

        let payload = payload_from_data_url(&data_url);
        if payload.is_empty() {
            return Err(self.abort_save(CaptureError::EmptyPayload));
        }

        self.storage.delete_node(file_path).await.map_err(|e| {
            error!("Delete old file error: {}", e);
            e
        })?;

        let handle = self
            .storage
            .save_file_content(file_path, payload, ContentEncoding::Base64)
            .await
            .map_err(|e| {
                error!("Save photo error: {}", e);
                e
            })?;

        self.set_load_directory(handle.parent());
        self.load_thumbnail();
        self.publish(SelfcamEvent::PhotoSaved {
            path: handle.path.clone(),
        });
        Ok(handle)
    }

    fn abort_save(&mut self, e: CaptureError) -> SelfcamError {
        error!("Canvas serialization error: {}", e);
        self.session.filename.clear();
        let message = match &e {
            CaptureError::EmptyPayload => NO_IMAGE_SOURCE_ALERT.to_string(),
            other => format!("Data source error: {}", other),
        };
        self.publish(SelfcamEvent::Alert { message });
        e.into()
    }

    /// Most recently created photo in the save directory, if any
    pub async fn find_last_photo(&self) -> Result<Option<FileHandle>> {
        let mask = format!("{}%", self.config.file_prefix);
        let mut files = self
            .storage
            .dir(&self.session.save_directory, Some(&mask))
            .await?;

        files.retain(|f| !f.is_directory);
        // Stable: equal creation times keep name order
        files.sort_by(|a, b| a.created.cmp(&b.created));
        Ok(files.pop())
    }

    /// Adopt the most recent photo on disk as the current one. Returns whether
    /// a photo was found; otherwise the file name is cleared and the
    /// thumbnail hidden.
    pub async fn set_last_photo(&mut self) -> Result<bool> {
        match self.find_last_photo().await {
            Ok(Some(file)) => {
                debug!("Last photo is {}", file.path.display());
                self.set_load_directory(file.parent());
                self.set_file_name(&file.name);
                Ok(true)
            }
            Ok(None) => {
                debug!("No photos in {}", self.session.save_directory);
                self.session.filename.clear();
                self.hide_thumbnail();
                Ok(false)
            }
            Err(e) => {
                error!("Failed to find last photo: {}", e);
                self.session.filename.clear();
                self.hide_thumbnail();
                Err(e)
            }
        }
    }

    /// Make `name` the current photo and resume numbering after it
    pub fn set_file_name(&mut self, name: &str) {
        self.session.filename = name.to_string();
        self.session.sequence = Sequence::from_file_name(name);
        self.load_thumbnail();
    }

    /// Remember the directory the current photo lives in
    pub fn set_load_directory(&mut self, dir: impl AsRef<Path>) {
        self.session.load_directory = with_trailing_slash(&dir.as_ref().to_string_lossy());
    }

    /// Open the current photo in the viewer. Returns `false` when there is no
    /// photo; `true` once the launch was requested.
    pub async fn launch_preview(&self) -> bool {
        if !self.session.has_photo() {
            debug!("No photo to preview");
            return false;
        }

        let uri = format!("file://{}", self.session.load_path());
        if let Err(e) = self.show_photo_preview(&uri).await {
            warn!("Preview launch not completed: {}", e);
        }
        true
    }

    /// Ask the viewer to display `uri`
    pub async fn show_photo_preview(&self, uri: &str) -> std::result::Result<(), GalleryError> {
        self.gallery.launch(uri, &self.gallery_mime_type).await?;
        self.publish(SelfcamEvent::GalleryLaunched {
            uri: uri.to_string(),
        });
        Ok(())
    }

    pub(super) fn load_thumbnail(&mut self) {
        if !self.session.has_photo() {
            return;
        }
        let path = PathBuf::from(self.session.load_path());
        self.thumbnail = Some(path.clone());
        self.publish(SelfcamEvent::ThumbnailChanged { path: Some(path) });
    }

    pub(super) fn hide_thumbnail(&mut self) {
        self.thumbnail = None;
        self.publish(SelfcamEvent::ThumbnailChanged { path: None });
    }
}
