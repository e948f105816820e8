//! Stream endpoints: the public listing, CRUD, upload and download.
//!
//! Queries populate the tagged cache; mutations invalidate. Per-id tags
//! plus the list tag are invalidated for anything that can change list
//! membership or ordering (update, delete); create touches only the list,
//! upload only the one stream.

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use vidra_types::{CreateStreamRequest, ListParams, Stream, StreamPage, UpdateStreamRequest};

use super::ApiClient;
use crate::cache::Tag;
use crate::download::VideoFile;
use crate::error::{ApiError, ApiResult};
use crate::pagination;
use crate::transport::RequestDescriptor;

impl ApiClient {
    /// `GET stream?limit=&offset=` with incremental pagination.
    ///
    /// A repeat of the last requested offset is served from cache; any
    /// other offset forces a fetch, and the result is merged into the
    /// growing listing (replaced when `offset == 0`). The listing is keyed
    /// by endpoint identity alone.
    pub async fn list_streams(&self, params: ListParams) -> ApiResult<StreamPage> {
        if let Some(cached) = self.cache().list_for_offset(params.offset) {
            debug!(offset = params.offset, "list served from cache");
            return Ok(cached);
        }

        let descriptor = RequestDescriptor::get("stream")
            .with_query("limit", params.limit)
            .with_query("offset", params.offset);
        let fetched: StreamPage = self.send_json(&descriptor).await?;

        let merged = pagination::merge(self.cache().list_merge_base(), fetched);
        self.cache().store_list(merged.clone(), params.offset);
        Ok(merged)
    }

    /// Scroll driver: fetches the next page, requesting
    /// `offset == items.len()` so appending preserves the prefix.
    ///
    /// Starts from offset 0 when nothing (trusted) is cached.
    pub async fn list_more(&self, limit: u64) -> ApiResult<StreamPage> {
        let offset = self
            .cache()
            .list_merge_base()
            .map_or(0, |page| page.next_offset());
        self.list_streams(ListParams { limit, offset }).await
    }

    /// Walks the listing to the end (`items.len() == total`).
    pub async fn list_all(&self, limit: u64) -> ApiResult<StreamPage> {
        let mut page = self.list_more(limit).await?;
        while !page.is_complete() {
            let before = page.items.len();
            page = self.list_more(limit).await?;
            // A shrinking total could otherwise loop forever.
            if page.items.len() == before {
                break;
            }
        }
        Ok(page)
    }

    /// `GET stream/{id}`, read-through cached under the stream's own tag.
    /// 403 (private, not owner) is surfaced untouched.
    pub async fn get_stream(&self, id: &str) -> ApiResult<Stream> {
        if let Some(cached) = self.cache().stream(id) {
            debug!(id, "stream served from cache");
            return Ok(cached);
        }

        let stream: Stream = self
            .send_json(&RequestDescriptor::get(format!("stream/{id}")))
            .await?;
        self.cache().store_stream(stream.clone());
        Ok(stream)
    }

    /// `POST stream/`. Invalidates the listing; the new stream changes its
    /// membership.
    pub async fn create_stream(&self, request: &CreateStreamRequest) -> ApiResult<Stream> {
        let descriptor = RequestDescriptor::post("stream/").with_json(request)?;
        let stream: Stream = self.send_json(&descriptor).await?;
        self.cache().invalidate(&[Tag::StreamList]);
        Ok(stream)
    }

    /// `PATCH stream/{id}`. Invalidates the stream and the listing, since
    /// an edit can change list ordering or visibility.
    pub async fn update_stream(
        &self,
        id: &str,
        request: &UpdateStreamRequest,
    ) -> ApiResult<Stream> {
        let descriptor = RequestDescriptor::patch(format!("stream/{id}")).with_json(request)?;
        let stream: Stream = self.send_json(&descriptor).await?;
        self.cache()
            .invalidate(&[Tag::Stream(id.to_string()), Tag::StreamList]);
        Ok(stream)
    }

    /// `DELETE stream/{id}`. Invalidates the stream and the listing.
    pub async fn delete_stream(&self, id: &str) -> ApiResult<()> {
        self.send(&RequestDescriptor::delete(format!("stream/{id}")))
            .await?;
        self.cache()
            .invalidate(&[Tag::Stream(id.to_string()), Tag::StreamList]);
        Ok(())
    }

    /// `POST stream/{id}/upload`, multipart field `video`. Invalidates the
    /// stream (its status moves to processing) but not the listing.
    pub async fn upload_video(
        &self,
        id: &str,
        file_name: &str,
        mime: &str,
        bytes: Vec<u8>,
    ) -> ApiResult<()> {
        let descriptor = RequestDescriptor::post(format!("stream/{id}/upload")).with_file(
            "video", file_name, mime, bytes,
        );
        self.send(&descriptor).await?;
        self.cache().invalidate(&[Tag::Stream(id.to_string())]);
        Ok(())
    }

    /// `GET stream/{id}/download`, streamed into a temp file.
    ///
    /// The returned [`VideoFile`] deletes the file when dropped; a caller
    /// that goes away mid-download just drops the future and the guard,
    /// leaving no shared state touched and no file behind.
    pub async fn download_video(&self, id: &str) -> ApiResult<VideoFile> {
        let descriptor = RequestDescriptor::get(format!("stream/{id}/download"));
        let response = self.send(&descriptor).await?;

        let path = std::env::temp_dir().join(format!("vidra-{}.mp4", uuid::Uuid::new_v4()));
        let guard = VideoFile::new(path.clone());

        let mut file = tokio::fs::File::create(&path)
            .await
            .map_err(|e| ApiError::transport(format!("failed to create video file: {e}")))?;

        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(ApiError::from)?;
            file.write_all(&chunk)
                .await
                .map_err(|e| ApiError::transport(format!("failed to write video file: {e}")))?;
        }
        file.flush()
            .await
            .map_err(|e| ApiError::transport(format!("failed to flush video file: {e}")))?;

        Ok(guard)
    }
}
