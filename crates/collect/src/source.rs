use crate::{CollectError, VideoRecord};

/// Maximum playlist-membership entries per page request.
pub const PAGE_SIZE: usize = 50;

/// Maximum video ids per detail request (platform constraint).
pub const DETAIL_BATCH: usize = 50;

/// A remote video source that lists playlist membership and resolves video
/// details.
#[async_trait::async_trait]
pub trait VideoSource: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch one page of playlist membership, at most [`PAGE_SIZE`] entries.
    async fn playlist_page(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<PlaylistPage, CollectError>;

    /// Fetch full details for at most [`DETAIL_BATCH`] video ids.
    async fn video_details(
        &self,
        video_ids: &[String],
    ) -> Result<Vec<VideoRecord>, CollectError>;
}

/// One page of playlist membership.
#[derive(Debug, Clone, Default)]
pub struct PlaylistPage {
    pub video_ids: Vec<String>,
    /// Opaque continuation token; `None` on the last page.
    pub next_page_token: Option<String>,
}
