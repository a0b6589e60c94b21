//! Playlist fetch driver: pagination to exhaustion, then batched detail
//! lookups.

use tracing::warn;

use crate::VideoRecord;
use crate::source::{DETAIL_BATCH, VideoSource};

/// Fetch every video in a playlist.
///
/// Pages through the membership listing until no continuation token is
/// returned, collecting video ids, then requests full details in batches of
/// at most [`DETAIL_BATCH`].
///
/// Best effort: a failed page request ends pagination with the ids gathered
/// so far, a failed detail batch is skipped. The driver never errors and
/// never retries; callers must tolerate partial results.
pub async fn fetch_all_playlist_videos(
    source: &dyn VideoSource,
    playlist_id: &str,
) -> Vec<VideoRecord> {
    let mut video_ids: Vec<String> = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let page = match source
            .playlist_page(playlist_id, page_token.as_deref())
            .await
        {
            Ok(page) => page,
            Err(e) => {
                warn!(
                    source = source.name(),
                    playlist_id,
                    error = %e,
                    "playlist page request failed, stopping pagination"
                );
                break;
            }
        };

        video_ids.extend(page.video_ids);

        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    let mut records = Vec::with_capacity(video_ids.len());
    for batch in video_ids.chunks(DETAIL_BATCH) {
        match source.video_details(batch).await {
            Ok(details) => records.extend(details),
            Err(e) => {
                warn!(
                    source = source.name(),
                    batch_len = batch.len(),
                    error = %e,
                    "video detail batch failed, skipping"
                );
            }
        }
    }

    records
}
