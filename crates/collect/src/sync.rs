//! Reconcile a classified fetch into the catalog database.

use sqlx::SqlitePool;
use tracing::debug;

use castlog_core::types::slugify;

use crate::classify::{OTHER_LABEL, RuleSet, ShowRule, parse_published};
use crate::{CollectError, VideoRecord};

/// Counts of catalog rows touched by one sync pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SyncResult {
    pub shows_created: usize,
    pub videos_upserted: usize,
    pub episodes_created: usize,
}

/// Label every record with the rule table and write the outcome into the
/// catalog: a show row per label, a video row per record, and an episode
/// linking the two unless one already references that video. Records that
/// fall to the reserved label get an episode with no show.
pub async fn sync_classified(
    pool: &SqlitePool,
    videos: &[VideoRecord],
    rules: &[ShowRule],
) -> Result<SyncResult, CollectError> {
    let set = RuleSet::compile(rules)?;
    let mut result = SyncResult::default();

    for video in videos {
        let label = set.label_for(video);

        let show_id = if label == OTHER_LABEL {
            None
        } else {
            let slug = slugify(label);
            let existing = castlog_db::repo::shows::get_show_by_slug(pool, &slug).await?;
            match existing {
                Some(show) => Some(show.id),
                None => {
                    result.shows_created += 1;
                    Some(castlog_db::repo::shows::create_show(pool, label, "", &slug).await?)
                }
            }
        };

        let video_row_id = castlog_db::repo::videos::upsert_video(
            pool,
            &video.video_id,
            &video.title,
            &video.description,
            parse_published(&video.published_at),
        )
        .await?;
        result.videos_upserted += 1;

        if !castlog_db::repo::episodes::episode_exists_for_video(pool, &video_row_id).await? {
            castlog_db::repo::episodes::create_episode(
                pool,
                show_id.as_deref(),
                &video.title,
                &episode_slug(&video.title, &video.video_id),
                Some(&video_row_id),
                None,
                None,
            )
            .await?;
            result.episodes_created += 1;
            debug!(label, title = %video.title, "episode created");
        }
    }

    Ok(result)
}

/// Episode slugs come from the title, suffixed with the external video id so
/// same-titled uploads stay unique.
fn episode_slug(title: &str, external_id: &str) -> String {
    let base = slugify(title);
    let suffix = slugify(external_id);
    if base.is_empty() {
        suffix
    } else {
        format!("{base}-{suffix}")
    }
}
