use sqlx::SqlitePool;

use crate::repo::people::PersonRow;

#[derive(Debug, Clone, serde::Serialize)]
pub struct EpisodeRow {
    pub id: String,
    pub show_id: Option<String>,
    pub title: String,
    pub slug: String,
    pub video_id: Option<String>,
    pub host_person_id: Option<String>,
    /// JSON object text: heading title -> content.
    pub headings: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ExternalLinkRow {
    pub id: String,
    pub episode_id: String,
    pub url: String,
    pub label: String,
}

pub async fn create_episode(
    pool: &SqlitePool,
    show_id: Option<&str>,
    title: &str,
    slug: &str,
    video_id: Option<&str>,
    host_person_id: Option<&str>,
    headings: Option<&str>,
) -> Result<String, sqlx::Error> {
    let id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().timestamp();

    sqlx::query(
        "INSERT INTO episode (id, show_id, title, slug, video_id, host_person_id, headings, created_ts, updated_ts) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(show_id)
    .bind(title)
    .bind(slug)
    .bind(video_id)
    .bind(host_person_id)
    .bind(headings)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(id)
}

pub async fn get_episode_by_slug(
    pool: &SqlitePool,
    slug: &str,
) -> Result<Option<EpisodeRow>, sqlx::Error> {
    let row: Option<(
        String,
        Option<String>,
        String,
        String,
        Option<String>,
        Option<String>,
        Option<String>,
    )> = sqlx::query_as(
        "SELECT id, show_id, title, slug, video_id, host_person_id, headings \
         FROM episode WHERE slug = ?",
    )
    .bind(slug)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| EpisodeRow {
        id: r.0,
        show_id: r.1,
        title: r.2,
        slug: r.3,
        video_id: r.4,
        host_person_id: r.5,
        headings: r.6,
    }))
}

/// List a show's episodes, newest first by the linked video's publish time,
/// falling back to creation order for episodes without a video.
pub async fn list_episodes_for_show(
    pool: &SqlitePool,
    show_id: &str,
) -> Result<Vec<EpisodeRow>, sqlx::Error> {
    let rows: Vec<(
        String,
        Option<String>,
        String,
        String,
        Option<String>,
        Option<String>,
        Option<String>,
    )> = sqlx::query_as(
        "SELECT e.id, e.show_id, e.title, e.slug, e.video_id, e.host_person_id, e.headings \
         FROM episode e \
         LEFT JOIN video v ON e.video_id = v.id \
         WHERE e.show_id = ? \
         ORDER BY COALESCE(v.published_ts, e.created_ts) DESC",
    )
    .bind(show_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| EpisodeRow {
            id: r.0,
            show_id: r.1,
            title: r.2,
            slug: r.3,
            video_id: r.4,
            host_person_id: r.5,
            headings: r.6,
        })
        .collect())
}

/// Whether any episode already references the given video row.
pub async fn episode_exists_for_video(
    pool: &SqlitePool,
    video_id: &str,
) -> Result<bool, sqlx::Error> {
    let row: Option<(String,)> = sqlx::query_as("SELECT id FROM episode WHERE video_id = ?")
        .bind(video_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

/// Replace the set of featured people for an episode (host excluded).
pub async fn set_featuring(
    pool: &SqlitePool,
    episode_id: &str,
    person_ids: &[String],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM episode_featuring WHERE episode_id = ?")
        .bind(episode_id)
        .execute(pool)
        .await?;

    for person_id in person_ids {
        sqlx::query("INSERT INTO episode_featuring (episode_id, person_id) VALUES (?, ?)")
            .bind(episode_id)
            .bind(person_id)
            .execute(pool)
            .await?;
    }

    Ok(())
}

pub async fn get_featuring(
    pool: &SqlitePool,
    episode_id: &str,
) -> Result<Vec<PersonRow>, sqlx::Error> {
    let rows: Vec<(String, String, String)> = sqlx::query_as(
        "SELECT p.id, p.name, p.slug FROM person p \
         JOIN episode_featuring ef ON ef.person_id = p.id \
         WHERE ef.episode_id = ? \
         ORDER BY p.name",
    )
    .bind(episode_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| PersonRow {
            id: r.0,
            name: r.1,
            slug: r.2,
        })
        .collect())
}

pub async fn add_external_link(
    pool: &SqlitePool,
    episode_id: &str,
    url: &str,
    label: &str,
) -> Result<String, sqlx::Error> {
    let id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().timestamp();

    sqlx::query(
        "INSERT INTO external_link (id, episode_id, url, label, created_ts) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(episode_id)
    .bind(url)
    .bind(label)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(id)
}

pub async fn get_external_links(
    pool: &SqlitePool,
    episode_id: &str,
) -> Result<Vec<ExternalLinkRow>, sqlx::Error> {
    let rows: Vec<(String, String, String, String)> = sqlx::query_as(
        "SELECT id, episode_id, url, label FROM external_link \
         WHERE episode_id = ? ORDER BY created_ts",
    )
    .bind(episode_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| ExternalLinkRow {
            id: r.0,
            episode_id: r.1,
            url: r.2,
            label: r.3,
        })
        .collect())
}
