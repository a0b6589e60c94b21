use sqlx::SqlitePool;

#[derive(Debug, Clone, serde::Serialize)]
pub struct VideoRow {
    pub id: String,
    pub external_id: String,
    pub title: String,
    pub description: String,
    pub published_ts: i64,
}

/// Insert or update a video keyed by its external (platform) id.
///
/// Returns the row id in either case.
pub async fn upsert_video(
    pool: &SqlitePool,
    external_id: &str,
    title: &str,
    description: &str,
    published_ts: i64,
) -> Result<String, sqlx::Error> {
    let id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().timestamp();

    sqlx::query(
        "INSERT INTO video (id, external_id, title, description, published_ts, created_ts, updated_ts) \
         VALUES (?, ?, ?, ?, ?, ?, ?) \
         ON CONFLICT(external_id) DO UPDATE SET \
         title = excluded.title, \
         description = excluded.description, \
         published_ts = excluded.published_ts, \
         updated_ts = excluded.updated_ts",
    )
    .bind(&id)
    .bind(external_id)
    .bind(title)
    .bind(description)
    .bind(published_ts)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    // The insert id is discarded on conflict, so read the row back.
    let (row_id,): (String,) = sqlx::query_as("SELECT id FROM video WHERE external_id = ?")
        .bind(external_id)
        .fetch_one(pool)
        .await?;

    Ok(row_id)
}

pub async fn get_video_by_external_id(
    pool: &SqlitePool,
    external_id: &str,
) -> Result<Option<VideoRow>, sqlx::Error> {
    let row: Option<(String, String, String, String, i64)> = sqlx::query_as(
        "SELECT id, external_id, title, description, published_ts FROM video \
         WHERE external_id = ?",
    )
    .bind(external_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| VideoRow {
        id: r.0,
        external_id: r.1,
        title: r.2,
        description: r.3,
        published_ts: r.4,
    }))
}

/// List videos, newest first.
pub async fn list_videos(pool: &SqlitePool, limit: i64) -> Result<Vec<VideoRow>, sqlx::Error> {
    let rows: Vec<(String, String, String, String, i64)> = sqlx::query_as(
        "SELECT id, external_id, title, description, published_ts FROM video \
         ORDER BY published_ts DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| VideoRow {
            id: r.0,
            external_id: r.1,
            title: r.2,
            description: r.3,
            published_ts: r.4,
        })
        .collect())
}
