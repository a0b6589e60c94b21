use sqlx::SqlitePool;

#[derive(Debug, Clone, serde::Serialize)]
pub struct ShowRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub slug: String,
}

/// Insert a new show. Fails on a duplicate slug.
pub async fn create_show(
    pool: &SqlitePool,
    name: &str,
    description: &str,
    slug: &str,
) -> Result<String, sqlx::Error> {
    let id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().timestamp();

    sqlx::query(
        "INSERT INTO show (id, name, description, slug, created_ts, updated_ts) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(name)
    .bind(description)
    .bind(slug)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(id)
}

/// Return the id of the show with the given slug, creating it if absent.
pub async fn find_or_create_show(
    pool: &SqlitePool,
    name: &str,
    slug: &str,
) -> Result<String, sqlx::Error> {
    let existing: Option<(String,)> = sqlx::query_as("SELECT id FROM show WHERE slug = ?")
        .bind(slug)
        .fetch_optional(pool)
        .await?;

    if let Some((id,)) = existing {
        return Ok(id);
    }

    create_show(pool, name, "", slug).await
}

pub async fn get_show_by_slug(
    pool: &SqlitePool,
    slug: &str,
) -> Result<Option<ShowRow>, sqlx::Error> {
    let row: Option<(String, String, String, String)> =
        sqlx::query_as("SELECT id, name, description, slug FROM show WHERE slug = ?")
            .bind(slug)
            .fetch_optional(pool)
            .await?;

    Ok(row.map(|r| ShowRow {
        id: r.0,
        name: r.1,
        description: r.2,
        slug: r.3,
    }))
}

pub async fn list_shows(pool: &SqlitePool) -> Result<Vec<ShowRow>, sqlx::Error> {
    let rows: Vec<(String, String, String, String)> =
        sqlx::query_as("SELECT id, name, description, slug FROM show ORDER BY name")
            .fetch_all(pool)
            .await?;

    Ok(rows
        .into_iter()
        .map(|r| ShowRow {
            id: r.0,
            name: r.1,
            description: r.2,
            slug: r.3,
        })
        .collect())
}

/// Update name and/or description. Returns false when no show has the slug.
pub async fn update_show(
    pool: &SqlitePool,
    slug: &str,
    name: Option<&str>,
    description: Option<&str>,
) -> Result<bool, sqlx::Error> {
    let now = chrono::Utc::now().timestamp();

    let result = sqlx::query(
        "UPDATE show SET \
         name = COALESCE(?, name), \
         description = COALESCE(?, description), \
         updated_ts = ? \
         WHERE slug = ?",
    )
    .bind(name)
    .bind(description)
    .bind(now)
    .bind(slug)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
