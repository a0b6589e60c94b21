use sqlx::SqlitePool;

#[derive(Debug, Clone, serde::Serialize)]
pub struct PersonRow {
    pub id: String,
    pub name: String,
    pub slug: String,
}

pub async fn create_person(
    pool: &SqlitePool,
    name: &str,
    slug: &str,
) -> Result<String, sqlx::Error> {
    let id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().timestamp();

    sqlx::query("INSERT INTO person (id, name, slug, created_ts) VALUES (?, ?, ?, ?)")
        .bind(&id)
        .bind(name)
        .bind(slug)
        .bind(now)
        .execute(pool)
        .await?;

    Ok(id)
}

pub async fn get_person_by_slug(
    pool: &SqlitePool,
    slug: &str,
) -> Result<Option<PersonRow>, sqlx::Error> {
    let row: Option<(String, String, String)> =
        sqlx::query_as("SELECT id, name, slug FROM person WHERE slug = ?")
            .bind(slug)
            .fetch_optional(pool)
            .await?;

    Ok(row.map(|r| PersonRow {
        id: r.0,
        name: r.1,
        slug: r.2,
    }))
}

pub async fn list_people(pool: &SqlitePool) -> Result<Vec<PersonRow>, sqlx::Error> {
    let rows: Vec<(String, String, String)> =
        sqlx::query_as("SELECT id, name, slug FROM person ORDER BY name")
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
