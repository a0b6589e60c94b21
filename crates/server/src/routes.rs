use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use castlog_core::error::ApiError;
use castlog_core::types::slugify;
use castlog_db::repo::episodes::{EpisodeRow, ExternalLinkRow};
use castlog_db::repo::people::PersonRow;
use castlog_db::repo::shows::ShowRow;
use castlog_db::repo::videos::VideoRow;

use crate::error::AppError;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_router() -> Router<AppState> {
    Router::new()
        .route("/shows", get(list_shows).post(create_show))
        .route("/shows/{slug}", get(get_show).patch(update_show))
        .route("/shows/{slug}/episodes", get(list_show_episodes))
        .route("/episodes", post(create_episode))
        .route("/episodes/{slug}", get(get_episode))
        .route("/people", get(list_people).post(create_person))
        .route("/videos", get(list_videos))
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    sqlx::query("SELECT 1")
        .execute(&state.db)
        .await
        .map_err(|e| ApiError::Internal(format!("database check failed: {e}")))?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
    }))
}

// ---------------------------------------------------------------------------
// Shows
// ---------------------------------------------------------------------------

async fn list_shows(State(state): State<AppState>) -> Result<Json<Vec<ShowRow>>, AppError> {
    let shows = castlog_db::repo::shows::list_shows(&state.db).await?;
    Ok(Json(shows))
}

#[derive(Deserialize)]
struct CreateShowRequest {
    name: String,
    #[serde(default)]
    description: String,
}

async fn create_show(
    State(state): State<AppState>,
    Json(req): Json<CreateShowRequest>,
) -> Result<Json<ShowRow>, AppError> {
    let slug = slugify(&req.name);
    if slug.is_empty() {
        return Err(ApiError::BadRequest("show name must not be empty".into()).into());
    }

    if castlog_db::repo::shows::get_show_by_slug(&state.db, &slug)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(format!("show {slug:?} already exists")).into());
    }

    let id =
        castlog_db::repo::shows::create_show(&state.db, &req.name, &req.description, &slug).await?;

    Ok(Json(ShowRow {
        id,
        name: req.name,
        description: req.description,
        slug,
    }))
}

async fn get_show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ShowRow>, AppError> {
    let show = castlog_db::repo::shows::get_show_by_slug(&state.db, &slug)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("show {slug:?}")))?;
    Ok(Json(show))
}

#[derive(Deserialize)]
struct UpdateShowRequest {
    name: Option<String>,
    description: Option<String>,
}

async fn update_show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(req): Json<UpdateShowRequest>,
) -> Result<Json<ShowRow>, AppError> {
    let updated = castlog_db::repo::shows::update_show(
        &state.db,
        &slug,
        req.name.as_deref(),
        req.description.as_deref(),
    )
    .await?;

    if !updated {
        return Err(ApiError::NotFound(format!("show {slug:?}")).into());
    }

    let show = castlog_db::repo::shows::get_show_by_slug(&state.db, &slug)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("show {slug:?}")))?;
    Ok(Json(show))
}

async fn list_show_episodes(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<EpisodeRow>>, AppError> {
    let show = castlog_db::repo::shows::get_show_by_slug(&state.db, &slug)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("show {slug:?}")))?;

    let episodes = castlog_db::repo::episodes::list_episodes_for_show(&state.db, &show.id).await?;
    Ok(Json(episodes))
}

// ---------------------------------------------------------------------------
// Episodes
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct CreateEpisodeRequest {
    title: String,
    show_slug: Option<String>,
    video_external_id: Option<String>,
    host_slug: Option<String>,
    #[serde(default)]
    featuring_slugs: Vec<String>,
    headings: Option<serde_json::Value>,
    #[serde(default)]
    links: Vec<CreateLinkRequest>,
}

#[derive(Deserialize)]
struct CreateLinkRequest {
    url: String,
    #[serde(default)]
    label: String,
}

#[derive(Serialize)]
struct EpisodeDetail {
    #[serde(flatten)]
    episode: EpisodeRow,
    featuring: Vec<PersonRow>,
    links: Vec<ExternalLinkRow>,
}

async fn create_episode(
    State(state): State<AppState>,
    Json(req): Json<CreateEpisodeRequest>,
) -> Result<Json<EpisodeDetail>, AppError> {
    let slug = slugify(&req.title);
    if slug.is_empty() {
        return Err(ApiError::BadRequest("episode title must not be empty".into()).into());
    }

    if castlog_db::repo::episodes::get_episode_by_slug(&state.db, &slug)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(format!("episode {slug:?} already exists")).into());
    }

    let show_id = match &req.show_slug {
        Some(show_slug) => Some(
            castlog_db::repo::shows::get_show_by_slug(&state.db, show_slug)
                .await?
                .ok_or_else(|| ApiError::NotFound(format!("show {show_slug:?}")))?
                .id,
        ),
        None => None,
    };

    let video_id = match &req.video_external_id {
        Some(external_id) => Some(
            castlog_db::repo::videos::get_video_by_external_id(&state.db, external_id)
                .await?
                .ok_or_else(|| ApiError::NotFound(format!("video {external_id:?}")))?
                .id,
        ),
        None => None,
    };

    let host_id = match &req.host_slug {
        Some(host_slug) => Some(resolve_person(&state, host_slug).await?.id),
        None => None,
    };

    let mut featuring_ids = Vec::with_capacity(req.featuring_slugs.len());
    for person_slug in &req.featuring_slugs {
        featuring_ids.push(resolve_person(&state, person_slug).await?.id);
    }

    let headings = req.headings.as_ref().map(serde_json::Value::to_string);

    let episode_id = castlog_db::repo::episodes::create_episode(
        &state.db,
        show_id.as_deref(),
        &req.title,
        &slug,
        video_id.as_deref(),
        host_id.as_deref(),
        headings.as_deref(),
    )
    .await?;

    castlog_db::repo::episodes::set_featuring(&state.db, &episode_id, &featuring_ids).await?;
    for link in &req.links {
        castlog_db::repo::episodes::add_external_link(&state.db, &episode_id, &link.url, &link.label)
            .await?;
    }

    episode_detail(&state, &slug).await
}

async fn get_episode(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<EpisodeDetail>, AppError> {
    episode_detail(&state, &slug).await
}

async fn episode_detail(state: &AppState, slug: &str) -> Result<Json<EpisodeDetail>, AppError> {
    let episode = castlog_db::repo::episodes::get_episode_by_slug(&state.db, slug)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("episode {slug:?}")))?;

    let featuring = castlog_db::repo::episodes::get_featuring(&state.db, &episode.id).await?;
    let links = castlog_db::repo::episodes::get_external_links(&state.db, &episode.id).await?;

    Ok(Json(EpisodeDetail {
        episode,
        featuring,
        links,
    }))
}

async fn resolve_person(state: &AppState, slug: &str) -> Result<PersonRow, AppError> {
    castlog_db::repo::people::get_person_by_slug(&state.db, slug)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("person {slug:?}")).into())
}

// ---------------------------------------------------------------------------
// People
// ---------------------------------------------------------------------------

async fn list_people(State(state): State<AppState>) -> Result<Json<Vec<PersonRow>>, AppError> {
    let people = castlog_db::repo::people::list_people(&state.db).await?;
    Ok(Json(people))
}

#[derive(Deserialize)]
struct CreatePersonRequest {
    name: String,
}

async fn create_person(
    State(state): State<AppState>,
    Json(req): Json<CreatePersonRequest>,
) -> Result<Json<PersonRow>, AppError> {
    let slug = slugify(&req.name);
    if slug.is_empty() {
        return Err(ApiError::BadRequest("person name must not be empty".into()).into());
    }

    if castlog_db::repo::people::get_person_by_slug(&state.db, &slug)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(format!("person {slug:?} already exists")).into());
    }

    let id = castlog_db::repo::people::create_person(&state.db, &req.name, &slug).await?;

    Ok(Json(PersonRow {
        id,
        name: req.name,
        slug,
    }))
}

// ---------------------------------------------------------------------------
// Videos
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ListVideosParams {
    limit: Option<i64>,
}

async fn list_videos(
    State(state): State<AppState>,
    Query(params): Query<ListVideosParams>,
) -> Result<Json<Vec<VideoRow>>, AppError> {
    let limit = params.limit.unwrap_or(50).clamp(1, 500);
    let videos = castlog_db::repo::videos::list_videos(&state.db, limit).await?;
    Ok(Json(videos))
}
