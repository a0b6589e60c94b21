use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use castlog_collect::VideoRecord;
use castlog_collect::classify::{self, ShowRule};
use castlog_collect::gamedb::{GameDbClient, GameQuery, YearFilter};
use castlog_collect::playlist;
use castlog_collect::snapshot;
use castlog_collect::sync;
use castlog_collect::youtube::YouTubeClient;

/// Default uploads playlist: the channel's full upload history.
const DEFAULT_PLAYLIST: &str = "UUiUhKqsBH-Is2VeC2sykEfg";

const GAME_FIELDS: &str = "cover.*,first_release_date,genres.*,id,involved_companies.*,\
                           name,platforms.*,release_dates.*,slug,summary";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("run");

    let data_dir: PathBuf = std::env::var("CASTLOG_DATA_DIR")
        .unwrap_or_else(|_| "data".to_string())
        .into();
    let raw_path = data_dir.join("videos.json");
    let classified_path = data_dir.join("shows.json");

    match command {
        "fetch" => fetch(&raw_path).await?,
        "classify" => classify_snapshot(&raw_path, &classified_path)?,
        "sync" => sync_catalog(&raw_path).await?,
        "run" => {
            fetch(&raw_path).await?;
            classify_snapshot(&raw_path, &classified_path)?;
            sync_catalog(&raw_path).await?;
        }
        "game" => game(&args[1..], &data_dir).await?,
        other => anyhow::bail!("unknown command: {other} (expected fetch|classify|sync|run|game)"),
    }

    Ok(())
}

/// Pull the full playlist and write the raw snapshot.
async fn fetch(raw_path: &Path) -> anyhow::Result<()> {
    let api_key = std::env::var("CASTLOG_YOUTUBE_KEY").context("CASTLOG_YOUTUBE_KEY not set")?;
    let playlist_id =
        std::env::var("CASTLOG_PLAYLIST").unwrap_or_else(|_| DEFAULT_PLAYLIST.to_string());

    let source = YouTubeClient::new(api_key);
    let records = playlist::fetch_all_playlist_videos(&source, &playlist_id).await;
    info!(count = records.len(), playlist = %playlist_id, "videos fetched");

    snapshot::write_snapshot(raw_path, &records).context("failed to write raw snapshot")?;
    Ok(())
}

/// Classify the raw snapshot and write the label mapping.
fn classify_snapshot(raw_path: &Path, classified_path: &Path) -> anyhow::Result<()> {
    let records: Vec<VideoRecord> =
        snapshot::read_snapshot(raw_path).context("failed to read raw snapshot")?;
    let rules = rule_table()?;

    let matches = classify::classify(&records, &rules)?;
    let unmatched = matches.get(classify::OTHER_LABEL).map_or(0, Vec::len);
    info!(
        videos = records.len(),
        labels = matches.len(),
        unmatched,
        "classification complete"
    );

    snapshot::write_snapshot(classified_path, &matches)
        .context("failed to write classified snapshot")?;
    Ok(())
}

/// Reconcile the raw snapshot into the catalog database.
async fn sync_catalog(raw_path: &Path) -> anyhow::Result<()> {
    let db_path = std::env::var("CASTLOG_DB").unwrap_or_else(|_| "castlog.db".to_string());
    let pool = castlog_db::connect(&db_path)
        .await
        .context("failed to connect to database")?;
    castlog_db::migrate::run(&pool)
        .await
        .context("failed to run migrations")?;

    let records: Vec<VideoRecord> =
        snapshot::read_snapshot(raw_path).context("failed to read raw snapshot")?;
    let rules = rule_table()?;

    let result = sync::sync_classified(&pool, &records, &rules).await?;
    info!(
        shows_created = result.shows_created,
        videos_upserted = result.videos_upserted,
        episodes_created = result.episodes_created,
        "catalog sync complete"
    );
    Ok(())
}

/// Query the game database for one title, optionally narrowed by platform
/// name and release year (or range), and snapshot the result.
async fn game(args: &[String], data_dir: &Path) -> anyhow::Result<()> {
    let name = args
        .first()
        .context("usage: game <name> [platform] [year|from-to]")?;
    let client_id =
        std::env::var("CASTLOG_GAMEDB_CLIENT_ID").context("CASTLOG_GAMEDB_CLIENT_ID not set")?;
    let client_secret = std::env::var("CASTLOG_GAMEDB_CLIENT_SECRET")
        .context("CASTLOG_GAMEDB_CLIENT_SECRET not set")?;

    let mut client = GameDbClient::new(client_id, client_secret);

    let mut query = GameQuery::new(name).fields(GAME_FIELDS);
    if let Some(platform) = args.get(1) {
        // accept a raw platform id as well as a name
        let platform_id = match platform.parse::<u64>() {
            Ok(id) => id,
            Err(_) => client.resolve_platform(platform).await?,
        };
        query = query.platform(platform_id);
    }
    if let Some(year_raw) = args.get(2) {
        query = query.year(YearFilter::parse(year_raw)?);
    }

    let rows = client.games(&query).await.unwrap_or_default();
    info!(game = %name, results = rows.len(), "game query complete");

    snapshot::write_snapshot(&data_dir.join("games.json"), &rows)
        .context("failed to write game snapshot")?;
    Ok(())
}

/// The rule table: `CASTLOG_RULES` points at a JSON file, otherwise the
/// built-in taxonomy.
fn rule_table() -> anyhow::Result<Vec<ShowRule>> {
    match std::env::var("CASTLOG_RULES") {
        Ok(path) => classify::load_rules(Path::new(&path))
            .with_context(|| format!("failed to load rules from {path}")),
        Err(_) => Ok(classify::default_show_rules()),
    }
}
