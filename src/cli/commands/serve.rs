//! HTTP API server for integration with other systems.
//!
//! Provides REST endpoints for video search and presentation runs. Finished
//! runs are held in memory until deleted or displaced by newer runs once
//! `server.max_runs` is reached; their files are served as downloads.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::TubedeckError;
use crate::pipeline::{CancelToken, Pipeline, RunSession, DECK_FILE, NARRATION_FILE, VIDEO_FILE};
use crate::search::VideoCandidate;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use uuid::Uuid;

/// Shared application state.
struct AppState {
    pipeline: Pipeline,
    sessions: Mutex<RunStore>,
}

impl AppState {
    fn new(pipeline: Pipeline, max_runs: usize) -> Self {
        Self {
            pipeline,
            sessions: Mutex::new(RunStore::new(max_runs)),
        }
    }
}

/// Finished runs by id, bounded to `capacity` entries.
struct RunStore {
    capacity: usize,
    next_seq: u64,
    runs: HashMap<Uuid, (u64, RunSession)>,
}

impl RunStore {
    fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            next_seq: 0,
            runs: HashMap::new(),
        }
    }

    /// Store a run, dropping the oldest ones (and their files) when full.
    fn insert(&mut self, session: RunSession) {
        while self.runs.len() >= self.capacity {
            let Some(oldest) = self
                .runs
                .iter()
                .min_by_key(|(_, (seq, _))| *seq)
                .map(|(id, _)| *id)
            else {
                break;
            };
            self.runs.remove(&oldest);
            info!("Evicted run {}", oldest);
        }

        let id = session.id();
        self.runs.insert(id, (self.next_seq, session));
        self.next_seq += 1;
    }

    fn get(&self, id: &Uuid) -> Option<&RunSession> {
        self.runs.get(id).map(|(_, session)| session)
    }

    fn remove(&mut self, id: &Uuid) -> Option<RunSession> {
        self.runs.remove(id).map(|(_, session)| session)
    }

    fn clear(&mut self) {
        self.runs.clear();
    }
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/search", post(search))
        .route("/runs", post(create_run))
        .route("/runs/{id}", delete(delete_run))
        .route("/runs/{id}/{file}", get(download))
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let pipeline = Pipeline::new(&settings)?;
    let state = Arc::new(AppState::new(pipeline, settings.server.max_runs));

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Tubedeck API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET    /health");
    Output::kv("Search", "POST   /search");
    Output::kv("Run", "POST   /runs");
    Output::kv("Download", "GET    /runs/{id}/{presentation.pptx|presentation.mp4|narration.mp3}");
    Output::kv("Discard", "DELETE /runs/{id}");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    serve_until(listener, state, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await?;

    Ok(())
}

/// Serve until `shutdown` resolves, then discard every stored run.
async fn serve_until(
    listener: tokio::net::TcpListener,
    state: Arc<AppState>,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    axum::serve(listener, router(state.clone()))
        .with_graceful_shutdown(shutdown)
        .await?;

    let mut sessions = state.sessions.lock().await;
    info!("Shutting down, discarding {} stored runs", sessions.runs.len());
    sessions.clear();
    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct SearchRequest {
    query: String,
    #[serde(default)]
    limit: Option<usize>,
}

#[derive(Serialize)]
struct SearchResponse {
    results: Vec<VideoCandidate>,
}

#[derive(Deserialize)]
struct RunRequest {
    /// YouTube URL or video ID
    video: String,
}

#[derive(Serialize)]
struct RunResponse {
    id: Uuid,
    video_id: String,
    transcript: String,
    summary: String,
    slides: usize,
    video_rendered: bool,
    files: Vec<String>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    stage: Option<&'static str>,
}

fn error_response(status: StatusCode, error: String, stage: Option<&'static str>) -> Response {
    (status, Json(ErrorResponse { error, stage })).into_response()
}

fn status_for(e: &TubedeckError) -> StatusCode {
    match e {
        TubedeckError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        TubedeckError::TranscriptAbsent => StatusCode::UNPROCESSABLE_ENTITY,
        TubedeckError::Search(_) | TubedeckError::ToolNotFound(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn pipeline_error(e: TubedeckError) -> Response {
    error_response(status_for(&e), e.to_string(), Some(e.stage()))
}

fn content_type(file: &str) -> &'static str {
    match file {
        NARRATION_FILE => "audio/mpeg",
        DECK_FILE => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        VIDEO_FILE => "video/mp4",
        _ => "application/octet-stream",
    }
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn search(State(state): State<Arc<AppState>>, Json(req): Json<SearchRequest>) -> Response {
    match state.pipeline.search(&req.query, &CancelToken::new()).await {
        Ok(mut results) => {
            if let Some(limit) = req.limit {
                results.truncate(limit);
            }
            Json(SearchResponse { results }).into_response()
        }
        Err(e) => pipeline_error(e),
    }
}

async fn create_run(State(state): State<Arc<AppState>>, Json(req): Json<RunRequest>) -> Response {
    let outcome = match state.pipeline.run(&req.video, &CancelToken::new(), &()).await {
        Ok(outcome) => outcome,
        Err(e) => return pipeline_error(e),
    };

    let id = outcome.session.id();
    let response = RunResponse {
        id,
        video_id: outcome.transcript.video_id.clone(),
        transcript: outcome.transcript.text(),
        summary: outcome.summary.as_str().to_string(),
        slides: outcome.deck.len(),
        video_rendered: outcome.video().is_some(),
        files: outcome
            .session
            .artifacts()
            .into_iter()
            .map(|(name, _)| format!("/runs/{}/{}", id, name))
            .collect(),
    };

    state.sessions.lock().await.insert(outcome.session);
    info!("Stored run {}", id);

    Json(response).into_response()
}

async fn download(
    State(state): State<Arc<AppState>>,
    Path((id, file)): Path<(Uuid, String)>,
) -> Response {
    let path = {
        let sessions = state.sessions.lock().await;
        let Some(session) = sessions.get(&id) else {
            return error_response(StatusCode::NOT_FOUND, format!("Run not found: {}", id), None);
        };
        session.artifact(&file)
    };

    let Some(path) = path else {
        return error_response(
            StatusCode::NOT_FOUND,
            format!("No {} in run {}", file, id),
            None,
        );
    };

    match tokio::fs::read(&path).await {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, content_type(&file).to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", file),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string(), None),
    }
}

async fn delete_run(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> Response {
    match state.sessions.lock().await.remove(&id) {
        Some(_) => {
            info!("Discarded run {}", id);
            StatusCode::NO_CONTENT.into_response()
        }
        None => error_response(StatusCode::NOT_FOUND, format!("Run not found: {}", id), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::narrate::tests::SilentNarrator;
    use crate::pipeline::Components;
    use crate::search::VideoSearch;
    use crate::summarize::tests::TruncatingModel;
    use crate::summarize::ChunkedSummarizer;
    use crate::transcript::tests::StaticSource;
    use async_trait::async_trait;
    use tempfile::TempDir;

    const SEGMENTS: [&str; 4] = [
        "Rust programs are built from crates and modules.",
        "Ownership rules decide when memory is released without a garbage collector.",
        "Borrowing lets code read data without taking ownership of it.",
        "Traits describe shared behavior that many types can implement",
    ];

    struct FixedSearch;

    #[async_trait]
    impl VideoSearch for FixedSearch {
        async fn search(&self, query: &str, limit: usize) -> Result<Vec<VideoCandidate>> {
            if query.trim().is_empty() {
                return Err(TubedeckError::InvalidInput(
                    "Search query cannot be empty".to_string(),
                ));
            }
            Ok(vec![
                VideoCandidate::new("dQw4w9WgXcQ", "Rust in a nutshell"),
                VideoCandidate::new("9bZkp7q19f0", "Ownership explained"),
            ]
            .into_iter()
            .take(limit)
            .collect())
        }
    }

    fn test_state(
        work: &TempDir,
        segments: Option<Vec<&'static str>>,
        max_runs: usize,
    ) -> Arc<AppState> {
        let mut settings = Settings::default();
        settings.general.temp_dir = work.path().to_string_lossy().to_string();

        let pipeline = Pipeline::with_components(
            &settings,
            Components {
                search: Arc::new(FixedSearch),
                transcripts: Arc::new(StaticSource { segments }),
                summarizer: Arc::new(ChunkedSummarizer::new(Arc::new(TruncatingModel::new(1000)))),
                narrator: Arc::new(SilentNarrator),
                renderer: None,
            },
        );
        Arc::new(AppState::new(pipeline, max_runs))
    }

    async fn spawn_server(work: &TempDir, segments: Option<Vec<&'static str>>) -> String {
        spawn_server_with_capacity(work, segments, Settings::default().server.max_runs).await
    }

    async fn spawn_server_with_capacity(
        work: &TempDir,
        segments: Option<Vec<&'static str>>,
        max_runs: usize,
    ) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = test_state(work, segments, max_runs);
        tokio::spawn(async move {
            serve_until(listener, state, std::future::pending()).await.unwrap();
        });

        format!("http://{}", addr)
    }

    fn run_dirs(work: &TempDir) -> usize {
        std::fs::read_dir(work.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with("run-"))
            .count()
    }

    #[tokio::test]
    async fn test_health_and_search() {
        let work = TempDir::new().unwrap();
        let base = spawn_server(&work, None).await;
        let client = reqwest::Client::new();

        let health = client.get(format!("{}/health", base)).send().await.unwrap();
        assert_eq!(health.status(), 200);

        let body: serde_json::Value = client
            .post(format!("{}/search", base))
            .json(&serde_json::json!({ "query": "rust", "limit": 1 }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["url"], "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
    }

    #[tokio::test]
    async fn test_blank_search_is_bad_request() {
        let work = TempDir::new().unwrap();
        let base = spawn_server(&work, None).await;

        let response = reqwest::Client::new()
            .post(format!("{}/search", base))
            .json(&serde_json::json!({ "query": "   " }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 400);

        let body: serde_json::Value = response.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains("cannot be empty"));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&TubedeckError::InvalidInput("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&TubedeckError::ToolNotFound("yt-dlp".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&TubedeckError::Search("timeout".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&TubedeckError::Deck("empty".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_oldest_run_is_evicted_with_its_files() {
        let work = TempDir::new().unwrap();
        let base = spawn_server_with_capacity(&work, Some(SEGMENTS.to_vec()), 2).await;
        let client = reqwest::Client::new();

        let mut ids = Vec::new();
        for _ in 0..3 {
            let body: serde_json::Value = client
                .post(format!("{}/runs", base))
                .json(&serde_json::json!({ "video": "dQw4w9WgXcQ" }))
                .send()
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
            ids.push(body["id"].as_str().unwrap().to_string());
        }

        let first = client
            .get(format!("{}/runs/{}/presentation.pptx", base, ids[0]))
            .send()
            .await
            .unwrap();
        assert_eq!(first.status(), 404);

        let last = client
            .get(format!("{}/runs/{}/presentation.pptx", base, ids[2]))
            .send()
            .await
            .unwrap();
        assert_eq!(last.status(), 200);

        assert_eq!(run_dirs(&work), 2);
    }

    #[tokio::test]
    async fn test_shutdown_discards_stored_runs() {
        let work = TempDir::new().unwrap();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let (stop, stopped) = tokio::sync::oneshot::channel::<()>();
        let server = tokio::spawn(serve_until(
            listener,
            test_state(&work, Some(SEGMENTS.to_vec()), 4),
            async move {
                let _ = stopped.await;
            },
        ));

        let client = reqwest::Client::new();
        let run = client
            .post(format!("{}/runs", base))
            .json(&serde_json::json!({ "video": "dQw4w9WgXcQ" }))
            .send()
            .await
            .unwrap();
        assert_eq!(run.status(), 200);
        let _: serde_json::Value = run.json().await.unwrap();
        drop(client);
        assert_eq!(run_dirs(&work), 1);

        stop.send(()).unwrap();
        server.await.unwrap().unwrap();
        assert_eq!(run_dirs(&work), 0);
    }

    #[tokio::test]
    async fn test_run_download_and_delete() {
        let work = TempDir::new().unwrap();
        let base = spawn_server(&work, Some(SEGMENTS.to_vec())).await;
        let client = reqwest::Client::new();

        let run = client
            .post(format!("{}/runs", base))
            .json(&serde_json::json!({ "video": "https://youtu.be/dQw4w9WgXcQ" }))
            .send()
            .await
            .unwrap();
        assert_eq!(run.status(), 200);
        let body: serde_json::Value = run.json().await.unwrap();
        assert_eq!(body["video_id"], "dQw4w9WgXcQ");
        assert_eq!(body["slides"], 4);
        assert_eq!(body["video_rendered"], false);
        let id = body["id"].as_str().unwrap().to_string();

        let deck = client
            .get(format!("{}/runs/{}/presentation.pptx", base, id))
            .send()
            .await
            .unwrap();
        assert_eq!(deck.status(), 200);
        assert_eq!(
            deck.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"presentation.pptx\""
        );
        let bytes = deck.bytes().await.unwrap();
        assert_eq!(&bytes[..2], b"PK");

        let video = client
            .get(format!("{}/runs/{}/presentation.mp4", base, id))
            .send()
            .await
            .unwrap();
        assert_eq!(video.status(), 404);

        let gone = client
            .delete(format!("{}/runs/{}", base, id))
            .send()
            .await
            .unwrap();
        assert_eq!(gone.status(), 204);

        let after = client
            .get(format!("{}/runs/{}/narration.mp3", base, id))
            .send()
            .await
            .unwrap();
        assert_eq!(after.status(), 404);
    }

    #[tokio::test]
    async fn test_run_without_transcript_reports_stage() {
        let work = TempDir::new().unwrap();
        let base = spawn_server(&work, None).await;

        let response = reqwest::Client::new()
            .post(format!("{}/runs", base))
            .json(&serde_json::json!({ "video": "dQw4w9WgXcQ" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 422);

        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["stage"], "transcript");
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("Unable to extract transcript"));
    }
}
