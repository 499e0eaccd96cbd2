mod error;
mod extract;
mod llm;
mod prompt;
mod shortener;
mod youtube;

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use error::ApiError;
use extract::ExtractedSignals;
use llm::{ChatMessage, CompletionClient};
use shortener::ShortenerClient;
use youtube::{VideoMetadata, YouTubeClient};

const DEFAULT_COMMENT_FETCH_LIMIT: u32 = 30;

// Fixed sampling parameters for the two completion call sites.
const ANALYSIS_MAX_TOKENS: u32 = 600;
const ANALYSIS_TEMPERATURE: f32 = 0.7;
const CHAT_MAX_TOKENS: u32 = 400;
const CHAT_TEMPERATURE: f32 = 0.8;

/// Persona prepended to every /chat conversation, before the caller-supplied
/// history.
const CHAT_PERSONA: &str = "You are ClipCoach, a friendly assistant for short-form video creators. \
You answer questions about growing a channel: content ideas, titles, hashtags, posting cadence, \
and audience engagement. Keep answers practical and concise.";

#[derive(Clone)]
struct AppState {
    youtube: YouTubeClient,
    llm: CompletionClient,
    shortener: ShortenerClient,
    comment_fetch_limit: u32,
}

async fn status() -> Json<Value> {
    Json(json!({ "status": "running" }))
}

#[derive(Deserialize)]
struct AnalyzeRequest {
    #[serde(rename = "videoLink")]
    video_link: String,
}

#[derive(Debug, Serialize)]
struct AnalyzeResponse {
    metadata: VideoMetadata,
    #[serde(rename = "aiSuggestions")]
    ai_suggestions: String,
}

/// POST /youtube - fetch a video's metadata and comments, run the extractors,
/// and ask the completion service for improvement suggestions.
async fn analyze_video(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let video_id = extract::extract_video_id(&req.video_link)
        .ok_or_else(|| ApiError::BadRequest("Invalid YouTube link or video ID".to_string()))?;

    // The two fetches are independent; extraction waits on both.
    let (video, comments) = tokio::join!(
        state.youtube.get_video(&video_id),
        state.youtube.get_comments(&video_id, state.comment_fetch_limit),
    );

    let metadata = video
        .map_err(|e| ApiError::downstream("Failed to fetch video metadata", e))?
        .ok_or_else(|| ApiError::NotFound("Video not found".to_string()))?;

    // Comments are best-effort: disabled comments or an API hiccup must not
    // fail the analysis.
    let comments = comments.unwrap_or_else(|e| {
        eprintln!("[youtube] comment fetch failed for {}: {}", video_id, e);
        Vec::new()
    });

    let signals = ExtractedSignals::from_video(&metadata.title, &metadata.description);
    let analysis_prompt = prompt::build_analysis_prompt(&metadata, &signals, &comments);

    let suggestions = state
        .llm
        .complete(
            &[ChatMessage::user(analysis_prompt)],
            ANALYSIS_MAX_TOKENS,
            ANALYSIS_TEMPERATURE,
        )
        .await
        .map_err(|e| ApiError::downstream("Failed to generate suggestions", e))?;

    Ok(Json(AnalyzeResponse {
        metadata,
        ai_suggestions: suggestions,
    }))
}

#[derive(Deserialize)]
struct SearchRequest {
    query: String,
}

/// POST /search - placeholder until product lookup is wired to a real
/// provider.
async fn search(Json(req): Json<SearchRequest>) -> Json<Value> {
    Json(json!({
        "message": "Product search is not available yet",
        "query": req.query,
    }))
}

#[derive(Deserialize)]
struct ChatRequest {
    #[serde(rename = "userMessage")]
    user_message: String,
    #[serde(rename = "chatHistory", default)]
    chat_history: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatResponse {
    reply: String,
}

/// POST /chat - persona instruction, then the caller's prior turns in order,
/// then the new message.
async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let mut messages = Vec::with_capacity(req.chat_history.len() + 2);
    messages.push(ChatMessage::system(CHAT_PERSONA));
    messages.extend(req.chat_history);
    messages.push(ChatMessage::user(req.user_message));

    let reply = state
        .llm
        .complete(&messages, CHAT_MAX_TOKENS, CHAT_TEMPERATURE)
        .await
        .map_err(|e| ApiError::downstream("Failed to generate reply", e))?;

    Ok(Json(ChatResponse { reply }))
}

#[derive(Deserialize)]
struct ShortenRequest {
    url: String,
}

#[derive(Serialize)]
struct ShortenResponse {
    original: String,
    short: String,
}

/// POST /shorten - best-effort: a shortener failure hands back the long URL.
async fn shorten(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ShortenRequest>,
) -> Json<ShortenResponse> {
    let short = match state.shortener.shorten(&req.url).await {
        Ok(short) => short,
        Err(e) => {
            eprintln!("[shortener] falling back to original URL: {}", e);
            req.url.clone()
        }
    };

    Json(ShortenResponse {
        original: req.url,
        short,
    })
}

/// POST /log - placeholder acknowledgment; nothing is recorded.
async fn log_event() -> Json<Value> {
    Json(json!({ "message": "Log received" }))
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let youtube_api_key =
        std::env::var("YOUTUBE_API_KEY").expect("YOUTUBE_API_KEY must be set");
    let openai_api_key = std::env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY must be set");
    let openai_model =
        std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
    let comment_fetch_limit = std::env::var("COMMENT_FETCH_LIMIT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_COMMENT_FETCH_LIMIT);

    let state = Arc::new(AppState {
        youtube: YouTubeClient::new(&youtube_api_key),
        llm: CompletionClient::new(&openai_api_key, &openai_model),
        shortener: ShortenerClient::new(),
        comment_fetch_limit,
    });

    let app = Router::new()
        .route("/", get(status))
        .route("/youtube", post(analyze_video))
        .route("/search", post(search))
        .route("/chat", post(chat))
        .route("/shorten", post(shorten))
        .route("/log", post(log_event))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind to {}: {}", addr, e));

    println!("Listening on http://{}", addr);
    axum::serve(listener, app).await.expect("Server failed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    /// Serve a stand-in upstream on an ephemeral port and hand back its base
    /// URL so client base URLs can point at it.
    async fn spawn_upstream(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn test_state(base_url: &str) -> Arc<AppState> {
        Arc::new(AppState {
            youtube: YouTubeClient::with_base_url("test-key", base_url),
            llm: CompletionClient::with_base_url("test-key", "test-model", base_url),
            shortener: ShortenerClient::with_base_url(base_url),
            comment_fetch_limit: DEFAULT_COMMENT_FETCH_LIMIT,
        })
    }

    fn video_payload() -> Json<Value> {
        Json(json!({
            "items": [{
                "snippet": {
                    "title": "My short",
                    "description": "Subscribe here https://a.com #fun",
                    "publishedAt": "2024-05-01T12:00:00Z"
                },
                "contentDetails": { "duration": "PT1M5S" },
                "statistics": { "viewCount": "100", "likeCount": "10", "commentCount": "3" }
            }]
        }))
    }

    fn completion_payload() -> Json<Value> {
        Json(json!({
            "choices": [
                { "message": { "role": "assistant", "content": "Tighten the hook." } }
            ]
        }))
    }

    #[tokio::test]
    async fn shorten_falls_back_to_original_when_shortener_fails() {
        let upstream = Router::new().route(
            "/api-create.php",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream down") }),
        );
        let state = test_state(&spawn_upstream(upstream).await);

        let Json(resp) = shorten(
            State(state),
            Json(ShortenRequest {
                url: "https://example.com/some/long/path".to_string(),
            }),
        )
        .await;

        assert_eq!(resp.original, "https://example.com/some/long/path");
        assert_eq!(resp.short, "https://example.com/some/long/path");
    }

    #[tokio::test]
    async fn shorten_returns_short_url_on_success() {
        let upstream = Router::new()
            .route("/api-create.php", get(|| async { "https://tiny.one/abc123" }));
        let state = test_state(&spawn_upstream(upstream).await);

        let Json(resp) = shorten(
            State(state),
            Json(ShortenRequest {
                url: "https://example.com/some/long/path".to_string(),
            }),
        )
        .await;

        assert_eq!(resp.original, "https://example.com/some/long/path");
        assert_eq!(resp.short, "https://tiny.one/abc123");
    }

    #[tokio::test]
    async fn analyze_succeeds_when_comment_fetch_fails() {
        // Comments disabled on the video: commentThreads answers 403 but the
        // analysis must still come back with an empty sample.
        let upstream = Router::new()
            .route("/videos", get(|| async { video_payload() }))
            .route(
                "/commentThreads",
                get(|| async { (StatusCode::FORBIDDEN, "commentsDisabled") }),
            )
            .route("/v1/chat/completions", post(|| async { completion_payload() }));
        let state = test_state(&spawn_upstream(upstream).await);

        let Json(resp) = analyze_video(
            State(state),
            Json(AnalyzeRequest {
                video_link: "https://www.youtube.com/shorts/dQw4w9WgXcQ".to_string(),
            }),
        )
        .await
        .expect("analysis should succeed without comments");

        assert_eq!(resp.metadata.title, "My short");
        assert_eq!(resp.metadata.duration_seconds, 65);
        assert_eq!(resp.ai_suggestions, "Tighten the hook.");
    }

    #[tokio::test]
    async fn analyze_unknown_video_is_not_found() {
        let upstream = Router::new()
            .route("/videos", get(|| async { Json(json!({ "items": [] })) }));
        let state = test_state(&spawn_upstream(upstream).await);

        let err = analyze_video(
            State(state),
            Json(AnalyzeRequest {
                video_link: "dQw4w9WgXcQ".to_string(),
            }),
        )
        .await
        .expect_err("missing video should not analyze");

        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn analyze_rejects_bad_reference_without_calling_upstream() {
        // No upstream at all: a bad reference must fail before any fetch.
        let state = test_state("http://127.0.0.1:1");

        let err = analyze_video(
            State(state),
            Json(AnalyzeRequest {
                video_link: "not a video".to_string(),
            }),
        )
        .await
        .expect_err("unparseable reference should be rejected");

        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}

