//! papercite - Research Paper Citation Compiler
//!
//! A Rust microservice that extracts fourteen bibliographic fields from
//! user-submitted paper details via a generation API, accumulates the rows
//! per session, and exports the compiled table as an Excel workbook.
//!
//! ## Usage
//!
//! ### HTTP Server Mode
//! ```bash
//! API_KEY=... papercite serve --port 5000
//! ```
//!
//! ### CLI Mode
//! ```bash
//! API_KEY=... papercite extract --link "https://..." --text-file paper.txt
//! ```

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use clap::{Parser, Subcommand};
use papercite::compiler::{compile_batch, parse_form_batch, SessionStore};
use papercite::export::{workbook_bytes, write_workbook, EXPORT_FILENAME, XLSX_CONTENT_TYPE};
use papercite::extractor::{
    extract_fields, ChatCompletionClient, GenerationService, LlmConfig, DEFAULT_BASE_URL,
    DEFAULT_MODEL,
};
use papercite::fields::{FieldSet, PaperInput, HEADERS};
use papercite::render;
use papercite::CiteError;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn, Level};
use tracing_subscriber::{fmt, EnvFilter};

/// Default server port when neither --port nor PORT is set
const DEFAULT_PORT: u16 = 5000;

/// Session cookie name
const SESSION_COOKIE: &str = "sid";

// ============================================================================
// CLI Definition
// ============================================================================

/// Research Paper Citation Compiler - Rust Microservice
#[derive(Parser)]
#[command(name = "papercite")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run as HTTP server
    Serve {
        /// Port to listen on (falls back to PORT env, then 5000)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// LLM API base URL (OpenAI-compatible)
        #[arg(long)]
        llm_base_url: Option<String>,

        /// LLM model name
        #[arg(long)]
        llm_model: Option<String>,
    },

    /// Extract fields for a single paper and print them
    Extract {
        /// Link of the paper
        #[arg(long, default_value = "")]
        link: String,

        /// Paper details as inline text
        #[arg(long)]
        text: Option<String>,

        /// Read paper details from a file instead
        #[arg(long)]
        text_file: Option<PathBuf>,

        /// Also write the extracted row to an xlsx file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// LLM API base URL (OpenAI-compatible)
        #[arg(long)]
        llm_base_url: Option<String>,

        /// LLM model name
        #[arg(long)]
        llm_model: Option<String>,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .init();

    match cli.command {
        Commands::Serve {
            port,
            host,
            llm_base_url,
            llm_model,
        } => {
            let config = llm_config(llm_base_url, llm_model)?;
            run_server(host, resolve_port(port), config).await
        }
        Commands::Extract {
            link,
            text,
            text_file,
            output,
            llm_base_url,
            llm_model,
        } => {
            let config = llm_config(llm_base_url, llm_model)?;
            run_extract(link, text, text_file, output, config).await
        }
    }
}

/// Build the LLM configuration from flags, environment, and defaults
fn llm_config(base_url: Option<String>, model: Option<String>) -> Result<LlmConfig> {
    let api_key = std::env::var("API_KEY")
        .context("API_KEY must be set (environment or .env file)")?;

    let base_url = base_url
        .or_else(|| std::env::var("LLM_BASE_URL").ok())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let model = model
        .or_else(|| std::env::var("LLM_MODEL").ok())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    Ok(LlmConfig {
        base_url,
        api_key,
        model,
    })
}

/// Resolve the listen port: flag > PORT env > default
fn resolve_port(flag: Option<u16>) -> u16 {
    flag.or_else(|| std::env::var("PORT").ok().and_then(|p| p.parse().ok()))
        .unwrap_or(DEFAULT_PORT)
}

// ============================================================================
// CLI Extraction
// ============================================================================

async fn run_extract(
    link: String,
    text: Option<String>,
    text_file: Option<PathBuf>,
    output: Option<PathBuf>,
    config: LlmConfig,
) -> Result<()> {
    let text = match (text, text_file) {
        (Some(t), _) => t,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, None) => String::new(),
    };

    let input = PaperInput::new(link, text);
    if input.is_blank() {
        anyhow::bail!("Nothing to extract: provide --link and/or --text / --text-file");
    }

    let client = ChatCompletionClient::new(config)?;

    let row = match extract_fields(&client, &input).await {
        Ok(row) => row,
        Err(CiteError::ShapeMismatch { expected, got }) => {
            warn!(expected = expected, got = got, "Shape mismatch, degrading row");
            FieldSet::degraded(&input.link)
        }
        Err(e) => return Err(e.into()),
    };

    for (header, value) in HEADERS.iter().zip(row.values()) {
        println!("{}: {}", header, value);
    }

    if let Some(path) = output {
        write_workbook(&path, std::slice::from_ref(&row))?;
        println!("Saved: {}", path.display());
    }

    Ok(())
}

// ============================================================================
// HTTP Server
// ============================================================================

struct AppState {
    store: SessionStore,
    service: Arc<dyn GenerationService>,
}

async fn run_server(host: String, port: u16, config: LlmConfig) -> Result<()> {
    info!(host = %host, port = port, model = %config.model, "Starting HTTP server");

    let service: Arc<dyn GenerationService> = Arc::new(ChatCompletionClient::new(config)?);
    let app_state = Arc::new(AppState {
        store: SessionStore::new(),
        service,
    });

    let app = Router::new()
        .route("/", get(index_handler))
        .route("/compile", post(compile_handler))
        .route("/process", post(process_handler))
        .route("/delete_data", post(delete_handler))
        .route("/health", get(health_handler))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(app_state);

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .context("Invalid host:port")?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}

/// Health check endpoint
async fn health_handler() -> &'static str {
    "OK"
}

/// Entry form page
async fn index_handler() -> Html<String> {
    Html(render::index_page())
}

/// Compile endpoint: extract each submitted pair and render the full table
async fn compile_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let batch = parse_form_batch(&body);
    info!(pairs = batch.len(), "Compile request");

    let (sid, created) = resolve_session(&headers);
    let table = compile_batch(state.service.as_ref(), &state.store, &sid, &batch).await;

    let response = Html(render::compiled_page(&table)).into_response();
    with_session_cookie(response, &sid, created)
}

/// Export endpoint: download the accumulated table as an Excel workbook
async fn process_handler(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let (sid, created) = resolve_session(&headers);
    let rows = state.store.rows(&sid);
    info!(session = %sid, rows = rows.len(), "Export request");

    match workbook_bytes(&rows) {
        Ok(bytes) => {
            let mut response = bytes.into_response();
            response
                .headers_mut()
                .insert(header::CONTENT_TYPE, HeaderValue::from_static(XLSX_CONTENT_TYPE));
            if let Ok(disposition) =
                HeaderValue::from_str(&format!("attachment; filename=\"{}\"", EXPORT_FILENAME))
            {
                response
                    .headers_mut()
                    .insert(header::CONTENT_DISPOSITION, disposition);
            }
            with_session_cookie(response, &sid, created)
        }
        Err(e) => {
            error!(error = %e, "Export failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Export failed").into_response()
        }
    }
}

/// Clear endpoint: reset the session's table and return to the entry page
async fn delete_handler(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Some(sid) = session_from_headers(&headers) {
        state.store.clear(&sid);
        info!(session = %sid, "Cleared accumulated data");
    }
    Redirect::to("/").into_response()
}

// ============================================================================
// Session Cookies
// ============================================================================

/// Read the session id from the request's Cookie header
fn session_from_headers(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        pair.trim()
            .strip_prefix(SESSION_COOKIE)?
            .strip_prefix('=')
            .map(|v| v.to_string())
    })
}

/// Resolve the request's session id, creating one if absent.
/// Returns (id, created).
fn resolve_session(headers: &HeaderMap) -> (String, bool) {
    match session_from_headers(headers) {
        Some(sid) => (sid, false),
        None => (uuid::Uuid::new_v4().to_string(), true),
    }
}

/// Attach the session cookie to a response for newly created sessions
fn with_session_cookie(mut response: Response, sid: &str, created: bool) -> Response {
    if created {
        if let Ok(value) = HeaderValue::from_str(&format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            SESSION_COOKIE, sid
        )) {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
    }
    response
}
