use std::env;
use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    extract::DefaultBodyLimit,
    extract::State,
    extract::connect_info::ConnectInfo,
    http::Method,
    http::Request,
    http::header::{CONTENT_TYPE, HeaderName, HeaderValue},
    middleware,
    middleware::Next,
    response::Response,
    routing::{get, post},
};
use clap::Parser;
use dotenvy::dotenv;
use governor::{
    Quota, RateLimiter, clock::DefaultClock, middleware::NoOpMiddleware,
    state::keyed::DashMapStateStore,
};
use hr_common::{
    CorpusIndex, EmployeeRecord, EngineConfig, RetrievalEngine,
    dataset::load_records,
    logging::{init_tracing_subscriber, install_tracing_panic_hook},
};
use parking_lot::RwLock;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

pub mod compose;
pub mod error;
pub mod handlers;

use compose::ResponseComposer;
use error::ApiError;
use handlers::{chat, corpus, employees, health, stats};

const SHUTDOWN_DRAIN_GRACE: Duration = Duration::from_millis(200);
/// Upper bound on `max_results` accepted from clients.
pub const MAX_RESULTS_LIMIT: usize = 100;

#[derive(Debug, Clone, Parser)]
#[command(name = "hr-api", about = "Staffing query assistant HTTP API")]
struct Cli {
    /// Employee dataset (JSON array of records)
    #[arg(long, env = "HR_DATA_PATH", default_value = "data/employees.json")]
    data_path: PathBuf,

    /// Server port
    #[arg(long, env = "PORT", default_value_t = 8000)]
    port: u16,

    /// Comma separated list of allowed CORS origins
    #[arg(long, env = "HR_CORS_ORIGINS", default_value = "http://localhost:8501")]
    cors_origins: String,

    /// Results returned by /api/chat when the request does not say
    #[arg(long, env = "HR_DEFAULT_MAX_RESULTS", default_value_t = 5)]
    default_max_results: usize,

    /// Prometheus exporter port; unset disables the exporter
    #[arg(long, env = "HR_METRICS_PORT")]
    metrics_port: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub default_max_results: usize,
    pub metrics_port: Option<u16>,
}

impl AppConfig {
    fn from_cli(cli: Cli) -> Result<Self, ApiError> {
        let cors_origins = cli
            .cors_origins
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect::<Vec<_>>();

        if cors_origins.iter().any(|origin| origin == "*") {
            return Err(ApiError::BadRequest("HR_CORS_ORIGINS must list explicit origins".into()));
        }

        if cli.default_max_results == 0 || cli.default_max_results > MAX_RESULTS_LIMIT {
            return Err(ApiError::BadRequest(format!(
                "HR_DEFAULT_MAX_RESULTS must be between 1 and {MAX_RESULTS_LIMIT}"
            )));
        }

        let metrics_port = match cli.metrics_port.as_deref() {
            None => None,
            Some(raw) => {
                let port = hr_metrics::parse_port(raw);
                if port.is_none() {
                    warn!(value = raw, "ignoring invalid HR_METRICS_PORT");
                }
                port
            }
        };

        Ok(Self {
            data_path: cli.data_path,
            port: cli.port,
            cors_origins,
            default_max_results: cli.default_max_results,
            metrics_port,
        })
    }

    pub fn for_tests(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            port: 8000,
            cors_origins: vec!["http://localhost:8501".into()],
            default_max_results: 5,
            metrics_port: None,
        }
    }
}

type IpRateLimiter = RateLimiter<IpAddr, DashMapStateStore<IpAddr>, DefaultClock, NoOpMiddleware>;

#[derive(Clone)]
pub struct RateLimits {
    global: Arc<IpRateLimiter>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub per_sec: u64,
    pub burst: u32,
}

impl RateLimitConfig {
    fn parse_env<T: std::str::FromStr + PartialOrd + Default>(name: &str) -> Option<T> {
        env::var(name)
            .ok()
            .and_then(|value| value.trim().parse::<T>().ok())
            .filter(|value| *value > T::default())
    }

    pub fn from_env() -> Self {
        Self {
            per_sec: Self::parse_env("HR_RATE_LIMIT_PER_SEC").unwrap_or(20),
            burst: Self::parse_env("HR_RATE_LIMIT_BURST").unwrap_or(40),
        }
    }
}

fn build_ip_limiter(per_second: u64, burst_size: u32) -> Arc<IpRateLimiter> {
    let nanos_per_token = (1_000_000_000u64 / per_second.max(1)).max(1);
    let burst = NonZeroU32::new(burst_size).unwrap_or(NonZeroU32::MIN);
    let quota = Quota::with_period(Duration::from_nanos(nanos_per_token))
        .unwrap_or_else(|| Quota::per_second(NonZeroU32::MIN))
        .allow_burst(burst);

    Arc::new(RateLimiter::keyed(quota))
}

pub fn rate_limits_from(config: &RateLimitConfig) -> RateLimits {
    RateLimits {
        global: build_ip_limiter(config.per_sec, config.burst),
    }
}

pub fn default_rate_limits() -> RateLimits {
    rate_limits_from(&RateLimitConfig::from_env())
}

/// Shared service state. The corpus index sits behind a lock only so a
/// reload can swap in a freshly built one; readers clone the `Arc` and
/// release the lock immediately.
pub struct AppState {
    index: RwLock<Arc<CorpusIndex>>,
    pub engine: RetrievalEngine,
    pub composer: ResponseComposer,
    pub config: AppConfig,
    pub(crate) rate_limits: RateLimits,
    pub readiness: Arc<AtomicBool>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(
        config: AppConfig,
        engine: RetrievalEngine,
        index: CorpusIndex,
        rate_limits: RateLimits,
    ) -> Self {
        Self {
            index: RwLock::new(Arc::new(index)),
            engine,
            composer: ResponseComposer,
            config,
            rate_limits,
            readiness: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Current index. Held snapshots stay valid across reloads.
    pub fn index(&self) -> Arc<CorpusIndex> {
        self.index.read().clone()
    }

    /// Install `index`, returning the one it replaced.
    pub fn swap_index(&self, index: CorpusIndex) -> Arc<CorpusIndex> {
        std::mem::replace(&mut *self.index.write(), Arc::new(index))
    }

    pub fn is_ready(&self) -> bool {
        self.readiness.load(Ordering::SeqCst)
    }
}

/// Load the dataset named by `config` and build the initial state.
pub fn build_state(
    config: AppConfig,
    engine: RetrievalEngine,
    rate_limits: RateLimits,
) -> Result<SharedState, ApiError> {
    let records = load_records(&config.data_path)?;
    let index = engine.build_index(records);
    report_skipped(&index, &config.data_path);
    Ok(Arc::new(AppState::new(config, engine, index, rate_limits)))
}

pub(crate) fn report_skipped(index: &CorpusIndex, path: &Path) {
    for skipped in index.skipped() {
        warn!(path = %path.display(), error = %skipped, "dataset record skipped");
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static("x-request-id")])
}

fn request_ip<B>(req: &Request<B>) -> Option<IpAddr> {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip())
}

fn enforce_rate_limit(limiter: &IpRateLimiter, ip: Option<IpAddr>) -> Result<(), ApiError> {
    if let Some(client_ip) = ip {
        if limiter.check_key(&client_ip).is_err() {
            return Err(ApiError::TooManyRequests("rate limit exceeded".into()));
        }
    }

    Ok(())
}

async fn global_rate_limit(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    enforce_rate_limit(&state.rate_limits.global, request_ip(&req))?;
    Ok(next.run(req).await)
}

async fn attach_request_id_context(req: Request<Body>, next: Next) -> Response {
    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string());

    error::with_request_id(request_id, next.run(req)).await
}

pub fn create_router(state: SharedState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    let request_id_header = HeaderName::from_static("x-request-id");
    let trace_header = request_id_header.clone();

    let trace = TraceLayer::new_for_http().make_span_with(move |request: &Request<Body>| {
        let request_id = request
            .headers()
            .get(&trace_header)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");

        tracing::info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
            status = tracing::field::Empty,
        )
    });

    let api_routes = Router::new()
        .route("/chat", post(chat::chat))
        .route("/employees", get(employees::list_employees))
        .route("/employees/search", get(employees::search_employees))
        .route("/employees/:id", get(employees::get_employee))
        .route("/stats", get(stats::get_stats))
        .route("/corpus/reload", post(corpus::reload));

    Router::new()
        .route("/health", get(health::readyz))
        .route("/livez", get(health::livez))
        .route("/readyz", get(health::readyz))
        .nest("/api", api_routes)
        .layer(middleware::from_fn_with_state(state.clone(), global_rate_limit))
        .layer(middleware::from_fn(attach_request_id_context))
        .layer(DefaultBodyLimit::max(64 * 1024))
        .layer(trace)
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid::default()))
        .layer(cors)
        .with_state(state)
}

/// In-memory state for router tests; `/api/corpus/reload` reads from a path
/// that does not exist.
pub fn test_state(records: Vec<EmployeeRecord>) -> SharedState {
    let engine = RetrievalEngine::new(EngineConfig::default());
    let index = engine.build_index(records);
    Arc::new(AppState::new(
        AppConfig::for_tests("does-not-exist/employees.json"),
        engine,
        index,
        default_rate_limits(),
    ))
}

pub async fn run() -> Result<(), ApiError> {
    dotenv().ok();
    init_tracing_subscriber(env!("CARGO_PKG_NAME"));
    install_tracing_panic_hook(env!("CARGO_PKG_NAME"));

    let cli = Cli::parse();
    let config = AppConfig::from_cli(cli)?;

    if let Some(port) = config.metrics_port {
        hr_metrics::init_metrics(port);
    }

    let engine = RetrievalEngine::new(EngineConfig::from_env());
    let state = build_state(config.clone(), engine, default_rate_limits())?;

    let addr: SocketAddr = ([0, 0, 0, 0], config.port).into();
    let app = create_router(state.clone());

    info!(
        %addr,
        employees = state.index().len(),
        data_path = %config.data_path.display(),
        "hr-api listening"
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?;

    let service = app.into_make_service_with_connect_info::<SocketAddr>();

    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal(state.clone()))
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?;

    Ok(())
}

async fn shutdown_signal(state: SharedState) {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
            let _ = sigterm.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    state.readiness.store(false, Ordering::SeqCst);
    info!("shutdown signal received; draining");

    // Let load balancers observe /readyz as not ready before the listener closes.
    tokio::time::sleep(SHUTDOWN_DRAIN_GRACE).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::{Request, StatusCode},
        routing::get,
    };
    use hr_common::Availability;
    use std::sync::Mutex;
    use tower::ServiceExt;

    static ENV_GUARD: Mutex<()> = Mutex::new(());

    fn with_envs(vars: &[(&str, Option<&str>)], f: impl FnOnce()) {
        let _guard = ENV_GUARD.lock().unwrap();

        let previous: Vec<(&str, Option<String>)> = vars
            .iter()
            .map(|(var, value)| {
                let old = env::var(var).ok();
                match value {
                    Some(v) => unsafe { env::set_var(var, v) },
                    None => unsafe { env::remove_var(var) },
                }
                (*var, old)
            })
            .collect();

        f();

        for (var, previous_value) in previous {
            match previous_value {
                Some(v) => unsafe { env::set_var(var, v) },
                None => unsafe { env::remove_var(var) },
            }
        }
    }

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["hr-api"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[tokio::test]
    async fn sets_request_id_when_missing() {
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static("x-request-id")))
            .layer(SetRequestIdLayer::new(
                HeaderName::from_static("x-request-id"),
                MakeRequestUuid::default(),
            ));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[test]
    fn rate_limit_config_respects_env_overrides() {
        with_envs(
            &[
                ("HR_RATE_LIMIT_PER_SEC", Some("10")),
                ("HR_RATE_LIMIT_BURST", Some("25")),
            ],
            || {
                assert_eq!(
                    RateLimitConfig::from_env(),
                    RateLimitConfig {
                        per_sec: 10,
                        burst: 25
                    }
                );
            },
        );
    }

    #[test]
    fn rate_limit_config_ignores_zero_and_garbage() {
        with_envs(
            &[
                ("HR_RATE_LIMIT_PER_SEC", Some("0")),
                ("HR_RATE_LIMIT_BURST", Some("many")),
            ],
            || {
                assert_eq!(
                    RateLimitConfig::from_env(),
                    RateLimitConfig {
                        per_sec: 20,
                        burst: 40
                    }
                );
            },
        );
    }

    #[test]
    fn limiter_rejects_after_burst() {
        let limits = rate_limits_from(&RateLimitConfig {
            per_sec: 1,
            burst: 2,
        });
        let ip = Some(IpAddr::from([127, 0, 0, 1]));

        assert!(enforce_rate_limit(&limits.global, ip).is_ok());
        assert!(enforce_rate_limit(&limits.global, ip).is_ok());
        assert!(matches!(
            enforce_rate_limit(&limits.global, ip),
            Err(ApiError::TooManyRequests(_))
        ));
        assert!(enforce_rate_limit(&limits.global, None).is_ok());
    }

    #[test]
    fn config_rejects_wildcard_cors_and_zero_results() {
        with_envs(
            &[
                ("HR_CORS_ORIGINS", None),
                ("HR_DEFAULT_MAX_RESULTS", None),
                ("HR_METRICS_PORT", None),
            ],
            || {
                assert!(AppConfig::from_cli(cli(&["--cors-origins", "*"])).is_err());
                assert!(AppConfig::from_cli(cli(&["--default-max-results", "0"])).is_err());

                let config = AppConfig::from_cli(cli(&[
                    "--cors-origins",
                    "http://a.test, http://b.test",
                    "--metrics-port",
                    "nope",
                ]))
                .unwrap();
                assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
                assert_eq!(config.metrics_port, None);
                assert_eq!(config.default_max_results, 5);
            },
        );
    }

    #[test]
    fn swap_index_keeps_old_snapshots_alive() {
        let ada = EmployeeRecord::new(1, "Ada", &["Rust"], 4.0, Availability::Available);
        let state = test_state(vec![ada]);
        let before = state.index();

        let replaced = state.swap_index(state.engine.build_index(Vec::new()));

        assert_eq!(before.len(), 1);
        assert_eq!(replaced.len(), 1);
        assert!(state.index().is_empty());
    }
}
