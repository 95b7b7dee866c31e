//! 可观测性模块
//!
//! 提供 Prometheus 指标、结构化日志和健康检查。

use axum::{
    Json, Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    routing::get,
};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write as _;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::cache::CacheStats;
use crate::config::LoggingConfig;
use crate::services::QueryService;

/// 简单应用指标
#[derive(Clone, Default)]
pub struct AppMetrics {
    pub http_requests_total: Arc<AtomicU64>,
    pub http_request_duration_sum: Arc<AtomicU64>,
    pub errors_total: Arc<AtomicU64>,
}

impl AppMetrics {
    /// 记录 HTTP 请求
    pub fn record_http_request(&self, duration_ms: u64) {
        self.http_requests_total.fetch_add(1, Ordering::SeqCst);
        self.http_request_duration_sum
            .fetch_add(duration_ms, Ordering::SeqCst);
    }

    /// 记录错误
    pub fn record_error(&self) {
        self.errors_total.fetch_add(1, Ordering::SeqCst);
    }

    /// 生成 Prometheus 格式指标，附带各缓存与数据集计数
    pub fn gather(&self, caches: &[CacheStats], reloads: u64, purges: u64) -> String {
        let requests = self.http_requests_total.load(Ordering::SeqCst);
        let mut output = format!(
            r#"# HELP http_requests_total Total HTTP requests
# TYPE http_requests_total counter
http_requests_total {}
# HELP http_request_duration_seconds HTTP request duration in seconds
# TYPE http_request_duration_seconds histogram
http_request_duration_seconds_sum {}
http_request_duration_seconds_count {}
# HELP errors_total Total errors
# TYPE errors_total counter
errors_total {}
# HELP dataset_reloads_total Dataset snapshot reloads
# TYPE dataset_reloads_total counter
dataset_reloads_total {}
# HELP cache_purges_total Purges fanned out to every registered cache
# TYPE cache_purges_total counter
cache_purges_total {}
"#,
            requests,
            self.http_request_duration_sum.load(Ordering::SeqCst) as f64 / 1000.0,
            requests,
            self.errors_total.load(Ordering::SeqCst),
            reloads,
            purges,
        );

        for (metric, kind, help) in [
            ("cache_hits_total", "counter", "Cache hits"),
            ("cache_misses_total", "counter", "Cache misses"),
            ("cache_evictions_total", "counter", "Cache evictions"),
            ("cache_clears_total", "counter", "Cache clears"),
            ("cache_entries", "gauge", "Cached entries"),
        ] {
            let _ = writeln!(output, "# HELP {} {}", metric, help);
            let _ = writeln!(output, "# TYPE {} {}", metric, kind);
            for stats in caches {
                let value = match metric {
                    "cache_hits_total" => stats.hits,
                    "cache_misses_total" => stats.misses,
                    "cache_evictions_total" => stats.evictions,
                    "cache_clears_total" => stats.clears,
                    _ => stats.size as u64,
                };
                let _ = writeln!(output, "{}{{cache=\"{}\"}} {}", metric, stats.name, value);
            }
        }

        output
    }
}

/// 健康检查状态
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub uptime_seconds: f64,
    pub checks: Vec<HealthCheck>,
}

/// 单个健康检查项
#[derive(Debug, Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: String,
    pub message: Option<String>,
    pub latency_ms: Option<u64>,
}

/// 应用状态（用于健康检查）
#[derive(Clone)]
pub struct ObservabilityState {
    pub metrics: Arc<AppMetrics>,
    pub query_service: Arc<dyn QueryService>,
    pub start_time: DateTime<Utc>,
    pub version: String,
}

impl ObservabilityState {
    pub fn new(version: String, query_service: Arc<dyn QueryService>) -> Self {
        Self {
            metrics: Arc::new(AppMetrics::default()),
            query_service,
            start_time: Utc::now(),
            version,
        }
    }

    /// 获取应用正常运行时间
    pub fn uptime_seconds(&self) -> f64 {
        (Utc::now() - self.start_time).num_seconds() as f64
    }

    async fn dataset_check(&self) -> HealthCheck {
        let start = std::time::Instant::now();
        let (status, message) = match self.query_service.status().await {
            Ok(status) if status.source_present => (
                "healthy",
                format!("{} rows, token {}", status.row_count, status.token),
            ),
            Ok(_) => ("unhealthy", "dataset file is missing".to_string()),
            Err(e) => ("unhealthy", e.to_string()),
        };

        HealthCheck {
            name: "dataset".to_string(),
            status: status.to_string(),
            message: Some(message),
            latency_ms: Some(start.elapsed().as_millis() as u64),
        }
    }
}

/// 获取完整健康状态
pub async fn health_check(State(state): State<Arc<ObservabilityState>>) -> impl IntoResponse {
    let checks = vec![state.dataset_check().await];
    let all_healthy = checks.iter().all(|c| c.status == "healthy");

    let health_status = HealthStatus {
        status: if all_healthy {
            "healthy".to_string()
        } else {
            "unhealthy".to_string()
        },
        timestamp: Utc::now().to_rfc3339(),
        version: state.version.clone(),
        uptime_seconds: state.uptime_seconds(),
        checks,
    };

    // 数据文件缺失时查询仍可返回空结果，健康检查只报告状态
    (StatusCode::OK, Json(health_status))
}

/// 简单存活检查
pub async fn liveness() -> impl IntoResponse {
    "OK"
}

/// 就绪检查，数据集存在且可加载时就绪
pub async fn readiness(State(state): State<Arc<ObservabilityState>>) -> impl IntoResponse {
    match state.query_service.status().await {
        Ok(status) if status.source_present => (StatusCode::OK, "Ready"),
        _ => (StatusCode::SERVICE_UNAVAILABLE, "Not Ready"),
    }
}

/// Prometheus 指标端点
pub async fn metrics(State(state): State<Arc<ObservabilityState>>) -> impl IntoResponse {
    let service = &state.query_service;
    let output = state.metrics.gather(
        &service.cache_stats(),
        service.reload_count(),
        service.purge_count(),
    );
    (StatusCode::OK, output)
}

/// 版本信息端点
pub async fn version(State(state): State<Arc<ObservabilityState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "version": state.version,
        "uptime_seconds": state.uptime_seconds(),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// 创建可观测性路由
pub fn create_observability_router(state: Arc<ObservabilityState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/live", get(liveness))
        .route("/health/ready", get(readiness))
        .route("/metrics", get(metrics))
        .route("/version", get(version))
        .with_state(state)
}

/// 初始化结构化日志
///
/// `RUST_LOG` 优先于配置中的级别。设置了日志目录时按天滚动写入文件，
/// 返回的 guard 需要持有到进程退出。
pub fn init_tracing(config: &LoggingConfig) -> Option<WorkerGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let (writer, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "footfall.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(writer), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stdout), None),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_line_number(true)
        .with_writer(writer);

    let result = if config.structured {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = result {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    guard
}

/// 记录请求指标的中间件
pub async fn metrics_middleware(
    State(state): State<Arc<ObservabilityState>>,
    req: Request,
    next: Next,
) -> Response {
    let start = std::time::Instant::now();

    let response = next.run(req).await;

    state
        .metrics
        .record_http_request(start.elapsed().as_millis() as u64);
    if response.status().is_server_error() {
        state.metrics.record_error();
    }

    response
}
