use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use acronymverse::{
    AppState,
    config::{Config, RateLimitBackend},
    rate_limit::{
        MemoryRateLimitStore, PgRateLimitStore, RateLimitStore, RateLimiter, RedisRateLimitStore,
    },
    routes,
};
use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    // 设置数据库连接池
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                conn.execute("SET application_name = 'acronymverse';").await?;
                Ok(())
            })
        })
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to Postgres");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    // 限流计数存储
    let store: Arc<dyn RateLimitStore> = match config.rate_limit_backend {
        RateLimitBackend::Postgres => Arc::new(PgRateLimitStore::new(pool.clone())),
        RateLimitBackend::Redis => {
            let url = config
                .redis_url
                .clone()
                .expect("REDIS_URL is required for the redis rate limit backend");
            let client = redis::Client::open(url).expect("Failed to create Redis client");
            Arc::new(RedisRateLimitStore::new(Arc::new(client)))
        }
        RateLimitBackend::Memory => {
            tracing::warn!("Using in-memory rate limit store, counters reset on restart");
            Arc::new(MemoryRateLimitStore::new())
        }
    };
    tracing::info!(
        backend = ?config.rate_limit_backend,
        limit = config.daily_request_limit,
        offset = %config.rate_limit_offset(),
        "Daily rate limiter ready"
    );

    let limiter = Arc::new(RateLimiter::new(store, config.rate_limit_offset()));

    let state = AppState {
        pool: pool.clone(),
        config: config.clone(),
        limiter,
    };

    let router = routes::build_router(state);

    // 开发模式下允许跨域
    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(tower_http::cors::CorsLayer::permissive())
    };

    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");

    // 连接池由进程管理，退出前关闭
    pool.close().await;
    tracing::info!("Server stopped");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
