use std::{env, io, sync::Arc};

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use qcu_calendar::{
    cache::{self, Cache},
    cli,
    server::{self, AppState},
    EventStore, MemoryStore, PgStore,
};

#[tokio::main]
async fn main() -> io::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("qcu_calendar=info"));
    fmt().with_env_filter(filter).init();

    let args = cli::parse(env::args().skip(1).collect());

    let store: Arc<dyn EventStore> = match &args.database_url {
        Some(url) => Arc::new(PgStore::connect(url).await.map_err(io::Error::other)?),
        None => {
            warn!("No database configured, serving built-in sample events");
            Arc::new(MemoryStore::portal_fixture())
        }
    };

    let cache = Cache::new(cache::Config {
        enabled: args.enable_cache,
        ttl: args.cache_ttl,
    });
    if cache.is_enabled() {
        info!("Caching calendars for {}s", args.cache_ttl.as_secs());
    }

    let router = server::router(AppState::new(store, cache));

    let listener = TcpListener::bind(args.address).await?;
    info!("Listening at http://{}", args.address);

    axum::serve(listener, router)
        .with_graceful_shutdown(server::shutdown_signal())
        .await
}
