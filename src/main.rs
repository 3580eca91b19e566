use anyhow::Result;
use std::{future::Future, sync::Arc};
use tokio::{net::TcpListener, sync::Mutex};
use tracing::{error, info};

use nebula_backend::api::{self, AppState};
use nebula_backend::autoplay::{RandomShuffler, Shuffler, UpNextEngine};
use nebula_backend::cache::{Clock, SystemClock, TtlCache};
use nebula_backend::config::Config;
use nebula_backend::sources::{MetadataExtractor, SearchFacade, YouTubeApiClient, YtDlpExtractor};
use nebula_backend::storage::LibraryStore;
use nebula_backend::stream::StreamResolver;

#[tokio::main]
async fn main() -> Result<()> {
    // Inicializar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("nebula_backend=debug".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    info!("🎵 Iniciando Nebula Backend v{}", env!("CARGO_PKG_VERSION"));

    // Cargar configuración
    let config = Config::load()?;

    // Manejar health check si es necesario
    if std::env::args().any(|arg| arg == "--health-check") {
        return health_check(&config).await;
    }

    info!("{}", config.summary());

    let extractor = Arc::new(YtDlpExtractor::new(
        config.ytdlp_path.clone(),
        config.max_concurrent_extractions,
    ));
    let extractor: Arc<dyn MetadataExtractor> = extractor;

    let api_client = match config.youtube_api_key.clone() {
        Some(key) => {
            info!("🔑 Búsqueda con YouTube API v3 activada");
            Some(YouTubeApiClient::new(key)?)
        }
        None => None,
    };
    let search = Arc::new(SearchFacade::new(
        extractor.clone(),
        api_client,
        config.search_timeout,
    ));

    // Cachés con reloj del sistema
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let streams = Arc::new(StreamResolver::new(
        extractor.clone(),
        TtlCache::new(config.stream_cache_ttl, clock.clone()),
        config.extract_timeout,
    ));

    let shuffler: Arc<dyn Shuffler> = match config.upnext_seed {
        Some(seed) => Arc::new(RandomShuffler::seeded(seed)),
        None => Arc::new(RandomShuffler::from_entropy()),
    };
    let upnext = Arc::new(UpNextEngine::new(
        extractor,
        search.clone(),
        TtlCache::new(config.upnext_cache_ttl, clock),
        shuffler,
        config.lookup_timeout,
    ));

    // Inicializar almacenamiento JSON
    let library = Arc::new(Mutex::new(LibraryStore::new(config.data_dir.clone()).await?));

    let state = AppState {
        streams,
        search,
        upnext,
        library,
    };
    let app = api::router(state, config.frontend_dir.as_deref());

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!("🚀 Servidor escuchando en http://{}", config.bind_addr);

    if let Err(why) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Error al ejecutar servidor: {:?}", why);
    }

    Ok(())
}

/// Manejar shutdown graceful
async fn shutdown_signal() {
    wait_for_signal(tokio::signal::ctrl_c()).await;
}

async fn wait_for_signal<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        // Sin manejador de señal el servidor sigue vivo hasta que lo maten
        error!("Error al registrar Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("⚠️ Señal de shutdown recibida, cerrando...");
}

async fn health_check(config: &Config) -> Result<()> {
    // Verificar dependencias críticas
    let extractor = YtDlpExtractor::new(config.ytdlp_path.clone(), 1);

    match extractor.version().await {
        Ok(version) => {
            info!("✅ yt-dlp versión: {}", version);
            println!("OK");
            Ok(())
        }
        Err(e) => anyhow::bail!("Dependencias faltantes: {}", e),
    }
}
