use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use solar_leads::config::Config;
use solar_leads::db::Database;
use solar_leads::documents::{DisabledRenderer, DocumentRenderer, HttpPdfRenderer};
use solar_leads::handlers::{self, AppState};
use solar_leads::image_store::{HttpImageStore, ImageStore};
use solar_leads::lead_store::{LeadStore, PgLeadStore};
use solar_leads::notifier::{LogNotifier, Notifier, SmtpNotifier};
use solar_leads::pipeline::LeadPipeline;

/// Main entry point for the application.
///
/// This function initializes the application, including:
/// - Logging and tracing.
/// - Configuration loading.
/// - Database connection and migrations.
/// - Notification, PDF and image-host collaborators.
/// - HTTP routes and middleware (CORS, Rate Limiting).
///
/// It then starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "solar_leads=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize database connection pool
    let db = Database::new(&config.database_url).await?;
    tracing::info!("Database connection pool established, migrations applied");

    let leads: Arc<dyn LeadStore> = Arc::new(PgLeadStore::new(db.pool.clone()));

    let notifier: Arc<dyn Notifier> = match config.smtp {
        Some(ref smtp) => {
            let notifier = SmtpNotifier::new(smtp, &config.notify_email)?;
            tracing::info!("✓ SMTP notifier initialized for {}", config.notify_email);
            Arc::new(notifier)
        }
        None => Arc::new(LogNotifier),
    };

    let renderer: Arc<dyn DocumentRenderer> = match config.pdf_service_url {
        Some(ref url) => Arc::new(HttpPdfRenderer::new(url.clone())?),
        None => Arc::new(DisabledRenderer),
    };

    let images: Option<Arc<dyn ImageStore>> = match config.image_upload {
        Some(ref settings) => Some(Arc::new(HttpImageStore::new(settings)?)),
        None => None,
    };

    let port = config.port;
    let app_state = Arc::new(AppState {
        config,
        pipeline: LeadPipeline::new(leads.clone(), notifier, renderer),
        leads,
        images,
    });

    // Configure rate limiter: one request replenished every 2 seconds per IP, burst of 10
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(2)
            .burst_size(10)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Invalid rate limiter configuration"))?,
    );

    // Form submissions are rate limited; admin and health are not.
    let public_routes = handlers::public_routes().layer(ServiceBuilder::new().layer(GovernorLayer {
        config: governor_conf,
    }));

    let app = handlers::build_router(app_state, public_routes);

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
