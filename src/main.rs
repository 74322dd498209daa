use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use aidesk::api::middleware::{ApiKeyAuth, Cors};
use aidesk::cli::{commands::{Cli, Commands}, run_cli};
use aidesk::config::AppConfig;
use aidesk::proxy::{ChatProxy, ImageProxy, ResearchProxy};
use aidesk::{llm::ProviderFactory, search, vision};
use clap::Parser;
use tracing::{error, info, warn};
use url::Url;

async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({"status": "healthy"}))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if !matches!(cli.command, Commands::Serve) {
        if let Err(e) = run_cli(cli).await {
            error!("{}", e);
            std::process::exit(1);
        }
        return Ok(());
    }

    info!("Starting aidesk proxy server...");

    let config = match AppConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let placeholder_base = match Url::parse(&config.image.placeholder_base) {
        Ok(u) => u,
        Err(e) => {
            error!("Invalid image.placeholder_base: {}", e);
            std::process::exit(1);
        }
    };

    for (name, key) in [
        ("chat", &config.chat.api_key),
        ("image", &config.image.api_key),
        ("search", &config.search.api_key),
    ] {
        if key.is_empty() {
            warn!("No {} credential configured; that proxy will answer 500", name);
        }
    }

    let chat = web::Data::new(ChatProxy::new(ProviderFactory::create_default(&config)));
    let image = web::Data::new(ImageProxy::new(
        vision::create_default(&config),
        config.image.default_model.clone(),
        placeholder_base,
    ));
    let research = web::Data::new(ResearchProxy::new(search::create_default(&config)));

    let host = config.server.host.clone();
    let port = config.server.port;

    info!("Server listening on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(config.clone()))
            .app_data(chat.clone())
            .app_data(image.clone())
            .app_data(research.clone())
            .route("/health", web::get().to(health))
            .configure(aidesk::api::routes::configure)
            .wrap(ApiKeyAuth)
            .wrap(Cors)
    })
    .bind((host, port))?
    .run()
    .await
}
