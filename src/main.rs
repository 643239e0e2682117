use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use wiktok::{configure, AppState, Args};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wiktok=info")),
        )
        .init();

    let args = Args::parse();
    let address = format!("{}:{}", args.ip, args.port);

    let gateway = args.build_gateway().map_err(|e| {
        error!(error = %e, "failed to build upstream client");
        std::io::Error::new(std::io::ErrorKind::Other, "Gateway initialization failed")
    })?;

    info!(
        upstream = %args.api_url,
        cache_lifetime = args.cache_lifetime,
        "article gateway ready"
    );

    let app_state = web::Data::new(AppState {
        config: args,
        gateway,
    });

    info!("Server running at http://{}", address);
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(Cors::permissive())
            .configure(configure)
    })
    .bind(&address)?
    .run()
    .await
}
