use std::path::PathBuf;

use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use clap::Args;
use log::{info, warn};

use crate::config::Settings;
use crate::error::Result;
use crate::routes::configure_routes;

#[derive(Debug, Default, Args)]
pub struct ServeArgs {
    /// Port to listen on (overrides PORT).
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory holding the built dashboard (overrides FRONTEND_DIR).
    #[arg(long, value_name = "DIR")]
    pub frontend_dir: Option<PathBuf>,
}

pub async fn run_serve(settings: Settings, args: ServeArgs) -> Result<()> {
    let port = args.port.unwrap_or(settings.port);
    let frontend_dir = args.frontend_dir.unwrap_or(settings.frontend_dir);
    if !frontend_dir.is_dir() {
        warn!("frontend directory {} does not exist; build it with trunk first", frontend_dir.display());
    }
    let frontend_dir = frontend_dir.to_string_lossy().into_owned();
    let api = web::Data::new(settings.api);

    let bind_address = format!("0.0.0.0:{}", port);
    info!("Starting server on {}", bind_address);
    info!("Prediction service: {}", api.base_url);

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "OPTIONS"])
                    .allowed_headers(vec![actix_web::http::header::ACCEPT, actix_web::http::header::CONTENT_TYPE])
                    .max_age(3600),
            )
            .app_data(api.clone())
            .configure(|cfg| configure_routes(cfg, frontend_dir.clone()))
    })
    .bind(&bind_address)?
    .run()
    .await?;
    Ok(())
}
