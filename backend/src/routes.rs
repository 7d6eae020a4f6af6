use actix_files::Files;
use actix_web::{HttpResponse, web};
use log::debug;
use shared::ApiConfig;

pub fn configure_routes(cfg: &mut web::ServiceConfig, frontend_dir: String) {
    cfg.service(web::resource("/api/config").route(web::get().to(get_config)))
        .service(Files::new("/", frontend_dir).index_file("index.html"));
}

/// Lets the dashboard pick up the prediction service URL at runtime instead
/// of baking it into the wasm bundle.
async fn get_config(config: web::Data<ApiConfig>) -> HttpResponse {
    debug!("serving config for {}", config.base_url);
    HttpResponse::Ok().json(config.get_ref())
}
