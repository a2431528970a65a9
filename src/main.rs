use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpResponse, HttpServer, Responder, get};
use dotenvy::dotenv;
use serde_json::json;

mod api;
mod auth;
mod config;
mod db;
mod directory;
mod docs;
mod leave;
mod model;
mod models;
mod notify;
mod routes;

use config::Config;
use db::{ensure_schema, init_db};
use directory::Directory;
use leave::store::MySqlLeaveStore;
use notify::Notifier;

use crate::docs::ApiDoc;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Leave Management Service"
}

#[get("/health")]
async fn health(store: Data<MySqlLeaveStore>) -> impl Responder {
    match sqlx::query("SELECT 1").execute(store.pool()).await {
        Ok(_) => HttpResponse::Ok().json(json!({"status": "ok"})),
        Err(e) => HttpResponse::InternalServerError()
            .json(json!({"status": "degraded", "error": e.to_string()})),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    let config = Config::from_env();

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url).await;
    ensure_schema(&pool)
        .await
        .expect("Failed to ensure leaves schema");

    let store = MySqlLeaveStore::new(pool);
    let notifier = Notifier::new(&config.notify_url);
    let directory = Directory::new(&config.user_svc_url);

    let server_addr = config.server_addr.clone();
    let rate_per_min = config.rate_protected_per_min;

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(store.clone()))
            .app_data(Data::new(notifier.clone()))
            .app_data(Data::new(directory.clone()))
            .app_data(Data::new(config.clone()))
            .service(index)
            .service(health)
            .configure(|cfg| routes::configure(cfg, rate_per_min))
    })
    .bind(server_addr)?
    .run()
    .await
}
