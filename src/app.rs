use std::net::TcpListener;

use actix_web::dev::Server;
use actix_web::{get, HttpResponse, Responder};
use actix_web::{web, App, HttpServer};

use sqlx::PgPool;

use tracing_actix_web::TracingLogger;

use crate::controller::{accounts, profile, requests};

/// Simple health-check endpoint
#[tracing::instrument(name = "Health check")]
#[get("/health_check")]
async fn health_check() -> impl Responder {
    HttpResponse::Ok().body("I am alive")
}

/// Run the application on a specified TCP listener
pub fn run(listener: TcpListener, pool: PgPool) -> anyhow::Result<Server> {
    // Wrap application data
    let pool = web::Data::new(pool);

    // Start the server
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(pool.clone())
            .service(health_check)
            .service(requests::scope())
            .service(accounts::scope())
            .service(profile::scope())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
