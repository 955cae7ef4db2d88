use std::net::TcpListener;

use anyhow::Context;

use sqlx::PgPool;

use descuento_gas::settings::Settings;
use descuento_gas::{app, bootstrap, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = telemetry::create_subscriber("info".into(), std::io::stdout);
    telemetry::set_subscriber(subscriber)?;

    let settings = Settings::load().expect("Failed to load settings");

    let pool = PgPool::connect_with(settings.database.with_db()).await?;

    if let Some(bootstrap_settings) = &settings.bootstrap {
        bootstrap::ensure_admin_account(&pool, bootstrap_settings).await?;
    }

    let listener = TcpListener::bind(settings.app.addr())?;

    app::run(listener, pool)?.await.context("Failed to run app")
}
