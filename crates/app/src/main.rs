use migration::{Migrator, MigratorTrait};
use server::{AuthConfig, AuthKeys};
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "raspi_finance={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let auth = match AuthKeys::new(&AuthConfig {
        jwt_key: settings.auth.jwt_key,
        token_ttl_minutes: settings.auth.token_ttl_minutes,
        secure_cookie: settings.auth.secure_cookie,
    }) {
        Ok(auth) => auth,
        Err(err) => {
            tracing::error!("invalid auth settings: {err}");
            return Err(err.into());
        }
    };

    let db = parse_database(&settings.server.database).await?;
    let engine = engine::Engine::builder().database(db).build().await?;

    let bind = settings
        .server
        .bind
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    server::run_with_listener(engine, auth, listener).await?;
    Ok(())
}

async fn parse_database(
    config: &Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    tracing::info!("database ready");
    Ok(database)
}
