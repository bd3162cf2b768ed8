use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{
    middleware::{Logger, NormalizePath},
    web, App, HttpServer,
};
use uptask::config::Config;
use uptask::mail::{LogMailer, Mailer, SmtpMailer};
use uptask::routes::{self, health};
use uptask::state::AppState;
use uptask::store::{MemoryStore, PgStore, Store};

fn cors(frontend_url: Option<&str>) -> Cors {
    let cors = match frontend_url {
        Some(origin) => Cors::default().allowed_origin(origin),
        None => Cors::default().allow_any_origin(),
    };
    cors.allow_any_method().allow_any_header().max_age(3600)
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env();

    let store: Arc<dyn Store> = match config.database_url.as_deref() {
        Some(url) => {
            let store = PgStore::connect(url)
                .await
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
            store
                .migrate()
                .await
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
            log::info!("Connected to PostgreSQL");
            Arc::new(store)
        }
        None => {
            log::warn!("DATABASE_URL not set, data is kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    let mailer: Arc<dyn Mailer> = match &config.smtp {
        Some(smtp) => {
            let mailer = SmtpMailer::new(smtp)
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
            log::info!("Sending email through {}:{}", smtp.host, smtp.port);
            Arc::new(mailer)
        }
        None => {
            log::warn!("SMTP_HOST not set, emails are written to the log only");
            Arc::new(LogMailer)
        }
    };

    let state = AppState::new(
        store,
        mailer,
        config.auth.clone(),
        &config.mail_from,
    );
    let frontend_url = config.frontend_url.clone();

    log::info!("Starting UpTask server at {}", config.server_url());

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(cors(frontend_url.as_deref()))
            .wrap(NormalizePath::trim())
            .wrap(Logger::default())
            .service(health::health)
            .service(web::scope("/api").configure(routes::config))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
