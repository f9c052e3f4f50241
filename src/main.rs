//! cache_aside_auth 서버 진입점
//!
//! 환경 설정과 로깅을 초기화하고 MongoDB, 캐시 계층, OTP 저장소를 연결한 뒤
//! Actix-web 서버를 실행합니다.

use std::io;
use std::sync::Arc;
use actix_cors::Cors;
use actix_web::http::header;
use actix_web::{middleware, App, HttpServer};
use actix_governor::{Governor, GovernorConfigBuilder};
use dotenv::dotenv;
use env_logger::Env;
use log::{error, info};
use cache_aside_auth::caching::redis::{redact_url, RedisCache};
use cache_aside_auth::caching::{Cache, CacheLayer};
use cache_aside_auth::config::{CacheBackend, CacheConfig, OtpConfig, ServerConfig};
use cache_aside_auth::core::registry::ServiceLocator;
use cache_aside_auth::db::Database;
use cache_aside_auth::repositories::otp::OtpRepository;
use cache_aside_auth::repositories::users::UserRepository;
use cache_aside_auth::routes::configure_all_routes;
use cache_aside_auth::services::mail::LogMailer;

#[actix_web::main]
async fn main() -> io::Result<()> {
    load_env_file();
    init_logging();

    info!("🚀 cache_aside_auth 시작중...");

    initialize_data_stores().await?;

    ServiceLocator::initialize_all();

    info!("✅ 모든 서비스가 성공적으로 초기화되었습니다!");

    start_http_server().await
}

async fn start_http_server() -> io::Result<()> {
    let bind_address = format!("{}:{}", ServerConfig::host(), ServerConfig::port());

    info!("🌐 서버가 http://{} 에서 실행중입니다", bind_address);
    info!("📍 Health check: http://{}/health", bind_address);

    let per_second = ServerConfig::rate_limit_per_second();
    let burst_size = ServerConfig::rate_limit_burst_size();
    let governor_conf = GovernorConfigBuilder::default()
        .requests_per_second(per_second)
        .burst_size(burst_size)
        .use_headers()
        .finish()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "잘못된 Rate Limiting 설정"))?;

    info!("🛡️ Rate Limiting 활성화: 초당 {}요청, 버스트 {}개", per_second, burst_size);

    let origins = ServerConfig::allowed_origins();

    HttpServer::new(move || {
        App::new()
            .wrap(Governor::new(&governor_conf))
            .wrap(configure_cors(&origins))
            .wrap(middleware::Logger::default())
            .wrap(middleware::NormalizePath::trim())
            .configure(configure_all_routes)
    })
        .bind(bind_address)?
        .run()
        .await
}

/// `PROFILE`에 따라 `.env.dev` / `.env.prod` / `.env`를 로드합니다.
fn load_env_file() {
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "dev".to_string());

    match profile.as_str() {
        "prod" => match dotenv::from_filename(".env.prod") {
            Ok(_) => info!(".env.prod 파일 로드 됨"),
            Err(e) => error!(".env.prod 파일 로드 실패: {}", e),
        },
        "dev" => match dotenv::from_filename(".env.dev") {
            Ok(_) => info!(".env.dev 파일 로드 됨"),
            Err(e) => error!(".env.dev 파일 로드 실패: {}", e),
        },
        _ => {
            dotenv().ok();
            info!("기본 .env 파일 로드");
        }
    }
}

/// `RUST_LOG`가 없으면 `info,actix_web=debug`
fn init_logging() {
    env_logger::init_from_env(Env::default().default_filter_or("info,actix_web=debug"));
}

/// MongoDB, 캐시 계층, OTP 저장소, 메일러를 연결해 레지스트리에 등록합니다.
async fn initialize_data_stores() -> io::Result<()> {
    info!("📡 데이터베이스 연결 중...");

    let database = Arc::new(Database::new().await.map_err(io::Error::other)?);
    ServiceLocator::set(database);

    UserRepository::instance()
        .create_indexes()
        .await
        .map_err(io::Error::other)?;

    let layer = CacheLayer::initialize().await.map_err(io::Error::other)?;
    info!("✅ 캐시 계층 연결 성공 ({:?})", CacheConfig::backend());

    let otp_store: Arc<dyn Cache> = match CacheConfig::backend() {
        CacheBackend::Memory => layer.primary.clone(),
        CacheBackend::Redis => {
            let url = CacheConfig::data_url();
            info!("📡 OTP 저장소 연결 중: {}", redact_url(&url));
            Arc::new(RedisCache::connect(&url).await.map_err(io::Error::other)?)
        }
    };
    ServiceLocator::set(Arc::new(OtpRepository::with_ttl(otp_store, OtpConfig::ttl())));

    ServiceLocator::set(Arc::new(LogMailer));

    Ok(())
}

fn configure_cors(origins: &[String]) -> Cors {
    let cors = origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin));

    cors.allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
        ])
        .supports_credentials()
        .max_age(3600)
}
