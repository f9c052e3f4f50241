pub mod cache_service;

pub use cache_service::CacheService;
