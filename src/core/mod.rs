//! # Core Module
//!
//! 애플리케이션 부팅과 의존성 배선을 담당합니다.
//!
//! - [`registry`]: 타입별 싱글톤 컨테이너 ([`registry::ServiceLocator`])
//!
//! 에러 타입은 [`crate::errors`]에 있습니다.
//!
//! ## 초기화 순서
//!
//! ```rust,ignore
//! let database = Database::new().await?;
//! ServiceLocator::set(Arc::new(database));
//!
//! CacheLayer::initialize().await?;
//! ServiceLocator::initialize_all();
//! ```

pub mod registry;

pub use registry::*;
