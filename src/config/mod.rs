//! # Configuration Module
//!
//! 환경 변수 기반 설정을 정적 함수로 노출합니다. 값은 호출할 때마다 읽으므로
//! `.env` 파일은 `main`에서 가장 먼저 로드해야 합니다.
//!
//! - [`data_config`]: 실행 환경, 서버, CORS, 요청 제한, bcrypt
//! - [`auth_config`]: JWT, 활성화 코드
//! - [`cache_config`]: 캐시 백엔드와 TTL
//!
//! ```rust,ignore
//! use crate::config::{CacheConfig, JwtConfig};
//!
//! let ttl = CacheConfig::user_cache_ttl();
//! let secret = JwtConfig::secret();
//! ```

pub mod data_config;
pub mod auth_config;
pub mod cache_config;

pub use data_config::*;
pub use auth_config::*;
pub use cache_config::*;
