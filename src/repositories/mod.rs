//! 데이터 액세스 계층
//!
//! - [`users`]: MongoDB 사용자 컬렉션
//! - [`otp`]: Redis에 TTL과 함께 저장되는 계정 활성화 코드
//!
//! ```rust,ignore
//! use crate::repositories::users::UserRepository;
//!
//! let user_repo = UserRepository::instance();
//! let user = user_repo.find_by_email("user@example.com").await?;
//! ```

pub mod users;
pub mod otp;
