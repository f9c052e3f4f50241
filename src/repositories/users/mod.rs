//! 사용자 리포지토리
//!
//! ```rust,ignore
//! use crate::repositories::users::{UserRepository, UserStore};
//!
//! let users = UserRepository::instance();
//! let alice = users.find_by_username("alice").await?;
//! ```

pub mod user_repo;

pub use user_repo::{UserRepository, UserStore};
