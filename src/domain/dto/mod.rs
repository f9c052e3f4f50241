//! HTTP 요청/응답 DTO

pub mod users;

pub use users::*;
