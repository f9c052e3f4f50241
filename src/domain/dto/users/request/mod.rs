pub mod register_request;
pub mod auth_request;

pub use register_request::RegisterRequest;
pub use auth_request::{ActivationRequest, GoogleCallbackQuery, LoginRequest};
