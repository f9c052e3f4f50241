pub mod user_response;

pub use user_response::{ActivationResponse, LoginResponse, OAuthLoginUrlResponse, RegisterResponse, UserResponse};
