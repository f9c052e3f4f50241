pub mod google_user;

pub use google_user::{GoogleTokenResponse, GoogleUserInfo, OAuthStateClaims};
