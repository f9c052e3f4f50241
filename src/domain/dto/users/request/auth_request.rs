use serde::Deserialize;
use validator::{Validate, ValidationError};
use crate::config::OtpConfig;

/// 로그인 요청
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "사용자명을 입력해주세요"))]
    pub username: String,

    #[validate(length(min = 1, message = "비밀번호를 입력해주세요"))]
    pub password: String,
}

/// 계정 활성화 요청
#[derive(Debug, Deserialize, Validate)]
pub struct ActivationRequest {
    #[validate(length(min = 1, message = "사용자 ID가 필요합니다"))]
    pub user_id: String,

    #[validate(custom(function = "validate_activation_code"))]
    pub activation_code: String,
}

/// Google OAuth 콜백 쿼리 (`?code=...&state=...` 또는 `?error=...`)
#[derive(Debug, Deserialize)]
pub struct GoogleCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

fn validate_activation_code(code: &str) -> Result<(), ValidationError> {
    if code.len() != OtpConfig::DIGITS || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::new("invalid_activation_code")
            .with_message(format!("활성화 코드는 {}자리 숫자여야 합니다", OtpConfig::DIGITS).into()));
    }
    Ok(())
}
