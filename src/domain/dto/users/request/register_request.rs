use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// 회원 가입 요청
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "유효한 이메일 주소를 입력해주세요"))]
    pub email: String,

    #[validate(length(
        min = 3,
        max = 30,
        message = "사용자명은 3-30자 사이여야 합니다"
    ))]
    #[validate(custom(function = "validate_username"))]
    pub username: String,

    #[validate(length(min = 6, message = "비밀번호는 최소 6자 이상이어야 합니다"))]
    pub password: String,

    #[serde(default)]
    #[validate(length(max = 50, message = "이름은 50자 이하여야 합니다"))]
    pub first_name: Option<String>,

    #[serde(default)]
    #[validate(length(max = 50, message = "성은 50자 이하여야 합니다"))]
    pub last_name: Option<String>,
}

/// 사용자명은 캐시 키(`user:{username}`)에 그대로 들어가므로 글롭 문자를 허용하지 않습니다.
fn validate_username(username: &str) -> Result<(), ValidationError> {
    if !username.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(ValidationError::new("invalid_username")
            .with_message("사용자명은 알파벳, 숫자, 언더스코어만 사용 가능합니다".into()));
    }
    Ok(())
}
