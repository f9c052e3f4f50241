use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::domain::entities::users::user::User;

/// 사용자 응답 DTO
///
/// 비밀번호 해시를 포함하지 않으며, 프로필 캐시(`user:{username}`)에 저장되는 값이기도 합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub username: String,
    pub display_name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: bool,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let display_name = user.display_name();
        let User {
            id,
            email,
            username,
            first_name,
            last_name,
            is_active,
            roles,
            created_at,
            updated_at,
            ..
        } = user;

        Self {
            id: id.map(|id| id.to_hex()).unwrap_or_default(),
            email,
            username,
            display_name,
            first_name,
            last_name,
            is_active,
            roles,
            created_at: to_utc(created_at),
            updated_at: to_utc(updated_at),
        }
    }
}

fn to_utc(value: mongodb::bson::DateTime) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(value.timestamp_millis()).unwrap_or_default()
}

/// 회원 가입 응답
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: UserResponse,
}

/// 로그인 응답
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    /// 만료까지 남은 초
    pub expires_in: i64,
}

impl LoginResponse {
    pub fn bearer(token: String, expires_in: i64) -> Self {
        Self {
            token,
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }
}

/// Google 로그인 시작 응답
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthLoginUrlResponse {
    pub login_url: String,
    /// 콜백에서 그대로 돌려받아야 하는 값
    pub state: String,
}

/// 계정 활성화 응답
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivationResponse {
    pub message: String,
    pub user: UserResponse,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;

    #[test]
    fn test_user_response_hides_password_and_survives_json() {
        let mut user = User::new_local(
            "alice@example.com".to_string(),
            "alice".to_string(),
            Some("Alice".to_string()),
            None,
            "$2b$04$secret-hash".to_string(),
        );
        user.id = Some(ObjectId::new());

        let response = UserResponse::from(user.clone());
        let json = serde_json::to_string(&response).unwrap();

        assert!(!json.contains("secret-hash"));
        assert_eq!(response.id, user.id_string().unwrap());
        assert_eq!(response.display_name, "Alice");

        let decoded: UserResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, response);
    }
}
