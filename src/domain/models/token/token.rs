use serde::{Deserialize, Serialize};

/// 액세스 토큰 클레임
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// 사용자 ObjectId (hex)
    pub sub: String,
    pub username: String,
    pub roles: Vec<String>,
    /// 발급 시각 (Unix seconds)
    pub iat: i64,
    /// 만료 시각 (Unix seconds)
    pub exp: i64,
}
