//! User Entity Implementation
//!
//! MongoDB `users` 컬렉션에 저장되는 사용자 문서입니다.
//! 가입 직후에는 비활성 상태이며, 활성화 코드를 확인한 뒤에만 로그인할 수 있습니다.

use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// 가입 시 부여되는 기본 역할
pub const DEFAULT_ROLE: &str = "user";

/// 사용자 엔티티
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// 사용자 이메일 (unique)
    pub email: String,
    /// 로그인 이름 (unique)
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// bcrypt 해시. Google 로그인으로 만든 계정은 빈 문자열입니다.
    #[serde(default)]
    pub password_hash: String,
    /// 계정 활성화 여부
    pub is_active: bool,
    pub roles: Vec<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl User {
    /// 비활성 상태의 새 로컬 사용자를 만듭니다.
    pub fn new_local(
        email: String,
        username: String,
        first_name: Option<String>,
        last_name: Option<String>,
        password_hash: String,
    ) -> Self {
        let now = DateTime::now();

        Self {
            id: None,
            email,
            username,
            first_name,
            last_name,
            password_hash,
            is_active: false,
            roles: vec![DEFAULT_ROLE.to_string()],
            created_at: now,
            updated_at: now,
        }
    }

    /// Google 로그인으로 만든 활성 사용자. 사용자명은 이메일입니다.
    pub fn new_oauth(email: String, first_name: Option<String>, last_name: Option<String>) -> Self {
        let mut user = Self::new_local(email.clone(), email, first_name, last_name, String::new());
        user.is_active = true;
        user
    }

    /// 비밀번호 로그인이 가능한 계정인지
    pub fn has_password(&self) -> bool {
        !self.password_hash.is_empty()
    }

    /// ObjectId를 16진수 문자열로 반환합니다.
    pub fn id_string(&self) -> Option<String> {
        self.id.as_ref().map(|id| id.to_hex())
    }

    /// 이름이 있으면 "이름 성", 없으면 사용자명
    pub fn display_name(&self) -> String {
        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if full.is_empty() { self.username.clone() } else { full }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}
