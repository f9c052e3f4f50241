/// 인증 모드
#[derive(Debug, Clone, PartialEq)]
pub enum AuthMode {
    /// 유효한 토큰이 없으면 401
    Required,
    /// 토큰이 있으면 검증하고, 없어도 통과
    Optional,
}

/// 경로 접근에 필요한 역할
#[derive(Debug, Clone)]
pub enum RequiredRole {
    Single(String),
    /// 하나라도 있으면 허용
    Any(Vec<String>),
}

impl RequiredRole {
    pub fn is_satisfied(&self, user_roles: &[String]) -> bool {
        match self {
            RequiredRole::Single(required_role) => user_roles.contains(required_role),
            RequiredRole::Any(required_roles) => {
                required_roles.iter().any(|role| user_roles.contains(role))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_role() {
        let roles = vec!["user".to_string()];

        assert!(RequiredRole::Single("user".to_string()).is_satisfied(&roles));
        assert!(!RequiredRole::Single("admin".to_string()).is_satisfied(&roles));
        assert!(RequiredRole::Any(vec!["admin".to_string(), "user".to_string()]).is_satisfied(&roles));
        assert!(!RequiredRole::Any(vec![]).is_satisfied(&roles));
    }
}
