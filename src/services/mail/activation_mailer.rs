//! 활성화 코드 메일 발송
//!
//! 실제 SMTP 연동은 이 크레이트 밖의 관심사입니다. [`ActivationMailer`]를
//! 구현한 타입을 `ServiceLocator`에 넣으면 가입 흐름이 그것을 사용합니다.
//! 기본 구현인 [`LogMailer`]는 메시지를 로그로만 남깁니다.

use std::time::Duration;
use async_trait::async_trait;
use crate::errors::errors::AppError;

/// 발송할 메일 한 통
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl ActivationMessage {
    pub fn new(to: &str, username: &str, code: &str, ttl: Duration) -> Self {
        Self {
            to: to.to_string(),
            subject: "계정 활성화 코드".to_string(),
            body: format!(
                "{}님, 계정 활성화 코드는 {} 입니다. 이 코드는 {}분 동안 유효합니다.",
                username,
                code,
                ttl.as_secs().div_ceil(60)
            ),
        }
    }

    /// 본문을 뺀 요약. 코드가 들어가지 않으므로 info 레벨에 남겨도 됩니다.
    pub fn summary(&self) -> String {
        format!("[{}] to: {}", self.subject, self.to)
    }
}

#[async_trait]
pub trait ActivationMailer: Send + Sync {
    async fn send(&self, message: &ActivationMessage) -> Result<(), AppError>;
}

/// 메일 대신 로그를 남기는 발송기
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl ActivationMailer for LogMailer {
    async fn send(&self, message: &ActivationMessage) -> Result<(), AppError> {
        log::info!("📧 {}", message.summary());
        log::debug!("📧 본문: {}", message.body);
        Ok(())
    }
}
