//! 계정 활성화 코드 생성

use rand::Rng;
use crate::config::OtpConfig;

/// `OtpConfig::DIGITS`자리 10진수 코드를 생성합니다. 앞자리 0도 유지됩니다.
pub fn generate_otp() -> String {
    let mut rng = rand::rng();
    (0..OtpConfig::DIGITS)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}
