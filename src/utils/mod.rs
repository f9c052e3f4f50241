//! 공통 유틸리티
//!
//! - [`otp`]: 활성화 코드 생성
//! - [`display_terminal`]: 부팅 과정 터미널 출력

pub mod otp;
pub mod display_terminal;
