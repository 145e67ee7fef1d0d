//! CLI 명령어 구현 모듈.

pub mod backtest;
pub mod indicators;
pub mod show_config;

// 각 서브모듈 직접 사용 권장 (ambiguous re-export 방지)
