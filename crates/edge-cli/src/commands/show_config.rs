//! 설정 출력 명령어.
//!
//! 기본값, 설정 파일, `EDGE__` 환경 변수를 병합한 최종 설정을 TOML로 출력합니다.
//!
//! ```bash
//! edge config
//! EDGE__SIMULATION__HOLDING_PERIOD=10 edge config --config config/default.toml
//! ```

use anyhow::{Context, Result};

use edge_core::AppConfig;

/// 설정을 TOML 문자열로 직렬화합니다.
pub fn render_config(config: &AppConfig) -> Result<String> {
    toml::to_string_pretty(config).context("설정 직렬화 실패")
}
