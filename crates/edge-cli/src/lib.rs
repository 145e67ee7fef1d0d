//! `edge` CLI 구현.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 종목 배치 백테스트 (진행률 표시, 결과 내보내기)
//! - 주문 의도의 모의 실행
//! - 단일 종목 지표 조회
//! - 유효 설정 출력

pub mod commands;
