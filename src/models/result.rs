use serde::Serialize;

use super::order::CellValue;

/// 캐스케이드에서 행이 도달한 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeStage {
    MissingData,
    Date,
    Time,
    Product,
    Accepted,
}

/// 행 단위 판정 기록 (진단 출력의 필수 구성 요소)
#[derive(Debug, Clone, Serialize)]
pub struct RowTrace {
    pub index: usize,
    pub order_product: String,
    pub stage: CascadeStage,
    pub date_match: bool,
    pub time_match: bool,
    pub product_match: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_similarity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_diff_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// 진단에 포함되는 영수증 요약
#[derive(Debug, Clone, Serialize)]
pub struct ReceiptSummary {
    pub datetime: String,
    pub product: String,
}

/// 매칭 1회 시도의 전체 진단 정보
#[derive(Debug, Clone, Default, Serialize)]
pub struct MatchDiagnostics {
    pub total_rows: usize,
    pub checked_rows: usize,
    pub date_pass: usize,
    pub time_pass: usize,
    pub product_pass: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<ReceiptSummary>,
    pub attempts: Vec<RowTrace>,
}

/// 세 단계를 모두 통과한 후보 행
#[derive(Debug, Clone, Serialize)]
pub struct MatchCandidate {
    pub index: usize,
    pub score: f64,
    pub product_similarity: f64,
    pub order_date: CellValue,
    pub order_time: CellValue,
    pub product_name: String,
    pub option_text: String,
}

/// 매칭 결과 합 타입
///
/// 일반적인 비매칭은 값으로 반환하고, 타입 오류는 시스템 장애
/// (`MatchError`)에만 예약한다.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MatchOutcome {
    Matched { candidates: Vec<MatchCandidate> },
    NoMatch,
    Invalid { reason: String },
}

impl MatchOutcome {
    pub fn is_matched(&self) -> bool {
        matches!(self, MatchOutcome::Matched { .. })
    }

    pub fn best(&self) -> Option<&MatchCandidate> {
        match self {
            MatchOutcome::Matched { candidates } => candidates.first(),
            _ => None,
        }
    }
}

/// 영수증 1건 처리 보고
#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    #[serde(flatten)]
    pub outcome: MatchOutcome,
    pub message: String,
    pub updated_blocks: usize,
    /// 다중 매칭 시 후보 수 알림 (수동 확인이 아닌 참고용)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_candidates: Option<usize>,
    pub diagnostics: MatchDiagnostics,
}
