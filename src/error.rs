use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// 매칭 시스템 오류 타입
///
/// 입력 검증 실패(영수증/고객 정보/시각 형식)와 시스템 오류(테이블 미로드,
/// 필수 컬럼 누락, 입출력)를 구분한다. 일반적인 "매칭 없음"은 오류가 아니라
/// `MatchOutcome::NoMatch`로 표현된다.
#[derive(Error, Debug)]
pub enum MatchError {
    #[error("영수증 시각 형식이 올바르지 않습니다: {0}")]
    TimestampFormat(String),

    #[error("영수증 데이터가 유효하지 않습니다: {0}")]
    InvalidReceipt(String),

    #[error("고객 정보가 유효하지 않습니다: {0}")]
    InvalidCustomer(String),

    #[error("'{0}' 컬럼을 찾을 수 없습니다")]
    ColumnNotFound(String),

    #[error("주문 테이블이 로드되지 않았습니다")]
    TableNotLoaded,

    #[error("테이블 입출력 오류: {0}")]
    TableIo(#[from] csv::Error),

    #[error("IO 오류: {0}")]
    Io(#[from] std::io::Error),
}

pub type MatcherResult<T> = Result<T, MatchError>;

impl MatchError {
    /// 입력 검증 오류 여부 (배치 내 개별 건으로 격리 가능한 오류)
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            MatchError::TimestampFormat(_)
                | MatchError::InvalidReceipt(_)
                | MatchError::InvalidCustomer(_)
        )
    }
}

impl IntoResponse for MatchError {
    fn into_response(self) -> Response {
        let status = match &self {
            MatchError::TimestampFormat(_)
            | MatchError::InvalidReceipt(_)
            | MatchError::InvalidCustomer(_) => StatusCode::BAD_REQUEST,
            MatchError::TableNotLoaded => StatusCode::CONFLICT,
            MatchError::ColumnNotFound(_) => StatusCode::UNPROCESSABLE_ENTITY,
            MatchError::TableIo(_) | MatchError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(json!({
            "success": false,
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}
