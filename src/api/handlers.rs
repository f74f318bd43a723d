use crate::config::AppConfig;
use crate::error::MatchError;
use crate::models::{CustomerInfo, MatchReport, ReceiptRecord};
use crate::service::MatcherService;
use crate::table::{OrderTable, SheetTable};
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

/// 공유 상태: 로드된 주문 테이블과 매칭 서비스
pub struct AppState {
    pub table: Mutex<Option<SheetTable>>,
    pub matcher: MatcherService,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            table: Mutex::new(None),
            matcher: MatcherService::new(config.matching.clone()),
            config,
        }
    }
}

/// 요청체: 테이블 파일 경로
#[derive(Debug, Deserialize)]
pub struct TablePathRequest {
    pub path: String,
}

/// 요청체: 영수증-수하인 세트 목록
#[derive(Debug, Deserialize)]
pub struct BatchMatchRequest {
    pub sets: Vec<MatchSet>,
}

#[derive(Debug, Deserialize)]
pub struct MatchSet {
    pub name: Option<String>,
    pub receipt: ReceiptRecord,
    pub customer: CustomerInfo,
}

/// 응답체
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
}

/// 배치 매칭 응답체 (세트별 결과 포함)
#[derive(Debug, Serialize)]
pub struct BatchMatchResponse {
    pub success: bool,
    pub message: String,
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub results: Vec<SetResult>,
}

#[derive(Debug, Serialize)]
pub struct SetResult {
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<MatchReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 헬스 체크
pub async fn health_check() -> &'static str {
    "OK"
}

/// 주문 테이블 로드 (CSV)
pub async fn load_table(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TablePathRequest>,
) -> Response {
    match SheetTable::from_csv_path(&req.path) {
        Ok(mut table) => {
            table.ensure_delivery_columns();
            let rows = table.data_row_count();
            *state.table.lock().await = Some(table);
            tracing::info!("테이블 로드 완료: {} ({}행)", req.path, rows);
            let response = ApiResponse {
                success: true,
                message: format!("테이블 로드 완료: {}행", rows),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            tracing::error!("테이블 로드 실패: {}", e);
            e.into_response()
        }
    }
}

/// 배치 매칭: 각 세트를 순차 처리하며 한 세트의 실패가 배치를 중단시키지 않는다
pub async fn batch_match(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchMatchRequest>,
) -> Response {
    let mut guard = state.table.lock().await;
    let table = match guard.as_mut() {
        Some(t) => t,
        None => return MatchError::TableNotLoaded.into_response(),
    };

    let mut results = Vec::with_capacity(req.sets.len());
    let mut succeeded = 0usize;
    let mut failed = 0usize;

    for set in &req.sets {
        match state.matcher.match_order(table, &set.receipt, &set.customer) {
            Ok(report) => {
                if report.outcome.is_matched() {
                    succeeded += 1;
                } else {
                    failed += 1;
                }
                results.push(SetResult {
                    name: set.name.clone(),
                    report: Some(report),
                    error: None,
                });
            }
            Err(e) => {
                tracing::error!("세트 처리 실패 ({:?}): {}", set.name, e);
                failed += 1;
                results.push(SetResult {
                    name: set.name.clone(),
                    report: None,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    let processed = results.len();
    let response = BatchMatchResponse {
        success: true,
        message: format!("배치 처리 완료: {}건 중 {}건 매칭", processed, succeeded),
        processed,
        succeeded,
        failed,
        results,
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// 갱신된 테이블을 CSV로 저장
pub async fn export_table(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TablePathRequest>,
) -> Response {
    let guard = state.table.lock().await;
    let table = match guard.as_ref() {
        Some(t) => t,
        None => return MatchError::TableNotLoaded.into_response(),
    };

    match table.to_csv_path(&req.path) {
        Ok(()) => {
            tracing::info!("테이블 저장 완료: {}", req.path);
            let response = ApiResponse {
                success: true,
                message: format!("테이블 저장 완료: {}", req.path),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            tracing::error!("테이블 저장 실패: {}", e);
            e.into_response()
        }
    }
}
