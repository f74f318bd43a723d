use axum::{
    routing::{get, post},
    Router,
};
use receipt_matcher_rust::table::OrderTable;
use receipt_matcher_rust::{api, AppConfig, SheetTable};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 로그 초기화 - 로컬 시간 형식 사용
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 설정 로드
    let config = AppConfig::from_env();
    info!("Starting server with config: {:?}", config);

    let state = Arc::new(api::AppState::new(config.clone()));

    // 설정에 테이블 경로가 있으면 기동 시 자동 로드
    if let Some(path) = &config.table.path {
        let mut table = SheetTable::from_csv_path(path)?;
        table.ensure_delivery_columns();
        info!("테이블 로드 완료: {} ({}행)", path, table.data_row_count());
        *state.table.lock().await = Some(table);
    }

    // 라우트 구성
    let app = Router::new()
        .route("/health", get(api::health_check))
        .route("/api/table/load", post(api::load_table))
        .route("/api/match/batch", post(api::batch_match))
        .route("/api/table/export", post(api::export_table))
        .with_state(state)
        .layer(ServiceBuilder::new());

    // 서버 기동
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /api/table/load    - 주문 테이블 로드");
    info!("  POST /api/match/batch   - 영수증 배치 매칭");
    info!("  POST /api/table/export  - 갱신 테이블 저장");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
