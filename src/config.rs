use serde::{Deserialize, Serialize};

/// 애플리케이션 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub table: TableConfig,
    pub matching: MatchingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// 주문 테이블 소스 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    /// 기동 시 자동 로드할 CSV 경로 (없으면 /api/table/load로 로드)
    pub path: Option<String>,
}

/// 매칭 엔진 튜닝 상수
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// 시간 단계 허용 오차 (초, 경계 포함)
    pub time_tolerance_secs: f64,
    /// 상품명 유사도 임계값
    pub similarity_threshold: f64,
    /// 배송 대상 판별 키워드 (옵션 텍스트 부분 일치)
    pub delivery_keywords: Vec<String>,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            time_tolerance_secs: 10.0,
            similarity_threshold: 0.75,
            delivery_keywords: vec!["택배요청".to_string(), "채널추가무료배송".to_string()],
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            table: TableConfig { path: None },
            matching: MatchingConfig::default(),
        }
    }
}

impl AppConfig {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> Self {
        let defaults = MatchingConfig::default();
        Self {
            server: ServerConfig {
                host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: std::env::var("SERVER_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8080),
            },
            table: TableConfig {
                path: std::env::var("TABLE_PATH").ok(),
            },
            matching: MatchingConfig {
                time_tolerance_secs: std::env::var("TIME_TOLERANCE_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.time_tolerance_secs),
                similarity_threshold: std::env::var("SIMILARITY_THRESHOLD")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.similarity_threshold),
                delivery_keywords: std::env::var("DELIVERY_KEYWORDS")
                    .ok()
                    .map(|v| {
                        v.split(',')
                            .map(|k| k.trim().to_string())
                            .filter(|k| !k.is_empty())
                            .collect()
                    })
                    .unwrap_or(defaults.delivery_keywords),
            },
        }
    }
}
