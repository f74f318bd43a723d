use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::table::temporal::{parse_receipt_timestamp, serial_to_datetime};

/// 테이블 셀 원시 값
///
/// 로드 경로에 따라 같은 칸이 숫자(시리얼), 날짜 객체, 문자열로 나타날 수
/// 있으므로 테이블 경계에서 한 번만 태그 변형으로 정규화한다. 이후의 매칭
/// 로직은 타입 분기를 하지 않는다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    DateTime(NaiveDateTime),
    Text(String),
    Empty,
}

impl CellValue {
    /// 값이 비어 있는지 (NaN 가드용)
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(n) => n.is_nan(),
            CellValue::DateTime(_) => false,
        }
    }

    /// 날짜/시각 해석
    ///
    /// 네이티브 날짜 객체는 그대로, 숫자는 엑셀 시리얼로 해석한다.
    /// 문자열은 숫자 시리얼 우선, 그다음 "YYYY-MM-DD[ HH:MM:SS]" 파싱을
    /// 시도한다. 해석 불가 시 None (해당 행만 비매칭 처리).
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::DateTime(dt) => Some(*dt),
            CellValue::Number(n) if !n.is_nan() => Some(serial_to_datetime(*n)),
            CellValue::Text(s) => {
                let trimmed = s.trim();
                if let Ok(n) = trimmed.parse::<f64>() {
                    return Some(serial_to_datetime(n));
                }
                parse_receipt_timestamp(trimmed).ok()
            }
            _ => None,
        }
    }

    /// 문자열 표현 (옵션 텍스트, 상품명 등 텍스트 소비처용)
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            CellValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            CellValue::Empty => String::new(),
        }
    }

    /// 주문시각 그룹핑 키
    ///
    /// 시리얼 숫자는 비트 패턴으로, 네이티브 시각은 밀리초 타임스탬프로
    /// 안정적인 키를 만든다. 해석 불가 값은 그룹에서 제외.
    pub fn time_key(&self) -> Option<TimeKey> {
        match self {
            CellValue::Number(n) if !n.is_nan() => Some(TimeKey::Serial(n.to_bits())),
            CellValue::DateTime(dt) => Some(TimeKey::Stamp(dt.and_utc().timestamp_millis())),
            CellValue::Text(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .map(|n| TimeKey::Serial(n.to_bits())),
            _ => None,
        }
    }
}

/// 동일 주문 블록 판정용 시각 키
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeKey {
    Serial(u64),
    Stamp(i64),
}

/// 배송 대상 후보 행 (원본 테이블의 읽기 전용 뷰)
///
/// `index`는 0 기준 데이터 행 오프셋으로, 실제 기록 위치는
/// `index + HEADER_OFFSET`이다.
#[derive(Debug, Clone, Serialize)]
pub struct OrderRow {
    pub index: usize,
    pub order_date: CellValue,
    pub order_time: CellValue,
    pub product_name: CellValue,
    pub option_text: String,
}
