use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::MatchError;

/// 엑셀 1900 날짜 체계의 기준일 (시리얼 0 = 1899-12-30)
fn excel_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .map(|d| d.and_time(NaiveTime::MIN))
        .unwrap_or_default()
}

/// 1900-03-01 이전 구간의 윤년 버그 보정 경계 (시리얼 기준)
///
/// 시리얼 60은 존재하지 않는 1900-02-29를 가리키는 역사적 버그 구간이며,
/// [1, 60) 구간은 실제 달력보다 하루 밀려 있다. 양방향 변환에서 동일하게
/// 보정해야 왕복 변환이 성립한다.
const LEAP_BUG_WINDOW: std::ops::Range<f64> = 1.0..60.0;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// 엑셀 시리얼(정수부=날짜, 소수부=시각)을 datetime으로 변환
///
/// 범위 검증은 하지 않는다. 비정상 시리얼은 호출 측에서 비매칭으로 처리한다.
pub fn serial_to_datetime(serial: f64) -> NaiveDateTime {
    let adjusted = if LEAP_BUG_WINDOW.contains(&serial) {
        serial + 1.0
    } else {
        serial
    };
    excel_epoch() + Duration::milliseconds((adjusted * MILLIS_PER_DAY).round() as i64)
}

/// datetime을 엑셀 시리얼로 변환 (serial_to_datetime의 역함수)
///
/// 1900-01-01 ~ 1900-02-28 구간은 1을 빼서 버그 구간을 보정하고,
/// 소수부가 1e-9 이내면 정수로 수렴시킨다.
pub fn datetime_to_serial(dt: NaiveDateTime) -> f64 {
    let delta = dt - excel_epoch();
    let mut serial = delta.num_milliseconds() as f64 / MILLIS_PER_DAY;

    let window_start = NaiveDate::from_ymd_opt(1900, 1, 1)
        .map(|d| d.and_time(NaiveTime::MIN))
        .unwrap_or_default();
    let window_end = NaiveDate::from_ymd_opt(1900, 3, 1)
        .map(|d| d.and_time(NaiveTime::MIN))
        .unwrap_or_default();
    if dt >= window_start && dt < window_end {
        serial -= 1.0;
    }

    if (serial - serial.round()).abs() < 1e-9 {
        serial.round()
    } else {
        serial
    }
}

/// 시리얼을 사람이 읽는 문자열로 변환 (저장/표시용)
pub fn serial_to_display(serial: f64, with_time: bool) -> String {
    let dt = serial_to_datetime(serial);
    if with_time {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        dt.format("%Y-%m-%d").to_string()
    }
}

/// 영수증 승인시각 문자열 파싱
///
/// "YYYY-MM-DD HH:MM:SS" 우선, 실패 시 "YYYY-MM-DD"로 재시도.
/// 둘 다 실패하면 형식 오류 (매칭 실패와 구분되는 입력 검증 오류).
pub fn parse_receipt_timestamp(s: &str) -> Result<NaiveDateTime, MatchError> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(d.and_time(NaiveTime::MIN));
    }
    Err(MatchError::TimestampFormat(s.to_string()))
}
