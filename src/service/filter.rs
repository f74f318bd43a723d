use serde::{Deserialize, Serialize};

use crate::error::{MatchError, MatcherResult};
use crate::models::OrderRow;
use crate::table::{
    OrderTable, COL_ORDER_DATE, COL_ORDER_TIME, COL_PRODUCT_NAME, HEADER_OFFSET,
    OPTION_HEADER_HINT,
};

/// 키워드 결합 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// 키워드 중 하나라도 포함
    Any,
    /// 모든 키워드 포함
    All,
}

/// 옵션 컬럼 탐색 (헤더명에 "옵션" 포함)
pub fn find_option_column<T: OrderTable>(table: &T) -> MatcherResult<usize> {
    table
        .column_containing(OPTION_HEADER_HINT)
        .ok_or_else(|| MatchError::ColumnNotFound(OPTION_HEADER_HINT.to_string()))
}

/// 배송 대상 행만 추려 원시 값 뷰로 반환
///
/// 옵션 텍스트에 키워드가 부분 일치(대소문자 구분)하는 행만 남긴다.
/// 빈 옵션 셀은 빈 문자열로 취급하며 절대 매칭되지 않는다.
/// 날짜/시각/상품명 컬럼이 스키마에 없으면 시스템 오류.
pub fn filter_delivery_rows<T: OrderTable>(
    table: &T,
    keywords: &[String],
    mode: FilterMode,
) -> MatcherResult<Vec<OrderRow>> {
    let option_col = find_option_column(table)?;
    let date_col = table
        .column_index(COL_ORDER_DATE)
        .ok_or_else(|| MatchError::ColumnNotFound(COL_ORDER_DATE.to_string()))?;
    let time_col = table
        .column_index(COL_ORDER_TIME)
        .ok_or_else(|| MatchError::ColumnNotFound(COL_ORDER_TIME.to_string()))?;
    let product_col = table
        .column_index(COL_PRODUCT_NAME)
        .ok_or_else(|| MatchError::ColumnNotFound(COL_PRODUCT_NAME.to_string()))?;

    let mut rows = Vec::new();
    for index in 0..table.data_row_count() {
        let physical = index + HEADER_OFFSET;
        let option_text = table.raw_cell(physical, option_col).as_text();

        let keep = match mode {
            FilterMode::Any => keywords.iter().any(|kw| option_text.contains(kw.as_str())),
            FilterMode::All => {
                !keywords.is_empty()
                    && keywords.iter().all(|kw| option_text.contains(kw.as_str()))
            }
        };
        if !keep {
            continue;
        }

        rows.push(OrderRow {
            index,
            order_date: table.raw_cell(physical, date_col),
            order_time: table.raw_cell(physical, time_col),
            product_name: table.raw_cell(physical, product_col),
            option_text,
        });
    }

    tracing::debug!("배송 대상 필터링: {} / {}행", rows.len(), table.data_row_count());
    Ok(rows)
}
