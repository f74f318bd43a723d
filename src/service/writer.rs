use indexmap::IndexMap;

use crate::error::{MatchError, MatcherResult};
use crate::models::{CellValue, CustomerInfo, LineItem, TimeKey};
use crate::table::{
    OrderTable, COL_ITEM_DESC, COL_ORDER_TIME, COL_RECIPIENT_ADDR, COL_RECIPIENT_MOBILE,
    COL_RECIPIENT_NAME, COL_RECIPIENT_PHONE, HEADER_OFFSET,
};

/// 매칭된 주문에 수하인 정보를 기록하는 서비스
///
/// 동일 주문시각을 공유하는 행들은 하나의 주문 블록으로 보고,
/// 각 블록의 첫 행에만 기록해 중복 입력을 막는다.
pub struct CustomerInfoWriter {
    delivery_keywords: Vec<String>,
}

impl CustomerInfoWriter {
    pub fn new(delivery_keywords: Vec<String>) -> Self {
        Self { delivery_keywords }
    }

    /// 주문시작시각 원시 값으로 행 인덱스 그룹핑
    ///
    /// 키는 시리얼(또는 네이티브 시각)의 안정 키, 그룹 내 인덱스는
    /// 테이블 순서 오름차순. 시각이 없는 행은 건너뛴다.
    pub fn group_by_timestamp<T: OrderTable>(
        &self,
        table: &T,
        indices: &[usize],
    ) -> MatcherResult<IndexMap<TimeKey, Vec<usize>>> {
        let time_col = table
            .column_index(COL_ORDER_TIME)
            .ok_or_else(|| MatchError::ColumnNotFound(COL_ORDER_TIME.to_string()))?;

        let mut groups: IndexMap<TimeKey, Vec<usize>> = IndexMap::new();
        for &index in indices {
            let cell = table.raw_cell(index + HEADER_OFFSET, time_col);
            let Some(key) = cell.time_key() else {
                continue;
            };
            groups.entry(key).or_default().push(index);
        }
        for group in groups.values_mut() {
            group.sort_unstable();
        }
        Ok(groups)
    }

    /// 각 주문 블록의 첫 행에 수하인 정보 기록
    ///
    /// 컬럼이 없거나 해당 필드가 비어 있으면 그 필드만 조용히 건너뛴다.
    /// 반환값은 실제로 기록된 블록 수.
    pub fn write<T: OrderTable>(
        &self,
        table: &mut T,
        indices: &[usize],
        customer: &CustomerInfo,
        items: &[LineItem],
    ) -> MatcherResult<usize> {
        let groups = self.group_by_timestamp(table, indices)?;

        let name_col = table.column_index(COL_RECIPIENT_NAME);
        let phone_col = table.column_index(COL_RECIPIENT_PHONE);
        let mobile_col = table.column_index(COL_RECIPIENT_MOBILE);
        let addr_col = table.column_index(COL_RECIPIENT_ADDR);
        let desc_col = table.column_index(COL_ITEM_DESC);

        let phone = customer.normalized_phone();
        let items_text = self.format_items_description(items);

        let mut updated = 0usize;
        for (_, group) in groups.iter() {
            let Some(&first) = group.first() else {
                continue;
            };
            let row = first + HEADER_OFFSET;

            if let Some(col) = name_col {
                if !customer.name.trim().is_empty() {
                    table.set_cell(row, col, CellValue::Text(customer.name.clone()));
                }
            }
            if let Some(col) = phone_col {
                if !phone.is_empty() {
                    table.set_cell(row, col, CellValue::Text(phone.clone()));
                }
            }
            // 전화 컬럼과 핸드폰 컬럼이 모두 있으면 양쪽에 기록
            if let Some(col) = mobile_col {
                if !phone.is_empty() {
                    table.set_cell(row, col, CellValue::Text(phone.clone()));
                }
            }
            if let Some(col) = addr_col {
                if !customer.address.trim().is_empty() {
                    table.set_cell(row, col, CellValue::Text(customer.address.clone()));
                }
            }
            if let Some(col) = desc_col {
                if !items_text.is_empty() {
                    table.set_cell(row, col, CellValue::Text(items_text.clone()));
                }
            }

            tracing::debug!("행 {}에 수하인 정보 기록", row);
            updated += 1;
        }

        Ok(updated)
    }

    /// 영수증 품목을 품목명 텍스트로 변환
    ///
    /// 배송 키워드가 붙은 품목만 대상으로,
    /// "총{합계}개) 품목1/품목2 2개" 형식을 만든다. 대상이 없으면 빈 문자열.
    pub fn format_items_description(&self, items: &[LineItem]) -> String {
        let delivery_items: Vec<&LineItem> = items
            .iter()
            .filter(|item| {
                let options = item.options.as_deref().unwrap_or("");
                self.delivery_keywords
                    .iter()
                    .any(|kw| options.contains(kw.as_str()))
            })
            .collect();

        if delivery_items.is_empty() {
            return String::new();
        }

        let total: i64 = delivery_items
            .iter()
            .map(|item| item.quantity.unwrap_or(1))
            .sum();

        let texts: Vec<String> = delivery_items
            .iter()
            .map(|item| {
                let quantity = item.quantity.unwrap_or(1);
                if quantity == 1 {
                    item.name().to_string()
                } else {
                    format!("{} {}개", item.name(), quantity)
                }
            })
            .collect();

        format!("총{total}개) {}", texts.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::SheetTable;

    fn writer() -> CustomerInfoWriter {
        CustomerInfoWriter::new(vec![
            "택배요청".to_string(),
            "채널추가무료배송".to_string(),
        ])
    }

    fn customer() -> CustomerInfo {
        CustomerInfo {
            name: "홍길동".to_string(),
            phone: "01012345678".to_string(),
            address: "서울시 강남구 테헤란로 123".to_string(),
        }
    }

    fn item(name: &str, quantity: Option<i64>, options: Option<&str>) -> LineItem {
        LineItem {
            name: Some(name.to_string()),
            quantity,
            options: options.map(str::to_string),
            ..LineItem::default()
        }
    }

    fn table(time_serials: &[f64]) -> SheetTable {
        let mut t = SheetTable::new(
            vec![
                "주문기준일자".to_string(),
                "주문시작시각".to_string(),
                "상품명".to_string(),
                "옵션".to_string(),
            ],
            time_serials
                .iter()
                .map(|&s| {
                    vec![
                        CellValue::Number(s.floor()),
                        CellValue::Number(s),
                        CellValue::Text("주이패턴이불".to_string()),
                        CellValue::Text("택배요청(0)".to_string()),
                    ]
                })
                .collect(),
        );
        t.ensure_delivery_columns();
        t
    }

    #[test]
    fn shared_timestamp_writes_single_block() {
        let mut t = table(&[45870.46841435185, 45870.46841435185]);
        let w = writer();

        let updated = w
            .write(
                &mut t,
                &[0, 1],
                &customer(),
                &[item("주이패턴이불", None, Some("택배요청(0)"))],
            )
            .unwrap();

        assert_eq!(updated, 1);
        let name_col = t.column_index("수하인명").unwrap();
        // 낮은 인덱스 행(물리 2행)에만 기록
        assert_eq!(t.raw_cell(2, name_col), CellValue::Text("홍길동".to_string()));
        assert_eq!(t.raw_cell(3, name_col), CellValue::Empty);
    }

    #[test]
    fn distinct_timestamps_write_each_block() {
        let mut t = table(&[45870.1, 45870.2]);
        let w = writer();
        let updated = w
            .write(
                &mut t,
                &[0, 1],
                &customer(),
                &[item("주이패턴이불", None, Some("택배요청(0)"))],
            )
            .unwrap();
        assert_eq!(updated, 2);
    }

    #[test]
    fn phone_written_to_both_phone_columns_normalized() {
        let mut t = table(&[45870.1]);
        let w = writer();
        w.write(
            &mut t,
            &[0],
            &customer(),
            &[item("주이패턴이불", None, Some("택배요청(0)"))],
        )
        .unwrap();

        let phone_col = t.column_index("수하인전화번호").unwrap();
        let mobile_col = t.column_index("수하인핸드폰번호").unwrap();
        let expected = CellValue::Text("010-1234-5678".to_string());
        assert_eq!(t.raw_cell(2, phone_col), expected);
        assert_eq!(t.raw_cell(2, mobile_col), expected);
    }

    #[test]
    fn rewrite_is_idempotent() {
        let mut t = table(&[45870.1]);
        let w = writer();
        let items = [item("주이패턴이불", Some(2), Some("택배요청(0)"))];

        w.write(&mut t, &[0], &customer(), &items).unwrap();
        let desc_col = t.column_index("품목명").unwrap();
        let first = t.raw_cell(2, desc_col);

        w.write(&mut t, &[0], &customer(), &items).unwrap();
        assert_eq!(t.raw_cell(2, desc_col), first);
    }

    #[test]
    fn non_delivery_items_leave_description_unwritten() {
        let mut t = table(&[45870.1]);
        let w = writer();
        w.write(
            &mut t,
            &[0],
            &customer(),
            &[item("주이패턴이불", None, Some("매장수령"))],
        )
        .unwrap();

        let desc_col = t.column_index("품목명").unwrap();
        assert_eq!(t.raw_cell(2, desc_col), CellValue::Empty);
    }

    #[test]
    fn description_format_single_and_multiple() {
        let w = writer();
        assert_eq!(
            w.format_items_description(&[item("주이패턴이불", Some(1), Some("택배요청"))]),
            "총1개) 주이패턴이불"
        );
        assert_eq!(
            w.format_items_description(&[
                item("주이패턴이불", Some(2), Some("택배요청")),
                item("베개커버", None, Some("채널추가무료배송")),
            ]),
            "총3개) 주이패턴이불 2개/베개커버"
        );
        assert_eq!(
            w.format_items_description(&[item("주이패턴이불", Some(3), Some("매장수령"))]),
            ""
        );
    }
}
