use std::path::Path;

use crate::error::MatcherResult;
use crate::models::CellValue;

use super::temporal::serial_to_display;
use super::{OrderTable, COL_ORDER_DATE, COL_ORDER_TIME, DELIVERY_COLUMNS, HEADER_OFFSET, HEADER_ROW};

/// 메모리 상의 주문 테이블
///
/// CSV 내보내기를 로드해 셀 타입을 한 번만 추론하고, 이후에는
/// `CellValue`만 오간다. 날짜 컬럼은 원본 그대로 시리얼 숫자로 유지된다.
#[derive(Debug, Clone)]
pub struct SheetTable {
    headers: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl SheetTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self { headers, rows }
    }

    /// CSV 파일 로드 (1행 = 헤더)
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> MatcherResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(Self::infer_cell).collect());
        }

        tracing::info!("주문 테이블 로드 완료: {}행 {}컬럼", rows.len(), headers.len());
        Ok(Self { headers, rows })
    }

    /// 결과 저장 (날짜 컬럼은 사람이 읽는 문자열로 변환)
    pub fn to_csv_path<P: AsRef<Path>>(&self, path: P) -> MatcherResult<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&self.headers)?;

        let date_col = self.column_index(COL_ORDER_DATE);
        let time_col = self.column_index(COL_ORDER_TIME);

        for row in &self.rows {
            let mut record: Vec<String> = Vec::with_capacity(self.headers.len());
            for col in 1..=self.headers.len() {
                let value = row.get(col - 1).cloned().unwrap_or(CellValue::Empty);
                let text = match &value {
                    CellValue::Number(n) if Some(col) == date_col => serial_to_display(*n, false),
                    CellValue::Number(n) if Some(col) == time_col => serial_to_display(*n, true),
                    other => other.as_text(),
                };
                record.push(text);
            }
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// 기록에 필요한 배송 정보 컬럼이 없으면 끝에 추가
    pub fn ensure_delivery_columns(&mut self) {
        for name in DELIVERY_COLUMNS {
            if self.column_index(name).is_none() {
                self.headers.push(name.to_string());
            }
        }
    }

    /// 문자열 셀에서 원시 타입 추론 (빈 값 → Empty, 숫자 → Number)
    fn infer_cell(raw: &str) -> CellValue {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return CellValue::Empty;
        }
        if let Ok(n) = trimmed.parse::<f64>() {
            return CellValue::Number(n);
        }
        CellValue::Text(trimmed.to_string())
    }
}

impl OrderTable for SheetTable {
    fn headers(&self) -> &[String] {
        &self.headers
    }

    fn data_row_count(&self) -> usize {
        self.rows.len()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name).map(|i| i + 1)
    }

    fn column_containing(&self, fragment: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.contains(fragment))
            .map(|i| i + 1)
    }

    fn raw_cell(&self, row: usize, col: usize) -> CellValue {
        if row == HEADER_ROW {
            return self
                .headers
                .get(col - 1)
                .map(|h| CellValue::Text(h.clone()))
                .unwrap_or(CellValue::Empty);
        }
        self.rows
            .get(row - HEADER_OFFSET)
            .and_then(|r| r.get(col - 1))
            .cloned()
            .unwrap_or(CellValue::Empty)
    }

    fn set_cell(&mut self, row: usize, col: usize, value: CellValue) {
        if row < HEADER_OFFSET || col == 0 {
            return;
        }
        let Some(data_row) = self.rows.get_mut(row - HEADER_OFFSET) else {
            return;
        };
        if data_row.len() < col {
            data_row.resize(col, CellValue::Empty);
        }
        data_row[col - 1] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SheetTable {
        SheetTable::new(
            vec![
                "주문기준일자".to_string(),
                "주문시작시각".to_string(),
                "상품명".to_string(),
                "옵션".to_string(),
            ],
            vec![
                vec![
                    CellValue::Number(45870.0),
                    CellValue::Number(45870.46841435185),
                    CellValue::Text("주이패턴이불".to_string()),
                    CellValue::Text("택배요청(0)".to_string()),
                ],
                vec![
                    CellValue::Number(45871.0),
                    CellValue::Number(45871.5),
                    CellValue::Text("베개커버".to_string()),
                    CellValue::Empty,
                ],
            ],
        )
    }

    #[test]
    fn physical_coordinates_are_one_based_with_header_row() {
        let t = sample();
        assert_eq!(
            t.raw_cell(1, 3),
            CellValue::Text("상품명".to_string())
        );
        assert_eq!(t.raw_cell(2, 1), CellValue::Number(45870.0));
        assert_eq!(t.raw_cell(3, 4), CellValue::Empty);
        assert_eq!(t.raw_cell(99, 1), CellValue::Empty);
    }

    #[test]
    fn column_lookup_exact_and_containing() {
        let t = sample();
        assert_eq!(t.column_index("상품명"), Some(3));
        assert_eq!(t.column_index("없는컬럼"), None);
        assert_eq!(t.column_containing("옵션"), Some(4));
    }

    #[test]
    fn set_cell_expands_short_rows() {
        let mut t = sample();
        t.ensure_delivery_columns();
        let col = t.column_index("수하인명").unwrap();
        t.set_cell(2, col, CellValue::Text("홍길동".to_string()));
        assert_eq!(t.raw_cell(2, col), CellValue::Text("홍길동".to_string()));
    }

    #[test]
    fn infer_cell_types() {
        assert_eq!(SheetTable::infer_cell(""), CellValue::Empty);
        assert_eq!(SheetTable::infer_cell("45870.5"), CellValue::Number(45870.5));
        assert_eq!(
            SheetTable::infer_cell("택배요청"),
            CellValue::Text("택배요청".to_string())
        );
    }

    #[test]
    fn csv_round_trip_renders_serial_dates() {
        let t = sample();
        let dir = std::env::temp_dir().join("receipt_matcher_sheet_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("out.csv");
        t.to_csv_path(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("2025-08-01,2025-08-01 11:14:31"));
    }
}
