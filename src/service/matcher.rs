use chrono::NaiveDateTime;

use crate::config::MatchingConfig;
use crate::error::{MatchError, MatcherResult};
use crate::models::{
    CascadeStage, CellValue, CustomerInfo, MatchCandidate, MatchDiagnostics, MatchOutcome,
    MatchReport, OrderRow, ReceiptRecord, ReceiptSummary, RowTrace,
};
use crate::table::OrderTable;

use super::filter::{filter_delivery_rows, FilterMode};
use super::similarity::is_match_with;
use super::writer::CustomerInfoWriter;

// 종합 점수 가중치 (날짜 + 시간 + 상품유사도 = 1.0)
const DATE_WEIGHT: f64 = 0.3;
const TIME_WEIGHT: f64 = 0.3;
const PRODUCT_WEIGHT: f64 = 0.4;

/// 매칭 서비스
///
/// 영수증 1건을 후보 행들에 대해 3단계 캐스케이드(날짜 → 시간 → 상품명)로
/// 검사하고, 통과 행에 수하인 정보를 기록한다. 호출 사이에 상태를 갖지
/// 않으며 테이블은 주입받은 참조로만 접근한다.
pub struct MatcherService {
    config: MatchingConfig,
    writer: CustomerInfoWriter,
}

impl MatcherService {
    pub fn new(config: MatchingConfig) -> Self {
        let writer = CustomerInfoWriter::new(config.delivery_keywords.clone());
        Self { config, writer }
    }

    /// 영수증-주문 매칭 및 수하인 정보 기록의 전체 흐름
    ///
    /// 입력 검증 실패는 `Invalid` 결과로, 비매칭은 `NoMatch`로 돌려주고
    /// 시스템 장애(필수 컬럼 누락 등)만 오류로 전파한다.
    pub fn match_order<T: OrderTable>(
        &self,
        table: &mut T,
        receipt: &ReceiptRecord,
        customer: &CustomerInfo,
    ) -> MatcherResult<MatchReport> {
        // 1. 입력 검증
        let receipt_dt = match receipt.validate() {
            Ok(dt) => dt,
            Err(e) if e.is_validation() => return Ok(Self::invalid_report(e)),
            Err(e) => return Err(e),
        };
        if let Err(e) = customer.validate() {
            if e.is_validation() {
                return Ok(Self::invalid_report(e));
            }
            return Err(e);
        }

        // 2. 배송 대상 행 필터링
        let rows = filter_delivery_rows(table, &self.config.delivery_keywords, FilterMode::Any)?;
        if rows.is_empty() {
            tracing::info!("배송 대상 주문 없음");
            return Ok(MatchReport {
                outcome: MatchOutcome::NoMatch,
                message: "택배 배송 대상 주문이 없습니다".to_string(),
                updated_blocks: 0,
                multiple_candidates: None,
                diagnostics: MatchDiagnostics::default(),
            });
        }

        // 3. 캐스케이드 검색
        let (candidates, diagnostics) =
            self.find_matching_orders(receipt_dt, receipt.first_item_name(), &rows);

        // 4. 결과 분기
        if candidates.is_empty() {
            tracing::info!(
                "매칭 실패: 검사 {}행 (날짜 {}, 시간 {}, 상품 {})",
                diagnostics.checked_rows,
                diagnostics.date_pass,
                diagnostics.time_pass,
                diagnostics.product_pass
            );
            return Ok(MatchReport {
                outcome: MatchOutcome::NoMatch,
                message: "매칭되는 주문을 찾지 못했습니다".to_string(),
                updated_blocks: 0,
                multiple_candidates: None,
                diagnostics,
            });
        }

        // 다중 매칭은 최고 점수 후보에 자동 기록하고 후보 수만 알린다
        let candidate_count = candidates.len();
        let best_index = candidates[0].index;
        let updated = self
            .writer
            .write(table, &[best_index], customer, &receipt.items)?;

        let message = if candidate_count == 1 {
            "주문 매칭 및 수하인 정보 입력 완료".to_string()
        } else {
            format!("다중 매칭({candidate_count}건) 중 최고 점수 주문에 입력 완료")
        };
        tracing::info!(
            "매칭 성공: 행 {} (점수 {:.3}), 기록 블록 {}",
            best_index,
            candidates[0].score,
            updated
        );

        Ok(MatchReport {
            outcome: MatchOutcome::Matched { candidates },
            message,
            updated_blocks: updated,
            multiple_candidates: (candidate_count > 1).then_some(candidate_count),
            diagnostics,
        })
    }

    /// 3단계 캐스케이드 검색
    ///
    /// 모든 행에 대해 도달 단계와 탈락 사유를 기록하고, 통과 행은
    /// 종합 점수 내림차순(동점은 원래 행 순서 유지)으로 정렬해 반환한다.
    pub fn find_matching_orders(
        &self,
        receipt_dt: NaiveDateTime,
        receipt_product: &str,
        rows: &[OrderRow],
    ) -> (Vec<MatchCandidate>, MatchDiagnostics) {
        let mut diagnostics = MatchDiagnostics {
            total_rows: rows.len(),
            receipt: Some(ReceiptSummary {
                datetime: receipt_dt.format("%Y-%m-%d %H:%M:%S").to_string(),
                product: receipt_product.to_string(),
            }),
            ..MatchDiagnostics::default()
        };
        let mut candidates = Vec::new();

        for row in rows {
            diagnostics.checked_rows += 1;
            let mut trace = RowTrace {
                index: row.index,
                order_product: row.product_name.as_text(),
                stage: CascadeStage::MissingData,
                date_match: false,
                time_match: false,
                product_match: false,
                product_similarity: None,
                time_diff_secs: None,
                skip_reason: None,
                score: None,
            };

            // 0. 결측값 가드 (해석 불가 시리얼 포함)
            let (order_date, order_time) = match (
                row.order_date.as_datetime(),
                row.order_time.as_datetime(),
            ) {
                (Some(d), Some(t)) if !row.product_name.is_empty() => (d, t),
                _ => {
                    trace.skip_reason = Some("결측값 존재".to_string());
                    diagnostics.attempts.push(trace);
                    continue;
                }
            };

            // 1. 날짜 일치 (허용 오차 없음)
            trace.stage = CascadeStage::Date;
            trace.date_match = receipt_dt.date() == order_date.date();
            if !trace.date_match {
                trace.skip_reason = Some("날짜 불일치".to_string());
                diagnostics.attempts.push(trace);
                continue;
            }
            diagnostics.date_pass += 1;

            // 2. 시간 차이 (경계 포함)
            trace.stage = CascadeStage::Time;
            let diff_secs = (receipt_dt - order_time).num_milliseconds().abs() as f64 / 1000.0;
            trace.time_diff_secs = Some(diff_secs);
            trace.time_match = diff_secs <= self.config.time_tolerance_secs;
            if !trace.time_match {
                trace.skip_reason = Some(format!("시간 불일치 ({diff_secs:.1}초)"));
                diagnostics.attempts.push(trace);
                continue;
            }
            diagnostics.time_pass += 1;

            // 3. 상품명 유사도
            trace.stage = CascadeStage::Product;
            let order_product = row.product_name.as_text();
            let (product_match, similarity) = is_match_with(
                receipt_product,
                &order_product,
                self.config.similarity_threshold,
            );
            trace.product_match = product_match;
            trace.product_similarity = Some(similarity);

            if product_match {
                diagnostics.product_pass += 1;
                let score = DATE_WEIGHT + TIME_WEIGHT + PRODUCT_WEIGHT * similarity;
                trace.stage = CascadeStage::Accepted;
                trace.score = Some(score);

                candidates.push(MatchCandidate {
                    index: row.index,
                    score,
                    product_similarity: similarity,
                    order_date: row.order_date.clone(),
                    order_time: row.order_time.clone(),
                    product_name: order_product,
                    option_text: row.option_text.clone(),
                });
            } else {
                trace.skip_reason = Some(format!("상품명 불일치 (유사도: {similarity:.3})"));
            }
            diagnostics.attempts.push(trace);
        }

        // 안정 정렬: 동점이면 원래 행 순서 유지
        candidates
            .sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

        (candidates, diagnostics)
    }

    /// 날짜 단계 단독 검사
    pub fn match_date(&self, receipt_dt: NaiveDateTime, cell: &CellValue) -> bool {
        cell.as_datetime()
            .map(|dt| dt.date() == receipt_dt.date())
            .unwrap_or(false)
    }

    /// 시간 단계 단독 검사 (±허용 오차, 경계 포함)
    pub fn match_time(&self, receipt_dt: NaiveDateTime, cell: &CellValue) -> bool {
        cell.as_datetime()
            .map(|dt| {
                let diff = (receipt_dt - dt).num_milliseconds().abs() as f64 / 1000.0;
                diff <= self.config.time_tolerance_secs
            })
            .unwrap_or(false)
    }

    fn invalid_report(error: MatchError) -> MatchReport {
        tracing::warn!("입력 검증 실패: {}", error);
        MatchReport {
            outcome: MatchOutcome::Invalid {
                reason: error.to_string(),
            },
            message: error.to_string(),
            updated_blocks: 0,
            multiple_candidates: None,
            diagnostics: MatchDiagnostics::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LineItem;
    use crate::table::{OrderTable, SheetTable};

    const TIME_11_14_31: f64 = 45870.46841435185;

    fn service() -> MatcherService {
        MatcherService::new(MatchingConfig::default())
    }

    fn receipt(approved_at: &str, product: &str) -> ReceiptRecord {
        ReceiptRecord {
            approved_at: approved_at.to_string(),
            items: vec![LineItem {
                name: Some(product.to_string()),
                options: Some("택배요청(0)/민트(0)".to_string()),
                ..LineItem::default()
            }],
            merchant_name: None,
            total_amount: None,
            approval_no: None,
        }
    }

    fn customer() -> CustomerInfo {
        CustomerInfo {
            name: "홍길동".to_string(),
            phone: "010-1234-5678".to_string(),
            address: "서울시 강남구 테헤란로 123".to_string(),
        }
    }

    fn row(index: usize, date: f64, time: f64, product: &str) -> OrderRow {
        OrderRow {
            index,
            order_date: CellValue::Number(date),
            order_time: CellValue::Number(time),
            product_name: CellValue::Text(product.to_string()),
            option_text: "택배요청(0)".to_string(),
        }
    }

    fn table(rows: Vec<Vec<CellValue>>) -> SheetTable {
        let mut t = SheetTable::new(
            vec![
                "주문기준일자".to_string(),
                "주문시작시각".to_string(),
                "상품명".to_string(),
                "옵션".to_string(),
            ],
            rows,
        );
        t.ensure_delivery_columns();
        t
    }

    fn delivery_row(date: f64, time: f64, product: &str) -> Vec<CellValue> {
        vec![
            CellValue::Number(date),
            CellValue::Number(time),
            CellValue::Text(product.to_string()),
            CellValue::Text("택배요청(0)".to_string()),
        ]
    }

    #[test]
    fn exact_timestamp_matches_date_and_time_with_zero_diff() {
        let svc = service();
        let dt = crate::table::temporal::parse_receipt_timestamp("2025-08-01 11:14:31").unwrap();

        assert!(svc.match_date(dt, &CellValue::Number(45870.0)));
        assert!(svc.match_time(dt, &CellValue::Number(TIME_11_14_31)));

        let (candidates, diags) = svc.find_matching_orders(
            dt,
            "주이패턴이불",
            &[row(0, 45870.0, TIME_11_14_31, "주이패턴이불")],
        );
        assert_eq!(candidates.len(), 1);
        assert_eq!(diags.attempts[0].time_diff_secs, Some(0.0));
    }

    #[test]
    fn time_tolerance_boundary_is_inclusive() {
        let svc = service();
        let dt = crate::table::temporal::parse_receipt_timestamp("2025-08-01 11:14:31").unwrap();
        let ten_secs = 10.0 / 86400.0;
        let eleven_secs = 11.0 / 86400.0;

        assert!(svc.match_time(dt, &CellValue::Number(TIME_11_14_31 + ten_secs)));
        assert!(!svc.match_time(dt, &CellValue::Number(TIME_11_14_31 + eleven_secs)));
    }

    #[test]
    fn native_datetime_cells_match_transparently() {
        let svc = service();
        let dt = crate::table::temporal::parse_receipt_timestamp("2025-08-01 11:14:31").unwrap();
        assert!(svc.match_date(dt, &CellValue::DateTime(dt)));
        assert!(svc.match_time(dt, &CellValue::DateTime(dt)));
    }

    #[test]
    fn missing_data_rows_are_traced_and_skipped() {
        let svc = service();
        let dt = crate::table::temporal::parse_receipt_timestamp("2025-08-01 11:14:31").unwrap();

        let mut bad = row(0, 45870.0, TIME_11_14_31, "주이패턴이불");
        bad.order_time = CellValue::Empty;
        let (candidates, diags) = svc.find_matching_orders(dt, "주이패턴이불", &[bad]);

        assert!(candidates.is_empty());
        assert_eq!(diags.attempts[0].stage, CascadeStage::MissingData);
        assert_eq!(diags.attempts[0].skip_reason.as_deref(), Some("결측값 존재"));
    }

    #[test]
    fn candidates_sorted_by_score_with_stable_ties() {
        let svc = service();
        let dt = crate::table::temporal::parse_receipt_timestamp("2025-08-01 11:14:31").unwrap();

        let rows = vec![
            row(0, 45870.0, TIME_11_14_31, "주이패턴이불세트"),
            row(1, 45870.0, TIME_11_14_31, "주이패턴이불"),
            row(2, 45870.0, TIME_11_14_31, "주이패턴이불세트"),
        ];
        let (candidates, _) = svc.find_matching_orders(dt, "주이패턴이불", &rows);

        assert_eq!(candidates.len(), 3);
        // 완전 일치가 선두, 동점(세트)끼리는 행 순서 유지
        assert_eq!(candidates[0].index, 1);
        assert_eq!(candidates[1].index, 0);
        assert_eq!(candidates[2].index, 2);
        assert_eq!(candidates[0].score, 1.0);
    }

    #[test]
    fn end_to_end_single_match_scores_one_and_updates_one_row() {
        let svc = service();
        let mut t = table(vec![
            delivery_row(45870.0, TIME_11_14_31, "주이패턴이불"),
            delivery_row(45871.0, 45871.5, "베개커버"),
        ]);

        let report = svc
            .match_order(
                &mut t,
                &receipt("2025-08-01 11:14:31", "주이패턴이불"),
                &customer(),
            )
            .unwrap();

        assert!(report.outcome.is_matched());
        let best = report.outcome.best().unwrap();
        assert_eq!(best.score, 0.3 + 0.3 + 0.4 * 1.0);
        assert_eq!(report.updated_blocks, 1);
        assert_eq!(report.multiple_candidates, None);

        let name_col = t.column_index("수하인명").unwrap();
        assert_eq!(t.raw_cell(2, name_col), CellValue::Text("홍길동".to_string()));
        assert_eq!(t.raw_cell(3, name_col), CellValue::Empty);
    }

    #[test]
    fn shared_time_serial_updates_one_block() {
        let svc = service();
        let mut t = table(vec![
            delivery_row(45870.0, TIME_11_14_31, "주이패턴이불"),
            delivery_row(45870.0, TIME_11_14_31, "주이패턴이불"),
        ]);

        let report = svc
            .match_order(
                &mut t,
                &receipt("2025-08-01 11:14:31", "주이패턴이불"),
                &customer(),
            )
            .unwrap();

        // 두 행이 같은 주문시각 그룹이므로 블록 1개만 갱신
        assert_eq!(report.updated_blocks, 1);
        assert_eq!(report.multiple_candidates, Some(2));
        let name_col = t.column_index("수하인명").unwrap();
        assert_eq!(t.raw_cell(2, name_col), CellValue::Text("홍길동".to_string()));
        assert_eq!(t.raw_cell(3, name_col), CellValue::Empty);
    }

    #[test]
    fn no_match_is_a_result_not_an_error() {
        let svc = service();
        let mut t = table(vec![delivery_row(45871.0, 45871.5, "베개커버")]);

        let report = svc
            .match_order(
                &mut t,
                &receipt("2025-08-01 11:14:31", "주이패턴이불"),
                &customer(),
            )
            .unwrap();

        assert!(matches!(report.outcome, MatchOutcome::NoMatch));
        assert_eq!(report.diagnostics.checked_rows, 1);
        assert_eq!(report.updated_blocks, 0);
    }

    #[test]
    fn invalid_receipt_yields_invalid_outcome() {
        let svc = service();
        let mut t = table(vec![delivery_row(45870.0, TIME_11_14_31, "주이패턴이불")]);

        let report = svc
            .match_order(&mut t, &receipt("not-a-date", "주이패턴이불"), &customer())
            .unwrap();
        assert!(matches!(report.outcome, MatchOutcome::Invalid { .. }));
    }

    #[test]
    fn missing_required_column_is_systemic_error() {
        let svc = service();
        let mut t = SheetTable::new(vec!["상품명".to_string()], vec![]);

        let result = svc.match_order(
            &mut t,
            &receipt("2025-08-01 11:14:31", "주이패턴이불"),
            &customer(),
        );
        assert!(matches!(result, Err(MatchError::ColumnNotFound(_))));
    }
}
