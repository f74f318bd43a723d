pub mod sheet;
pub mod temporal;

pub use sheet::SheetTable;

use crate::models::CellValue;

/// 헤더가 1행에 있을 때 0 기준 데이터 인덱스 → 실제 행 번호 보정치
pub const HEADER_OFFSET: usize = 2;

/// 헤더 행 번호 (1 기준 좌표)
pub const HEADER_ROW: usize = 1;

// 주문 테이블 컬럼명 (매출 리포트 내보내기 형식)
pub const COL_ORDER_DATE: &str = "주문기준일자";
pub const COL_ORDER_TIME: &str = "주문시작시각";
pub const COL_PRODUCT_NAME: &str = "상품명";
pub const OPTION_HEADER_HINT: &str = "옵션";

// 수하인 정보 기록 컬럼
pub const COL_RECIPIENT_NAME: &str = "수하인명";
pub const COL_RECIPIENT_PHONE: &str = "수하인전화번호";
pub const COL_RECIPIENT_MOBILE: &str = "수하인핸드폰번호";
pub const COL_RECIPIENT_ADDR: &str = "수하인주소";
pub const COL_ITEM_DESC: &str = "품목명";

/// 기록 시 보장해야 하는 배송 정보 컬럼 일체
pub const DELIVERY_COLUMNS: [&str; 5] = [
    COL_RECIPIENT_NAME,
    COL_RECIPIENT_PHONE,
    COL_RECIPIENT_MOBILE,
    COL_RECIPIENT_ADDR,
    COL_ITEM_DESC,
];

/// 주문 테이블에 대한 좁은 접근 인터페이스
///
/// 매칭 코어는 구체 스프레드시트 타입이 아니라 이 트레이트에만 의존한다.
/// 좌표는 스프레드시트 관례대로 1 기준이며 1행이 헤더다.
pub trait OrderTable {
    fn headers(&self) -> &[String];

    /// 데이터 행 수 (헤더 제외)
    fn data_row_count(&self) -> usize;

    /// 헤더명 정확 일치로 컬럼 번호 조회 (1 기준)
    fn column_index(&self, name: &str) -> Option<usize>;

    /// 헤더명에 부분 문자열이 포함된 첫 컬럼 조회 (1 기준)
    fn column_containing(&self, fragment: &str) -> Option<usize>;

    /// 원시 셀 값 조회 (표시 형식이 아닌 원래 타입 유지)
    fn raw_cell(&self, row: usize, col: usize) -> CellValue;

    /// 셀 기록
    fn set_cell(&mut self, row: usize, col: usize, value: CellValue);
}
