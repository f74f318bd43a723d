use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::MatchError;
use crate::table::temporal::parse_receipt_timestamp;

/// 영수증 품목 (OCR 추출 결과, 값 누락 가능)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineItem {
    pub name: Option<String>,
    #[serde(default)]
    pub unit_price: Option<i64>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub options: Option<String>,
}

impl LineItem {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

/// 이미지에서 추출한 영수증 레코드
///
/// 외부 추출 서비스의 출력이므로 신뢰하지 않고 `validate`로 검증한다.
/// 가맹점/결제 메타데이터는 매칭에 쓰이지 않는 통과 필드.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptRecord {
    pub approved_at: String,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub merchant_name: Option<String>,
    #[serde(default)]
    pub total_amount: Option<i64>,
    #[serde(default)]
    pub approval_no: Option<String>,
}

impl ReceiptRecord {
    /// 필수 조건 검증: 승인시각 파싱 가능 + 이름 있는 품목 1개 이상
    pub fn validate(&self) -> Result<NaiveDateTime, MatchError> {
        let dt = parse_receipt_timestamp(&self.approved_at)?;

        let first = self
            .items
            .first()
            .ok_or_else(|| MatchError::InvalidReceipt("품목이 없습니다".to_string()))?;
        if first.name().trim().is_empty() {
            return Err(MatchError::InvalidReceipt(
                "첫 번째 품목에 상품명이 없습니다".to_string(),
            ));
        }
        Ok(dt)
    }

    /// 매칭에 사용하는 대표 상품명 (첫 품목)
    pub fn first_item_name(&self) -> &str {
        self.items.first().map(|i| i.name()).unwrap_or("")
    }
}

/// 수하인 정보 (개인정보 추출 서비스의 출력)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub phone: String,
    pub address: String,
}

impl CustomerInfo {
    /// 세 필드 모두 비어 있지 않고, 전화번호는 숫자/하이픈 10~11자리
    pub fn validate(&self) -> Result<(), MatchError> {
        if self.name.trim().is_empty() {
            return Err(MatchError::InvalidCustomer("이름이 없습니다".to_string()));
        }
        if self.address.trim().is_empty() {
            return Err(MatchError::InvalidCustomer("주소가 없습니다".to_string()));
        }

        let phone = self.phone.trim();
        if phone.is_empty() {
            return Err(MatchError::InvalidCustomer(
                "전화번호가 없습니다".to_string(),
            ));
        }
        if !phone.chars().all(|c| c.is_ascii_digit() || c == '-') {
            return Err(MatchError::InvalidCustomer(format!(
                "전화번호에 허용되지 않는 문자가 있습니다: {phone}"
            )));
        }
        let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
        if !(10..=11).contains(&digits) {
            return Err(MatchError::InvalidCustomer(format!(
                "전화번호 자릿수가 올바르지 않습니다 ({digits}자리)"
            )));
        }
        Ok(())
    }

    /// 전화번호를 XXX-XXXX-XXXX 형태로 정규화
    ///
    /// 11자리 010 번호는 3-4-4, 10자리 01x 번호는 3-3-4로 나눈다.
    /// 그 외 형태는 원본을 그대로 반환.
    pub fn normalized_phone(&self) -> String {
        let digits: String = self.phone.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.len() == 11 && digits.starts_with("010") {
            format!("{}-{}-{}", &digits[..3], &digits[3..7], &digits[7..])
        } else if digits.len() == 10 && digits.starts_with("01") {
            format!("{}-{}-{}", &digits[..3], &digits[3..6], &digits[6..])
        } else {
            self.phone.clone()
        }
    }
}
