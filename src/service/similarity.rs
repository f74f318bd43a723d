use std::collections::HashMap;

/// 상품명 매칭 기본 임계값
///
/// 한 글자 차이는 대부분 통과하도록 튜닝된 상수 (8글자 중 1글자 = 0.875).
pub const SIMILARITY_THRESHOLD: f64 = 0.75;

/// 두 상품명의 유사도 (0.0 ~ 1.0)
///
/// 정규화(소문자화, 공백 제거, 괄호 한정어 제거) 후
/// Ratcliff/Obershelp 방식으로 2·M / (len(a)+len(b))를 계산한다.
/// M은 재귀적으로 찾은 공통 블록의 총 문자 수.
pub fn similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let a: Vec<char> = normalize(a).chars().collect();
    let b: Vec<char> = normalize(b).chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let matched = match_total(&a, &b);
    2.0 * matched as f64 / (a.len() + b.len()) as f64
}

/// 임계값 판정 포함 매칭 검사
pub fn is_match(a: &str, b: &str) -> (bool, f64) {
    is_match_with(a, b, SIMILARITY_THRESHOLD)
}

pub fn is_match_with(a: &str, b: &str, threshold: f64) -> (bool, f64) {
    let score = similarity(a, b);
    (score >= threshold, score)
}

/// 비교 전 정규화
///
/// 소문자화하고 공백을 제거하며, "주이패턴이불(냉감나일론)"처럼 괄호로
/// 덧붙은 한정어는 떼어낸다. 괄호 제거로 문자열이 비면 제거 없이 되돌린다.
fn normalize(s: &str) -> String {
    let stripped = clean(s, true);
    if stripped.is_empty() {
        clean(s, false)
    } else {
        stripped
    }
}

fn clean(s: &str, strip_brackets: bool) -> String {
    let mut out = String::with_capacity(s.len());
    let mut depth = 0usize;
    for ch in s.chars() {
        match ch {
            '(' | '（' if strip_brackets => depth += 1,
            ')' | '）' if strip_brackets => depth = depth.saturating_sub(1),
            c if depth == 0 && !c.is_whitespace() => out.extend(c.to_lowercase()),
            _ => {}
        }
    }
    out
}

/// 재귀적으로 가장 긴 공통 블록을 찾아 매칭 문자 수를 합산
fn match_total(a: &[char], b: &[char]) -> usize {
    let (i, j, len) = longest_match(a, b);
    if len == 0 {
        return 0;
    }
    len + match_total(&a[..i], &b[..j]) + match_total(&a[i + len..], &b[j + len..])
}

/// 가장 긴 공통 연속 블록 (a 시작, b 시작, 길이)
fn longest_match(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0usize, 0usize, 0usize);
    let mut j2len: HashMap<usize, usize> = HashMap::new();

    for (i, &ca) in a.iter().enumerate() {
        let mut next: HashMap<usize, usize> = HashMap::new();
        for (j, &cb) in b.iter().enumerate() {
            if ca != cb {
                continue;
            }
            let run = if j > 0 {
                j2len.get(&(j - 1)).copied().unwrap_or(0) + 1
            } else {
                1
            };
            next.insert(j, run);
            if run > best.2 {
                best = (i + 1 - run, j + 1 - run, run);
            }
        }
        j2len = next;
    }
    best
}
