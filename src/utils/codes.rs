// src/utils/codes.rs

use std::sync::LazyLock;

use regex::Regex;

/// `PREFIX-YEAR-NNNN`, where the prefix may itself be hyphenated (`WA-INF`).
static ACCESS_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]+(?:-[A-Z]+)*-\d{4}-\d{4}$").expect("valid regex"));

/// `WA-CERT-YYYY-NNNNNN`.
static CERTIFICATE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^WA-CERT-\d{4}-\d{6}$").expect("valid regex"));

/// Canonical form used for every directory comparison.
pub fn normalize_access_code(code: &str) -> String {
    code.trim().to_uppercase()
}

pub fn is_access_code(code: &str) -> bool {
    ACCESS_CODE_RE.is_match(code)
}

/// Builds the `n`-th sequential code under `prefix` (`WA-INF-2025-` → `WA-INF-2025-0007`).
pub fn sequential_access_code(prefix: &str, n: u32) -> String {
    format!("{}{:04}", prefix, n)
}

pub fn is_certificate_id(id: &str) -> bool {
    CERTIFICATE_ID_RE.is_match(id)
}
