// ==========================================
// 刀具磨损追踪系统 - 输入校验器
// ==========================================
// 职责: 注册/登录字段校验（姓名、CPF、密码）及通用必填校验
// 说明: 校验顺序固定，返回第一个失败项
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::i18n::t;

/// 密码必须包含的特殊字符集合之一
const PASSWORD_SPECIALS: &str = "!@#$%^&*(),.?\":{}|<>";

pub const MIN_NAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 8;

// ==========================================
// CPF
// ==========================================

/// 去除非数字字符（兼容 "529.982.247-25" 等带掩码输入）
pub fn normalize_cpf(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// CPF 校验：11 位、非全同数字、两位 mod-11 校验位
pub fn is_valid_cpf(raw: &str) -> bool {
    let digits: Vec<u32> = normalize_cpf(raw)
        .chars()
        .filter_map(|c| c.to_digit(10))
        .collect();
    if digits.len() != 11 {
        return false;
    }
    if digits.iter().all(|d| *d == digits[0]) {
        return false;
    }

    let check = |len: usize| -> u32 {
        let weight_start = len as u32 + 1;
        let sum: u32 = digits[..len]
            .iter()
            .enumerate()
            .map(|(i, d)| d * (weight_start - i as u32))
            .sum();
        let digit = 11 - (sum % 11);
        if digit >= 10 {
            0
        } else {
            digit
        }
    };

    check(9) == digits[9] && check(10) == digits[10]
}

/// 校验并返回规范化 CPF
pub fn validate_cpf(raw: &str) -> ApiResult<String> {
    if is_valid_cpf(raw) {
        Ok(normalize_cpf(raw))
    } else {
        Err(ApiError::ValidationError(t("validation.cpf_invalid")))
    }
}

// ==========================================
// 姓名 / 密码
// ==========================================

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphabetic() || ('\u{C0}'..='\u{FF}').contains(&c) || c.is_whitespace()
}

/// 姓名：去空白后至少 3 个字符，只含字母（含拉丁重音字母）与空格
pub fn validate_name(name: &str) -> ApiResult<()> {
    if name.trim().chars().count() < MIN_NAME_LEN {
        return Err(ApiError::ValidationError(t("validation.name_too_short")));
    }
    if !name.chars().all(is_name_char) {
        return Err(ApiError::ValidationError(t("validation.name_letters_only")));
    }
    Ok(())
}

/// 密码：长度、字母、数字、特殊字符依次校验
pub fn validate_password(password: &str) -> ApiResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::ValidationError(t("validation.password_too_short")));
    }
    if !password.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(ApiError::ValidationError(t("validation.password_needs_letter")));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ApiError::ValidationError(t("validation.password_needs_digit")));
    }
    if !password.chars().any(|c| PASSWORD_SPECIALS.contains(c)) {
        return Err(ApiError::ValidationError(t("validation.password_needs_special")));
    }
    Ok(())
}

// ==========================================
// 通用必填
// ==========================================

/// 必填字符串：缺失或全空白时报错，返回去空白后的值
pub fn require_text(value: Option<&str>, message_key: &str) -> ApiResult<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ApiError::InvalidInput(t(message_key))),
    }
}

/// 可选字符串：全空白视为缺失
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
