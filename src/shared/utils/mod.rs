use crate::shared::errors::{AppError, AppResult};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::America::Sao_Paulo;

/// 日付文字列のバリデーション
///
/// # 引数
/// * `date_str` - 日付文字列（YYYY-MM-DD形式）
///
/// # 戻り値
/// 有効な日付の場合はOk(解析済みの日付)、無効な場合はエラー
///
/// # バリデーション規則
/// - YYYY-MM-DD形式であること
/// - 実在する日付であること
/// - 1900年以降、2100年以前であること
pub fn validate_date(date_str: &str) -> AppResult<NaiveDate> {
    // 基本的な形式チェック
    if date_str.len() != 10 {
        return Err(AppError::validation(
            "Informe a data no formato AAAA-MM-DD.",
        ));
    }

    // ハイフンの位置チェック
    if (date_str.chars().nth(4) != Some('-')) || (date_str.chars().nth(7) != Some('-')) {
        return Err(AppError::validation(
            "Informe a data no formato AAAA-MM-DD.",
        ));
    }

    // 日付として解析可能かチェック
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| AppError::validation("Data da despesa inválida."))?;

    // 年の範囲チェック
    let year = date.year();
    if !(1900..=2100).contains(&year) {
        return Err(AppError::validation(
            "Informe uma data entre 1900 e 2100.",
        ));
    }

    Ok(date)
}

/// 金額のバリデーション
///
/// # 引数
/// * `amount` - 金額
///
/// # 戻り値
/// 有効な金額の場合はOk(())、無効な場合はエラー
///
/// # バリデーション規則
/// - 正の数値であること
/// - 10桁以内であること
/// - 小数点以下は2桁まで（センターボ精度）
pub fn validate_amount(amount: f64) -> AppResult<()> {
    // 無限大・NaNチェック
    if !amount.is_finite() {
        return Err(AppError::validation("Valor do reembolso inválido."));
    }

    // 正の数値チェック
    if amount <= 0.0 {
        return Err(AppError::validation(
            "Informe um valor maior que zero para o reembolso.",
        ));
    }

    // 上限チェック（10桁以内）
    if amount >= 10_000_000_000.0 {
        return Err(AppError::validation(
            "O valor do reembolso excede o limite permitido.",
        ));
    }

    // 小数点以下の桁数チェック（2桁まで）
    let amount_str = format!("{amount:.10}");
    if let Some(decimal_pos) = amount_str.find('.') {
        let decimal_part = &amount_str[decimal_pos + 1..];
        let significant_decimals = decimal_part.trim_end_matches('0');
        if significant_decimals.len() > 2 {
            return Err(AppError::validation(
                "Use no máximo duas casas decimais no valor.",
            ));
        }
    }

    Ok(())
}

/// 文字列の長さバリデーション
///
/// # 引数
/// * `text` - 検証対象の文字列
/// * `max_length` - 最大文字数
/// * `field_name` - フィールド名（エラーメッセージ用）
///
/// # 戻り値
/// 有効な長さの場合はOk(())、無効な場合はエラー
pub fn validate_text_length(text: &str, max_length: usize, field_name: &str) -> AppResult<()> {
    let char_count = text.chars().count();
    if char_count > max_length {
        return Err(AppError::validation(format!(
            "{field_name} deve ter no máximo {max_length} caracteres."
        )));
    }
    Ok(())
}

/// 日付をブラジル表記（dd/mm/aaaa）で整形する
///
/// # 引数
/// * `date` - 整形する日付
pub fn format_date_br(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// タイムスタンプをサンパウロ時間のブラジル表記で整形する
///
/// # 引数
/// * `timestamp` - UTCタイムスタンプ
///
/// # 戻り値
/// "dd/mm/aaaa HH:MM"形式の文字列
pub fn format_datetime_br(timestamp: DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Sao_Paulo)
        .format("%d/%m/%Y %H:%M")
        .to_string()
}

/// 金額をレアル表記で整形する
///
/// # 引数
/// * `amount` - 金額
///
/// # 戻り値
/// "R$ 120,50"形式の文字列（小数点はカンマ）
pub fn format_currency_brl(amount: f64) -> String {
    format!("R$ {:.2}", amount).replace('.', ",")
}
