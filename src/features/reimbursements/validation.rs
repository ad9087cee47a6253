/// 払い戻し申請のフィールドバリデーション
///
/// ネットワーク到達前に実行されるクライアント側の検証です。
/// 制約は固定された順序（金額 → 説明 → 支出日）で検査され、
/// 最初に満たされなかった制約がエラーとして報告されます。
use crate::features::reimbursements::models::{ContentUpdate, ReimbursementDraft};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::{validate_amount, validate_date, validate_text_length};

/// 説明の最大文字数
const MAX_DESCRIPTION_LENGTH: usize = 500;
/// 補足説明の最大文字数
const MAX_JUSTIFICATION_LENGTH: usize = 1000;

/// 新規申請の入力を検証する
///
/// # 引数
/// * `draft` - 新規申請の入力フィールド
///
/// # 検査順序
/// 1. 金額（正、有限、小数点以下2桁まで）
/// 2. 説明（空白除去後に非空、文字数上限）
/// 3. 支出日（存在し、YYYY-MM-DD形式として解釈可能）
pub fn validate_draft(draft: &ReimbursementDraft) -> AppResult<()> {
    validate_amount(draft.amount)?;

    if draft.description.trim().is_empty() {
        return Err(AppError::validation("Informe a descrição da despesa."));
    }
    validate_text_length(&draft.description, MAX_DESCRIPTION_LENGTH, "Descrição")?;

    if let Some(justification) = &draft.justification {
        validate_text_length(justification, MAX_JUSTIFICATION_LENGTH, "Justificativa")?;
    }

    if draft.expense_date.trim().is_empty() {
        return Err(AppError::validation("Informe a data da despesa."));
    }
    validate_date(&draft.expense_date)?;

    Ok(())
}

/// 内容編集の入力を検証する
///
/// 指定されたフィールドのみを、新規申請と同じ順序・同じ規則で検証します。
///
/// # 引数
/// * `update` - 部分更新の入力フィールド
pub fn validate_update(update: &ContentUpdate) -> AppResult<()> {
    if update.is_empty() {
        return Err(AppError::validation("Nenhuma alteração informada."));
    }

    if let Some(amount) = update.amount {
        validate_amount(amount)?;
    }

    if let Some(description) = &update.description {
        if description.trim().is_empty() {
            return Err(AppError::validation("Informe a descrição da despesa."));
        }
        validate_text_length(description, MAX_DESCRIPTION_LENGTH, "Descrição")?;
    }

    if let Some(justification) = &update.justification {
        validate_text_length(justification, MAX_JUSTIFICATION_LENGTH, "Justificativa")?;
    }

    if let Some(expense_date) = &update.expense_date {
        validate_date(expense_date)?;
    }

    Ok(())
}
