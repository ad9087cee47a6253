/// 払い戻しRemote Storeアダプター
///
/// バックエンドの/reembolsosエンドポイント群を呼び出し、ワイヤ表現と
/// 正準エンティティの変換をこの境界で一度だけ行います。
use crate::features::reimbursements::models::{
    ContentUpdate, CreateReimbursementRequest, Reimbursement, ReimbursementDraft,
    ReimbursementWire, Status, UpdateContentRequest, UpdateStatusRequest,
};
use crate::shared::api_client::ApiClient;
use crate::shared::errors::{AppError, AppResult};
use log::info;
use std::sync::Arc;

/// 払い戻しエンドポイントのパス
const ENDPOINT: &str = "/reembolsos";

/// 削除失敗が依存データによる競合かどうかをメッセージから判定する
///
/// バックエンドの競合シグナルはHTTP 409が第一ですが、旧実装は
/// 400系の汎用エラーにメッセージで依存関係を示すことがあるため、
/// その形もフォールバックとして競合に分類します。
fn is_dependency_conflict_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("vinculad") || lower.contains("dependên") || lower.contains("dependen")
}

/// 削除呼び出しのエラーを分類する
///
/// 依存データによる拒否はConflictとして報告し、その他はそのまま伝播します。
fn classify_delete_error(error: AppError) -> AppError {
    match error {
        AppError::Remote(message) if is_dependency_conflict_message(&message) => {
            AppError::conflict(message)
        }
        other => other,
    }
}

/// ステータス決定呼び出しのエラーを分類する
///
/// この呼び出しの前提条件はステータスのみであるため、バックエンドの
/// 409はステータス前提条件の不成立（InvalidTransition）を意味します。
fn classify_decide_error(error: AppError) -> AppError {
    match error {
        AppError::Conflict(message) => AppError::invalid_transition(message),
        other => other,
    }
}

/// 払い戻しリポジトリ
#[derive(Clone)]
pub struct ReimbursementRepository {
    /// APIクライアント
    api: Arc<ApiClient>,
}

impl ReimbursementRepository {
    /// 新しいリポジトリを作成する
    ///
    /// # 引数
    /// * `api` - APIクライアント
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// 呼び出し元に可視な全レコードを取得する
    ///
    /// サーバー側の可視性ルールはサーバーが適用します。
    ///
    /// # 引数
    /// * `token` - 認証トークン
    pub async fn list(&self, token: &str) -> AppResult<Vec<Reimbursement>> {
        let wires: Vec<ReimbursementWire> = self.api.get(ENDPOINT, Some(token)).await?;
        let records: Vec<Reimbursement> =
            wires.into_iter().map(ReimbursementWire::into_canonical).collect();

        info!("払い戻し一覧を取得しました: count={}", records.len());
        Ok(records)
    }

    /// 新規レコードを作成する
    ///
    /// # 引数
    /// * `draft` - 検証済みの入力フィールド
    /// * `status` - 初期ステータス（下書き保存または提出）
    /// * `token` - 認証トークン
    pub async fn create(
        &self,
        draft: &ReimbursementDraft,
        status: Status,
        token: &str,
    ) -> AppResult<Reimbursement> {
        let request = CreateReimbursementRequest {
            categoria: draft.category.wire_value(),
            descricao: draft.description.clone(),
            justificativa: draft.justification.clone(),
            valor: draft.amount,
            data_despesa: draft.expense_date.clone(),
            status: status.wire_value(),
        };

        let wire: ReimbursementWire = self.api.post(ENDPOINT, &request, Some(token)).await?;
        let record = wire.into_canonical();

        info!("払い戻しを作成しました: id={}, status={:?}", record.id, record.status);
        Ok(record)
    }

    /// レコードの内容を部分更新する
    ///
    /// # 引数
    /// * `id` - レコードID
    /// * `update` - 検証済みの更新フィールド
    /// * `token` - 認証トークン
    pub async fn update_content(
        &self,
        id: &str,
        update: &ContentUpdate,
        token: &str,
    ) -> AppResult<Reimbursement> {
        let request = UpdateContentRequest {
            categoria: update.category.map(|c| c.wire_value()),
            descricao: update.description.clone(),
            justificativa: update.justification.clone(),
            valor: update.amount,
            data_despesa: update.expense_date.clone(),
        };

        let endpoint = format!("{ENDPOINT}/{id}");
        let wire: ReimbursementWire = self.api.patch(&endpoint, &request, Some(token)).await?;

        info!("払い戻しの内容を更新しました: id={id}");
        Ok(wire.into_canonical())
    }

    /// レコードのステータスを更新する（審査の決定）
    ///
    /// ボディはステータスのみで、他のフィールドは送信しません。
    ///
    /// # 引数
    /// * `id` - レコードID
    /// * `status` - 遷移先ステータス
    /// * `token` - 認証トークン
    pub async fn update_status(
        &self,
        id: &str,
        status: Status,
        token: &str,
    ) -> AppResult<Reimbursement> {
        let request = UpdateStatusRequest {
            status: status.wire_value(),
        };

        let endpoint = format!("{ENDPOINT}/{id}");
        let wire: ReimbursementWire = self
            .api
            .patch(&endpoint, &request, Some(token))
            .await
            .map_err(classify_decide_error)?;

        info!("払い戻しのステータスを更新しました: id={id}, status={:?}", status);
        Ok(wire.into_canonical())
    }

    /// レコードを削除する
    ///
    /// 依存データによる拒否はConflictとして報告されます。
    ///
    /// # 引数
    /// * `id` - レコードID
    /// * `token` - 認証トークン
    pub async fn delete(&self, id: &str, token: &str) -> AppResult<()> {
        let endpoint = format!("{ENDPOINT}/{id}");
        self.api
            .delete(&endpoint, Some(token))
            .await
            .map_err(classify_delete_error)?;

        info!("払い戻しを削除しました: id={id}");
        Ok(())
    }
}
