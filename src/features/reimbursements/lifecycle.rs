/// 払い戻しライフサイクルマネージャー
///
/// 入力の検証、現在のステータスとアクターのロールに基づく遷移可否の判定、
/// 対応するミューテーションの発行、そして確認済みの結果によるローカル
/// 射影の整合を担います。
///
/// 状態遷移表:
///
/// | 遷移元 | 遷移先 | 許可されるアクター | トリガー |
/// |---|---|---|---|
/// | （新規） | Rascunho | 所有者 | 下書き保存 |
/// | （新規） | Pendente | 所有者 | 提出 |
/// | Rascunho | Pendente | 所有者 | 編集後の提出 |
/// | Pendente | Aprovado | 管理者のみ | 承認 |
/// | Pendente | Rejeitado | 管理者のみ | 却下 |
/// | Aprovado／Rejeitado | — | なし | 終端 |
///
/// ローカルの一覧キャッシュはRemote Storeの読み取り射影にすぎず、
/// 権威を持つのは常にRemote Storeです。キャッシュの更新は成功レスポンス
/// 確認後にのみ行われます。
use crate::features::auth::models::UserProfile;
use crate::features::auth::session::SessionContext;
use crate::features::reimbursements::models::{
    ContentUpdate, Decision, Reimbursement, ReimbursementDraft, Status, SubmitAction,
};
use crate::features::reimbursements::projection::{ListState, Page};
use crate::features::reimbursements::repository::ReimbursementRepository;
use crate::features::reimbursements::validation::{validate_draft, validate_update};
use crate::shared::errors::{AppError, AppResult};
use log::{info, warn};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

/// 承認・却下の操作を表示してよいかどうか（表示層のゲート）
///
/// 管理者かつ対象が審査待ちの場合のみtrueを返します。
/// これはUX上の便宜であり、セキュリティ境界ではありません。
/// 権限の強制はRemote Storeが独立に行います。
pub fn can_decide(profile: &UserProfile, record: &Reimbursement) -> bool {
    profile.role.is_admin() && record.status == Status::Pending
}

/// 削除の操作を表示してよいかどうか（表示層のゲート）
pub fn can_delete(profile: &UserProfile) -> bool {
    profile.role.is_admin()
}

/// 内容編集の操作を表示してよいかどうか（表示層のゲート）
///
/// 編集は所有者または管理者が、終端でないステータスに対してのみ行えます。
pub fn can_edit(profile: &UserProfile, record: &Reimbursement) -> bool {
    let is_owner = record.owner_id == Some(profile.id);
    (profile.role.is_admin() || is_owner) && record.status.is_editable()
}

/// 内容編集の前提条件を検査する
fn ensure_can_edit(profile: &UserProfile, record: &Reimbursement) -> AppResult<()> {
    let is_owner = record.owner_id == Some(profile.id);
    if !profile.role.is_admin() && !is_owner {
        return Err(AppError::forbidden(format!(
            "アクターは所有者でも管理者でもありません: record={}",
            record.id
        )));
    }

    if record.status.is_terminal() {
        return Err(AppError::forbidden(format!(
            "終端ステータスのレコードは編集できません: record={}, status={:?}",
            record.id, record.status
        )));
    }

    Ok(())
}

/// 審査の決定の前提条件を検査する
///
/// ロールの検査がステータスの検査より先に行われます。
fn ensure_decision_allowed(profile: &UserProfile, record: &Reimbursement) -> AppResult<()> {
    if !profile.role.is_admin() {
        return Err(AppError::forbidden(
            "承認・却下は管理者のみ実行できます".to_string(),
        ));
    }

    if record.status != Status::Pending {
        return Err(AppError::invalid_transition(format!(
            "審査待ちではないレコードは決定できません: record={}, status={:?}",
            record.id, record.status
        )));
    }

    Ok(())
}

/// キャッシュ内の該当エントリを確認済みレコードで置き換える
fn replace_entry(records: &mut Vec<Reimbursement>, updated: Reimbursement) {
    if let Some(entry) = records.iter_mut().find(|r| r.id == updated.id) {
        *entry = updated;
    } else {
        records.push(updated);
    }
}

/// キャッシュから該当エントリを取り除く
fn remove_entry(records: &mut Vec<Reimbursement>, id: &str) {
    records.retain(|r| r.id != id);
}

/// 実行中ミューテーションのガード
///
/// 同一レコードへの二度目のミューテーションを、最初の呼び出しが完了する
/// まで拒否するための目印です。ドロップ時に登録を解除します。
struct InFlightGuard<'a> {
    in_flight: &'a Mutex<HashSet<String>>,
    id: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut set) = self.in_flight.lock() {
            set.remove(&self.id);
        }
    }
}

/// 払い戻しライフサイクルマネージャー
pub struct LifecycleManager {
    /// Remote Storeアダプター
    repository: ReimbursementRepository,
    /// セッションコンテキスト（注入される明示的な依存）
    session: Arc<SessionContext>,
    /// 読み込み済み一覧のキャッシュ（UIスコープの読み取り射影）
    cache: Mutex<Vec<Reimbursement>>,
    /// 実行中ミューテーションの対象レコードID
    in_flight: Mutex<HashSet<String>>,
}

impl LifecycleManager {
    /// 新しいライフサイクルマネージャーを作成する
    ///
    /// # 引数
    /// * `repository` - 払い戻しリポジトリ
    /// * `session` - セッションコンテキスト
    pub fn new(repository: ReimbursementRepository, session: Arc<SessionContext>) -> Self {
        Self {
            repository,
            session,
            cache: Mutex::new(Vec::new()),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// 現在のアクターのプロフィールを要求する
    ///
    /// セッションがない場合はAuthエラー（ログイン画面への誘導が必要）。
    fn require_profile(&self) -> AppResult<UserProfile> {
        self.session
            .profile()
            .ok_or_else(|| AppError::auth("sessão ausente"))
    }

    /// 現在のアクセストークンを要求する
    fn require_token(&self) -> AppResult<String> {
        self.session
            .token()
            .ok_or_else(|| AppError::auth("sessão ausente"))
    }

    /// キャッシュのロックを取得する
    fn lock_cache(&self) -> AppResult<MutexGuard<'_, Vec<Reimbursement>>> {
        self.cache
            .lock()
            .map_err(|_| AppError::concurrency("一覧キャッシュのロック取得に失敗しました"))
    }

    /// 対象レコードへのミューテーションを開始登録する
    ///
    /// 既に実行中のミューテーションがある場合はConcurrencyエラーで拒否します。
    /// 二度押しによる重複遷移の試行を防ぐための必須の安全策です。
    fn begin_mutation(&self, id: &str) -> AppResult<InFlightGuard<'_>> {
        let mut set = self
            .in_flight
            .lock()
            .map_err(|_| AppError::concurrency("実行中操作のロック取得に失敗しました"))?;

        if !set.insert(id.to_string()) {
            warn!("同一レコードへの操作が既に実行中です: record={id}");
            return Err(AppError::concurrency(format!(
                "operação em andamento para o registro {id}"
            )));
        }

        Ok(InFlightGuard {
            in_flight: &self.in_flight,
            id: id.to_string(),
        })
    }

    /// 401受信時に保存済み資格情報を破棄する
    ///
    /// エラー自体はそのまま伝播し、自動リトライは行いません。
    fn discard_credentials_on_auth_failure<T>(&self, result: AppResult<T>) -> AppResult<T> {
        if let Err(AppError::Auth(_)) = &result {
            warn!("401を受信したため、保存済みセッションを破棄します");
            if let Err(e) = self.session.clear() {
                warn!("セッション破棄に失敗しました: {e}");
            }
        }
        result
    }

    /// キャッシュへレコードを直接投入する（テスト用）
    #[cfg(test)]
    fn seed_cache(&self, records: Vec<Reimbursement>) {
        *self.cache.lock().unwrap() = records;
    }

    /// 一覧をRemote Storeから再読込する
    ///
    /// # 戻り値
    /// 読み込まれたレコード（Remote Storeの返却順）
    pub async fn reload(&self) -> AppResult<Vec<Reimbursement>> {
        let token = self.require_token()?;

        let records = self
            .discard_credentials_on_auth_failure(self.repository.list(&token).await)?;

        let mut cache = self.lock_cache()?;
        *cache = records.clone();

        info!("一覧キャッシュを更新しました: count={}", records.len());
        Ok(records)
    }

    /// キャッシュ済み一覧のスナップショットを取得する
    pub fn records(&self) -> AppResult<Vec<Reimbursement>> {
        Ok(self.lock_cache()?.clone())
    }

    /// 一覧状態に基づく可視ページを導出する
    ///
    /// # 引数
    /// * `state` - 一覧画面のフィルタ・ページング状態
    pub fn visible(&self, state: &ListState) -> AppResult<Page> {
        let cache = self.lock_cache()?;
        Ok(state.visible(&cache))
    }

    /// 新規申請を作成する（下書き保存または提出）
    ///
    /// # 引数
    /// * `draft` - 入力フィールド
    /// * `action` - 送信方法（下書き保存: Rascunho、提出: Pendente）
    ///
    /// # 戻り値
    /// 作成されたレコード
    ///
    /// # エラー
    /// * `Validation` - 最初に満たされなかったフィールド制約（金額 → 説明 → 支出日の順で検査、ネットワーク呼び出しなし）
    /// * `Auth` - 有効なセッションがない場合
    pub async fn submit(
        &self,
        draft: &ReimbursementDraft,
        action: SubmitAction,
    ) -> AppResult<Reimbursement> {
        validate_draft(draft)?;

        let token = self.require_token()?;
        let status = action.initial_status();

        let record = self.discard_credentials_on_auth_failure(
            self.repository.create(draft, status, &token).await,
        )?;

        let mut cache = self.lock_cache()?;
        replace_entry(&mut cache, record.clone());

        info!(
            "申請を作成しました: id={}, status={:?}",
            record.id, record.status
        );
        Ok(record)
    }

    /// レコードの内容を編集する
    ///
    /// 編集が許されるのは所有者または管理者のみで、対象のステータスが
    /// 終端でない場合に限られます。成功時は該当する射影エントリを
    /// その場で更新します（全件再読込は不要）。
    ///
    /// # 引数
    /// * `id` - レコードID
    /// * `update` - 更新フィールド
    pub async fn update_content(
        &self,
        id: &str,
        update: &ContentUpdate,
    ) -> AppResult<Reimbursement> {
        validate_update(update)?;

        let token = self.require_token()?;
        let profile = self.require_profile()?;

        let current = {
            let cache = self.lock_cache()?;
            cache
                .iter()
                .find(|r| r.id == id)
                .cloned()
                .ok_or_else(|| AppError::not_found("Reembolso"))?
        };

        ensure_can_edit(&profile, &current)?;

        let _guard = self.begin_mutation(id)?;
        let record = self.discard_credentials_on_auth_failure(
            self.repository.update_content(id, update, &token).await,
        )?;

        let mut cache = self.lock_cache()?;
        replace_entry(&mut cache, record.clone());

        info!("申請の内容を更新しました: id={id}");
        Ok(record)
    }

    /// 既存の下書きを提出する（Rascunho → Pendente）
    ///
    /// 所有者のみ実行できます。下書きを離れる時点で金額と説明の不変条件を
    /// 再検査します。
    ///
    /// # 引数
    /// * `id` - レコードID
    pub async fn submit_draft(&self, id: &str) -> AppResult<Reimbursement> {
        let token = self.require_token()?;
        let profile = self.require_profile()?;

        let current = {
            let cache = self.lock_cache()?;
            cache
                .iter()
                .find(|r| r.id == id)
                .cloned()
                .ok_or_else(|| AppError::not_found("Reembolso"))?
        };

        if current.owner_id != Some(profile.id) {
            return Err(AppError::forbidden(format!(
                "下書きの提出は所有者のみ実行できます: record={id}"
            )));
        }

        if current.status != Status::Draft {
            return Err(AppError::invalid_transition(format!(
                "下書きではないレコードは提出できません: record={id}, status={:?}",
                current.status
            )));
        }

        // 下書きを離れる時点の不変条件: 金額は正、説明は非空
        crate::shared::utils::validate_amount(current.amount)?;
        if current.description.trim().is_empty() {
            return Err(AppError::validation("Informe a descrição da despesa."));
        }

        let _guard = self.begin_mutation(id)?;
        let record = self.discard_credentials_on_auth_failure(
            self.repository
                .update_status(id, Status::Pending, &token)
                .await,
        )?;

        let mut cache = self.lock_cache()?;
        replace_entry(&mut cache, record.clone());

        info!("下書きを提出しました: id={id}");
        Ok(record)
    }

    /// 審査の決定（承認または却下）を実行する
    ///
    /// 管理者のみ実行でき、対象が審査待ちである場合に限られます。
    /// 決定はステータスと最終更新日時のみを変更し、他のフィールドには
    /// 触れません。
    ///
    /// # 引数
    /// * `id` - レコードID
    /// * `decision` - 承認または却下
    pub async fn decide(&self, id: &str, decision: Decision) -> AppResult<Reimbursement> {
        let token = self.require_token()?;
        let profile = self.require_profile()?;

        // ロールの検査はレコードの有無より先（管理者以外には存在も明かさない）
        if !profile.role.is_admin() {
            return Err(AppError::forbidden(
                "承認・却下は管理者のみ実行できます".to_string(),
            ));
        }

        let current = {
            let cache = self.lock_cache()?;
            cache
                .iter()
                .find(|r| r.id == id)
                .cloned()
                .ok_or_else(|| AppError::not_found("Reembolso"))?
        };

        ensure_decision_allowed(&profile, &current)?;

        let _guard = self.begin_mutation(id)?;
        let record = self.discard_credentials_on_auth_failure(
            self.repository
                .update_status(id, decision.target_status(), &token)
                .await,
        )?;

        let mut cache = self.lock_cache()?;
        replace_entry(&mut cache, record.clone());

        info!(
            "審査を確定しました: id={id}, decision={:?}, status={:?}",
            decision, record.status
        );
        Ok(record)
    }

    /// レコードを削除する
    ///
    /// 管理者のみ実行できます。Remote Storeが依存データを理由に拒否した
    /// 場合はConflictが報告され、射影エントリは取り除かれません。
    /// エントリが取り除かれるのは削除成功時のみです。
    ///
    /// # 引数
    /// * `id` - レコードID
    pub async fn remove(&self, id: &str) -> AppResult<()> {
        let token = self.require_token()?;
        let profile = self.require_profile()?;

        if !can_delete(&profile) {
            return Err(AppError::forbidden(
                "削除は管理者のみ実行できます".to_string(),
            ));
        }

        let _guard = self.begin_mutation(id)?;
        self.discard_credentials_on_auth_failure(self.repository.delete(id, &token).await)?;

        let mut cache = self.lock_cache()?;
        remove_entry(&mut cache, id);

        info!("申請を削除しました: id={id}");
        Ok(())
    }
}
