/// 払い戻し機能モジュール
///
/// このモジュールは払い戻し申請のライフサイクルに関連するすべての機能を提供します：
/// - 申請の作成（下書き保存・提出）、内容編集、承認・却下、削除
/// - ステータス遷移とロールに基づく可否判定
/// - フィールドバリデーション
/// - 一覧ビューの射影（検索・タブ・詳細フィルタ・ページング）
/// - Remote Store（/reembolsos）アダプター
// サブモジュールの宣言
pub mod lifecycle;
pub mod models;
pub mod projection;
pub mod repository;
pub mod validation;

// 公開インターフェース：外部から使用可能な型と関数をエクスポート

// モデル
pub use models::{
    Category, ContentUpdate, Decision, Reimbursement, ReimbursementDraft, Status, SubmitAction,
};

// ライフサイクル
pub use lifecycle::{can_decide, can_delete, can_edit, LifecycleManager};

// 射影
pub use projection::{AdvancedFilter, ListState, Page, StatusTab, PAGE_SIZE};

// リポジトリ
pub use repository::ReimbursementRepository;

// バリデーション
pub use validation::{validate_draft, validate_update};
