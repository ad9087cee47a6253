// 機能モジュール構造
pub mod features;
pub mod shared;

use features::auth::service::AuthService;
use features::auth::session::{SessionContext, SessionStore};
use features::members::repository::MemberRepository;
use features::reimbursements::lifecycle::LifecycleManager;
use features::reimbursements::repository::ReimbursementRepository;
use log::info;
use shared::api_client::ApiClient;
use shared::config::environment::{
    initialize_logging_system, load_environment_variables, SessionConfig,
};
use shared::errors::AppResult;
use std::sync::Arc;

/// アプリケーション状態
///
/// UIシェルから呼び出されるサービス群を保持します。セッションコンテキストは
/// 各サービスへ明示的に注入された共有依存であり、ここ以外でセッションが
/// 組み立てられることはありません。
pub struct AppState {
    /// セッションコンテキスト
    pub session: Arc<SessionContext>,
    /// 認証サービス
    pub auth: AuthService,
    /// 払い戻しライフサイクルマネージャー
    pub reimbursements: LifecycleManager,
    /// メンバーディレクトリ
    pub members: MemberRepository,
}

/// 環境変数とログシステムを初期化する
///
/// アプリケーション起動時に一度だけ呼び出します。
pub fn init() {
    // 環境に応じた.envファイルを読み込み（ログシステム初期化前に実行）
    load_environment_variables();

    // ログシステムを初期化（.envファイル読み込み後）
    initialize_logging_system();
}

/// アプリケーション状態を組み立てる
///
/// 設定 → APIクライアント → セッションコンテキスト → 各サービスの順で
/// 初期化します。保存済みセッションがあればこの時点で復元されます。
///
/// # 戻り値
/// 組み立てられたアプリケーション状態
pub fn bootstrap() -> AppResult<AppState> {
    info!("アプリケーション初期化を開始します...");

    // APIクライアントを作成
    let api = Arc::new(ApiClient::new()?);

    // セッションコンテキストを初期化（保存済みセッションの復元を含む）
    let store = SessionStore::new(&SessionConfig::from_env())?;
    let session = Arc::new(SessionContext::initialize(store));

    // 認証サービスを初期化
    let auth = AuthService::new(api.clone(), session.clone());

    // 払い戻しライフサイクルマネージャーを初期化
    let reimbursements = LifecycleManager::new(
        ReimbursementRepository::new(api.clone()),
        session.clone(),
    );

    // メンバーディレクトリを初期化
    let members = MemberRepository::new(api);

    info!(
        "アプリケーション初期化が完了しました: authenticated={}",
        session.is_authenticated()
    );

    Ok(AppState {
        session,
        auth,
        reimbursements,
        members,
    })
}
