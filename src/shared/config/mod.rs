/// 設定管理モジュール
///
/// 実行環境の判定、環境変数の読み込み、ログシステムの初期化、
/// APIクライアント・セッション保存の設定を提供します。
pub mod environment;

pub use environment::{
    get_environment, initialize_logging_system, load_environment_variables, ApiConfig,
    Environment, EnvironmentConfig, SessionConfig,
};
