use thiserror::Error;

/// アプリケーション全体で使用される統一エラー型
///
/// 払い戻しライフサイクルの各操作はこの型でエラーを報告します。
/// バリデーション・権限・状態遷移・リモート通信のエラーを区別し、
/// 発行元のコンポーネント境界でユーザー向け通知に変換されます。
#[derive(Debug, Error)]
pub enum AppError {
    /// バリデーション関連のエラー（ネットワーク到達前に検出）
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// 認証エラー（資格情報の欠落・期限切れ、ログイン画面への誘導が必要）
    #[error("認証エラー: {0}")]
    Auth(String),

    /// 権限エラー（アクターにロール・所有権がない操作）
    #[error("権限エラー: {0}")]
    Forbidden(String),

    /// 状態遷移エラー（ステータスの前提条件を満たさない操作）
    #[error("状態遷移エラー: {0}")]
    InvalidTransition(String),

    /// 競合エラー（依存データによる削除拒否など、リモート側の競合）
    #[error("競合エラー: {0}")]
    Conflict(String),

    /// タイムアウトエラー（応答待ちが上限を超過）
    #[error("タイムアウトエラー: {0}")]
    Timeout(String),

    /// リモートサーバーエラー（その他のネットワーク・サーバー障害）
    #[error("リモートエラー: {0}")]
    Remote(String),

    /// リソースが見つからない場合のエラー
    #[error("リソースが見つかりません: {0}")]
    NotFound(String),

    /// セッション保存・復元のエラー
    #[error("セッションエラー: {0}")]
    Session(String),

    /// 設定関連のエラー
    #[error("設定エラー: {0}")]
    Configuration(String),

    /// 並行処理関連のエラー（同一レコードへの多重ミューテーションなど）
    #[error("並行処理エラー: {0}")]
    Concurrency(String),

    /// I/O関連のエラー
    #[error("I/Oエラー: {0}")]
    Io(#[from] std::io::Error),

    /// JSON解析エラー
    #[error("JSON解析エラー: {0}")]
    Json(#[from] serde_json::Error),
}

/// エラーの重要度を表す列挙型
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ErrorSeverity {
    /// 低重要度（ユーザー入力エラーなど）
    Low,
    /// 中重要度（外部サービス一時的エラーなど）
    Medium,
    /// 高重要度（設定エラーなど）
    High,
    /// 最重要（認証・セッションエラーなど）
    Critical,
}

impl AppError {
    /// ユーザーに表示するためのメッセージを取得
    ///
    /// ダッシュボードの通知表示にそのまま渡せるポルトガル語メッセージを返します。
    ///
    /// # 戻り値
    /// ユーザーに表示可能なエラーメッセージ
    pub fn user_message(&self) -> &str {
        match self {
            AppError::Validation(msg) => msg,
            AppError::Auth(_) => "Sessão expirada. Faça login novamente.",
            AppError::Forbidden(_) => "Você não tem permissão para executar esta ação.",
            AppError::InvalidTransition(_) => {
                "Esta solicitação não está mais pendente. Atualize a lista e tente novamente."
            }
            AppError::Conflict(_) => {
                "Não foi possível excluir: o reembolso pode ter registros vinculados."
            }
            AppError::Timeout(_) => "O servidor demorou para responder. Tente novamente.",
            AppError::Remote(_) => "Erro de comunicação com o servidor. Tente novamente.",
            AppError::NotFound(msg) => msg,
            AppError::Session(_) => "Não foi possível acessar a sessão salva.",
            AppError::Configuration(_) => "Erro de configuração da aplicação.",
            AppError::Concurrency(_) => "Aguarde a operação anterior terminar.",
            AppError::Io(_) => "Erro de acesso a arquivos locais.",
            AppError::Json(_) => "Erro ao interpretar os dados recebidos.",
        }
    }

    /// エラーの詳細情報を取得
    ///
    /// # 戻り値
    /// エラーの詳細情報（ログ出力用）
    pub fn details(&self) -> String {
        format!("{self}")
    }

    /// エラーの重要度を取得
    ///
    /// # 戻り値
    /// エラーの重要度レベル
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AppError::Validation(_) => ErrorSeverity::Low,
            AppError::Forbidden(_) => ErrorSeverity::Low,
            AppError::InvalidTransition(_) => ErrorSeverity::Low,
            AppError::NotFound(_) => ErrorSeverity::Low,
            AppError::Conflict(_) => ErrorSeverity::Medium,
            AppError::Timeout(_) => ErrorSeverity::Medium,
            AppError::Remote(_) => ErrorSeverity::Medium,
            AppError::Concurrency(_) => ErrorSeverity::Medium,
            AppError::Io(_) => ErrorSeverity::Medium,
            AppError::Json(_) => ErrorSeverity::Medium,
            AppError::Configuration(_) => ErrorSeverity::High,
            AppError::Auth(_) => ErrorSeverity::Critical,
            AppError::Session(_) => ErrorSeverity::Critical,
        }
    }

    /// リトライなしでユーザーの再操作により回復可能かどうか
    ///
    /// どのカテゴリも自動リトライは行わず、再試行は常にユーザーの
    /// 明示的な操作とします。
    ///
    /// # 戻り値
    /// ユーザーの手動再試行が意味を持つ場合はtrue
    pub fn is_retryable_by_user(&self) -> bool {
        matches!(
            self,
            AppError::Timeout(_) | AppError::Remote(_) | AppError::InvalidTransition(_)
        )
    }

    /// バリデーションエラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `message` - バリデーションエラーメッセージ
    pub fn validation<S: Into<String>>(message: S) -> Self {
        AppError::Validation(message.into())
    }

    /// 認証エラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `message` - 認証エラーメッセージ
    pub fn auth<S: Into<String>>(message: S) -> Self {
        AppError::Auth(message.into())
    }

    /// 権限エラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `message` - 権限エラーメッセージ
    pub fn forbidden<S: Into<String>>(message: S) -> Self {
        AppError::Forbidden(message.into())
    }

    /// 状態遷移エラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `message` - 状態遷移エラーメッセージ
    pub fn invalid_transition<S: Into<String>>(message: S) -> Self {
        AppError::InvalidTransition(message.into())
    }

    /// 競合エラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `message` - 競合エラーメッセージ
    pub fn conflict<S: Into<String>>(message: S) -> Self {
        AppError::Conflict(message.into())
    }

    /// リモートエラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `message` - リモートエラーメッセージ
    pub fn remote<S: Into<String>>(message: S) -> Self {
        AppError::Remote(message.into())
    }

    /// リソース未発見エラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `resource` - 見つからなかったリソース名
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        AppError::NotFound(format!("{} não encontrado", resource.into()))
    }

    /// セッションエラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `message` - セッションエラーメッセージ
    pub fn session<S: Into<String>>(message: S) -> Self {
        AppError::Session(message.into())
    }

    /// 設定エラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `message` - 設定エラーメッセージ
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        AppError::Configuration(message.into())
    }

    /// 並行処理エラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `message` - 並行処理エラーメッセージ
    pub fn concurrency<S: Into<String>>(message: S) -> Self {
        AppError::Concurrency(message.into())
    }
}

/// AppErrorからStringへの変換（UI境界での通知表示のため）
impl From<AppError> for String {
    fn from(error: AppError) -> Self {
        error.user_message().to_string()
    }
}

/// Result型のエイリアス（アプリケーション全体で使用）
pub type AppResult<T> = Result<T, AppError>;
