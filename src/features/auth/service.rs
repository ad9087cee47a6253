/// 認証サービス
///
/// APIサーバーのメール・パスワード認証（/auth/login、/auth/logout、
/// /auth/refresh）を呼び出し、得られた資格情報とプロフィールを
/// セッションコンテキスト経由で保持します。
use crate::features::auth::models::{LoginRequest, LoginResponse, SessionData, UserProfile};
use crate::features::auth::session::SessionContext;
use crate::shared::api_client::ApiClient;
use crate::shared::errors::{AppError, AppResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

/// メールアドレスの形式チェック用パターン
static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("メール正規表現が不正です"));

/// メールアドレスの形式を検証する
///
/// # 引数
/// * `email` - 検証対象のメールアドレス
pub fn validate_email(email: &str) -> AppResult<()> {
    if !EMAIL_PATTERN.is_match(email) {
        return Err(AppError::validation("Informe um e-mail válido."));
    }
    Ok(())
}

/// 認証サービス
#[derive(Clone)]
pub struct AuthService {
    /// APIクライアント
    api: Arc<ApiClient>,
    /// セッションコンテキスト
    session: Arc<SessionContext>,
}

impl AuthService {
    /// 新しいAuthServiceを作成する
    ///
    /// # 引数
    /// * `api` - APIクライアント
    /// * `session` - セッションコンテキスト
    pub fn new(api: Arc<ApiClient>, session: Arc<SessionContext>) -> Self {
        Self { api, session }
    }

    /// メールとパスワードでログインする
    ///
    /// 成功時は資格情報とプロフィールがセッションコンテキストへ保存されます。
    ///
    /// # 引数
    /// * `email` - メールアドレス
    /// * `password` - パスワード
    ///
    /// # 戻り値
    /// ログインしたアクターのプロフィール
    pub async fn login(&self, email: &str, password: &str) -> AppResult<UserProfile> {
        validate_email(email)?;
        if password.is_empty() {
            return Err(AppError::validation("Informe a senha."));
        }

        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let response: LoginResponse = self.api.post("/auth/login", &request, None).await?;
        let profile = response.user.into_profile();

        self.session.establish(SessionData {
            token: response.access_token,
            profile: profile.clone(),
        })?;

        log::info!("ログイン成功: user_id={}", profile.id);
        Ok(profile)
    }

    /// ログアウトする
    ///
    /// リモートのログアウトが失敗してもローカルのセッションは必ず破棄します。
    pub async fn logout(&self) -> AppResult<()> {
        let token = self.session.token();

        let remote_result: AppResult<serde_json::Value> = self
            .api
            .post("/auth/logout", &serde_json::json!({}), token.as_deref())
            .await;

        if let Err(e) = remote_result {
            log::warn!("リモートログアウトに失敗しました: {e}");
        }

        self.session.clear()?;
        log::info!("ログアウトしました");
        Ok(())
    }

    /// アクセストークンをリフレッシュする
    ///
    /// 失敗時は保存済みの資格情報を破棄します（期限切れトークンを
    /// 持ち続けないため）。
    ///
    /// # 戻り値
    /// 更新されたプロフィール
    pub async fn refresh(&self) -> AppResult<UserProfile> {
        let token = self.session.token();

        let response: AppResult<LoginResponse> = self
            .api
            .post("/auth/refresh", &serde_json::json!({}), token.as_deref())
            .await;

        match response {
            Ok(response) => {
                let profile = response.user.into_profile();
                self.session.establish(SessionData {
                    token: response.access_token,
                    profile: profile.clone(),
                })?;
                log::debug!("トークンをリフレッシュしました: user_id={}", profile.id);
                Ok(profile)
            }
            Err(e) => {
                log::warn!("トークンリフレッシュに失敗しました。セッションを破棄します: {e}");
                self.session.clear()?;
                Err(AppError::auth("sessão expirada"))
            }
        }
    }
}
