/// 汎用APIクライアント
///
/// Remote Store（バックエンドREST API）との通信を行う汎用的なクライアント。
/// 払い戻し、メンバー、認証のエンドポイントで使用されます。
///
/// 自動リトライは一切行いません。再試行は常にユーザーの明示的な操作として
/// 発行されます。
use crate::shared::config::environment::ApiConfig;
use crate::shared::errors::{AppError, AppResult};
use log::{debug, info, warn};
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// APIクライアント設定
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        let api_config = ApiConfig::default();
        Self {
            base_url: api_config.base_url,
            timeout_seconds: api_config.timeout_seconds,
        }
    }
}

impl ApiClientConfig {
    /// 環境設定からAPIクライアント設定を作成
    pub fn from_env() -> Self {
        let api_config = ApiConfig::from_env();
        Self {
            base_url: api_config.base_url,
            timeout_seconds: api_config.timeout_seconds,
        }
    }
}

/// APIサーバーからのエラーレスポンスボディ
///
/// バックエンドは失敗時に `{"message": "..."}` を返します。
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: Option<String>,
}

/// HTTPステータスコードをアプリケーションエラーに対応付ける
///
/// # 引数
/// * `status` - HTTPステータスコード
/// * `message` - レスポンスボディから取得したメッセージ（あれば）
///
/// # 対応付け
/// * 401 -> Auth（資格情報の破棄とログイン誘導が必要）
/// * 403 -> Forbidden
/// * 404 -> NotFound
/// * 409 -> Conflict
/// * その他の失敗 -> Remote
pub fn error_from_status(status: u16, message: Option<&str>) -> AppError {
    let detail = message.unwrap_or("sem detalhes");
    match status {
        401 => AppError::auth(format!("HTTP 401: {detail}")),
        403 => AppError::forbidden(format!("HTTP 403: {detail}")),
        404 => AppError::not_found("Recurso"),
        409 => AppError::conflict(format!("HTTP 409: {detail}")),
        _ => AppError::remote(format!("HTTP {status}: {detail}")),
    }
}

/// 汎用APIクライアント
pub struct ApiClient {
    client: Client,
    config: ApiClientConfig,
}

impl ApiClient {
    /// 環境設定からAPIクライアントを作成
    pub fn new() -> AppResult<Self> {
        let config = ApiClientConfig::from_env();
        Self::new_with_config(config)
    }

    /// 設定を指定してAPIクライアントを作成
    ///
    /// # 引数
    /// * `config` - クライアント設定（ベースURLはこの時点で検証される）
    pub fn new_with_config(config: ApiClientConfig) -> AppResult<Self> {
        // ベースURLの形式を検証
        Url::parse(&config.base_url)
            .map_err(|e| AppError::configuration(format!("ベースURLが不正です: {e}")))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::configuration(format!("HTTPクライアント初期化失敗: {e}")))?;

        Ok(Self { client, config })
    }

    /// APIサーバーがlocalhostかどうかを判定
    pub fn is_localhost(&self) -> bool {
        self.config.base_url.contains("localhost") || self.config.base_url.contains("127.0.0.1")
    }

    /// GETリクエストを送信
    ///
    /// # 引数
    /// * `endpoint` - エンドポイントパス（"/reembolsos"など）
    /// * `auth_token` - 認証トークン（あればBearerヘッダーとして付与）
    pub async fn get<T>(&self, endpoint: &str, auth_token: Option<&str>) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        debug!("GETリクエスト送信: endpoint={endpoint}");

        let url = format!("{}{endpoint}", self.config.base_url);
        let mut request = self.client.get(&url);

        if let Some(token) = auth_token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let response = self.send(request, "GET", endpoint).await?;
        self.parse_success(response, "GET", endpoint).await
    }

    /// POSTリクエストを送信
    ///
    /// # 引数
    /// * `endpoint` - エンドポイントパス
    /// * `body` - JSONボディとして送信する値
    /// * `auth_token` - 認証トークン
    pub async fn post<B, T>(
        &self,
        endpoint: &str,
        body: &B,
        auth_token: Option<&str>,
    ) -> AppResult<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        debug!("POSTリクエスト送信: endpoint={endpoint}");

        let url = format!("{}{endpoint}", self.config.base_url);
        let mut request = self.client.post(&url).json(body);

        if let Some(token) = auth_token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let response = self.send(request, "POST", endpoint).await?;
        self.parse_success(response, "POST", endpoint).await
    }

    /// PATCHリクエストを送信
    ///
    /// # 引数
    /// * `endpoint` - エンドポイントパス
    /// * `body` - 部分更新のJSONボディ
    /// * `auth_token` - 認証トークン
    pub async fn patch<B, T>(
        &self,
        endpoint: &str,
        body: &B,
        auth_token: Option<&str>,
    ) -> AppResult<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        debug!("PATCHリクエスト送信: endpoint={endpoint}");

        let url = format!("{}{endpoint}", self.config.base_url);
        let mut request = self.client.patch(&url).json(body);

        if let Some(token) = auth_token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let response = self.send(request, "PATCH", endpoint).await?;
        self.parse_success(response, "PATCH", endpoint).await
    }

    /// DELETEリクエストを送信
    ///
    /// DELETEは204 No Contentを返すため、成功ステータスのみをチェックします。
    ///
    /// # 引数
    /// * `endpoint` - エンドポイントパス
    /// * `auth_token` - 認証トークン
    pub async fn delete(&self, endpoint: &str, auth_token: Option<&str>) -> AppResult<()> {
        debug!("DELETEリクエスト送信: endpoint={endpoint}");

        let url = format!("{}{endpoint}", self.config.base_url);
        let mut request = self.client.delete(&url);

        if let Some(token) = auth_token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let response = self.send(request, "DELETE", endpoint).await?;
        if response.status().is_success() {
            info!("DELETEリクエスト成功: endpoint={endpoint}");
            return Ok(());
        }

        Err(self.handle_error_response(response, "DELETE", endpoint).await)
    }

    /// リクエストを送信し、トランスポート層の失敗を分類する
    ///
    /// タイムアウトはTimeout、それ以外の通信障害はRemoteとして報告します。
    /// ローカル状態のコミットは成功レスポンス確認後にのみ行われるため、
    /// タイムアウト時に部分的な状態が残ることはありません。
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        method: &str,
        endpoint: &str,
    ) -> AppResult<Response> {
        match request.send().await {
            Ok(response) => Ok(response),
            Err(e) if e.is_timeout() => {
                warn!("APIリクエストがタイムアウトしました: {method} {endpoint}");
                Err(AppError::Timeout(format!(
                    "{method} {endpoint}: {}s超過",
                    self.config.timeout_seconds
                )))
            }
            Err(e) => {
                warn!("APIリクエスト失敗: {method} {endpoint}: {e}");
                Err(AppError::remote(format!(
                    "APIサーバーへの接続に失敗しました: {e}"
                )))
            }
        }
    }

    /// 成功レスポンスのボディを解析する
    async fn parse_success<T>(
        &self,
        response: Response,
        method: &str,
        endpoint: &str,
    ) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        if response.status().is_success() {
            let result: T = response
                .json()
                .await
                .map_err(|e| AppError::remote(format!("レスポンス解析エラー: {e}")))?;
            info!("{method}リクエスト成功: endpoint={endpoint}");
            return Ok(result);
        }

        Err(self.handle_error_response(response, method, endpoint).await)
    }

    /// エラーレスポンスを処理し、ステータスコードに応じたエラーへ変換する
    async fn handle_error_response(
        &self,
        response: Response,
        method: &str,
        endpoint: &str,
    ) -> AppError {
        let status = response.status();
        let status_code = status.as_u16();

        let response_text = response.text().await.unwrap_or_default();

        // バックエンドの構造化メッセージ（{"message": "..."}）の解析を試行
        let message = serde_json::from_str::<ErrorBody>(&response_text)
            .ok()
            .and_then(|body| body.message)
            .or_else(|| {
                StatusCode::from_u16(status_code)
                    .ok()
                    .and_then(|s| s.canonical_reason().map(|r| r.to_string()))
            });

        warn!(
            "APIサーバーエラー: {method} {endpoint}: status={status_code}, message={}",
            message.as_deref().unwrap_or("sem detalhes")
        );

        error_from_status(status_code, message.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_from_status_mapping() {
        // ステータスコードの対応付けテスト
        assert!(matches!(
            error_from_status(401, Some("token expirado")),
            AppError::Auth(_)
        ));
        assert!(matches!(
            error_from_status(403, None),
            AppError::Forbidden(_)
        ));
        assert!(matches!(
            error_from_status(404, None),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            error_from_status(409, Some("registros vinculados")),
            AppError::Conflict(_)
        ));
        assert!(matches!(error_from_status(500, None), AppError::Remote(_)));
        assert!(matches!(error_from_status(502, None), AppError::Remote(_)));
    }

    #[test]
    fn test_error_from_status_carries_detail() {
        // ボディメッセージがエラー詳細に含まれる
        let error = error_from_status(500, Some("falha interna"));
        assert!(error.details().contains("falha interna"));
        assert!(error.details().contains("500"));
    }

    #[test]
    fn test_new_with_config_rejects_invalid_base_url() {
        // 不正なベースURLは設定エラー
        let config = ApiClientConfig {
            base_url: "não é uma url".to_string(),
            timeout_seconds: 30,
        };
        assert!(matches!(
            ApiClient::new_with_config(config),
            Err(AppError::Configuration(_))
        ));
    }

    #[test]
    fn test_is_localhost() {
        let client = ApiClient::new_with_config(ApiClientConfig::default()).unwrap();
        assert!(client.is_localhost());

        let client = ApiClient::new_with_config(ApiClientConfig {
            base_url: "https://api.engnet.com.br".to_string(),
            timeout_seconds: 30,
        })
        .unwrap();
        assert!(!client.is_localhost());
    }

    #[test]
    fn test_error_body_parsing() {
        // バックエンドのエラーボディ解析テスト
        let body: ErrorBody = serde_json::from_str(r#"{"message":"Erro ao criar reembolso"}"#).unwrap();
        assert_eq!(body.message.as_deref(), Some("Erro ao criar reembolso"));

        let body: ErrorBody = serde_json::from_str("{}").unwrap();
        assert!(body.message.is_none());
    }
}
