/// セッションコンテキストと永続化
///
/// 資格情報（アクセストークン）とアクターのプロフィールを保持する
/// 明示的なセッションオブジェクトを提供します。ライフサイクルマネージャーと
/// 認証サービスはこのコンテキスト経由でのみセッションへアクセスし、
/// 呼び出し箇所に散在するストレージ読み取りは行いません。
///
/// トークンは保存時にAES-256-GCMで暗号化されます。
use crate::features::auth::models::{SessionData, UserProfile};
use crate::shared::config::environment::SessionConfig;
use crate::shared::errors::{AppError, AppResult};
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose, Engine as _};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

/// セッション保存のキー定義
///
/// ダッシュボードが従来ローカルストレージで使用してきた固定キーを踏襲します。
pub struct SessionStorageKeys;

impl SessionStorageKeys {
    /// アクセストークンのキー
    pub const AUTH_TOKEN: &'static str = "authToken";
    /// ユーザーIDのキー
    pub const USER_ID: &'static str = "userId";
}

/// ディスクに保存されるセッション表現
///
/// トークンは暗号化済みのbase64文字列として保存されます。
#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    #[serde(rename = "authToken")]
    auth_token: String,
    #[serde(rename = "userId")]
    user_id: String,
    profile: UserProfile,
}

/// セッションの永続化を担うストア
pub struct SessionStore {
    /// セッションファイルのパス
    path: PathBuf,
    /// 暗号化キー（パスフレーズのSHA-256ダイジェスト）
    encryption_key: [u8; 32],
}

impl SessionStore {
    /// 既定の保存先（ユーザー設定ディレクトリ）でストアを作成する
    ///
    /// # 引数
    /// * `config` - セッション設定（暗号化パスフレーズ）
    pub fn new(config: &SessionConfig) -> AppResult<Self> {
        let base_dir = dirs::config_dir()
            .ok_or_else(|| AppError::session("設定ディレクトリを特定できませんでした"))?;
        Ok(Self::with_path(
            base_dir.join("engnet").join("session.json"),
            config,
        ))
    }

    /// 保存先パスを指定してストアを作成する（テスト用）
    ///
    /// # 引数
    /// * `path` - セッションファイルのパス
    /// * `config` - セッション設定
    pub fn with_path(path: PathBuf, config: &SessionConfig) -> Self {
        let digest = Sha256::digest(config.encryption_key.as_bytes());
        let mut encryption_key = [0u8; 32];
        encryption_key.copy_from_slice(&digest);

        Self {
            path,
            encryption_key,
        }
    }

    /// セッションを保存する
    ///
    /// # 引数
    /// * `session` - 保存するセッション内容
    pub fn save(&self, session: &SessionData) -> AppResult<()> {
        let stored = StoredSession {
            auth_token: self.encrypt_token(&session.token)?,
            user_id: session.profile.id.to_string(),
            profile: session.profile.clone(),
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(&stored)?;
        fs::write(&self.path, json)?;

        log::info!("セッションを保存しました: user_id={}", session.profile.id);
        Ok(())
    }

    /// 保存されたセッションを読み込む
    ///
    /// # 戻り値
    /// セッション内容（保存されていない場合はNone）
    pub fn load(&self) -> AppResult<Option<SessionData>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.path)?;
        let stored: StoredSession = serde_json::from_str(&json)?;
        let token = self.decrypt_token(&stored.auth_token)?;

        log::debug!("セッションを復元しました: user_id={}", stored.user_id);
        Ok(Some(SessionData {
            token,
            profile: stored.profile,
        }))
    }

    /// 保存されたセッションを破棄する
    pub fn clear(&self) -> AppResult<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            log::info!("保存されたセッションを破棄しました");
        }
        Ok(())
    }

    /// トークンを暗号化する
    ///
    /// ランダムな12バイトのナンスと暗号文を結合してbase64エンコードします。
    fn encrypt_token(&self, token: &str) -> AppResult<String> {
        let cipher = Aes256Gcm::new_from_slice(&self.encryption_key)
            .map_err(|e| AppError::session(format!("暗号化キーが不正です: {e}")))?;

        let mut nonce_bytes = [0u8; 12];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, token.as_bytes())
            .map_err(|e| AppError::session(format!("トークン暗号化エラー: {e}")))?;

        let mut token_bytes = nonce_bytes.to_vec();
        token_bytes.extend_from_slice(&ciphertext);
        Ok(general_purpose::STANDARD.encode(&token_bytes))
    }

    /// トークンを復号化する
    fn decrypt_token(&self, encrypted: &str) -> AppResult<String> {
        let token_bytes = general_purpose::STANDARD
            .decode(encrypted)
            .map_err(|e| AppError::session(format!("Base64デコードエラー: {e}")))?;

        if token_bytes.len() < 12 {
            return Err(AppError::session("トークンが短すぎます"));
        }

        let (nonce_bytes, ciphertext) = token_bytes.split_at(12);
        let nonce = Nonce::from_slice(nonce_bytes);

        let cipher = Aes256Gcm::new_from_slice(&self.encryption_key)
            .map_err(|e| AppError::session(format!("暗号化キーが不正です: {e}")))?;

        let plaintext = cipher
            .decrypt(nonce, ciphertext)
            .map_err(|e| AppError::session(format!("トークン復号化エラー: {e}")))?;

        String::from_utf8(plaintext).map_err(|e| AppError::session(format!("UTF-8変換エラー: {e}")))
    }
}

/// 実行中セッションのコンテキスト
///
/// 全ての発信呼び出しが参照する読み取り専用の共有状態です。
/// 変更はログイン・ログアウト・リフレッシュのフローに限られます。
pub struct SessionContext {
    store: SessionStore,
    current: RwLock<Option<SessionData>>,
}

impl SessionContext {
    /// ストアから保存済みセッションを復元してコンテキストを初期化する
    ///
    /// # 引数
    /// * `store` - セッションストア
    pub fn initialize(store: SessionStore) -> Self {
        // 復元に失敗した場合は未ログイン状態から開始する
        let current = match store.load() {
            Ok(session) => session,
            Err(e) => {
                log::warn!("セッション復元に失敗しました: {e}");
                None
            }
        };

        Self {
            store,
            current: RwLock::new(current),
        }
    }

    /// セッションを確立して永続化する
    ///
    /// # 引数
    /// * `session` - ログイン・リフレッシュで得たセッション内容
    pub fn establish(&self, session: SessionData) -> AppResult<()> {
        self.store.save(&session)?;
        let mut current = self
            .current
            .write()
            .map_err(|_| AppError::concurrency("セッションロックの取得に失敗しました"))?;
        *current = Some(session);
        Ok(())
    }

    /// 永続化された状態からセッションを再読込する
    pub fn refresh(&self) -> AppResult<()> {
        let session = self.store.load()?;
        let mut current = self
            .current
            .write()
            .map_err(|_| AppError::concurrency("セッションロックの取得に失敗しました"))?;
        *current = session;
        Ok(())
    }

    /// セッションを破棄する（メモリと永続化の両方）
    ///
    /// 401受信時とログアウト時に呼ばれます。破棄後の呼び出しは
    /// 資格情報なしとなり、ログイン画面への誘導が必要です。
    pub fn clear(&self) -> AppResult<()> {
        self.store.clear()?;
        let mut current = self
            .current
            .write()
            .map_err(|_| AppError::concurrency("セッションロックの取得に失敗しました"))?;
        *current = None;
        Ok(())
    }

    /// 現在のセッション内容を取得する
    pub fn current(&self) -> Option<SessionData> {
        self.current.read().ok().and_then(|guard| guard.clone())
    }

    /// 現在のアクセストークンを取得する
    pub fn token(&self) -> Option<String> {
        self.current().map(|session| session.token)
    }

    /// 現在のアクターのプロフィールを取得する
    pub fn profile(&self) -> Option<UserProfile> {
        self.current().map(|session| session.profile)
    }

    /// 認証済みかどうかを判定
    pub fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }

    /// 現在のアクターが管理者かどうかを判定
    pub fn is_admin(&self) -> bool {
        self.profile()
            .map(|profile| profile.role.is_admin())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::models::Role;
    use tempfile::TempDir;

    fn test_config() -> SessionConfig {
        SessionConfig {
            encryption_key: "chave_de_teste".to_string(),
        }
    }

    fn test_session() -> SessionData {
        SessionData {
            token: "jwt-token-abc".to_string(),
            profile: UserProfile {
                id: 7,
                name: "Ana Oliveira".to_string(),
                email: "ana@engnet.com.br".to_string(),
                role: Role::Admin,
            },
        }
    }

    fn store_in(dir: &TempDir) -> SessionStore {
        SessionStore::with_path(dir.path().join("session.json"), &test_config())
    }

    #[test]
    fn test_save_load_roundtrip() {
        // 保存・復元のラウンドトリップテスト
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.save(&test_session()).unwrap();
        let loaded = store.load().unwrap().unwrap();

        assert_eq!(loaded, test_session());
    }

    #[test]
    fn test_token_encrypted_at_rest() {
        // 保存ファイルに平文トークンが含まれないことを確認
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&test_session()).unwrap();

        let raw = std::fs::read_to_string(dir.path().join("session.json")).unwrap();
        assert!(!raw.contains("jwt-token-abc"));
        assert!(raw.contains(SessionStorageKeys::AUTH_TOKEN));
        assert!(raw.contains(SessionStorageKeys::USER_ID));
    }

    #[test]
    fn test_load_without_file() {
        // ファイルがない場合はNone
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_clear_removes_session() {
        // 破棄後は復元できない
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&test_session()).unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_decrypt_with_wrong_key_fails() {
        // 異なるキーでは復号できない
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&test_session()).unwrap();

        let other = SessionStore::with_path(
            dir.path().join("session.json"),
            &SessionConfig {
                encryption_key: "outra_chave".to_string(),
            },
        );
        assert!(other.load().is_err());
    }

    #[test]
    fn test_context_establish_and_clear() {
        // コンテキストの確立・破棄テスト
        let dir = TempDir::new().unwrap();
        let context = SessionContext::initialize(store_in(&dir));

        assert!(!context.is_authenticated());
        assert!(!context.is_admin());

        context.establish(test_session()).unwrap();
        assert!(context.is_authenticated());
        assert!(context.is_admin());
        assert_eq!(context.token().as_deref(), Some("jwt-token-abc"));

        context.clear().unwrap();
        assert!(!context.is_authenticated());
        assert!(context.token().is_none());
    }

    #[test]
    fn test_context_restores_persisted_session() {
        // 再起動相当：永続化済みセッションが初期化時に復元される
        let dir = TempDir::new().unwrap();
        store_in(&dir).save(&test_session()).unwrap();

        let context = SessionContext::initialize(store_in(&dir));
        assert!(context.is_authenticated());
        assert_eq!(context.profile().unwrap().name, "Ana Oliveira");
    }

    #[test]
    fn test_context_refresh_rereads_store() {
        // refreshは永続化された状態を再読込する
        let dir = TempDir::new().unwrap();
        let context = SessionContext::initialize(store_in(&dir));
        assert!(!context.is_authenticated());

        // 別経路で保存された状態を取り込む
        store_in(&dir).save(&test_session()).unwrap();
        context.refresh().unwrap();
        assert!(context.is_authenticated());
    }
}
