use serde::{Deserialize, Serialize};

/// アクターのロールを表す列挙型
///
/// バックエンドはロールを自由形式の文字列で返すため、
/// 大文字小文字を区別せずに解釈します（"ADMIN"・"admin"はどちらもAdmin）。
/// Admin以外の値はすべて一般メンバーとして扱われます。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// 管理者（承認・却下・削除の権限を持つ）
    Admin,
    /// 一般メンバー（自分の申請の作成・編集のみ）
    Member,
}

impl Role {
    /// バックエンドのロール文字列からロールを判定する
    ///
    /// # 引数
    /// * `value` - バックエンドのrole文字列（None可）
    pub fn from_wire(value: Option<&str>) -> Self {
        match value {
            Some(role) if role.eq_ignore_ascii_case("admin") => Role::Admin,
            _ => Role::Member,
        }
    }

    /// 管理者かどうかを判定
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// ログイン中のアクターのプロフィール
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// ユーザーID
    pub id: i64,
    /// 表示名
    pub name: String,
    /// メールアドレス
    pub email: String,
    /// ロール
    pub role: Role,
}

/// バックエンドのユーザー表現
///
/// エンドポイントによって`name`と`nome`が揺れるため、両方を受け付けて
/// 正準形（UserProfile）への変換時に解決します。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserWire {
    pub id: i64,
    pub name: Option<String>,
    pub nome: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

impl UserWire {
    /// 正準形のプロフィールへ変換する
    ///
    /// `name`を優先し、なければ`nome`を使用します。
    pub fn into_profile(self) -> UserProfile {
        let name = self
            .name
            .or(self.nome)
            .unwrap_or_else(|| "Desconhecido".to_string());

        UserProfile {
            id: self.id,
            name,
            email: self.email.unwrap_or_default(),
            role: Role::from_wire(self.role.as_deref()),
        }
    }
}

/// ログインリクエストのボディ
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// ログイン・リフレッシュ成功時のレスポンス
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    /// アクセストークン
    #[serde(rename = "accessToken")]
    pub access_token: String,
    /// アクターのプロフィール
    pub user: UserWire,
}

/// 確立されたセッションの内容（トークン＋プロフィール）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    /// アクセストークン
    pub token: String,
    /// アクターのプロフィール
    pub profile: UserProfile,
}
