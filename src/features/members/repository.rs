/// メンバーRemote Storeアダプター
///
/// チームメンバーの読み取り専用ディレクトリ（/usuarios）を提供します。
use crate::features::members::models::{Member, MemberWire};
use crate::shared::api_client::ApiClient;
use crate::shared::errors::AppResult;
use log::info;
use std::sync::Arc;

/// メンバーエンドポイントのパス
const ENDPOINT: &str = "/usuarios";

/// メンバーリポジトリ
#[derive(Clone)]
pub struct MemberRepository {
    /// APIクライアント
    api: Arc<ApiClient>,
}

impl MemberRepository {
    /// 新しいリポジトリを作成する
    ///
    /// # 引数
    /// * `api` - APIクライアント
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// 全メンバーを取得する
    ///
    /// # 引数
    /// * `token` - 認証トークン
    pub async fn list(&self, token: &str) -> AppResult<Vec<Member>> {
        let wires: Vec<MemberWire> = self.api.get(ENDPOINT, Some(token)).await?;
        let members: Vec<Member> = wires.into_iter().map(MemberWire::into_canonical).collect();

        info!("メンバー一覧を取得しました: count={}", members.len());
        Ok(members)
    }

    /// IDでメンバーを取得する
    ///
    /// # 引数
    /// * `id` - メンバーID
    /// * `token` - 認証トークン
    pub async fn get(&self, id: &str, token: &str) -> AppResult<Member> {
        let endpoint = format!("{ENDPOINT}/{id}");
        let wire: MemberWire = self.api.get(&endpoint, Some(token)).await?;
        Ok(wire.into_canonical())
    }
}
