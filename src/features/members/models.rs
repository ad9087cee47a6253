use crate::features::auth::models::Role;
use serde::{Deserialize, Serialize};

/// チームメンバーの正準エンティティ
///
/// 払い戻し申請の所有者情報と申請者表示名の出どころです。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// メンバーID
    pub id: String,
    /// 氏名
    pub name: String,
    /// メールアドレス
    pub email: String,
    /// 電話番号
    pub phone: Option<String>,
    /// 部署
    pub department: Option<String>,
    /// 役職
    pub position: Option<String>,
    /// ロール
    pub role: Role,
}

/// バックエンドのメンバー表現（GET /usuarios）
#[derive(Debug, Clone, Deserialize)]
pub struct MemberWire {
    pub id: String,
    pub nome: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub departamento: Option<String>,
    pub cargo: Option<String>,
    pub role: Option<String>,
}

impl MemberWire {
    /// 正準形へ変換する
    pub fn into_canonical(self) -> Member {
        let name = self
            .nome
            .or(self.name)
            .unwrap_or_else(|| "Desconhecido".to_string());

        Member {
            id: self.id,
            name,
            email: self.email.unwrap_or_default(),
            phone: self.telefone,
            department: self.departamento,
            position: self.cargo,
            role: Role::from_wire(self.role.as_deref()),
        }
    }
}
