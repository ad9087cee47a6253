use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// 払い戻し申請のステータス
///
/// ライフサイクル: Rascunho（下書き）→ Pendente（審査待ち）→
/// Aprovado／Rejeitado（終端）。終端ステータスからの遷移は定義されません。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// 下書き（所有者が自由に編集可能）
    #[serde(rename = "Rascunho")]
    Draft,
    /// 審査待ち（管理者の承認・却下を待つ）
    #[serde(rename = "Pendente")]
    Pending,
    /// 承認済み（終端）
    #[serde(rename = "Aprovado")]
    Approved,
    /// 却下済み（終端）
    #[serde(rename = "Rejeitado")]
    Rejected,
}

impl Status {
    /// バックエンドのステータス文字列から変換する
    ///
    /// 大文字小文字を区別せず解釈し、未知の値は審査待ちとして扱います
    /// （一覧表示が1件の異常データで失敗しないため）。
    pub fn from_wire(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "rascunho" => Status::Draft,
            "pendente" => Status::Pending,
            "aprovado" => Status::Approved,
            "rejeitado" => Status::Rejected,
            _ => Status::Pending,
        }
    }

    /// バックエンドへ送信するステータス文字列
    pub fn wire_value(&self) -> &'static str {
        match self {
            Status::Draft => "Rascunho",
            Status::Pending => "Pendente",
            Status::Approved => "Aprovado",
            Status::Rejected => "Rejeitado",
        }
    }

    /// 終端ステータス（承認済み・却下済み）かどうか
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Approved | Status::Rejected)
    }

    /// 内容編集が定義されているステータスかどうか
    pub fn is_editable(&self) -> bool {
        matches!(self, Status::Draft | Status::Pending)
    }
}

/// 払い戻しのカテゴリ（固定セット）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// 燃料
    #[serde(rename = "Combustível")]
    Fuel,
    /// 食事
    #[serde(rename = "Alimentação")]
    Meals,
    /// 交通
    #[serde(rename = "Transporte")]
    Transport,
    /// 宿泊
    #[serde(rename = "Hospedagem")]
    Lodging,
    /// 事務用品
    #[serde(rename = "Material de Escritório")]
    OfficeSupplies,
    /// その他
    #[serde(rename = "Outros")]
    Other,
}

impl Category {
    /// バックエンドのカテゴリ文字列から変換する
    ///
    /// 旧データの別表記（"Material"、"Refeição"）も受け付け、
    /// 未知の値は「その他」として扱います。
    pub fn from_wire(value: &str) -> Self {
        match value {
            "Combustível" => Category::Fuel,
            "Alimentação" | "Refeição" => Category::Meals,
            "Transporte" => Category::Transport,
            "Hospedagem" => Category::Lodging,
            "Material de Escritório" | "Material" => Category::OfficeSupplies,
            _ => Category::Other,
        }
    }

    /// バックエンドへ送信するカテゴリ文字列
    pub fn wire_value(&self) -> &'static str {
        match self {
            Category::Fuel => "Combustível",
            Category::Meals => "Alimentação",
            Category::Transport => "Transporte",
            Category::Lodging => "Hospedagem",
            Category::OfficeSupplies => "Material de Escritório",
            Category::Other => "Outros",
        }
    }

    /// 選択肢として提示する全カテゴリ
    pub const ALL: [Category; 6] = [
        Category::Fuel,
        Category::Meals,
        Category::Transport,
        Category::Lodging,
        Category::OfficeSupplies,
        Category::Other,
    ];
}

/// 払い戻し申請の正準エンティティ
///
/// クレート内部はこの型のみに依存します。バックエンドのフィールド名の
/// 揺れはワイヤ型（ReimbursementWire）との変換で一度だけ解決されます。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reimbursement {
    /// レコードID
    pub id: String,
    /// 人間向けコード（"R001"など）
    pub code: String,
    /// 申請者（所有者）のユーザーID
    pub owner_id: Option<i64>,
    /// 申請者の表示名（所有アカウントに由来する非正規化フィールド）
    pub employee_name: String,
    /// カテゴリ
    pub category: Category,
    /// 説明（必須）
    pub description: String,
    /// 補足説明（任意）
    pub justification: Option<String>,
    /// 金額
    pub amount: f64,
    /// 支出日（費用が発生した日。作成日時とは別物）
    pub expense_date: Option<NaiveDate>,
    /// ステータス
    pub status: Status,
    /// 作成日時（システム付与）
    pub created_at: Option<DateTime<Utc>>,
    /// 最終更新日時（システム付与、受理されたミューテーションごとに更新）
    pub updated_at: Option<DateTime<Utc>>,
    /// 証憑書類のURL（任意。保存自体は外部の関心事）
    pub receipt_url: Option<String>,
}

/// バックエンドのユーザー参照（払い戻しレコードに埋め込まれる形）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerWire {
    pub id: Option<i64>,
    pub nome: Option<String>,
}

/// バックエンドの払い戻しレコード表現
///
/// 同一エンティティに対して複数の形（`valor`／`valorReembolso`、
/// `dataDespesa`／`dataReembolso`、`usuario.nome`／`nomeFuncionario`）が
/// 観測されるため、すべて受け付けて正準形への変換時に解決します。
#[derive(Debug, Clone, Deserialize)]
pub struct ReimbursementWire {
    pub id: String,
    #[serde(rename = "idReembolso", alias = "codigo")]
    pub codigo: Option<String>,
    #[serde(rename = "nomeFuncionario")]
    pub nome_funcionario: Option<String>,
    pub usuario: Option<OwnerWire>,
    pub categoria: Option<String>,
    pub descricao: Option<String>,
    pub justificativa: Option<String>,
    pub valor: Option<f64>,
    #[serde(rename = "valorReembolso")]
    pub valor_reembolso: Option<f64>,
    #[serde(rename = "dataDespesa")]
    pub data_despesa: Option<String>,
    #[serde(rename = "dataReembolso")]
    pub data_reembolso: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "dataCriacao")]
    pub data_criacao: Option<String>,
    #[serde(rename = "ultimaAtualizacao")]
    pub ultima_atualizacao: Option<String>,
    #[serde(rename = "comprovanteUrl")]
    pub comprovante_url: Option<String>,
}

/// ISO形式の日付文字列を日付へ変換する（"2025-06-10T..."も受け付ける）
fn parse_wire_date(value: &str) -> Option<NaiveDate> {
    let date_part = value.split('T').next().unwrap_or(value);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// RFC3339のタイムスタンプ文字列を変換する
fn parse_wire_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

impl ReimbursementWire {
    /// 正準形へ変換する
    ///
    /// 新しいフィールド名（`valor`、`dataDespesa`、`usuario.nome`）を優先し、
    /// 旧名はフォールバックとして使用します。
    pub fn into_canonical(self) -> Reimbursement {
        let employee_name = self
            .usuario
            .as_ref()
            .and_then(|u| u.nome.clone())
            .or(self.nome_funcionario)
            .unwrap_or_else(|| "Desconhecido".to_string());

        let owner_id = self.usuario.as_ref().and_then(|u| u.id);

        let amount = self.valor.or(self.valor_reembolso).unwrap_or(0.0);

        let expense_date = self
            .data_despesa
            .as_deref()
            .or(self.data_reembolso.as_deref())
            .and_then(parse_wire_date);

        Reimbursement {
            code: self.codigo.clone().unwrap_or_else(|| self.id.clone()),
            id: self.id,
            owner_id,
            employee_name,
            category: Category::from_wire(self.categoria.as_deref().unwrap_or("")),
            description: self.descricao.unwrap_or_default(),
            justification: self.justificativa,
            amount,
            expense_date,
            status: Status::from_wire(self.status.as_deref().unwrap_or("")),
            created_at: self.data_criacao.as_deref().and_then(parse_wire_timestamp),
            updated_at: self
                .ultima_atualizacao
                .as_deref()
                .and_then(parse_wire_timestamp),
            receipt_url: self.comprovante_url,
        }
    }
}

/// 新規申請の入力フィールド
///
/// 支出日はユーザー入力の生文字列のまま保持し、バリデーションで
/// 解釈可能性を検証してから送信します。
#[derive(Debug, Clone)]
pub struct ReimbursementDraft {
    pub category: Category,
    pub description: String,
    pub justification: Option<String>,
    pub amount: f64,
    pub expense_date: String,
}

/// 内容編集の入力フィールド（部分更新）
#[derive(Debug, Clone, Default)]
pub struct ContentUpdate {
    pub category: Option<Category>,
    pub description: Option<String>,
    pub justification: Option<String>,
    pub amount: Option<f64>,
    pub expense_date: Option<String>,
}

impl ContentUpdate {
    /// 何も変更しない更新かどうか
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.description.is_none()
            && self.justification.is_none()
            && self.amount.is_none()
            && self.expense_date.is_none()
    }
}

/// 申請時の送信方法（下書き保存か提出か）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitAction {
    /// 下書きとして保存（初期ステータス: Rascunho）
    SaveDraft,
    /// 申請として提出（初期ステータス: Pendente）
    Submit,
}

impl SubmitAction {
    /// この送信方法に対応する初期ステータス
    pub fn initial_status(&self) -> Status {
        match self {
            SubmitAction::SaveDraft => Status::Draft,
            SubmitAction::Submit => Status::Pending,
        }
    }
}

/// 管理者による審査の決定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// 承認
    Approve,
    /// 却下
    Reject,
}

impl Decision {
    /// この決定が遷移させる先のステータス
    pub fn target_status(&self) -> Status {
        match self {
            Decision::Approve => Status::Approved,
            Decision::Reject => Status::Rejected,
        }
    }
}

/// 作成リクエストのボディ（POST /reembolsos）
#[derive(Debug, Serialize)]
pub struct CreateReimbursementRequest {
    pub categoria: &'static str,
    pub descricao: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub justificativa: Option<String>,
    pub valor: f64,
    #[serde(rename = "dataDespesa")]
    pub data_despesa: String,
    pub status: &'static str,
}

/// 内容編集リクエストのボディ（PATCH /reembolsos/:id）
#[derive(Debug, Serialize)]
pub struct UpdateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categoria: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub justificativa: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valor: Option<f64>,
    #[serde(rename = "dataDespesa", skip_serializing_if = "Option::is_none")]
    pub data_despesa: Option<String>,
}

/// ステータス決定リクエストのボディ（PATCH /reembolsos/:id）
///
/// 審査はステータス以外のフィールドを一切変更してはならないため、
/// ボディはステータスのみです。
#[derive(Debug, Serialize)]
pub struct UpdateStatusRequest {
    pub status: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_wire() {
        // ステータス文字列の変換テスト（大文字小文字を区別しない）
        assert_eq!(Status::from_wire("Rascunho"), Status::Draft);
        assert_eq!(Status::from_wire("pendente"), Status::Pending);
        assert_eq!(Status::from_wire("APROVADO"), Status::Approved);
        assert_eq!(Status::from_wire("Rejeitado"), Status::Rejected);
        assert_eq!(Status::from_wire("desconhecido"), Status::Pending);
    }

    #[test]
    fn test_status_terminal() {
        // 終端ステータスの判定テスト
        assert!(Status::Approved.is_terminal());
        assert!(Status::Rejected.is_terminal());
        assert!(!Status::Draft.is_terminal());
        assert!(!Status::Pending.is_terminal());

        assert!(Status::Draft.is_editable());
        assert!(Status::Pending.is_editable());
        assert!(!Status::Approved.is_editable());
    }

    #[test]
    fn test_category_from_wire_with_legacy_labels() {
        // 旧表記のカテゴリも受け付ける
        assert_eq!(Category::from_wire("Combustível"), Category::Fuel);
        assert_eq!(Category::from_wire("Material"), Category::OfficeSupplies);
        assert_eq!(
            Category::from_wire("Material de Escritório"),
            Category::OfficeSupplies
        );
        assert_eq!(Category::from_wire("Refeição"), Category::Meals);
        assert_eq!(Category::from_wire("Alimentação"), Category::Meals);
        assert_eq!(Category::from_wire("categoria nova"), Category::Other);
    }

    #[test]
    fn test_wire_to_canonical_prefers_new_field_names() {
        // 新旧フィールドが混在する場合は新しい名前を優先する
        let json = r#"{
            "id": "42",
            "idReembolso": "R042",
            "nomeFuncionario": "Nome Antigo",
            "usuario": { "id": 9, "nome": "João Silva" },
            "categoria": "Combustível",
            "descricao": "Viagem cliente ABC",
            "valor": 120.0,
            "valorReembolso": 999.0,
            "dataDespesa": "2025-06-10",
            "dataReembolso": "2020-01-01T00:00:00.000Z",
            "status": "Pendente",
            "dataCriacao": "2025-06-10T12:00:00Z",
            "ultimaAtualizacao": "2025-06-10T12:30:00Z"
        }"#;

        let wire: ReimbursementWire = serde_json::from_str(json).unwrap();
        let record = wire.into_canonical();

        assert_eq!(record.code, "R042");
        assert_eq!(record.owner_id, Some(9));
        assert_eq!(record.employee_name, "João Silva");
        assert_eq!(record.amount, 120.0);
        assert_eq!(
            record.expense_date,
            NaiveDate::from_ymd_opt(2025, 6, 10)
        );
        assert_eq!(record.status, Status::Pending);
        assert!(record.created_at.is_some());
        assert!(record.updated_at.is_some());
    }

    #[test]
    fn test_wire_to_canonical_legacy_shape() {
        // 旧形式（valorReembolso／dataReembolso／nomeFuncionario）のテスト
        let json = r#"{
            "id": "1",
            "idReembolso": "R001",
            "nomeFuncionario": "Maria Santos",
            "categoria": "Refeição",
            "descricao": "Almoço com cliente XYZ",
            "valorReembolso": 85.5,
            "dataReembolso": "2025-06-09T00:00:00.000Z",
            "status": "Aprovado"
        }"#;

        let wire: ReimbursementWire = serde_json::from_str(json).unwrap();
        let record = wire.into_canonical();

        assert_eq!(record.employee_name, "Maria Santos");
        assert_eq!(record.amount, 85.5);
        assert_eq!(record.category, Category::Meals);
        assert_eq!(record.expense_date, NaiveDate::from_ymd_opt(2025, 6, 9));
        assert_eq!(record.status, Status::Approved);
        assert!(record.owner_id.is_none());
    }

    #[test]
    fn test_wire_codigo_alias() {
        // idReembolsoの別名codigoも受け付ける
        let json = r#"{ "id": "3", "codigo": "R003", "status": "Rascunho" }"#;
        let wire: ReimbursementWire = serde_json::from_str(json).unwrap();
        let record = wire.into_canonical();
        assert_eq!(record.code, "R003");
        assert_eq!(record.status, Status::Draft);
    }

    #[test]
    fn test_wire_code_falls_back_to_id() {
        // コードがない場合はIDを表示コードとして使用
        let json = r#"{ "id": "77", "status": "Pendente" }"#;
        let wire: ReimbursementWire = serde_json::from_str(json).unwrap();
        assert_eq!(wire.into_canonical().code, "77");
    }

    #[test]
    fn test_create_request_serialization() {
        // 作成リクエストのワイヤ形式テスト
        let request = CreateReimbursementRequest {
            categoria: Category::Fuel.wire_value(),
            descricao: "Fuel".to_string(),
            justificativa: None,
            valor: 120.0,
            data_despesa: "2025-06-10".to_string(),
            status: Status::Pending.wire_value(),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["categoria"], "Combustível");
        assert_eq!(json["descricao"], "Fuel");
        assert_eq!(json["valor"], 120.0);
        assert_eq!(json["dataDespesa"], "2025-06-10");
        assert_eq!(json["status"], "Pendente");
        assert!(json.get("justificativa").is_none());
    }

    #[test]
    fn test_update_content_request_partial() {
        // 部分更新は指定フィールドのみ送信する
        let request = UpdateContentRequest {
            categoria: None,
            descricao: Some("Nova descrição".to_string()),
            justificativa: None,
            valor: Some(200.0),
            data_despesa: None,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["descricao"], "Nova descrição");
        assert_eq!(json["valor"], 200.0);
        assert!(json.get("categoria").is_none());
        assert!(json.get("dataDespesa").is_none());
    }

    #[test]
    fn test_submit_action_and_decision() {
        assert_eq!(SubmitAction::SaveDraft.initial_status(), Status::Draft);
        assert_eq!(SubmitAction::Submit.initial_status(), Status::Pending);
        assert_eq!(Decision::Approve.target_status(), Status::Approved);
        assert_eq!(Decision::Reject.target_status(), Status::Rejected);
    }
}
