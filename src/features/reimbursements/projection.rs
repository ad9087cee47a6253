/// 一覧ビューの射影
///
/// 読み込み済みの払い戻しレコードから、検索・ステータスタブ・詳細フィルタを
/// 適用した可視サブセットとページングを導出します。すべて純粋な計算で、
/// ネットワークや共有状態には触れません。
///
/// 出力順序はRemote Storeが返した順序のままです（クライアント側での
/// 並べ替えは定義されません）。これは保証された性質であり、暗黙の安定性を
/// 仮定しているわけではありません。
use crate::features::reimbursements::models::{Category, Reimbursement, Status};

/// 1ページあたりの表示件数（固定）
pub const PAGE_SIZE: usize = 10;

/// ステータスタブの選択状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTab {
    /// すべて表示（"Todas"タブ）
    All,
    /// 特定ステータスのみ表示
    Only(Status),
}

/// 詳細フィルタ（フィルタモーダルで設定される条件）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdvancedFilter {
    /// 申請者名の部分一致
    pub owner: Option<String>,
    /// カテゴリの完全一致
    pub category: Option<Category>,
    /// ステータスの完全一致
    pub status: Option<Status>,
}

impl AdvancedFilter {
    /// 条件が何も設定されていないかどうか
    pub fn is_empty(&self) -> bool {
        self.owner.is_none() && self.category.is_none() && self.status.is_none()
    }
}

/// フリーテキスト検索に一致するかどうかを判定する
///
/// コード・申請者名・カテゴリ・説明に対する大文字小文字を区別しない
/// 部分一致です。空の検索文字列はすべてに一致します。
fn matches_search(record: &Reimbursement, search_lower: &str) -> bool {
    if search_lower.is_empty() {
        return true;
    }

    record.code.to_lowercase().contains(search_lower)
        || record.employee_name.to_lowercase().contains(search_lower)
        || record
            .category
            .wire_value()
            .to_lowercase()
            .contains(search_lower)
        || record.description.to_lowercase().contains(search_lower)
}

/// 詳細フィルタに一致するかどうかを判定する
fn matches_advanced(record: &Reimbursement, advanced: &AdvancedFilter) -> bool {
    if let Some(owner) = &advanced.owner {
        if !record
            .employee_name
            .to_lowercase()
            .contains(&owner.to_lowercase())
        {
            return false;
        }
    }

    if let Some(category) = advanced.category {
        if record.category != category {
            return false;
        }
    }

    if let Some(status) = advanced.status {
        if record.status != status {
            return false;
        }
    }

    true
}

/// フィルタ条件を適用して可視サブセットを導出する
///
/// # 引数
/// * `all` - 読み込み済みの全レコード（Remote Storeの返却順）
/// * `search` - フリーテキスト検索
/// * `tab` - ステータスタブ
/// * `advanced` - 詳細フィルタ
///
/// # 性質
/// - すべての有効な条件はANDで結合される
/// - 出力順序は入力順序のまま
/// - 同じ条件の再適用は同じ結果を返す（冪等）
pub fn project(
    all: &[Reimbursement],
    search: &str,
    tab: StatusTab,
    advanced: &AdvancedFilter,
) -> Vec<Reimbursement> {
    let search_lower = search.to_lowercase();

    all.iter()
        .filter(|record| matches_search(record, &search_lower))
        .filter(|record| match tab {
            StatusTab::All => true,
            StatusTab::Only(status) => record.status == status,
        })
        .filter(|record| matches_advanced(record, advanced))
        .cloned()
        .collect()
}

/// 件数から総ページ数を計算する
///
/// レコードが0件でも1ページとして扱います（空の1ページ目を表示）。
pub fn total_pages(count: usize) -> usize {
    count.div_ceil(PAGE_SIZE).max(1)
}

/// ページ番号を有効範囲[1, total_pages]に収める
pub fn clamp_page(page: usize, count: usize) -> usize {
    page.clamp(1, total_pages(count))
}

/// 1ページ分の表示結果
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// 表示対象のレコード
    pub items: Vec<Reimbursement>,
    /// 現在のページ番号（1始まり）
    pub page: usize,
    /// 総ページ数
    pub total_pages: usize,
    /// フィルタ適用後の総件数
    pub total_count: usize,
}

/// フィルタ適用済みのレコード列をページングする
///
/// # 引数
/// * `filtered` - フィルタ適用済みのレコード列
/// * `page` - 要求ページ番号（範囲外は切り詰められ、エラーにはならない）
pub fn paginate(filtered: Vec<Reimbursement>, page: usize) -> Page {
    let total_count = filtered.len();
    let total_pages = total_pages(total_count);
    let page = clamp_page(page, total_count);

    let start = (page - 1) * PAGE_SIZE;
    let items = filtered
        .into_iter()
        .skip(start)
        .take(PAGE_SIZE)
        .collect();

    Page {
        items,
        page,
        total_pages,
        total_count,
    }
}

/// 一覧画面のフィルタ・ページング状態
///
/// フィルタ入力のいずれかが変更されるとページ番号は1にリセットされます。
#[derive(Debug, Clone)]
pub struct ListState {
    search: String,
    tab: StatusTab,
    advanced: AdvancedFilter,
    page: usize,
}

impl Default for ListState {
    fn default() -> Self {
        Self::new()
    }
}

impl ListState {
    /// 初期状態（検索なし、"Todas"タブ、1ページ目）を作成する
    pub fn new() -> Self {
        Self {
            search: String::new(),
            tab: StatusTab::All,
            advanced: AdvancedFilter::default(),
            page: 1,
        }
    }

    /// 検索文字列を設定する（ページは1にリセット）
    pub fn set_search<S: Into<String>>(&mut self, search: S) {
        self.search = search.into();
        self.page = 1;
    }

    /// ステータスタブを設定する（ページは1にリセット）
    pub fn set_tab(&mut self, tab: StatusTab) {
        self.tab = tab;
        self.page = 1;
    }

    /// 詳細フィルタを設定する（ページは1にリセット）
    pub fn set_advanced(&mut self, advanced: AdvancedFilter) {
        self.advanced = advanced;
        self.page = 1;
    }

    /// 指定ページへ移動する
    ///
    /// # 引数
    /// * `page` - 移動先ページ番号
    /// * `total_count` - 現在のフィルタ適用後の件数（範囲の切り詰めに使用）
    pub fn go_to_page(&mut self, page: usize, total_count: usize) {
        self.page = clamp_page(page, total_count);
    }

    /// 現在のページ番号
    pub fn page(&self) -> usize {
        self.page
    }

    /// 現在の検索文字列
    pub fn search(&self) -> &str {
        &self.search
    }

    /// 現在のステータスタブ
    pub fn tab(&self) -> StatusTab {
        self.tab
    }

    /// 現在の詳細フィルタ
    pub fn advanced(&self) -> &AdvancedFilter {
        &self.advanced
    }

    /// 現在の状態で可視ページを導出する
    ///
    /// # 引数
    /// * `all` - 読み込み済みの全レコード
    pub fn visible(&self, all: &[Reimbursement]) -> Page {
        let filtered = project(all, &self.search, self.tab, &self.advanced);
        paginate(filtered, self.page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::{Arbitrary, Gen};
    use quickcheck_macros::quickcheck;

    fn record(id: usize, name: &str, category: Category, status: Status, desc: &str) -> Reimbursement {
        Reimbursement {
            id: id.to_string(),
            code: format!("R{id:03}"),
            owner_id: Some(id as i64),
            employee_name: name.to_string(),
            category,
            description: desc.to_string(),
            justification: None,
            amount: 100.0,
            expense_date: None,
            status,
            created_at: None,
            updated_at: None,
            receipt_url: None,
        }
    }

    fn sample_records() -> Vec<Reimbursement> {
        vec![
            record(1, "João Silva", Category::Fuel, Status::Pending, "Viagem cliente ABC"),
            record(2, "Maria Santos", Category::Meals, Status::Approved, "Almoço com cliente XYZ"),
            record(3, "Pedro Costa", Category::OfficeSupplies, Status::Pending, "Materiais de escritório"),
            record(4, "Ana Oliveira", Category::Transport, Status::Rejected, "Uber para reunião"),
            record(5, "Carlos Mendes", Category::Lodging, Status::Approved, "Hotel viagem negócios"),
            record(6, "Lucas Ferreira", Category::Meals, Status::Draft, "Café de trabalho"),
        ]
    }

    /// quickcheck用のレコードラッパー
    #[derive(Debug, Clone)]
    struct ArbRecord(Reimbursement);

    impl Arbitrary for ArbRecord {
        fn arbitrary(g: &mut Gen) -> Self {
            let statuses = [
                Status::Draft,
                Status::Pending,
                Status::Approved,
                Status::Rejected,
            ];
            let names = ["João Silva", "Maria Santos", "Pedro Costa", "Ana Oliveira"];
            let descriptions = ["viagem", "almoço", "materiais", "hotel"];

            let id = usize::arbitrary(g) % 1000;
            let category = *g.choose(&Category::ALL).unwrap();
            let status = *g.choose(&statuses).unwrap();
            let name = g.choose(&names).unwrap();
            let desc = g.choose(&descriptions).unwrap();

            ArbRecord(record(id, name, category, status, desc))
        }
    }

    #[test]
    fn test_empty_filters_return_all_in_order() {
        // フィルタなしの射影は全件を元の順序で返す
        let all = sample_records();
        let result = project(&all, "", StatusTab::All, &AdvancedFilter::default());

        assert_eq!(result.len(), all.len());
        assert_eq!(result, all);
    }

    #[test]
    fn test_search_matches_multiple_fields() {
        let all = sample_records();

        // コードで一致
        let by_code = project(&all, "r001", StatusTab::All, &AdvancedFilter::default());
        assert_eq!(by_code.len(), 1);
        assert_eq!(by_code[0].id, "1");

        // 申請者名で一致（大文字小文字を区別しない）
        let by_name = project(&all, "maria", StatusTab::All, &AdvancedFilter::default());
        assert_eq!(by_name.len(), 1);

        // カテゴリ表記で一致
        let by_category = project(&all, "combustível", StatusTab::All, &AdvancedFilter::default());
        assert_eq!(by_category.len(), 1);

        // 説明で一致
        let by_desc = project(&all, "cliente", StatusTab::All, &AdvancedFilter::default());
        assert_eq!(by_desc.len(), 2);
    }

    #[test]
    fn test_tab_filters_by_exact_status() {
        let all = sample_records();
        let pending = project(&all, "", StatusTab::Only(Status::Pending), &AdvancedFilter::default());
        assert_eq!(pending.len(), 2);
        assert!(pending.iter().all(|r| r.status == Status::Pending));
    }

    #[test]
    fn test_predicates_are_anded() {
        // 検索・タブ・詳細フィルタはANDで結合される
        let all = sample_records();
        let advanced = AdvancedFilter {
            owner: Some("silva".to_string()),
            category: None,
            status: None,
        };

        let result = project(&all, "viagem", StatusTab::Only(Status::Pending), &advanced);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].employee_name, "João Silva");

        // タブを変えると同じ検索でも0件になる
        let result = project(&all, "viagem", StatusTab::Only(Status::Approved), &advanced);
        assert!(result.is_empty());
    }

    #[test]
    fn test_advanced_category_exact_match() {
        let all = sample_records();
        let advanced = AdvancedFilter {
            owner: None,
            category: Some(Category::Meals),
            status: None,
        };
        let result = project(&all, "", StatusTab::All, &advanced);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_pagination_clamps_out_of_range() {
        // 範囲外のページ要求は切り詰められ、エラーにならない
        let all = sample_records();
        let page = paginate(all.clone(), 99);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);

        let page = paginate(all, 0);
        assert_eq!(page.page, 1);
    }

    #[test]
    fn test_pagination_splits_pages() {
        let all: Vec<_> = (0..25)
            .map(|i| record(i, "João Silva", Category::Fuel, Status::Pending, "viagem"))
            .collect();

        let first = paginate(all.clone(), 1);
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.total_count, 25);

        let last = paginate(all, 3);
        assert_eq!(last.items.len(), 5);
        assert_eq!(last.page, 3);
    }

    #[test]
    fn test_empty_list_has_one_page() {
        let page = paginate(Vec::new(), 1);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.total_count, 0);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_list_state_resets_page_on_filter_change() {
        // フィルタ入力の変更でページが1に戻る
        let all: Vec<_> = (0..25)
            .map(|i| record(i, "João Silva", Category::Fuel, Status::Pending, "viagem"))
            .collect();

        let mut state = ListState::new();
        state.go_to_page(3, all.len());
        assert_eq!(state.page(), 3);

        state.set_search("viagem");
        assert_eq!(state.page(), 1);

        state.go_to_page(2, all.len());
        state.set_tab(StatusTab::Only(Status::Pending));
        assert_eq!(state.page(), 1);

        state.go_to_page(2, all.len());
        state.set_advanced(AdvancedFilter::default());
        assert_eq!(state.page(), 1);
    }

    #[test]
    fn test_list_state_visible() {
        let all = sample_records();
        let mut state = ListState::new();
        state.set_tab(StatusTab::Only(Status::Approved));

        let page = state.visible(&all);
        assert_eq!(page.total_count, 2);
        assert!(page.items.iter().all(|r| r.status == Status::Approved));
    }

    #[quickcheck]
    fn prop_projection_is_idempotent(records: Vec<ArbRecord>, search: String) -> bool {
        // 同じ条件の再適用は同じ結果を返す
        let all: Vec<_> = records.into_iter().map(|r| r.0).collect();
        let advanced = AdvancedFilter::default();

        let once = project(&all, &search, StatusTab::All, &advanced);
        let twice = project(&once, &search, StatusTab::All, &advanced);
        once == twice
    }

    #[quickcheck]
    fn prop_empty_filters_are_identity(records: Vec<ArbRecord>) -> bool {
        // フィルタなしの射影は恒等変換
        let all: Vec<_> = records.into_iter().map(|r| r.0).collect();
        project(&all, "", StatusTab::All, &AdvancedFilter::default()) == all
    }

    #[quickcheck]
    fn prop_projection_never_grows(records: Vec<ArbRecord>, search: String) -> bool {
        // 射影が入力より大きくなることはない
        let all: Vec<_> = records.into_iter().map(|r| r.0).collect();
        let result = project(&all, &search, StatusTab::All, &AdvancedFilter::default());
        result.len() <= all.len()
    }

    #[quickcheck]
    fn prop_total_pages_matches_ceil(count: usize) -> bool {
        // 総ページ数はceil(count/10)（最低1ページ）
        let count = count % 10_000;
        let expected = if count == 0 {
            1
        } else {
            (count + PAGE_SIZE - 1) / PAGE_SIZE
        };
        total_pages(count) == expected
    }

    #[quickcheck]
    fn prop_clamped_page_always_valid(page: usize, count: usize) -> bool {
        // 切り詰め後のページ番号は常に有効範囲内
        let count = count % 10_000;
        let clamped = clamp_page(page, count);
        (1..=total_pages(count)).contains(&clamped)
    }

    #[quickcheck]
    fn prop_pages_partition_filtered_records(records: Vec<ArbRecord>) -> bool {
        // 全ページの連結はフィルタ適用結果と一致する
        let all: Vec<_> = records.into_iter().map(|r| r.0).collect();
        let pages = total_pages(all.len());

        let mut collected = Vec::new();
        for page in 1..=pages {
            collected.extend(paginate(all.clone(), page).items);
        }
        collected == all
    }
}
