use std::collections::BTreeSet;

use contracts::dashboards::d400_client_report::{Branch, PeriodQuery};
use thiserror::Error;

pub const ALL_MONTHS: std::ops::RangeInclusive<u32> = 1..=12;

/// Состояние списка филиалов в фильтре
#[derive(Debug, Clone, PartialEq)]
pub enum BranchOptions {
    /// Загрузка ещё не запускалась
    Idle,
    Loading,
    /// Непустой список, у каждой опции свой флажок
    Ready(Vec<BranchOption>),
    Empty,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BranchOption {
    pub branch: Branch,
    pub checked: bool,
}

/// Apply is refused while either selection is empty; months are checked first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FilterValidationError {
    #[error("Selecione pelo menos um mês!")]
    NoMonths,
    #[error("Selecione pelo menos uma filial!")]
    NoBranches,
}

/// Where an accepted filter leads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterTarget {
    pub query: PeriodQuery,
    /// `year=…&months=…&branches=…`
    pub query_string: String,
    pub view_url: String,
    pub pdf_url: String,
}

/// Фильтр периода: год, выбранные месяцы и филиалы.
///
/// Branch fetches are stamped with a generation; only the response of the
/// latest request is accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodFilter {
    pub year: i32,
    months: BTreeSet<u32>,
    branches: BranchOptions,
    generation: u64,
}

impl PeriodFilter {
    /// All months selected, branches not loaded yet
    pub fn new(year: i32) -> Self {
        Self {
            year,
            months: ALL_MONTHS.collect(),
            branches: BranchOptions::Idle,
            generation: 0,
        }
    }

    /// Takes year and months of the filter the page is currently showing.
    /// Branch state and the fetch generation are left untouched, so a
    /// branch request already in flight still lands.
    pub fn seed_from_query(&mut self, query: &PeriodQuery) {
        self.year = query.year;
        self.months = query
            .months
            .iter()
            .copied()
            .filter(|m| ALL_MONTHS.contains(m))
            .collect();
    }

    // ---------------------------------------------------------------
    // Месяцы
    // ---------------------------------------------------------------

    pub fn is_month_selected(&self, month: u32) -> bool {
        self.months.contains(&month)
    }

    pub fn toggle_month(&mut self, month: u32) {
        if !ALL_MONTHS.contains(&month) {
            return;
        }
        if !self.months.remove(&month) {
            self.months.insert(month);
        }
    }

    pub fn select_all_months(&mut self) {
        self.months = ALL_MONTHS.collect();
    }

    pub fn clear_all_months(&mut self) {
        self.months.clear();
    }

    pub fn selected_months(&self) -> Vec<u32> {
        self.months.iter().copied().collect()
    }

    pub fn months_label(&self) -> String {
        months_label(self.months.len())
    }

    // ---------------------------------------------------------------
    // Филиалы
    // ---------------------------------------------------------------

    pub fn branches(&self) -> &BranchOptions {
        &self.branches
    }

    /// Marks a new fetch as the current one and returns its generation
    pub fn begin_branch_load(&mut self) -> u64 {
        self.generation += 1;
        self.branches = BranchOptions::Loading;
        self.generation
    }

    /// Applies a fetch result. Returns `false` when a newer fetch was started
    /// in the meantime and the result was dropped.
    pub fn finish_branch_load<E: std::fmt::Display>(
        &mut self,
        generation: u64,
        result: Result<Vec<Branch>, E>,
    ) -> bool {
        if generation != self.generation {
            return false;
        }
        self.branches = match result {
            Ok(list) if list.is_empty() => BranchOptions::Empty,
            Ok(list) => BranchOptions::Ready(
                list.into_iter()
                    .map(|branch| BranchOption {
                        branch,
                        checked: true,
                    })
                    .collect(),
            ),
            Err(e) => BranchOptions::Failed(e.to_string()),
        };
        true
    }

    /// Checkboxes are usable only once the list has arrived
    pub fn branch_selection_enabled(&self) -> bool {
        matches!(self.branches, BranchOptions::Ready(_))
    }

    pub fn toggle_branch(&mut self, code: &str) {
        if let BranchOptions::Ready(options) = &mut self.branches {
            if let Some(option) = options.iter_mut().find(|o| o.branch.code == code) {
                option.checked = !option.checked;
            }
        }
    }

    pub fn select_all_branches(&mut self) {
        self.set_all_branches(true);
    }

    pub fn clear_all_branches(&mut self) {
        self.set_all_branches(false);
    }

    fn set_all_branches(&mut self, checked: bool) {
        if let BranchOptions::Ready(options) = &mut self.branches {
            options.iter_mut().for_each(|o| o.checked = checked);
        }
    }

    /// Codes of checked branches, in list order
    pub fn selected_branches(&self) -> Vec<String> {
        match &self.branches {
            BranchOptions::Ready(options) => options
                .iter()
                .filter(|o| o.checked)
                .map(|o| o.branch.code.clone())
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn branches_label(&self) -> String {
        match &self.branches {
            BranchOptions::Idle | BranchOptions::Loading => "Carregando filiais...".to_string(),
            BranchOptions::Empty => "Nenhuma filial disponível".to_string(),
            BranchOptions::Failed(_) => "Erro ao carregar".to_string(),
            BranchOptions::Ready(options) => {
                let checked = options.iter().filter(|o| o.checked).count();
                branches_label(checked, options.len())
            }
        }
    }

    // ---------------------------------------------------------------
    // Применение
    // ---------------------------------------------------------------

    /// Validates the selection and builds the URLs of the filtered report.
    pub fn apply(&self, client_id: &str) -> Result<FilterTarget, FilterValidationError> {
        if self.months.is_empty() {
            return Err(FilterValidationError::NoMonths);
        }
        let branches = self.selected_branches();
        if branches.is_empty() {
            return Err(FilterValidationError::NoBranches);
        }

        let query = PeriodQuery::new(self.year, self.selected_months(), branches);
        let query_string = query.to_query_string();
        let client = urlencoding::encode(client_id);
        Ok(FilterTarget {
            view_url: format!("/report/view/{}?{}", client, query_string),
            pdf_url: format!("/report/pdf/{}?{}", client, query_string),
            query_string,
            query,
        })
    }
}

pub fn months_label(count: usize) -> String {
    match count {
        0 => "Nenhum mês selecionado".to_string(),
        12 => "Todos os meses (12)".to_string(),
        1 => "1 mês selecionado".to_string(),
        n => format!("{} meses selecionados", n),
    }
}

/// `total` is the number of branch options; "all" is tested after "none"
pub fn branches_label(count: usize, total: usize) -> String {
    if count == 0 {
        "Nenhuma filial selecionada".to_string()
    } else if count == total {
        format!("Todas as filiais ({})", total)
    } else if count == 1 {
        "1 filial selecionada".to_string()
    } else {
        format!("{} filiais selecionadas", count)
    }
}

/// Years offered in the year select: the current one and four before it,
/// plus `selected` when it falls outside that range. Newest first.
pub fn year_options(current_year: i32, selected: i32) -> Vec<i32> {
    let mut years: Vec<i32> = (current_year - 4..=current_year).rev().collect();
    if !years.contains(&selected) {
        years.push(selected);
        years.sort_unstable_by(|a, b| b.cmp(a));
    }
    years
}

#[cfg(test)]
mod tests {
    use super::*;

    fn branches() -> Vec<Branch> {
        vec![Branch::new("01", "Matriz"), Branch::new("02", "Filial Centro")]
    }

    fn loaded() -> PeriodFilter {
        let mut filter = PeriodFilter::new(2024);
        let generation = filter.begin_branch_load();
        assert!(filter.finish_branch_load::<String>(generation, Ok(branches())));
        filter
    }

    #[test]
    fn test_months_label_for_every_count() {
        for count in 0..=12 {
            let expected = match count {
                0 => "Nenhum mês selecionado".to_string(),
                1 => "1 mês selecionado".to_string(),
                12 => "Todos os meses (12)".to_string(),
                n => format!("{} meses selecionados", n),
            };
            assert_eq!(months_label(count), expected);
        }
    }

    #[test]
    fn test_months_label_follows_toggles() {
        let mut filter = PeriodFilter::new(2024);
        assert_eq!(filter.months_label(), "Todos os meses (12)");
        filter.clear_all_months();
        assert_eq!(filter.months_label(), "Nenhum mês selecionado");
        filter.toggle_month(3);
        assert_eq!(filter.months_label(), "1 mês selecionado");
        filter.toggle_month(5);
        assert_eq!(filter.months_label(), "2 meses selecionados");
        filter.toggle_month(3);
        assert_eq!(filter.selected_months(), vec![5]);
        filter.toggle_month(13);
        assert_eq!(filter.selected_months(), vec![5]);
        filter.select_all_months();
        assert_eq!(filter.selected_months().len(), 12);
    }

    #[test]
    fn test_branches_label() {
        assert_eq!(branches_label(0, 3), "Nenhuma filial selecionada");
        assert_eq!(branches_label(3, 3), "Todas as filiais (3)");
        assert_eq!(branches_label(1, 3), "1 filial selecionada");
        assert_eq!(branches_label(2, 3), "2 filiais selecionadas");
        assert_eq!(branches_label(1, 1), "Todas as filiais (1)");
    }

    #[test]
    fn test_loaded_branches_start_checked() {
        let mut filter = loaded();
        assert!(filter.branch_selection_enabled());
        assert_eq!(filter.selected_branches(), vec!["01", "02"]);
        assert_eq!(filter.branches_label(), "Todas as filiais (2)");

        filter.toggle_branch("02");
        assert_eq!(filter.branches_label(), "1 filial selecionada");
        filter.clear_all_branches();
        assert_eq!(filter.branches_label(), "Nenhuma filial selecionada");
        filter.select_all_branches();
        assert_eq!(filter.selected_branches().len(), 2);
    }

    #[test]
    fn test_empty_branch_list() {
        let mut filter = PeriodFilter::new(2024);
        let generation = filter.begin_branch_load();
        filter.finish_branch_load::<String>(generation, Ok(Vec::new()));
        assert_eq!(filter.branches(), &BranchOptions::Empty);
        assert!(!filter.branch_selection_enabled());
        assert_eq!(filter.branches_label(), "Nenhuma filial disponível");

        filter.select_all_branches();
        assert!(filter.selected_branches().is_empty());
    }

    #[test]
    fn test_failed_branch_load() {
        let mut filter = PeriodFilter::new(2024);
        let generation = filter.begin_branch_load();
        filter.finish_branch_load(generation, Err("HTTP error: 500"));
        assert_eq!(filter.branches(), &BranchOptions::Failed("HTTP error: 500".into()));
        assert_eq!(filter.branches_label(), "Erro ao carregar");
    }

    #[test]
    fn test_stale_branch_response_is_discarded() {
        let mut filter = PeriodFilter::new(2024);
        let first = filter.begin_branch_load();
        let second = filter.begin_branch_load();

        assert!(filter.finish_branch_load::<String>(second, Ok(branches())));
        assert!(!filter.finish_branch_load::<String>(first, Ok(Vec::new())));
        assert_eq!(filter.selected_branches(), vec!["01", "02"]);
    }

    #[test]
    fn test_apply_builds_urls() {
        let mut filter = loaded();
        filter.clear_all_months();
        for month in [12, 1, 3] {
            filter.toggle_month(month);
        }

        let target = filter.apply("1001").unwrap();
        assert_eq!(target.query_string, "year=2024&months=1%2C3%2C12&branches=01%2C02");
        assert_eq!(
            target.view_url,
            "/report/view/1001?year=2024&months=1%2C3%2C12&branches=01%2C02"
        );
        assert_eq!(
            target.pdf_url,
            "/report/pdf/1001?year=2024&months=1%2C3%2C12&branches=01%2C02"
        );
    }

    #[test]
    fn test_apply_requires_months_before_branches() {
        let mut filter = PeriodFilter::new(2024);
        filter.clear_all_months();
        assert_eq!(filter.apply("1001"), Err(FilterValidationError::NoMonths));

        filter.toggle_month(1);
        assert_eq!(filter.apply("1001"), Err(FilterValidationError::NoBranches));

        let mut filter = loaded();
        filter.clear_all_branches();
        assert_eq!(
            filter.apply("1001").unwrap_err().to_string(),
            "Selecione pelo menos uma filial!"
        );
    }

    #[test]
    fn test_apply_without_months_fails_with_branches_loaded() {
        let mut filter = loaded();
        filter.clear_all_months();
        assert_eq!(filter.apply("1001"), Err(FilterValidationError::NoMonths));

        filter.clear_all_branches();
        assert_eq!(filter.apply("1001"), Err(FilterValidationError::NoMonths));
    }

    #[test]
    fn test_seed_from_query_keeps_current_selection() {
        let query = PeriodQuery::new(2023, [2, 4], vec!["01".into()]);
        let mut filter = PeriodFilter::new(2026);
        filter.seed_from_query(&query);
        assert_eq!(filter.year, 2023);
        assert_eq!(filter.selected_months(), vec![2, 4]);
    }

    #[test]
    fn test_seeding_keeps_branch_fetch_in_flight() {
        let query = PeriodQuery::new(2023, [2, 4], vec!["01".into()]);
        let mut filter = PeriodFilter::new(2026);
        let in_flight = filter.begin_branch_load();

        // отчёт пришёл раньше филиалов
        filter.seed_from_query(&query);
        assert_eq!(filter.branches(), &BranchOptions::Loading);

        assert!(filter.finish_branch_load::<String>(in_flight, Ok(branches())));
        assert_eq!(filter.branches_label(), "Todas as filiais (2)");
        assert_eq!(filter.year, 2023);
    }

    #[test]
    fn test_seeding_does_not_reuse_generations() {
        let query = PeriodQuery::new(2023, [1], vec!["01".into()]);
        let mut filter = PeriodFilter::new(2026);
        let stale = filter.begin_branch_load();
        filter.seed_from_query(&query);
        let current = filter.begin_branch_load();
        assert_ne!(stale, current);

        assert!(!filter.finish_branch_load::<String>(stale, Ok(Vec::new())));
        assert_eq!(filter.branches(), &BranchOptions::Loading);
        assert!(filter.finish_branch_load::<String>(current, Ok(branches())));
        assert_eq!(filter.selected_branches(), vec!["01", "02"]);
    }

    #[test]
    fn test_year_options() {
        assert_eq!(year_options(2026, 2025), vec![2026, 2025, 2024, 2023, 2022]);
        assert_eq!(year_options(2026, 2019), vec![2026, 2025, 2024, 2023, 2022, 2019]);
    }

    #[test]
    fn test_seeded_year_is_offered() {
        let mut filter = PeriodFilter::new(2026);
        filter.seed_from_query(&PeriodQuery::new(2019, [1], vec!["01".into()]));
        assert!(year_options(2026, filter.year).contains(&2019));
    }
}
