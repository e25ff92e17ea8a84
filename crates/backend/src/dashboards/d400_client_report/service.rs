use chrono::{Datelike, Local, NaiveDate};
use contracts::dashboards::d400_client_report::{
    AssetSeries, Branch, ChartData, Indicators, Kpis, LabeledValues, LiabilitySeries, PeriodQuery,
    ProductRanking, ProfitabilitySeries, ReportContext, ReportParams, SalesSeries,
    MONTH_ABBREVIATIONS,
};

use super::error::ReportError;
use super::provider::{round2, ClientYear, DataProvider};
use crate::shared::format::{format_brl, format_percent};

const MONTH_NAMES: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

// Cost structure as a share of net sales
const TAX_RATE: f64 = 0.18;
const PURCHASES_RATE: f64 = 0.40;
const CAPEX_RATE: f64 = 0.05;
const OPEX_RATE: f64 = 0.15;
const FINEX_RATE: f64 = 0.03;
const OTHERS_RATE: f64 = 0.02;
const EBITDA_RATE: f64 = 0.15;
const NCG_RATE: f64 = 0.10;

/// What part of a client's year a report covers
#[derive(Debug, Clone, PartialEq)]
pub struct ReportScope {
    pub year: i32,
    /// 1..=12, ascending
    pub months: Vec<u32>,
    /// Fraction of the client's branches included, in (0, 1]
    pub branch_share: f64,
    pub period: String,
    pub filter: Option<PeriodQuery>,
}

/// Builds the report for one client from raw query params.
///
/// With `year`/`months`/`branches` the report covers exactly that selection;
/// without them (legacy `periodo` form) it covers the whole current year and
/// labels it with `periodo` or the current month.
pub async fn build_context(
    provider: &dyn DataProvider,
    client_id: &str,
    params: &ReportParams,
) -> Result<ReportContext, ReportError> {
    let filter = PeriodQuery::from_params(params)?;
    let today = Local::now().date_naive();

    let scope = match filter {
        Some(query) => {
            let branches = provider.list_branches(client_id).await?;
            let share = branch_share(&branches, &query.branches);
            if share <= 0.0 && !branches.is_empty() {
                return Err(ReportError::BadRequest(
                    "Nenhuma filial válida selecionada".to_string(),
                ));
            }
            ReportScope {
                year: query.year,
                months: query.months.clone(),
                branch_share: if branches.is_empty() { 1.0 } else { share },
                period: query.period_label(),
                filter: Some(query),
            }
        }
        None => ReportScope {
            year: today.year(),
            months: (1..=12).collect(),
            branch_share: 1.0,
            period: params
                .periodo
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| current_period_label(today)),
            filter: None,
        },
    };

    let figures = provider
        .year_figures(client_id, scope.year)
        .await?
        .ok_or_else(|| ReportError::UnknownClient(client_id.to_string()))?;

    tracing::debug!(
        "D400 Report: client {} year {} months {:?} branch share {:.2}",
        client_id,
        scope.year,
        scope.months,
        scope.branch_share
    );

    Ok(assemble(client_id, figures, scope))
}

/// "Outubro/2026"
pub fn current_period_label(today: NaiveDate) -> String {
    format!("{}/{}", MONTH_NAMES[today.month0() as usize], today.year())
}

/// Share of the client's branches that are selected; codes the client does
/// not have are ignored.
pub fn branch_share(branches: &[Branch], selected: &[String]) -> f64 {
    if branches.is_empty() {
        return 0.0;
    }
    let included = branches
        .iter()
        .filter(|b| selected.iter().any(|code| code == &b.code))
        .count();
    included as f64 / branches.len() as f64
}

/// Projects a client's year onto the report scope
pub fn assemble(client_id: &str, figures: ClientYear, scope: ReportScope) -> ReportContext {
    let idx: Vec<usize> = scope
        .months
        .iter()
        .filter_map(|m| (*m as usize).checked_sub(1))
        .filter(|i| *i < MONTH_ABBREVIATIONS.len())
        .collect();
    let share = scope.branch_share;
    // короткий ряд от провайдера добивается нулями
    let at = |series: &[f64], i: usize| series.get(i).copied().unwrap_or(0.0);
    let pick = |series: &[f64]| -> Vec<f64> { idx.iter().map(|i| at(series, *i)).collect() };
    let pick_scaled = |series: &[f64]| -> Vec<f64> {
        idx.iter().map(|i| round2(at(series, *i) * share)).collect()
    };

    let vendas: f64 = idx.iter().map(|i| at(&figures.monthly_sales, *i)).sum::<f64>() * share;
    let impostos = vendas * TAX_RATE;
    let compras = vendas * PURCHASES_RATE;
    let capex = vendas * CAPEX_RATE;
    let opex = vendas * OPEX_RATE;
    let finex = vendas * FINEX_RATE;
    let outros = vendas * OTHERS_RATE;
    let lucro = vendas - (impostos + compras + capex + opex + finex + outros);

    let caixa = pick_scaled(&figures.caixa);
    let estoques = pick_scaled(&figures.estoques);
    let imobilizado = pick_scaled(&figures.imobilizado);
    let total: Vec<f64> = (0..idx.len())
        .map(|i| round2(caixa[i] + estoques[i] + imobilizado[i]))
        .collect();
    let circulante = pick_scaled(&figures.circulante);
    let nao_circulante = pick_scaled(&figures.nao_circulante);
    let patrimonio = pick_scaled(&figures.patrimonio);

    let indicators = closing_indicators(
        vendas,
        lucro,
        last(&caixa) + last(&estoques),
        last(&total),
        last(&circulante),
        last(&circulante) + last(&nao_circulante),
        last(&patrimonio),
    );

    let mut by_revenue = figures.products.clone();
    by_revenue.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    let mut by_quantity = figures.products;
    by_quantity.sort_by(|a, b| b.quantity.total_cmp(&a.quantity));

    let charts = ChartData {
        meses: idx
            .iter()
            .map(|i| MONTH_ABBREVIATIONS[*i].to_string())
            .collect(),
        ativos: AssetSeries {
            total: total.clone(),
            caixa,
            estoques,
            imobilizado,
        },
        passivos: LiabilitySeries {
            circulante,
            nao_circulante,
        },
        rentabilidade: ProfitabilitySeries {
            rps: pick(&figures.rentabilidade),
            cdi: pick(&figures.cdi),
            pl: patrimonio,
            ativos: total,
        },
        produtos: ProductRanking {
            fat_labels: by_revenue.iter().map(|p| p.name.clone()).collect(),
            fat_values: by_revenue.iter().map(|p| round2(p.revenue * share)).collect(),
            qtd_labels: by_quantity.iter().map(|p| p.name.clone()).collect(),
            qtd_values: by_quantity.iter().map(|p| (p.quantity * share).round()).collect(),
        },
        vendas: SalesSeries {
            atual: idx
                .iter()
                .map(|i| round2(at(&figures.monthly_sales, *i) * share / 1000.0))
                .collect(),
            anterior: idx
                .iter()
                .map(|i| round2(at(&figures.previous_sales, *i) * share / 1000.0))
                .collect(),
        },
        custos: labeled(figures.costs),
        fornecedores: labeled(figures.suppliers),
    };

    ReportContext {
        client_id: client_id.to_string(),
        client_name: figures.client_name,
        period: scope.period,
        filter: scope.filter,
        kpis: Kpis {
            vendas_liquidas: format_brl(vendas),
            carga_tributaria: format_brl(impostos),
            compras: format_brl(compras),
            capex: format_brl(capex),
            opex: format_brl(opex),
            finex: format_brl(finex),
            outros: format_brl(outros),
            lucro_liquido: format_brl(lucro),
            lucro_liquido_raw: round2(lucro),
        },
        indicators,
        roe_table: figures.roe_table,
        charts,
    }
}

/// Balance-sheet inputs are in R$ mil, results in R$.
fn closing_indicators(
    vendas: f64,
    lucro: f64,
    current_assets: f64,
    total_assets: f64,
    current_liabilities: f64,
    total_liabilities: f64,
    equity: f64,
) -> Indicators {
    let ratio = |num: f64, den: f64| if den > 0.0 { num / den } else { 0.0 };
    Indicators {
        ebitda: format_brl(vendas * EBITDA_RATE),
        liquidez_corrente: format!("{:.2}", ratio(current_assets, current_liabilities)),
        margem_liquida: format_percent(ratio(lucro, vendas)),
        endividamento: format_percent(ratio(total_liabilities, total_liabilities + equity)),
        roa: format_percent(ratio(lucro, total_assets * 1000.0)),
        ncg: format_brl(vendas * NCG_RATE),
    }
}

fn labeled(pairs: Vec<(String, f64)>) -> LabeledValues {
    let (labels, values) = pairs.into_iter().unzip();
    LabeledValues { labels, values }
}

fn last(series: &[f64]) -> f64 {
    series.last().copied().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::super::provider::MockDataProvider;
    use super::*;

    fn provider() -> MockDataProvider {
        MockDataProvider::new(7, vec!["1001".into()])
    }

    fn filtered(months: &str, branches: &str) -> ReportParams {
        ReportParams {
            year: Some("2024".into()),
            months: Some(months.into()),
            branches: Some(branches.into()),
            periodo: None,
        }
    }

    #[tokio::test]
    async fn test_months_are_projected() {
        let ctx = build_context(&provider(), "1001", &filtered("1,3,12", "01,02"))
            .await
            .unwrap();
        assert_eq!(ctx.charts.meses, vec!["Jan", "Mar", "Dez"]);
        assert_eq!(ctx.charts.ativos.total.len(), 3);
        assert_eq!(ctx.charts.vendas.anterior.len(), 3);
        assert_eq!(ctx.period, "Jan, Mar, Dez/2024");
        assert_eq!(ctx.filter.unwrap().months, vec![1, 3, 12]);
    }

    #[tokio::test]
    async fn test_fewer_branches_mean_lower_sales() {
        let p = provider();
        let all = p.list_branches("1001").await.unwrap();
        let all_codes = all.iter().map(|b| b.code.as_str()).collect::<Vec<_>>().join(",");

        let full = build_context(&p, "1001", &filtered("1,2", &all_codes)).await.unwrap();
        let one = build_context(&p, "1001", &filtered("1,2", "01")).await.unwrap();
        assert!(one.kpis.lucro_liquido_raw < full.kpis.lucro_liquido_raw);
        assert_eq!(one.charts.rentabilidade.rps, full.charts.rentabilidade.rps);
    }

    #[tokio::test]
    async fn test_unknown_branches_are_rejected() {
        let err = build_context(&provider(), "1001", &filtered("1", "99"))
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_legacy_periodo() {
        let params = ReportParams {
            periodo: Some("Janeiro/2024".into()),
            ..Default::default()
        };
        let ctx = build_context(&provider(), "1001", &params).await.unwrap();
        assert_eq!(ctx.period, "Janeiro/2024");
        assert!(ctx.filter.is_none());
        assert_eq!(ctx.charts.meses.len(), 12);
    }

    #[tokio::test]
    async fn test_unknown_client() {
        let err = build_context(&provider(), "4242", &ReportParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::UnknownClient(id) if id == "4242"));
    }

    #[tokio::test]
    async fn test_invalid_query_is_reported() {
        let err = build_context(&provider(), "1001", &filtered("0", "01"))
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::InvalidQuery(_)));
    }

    #[test]
    fn test_kpis_follow_cost_structure() {
        let figures = ClientYear {
            client_name: "Teste Ltda".into(),
            monthly_sales: vec![100_000.0; 12],
            previous_sales: vec![90_000.0; 12],
            caixa: vec![50.0; 12],
            estoques: vec![30.0; 12],
            imobilizado: vec![20.0; 12],
            circulante: vec![40.0; 12],
            nao_circulante: vec![60.0; 12],
            rentabilidade: vec![1.0; 12],
            cdi: vec![0.9; 12],
            patrimonio: vec![100.0; 12],
            products: vec![],
            costs: vec![("Pessoal".into(), 100.0)],
            suppliers: vec![],
            roe_table: vec![],
        };
        let scope = ReportScope {
            year: 2024,
            months: vec![1],
            branch_share: 1.0,
            period: "Jan/2024".into(),
            filter: None,
        };
        let ctx = assemble("1", figures, scope);
        assert_eq!(ctx.kpis.vendas_liquidas, "R$ 100.000,00");
        assert_eq!(ctx.kpis.carga_tributaria, "R$ 18.000,00");
        assert_eq!(ctx.kpis.lucro_liquido, "R$ 17.000,00");
        assert_eq!(ctx.indicators.ebitda, "R$ 15.000,00");
        assert_eq!(ctx.indicators.liquidez_corrente, "2.00");
        assert_eq!(ctx.indicators.endividamento, "50%");
        assert_eq!(ctx.charts.ativos.total, vec![100.0]);
        assert_eq!(ctx.charts.vendas.atual, vec![100.0]);
        assert_eq!(ctx.charts.custos.labels, vec!["Pessoal"]);
    }

    #[test]
    fn test_short_series_and_bad_months_do_not_panic() {
        let figures = ClientYear {
            client_name: "Teste Ltda".into(),
            monthly_sales: vec![100_000.0; 6],
            previous_sales: vec![],
            caixa: vec![50.0; 6],
            estoques: vec![30.0; 6],
            imobilizado: vec![20.0; 6],
            circulante: vec![40.0; 6],
            nao_circulante: vec![60.0; 6],
            rentabilidade: vec![1.0; 6],
            cdi: vec![0.9; 6],
            patrimonio: vec![100.0; 6],
            products: vec![],
            costs: vec![],
            suppliers: vec![],
            roe_table: vec![],
        };
        let scope = ReportScope {
            year: 2024,
            months: vec![0, 1, 12, 13],
            branch_share: 1.0,
            period: "Jan, Dez/2024".into(),
            filter: None,
        };
        let ctx = assemble("1", figures, scope);
        assert_eq!(ctx.charts.meses, vec!["Jan", "Dez"]);
        assert_eq!(ctx.charts.ativos.total, vec![100.0, 0.0]);
        assert_eq!(ctx.charts.vendas.anterior, vec![0.0, 0.0]);
        assert_eq!(ctx.kpis.vendas_liquidas, "R$ 100.000,00");
    }

    #[test]
    fn test_branch_share() {
        let branches = vec![Branch::new("01", "Matriz"), Branch::new("02", "Centro")];
        assert_eq!(branch_share(&branches, &["01".into()]), 0.5);
        assert_eq!(branch_share(&branches, &["01".into(), "02".into(), "77".into()]), 1.0);
        assert_eq!(branch_share(&[], &["01".into()]), 0.0);
    }

    #[test]
    fn test_current_period_label() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(current_period_label(date), "Outubro/2026");
    }
}
