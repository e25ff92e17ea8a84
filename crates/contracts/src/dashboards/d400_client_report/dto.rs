use serde::{Deserialize, Serialize};

use super::period_query::PeriodQuery;

/// Full report payload for one client and period.
///
/// Served by `GET /api/report/{client_id}` and consumed by the report page
/// (charts, KPI cards, tables) and by the PDF renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportContext {
    pub client_id: String,
    pub client_name: String,
    /// Human readable period, e.g. "Jan, Mar/2024" or "Outubro/2026"
    pub period: String,
    /// Filter the report was built with, None for legacy `periodo` requests
    pub filter: Option<PeriodQuery>,
    pub kpis: Kpis,
    pub indicators: Indicators,
    pub roe_table: Vec<RoeRow>,
    pub charts: ChartData,
}

/// Headline figures, already formatted as BRL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    pub vendas_liquidas: String,
    pub carga_tributaria: String,
    pub compras: String,
    pub capex: String,
    pub opex: String,
    pub finex: String,
    pub outros: String,
    pub lucro_liquido: String,
    /// Unformatted net profit, used to colour the result card
    pub lucro_liquido_raw: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicators {
    pub ebitda: String,
    pub liquidez_corrente: String,
    pub margem_liquida: String,
    pub endividamento: String,
    pub roa: String,
    pub ncg: String,
}

/// One row of the ROE vs CDI table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoeRow {
    /// "3 M", "6 M", "12 M"
    pub periodo: String,
    pub roe: f64,
    pub cdi: f64,
    pub delta: f64,
}

/// Series for the report charts. Every series is aligned with `meses`
/// unless it carries its own labels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    #[serde(default)]
    pub meses: Vec<String>,
    #[serde(default)]
    pub ativos: AssetSeries,
    #[serde(default)]
    pub passivos: LiabilitySeries,
    #[serde(default)]
    pub rentabilidade: ProfitabilitySeries,
    #[serde(default)]
    pub produtos: ProductRanking,
    #[serde(default)]
    pub vendas: SalesSeries,
    #[serde(default)]
    pub custos: LabeledValues,
    #[serde(default)]
    pub fornecedores: LabeledValues,
}

impl ChartData {
    pub fn is_empty(&self) -> bool {
        self.meses.is_empty()
            && self.custos.values.is_empty()
            && self.fornecedores.values.is_empty()
            && self.produtos.fat_values.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetSeries {
    pub total: Vec<f64>,
    pub caixa: Vec<f64>,
    pub estoques: Vec<f64>,
    pub imobilizado: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiabilitySeries {
    pub circulante: Vec<f64>,
    pub nao_circulante: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfitabilitySeries {
    pub rps: Vec<f64>,
    pub cdi: Vec<f64>,
    /// Patrimônio líquido
    pub pl: Vec<f64>,
    pub ativos: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductRanking {
    pub fat_labels: Vec<String>,
    pub fat_values: Vec<f64>,
    pub qtd_labels: Vec<String>,
    pub qtd_values: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalesSeries {
    pub atual: Vec<f64>,
    pub anterior: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabeledValues {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_data_tolerates_missing_series() {
        let data: ChartData = serde_json::from_str(r#"{"meses":["Jan"],"ativos":{"total":[1.0]}}"#).unwrap();
        assert_eq!(data.meses, vec!["Jan".to_string()]);
        assert_eq!(data.ativos.total, vec![1.0]);
        assert!(data.ativos.caixa.is_empty());
        assert!(data.custos.labels.is_empty());
    }

    #[test]
    fn test_empty_chart_data() {
        assert!(ChartData::default().is_empty());
    }
}
