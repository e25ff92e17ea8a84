use async_trait::async_trait;
use contracts::dashboards::d400_client_report::{Branch, RoeRow};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Raw yearly figures of one client. Monthly vectors always have 12 entries,
/// January first. Monetary series are in R$ (sales) or R$ mil (balance sheet).
#[derive(Debug, Clone, PartialEq)]
pub struct ClientYear {
    pub client_name: String,
    pub monthly_sales: Vec<f64>,
    pub previous_sales: Vec<f64>,
    pub caixa: Vec<f64>,
    pub estoques: Vec<f64>,
    pub imobilizado: Vec<f64>,
    pub circulante: Vec<f64>,
    pub nao_circulante: Vec<f64>,
    /// Monthly return (%) of the client's equity
    pub rentabilidade: Vec<f64>,
    /// Monthly CDI (%)
    pub cdi: Vec<f64>,
    pub patrimonio: Vec<f64>,
    pub products: Vec<ProductFigures>,
    pub costs: Vec<(String, f64)>,
    pub suppliers: Vec<(String, f64)>,
    pub roe_table: Vec<RoeRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductFigures {
    pub name: String,
    pub revenue: f64,
    pub quantity: f64,
}

/// Источник данных отчёта.
///
/// Реализация выбирается при старте; веб-слой работает только с трейтом.
#[async_trait]
pub trait DataProvider: Send + Sync {
    async fn list_clients(&self) -> anyhow::Result<Vec<String>>;

    /// Branches of a client; empty for unknown clients
    async fn list_branches(&self, client_id: &str) -> anyhow::Result<Vec<Branch>>;

    /// `None` when the client is unknown
    async fn year_figures(&self, client_id: &str, year: i32) -> anyhow::Result<Option<ClientYear>>;
}

const COMPANY_NAMES: [&str; 8] = [
    "Aurora Comércio Ltda",
    "Vale Verde Alimentos S.A.",
    "Horizonte Distribuidora Ltda",
    "Serra Azul Indústria Ltda",
    "Ponte Nova Varejo S.A.",
    "Atlântica Serviços Ltda",
    "Cerrado Agropecuária Ltda",
    "Mar Aberto Logística S.A.",
];

const BRANCH_NAMES: [&str; 6] = [
    "Matriz",
    "Filial Centro",
    "Filial Norte",
    "Filial Sul",
    "Loja Shopping",
    "Centro de Distribuição",
];

/// Synthetic provider. Output is a pure function of (seed, client, year), so
/// the page, the PDF and the batch export of one client always agree.
#[derive(Debug, Clone)]
pub struct MockDataProvider {
    seed: u64,
    clients: Vec<String>,
}

impl MockDataProvider {
    pub fn new(seed: u64, clients: Vec<String>) -> Self {
        Self { seed, clients }
    }

    fn is_known(&self, client_id: &str) -> bool {
        self.clients.iter().any(|c| c == client_id)
    }

    fn rng_for(&self, client_id: &str, salt: u64) -> StdRng {
        StdRng::seed_from_u64(self.seed ^ fnv1a(client_id.as_bytes()) ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }

    fn generate_branches(&self, client_id: &str) -> Vec<Branch> {
        let mut rng = self.rng_for(client_id, 0);
        let count = rng.gen_range(2..=5);
        BRANCH_NAMES
            .iter()
            .take(count)
            .enumerate()
            .map(|(i, name)| Branch::new(format!("{:02}", i + 1), *name))
            .collect()
    }

    fn generate_year(&self, client_id: &str, year: i32) -> ClientYear {
        let client_name = {
            let mut rng = self.rng_for(client_id, 0);
            // same stream as branches: skip the branch count draw
            let _: usize = rng.gen_range(2..=5);
            COMPANY_NAMES[rng.gen_range(0..COMPANY_NAMES.len())].to_string()
        };

        let mut rng = self.rng_for(client_id, year as u64);
        let monthly_sales: Vec<f64> = (0..12).map(|_| rng.gen_range(40_000.0..85_000.0)).collect();
        let previous_sales: Vec<f64> = monthly_sales
            .iter()
            .map(|v| v * rng.gen_range(0.82..0.97))
            .collect();

        let caixa = walk(&mut rng, 50.0, 4.0);
        let estoques = walk(&mut rng, 30.0, 2.5);
        let imobilizado = walk(&mut rng, 10.0, 1.0);
        let circulante = walk(&mut rng, 40.0, 3.0);
        let nao_circulante = walk(&mut rng, 60.0, 3.0);
        let rentabilidade: Vec<f64> = (0..12).map(|_| round2(rng.gen_range(0.8..2.2))).collect();
        let cdi: Vec<f64> = (0..12).map(|_| round2(rng.gen_range(0.80..0.95))).collect();
        let patrimonio = walk(&mut rng, 60.0, 2.0);

        let products = ["Prod A", "Prod B", "Prod C", "Prod D", "Prod E"]
            .iter()
            .map(|name| ProductFigures {
                name: name.to_string(),
                revenue: round2(rng.gen_range(20.0..120.0)),
                quantity: rng.gen_range(100u32..1_500) as f64,
            })
            .collect();

        let costs = split_shares(&mut rng, &["Pessoal", "Tributos", "Serviços", "Aluguel"]);
        let suppliers = split_shares(&mut rng, &["Forn A", "Forn B", "Outros"]);

        let roe_table = [("3 M", 3.0), ("6 M", 6.0), ("12 M", 12.0)]
            .iter()
            .map(|(label, months)| {
                let roe = round2(rng.gen_range(1.2f64..1.6) * months);
                let cdi = round2(0.92 * months);
                RoeRow {
                    periodo: label.to_string(),
                    roe,
                    cdi,
                    delta: round2(roe - cdi),
                }
            })
            .collect();

        ClientYear {
            client_name,
            monthly_sales,
            previous_sales,
            caixa,
            estoques,
            imobilizado,
            circulante,
            nao_circulante,
            rentabilidade,
            cdi,
            patrimonio,
            products,
            costs,
            suppliers,
            roe_table,
        }
    }
}

#[async_trait]
impl DataProvider for MockDataProvider {
    async fn list_clients(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.clients.clone())
    }

    async fn list_branches(&self, client_id: &str) -> anyhow::Result<Vec<Branch>> {
        if !self.is_known(client_id) {
            return Ok(Vec::new());
        }
        Ok(self.generate_branches(client_id))
    }

    async fn year_figures(&self, client_id: &str, year: i32) -> anyhow::Result<Option<ClientYear>> {
        if !self.is_known(client_id) {
            return Ok(None);
        }
        Ok(Some(self.generate_year(client_id, year)))
    }
}

/// 12-step random walk starting near `start`
fn walk(rng: &mut StdRng, start: f64, step: f64) -> Vec<f64> {
    let mut value = start;
    (0..12)
        .map(|_| {
            value = (value + rng.gen_range(-step..step)).max(0.0);
            round2(value)
        })
        .collect()
}

/// Random percentage split over `labels`, summing to 100
fn split_shares(rng: &mut StdRng, labels: &[&str]) -> Vec<(String, f64)> {
    let weights: Vec<f64> = labels.iter().map(|_| rng.gen_range(1.0..10.0)).collect();
    let total: f64 = weights.iter().sum();
    labels
        .iter()
        .zip(weights)
        .map(|(label, w)| (label.to_string(), round2(w / total * 100.0)))
        .collect()
}

pub(super) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325, |hash, b| {
        (hash ^ u64::from(*b)).wrapping_mul(0x0100_0000_01b3)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> MockDataProvider {
        MockDataProvider::new(42, vec!["1001".into(), "1002".into()])
    }

    #[tokio::test]
    async fn test_branches_are_stable_and_coded() {
        let p = provider();
        let first = p.list_branches("1001").await.unwrap();
        let second = p.list_branches("1001").await.unwrap();
        assert_eq!(first, second);
        assert!((2..=5).contains(&first.len()));
        assert_eq!(first[0], Branch::new("01", "Matriz"));
    }

    #[tokio::test]
    async fn test_unknown_client_has_no_data() {
        let p = provider();
        assert!(p.list_branches("9999").await.unwrap().is_empty());
        assert!(p.year_figures("9999", 2024).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_year_figures_shape() {
        let figures = provider().year_figures("1002", 2024).await.unwrap().unwrap();
        assert_eq!(figures.monthly_sales.len(), 12);
        assert_eq!(figures.previous_sales.len(), 12);
        assert_eq!(figures.caixa.len(), 12);
        assert_eq!(figures.roe_table.len(), 3);
        assert!(COMPANY_NAMES.contains(&figures.client_name.as_str()));

        let cost_total: f64 = figures.costs.iter().map(|(_, v)| v).sum();
        assert!((cost_total - 100.0).abs() < 0.1);
    }

    #[tokio::test]
    async fn test_years_differ_but_name_does_not() {
        let p = provider();
        let a = p.year_figures("1001", 2023).await.unwrap().unwrap();
        let b = p.year_figures("1001", 2024).await.unwrap().unwrap();
        assert_eq!(a.client_name, b.client_name);
        assert_ne!(a.monthly_sales, b.monthly_sales);
    }
}
