use contracts::dashboards::d400_client_report::ChartData;
use js_sys::{Array, Function, Object, Reflect};
use serde::Serialize;
use serde_json::{json, Value};
use serde_wasm_bindgen::Serializer;
use wasm_bindgen::{JsCast, JsValue};

pub const COLOR_PRIMARY: &str = "#2d5a3d";
pub const COLOR_SECONDARY: &str = "#7fa88f";
pub const COLOR_TERTIARY: &str = "#1a1a1a";
const COLOR_MUTED: &str = "#d1d9d0";
const COLOR_DONUT_LIGHT: &str = "#d8e2d8";

/// Y axis label format, attached as a JS function after serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YFormat {
    /// `R$ 12k`
    ThousandsBrl,
    /// `12%`
    Percent,
}

impl YFormat {
    fn js_body(self) -> &'static str {
        match self {
            YFormat::ThousandsBrl => "return 'R$ ' + val + 'k';",
            YFormat::Percent => "return val + '%';",
        }
    }
}

/// ApexCharts configuration for one chart container
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub container_id: &'static str,
    pub options: Value,
    pub y_format: Option<YFormat>,
}

impl ChartSpec {
    fn new(container_id: &'static str, options: Value) -> Self {
        Self {
            container_id,
            options: with_common_options(options),
            y_format: None,
        }
    }

    fn y_format(mut self, format: YFormat) -> Self {
        self.y_format = Some(format);
        self
    }
}

/// Options shared by every chart; per-chart keys win, `chart` is merged.
fn with_common_options(mut options: Value) -> Value {
    let common = json!({
        "chart": {
            "fontFamily": "Inter, sans-serif",
            "toolbar": { "show": false },
            "zoom": { "enabled": false },
            "animations": { "enabled": true, "easing": "easeinout", "speed": 800 }
        },
        "dataLabels": { "enabled": false },
        "stroke": { "curve": "smooth", "width": 3 },
        "colors": [COLOR_PRIMARY, COLOR_SECONDARY, COLOR_MUTED, COLOR_TERTIARY]
    });

    let Value::Object(defaults) = common else {
        return options;
    };
    if let Value::Object(target) = &mut options {
        for (key, default) in defaults {
            if !target.contains_key(&key) {
                target.insert(key, default);
                continue;
            }
            if let (Some(Value::Object(specific)), Value::Object(base)) =
                (target.get_mut(&key), default)
            {
                for (k, v) in base {
                    specific.entry(k).or_insert(v);
                }
            }
        }
    }
    options
}

/// Все графики отчёта. `year` names the current/previous sales series.
pub fn chart_specs(data: &ChartData, year: i32) -> Vec<ChartSpec> {
    let meses = &data.meses;
    vec![
        ChartSpec::new(
            "chart-ativos-evolucao",
            json!({
                "series": [{ "name": "Total Ativos", "data": data.ativos.total }],
                "chart": { "type": "line", "height": 250 },
                "xaxis": { "categories": meses }
            }),
        )
        .y_format(YFormat::ThousandsBrl),
        ChartSpec::new(
            "chart-ativos-composicao",
            json!({
                "series": [
                    { "name": "Caixa", "data": data.ativos.caixa },
                    { "name": "Estoques", "data": data.ativos.estoques },
                    { "name": "Imobilizado", "data": data.ativos.imobilizado }
                ],
                "chart": { "type": "bar", "height": 250, "stacked": true, "stackType": "100%" },
                "xaxis": { "categories": meses },
                "plotOptions": { "bar": { "horizontal": false, "borderRadius": 4 } }
            }),
        ),
        ChartSpec::new(
            "chart-passivos",
            json!({
                "series": [
                    { "name": "Não Circulante", "data": data.passivos.nao_circulante },
                    { "name": "Circulante", "data": data.passivos.circulante }
                ],
                "chart": { "type": "area", "height": 250, "stacked": true },
                "colors": [COLOR_TERTIARY, COLOR_SECONDARY],
                "xaxis": { "categories": meses }
            }),
        ),
        ChartSpec::new(
            "chart-rentabilidade",
            json!({
                "series": [
                    { "name": "RPS", "data": data.rentabilidade.rps },
                    { "name": "CDI", "data": data.rentabilidade.cdi }
                ],
                "chart": { "type": "line", "height": 250 },
                "stroke": { "dashArray": [0, 5] },
                "xaxis": { "categories": meses }
            }),
        )
        .y_format(YFormat::Percent),
        ChartSpec::new(
            "chart-equity",
            json!({
                "series": [
                    { "name": "Patrimônio Líquido", "data": data.rentabilidade.pl },
                    { "name": "Ativos Totais", "data": data.rentabilidade.ativos }
                ],
                "chart": { "type": "line", "height": 250 },
                "xaxis": { "categories": meses }
            }),
        ),
        ChartSpec::new(
            "chart-top-fat",
            json!({
                "series": [{ "name": "Faturamento", "data": data.produtos.fat_values }],
                "chart": { "type": "bar", "height": 250 },
                "plotOptions": { "bar": { "horizontal": true, "borderRadius": 4 } },
                "xaxis": { "categories": data.produtos.fat_labels },
                "colors": [COLOR_PRIMARY]
            }),
        ),
        ChartSpec::new(
            "chart-top-qtd",
            json!({
                "series": [{ "name": "Quantidade", "data": data.produtos.qtd_values }],
                "chart": { "type": "bar", "height": 250 },
                "plotOptions": { "bar": { "horizontal": true, "borderRadius": 4 } },
                "xaxis": { "categories": data.produtos.qtd_labels },
                "colors": [COLOR_SECONDARY]
            }),
        ),
        ChartSpec::new(
            "chart-vendas-yoy",
            json!({
                "series": [
                    { "name": year.to_string(), "data": data.vendas.atual },
                    { "name": (year - 1).to_string(), "data": data.vendas.anterior }
                ],
                "chart": { "type": "line", "height": 200 },
                "xaxis": { "categories": meses }
            }),
        ),
        ChartSpec::new(
            "chart-custos",
            json!({
                "series": data.custos.values,
                "labels": data.custos.labels,
                "chart": { "type": "donut", "height": 250 },
                "colors": [COLOR_PRIMARY, COLOR_SECONDARY, COLOR_DONUT_LIGHT, COLOR_TERTIARY]
            }),
        ),
        ChartSpec::new(
            "chart-fornecedores",
            json!({
                "series": data.fornecedores.values,
                "labels": data.fornecedores.labels,
                "chart": { "type": "donut", "height": 250 },
                "colors": [COLOR_PRIMARY, COLOR_SECONDARY, COLOR_DONUT_LIGHT]
            }),
        ),
    ]
}

/// Рендер всех графиков, для которых на странице есть контейнер.
///
/// Returns how many charts were drawn.
pub fn render_charts(data: &ChartData, year: i32) -> usize {
    if data.is_empty() {
        log::warn!("Dados de gráficos não disponíveis");
        return 0;
    }

    let window = leptos::prelude::window();
    let constructor = match Reflect::get(&window, &JsValue::from_str("ApexCharts")) {
        Ok(value) if value.is_function() => value.unchecked_into::<Function>(),
        _ => {
            log::error!("ApexCharts is not loaded, charts are skipped");
            return 0;
        }
    };

    let document = leptos::prelude::document();
    let mut rendered = 0;
    for spec in chart_specs(data, year) {
        let Some(container) = document.get_element_by_id(spec.container_id) else {
            continue;
        };
        // повторный рендер (новые данные) начинается с пустого контейнера
        container.set_inner_html("");
        match render_chart(&constructor, &container, &spec) {
            Ok(()) => rendered += 1,
            Err(err) => log::error!("Failed to render {}: {:?}", spec.container_id, err),
        }
    }
    rendered
}

fn render_chart(
    constructor: &Function,
    container: &web_sys::Element,
    spec: &ChartSpec,
) -> Result<(), JsValue> {
    let options = spec
        .options
        .serialize(&Serializer::json_compatible())
        .map_err(|err| JsValue::from_str(&err.to_string()))?;

    if let Some(format) = spec.y_format {
        let formatter = Function::new_with_args("val", format.js_body());
        let labels = Object::new();
        Reflect::set(&labels, &JsValue::from_str("formatter"), &formatter)?;
        let yaxis = Object::new();
        Reflect::set(&yaxis, &JsValue::from_str("labels"), &labels)?;
        Reflect::set(&options, &JsValue::from_str("yaxis"), &yaxis)?;
    }

    let chart = Reflect::construct(constructor, &Array::of2(container, &options))?;
    let render: Function = Reflect::get(&chart, &JsValue::from_str("render"))?.dyn_into()?;
    render.call0(&chart)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::dashboards::d400_client_report::LabeledValues;

    fn sample() -> ChartData {
        let mut data = ChartData::default();
        data.meses = vec!["Jan".into(), "Fev".into()];
        data.ativos.total = vec![100.0, 110.0];
        data.custos = LabeledValues {
            labels: vec!["Pessoal".into(), "Aluguel".into()],
            values: vec![60.0, 40.0],
        };
        data
    }

    #[test]
    fn test_all_containers_have_a_spec() {
        let ids: Vec<&str> = chart_specs(&sample(), 2024)
            .iter()
            .map(|s| s.container_id)
            .collect();
        assert_eq!(ids.len(), 10);
        assert!(ids.contains(&"chart-ativos-evolucao"));
        assert!(ids.contains(&"chart-fornecedores"));
    }

    #[test]
    fn test_common_options_are_merged() {
        let specs = chart_specs(&sample(), 2024);
        let evolucao = &specs[0].options;
        assert_eq!(evolucao["chart"]["type"], "line");
        assert_eq!(evolucao["chart"]["toolbar"]["show"], false);
        assert_eq!(evolucao["dataLabels"]["enabled"], false);
        assert_eq!(evolucao["colors"][0], COLOR_PRIMARY);
        assert_eq!(evolucao["series"][0]["data"], json!([100.0, 110.0]));
        assert_eq!(specs[0].y_format, Some(YFormat::ThousandsBrl));

        let passivos = specs.iter().find(|s| s.container_id == "chart-passivos").unwrap();
        assert_eq!(passivos.options["colors"], json!([COLOR_TERTIARY, COLOR_SECONDARY]));
    }

    #[test]
    fn test_missing_series_default_to_empty() {
        let specs = chart_specs(&sample(), 2024);
        let fornecedores = specs
            .iter()
            .find(|s| s.container_id == "chart-fornecedores")
            .unwrap();
        assert_eq!(fornecedores.options["series"], json!([]));
        assert_eq!(fornecedores.options["labels"], json!([]));
    }

    #[test]
    fn test_sales_series_are_named_by_year() {
        let specs = chart_specs(&sample(), 2024);
        let vendas = specs.iter().find(|s| s.container_id == "chart-vendas-yoy").unwrap();
        assert_eq!(vendas.options["series"][0]["name"], "2024");
        assert_eq!(vendas.options["series"][1]["name"], "2023");
    }
}
