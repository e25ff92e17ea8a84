use contracts::dashboards::d400_client_report::ReportContext;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};

use super::error::ReportError;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;

/// Renders the printable version of a report (A4, text and tables).
pub fn render_pdf(ctx: &ReportContext) -> Result<Vec<u8>, ReportError> {
    let mut pdf = PdfBuilder::new(&format!("RPS Relatório {}", ctx.client_id))?;

    // Capa
    pdf.gap(60.0);
    pdf.heading("Relatório Financeiro", 26.0);
    pdf.gap(6.0);
    pdf.line(&ctx.client_name, 16.0);
    pdf.line(&format!("Cliente {}", ctx.client_id), 12.0);
    pdf.line(&format!("Período: {}", ctx.period), 12.0);
    if let Some(filter) = &ctx.filter {
        pdf.line(&format!("Filiais: {}", filter.branches.join(", ")), 12.0);
    }

    pdf.new_page();
    pdf.heading("Resumo", 18.0);
    let k = &ctx.kpis;
    for (label, value) in [
        ("Vendas líquidas", &k.vendas_liquidas),
        ("Carga tributária", &k.carga_tributaria),
        ("Compras", &k.compras),
        ("CAPEX", &k.capex),
        ("OPEX", &k.opex),
        ("FINEX", &k.finex),
        ("Outros", &k.outros),
        ("Lucro líquido", &k.lucro_liquido),
    ] {
        pdf.row(&[label, value.as_str()], &[0.0, 90.0], 11.0);
    }

    pdf.gap(8.0);
    pdf.heading("Indicadores", 18.0);
    let i = &ctx.indicators;
    for (label, value) in [
        ("EBITDA", &i.ebitda),
        ("Liquidez corrente", &i.liquidez_corrente),
        ("Margem líquida", &i.margem_liquida),
        ("Endividamento", &i.endividamento),
        ("ROA", &i.roa),
        ("NCG", &i.ncg),
    ] {
        pdf.row(&[label, value.as_str()], &[0.0, 90.0], 11.0);
    }

    pdf.gap(8.0);
    pdf.heading("Rentabilidade: ROE x CDI", 18.0);
    let columns = [0.0, 40.0, 80.0, 120.0];
    pdf.row(&["Período", "ROE (%)", "CDI (%)", "Delta (p.p.)"], &columns, 11.0);
    for r in &ctx.roe_table {
        pdf.row(
            &[
                r.periodo.as_str(),
                format!("{:.1}", r.roe).as_str(),
                format!("{:.1}", r.cdi).as_str(),
                format!("{:+.1}", r.delta).as_str(),
            ],
            &columns,
            11.0,
        );
    }

    pdf.finish()
}

/// Text-flow writer over printpdf: keeps a cursor and breaks pages.
struct PdfBuilder {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    bold: IndirectFontRef,
    /// Distance from the bottom edge, in mm
    y: f32,
}

impl PdfBuilder {
    fn new(title: &str) -> Result<Self, ReportError> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ReportError::Pdf(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ReportError::Pdf(e.to_string()))?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            layer,
            font,
            bold,
            y: PAGE_HEIGHT - MARGIN,
        })
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT - MARGIN;
    }

    fn advance(&mut self, size: f32) {
        let step = size * 0.3528 * 1.5; // pt -> mm, with line spacing
        if self.y - step < MARGIN {
            self.new_page();
        }
        self.y -= step;
    }

    fn gap(&mut self, mm: f32) {
        self.y -= mm;
    }

    fn heading(&mut self, text: &str, size: f32) {
        self.advance(size);
        self.layer
            .use_text(text, size, Mm(MARGIN), Mm(self.y), &self.bold);
    }

    fn line(&mut self, text: &str, size: f32) {
        self.advance(size);
        self.layer
            .use_text(text, size, Mm(MARGIN), Mm(self.y), &self.font);
    }

    /// One table row; `offsets` are column positions relative to the margin
    fn row(&mut self, cells: &[&str], offsets: &[f32], size: f32) {
        self.advance(size);
        for (cell, offset) in cells.iter().zip(offsets) {
            self.layer
                .use_text(*cell, size, Mm(MARGIN + offset), Mm(self.y), &self.font);
        }
    }

    fn finish(self) -> Result<Vec<u8>, ReportError> {
        self.doc
            .save_to_bytes()
            .map_err(|e| ReportError::Pdf(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::dashboards::d400_client_report::{ChartData, Indicators, Kpis, RoeRow};

    fn context() -> ReportContext {
        let brl = |s: &str| s.to_string();
        ReportContext {
            client_id: "1001".into(),
            client_name: "Aurora Comércio Ltda".into(),
            period: "Jan/2024".into(),
            filter: None,
            kpis: Kpis {
                vendas_liquidas: brl("R$ 100,00"),
                carga_tributaria: brl("R$ 18,00"),
                compras: brl("R$ 40,00"),
                capex: brl("R$ 5,00"),
                opex: brl("R$ 15,00"),
                finex: brl("R$ 3,00"),
                outros: brl("R$ 2,00"),
                lucro_liquido: brl("R$ 17,00"),
                lucro_liquido_raw: 17.0,
            },
            indicators: Indicators {
                ebitda: brl("R$ 15,00"),
                liquidez_corrente: "1.45".into(),
                margem_liquida: "17%".into(),
                endividamento: "45%".into(),
                roa: "8%".into(),
                ncg: brl("R$ 10,00"),
            },
            roe_table: vec![RoeRow {
                periodo: "3 M".into(),
                roe: 4.5,
                cdi: 2.8,
                delta: 1.7,
            }],
            charts: ChartData::default(),
        }
    }

    #[test]
    fn test_render_pdf_produces_pdf_bytes() {
        let bytes = render_pdf(&context()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }
}
