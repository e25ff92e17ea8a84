use js_sys::{Array, Function, Reflect};
use serde::Serialize;
use serde_wasm_bindgen::Serializer;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::HtmlCanvasElement;

use super::charts::COLOR_PRIMARY;

#[derive(Debug, Serialize)]
struct QrOptions {
    width: u32,
    margin: u32,
    color: QrColors,
}

#[derive(Debug, Serialize)]
struct QrColors {
    dark: &'static str,
    light: &'static str,
}

/// Ссылка на PDF, закодированная в QR на обложке
pub fn pdf_qr_url(origin: &str, client_id: &str, periodo: &str) -> String {
    format!(
        "{}/report/pdf/{}?periodo={}",
        origin,
        urlencoding::encode(client_id),
        urlencoding::encode(periodo)
    )
}

/// Draws `url` into `canvas` with the global `QRCode` library.
/// Without the library the cover simply has no code.
pub fn render_qr(canvas: &HtmlCanvasElement, url: &str) {
    if let Err(err) = try_render_qr(canvas, url) {
        log::info!("QR Code não disponível: {:?}", err);
    }
}

fn try_render_qr(canvas: &HtmlCanvasElement, url: &str) -> Result<(), JsValue> {
    let window = leptos::prelude::window();
    let qrcode = Reflect::get(&window, &JsValue::from_str("QRCode"))?;
    if qrcode.is_undefined() || qrcode.is_null() {
        return Err(JsValue::from_str("QRCode is not loaded"));
    }
    let to_canvas: Function = Reflect::get(&qrcode, &JsValue::from_str("toCanvas"))?.dyn_into()?;

    let options = QrOptions {
        width: 200,
        margin: 1,
        color: QrColors {
            dark: COLOR_PRIMARY,
            light: "#ffffff",
        },
    }
    .serialize(&Serializer::json_compatible())
    .map_err(|err| JsValue::from_str(&err.to_string()))?;

    let done = Closure::once_into_js(move |error: JsValue| {
        if !error.is_null() && !error.is_undefined() {
            log::error!("Erro ao gerar QR code: {:?}", error);
        }
    });

    to_canvas.apply(
        &qrcode,
        &Array::of4(canvas, &JsValue::from_str(url), &options, &done),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_qr_url() {
        assert_eq!(
            pdf_qr_url("http://localhost:3000", "1001", "Maio/2024"),
            "http://localhost:3000/report/pdf/1001?periodo=Maio%2F2024"
        );
        assert_eq!(
            pdf_qr_url("https://rps.example", "1001", ""),
            "https://rps.example/report/pdf/1001?periodo="
        );
    }
}
