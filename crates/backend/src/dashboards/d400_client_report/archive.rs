use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::error::ReportError;

pub const BATCH_IDS_REQUIRED: &str =
    "Parâmetro 'ids' é obrigatório. Ex: /report/pdf-batch?ids=1001,1002";
pub const BATCH_IDS_INVALID: &str = "Parâmetro 'ids' inválido.";

/// Parses `ids=1001,1002` of the batch export. Repeated ids are kept once,
/// in first-seen order.
pub fn parse_batch_ids(raw: Option<&str>) -> Result<Vec<String>, ReportError> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Err(ReportError::BadRequest(BATCH_IDS_REQUIRED.to_string())),
        Some(raw) => raw,
    };

    let mut ids: Vec<String> = Vec::new();
    for id in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !ids.iter().any(|seen| seen == id) {
            ids.push(id.to_string());
        }
    }

    if ids.is_empty() || ids.iter().any(|id| id.contains(['/', '\\'])) {
        return Err(ReportError::BadRequest(BATCH_IDS_INVALID.to_string()));
    }
    Ok(ids)
}

pub fn pdf_file_name(client_id: &str) -> String {
    format!("RPS_Relatorio_{}.pdf", client_id)
}

/// Packs `(file name, bytes)` pairs into a deflated ZIP archive
pub fn build_zip(files: Vec<(String, Vec<u8>)>) -> Result<Vec<u8>, ReportError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, bytes) in files {
        writer
            .start_file(name, options)
            .map_err(|e| ReportError::Archive(e.to_string()))?;
        writer
            .write_all(&bytes)
            .map_err(|e| ReportError::Archive(e.to_string()))?;
    }

    let cursor = writer
        .finish()
        .map_err(|e| ReportError::Archive(e.to_string()))?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_parse_batch_ids() {
        assert_eq!(
            parse_batch_ids(Some("1001, 1002,,")).unwrap(),
            vec!["1001".to_string(), "1002".to_string()]
        );
        assert_eq!(
            parse_batch_ids(Some("1002,1001, 1002,1001")).unwrap(),
            vec!["1002".to_string(), "1001".to_string()]
        );
    }

    #[test]
    fn test_parse_batch_ids_errors() {
        let missing = parse_batch_ids(None).unwrap_err();
        assert_eq!(missing.to_string(), BATCH_IDS_REQUIRED);
        assert!(parse_batch_ids(Some("  ")).is_err());

        let blank = parse_batch_ids(Some(",,")).unwrap_err();
        assert_eq!(blank.to_string(), BATCH_IDS_INVALID);
        assert!(parse_batch_ids(Some("../etc")).is_err());
    }

    #[test]
    fn test_build_zip_roundtrip_contents() {
        let bytes = build_zip(vec![
            (pdf_file_name("1001"), b"%PDF-a".to_vec()),
            (pdf_file_name("1002"), b"%PDF-b".to_vec()),
        ])
        .unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);

        let mut content = String::new();
        archive
            .by_name("RPS_Relatorio_1002.pdf")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "%PDF-b");
    }
}
