use anyhow::Context;

/// Turns an uploaded résumé document into plain text.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, file_name: &str, data: &[u8]) -> anyhow::Result<String>;
}

/// Extension-dispatched extractor covering every accepted upload format.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentExtractor;

impl TextExtractor for DocumentExtractor {
    fn extract(&self, file_name: &str, data: &[u8]) -> anyhow::Result<String> {
        let ext = file_extension(file_name).unwrap_or_default();
        match ext.as_str() {
            "pdf" => extract_pdf(data),
            "docx" => extract_docx(data),
            "doc" => Ok(extract_legacy_doc(data)),
            "txt" | "json" | "xml" => Ok(String::from_utf8_lossy(data).into_owned()),
            other => anyhow::bail!("unsupported document type: {other:?}"),
        }
    }
}

/// Lowercased extension of a file name or storage key, if any.
pub fn file_extension(name: &str) -> Option<String> {
    let base = name.rsplit('/').next().unwrap_or(name);
    let (stem, ext) = base.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

fn extract_pdf(data: &[u8]) -> anyhow::Result<String> {
    let text = pdf_extract::extract_text_from_mem(data).context("pdf text extraction")?;
    Ok(text.trim().to_string())
}

fn extract_docx(data: &[u8]) -> anyhow::Result<String> {
    use docx_rs::{DocumentChild, ParagraphChild, RunChild};

    let docx = docx_rs::read_docx(data).map_err(|e| anyhow::anyhow!("docx read: {e}"))?;
    let mut text = String::new();
    for child in docx.document.children {
        if let DocumentChild::Paragraph(p) = child {
            for pc in p.children {
                if let ParagraphChild::Run(run) = pc {
                    for rc in run.children {
                        if let RunChild::Text(t) = rc {
                            text.push_str(&t.text);
                        }
                    }
                }
            }
            text.push('\n');
        }
    }
    Ok(text.trim_end().to_string())
}

// Word 97 binaries keep body text as plain 8-bit runs; pull out the readable ones.
fn extract_legacy_doc(data: &[u8]) -> String {
    const MIN_RUN: usize = 4;

    let mut runs: Vec<String> = Vec::new();
    let mut current = String::new();
    for &b in data {
        if b.is_ascii_graphic() || b == b' ' {
            current.push(b as char);
        } else {
            if current.trim().len() >= MIN_RUN {
                runs.push(current.trim().to_string());
            }
            current.clear();
        }
    }
    if current.trim().len() >= MIN_RUN {
        runs.push(current.trim().to_string());
    }
    runs.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(file_extension("CV.PDF").as_deref(), Some("pdf"));
        assert_eq!(file_extension("resumes/u/abc.docx").as_deref(), Some("docx"));
        assert_eq!(file_extension("archive.tar.xml").as_deref(), Some("xml"));
        assert_eq!(file_extension("README"), None);
        assert_eq!(file_extension(".bashrc"), None);
        assert_eq!(file_extension("trailing."), None);
    }

    #[test]
    fn plain_formats_pass_through() {
        let ex = DocumentExtractor;
        assert_eq!(ex.extract("cv.txt", b"I know Python well").unwrap(), "I know Python well");
        assert_eq!(ex.extract("cv.json", br#"{"skills":["Rust"]}"#).unwrap(), r#"{"skills":["Rust"]}"#);
        assert_eq!(ex.extract("cv.xml", b"<cv>SQL</cv>").unwrap(), "<cv>SQL</cv>");
    }

    #[test]
    fn unsupported_type_errors() {
        assert!(DocumentExtractor.extract("cv.exe", b"MZ").is_err());
        assert!(DocumentExtractor.extract("cv", b"abc").is_err());
    }

    #[test]
    fn legacy_doc_keeps_readable_runs() {
        let mut data = vec![0xD0, 0xCF, 0x11, 0xE0];
        data.extend_from_slice(b"Senior Rust Engineer");
        data.extend_from_slice(&[0x00, 0x01, b'a', b'b', 0x02]);
        data.extend_from_slice(b"PostgreSQL, Kafka");
        let text = extract_legacy_doc(&data);
        assert_eq!(text, "Senior Rust Engineer\nPostgreSQL, Kafka");
    }
}
