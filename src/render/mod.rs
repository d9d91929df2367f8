//! PDF rendering of evaluations.
//!
//! The engine sits behind [`ArtifactRenderer`] so the pipeline never cares
//! how the bytes are produced; the built-in renderer emits a minimal
//! single-page summary document.

use crate::models::Evaluation;

/// Renders an evaluation to PDF bytes.
pub trait ArtifactRenderer: Send + Sync {
    /// May fail on malformed input; must not block indefinitely. The worker
    /// runs this on a blocking task.
    fn render(&self, evaluation: &Evaluation) -> anyhow::Result<Vec<u8>>;
}

/// Built-in renderer producing a one-page summary of the evaluation.
pub struct SummaryRenderer;

impl ArtifactRenderer for SummaryRenderer {
    fn render(&self, evaluation: &Evaluation) -> anyhow::Result<Vec<u8>> {
        if evaluation.employee_name.trim().is_empty() {
            anyhow::bail!("evaluation {} has no employee name", evaluation.id);
        }

        Ok(build_pdf(&[
            format!("Self-Evaluation: {}", evaluation.display_name()),
            format!("Status: {}", evaluation.status.as_str()),
            format!("Last updated: {}", evaluation.updated_at.to_rfc3339()),
        ]))
    }
}

/// Assemble a minimal PDF 1.4 document with one text line per entry.
fn build_pdf(lines: &[String]) -> Vec<u8> {
    let mut content = String::from("BT /F1 12 Tf 72 720 Td 16 TL\n");
    for line in lines {
        let escaped = line
            .replace('\\', "\\\\")
            .replace('(', "\\(")
            .replace(')', "\\)");
        content.push_str(&format!("({escaped}) Tj T*\n"));
    }
    content.push_str("ET\n");

    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>"
            .to_string(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        format!(
            "<< /Length {} >>\nstream\n{}endstream",
            content.len(),
            content
        ),
    ];

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, body));
    }

    let xref_at = out.len();
    out.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
    for offset in offsets {
        out.push_str(&format!("{offset:010} 00000 n \n"));
    }
    out.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_at
    ));

    out.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EvaluationStatus;
    use chrono::Utc;

    fn evaluation(name: &str) -> Evaluation {
        Evaluation {
            id: 7,
            organization_id: 1,
            employee_name: name.to_string(),
            period: "2025-H1".to_string(),
            status: EvaluationStatus::Approved,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_render_produces_pdf() {
        let bytes = SummaryRenderer.render(&evaluation("Jane Doe")).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.4"));
        assert!(bytes.ends_with(b"%%EOF\n"));
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("Jane Doe 2025-H1"));
    }

    #[test]
    fn test_render_escapes_delimiters() {
        let bytes = SummaryRenderer.render(&evaluation("Jane (Janie) Doe")).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("Jane \\(Janie\\) Doe"));
    }

    #[test]
    fn test_render_rejects_blank_name() {
        assert!(SummaryRenderer.render(&evaluation("  ")).is_err());
    }
}
