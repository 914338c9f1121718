use std::panic::{catch_unwind, AssertUnwindSafe};

use docx_rs::{DocumentChild, Paragraph, ParagraphChild, RunChild};

use super::ExtractFailure;

pub(super) fn extract(bytes: &[u8]) -> Result<String, ExtractFailure> {
    if bytes.is_empty() {
        return Err(ExtractFailure::Empty);
    }

    let doc = catch_unwind(AssertUnwindSafe(|| docx_rs::read_docx(bytes)))
        .map_err(|_| ExtractFailure::Parse("DOCX parser panicked".to_string()))?
        .map_err(|e| ExtractFailure::Parse(e.to_string()))?;

    // Top-level paragraphs only; tables, headers and footers are not part of
    // the email body.
    let paragraphs: Vec<String> = doc
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(para) => Some(paragraph_text(para)),
            _ => None,
        })
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .collect();

    if paragraphs.is_empty() {
        return Err(ExtractFailure::NoText);
    }

    Ok(paragraphs.join("\n"))
}

fn paragraph_text(para: &Paragraph) -> String {
    let mut out = String::new();
    for child in &para.children {
        push_child_text(child, &mut out);
    }
    out
}

fn push_child_text(child: &ParagraphChild, out: &mut String) {
    match child {
        ParagraphChild::Run(run) => {
            for run_child in &run.children {
                match run_child {
                    RunChild::Text(text) => out.push_str(&text.text),
                    RunChild::Tab(_) => out.push('\t'),
                    _ => {}
                }
            }
        }
        ParagraphChild::Hyperlink(link) => {
            for inner in &link.children {
                push_child_text(inner, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{Docx, Hyperlink, HyperlinkType, Run};
    use std::io::Cursor;

    fn pack(docx: Docx) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        docx.build().pack(&mut buf).unwrap();
        buf.into_inner()
    }

    fn para(text: &str) -> Paragraph {
        Paragraph::new().add_run(Run::new().add_text(text))
    }

    #[test]
    fn test_paragraphs_joined_in_order() {
        let bytes = pack(
            Docx::new()
                .add_paragraph(para("Dear Hiring Manager,"))
                .add_paragraph(para("   "))
                .add_paragraph(para("  I am writing to apply.  "))
                .add_paragraph(Paragraph::new())
                .add_paragraph(para("Best regards")),
        );

        assert_eq!(
            extract(&bytes).unwrap(),
            "Dear Hiring Manager,\nI am writing to apply.\nBest regards"
        );
    }

    #[test]
    fn test_runs_within_paragraph_concatenate() {
        let bytes = pack(
            Docx::new().add_paragraph(
                Paragraph::new()
                    .add_run(Run::new().add_text("Hello"))
                    .add_run(Run::new().add_text(",world")),
            ),
        );
        assert_eq!(extract(&bytes).unwrap(), "Hello,world");
    }

    #[test]
    fn test_hyperlink_text_is_kept() {
        let link =
            Hyperlink::new("pricing", HyperlinkType::Anchor).add_run(Run::new().add_text("pricing"));
        let bytes = pack(
            Docx::new().add_paragraph(
                Paragraph::new()
                    .add_run(Run::new().add_text("See:"))
                    .add_hyperlink(link),
            ),
        );
        assert_eq!(extract(&bytes).unwrap(), "See:pricing");
    }

    #[test]
    fn test_only_blank_paragraphs_is_no_text() {
        let bytes = pack(Docx::new().add_paragraph(para("  ")).add_paragraph(Paragraph::new()));
        assert_eq!(extract(&bytes), Err(ExtractFailure::NoText));
    }

    #[test]
    fn test_empty_buffer() {
        assert_eq!(extract(&[]), Err(ExtractFailure::Empty));
    }

    #[test]
    fn test_not_a_zip_is_parse_error() {
        assert!(matches!(extract(b"plain text"), Err(ExtractFailure::Parse(_))));
    }
}
