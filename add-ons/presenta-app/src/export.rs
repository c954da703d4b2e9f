//! Presentation export: a standalone HTML file, optionally handed to an
//! external HTML→PDF converter. The converter is configuration
//! (`pdf_command <input.html> <output.pdf>`), not a dependency.

use presenta_core::Presentation;
use std::path::{Path, PathBuf};

fn slug(address: &str) -> String {
    let mut out = String::with_capacity(address.len());
    for c in address.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}

fn document(presentation: &Presentation) -> String {
    format!(
        "<!doctype html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Listing presentation: {address}</title>\n\
         <style>\n\
         body {{ font-family: Georgia, serif; max-width: 860px; margin: 2rem auto; color: #222; }}\n\
         .analysis-section {{ margin-bottom: 2rem; }}\n\
         .listings-table {{ border-collapse: collapse; width: 100%; }}\n\
         .listings-table th, .listings-table td {{ border: 1px solid #ccc; padding: 6px 10px; }}\n\
         </style>\n</head>\n<body>\n<h1>{address}</h1>\n{content}\n</body>\n</html>\n",
        address = presentation.address,
        content = presentation.content,
    )
}

/// Writes the presentation under `dir` and returns the produced file.
/// When a converter command is configured and succeeds, that is the
/// PDF; otherwise the HTML file itself.
pub fn export_presentation(
    dir: &Path,
    presentation: &Presentation,
    pdf_command: Option<&str>,
) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let html_path = dir.join(format!("presentation-{}-{stamp}.html", slug(&presentation.address)));
    std::fs::write(&html_path, document(presentation))?;
    tracing::info!(path = %html_path.display(), "presentation exported");

    if let Some(command) = pdf_command {
        let pdf_path = html_path.with_extension("pdf");
        match std::process::Command::new(command)
            .arg(&html_path)
            .arg(&pdf_path)
            .status()
        {
            Ok(status) if status.success() => return Ok(pdf_path),
            Ok(status) => {
                tracing::warn!(%status, "pdf converter exited with failure, keeping html")
            }
            Err(err) => tracing::warn!(error = %err, "pdf converter could not be spawned"),
        }
    }
    Ok(html_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_are_filename_safe() {
        assert_eq!(slug("1428 Elm Street, Springwood"), "1428-elm-street-springwood");
        assert_eq!(slug("  #12/B  "), "12-b");
    }

    #[test]
    fn export_writes_html_without_converter() {
        let dir = tempfile::tempdir().unwrap();
        let presentation = Presentation {
            address: "1428 Elm Street".into(),
            content: "<div class=\"property-analysis\"><p>hello</p></div>".into(),
            model: "sonar".into(),
            analysis_id: None,
        };
        let path = export_presentation(dir.path(), &presentation, None).unwrap();
        assert_eq!(path.extension().unwrap(), "html");
        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.contains("1428 Elm Street"));
        assert!(written.contains("property-analysis"));
    }
}
