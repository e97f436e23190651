//! The result surface: JSON on stdout, or key=value lines in the CI file

use std::env;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use tracing::debug;
use verbump_wire::FinalDecision;

/// When set, the decision fields are appended here as `key=value` lines
/// instead of printing JSON to stdout.
pub const OUTPUT_FILE_ENV: &str = "GITHUB_OUTPUT";

/// The decision as the pipeline's JSON result surface.
pub fn render(decision: &FinalDecision) -> Result<String, serde_json::Error> {
    serde_json::to_string(decision)
}

/// Write the decision where the environment asks for it.
pub fn emit(decision: &FinalDecision) -> anyhow::Result<()> {
    match env::var(OUTPUT_FILE_ENV) {
        Ok(path) if !path.is_empty() => {
            debug!(path, "appending decision to CI output file");
            append_output_file(Path::new(&path), decision)?;
        }
        _ => println!("{}", render(decision)?),
    }
    Ok(())
}

/// Append the three decision fields as `key=value` lines, one per line,
/// in fixed order. The format is line-oriented, so embedded newlines in
/// the reasoning are flattened to spaces.
pub fn append_output_file(path: &Path, decision: &FinalDecision) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "version_type={}", decision.version_type.as_str())?;
    writeln!(file, "needs_review={}", decision.needs_review)?;
    writeln!(
        file,
        "reasoning={}",
        decision.reasoning.replace(['\r', '\n'], " ")
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use verbump_wire::VersionType;

    fn decision() -> FinalDecision {
        FinalDecision {
            version_type: VersionType::Minor,
            needs_review: false,
            reasoning: "two new public functions".into(),
        }
    }

    #[test]
    fn render_uses_the_fixed_field_names() {
        let json = render(&decision()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version_type"], "minor");
        assert_eq!(value["needs_review"], false);
        assert_eq!(value["reasoning"], "two new public functions");
    }

    #[test]
    fn output_file_gets_key_value_lines_in_order() {
        let file = tempfile::NamedTempFile::new().unwrap();
        append_output_file(file.path(), &decision()).unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines,
            vec![
                "version_type=minor",
                "needs_review=false",
                "reasoning=two new public functions",
            ]
        );
    }

    #[test]
    fn appending_preserves_existing_content() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "existing=1\n").unwrap();
        append_output_file(file.path(), &decision()).unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        assert!(content.starts_with("existing=1\n"));
        assert!(content.contains("version_type=minor"));
    }

    #[test]
    fn newlines_in_reasoning_are_flattened() {
        let mut d = decision();
        d.reasoning = "line one\nline two".into();
        let file = tempfile::NamedTempFile::new().unwrap();
        append_output_file(file.path(), &d).unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        assert!(content.contains("reasoning=line one line two"));
        assert_eq!(content.lines().count(), 3);
    }
}
