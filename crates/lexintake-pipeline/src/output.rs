//! Writing letter drafts to disk.

use std::fs;
use std::path::{Path, PathBuf};

use lexintake_core::LetterSpec;
use tracing::info;

use crate::{IntakeError, IntakePlan};

/// Reduce a letter filename to `[A-Za-z0-9._-]` with no leading dots.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "document.txt".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Write every letter in `plan` under `dir`, creating it if needed.
pub fn write_letters(plan: &IntakePlan, dir: &Path) -> Result<Vec<PathBuf>, IntakeError> {
    write_letter_files(&plan.letters, dir)
}

/// Write `letters` under `dir` with sanitised names. Existing files are replaced.
pub fn write_letter_files(letters: &[LetterSpec], dir: &Path) -> Result<Vec<PathBuf>, IntakeError> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(letters.len());
    for letter in letters {
        let path = dir.join(sanitize_filename(&letter.filename));
        fs::write(&path, &letter.body)?;
        written.push(path);
    }
    info!(dir = %dir.display(), count = written.len(), "letters written");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{IntakePipeline, IntakeRequest};
    use chrono::Utc;
    use lexintake_core::IntakeConfig;

    #[test]
    fn sanitises_names() {
        assert_eq!(sanitize_filename("preservation_walmart_2024-05-01.txt"), "preservation_walmart_2024-05-01.txt");
        assert_eq!(sanitize_filename("../../etc/passwd"), "_.._etc_passwd");
        assert_eq!(sanitize_filename("..."), "document.txt");
        assert_eq!(sanitize_filename("St. Mary's hold.txt"), "St._Mary_s_hold.txt");
    }

    #[tokio::test]
    async fn writes_each_letter() {
        let pipeline = IntakePipeline::rule_based(&IntakeConfig::default());
        let req = IntakeRequest::new(
            "I was rear-ended in a crash at the intersection of Main and 5th. Geico insures the other driver.",
            "Jane Doe",
        );
        let plan = pipeline.plan(&req, Utc::now()).await.unwrap();
        assert_eq!(plan.letters.len(), 3);

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("letters");
        let paths = write_letters(&plan, &out).unwrap();
        assert_eq!(paths.len(), 3);
        for (path, letter) in paths.iter().zip(&plan.letters) {
            assert!(path.starts_with(&out));
            assert_eq!(fs::read_to_string(path).unwrap(), letter.body);
        }
    }
}
