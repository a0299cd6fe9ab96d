//! Contest sources on disk
//!
//! - Contest list CSV (`findingsRepo` column)
//! - Local markdown reports, a single file or a directory
//! - Saving retrieved reports

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::contest::ContestInput;

/// One row of the contest list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContestEntry {
    #[serde(rename = "findingsRepo", default)]
    pub findings_repo: String,
}

/// Check that `url` is an absolute http(s) address.
pub fn is_valid_web_address(url: &str) -> bool {
    match reqwest::Url::parse(url) {
        Ok(parsed) => {
            matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some()
        }
        Err(_) => false,
    }
}

/// Load the contest list, skipping rows without a usable findings repo.
pub fn load_contest_list(path: impl AsRef<Path>) -> Result<Vec<ContestEntry>> {
    let path = path.as_ref();
    if !path.exists() {
        bail!("Contest list not found: {}", path.display());
    }

    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open contest list {}", path.display()))?;

    let mut entries = Vec::new();
    for (row, record) in reader.deserialize::<ContestEntry>().enumerate() {
        let entry = record.with_context(|| format!("Malformed contest list row {}", row + 1))?;
        if !is_valid_web_address(&entry.findings_repo) {
            warn!(
                "Skipping row {}: invalid findings repo '{}'",
                row + 1,
                entry.findings_repo
            );
            continue;
        }
        entries.push(entry);
    }

    debug!("Loaded {} contests from {}", entries.len(), path.display());
    Ok(entries)
}

/// Markdown files to process: `path` itself if it is a `.md` file, else
/// every `.md` file directly inside the directory, sorted by name.
pub fn find_markdown_files(path: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let path = path.as_ref();
    if !path.exists() {
        bail!("{} does not exist", path.display());
    }

    if is_markdown(path) {
        if path.is_file() {
            return Ok(vec![path.to_path_buf()]);
        }
        bail!("{} is not a file", path.display());
    }

    let mut files: Vec<PathBuf> = fs::read_dir(path)
        .with_context(|| format!("Failed to read directory {}", path.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && is_markdown(p))
        .collect();
    files.sort();

    if files.is_empty() {
        bail!("No .md files found in {}", path.display());
    }
    Ok(files)
}

fn is_markdown(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "md")
}

/// Repository name used to key the exception tables.
///
/// `https://github.com/code-423n4/2023-10-wildcat-findings` -> `2023-10-wildcat`,
/// `reports/2023-10-wildcat.md` -> `2023-10-wildcat`.
pub fn repo_name_from(input: &str) -> String {
    if input.starts_with("https://") {
        let last = input.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
        return match last.rsplit_once('-') {
            Some((head, _)) => head.to_string(),
            None => String::new(),
        };
    }
    if input.ends_with(".md") {
        let file = input.rsplit('/').next().unwrap_or(input);
        return file.split('.').next().unwrap_or(file).to_string();
    }
    input.to_string()
}

/// Read a local report into a contest input.
pub fn read_local_contest(path: &Path) -> Result<ContestInput> {
    let raw_report = fs::read_to_string(path)
        .with_context(|| format!("Failed to read report {}", path.display()))?;
    let url = path.to_string_lossy().into_owned();
    Ok(ContestInput {
        repo_name: repo_name_from(&url),
        url,
        raw_report,
    })
}

/// Write a retrieved report to `<dir>/<repo_name>.md`.
pub fn save_report(dir: impl AsRef<Path>, repo_name: &str, text: &str) -> Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    let path = dir.join(format!("{}.md", repo_name));
    fs::write(&path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    debug!("Saved report to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_name_from_url() {
        assert_eq!(
            repo_name_from("https://github.com/code-423n4/2023-10-wildcat-findings"),
            "2023-10-wildcat"
        );
        assert_eq!(
            repo_name_from("https://github.com/code-423n4/2022-11-size-findings/"),
            "2022-11-size"
        );
    }

    #[test]
    fn test_repo_name_from_path() {
        assert_eq!(repo_name_from("reports/2023-08-dopex.md"), "2023-08-dopex");
        assert_eq!(repo_name_from("2023-08-dopex.md"), "2023-08-dopex");
        assert_eq!(repo_name_from("2023-08-dopex"), "2023-08-dopex");
    }

    #[test]
    fn test_web_address_validation() {
        assert!(is_valid_web_address("https://github.com/code-423n4/x-findings"));
        assert!(is_valid_web_address("http://example.com"));
        assert!(!is_valid_web_address(""));
        assert!(!is_valid_web_address("not a url"));
        assert!(!is_valid_web_address("ftp://example.com/x"));
    }

    #[test]
    fn test_load_contest_list() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("contests.csv");
        fs::write(
            &path,
            "title,findingsRepo\n\
             Wildcat,https://github.com/code-423n4/2023-10-wildcat-findings\n\
             Private,\n\
             Dopex,https://github.com/code-423n4/2023-08-dopex-findings\n",
        )?;

        let entries = load_contest_list(&path)?;
        let repos: Vec<_> = entries.iter().map(|e| e.findings_repo.as_str()).collect();
        assert_eq!(
            repos,
            vec![
                "https://github.com/code-423n4/2023-10-wildcat-findings",
                "https://github.com/code-423n4/2023-08-dopex-findings",
            ]
        );
        Ok(())
    }

    #[test]
    fn test_load_missing_contest_list() {
        assert!(load_contest_list("/nonexistent/contests.csv").is_err());
    }

    #[test]
    fn test_find_markdown_files() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("b.md"), "b")?;
        fs::write(dir.path().join("a.md"), "a")?;
        fs::write(dir.path().join("notes.txt"), "x")?;

        let files = find_markdown_files(dir.path())?;
        let names: Vec<_> = files
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
            .collect();
        assert_eq!(names, vec!["a.md", "b.md"]);

        let single = find_markdown_files(dir.path().join("a.md"))?;
        assert_eq!(single.len(), 1);
        Ok(())
    }

    #[test]
    fn test_find_markdown_files_errors() -> Result<()> {
        let dir = tempfile::tempdir()?;
        assert!(find_markdown_files(dir.path()).is_err());
        assert!(find_markdown_files(dir.path().join("missing.md")).is_err());
        Ok(())
    }

    #[test]
    fn test_save_and_read_back() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = save_report(dir.path().join("reports"), "2023-01-x", "# Overview\n")?;
        assert!(path.ends_with("2023-01-x.md"));

        let contest = read_local_contest(&path)?;
        assert_eq!(contest.repo_name, "2023-01-x");
        assert_eq!(contest.raw_report, "# Overview\n");
        Ok(())
    }
}
