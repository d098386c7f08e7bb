//! Destinations catalog
//!
//! Reads the list of pre-selected destinations offered to users. The file is
//! line oriented: `name,address`, split on the first comma only. Blank lines
//! and lines starting with `#` are ignored; malformed lines are skipped.

use patrol_core::domain::destination::Destination;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Destinations file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read destinations file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Loads and parses the catalog file
pub async fn load(path: &Path) -> Result<Vec<Destination>, CatalogError> {
    let text = tokio::fs::read_to_string(path).await.map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            CatalogError::NotFound(path.to_path_buf())
        } else {
            CatalogError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    Ok(parse(&text))
}

/// Parses catalog text, skipping malformed lines with a warning
pub fn parse(text: &str) -> Vec<Destination> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let Some((name, address)) = line.split_once(',') else {
                tracing::warn!("Skipping malformed line (not enough parts): {}", line);
                return None;
            };

            let (name, address) = (name.trim(), address.trim());
            if name.is_empty() || address.is_empty() {
                tracing::warn!(
                    "Skipping malformed line (empty name or address): {}",
                    line
                );
                return None;
            }

            Some(Destination::new(name, address))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let text = "# header\n\nGoogle DNS,8.8.8.8:53\n   \n  # indented comment\nExample, http://example.com \n";
        assert_eq!(
            parse(text),
            vec![
                Destination::new("Google DNS", "8.8.8.8:53"),
                Destination::new("Example", "http://example.com"),
            ]
        );
    }

    #[test]
    fn test_parse_splits_on_first_comma() {
        let destinations = parse("Query,https://api.example.com/search?q=a,b");
        assert_eq!(destinations.len(), 1);
        assert_eq!(destinations[0].address, "https://api.example.com/search?q=a,b");
    }

    #[test]
    fn test_parse_skips_malformed_lines() {
        let text = "no-comma-here\n,1.1.1.1:53\nEmpty Address,  \nValid,10.0.0.1:22";
        assert_eq!(parse(text), vec![Destination::new("Valid", "10.0.0.1:22")]);
    }

    #[test]
    fn test_parse_handles_crlf() {
        let destinations = parse("A,a.com:443\r\nB,b.com:443\r\n");
        assert_eq!(destinations[1], Destination::new("B", "b.com:443"));
    }

    #[tokio::test]
    async fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Cloudflare DNS,1.1.1.1:53").unwrap();

        let destinations = load(file.path()).await.unwrap();
        assert_eq!(destinations, vec![Destination::new("Cloudflare DNS", "1.1.1.1:53")]);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("missing.txt")).await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_load_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(dir.path()).await.unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }
}
