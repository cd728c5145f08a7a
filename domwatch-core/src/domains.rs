use std::path::Path;

use tracing::debug;

use crate::error::{DomwatchError, Result};
use crate::validation::DomainName;

/// Parse a domain list: one name per line, `#` starts a comment line.
///
/// Order is preserved and duplicates are kept.
pub fn parse_domains(content: &str) -> Vec<DomainName> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .filter_map(|line| DomainName::new(line).ok())
        .collect()
}

/// Read and parse a domain list file.
pub async fn load_domains(path: impl AsRef<Path>) -> Result<Vec<DomainName>> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| DomwatchError::DomainListError {
            path: path.display().to_string(),
            source,
        })?;
    let domains = parse_domains(&content);
    debug!(path = %path.display(), count = domains.len(), "Loaded domain list");
    Ok(domains)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_domains() {
        let content = r#"
# production
example.com
  example.org

example.com
"#;

        let domains = parse_domains(content);
        let names: Vec<&str> = domains.iter().map(DomainName::as_str).collect();
        assert_eq!(names, vec!["example.com", "example.org", "example.com"]);
    }

    #[test]
    fn test_parse_domains_handles_crlf() {
        let domains = parse_domains("a.example\r\nb.example\r\n");
        assert_eq!(domains.len(), 2);
        assert_eq!(domains[1].as_str(), "b.example");
    }

    #[tokio::test]
    async fn test_load_domains_missing_file() {
        let result = load_domains("/nonexistent/domwatch/domains.txt").await;
        assert!(matches!(result, Err(DomwatchError::DomainListError { .. })));
    }

    #[tokio::test]
    async fn test_load_domains_reads_file() {
        let path = std::env::temp_dir().join(format!("domwatch-domains-{}.txt", std::process::id()));
        tokio::fs::write(&path, "example.com\nexample.net\n").await.unwrap();

        let domains = load_domains(&path).await.unwrap();
        let _ = tokio::fs::remove_file(&path).await;

        assert_eq!(domains.len(), 2);
        assert_eq!(domains[0].as_str(), "example.com");
    }
}
