use crate::error::FontError;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Where to load a font from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    Remote(String),
    File(PathBuf),
}

impl FontSource {
    /// `http://` and `https://` locations are remote; anything else is a path.
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            Self::Remote(location.to_string())
        } else {
            Self::File(PathBuf::from(location))
        }
    }

    /// Fetch the raw font bytes. Remote fetches give up after `timeout`.
    pub fn fetch(&self, timeout: Duration) -> Result<Vec<u8>, FontError> {
        match self {
            Self::File(path) => {
                tracing::debug!(path = %path.display(), "reading font file");
                Ok(std::fs::read(path)?)
            }
            Self::Remote(url) => {
                tracing::info!(%url, "downloading font");
                let agent: ureq::Agent = ureq::Agent::config_builder()
                    .timeout_global(Some(timeout))
                    .build()
                    .into();
                let fetch_error = |reason: String| FontError::Fetch {
                    url: url.clone(),
                    reason,
                };
                let bytes = agent
                    .get(url)
                    .call()
                    .map_err(|e| fetch_error(e.to_string()))?
                    .into_body()
                    .read_to_vec()
                    .map_err(|e| fetch_error(e.to_string()))?;
                tracing::debug!(%url, bytes = bytes.len(), "font downloaded");
                Ok(bytes)
            }
        }
    }
}

impl fmt::Display for FontSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(url) => write!(f, "{url}"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_distinguishes_urls() {
        assert_eq!(
            FontSource::parse("https://example.com/a.json"),
            FontSource::Remote("https://example.com/a.json".into())
        );
        assert_eq!(
            FontSource::parse("fonts/a.json"),
            FontSource::File(PathBuf::from("fonts/a.json"))
        );
    }

    #[test]
    fn reads_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"{}").unwrap();
        let source = FontSource::File(tmp.path().to_path_buf());
        assert_eq!(source.fetch(Duration::from_secs(1)).unwrap(), b"{}");
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = FontSource::File(dir.path().join("missing.json"));
        assert!(matches!(
            source.fetch(Duration::from_secs(1)),
            Err(FontError::Io(_))
        ));
    }

    #[test]
    fn display_shows_location() {
        assert_eq!(
            FontSource::parse("https://example.com/f.json").to_string(),
            "https://example.com/f.json"
        );
    }
}
