//! HTTP client for the CWA open-data datastore
//!
//! Issues the single township-forecast GET request and writes the response
//! body, pretty-printed, to the configured output file. The write goes
//! through a temp file in the destination directory so a failed run never
//! leaves a partial output file behind.

use crate::config::FetchConfig;
use crate::CwaError;
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde_json::Value;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Blocking client for the CWA open-data datastore endpoint
pub struct CwaApiClient {
    client: Client,
    config: FetchConfig,
}

impl CwaApiClient {
    /// Create a new client from the fetch configuration
    pub fn new(config: FetchConfig) -> Result<Self> {
        let mut builder =
            Client::builder().user_agent(concat!("cwa-tools/", env!("CARGO_PKG_VERSION")));

        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }

        if config.accept_invalid_certs {
            // Matches the original script. Insecure: the server's certificate
            // chain is not verified.
            warn!("TLS certificate verification is disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    /// Fetch the township forecast document.
    ///
    /// The response status is not inspected: any body that parses as JSON is
    /// treated as a successful fetch, non-2xx included.
    pub fn fetch_township(&self) -> Result<Value> {
        info!(
            "Requesting forecast for '{}' ({})",
            self.config.location_name,
            self.config.element_list()
        );

        let element_list = self.config.element_list();
        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[
                ("Authorization", self.config.authorization.as_str()),
                ("locationName", self.config.location_name.as_str()),
                ("elementName", element_list.as_str()),
            ])
            .send()
            .map_err(CwaError::from)
            .with_context(|| format!("Request to {} failed", self.config.base_url))?;

        debug!(status = %response.status(), "Response received");

        let document: Value = response
            .json()
            .map_err(CwaError::from)
            .with_context(|| "Failed to parse response body as JSON")?;

        Ok(document)
    }
}

/// Serialize a JSON document with 2-space indentation, non-ASCII characters
/// emitted literally, and a trailing newline
pub fn to_pretty_string(document: &Value) -> Result<String> {
    let mut body = serde_json::to_string_pretty(document)
        .map_err(CwaError::from)
        .with_context(|| "Failed to serialize document")?;
    body.push('\n');
    Ok(body)
}

/// Write a JSON document to `path` atomically (temp file + rename)
pub fn write_pretty_json(document: &Value, path: &Path) -> Result<()> {
    let body = to_pretty_string(document)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)
        .map_err(CwaError::from)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;

    file.write_all(body.as_bytes())
        .map_err(CwaError::from)
        .with_context(|| "Failed to write output document")?;

    file.persist(path)
        .map_err(|e| CwaError::from(e.error))
        .with_context(|| format!("Failed to move output into place at {}", path.display()))?;

    debug!("Wrote {} bytes to {}", body.len(), path.display());
    Ok(())
}

/// Fetch the configured township forecast and write it to the output file
pub fn run_fetch(config: &FetchConfig) -> Result<()> {
    let output_path = config.output_path.clone();
    let client = CwaApiClient::new(config.clone())?;
    let document = client.fetch_township()?;
    write_pretty_json(&document, &output_path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_config(base_url: String, output_path: std::path::PathBuf) -> FetchConfig {
        FetchConfig {
            base_url,
            output_path,
            accept_invalid_certs: false,
            timeout_seconds: Some(5),
            ..FetchConfig::default()
        }
    }

    #[test]
    fn test_fetch_township_sends_expected_query() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded(
                    "Authorization".into(),
                    FetchConfig::default().authorization,
                ),
                mockito::Matcher::UrlEncoded("locationName".into(), "池上鄉".into()),
                mockito::Matcher::UrlEncoded("elementName".into(), "MinT,MaxT,PoP12h,Wx".into()),
            ]))
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": "true", "records": {"locationName": "池上鄉"}}"#)
            .create();

        let dir = tempfile::tempdir().unwrap();
        let config = test_config(server.url(), dir.path().join("township_utf8.json"));
        let client = CwaApiClient::new(config).unwrap();
        let document = client.fetch_township().unwrap();

        mock.assert();
        assert_eq!(document["records"]["locationName"], "池上鄉");
    }

    #[test]
    fn test_non_2xx_json_body_is_still_success() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/")
            .match_query(mockito::Matcher::Any)
            .with_status(401)
            .with_body(r#"{"message": "Invalid authorization"}"#)
            .create();

        let dir = tempfile::tempdir().unwrap();
        let config = test_config(server.url(), dir.path().join("out.json"));
        let client = CwaApiClient::new(config).unwrap();
        let document = client.fetch_township().unwrap();
        assert_eq!(document["message"], "Invalid authorization");
    }

    #[test]
    fn test_non_json_body_is_syntax_error() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/")
            .match_query(mockito::Matcher::Any)
            .with_body("<html>service unavailable</html>")
            .create();

        let dir = tempfile::tempdir().unwrap();
        let config = test_config(server.url(), dir.path().join("out.json"));
        let client = CwaApiClient::new(config).unwrap();
        let err = client.fetch_township().unwrap_err();
        let kind = err.downcast_ref::<CwaError>().unwrap();
        assert!(matches!(kind, CwaError::Syntax { .. }));
    }

    #[test]
    fn test_connection_failure_is_network_error() {
        // Nothing listens on the discard port
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(
            "http://127.0.0.1:9".to_string(),
            dir.path().join("out.json"),
        );
        let client = CwaApiClient::new(config).unwrap();
        let err = client.fetch_township().unwrap_err();
        let kind = err.downcast_ref::<CwaError>().unwrap();
        assert!(matches!(kind, CwaError::Network { .. }));
    }

    #[test]
    fn test_run_fetch_writes_structurally_equal_document() {
        let body = json!({
            "records": {
                "locations": [{"locationName": "池上鄉", "MinT": "18"}]
            }
        });

        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/")
            .match_query(mockito::Matcher::Any)
            .with_body(serde_json::to_string(&body).unwrap())
            .create();

        let dir = tempfile::tempdir().unwrap();
        let output_path = dir.path().join("township_utf8.json");
        let config = test_config(server.url(), output_path.clone());

        run_fetch(&config).unwrap();

        let written = std::fs::read_to_string(&output_path).unwrap();
        let reparsed: Value = serde_json::from_str(&written).unwrap();
        assert_eq!(reparsed, body);
        // Non-ASCII emitted literally, not escaped
        assert!(written.contains("池上鄉"));
        assert!(!written.contains("\\u"));
    }

    #[test]
    fn test_written_file_formatting_is_idempotent() {
        let document = json!({"站名": "池上鄉三叉路", "values": [1, 2, 3]});
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");

        write_pretty_json(&document, &path).unwrap();

        let first = std::fs::read(&path).unwrap();
        let reparsed: Value = serde_json::from_slice(&first).unwrap();
        let second = to_pretty_string(&reparsed).unwrap();
        assert_eq!(first, second.into_bytes());
    }

    #[test]
    fn test_failed_fetch_leaves_no_output_file() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/")
            .match_query(mockito::Matcher::Any)
            .with_body("not json at all")
            .create();

        let dir = tempfile::tempdir().unwrap();
        let output_path = dir.path().join("township_utf8.json");
        let config = test_config(server.url(), output_path.clone());

        assert!(run_fetch(&config).is_err());
        assert!(!output_path.exists());
        // No stray temp files either
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
