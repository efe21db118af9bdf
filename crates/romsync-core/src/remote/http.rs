//! HTTP client for a RomM catalog server.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{group_saves_by_rom, RemoteCatalog, SavesByRom};
use crate::config::{HostConfig, SyncSettings};
use crate::models::{RemotePlatform, RemoteRom, RemoteSave};
use crate::util::{compact_text, is_http_url};
use crate::{Error, Result};

const ROM_PAGE_SIZE: usize = 250;
const UPLOAD_FIELD: &str = "saveFile";

/// Basic-auth RomM API client.
#[derive(Clone)]
pub struct RommClient {
    base_url: String,
    username: String,
    password: String,
    api_timeout: Duration,
    download_timeout: Duration,
    client: reqwest::Client,
}

impl std::fmt::Debug for RommClient {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("RommClient")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct RomPage {
    #[serde(default)]
    items: Vec<RemoteRom>,
    #[serde(default)]
    total: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    detail: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

impl RommClient {
    pub fn new(host: &HostConfig, settings: &SyncSettings) -> Result<Self> {
        host.validate()?;
        Ok(Self {
            base_url: host.url(),
            username: host.username.clone(),
            password: host.password.clone(),
            api_timeout: settings.api_timeout(),
            download_timeout: settings.download_timeout(),
            client: reqwest::Client::builder().build()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorized(&self, request: RequestBuilder, timeout: Duration) -> RequestBuilder {
        request
            .basic_auth(&self.username, Some(&self.password))
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(timeout)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(url = %url, "GET");
        let request = self.authorized(self.client.get(&url), self.api_timeout).query(query);
        let response = ensure_success(request.send().await?).await?;
        Ok(response.json::<T>().await?)
    }

    /// Absolute URL for a server-provided download path.
    fn download_url(&self, download_path: &str) -> String {
        if is_http_url(download_path) {
            return download_path.to_string();
        }
        let encoded = download_path
            .trim_start_matches('/')
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!("{}/{encoded}", self.base_url)
    }
}

#[async_trait]
impl RemoteCatalog for RommClient {
    async fn list_platforms(&self) -> Result<Vec<RemotePlatform>> {
        self.get_json("/api/platforms", &[]).await
    }

    async fn list_roms(&self, platform_id: i64) -> Result<Vec<RemoteRom>> {
        let mut roms = Vec::new();
        loop {
            let page: RomPage = self
                .get_json(
                    "/api/roms",
                    &[
                        ("platform_id", platform_id.to_string()),
                        ("limit", ROM_PAGE_SIZE.to_string()),
                        ("offset", roms.len().to_string()),
                    ],
                )
                .await?;
            let count = page.items.len();
            roms.extend(page.items);

            let reached_total = page.total.is_some_and(|total| roms.len() >= total);
            if count < ROM_PAGE_SIZE || reached_total {
                break;
            }
        }
        Ok(roms)
    }

    async fn list_saves_by_platform(&self, platform_id: i64) -> Result<SavesByRom> {
        let saves: Vec<RemoteSave> = self
            .get_json("/api/saves", &[("platform_id", platform_id.to_string())])
            .await?;
        Ok(group_saves_by_rom(saves))
    }

    async fn download_save(&self, download_path: &str) -> Result<Vec<u8>> {
        let url = self.download_url(download_path);
        tracing::debug!(url = %url, "Downloading save");
        let request = self.authorized(self.client.get(&url), self.download_timeout);
        let response = ensure_success(request.send().await?).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn upload_save(&self, rom_id: i64, local_file: &Path) -> Result<RemoteSave> {
        let file_name = local_file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| Error::InvalidInput("upload path has no file name".to_string()))?;
        let bytes = tokio::fs::read(local_file).await?;
        let form = Form::new().part(UPLOAD_FIELD, Part::bytes(bytes).file_name(file_name));

        let url = format!("{}/api/saves", self.base_url);
        tracing::debug!(url = %url, rom_id, "Uploading save");
        let request = self
            .authorized(self.client.post(&url), self.download_timeout)
            .query(&[("rom_id", rom_id.to_string())])
            .multipart(form);
        let response = ensure_success(request.send().await?).await?;
        Ok(response.json::<RemoteSave>().await?)
    }
}

async fn ensure_success(response: Response) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(Error::Remote(parse_api_error(status, &body)))
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.detail.or(payload.message).or(payload.error) {
            return format!("{} ({})", compact_text(&message), status.as_u16());
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", compact_text(trimmed), status.as_u16())
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use super::*;

    async fn spawn_one_shot_server(status_line: &str, body: &str) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test server");
        let address = listener.local_addr().expect("local address");
        let body = body.to_string();
        let response = format!(
            "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            body.len(),
            body
        );

        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut request_buffer = [0_u8; 4096];
                let _ = socket.read(&mut request_buffer).await;
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });

        format!("http://{address}")
    }

    fn client_for(url: &str) -> RommClient {
        let host = HostConfig {
            root_uri: url.to_string(),
            username: "player".to_string(),
            password: "secret".to_string(),
            ..Default::default()
        };
        RommClient::new(&host, &SyncSettings::default()).unwrap()
    }

    #[test]
    fn new_rejects_host_without_scheme() {
        let host = HostConfig {
            root_uri: "romm.local".to_string(),
            ..Default::default()
        };
        assert!(RommClient::new(&host, &SyncSettings::default()).is_err());
    }

    #[test]
    fn debug_redacts_password() {
        let debug = format!("{:?}", client_for("http://romm.local"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn download_url_encodes_segments() {
        let client = client_for("http://romm.local:8080");
        assert_eq!(
            client.download_url("/api/raw/saves/Pokemon [2024-03-01 10-30-00-000].sav"),
            "http://romm.local:8080/api/raw/saves/Pokemon%20%5B2024-03-01%2010-30-00-000%5D.sav"
        );
        assert_eq!(
            client.download_url("https://cdn.example.com/a.sav"),
            "https://cdn.example.com/a.sav"
        );
    }

    #[test]
    fn parse_api_error_prefers_detail() {
        assert_eq!(
            parse_api_error(StatusCode::NOT_FOUND, r#"{"detail":"Rom not found"}"#),
            "Rom not found (404)"
        );
        assert_eq!(parse_api_error(StatusCode::BAD_GATEWAY, ""), "HTTP 502");
    }

    #[tokio::test]
    async fn list_platforms_parses_payload() {
        let url = spawn_one_shot_server(
            "200 OK",
            r#"[{"id": 3, "slug": "gba", "name": "Game Boy Advance", "rom_count": 12}]"#,
        )
        .await;

        let platforms = client_for(&url).list_platforms().await.unwrap();
        assert_eq!(platforms.len(), 1);
        assert_eq!(platforms[0].slug, "gba");
    }

    #[tokio::test]
    async fn list_saves_groups_by_rom() {
        let url = spawn_one_shot_server(
            "200 OK",
            r#"[
                {"id": 1, "rom_id": 42, "file_name": "a.sav", "file_extension": "sav",
                 "download_path": "/a", "updated_at": "2024-03-01T10:30:00Z"},
                {"id": 2, "rom_id": 42, "file_name": "b.sav", "file_extension": "sav",
                 "download_path": "/b", "updated_at": "2024-03-02T10:30:00Z"}
            ]"#,
        )
        .await;

        let grouped = client_for(&url).list_saves_by_platform(3).await.unwrap();
        assert_eq!(grouped[&42].len(), 2);
    }

    #[tokio::test]
    async fn http_failure_surfaces_remote_error() {
        let url = spawn_one_shot_server("500 Internal Server Error", r#"{"detail":"boom"}"#).await;
        let error = client_for(&url).list_platforms().await.unwrap_err();
        assert!(error.to_string().contains("boom (500)"));
    }
}
