use std::{
    collections::BTreeMap,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use async_trait::async_trait;
use qbt_common::{
    config::DaemonConfig,
    error::{ExporterError, Result},
};
use reqwest::{
    StatusCode,
    header::{COOKIE, HeaderMap, SET_COOKIE},
};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::{
    api::TorrentApi,
    types::{Category, SyncMainData, Torrent, TorrentPeers, TransferInfo},
};

type Query<'a> = &'a [(&'a str, &'a str)];

/// qBittorrent Web API (v2) client holding one cookie-based session.
pub struct QbitClient {
    base_url: String,
    daemon: DaemonConfig,
    http: reqwest::Client,
    session: RwLock<Option<String>>,
}

impl QbitClient {
    pub fn new(config: &DaemonConfig) -> Result<Self> {
        let base_url = build_base_url(&config.host, config.port)?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| {
                ExporterError::InternalError(format!("failed to build http client: {err}"))
            })?;

        Ok(Self {
            base_url,
            daemon: config.clone(),
            http,
            session: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn login(&self) -> Result<()> {
        let endpoint = self.endpoint("auth/login");
        let response = self
            .http
            .post(&endpoint)
            .form(&[
                ("username", self.daemon.username.as_str()),
                ("password", self.daemon.password.as_str()),
            ])
            .send()
            .await
            .map_err(|err| request_error(&endpoint, err))?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN {
            return Err(ExporterError::Authentication(
                "daemon refused the login, the exporter address is banned for too many failed attempts"
                    .to_string(),
            ));
        }
        if !status.is_success() {
            return Err(ExporterError::UnexpectedStatus {
                endpoint,
                status: status.as_u16(),
            });
        }

        let cookie = session_cookie(response.headers());
        let body = response
            .text()
            .await
            .map_err(|err| request_error(&endpoint, err))?;
        if body.trim() != "Ok." {
            return Err(ExporterError::Authentication(format!(
                "daemon rejected the credentials for user {}",
                self.daemon.username
            )));
        }

        let Some(cookie) = cookie else {
            return Err(ExporterError::Authentication(
                "daemon accepted the login without issuing a session cookie".to_string(),
            ));
        };

        *self.session_write()? = Some(cookie);
        debug!(base_url = %self.base_url, user = %self.daemon.username, "logged in to daemon");
        Ok(())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/v2/{path}", self.base_url)
    }

    async fn get(&self, path: &str, query: Query<'_>) -> Result<reqwest::Response> {
        let needs_login = self.daemon.has_credentials() && self.session_read()?.is_none();
        if needs_login {
            self.login().await?;
        }

        let endpoint = self.endpoint(path);
        let response = self.send_get(&endpoint, query).await?;

        if response.status() == StatusCode::FORBIDDEN && self.daemon.has_credentials() {
            warn!(endpoint = %endpoint, "daemon session rejected, logging in again");
            self.login().await?;
            let response = self.send_get(&endpoint, query).await?;
            return ensure_success(endpoint, response);
        }

        ensure_success(endpoint, response)
    }

    async fn send_get(&self, endpoint: &str, query: Query<'_>) -> Result<reqwest::Response> {
        let mut request = self.http.get(endpoint).query(query);
        let cookie = self.session_read()?.clone();
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }

        request
            .send()
            .await
            .map_err(|err| request_error(endpoint, err))
    }

    async fn get_text(&self, path: &str, query: Query<'_>) -> Result<String> {
        let endpoint = self.endpoint(path);
        self.get(path, query)
            .await?
            .text()
            .await
            .map_err(|err| request_error(&endpoint, err))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: Query<'_>) -> Result<T> {
        let body = self.get_text(path, query).await?;
        serde_json::from_str(&body).map_err(|err| ExporterError::Decode {
            endpoint: self.endpoint(path),
            message: err.to_string(),
        })
    }

    fn session_read(&self) -> Result<RwLockReadGuard<'_, Option<String>>> {
        self.session
            .read()
            .map_err(|_| ExporterError::InternalError("daemon session lock poisoned".to_string()))
    }

    fn session_write(&self) -> Result<RwLockWriteGuard<'_, Option<String>>> {
        self.session
            .write()
            .map_err(|_| ExporterError::InternalError("daemon session lock poisoned".to_string()))
    }
}

#[async_trait]
impl TorrentApi for QbitClient {
    async fn list_torrents(&self) -> Result<Vec<Torrent>> {
        self.get_json("torrents/info", &[]).await
    }

    async fn transfer_info(&self) -> Result<TransferInfo> {
        self.get_json("transfer/info", &[]).await
    }

    async fn app_version(&self) -> Result<String> {
        Ok(self.get_text("app/version", &[]).await?.trim().to_string())
    }

    async fn categories(&self) -> Result<BTreeMap<String, Category>> {
        self.get_json("torrents/categories", &[]).await
    }

    async fn sync_main_data(&self) -> Result<SyncMainData> {
        self.get_json("sync/maindata", &[("rid", "0")]).await
    }

    async fn torrent_peers(&self, hash: &str) -> Result<TorrentPeers> {
        self.get_json("sync/torrentPeers", &[("hash", hash), ("rid", "0")])
            .await
    }
}

fn build_base_url(host: &str, port: u16) -> Result<String> {
    let host = host.trim().trim_end_matches('/');
    let with_scheme = if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{host}")
    };

    let mut url = Url::parse(&with_scheme).map_err(|err| {
        ExporterError::InvalidConfig(format!("invalid daemon host {host:?}: {err}"))
    })?;
    url.set_port(Some(port)).map_err(|_| {
        ExporterError::InvalidConfig(format!("daemon host {host:?} cannot carry a port"))
    })?;

    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// First `name=value` pair of the session cookie set by a login response.
fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .map(str::trim)
        .find(|pair| pair.split_once('=').is_some_and(|(name, _)| !name.is_empty()))
        .map(str::to_string)
}

fn ensure_success(endpoint: String, response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    Err(ExporterError::UnexpectedStatus {
        endpoint,
        status: response.status().as_u16(),
    })
}

fn request_error(endpoint: &str, err: reqwest::Error) -> ExporterError {
    let message = if err.is_timeout() {
        "timed out".to_string()
    } else {
        err.to_string()
    };

    ExporterError::Request {
        endpoint: endpoint.to_string(),
        message,
    }
}
