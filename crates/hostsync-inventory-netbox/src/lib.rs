// # NetBox Inventory Source
//
// This crate provides the NetBox IPAM inventory source for hostsync.
//
// ## Behaviour
//
// - One GET per page against `<base>/api/ipam/ip-addresses`
// - `Authorization: Token <token>`; the token never appears in logs or Debug output
// - Whole fetch bounded by a deadline; expiry is a transport error
// - By default only the first page is consumed. A `next` link marks the
//   inventory as truncated. `PaginationMode::Follow` walks the `next` links.
// - NO retry and NO caching: every failure ends the sync pass
//
// ## Error Mapping
//
// | Failure                          | Error                 |
// |----------------------------------|-----------------------|
// | URL cannot be built              | `RequestConstruction` |
// | Connect/read failure, deadline   | `Transport`           |
// | Non-2xx status                   | `UpstreamStatus`      |
// | Body not a listing               | `Decode`              |
//
// ## API Reference
//
// - List IP addresses: GET `/api/ipam/ip-addresses/`
//   `{ "count": n, "next": url|null, "previous": url|null, "results": [...] }`

use async_trait::async_trait;
use hostsync_core::config::{InventoryConfig, PaginationMode};
use hostsync_core::traits::{AddressRecord, Inventory, InventorySource};
use hostsync_core::{Error, Result};
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;

/// Path of the IP address listing, relative to the NetBox base URL
const IP_ADDRESSES_PATH: &str = "/api/ipam/ip-addresses";

/// Upper bound on pages walked in follow mode
const MAX_PAGES: usize = 1000;

/// One page of the IP address listing
#[derive(Debug, Deserialize)]
struct IpAddressList {
    #[serde(default)]
    count: u64,
    #[serde(default)]
    next: Option<String>,
    #[serde(default)]
    #[allow(dead_code)]
    previous: Option<String>,
    results: Vec<AddressRecord>,
}

impl IpAddressList {
    fn next_link(&self) -> Option<&str> {
        self.next.as_deref().filter(|s| !s.is_empty())
    }
}

/// NetBox inventory source
pub struct NetboxInventory {
    /// NetBox base URL, without trailing slash
    base_url: String,

    /// API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// Whether `next` links are followed
    pagination: PaginationMode,

    /// Deadline for the whole fetch
    timeout: Duration,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for NetboxInventory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetboxInventory")
            .field("base_url", &self.base_url)
            .field("api_token", &"<REDACTED>")
            .field("pagination", &self.pagination)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl NetboxInventory {
    /// Create a new NetBox inventory source
    ///
    /// # Parameters
    ///
    /// - `base_url`: NetBox base URL (e.g. "https://netbox.example.com")
    /// - `api_token`: API token with read access to IPAM
    /// - `pagination`: Whether to follow `next` links
    /// - `timeout`: Deadline for one complete fetch
    pub fn new(
        base_url: impl Into<String>,
        api_token: impl Into<String>,
        pagination: PaginationMode,
        timeout: Duration,
    ) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let api_token = api_token.into();

        if base_url.is_empty() {
            return Err(Error::config("NetBox base URL cannot be empty"));
        }
        if api_token.is_empty() {
            return Err(Error::config("NetBox API token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            api_token,
            pagination,
            timeout,
            client,
        })
    }

    /// Create a source from the inventory section of the sync configuration
    pub fn from_config(config: &InventoryConfig) -> Result<Self> {
        config.validate()?;
        Self::new(
            config.base_url.clone(),
            config.api_token.clone(),
            config.pagination,
            config.timeout(),
        )
    }

    /// URL of the first listing page
    fn listing_url(&self) -> Result<Url> {
        let raw = format!("{}{}", self.base_url, IP_ADDRESSES_PATH);
        Url::parse(&raw)
            .map_err(|e| Error::request_construction(format!("Invalid inventory URL '{}': {}", raw, e)))
    }

    /// Fetch and decode one listing page
    ///
    /// # API Call
    ///
    /// ```http
    /// GET /api/ipam/ip-addresses
    /// Authorization: Token <token>
    /// Accept: application/json
    /// ```
    async fn fetch_page(&self, url: Url) -> Result<IpAddressList> {
        tracing::debug!("Fetching inventory page: {}", url);

        let response = self
            .client
            .get(url)
            .header(reqwest::header::AUTHORIZATION, format!("Token {}", self.api_token))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_builder() {
                    Error::request_construction(format!("Error creating request: {}", e))
                } else {
                    Error::transport(format!("Error making request: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("Inventory request rejected with status {}", status);
            return Err(Error::upstream_status(status.to_string()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::transport(format!("Error reading response: {}", e)))?;

        serde_json::from_slice(&body).map_err(|e| Error::decode(e.to_string()))
    }

    async fn fetch_all(&self) -> Result<Inventory> {
        let mut page = self.fetch_page(self.listing_url()?).await?;
        tracing::debug!(
            "Inventory lists {} address(es), first page holds {}",
            page.count,
            page.results.len()
        );
        let mut records = std::mem::take(&mut page.results);

        if self.pagination == PaginationMode::FirstPage {
            return Ok(Inventory {
                records,
                truncated: page.next_link().is_some(),
            });
        }

        let mut pages = 1;
        while let Some(next) = page.next_link() {
            if pages >= MAX_PAGES {
                tracing::warn!("Stopped following inventory pages after {} pages", pages);
                return Ok(Inventory {
                    records,
                    truncated: true,
                });
            }

            let url = Url::parse(next).map_err(|e| {
                Error::request_construction(format!("Invalid next page link '{}': {}", next, e))
            })?;
            page = self.fetch_page(url).await?;
            records.append(&mut page.results);
            pages += 1;
        }

        tracing::debug!("Walked {} inventory page(s)", pages);
        Ok(Inventory::complete(records))
    }
}

#[async_trait]
impl InventorySource for NetboxInventory {
    /// Fetch the IP address inventory
    ///
    /// Makes one request per page, never retries, and never caches.
    async fn fetch(&self) -> Result<Inventory> {
        tokio::time::timeout(self.timeout, self.fetch_all())
            .await
            .map_err(|_| {
                Error::transport(format!("Inventory fetch timed out after {:?}", self.timeout))
            })?
    }

    fn source_name(&self) -> &'static str {
        "netbox"
    }
}
