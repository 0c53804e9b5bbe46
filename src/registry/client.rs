use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use log::debug;
use regex::Regex;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, LINK, WWW_AUTHENTICATE};
use reqwest::{Method, StatusCode, Url};
use serde::Deserialize;

use crate::config::RegistryConfig;
use crate::error::{DrcleanError, Result};
use crate::registry::Registry;

/// Manifest media types accepted when resolving a tag to its digest.
const MANIFEST_ACCEPT: &str = "application/vnd.docker.distribution.manifest.v2+json, \
application/vnd.docker.distribution.manifest.list.v2+json, \
application/vnd.oci.image.manifest.v1+json, \
application/vnd.oci.image.index.v1+json";

const DIGEST_HEADER: &str = "Docker-Content-Digest";

#[derive(Debug, Deserialize)]
struct TagList {
    #[serde(default)]
    tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    token: String,
    #[serde(default)]
    access_token: String,
}

/// Docker Registry HTTP API v2 client.
///
/// Uses basic auth with the configured credentials. When the registry
/// answers with a `Bearer` challenge, a repository-scoped token is fetched
/// from the challenge realm and cached for later requests.
pub struct HttpRegistry {
    base_url: String,
    username: String,
    password: String,
    client: Client,
    tokens: Mutex<HashMap<String, String>>,
}

impl HttpRegistry {
    /// Create a client for the configured registry
    pub fn new(config: &RegistryConfig) -> Result<Self> {
        let base_url = config.url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(DrcleanError::config("registry.url must not be empty"));
        }
        Url::parse(&base_url).map_err(|e| {
            DrcleanError::config(format!("registry.url '{}' is not a URL: {}", base_url, e))
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("drclean/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(HttpRegistry {
            base_url,
            username: config.username.clone(),
            password: config.password.clone(),
            client,
            tokens: Mutex::new(HashMap::new()),
        })
    }

    fn cached_token(&self, repo: &str) -> Option<String> {
        self.tokens.lock().ok().and_then(|t| t.get(repo).cloned())
    }

    fn authorize(&self, request: RequestBuilder, repo: &str) -> RequestBuilder {
        if let Some(token) = self.cached_token(repo) {
            request.bearer_auth(token)
        } else if !self.username.is_empty() {
            request.basic_auth(&self.username, Some(&self.password))
        } else {
            request
        }
    }

    /// Send a request, answering one `Bearer` challenge if the registry asks.
    fn send(&self, method: Method, url: &str, repo: &str, accept: Option<&str>) -> Result<Response> {
        let build = || {
            let request = self.client.request(method.clone(), url);
            let request = match accept {
                Some(accept) => request.header(ACCEPT, accept),
                None => request,
            };
            self.authorize(request, repo)
        };

        let mut response = build().send()?;
        if response.status() == StatusCode::UNAUTHORIZED {
            let challenge = response
                .headers()
                .get(WWW_AUTHENTICATE)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_bearer_challenge);
            if let Some(challenge) = challenge {
                self.fetch_token(&challenge, repo)?;
                response = build().send()?;
            }
        }

        let status = response.status();
        if !status.is_success() {
            return Err(DrcleanError::registry(format!(
                "{} {} returned {}",
                method, url, status
            )));
        }
        Ok(response)
    }

    fn fetch_token(&self, challenge: &BearerChallenge, repo: &str) -> Result<()> {
        let scope = format!("repository:{}:pull,delete", repo);
        debug!("requesting token from {} for {}", challenge.realm, scope);

        let mut request = self
            .client
            .get(&challenge.realm)
            .query(&[("scope", scope.as_str())]);
        if let Some(service) = &challenge.service {
            request = request.query(&[("service", service.as_str())]);
        }
        if !self.username.is_empty() {
            request = request.basic_auth(&self.username, Some(&self.password));
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(DrcleanError::registry(format!(
                "token request to {} returned {}",
                challenge.realm, status
            )));
        }

        let body: TokenResponse = response.json()?;
        let token = if body.token.is_empty() {
            body.access_token
        } else {
            body.token
        };
        if token.is_empty() {
            return Err(DrcleanError::registry(format!(
                "token service {} returned no token",
                challenge.realm
            )));
        }

        let mut tokens = self
            .tokens
            .lock()
            .map_err(|_| DrcleanError::registry("token cache lock poisoned"))?;
        tokens.insert(repo.to_string(), token);
        Ok(())
    }
}

impl Registry for HttpRegistry {
    fn list_tags(&self, repo: &str) -> Result<Vec<String>> {
        let mut tags = Vec::new();
        let mut url = Url::parse(&format!("{}/v2/{}/tags/list", self.base_url, repo))
            .map_err(|e| DrcleanError::registry(format!("bad tags list URL for {}: {}", repo, e)))?;
        let mut seen = HashSet::from([url.clone()]);

        loop {
            let response = self.send(Method::GET, url.as_str(), repo, None)?;
            let next = response
                .headers()
                .get(LINK)
                .and_then(|v| v.to_str().ok())
                .and_then(|link| next_page_url(link, &url));
            let page: TagList = response.json()?;
            tags.extend(page.tags.unwrap_or_default());

            match unvisited_page(&mut seen, repo, next)? {
                Some(next) => url = next,
                None => break,
            }
        }

        debug!("{} lists {} tags over {} page(s)", repo, tags.len(), seen.len());
        Ok(tags)
    }

    fn manifest_digest(&self, repo: &str, tag: &str) -> Result<String> {
        let url = format!("{}/v2/{}/manifests/{}", self.base_url, repo, tag);
        let response = self.send(Method::HEAD, &url, repo, Some(MANIFEST_ACCEPT))?;
        response
            .headers()
            .get(DIGEST_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                DrcleanError::registry(format!("no {} header for {}:{}", DIGEST_HEADER, repo, tag))
            })
    }

    fn delete_manifest(&self, repo: &str, digest: &str) -> Result<()> {
        let url = format!("{}/v2/{}/manifests/{}", self.base_url, repo, digest);
        self.send(Method::DELETE, &url, repo, None)?;
        Ok(())
    }
}

/// Parameters of a `WWW-Authenticate: Bearer ...` challenge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerChallenge {
    pub realm: String,
    pub service: Option<String>,
}

/// Parse a `Bearer realm="...",service="..."` challenge.
///
/// Returns `None` for other schemes or when no realm is given.
pub fn parse_bearer_challenge(header: &str) -> Option<BearerChallenge> {
    let params = header.trim().strip_prefix("Bearer ")?;
    let re = Regex::new(r#"(\w+)="([^"]*)""#).ok()?;

    let mut realm = None;
    let mut service = None;
    for caps in re.captures_iter(params) {
        match &caps[1] {
            "realm" => realm = Some(caps[2].to_string()),
            "service" => service = Some(caps[2].to_string()),
            _ => {}
        }
    }

    Some(BearerChallenge {
        realm: realm?,
        service,
    })
}

/// Record `next` as fetched, failing if the listing has already been there.
fn unvisited_page(seen: &mut HashSet<Url>, repo: &str, next: Option<Url>) -> Result<Option<Url>> {
    match next {
        Some(next) if !seen.insert(next.clone()) => Err(DrcleanError::registry(format!(
            "tag listing for {} points back to {}",
            repo, next
        ))),
        next => Ok(next),
    }
}

/// Extract the `rel="next"` target of a `Link` header.
///
/// Registries usually send an absolute path (`</v2/app/tags/list?last=x&n=100>`),
/// which replaces the path of the page it came from; full URLs are taken as is.
pub fn next_page_url(link: &str, current: &Url) -> Option<Url> {
    let re = Regex::new(r#"<([^>]+)>\s*;\s*rel="?next"?"#).ok()?;
    let target = re.captures(link)?.get(1)?.as_str();
    current.join(target).ok()
}
