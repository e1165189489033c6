use std::collections::VecDeque;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::USER_AGENT;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::credentials::{CredentialStore, Credentials};
use crate::errors::SaverError;
use crate::models::{
    ApiErrorBody, Listing, ListingData, MeResponse, RawThing, SavedItem, TokenResponse,
};

pub const AUTH_BASE_URL: &str = "https://www.reddit.com";
pub const API_BASE_URL: &str = "https://oauth.reddit.com";
/// Largest page the listing endpoints hand out.
pub const DEFAULT_PAGE_SIZE: usize = 100;

const TOKEN_PATH: &str = "/api/v1/access_token";
const ME_PATH: &str = "/api/v1/me";

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout: Duration,
    pub auth_base_url: String,
    pub api_base_url: String,
    pub page_size: usize,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            auth_base_url: AUTH_BASE_URL.to_string(),
            api_base_url: API_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Resolves `profile` from `store` and logs in with it.
pub fn authenticate(
    profile: &str,
    store: &CredentialStore,
    options: ClientOptions,
) -> Result<Session, SaverError> {
    let credentials = store.resolve(profile)?;
    let session = RedditClient::new(options)?.authenticate(&credentials)?;
    info!(
        "Authenticated profile `{profile}` as u/{}",
        credentials.username
    );
    Ok(session)
}

#[derive(Clone)]
pub struct RedditClient {
    client: Client,
    options: ClientOptions,
}

impl RedditClient {
    pub fn new(options: ClientOptions) -> Result<Self, SaverError> {
        if options.page_size == 0 {
            return Err(SaverError::Config("page size must be greater than 0".to_string()));
        }
        let client = Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(SaverError::Request)?;
        Ok(Self { client, options })
    }

    /// Exchanges script-app credentials for a bearer token (OAuth2 password grant).
    pub fn authenticate(self, credentials: &Credentials) -> Result<Session, SaverError> {
        let response = self
            .client
            .post(endpoint(&self.options.auth_base_url, TOKEN_PATH))
            .header(USER_AGENT, credentials.user_agent.as_str())
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .form(&[
                ("grant_type", "password"),
                ("username", credentials.username.as_str()),
                ("password", credentials.password.as_str()),
            ])
            .send()
            .map_err(SaverError::Request)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SaverError::Authentication(format!(
                "client credentials rejected (HTTP {})",
                status.as_u16()
            )));
        }
        let token: TokenResponse = read_json(response)?;
        if let Some(error) = token.error {
            return Err(SaverError::Authentication(format!(
                "token endpoint returned `{error}`"
            )));
        }
        let access_token = token
            .access_token
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                SaverError::Authentication("token response has no access_token".to_string())
            })?;
        debug!(
            "Obtained {} token valid for {:?}s",
            token.token_type.as_deref().unwrap_or("bearer"),
            token.expires_in
        );

        Ok(Session {
            client: self.client,
            options: self.options,
            access_token,
            user_agent: credentials.user_agent.clone(),
        })
    }
}

/// An authenticated connection acting as the logged-in user.
pub struct Session {
    client: Client,
    options: ClientOptions,
    access_token: String,
    user_agent: String,
}

impl Session {
    pub fn current_user(&self) -> Result<User<'_>, SaverError> {
        let me: MeResponse = self.get_json(ME_PATH, &[]).map_err(|err| match err {
            SaverError::Api { status: 401, message } => SaverError::Authentication(message),
            other => other,
        })?;
        debug!("Current user is u/{}", me.name);
        Ok(User {
            name: me.name,
            session: self,
        })
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, SaverError> {
        let response = self
            .client
            .get(endpoint(&self.options.api_base_url, path))
            .header(USER_AGENT, self.user_agent.as_str())
            .bearer_auth(&self.access_token)
            .query(params)
            .send()
            .map_err(SaverError::Request)?;
        read_json(response)
    }
}

pub struct User<'a> {
    name: String,
    session: &'a Session,
}

impl<'a> User<'a> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lazily pages through the user's saved posts and comments, newest first.
    ///
    /// `limit: None` walks the whole collection. Pages are requested only as
    /// the iterator drains the previous one, so dropping it early stops fetching.
    pub fn saved(&self, limit: Option<usize>) -> SavedItems<'a> {
        SavedItems {
            session: self.session,
            path: format!("/user/{}/saved", self.name),
            limit,
            buffer: VecDeque::new(),
            after: None,
            seen: 0,
            yielded: 0,
            pages: 0,
            done: false,
        }
    }
}

pub struct SavedItems<'a> {
    session: &'a Session,
    path: String,
    limit: Option<usize>,
    buffer: VecDeque<RawThing>,
    after: Option<String>,
    seen: usize,
    yielded: usize,
    pages: usize,
    done: bool,
}

impl SavedItems<'_> {
    pub fn pages_fetched(&self) -> usize {
        self.pages
    }

    fn fetch_page(&mut self) -> Result<(), SaverError> {
        let page_size = self.session.options.page_size;
        let page_size = match self.limit {
            Some(limit) => limit.saturating_sub(self.yielded).min(page_size),
            None => page_size,
        };
        let mut params = vec![
            ("limit", page_size.to_string()),
            ("count", self.seen.to_string()),
            ("raw_json", "1".to_string()),
        ];
        if let Some(after) = &self.after {
            params.push(("after", after.clone()));
        }

        let listing: Listing = self.session.get_json(&self.path, &params)?;
        let ListingData { after, children } = listing.data;
        self.pages += 1;
        debug!(
            "Fetched saved page {} with {} items (after={:?})",
            self.pages,
            children.len(),
            after
        );

        self.seen += children.len();
        if children.is_empty() || after.is_none() {
            self.done = true;
        }
        self.after = after;
        self.buffer.extend(children);
        Ok(())
    }
}

impl Iterator for SavedItems<'_> {
    type Item = Result<SavedItem, SaverError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.limit.is_some_and(|limit| self.yielded >= limit) {
            return None;
        }
        if self.buffer.is_empty() {
            if self.done {
                return None;
            }
            if let Err(err) = self.fetch_page() {
                self.done = true;
                return Some(Err(err));
            }
        }
        let raw = self.buffer.pop_front()?;
        self.yielded += 1;
        let item = SavedItem::try_from(raw);
        if item.is_err() {
            self.done = true;
            self.buffer.clear();
        }
        Some(item)
    }
}

fn endpoint(base: &str, path: &str) -> String {
    format!("{}{path}", base.trim_end_matches('/'))
}

fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, SaverError> {
    let status = response.status();
    let bytes = response.bytes().map_err(SaverError::Request)?;
    if !status.is_success() {
        let message = serde_json::from_slice::<ApiErrorBody>(&bytes)
            .ok()
            .and_then(|body| body.message)
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| "unknown".to_string());
        return Err(SaverError::Api {
            status: status.as_u16(),
            message,
        });
    }
    serde_json::from_slice(&bytes).map_err(|err| SaverError::InvalidJson(err.to_string()))
}
