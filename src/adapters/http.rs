use crate::core::{CartEntry, CartSource, IngredientLine, RecipeId, UserIdentity};
use crate::utils::error::{ExportError, Result};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::OnceCell;
use url::Url;

const DEFAULT_PAGE_SIZE: usize = 100;

/// 分頁回應 `{count, next, previous, results}`
#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default)]
    next: Option<String>,
    results: Option<Vec<T>>,
}

#[derive(Debug, Deserialize)]
struct RecipeSummary {
    id: RecipeId,
}

#[derive(Debug, Deserialize)]
struct RecipeDetail {
    #[serde(default)]
    ingredients: Vec<IngredientLine>,
}

/// Cart source backed by the recipe REST API.
///
/// The API only exposes the cart of the token's owner, so `cart_entries`
/// refuses any other user with `AuthenticationError`.
pub struct HttpCartSource {
    client: Client,
    base_url: Url,
    token: Option<String>,
    timeout: Option<Duration>,
    page_size: usize,
    owner: OnceCell<UserIdentity>,
}

impl HttpCartSource {
    pub fn new(endpoint: &str) -> Result<Self> {
        let mut base_url = Url::parse(endpoint).map_err(|e| ExportError::InvalidConfigValueError {
            field: "source.endpoint".to_string(),
            value: endpoint.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })?;
        // join() 會取代最後一段路徑，所以基底必須以 '/' 結尾
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client: Client::new(),
            base_url,
            token: None,
            timeout: None,
            page_size: DEFAULT_PAGE_SIZE,
            owner: OnceCell::new(),
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Resolves the owner of the configured token. The answer is cached.
    pub async fn current_user(&self) -> Result<UserIdentity> {
        #[derive(Deserialize)]
        struct Me {
            id: u64,
            username: String,
        }

        let owner = self
            .owner
            .get_or_try_init(|| async {
                let me: Me = self.get_json(self.api_url("api/users/me/")?).await?;
                tracing::debug!("Token belongs to '{}'", me.username);
                Ok::<_, ExportError>(UserIdentity {
                    id: Some(me.id),
                    username: me.username,
                })
            })
            .await?;
        Ok(owner.clone())
    }

    /// The identity an export runs as. A requested username must match the
    /// token's owner.
    pub async fn resolve_user(&self, requested: Option<&str>) -> Result<UserIdentity> {
        let owner = self.current_user().await?;
        match requested {
            Some(username) if username != owner.username => Err(ExportError::AuthenticationError {
                message: format!(
                    "token belongs to '{}', cannot export the cart of '{}'",
                    owner.username, username
                ),
            }),
            _ => Ok(owner),
        }
    }

    fn api_url(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(|e| ExportError::ConfigError {
            message: format!("Cannot build API URL for '{}': {}", path, e),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let mut request = self.client.get(url.clone());

        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Token {}", token));
        }

        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        tracing::debug!("Making API request to: {}", url);
        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("API response status: {}", status);

        match status {
            s if s.is_success() => Ok(response.json::<T>().await?),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(ExportError::AuthenticationError {
                    message: format!("{} answered {}", url, status),
                })
            }
            s => Err(ExportError::UpstreamError {
                status: s.as_u16(),
                url: url.to_string(),
            }),
        }
    }
}

impl CartSource for HttpCartSource {
    async fn cart_entries(&self, user: &UserIdentity) -> Result<Vec<CartEntry>> {
        let owner = self.current_user().await?;
        if owner.username != user.username {
            return Err(ExportError::AuthenticationError {
                message: format!(
                    "token belongs to '{}', not '{}'",
                    owner.username, user.username
                ),
            });
        }

        let mut url = self.api_url("api/recipes/")?;
        url.query_pairs_mut()
            .append_pair("is_in_shopping_cart", "1")
            .append_pair("limit", &self.page_size.to_string());

        tracing::debug!("Fetching shopping cart of '{}'", user.username);

        let mut entries = Vec::new();
        let mut next = Some(url);
        while let Some(page_url) = next.take() {
            let page: Page<RecipeSummary> = self.get_json(page_url).await?;

            match page.results {
                Some(results) => {
                    entries.extend(results.into_iter().map(|r| CartEntry { recipe_id: r.id }))
                }
                None => tracing::warn!("Recipe page without 'results', treating as empty"),
            }

            next = page
                .next
                .map(|link| Url::parse(&link))
                .transpose()
                .map_err(|e| ExportError::ProcessingError {
                    message: format!("Invalid pagination link: {}", e),
                })?;
        }

        Ok(entries)
    }

    async fn ingredient_lines(&self, recipe_id: RecipeId) -> Result<Vec<IngredientLine>> {
        let url = self.api_url(&format!("api/recipes/{}/", recipe_id))?;

        match self.get_json::<RecipeDetail>(url).await {
            Ok(detail) => Ok(detail.ingredients),
            Err(ExportError::UpstreamError { status: 404, .. }) => {
                Err(ExportError::RecipeNotFound { recipe_id })
            }
            Err(e) => Err(e),
        }
    }
}
