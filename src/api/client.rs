use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::{RecipeApi, DRAFT_PATH, LOGIN_PATH, RECIPES_PATH};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::models::{DraftRecipe, DraftRecipeUpdate, Recipe};

/// HTTP implementation of [`RecipeApi`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            base: config.api_url.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Resolves an API path or a server-issued URL against the base.
    /// Absolute URLs pass through unchanged.
    fn resolve(&self, path_or_url: &str) -> Result<Url, ApiError> {
        self.base
            .join(path_or_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{path_or_url}: {e}")))
    }

    async fn check(&self, response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized {
                login_url: self.login_url(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response) -> Result<T, ApiError> {
        let response = self.check(response).await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl RecipeApi for ApiClient {
    async fn list_recipes(&self) -> Result<Vec<Recipe>, ApiError> {
        let url = self.resolve(RECIPES_PATH)?;
        debug!(%url, "fetching recipes");
        let response = self.http.get(url).send().await?;
        self.decode(response).await
    }

    async fn delete_recipe(&self, name: &str) -> Result<(), ApiError> {
        let url = self.resolve(RECIPES_PATH)?;
        let response = self
            .http
            .delete(url)
            .query(&[("recipe_name", name)])
            .send()
            .await?;
        self.check(response).await?;
        info!(recipe = name, "deleted recipe");
        Ok(())
    }

    async fn get_draft(&self) -> Result<DraftRecipe, ApiError> {
        let url = self.resolve(DRAFT_PATH)?;
        debug!(%url, "fetching draft");
        let response = self.http.get(url).send().await?;
        self.decode(response).await
    }

    async fn save_draft(&self, update: &DraftRecipeUpdate) -> Result<DraftRecipe, ApiError> {
        let url = self.resolve(DRAFT_PATH)?;
        debug!(%url, name = %update.name, "saving draft");
        let response = self.http.post(url).json(update).send().await?;
        self.decode(response).await
    }

    async fn upload_to_slot(
        &self,
        put_url: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), ApiError> {
        let url = self.resolve(put_url)?;
        let size = bytes.len();
        let response = self
            .http
            .put(url)
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;
        self.check(response).await?;
        debug!(size, content_type, "uploaded media");
        Ok(())
    }

    async fn delete_media(&self, delete_url: &str) -> Result<(), ApiError> {
        let url = self.resolve(delete_url)?;
        let response = self.http.delete(url).send().await?;
        self.check(response).await?;
        info!("deleted draft media");
        Ok(())
    }

    async fn fetch_content(&self, content_url: &str) -> Result<String, ApiError> {
        let url = self.resolve(content_url)?;
        let response = self.http.get(url).send().await?;
        let response = self.check(response).await?;
        Ok(response.text().await?)
    }

    fn login_url(&self) -> String {
        self.base
            .join(LOGIN_PATH)
            .map(String::from)
            .unwrap_or_else(|_| format!("{}{}", self.base, LOGIN_PATH))
    }
}
