//! Model listing: `/models`.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::Client;
use crate::error::ClientError;
use crate::headers::ApiResponse;

/// Basic information about a model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Model {
    pub id: String,
    #[serde(rename = "created", default)]
    pub created_at: i64,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub owned_by: String,
    #[serde(default)]
    pub permission: Vec<Permission>,
    #[serde(default)]
    pub root: Option<String>,
    #[serde(default)]
    pub parent: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Permission {
    pub id: String,
    #[serde(rename = "created", default)]
    pub created_at: i64,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub allow_create_engine: bool,
    #[serde(default)]
    pub allow_sampling: bool,
    #[serde(default)]
    pub allow_logprobs: bool,
    #[serde(default)]
    pub allow_search_indices: bool,
    #[serde(default)]
    pub allow_view: bool,
    #[serde(default)]
    pub allow_fine_tuning: bool,
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub group: Option<Value>,
    #[serde(default)]
    pub is_blocking: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelsList {
    #[serde(rename = "data")]
    pub models: Vec<Model>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FineTuneModelDeleteResponse {
    pub id: String,
    #[serde(default)]
    pub object: String,
    pub deleted: bool,
}

impl Client {
    /// List the models available to the caller.
    pub async fn list_models(&self) -> Result<ApiResponse<ModelsList>, ClientError> {
        self.send_json(self.request(Method::GET, "/models")).await
    }

    pub async fn get_model(&self, model_id: &str) -> Result<ApiResponse<Model>, ClientError> {
        self.send_json(self.request(Method::GET, &format!("/models/{model_id}")))
            .await
    }

    /// Delete a fine-tuned model. Requires the owner role.
    pub async fn delete_fine_tune_model(
        &self,
        model_id: &str,
    ) -> Result<ApiResponse<FineTuneModelDeleteResponse>, ClientError> {
        self.send_json(self.request(Method::DELETE, &format!("/models/{model_id}")))
            .await
    }
}
