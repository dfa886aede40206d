//! Image generation: `POST /images/generations`.

use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::error::ClientError;
use crate::headers::ApiResponse;

pub const IMAGE_SIZE_256: &str = "256x256";
pub const IMAGE_SIZE_512: &str = "512x512";
pub const IMAGE_SIZE_1024: &str = "1024x1024";
pub const IMAGE_SIZE_1792X1024: &str = "1792x1024";
pub const IMAGE_SIZE_1024X1792: &str = "1024x1792";

pub const IMAGE_FORMAT_URL: &str = "url";
pub const IMAGE_FORMAT_B64_JSON: &str = "b64_json";

pub const IMAGE_MODEL_FLUX_SCHNELL: &str = "flux-1-schnell";

#[derive(Debug, Clone, Serialize, Default)]
pub struct ImageRequest {
    pub prompt: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,

    /// `"standard"` or `"hd"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    /// `"vivid"` or `"natural"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub guidance_scale: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageResponseData {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub b64_json: Option<String>,
    #[serde(default)]
    pub revised_prompt: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageResponse {
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub data: Vec<ImageResponseData>,
}

impl Client {
    pub async fn create_image(
        &self,
        request: ImageRequest,
    ) -> Result<ApiResponse<ImageResponse>, ClientError> {
        let req = self
            .request(Method::POST, "/images/generations")
            .json(&request);
        self.send_json(req).await
    }
}
