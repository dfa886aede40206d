//! Endpoint wrappers.
//!
//! Each submodule adds its endpoints to [`Client`](crate::Client).

pub mod chat;
pub mod completion;
pub mod image;
pub mod models;

pub use image::{ImageRequest, ImageResponse, ImageResponseData};
pub use models::{FineTuneModelDeleteResponse, Model, ModelsList, Permission};
