//! Request extractors whose rejections are [`Error`]s.

use axum::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::Json;
use serde::de::DeserializeOwned;

use crate::error::Error;

/// A JSON body. Unlike [`axum::Json`], a bad body is rejected with the
/// `{"error": ...}` shape every other API error uses.
#[derive(Debug, Clone, Copy, Default)]
pub(super) struct ApiJson<T>(pub(super) T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::BodyTooLarge(rejection.body_text())
        } else {
            Self::InvalidInput(rejection.body_text())
        }
    }
}
