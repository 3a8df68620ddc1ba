//! Extractors that deserialize a request part and then validate it.
//!
//! Every failure, whether the input could not be parsed or it broke a field
//! rule, is turned into [`AppError::InvalidInput`] so that clients always see
//! a 400 with a readable message.

use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::error::AppError;

/// A field rule that an incoming request broke.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Qualify the field with the position of the offending element in a list body.
    pub fn at_index(self, index: usize) -> Self {
        Self {
            field: format!("stocks[{index}].{}", self.field),
            message: self.message,
        }
    }
}

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// JSON body that passed [`Validate`].
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

/// Query string that passed [`Validate`].
#[derive(Debug, Clone)]
pub struct ValidQuery<T>(pub T);

/// Path parameters that passed [`Validate`].
#[derive(Debug, Clone)]
pub struct ValidPath<T>(pub T);

impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Self(value))
    }
}

impl<T, S> FromRequestParts<S> for ValidQuery<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        value.validate()?;
        Ok(Self(value))
    }
}

impl<T, S> FromRequestParts<S> for ValidPath<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        value.validate()?;
        Ok(Self(value))
    }
}
