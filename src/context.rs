use axum::{
    extract::Request,
    http::{HeaderMap, HeaderName},
    middleware::Next,
    response::Response,
};

use crate::error::AppError;

pub const STORE_ID_HEADER: HeaderName = HeaderName::from_static("x-store-id");
pub const USER_ID_HEADER: HeaderName = HeaderName::from_static("x-user-id");

/// Store and user the upstream auth gateway resolved for this request.
///
/// Must be present for all `/stocks` routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreContext {
    store_id: String,
    user_id: String,
}

impl StoreContext {
    pub fn new(store_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            store_id: store_id.into(),
            user_id: user_id.into(),
        }
    }

    pub fn store_id(&self) -> &str {
        &self.store_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

pub async fn store_context_middleware(mut req: Request, next: Next) -> Result<Response, AppError> {
    let store_id = required_header(req.headers(), &STORE_ID_HEADER)?;
    let user_id = required_header(req.headers(), &USER_ID_HEADER)?;

    req.extensions_mut()
        .insert(StoreContext::new(store_id, user_id));

    Ok(next.run(req).await)
}

fn required_header(headers: &HeaderMap, name: &HeaderName) -> Result<String, AppError> {
    let value = headers
        .get(name)
        .ok_or_else(|| AppError::Unauthorized(format!("missing {name} header")))?;

    let value = value
        .to_str()
        .map_err(|_| AppError::Unauthorized(format!("{name} header is not valid text")))?
        .trim();

    if value.is_empty() {
        return Err(AppError::Unauthorized(format!("{name} header is empty")));
    }

    Ok(value.to_string())
}
