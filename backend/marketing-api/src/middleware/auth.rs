use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Owner ID
    pub email: String,
    pub exp: usize,
    pub iat: usize,
}

/// The authenticated owner, inserted into request extensions by [`require_auth`].
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
}

/// Signs an HS256 token for `user_id` valid for `expiry_hours`.
pub fn issue_token(
    secret: &str,
    user_id: Uuid,
    email: &str,
    expiry_hours: u64,
) -> anyhow::Result<String> {
    let now = Utc::now();
    let exp = now + Duration::hours(i64::try_from(expiry_hours)?);
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        exp: usize::try_from(exp.timestamp())?,
        iat: usize::try_from(now.timestamp())?,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

fn decode_claims(secret: &str, token: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
        AppError::Unauthorized
    })
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let bearer = request
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or(AppError::Unauthorized)?;

    let claims = decode_claims(&state.config.jwt.secret, bearer.token())?;
    let id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::Unauthorized)?;

    request.extensions_mut().insert(CurrentUser {
        id,
        email: claims.email,
    });

    Ok(next.run(request).await)
}
