use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Token claims as issued by the identity service. The subject is the
/// numeric user id rendered as a string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Candidate,
    Examiner,
}

/// Authenticated caller, inserted as a request extension once the bearer
/// token has been verified.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: i64,
    pub role: Role,
}

impl AuthUser {
    fn from_claims(claims: &Claims) -> Option<Self> {
        let id = claims.sub.parse::<i64>().ok()?;
        let role = match claims.role.as_deref() {
            Some(r) if r.eq_ignore_ascii_case("examiner") || r.eq_ignore_ascii_case("admin") => {
                Role::Examiner
            }
            _ => Role::Candidate,
        };
        Some(Self { id, role })
    }
}

/// Handler-level gate for the endpoints only examiners may hit; routes are
/// shared between the two roles so this cannot live on a router layer.
pub fn require_examiner(user: &AuthUser) -> crate::error::Result<()> {
    if user.role != Role::Examiner {
        return Err(crate::error::Error::Forbidden(
            "Examiner role required".to_string(),
        ));
    }
    Ok(())
}

pub async fn require_bearer_auth(mut req: Request, next: Next) -> Response {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error":"missing_authorization"})),
        )
            .into_response();
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error":"bad_authorization"})),
        )
            .into_response();
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error":"unsupported_scheme"})),
        )
            .into_response();
    };

    let config = crate::config::get_config();
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    match decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    ) {
        Ok(data) => {
            let Some(user) = AuthUser::from_claims(&data.claims) else {
                return (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"error":"invalid_token"})),
                )
                    .into_response();
            };
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(_) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error":"invalid_token"})),
        )
            .into_response(),
    }
}
