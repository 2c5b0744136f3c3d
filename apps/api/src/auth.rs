//! Request-scoped identity.
//!
//! Sessions live in the upstream gateway, which forwards the authenticated
//! user as `x-user-id` and `x-user-role`. Handlers receive a `RequestContext`
//! instead of reading any ambient session state.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::UserRole;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl RequestContext {
    /// Fails with `Forbidden` unless the caller has `role`.
    pub fn require(&self, role: UserRole) -> Result<(), AppError> {
        if self.role == role {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = header(parts, USER_ID_HEADER)
            .and_then(|v| Uuid::parse_str(v).ok())
            .ok_or(AppError::Unauthorized)?;
        let role = header(parts, USER_ROLE_HEADER)
            .and_then(|v| v.parse::<UserRole>().ok())
            .ok_or(AppError::Unauthorized)?;

        Ok(RequestContext { user_id, role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(headers: &[(&str, &str)]) -> Result<RequestContext, AppError> {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        RequestContext::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_valid_headers_produce_context() {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let ctx = extract(&[(USER_ID_HEADER, id_str.as_str()), (USER_ROLE_HEADER, "hr")])
            .await
            .unwrap();
        assert_eq!(ctx.user_id, id);
        assert_eq!(ctx.role, UserRole::Hr);
    }

    #[tokio::test]
    async fn test_missing_headers_are_unauthorized() {
        assert!(matches!(extract(&[]).await, Err(AppError::Unauthorized)));
        let id = Uuid::new_v4().to_string();
        assert!(matches!(
            extract(&[(USER_ID_HEADER, id.as_str())]).await,
            Err(AppError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_garbage_identity_is_unauthorized() {
        let result = extract(&[(USER_ID_HEADER, "42"), (USER_ROLE_HEADER, "candidate")]).await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_require_role() {
        let ctx = RequestContext {
            user_id: Uuid::new_v4(),
            role: UserRole::Employee,
        };
        assert!(ctx.require(UserRole::Employee).is_ok());
        assert!(matches!(ctx.require(UserRole::Hr), Err(AppError::Forbidden)));
    }
}
