//! Caller identity extractor.
//!
//! Authentication happens upstream; the gateway forwards the authenticated
//! user's id in [`USER_ID_HEADER`].

use actix_web::{FromRequest, HttpRequest, dev::Payload};
use std::future::{Ready, ready};
use uuid::Uuid;

use crate::middleware::error::AppError;

pub const USER_ID_HEADER: &str = "X-User-Id";

/// The user on whose behalf the request is made.
///
/// ```ignore
/// async fn like(identity: Identity) -> impl Responder {
///     format!("Hello, user {}!", identity.user_id)
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Identity {
    pub user_id: Uuid,
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(extract_identity(req))
    }
}

fn extract_identity(req: &HttpRequest) -> Result<Identity, AppError> {
    let raw = req
        .headers()
        .get(USER_ID_HEADER)
        .ok_or_else(|| AppError::Unauthorized(format!("missing {USER_ID_HEADER} header")))?
        .to_str()
        .map_err(|_| AppError::Unauthorized(format!("malformed {USER_ID_HEADER} header")))?;

    let user_id = Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::Unauthorized(format!("{USER_ID_HEADER} is not a valid UUID")))?;

    Ok(Identity { user_id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_identity_from_header() {
        let user_id = Uuid::new_v4();
        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, user_id.to_string()))
            .to_http_request();

        assert_eq!(extract_identity(&req).unwrap().user_id, user_id);
    }

    #[test]
    fn test_missing_or_bad_header_is_unauthorized() {
        let req = TestRequest::default().to_http_request();
        assert!(matches!(
            extract_identity(&req),
            Err(AppError::Unauthorized(_))
        ));

        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, "not-a-uuid"))
            .to_http_request();
        assert!(matches!(
            extract_identity(&req),
            Err(AppError::Unauthorized(_))
        ));
    }
}
