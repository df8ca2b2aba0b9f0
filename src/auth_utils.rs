// linkhub-backend/src/auth_utils.rs
//
// Identité de l'appelant, extraite du header X-User-Id et passée
// explicitement à chaque accès aux entités et au registre de liens.
use crate::error_handler::ServiceError;
use actix_web::{dev::Payload, FromRequest, HttpRequest};
use futures_util::future::{err, ok, Ready};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct AuthenticatedUser {
    pub id: Uuid,
}

impl FromRequest for AuthenticatedUser {
    type Error = ServiceError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let header_value = match req.headers().get("X-User-Id") {
            Some(value) => value,
            None => {
                log::warn!("X-User-Id header was NOT found in request headers.");
                return err(ServiceError::Unauthorized(
                    "Missing X-User-Id header. Authentication required.".to_string(),
                ));
            }
        };

        let user_id_str = match header_value.to_str() {
            Ok(s) => s,
            Err(_) => {
                log::warn!("X-User-Id header is not valid UTF-8.");
                return err(ServiceError::BadRequest(
                    "X-User-Id header contains invalid characters.".to_string(),
                ));
            }
        };

        if user_id_str.is_empty() {
            log::warn!("X-User-Id header is present but empty.");
            return err(ServiceError::BadRequest(
                "X-User-Id header cannot be empty.".to_string(),
            ));
        }

        match Uuid::parse_str(user_id_str) {
            Ok(user_id) => ok(AuthenticatedUser { id: user_id }),
            Err(parse_err) => {
                log::warn!(
                    "Failed to parse X-User-Id '{}' to UUID: {}",
                    user_id_str,
                    parse_err
                );
                err(ServiceError::BadRequest(
                    "Invalid X-User-Id header format (not a valid UUID).".to_string(),
                ))
            }
        }
    }
}
