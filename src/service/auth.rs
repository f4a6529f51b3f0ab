use std::future::{ready, Ready};
use std::rc::Rc;

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    web, FromRequest, HttpMessage, HttpRequest, HttpResponse,
};
use futures_util::future::LocalBoxFuture;
use log::debug;
use uuid::Uuid;

use crate::{dto::Claims, errors::ApiError};

use self::jwt::JwtKeys;

pub const BEARER_PREFIX: &str = "Bearer ";

/// Identity of the caller, taken from a validated bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAuthData {
    pub user_id: Uuid,
    pub email: String,
}

impl From<Claims> for UserAuthData {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
        }
    }
}

impl FromRequest for UserAuthData {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<UserAuthData>()
                .cloned()
                .ok_or_else(|| ApiError::unauthorized("Missing credentials")),
        )
    }
}

pub struct AuthMiddleware {
    pub keys: web::Data<JwtKeys>,
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            keys: self.keys.clone(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    keys: web::Data<JwtKeys>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let validation = jwt::parse_request(req.headers(), BEARER_PREFIX)
            .and_then(|token| jwt::decode_claims(&self.keys, &token));

        match validation {
            Ok(claims) => {
                debug!("authenticated user {}", claims.sub);
                req.extensions_mut().insert(UserAuthData::from(claims));
                let service = Rc::clone(&self.service);
                Box::pin(async move {
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                })
            }
            Err(err) => Box::pin(async move {
                let response = HttpResponse::from_error(err);
                Ok(req.into_response(response).map_into_right_body())
            }),
        }
    }
}

pub mod jwt {
    use actix_web::http::header::{HeaderMap, AUTHORIZATION};
    use chrono::Utc;
    use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
    use uuid::Uuid;

    use crate::{dto::Claims, errors::ApiError};

    /// Signing material shared by the handlers and the middleware.
    #[derive(Clone)]
    pub struct JwtKeys {
        encoding: EncodingKey,
        decoding: DecodingKey,
        ttl_secs: usize,
    }

    impl JwtKeys {
        pub fn new(secret: &str, ttl_secs: usize) -> Self {
            Self {
                encoding: EncodingKey::from_secret(secret.as_bytes()),
                decoding: DecodingKey::from_secret(secret.as_bytes()),
                ttl_secs,
            }
        }
    }

    pub fn create(keys: &JwtKeys, user_id: Uuid, email: &str) -> Result<String, ApiError> {
        let now = Utc::now().timestamp() as usize;
        let claims = Claims::new(user_id, email, now, now + keys.ttl_secs);
        encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
            .map_err(|err| ApiError::internal(format!("Token creation failed: {err}")))
    }

    /// Decodes and validates signature and expiry.
    pub fn decode_claims(keys: &JwtKeys, token: &str) -> Result<Claims, ApiError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &keys.decoding, &validation)?;
        Ok(data.claims)
    }

    pub fn parse_request(headers: &HeaderMap, prefix: &str) -> Result<String, ApiError> {
        let value = headers
            .get(AUTHORIZATION)
            .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;
        let value = value
            .to_str()
            .map_err(|_| ApiError::unauthorized("Malformed Authorization header"))?;
        value
            .strip_prefix(prefix)
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::unauthorized("Expected a Bearer token"))
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use actix_web::http::header::HeaderValue;

        #[test]
        fn issued_token_carries_subject_and_email() {
            let keys = JwtKeys::new("test-secret", 3600);
            let user_id = Uuid::new_v4();
            let token = create(&keys, user_id, "ada@example.com").unwrap();

            let claims = decode_claims(&keys, &token).unwrap();
            assert_eq!(claims.sub, user_id);
            assert_eq!(claims.email, "ada@example.com");
            assert_eq!(claims.exp - claims.iat, 3600);
        }

        #[test]
        fn token_signed_with_other_secret_is_rejected() {
            let token = create(&JwtKeys::new("one", 3600), Uuid::new_v4(), "a@b.c").unwrap();
            let err = decode_claims(&JwtKeys::new("two", 3600), &token).unwrap_err();
            assert!(matches!(err, ApiError::Unauthorized(_)));
        }

        #[test]
        fn expired_token_is_rejected() {
            let keys = JwtKeys::new("test-secret", 3600);
            let issued = Utc::now().timestamp() as usize - 7200;
            let claims = Claims::new(Uuid::new_v4(), "a@b.c", issued, issued + 60);
            let token = encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding).unwrap();

            assert!(decode_claims(&keys, &token).is_err());
        }

        #[test]
        fn bearer_prefix_is_required() {
            let mut headers = HeaderMap::new();
            assert!(parse_request(&headers, "Bearer ").is_err());

            headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
            assert!(parse_request(&headers, "Bearer ").is_err());

            headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
            assert_eq!(parse_request(&headers, "Bearer ").unwrap(), "abc.def");
        }
    }
}
