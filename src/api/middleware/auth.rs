use crate::config::AppConfig;
use crate::proxy::ErrorBody;
use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpResponse,
};
use std::{
    future::{ready, Future, Ready},
    pin::Pin,
    rc::Rc,
};
use tracing::warn;

/// Checks `Authorization: Bearer <key>` or `apikey: <key>` against
/// `auth.api_keys`. An empty key list lets everything through.
pub struct ApiKeyAuth;

impl<S, B> Transform<S, ServiceRequest> for ApiKeyAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = ApiKeyAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ApiKeyAuthMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct ApiKeyAuthMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for ApiKeyAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();

        if req.method() == actix_web::http::Method::OPTIONS || req.path() == "/health" {
            return Box::pin(async move { Ok(srv.call(req).await?.map_into_left_body()) });
        }

        let keys = match req.app_data::<actix_web::web::Data<AppConfig>>() {
            Some(c) => c.auth.api_keys.clone(),
            None => {
                warn!("AppConfig missing in app_data");
                Vec::new()
            }
        };

        if keys.is_empty() || presented_key(&req).is_some_and(|k| keys.iter().any(|key| key == k)) {
            return Box::pin(async move { Ok(srv.call(req).await?.map_into_left_body()) });
        }

        warn!("Rejected {} {}: invalid or missing API key", req.method(), req.path());
        let res = req.into_response(HttpResponse::Unauthorized().json(ErrorBody {
            error: "Invalid or missing API key".to_string(),
            details: None,
        }));
        Box::pin(async move { Ok(res.map_into_right_body()) })
    }
}

fn presented_key(req: &ServiceRequest) -> Option<&str> {
    let headers = req.headers();
    if let Some(bearer) = headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        return Some(bearer);
    }
    headers.get("apikey").and_then(|v| v.to_str().ok())
}
