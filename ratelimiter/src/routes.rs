use std::future::{ready, Ready};

use actix_web::{dev::Payload, get, web, FromRequest, HttpRequest, HttpResponse, Responder};
use anyhow::anyhow;
use log::{debug, warn};
use serde_json::json;

use crate::{
    error::ApiError,
    rate_limiters::{BucketRegistry, Key},
};

/// Extracting this from a request spends one token from the bucket of the peer's IP.
/// Extraction fails with [`ApiError::TooManyRequests`] once that bucket is empty.
#[derive(Debug)]
pub struct Admitted {
    pub key: Key,
}

impl FromRequest for Admitted {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(admit(req))
    }
}

fn admit(req: &HttpRequest) -> Result<Admitted, ApiError> {
    let registry = req
        .app_data::<web::Data<BucketRegistry>>()
        .ok_or_else(|| ApiError::InternalError(anyhow!("No bucket registry in app data")))?;

    let key = req
        .connection_info()
        .peer_addr()
        .map(str::to_owned)
        .ok_or_else(|| {
            warn!("Failed to get IP address for request to {}", req.path());
            ApiError::UnidentifiedClient
        })?;

    if registry.allow(&key) {
        Ok(Admitted { key })
    } else {
        debug!("Rate limit exceeded for {key}");
        Err(ApiError::TooManyRequests)
    }
}

#[get("/limited")]
pub async fn limited(admitted: Admitted) -> impl Responder {
    debug!("Serving /limited for {}", admitted.key);
    HttpResponse::Ok().body("Limited, but ok for now, don't over use me!")
}

#[get("/ping")]
pub async fn ping(admitted: Admitted) -> impl Responder {
    debug!("Serving /ping for {}", admitted.key);
    HttpResponse::Ok().json(json!({
        "message": "pong"
    }))
}

#[get("/unlimited")]
pub async fn unlimited() -> impl Responder {
    HttpResponse::Ok().body("Unlimited! Let's Go!")
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(limited).service(ping).service(unlimited);
}
