//! Notification signature middleware for Actix Web.
//!
//! Midtrans signs every HTTP notification with a `signature_key` field in the JSON body (see
//! [`midtrans_tools::signature`]). Wrapping the notification endpoint with this middleware rejects payloads whose
//! signature does not match the configured server key, before any work is done on them.
//!
//! The body is read in full to check the signature and then handed back to the request, so the route handler sees it
//! unchanged.
use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_http::h1;
use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    web,
    Error,
};
use futures::future::LocalBoxFuture;
use log::{debug, trace, warn};
use midtrans_tools::signature::verify_signature_key;
use mpg_common::Secret;
use serde_json::Value;

use crate::errors::ServerError;

pub struct SignatureMiddlewareFactory {
    server_key: Secret<String>,
    // When false, every request is passed through unchecked
    enabled: bool,
}

impl SignatureMiddlewareFactory {
    pub fn new(server_key: Secret<String>, enabled: bool) -> Self {
        SignatureMiddlewareFactory { server_key, enabled }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SignatureMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = SignatureMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SignatureMiddlewareService {
            server_key: self.server_key.clone(),
            enabled: self.enabled,
            service: Rc::new(service),
        }))
    }
}

pub struct SignatureMiddlewareService<S> {
    server_key: Secret<String>,
    enabled: bool,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for SignatureMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let server_key = self.server_key.clone();
        let enabled = self.enabled;
        Box::pin(async move {
            if !enabled {
                trace!("🔐️ Signature checks are disabled. Allowing request.");
                return service.call(req).await;
            }
            let data = req.extract::<web::Bytes>().await.map_err(|e| {
                warn!("🔐️ Failed to read notification body: {e:?}");
                ServerError::CouldNotDeserializePayload(e.to_string())
            })?;
            let payload = serde_json::from_slice::<Value>(&data).map_err(|e| {
                debug!("🔐️ Notification body is not valid JSON. {e}");
                ServerError::CouldNotDeserializePayload(e.to_string())
            })?;
            if verify_signature_key(&payload, server_key.reveal()) {
                trace!("🔐️ Notification signature check ✅️");
                req.set_payload(bytes_to_payload(data));
                service.call(req).await
            } else {
                warn!("🔐️ Invalid notification signature for order {}. Denying access.", payload["order_id"]);
                Err(ServerError::InvalidSignature.into())
            }
        })
    }
}

fn bytes_to_payload(buf: web::Bytes) -> Payload {
    let (_, mut pl) = h1::Payload::create(true);
    pl.unread_data(buf);
    Payload::from(pl)
}
