//! Request handler definitions
//!
//! Define each route and its handler here. Handlers do no more than unpack the request, call through to the payment
//! engine API, and wrap the result in a [`JsonResponse`]. Anything longer belongs in the engine.
//!
//! All I/O in the handlers is async. Since each worker thread processes its requests sequentially, a blocking call here
//! would stall every other request on the same worker.
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use mpg_payment_engine::{
    db_types::OrderId,
    payment_objects::{ChargeRequest, CheckoutRequest},
    traits::{PaymentGateway, PaymentGatewayDatabase},
    GatewayApi,
    PaymentFlowApi,
};
use serde_json::Value;

use crate::{data_objects::JsonResponse, errors::ServerError};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Charge  ----------------------------------------------------
route!(charge => Post "/payment/charge" impl PaymentGatewayDatabase, PaymentGateway);
/// Charges an existing order through the Midtrans Core API.
///
/// The body carries `order_id` and `gross_amount` (both required), plus the optional `payment_type`,
/// `customer_details`, `item_details` and any payment-method block such as `bank_transfer`. These are forwarded to
/// Midtrans as-is. The transaction record is stored before responding.
///
/// Responds with `{"status": true, "message": ..., "data": <Midtrans response>}`.
pub async fn charge<B, G>(
    body: web::Json<ChargeRequest>,
    api: web::Data<PaymentFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: PaymentGatewayDatabase,
    G: PaymentGateway,
{
    let request = body.into_inner();
    debug!("💻️ Received charge request for order {:?}", request.order_id);
    let response = api.charge(request).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success("Charge successful").with_data(response)))
}

//----------------------------------------------   Notification  ----------------------------------------------------
route!(notification => Post "" impl PaymentGatewayDatabase, PaymentGateway);
/// The HTTP notification endpoint that Midtrans calls whenever a transaction changes status.
///
/// Nothing in the body is trusted: the status is re-fetched from Midtrans before anything is written. Midtrans retries
/// notifications that do not receive a 200, so failures are reported with a 500 and a `{"status": false}` envelope.
pub async fn notification<B, G>(
    body: web::Json<Value>,
    api: web::Data<PaymentFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: PaymentGatewayDatabase,
    G: PaymentGateway,
{
    trace!("💻️ Received notification: {}", body.0);
    match api.reconcile_notification(body.into_inner()).await {
        Ok(result) => {
            debug!("💻️ Notification for order {} processed. Status: {}", result.order.order_id, result.order.status);
            Ok(HttpResponse::Ok().json(JsonResponse::ok()))
        },
        Err(e) => {
            error!("💻️ Could not process notification. {e}");
            Ok(HttpResponse::InternalServerError().json(JsonResponse::failure(e)))
        },
    }
}

//----------------------------------------------   Status  ----------------------------------------------------
route!(payment_status => Get "/payment/status/{order_id}" impl PaymentGateway);
/// Returns the Midtrans status record for the order exactly as Midtrans reports it. Local state is not consulted.
pub async fn payment_status<G: PaymentGateway>(
    path: web::Path<String>,
    api: web::Data<GatewayApi<G>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = OrderId::from(path.into_inner());
    debug!("💻️ Received payment status request for order {order_id}");
    let status = api.payment_status(&order_id).await.map_err(|e| {
        warn!("💻️ Could not fetch payment status for order {order_id}. {e}");
        ServerError::GatewayError(e.to_string())
    })?;
    Ok(HttpResponse::Ok().json(JsonResponse::ok().with_data(status)))
}

//----------------------------------------------   Snap  ----------------------------------------------------
route!(create_snap_token => Post "/payment/create-snap-token" impl PaymentGateway);
/// Creates a Snap checkout session and returns its token.
///
/// The request must carry `order_id`, `gross_amount`, `customer_details` (with a `first_name`) and a non-empty
/// `item_details` list whose `price × quantity` sum is within one rupiah of `gross_amount`. Invalid requests are
/// answered with a 400 and never reach Midtrans.
pub async fn create_snap_token<G: PaymentGateway>(
    body: web::Json<CheckoutRequest>,
    api: web::Data<GatewayApi<G>>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    debug!("💻️ Received snap token request for order {:?}", request.order_id);
    let session = api.create_checkout_session(request).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::ok().with_token(session.token)))
}
