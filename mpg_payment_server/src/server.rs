use std::{future::Future, pin::Pin, time::Duration};

use actix_web::{dev::Server, error::JsonPayloadError, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use midtrans_tools::MidtransApi;
use mpg_payment_engine::{
    events::{EventHandlers, EventHooks, EventProducers},
    GatewayApi,
    PaymentFlowApi,
    SqliteDatabase,
};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::midtrans::MidtransGateway,
    middleware::SignatureMiddlewareFactory,
    routes::{health, ChargeRoute, CreateSnapTokenRoute, NotificationRoute, PaymentStatusRoute},
};

const EVENT_BUFFER_SIZE: usize = 25;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, config.db_max_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let api = MidtransApi::new(config.midtrans.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let gateway = MidtransGateway::new(api);
    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, logging_hooks());
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let srv = create_server_instance(config, db, gateway, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// Order status changes are logged. Downstream integrations (emails, fulfilment) hang off these same hooks.
fn logging_hooks() -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks.on_order_paid(|ev| {
        Box::pin(async move {
            info!("📬️ Order {} has been paid ({})", ev.order.order_id, ev.order.total_price);
        }) as Pin<Box<dyn Future<Output = ()> + Send>>
    });
    hooks.on_order_annulled(|ev| {
        Box::pin(async move {
            info!("📬️ Order {} has been cancelled ({})", ev.order.order_id, ev.status);
        }) as Pin<Box<dyn Future<Output = ()> + Send>>
    });
    hooks
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    gateway: MidtransGateway,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        let payments_api = PaymentFlowApi::new(db.clone(), gateway.clone(), producers.clone());
        let gateway_api = GatewayApi::new(gateway.clone(), config.callbacks.clone());
        let notification_scope = web::scope("/payment/notification")
            .wrap(SignatureMiddlewareFactory::new(config.midtrans.server_key.clone(), config.signature_checks))
            .service(NotificationRoute::<SqliteDatabase, MidtransGateway>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("mpg::access_log"))
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::Data::new(payments_api))
            .app_data(web::Data::new(gateway_api))
            .service(health)
            .service(ChargeRoute::<SqliteDatabase, MidtransGateway>::new())
            .service(PaymentStatusRoute::<MidtransGateway>::new())
            .service(CreateSnapTokenRoute::<MidtransGateway>::new())
            .service(notification_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// Malformed or mistyped JSON bodies are reported in the same envelope as every other error.
pub fn json_error_handler(err: JsonPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    debug!("💻️ Could not deserialize request body. {err}");
    ServerError::CouldNotDeserializePayload(err.to_string()).into()
}
