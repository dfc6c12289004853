use cucumber::given;
use mpg_common::Rupiah;
use mpg_payment_engine::{
    db_types::{NewOrder, OrderId},
    PaymentGatewayDatabase,
};

use crate::cucumber::{PaymentSystem, ReconciliationWorld};

#[given("a fresh install")]
async fn fresh_database(world: &mut ReconciliationWorld) {
    let system = PaymentSystem::new().await;
    world.system = Some(system);
}

#[given(expr = "an order {word} from customer '{word}' for Rp{int}")]
async fn existing_order(world: &mut ReconciliationWorld, order_id: String, customer_id: String, price: i64) {
    let order = NewOrder::new(OrderId::from(order_id), customer_id, Rupiah::from(price));
    let (_, inserted) = world.api().db().insert_order(order).await.expect("Error inserting order");
    assert!(inserted, "Order already existed");
}

#[given(expr = "the gateway reports {word} as '{word}'")]
async fn gateway_status(world: &mut ReconciliationWorld, order_id: String, status: String) {
    world.system().gateway.set_status(&order_id, &status, None);
}

#[given(expr = "the gateway reports {word} as '{word}' with fraud status '{word}'")]
async fn gateway_status_with_fraud(world: &mut ReconciliationWorld, order_id: String, status: String, fraud: String) {
    world.system().gateway.set_status(&order_id, &status, Some(&fraud));
}
