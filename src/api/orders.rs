use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Map, Value};
use tracing::info;

use crate::api::Envelope;
use crate::error::AppError;
use crate::models::order::{Order, OrderDish, OrderStatus};
use crate::pipeline::{self, Field, Pipeline, RequestCtx};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", get(list).post(create))
        .route("/orders/:order_id", get(read).put(update).delete(destroy))
}

const RESOURCE: &str = "Order";
const STATUS_VALUES: &str = "pending, preparing, out-for-delivery, delivered";

const REQUIRED_FIELDS: [Field; 3] = [
    Field::text("deliverTo"),
    Field::text("mobileNumber"),
    Field::list("dishes"),
];

fn payload_pipeline() -> Pipeline<Order> {
    REQUIRED_FIELDS
        .iter()
        .fold(Pipeline::new(), |chain, field| {
            chain.step(pipeline::require(RESOURCE, *field))
        })
        .step(dishes_is_valid_list)
        .step(quantities_are_valid)
}

fn create_pipeline() -> Pipeline<Order> {
    payload_pipeline().step(status_is_valid_when_supplied)
}

fn update_pipeline() -> Pipeline<Order> {
    payload_pipeline()
        .step(status_is_valid)
        .step(pipeline::id_matches_route(RESOURCE))
}

fn delete_pipeline() -> Pipeline<Order> {
    Pipeline::new().step(deletable_while_pending)
}

fn dishes_is_valid_list(ctx: &RequestCtx<'_, Order>) -> Result<(), AppError> {
    match ctx.data.get("dishes").and_then(Value::as_array) {
        Some(dishes) if !dishes.is_empty() => Ok(()),
        _ => Err(AppError::BadRequest(
            "Order must include at least one dish".to_string(),
        )),
    }
}

fn quantities_are_valid(ctx: &RequestCtx<'_, Order>) -> Result<(), AppError> {
    let entries = ctx
        .data
        .get("dishes")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for (index, entry) in entries.iter().enumerate() {
        let quantity = entry.get("quantity").and_then(Value::as_i64);
        if !matches!(quantity, Some(q) if q > 0) {
            return Err(AppError::BadRequest(format!(
                "dish {index} must have a quantity that is an integer greater than 0"
            )));
        }
    }

    Ok(())
}

/// Update: the target status must be one of the enumerated values, and a
/// delivered order accepts no further changes whatever the target is.
fn status_is_valid(ctx: &RequestCtx<'_, Order>) -> Result<(), AppError> {
    if parse_status(ctx.data).is_none() {
        return Err(AppError::BadRequest(format!(
            "Order must have a status of {STATUS_VALUES}"
        )));
    }

    if ctx.record.and_then(|order| order.status) == Some(OrderStatus::Delivered) {
        return Err(AppError::BadRequest(
            "A delivered order cannot be changed".to_string(),
        ));
    }

    Ok(())
}

/// Create: status is optional, but one that is supplied must be valid.
fn status_is_valid_when_supplied(ctx: &RequestCtx<'_, Order>) -> Result<(), AppError> {
    match ctx.data.get("status") {
        Some(value) if pipeline::truthy(value) && parse_status(ctx.data).is_none() => {
            Err(AppError::BadRequest(format!(
                "Order must have a status of {STATUS_VALUES}"
            )))
        }
        _ => Ok(()),
    }
}

fn deletable_while_pending(ctx: &RequestCtx<'_, Order>) -> Result<(), AppError> {
    match ctx.record.and_then(|order| order.status) {
        Some(OrderStatus::Pending) => Ok(()),
        _ => Err(AppError::BadRequest(
            "An order cannot be deleted unless it is pending".to_string(),
        )),
    }
}

fn parse_status(data: &Value) -> Option<OrderStatus> {
    data.get("status")
        .and_then(Value::as_str)
        .and_then(|raw| raw.parse().ok())
}

fn order_from_data(id: String, data: &Value) -> Order {
    let dishes = data
        .get("dishes")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .map(order_dish_from_value)
        .collect();

    Order {
        id,
        deliver_to: pipeline::text_field(data, "deliverTo"),
        mobile_number: pipeline::text_field(data, "mobileNumber"),
        status: parse_status(data),
        dishes,
    }
}

fn order_dish_from_value(value: &Value) -> OrderDish {
    OrderDish {
        dish_id: pipeline::text_field(value, "dishId"),
        quantity: pipeline::int_field(value, "quantity"),
    }
}

async fn list(State(state): State<Arc<AppState>>) -> Json<Envelope<Vec<Order>>> {
    Json(Envelope {
        data: state.orders.all().await,
    })
}

async fn create(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Envelope<Order>>), AppError> {
    let data = pipeline::payload_data(&body);
    create_pipeline().run(&RequestCtx::for_create(&data))?;

    let order = state.orders.insert(|id| order_from_data(id, &data)).await;
    state
        .metrics
        .records_total
        .with_label_values(&["orders"])
        .set(state.orders.len().await as i64);
    info!(order_id = %order.id, "order created");

    Ok((StatusCode::CREATED, Json(Envelope { data: order })))
}

async fn read(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<String>,
) -> Result<Json<Envelope<Order>>, AppError> {
    let order = find_order(&state, &order_id).await?;
    Ok(Json(Envelope { data: order }))
}

async fn update(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Envelope<Order>>, AppError> {
    let existing = find_order(&state, &order_id).await?;

    let data = pipeline::payload_data(&body);
    update_pipeline().run(&RequestCtx::for_record(&data, &order_id, &existing))?;

    // Replace-all update: the id survives, every other field comes from
    // the payload.
    let order = state
        .orders
        .replace(order_from_data(existing.id, &data))
        .await
        .ok_or_else(|| AppError::Internal(format!("order {order_id} vanished during update")))?;

    Ok(Json(Envelope { data: order }))
}

async fn destroy(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let order = find_order(&state, &order_id).await?;

    let data = Value::Object(Map::new());
    delete_pipeline().run(&RequestCtx::for_record(&data, &order_id, &order))?;

    state.orders.remove_by_id(&order_id).await;
    state
        .metrics
        .records_total
        .with_label_values(&["orders"])
        .set(state.orders.len().await as i64);
    info!(order_id = %order.id, "order deleted");

    Ok(StatusCode::NO_CONTENT)
}

async fn find_order(state: &AppState, order_id: &str) -> Result<Order, AppError> {
    state
        .orders
        .find(order_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Order does not exist: {order_id}")))
}
