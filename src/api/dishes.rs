use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;
use tracing::info;

use crate::api::Envelope;
use crate::error::AppError;
use crate::models::dish::Dish;
use crate::pipeline::{self, Field, Pipeline, RequestCtx};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/dishes", get(list).post(create))
        .route("/dishes/:dish_id", get(read).put(update))
}

const RESOURCE: &str = "Dish";

const REQUIRED_FIELDS: [Field; 4] = [
    Field::text("name"),
    Field::text("description"),
    Field::integer("price"),
    Field::text("image_url"),
];

fn create_pipeline() -> Pipeline<Dish> {
    REQUIRED_FIELDS
        .iter()
        .fold(Pipeline::new(), |chain, field| {
            chain.step(pipeline::require(RESOURCE, *field))
        })
        .step(price_is_valid)
}

fn update_pipeline() -> Pipeline<Dish> {
    create_pipeline().step(pipeline::id_matches_route(RESOURCE))
}

fn price_is_valid(ctx: &RequestCtx<'_, Dish>) -> Result<(), AppError> {
    match ctx.data.get("price").and_then(Value::as_i64) {
        Some(price) if price > 0 => Ok(()),
        _ => Err(AppError::BadRequest(
            "Dish must have a price that is an integer greater than 0".to_string(),
        )),
    }
}

fn dish_from_data(id: String, data: &Value) -> Dish {
    Dish {
        id,
        name: pipeline::text_field(data, "name"),
        description: pipeline::text_field(data, "description"),
        price: pipeline::int_field(data, "price"),
        image_url: pipeline::text_field(data, "image_url"),
    }
}

async fn list(State(state): State<Arc<AppState>>) -> Json<Envelope<Vec<Dish>>> {
    Json(Envelope {
        data: state.dishes.all().await,
    })
}

async fn create(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Envelope<Dish>>), AppError> {
    let data = pipeline::payload_data(&body);
    create_pipeline().run(&RequestCtx::for_create(&data))?;

    let dish = state.dishes.insert(|id| dish_from_data(id, &data)).await;
    state
        .metrics
        .records_total
        .with_label_values(&["dishes"])
        .set(state.dishes.len().await as i64);
    info!(dish_id = %dish.id, "dish created");

    Ok((StatusCode::CREATED, Json(Envelope { data: dish })))
}

async fn read(
    State(state): State<Arc<AppState>>,
    Path(dish_id): Path<String>,
) -> Result<Json<Envelope<Dish>>, AppError> {
    let dish = find_dish(&state, &dish_id).await?;
    Ok(Json(Envelope { data: dish }))
}

async fn update(
    State(state): State<Arc<AppState>>,
    Path(dish_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Envelope<Dish>>, AppError> {
    let existing = find_dish(&state, &dish_id).await?;

    let data = pipeline::payload_data(&body);
    update_pipeline().run(&RequestCtx::for_record(&data, &dish_id, &existing))?;

    // Replace-all update: the id survives, every other field comes from
    // the payload.
    let dish = state
        .dishes
        .replace(dish_from_data(existing.id, &data))
        .await
        .ok_or_else(|| AppError::Internal(format!("dish {dish_id} vanished during update")))?;

    Ok(Json(Envelope { data: dish }))
}

async fn find_dish(state: &AppState, dish_id: &str) -> Result<Dish, AppError> {
    state
        .dishes
        .find(dish_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Dish does not exist: {dish_id}")))
}
