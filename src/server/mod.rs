use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::Filter;

use crate::catalog::{CatalogStore, Item, NewItem};
use crate::core::{HealthChecker, PriceCheckError};
use crate::polling::PollingOrchestrator;

#[derive(Debug, Deserialize)]
struct PriceUpdate {
    price: Option<f64>,
    date: Option<String>,
    url: Option<String>,
}

pub async fn run_server(
    catalog: Arc<CatalogStore>,
    orchestrator: Arc<PollingOrchestrator>,
    health: Arc<HealthChecker>,
    port: u16,
) {
    let health_route = warp::path("health")
        .and(warp::get())
        .and(with_health(health))
        .and_then(get_health);

    let list_items = warp::path!("api" / "items")
        .and(warp::get())
        .and(with_catalog(catalog.clone()))
        .and_then(list_items);

    let add_item = warp::path!("api" / "items")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_catalog(catalog.clone()))
        .and_then(add_item);

    let update_item = warp::path!("api" / "items" / i64)
        .and(warp::put())
        .and(warp::body::json())
        .and(with_catalog(catalog.clone()))
        .and_then(update_item);

    let delete_item = warp::path!("api" / "items" / i64)
        .and(warp::delete())
        .and(with_catalog(catalog.clone()))
        .and_then(delete_item);

    let update_price = warp::path!("api" / "items" / i64 / "price")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_catalog(catalog))
        .and_then(update_price);

    let check_all = warp::path!("api" / "check-prices")
        .and(warp::post())
        .and(with_orchestrator(orchestrator.clone()))
        .and_then(check_all_items);

    let check_single = warp::path!("api" / "items" / i64 / "check")
        .and(warp::post())
        .and(with_orchestrator(orchestrator))
        .and_then(check_single_item);

    let routes = health_route
        .or(list_items)
        .or(add_item)
        .or(check_single)
        .or(update_price)
        .or(update_item)
        .or(delete_item)
        .or(check_all)
        .recover(handle_rejection);

    tracing::info!("🌐 API server listening on port {}", port);
    warp::serve(routes).run(([0, 0, 0, 0], port)).await;
}

fn with_catalog(
    catalog: Arc<CatalogStore>,
) -> impl Filter<Extract = (Arc<CatalogStore>,), Error = Infallible> + Clone {
    warp::any().map(move || catalog.clone())
}

fn with_orchestrator(
    orchestrator: Arc<PollingOrchestrator>,
) -> impl Filter<Extract = (Arc<PollingOrchestrator>,), Error = Infallible> + Clone {
    warp::any().map(move || orchestrator.clone())
}

fn with_health(
    health: Arc<HealthChecker>,
) -> impl Filter<Extract = (Arc<HealthChecker>,), Error = Infallible> + Clone {
    warp::any().map(move || health.clone())
}

fn json_reply<T: serde::Serialize>(
    value: &T,
    status: StatusCode,
) -> warp::reply::WithStatus<warp::reply::Json> {
    warp::reply::with_status(warp::reply::json(value), status)
}

fn error_reply(message: &str, status: StatusCode) -> warp::reply::WithStatus<warp::reply::Json> {
    json_reply(&serde_json::json!({ "error": message }), status)
}

async fn get_health(health: Arc<HealthChecker>) -> Result<impl warp::Reply, warp::Rejection> {
    let status = health.get_status().await;
    Ok(warp::reply::json(&status))
}

async fn list_items(catalog: Arc<CatalogStore>) -> Result<impl warp::Reply, warp::Rejection> {
    match catalog.load().await {
        Ok(snapshot) => Ok(json_reply(
            &serde_json::json!({ "items": snapshot.items }),
            StatusCode::OK,
        )),
        Err(e) => {
            tracing::error!("❌ Failed to load catalog: {}", e);
            Ok(error_reply(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR))
        }
    }
}

async fn add_item(
    new: NewItem,
    catalog: Arc<CatalogStore>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match catalog.add_item(new).await {
        Ok(item) => Ok(json_reply(&item, StatusCode::OK)),
        Err(e) => {
            tracing::error!("❌ Failed to add item: {}", e);
            Ok(error_reply(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR))
        }
    }
}

async fn update_item(
    item_id: i64,
    updated: Item,
    catalog: Arc<CatalogStore>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match catalog.update_item(item_id, updated).await {
        Ok(Some(item)) => Ok(json_reply(&item, StatusCode::OK)),
        Ok(None) => Ok(error_reply("Item not found", StatusCode::NOT_FOUND)),
        Err(e) => {
            tracing::error!("❌ Failed to update item {}: {}", item_id, e);
            Ok(error_reply(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR))
        }
    }
}

async fn delete_item(
    item_id: i64,
    catalog: Arc<CatalogStore>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match catalog.delete_item(item_id).await {
        Ok(()) => Ok(json_reply(
            &serde_json::json!({ "success": true }),
            StatusCode::OK,
        )),
        Err(e) => {
            tracing::error!("❌ Failed to delete item {}: {}", item_id, e);
            Ok(error_reply(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR))
        }
    }
}

async fn update_price(
    item_id: i64,
    body: PriceUpdate,
    catalog: Arc<CatalogStore>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let Some(price) = body.price else {
        return Ok(error_reply("Price required", StatusCode::BAD_REQUEST));
    };

    let date = body
        .date
        .unwrap_or_else(|| chrono::Utc::now().to_rfc3339());

    match catalog.merge_observation(item_id, date, price, body.url).await {
        Ok(item) => Ok(json_reply(&item, StatusCode::OK)),
        Err(PriceCheckError::NotFound(_)) => {
            Ok(error_reply("Item not found", StatusCode::NOT_FOUND))
        }
        Err(e) => {
            tracing::error!("❌ Failed to record price for item {}: {}", item_id, e);
            Ok(error_reply(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR))
        }
    }
}

async fn check_all_items(
    orchestrator: Arc<PollingOrchestrator>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let results = orchestrator.run_batch().await;
    Ok(json_reply(
        &serde_json::json!({ "status": "success", "results": results }),
        StatusCode::OK,
    ))
}

async fn check_single_item(
    item_id: i64,
    orchestrator: Arc<PollingOrchestrator>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match orchestrator.run_single(item_id).await {
        Ok(outcome) => Ok(json_reply(&outcome, StatusCode::OK)),
        Err(PriceCheckError::NotFound(_)) => {
            Ok(error_reply("Item not found", StatusCode::NOT_FOUND))
        }
        Err(e) => {
            tracing::error!("❌ Single item check failed for {}: {}", item_id, e);
            Ok(error_reply(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR))
        }
    }
}

async fn handle_rejection(err: warp::Rejection) -> Result<impl warp::Reply, Infallible> {
    if err.is_not_found() {
        return Ok(error_reply("Endpoint not found", StatusCode::NOT_FOUND));
    }

    if err
        .find::<warp::filters::body::BodyDeserializeError>()
        .is_some()
    {
        return Ok(error_reply("Invalid request body", StatusCode::BAD_REQUEST));
    }

    tracing::error!("❌ Unhandled rejection: {:?}", err);
    Ok(error_reply(
        "Internal server error",
        StatusCode::INTERNAL_SERVER_ERROR,
    ))
}
