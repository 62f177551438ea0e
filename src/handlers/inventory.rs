use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;

use crate::{
    database::Database,
    ledger::{dates, demo, detail, picker, summary, LedgerError},
    models::ProductType,
    store::{self, TxFilter},
};

fn bad_request(e: LedgerError) -> StatusCode {
    log::warn!("rejected request: {}", e);
    StatusCode::BAD_REQUEST
}

fn parse_product_type(s: &str) -> Result<ProductType, StatusCode> {
    ProductType::parse(s)
        .ok_or_else(|| LedgerError::UnknownProductType(s.to_string()))
        .map_err(bad_request)
}

/// Optional `case_date` query/body field; absent means today. Invalid dates
/// are rejected before any aggregation runs.
fn parse_case_date(s: Option<&str>) -> Result<chrono::NaiveDate, StatusCode> {
    match s {
        Some(raw) => dates::parse_day(raw).map_err(bad_request),
        None => Ok(dates::today_utc()),
    }
}

fn store_error(e: sqlx::Error) -> StatusCode {
    log::error!("transaction store query failed: {}", e);
    StatusCode::INTERNAL_SERVER_ERROR
}

#[derive(Deserialize)]
pub struct SummaryParams {
    pub product_type: String,
}

pub async fn get_inventory_summary(
    State(db): State<Database>,
    Query(params): Query<SummaryParams>,
) -> Result<Json<Vec<summary::SummaryRow>>, StatusCode> {
    let product_type = parse_product_type(&params.product_type)?;

    let txs = store::query_transactions(&db, &TxFilter::for_product(product_type.as_str()))
        .await
        .map_err(store_error)?;

    Ok(Json(summary::inventory_summary(&txs, dates::today_utc())))
}

#[derive(Deserialize)]
pub struct DetailParams {
    pub spec_no: String,
    pub product_type: String,
    pub case_date: Option<String>,
}

pub async fn get_inventory_detail(
    State(db): State<Database>,
    Query(params): Query<DetailParams>,
) -> Result<Json<detail::DetailBuckets>, StatusCode> {
    let product_type = parse_product_type(&params.product_type)?;
    let case_date = parse_case_date(params.case_date.as_deref())?;

    let txs = store::query_transactions(
        &db,
        &TxFilter::for_spec(&params.spec_no, product_type.as_str()),
    )
    .await
    .map_err(store_error)?;

    Ok(Json(detail::inventory_detail(&txs, &params.spec_no, case_date)))
}

pub async fn get_demo_inventory(
    State(db): State<Database>,
) -> Result<Json<Vec<demo::DemoRow>>, StatusCode> {
    let txs = store::query_transactions(&db, &TxFilter::default())
        .await
        .map_err(store_error)?;

    Ok(Json(demo::demo_inventory(&txs, dates::today_utc())))
}

#[derive(Deserialize)]
pub struct AvailableParams {
    pub spec_no: String,
    pub product_type: String,
    pub case_date: Option<String>,
}

pub async fn get_available_products(
    State(db): State<Database>,
    Query(params): Query<AvailableParams>,
) -> Result<Json<Vec<picker::PickedUnit>>, StatusCode> {
    let product_type = parse_product_type(&params.product_type)?;
    let case_date = parse_case_date(params.case_date.as_deref())?;

    let txs = store::query_transactions(
        &db,
        &TxFilter::for_spec(&params.spec_no, product_type.as_str()),
    )
    .await
    .map_err(store_error)?;

    Ok(Json(picker::available_products(&txs, &params.spec_no, case_date)))
}

#[derive(Deserialize)]
pub struct PickRequest {
    pub spec_no: String,
    pub product_type: String,
    pub qty: i64,
    pub case_date: Option<String>,
}

pub async fn pick_products(
    State(db): State<Database>,
    Json(req): Json<PickRequest>,
) -> Result<Json<Vec<picker::PickedUnit>>, StatusCode> {
    let product_type = parse_product_type(&req.product_type)?;
    let case_date = parse_case_date(req.case_date.as_deref())?;
    if req.qty <= 0 {
        return Err(bad_request(LedgerError::InvalidQty(req.qty)));
    }

    let txs = store::query_transactions(
        &db,
        &TxFilter::for_spec(&req.spec_no, product_type.as_str()),
    )
    .await
    .map_err(store_error)?;

    Ok(Json(picker::pick_products(&txs, &req.spec_no, req.qty, case_date)))
}
