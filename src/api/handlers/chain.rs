use axum::Json;
use axum::extract::{Path, State};

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::model::{ChainView, TickerQuote};

pub async fn get_chain(State(state): State<AppState>) -> Json<ChainView> {
    Json(state.current_or_refresh().await)
}

pub async fn refresh_chain(State(state): State<AppState>) -> Json<ChainView> {
    Json(state.refresh().await)
}

pub async fn get_quote(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<TickerQuote>, ApiError> {
    let quotes = state.quote_source().await;
    let quote = quotes.quote(&symbol).await?;
    Ok(Json(quote))
}
