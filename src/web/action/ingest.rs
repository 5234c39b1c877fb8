use actix_web::web::{BytesMut, Data, Payload};
use actix_web::HttpResponse;
use futures::StreamExt;

use crate::app::{IngestError, WeatherIngestManager};
use crate::web::AppState;

const MAX_QUERY_BYTES: usize = 256 * 1024;

/// `POST /` decodes the query, relays it and answers with the provider payload.
pub async fn handle(state: Data<AppState>, payload: Payload) -> Result<HttpResponse, IngestError> {
    info!("POST / endpoint hit");

    let body = read_query(payload).await.map_err(|e| {
        error!("Error reading query: {}", e);
        e
    })?;

    let query = WeatherIngestManager::decode_query(&body).map_err(|e| {
        error!("Error decoding query: {}", e);
        e
    })?;

    info!("Received parameters: {:?}", query);

    let response = state.manager.ingest(&query).await.map_err(|e| {
        error!("Ingest for {} failed: {}", query.location, e);
        e
    })?;

    Ok(HttpResponse::Ok().json(response))
}

async fn read_query(mut payload: Payload) -> Result<BytesMut, IngestError> {
    let mut body = BytesMut::new();

    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| IngestError::InvalidInput(e.to_string()))?;
        if body.len() + chunk.len() > MAX_QUERY_BYTES {
            return Err(IngestError::InvalidInput(format!("query exceeds {} bytes", MAX_QUERY_BYTES)));
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body)
}
