use actix_web::web::Data;
use actix_web::HttpResponse;

use crate::app::IngestError;
use crate::web::AppState;

/// `GET /` lists every stored weather record.
pub async fn handle(state: Data<AppState>) -> Result<HttpResponse, IngestError> {
    info!("GET / endpoint hit");

    let records = state.manager.list_records().await.map_err(|e| {
        error!("Listing records failed: {}", e);
        e
    })?;

    Ok(HttpResponse::Ok().json(records))
}
