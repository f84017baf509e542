use actix_files::Files;
use actix_multipart::Multipart;
use actix_web::{Error, HttpResponse, web};
use futures::{StreamExt, TryStreamExt};
use log::{error, info, warn};
use serde_json::json;
use std::io::Write;
use uuid::Uuid;

use crate::inference::{ModelProvider, classify};

pub fn configure_routes(cfg: &mut web::ServiceConfig, static_dir: String) {
    cfg.service(web::resource("/predict").route(web::post().to(handle_predict)))
        .service(Files::new("/", static_dir).index_file("index.html"));
}

async fn handle_predict(
    provider: web::Data<ModelProvider>,
    mut payload: Multipart,
) -> Result<HttpResponse, Error> {
    let request_id = Uuid::new_v4();

    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Ok(Some(mut field)) = payload.try_next().await {
        let Some(disposition) = field.content_disposition() else {
            continue;
        };
        if disposition.get_name() != Some("file") {
            continue;
        }
        let filename = disposition
            .get_filename()
            .map(str::to_owned)
            .unwrap_or_default();

        let mut image_data = Vec::new();
        while let Some(chunk) = field.next().await {
            let data = chunk?;
            image_data.write_all(&data)?;
        }
        upload = Some((filename, image_data));
    }

    let Some((filename, image_data)) = upload else {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Please upload an MRI image."
        })));
    };
    if filename.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "No file selected."
        })));
    }

    let classifier = match provider.get() {
        Ok(classifier) => classifier,
        Err(e) => {
            error!("[{request_id}] classifier unavailable: {e}");
            return Ok(HttpResponse::ServiceUnavailable().json(json!({
                "message": "The classifier is not available right now. Please try again later."
            })));
        }
    };

    info!(
        "[{request_id}] classifying upload {filename:?} ({} bytes)",
        image_data.len()
    );
    match classify(&classifier, &image_data) {
        Ok(result) => {
            info!(
                "[{request_id}] predicted {} at {:.2}%",
                result.prediction, result.confidence
            );
            Ok(HttpResponse::Ok().json(result))
        }
        Err(e) => {
            warn!("[{request_id}] could not classify upload: {e}");
            Ok(HttpResponse::UnprocessableEntity().json(json!({
                "message": "Could not read this image. Please upload a valid MRI scan."
            })))
        }
    }
}
