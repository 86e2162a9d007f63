use actix_cors::Cors;
use actix_multipart::{Field, Multipart};
use actix_web::{App, HttpResponse, HttpServer, Responder, get, middleware::Logger, post, web};
use futures_util::TryStreamExt;
use log::{debug, info, warn};
use serde::Deserialize;

use crate::client::{
    ResponseFormat, TranscriptionClient, TranscriptionOptions, TranscriptionResult, UploadRequest,
};
use crate::config::{DEFAULT_MODEL, MAX_UPLOAD_BYTES, Settings};
use crate::dto::{HealthDto, TranscriptionDto};
use crate::error::ApiError;
use crate::validate::{extension_for_content_type, resolve_content_type, validate};

pub struct AppState {
    pub client: TranscriptionClient,
}

/// Optional parameters may also arrive on the query string.
#[derive(Debug, Default, Deserialize)]
pub struct TranscribeQuery {
    pub model: Option<String>,
    pub response_format: Option<String>,
    pub prompt: Option<String>,
}

struct ReceivedFile {
    bytes: Vec<u8>,
    /// Full length of the part, even when only a prefix was buffered.
    len: usize,
    filename: Option<String>,
    content_type: Option<String>,
}

#[get("/health")]
pub async fn health_check() -> impl Responder {
    debug!("Health check endpoint called");
    HttpResponse::Ok().json(HealthDto {
        status: "ok",
        message: "Transcription relay is running",
    })
}

#[post("/transcribe")]
pub async fn transcribe_upload(
    data: web::Data<AppState>,
    query: web::Query<TranscribeQuery>,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    debug!("Transcription request received");

    let TranscribeQuery {
        mut model,
        mut response_format,
        mut prompt,
    } = query.into_inner();
    let mut file: Option<ReceivedFile> = None;

    while let Some(field) = payload
        .try_next()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart payload: {e}")))?
    {
        match field.name() {
            Some("file") => {
                let received = read_file_field(field, MAX_UPLOAD_BYTES).await?;
                debug!("File field received: {} bytes", received.len);
                file = Some(received);
            }
            Some("model") => model = Some(read_text_field(field, "model").await?),
            Some("response_format") => {
                response_format = Some(read_text_field(field, "response_format").await?)
            }
            Some("prompt") => prompt = Some(read_text_field(field, "prompt").await?),
            _ => continue,
        }
    }

    let Some(file) = file else {
        warn!("No file provided in transcription request");
        return Err(ApiError::BadRequest("No file provided".to_string()));
    };

    let content_type = resolve_content_type(file.content_type.as_deref(), file.filename.as_deref());
    if let Err(rejection) = validate(&content_type, file.len) {
        warn!("Upload rejected: {rejection}");
        return Err(rejection.into());
    }

    let response_format = response_format
        .filter(|format| !format.trim().is_empty())
        .map(|format| format.parse::<ResponseFormat>())
        .transpose()
        .map_err(ApiError::BadRequest)?;

    let options = TranscriptionOptions {
        model: model
            .filter(|model| !model.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        response_format,
        prompt,
    };

    let filename = file.filename.unwrap_or_else(|| {
        let extension = extension_for_content_type(&content_type).unwrap_or("mp3");
        format!("audio_upload.{extension}")
    });

    info!(
        "Transcribing {filename}: {} bytes, {content_type}, model={}",
        file.len, options.model
    );

    let result = data
        .client
        .transcribe(UploadRequest {
            bytes: file.bytes,
            filename,
            content_type,
            options,
        })
        .await?;

    Ok(match result {
        TranscriptionResult::Json(value) => HttpResponse::Ok().json(value),
        TranscriptionResult::Text(text) => HttpResponse::Ok().json(TranscriptionDto { text }),
    })
}

async fn read_file_field(mut field: Field, limit: usize) -> Result<ReceivedFile, ApiError> {
    let filename = field
        .content_disposition()
        .and_then(|cd| cd.get_filename())
        .filter(|name| !name.is_empty())
        .map(str::to_string);
    let content_type = field.content_type().map(|mime| mime.to_string());

    let mut bytes = Vec::new();
    let mut len = 0usize;
    while let Some(chunk) = field
        .try_next()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {e}")))?
    {
        len += chunk.len();
        if len <= limit {
            bytes.extend_from_slice(&chunk);
        } else if !bytes.is_empty() {
            // over the limit: keep counting, stop buffering
            bytes = Vec::new();
        }
    }

    Ok(ReceivedFile {
        bytes,
        len,
        filename,
        content_type,
    })
}

async fn read_text_field(mut field: Field, name: &str) -> Result<String, ApiError> {
    let mut data = Vec::new();
    while let Some(chunk) = field
        .try_next()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read {name} field: {e}")))?
    {
        data.extend_from_slice(&chunk);
    }
    let text = String::from_utf8(data)
        .map_err(|_| ApiError::BadRequest(format!("Field {name} is not valid UTF-8")))?;
    debug!("Field {name} set to: {text}");
    Ok(text)
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check).service(transcribe_upload);
}

pub async fn run_server(host: String, port: u16, settings: Settings) -> anyhow::Result<()> {
    info!("Starting transcription relay");
    info!(
        "Using configuration: base_url={}, upstream_timeout={:?}",
        settings.base_url, settings.upstream_timeout
    );

    let client = TranscriptionClient::new(&settings)?;
    let app_state = web::Data::new(AppState { client });

    info!("Starting HTTP server on {host}:{port}");

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await?;

    Ok(())
}
