use crate::application::error::ApplicationError; // Added for handler return types
use crate::application::overlay_service::{OverlayRequest, OverlayService};
use super::image_source::decode_image_payload;
use axum::{
    async_trait,
    body::Body,
    extract::{FromRequest, Multipart, State},
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::sync::Arc;
use tracing::debug;

pub const SERVICE_NAME: &str = "Image Overlay Service";

#[derive(Clone)]
pub struct AppState {
    pub overlay_service: Arc<OverlayService>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct ServiceInfo {
    pub service: String,
    pub status: String,
    pub version: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct HealthStatus {
    pub status: String,
}

// JSON リクエスト DTO。image は base64 か data URL
#[derive(Deserialize, Debug)]
pub struct OverlayJsonBody {
    pub image: String,
    pub quote: String,
    pub attribution: Option<String>,
    #[serde(alias = "outputFormat")]
    pub format: Option<String>,
    #[serde(alias = "textColor")]
    pub text_color: Option<String>,
}

/// `POST /overlay` body, accepted either as `multipart/form-data` or as JSON.
#[derive(Debug)]
pub struct OverlayPayload(pub OverlayRequest);

#[async_trait]
impl<S> FromRequest<S, Body> for OverlayPayload
where
    S: Send + Sync,
{
    type Rejection = ApplicationError;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| body_error(e.status(), "Multipart error", e))?;
            read_multipart(multipart).await.map(OverlayPayload)
        } else if content_type.starts_with("application/json") {
            let Json(body) = Json::<OverlayJsonBody>::from_request(req, state)
                .await
                .map_err(|e| body_error(e.status(), "Invalid JSON body", e))?;
            Ok(OverlayPayload(OverlayRequest {
                image: decode_image_payload(&body.image)?,
                quote: body.quote,
                attribution: body.attribution,
                output_format: body.format,
                text_color: body.text_color,
            }))
        } else {
            Err(ApplicationError::BadRequest(format!(
                "Unsupported content type {:?}: use multipart/form-data or application/json",
                content_type
            )))
        }
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<OverlayRequest, ApplicationError> {
    let mut request = OverlayRequest::default();
    let mut quote = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| body_error(e.status(), "Multipart error", e))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| body_error(e.status(), "Failed to read image field", e))?;
                request.image = data.to_vec();
            }
            "quote" | "attribution" | "format" | "text_color" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| body_error(e.status(), &format!("Failed to read field {}", name), e))?;
                match name.as_str() {
                    "quote" => quote = Some(value),
                    "attribution" => request.attribution = Some(value),
                    "format" => request.output_format = Some(value),
                    _ => request.text_color = Some(value),
                }
            }
            other => debug!(field = other, "ignoring unknown multipart field"),
        }
    }

    if request.image.is_empty() {
        return Err(ApplicationError::BadRequest("Missing multipart field: image".to_string()));
    }
    request.quote = quote.ok_or_else(|| ApplicationError::BadRequest("Missing multipart field: quote".to_string()))?;
    Ok(request)
}

// ボディ上限超過は 413、それ以外の読み取りエラーは 400
fn body_error(status: StatusCode, context: &str, e: impl Display) -> ApplicationError {
    let message = format!("{}: {}", context, e);
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ApplicationError::PayloadTooLarge(message)
    } else {
        ApplicationError::BadRequest(message)
    }
}

pub async fn root_handler() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: SERVICE_NAME.to_string(),
        status: "running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn health_handler() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy".to_string(),
    })
}

pub async fn overlay_handler(
    State(state): State<Arc<AppState>>,
    OverlayPayload(request): OverlayPayload,
) -> Result<Response, ApplicationError> {
    let rendered = state.overlay_service.render_overlay(request).await?;

    Ok((
        [(header::CONTENT_TYPE, rendered.format.content_type())],
        rendered.data,
    )
        .into_response())
}
