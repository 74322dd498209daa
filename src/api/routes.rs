use actix_web::{error::JsonPayloadError, post, web, HttpRequest, HttpResponse, Result as WebResult};

use crate::proxy::{
    ChatProxy, ChatRequest, ImageProxy, ImageRequest, ProxyError, ResearchProxy, ResearchRequest,
};

#[post("/chat")]
pub async fn chat(
    proxy: web::Data<ChatProxy>,
    req: web::Json<ChatRequest>,
) -> WebResult<HttpResponse> {
    let reply = proxy.handle(req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(reply))
}

#[post("/generate-image")]
pub async fn generate_image(
    proxy: web::Data<ImageProxy>,
    req: web::Json<ImageRequest>,
) -> WebResult<HttpResponse> {
    let reply = proxy.handle(req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(reply))
}

#[post("/web-research")]
pub async fn web_research(
    proxy: web::Data<ResearchProxy>,
    req: web::Json<ResearchRequest>,
) -> WebResult<HttpResponse> {
    let reply = proxy.handle(req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(reply))
}

/// Malformed bodies answer with the same envelope as a missing field.
fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ProxyError::validation(format!("Invalid request body: {}", err)).into()
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/functions/v1")
            .app_data(web::JsonConfig::default().error_handler(json_error))
            .service(chat)
            .service(generate_image)
            .service(web_research),
    );
}
