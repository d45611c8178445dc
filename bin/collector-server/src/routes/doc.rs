use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(info(
    title = "collector-server",
    description = "chat message ingestion API",
    version = "0.1.0",
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(super::health::HealthApi::openapi());
    root.merge(super::message::MessageApi::openapi());
    root
}
