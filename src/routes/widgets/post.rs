use super::*;

#[post("/widgets")]
pub async fn post_widget_handler(
    store: web::Data<WidgetStore>,
    languages: web::Data<LanguageRegistry>,
    body: web::Json<WidgetConfig>,
) -> impl Responder {
    match store.create(body.into_inner(), &languages) {
        Ok(widget) => {
            log::info!(
                "Created widget {} for {}",
                widget.id,
                widget.language.display_name
            );
            HttpResponse::Ok().json(widget.view())
        }
        Err(e @ RunError::UnknownLanguage(_)) => {
            log::warn!("Rejected widget: {e}");
            HttpResponse::BadRequest().json(ErrorResponseWithMessage {
                reason: "ERR_INVALID_ARGUMENT",
                code: 1,
                message: e.to_string(),
            })
        }
        Err(e @ RunError::StoreFull { .. }) => {
            log::warn!("Rejected widget: {e}");
            HttpResponse::BadRequest().json(ErrorResponseWithMessage {
                reason: "ERR_INVALID_STATE",
                code: 2,
                message: e.to_string(),
            })
        }
        Err(e) => {
            log::error!("Failed to create widget: {e}");
            HttpResponse::InternalServerError().json(ErrorResponse {
                reason: "ERR_INTERNAL",
                code: 6,
            })
        }
    }
}
