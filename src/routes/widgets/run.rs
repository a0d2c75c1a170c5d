use super::*;

#[post("/widgets/{id}/run")]
pub async fn run_widget_handler(
    store: web::Data<WidgetStore>,
    dispatcher: web::Data<Dispatcher>,
    path: web::Path<(u32,)>,
    query: web::Query<RunQueryParams>,
) -> impl Responder {
    let widget_id = path.into_inner().0;

    let Some(widget) = store.get(widget_id) else {
        return widget_not_found(widget_id);
    };

    let ticket = match dispatcher.trigger(&widget) {
        Ok(ticket) => ticket,
        Err(RunError::Busy) => {
            log::info!("Widget {widget_id} is already running");
            return HttpResponse::BadRequest().json(ErrorResponseWithMessage {
                reason: "ERR_INVALID_STATE",
                code: 2,
                message: format!("Widget {widget_id} is already running."),
            });
        }
        Err(e) => {
            log::error!("Failed to start widget {widget_id}: {e}");
            return HttpResponse::InternalServerError().json(ErrorResponse {
                reason: "ERR_INTERNAL",
                code: 6,
            });
        }
    };

    // The run lives in its own task, so it always reaches `finish_run` even
    // when a waiting client goes away.
    let view = widget.view();
    let dispatcher = dispatcher.into_inner();
    let run_widget = widget.clone();
    let handle = actix_web::rt::spawn(async move {
        dispatcher.execute(&run_widget, ticket).await;
    });

    if query.wait.unwrap_or(false) {
        if let Err(e) = handle.await {
            log::error!("Run task of widget {widget_id} failed: {e}");
            return HttpResponse::InternalServerError().json(ErrorResponse {
                reason: "ERR_INTERNAL",
                code: 6,
            });
        }
        return HttpResponse::Ok().json(widget.view());
    }
    log::debug!("Started non-blocking run of widget {widget_id}");

    HttpResponse::Ok().json(view)
}
