use super::*;

#[get("/widgets/{id}")]
pub async fn get_widget_handler(
    store: web::Data<WidgetStore>,
    path: web::Path<(u32,)>,
) -> impl Responder {
    let widget_id = path.into_inner().0;

    match store.get(widget_id) {
        Some(widget) => HttpResponse::Ok().json(widget.view()),
        None => {
            log::info!("Got nothing with widget id {widget_id}");
            widget_not_found(widget_id)
        }
    }
}
