use super::*;

#[delete("/widgets/{id}")]
pub async fn delete_widget_handler(
    store: web::Data<WidgetStore>,
    path: web::Path<(u32,)>,
) -> impl Responder {
    let widget_id = path.into_inner().0;

    match store.remove(widget_id) {
        Some(widget) => {
            log::info!("Removed widget {widget_id}");
            HttpResponse::Ok().json(widget.view())
        }
        None => widget_not_found(widget_id),
    }
}
