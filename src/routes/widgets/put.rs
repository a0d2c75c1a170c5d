use super::*;

/// Source edits are accepted even while a run is in flight
#[put("/widgets/{id}/source")]
pub async fn put_widget_source_handler(
    store: web::Data<WidgetStore>,
    path: web::Path<(u32,)>,
    body: web::Json<SourceUpdate>,
) -> impl Responder {
    let widget_id = path.into_inner().0;

    match store.get(widget_id) {
        Some(widget) => {
            widget.edit_source(body.into_inner().source);
            log::debug!("Updated source of widget {widget_id}");
            HttpResponse::Ok().json(widget.view())
        }
        None => widget_not_found(widget_id),
    }
}
