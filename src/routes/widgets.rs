mod delete;
mod get;
mod post;
mod put;
mod run;

pub use delete::delete_widget_handler;
pub use get::get_widget_handler;
pub use post::post_widget_handler;
pub use put::put_widget_source_handler;
pub use run::run_widget_handler;

use actix_web::{HttpResponse, Responder, delete, get, post, put, web};
use serde::{Deserialize, Serialize};

use super::{ErrorResponse, ErrorResponseWithMessage};
use crate::dispatcher::Dispatcher;
use crate::error::RunError;
use crate::languages::LanguageRegistry;
use crate::store::WidgetStore;
use crate::widget::WidgetConfig;

#[derive(Serialize, Deserialize, Debug)]
pub struct SourceUpdate {
    pub source: String,
}

#[derive(Deserialize)]
pub struct RunQueryParams {
    /// Answer only once the run has finished
    pub wait: Option<bool>,
}

fn widget_not_found(widget_id: u32) -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponseWithMessage {
        reason: "ERR_NOT_FOUND",
        code: 3,
        message: format!("Widget {widget_id} not found."),
    })
}
