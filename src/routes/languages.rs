use actix_web::{HttpResponse, Responder, get, web};

use crate::languages::{LanguageRegistry, LanguageSpec};

#[get("/languages")]
pub async fn get_languages_handler(languages: web::Data<LanguageRegistry>) -> impl Responder {
    let all: Vec<&LanguageSpec> = languages.iter().collect();
    HttpResponse::Ok().json(all)
}
