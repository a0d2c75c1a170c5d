use actix_web::{App, HttpServer, dev::Server, middleware, web};

use crate::config::ServerConfig;
use crate::dispatcher::Dispatcher;
use crate::languages::LanguageRegistry;
use crate::routes::{
    delete_widget_handler, get_languages_handler, get_widget_handler, json_error_handler,
    post_widget_handler, put_widget_source_handler, query_error_handler, run_widget_handler,
};
use crate::store::{DEFAULT_MAX_WIDGETS, WidgetStore};

pub fn build_server(
    server_config: ServerConfig,
    languages: LanguageRegistry,
    dispatcher: Dispatcher,
) -> std::io::Result<Server> {
    let languages = web::Data::new(languages);
    let dispatcher = web::Data::new(dispatcher);
    let store = web::Data::new(WidgetStore::with_limit(
        server_config.max_widgets.unwrap_or(DEFAULT_MAX_WIDGETS),
    ));

    let bind_address = server_config
        .bind_address
        .unwrap_or("127.0.0.1".to_string());
    let bind_port = server_config.bind_port.unwrap_or(12345);
    log::info!("Listening on {bind_address}:{bind_port}");

    let server = HttpServer::new(move || {
        App::new()
            .app_data(languages.clone())
            .app_data(dispatcher.clone())
            .app_data(store.clone())
            .wrap(middleware::Logger::default())
            .configure(configure_routes)
    })
    .bind((bind_address, bind_port))?
    .run();

    Ok(server)
}

/// Registers every route and the JSON/query error handlers
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .service(get_languages_handler)
        .service(post_widget_handler)
        .service(get_widget_handler)
        .service(put_widget_source_handler)
        .service(run_widget_handler)
        .service(delete_widget_handler);
}
