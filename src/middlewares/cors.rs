use actix_cors::Cors;

pub fn create_cors(frontend_url: &str) -> Cors {
    let origin = frontend_url.to_string();
    Cors::default()
        .allowed_origin_fn(move |header, _req_head| {
            header.as_bytes() == origin.as_bytes() || origin.is_empty()
        })
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allow_any_header()
        .supports_credentials()
        .max_age(3600)
}
