use actix_cors::Cors;

pub fn create_cors() -> Cors {
    Cors::default()
        .allowed_origin_fn(|_, _req_head| {
            // Companion apps call from device-local origins; restrict per
            // deployment if needed.
            true
        })
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        // Allow the custom session header without failing preflight.
        .allow_any_header()
        .max_age(3600)
}
