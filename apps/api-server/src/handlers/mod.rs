//! HTTP handlers and route configuration.

mod auth;
mod blog;
mod health;
mod posts;
mod uploads;

use actix_web::web;

use nexiler_core::authoring::MAX_IMAGE_BYTES;

/// Headroom above the image limit so oversized uploads reach the handler and
/// get a field error instead of a bare 413.
const UPLOAD_PAYLOAD_LIMIT: usize = MAX_IMAGE_BYTES + 1024 * 1024;

/// Post forms carry the image as a base64 data URL.
const FORM_JSON_LIMIT: usize = MAX_IMAGE_BYTES / 3 * 4 + 1024 * 1024;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/blog")
                    .route("", web::get().to(blog::list_published))
                    .route("/{id}", web::get().to(blog::get_published)),
            )
            // Auth routes
            .service(
                web::scope("/auth")
                    .route("/login", web::post().to(auth::login))
                    .route("/logout", web::post().to(auth::logout))
                    .route("/me", web::get().to(auth::me)),
            )
            // Admin routes - every handler takes an Identity
            .service(
                web::scope("/admin")
                    .app_data(web::JsonConfig::default().limit(FORM_JSON_LIMIT))
                    .service(
                        web::resource("/posts")
                            .route(web::get().to(posts::list_posts))
                            .route(web::post().to(posts::create_post)),
                    )
                    .route("/posts/stream", web::get().to(posts::stream_posts))
                    .service(
                        web::resource("/posts/{id}")
                            .route(web::put().to(posts::update_post))
                            .route(web::patch().to(posts::patch_post))
                            .route(web::delete().to(posts::delete_post)),
                    )
                    .service(
                        web::resource("/uploads/image")
                            .app_data(web::PayloadConfig::new(UPLOAD_PAYLOAD_LIMIT))
                            .route(web::post().to(uploads::upload_image)),
                    ),
            ),
    );
}
