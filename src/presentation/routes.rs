use crate::presentation::{auth, handlers};
use actix_web::web;

/// Mounts every page of the application.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::home))
        .route("/health", web::get().to(handlers::health_check))
        .route("/login", web::get().to(auth::login_form))
        .route("/login", web::post().to(auth::login))
        .route("/logout", web::get().to(auth::logout))
        .route("/register", web::get().to(auth::register_form))
        .route("/register", web::post().to(auth::register))
        .route("/add-recipe", web::get().to(handlers::add_recipe_form))
        .route("/add-recipe", web::post().to(handlers::add_recipe))
        .route("/recipe/{id}", web::get().to(handlers::recipe_detail))
        .route("/inventory", web::get().to(handlers::inventory))
        .route("/inventory", web::post().to(handlers::update_inventory))
        .route("/my-recipes", web::get().to(handlers::my_recipes));
}
