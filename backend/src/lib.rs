pub mod processor;
pub mod routes;
pub mod store;
pub mod queries;
pub mod notifier;
pub mod ticker;
pub mod config;
pub mod cors;
pub mod error;
pub mod utils;
pub mod catchers;
pub use shared::{models::*, error::*};

use rocket::{catchers, Build, Rocket};

use crate::{
    catchers::{bad_request, forbidden, internal_error, not_found, unauthorized, unprocessable},
    cors::CORS,
    routes::AppState,
};

/// Assembles the HTTP server around an already-built state. The caller
/// decides which store and clock sit underneath.
pub fn build_rocket(state: AppState) -> Rocket<Build> {
    rocket::build()
        .attach(CORS)
        .manage(state)
        .mount("/api", routes::routes())
        .register(
            "/",
            catchers![
                unauthorized,
                forbidden,
                bad_request,
                unprocessable,
                internal_error,
                not_found
            ],
        )
}
