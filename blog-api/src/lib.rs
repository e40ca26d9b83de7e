pub mod controllers;
pub mod models;
pub mod revalidate;
pub mod services;
pub mod settings;
pub mod state;

use axum::Router;
use blog_core::{default_cors, AppBuilder};
use blog_data::DocumentStore;

use crate::revalidate::Revalidator;
use crate::state::AppState;

/// Builder with the article routes and the standard layers installed.
pub fn app_builder<S: DocumentStore, R: Revalidator>(
    state: AppState<S, R>,
) -> AppBuilder<AppState<S, R>> {
    AppBuilder::new(state)
        .routes(controllers::article_controller::routes())
        .with_health()
        .with_cors(default_cors())
        .with_tracing()
        .with_error_handling()
        .normalize_path()
}

pub fn build_app<S: DocumentStore, R: Revalidator>(state: AppState<S, R>) -> Router {
    app_builder(state).build()
}
