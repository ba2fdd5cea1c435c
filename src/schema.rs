use std::sync::Arc;

use axum::{Router, routing::get};

use crate::{
    converter::Converter,
    handlers::{form_shown, form_submitted, health},
};

#[derive(Clone)]
pub struct AppState {
    pub converter: Arc<Converter>,
}

pub fn schema(state: AppState) -> Router {
    Router::new()
        .route("/", get(form_shown).post(form_submitted))
        .route("/health", get(health))
        .with_state(state)
}
