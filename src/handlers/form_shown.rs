use axum::response::Html;

use crate::handlers::page::{FormValues, render_page};

pub async fn form_shown() -> Html<String> {
    render_page(&[], &FormValues::default())
}
