mod form_shown;
mod form_submitted;
mod health;
mod page;

pub use form_shown::form_shown;
pub use form_submitted::form_submitted;
pub use health::health;
