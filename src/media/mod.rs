pub mod info;
pub mod locate;
pub mod profile;
pub mod sanitize;
pub mod youtube;

pub use info::{MetadataResolver, YtDlpResolver};
pub use locate::locate;
pub use profile::{OutputFormat, select_profile};
pub use sanitize::sanitize_title;
pub use youtube::{Acquirer, YtDlpAcquirer, output_template};

#[cfg(test)]
pub mod testing;
