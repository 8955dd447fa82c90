pub mod settings;
pub mod venues;

pub use settings::AppConfig;
pub use venues::{canonicalize_venue, get_venue_aliases};
