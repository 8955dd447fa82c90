//! Terminal presentation. Display rounding happens here and nowhere else.

pub mod charts;
pub mod tables;

pub use charts::render_history;
pub use tables::{format_rating, render_detail, render_matchups, render_rankings, subtitle, title};
