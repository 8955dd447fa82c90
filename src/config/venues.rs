use crate::domain::Venue;

/// One free-text location string as it appears in the match log
#[derive(Debug, Clone)]
pub struct VenueAlias {
    pub alias: &'static str,
    pub venue: Venue,
}

impl VenueAlias {
    pub const fn new(alias: &'static str, venue: Venue) -> Self {
        Self { alias, venue }
    }
}

/// Every location string the log is allowed to contain
pub fn get_venue_aliases() -> Vec<VenueAlias> {
    vec![
        VenueAlias::new("Pong Detroit", Venue::PongDetroit),
        VenueAlias::new("Pong Detroit (Bert's)", Venue::PongDetroit),
        VenueAlias::new("Pong Detroit (Magee's)", Venue::PongDetroit),
        VenueAlias::new("Viet Detroit (Grace Parish Warren)", Venue::VietDetroit),
        VenueAlias::new("MTTA (Sparc Arena Novi)", Venue::Mtta),
        VenueAlias::new("Norm's", Venue::Norms),
        VenueAlias::new("New Way Bar (Ferndale)", Venue::NewWay),
    ]
}

/// Fold a raw location into its canonical venue.
///
/// Matching ignores case and surrounding whitespace; canonical names and
/// abbreviations are accepted too, so a snapshot file can be read back.
pub fn canonicalize_venue(raw: &str) -> Option<Venue> {
    let needle = raw.trim();
    if needle.is_empty() {
        return None;
    }

    get_venue_aliases()
        .into_iter()
        .find(|a| a.alias.eq_ignore_ascii_case(needle))
        .map(|a| a.venue)
        .or_else(|| {
            Venue::ALL.into_iter().find(|v| {
                v.name().eq_ignore_ascii_case(needle) || v.abbrev().eq_ignore_ascii_case(needle)
            })
        })
}
