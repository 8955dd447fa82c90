use std::fmt::Write as _;

use colored::Colorize;

use crate::domain::{Mode, PlayerRating};
use crate::matchups::{MatchupDetail, MatchupReport};
use crate::rating::RatingState;

const RULE: &str = "~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~";
const Z_95: f64 = 1.96;

pub fn title(text: &str) -> String {
    format!("\n{}\n{}\n{}\n", RULE, text.bold(), RULE)
}

pub fn subtitle(text: &str) -> String {
    format!("\n{}\n{}\n", text.bold(), "~".repeat(text.chars().count()))
}

/// `mu ± 1.96 * uncertainty`, rounded for display only.
/// Singles: whole points, interval to the nearest 10. Doubles: mean to 0.1.
pub fn format_rating(rating: RatingState) -> String {
    let interval = Z_95 * rating.uncertainty();
    match rating {
        RatingState::Pairwise(r) => {
            format!("{:.0} ± {:.0}", r.mu, (interval / 10.0).round() * 10.0)
        }
        RatingState::Team(r) => format!("{:.1} ± {:.0}", r.mu, interval),
    }
}

fn rating_of(player: &PlayerRating, mode: Mode) -> RatingState {
    match mode {
        Mode::Singles => player.rating_singles().into(),
        Mode::Doubles => player.rating_doubles().into(),
    }
}

fn format_optional(value: Option<f64>, mode: Mode) -> String {
    match (value, mode) {
        (None, _) => "-".to_string(),
        (Some(v), Mode::Singles) => format!("{:.0}", v),
        (Some(v), Mode::Doubles) => format!("{:.1}", v),
    }
}

pub fn render_rankings(players: &[&PlayerRating], mode: Mode) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>3}  {:<14} {:<14} {:>7}  {:>7}  {:>8}  {:>7}  {:<9}",
        "#", "Player", "Rating", "W-L", "Avg opp", "Best win", "Partner", "Home"
    );

    for (rank, player) in players.iter().enumerate() {
        let stats = player.stats(mode);
        let _ = writeln!(
            out,
            "{:>3}  {:<14} {:<14} {:>7}  {:>7}  {:>8}  {:>7}  {:<9}",
            rank + 1,
            player.username,
            format_rating(rating_of(player, mode)),
            format!("{}-{}", stats.wins(), stats.losses()),
            format_optional(stats.average_opponent(), mode),
            format_optional(stats.best_win(), mode),
            format_optional(stats.average_partner(), mode),
            stats.home_venue().map(|v| v.abbrev()).unwrap_or("-"),
        );
    }

    out
}

pub fn render_matchups(report: &MatchupReport, mode: Mode) -> String {
    let mut out = title(&format!(
        "{} matchups (top {}, {} possible, {} evaluated, {} skipped)",
        mode,
        report.candidates.len(),
        report.total,
        report.evaluated,
        report.skipped.total()
    ));

    let _ = writeln!(
        out,
        "{:<24} {:<24} {:>7} {:>7} {:>7} {:>6}",
        "Side A", "Side B", "Δμ", "Unc", "Quality", "P(A)"
    );
    for candidate in &report.candidates {
        let _ = writeln!(
            out,
            "{:<24} {:<24} {:>7.1} {:>7.1} {:>7.3} {:>6.2}",
            candidate.side_a.join(" & "),
            candidate.side_b.join(" & "),
            candidate.delta_mu,
            candidate.uncertainty,
            candidate.quality,
            candidate.win_probability,
        );
    }

    out
}

pub fn render_detail(detail: &MatchupDetail) -> String {
    let odds = &detail.odds;
    let mut out = title(&format!(
        "{} vs {} (Δμ={:.1}, unc={:.1})",
        detail.side_a.join(" & "),
        detail.side_b.join(" & "),
        detail.delta_mu,
        detail.uncertainty
    ));

    let _ = writeln!(out, "{:<12} {:>6}", "x", "P(x)");
    for (label, value) in [
        ("Game", odds.game),
        ("Point", odds.point),
        ("Deuce", odds.deuce_reach),
        ("Win deuce", odds.deuce_win),
        ("Win 6/6", odds.win_all_of_six),
    ] {
        let _ = writeln!(out, "{:<12} {:>6.3}", label, value);
    }

    out.push_str(&subtitle("Point handicaps"));
    let _ = writeln!(out, "{:<6} {:>6}", "H-cap", "P(w)");
    for (points, p) in &odds.handicaps {
        let _ = writeln!(out, "{:<6} {:>6.3}", format!("0-{}", points), p);
    }

    out.push_str(&subtitle("Win n+ games out of 10"));
    for (k, p) in &odds.at_least_k_of_ten {
        let _ = writeln!(out, "{:>3}  {:>6.3}", k, p);
    }

    out.push_str(&subtitle("Score n+ points in a game"));
    for (k, p) in &odds.at_least_k_points {
        let _ = writeln!(out, "{:>3}  {:>6.3}", k, p);
    }

    out.push_str(&subtitle("Match odds"));
    let _ = write!(out, "{:<14}", "P(...)");
    for (n, _) in &odds.match_win {
        let _ = write!(out, " {:>8}", format!("{}-game", 2 * n - 1));
    }
    out.push('\n');
    for (label, row) in [
        ("Win match", &odds.match_win),
        ("Win 1+ games", &odds.at_least_one_game),
        ("Win all games", &odds.win_all_games),
    ] {
        let _ = write!(out, "{:<14}", label);
        for (_, p) in row {
            let _ = write!(out, " {:>8.3}", p);
        }
        out.push('\n');
    }

    out.push_str(&subtitle("Rating changes"));
    let _ = writeln!(
        out,
        "{:<14} {:>8} {:>8} {:>8} {:>8}",
        "Player", "μ", "A wins", "A loses", "Δunc"
    );
    for preview in &detail.previews {
        let _ = writeln!(
            out,
            "{:<14} {:>8.1} {:>+8.1} {:>+8.1} {:>+8.1}",
            preview.username,
            preview.mu,
            preview.delta_if_a_wins,
            preview.delta_if_a_loses,
            preview.uncertainty_change
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::{Glicko2Rating, TrueSkillRating};

    #[test]
    fn test_format_rating_rounds_for_display() {
        let singles = RatingState::from(Glicko2Rating::new(1623.4, 61.0, 0.06));
        assert_eq!(format_rating(singles), "1623 ± 120");

        let doubles = RatingState::from(TrueSkillRating::new(27.349, 2.2));
        assert_eq!(format_rating(doubles), "27.3 ± 4");
    }

    #[test]
    fn test_render_rankings_lists_players_in_order() {
        let mut a = PlayerRating::new(
            "shane",
            Glicko2Rating::new(1500.0, 350.0, 0.06),
            TrueSkillRating::new(25.0, 25.0 / 3.0),
        );
        a.push_singles(Glicko2Rating::new(1600.0, 250.0, 0.06));
        a.singles.opponent_strength_on_win.push(1500.0);
        let b = PlayerRating::new(
            "alex",
            Glicko2Rating::new(1400.0, 250.0, 0.06),
            TrueSkillRating::new(25.0, 25.0 / 3.0),
        );

        let table = render_rankings(&[&a, &b], Mode::Singles);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("shane"));
        assert!(lines[1].contains("1-0"));
        assert!(lines[2].contains("alex"));
    }
}
