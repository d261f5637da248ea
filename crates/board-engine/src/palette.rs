//! Card Colors
//!
//! Cards get a header gradient from a fixed palette, cycled by position.

pub const CARD_COLORS: &[&str] = &[
    "card-blue",
    "card-purple",
    "card-teal",
    "card-rose",
    "card-amber",
    "card-indigo",
    "card-emerald",
    "card-slate",
];

/// Color for the card at `index` on the board
pub fn card_color(index: usize) -> &'static str {
    CARD_COLORS[index % CARD_COLORS.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_color_cycles() {
        assert_eq!(card_color(0), CARD_COLORS[0]);
        assert_eq!(card_color(CARD_COLORS.len()), CARD_COLORS[0]);
        assert_eq!(card_color(CARD_COLORS.len() + 2), CARD_COLORS[2]);
    }
}
