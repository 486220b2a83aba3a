// pokedex-cli/src/render.rs
// ============================================================================
// Module: Output Rendering
// Description: Text rendering for Pokémon cards and search history.
// Purpose: Turn fetched data into the lines printed by CLI commands.
// Dependencies: pokedex-core, crate::i18n
// ============================================================================

//! ## Overview
//! Rendering is pure: each function returns the full text block and the
//! caller decides where to write it. Blocks end without a trailing newline.

use pokedex_core::HistoryEntry;

use crate::pokeapi::Pokemon;
use crate::t;

/// Renders one Pokémon card: name, types, and artwork URL.
#[must_use]
pub fn render_card(pokemon: &Pokemon) -> String {
    let types = pokemon.type_names().join(", ");
    let image = pokemon
        .artwork_url()
        .map_or_else(|| t!("card.image.none"), |url| t!("card.image", url = url));
    [t!("card.name", name = pokemon.name), t!("card.types", types = types), image].join("\n")
}

/// Renders cards separated by blank lines.
#[must_use]
pub fn render_cards(pokemon: &[Pokemon]) -> String {
    pokemon.iter().map(render_card).collect::<Vec<_>>().join("\n\n")
}

/// Renders history entries one per line, or the empty-history message.
#[must_use]
pub fn render_history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return t!("history.empty");
    }
    entries
        .iter()
        .map(|entry| t!("history.entry", timestamp = entry.timestamp, term = entry.term))
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions use unwrap for clarity."
    )]

    use pokedex_core::HistoryEntry;
    use pokedex_core::RecordedAt;
    use pokedex_core::SearchTerm;

    use super::render_card;
    use super::render_cards;
    use super::render_history;
    use crate::pokeapi::Pokemon;

    fn pokemon(json: &str) -> Pokemon {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn card_lists_name_types_and_artwork() {
        let bulbasaur = pokemon(
            r#"{"name":"bulbasaur","types":[{"type":{"name":"grass"}},{"type":{"name":"poison"}}],
                "sprites":{"other":{"official-artwork":{"front_default":"https://img/1.png"}}}}"#,
        );
        assert_eq!(
            render_card(&bulbasaur),
            "bulbasaur\n  Type: grass, poison\n  Image: https://img/1.png"
        );
    }

    #[test]
    fn card_without_artwork_says_none() {
        let card = render_card(&pokemon(r#"{"name":"ditto","types":[{"type":{"name":"normal"}}]}"#));
        assert!(card.ends_with("Image: (none)"));
    }

    #[test]
    fn cards_are_separated_by_blank_lines() {
        let list = vec![pokemon(r#"{"name":"a"}"#), pokemon(r#"{"name":"b"}"#)];
        let rendered = render_cards(&list);
        assert_eq!(rendered.matches("\n\n").count(), 1);
        assert!(rendered.starts_with('a'));
    }

    #[test]
    fn empty_history_renders_message() {
        assert_eq!(render_history(&[]), "No search history found.");
    }

    #[test]
    fn history_lines_keep_order() {
        let entries = vec![
            HistoryEntry {
                term: SearchTerm::parse("pikachu").unwrap(),
                timestamp: RecordedAt::from_unix_millis(1_700_000_001_000),
            },
            HistoryEntry {
                term: SearchTerm::parse("eevee").unwrap(),
                timestamp: RecordedAt::from_unix_millis(1_700_000_000_000),
            },
        ];
        let rendered = render_history(&entries);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("  pikachu"));
        assert!(lines[0].starts_with("2023-11-14T22:13:21"));
        assert!(lines[1].ends_with("  eevee"));
    }
}
