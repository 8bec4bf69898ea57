//! Deck loading.
//!
//! A deck file is either a JSON array of flat `{ "<lang>": "<text>" }` objects
//! or an object carrying the same array under `phrases`. Key order inside each
//! card is preserved so the first card's keys can seed the language selectors
//! in file order.

use crate::error::{PlayerError, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// One deck entry: language key to phrase text, in file order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Card {
    entries: Vec<(String, String)>,
}

impl Card {
    pub fn new<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    /// Text for a language key; missing keys read as empty.
    pub fn text(&self, key: &str) -> &str {
        self.entries
            .iter()
            .find(|(lang, _)| lang == key)
            .map(|(_, text)| text.as_str())
            .unwrap_or("")
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }
}

/// Ordered, non-empty set of cards loaded from one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn new(cards: Vec<Card>) -> Result<Self> {
        let Some(first) = cards.first() else {
            return Err(PlayerError::DeckFormat("deck has no cards".to_string()));
        };
        if first.keys().next().is_none() {
            return Err(PlayerError::DeckFormat(
                "first card has no language keys".to_string(),
            ));
        }
        Ok(Self { cards })
    }

    pub fn from_json(data: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(data)
            .map_err(|err| PlayerError::DeckFormat(format!("malformed JSON: {err}")))?;

        let items = match value {
            Value::Array(items) => items,
            Value::Object(mut map) => match map.remove("phrases") {
                Some(Value::Array(items)) => items,
                _ => {
                    return Err(PlayerError::DeckFormat(
                        "expected an array of cards or an object with a `phrases` array"
                            .to_string(),
                    ));
                }
            },
            _ => {
                return Err(PlayerError::DeckFormat(
                    "expected an array of cards".to_string(),
                ));
            }
        };

        let cards = items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| parse_card(idx, item))
            .collect::<Result<Vec<_>>>()?;
        let deck = Self::new(cards)?;
        debug!(cards = deck.len(), "Parsed deck");
        Ok(deck)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn card(&self, index: usize) -> Option<&Card> {
        self.cards.get(index)
    }

    /// Language keys offered by the selectors: the first card's keys.
    pub fn language_keys(&self) -> Vec<String> {
        self.cards
            .first()
            .map(|card| card.keys().map(str::to_string).collect())
            .unwrap_or_default()
    }
}

fn parse_card(idx: usize, item: Value) -> Result<Card> {
    let Value::Object(map) = item else {
        return Err(PlayerError::DeckFormat(format!(
            "card {} is not an object",
            idx + 1
        )));
    };

    let mut entries = Vec::with_capacity(map.len());
    for (key, value) in map {
        let text = match value {
            Value::String(text) => text,
            Value::Number(number) => number.to_string(),
            Value::Bool(flag) => flag.to_string(),
            Value::Null => continue,
            Value::Array(_) | Value::Object(_) => {
                return Err(PlayerError::DeckFormat(format!(
                    "card {} has a nested value under `{key}`",
                    idx + 1
                )));
            }
        };
        entries.push((key, text));
    }
    Ok(Card { entries })
}

/// Read and parse a deck file; the label is the file name shown to the user.
pub fn load_deck_file(path: &Path) -> Result<(String, Deck)> {
    let label = deck_label(path);
    let data = fs::read_to_string(path)?;
    let deck = Deck::from_json(&data)?;
    info!(path = %path.display(), cards = deck.len(), "Loaded deck");
    Ok((label, deck))
}

pub fn deck_label(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("deck.json")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_array_in_key_order() {
        let deck = Deck::from_json(r#"[{"es-ES":"Hola","en-GB":"Hello"},{"en-GB":"Bye"}]"#)
            .expect("valid deck");
        assert_eq!(deck.len(), 2);
        assert_eq!(deck.language_keys(), vec!["es-ES", "en-GB"]);
        let second = deck.card(1).expect("second card");
        assert_eq!(second.text("en-GB"), "Bye");
        assert_eq!(second.text("es-ES"), "");
    }

    #[test]
    fn accepts_phrases_wrapper() {
        let deck = Deck::from_json(r#"{"title":"Trip","phrases":[{"en":"Hello","fr":"Bonjour"}]}"#)
            .expect("wrapped deck");
        assert_eq!(deck.len(), 1);
        assert_eq!(deck.card(0).map(|card| card.text("fr")), Some("Bonjour"));
    }

    #[test]
    fn rejects_empty_array() {
        let err = Deck::from_json("[]").expect_err("empty deck must fail");
        assert!(matches!(err, PlayerError::DeckFormat(_)));
    }

    #[test]
    fn rejects_non_object_cards() {
        let err = Deck::from_json(r#"[{"en":"Hi"}, "oops"]"#).expect_err("string card must fail");
        assert!(err.to_string().contains("card 2"));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            Deck::from_json("{not json"),
            Err(PlayerError::DeckFormat(_))
        ));
    }

    #[test]
    fn stringifies_scalar_values_and_skips_nulls() {
        let deck = Deck::from_json(r#"[{"en":"Seven","num":7,"skip":null}]"#).expect("deck");
        assert_eq!(deck.language_keys(), vec!["en", "num"]);
        assert_eq!(deck.card(0).map(|card| card.text("num")), Some("7"));
    }

    #[test]
    fn label_is_file_name() {
        assert_eq!(deck_label(Path::new("/decks/travel.json")), "travel.json");
    }
}
