//! Rewrites rule text containing `@Name[payload]{display}` and `[[/name payload]]{display}`
//! directives into readable, annotated text. Damage payloads are small dice formulas such as
//! `(2d6 + 4)[slashing]`, evaluated over tagged damage terms.

pub mod args;
pub mod common;
pub mod config;
pub mod context;
pub mod damage;
pub mod enrich;
pub mod error;
pub mod i18n;
pub mod parse;

pub use config::EnrichConfig;
pub use context::{PathError, RollData};
pub use damage::{evaluate_damage, DamageInstance, DamageRoll, EvalError};
pub use enrich::{Enricher, SpanIds};
pub use error::EnrichError;
pub use i18n::{LazyTranslations, Translate, Translations};
pub use parse::{parse, ParseError};

/// Enriches `text` with the default configuration and no translations.
pub fn enrich(text: &str, data: &RollData) -> Result<String, EnrichError> {
    Enricher::new().enrich(text, data)
}
