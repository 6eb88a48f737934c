//! Resolving the directives embedded in rule text.
//!
//! Block directives (`@Name[payload]{display}`) are resolved first, `@Damage` before the rest
//! since its payload may contain brackets. Inline rolls (`[[/name payload]]{display}`) follow.

mod directive;
mod scan;
mod span;

pub use directive::Directive;
pub use scan::Occurrence;
pub use span::SpanIds;

use crate::args::Args;
use crate::config::EnrichConfig;
use crate::context::RollData;
use crate::error::EnrichError;
use crate::i18n::{Translate, Translations};
use std::sync::Arc;
use tracing::trace;

type Result<T> = std::result::Result<T, EnrichError>;

pub struct Enricher<T = Translations> {
    config: EnrichConfig,
    translations: T,
    spans: Arc<SpanIds>,
}

impl Enricher<Translations> {
    /// An enricher with the default configuration and no translations.
    pub fn new() -> Self {
        Self::with_translations(Translations::default())
    }
}

impl Default for Enricher<Translations> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Translate> Enricher<T> {
    pub fn with_translations(translations: T) -> Self {
        Self {
            config: EnrichConfig::default(),
            translations,
            spans: Arc::new(SpanIds::new()),
        }
    }

    pub fn with_config(mut self, config: EnrichConfig) -> Self {
        self.config = config;
        self
    }

    /// Shares span numbering with other enrichers.
    pub fn with_span_ids(mut self, spans: Arc<SpanIds>) -> Self {
        self.spans = spans;
        self
    }

    pub fn config(&self) -> &EnrichConfig {
        &self.config
    }

    pub fn span_ids(&self) -> &Arc<SpanIds> {
        &self.spans
    }

    pub fn enrich(&self, text: &str, data: &RollData) -> Result<String> {
        self.enrich_nested(text, data, 0)
    }

    fn enrich_nested(&self, text: &str, data: &RollData, depth: usize) -> Result<String> {
        let config = &self.config;
        let mut text = text.to_string();
        if !config.rule_marker.is_empty() && text.contains(&config.rule_marker) {
            text = text.replace(&config.rule_marker, &config.details_open);
            text.push_str(&config.details_close);
        }
        let text = text.replace('\n', &config.line_break);

        let text = scan::replace(&text, scan::damage_blocks(&text), |o| self.block(o, data, depth))?;
        let text = scan::replace(&text, scan::blocks(&text), |o| self.block(o, data, depth))?;
        scan::replace(&text, scan::inline_rolls(&text), |o| self.inline(o, data))
    }

    fn block(&self, occurrence: &Occurrence, data: &RollData, depth: usize) -> Result<String> {
        if let Some(display) = occurrence.display {
            return Ok(display.to_string());
        }
        let payload = occurrence.payload;
        trace!(name = occurrence.name, payload, "resolving directive");

        let args = |context: &str| Args::new(payload, '|', ':', context);
        match Directive::block(occurrence.name) {
            Directive::Localize => self.localize(payload, data, depth),
            Directive::Uuid => Ok(directive::uuid(payload)),
            Directive::Template => args("@Template").with(|args| directive::template(args, data)),
            Directive::Check => {
                args("@Check").with(|args| directive::check(args, data, &self.spans))
            }
            Directive::Damage => {
                args("@Damage").with(|args| directive::damage(args, data, &self.spans))
            }
            _ => Err(EnrichError::UnknownDirective {
                directive: occurrence.text.to_string(),
            }),
        }
    }

    fn localize(&self, key: &str, data: &RollData, depth: usize) -> Result<String> {
        if let Some(limit) = self.config.max_localize_depth {
            if depth >= limit {
                return Err(EnrichError::LocalizeDepth {
                    key: key.to_string(),
                    limit,
                });
            }
        }
        let translated = self.translations.translate(key);
        self.enrich_nested(&translated, data, depth + 1)
    }

    fn inline(&self, occurrence: &Occurrence, data: &RollData) -> Result<String> {
        if let Some(display) = occurrence.display {
            return Ok(display.to_string());
        }
        trace!(name = occurrence.name, payload = occurrence.payload, "resolving directive");

        let (raw, label) = match occurrence.payload.split_once('#') {
            Some((raw, label)) => (raw, Some(label)),
            None => (occurrence.payload, None),
        };
        let args = Args::new(raw.trim(), ' ', '=', format!("[[/{}]]", occurrence.name));
        match Directive::inline(occurrence.name) {
            Directive::Roll => args.with(|args| Ok(directive::roll(args, label))),
            Directive::Act => args.with(|args| directive::act(args, data, &self.spans)),
            _ => Err(EnrichError::UnknownDirective {
                directive: occurrence.text.to_string(),
            }),
        }
    }
}
