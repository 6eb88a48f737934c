use super::span::SpanIds;
use crate::args::Args;
use crate::common::title_case;
use crate::context::RollData;
use crate::damage::{evaluate_damage, DamageInstance, DamageRoll};
use crate::error::EnrichError;

type Result<T> = std::result::Result<T, EnrichError>;

/// Every directive the enricher knows how to render.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Directive {
    Localize,
    Uuid,
    Template,
    Check,
    Damage,
    /// `r`, `pr`, `gmr`, `br` and `sr`; they differ only in who sees the result.
    Roll,
    Act,
    Unsupported,
}

impl Directive {
    /// Block names are case-sensitive.
    pub fn block(name: &str) -> Self {
        match name {
            "Localize" => Self::Localize,
            "UUID" => Self::Uuid,
            "Template" => Self::Template,
            "Check" => Self::Check,
            "Damage" => Self::Damage,
            _ => Self::Unsupported,
        }
    }

    pub fn inline(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "r" | "pr" | "gmr" | "br" | "sr" => Self::Roll,
            "act" => Self::Act,
            _ => Self::Unsupported,
        }
    }
}

/// The last segment of a document path.
pub fn uuid(payload: &str) -> String {
    payload.rsplit('.').next().unwrap_or(payload).to_string()
}

fn type_or_first<'r>(args: &mut Args<'r>) -> Result<&'r str> {
    match args.consume_str("type", None).filter(|t| !t.is_empty()) {
        Some(value) => Ok(value),
        None => args.consume_index(0),
    }
}

pub fn template(args: &mut Args, data: &RollData) -> Result<String> {
    args.ignore(&["damaging", "options", "traits"]);
    let shape = type_or_first(args)?;
    let distance = args
        .consume_resolved("distance", data)
        .ok_or_else(|| EnrichError::MissingKey {
            key: "distance".to_string(),
        })?;
    if shape == "line" {
        if let Some(width) = args.consume_resolved("width", data) {
            return Ok(format!("{}-foot ({}-foot wide) {}", distance, width, shape));
        }
    }
    Ok(format!("{}-foot {}", distance, shape))
}

pub fn check(args: &mut Args, data: &RollData, spans: &SpanIds) -> Result<String> {
    args.ignore(&[
        "against",
        "defense",
        "immutable",
        "name",
        "overrideTraits",
        "rollerRole",
        "showDC",
        "options",
        "traits",
    ]);
    let check_type = type_or_first(args)?;
    let basic = args.consume_bool("basic", false);
    let dc = args.consume_resolved("dc", data);
    let title = title_case(check_type);

    Ok(match (basic, dc) {
        (true, Some(dc)) => format!("DC {} basic {}", dc, title),
        (true, None) => format!("basic {}", title),
        (false, None) => title,
        // Flat checks are not a statistic of the creature
        (false, Some(dc)) if check_type == "flat" => format!("DC {} Flat Check", dc),
        (false, Some(dc)) => format!("DC {} {}", spans.statistic_span(&dc, "dc"), title),
    })
}

fn render_damage(instance: &DamageInstance, spans: &SpanIds) -> String {
    let groups: Vec<String> = instance
        .groups()
        .iter()
        .map(|group| {
            let mut ret = spans.statistic_span(&group.magnitude(), "damage-dice");
            if !instance.short_label() {
                for tag in group.tags() {
                    ret.push(' ');
                    ret.push_str(tag);
                }
            }
            ret
        })
        .collect();
    groups.join(" plus ")
}

pub fn damage(args: &mut Args, data: &RollData, spans: &SpanIds) -> Result<String> {
    args.ignore(&["immutable", "name", "options", "traits"]);
    let formula = args.consume_index(0)?;
    let short_label = args.consume_bool("shortLabel", false);

    let inner = match evaluate_damage(formula, data)? {
        DamageRoll::Evaluated(mut instance) => {
            instance.set_short_label(short_label);
            render_damage(&instance, spans)
        }
        DamageRoll::Literal { payload, .. } => payload,
    };
    Ok(spans.statistic_span(&inner, "damage"))
}

/// The positional arguments of an inline roll, followed by its `#label`.
pub fn roll(args: &mut Args, label: Option<&str>) -> String {
    let amount = args.consume_positional().join(" ");
    match label.filter(|l| !l.is_empty()) {
        Some(label) => format!("{} {}", amount, label),
        None => amount,
    }
}

pub fn act(args: &mut Args, data: &RollData, spans: &SpanIds) -> Result<String> {
    args.ignore(&["options"]);
    let action = title_case(&args.consume_index(0)?.replace('-', " "));
    let dc = args.consume_resolved("dc", data);
    let statistic = args
        .consume_str("statistic", None)
        .filter(|s| !s.is_empty())
        .or_else(|| args.consume_str("skill", None));

    Ok(match (dc, statistic) {
        (None, None) => action,
        (None, Some(statistic)) => format!("{} ({})", action, statistic),
        (Some(dc), None) => format!("{} (DC {})", action, spans.statistic_span(&dc, "dc")),
        (Some(dc), Some(statistic)) => format!(
            "{} (DC {} {})",
            action,
            spans.statistic_span(&dc, "dc"),
            statistic
        ),
    })
}
