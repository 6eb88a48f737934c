use std::sync::atomic::{AtomicU64, Ordering};

/// Numbering for rendered statistic spans. Ids are unique per instance, including across threads
/// sharing it.
#[derive(Debug)]
pub struct SpanIds {
    next: AtomicU64,
}

impl SpanIds {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    pub fn next_id(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// `<span class="statistic-{class}" id="statistic-{class}-{id}">{text}</span>`
    pub fn statistic_span(&self, text: &str, class: &str) -> String {
        let id = self.next_id();
        format!(
            r#"<span class="statistic-{class}" id="statistic-{class}-{id}">{text}</span>"#,
            class = class,
            id = id,
            text = text
        )
    }
}

impl Default for SpanIds {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_statistic_span() {
        let ids = SpanIds::new();
        assert_eq!(
            ids.statistic_span("20", "dc"),
            r#"<span class="statistic-dc" id="statistic-dc-1">20</span>"#
        );
        assert_eq!(
            ids.statistic_span("2d6", "damage-dice"),
            r#"<span class="statistic-damage-dice" id="statistic-damage-dice-2">2d6</span>"#
        );
    }

    #[test]
    fn test_unique_across_threads() {
        let ids = SpanIds::new();
        let all: Vec<u64> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| (0..250).map(|_| ids.next_id()).collect::<Vec<_>>()))
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect()
        });
        assert_eq!(all.len(), 1000);
        assert_eq!(all.iter().collect::<HashSet<_>>().len(), 1000);
    }
}
