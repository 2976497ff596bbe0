use serde::Deserialize;

/// Tunable parameters of the tracker, with the defaults from the original
/// SORT benchmark CLI.
///
/// `Deserialize` is format-agnostic and derived here so a config-file layer
/// can be wired in later without touching this type; no CLI flag currently
/// loads one (spec.md §6's literal flag list has no `--config`), so the
/// only consumer of this impl today is the round-trip test below.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Frames a track may go unmatched before it is removed.
    pub max_age: u32,
    /// Consecutive matched frames required before steady-state emission.
    pub min_hits: u32,
    /// Floor on IoU for an association to count as a match.
    pub iou_threshold: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_age: 1,
            min_hits: 3,
            iou_threshold: 0.3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_benchmark_cli() {
        let config = TrackerConfig::default();
        assert_eq!(config.max_age, 1);
        assert_eq!(config.min_hits, 3);
        assert_eq!(config.iou_threshold, 0.3);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: TrackerConfig = toml::from_str("max_age = 5").unwrap();
        assert_eq!(config.max_age, 5);
        assert_eq!(config.min_hits, 3);
        assert_eq!(config.iou_threshold, 0.3);
    }
}
