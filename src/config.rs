use crate::error::ConfigError;
use crate::transform::Stage;

/// Largest accepted adaptive window or blur kernel
pub const MAX_WINDOW_SIZE: u32 = 255;

/// Largest accepted magnitude of the adaptive offset
pub const MAX_ADAPTIVE_OFFSET: i32 = 255;

fn parse_u32(value: Option<String>) -> Option<u32> {
    value.and_then(|v| v.trim().parse::<u32>().ok())
}

fn parse_i32(value: Option<String>) -> Option<i32> {
    value.and_then(|v| v.trim().parse::<i32>().ok())
}

/// Parse a comma separated stage list such as `identity,adaptive,otsu`.
///
/// Returns `None` if any entry is unknown or the list is empty.
pub fn parse_stage_list(value: &str) -> Option<Vec<Stage>> {
    let stages: Option<Vec<Stage>> = value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Stage::from_name)
        .collect();
    stages.filter(|s| !s.is_empty())
}

/// Tunables for the decode pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Window size of the adaptive threshold (odd, 3..=255)
    pub adaptive_block_size: u32,
    /// Constant subtracted from the local mean in the adaptive threshold
    pub adaptive_offset: i32,
    /// Gaussian kernel size before Otsu (odd, 1..=255)
    pub blur_kernel_size: u32,
    /// Stages to run, in order
    pub stages: Vec<Stage>,
    /// Downscale inputs whose longer side exceeds this many pixels
    pub max_dimension: Option<u32>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            adaptive_block_size: 11,
            adaptive_offset: 2,
            blur_kernel_size: 5,
            stages: Stage::ALL.to_vec(),
            max_dimension: None,
        }
    }
}

impl PipelineConfig {
    /// Defaults overlaid with `QR_ADAPTIVE_BLOCK`, `QR_ADAPTIVE_OFFSET`,
    /// `QR_BLUR_KERNEL`, `QR_MAX_DIM` (0 disables) and `QR_STAGES`.
    ///
    /// Values that fail to parse are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`PipelineConfig::from_env`] with variables read through `get`
    pub fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(v) = parse_u32(get("QR_ADAPTIVE_BLOCK")) {
            config.adaptive_block_size = v;
        }
        if let Some(v) = parse_i32(get("QR_ADAPTIVE_OFFSET")) {
            config.adaptive_offset = v;
        }
        if let Some(v) = parse_u32(get("QR_BLUR_KERNEL")) {
            config.blur_kernel_size = v;
        }
        match parse_u32(get("QR_MAX_DIM")) {
            Some(0) => config.max_dimension = None,
            Some(v) => config.max_dimension = Some(v),
            None => {}
        }
        if let Some(stages) = get("QR_STAGES").and_then(|v| parse_stage_list(&v)) {
            config.stages = stages;
        }
        config
    }

    /// Replace the stage order
    pub fn with_stages(mut self, stages: impl Into<Vec<Stage>>) -> Self {
        self.stages = stages.into();
        self
    }

    /// Set the downscale limit
    pub fn with_max_dimension(mut self, max_dimension: Option<u32>) -> Self {
        self.max_dimension = max_dimension;
        self
    }

    /// Check invariants the transforms rely on
    pub fn validate(&self) -> Result<(), ConfigError> {
        let block = self.adaptive_block_size;
        if !(3..=MAX_WINDOW_SIZE).contains(&block) || block % 2 == 0 {
            return Err(ConfigError::AdaptiveBlockSize(block));
        }
        if !(-MAX_ADAPTIVE_OFFSET..=MAX_ADAPTIVE_OFFSET).contains(&self.adaptive_offset) {
            return Err(ConfigError::AdaptiveOffset(self.adaptive_offset));
        }
        if self.blur_kernel_size > MAX_WINDOW_SIZE || self.blur_kernel_size % 2 == 0 {
            return Err(ConfigError::BlurKernelSize(self.blur_kernel_size));
        }
        if self.stages.is_empty() {
            return Err(ConfigError::NoStages);
        }
        for (i, stage) in self.stages.iter().enumerate() {
            if self.stages[..i].contains(stage) {
                return Err(ConfigError::DuplicateStage(stage.name()));
            }
        }
        if self.max_dimension == Some(0) {
            return Err(ConfigError::ZeroMaxDimension);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_from_lookup_overlays_defaults() {
        let config = PipelineConfig::from_lookup(lookup(&[
            ("QR_ADAPTIVE_BLOCK", " 21 "),
            ("QR_ADAPTIVE_OFFSET", "-3"),
            ("QR_BLUR_KERNEL", "7"),
            ("QR_MAX_DIM", "1024"),
            ("QR_STAGES", "otsu,identity"),
        ]));
        assert_eq!(config.adaptive_block_size, 21);
        assert_eq!(config.adaptive_offset, -3);
        assert_eq!(config.blur_kernel_size, 7);
        assert_eq!(config.max_dimension, Some(1024));
        assert_eq!(config.stages, vec![Stage::BlurOtsu, Stage::Identity]);
    }

    #[test]
    fn test_from_lookup_ignores_bad_values() {
        let config = PipelineConfig::from_lookup(lookup(&[
            ("QR_ADAPTIVE_BLOCK", "eleven"),
            ("QR_MAX_DIM", "0"),
            ("QR_STAGES", "identity,sharpen"),
        ]));
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.max_dimension, None);

        assert_eq!(
            PipelineConfig::from_lookup(|_| None),
            PipelineConfig::default()
        );
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = PipelineConfig::default();
        assert_eq!(config.adaptive_block_size, 11);
        assert_eq!(config.adaptive_offset, 2);
        assert_eq!(config.blur_kernel_size, 5);
        assert_eq!(
            config.stages,
            vec![Stage::Identity, Stage::AdaptiveThreshold, Stage::BlurOtsu]
        );
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = PipelineConfig::default();
        config.adaptive_block_size = 10;
        assert_eq!(config.validate(), Err(ConfigError::AdaptiveBlockSize(10)));

        let mut config = PipelineConfig::default();
        config.blur_kernel_size = 4;
        assert_eq!(config.validate(), Err(ConfigError::BlurKernelSize(4)));

        let config = PipelineConfig::default().with_stages(vec![]);
        assert_eq!(config.validate(), Err(ConfigError::NoStages));

        let config =
            PipelineConfig::default().with_stages(vec![Stage::BlurOtsu, Stage::BlurOtsu]);
        assert_eq!(
            config.validate(),
            Err(ConfigError::DuplicateStage("blur-otsu"))
        );

        let config = PipelineConfig::default().with_max_dimension(Some(0));
        assert_eq!(config.validate(), Err(ConfigError::ZeroMaxDimension));
    }

    #[test]
    fn test_validate_bounds_windows_and_offset() {
        let mut config = PipelineConfig::default();
        config.adaptive_offset = i32::MIN;
        assert_eq!(
            config.validate(),
            Err(ConfigError::AdaptiveOffset(i32::MIN))
        );
        config.adaptive_offset = 256;
        assert_eq!(config.validate(), Err(ConfigError::AdaptiveOffset(256)));
        config.adaptive_offset = -255;
        assert_eq!(config.validate(), Ok(()));

        let mut config = PipelineConfig::default();
        config.blur_kernel_size = u32::MAX;
        assert_eq!(
            config.validate(),
            Err(ConfigError::BlurKernelSize(u32::MAX))
        );
        config.blur_kernel_size = 255;
        assert_eq!(config.validate(), Ok(()));

        let mut config = PipelineConfig::default();
        config.adaptive_block_size = 257;
        assert_eq!(config.validate(), Err(ConfigError::AdaptiveBlockSize(257)));
    }

    #[test]
    fn test_parse_stage_list() {
        assert_eq!(
            parse_stage_list("otsu, identity"),
            Some(vec![Stage::BlurOtsu, Stage::Identity])
        );
        assert_eq!(
            parse_stage_list("identity,adaptive-threshold"),
            Some(vec![Stage::Identity, Stage::AdaptiveThreshold])
        );
        assert_eq!(parse_stage_list("identity,sharpen"), None);
        assert_eq!(parse_stage_list(" , "), None);
    }
}
