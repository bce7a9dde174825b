use anyhow::{Result, anyhow};
use std::fmt;
use std::str::FromStr;

/// Palette names shared by stages and channels. The interface maps them to
/// terminal colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTag {
    Cyan,
    Purple,
    Pink,
    Emerald,
    Slate,
    Blue,
    Indigo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageInfo {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub color: ColorTag,
    pub progress: u16,
    pub metric: &'static str,
    pub metric_value: &'static str,
}

/// One step of the fixed content pipeline. Holding a `PipelineStage` is the
/// only way to mark a stage active, so exactly one is active at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PipelineStage {
    Ideation,
    #[default]
    Creation,
    Distribution,
    Optimization,
}

impl PipelineStage {
    pub const ALL: [PipelineStage; 4] = [
        PipelineStage::Ideation,
        PipelineStage::Creation,
        PipelineStage::Distribution,
        PipelineStage::Optimization,
    ];

    pub fn info(self) -> &'static StageInfo {
        match self {
            PipelineStage::Ideation => &IDEATION,
            PipelineStage::Creation => &CREATION,
            PipelineStage::Distribution => &DISTRIBUTION,
            PipelineStage::Optimization => &OPTIMIZATION,
        }
    }

    pub fn id(self) -> &'static str {
        self.info().id
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Next stage to the right, wrapping around.
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for PipelineStage {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|stage| stage.id() == needle || stage.info().title.to_lowercase() == needle)
            .ok_or_else(|| anyhow!("Unknown pipeline stage '{}'", s))
    }
}

static IDEATION: StageInfo = StageInfo {
    id: "idea",
    title: "Ideation",
    description: "AI-topic mapping",
    color: ColorTag::Cyan,
    progress: 100,
    metric: "Topics",
    metric_value: "142",
};

static CREATION: StageInfo = StageInfo {
    id: "create",
    title: "Creation",
    description: "Content generation",
    color: ColorTag::Purple,
    progress: 85,
    metric: "Drafts",
    metric_value: "12",
};

static DISTRIBUTION: StageInfo = StageInfo {
    id: "dist",
    title: "Distribution",
    description: "Multi-channel",
    color: ColorTag::Pink,
    progress: 40,
    metric: "Reach",
    metric_value: "85k",
};

static OPTIMIZATION: StageInfo = StageInfo {
    id: "opt",
    title: "Optimization",
    description: "ROI tracking",
    color: ColorTag::Emerald,
    progress: 15,
    metric: "Conv.",
    metric_value: "3.2%",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_stage_is_creation() {
        assert_eq!(PipelineStage::default(), PipelineStage::Creation);
        assert_eq!(PipelineStage::default().id(), "create");
    }

    #[test]
    fn stages_parse_by_id_and_title() {
        assert_eq!(
            "dist".parse::<PipelineStage>().unwrap(),
            PipelineStage::Distribution
        );
        assert_eq!(
            "Optimization".parse::<PipelineStage>().unwrap(),
            PipelineStage::Optimization
        );
        assert!("publish".parse::<PipelineStage>().is_err());
    }

    #[test]
    fn progress_values_stay_in_percent_range() {
        for stage in PipelineStage::ALL {
            assert!(stage.info().progress <= 100, "{:?}", stage);
        }
    }

    #[test]
    fn next_and_previous_wrap() {
        assert_eq!(PipelineStage::Optimization.next(), PipelineStage::Ideation);
        assert_eq!(PipelineStage::Ideation.previous(), PipelineStage::Optimization);
        assert_eq!(PipelineStage::Creation.next(), PipelineStage::Distribution);
    }

    #[test]
    fn index_round_trips_for_every_stage() {
        for (i, stage) in PipelineStage::ALL.iter().enumerate() {
            assert_eq!(stage.index(), i);
            assert_eq!(PipelineStage::from_index(i), Some(*stage));
        }
        assert_eq!(PipelineStage::from_index(4), None);
    }
}
