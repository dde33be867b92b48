//! Playback scenarios: one synthetic recording per data modality.

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// Moving bar on an event sensor, with noise events
    Events,

    /// Gradient image frames served by nearest timestamp
    Frames,

    /// Gradient image frames with validity intervals and gaps between them
    GatedFrames,

    /// A single spinning pose
    Poses,

    /// Several bodies orbiting a common centre
    MultiBody,

    /// Orbiting points without orientation
    Points,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::Events,
            ScenarioId::Frames,
            ScenarioId::GatedFrames,
            ScenarioId::Poses,
            ScenarioId::MultiBody,
            ScenarioId::Points,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::Events => "events",
            ScenarioId::Frames => "frames",
            ScenarioId::GatedFrames => "gated_frames",
            ScenarioId::Poses => "poses",
            ScenarioId::MultiBody => "multi_body",
            ScenarioId::Points => "points",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::Events => "Bar sweeping across a 64x48 sensor, accumulated per window",
            ScenarioId::Frames => "Scrolling gradient frames, nearest frame per query",
            ScenarioId::GatedFrames => "Scrolling gradient frames valid only until their end time",
            ScenarioId::Poses => "One body spinning on a circle, axes drawn per channel",
            ScenarioId::MultiBody => "Several bodies on concentric orbits sharing one canvas",
            ScenarioId::Points => "Noisy orbiting points drawn as markers",
        }
    }

    /// Returns true if the scenario renders into the fixed 3D canvas.
    pub fn is_spatial(&self) -> bool {
        matches!(self, ScenarioId::Poses | ScenarioId::MultiBody | ScenarioId::Points)
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "events" | "dvs" => Ok(ScenarioId::Events),
            "frames" | "frame" => Ok(ScenarioId::Frames),
            "gated_frames" | "gatedframes" | "gated" => Ok(ScenarioId::GatedFrames),
            "poses" | "pose" | "pose6q" => Ok(ScenarioId::Poses),
            "multi_body" | "multibody" | "bodies" => Ok(ScenarioId::MultiBody),
            "points" | "point3" => Ok(ScenarioId::Points),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for scenario in ScenarioId::all() {
            assert_eq!(scenario.name().parse::<ScenarioId>(), Ok(scenario));
        }
    }

    #[test]
    fn test_aliases() {
        assert_eq!("DVS".parse::<ScenarioId>(), Ok(ScenarioId::Events));
        assert_eq!("multibody".parse::<ScenarioId>(), Ok(ScenarioId::MultiBody));
        assert!("all".parse::<ScenarioId>().is_err());
    }
}
