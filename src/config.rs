use crate::error::MergeError;
use crate::geometry::PrecisionModel;
use crate::graph::EdgeAttrs;
use log::warn;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_3;

/// Which attributes two edges must share before the reducer may fuse them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeRule {
    /// Same group id only. Fused edges take the first edge's min zoom and
    /// active flag.
    Group,
    /// Same group id, min zoom and active flag.
    #[default]
    GroupZoomActive,
}

impl MergeRule {
    pub fn compatible(&self, a: &EdgeAttrs, b: &EdgeAttrs) -> bool {
        match self {
            MergeRule::Group => a.group == b.group,
            MergeRule::GroupZoomActive => {
                a.group == b.group && a.min_zoom == b.min_zoom && a.active == b.active
            }
        }
    }
}

/// Which candidate survives when several short loops share an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopTieBreak {
    /// Keep the highest traffic weight; the first candidate wins ties.
    #[default]
    HighestWeight,
    /// Keep the lowest group id, then the longest loop distance. The lower
    /// group always wins, even over a shorter path.
    LowestGroupLongestPath,
}

/// Drop output detail outside `[-buffer, extent + buffer]` on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileClip {
    pub extent: f64,
    pub buffer: f64,
}

impl Default for TileClip {
    fn default() -> Self {
        Self {
            extent: 256.0,
            buffer: 4.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MergerConfig {
    pub precision: PrecisionModel,
    /// Final short edge removal. `<= 0` disables.
    pub min_length: f64,
    /// Loops shorter than this keep only one path. `<= 0` disables.
    pub loop_min_length: f64,
    /// Dead-end "hair" shorter than this is pruned. `<= 0` disables.
    pub stub_min_length: f64,
    /// Edges with less traffic weight are pruned. `<= 0` disables.
    pub min_visits: f64,
    /// Threshold for the first traffic pass, which only looks at loops.
    pub loop_min_visits: f64,
    /// Simplification tolerance. `< 0` disables, `0` still drops collinear points.
    pub tolerance: f64,
    pub merge_strokes: bool,
    pub break_faces: bool,
    pub merge_rule: MergeRule,
    pub loop_tie_break: LoopTieBreak,
    /// Reducer refuses to fuse edges meeting at a sharper angle (radians).
    pub min_merge_angle: f64,
    /// Edges with `min_zoom <= default_active_min_zoom` start active.
    pub default_active_min_zoom: i32,
    /// Turns at or below this angle count as dead ends for reconnection.
    pub skeleton_min_angle: f64,
    pub clip: Option<TileClip>,
}

impl Default for MergerConfig {
    fn default() -> Self {
        Self {
            precision: PrecisionModel::default(),
            min_length: 0.0,
            loop_min_length: 0.0,
            stub_min_length: 0.0,
            min_visits: 0.0,
            loop_min_visits: 1e6,
            tolerance: -1.0,
            merge_strokes: false,
            break_faces: false,
            merge_rule: MergeRule::default(),
            loop_tie_break: LoopTieBreak::default(),
            min_merge_angle: 0.0,
            default_active_min_zoom: 0,
            skeleton_min_angle: FRAC_PI_3,
            clip: None,
        }
    }
}

impl MergerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, MergeError> {
        let config: MergerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MergeError> {
        let numbers = [
            ("min_length", self.min_length),
            ("loop_min_length", self.loop_min_length),
            ("stub_min_length", self.stub_min_length),
            ("min_visits", self.min_visits),
            ("loop_min_visits", self.loop_min_visits),
            ("tolerance", self.tolerance),
            ("min_merge_angle", self.min_merge_angle),
            ("skeleton_min_angle", self.skeleton_min_angle),
        ];
        for (field, value) in numbers {
            if !value.is_finite() {
                return Err(MergeError::InvalidConfig {
                    field,
                    reason: format!("expected a finite number, got {}", value),
                });
            }
        }

        if let PrecisionModel::Fixed { scale } = self.precision {
            if !(scale.is_finite() && scale > 0.0) {
                return Err(MergeError::InvalidConfig {
                    field: "precision",
                    reason: format!("fixed precision scale must be positive, got {}", scale),
                });
            }
        }

        if let Some(clip) = &self.clip {
            if !(clip.extent.is_finite() && clip.extent > 0.0 && clip.buffer.is_finite()) {
                return Err(MergeError::InvalidConfig {
                    field: "clip",
                    reason: format!("bad tile clip {:?}", clip),
                });
            }
        }

        if self.loop_min_length > 0.0 && self.loop_min_length < self.min_length {
            warn!(
                "loop_min_length {} is below min_length {}, loops shorter than min_length are dropped anyway",
                self.loop_min_length, self.min_length
            );
        }

        Ok(())
    }

    /// Builder-style helpers, handy in tests and callers that only tweak a few knobs.
    pub fn with_precision(mut self, precision: PrecisionModel) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_min_length(mut self, min_length: f64) -> Self {
        self.min_length = min_length;
        self
    }

    pub fn with_loop_min_length(mut self, loop_min_length: f64) -> Self {
        self.loop_min_length = loop_min_length;
        self
    }

    pub fn with_stub_min_length(mut self, stub_min_length: f64) -> Self {
        self.stub_min_length = stub_min_length;
        self
    }

    pub fn with_min_visits(mut self, min_visits: f64) -> Self {
        self.min_visits = min_visits;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_merge_strokes(mut self, merge_strokes: bool) -> Self {
        self.merge_strokes = merge_strokes;
        self
    }

    pub fn with_break_faces(mut self, break_faces: bool) -> Self {
        self.break_faces = break_faces;
        self
    }

    pub fn with_merge_rule(mut self, merge_rule: MergeRule) -> Self {
        self.merge_rule = merge_rule;
        self
    }

    pub fn with_loop_tie_break(mut self, loop_tie_break: LoopTieBreak) -> Self {
        self.loop_tie_break = loop_tie_break;
        self
    }

    pub fn with_default_active_min_zoom(mut self, zoom: i32) -> Self {
        self.default_active_min_zoom = zoom;
        self
    }

    pub fn with_clip(mut self, clip: TileClip) -> Self {
        self.clip = Some(clip);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_disable_every_pass() {
        let config = MergerConfig::default();
        assert_eq!(config.min_length, 0.0);
        assert_eq!(config.loop_min_length, 0.0);
        assert_eq!(config.stub_min_length, 0.0);
        assert_eq!(config.min_visits, 0.0);
        assert!(config.tolerance < 0.0);
        assert!(!config.merge_strokes);
        assert_eq!(config.merge_rule, MergeRule::GroupZoomActive);
        assert_eq!(config.precision, PrecisionModel::Fixed { scale: 16.0 });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let config = MergerConfig::from_json_str(
            r#"{
                "precision": { "type": "floating" },
                "loop_min_length": 10.0,
                "tolerance": 0.0,
                "merge_rule": "group",
                "loop_tie_break": "lowest_group_longest_path",
                "clip": { "extent": 256.0, "buffer": 8.0 }
            }"#,
        )
        .expect("config should parse");
        assert_eq!(config.precision, PrecisionModel::Floating);
        assert_eq!(config.loop_min_length, 10.0);
        assert_eq!(config.tolerance, 0.0);
        assert_eq!(config.merge_rule, MergeRule::Group);
        assert_eq!(config.loop_tie_break, LoopTieBreak::LowestGroupLongestPath);
        assert_eq!(config.clip.map(|c| c.buffer), Some(8.0));
        // untouched fields keep their defaults
        assert_eq!(config.loop_min_visits, 1e6);
    }

    #[test]
    fn test_rejects_bad_precision() {
        let err = MergerConfig::from_json_str(r#"{ "precision": { "type": "fixed", "scale": 0.0 } }"#)
            .expect_err("zero scale is invalid");
        assert!(matches!(err, MergeError::InvalidConfig { field: "precision", .. }));

        let err = MergerConfig::from_json_str("{ not json").expect_err("garbage");
        assert!(matches!(err, MergeError::Json(_)));
    }
}
