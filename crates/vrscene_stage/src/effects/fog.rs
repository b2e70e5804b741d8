//! Linear scene fog (renderer читает resource, clear color совпадает с fog)

use bevy::prelude::*;

use vrscene_sync::HexColor;

use crate::config::FogConfig;

#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct SceneFog {
    pub color: HexColor,
    pub near: f32,
    pub far: f32,
}

impl From<FogConfig> for SceneFog {
    fn from(config: FogConfig) -> Self {
        Self {
            color: config.color,
            near: config.near,
            far: config.far,
        }
    }
}

impl SceneFog {
    /// 0 до near, 1 после far, линейно между
    pub fn factor(&self, distance: f32) -> f32 {
        if self.far <= self.near {
            return if distance >= self.far { 1.0 } else { 0.0 };
        }
        ((distance - self.near) / (self.far - self.near)).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_factor() {
        let fog = SceneFog::from(FogConfig::default());
        assert_eq!(fog.factor(0.5), 0.0);
        assert_eq!(fog.factor(1.0), 0.0);
        assert!((fog.factor(20.5) - 0.5).abs() < 1e-6);
        assert_eq!(fog.factor(100.0), 1.0);
    }

    #[test]
    fn test_degenerate_range() {
        let fog = SceneFog {
            color: HexColor::BLACK,
            near: 5.0,
            far: 5.0,
        };
        assert_eq!(fog.factor(4.0), 0.0);
        assert_eq!(fog.factor(5.0), 1.0);
    }
}
