use crate::config::{ConfigError, OfficeConfig};

impl OfficeConfig {
    /// Validate the configuration and return every problem found.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let map = &self.map;
        let vp = &self.viewport;

        if map.floor_width <= 0.0 || map.floor_height <= 0.0 {
            errors.push(ConfigError::InvalidFloor(format!(
                "floor must be positive, got {}x{}",
                map.floor_width, map.floor_height
            )));
        }
        if map.margin_x < 0.0
            || map.margin_y < 0.0
            || map.margin_x * 2.0 >= map.floor_width
            || map.margin_y * 2.0 >= map.floor_height
        {
            errors.push(ConfigError::InvalidFloor(format!(
                "margins {}x{} leave no walkable area",
                map.margin_x, map.margin_y
            )));
        }

        if vp.screen_width <= 0.0 || vp.screen_height <= 0.0 {
            errors.push(ConfigError::InvalidScreen {
                width: vp.screen_width,
                height: vp.screen_height,
            });
        }

        if vp.min_zoom <= 0.0 || vp.min_zoom > vp.max_zoom {
            errors.push(ConfigError::InvalidZoomRange {
                min: vp.min_zoom,
                max: vp.max_zoom,
            });
        } else {
            let zooms = [
                ("viewport.default_zoom", vp.default_zoom),
                ("viewport.focus_zoom", vp.focus_zoom),
                ("meeting.elevated_zoom", self.meeting.elevated_zoom),
            ];
            for (field, value) in zooms {
                if value < vp.min_zoom || value > vp.max_zoom {
                    errors.push(ConfigError::ZoomOutOfRange {
                        field,
                        value,
                        min: vp.min_zoom,
                        max: vp.max_zoom,
                    });
                }
            }
        }

        let motion = &self.motion;
        if !(motion.lerp_rate > 0.0 && motion.lerp_rate <= 1.0) {
            errors.push(ConfigError::InvalidMotion(format!(
                "lerp_rate must be in (0, 1], got {}",
                motion.lerp_rate
            )));
        }
        if motion.arrive_threshold <= 0.0 {
            errors.push(ConfigError::InvalidMotion(
                "arrive_threshold must be positive".to_string(),
            ));
        }
        if motion.notify_distance < 0.0 {
            errors.push(ConfigError::InvalidMotion(
                "notify_distance must not be negative".to_string(),
            ));
        }
        if motion.wander_min_ms > motion.wander_max_ms {
            errors.push(ConfigError::InvalidMotion(format!(
                "wander interval [{}, {}] is empty",
                motion.wander_min_ms, motion.wander_max_ms
            )));
        }

        if self.meeting.trigger_category.trim().is_empty() {
            errors.push(ConfigError::InvalidMeeting(
                "trigger_category must not be empty".to_string(),
            ));
        }
        if self.meeting.rally_radius < 0.0 {
            errors.push(ConfigError::InvalidMeeting(
                "rally_radius must not be negative".to_string(),
            ));
        }
        let rally = self.rally_point();
        if rally.x < 0.0 || rally.x > map.floor_width || rally.y < 0.0 || rally.y > map.floor_height {
            errors.push(ConfigError::InvalidMeeting(format!(
                "rally point ({}, {}) is off the floor",
                rally.x, rally.y
            )));
        }

        errors
    }

    /// Validate and return Ok(()) if valid, or Err with the first error.
    pub fn validate_or_err(&self) -> Result<(), ConfigError> {
        match self.validate().into_iter().next() {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::Point;

    #[test]
    fn test_default_config_is_valid() {
        assert!(OfficeConfig::default().validate().is_empty());
    }

    #[test]
    fn test_inverted_zoom_range_rejected() {
        let mut config = OfficeConfig::default();
        config.viewport.min_zoom = 3.0;
        let errors = config.validate();
        assert!(matches!(errors[0], ConfigError::InvalidZoomRange { .. }));
    }

    #[test]
    fn test_default_zoom_outside_range_rejected() {
        let mut config = OfficeConfig::default();
        config.viewport.default_zoom = 5.0;
        assert!(matches!(
            config.validate_or_err(),
            Err(ConfigError::ZoomOutOfRange { field: "viewport.default_zoom", .. })
        ));
    }

    #[test]
    fn test_multiple_problems_reported_together() {
        let mut config = OfficeConfig::default();
        config.motion.lerp_rate = 0.0;
        config.motion.wander_min_ms = 9000;
        config.meeting.trigger_category = "  ".to_string();
        config.meeting.rally_point = Some(Point::new(-10.0, 0.0));
        assert_eq!(config.validate().len(), 4);
    }

    #[test]
    fn test_margins_consuming_floor_rejected() {
        let mut config = OfficeConfig::default();
        config.map.margin_x = 1500.0;
        assert!(matches!(config.validate_or_err(), Err(ConfigError::InvalidFloor(_))));
    }
}
