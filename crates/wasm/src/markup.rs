use infiniscroll_core::{ConfigError, EngineConfig};
use serde::{Deserialize, Serialize};

/// CSS hooks the binding uses to find carousels in a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Markup {
    /// Selector for carousel containers.
    pub container: String,
    /// Selector for the scrolling track inside a container.
    pub track: String,
    /// Selector for items inside the track.
    pub item: String,
    /// Class (no leading dot) the binding puts on every inserted copy.
    pub duplicate_class: String,
}

impl Default for Markup {
    fn default() -> Self {
        Preset::Column.markup()
    }
}

impl Markup {
    pub fn duplicate_selector(&self) -> String {
        format!(".{}", self.duplicate_class)
    }

    /// Items that are not copies inserted by an earlier build.
    pub fn original_selector(&self) -> String {
        format!("{}:not(.{})", self.item, self.duplicate_class)
    }
}

/// The two carousel variants shipped in the theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Column,
    Cards,
}

impl Preset {
    pub const ALL: [Preset; 2] = [Preset::Column, Preset::Cards];

    pub fn markup(self) -> Markup {
        let container = match self {
            Self::Column => ".column-carousel__carousel",
            Self::Cards => ".cards-carousel__carousel",
        };
        Markup {
            container: container.into(),
            track: ".swiper-wrapper".into(),
            item: ".swiper-slide".into(),
            duplicate_class: "swiper-slide-clone".into(),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "column" => Some(Self::Column),
            "cards" => Some(Self::Cards),
            _ => None,
        }
    }
}

/// Everything a page can configure for one bind pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarouselConfig {
    pub markup: Markup,
    pub engine: EngineConfig,
}

impl CarouselConfig {
    pub fn for_preset(preset: Preset) -> Self {
        Self {
            markup: preset.markup(),
            engine: EngineConfig::default(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.engine.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_differ_only_in_container() {
        let column = Preset::Column.markup();
        let cards = Preset::Cards.markup();
        assert_ne!(column.container, cards.container);
        assert_eq!(column.track, cards.track);
        assert_eq!(column.item, cards.item);
        assert_eq!(column.duplicate_class, cards.duplicate_class);
    }

    #[test]
    fn selectors() {
        let markup = Preset::Cards.markup();
        assert_eq!(markup.duplicate_selector(), ".swiper-slide-clone");
        assert_eq!(
            markup.original_selector(),
            ".swiper-slide:not(.swiper-slide-clone)"
        );
    }

    #[test]
    fn config_json_overrides_nested_fields() {
        let config = CarouselConfig::from_json(
            r#"{"markup": {"container": ".promo"}, "engine": {"breakpoint": 900}}"#,
        )
        .unwrap();
        assert_eq!(config.markup.container, ".promo");
        assert_eq!(config.markup.track, ".swiper-wrapper");
        assert_eq!(config.engine.breakpoint, 900.0);
        assert_eq!(config.engine.drag_gain, 1.2);
    }

    #[test]
    fn config_json_is_validated() {
        assert!(CarouselConfig::from_json(r#"{"engine": {"drag_gain": 0}}"#).is_err());
        assert_eq!(Preset::from_name("cards"), Some(Preset::Cards));
        assert_eq!(Preset::from_name("grid"), None);
    }
}
