//! Visual themes and day-night sky palettes
//!
//! A theme decides the palette and which obstacle kinds a run spawns.
//! Themes are looked up through `ThemeId`, never by free-form strings.

use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Linear RGBA color
pub type Color = [f32; 4];

/// Opaque color from a `0xRRGGBB` literal
pub const fn hex(rgb: u32) -> Color {
    hexa(rgb, 1.0)
}

/// Color from a `0xRRGGBB` literal with explicit alpha
pub const fn hexa(rgb: u32, alpha: f32) -> Color {
    [
        ((rgb >> 16) & 0xff) as f32 / 255.0,
        ((rgb >> 8) & 0xff) as f32 / 255.0,
        (rgb & 0xff) as f32 / 255.0,
        alpha,
    ]
}

/// Theme identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeId {
    #[default]
    Farm,
    Space,
    Factory,
    Candy,
}

impl ThemeId {
    pub const ALL: [ThemeId; 4] = [ThemeId::Farm, ThemeId::Space, ThemeId::Factory, ThemeId::Candy];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeId::Farm => "farm",
            ThemeId::Space => "space",
            ThemeId::Factory => "factory",
            ThemeId::Candy => "candy",
        }
    }

    /// Unknown ids fall back to the default theme
    pub fn from_str_or_default(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }

    pub fn definition(&self) -> &'static ThemeDefinition {
        match self {
            ThemeId::Farm => &FARM,
            ThemeId::Space => &SPACE,
            ThemeId::Factory => &FACTORY,
            ThemeId::Candy => &CANDY,
        }
    }
}

/// Ground obstacle kinds across all themes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    Fence,
    Hay,
    Asteroid,
    Satellite,
    Barrel,
    Cone,
    Lollipop,
    Cupcake,
}

impl ObstacleKind {
    /// Unscaled (width, height) ranges in px
    pub fn size_range(&self) -> ((f32, f32), (f32, f32)) {
        match self {
            ObstacleKind::Fence
            | ObstacleKind::Cone
            | ObstacleKind::Satellite
            | ObstacleKind::Lollipop => ((18.0, 28.0), (30.0, 44.0)),
            ObstacleKind::Hay
            | ObstacleKind::Asteroid
            | ObstacleKind::Barrel
            | ObstacleKind::Cupcake => ((26.0, 40.0), (38.0, 66.0)),
        }
    }
}

/// Colors used to draw a theme
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub sky_top: Color,
    pub sky_bottom: Color,
    pub ground: Color,
    pub ground_line: Color,
    pub grass: Color,
    pub accent: Color,
    pub pig: Color,
    pub pig_shade: Color,
    pub pig_stroke: Color,
    pub obstacle: Color,
    pub obstacle_shade: Color,
    pub text: Color,
    pub muted: Color,
}

/// A selectable theme
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeDefinition {
    pub id: ThemeId,
    pub name: &'static str,
    pub obstacle_kinds: &'static [ObstacleKind],
    pub palette: Palette,
    /// Cosmetic: stars and craters instead of grass
    pub starry: bool,
}

pub const FARM: ThemeDefinition = ThemeDefinition {
    id: ThemeId::Farm,
    name: "Farm",
    obstacle_kinds: &[ObstacleKind::Fence, ObstacleKind::Hay],
    palette: Palette {
        sky_top: hex(0x0f1020),
        sky_bottom: hex(0x090a12),
        ground: hex(0x141621),
        ground_line: hexa(0xffffff, 0.14),
        grass: hexa(0x7ee787, 0.7),
        accent: hex(0xff5aa5),
        pig: hex(0xff9ac9),
        pig_shade: hex(0xff6fb3),
        pig_stroke: hexa(0x000000, 0.35),
        obstacle: hex(0xc9cbd6),
        obstacle_shade: hex(0x9aa0b6),
        text: hexa(0xffffff, 0.92),
        muted: hexa(0xffffff, 0.55),
    },
    starry: false,
};

pub const SPACE: ThemeDefinition = ThemeDefinition {
    id: ThemeId::Space,
    name: "Space",
    obstacle_kinds: &[ObstacleKind::Asteroid, ObstacleKind::Satellite],
    palette: Palette {
        sky_top: hex(0x060615),
        sky_bottom: hex(0x02020a),
        ground: hex(0x0b0c11),
        ground_line: hexa(0xffffff, 0.10),
        grass: hexa(0x7dd3fc, 0.35),
        accent: hex(0x60a5fa),
        pig: hex(0xffd1e8),
        pig_shade: hex(0xff8cc8),
        pig_stroke: hexa(0x000000, 0.35),
        obstacle: hex(0xa3a3a3),
        obstacle_shade: hex(0x5b5b5b),
        text: hexa(0xffffff, 0.92),
        muted: hexa(0xffffff, 0.55),
    },
    starry: true,
};

pub const FACTORY: ThemeDefinition = ThemeDefinition {
    id: ThemeId::Factory,
    name: "Factory",
    obstacle_kinds: &[ObstacleKind::Barrel, ObstacleKind::Cone],
    palette: Palette {
        sky_top: hex(0x0b1020),
        sky_bottom: hex(0x070a12),
        ground: hex(0x0f1218),
        ground_line: hexa(0xffffff, 0.10),
        grass: hexa(0xfacc15, 0.55),
        accent: hex(0xf59e0b),
        pig: hex(0xffc3dd),
        pig_shade: hex(0xff73b6),
        pig_stroke: hexa(0x000000, 0.35),
        obstacle: hex(0xcbd5e1),
        obstacle_shade: hex(0x64748b),
        text: hexa(0xffffff, 0.92),
        muted: hexa(0xffffff, 0.55),
    },
    starry: false,
};

pub const CANDY: ThemeDefinition = ThemeDefinition {
    id: ThemeId::Candy,
    name: "Candy",
    obstacle_kinds: &[ObstacleKind::Lollipop, ObstacleKind::Cupcake],
    palette: Palette {
        sky_top: hex(0x2a0b2e),
        sky_bottom: hex(0x140515),
        ground: hex(0x1b1020),
        ground_line: hexa(0xffffff, 0.12),
        grass: hexa(0xfb7185, 0.65),
        accent: hex(0xfb7185),
        pig: hex(0xffd1dc),
        pig_shade: hex(0xff7ab8),
        pig_stroke: hexa(0x000000, 0.35),
        obstacle: hex(0xf8fafc),
        obstacle_shade: hex(0xa78bfa),
        text: hexa(0xffffff, 0.92),
        muted: hexa(0xffffff, 0.55),
    },
    starry: false,
};

impl FromStr for ThemeId {
    type Err = ThemeError;

    /// Case-insensitive, surrounding whitespace ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "farm" => Ok(ThemeId::Farm),
            "space" => Ok(ThemeId::Space),
            "factory" => Ok(ThemeId::Factory),
            "candy" => Ok(ThemeId::Candy),
            _ => Err(ThemeError::Unknown(s.to_string())),
        }
    }
}

/// Theme lookup and registry problems
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ThemeError {
    #[error("unknown theme {0:?} (expected farm, space, factory or candy)")]
    Unknown(String),
    #[error("theme {0:?} has no obstacle kinds")]
    NoObstacleKinds(ThemeId),
    #[error("theme {0:?} is registered under the wrong id")]
    IdMismatch(ThemeId),
}

/// Check every registered theme is usable by the spawner
pub fn validate_registry() -> Result<(), ThemeError> {
    for id in ThemeId::ALL {
        let def = id.definition();
        if def.id != id {
            return Err(ThemeError::IdMismatch(id));
        }
        if def.obstacle_kinds.is_empty() {
            return Err(ThemeError::NoObstacleKinds(id));
        }
    }
    Ok(())
}

/// Pick a random theme other than `exclude`
pub fn pick_random_theme<R: Rng + ?Sized>(rng: &mut R, exclude: ThemeId) -> ThemeId {
    let pool: Vec<ThemeId> = ThemeId::ALL.into_iter().filter(|t| *t != exclude).collect();
    if pool.is_empty() {
        return exclude;
    }
    pool[rng.random_range(0..pool.len())]
}

/// Sky colors for one phase of the day-night cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimePalette {
    pub name: &'static str,
    pub sky_top: Color,
    pub sky_bottom: Color,
}

pub const TIME_PALETTES: [TimePalette; 6] = [
    TimePalette { name: "Night", sky_top: hex(0x0f1020), sky_bottom: hex(0x090a12) },
    TimePalette { name: "Dawn", sky_top: hex(0x4c1d4b), sky_bottom: hex(0x1f1020) },
    TimePalette { name: "Morning", sky_top: hex(0x60a5fa), sky_bottom: hex(0xbfdbfe) },
    TimePalette { name: "Noon", sky_top: hex(0x3b82f6), sky_bottom: hex(0x93c5fd) },
    TimePalette { name: "Afternoon", sky_top: hex(0xf59e0b), sky_bottom: hex(0xfef3c7) },
    TimePalette { name: "Evening", sky_top: hex(0x1e1b4b), sky_bottom: hex(0x4c1d95) },
];

/// Speed range covered by one day-night phase
pub const TIME_PHASE_SPEED: f32 = 300.0;

/// Sky palette for the current speed; the cycle advances every 300 px/s
pub fn time_palette(speed: f32, start_speed: f32) -> &'static TimePalette {
    let phase = ((speed - start_speed) / TIME_PHASE_SPEED).floor().max(0.0) as usize;
    &TIME_PALETTES[phase % TIME_PALETTES.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_registry_valid() {
        assert_eq!(validate_registry(), Ok(()));
    }

    #[test]
    fn test_unknown_theme_falls_back() {
        assert_eq!(ThemeId::from_str_or_default("SPACE"), ThemeId::Space);
        assert_eq!(ThemeId::from_str_or_default("jungle"), ThemeId::Farm);
        for id in ThemeId::ALL {
            assert_eq!(id.as_str().parse::<ThemeId>(), Ok(id));
        }
    }

    #[test]
    fn test_parse_theme() {
        assert_eq!(" Candy ".parse::<ThemeId>(), Ok(ThemeId::Candy));
        assert_eq!(
            "jungle".parse::<ThemeId>(),
            Err(ThemeError::Unknown("jungle".to_string()))
        );
    }

    #[test]
    fn test_random_theme_never_repeats() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..100 {
            assert_ne!(pick_random_theme(&mut rng, ThemeId::Candy), ThemeId::Candy);
        }
    }

    #[test]
    fn test_time_palette_cycles() {
        assert_eq!(time_palette(330.0, 330.0).name, "Night");
        assert_eq!(time_palette(629.0, 330.0).name, "Night");
        assert_eq!(time_palette(630.0, 330.0).name, "Dawn");
        assert_eq!(time_palette(330.0 + 6.0 * 300.0, 330.0).name, "Night");
        // Below start speed stays on the first phase
        assert_eq!(time_palette(100.0, 330.0).name, "Night");
    }

    #[test]
    fn test_hex_conversion() {
        assert_eq!(hex(0xff0000), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(hexa(0x000000, 0.5)[3], 0.5);
    }
}
