pub const DEFAULT_DIFFICULTY: u16 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerConfig {
    pub name: String,
    /// Search depth in plies below the root move.
    pub difficulty: u16,
    /// Pick uniformly among legal moves instead of searching.
    pub random_mover: bool,
}

impl PlayerConfig {
    pub fn new(name: impl Into<String>, difficulty: u16) -> Self {
        Self {
            name: name.into(),
            difficulty,
            random_mover: false,
        }
    }

    pub fn random(name: impl Into<String>) -> Self {
        Self {
            random_mover: true,
            ..Self::new(name, 0)
        }
    }
}

/// Switches for the two places where the engine can deviate from standard chess.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleSet {
    /// Allow castling across a square the opponent attacks.
    pub castle_through_check: bool,
    /// Score "no legal moves" as checkmate even when the king is not attacked.
    pub stalemate_is_checkmate: bool,
}

impl RuleSet {
    pub fn standard() -> Self {
        Self::default()
    }

    /// Only "not in check" and "path empty" gate castling, and stalemate loses.
    pub fn permissive() -> Self {
        Self {
            castle_through_check: true,
            stalemate_is_checkmate: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub white: PlayerConfig,
    pub black: PlayerConfig,
    pub rules: RuleSet,
    /// Seed for the bots' random choices; `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            white: PlayerConfig::new("White", DEFAULT_DIFFICULTY),
            black: PlayerConfig::new("Black", DEFAULT_DIFFICULTY),
            rules: RuleSet::standard(),
            seed: None,
        }
    }
}
