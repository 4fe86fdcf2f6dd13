use thiserror::Error;

use crate::core::types::NpcId;

#[derive(Error, Debug)]
pub enum NocturneError {
    #[error("NPC not found: {0:?}")]
    NpcNotFound(NpcId),

    #[error("Night {index} is not in the roster ({nights} nights configured)")]
    NightOutOfRange { index: usize, nights: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("NPC {0:?} cannot be grappled")]
    NotGrappleable(NpcId),

    #[error("NPC {0:?} cannot be hypnotised")]
    NotHypnotisable(NpcId),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, NocturneError>;
