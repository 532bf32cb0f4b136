use crate::epic::EpicId;
use thiserror::Error;

/// Everything that can go wrong while placing, arranging, or persisting epics.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("placement overlaps epic {blocking}")]
    Overlap { blocking: EpicId },

    #[error("position ({left}, {top}) is not a non-negative grid cell")]
    Misaligned { left: i32, top: i32 },

    #[error("epic must span at least one sprint and one resource (got {width}x{resource_count})")]
    InvalidSize { width: u32, resource_count: u32 },

    #[error("a {width}x{resource_count} epic at ({left}, {top}) leaves the timeline")]
    OutOfBounds {
        left: i32,
        top: i32,
        width: u32,
        resource_count: u32,
    },

    #[error("no epic with id {0}")]
    UnknownEpic(EpicId),

    #[error("cannot arrange epic {id} within {max_resources} resource row(s)")]
    NoFit { id: EpicId, max_resources: u32 },

    #[error("invalid project file: {0}")]
    InvalidDocument(#[from] serde_json::Error),

    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlanError {
    /// Text shown to the user in the notice window.
    pub fn user_message(&self) -> String {
        match self {
            PlanError::Overlap { .. } => {
                "Cannot place Epic here - overlaps with existing Epic.".to_string()
            }
            PlanError::OutOfBounds { .. } => "Cannot place Epic outside the timeline.".to_string(),
            PlanError::NoFit { .. } => {
                "Cannot arrange all epics within the defined resource limit.".to_string()
            }
            PlanError::InvalidDocument(_) => "Invalid file: not a project document.".to_string(),
            other => other.to_string(),
        }
    }
}
