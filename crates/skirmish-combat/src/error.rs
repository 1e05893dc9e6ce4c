use skirmish_scene::Entity;

/// Recoverable setup and resolution failures in the combat core.
///
/// None of these are fatal. They are logged where detected and the affected
/// hit, attack or component is dropped while the rest of the fight goes on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CombatError {
    #[error("{component} on '{label}' ({entity}) has no collider and stays inert")]
    MisconfiguredComponent {
        entity: Entity,
        label: String,
        component: &'static str,
    },

    #[error("no damage receiver found from '{label}' ({candidate})")]
    NoReceiverFound { candidate: Entity, label: String },

    #[error("attacker '{label}' ({attacker}) has no hitbox template, attack skipped")]
    InvalidPrefabReference { attacker: Entity, label: String },
}

impl CombatError {
    /// The entity the error was detected on
    pub fn entity(&self) -> Entity {
        match self {
            Self::MisconfiguredComponent { entity, .. } => *entity,
            Self::NoReceiverFound { candidate, .. } => *candidate,
            Self::InvalidPrefabReference { attacker, .. } => *attacker,
        }
    }
}
