//! Identifiers handed out to clients and baked into artifact names.

use uuid::Uuid;

/// Opaque token identifying one conversation.
pub fn conversation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Random suffix that keeps logo file names from colliding, even for the
/// same brand name.
pub fn artifact_suffix() -> String {
    Uuid::new_v4().simple().to_string()
}
