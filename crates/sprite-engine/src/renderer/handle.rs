use crate::render::{ModeCell, RenderObject, SharedVec2};

/// Identifies a render object inside one renderer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub(crate) u64);

impl ObjectId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Thread-safe reference to a render object owned by the renderer.
///
/// Other threads keep handles and act on the object through jobs, or move it
/// through the translation cell.
#[derive(Debug, Clone)]
pub struct ObjectHandle {
    id: ObjectId,
    mode: ModeCell,
    translation: Option<SharedVec2>,
}

impl ObjectHandle {
    pub(crate) fn new(id: ObjectId, object: &RenderObject) -> Self {
        Self {
            id,
            mode: object.mode().clone(),
            translation: object.transform().map(|t| t.translation().clone()),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Translation cell of a transformed object.
    pub fn translation(&self) -> Option<&SharedVec2> {
        self.translation.as_ref()
    }

    pub fn is_async(&self) -> bool {
        self.mode.is_async()
    }

    /// Called when a job targeting the object is built. Panics if the object
    /// auto-updates.
    pub(crate) fn mark_async(&self) {
        self.mode.mark_async();
    }
}
