use crate::device::{Backend, BufferId};

/// Growable f32 array mirrored to a GPU vertex buffer.
///
/// `dimension` is the number of components per vertex. The contents length
/// is always a multiple of it.
#[derive(Debug, Clone)]
pub struct GpuBuffer {
    dimension: u32,
    elements: Vec<f32>,
    id: Option<BufferId>,
    /// Floats allocated on the GPU side.
    allocated: usize,
    uploaded: bool,
}

impl GpuBuffer {
    /// Zero-filled buffer holding `vertices` elements.
    pub fn new(dimension: u32, vertices: usize) -> Self {
        Self::with_contents(dimension, vec![0.0; vertices * dimension as usize])
    }

    pub fn with_contents(dimension: u32, elements: Vec<f32>) -> Self {
        assert!(
            (1..=4).contains(&dimension),
            "buffer dimension must be 1..=4, got {dimension}"
        );
        assert_eq!(
            elements.len() % dimension as usize,
            0,
            "buffer length {} is not a multiple of dimension {dimension}",
            elements.len()
        );
        Self {
            dimension,
            elements,
            id: None,
            allocated: 0,
            uploaded: false,
        }
    }

    pub fn dimension(&self) -> u32 {
        self.dimension
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.elements
    }

    /// Length in floats.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of whole vertices stored.
    pub fn vertex_count(&self) -> usize {
        self.elements.len() / self.dimension as usize
    }

    pub fn id(&self) -> Option<BufferId> {
        self.id
    }

    pub fn is_created(&self) -> bool {
        self.id.is_some()
    }

    /// True while the GPU copy matches the CPU contents.
    pub fn is_uploaded(&self) -> bool {
        self.uploaded
    }

    /// Overwrites floats starting at `offset`.
    pub fn write(&mut self, offset: usize, values: &[f32]) {
        let end = offset + values.len();
        assert!(
            end <= self.elements.len(),
            "buffer write {offset}..{end} past length {}",
            self.elements.len()
        );
        self.elements[offset..end].copy_from_slice(values);
        self.uploaded = false;
    }

    /// Appends one vertex.
    pub fn push(&mut self, vertex: &[f32]) {
        assert_eq!(
            vertex.len(),
            self.dimension as usize,
            "vertex has {} components, buffer dimension is {}",
            vertex.len(),
            self.dimension
        );
        self.elements.extend_from_slice(vertex);
        self.uploaded = false;
    }

    /// Appends whole vertices.
    pub fn extend(&mut self, values: &[f32]) {
        assert_eq!(
            values.len() % self.dimension as usize,
            0,
            "extend by {} floats breaks dimension {}",
            values.len(),
            self.dimension
        );
        self.elements.extend_from_slice(values);
        self.uploaded = false;
    }

    /// Allocates the GPU store, uploads everything and binds it to attribute
    /// `location` of the bound vertex array.
    ///
    /// Creating a buffer twice is a contract violation.
    pub fn create(&mut self, gpu: &mut dyn Backend, location: u32) {
        assert!(self.id.is_none(), "buffer created twice");
        let id = gpu.create_buffer(&self.elements);
        gpu.vertex_attribute(location, id, self.dimension);
        self.id = Some(id);
        self.allocated = self.elements.len();
        self.uploaded = true;
    }

    /// Re-uploads the full contents range, creating the buffer first if
    /// needed.
    pub fn update(&mut self, gpu: &mut dyn Backend, location: u32) {
        let Some(id) = self.id else {
            self.create(gpu, location);
            return;
        };

        if self.elements.len() > self.allocated {
            log::trace!(
                "buffer {} grew {} -> {} floats, reallocating",
                id.raw(),
                self.allocated,
                self.elements.len()
            );
            self.delete(gpu);
            self.create(gpu, location);
            return;
        }

        gpu.write_buffer(id, 0, &self.elements);
        self.uploaded = true;
    }

    /// Releases the GPU resource. The buffer may be created again afterwards.
    pub fn delete(&mut self, gpu: &mut dyn Backend) {
        if let Some(id) = self.id.take() {
            gpu.delete_buffer(id);
        }
        self.allocated = 0;
        self.uploaded = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::recording::{Call, RecordingBackend};

    #[test]
    fn new_is_zero_filled() {
        let buffer = GpuBuffer::new(2, 6);
        assert_eq!(buffer.len(), 12);
        assert_eq!(buffer.vertex_count(), 6);
        assert!(buffer.as_slice().iter().all(|v| *v == 0.0));
        assert!(!buffer.is_created());
    }

    #[test]
    #[should_panic(expected = "not a multiple")]
    fn ragged_contents_panic() {
        GpuBuffer::with_contents(2, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn create_uploads_and_binds() {
        let mut gpu = RecordingBackend::new();
        let mut buffer = GpuBuffer::with_contents(2, vec![1.0, 2.0, 3.0, 4.0]);
        buffer.create(&mut gpu, 1);

        let id = buffer.id().unwrap();
        assert!(buffer.is_uploaded());
        assert_eq!(gpu.contents(id), &[1.0, 2.0, 3.0, 4.0]);
        assert!(gpu.calls.contains(&Call::VertexAttribute {
            location: 1,
            buffer: id,
            dimension: 2
        }));
    }

    #[test]
    #[should_panic(expected = "created twice")]
    fn create_twice_panics() {
        let mut gpu = RecordingBackend::new();
        let mut buffer = GpuBuffer::new(2, 1);
        buffer.create(&mut gpu, 0);
        buffer.create(&mut gpu, 0);
    }

    #[test]
    fn update_creates_when_needed() {
        let mut gpu = RecordingBackend::new();
        let mut buffer = GpuBuffer::new(2, 3);
        buffer.update(&mut gpu, 0);
        assert!(buffer.is_created());
        assert!(buffer.is_uploaded());
    }

    #[test]
    fn update_rewrites_full_range() {
        let mut gpu = RecordingBackend::new();
        let mut buffer = GpuBuffer::new(2, 3);
        buffer.create(&mut gpu, 0);
        buffer.write(2, &[7.0, 8.0]);
        assert!(!buffer.is_uploaded());

        gpu.clear_calls();
        buffer.update(&mut gpu, 0);
        let id = buffer.id().unwrap();
        assert_eq!(
            gpu.calls,
            vec![Call::WriteBuffer {
                id,
                offset: 0,
                len: 6
            }]
        );
        assert_eq!(gpu.contents(id), &[0.0, 0.0, 7.0, 8.0, 0.0, 0.0]);
    }

    #[test]
    fn growth_reallocates() {
        let mut gpu = RecordingBackend::new();
        let mut buffer = GpuBuffer::new(2, 1);
        buffer.create(&mut gpu, 0);
        let old = buffer.id().unwrap();

        buffer.push(&[5.0, 6.0]);
        buffer.update(&mut gpu, 0);

        let new = buffer.id().unwrap();
        assert_ne!(old, new);
        assert!(gpu.calls.contains(&Call::DeleteBuffer(old)));
        assert_eq!(gpu.contents(new), &[0.0, 0.0, 5.0, 6.0]);
    }

    #[test]
    fn delete_allows_recreate() {
        let mut gpu = RecordingBackend::new();
        let mut buffer = GpuBuffer::new(2, 1);
        buffer.create(&mut gpu, 0);
        buffer.delete(&mut gpu);
        assert!(!buffer.is_created());
        buffer.create(&mut gpu, 0);
        assert!(buffer.is_created());
    }

    #[test]
    #[should_panic(expected = "past length")]
    fn write_past_end_panics() {
        GpuBuffer::new(2, 1).write(1, &[1.0, 2.0]);
    }
}
