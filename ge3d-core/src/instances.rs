//! Per-instance transforms for instanced rendering.
//!
//! An [`InstanceSet`] owns a fixed number of [`Model`] values plus the set of indices
//! whose GPU copy is stale. Mutation goes through [`InstanceSet::instance_mut`], which
//! marks the index dirty before handing out the transform, so a changed instance can't
//! be missed. [`InstanceSet::flush`] then writes only the dirty slots into an
//! [`InstanceSink`], which the renderer backs with real buffers.

use std::ops::{Deref, DerefMut};

use fxhash::FxHashSet;
use glam::{Mat3, Mat4};

use crate::model::Model;

/// Bytes taken by one model matrix in the instance buffer.
pub const MODEL_MATRIX_SIZE: usize = std::mem::size_of::<Mat4>();
/// Bytes taken by one normal matrix in the instance buffer.
pub const NORMAL_MATRIX_SIZE: usize = std::mem::size_of::<Mat3>();

/// Destination for per-instance matrix uploads.
pub trait InstanceSink {
    /// Writes a column-major model matrix at `offset` bytes into the model buffer.
    fn write_model_matrix(&mut self, offset: usize, matrix: &[f32; 16]);
    /// Writes a column-major normal matrix at `offset` bytes into the normal buffer.
    fn write_normal_matrix(&mut self, offset: usize, matrix: &[f32; 9]);
}

/// A fixed-size collection of transforms with dirty tracking.
#[derive(Debug, Clone)]
pub struct InstanceSet {
    models: Vec<Model>,
    dirty: FxHashSet<usize>,
}

impl InstanceSet {
    /// Creates `count` identity instances, all of them dirty.
    pub fn new(count: usize) -> Self {
        Self {
            models: vec![Model::default(); count],
            dirty: (0..count).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Model> {
        self.models.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Model> {
        self.models.iter()
    }

    /// Mutable access to one instance. The index is marked dirty immediately.
    pub fn instance_mut(&mut self, index: usize) -> Option<InstanceMut<'_>> {
        let model = self.models.get_mut(index)?;
        self.dirty.insert(index);
        Some(InstanceMut { model })
    }

    /// Marks an instance stale without touching it.
    pub fn mark_dirty(&mut self, index: usize) {
        if index < self.models.len() {
            self.dirty.insert(index);
        }
    }

    /// Runs `f` on every instance and marks all of them dirty.
    pub fn update_all(&mut self, mut f: impl FnMut(usize, &mut Model)) {
        for (index, model) in self.models.iter_mut().enumerate() {
            f(index, model);
        }
        self.dirty.extend(0..self.models.len());
    }

    pub fn is_dirty(&self, index: usize) -> bool {
        self.dirty.contains(&index)
    }

    pub fn dirty_count(&self) -> usize {
        self.dirty.len()
    }

    /// Writes every dirty instance into `sink` and clears the dirty set.
    /// Returns the number of instances written.
    pub fn flush(&mut self, sink: &mut impl InstanceSink) -> usize {
        let count = self.dirty.len();
        for index in self.dirty.drain() {
            let model = &self.models[index];
            sink.write_model_matrix(
                index * MODEL_MATRIX_SIZE,
                &model.model_matrix().to_cols_array(),
            );
            sink.write_normal_matrix(
                index * NORMAL_MATRIX_SIZE,
                &model.normal_matrix().to_cols_array(),
            );
        }
        if count > 0 {
            log::debug!("Uploaded {count} of {} instances", self.models.len());
        }
        count
    }
}

/// Mutable view of one instance handed out by [`InstanceSet::instance_mut`].
pub struct InstanceMut<'a> {
    model: &'a mut Model,
}

impl Deref for InstanceMut<'_> {
    type Target = Model;

    fn deref(&self) -> &Model {
        self.model
    }
}

impl DerefMut for InstanceMut<'_> {
    fn deref_mut(&mut self) -> &mut Model {
        self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[derive(Default)]
    struct RecordingSink {
        model_writes: Vec<(usize, [f32; 16])>,
        normal_writes: Vec<(usize, [f32; 9])>,
    }

    impl InstanceSink for RecordingSink {
        fn write_model_matrix(&mut self, offset: usize, matrix: &[f32; 16]) {
            self.model_writes.push((offset, *matrix));
        }

        fn write_normal_matrix(&mut self, offset: usize, matrix: &[f32; 9]) {
            self.normal_writes.push((offset, *matrix));
        }
    }

    #[test]
    fn matrix_sizes_match_gpu_layout() {
        assert_eq!(MODEL_MATRIX_SIZE, 64);
        assert_eq!(NORMAL_MATRIX_SIZE, 36);
    }

    #[test]
    fn first_flush_uploads_every_instance() {
        let mut set = InstanceSet::new(4);
        let mut sink = RecordingSink::default();
        assert_eq!(set.flush(&mut sink), 4);

        let mut offsets: Vec<_> = sink.model_writes.iter().map(|(o, _)| *o).collect();
        offsets.sort_unstable();
        assert_eq!(offsets, vec![0, 64, 128, 192]);
        assert!(
            sink.model_writes
                .iter()
                .all(|(_, m)| *m == Mat4::IDENTITY.to_cols_array())
        );
    }

    #[test]
    fn mutating_one_instance_uploads_only_its_range() {
        let mut set = InstanceSet::new(100);
        set.flush(&mut RecordingSink::default());

        set.instance_mut(37)
            .unwrap()
            .set_position(Vec3::new(1.0, 2.0, 3.0))
            .rotate(0.5, Vec3::Z);

        let mut sink = RecordingSink::default();
        assert_eq!(set.flush(&mut sink), 1);
        assert_eq!(sink.model_writes.len(), 1);
        assert_eq!(sink.model_writes[0].0, 37 * 64);
        assert_eq!(
            sink.model_writes[0].1,
            set.get(37).unwrap().model_matrix().to_cols_array()
        );
        assert_eq!(sink.normal_writes.len(), 1);
        assert_eq!(sink.normal_writes[0].0, 37 * 36);
        assert_eq!(set.dirty_count(), 0);

        let mut sink = RecordingSink::default();
        assert_eq!(set.flush(&mut sink), 0);
        assert!(sink.model_writes.is_empty());
        assert!(sink.normal_writes.is_empty());
    }

    #[test]
    fn repeated_mutations_upload_once() {
        let mut set = InstanceSet::new(3);
        set.flush(&mut RecordingSink::default());

        set.instance_mut(2).unwrap().translate(Vec3::X);
        set.instance_mut(2).unwrap().translate(Vec3::X);
        set.mark_dirty(0);
        set.mark_dirty(99);

        let mut sink = RecordingSink::default();
        assert_eq!(set.flush(&mut sink), 2);
        assert_eq!(set.get(2).unwrap().position(), Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn out_of_range_access_is_none() {
        let mut set = InstanceSet::new(2);
        assert!(set.instance_mut(2).is_none());
        assert!(set.get(5).is_none());
    }

    #[test]
    fn update_all_marks_everything_dirty() {
        let mut set = InstanceSet::new(5);
        set.flush(&mut RecordingSink::default());
        set.update_all(|i, model| {
            model.set_position(Vec3::new(i as f32, 0.0, 0.0));
        });
        assert_eq!(set.dirty_count(), 5);
        assert_eq!(set.get(4).unwrap().position().x, 4.0);
    }
}
