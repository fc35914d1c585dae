//! Allocation of uniform block binding points.

use std::collections::VecDeque;

/// Hands out uniform buffer binding points, reusing released ones first.
#[derive(Debug, Clone)]
pub struct BindingPointPool {
    free: VecDeque<u32>,
}

impl Default for BindingPointPool {
    fn default() -> Self {
        Self {
            free: VecDeque::from([0]),
        }
    }
}

impl BindingPointPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the next free binding point.
    pub fn allocate(&mut self) -> u32 {
        let point = self.free.pop_front().unwrap_or(0);
        if self.free.is_empty() {
            self.free.push_back(point + 1);
        }
        point
    }

    /// Returns a binding point so the next allocation reuses it.
    pub fn release(&mut self, point: u32) {
        if !self.free.contains(&point) {
            self.free.push_front(point);
        }
    }
}
