//! Fixed-capacity per-unit line buffers and the per-frame tip table.

use glam::Vec2;

/// Vertex and color arrays handed to the renderer
///
/// Both arrays hold `2 * capacity` points (one pair per segment) and are
/// allocated once. Every geometry pass overwrites the live prefix and
/// zeroes the rest.
#[derive(Debug, Clone)]
pub struct LineBuffers {
    capacity: usize,
    positions: Vec<[f32; 3]>,
    colors: Vec<[f32; 3]>,
    cursor: usize,
    positions_dirty: bool,
    colors_dirty: bool,
}

impl LineBuffers {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            positions: vec![[0.0; 3]; capacity * 2],
            colors: vec![[0.0; 3]; capacity * 2],
            cursor: 0,
            positions_dirty: true,
            colors_dirty: true,
        }
    }

    /// Segment capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn colors(&self) -> &[[f32; 3]] {
        &self.colors
    }

    /// Start a geometry pass at slot 0
    pub fn begin(&mut self) {
        self.cursor = 0;
    }

    /// Append one visible segment at z = 0
    pub fn write_segment(&mut self, start: Vec2, end: Vec2) {
        if self.cursor >= self.capacity {
            return;
        }
        let i = self.cursor * 2;
        self.positions[i] = [start.x, start.y, 0.0];
        self.positions[i + 1] = [end.x, end.y, 0.0];
        self.cursor += 1;
    }

    /// Append a collapsed (invisible) segment
    pub fn write_degenerate(&mut self) {
        if self.cursor >= self.capacity {
            return;
        }
        let i = self.cursor * 2;
        self.positions[i] = [0.0; 3];
        self.positions[i + 1] = [0.0; 3];
        self.cursor += 1;
    }

    /// Zero every slot after the last written segment and mark positions dirty
    pub fn finish(&mut self) {
        self.positions[self.cursor * 2..].fill([0.0; 3]);
        self.positions_dirty = true;
    }

    /// Overwrite the color prefix; entries past it are left as they were
    pub fn write_colors<I: IntoIterator<Item = [f32; 3]>>(&mut self, colors: I) {
        for (i, color) in colors.into_iter().take(self.capacity).enumerate() {
            self.colors[i * 2] = color;
            self.colors[i * 2 + 1] = color;
        }
        self.colors_dirty = true;
    }

    /// Return and clear the (positions, colors) dirty flags
    pub fn take_dirty(&mut self) -> (bool, bool) {
        let dirty = (self.positions_dirty, self.colors_dirty);
        self.positions_dirty = false;
        self.colors_dirty = false;
        dirty
    }
}

/// Resolved segment end points for one projection pass
///
/// Slots are stamped with the pass number instead of being cleared, so
/// starting a new pass is O(1) and nothing is reallocated.
#[derive(Debug, Clone)]
pub struct TipTable {
    ends: Vec<Vec2>,
    stamps: Vec<u32>,
    pass: u32,
}

impl TipTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            ends: vec![Vec2::ZERO; capacity],
            stamps: vec![0; capacity],
            pass: 0,
        }
    }

    /// Forget every tip from the previous pass
    pub fn next_pass(&mut self) {
        self.pass = self.pass.wrapping_add(1);
        if self.pass == 0 {
            // Wrapped: old stamps could collide with the new pass number
            self.stamps.fill(0);
            self.pass = 1;
        }
    }

    pub fn insert(&mut self, index: usize, end: Vec2) {
        if let (Some(slot), Some(stamp)) = (self.ends.get_mut(index), self.stamps.get_mut(index)) {
            *slot = end;
            *stamp = self.pass;
        }
    }

    /// End point resolved this pass, `None` if the segment was clipped
    pub fn get(&self, index: usize) -> Option<Vec2> {
        match self.stamps.get(index) {
            Some(&stamp) if stamp == self.pass && self.pass != 0 => Some(self.ends[index]),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_zeroes_tail() {
        let mut buffers = LineBuffers::new(4);
        buffers.begin();
        for _ in 0..4 {
            buffers.write_segment(Vec2::ONE, Vec2::new(2.0, 3.0));
        }
        buffers.finish();
        assert!(buffers.positions().iter().all(|p| *p != [0.0; 3]));

        buffers.begin();
        buffers.write_segment(Vec2::ONE, Vec2::ONE);
        buffers.finish();
        assert_eq!(buffers.positions()[1], [1.0, 1.0, 0.0]);
        assert!(buffers.positions()[2..].iter().all(|p| *p == [0.0; 3]));
    }

    #[test]
    fn test_writes_past_capacity_are_dropped() {
        let mut buffers = LineBuffers::new(1);
        buffers.begin();
        buffers.write_segment(Vec2::ONE, Vec2::ONE);
        buffers.write_segment(Vec2::X, Vec2::Y);
        buffers.finish();
        assert_eq!(buffers.positions().len(), 2);
        assert_eq!(buffers.positions()[0], [1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_dirty_flags() {
        let mut buffers = LineBuffers::new(2);
        assert_eq!(buffers.take_dirty(), (true, true));
        assert_eq!(buffers.take_dirty(), (false, false));

        buffers.write_colors([[1.0, 0.0, 0.0]]);
        assert_eq!(buffers.take_dirty(), (false, true));
        assert_eq!(buffers.colors()[0], [1.0, 0.0, 0.0]);
        assert_eq!(buffers.colors()[1], [1.0, 0.0, 0.0]);
        assert_eq!(buffers.colors()[2], [0.0; 3]);

        buffers.begin();
        buffers.finish();
        assert_eq!(buffers.take_dirty(), (true, false));
    }

    #[test]
    fn test_tip_table_forgets_previous_pass() {
        let mut tips = TipTable::new(8);
        assert_eq!(tips.get(0), None);

        tips.next_pass();
        tips.insert(3, Vec2::new(1.0, 2.0));
        assert_eq!(tips.get(3), Some(Vec2::new(1.0, 2.0)));
        assert_eq!(tips.get(2), None);

        tips.next_pass();
        assert_eq!(tips.get(3), None);
        assert_eq!(tips.get(100), None);
    }

    #[test]
    fn test_tip_table_wraparound() {
        let mut tips = TipTable::new(2);
        tips.pass = u32::MAX;
        tips.insert(0, Vec2::ONE);
        tips.next_pass();
        assert_eq!(tips.pass, 1);
        assert_eq!(tips.get(0), None);
    }
}
