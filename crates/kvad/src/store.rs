//! Growable vertex/index storage and the quad index topology.
//!
//! The store owns two parallel slot arrays kept at capacity length: vertices
//! are written in place at the next free slot, and the index array holds the
//! fixed two-triangle pattern for every quad slot, generated ahead of time.
//! For quad `k` the six indices are always
//! `4k, 4k+1, 4k+3, 4k+1, 4k+2, 4k+3` — the pattern depends only on the quad
//! ordinal, never on geometry or texture, so growing the store only requires
//! generating topology for the newly added slots.
//!
//! Capacity starts at [`INITIAL_SPRITES`] and doubles on overflow, repeatedly
//! if one doubling is not enough. It never shrinks: the arrays are reused
//! across frames and only the write counts reset.
//!
//! Indices are `u32`: the addressable vertex count is bounded only by
//! memory, ruling out the silent wraparound a 16-bit store would hit past
//! 65535 vertices, at the cost of double the index-buffer bytes.

use bytemuck::Zeroable;

use crate::vertex::BatchVertex;

/// Initial capacity in sprites: 8192 vertex slots, 12288 index slots.
pub(crate) const INITIAL_SPRITES: usize = 2048;

const VERTICES_PER_QUAD: usize = 4;
const INDICES_PER_QUAD: usize = 6;

pub(crate) struct GeometryStore {
    vertices: Vec<BatchVertex>,
    indices: Vec<u32>,
    vertex_count: usize,
    index_count: usize,
    quad_count: usize,
    // High-water marks for topology generation: everything below these is
    // already valid, [fill_indices] only writes above them.
    from_index: usize,
    from_vertex: usize,
}

impl GeometryStore {
    pub fn new() -> Self {
        let mut store = Self {
            vertices: vec![BatchVertex::zeroed(); INITIAL_SPRITES * VERTICES_PER_QUAD],
            indices: vec![0; INITIAL_SPRITES * INDICES_PER_QUAD],
            vertex_count: 0,
            index_count: 0,
            quad_count: 0,
            from_index: 0,
            from_vertex: 0,
        };
        store.fill_indices();
        store
    }

    /// Make room for `quads` quads, doubling the slot arrays as needed.
    /// Existing content is preserved in place. Returns true iff either array
    /// grew — the caller's cue that GPU-side mirrors are stale and the new
    /// index range needs topology ([`fill_indices`](Self::fill_indices)).
    pub fn ensure_capacity(&mut self, quads: usize) -> bool {
        let mut grew = false;
        while self.vertices.len() < quads * VERTICES_PER_QUAD {
            let len = self.vertices.len();
            self.vertices.resize(len * 2, BatchVertex::zeroed());
            grew = true;
        }
        while self.indices.len() < quads * INDICES_PER_QUAD {
            let len = self.indices.len();
            self.indices.resize(len * 2, 0);
            grew = true;
        }
        if grew {
            log::debug!(
                "geometry store grew to {} sprites",
                self.vertices.len() / VERTICES_PER_QUAD
            );
        }
        grew
    }

    /// Extend the quad topology from the high-water marks to the current
    /// capacity. Slots below the marks are left untouched.
    pub fn fill_indices(&mut self) {
        let mut i = self.from_index;
        let mut v = self.from_vertex as u32;
        while i < self.indices.len() {
            self.indices[i] = v;
            self.indices[i + 1] = v + 1;
            self.indices[i + 2] = v + 3;
            self.indices[i + 3] = v + 1;
            self.indices[i + 4] = v + 2;
            self.indices[i + 5] = v + 3;
            i += INDICES_PER_QUAD;
            v += VERTICES_PER_QUAD as u32;
        }
        self.from_index = self.indices.len();
        self.from_vertex = self.vertices.len();
    }

    /// Write one quad's four corners at the next free slots and advance the
    /// counts. The quad is written as a unit, never partially.
    pub fn write_quad(&mut self, corners: [BatchVertex; 4]) {
        debug_assert!(self.vertex_count + VERTICES_PER_QUAD <= self.vertices.len());
        self.vertices[self.vertex_count..self.vertex_count + VERTICES_PER_QUAD]
            .copy_from_slice(&corners);
        self.vertex_count += VERTICES_PER_QUAD;
        self.index_count += INDICES_PER_QUAD;
        self.quad_count += 1;
    }

    /// Zero the write counts; capacity and content slots are retained.
    pub fn reset(&mut self) {
        self.vertex_count = 0;
        self.index_count = 0;
        self.quad_count = 0;
    }

    pub fn written_vertices(&self) -> &[BatchVertex] {
        &self.vertices[..self.vertex_count]
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn index_count(&self) -> usize {
        self.index_count
    }

    pub fn quad_count(&self) -> usize {
        self.quad_count
    }

    /// Capacity in vertex slots.
    pub fn vertex_capacity(&self) -> usize {
        self.vertices.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_topology(indices: &[u32], quads: usize) {
        for k in 0..quads {
            let base = (4 * k) as u32;
            assert_eq!(
                &indices[6 * k..6 * k + 6],
                &[base, base + 1, base + 3, base + 1, base + 2, base + 3],
                "quad {k} topology"
            );
        }
    }

    fn vertex(x: f32) -> BatchVertex {
        BatchVertex {
            position: [x, 0.0, 0.0],
            uv: [0.0, 0.0],
            color: [1.0; 4],
        }
    }

    #[test]
    fn initial_capacity_matches_seed() {
        let store = GeometryStore::new();
        assert_eq!(store.vertices.len(), 8192);
        assert_eq!(store.indices.len(), 12288);
        assert_eq!(store.vertex_count(), 0);
        assert_eq!(store.index_count(), 0);
    }

    #[test]
    fn topology_holds_over_full_initial_range() {
        let store = GeometryStore::new();
        assert_topology(&store.indices, INITIAL_SPRITES);
    }

    #[test]
    fn ensure_within_capacity_is_a_noop() {
        let mut store = GeometryStore::new();
        assert!(!store.ensure_capacity(INITIAL_SPRITES));
        assert_eq!(store.vertices.len(), 8192);
    }

    #[test]
    fn growth_doubles_and_preserves_content() {
        let mut store = GeometryStore::new();
        store.write_quad([vertex(1.0), vertex(2.0), vertex(3.0), vertex(4.0)]);

        assert!(store.ensure_capacity(INITIAL_SPRITES + 1));
        assert_eq!(store.vertices.len(), 16384);
        assert_eq!(store.indices.len(), 24576);

        // Previously written vertices are unchanged, in order.
        assert_eq!(store.written_vertices()[0], vertex(1.0));
        assert_eq!(store.written_vertices()[3], vertex(4.0));
        assert_eq!(store.quad_count(), 1);
    }

    #[test]
    fn growth_doubles_repeatedly_when_one_is_not_enough() {
        let mut store = GeometryStore::new();
        assert!(store.ensure_capacity(INITIAL_SPRITES * 4 + 1));
        assert_eq!(store.vertices.len(), 8192 * 8);
        assert_eq!(store.indices.len(), 12288 * 8);
    }

    #[test]
    fn fill_indices_extends_only_the_new_range() {
        let mut store = GeometryStore::new();
        store.ensure_capacity(INITIAL_SPRITES + 1);

        // Corrupt one index in the valid prefix: fill_indices must not touch it.
        store.indices[0] = 999;
        store.fill_indices();
        assert_eq!(store.indices[0], 999);

        // The extended range got correct topology, continuing the vertex
        // numbering where the old range left off.
        for k in INITIAL_SPRITES..INITIAL_SPRITES * 2 {
            let base = (4 * k) as u32;
            assert_eq!(
                &store.indices[6 * k..6 * k + 6],
                &[base, base + 1, base + 3, base + 1, base + 2, base + 3],
                "quad {k} topology"
            );
        }
    }

    #[test]
    fn counts_track_quads() {
        let mut store = GeometryStore::new();
        for i in 0..3 {
            store.write_quad([vertex(i as f32); 4]);
        }
        assert_eq!(store.vertex_count(), 12);
        assert_eq!(store.index_count(), 18);
        assert_eq!(store.quad_count(), 3);

        store.reset();
        assert_eq!(store.vertex_count(), 0);
        assert_eq!(store.index_count(), 0);
        assert_eq!(store.quad_count(), 0);
        // Capacity is retained.
        assert_eq!(store.vertices.len(), 8192);
    }
}
