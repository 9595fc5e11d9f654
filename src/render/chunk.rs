// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! # Chunked Renderer Module
//!
//! The GPU vertex buffer has a fixed capacity. A frame's batch may be
//! larger, so it is drawn in consecutive slices: upload slice, draw it,
//! repeat. Chunks never split a quad.

use crate::error::{TextError, TextResult};
use crate::render::batch::{Vertex, VertexBatch, VERTICES_PER_QUAD};
use crate::render::transform::ViewProjection;
use log::debug;
use std::ops::Range;

/// 100,000 quads
pub const DEFAULT_CHUNK_CAPACITY: usize = 600_000;

/// Consecutive vertex ranges of at most `capacity` vertices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    total: usize,
    capacity: usize,
}

impl ChunkPlan {
    /// `capacity` is rounded down to whole quads
    pub fn new(total: usize, capacity: usize) -> TextResult<Self> {
        let capacity = capacity / VERTICES_PER_QUAD * VERTICES_PER_QUAD;
        if capacity == 0 {
            return Err(TextError::Config(format!(
                "chunk capacity must hold at least one quad ({} vertices)",
                VERTICES_PER_QUAD
            )));
        }
        Ok(Self { total, capacity })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn chunk_count(&self) -> usize {
        self.total.div_ceil(self.capacity)
    }

    pub fn ranges(&self) -> impl Iterator<Item = Range<usize>> {
        let Self { total, capacity } = *self;
        (0..self.chunk_count()).map(move |i| i * capacity..((i + 1) * capacity).min(total))
    }
}

/// Receiver of uploaded chunks, the GPU side of the renderer
pub trait ChunkSink {
    /// Most vertices a single `draw_chunk` accepts
    fn capacity(&self) -> usize;

    /// Upload `vertices` and draw them before returning
    fn draw_chunk(
        &mut self,
        index: usize,
        vertices: &[Vertex],
        view_projection: &ViewProjection,
    ) -> TextResult<()>;
}

#[derive(Debug, Clone, Copy)]
pub struct ChunkedRenderer {
    capacity: usize,
}

impl ChunkedRenderer {
    pub fn new(capacity: usize) -> TextResult<Self> {
        let plan = ChunkPlan::new(0, capacity)?;
        Ok(Self {
            capacity: plan.capacity(),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Draw the whole batch, returns the number of chunks submitted
    pub fn render<S: ChunkSink>(
        &self,
        batch: &VertexBatch,
        view_projection: &ViewProjection,
        sink: &mut S,
    ) -> TextResult<usize> {
        let plan = ChunkPlan::new(batch.len(), self.capacity)?;
        let vertices = batch.vertices();
        for (index, range) in plan.ranges().enumerate() {
            let chunk = &vertices[range];
            if chunk.len() > sink.capacity() {
                return Err(TextError::Render(format!(
                    "chunk of {} vertices exceeds vertex buffer capacity {}",
                    chunk.len(),
                    sink.capacity()
                )));
            }
            sink.draw_chunk(index, chunk, view_projection)?;
        }
        if plan.chunk_count() > 1 {
            debug!(
                "Drew {} vertices in {} chunks",
                plan.total(),
                plan.chunk_count()
            );
        }
        Ok(plan.chunk_count())
    }
}
