// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Fill triangulation for panel polygons.
//!
//! The painter only fills convex paths correctly, so arbitrary panel rings are
//! tessellated once at load time and drawn as meshes.

use lyon_tessellation::math::point;
use lyon_tessellation::path::Path;
use lyon_tessellation::{BuffersBuilder, FillOptions, FillTessellator, FillVertex, VertexBuffers};

use crate::geometry::Point;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Triangulation {
    pub vertices: Vec<Point>,
    /// Triangle list, three indices per triangle.
    pub indices: Vec<u32>,
}

impl Triangulation {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Tessellate a ring (implicitly closed). Returns `None` for rings with fewer
/// than three vertices or when tessellation fails.
pub fn fill_polygon(ring: &[Point]) -> Option<Triangulation> {
    if ring.len() < 3 {
        return None;
    }

    let mut builder = Path::builder();
    builder.begin(point(ring[0].x as f32, ring[0].y as f32));
    for p in &ring[1..] {
        builder.line_to(point(p.x as f32, p.y as f32));
    }
    builder.end(true);
    let path = builder.build();

    let mut buffers: VertexBuffers<Point, u32> = VertexBuffers::new();
    let mut tessellator = FillTessellator::new();
    let result = tessellator.tessellate_path(
        &path,
        &FillOptions::default(),
        &mut BuffersBuilder::new(&mut buffers, |vertex: FillVertex| {
            let p = vertex.position();
            Point::new(p.x as f64, p.y as f64)
        }),
    );

    if let Err(e) = result {
        log::warn!("[WARN] Panel tessellation failed: {e:?}");
        return None;
    }
    if buffers.indices.is_empty() {
        return None;
    }

    Some(Triangulation {
        vertices: buffers.vertices,
        indices: buffers.indices,
    })
}
