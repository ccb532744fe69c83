// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Borrowed, typed views over caller-owned mesh arrays.
//!
//! The baker never copies geometry. A [`MeshView`] is validated once when it
//! is built, after which every element read is in bounds.

use super::error::GeometryError;
use crate::math::{Vec2, Vec3};

/// The scalar type of one component of a vertex or index stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// Unsigned 8-bit integer.
    U8,
    /// Unsigned 16-bit integer.
    U16,
    /// Unsigned 32-bit integer.
    U32,
    /// 32-bit float.
    F32,
}

impl ElementType {
    /// Size of one component in bytes.
    pub const fn size(self) -> usize {
        match self {
            ElementType::U8 => 1,
            ElementType::U16 => 2,
            ElementType::U32 | ElementType::F32 => 4,
        }
    }

    /// Reads a component at `offset` and converts it to `f32` without scaling.
    fn read_raw(self, bytes: &[u8], offset: usize) -> f32 {
        let end = offset + self.size();
        match self {
            ElementType::U8 => bytes[offset] as f32,
            ElementType::U16 => bytemuck::pod_read_unaligned::<u16>(&bytes[offset..end]) as f32,
            ElementType::U32 => bytemuck::pod_read_unaligned::<u32>(&bytes[offset..end]) as f32,
            ElementType::F32 => bytemuck::pod_read_unaligned::<f32>(&bytes[offset..end]),
        }
    }

    /// Reads a component, mapping integer types onto `[0, 1]`.
    fn read_normalized(self, bytes: &[u8], offset: usize) -> f32 {
        let raw = self.read_raw(bytes, offset);
        match self {
            ElementType::U8 => raw / u8::MAX as f32,
            ElementType::U16 => raw / u16::MAX as f32,
            ElementType::U32 => raw / u32::MAX as f32,
            ElementType::F32 => raw,
        }
    }

    fn read_index(self, bytes: &[u8], offset: usize) -> usize {
        let end = offset + self.size();
        match self {
            ElementType::U8 => bytes[offset] as usize,
            ElementType::U16 => bytemuck::pod_read_unaligned::<u16>(&bytes[offset..end]) as usize,
            ElementType::U32 | ElementType::F32 => {
                bytemuck::pod_read_unaligned::<u32>(&bytes[offset..end]) as usize
            }
        }
    }
}

/// A strided stream of vertex attributes.
#[derive(Debug, Clone, Copy)]
pub struct VertexStream<'a> {
    /// The raw bytes, starting at the first element.
    pub data: &'a [u8],
    /// The component type.
    pub element: ElementType,
    /// Distance between consecutive elements in bytes. `0` means tightly packed.
    pub stride: usize,
}

impl<'a> VertexStream<'a> {
    /// Creates a stream over `data`.
    pub fn new(data: &'a [u8], element: ElementType, stride: usize) -> Self {
        Self {
            data,
            element,
            stride,
        }
    }

    /// A tightly packed `f32` stream.
    pub fn from_f32(data: &'a [f32]) -> Self {
        Self::new(bytemuck::cast_slice(data), ElementType::F32, 0)
    }

    fn stride_for(&self, components: usize) -> usize {
        if self.stride == 0 {
            components * self.element.size()
        } else {
            self.stride
        }
    }

    fn fits(&self, index: usize, components: usize) -> bool {
        index
            .checked_mul(self.stride_for(components))
            .and_then(|start| start.checked_add(components * self.element.size()))
            .is_some_and(|end| end <= self.data.len())
    }
}

/// A stream of triangle indices.
#[derive(Debug, Clone, Copy)]
pub struct IndexStream<'a> {
    /// The raw, tightly packed index bytes.
    pub data: &'a [u8],
    /// The index type. Must be an integer type.
    pub element: ElementType,
}

impl<'a> IndexStream<'a> {
    /// Creates an index stream over `data`.
    pub fn new(data: &'a [u8], element: ElementType) -> Self {
        Self { data, element }
    }

    /// A `u32` index stream.
    pub fn from_u32(data: &'a [u32]) -> Self {
        Self::new(bytemuck::cast_slice(data), ElementType::U32)
    }

    fn get(&self, i: usize) -> usize {
        self.element.read_index(self.data, i * self.element.size())
    }
}

/// A validated view over a triangle list.
#[derive(Debug, Clone, Copy)]
pub struct MeshView<'a> {
    positions: VertexStream<'a>,
    lightmap_uvs: VertexStream<'a>,
    indices: Option<IndexStream<'a>>,
    count: usize,
}

impl<'a> MeshView<'a> {
    /// Builds and validates a view.
    ///
    /// `count` is the number of indices, or of vertices when `indices` is
    /// `None`. Positions have three components and lightmap UVs two.
    pub fn new(
        positions: VertexStream<'a>,
        lightmap_uvs: VertexStream<'a>,
        indices: Option<IndexStream<'a>>,
        count: usize,
    ) -> Result<Self, GeometryError> {
        if count % 3 != 0 {
            return Err(GeometryError::IncompleteTriangle { count });
        }
        let view = Self {
            positions,
            lightmap_uvs,
            indices,
            count,
        };
        let mut vertex_count = count;
        if let Some(indices) = &view.indices {
            if indices.element == ElementType::F32 {
                return Err(GeometryError::InvalidIndexType);
            }
            if count * indices.element.size() > indices.data.len() {
                return Err(GeometryError::ElementOutOfBounds {
                    stream: "index",
                    index: indices.data.len() / indices.element.size(),
                });
            }
            vertex_count = (0..count).map(|i| indices.get(i) + 1).max().unwrap_or(0);
        }
        if vertex_count > 0 {
            let last = vertex_count - 1;
            if !view.positions.fits(last, 3) {
                return Err(GeometryError::ElementOutOfBounds {
                    stream: "position",
                    index: last,
                });
            }
            if !view.lightmap_uvs.fits(last, 2) {
                return Err(GeometryError::ElementOutOfBounds {
                    stream: "lightmap uv",
                    index: last,
                });
            }
        }
        Ok(view)
    }

    /// Number of indices (or vertices for non-indexed meshes).
    pub fn count(&self) -> usize {
        self.count
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.count / 3
    }

    /// The vertex referenced by element `i` of the triangle list.
    pub fn vertex_index(&self, i: usize) -> usize {
        match &self.indices {
            Some(indices) => indices.get(i),
            None => i,
        }
    }

    /// Object-space position of a vertex.
    pub fn position(&self, vertex: usize) -> Vec3 {
        let stream = &self.positions;
        let base = vertex * stream.stride_for(3);
        let size = stream.element.size();
        Vec3::new(
            stream.element.read_raw(stream.data, base),
            stream.element.read_raw(stream.data, base + size),
            stream.element.read_raw(stream.data, base + 2 * size),
        )
    }

    /// Lightmap UV of a vertex, in `[0, 1]` for integer streams.
    pub fn lightmap_uv(&self, vertex: usize) -> Vec2 {
        let stream = &self.lightmap_uvs;
        let base = vertex * stream.stride_for(2);
        let size = stream.element.size();
        Vec2::new(
            stream.element.read_normalized(stream.data, base),
            stream.element.read_normalized(stream.data, base + size),
        )
    }
}
