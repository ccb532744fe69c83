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

use crate::math::{Extent2D, LinearRgba, Viewport};
use crate::renderer::api::*;
use crate::renderer::error::ResourceError;
use std::any::Any;
use std::fmt::Debug;

/// The narrow GPU contract consumed by the lightmap baker.
///
/// Implementations own every resource they hand out and address them through
/// opaque ids. Commands are executed in submission order; `read_pixels_async`
/// may complete later, but `map_buffer_read` always observes the last readback
/// issued into the buffer.
pub trait GraphicsDevice: Send + Sync + Debug + 'static {
    /// Creates a new 2D texture.
    /// ## Arguments
    /// * `descriptor` - The size, format and usage of the texture.
    /// ## Returns
    /// A `Result` containing the ID of the created texture.
    /// ## Errors
    /// * `ResourceError` - If the backend fails to allocate the texture.
    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<TextureId, ResourceError>;

    /// Destroys a texture.
    /// ## Arguments
    /// * `id` - The ID of the texture to be destroyed.
    /// ## Errors
    /// * `ResourceError::NotFound` - If the ID does not name a live texture.
    fn destroy_texture(&self, id: TextureId) -> Result<(), ResourceError>;

    /// Uploads tightly or row-padded pixel data to a texture, starting at its origin.
    /// ## Arguments
    /// * `id` - The destination texture.
    /// * `data` - The pixel bytes.
    /// * `bytes_per_row` - The stride between rows in `data`.
    /// * `size` - The region written.
    /// ## Errors
    /// * `ResourceError::OutOfBounds` - If `size` exceeds the texture or `data` is too short.
    fn write_texture(
        &self,
        id: TextureId,
        data: &[u8],
        bytes_per_row: u32,
        size: Extent2D,
    ) -> Result<(), ResourceError>;

    /// Creates a framebuffer from existing textures.
    /// ## Arguments
    /// * `descriptor` - The color attachment and optional depth attachment.
    /// ## Returns
    /// A `Result` containing the ID of the framebuffer.
    /// ## Errors
    /// * `ResourceError::IncompleteFramebuffer` - If the attachments have mismatched
    ///   sizes, wrong formats or lack `RENDER_ATTACHMENT` usage.
    fn create_framebuffer(
        &self,
        descriptor: &FramebufferDescriptor,
    ) -> Result<FramebufferId, ResourceError>;

    /// Destroys a framebuffer. The attached textures are not destroyed.
    fn destroy_framebuffer(&self, id: FramebufferId) -> Result<(), ResourceError>;

    /// Compiles a fullscreen shader program.
    /// ## Arguments
    /// * `descriptor` - The WGSL source, entry points and bindings of the program.
    /// ## Returns
    /// A `Result` containing the ID of the program.
    /// ## Errors
    /// * `ResourceError::Shader` - If the source fails to compile or link.
    fn create_shader_program(
        &self,
        descriptor: &ShaderProgramDescriptor,
    ) -> Result<ShaderProgramId, ResourceError>;

    /// Destroys a shader program.
    fn destroy_shader_program(&self, id: ShaderProgramId) -> Result<(), ResourceError>;

    /// Creates a new GPU buffer.
    /// ## Arguments
    /// * `descriptor` - A reference to a `BufferDescriptor` containing the buffer configuration.
    /// ## Returns
    /// A `Result` containing the ID of the created buffer or an error if the creation fails.
    fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<BufferId, ResourceError>;

    /// Destroys a GPU buffer.
    fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError>;

    /// Clears the color attachment of a framebuffer to `color` and its depth
    /// attachment, if any, to the far plane.
    fn clear_framebuffer(&self, id: FramebufferId, color: LinearRgba)
        -> Result<(), ResourceError>;

    /// Runs a fullscreen program over `draw.viewport` of `draw.target`.
    ///
    /// Fragment positions are absolute framebuffer pixel coordinates, so a
    /// program reading `2 * position` from its input addresses the input's
    /// top-left region.
    /// ## Errors
    /// * `ResourceError::NotFound` - If the program, target or an input is unknown.
    fn draw_fullscreen(&self, draw: &FullscreenDraw) -> Result<(), ResourceError>;

    /// Copies `region` of the color attachment of `source` to the same region
    /// of the color attachment of `destination`.
    fn copy_framebuffer(
        &self,
        source: FramebufferId,
        destination: FramebufferId,
        region: Viewport,
    ) -> Result<(), ResourceError>;

    /// Enqueues a readback of `region` of the color attachment of `source`
    /// into `destination`. Rows are tightly packed when mapped.
    /// ## Errors
    /// * `ResourceError::OutOfBounds` - If the region does not fit the buffer.
    fn read_pixels_async(
        &self,
        source: FramebufferId,
        region: Viewport,
        destination: BufferId,
    ) -> Result<(), ResourceError>;

    /// Maps the last readback of a buffer and hands its bytes to `reader`.
    ///
    /// Blocks until the readback is complete. The mapping is released when
    /// `reader` returns.
    /// ## Errors
    /// * `ResourceError::MapFailed` - If the buffer could not be mapped.
    fn map_buffer_read(
        &self,
        id: BufferId,
        reader: &mut dyn FnMut(&[u8]),
    ) -> Result<(), ResourceError>;

    /// Gives access to the concrete backend, so scene renderers can reach
    /// the native objects behind the ids they are handed.
    fn as_any(&self) -> &dyn Any;
}
