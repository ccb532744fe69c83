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

//! Defines render target groupings.

use super::texture::TextureId;
use std::borrow::Cow;

/// A descriptor grouping a color texture and an optional depth texture into
/// one render target.
#[derive(Debug, Clone)]
pub struct FramebufferDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The color attachment. Must be created with `RENDER_ATTACHMENT` usage.
    pub color: TextureId,
    /// The depth attachment, same size as `color`.
    pub depth: Option<TextureId>,
}

/// An opaque handle to a framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FramebufferId(pub usize);
