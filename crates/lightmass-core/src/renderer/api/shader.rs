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

//! Defines fullscreen shader programs and their draw submissions.

use super::framebuffer::FramebufferId;
use super::texture::{TextureFormat, TextureId};
use crate::math::Viewport;
use std::borrow::Cow;

/// The source code of a shader program.
#[derive(Debug, Clone)]
pub enum ShaderSourceData<'a> {
    /// WGSL source text.
    Wgsl(Cow<'a, str>),
}

/// The fixed operation a fullscreen program performs.
///
/// Backends that execute shader source ignore this tag; the software device
/// dispatches on it instead of compiling WGSL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FullscreenKernel {
    /// Reads 3x2 hemicube texel groups from input 0, multiplies them by the
    /// weights of input 1 and writes one texel per group (a 6x2 reduction per
    /// output texel, four quadrant samples at x offsets 0, 2 and 4).
    WeightedDownsample,
    /// Sums the 2x2 block of input 0 under each output texel.
    BoxDownsample,
}

/// A descriptor for a fullscreen vertex + fragment program.
#[derive(Debug, Clone)]
pub struct ShaderProgramDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<&'a str>,
    /// The program source.
    pub source: ShaderSourceData<'a>,
    /// The vertex entry point.
    pub vertex_entry_point: &'a str,
    /// The fragment entry point.
    pub fragment_entry_point: &'a str,
    /// Number of sampled textures bound at group 0, bindings `0..input_count`.
    pub input_count: u32,
    /// The color format the program writes.
    pub target_format: TextureFormat,
    /// The operation implemented by the program.
    pub kernel: FullscreenKernel,
}

/// An opaque handle to a shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderProgramId(pub usize);

/// A fullscreen draw of `program` into `viewport` of `target`.
#[derive(Debug, Clone)]
pub struct FullscreenDraw<'a> {
    /// The program to run.
    pub program: ShaderProgramId,
    /// The framebuffer receiving the output. Only its color attachment is written.
    pub target: FramebufferId,
    /// The covered region of the target.
    pub viewport: Viewport,
    /// Textures bound in order to the program inputs.
    pub inputs: &'a [TextureId],
}
