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

//! Errors raised by graphics devices while baking.
//!
//! [`ResourceError`] covers every device call that creates, binds or reads back a
//! resource. [`RenderError`] is what a scene renderer hands back to the baker.

use crate::renderer::api::ShaderProgramId;
use std::fmt;

/// A hemisphere program failed to build or could not be resolved.
#[derive(Debug)]
pub enum ShaderError {
    /// The WGSL source was rejected by the backend.
    CompilationError {
        /// Label of the program being built.
        label: String,
        /// Diagnostics reported by the backend.
        details: String,
    },
    /// A draw referenced a program the device does not own.
    NotFound {
        /// The unknown program.
        id: ShaderProgramId,
    },
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::CompilationError { label, details } => {
                write!(f, "Shader compilation failed for '{label}': {details}")
            }
            ShaderError::NotFound { id } => write!(f, "No shader program with ID {id:?}"),
        }
    }
}

impl std::error::Error for ShaderError {}

/// A device call on a texture, buffer, framebuffer or program failed.
#[derive(Debug)]
pub enum ResourceError {
    /// Building or resolving a program failed.
    Shader(ShaderError),
    /// The ID does not name a live resource.
    NotFound,
    /// The resource exists but cannot be used this way.
    InvalidHandle,
    /// The attachments of a framebuffer cannot be rendered to together.
    IncompleteFramebuffer {
        /// Label of the framebuffer.
        label: String,
        /// What is wrong with the attachments.
        reason: String,
    },
    /// A readback buffer could not be mapped.
    MapFailed(String),
    /// Backend specific failure.
    BackendError(String),
    /// A region or byte range falls outside the resource.
    OutOfBounds,
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::Shader(err) => write!(f, "Shader resource error: {err}"),
            ResourceError::NotFound => f.write_str("No resource with this ID."),
            ResourceError::InvalidHandle => f.write_str("Resource cannot be used here."),
            ResourceError::IncompleteFramebuffer { label, reason } => {
                write!(f, "Framebuffer '{label}' is incomplete: {reason}")
            }
            ResourceError::MapFailed(msg) => write!(f, "Failed to map buffer: {msg}"),
            ResourceError::BackendError(msg) => write!(f, "Backend error: {msg}"),
            ResourceError::OutOfBounds => f.write_str("Resource access out of bounds."),
        }
    }
}

impl std::error::Error for ResourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        if let ResourceError::Shader(err) = self {
            Some(err)
        } else {
            None
        }
    }
}

impl From<ShaderError> for ResourceError {
    fn from(err: ShaderError) -> Self {
        ResourceError::Shader(err)
    }
}

/// An error raised while rendering the scene into a hemicube face.
#[derive(Debug)]
pub enum RenderError {
    /// The renderer could not draw the face.
    RenderingFailed(String),
    /// A device call made by the renderer failed.
    ResourceError(ResourceError),
    /// The graphics device is gone.
    DeviceLost,
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::RenderingFailed(msg) => write!(f, "Rendering failed: {msg}"),
            RenderError::ResourceError(err) => {
                write!(f, "Graphics resource operation failed: {err}")
            }
            RenderError::DeviceLost => f.write_str("The graphics device was lost."),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::ResourceError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ResourceError> for RenderError {
    fn from(err: ResourceError) -> Self {
        RenderError::ResourceError(err)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn compilation_errors_name_the_program() {
        let err = ShaderError::CompilationError {
            label: "hemisphere_first_pass".to_string(),
            details: "unknown identifier 'weights'".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Shader compilation failed for 'hemisphere_first_pass': unknown identifier 'weights'"
        );
    }

    #[test]
    fn shader_errors_are_the_source_of_resource_errors() {
        let err: ResourceError = ShaderError::NotFound {
            id: ShaderProgramId(42),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Shader resource error: No shader program with ID ShaderProgramId(42)"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn incomplete_framebuffer_reports_the_reason() {
        let err = ResourceError::IncompleteFramebuffer {
            label: "hemisphere_fb_a".to_string(),
            reason: "depth is 8x8, color is 16x16".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Framebuffer 'hemisphere_fb_a' is incomplete: depth is 8x8, color is 16x16"
        );
        assert!(err.source().is_none());
    }

    #[test]
    fn render_errors_wrap_map_failures() {
        let err: RenderError = ResourceError::MapFailed("device lost".into()).into();
        assert_eq!(
            err.to_string(),
            "Graphics resource operation failed: Failed to map buffer: device lost"
        );
        assert!(err.source().is_some());
    }
}
