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

//! The reporting channel of a bake.

/// Receives human-readable diagnostics and progress of a bake.
///
/// Implementations must be cheap; they are called from the bake loop.
pub trait LightMassListener: Send + Sync {
    /// A diagnostic message, typically describing a failure.
    fn on_message(&self, message: &str);

    /// Overall progress in `[0, 1]`, non-decreasing over a bake.
    fn on_baking_progressing(&self, progress: f32);
}
