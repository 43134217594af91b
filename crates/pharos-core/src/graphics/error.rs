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

//! Error types for the presentation path.

use std::fmt;

/// An error raised while presenting a frame.
///
/// `Lost` and `Outdated` are recoverable by rebuilding the swapchain;
/// `Timeout` skips a frame; `OutOfMemory` is fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresentError {
    /// The swapchain no longer matches the surface and must be rebuilt.
    Outdated,
    /// The surface was lost and the swapchain must be rebuilt.
    Lost,
    /// Acquiring the next presentation texture timed out.
    Timeout,
    /// The backend could not allocate the presentation texture.
    OutOfMemory,
    /// Any other backend-reported failure.
    Backend(String),
}

impl fmt::Display for PresentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresentError::Outdated => {
                write!(f, "Swapchain is outdated and must be reconfigured")
            }
            PresentError::Lost => write!(f, "Presentation surface was lost"),
            PresentError::Timeout => {
                write!(f, "Timed out acquiring the next presentation texture")
            }
            PresentError::OutOfMemory => {
                write!(f, "Out of memory acquiring the next presentation texture")
            }
            PresentError::Backend(details) => {
                write!(f, "Presentation backend error: {details}")
            }
        }
    }
}

impl std::error::Error for PresentError {}
