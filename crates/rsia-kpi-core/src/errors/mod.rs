// SPDX-License-Identifier: Apache-2.0

mod context;

pub use context::{ErrorContext, ResultExt};
