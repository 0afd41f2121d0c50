// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Infrastructure layer: adapters behind the domain's remote store port.

pub mod content_codec;
pub mod github;
pub mod id_generator;
pub mod in_memory;

pub use github::GitHubContentsStore;
pub use id_generator::IdGenerator;
pub use in_memory::InMemoryFileStore;
