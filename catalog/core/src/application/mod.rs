// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod cache;
pub mod catalog_service;
pub mod write_status;

pub use cache::{Clock, CollectionSnapshot, ManualClock, SnapshotCache, SystemClock};
pub use catalog_service::CatalogService;
pub use write_status::{CatalogView, WriteReport, WriteState};
