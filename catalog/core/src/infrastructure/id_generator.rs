// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

use crate::domain::agent::AgentId;

/// Issues record ids from the wall clock in milliseconds, bumped so that no
/// two ids from the same generator are ever equal, even within one
/// millisecond or across a clock step backwards.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicI64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> AgentId {
        let now = Utc::now().timestamp_millis();
        let mut prev = self.last.load(Ordering::SeqCst);
        loop {
            let candidate = now.max(prev + 1);
            match self
                .last
                .compare_exchange(prev, candidate, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return AgentId::new(candidate.to_string()),
                Err(actual) => prev = actual,
            }
        }
    }
}
