// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Built-in catalog served when the remote file cannot be read.

use crate::domain::agent::{AgentId, AgentRecord, AgentStatus};

fn entry(
    id: &str,
    name: &str,
    description: &str,
    category: &str,
    status: AgentStatus,
    user_page_url: &str,
    admin_page_url: Option<&str>,
) -> AgentRecord {
    AgentRecord {
        id: AgentId::from(id),
        name: name.to_string(),
        description: description.to_string(),
        category: category.to_string(),
        status,
        user_page_url: user_page_url.to_string(),
        admin_page_url: admin_page_url.map(str::to_string),
    }
}

pub fn seed_collection() -> Vec<AgentRecord> {
    vec![
        entry(
            "1",
            "GPT 고객센터",
            "GPT 고객지원 시스템",
            "고객센터",
            AgentStatus::Applied,
            "https://support.gptko.co.kr",
            Some("https://admin.gptko.co.kr"),
        ),
        entry(
            "2",
            "파트너 포털",
            "파트너사 전용 관리 시스템",
            "파트너사",
            AgentStatus::UnderReview,
            "https://partner.gptko.co.kr",
            Some("https://partner-admin.gptko.co.kr"),
        ),
        entry(
            "3",
            "내부 시스템",
            "직원 전용 내부 관리 도구",
            "내부시스템",
            AgentStatus::Applied,
            "https://internal.gptko.co.kr",
            None,
        ),
    ]
}
