// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scene-specific system prompt templates.
//!
//! A scene is a named system-prompt variant selected by the mapped intent
//! category. Template text mirrors the production prompts; the service
//! operates in Chinese. `{current_date}` is substituted at assembly time.

use helpline_core::Intent;

/// Named system-prompt variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scene {
    Default,
    Complaint,
    AfterSales,
    Chitchat,
}

impl Scene {
    /// Storage/display name of the scene.
    pub fn as_str(&self) -> &'static str {
        match self {
            Scene::Default => "default",
            Scene::Complaint => "complaint",
            Scene::AfterSales => "after_sales",
            Scene::Chitchat => "chitchat",
        }
    }

    /// The raw template for this scene, with `{current_date}` unexpanded.
    pub fn template(&self) -> &'static str {
        match self {
            Scene::Default => DEFAULT_TEMPLATE,
            Scene::Complaint => COMPLAINT_TEMPLATE,
            Scene::AfterSales => AFTER_SALES_TEMPLATE,
            Scene::Chitchat => CHITCHAT_TEMPLATE,
        }
    }
}

/// Map an intent category to its scene. Unmapped categories fall back to
/// the default scene.
pub fn scene_for_intent(intent: Intent) -> Scene {
    match intent {
        Intent::Complaint => Scene::Complaint,
        Intent::AfterSales => Scene::AfterSales,
        Intent::Chitchat => Scene::Chitchat,
        Intent::Inquiry | Intent::Escalate | Intent::Unknown => Scene::Default,
    }
}

const DEFAULT_TEMPLATE: &str = "你是一个专业、友善的智能客服助手。

职责：
- 准确回答用户关于产品和服务的问题
- 耐心处理用户的咨询和投诉
- 在知识库中找到相关信息后，给出准确、简洁的回答
- 遇到无法解决的复杂问题，及时引导用户联系人工客服

回答原则：
1. 语言简洁清晰，避免过度专业术语
2. 对用户的情绪表示理解和共情
3. 如果知识库中没有相关信息，诚实告知而不要编造
4. 回答长度适中，重要信息用列表或分段展示

当前日期：{current_date}";

const COMPLAINT_TEMPLATE: &str = "你是一个专业的投诉处理专员，具有高度的同理心。

处理投诉时：
1. 首先真诚道歉并表示理解用户的感受
2. 认真倾听并确认问题的具体情况
3. 给出明确的解决方案或处理时间承诺
4. 如果需要，提供补偿方案
5. 确保用户感到被重视和尊重

不要：
- 推卸责任或找借口
- 使用冷漠或机械的回复
- 做出无法兑现的承诺

当前日期：{current_date}";

const AFTER_SALES_TEMPLATE: &str = "你是一名专业的售后服务顾问。

你的主要职责：
- 帮助用户处理退换货申请
- 解答产品使用问题
- 协助处理物流和配送问题
- 提供保修政策说明

请根据公司政策给出准确的售后指引，遇到需要人工审核的情况，
请引导用户提交相关凭证并说明处理时效。

当前日期：{current_date}";

const CHITCHAT_TEMPLATE: &str = "你是一个友好的对话助手，可以进行轻松的日常交流。
请保持对话自然、温暖，同时适时引导用户回到业务话题。
当前日期：{current_date}";
