// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! System-prompt assembly.
//!
//! Pure functions of their inputs: given the same scene, documents, and
//! date, assembly produces byte-identical output. No I/O, no caching.

use chrono::NaiveDate;

use helpline_core::RetrievedDocument;

use crate::scenes::Scene;

/// Template for the knowledge-base context block appended below the scene
/// prompt when retrieval produced documents.
const RAG_CONTEXT_TEMPLATE: &str = "以下是从知识库中检索到的相关信息，请优先参考这些内容来回答用户问题：

---知识库内容开始---
{context}
---知识库内容结束---

重要提示：
- 如果知识库内容与问题相关，请基于知识库内容回答
- 如果知识库内容不足以回答问题，请诚实告知
- 不要凭空捏造知识库中没有的信息";

/// Prompt sent to the LLM fallback stage of the intent classifier.
const INTENT_CLASSIFICATION_TEMPLATE: &str = "请分析以下用户消息，判断其意图类别。

用户消息：\"{user_message}\"

请从以下类别中选择最合适的一个，并给出置信度（0.0-1.0）：
- chitchat: 闲聊、问候、无关业务的话题
- inquiry: 产品咨询、功能询问、价格查询、政策了解
- complaint: 投诉、不满、批评、差评
- after_sales: 退换货、维修、物流查询、售后问题
- escalate: 明确要求人工客服、紧急问题
- unknown: 无法判断

请严格按照以下 JSON 格式回复，不要包含其他内容：
{\"intent\": \"<类别>\", \"confidence\": <0.0-1.0>, \"reason\": \"<简短理由>\"}";

/// Prompt for generating a short conversation summary.
const CONVERSATION_SUMMARY_TEMPLATE: &str = "请对以下对话内容生成一个简洁的摘要（50字以内），
描述本次对话的主要话题和结果。

对话记录：
{conversation_history}

摘要：";

/// Render the scene template with the given date.
pub fn scene_prompt(scene: Scene, current_date: NaiveDate) -> String {
    scene
        .template()
        .replace("{current_date}", &format_date(current_date))
}

/// Build the complete system prompt: scene template plus, when documents
/// were retrieved, the delimited knowledge-base context block.
pub fn build_system_prompt(
    scene: Scene,
    documents: &[RetrievedDocument],
    current_date: NaiveDate,
) -> String {
    let base = scene_prompt(scene, current_date);
    if documents.is_empty() {
        return base;
    }

    let context = documents
        .iter()
        .enumerate()
        .map(|(i, doc)| format!("[{}] 来源: {}\n{}", i + 1, doc.source, doc.content))
        .collect::<Vec<_>>()
        .join("\n\n");

    let rag_section = RAG_CONTEXT_TEMPLATE.replace("{context}", &context);
    format!("{base}\n\n{rag_section}")
}

/// Build the intent-classification prompt for a user message.
pub fn build_intent_prompt(user_message: &str) -> String {
    INTENT_CLASSIFICATION_TEMPLATE.replace("{user_message}", user_message)
}

/// Build the conversation-summary prompt from formatted history text.
pub fn build_summary_prompt(conversation_history: &str) -> String {
    CONVERSATION_SUMMARY_TEMPLATE.replace("{conversation_history}", conversation_history)
}

/// Dates render in the product's locale form, e.g. `2026年08月06日`.
fn format_date(date: NaiveDate) -> String {
    date.format("%Y年%m月%d日").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(source: &str, content: &str, score: f64) -> RetrievedDocument {
        RetrievedDocument {
            id: format!("doc-{source}"),
            content: content.to_string(),
            source: source.to_string(),
            score,
            metadata: json!({}),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 6).unwrap()
    }

    #[test]
    fn assembly_is_deterministic() {
        let docs = vec![doc("manual.pdf", "退款流程：进入订单页面点击申请退款。", 0.85)];
        let a = build_system_prompt(Scene::AfterSales, &docs, date());
        let b = build_system_prompt(Scene::AfterSales, &docs, date());
        assert_eq!(a, b);
    }

    #[test]
    fn date_is_substituted() {
        let prompt = build_system_prompt(Scene::Default, &[], date());
        assert!(prompt.contains("2026年08月06日"));
        assert!(!prompt.contains("{current_date}"));
    }

    #[test]
    fn no_documents_yields_bare_scene_prompt() {
        let prompt = build_system_prompt(Scene::Complaint, &[], date());
        assert!(!prompt.contains("知识库内容开始"));
        assert!(prompt.contains("投诉处理专员"));
    }

    #[test]
    fn documents_appended_in_order_with_sources() {
        let docs = vec![
            doc("faq.md", "七天无理由退货。", 0.9),
            doc("policy.md", "保修期为一年。", 0.8),
        ];
        let prompt = build_system_prompt(Scene::Default, &docs, date());
        assert!(prompt.contains("---知识库内容开始---"));
        assert!(prompt.contains("[1] 来源: faq.md"));
        assert!(prompt.contains("[2] 来源: policy.md"));
        let first = prompt.find("faq.md").unwrap();
        let second = prompt.find("policy.md").unwrap();
        assert!(first < second);
    }

    #[test]
    fn context_block_instructs_honesty() {
        let docs = vec![doc("faq.md", "内容", 0.9)];
        let prompt = build_system_prompt(Scene::Default, &docs, date());
        assert!(prompt.contains("诚实告知"));
        assert!(prompt.contains("不要凭空捏造"));
    }

    #[test]
    fn intent_prompt_names_all_categories() {
        let prompt = build_intent_prompt("我想了解价格");
        for category in [
            "chitchat",
            "inquiry",
            "complaint",
            "after_sales",
            "escalate",
            "unknown",
        ] {
            assert!(prompt.contains(category), "missing {category}");
        }
        assert!(prompt.contains("我想了解价格"));
    }

    #[test]
    fn summary_prompt_embeds_history() {
        let prompt = build_summary_prompt("用户: 请问如何退款？\n客服: 您可以在订单页面申请退款。");
        assert!(prompt.contains("请问如何退款"));
        assert!(prompt.contains("摘要"));
    }
}
