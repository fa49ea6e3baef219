// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Two-stage intent classifier.
//!
//! Stage 1 counts keyword hits against the fixed rule table -- fast, no
//! LLM call. Stage 2 (optional) asks the LLM to classify and parses a JSON
//! object out of its reply. Classification never fails a turn: every
//! failure path resolves to a low-confidence [`IntentResult`] instead of
//! an error.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, error, warn};

use helpline_core::{
    CacheStore, ChatMessage, ClassifyMethod, CompletionProvider, Intent, IntentResult,
};
use helpline_prompt::build_intent_prompt;

use crate::rules::RULE_PATTERNS;

/// Extracts the first brace-delimited JSON object from an LLM reply that
/// may be wrapped in prose.
static JSON_OBJECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^{}]+\}").expect("valid regex"));

/// Outcome of parsing the LLM stage's reply. The fallback construction is
/// an explicit branch on this value, not exception-driven control flow.
#[derive(Debug)]
pub enum ParseOutcome {
    /// A JSON object was found and deserialized.
    Parsed(IntentResult),
    /// No parseable JSON object in the reply.
    Unparseable,
}

/// JSON shape the classification prompt asks the LLM to produce.
#[derive(Debug, Deserialize)]
struct LlmIntentReply {
    #[serde(default)]
    intent: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    reason: Option<String>,
}

/// Two-stage (rule, then LLM) single-turn text classifier with caching.
pub struct IntentClassifier {
    cache: Arc<dyn CacheStore>,
    /// LLM fallback stage; `None` disables it.
    llm: Option<Arc<dyn CompletionProvider>>,
    cache_ttl: Duration,
}

impl IntentClassifier {
    pub fn new(
        cache: Arc<dyn CacheStore>,
        llm: Option<Arc<dyn CompletionProvider>>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            cache,
            llm,
            cache_ttl,
        }
    }

    /// Classify one user message.
    ///
    /// Never returns an error; malformed input, cache failures, LLM
    /// failures, and unparseable replies all resolve to low-confidence
    /// results.
    pub async fn classify(&self, text: &str, use_cache: bool) -> IntentResult {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return IntentResult::new(Intent::Unknown, 0.0, "空消息", ClassifyMethod::Rule);
        }

        let cache_key = format!("intent:{}", text_hash(trimmed));
        if use_cache
            && let Some(cached) = self.cache_lookup(&cache_key).await
        {
            debug!(intent = cached.intent.as_str(), "intent cache hit");
            return cached;
        }

        if let Some(result) = rule_match(text) {
            debug!(
                intent = result.intent.as_str(),
                confidence = result.confidence,
                "rule stage matched"
            );
            if use_cache {
                self.cache_store(&cache_key, &result).await;
            }
            return result;
        }

        if let Some(ref llm) = self.llm {
            let result = self.llm_classify(llm.as_ref(), text).await;
            debug!(
                intent = result.intent.as_str(),
                confidence = result.confidence,
                "llm stage classified"
            );
            if use_cache {
                self.cache_store(&cache_key, &result).await;
            }
            return result;
        }

        let result = IntentResult::new(Intent::Unknown, 0.3, "无法识别意图", ClassifyMethod::Rule);
        if use_cache {
            self.cache_store(&cache_key, &result).await;
        }
        result
    }

    /// LLM stage. A failed call and an unparseable reply are distinct
    /// fallbacks: call failure defaults to a medium-confidence inquiry,
    /// parse failure to a low-confidence unknown.
    async fn llm_classify(&self, llm: &dyn CompletionProvider, text: &str) -> IntentResult {
        let prompt = build_intent_prompt(text);
        let messages = [ChatMessage::user(prompt)];

        match llm.chat(&messages, None).await {
            Ok((response, _usage)) => match parse_llm_response(&response) {
                ParseOutcome::Parsed(result) => result,
                ParseOutcome::Unparseable => {
                    let head: String = response.chars().take(100).collect();
                    warn!(
                        reply_head = head.as_str(),
                        "classifier reply had no parseable JSON object"
                    );
                    IntentResult::new(Intent::Unknown, 0.3, "LLM响应解析失败", ClassifyMethod::Llm)
                }
            },
            Err(e) => {
                error!(error = %e, "classifier LLM call failed");
                IntentResult::new(
                    Intent::Inquiry,
                    0.5,
                    "LLM分类失败，默认咨询",
                    ClassifyMethod::Rule,
                )
            }
        }
    }

    /// Cache read; failures are misses.
    async fn cache_lookup(&self, key: &str) -> Option<IntentResult> {
        match self.cache.get(key).await {
            Ok(Some(json)) => serde_json::from_str(&json).ok(),
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "intent cache read failed, treating as miss");
                None
            }
        }
    }

    /// Cache write; failures are logged and ignored.
    async fn cache_store(&self, key: &str, result: &IntentResult) {
        let Ok(json) = serde_json::to_string(result) else {
            return;
        };
        if let Err(e) = self.cache.set(key, &json, self.cache_ttl).await {
            warn!(error = %e, "intent cache write failed");
        }
    }
}

/// Rule stage: count keyword occurrences per category; the first category
/// in table order with the strictly highest hit count wins. Requires at
/// least one hit.
pub fn rule_match(text: &str) -> Option<IntentResult> {
    let text_lower = text.to_lowercase();
    let mut best: Option<Intent> = None;
    let mut best_hits = 0usize;

    for (intent, keywords) in RULE_PATTERNS {
        let hits = keywords
            .iter()
            .filter(|kw| text_lower.contains(**kw))
            .count();
        if hits > best_hits {
            best_hits = hits;
            best = Some(*intent);
        }
    }

    let intent = best?;
    // More keyword hits raise confidence, capped at 0.95.
    let confidence = (0.75 + best_hits as f64 * 0.05).min(0.95);
    Some(IntentResult::new(
        intent,
        confidence,
        format!("规则匹配 {best_hits} 个关键词"),
        ClassifyMethod::Rule,
    ))
}

/// Parse the LLM stage's reply: extract the first `{...}` object, tolerant
/// of surrounding prose, and map it to an [`IntentResult`] with
/// method `llm`.
pub fn parse_llm_response(response: &str) -> ParseOutcome {
    let Some(m) = JSON_OBJECT_RE.find(response) else {
        return ParseOutcome::Unparseable;
    };
    match serde_json::from_str::<LlmIntentReply>(m.as_str()) {
        Ok(reply) => {
            let intent = reply
                .intent
                .as_deref()
                .map(Intent::from_str_value)
                .unwrap_or(Intent::Unknown);
            ParseOutcome::Parsed(IntentResult::new(
                intent,
                reply.confidence.unwrap_or(0.7),
                reply.reason.unwrap_or_default(),
                ClassifyMethod::Llm,
            ))
        }
        Err(_) => ParseOutcome::Unparseable,
    }
}

fn text_hash(trimmed: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    trimmed.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use helpline_cache::TtlCache;
    use helpline_test_utils::{FailingProvider, MockProvider};

    fn rule_only_classifier() -> IntentClassifier {
        IntentClassifier::new(Arc::new(TtlCache::new()), None, Duration::from_secs(300))
    }

    #[tokio::test]
    async fn rule_match_complaint() {
        let clf = rule_only_classifier();
        let result = clf.classify("这个产品太烂了，我要投诉！", true).await;
        assert_eq!(result.intent, Intent::Complaint);
        assert!(result.confidence >= 0.75);
        assert_eq!(result.method, ClassifyMethod::Rule);
    }

    #[tokio::test]
    async fn rule_match_after_sales() {
        let clf = rule_only_classifier();
        let result = clf.classify("我想申请退货退款", true).await;
        assert_eq!(result.intent, Intent::AfterSales);
        assert_eq!(result.method, ClassifyMethod::Rule);
    }

    #[tokio::test]
    async fn rule_match_escalate() {
        let clf = rule_only_classifier();
        let result = clf.classify("我要找人工客服", true).await;
        assert_eq!(result.intent, Intent::Escalate);
    }

    #[tokio::test]
    async fn rule_match_chitchat() {
        let clf = rule_only_classifier();
        let result = clf.classify("你好，在吗", true).await;
        assert_eq!(result.intent, Intent::Chitchat);
    }

    #[tokio::test]
    async fn empty_text_is_unknown_with_zero_confidence() {
        let clf = rule_only_classifier();
        for input in ["", "   ", "\n\t"] {
            let result = clf.classify(input, true).await;
            assert_eq!(result.intent, Intent::Unknown);
            assert_eq!(result.confidence, 0.0);
            assert_eq!(result.method, ClassifyMethod::Rule);
        }
    }

    #[test]
    fn rule_confidence_stays_within_band() {
        // One hit floors at 0.80; many hits cap at 0.95.
        let one = rule_match("查一下价格").unwrap();
        assert!(one.confidence >= 0.75 && one.confidence <= 0.95);

        let many = rule_match("投诉 举报 太差了 太烂了 骗人 诈骗 垃圾 维权 不满意").unwrap();
        assert_eq!(many.confidence, 0.95);
    }

    #[test]
    fn rule_tie_break_is_deterministic() {
        // "要投诉你们" hits escalate once; "投诉" inside it also hits
        // complaint once. Escalate comes first in table order and must win
        // every time.
        for _ in 0..10 {
            let result = rule_match("要投诉你们").unwrap();
            assert_eq!(result.intent, Intent::Escalate);
        }
    }

    #[test]
    fn rule_no_hits_returns_none() {
        assert!(rule_match("今天天气真不错").is_none());
    }

    #[test]
    fn parse_valid_llm_response() {
        let outcome = parse_llm_response(
            r#"{"intent": "inquiry", "confidence": 0.92, "reason": "用户在询问产品功能"}"#,
        );
        match outcome {
            ParseOutcome::Parsed(result) => {
                assert_eq!(result.intent, Intent::Inquiry);
                assert_eq!(result.confidence, 0.92);
                assert_eq!(result.method, ClassifyMethod::Llm);
            }
            ParseOutcome::Unparseable => panic!("expected Parsed"),
        }
    }

    #[test]
    fn parse_llm_response_with_surrounding_prose() {
        let outcome = parse_llm_response(
            "好的，我的判断是：{\"intent\": \"complaint\", \"confidence\": 0.8, \"reason\": \"负面情绪\"} 以上。",
        );
        assert!(matches!(
            outcome,
            ParseOutcome::Parsed(IntentResult {
                intent: Intent::Complaint,
                ..
            })
        ));
    }

    #[test]
    fn parse_invalid_llm_response() {
        assert!(matches!(
            parse_llm_response("无法识别的回复内容"),
            ParseOutcome::Unparseable
        ));
    }

    #[test]
    fn parse_unknown_intent_string_maps_to_unknown() {
        let outcome =
            parse_llm_response(r#"{"intent": "refund_request", "confidence": 0.9, "reason": "x"}"#);
        match outcome {
            ParseOutcome::Parsed(result) => assert_eq!(result.intent, Intent::Unknown),
            ParseOutcome::Unparseable => panic!("expected Parsed"),
        }
    }

    #[tokio::test]
    async fn llm_stage_classifies_when_rules_miss() {
        let provider = Arc::new(MockProvider::with_responses(vec![
            r#"{"intent": "inquiry", "confidence": 0.88, "reason": "产品问题"}"#.to_string(),
        ]));
        let clf = IntentClassifier::new(
            Arc::new(TtlCache::new()),
            Some(provider),
            Duration::from_secs(300),
        );
        let result = clf.classify("帮我看看这个东西", false).await;
        assert_eq!(result.intent, Intent::Inquiry);
        assert_eq!(result.method, ClassifyMethod::Llm);
    }

    #[tokio::test]
    async fn llm_call_failure_defaults_to_inquiry() {
        let clf = IntentClassifier::new(
            Arc::new(TtlCache::new()),
            Some(Arc::new(FailingProvider::new())),
            Duration::from_secs(300),
        );
        let result = clf.classify("帮我看看这个东西", false).await;
        assert_eq!(result.intent, Intent::Inquiry);
        assert_eq!(result.confidence, 0.5);
        assert_eq!(result.method, ClassifyMethod::Rule);
    }

    #[tokio::test]
    async fn llm_unparseable_reply_defaults_to_unknown() {
        let provider = Arc::new(MockProvider::with_responses(vec![
            "抱歉，我不确定。".to_string(),
        ]));
        let clf = IntentClassifier::new(
            Arc::new(TtlCache::new()),
            Some(provider),
            Duration::from_secs(300),
        );
        let result = clf.classify("帮我看看这个东西", false).await;
        assert_eq!(result.intent, Intent::Unknown);
        assert_eq!(result.confidence, 0.3);
        assert_eq!(result.method, ClassifyMethod::Llm);
    }

    #[tokio::test]
    async fn cached_result_is_reused() {
        let cache = Arc::new(TtlCache::new());
        let clf = IntentClassifier::new(cache.clone(), None, Duration::from_secs(300));
        let first = clf.classify("我要投诉", true).await;
        // Second call must come from cache and match exactly.
        let second = clf.classify("我要投诉", true).await;
        assert_eq!(first, second);
        assert!(!cache.is_empty());
    }

    #[tokio::test]
    async fn use_cache_false_skips_cache() {
        let cache = Arc::new(TtlCache::new());
        let clf = IntentClassifier::new(cache.clone(), None, Duration::from_secs(300));
        clf.classify("我要投诉", false).await;
        assert!(cache.is_empty());
    }
}
