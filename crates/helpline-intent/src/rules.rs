// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword rule table for the fast classification stage.
//!
//! The table is an ordered array, not a map: when two categories tie on
//! hit count, the first category in table order wins. That tie-break is a
//! defined, stable behavior that downstream callers rely on.

use helpline_core::Intent;

/// Category keyword lists, in evaluation order.
pub const RULE_PATTERNS: &[(Intent, &[&str])] = &[
    (
        Intent::Escalate,
        &[
            "人工",
            "转人工",
            "人工客服",
            "真人",
            "人工服务",
            "call center",
            "电话客服",
            "要投诉你们",
        ],
    ),
    (
        Intent::Complaint,
        &[
            "投诉",
            "举报",
            "太差了",
            "太烂了",
            "骗人",
            "诈骗",
            "气死了",
            "太坑了",
            "垃圾",
            "要退款",
            "维权",
            "不满意",
            "很失望",
            "失望透顶",
        ],
    ),
    (
        Intent::AfterSales,
        &[
            "退款",
            "退货",
            "换货",
            "维修",
            "售后",
            "保修",
            "快递",
            "物流",
            "发货",
            "包裹",
            "签收",
            "破损",
            "坏了",
            "不好用",
            "无法使用",
            "故障",
        ],
    ),
    (
        Intent::Inquiry,
        &[
            "怎么",
            "如何",
            "可以",
            "能不能",
            "多少钱",
            "价格",
            "费用",
            "什么时候",
            "在哪",
            "怎样",
            "咨询",
            "了解",
            "介绍",
            "是否",
            "支持",
            "功能",
        ],
    ),
    (
        Intent::Chitchat,
        &[
            "你好",
            "hi",
            "hello",
            "在吗",
            "谢谢",
            "感谢",
            "再见",
            "拜拜",
            "bye",
            "哈哈",
            "哦哦",
            "好的",
            "知道了",
            "明白了",
        ],
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_order_is_fixed() {
        let order: Vec<Intent> = RULE_PATTERNS.iter().map(|(intent, _)| *intent).collect();
        assert_eq!(
            order,
            vec![
                Intent::Escalate,
                Intent::Complaint,
                Intent::AfterSales,
                Intent::Inquiry,
                Intent::Chitchat,
            ]
        );
    }

    #[test]
    fn every_category_has_keywords() {
        for (intent, keywords) in RULE_PATTERNS {
            assert!(!keywords.is_empty(), "{intent:?} has no keywords");
        }
    }

    #[test]
    fn keywords_are_lowercase() {
        // Matching lowercases the input once; keywords must already be
        // lowercase for the substring check to hit.
        for (_, keywords) in RULE_PATTERNS {
            for kw in *keywords {
                assert_eq!(*kw, kw.to_lowercase());
            }
        }
    }
}
