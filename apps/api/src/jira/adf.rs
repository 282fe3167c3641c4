//! Atlassian Document Format → plain text.
//!
//! Jira Cloud v3 returns rich-text fields as an ADF tree. Stories are classified as plain
//! text, so text nodes are concatenated and block nodes end with a newline.

use serde_json::Value;

const BLOCK_NODES: &[&str] = &["paragraph", "heading", "codeBlock", "listItem", "tableRow"];

pub fn to_plain_text(document: &Value) -> String {
    match document {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        node => {
            let mut out = String::new();
            render(node, &mut out);
            out.trim().to_string()
        }
    }
}

fn render(node: &Value, out: &mut String) {
    let node_type = node.get("type").and_then(Value::as_str).unwrap_or_default();

    match node_type {
        "text" => {
            if let Some(text) = node.get("text").and_then(Value::as_str) {
                out.push_str(text);
            }
        }
        "hardBreak" => out.push('\n'),
        "mention" | "emoji" | "inlineCard" => {
            let attrs = node.get("attrs");
            let text = attrs
                .and_then(|a| a.get("text").or_else(|| a.get("url")))
                .and_then(Value::as_str);
            if let Some(text) = text {
                out.push_str(text);
            }
        }
        _ => {}
    }

    if let Some(children) = node.get("content").and_then(Value::as_array) {
        for child in children {
            render(child, out);
        }
    }

    if BLOCK_NODES.contains(&node_type) && !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_description_is_empty() {
        assert_eq!(to_plain_text(&Value::Null), "");
    }

    #[test]
    fn test_plain_string_passes_through() {
        assert_eq!(
            to_plain_text(&json!("As a user, I want to log in.")),
            "As a user, I want to log in."
        );
    }

    #[test]
    fn test_paragraphs_are_newline_separated() {
        let doc = json!({
            "type": "doc",
            "version": 1,
            "content": [
                {"type": "paragraph", "content": [
                    {"type": "text", "text": "As a shopper, "},
                    {"type": "text", "text": "I want to save my cart", "marks": [{"type": "strong"}]}
                ]},
                {"type": "paragraph", "content": [
                    {"type": "text", "text": "so that I can buy later."}
                ]}
            ]
        });
        assert_eq!(
            to_plain_text(&doc),
            "As a shopper, I want to save my cart\nso that I can buy later."
        );
    }

    #[test]
    fn test_lists_and_breaks_flatten() {
        let doc = json!({
            "type": "doc",
            "version": 1,
            "content": [
                {"type": "bulletList", "content": [
                    {"type": "listItem", "content": [
                        {"type": "paragraph", "content": [{"type": "text", "text": "first"}]}
                    ]},
                    {"type": "listItem", "content": [
                        {"type": "paragraph", "content": [
                            {"type": "text", "text": "second"},
                            {"type": "hardBreak"},
                            {"type": "mention", "attrs": {"id": "42", "text": "@dana"}}
                        ]}
                    ]}
                ]}
            ]
        });
        assert_eq!(to_plain_text(&doc), "first\nsecond\n@dana");
    }

    #[test]
    fn test_empty_document_is_empty() {
        assert_eq!(to_plain_text(&json!({"type": "doc", "version": 1, "content": []})), "");
    }
}
