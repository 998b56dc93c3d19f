//! # Scheme Editing Module / Scheme 编辑模块
//!
//! Inserts environment variables into the `TestAction` of an `.xcscheme`
//! file. This is a plain text transform around the opening `<TestAction ...>`
//! tag; outside the test action's variable block the document is left
//! byte-for-byte intact.
//!
//! 向 `.xcscheme` 文件的 `TestAction` 中插入环境变量。
//! 这是围绕 `<TestAction ...>` 起始标签的纯文本变换；变量块之外的内容保持不变。

use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::Path;

use crate::core::config::KeyValues;

/// Rewrites the scheme at `path` so its test action carries `environment`.
/// 重写 `path` 处的 scheme，使其测试操作带有 `environment`。
pub fn inject_environment(path: &Path, environment: &KeyValues) -> Result<()> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scheme: {}", path.display()))?;
    let updated = insert_environment_block(&content, environment)
        .with_context(|| format!("Failed to update scheme: {}", path.display()))?;
    fs::write(path, updated).with_context(|| format!("Failed to write scheme: {}", path.display()))
}

/// Returns `scheme` with an `<EnvironmentVariables>` block right after the
/// opening `<TestAction>` tag.
///
/// An existing block in the test action is merged: variables with other keys
/// are kept as written, configured keys take the configured values. Applying
/// the same environment twice gives the same document as applying it once.
///
/// 在 `<TestAction>` 起始标签之后放置 `<EnvironmentVariables>` 块。
/// 已存在的块会被合并：其他键保持原样，配置的键使用配置的值，重复应用结果不变。
pub fn insert_environment_block(scheme: &str, environment: &KeyValues) -> Result<String> {
    if environment.is_empty() {
        return Ok(scheme.to_string());
    }

    let start = scheme
        .find("<TestAction")
        .ok_or_else(|| anyhow!("scheme has no <TestAction> element"))?;
    let tag_end = scheme[start..]
        .find('>')
        .map(|offset| start + offset)
        .ok_or_else(|| anyhow!("unterminated <TestAction> element"))?;
    if scheme[..tag_end].ends_with('/') {
        return Err(anyhow!("<TestAction> element is self-closing"));
    }

    let body_start = tag_end + 1;
    let body_end = scheme[body_start..]
        .find("</TestAction>")
        .map_or(scheme.len(), |offset| body_start + offset);
    let existing = existing_block(scheme, body_start, body_end)?;

    let configured: Vec<String> = environment.iter().map(|(key, _)| escape_xml(key)).collect();
    let mut block = String::from("\n      <EnvironmentVariables>");
    if let Some((_, inner, _)) = existing {
        for entry in variable_entries(inner)? {
            let keep =
                attribute(entry, "key").is_none_or(|key| !configured.iter().any(|k| k == key));
            if keep {
                block.push_str("\n         ");
                block.push_str(entry);
            }
        }
    }
    for (key, value) in environment.iter() {
        block.push_str(&format!(
            "\n         <EnvironmentVariable\n            key = \"{}\"\n            value = \"{}\"\n            isEnabled = \"YES\">\n         </EnvironmentVariable>",
            escape_xml(key),
            escape_xml(value)
        ));
    }
    block.push_str("\n      </EnvironmentVariables>");

    let mut updated = String::with_capacity(scheme.len() + block.len());
    updated.push_str(&scheme[..body_start]);
    updated.push_str(&block);
    match existing {
        Some((block_start, _, block_end)) => {
            let before = scheme[body_start..block_start].trim_end();
            updated.push_str(before);
            updated.push_str(&scheme[block_end..]);
        }
        None => updated.push_str(&scheme[body_start..]),
    }
    Ok(updated)
}

const OPEN: &str = "<EnvironmentVariables>";
const CLOSE: &str = "</EnvironmentVariables>";

/// Locates an `<EnvironmentVariables>` block directly inside the test action
/// body. Returns the block start, its inner text and the block end.
fn existing_block(
    scheme: &str,
    body_start: usize,
    body_end: usize,
) -> Result<Option<(usize, &str, usize)>> {
    let body = &scheme[body_start..body_end];
    let Some(open) = body.find(OPEN) else {
        return Ok(None);
    };
    let close = body[open..]
        .find(CLOSE)
        .map(|offset| open + offset)
        .ok_or_else(|| anyhow!("unterminated <EnvironmentVariables> element"))?;
    Ok(Some((
        body_start + open,
        &body[open + OPEN.len()..close],
        body_start + close + CLOSE.len(),
    )))
}

/// Splits the inside of an `<EnvironmentVariables>` block into its
/// `<EnvironmentVariable>` elements, trimmed.
fn variable_entries(inner: &str) -> Result<Vec<&str>> {
    const ENTRY: &str = "<EnvironmentVariable";
    const ENTRY_CLOSE: &str = "</EnvironmentVariable>";

    let mut entries = Vec::new();
    let mut rest = inner;
    while let Some(start) = rest.find(ENTRY) {
        let tail = &rest[start..];
        let tag_end = tail
            .find('>')
            .ok_or_else(|| anyhow!("unterminated <EnvironmentVariable> element"))?;
        let end = if tail[..tag_end].ends_with('/') {
            tag_end + 1
        } else {
            tail.find(ENTRY_CLOSE)
                .map(|offset| offset + ENTRY_CLOSE.len())
                .ok_or_else(|| anyhow!("unterminated <EnvironmentVariable> element"))?
        };
        entries.push(&tail[..end]);
        rest = &tail[end..];
    }
    Ok(entries)
}

/// Reads a double-quoted attribute (`name = "value"`) from an element.
fn attribute<'a>(element: &'a str, name: &str) -> Option<&'a str> {
    let mut rest = element;
    while let Some(pos) = rest.find(name) {
        let preceded = rest[..pos].ends_with(char::is_whitespace);
        let after = rest[pos + name.len()..].trim_start();
        if preceded {
            if let Some(value) = after.strip_prefix('=') {
                let value = value.trim_start().strip_prefix('"')?;
                return value.find('"').map(|end| &value[..end]);
            }
        }
        rest = &rest[pos + name.len()..];
    }
    None
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEME: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Scheme version = "1.3">
   <TestAction
      selectedDebuggerIdentifier = "Xcode.DebuggerFoundation.Debugger.LLDB"
      shouldUseLaunchSchemeArgsEnv = "YES">
      <Testables>
      </Testables>
   </TestAction>
</Scheme>
"#;

    #[test]
    fn test_inserts_block_after_test_action_tag() {
        let env: KeyValues = [("API_HOST", "localhost"), ("QUOTE", "a\"b")].into_iter().collect();
        let updated = insert_environment_block(SCHEME, &env).unwrap();

        let tag_end = updated.find("shouldUseLaunchSchemeArgsEnv = \"YES\">").unwrap();
        let block = updated.find("<EnvironmentVariables>").unwrap();
        let testables = updated.find("<Testables>").unwrap();
        assert!(tag_end < block && block < testables);
        assert!(updated.contains("key = \"API_HOST\""));
        assert!(updated.contains("value = \"a&quot;b\""));
        assert_eq!(updated.matches("isEnabled = \"YES\"").count(), 2);
    }

    #[test]
    fn test_applying_twice_matches_applying_once() {
        let env: KeyValues = [("API_HOST", "localhost"), ("RETRIES", "3")].into_iter().collect();
        let once = insert_environment_block(SCHEME, &env).unwrap();
        let twice = insert_environment_block(&once, &env).unwrap();

        assert_eq!(twice, once);
        assert_eq!(twice.matches("<EnvironmentVariables>").count(), 1);
        assert_eq!(twice.matches("key = \"API_HOST\"").count(), 1);
    }

    #[test]
    fn test_existing_variables_are_merged() {
        let first: KeyValues = [("KEEP_ME", "1"), ("API_HOST", "old")].into_iter().collect();
        let second: KeyValues = [("API_HOST", "new")].into_iter().collect();
        let scheme = insert_environment_block(SCHEME, &first).unwrap();
        let updated = insert_environment_block(&scheme, &second).unwrap();

        assert_eq!(updated.matches("<EnvironmentVariables>").count(), 1);
        assert!(updated.contains("key = \"KEEP_ME\""));
        assert!(updated.contains("value = \"new\""));
        assert!(!updated.contains("value = \"old\""));
        assert!(updated.find("KEEP_ME").unwrap() < updated.find("API_HOST").unwrap());
    }

    #[test]
    fn test_self_closing_variables_are_kept() {
        let scheme = SCHEME.replace(
            "<Testables>",
            "<EnvironmentVariables>\n         <EnvironmentVariable key=\"LEGACY\" value=\"x\" isEnabled=\"NO\"/>\n      </EnvironmentVariables>\n      <Testables>",
        );
        let env: KeyValues = [("API_HOST", "localhost")].into_iter().collect();
        let updated = insert_environment_block(&scheme, &env).unwrap();

        assert_eq!(updated.matches("<EnvironmentVariables>").count(), 1);
        assert!(updated.contains(r#"<EnvironmentVariable key="LEGACY" value="x" isEnabled="NO"/>"#));
        assert!(updated.contains("key = \"API_HOST\""));
        let block_end = updated.find("</EnvironmentVariables>").unwrap();
        assert!(block_end < updated.find("<Testables>").unwrap());
    }

    #[test]
    fn test_missing_test_action_is_an_error() {
        let env: KeyValues = [("A", "1")].into_iter().collect();
        assert!(insert_environment_block("<Scheme></Scheme>", &env).is_err());
    }

    #[test]
    fn test_empty_environment_leaves_scheme_untouched() {
        assert_eq!(insert_environment_block(SCHEME, &KeyValues::new()).unwrap(), SCHEME);
    }
}
