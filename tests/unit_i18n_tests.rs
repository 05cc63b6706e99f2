//! # I18n Unit Tests / I18n 单元测试
//!
//! Checks that the message catalogs stay in sync and that locale resolution
//! falls back the way the CLI expects.
//!
//! 检查消息目录保持同步，以及区域解析按 CLI 预期的方式回退。

use std::collections::BTreeSet;

use variant_matrix::models::Outcome;
use variant_matrix::resolve_locale;

fn catalog_keys(file: &str) -> BTreeSet<String> {
    let path = format!("{}/locales/{file}", env!("CARGO_MANIFEST_DIR"));
    let text = std::fs::read_to_string(&path).unwrap();
    let table: toml::Table = toml::from_str(&text).unwrap();

    let mut keys = BTreeSet::new();
    collect_keys("", &toml::Value::Table(table), &mut keys);
    keys
}

fn collect_keys(prefix: &str, value: &toml::Value, keys: &mut BTreeSet<String>) {
    match value {
        toml::Value::Table(table) => {
            for (name, child) in table {
                let key = if prefix.is_empty() {
                    name.clone()
                } else {
                    format!("{prefix}.{name}")
                };
                collect_keys(&key, child, keys);
            }
        }
        _ => {
            keys.insert(prefix.to_string());
        }
    }
}

/// Every message exists in both languages.
/// 每条消息在两种语言中都存在。
#[test]
fn test_catalogs_define_the_same_keys() {
    let en = catalog_keys("en.toml");
    let zh = catalog_keys("zh-CN.toml");

    let missing_in_zh: Vec<_> = en.difference(&zh).collect();
    let missing_in_en: Vec<_> = zh.difference(&en).collect();
    assert!(missing_in_zh.is_empty(), "missing in zh-CN: {missing_in_zh:?}");
    assert!(missing_in_en.is_empty(), "missing in en: {missing_in_en:?}");
    assert!(en.contains("run.variant_banner"));
}

#[test]
fn test_outcome_labels_are_localized() {
    assert_eq!(Outcome::Passed.label("en"), "Passed");
    assert_eq!(Outcome::Errored.label("en"), "Errored");
    assert_eq!(Outcome::Passed.label("zh-CN"), "通过");
    assert_eq!(Outcome::Skipped.label("zh-CN"), "跳过");
}

#[test]
fn test_unknown_locale_falls_back_to_english() {
    assert_eq!(resolve_locale("de-DE"), "en");
    assert_eq!(Outcome::Failed.label(&resolve_locale("de-DE")), "Failed");
}

#[test]
fn test_locale_resolution_accepts_variants() {
    assert_eq!(resolve_locale("zh_CN"), "zh-CN");
    assert_eq!(resolve_locale("zh-cn"), "zh-CN");
    assert_eq!(resolve_locale("en-GB"), "en");
}
