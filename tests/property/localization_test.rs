//! Property-based tests for locale key completeness.
//!
//! Every key in the English catalog must exist in the Chinese one and vice
//! versa. Plural groups are checked separately: English needs `_one` and
//! `_other`, Chinese only `_other`.

use proptest::prelude::*;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

const PLURAL_SUFFIXES: &[&str] = &["_one", "_other"];

fn load_locale(path: &str) -> Value {
    let content = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read locale file {}: {}", path, e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse locale file {}: {}", path, e))
}

/// Flatten a nested JSON object into dot-notation keys.
fn flatten_keys(value: &Value, prefix: &str, keys: &mut BTreeSet<String>) {
    if let Value::Object(map) = value {
        for (k, v) in map {
            let full_key = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{}.{}", prefix, k)
            };
            match v {
                Value::Object(_) => flatten_keys(v, &full_key, keys),
                _ => {
                    keys.insert(full_key);
                }
            }
        }
    }
}

/// Splits `list.count_one` into (`list.count`, `_one`).
fn split_plural(key: &str) -> Option<(String, &'static str)> {
    PLURAL_SUFFIXES
        .iter()
        .find(|suffix| key.ends_with(*suffix))
        .map(|suffix| (key[..key.len() - suffix.len()].to_string(), *suffix))
}

struct LocaleData {
    en_regular: Vec<String>,
    zh_regular: BTreeSet<String>,
    en_plural: BTreeMap<String, BTreeSet<&'static str>>,
    zh_plural: BTreeMap<String, BTreeSet<&'static str>>,
}

fn partition(keys: BTreeSet<String>) -> (BTreeSet<String>, BTreeMap<String, BTreeSet<&'static str>>) {
    let mut regular = BTreeSet::new();
    let mut plural: BTreeMap<String, BTreeSet<&'static str>> = BTreeMap::new();
    for key in keys {
        match split_plural(&key) {
            Some((base, suffix)) => {
                plural.entry(base).or_default().insert(suffix);
            }
            None => {
                regular.insert(key);
            }
        }
    }
    (regular, plural)
}

fn load_locale_data() -> LocaleData {
    let mut en_keys = BTreeSet::new();
    let mut zh_keys = BTreeSet::new();
    flatten_keys(&load_locale("locales/en.json"), "", &mut en_keys);
    flatten_keys(&load_locale("locales/zh.json"), "", &mut zh_keys);

    let (en_regular, en_plural) = partition(en_keys);
    let (zh_regular, zh_plural) = partition(zh_keys);
    LocaleData {
        en_regular: en_regular.into_iter().collect(),
        zh_regular,
        en_plural,
        zh_plural,
    }
}

#[test]
fn regular_key_sets_are_equal() {
    let data = load_locale_data();
    let en: BTreeSet<String> = data.en_regular.iter().cloned().collect();
    assert_eq!(en, data.zh_regular);
}

#[test]
fn plural_groups_have_required_forms() {
    let data = load_locale_data();
    assert_eq!(
        data.en_plural.keys().collect::<Vec<_>>(),
        data.zh_plural.keys().collect::<Vec<_>>()
    );
    for (base, forms) in &data.en_plural {
        assert!(forms.contains("_one"), "{} lacks _one in English", base);
        assert!(forms.contains("_other"), "{} lacks _other in English", base);
    }
    for (base, forms) in &data.zh_plural {
        assert!(forms.contains("_other"), "{} lacks _other in Chinese", base);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Any sampled English key resolves to a non-empty Chinese text.
    #[test]
    fn sampled_key_translates_in_both(idx in 0usize..1000) {
        use videohunter::services::localization_engine::{LocalizationEngine, LocalizationEngineTrait};

        let data = load_locale_data();
        let key = &data.en_regular[idx % data.en_regular.len()];

        let mut engine = LocalizationEngine::builtin();
        engine.initialize().unwrap();
        engine.set_locale("zh").unwrap();
        let text = engine.t(key, None);
        prop_assert!(!text.is_empty());
        prop_assert_ne!(&text, key);
    }

    /// Placeholders in an English text also appear in its Chinese text.
    #[test]
    fn placeholders_match(idx in 0usize..1000) {
        let en = load_locale("locales/en.json");
        let zh = load_locale("locales/zh.json");
        let data = load_locale_data();
        let key = &data.en_regular[idx % data.en_regular.len()];

        let lookup = |root: &Value| -> String {
            key.split('.')
                .try_fold(root, |v, part| v.get(part))
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };
        let placeholders = |text: &str| -> BTreeSet<String> {
            text.split('{')
                .skip(1)
                .filter_map(|rest| rest.split_once('}').map(|(name, _)| name.to_string()))
                .collect()
        };

        prop_assert_eq!(placeholders(&lookup(&en)), placeholders(&lookup(&zh)));
    }
}
