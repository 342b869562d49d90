// qsapy - A transpiler turning QS script syntax trees into Python source
// Copyright (C) 2026  Marcel Joachim Kloubert <marcel@kloubert.dev>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Identifier rewriting and scope tracking.
//!
//! This module is responsible for:
//! - Translating QS literals and method synonyms to Python
//! - Avoiding collisions with Python keywords
//! - Qualifying runtime names under `qsa.`
//! - Marking unresolved names in strict mode
//! - Tracking locally declared names per block

mod known;
mod scope;

pub use known::{
    is_known, is_python_keyword, KNOWN_SYMBOLS, PYTHON_KEYWORDS, UNQUALIFIED_KNOWN, WITH_KEYWORDS,
};
pub use scope::Scope;

use known::KNOWN_BY_LOWERCASE;
use std::collections::{HashMap, HashSet};

/// Prefix marking identifiers that could not be resolved in strict mode.
pub const UNDEFINED_PREFIX: &str = "__undef__";

/// Most characters a case-insensitive match may differ in before it is rejected.
const MAX_CASE_FIXES: usize = 2;

/// QS literals with a fixed Python spelling.
fn translate_literal(name: &str) -> Option<&'static str> {
    match name {
        "false" => Some("False"),
        "true" => Some("True"),
        "null" | "unknown" | "undefined" => Some("None"),
        "this" => Some("self"),
        "NaN" => Some("float(\"nan\")"),
        _ => None,
    }
}

/// QS method names with a different Python name.
fn translate_synonym(name: &str) -> Option<&'static str> {
    match name {
        "startsWith" => Some("startswith"),
        "endsWith" => Some("endswith"),
        "lastIndexOf" => Some("rfind"),
        "findRev" => Some("find"),
        "toLowerCase" => Some("lower"),
        "toUpperCase" => Some("upper"),
        "indexOf" => Some("index"),
        "argStr" | "argInt" => Some("arg"),
        _ => None,
    }
}

fn escape_keyword(mut name: String) -> String {
    if is_python_keyword(&name) {
        name.push('_');
    }
    name
}

/// Find the canonical casing for a name written with the wrong case.
///
/// Local declarations take precedence over runtime names.
fn case_insensitive_match(name: &str, exclude: &HashSet<String>) -> Option<String> {
    let lower = name.to_lowercase();
    if exclude.contains(&lower) {
        return None;
    }

    let mut local_matches: Vec<&String> = exclude
        .iter()
        .filter(|x| x.to_lowercase() == lower && x.as_str() != lower)
        .collect();
    local_matches.sort();

    let candidate = local_matches
        .first()
        .map(|s| s.to_string())
        .or_else(|| KNOWN_BY_LOWERCASE.get(&lower).map(|s| s.to_string()))?;

    let differing = candidate
        .chars()
        .zip(name.chars())
        .filter(|(a, b)| a != b)
        .count();
    (differing <= MAX_CASE_FIXES).then_some(candidate)
}

/// Translate a QS identifier into Python.
///
/// With `exclude` set the name is resolved scope-aware: declared locals pass
/// through, runtime names get qualified and everything else is either marked
/// unresolved (`strict`) or passed through. Without `exclude` only literals,
/// synonyms, keywords and the redirection map apply.
pub fn id_translate(
    name: &str,
    exclude: Option<&HashSet<String>>,
    transform: Option<&HashMap<String, String>>,
    strict: bool,
) -> String {
    // Already an expression; callers only pass those for unnamed fragments.
    if name.contains('(') || name.contains('.') {
        return name.to_string();
    }

    if let Some(literal) = translate_literal(name) {
        return literal.to_string();
    }

    let mut original = name.to_string();
    let mut name = escape_keyword(translate_synonym(name).unwrap_or(name).to_string());

    let Some(exclude) = exclude else {
        return transform
            .and_then(|t| t.get(&name).cloned())
            .unwrap_or(name);
    };

    if let Some(canonical) = case_insensitive_match(&original, exclude) {
        original = canonical.clone();
        name = escape_keyword(canonical);
    }

    if exclude.contains(&original) {
        return name;
    }

    if is_known(&name) {
        return match name.as_str() {
            "connect" | "disconnect" => format!("self.module_{}", name),
            n if UNQUALIFIED_KNOWN.contains(&n) => name,
            _ => format!("qsa.{}", name),
        };
    }

    if let Some(replacement) = transform.and_then(|t| t.get(&name)) {
        return replacement.clone();
    }

    if name.starts_with("form") && name.len() > 4 {
        return format!("qsa.from_project(\"{}\")", name);
    }

    if strict {
        format!("{}{}", UNDEFINED_PREFIX, name)
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn locals(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test_case("true", "True" ; "true")]
    #[test_case("false", "False" ; "false")]
    #[test_case("null", "None" ; "null")]
    #[test_case("undefined", "None" ; "undefined")]
    #[test_case("unknown", "None" ; "unknown")]
    #[test_case("this", "self" ; "this")]
    #[test_case("NaN", "float(\"nan\")" ; "nan")]
    fn test_literals(input: &str, expected: &str) {
        assert_eq!(id_translate(input, None, None, true), expected);
        assert_eq!(id_translate(input, Some(&locals(&[])), None, true), expected);
    }

    #[test_case("startsWith", "startswith" ; "starts with")]
    #[test_case("endsWith", "endswith" ; "ends with")]
    #[test_case("lastIndexOf", "rfind" ; "last index of")]
    #[test_case("findRev", "find" ; "find rev")]
    #[test_case("toLowerCase", "lower" ; "lower")]
    #[test_case("toUpperCase", "upper" ; "upper")]
    #[test_case("indexOf", "index" ; "index of")]
    #[test_case("argStr", "arg" ; "arg str")]
    #[test_case("argInt", "arg" ; "arg int")]
    fn test_synonyms(input: &str, expected: &str) {
        assert_eq!(id_translate(input, None, None, true), expected);
    }

    #[test_case("class" ; "class")]
    #[test_case("def" ; "def")]
    #[test_case("import" ; "import")]
    #[test_case("lambda" ; "lambda")]
    #[test_case("str" ; "str")]
    fn test_keywords_get_suffix(word: &str) {
        let expected = format!("{}_", word);
        assert_eq!(id_translate(word, None, None, true), expected);
        assert_eq!(id_translate(word, Some(&locals(&[word])), None, true), expected);
    }

    #[test]
    fn test_known_symbol_is_qualified() {
        assert_eq!(id_translate("FLUtil", Some(&locals(&[])), None, true), "qsa.FLUtil");
    }

    #[test]
    fn test_local_shadows_known_symbol() {
        assert_eq!(id_translate("Math", Some(&locals(&["Math"])), None, true), "Math");
    }

    #[test]
    fn test_connect_goes_through_module() {
        let exclude = locals(&[]);
        assert_eq!(id_translate("connect", Some(&exclude), None, true), "self.module_connect");
        assert_eq!(id_translate("disconnect", Some(&exclude), None, true), "self.module_disconnect");
        assert_eq!(id_translate("form", Some(&exclude), None, true), "form");
    }

    #[test]
    fn test_case_is_fixed_for_known_symbol() {
        // three differing characters is too far off
        assert_eq!(id_translate("flutil", Some(&locals(&[])), None, true), "__undef__flutil");
        assert_eq!(id_translate("FLUTil", Some(&locals(&[])), None, true), "qsa.FLUtil");
    }

    #[test]
    fn test_case_is_fixed_for_local() {
        assert_eq!(id_translate("myvar", Some(&locals(&["myVar"])), None, true), "myVar");
    }

    #[test]
    fn test_lowercase_local_blocks_case_fix() {
        assert_eq!(id_translate("file", Some(&locals(&["file"])), None, true), "file");
    }

    #[test]
    fn test_transform_map() {
        let mut transform = HashMap::new();
        transform.insert("select".to_string(), "cur.select".to_string());
        assert_eq!(
            id_translate("select", Some(&locals(&[])), Some(&transform), true),
            "cur.select"
        );
        assert_eq!(id_translate("select", None, Some(&transform), true), "cur.select");
    }

    #[test]
    fn test_form_reference() {
        assert_eq!(
            id_translate("formRecordclientes", Some(&locals(&[])), None, true),
            "qsa.from_project(\"formRecordclientes\")"
        );
    }

    #[test]
    fn test_strict_and_permissive() {
        assert_eq!(id_translate("foo", Some(&locals(&[])), None, true), "__undef__foo");
        assert_eq!(id_translate("foo", Some(&locals(&[])), None, false), "foo");
        assert_eq!(id_translate("foo", None, None, true), "foo");
    }
}
