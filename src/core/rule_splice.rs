//! Re-hosting of level-gated class feat grants.
//!
//! Some archetype feats grant "a 1st- or 2nd-level class feat" through a
//! `ChoiceSet` + `GrantItem` pair, and a follow-up feat grants another one up
//! to half your level. The True Archetype version of the follow-up copies the
//! pair from its prerequisite and lets the choice go up to the character level.

use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::{Captures, Regex};
use serde_json::{json, Value};

use crate::core::item::{ItemDocument, RuleDefinition};

/// Prompt key of the choice rule that can be re-hosted.
pub const CLASS_FEAT_PROMPT: &str = "PF2E.SpecificRule.Prompt.LevelOneOrTwoClassFeat";

const CHOICE_SET: &str = "ChoiceSet";
const GRANT_ITEM: &str = "GrantItem";
const ITEM_LEVEL: &str = "item:level";

/// What the splice did to an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpliceOutcome {
    /// Rules were copied from the feat named by this prerequisite.
    Spliced { prerequisite: String },
    /// No prerequisite carries a re-hostable rule pair.
    NotApplicable,
}

/// Splice the class feat choice of the first matching prerequisite into `item`.
///
/// `selected` maps original feat names to their source documents. `new_name`
/// is the display name the rewritten item will carry.
pub fn splice_class_feat_choice(
    item: &mut ItemDocument,
    new_name: &str,
    selected: &IndexMap<String, ItemDocument>,
) -> SpliceOutcome {
    let prerequisites: Vec<String> = item.prerequisite_texts().map(str::to_string).collect();

    for prerequisite in prerequisites {
        let Some(granting) = selected.get(&prerequisite) else {
            continue;
        };
        let Some(rules) = spliced_rules(&granting.system.rules, new_name) else {
            continue;
        };

        item.system.rules = rules;
        item.system.description.value = drop_half_level_wording(&item.system.description.value);
        return SpliceOutcome::Spliced { prerequisite };
    }

    SpliceOutcome::NotApplicable
}

/// Position of the choice rule and of the grant rule that reads its selection.
pub fn find_grant_pair(rules: &[RuleDefinition]) -> Option<(usize, usize)> {
    let choice = rules.iter().position(|rule| {
        rule.key() == Some(CHOICE_SET) && rule.str_field("prompt") == Some(CLASS_FEAT_PROMPT)
    })?;
    let flag = rules[choice].str_field("flag").unwrap_or_default();
    let selection_ref = format!("{{item|flags.pf2e.rulesSelections.{}}}", flag);
    let grant = rules.iter().position(|rule| {
        rule.key() == Some(GRANT_ITEM) && rule.str_field("uuid") == Some(selection_ref.as_str())
    })?;
    Some((choice, grant))
}

/// `[choice, grant, ...rest]` with the choice prompt renamed and its level gate loosened.
pub fn spliced_rules(rules: &[RuleDefinition], new_name: &str) -> Option<Vec<RuleDefinition>> {
    let (choice_idx, grant_idx) = find_grant_pair(rules)?;

    let mut choice = rules[choice_idx].clone();
    choice.set(
        "prompt",
        Value::String(format!("{}: Select a class feat", new_name)),
    );
    if !loosen_level_gate(&mut choice) {
        return None;
    }
    let grant = rules[grant_idx].clone();

    let mut spliced = Vec::with_capacity(rules.len());
    spliced.push(choice);
    spliced.push(grant);
    spliced.extend(
        rules
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != choice_idx && *idx != grant_idx)
            .map(|(_, rule)| rule.clone()),
    );
    Some(spliced)
}

/// Replace the first `item:level` comparison in `choices.filter`, or append one.
fn loosen_level_gate(choice: &mut RuleDefinition) -> bool {
    let Some(Value::Object(choices)) = choice.get_mut("choices") else {
        return false;
    };
    let filter = choices
        .entry("filter")
        .or_insert_with(|| Value::Array(Vec::new()));
    let Value::Array(filters) = filter else {
        return false;
    };

    let gate = json!({ "lte": [ITEM_LEVEL, "self:level"] });
    match filters.iter().position(compares_item_level) {
        Some(idx) => filters[idx] = gate,
        None => filters.push(gate),
    }
    true
}

fn compares_item_level(expr: &Value) -> bool {
    let Value::Object(map) = expr else {
        return false;
    };
    ["lte", "gte"].iter().any(|op| {
        map.get(*op)
            .and_then(Value::as_array)
            .is_some_and(|operands| operands.iter().any(|o| o.as_str() == Some(ITEM_LEVEL)))
    })
}

fn half_level_phrase() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\bhalf (?:of )?your (level|character level)\b")
            .expect("valid half-level regex")
    })
}

/// "half (of) your (character) level" -> "your (character) level".
pub fn drop_half_level_wording(description: &str) -> String {
    half_level_phrase()
        .replace_all(description, |caps: &Captures| {
            if caps[1].eq_ignore_ascii_case("level") {
                "your level"
            } else {
                "your character level"
            }
        })
        .into_owned()
}
