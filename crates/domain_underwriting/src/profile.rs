//! Applicant profile
//!
//! The profile is the fact map predicates are evaluated against. Demographic
//! basics are typed fields; condition answers are a sparse map keyed by
//! dotted path (`diabetes.insulin_use`). A key that is absent, or present
//! with a JSON `null`, is *missing*, which is not the same as `false` or `0`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

use crate::classification::Gender;

/// Prefix of the built-in demographic paths
const CLIENT_PREFIX: &str = "client";
/// Path resolving to the list of condition codes present
const CONDITIONS_PATH: &str = "conditions";

/// Health and demographic facts for one applicant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantProfile {
    /// Age in years at the evaluation date
    pub age: u32,
    pub gender: Gender,
    /// Current tobacco or nicotine use
    pub tobacco: bool,
    #[serde(default)]
    pub bmi: Option<f64>,
    /// Two-letter state of residence
    #[serde(default)]
    pub state: Option<String>,
    /// Condition codes the applicant reported, even without follow-up answers
    #[serde(default)]
    pub conditions: BTreeSet<String>,
    /// Condition answers keyed by dotted path, or nested by condition code
    #[serde(default)]
    pub facts: BTreeMap<String, Value>,
    /// Date that `*_since_*` operators measure against
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

impl ApplicantProfile {
    /// Creates a profile with no conditions
    pub fn new(age: u32, gender: Gender, tobacco: bool) -> Self {
        Self {
            age,
            gender,
            tobacco,
            bmi: None,
            state: None,
            conditions: BTreeSet::new(),
            facts: BTreeMap::new(),
            as_of: None,
        }
    }

    /// Reports a condition code
    pub fn with_condition(mut self, code: impl Into<String>) -> Self {
        self.conditions.insert(code.into());
        self
    }

    /// Adds a condition answer at a dotted path
    pub fn with_fact(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.facts.insert(path.into(), value.into());
        self
    }

    pub fn with_bmi(mut self, bmi: f64) -> Self {
        self.bmi = Some(bmi);
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn with_as_of(mut self, date: NaiveDate) -> Self {
        self.as_of = Some(date);
        self
    }

    /// Condition codes the profile reports
    ///
    /// The explicit list plus the leading segment of every condition answer,
    /// so `{"diabetes.type": "type2"}` alone is enough to report diabetes.
    pub fn conditions_present(&self) -> BTreeSet<String> {
        let mut present = self.conditions.clone();
        for key in self.facts.keys() {
            let code = key.split('.').next().unwrap_or(key);
            if !code.is_empty() && code != CLIENT_PREFIX && code != CONDITIONS_PATH {
                present.insert(code.to_string());
            }
        }
        present
    }

    /// Resolves a dotted path to a fact value
    ///
    /// Returns `None` when the path is absent or holds `null`.
    pub fn lookup(&self, path: &str) -> Option<Cow<'_, Value>> {
        if let Some(value) = self.builtin(path) {
            return value.map(Cow::Owned);
        }

        let found = self.facts.get(path).or_else(|| self.lookup_nested(path))?;
        if found.is_null() {
            None
        } else {
            Some(Cow::Borrowed(found))
        }
    }

    /// Built-in demographic paths. Outer `None` means "not a built-in path".
    fn builtin(&self, path: &str) -> Option<Option<Value>> {
        let value = match path {
            "client.age" => Some(Value::from(self.age)),
            "client.gender" => Some(Value::from(self.gender.as_str())),
            "client.tobacco" => Some(Value::from(self.tobacco)),
            "client.bmi" => self.bmi.filter(|b| *b > 0.0).map(Value::from),
            "client.state" => self
                .state
                .as_ref()
                .filter(|s| !s.is_empty())
                .map(|s| Value::from(s.as_str())),
            CONDITIONS_PATH => Some(Value::from(
                self.conditions_present().into_iter().collect::<Vec<_>>(),
            )),
            _ => return None,
        };
        Some(value)
    }

    /// Walks nested objects, trying each split of the path into a stored key
    /// and a remainder (`diabetes` + `insulin_use`, `a.b` + `c`, ...)
    fn lookup_nested(&self, path: &str) -> Option<&Value> {
        let segments: Vec<&str> = path.split('.').collect();
        (1..segments.len()).find_map(|split| {
            let key = segments[..split].join(".");
            let root = self.facts.get(&key)?;
            segments[split..]
                .iter()
                .try_fold(root, |node, segment| node.as_object()?.get(*segment))
        })
    }

    /// Canonical, key-sorted view of every fact the evaluator can see
    pub fn canonical_facts(&self) -> BTreeMap<String, Value> {
        let mut facts = BTreeMap::new();
        for path in ["client.age", "client.gender", "client.tobacco", "client.bmi", "client.state", CONDITIONS_PATH] {
            if let Some(value) = self.lookup(path) {
                facts.insert(path.to_string(), value.into_owned());
            }
        }
        for (key, value) in &self.facts {
            if !value.is_null() {
                facts.insert(key.clone(), value.clone());
            }
        }
        facts
    }

    /// SHA-256 of the canonical facts, hex encoded
    ///
    /// Lets audit records correlate evaluations of identical inputs without
    /// storing health information.
    pub fn input_hash(&self) -> String {
        let mut hasher = Sha256::new();
        for (key, value) in self.canonical_facts() {
            hasher.update(key.as_bytes());
            hasher.update(b":");
            hasher.update(value.to_string().as_bytes());
            hasher.update(b"|");
        }
        format!("{:x}", hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profile() -> ApplicantProfile {
        ApplicantProfile::new(45, Gender::Female, false)
    }

    #[test]
    fn test_builtin_paths() {
        let p = profile().with_bmi(27.5);
        assert_eq!(p.lookup("client.age").unwrap().as_u64(), Some(45));
        assert_eq!(p.lookup("client.gender").unwrap().as_str(), Some("female"));
        assert_eq!(p.lookup("client.tobacco").unwrap().as_bool(), Some(false));
        assert_eq!(p.lookup("client.bmi").unwrap().as_f64(), Some(27.5));
        assert!(p.lookup("client.state").is_none());
    }

    #[test]
    fn test_flat_and_nested_facts() {
        let p = profile()
            .with_fact("diabetes.insulin_use", true)
            .with_fact("heart", json!({"stents": {"count": 2}}));

        assert_eq!(p.lookup("diabetes.insulin_use").unwrap().as_bool(), Some(true));
        assert_eq!(p.lookup("heart.stents.count").unwrap().as_u64(), Some(2));
        assert!(p.lookup("heart.stents.year").is_none());
    }

    #[test]
    fn test_null_is_missing_but_false_is_present() {
        let p = profile()
            .with_fact("diabetes.insulin_use", Value::Null)
            .with_fact("diabetes.a1c_controlled", false);

        assert!(p.lookup("diabetes.insulin_use").is_none());
        assert_eq!(p.lookup("diabetes.a1c_controlled").unwrap().as_bool(), Some(false));
    }

    #[test]
    fn test_conditions_present_includes_fact_prefixes() {
        let p = profile()
            .with_condition("copd")
            .with_fact("diabetes.type", "type2");

        let present = p.conditions_present();
        assert!(present.contains("copd"));
        assert!(present.contains("diabetes"));
        assert_eq!(present.len(), 2);
        assert_eq!(p.lookup("conditions").unwrap(), Cow::<Value>::Owned(json!(["copd", "diabetes"])));
    }

    #[test]
    fn test_input_hash_is_stable_and_sensitive() {
        let a = profile().with_fact("diabetes.type", "type2");
        let b = profile().with_fact("diabetes.type", "type2");
        let c = profile().with_fact("diabetes.type", "type1");

        assert_eq!(a.input_hash(), b.input_hash());
        assert_ne!(a.input_hash(), c.input_hash());
        assert_eq!(a.input_hash().len(), 64);
    }
}
