//! Predicate DSL and three-valued evaluator
//!
//! A rule's predicate is a tree of `all` / `any` / `not` groups over leaf
//! conditions, stored as JSON:
//!
//! ```json
//! {
//!   "version": 2,
//!   "root": {
//!     "all": [
//!       { "field": "diabetes.insulin_use", "operator": "eq", "value": true },
//!       { "not": { "field": "diabetes.a1c", "operator": "lte", "value": 7.5 } }
//!     ]
//!   }
//! }
//! ```
//!
//! The empty object `{}` is a wildcard that always matches and is how
//! catch-all rules are written.
//!
//! Evaluation is three-valued. A leaf over a field the applicant never
//! answered is [`Truth::Unknown`] unless its `treatNullAs` says otherwise,
//! and unknowns propagate through `all`/`any`/`not` with Kleene semantics.
//! An ill-typed comparison is a [`DataError`], never a silent `false`.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::{json_type_name, DataError};
use crate::profile::ApplicantProfile;

/// Predicate DSL version understood by this engine
pub const PREDICATE_VERSION: u32 = 2;

/// Result of evaluating a predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Truth {
    True,
    False,
    Unknown,
}

impl Truth {
    pub fn from_bool(value: bool) -> Truth {
        if value {
            Truth::True
        } else {
            Truth::False
        }
    }

    /// Kleene AND
    pub fn and(self, other: Truth) -> Truth {
        match (self, other) {
            (Truth::False, _) | (_, Truth::False) => Truth::False,
            (Truth::True, Truth::True) => Truth::True,
            _ => Truth::Unknown,
        }
    }

    /// Kleene OR
    pub fn or(self, other: Truth) -> Truth {
        match (self, other) {
            (Truth::True, _) | (_, Truth::True) => Truth::True,
            (Truth::False, Truth::False) => Truth::False,
            _ => Truth::Unknown,
        }
    }

    /// Kleene NOT
    pub fn negate(self) -> Truth {
        match self {
            Truth::True => Truth::False,
            Truth::False => Truth::True,
            Truth::Unknown => Truth::Unknown,
        }
    }

    pub fn is_true(&self) -> bool {
        *self == Truth::True
    }
}

/// What a leaf evaluates to when its field is missing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullPolicy {
    #[default]
    Unknown,
    True,
    #[serde(alias = "fail")]
    False,
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Between,
    In,
    NotIn,
    Contains,
    StartsWith,
    EndsWith,
    IncludesAny,
    IncludesAll,
    IsEmpty,
    IsNotEmpty,
    IsNull,
    IsNotNull,
    YearsSinceGte,
    YearsSinceLte,
    MonthsSinceGte,
    MonthsSinceLte,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::Between => "between",
            Operator::In => "in",
            Operator::NotIn => "not_in",
            Operator::Contains => "contains",
            Operator::StartsWith => "starts_with",
            Operator::EndsWith => "ends_with",
            Operator::IncludesAny => "includes_any",
            Operator::IncludesAll => "includes_all",
            Operator::IsEmpty => "is_empty",
            Operator::IsNotEmpty => "is_not_empty",
            Operator::IsNull => "is_null",
            Operator::IsNotNull => "is_not_null",
            Operator::YearsSinceGte => "years_since_gte",
            Operator::YearsSinceLte => "years_since_lte",
            Operator::MonthsSinceGte => "months_since_gte",
            Operator::MonthsSinceLte => "months_since_lte",
        }
    }

    /// Operators that take no comparison value
    pub fn is_unary(&self) -> bool {
        matches!(
            self,
            Operator::IsEmpty | Operator::IsNotEmpty | Operator::IsNull | Operator::IsNotNull
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let op = match s {
            "eq" => Operator::Eq,
            "ne" | "neq" => Operator::Ne,
            "gt" => Operator::Gt,
            "gte" => Operator::Gte,
            "lt" => Operator::Lt,
            "lte" => Operator::Lte,
            "between" => Operator::Between,
            "in" => Operator::In,
            "not_in" => Operator::NotIn,
            "contains" => Operator::Contains,
            "starts_with" => Operator::StartsWith,
            "ends_with" => Operator::EndsWith,
            "includes_any" => Operator::IncludesAny,
            "includes_all" => Operator::IncludesAll,
            "is_empty" => Operator::IsEmpty,
            "is_not_empty" => Operator::IsNotEmpty,
            "is_null" => Operator::IsNull,
            "is_not_null" => Operator::IsNotNull,
            "years_since_gte" => Operator::YearsSinceGte,
            "years_since_lte" => Operator::YearsSinceLte,
            "months_since_gte" => Operator::MonthsSinceGte,
            "months_since_lte" => Operator::MonthsSinceLte,
            other => return Err(other.to_string()),
        };
        Ok(op)
    }
}

/// A leaf comparison of one profile field against a constant
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// Dotted path into the applicant profile
    pub field: String,
    pub operator: Operator,
    /// Comparison value; `Null` for unary operators
    pub value: Value,
    pub treat_null_as: NullPolicy,
}

impl Condition {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
            treat_null_as: NullPolicy::Unknown,
        }
    }

    pub fn treat_null_as(mut self, policy: NullPolicy) -> Self {
        self.treat_null_as = policy;
        self
    }

    /// Checks the rule's comparison value has the shape its operator needs
    fn check_shape(&self) -> Result<(), DataError> {
        let op = self.operator;
        let value = &self.value;
        let mismatch = |expected: &str| {
            Err(DataError::type_mismatch(self.field.clone(), op.as_str(), expected, value))
        };

        match op {
            Operator::Eq | Operator::Ne | Operator::Contains => {
                if is_scalar(value) { Ok(()) } else { mismatch("boolean, number or string value") }
            }
            Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte => {
                if value.is_number() { Ok(()) } else { mismatch("number value") }
            }
            Operator::Between => match value.as_array().map(|a| a.as_slice()) {
                Some([min, max]) => match (min.as_f64(), max.as_f64()) {
                    (Some(lo), Some(hi)) if lo <= hi => Ok(()),
                    _ => mismatch("[min, max] with min <= max"),
                },
                _ => mismatch("[min, max] value"),
            },
            Operator::In | Operator::NotIn => {
                if value.is_array() { Ok(()) } else { mismatch("array value") }
            }
            Operator::IncludesAny | Operator::IncludesAll => match value.as_array() {
                Some(items) if !items.is_empty() => Ok(()),
                _ => mismatch("non-empty array value"),
            },
            Operator::StartsWith | Operator::EndsWith => {
                if value.is_string() { Ok(()) } else { mismatch("string value") }
            }
            Operator::YearsSinceGte
            | Operator::YearsSinceLte
            | Operator::MonthsSinceGte
            | Operator::MonthsSinceLte => {
                if value.as_u64().is_some() { Ok(()) } else { mismatch("non-negative integer value") }
            }
            Operator::IsEmpty | Operator::IsNotEmpty | Operator::IsNull | Operator::IsNotNull => Ok(()),
        }
    }
}

/// Predicate tree
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `{}`: matches every applicant
    Always,
    All(Vec<Predicate>),
    Any(Vec<Predicate>),
    Not(Box<Predicate>),
    Leaf(Condition),
}

impl Predicate {
    pub fn leaf(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Predicate::Leaf(Condition::new(field, operator, value))
    }

    pub fn not(inner: Predicate) -> Self {
        Predicate::Not(Box::new(inner))
    }

    /// Parses a stored predicate, honouring an embedded version
    ///
    /// The version is either a `{version, root}` wrapper or a `version` key
    /// on the top node itself. `default_version` is the version recorded on
    /// the rule; an embedded `version` takes precedence. Nested nodes may
    /// not carry a version. JSON `null` is treated like `{}`.
    pub fn parse(json: &Value, default_version: u32) -> Result<Predicate, DataError> {
        let version = match json.get("version") {
            None => default_version,
            Some(v) => v
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| DataError::malformed("predicate version must be an integer"))?,
        };

        if version != PREDICATE_VERSION {
            return Err(DataError::UnsupportedPredicateVersion {
                version,
                supported: PREDICATE_VERSION,
            });
        }

        match json {
            Value::Object(obj) if obj.contains_key("root") => {
                if obj.keys().any(|k| k != "root" && k != "version") {
                    return Err(DataError::malformed("a {version, root} wrapper takes no other keys"));
                }
                Self::from_node(&obj["root"], false)
            }
            other => Self::from_node(other, true),
        }
    }

    fn from_node(node: &Value, top: bool) -> Result<Predicate, DataError> {
        let obj = match node {
            Value::Null => return Ok(Predicate::Always),
            Value::Object(obj) => obj,
            other => {
                return Err(DataError::malformed(format!(
                    "expected object, found {}",
                    json_type_name(other)
                )))
            }
        };

        let versioned = obj.contains_key("version");
        if versioned && !top {
            return Err(DataError::malformed("'version' is only allowed on the top predicate node"));
        }
        if obj.len() == usize::from(versioned) {
            return Ok(Predicate::Always);
        }

        let groups = ["all", "any", "not", "field"]
            .iter()
            .filter(|k| obj.contains_key(**k))
            .count();
        if groups != 1 {
            return Err(DataError::malformed(
                "a node must have exactly one of all, any, not or field",
            ));
        }

        if let Some(children) = obj.get("all") {
            return Ok(Predicate::All(Self::children(children, "all")?));
        }
        if let Some(children) = obj.get("any") {
            return Ok(Predicate::Any(Self::children(children, "any")?));
        }
        if let Some(inner) = obj.get("not") {
            return Ok(Predicate::not(Self::from_node(inner, false)?));
        }
        Self::leaf_from(obj).map(Predicate::Leaf)
    }

    fn children(value: &Value, group: &str) -> Result<Vec<Predicate>, DataError> {
        value
            .as_array()
            .ok_or_else(|| DataError::malformed(format!("'{}' must be an array", group)))?
            .iter()
            .map(|child| Self::from_node(child, false))
            .collect()
    }

    fn leaf_from(obj: &Map<String, Value>) -> Result<Condition, DataError> {
        let field = obj
            .get("field")
            .and_then(Value::as_str)
            .filter(|f| !f.is_empty())
            .ok_or_else(|| DataError::malformed("leaf 'field' must be a non-empty string"))?;

        let operator_name = obj
            .get("operator")
            .and_then(Value::as_str)
            .ok_or_else(|| DataError::malformed(format!("leaf on '{}' has no operator", field)))?;
        let operator = operator_name
            .parse::<Operator>()
            .map_err(|operator| DataError::UnknownOperator {
                field: field.to_string(),
                operator,
            })?;

        let treat_null_as = match obj.get("treatNullAs").or_else(|| obj.get("treat_null_as")) {
            None | Some(Value::Null) => NullPolicy::default(),
            Some(policy) => serde_json::from_value(policy.clone()).map_err(|_| {
                DataError::malformed(format!("invalid treatNullAs on '{}': {}", field, policy))
            })?,
        };

        let condition = Condition {
            field: field.to_string(),
            operator,
            value: obj.get("value").cloned().unwrap_or(Value::Null),
            treat_null_as,
        };
        condition.check_shape()?;
        Ok(condition)
    }

    /// Serializes back to the stored JSON form (without the version wrapper)
    pub fn to_json(&self) -> Value {
        match self {
            Predicate::Always => Value::Object(Map::new()),
            Predicate::All(children) => {
                serde_json::json!({ "all": children.iter().map(Predicate::to_json).collect::<Vec<_>>() })
            }
            Predicate::Any(children) => {
                serde_json::json!({ "any": children.iter().map(Predicate::to_json).collect::<Vec<_>>() })
            }
            Predicate::Not(inner) => serde_json::json!({ "not": inner.to_json() }),
            Predicate::Leaf(c) => {
                let mut obj = Map::new();
                obj.insert("field".into(), Value::from(c.field.as_str()));
                obj.insert("operator".into(), Value::from(c.operator.as_str()));
                if !c.operator.is_unary() {
                    obj.insert("value".into(), c.value.clone());
                }
                if c.treat_null_as != NullPolicy::Unknown {
                    let policy = serde_json::to_value(c.treat_null_as).unwrap_or(Value::Null);
                    obj.insert("treatNullAs".into(), policy);
                }
                Value::Object(obj)
            }
        }
    }

    /// Every field path the predicate reads
    pub fn fields(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Predicate::Always => {}
            Predicate::All(children) | Predicate::Any(children) => {
                children.iter().for_each(|c| c.collect_fields(out))
            }
            Predicate::Not(inner) => inner.collect_fields(out),
            Predicate::Leaf(c) => out.push(c.field.as_str()),
        }
    }
}

impl Serialize for Predicate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Predicate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = Value::deserialize(deserializer)?;
        Predicate::parse(&json, PREDICATE_VERSION).map_err(serde::de::Error::custom)
    }
}

/// Truth value plus the fields whose absence made it unknown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub truth: Truth,
    pub missing_fields: Vec<String>,
}

/// Evaluates a predicate against a profile
pub fn evaluate(predicate: &Predicate, profile: &ApplicantProfile) -> Result<Truth, DataError> {
    evaluate_traced(predicate, profile).map(|e| e.truth)
}

/// Evaluates a predicate and reports which missing fields left it unknown
///
/// Missing fields are only reported when the overall result is
/// [`Truth::Unknown`]; a branch that was decided despite a gap does not
/// list it. They come back sorted and without duplicates.
pub fn evaluate_traced(
    predicate: &Predicate,
    profile: &ApplicantProfile,
) -> Result<Evaluation, DataError> {
    let mut walker = Walker {
        profile,
        missing: Vec::new(),
    };
    let truth = walker.eval(predicate)?;
    let mut missing_fields = walker.missing;
    missing_fields.sort();
    missing_fields.dedup();
    Ok(Evaluation {
        truth,
        missing_fields,
    })
}

struct Walker<'a> {
    profile: &'a ApplicantProfile,
    missing: Vec<String>,
}

impl Walker<'_> {
    fn eval(&mut self, node: &Predicate) -> Result<Truth, DataError> {
        let mark = self.missing.len();
        let truth = match node {
            Predicate::Always => Truth::True,
            Predicate::All(children) => {
                let mut acc = Truth::True;
                for child in children {
                    acc = acc.and(self.eval(child)?);
                    if acc == Truth::False {
                        break;
                    }
                }
                acc
            }
            Predicate::Any(children) => {
                let mut acc = Truth::False;
                for child in children {
                    acc = acc.or(self.eval(child)?);
                    if acc == Truth::True {
                        break;
                    }
                }
                acc
            }
            Predicate::Not(inner) => self.eval(inner)?.negate(),
            Predicate::Leaf(condition) => self.eval_condition(condition)?,
        };

        if truth != Truth::Unknown {
            self.missing.truncate(mark);
        }
        Ok(truth)
    }

    fn eval_condition(&mut self, c: &Condition) -> Result<Truth, DataError> {
        let actual = self.profile.lookup(&c.field);

        match c.operator {
            Operator::IsNull => return Ok(Truth::from_bool(actual.is_none())),
            Operator::IsNotNull => return Ok(Truth::from_bool(actual.is_some())),
            _ => {}
        }

        let Some(actual) = actual else {
            return Ok(match c.treat_null_as {
                NullPolicy::True => Truth::True,
                NullPolicy::False => Truth::False,
                NullPolicy::Unknown => {
                    self.missing.push(c.field.clone());
                    Truth::Unknown
                }
            });
        };

        if is_date_operator(c.operator) {
            let Some(as_of) = self.profile.as_of else {
                self.missing.push("as_of".to_string());
                return Ok(Truth::Unknown);
            };
            return compare_date(c, &actual, as_of).map(Truth::from_bool);
        }

        compare(c, &actual).map(Truth::from_bool)
    }
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::Bool(_) | Value::Number(_) | Value::String(_))
}

fn is_date_operator(op: Operator) -> bool {
    matches!(
        op,
        Operator::YearsSinceGte
            | Operator::YearsSinceLte
            | Operator::MonthsSinceGte
            | Operator::MonthsSinceLte
    )
}

/// Equality for set membership: numbers compare numerically, everything else structurally
fn scalar_eq(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) if a.is_number() && b.is_number() => x == y,
        _ => a == b,
    }
}

fn compare(c: &Condition, actual: &Value) -> Result<bool, DataError> {
    let expected = &c.value;
    let mismatch = |want: &str| DataError::type_mismatch(c.field.clone(), c.operator.as_str(), want, actual);
    let number = || actual.as_f64().filter(|_| actual.is_number()).ok_or_else(|| mismatch("number"));
    let string = || actual.as_str().ok_or_else(|| mismatch("string"));
    let array = || actual.as_array().ok_or_else(|| mismatch("array"));
    let threshold = || expected.as_f64().unwrap_or_default();

    let result = match c.operator {
        Operator::Eq | Operator::Ne => {
            let same_type = std::mem::discriminant(actual) == std::mem::discriminant(expected);
            if !same_type {
                return Err(mismatch(json_type_name(expected)));
            }
            let equal = scalar_eq(actual, expected);
            if c.operator == Operator::Eq { equal } else { !equal }
        }
        Operator::Gt => number()? > threshold(),
        Operator::Gte => number()? >= threshold(),
        Operator::Lt => number()? < threshold(),
        Operator::Lte => number()? <= threshold(),
        Operator::Between => {
            let n = number()?;
            let bounds: Vec<f64> = expected
                .as_array()
                .map(|a| a.iter().filter_map(Value::as_f64).collect())
                .unwrap_or_default();
            match bounds.as_slice() {
                [lo, hi] => n >= *lo && n <= *hi,
                _ => return Err(DataError::malformed("between requires [min, max]")),
            }
        }
        Operator::In | Operator::NotIn => {
            if !is_scalar(actual) {
                return Err(mismatch("boolean, number or string"));
            }
            let member = expected
                .as_array()
                .map(|set| set.iter().any(|item| scalar_eq(actual, item)))
                .unwrap_or(false);
            if c.operator == Operator::In { member } else { !member }
        }
        Operator::Contains => match actual {
            Value::String(s) => match expected.as_str() {
                Some(needle) => s.contains(needle),
                None => return Err(DataError::type_mismatch(c.field.clone(), "contains", "string value", expected)),
            },
            Value::Array(items) => items.iter().any(|item| scalar_eq(item, expected)),
            _ => return Err(mismatch("string or array")),
        },
        Operator::StartsWith => string()?.starts_with(expected.as_str().unwrap_or_default()),
        Operator::EndsWith => string()?.ends_with(expected.as_str().unwrap_or_default()),
        Operator::IncludesAny | Operator::IncludesAll => {
            let items = array()?;
            let wanted = expected.as_array().map(Vec::as_slice).unwrap_or_default();
            let has = |w: &Value| items.iter().any(|item| scalar_eq(item, w));
            if c.operator == Operator::IncludesAny {
                wanted.iter().any(has)
            } else {
                wanted.iter().all(has)
            }
        }
        Operator::IsEmpty => array()?.is_empty(),
        Operator::IsNotEmpty => !array()?.is_empty(),
        Operator::IsNull
        | Operator::IsNotNull
        | Operator::YearsSinceGte
        | Operator::YearsSinceLte
        | Operator::MonthsSinceGte
        | Operator::MonthsSinceLte => {
            return Err(DataError::malformed(format!(
                "operator {} is not a value comparison",
                c.operator
            )))
        }
    };
    Ok(result)
}

fn compare_date(c: &Condition, actual: &Value, as_of: NaiveDate) -> Result<bool, DataError> {
    let date = actual
        .as_str()
        .and_then(|s| s.get(..10))
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
        .ok_or_else(|| DataError::type_mismatch(c.field.clone(), c.operator.as_str(), "ISO date", actual))?;
    let threshold = c.value.as_u64().unwrap_or_default() as i64;

    let result = match c.operator {
        Operator::YearsSinceGte => full_years_between(date, as_of) >= threshold,
        Operator::YearsSinceLte => full_years_between(date, as_of) <= threshold,
        Operator::MonthsSinceGte => full_months_between(date, as_of) >= threshold,
        Operator::MonthsSinceLte => full_months_between(date, as_of) <= threshold,
        other => {
            return Err(DataError::malformed(format!("operator {} is not a date comparison", other)))
        }
    };
    Ok(result)
}

fn full_months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    let months = (to.year() as i64 - from.year() as i64) * 12 + (to.month() as i64 - from.month() as i64);
    if to.day() < from.day() {
        months - 1
    } else {
        months
    }
}

fn full_years_between(from: NaiveDate, to: NaiveDate) -> i64 {
    full_months_between(from, to).div_euclid(12)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::Gender;
    use serde_json::json;

    fn applicant() -> ApplicantProfile {
        ApplicantProfile::new(52, Gender::Male, false)
            .with_fact("diabetes.insulin_use", true)
            .with_fact("diabetes.a1c", 7.2)
            .with_fact("diabetes.type", "type2")
            .with_fact("diabetes.complications", json!(["neuropathy"]))
            .with_fact("diabetes.diagnosis_date", "2015-06-01")
            .with_as_of(NaiveDate::from_ymd_opt(2024, 5, 31).unwrap())
    }

    fn parse(json: Value) -> Predicate {
        Predicate::parse(&json, PREDICATE_VERSION).unwrap()
    }

    #[test]
    fn test_truth_tables() {
        use Truth::*;
        assert_eq!(True.and(Unknown), Unknown);
        assert_eq!(False.and(Unknown), False);
        assert_eq!(True.or(Unknown), True);
        assert_eq!(False.or(Unknown), Unknown);
        assert_eq!(Unknown.negate(), Unknown);
    }

    #[test]
    fn test_empty_predicate_always_matches() {
        assert_eq!(parse(json!({})), Predicate::Always);
        assert_eq!(parse(Value::Null), Predicate::Always);
        assert_eq!(evaluate(&Predicate::Always, &applicant()).unwrap(), Truth::True);
    }

    #[test]
    fn test_versioned_wrapper() {
        let p = parse(json!({"version": 2, "root": {"field": "diabetes.insulin_use", "operator": "eq", "value": true}}));
        assert_eq!(evaluate(&p, &applicant()).unwrap(), Truth::True);

        let err = Predicate::parse(&json!({"version": 3, "root": {}}), PREDICATE_VERSION).unwrap_err();
        assert_eq!(err, DataError::UnsupportedPredicateVersion { version: 3, supported: 2 });
    }

    #[test]
    fn test_version_on_top_node_without_root() {
        let p = parse(json!({"version": 2, "field": "diabetes.insulin_use", "operator": "eq", "value": true}));
        assert_eq!(p, Predicate::leaf("diabetes.insulin_use", Operator::Eq, true));
        assert_eq!(parse(json!({"version": 2})), Predicate::Always);

        for json in [
            json!({"version": 3, "all": [{"field": "a.b", "operator": "is_not_null"}]}),
            json!({"version": 3, "field": "a.b", "operator": "eq", "value": 1}),
        ] {
            let err = Predicate::parse(&json, PREDICATE_VERSION).unwrap_err();
            assert_eq!(
                err,
                DataError::UnsupportedPredicateVersion { version: 3, supported: 2 },
                "{} must be rejected",
                json
            );
        }
    }

    #[test]
    fn test_embedded_version_overrides_rule_version() {
        let err = Predicate::parse(&json!({"version": 1, "field": "a.b", "operator": "is_not_null"}), 2).unwrap_err();
        assert!(matches!(err, DataError::UnsupportedPredicateVersion { version: 1, .. }));
        assert!(Predicate::parse(&json!({"version": 2, "field": "a.b", "operator": "is_not_null"}), 9).is_ok());
        assert!(Predicate::parse(&json!({"field": "a.b", "operator": "is_not_null"}), 9).is_err());
    }

    #[test]
    fn test_nested_version_is_malformed() {
        let cases = [
            json!({"all": [{"version": 2, "field": "a.b", "operator": "is_not_null"}]}),
            json!({"not": {"version": 2, "field": "a.b", "operator": "is_not_null"}}),
            json!({"version": 2, "root": {"version": 2, "field": "a.b", "operator": "is_not_null"}}),
        ];
        for json in cases {
            let err = Predicate::parse(&json, PREDICATE_VERSION).unwrap_err();
            assert!(matches!(err, DataError::MalformedPredicate(_)), "{} must be rejected", json);
        }
    }

    #[test]
    fn test_wrapper_rejects_extra_keys() {
        let err = Predicate::parse(&json!({"version": 2, "root": {}, "all": []}), 2).unwrap_err();
        assert!(matches!(err, DataError::MalformedPredicate(_)));
    }

    #[test]
    fn test_missing_fields_are_unique_when_not_adjacent() {
        let p = Predicate::Any(vec![
            Predicate::leaf("diabetes.x", Operator::Eq, true),
            Predicate::leaf("diabetes.y", Operator::Eq, true),
            Predicate::leaf("diabetes.x", Operator::Gt, 1),
        ]);
        let eval = evaluate_traced(&p, &applicant()).unwrap();
        assert_eq!(eval.truth, Truth::Unknown);
        assert_eq!(
            eval.missing_fields,
            vec!["diabetes.x".to_string(), "diabetes.y".to_string()],
            "each missing field is reported once"
        );
    }

    #[test]
    fn test_unknown_operator_is_data_error() {
        let err = Predicate::parse(&json!({"field": "a.b", "operator": "approximately", "value": 1}), 2).unwrap_err();
        assert!(matches!(err, DataError::UnknownOperator { .. }));
    }

    #[test]
    fn test_multiple_groups_rejected() {
        let err = Predicate::parse(&json!({"all": [], "any": []}), 2).unwrap_err();
        assert!(matches!(err, DataError::MalformedPredicate(_)));
    }

    #[test]
    fn test_missing_field_default_unknown() {
        let p = Predicate::leaf("diabetes.amputation", Operator::Eq, true);
        let eval = evaluate_traced(&p, &applicant()).unwrap();
        assert_eq!(eval.truth, Truth::Unknown);
        assert_eq!(eval.missing_fields, vec!["diabetes.amputation".to_string()]);
    }

    #[test]
    fn test_treat_null_as_overrides() {
        let p = Predicate::Leaf(
            Condition::new("diabetes.amputation", Operator::Eq, true).treat_null_as(NullPolicy::False),
        );
        assert_eq!(evaluate(&p, &applicant()).unwrap(), Truth::False);

        let p = parse(json!({"field": "x.y", "operator": "eq", "value": 1, "treatNullAs": "true"}));
        assert_eq!(evaluate(&p, &applicant()).unwrap(), Truth::True);
    }

    #[test]
    fn test_all_short_circuits_on_false_and_drops_missing() {
        let p = Predicate::All(vec![
            Predicate::leaf("diabetes.unknown_field", Operator::Eq, true),
            Predicate::leaf("diabetes.insulin_use", Operator::Eq, false),
        ]);
        let eval = evaluate_traced(&p, &applicant()).unwrap();
        assert_eq!(eval.truth, Truth::False);
        assert!(eval.missing_fields.is_empty());
    }

    #[test]
    fn test_any_unknown_when_no_true() {
        let p = Predicate::Any(vec![
            Predicate::leaf("diabetes.unknown_field", Operator::Eq, true),
            Predicate::leaf("diabetes.insulin_use", Operator::Eq, false),
        ]);
        assert_eq!(evaluate(&p, &applicant()).unwrap(), Truth::Unknown);
    }

    #[test]
    fn test_numeric_and_set_operators() {
        let profile = applicant();
        let cases = [
            (json!({"field": "diabetes.a1c", "operator": "lte", "value": 7.5}), Truth::True),
            (json!({"field": "diabetes.a1c", "operator": "gt", "value": 8}), Truth::False),
            (json!({"field": "diabetes.a1c", "operator": "between", "value": [6, 7.2]}), Truth::True),
            (json!({"field": "client.age", "operator": "gte", "value": 52}), Truth::True),
            (json!({"field": "diabetes.type", "operator": "in", "value": ["type1", "type2"]}), Truth::True),
            (json!({"field": "diabetes.type", "operator": "not_in", "value": ["type2"]}), Truth::False),
            (json!({"field": "diabetes.type", "operator": "contains", "value": "2"}), Truth::True),
            (json!({"field": "diabetes.complications", "operator": "contains", "value": "neuropathy"}), Truth::True),
            (json!({"field": "diabetes.complications", "operator": "includes_any", "value": ["retinopathy", "neuropathy"]}), Truth::True),
            (json!({"field": "diabetes.complications", "operator": "includes_all", "value": ["retinopathy", "neuropathy"]}), Truth::False),
            (json!({"field": "diabetes.complications", "operator": "is_empty"}), Truth::False),
            (json!({"field": "diabetes.amputation", "operator": "is_null"}), Truth::True),
            (json!({"field": "conditions", "operator": "contains", "value": "diabetes"}), Truth::True),
        ];

        for (json, expected) in cases {
            let p = parse(json.clone());
            assert_eq!(evaluate(&p, &profile).unwrap(), expected, "predicate {}", json);
        }
    }

    #[test]
    fn test_date_operators() {
        let profile = applicant();
        // 2015-06-01 to 2024-05-31 is 8 full years
        let p = parse(json!({"field": "diabetes.diagnosis_date", "operator": "years_since_gte", "value": 8}));
        assert_eq!(evaluate(&p, &profile).unwrap(), Truth::True);
        let p = parse(json!({"field": "diabetes.diagnosis_date", "operator": "years_since_gte", "value": 9}));
        assert_eq!(evaluate(&p, &profile).unwrap(), Truth::False);

        let mut undated = profile.clone();
        undated.as_of = None;
        assert_eq!(evaluate(&p, &undated).unwrap(), Truth::Unknown);
    }

    #[test]
    fn test_type_mismatch_is_surfaced() {
        let p = parse(json!({"field": "diabetes.type", "operator": "gt", "value": 1}));
        let err = evaluate(&p, &applicant()).unwrap_err();
        assert!(matches!(err, DataError::TypeMismatch { ref expected, .. } if expected == "number"));

        let p = parse(json!({"field": "diabetes.insulin_use", "operator": "eq", "value": "yes"}));
        assert!(evaluate(&p, &applicant()).is_err());
    }

    #[test]
    fn test_round_trip_through_serde() {
        let original = json!({"all": [
            {"field": "diabetes.insulin_use", "operator": "eq", "value": true},
            {"not": {"field": "diabetes.a1c", "operator": "lte", "value": 7.5, "treatNullAs": "false"}}
        ]});
        let p: Predicate = serde_json::from_value(original.clone()).unwrap();
        assert_eq!(serde_json::to_value(&p).unwrap(), original);
        assert_eq!(p.fields(), vec!["diabetes.insulin_use", "diabetes.a1c"]);
    }
}
