//! Resource Schemas
//!
//! Per-attribute declarations (required, optional, computed, ForceNew,
//! defaults and validators) plus the validation and planning logic that runs
//! before any cloud API is called.

use std::collections::BTreeMap;

use serde::Serialize;
use stratus_common::{types::is_valid_account_id, Error};

use crate::state::DynamicValue;

/// Type of an attribute value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    String,
    Bool,
    Int,
    List(Box<AttributeType>),
    Set(Box<AttributeType>),
    Map(Box<AttributeType>),
    /// Nested block, used as the element type of a list or set
    Object(Vec<Attribute>),
}

/// Who supplies the value of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    Required,
    Optional,
    /// Server-assigned, read-only to the caller
    Computed,
    /// Caller may set it; the server fills it in otherwise
    OptionalComputed,
}

/// Value constraint checked during validation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Validator {
    StringLenBetween(usize, usize),
    StringInSlice(Vec<&'static str>),
    StringIsJson,
    AccountId,
}

impl Validator {
    fn check(&self, value: &DynamicValue) -> Option<String> {
        match (self, value) {
            (Validator::StringLenBetween(min, max), DynamicValue::String(s)) => {
                let len = s.chars().count();
                (len < *min || len > *max).then(|| {
                    format!("expected length to be in the range ({} - {}), got {}", min, max, len)
                })
            }
            (Validator::StringInSlice(allowed), DynamicValue::String(s)) => {
                (!allowed.contains(&s.as_str()))
                    .then(|| format!("expected to be one of {:?}, got {}", allowed, s))
            }
            (Validator::StringIsJson, DynamicValue::String(s)) => serde_json::from_str::<
                serde_json::Value,
            >(s)
            .err()
            .map(|e| format!("contains an invalid JSON: {}", e)),
            (Validator::AccountId, DynamicValue::String(s)) => (!is_valid_account_id(s))
                .then(|| format!("{:?} is not a valid account id", s)),
            _ => None,
        }
    }
}

/// How two values of an attribute are compared when diffing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffMode {
    Exact,
    /// Strings holding JSON documents compare by parsed value
    EquivalentJson,
}

/// Schema of a single attribute
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub ty: AttributeType,
    pub presence: Presence,
    pub force_new: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<DynamicValue>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<Validator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conflicts_with: Vec<&'static str>,
    pub diff: DiffMode,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub description: &'static str,
}

impl Attribute {
    fn new(name: &'static str, ty: AttributeType, presence: Presence) -> Self {
        Self {
            name,
            ty,
            presence,
            force_new: false,
            default: None,
            validators: Vec::new(),
            max_items: None,
            conflicts_with: Vec::new(),
            diff: DiffMode::Exact,
            description: "",
        }
    }

    pub fn required(name: &'static str, ty: AttributeType) -> Self {
        Self::new(name, ty, Presence::Required)
    }

    pub fn optional(name: &'static str, ty: AttributeType) -> Self {
        Self::new(name, ty, Presence::Optional)
    }

    pub fn computed(name: &'static str, ty: AttributeType) -> Self {
        Self::new(name, ty, Presence::Computed)
    }

    pub fn optional_computed(name: &'static str, ty: AttributeType) -> Self {
        Self::new(name, ty, Presence::OptionalComputed)
    }

    /// Optional map of string tags
    pub fn tags() -> Self {
        Self::optional("tags", AttributeType::Map(Box::new(AttributeType::String)))
            .with_description("Key-value tags assigned to the resource")
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn with_default(mut self, value: DynamicValue) -> Self {
        self.default = Some(value);
        self
    }

    pub fn validate(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn max_items(mut self, n: usize) -> Self {
        self.max_items = Some(n);
        self
    }

    pub fn conflicts_with(mut self, names: &[&'static str]) -> Self {
        self.conflicts_with.extend_from_slice(names);
        self
    }

    pub fn equivalent_json(mut self) -> Self {
        self.diff = DiffMode::EquivalentJson;
        self
    }

    pub fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub fn is_computed_only(&self) -> bool {
        self.presence == Presence::Computed
    }

    /// Compare two values of this attribute, treating null, empty strings and
    /// empty collections alike and honoring set and JSON semantics.
    pub fn values_equal(&self, a: Option<&DynamicValue>, b: Option<&DynamicValue>) -> bool {
        let a = normalize(a);
        let b = normalize(b);
        match (a, b) {
            (None, None) => true,
            (None, Some(_)) | (Some(_), None) => false,
            (Some(a), Some(b)) => {
                if self.diff == DiffMode::EquivalentJson {
                    if let (Some(x), Some(y)) = (a.as_string(), b.as_string()) {
                        return json_equivalent(x, y);
                    }
                }
                match &self.ty {
                    AttributeType::Set(_) => set_equal(a, b),
                    _ => a == b,
                }
            }
        }
    }
}

fn normalize(v: Option<&DynamicValue>) -> Option<&DynamicValue> {
    match v {
        None | Some(DynamicValue::Null) => None,
        Some(DynamicValue::String(s)) if s.is_empty() => None,
        Some(DynamicValue::List(l)) if l.is_empty() => None,
        Some(DynamicValue::Map(m)) if m.is_empty() => None,
        Some(v) => Some(v),
    }
}

fn json_equivalent(a: &str, b: &str) -> bool {
    match (
        serde_json::from_str::<serde_json::Value>(a),
        serde_json::from_str::<serde_json::Value>(b),
    ) {
        (Ok(x), Ok(y)) => x == y,
        _ => a == b,
    }
}

fn set_equal(a: &DynamicValue, b: &DynamicValue) -> bool {
    let (Some(a), Some(b)) = (a.as_list(), b.as_list()) else {
        return a == b;
    };
    if a.len() != b.len() {
        return false;
    }
    let key = |v: &DynamicValue| serde_json::to_string(v).unwrap_or_default();
    let mut a: Vec<String> = a.iter().map(key).collect();
    let mut b: Vec<String> = b.iter().map(key).collect();
    a.sort();
    b.sort();
    a == b
}

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

/// A validation finding tied to an attribute path
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    pub attribute: Option<String>,
}

impl Diagnostic {
    pub fn error(attribute: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
            attribute: Some(attribute.into()),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.attribute {
            Some(attr) => write!(f, "{}: {}", attr, self.summary),
            None => write!(f, "{}", self.summary),
        }
    }
}

/// What applying a plan will do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanAction {
    Create,
    Update,
    Replace,
    Delete,
    NoOp,
}

impl std::fmt::Display for PlanAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanAction::Create => write!(f, "create"),
            PlanAction::Update => write!(f, "update"),
            PlanAction::Replace => write!(f, "replace"),
            PlanAction::Delete => write!(f, "delete"),
            PlanAction::NoOp => write!(f, "no-op"),
        }
    }
}

/// Result of planning a change
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedChange {
    pub action: PlanAction,
    pub planned_state: DynamicValue,
    pub requires_replace: Vec<String>,
    pub changed: Vec<String>,
}

/// Schema of one resource or data source type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceSchema {
    pub type_name: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub description: &'static str,
    pub attributes: Vec<Attribute>,
}

impl ResourceSchema {
    /// New schema; every type carries a computed `id`.
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            description: "",
            attributes: vec![Attribute::computed("id", AttributeType::String)],
        }
    }

    pub fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.retain(|a| a.name != attribute.name);
        self.attributes.push(attribute);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Validate caller-supplied configuration
    pub fn validate(&self, config: &DynamicValue) -> Vec<Diagnostic> {
        let mut diags = Vec::new();
        validate_object("", &self.attributes, config, &mut diags);
        diags
    }

    /// Validate and turn any diagnostics into a single error
    pub fn validate_strict(&self, config: &DynamicValue) -> Result<(), Error> {
        let diags = self.validate(config);
        if diags.is_empty() {
            return Ok(());
        }
        let summary = diags
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        Err(Error::Validation(format!("{}: {}", self.type_name, summary)))
    }

    /// Fill in declared defaults for attributes the caller left unset
    pub fn apply_defaults(&self, config: &DynamicValue) -> DynamicValue {
        let mut out = match config {
            DynamicValue::Map(_) => config.clone(),
            _ => DynamicValue::Map(BTreeMap::new()),
        };
        for attr in &self.attributes {
            if let Some(default) = &attr.default {
                if !out.has(attr.name) {
                    out.set(attr.name, default.clone());
                }
            }
        }
        out
    }

    /// Plan the change from `prior` state to `proposed` configuration
    pub fn plan(&self, prior: Option<&DynamicValue>, proposed: &DynamicValue) -> PlannedChange {
        let prior = prior.filter(|p| !p.is_null());

        let Some(prior) = prior else {
            return PlannedChange {
                action: if proposed.is_null() {
                    PlanAction::NoOp
                } else {
                    PlanAction::Create
                },
                planned_state: if proposed.is_null() {
                    DynamicValue::Null
                } else {
                    self.apply_defaults(proposed)
                },
                requires_replace: Vec::new(),
                changed: Vec::new(),
            };
        };

        if proposed.is_null() {
            return PlannedChange {
                action: PlanAction::Delete,
                planned_state: DynamicValue::Null,
                requires_replace: Vec::new(),
                changed: Vec::new(),
            };
        }

        let mut planned = self.apply_defaults(proposed);
        for attr in &self.attributes {
            let prior_value = prior.get(attr.name);
            let carry = match attr.presence {
                Presence::Computed => true,
                Presence::OptionalComputed => !planned.has(attr.name),
                _ => false,
            } || (attr.diff == DiffMode::EquivalentJson
                && attr.values_equal(prior_value, planned.get(attr.name)));
            if carry {
                planned.set(attr.name, prior_value.cloned().unwrap_or_default());
            }
        }

        let changed: Vec<String> = self
            .attributes
            .iter()
            .filter(|a| !a.values_equal(prior.get(a.name), planned.get(a.name)))
            .map(|a| a.name.to_string())
            .collect();

        let requires_replace: Vec<String> = self
            .attributes
            .iter()
            .filter(|a| a.force_new && changed.iter().any(|c| c == a.name))
            .map(|a| a.name.to_string())
            .collect();

        if !requires_replace.is_empty() {
            // The replacement starts from configuration only; computed values
            // are unknown until the new resource exists.
            return PlannedChange {
                action: PlanAction::Replace,
                planned_state: self.apply_defaults(proposed),
                requires_replace,
                changed,
            };
        }

        PlannedChange {
            action: if changed.is_empty() {
                PlanAction::NoOp
            } else {
                PlanAction::Update
            },
            planned_state: planned,
            requires_replace,
            changed,
        }
    }

    /// Reject an in-place update that touches a ForceNew attribute
    pub fn check_update(&self, prior: &DynamicValue, planned: &DynamicValue) -> Result<(), Error> {
        for attr in self.attributes.iter().filter(|a| a.force_new) {
            let new = planned.get(attr.name);
            if attr.presence == Presence::OptionalComputed && normalize(new).is_none() {
                continue;
            }
            if !attr.values_equal(prior.get(attr.name), new) {
                return Err(Error::ForceNewChanged {
                    resource_type: self.type_name.to_string(),
                    attribute: attr.name.to_string(),
                });
            }
        }
        Ok(())
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

fn validate_object(
    prefix: &str,
    attributes: &[Attribute],
    value: &DynamicValue,
    diags: &mut Vec<Diagnostic>,
) {
    let empty = BTreeMap::new();
    let map = match value {
        DynamicValue::Null => &empty,
        DynamicValue::Map(m) => m,
        other => {
            diags.push(Diagnostic {
                severity: Severity::Error,
                summary: format!("expected an object, got {}", other.type_name()),
                attribute: (!prefix.is_empty()).then(|| prefix.to_string()),
            });
            return;
        }
    };

    for key in map.keys() {
        if key != "id" && !attributes.iter().any(|a| a.name == key) {
            diags.push(Diagnostic::error(
                join_path(prefix, key),
                "An argument with this name is not expected here",
            ));
        }
    }

    for attr in attributes {
        let path = join_path(prefix, attr.name);
        let present = map.get(attr.name).filter(|v| !v.is_null());

        let Some(v) = present else {
            if attr.presence == Presence::Required && attr.default.is_none() {
                diags.push(Diagnostic::error(path, "The argument is required, but no definition was found"));
            }
            continue;
        };

        if attr.is_computed_only() {
            if attr.name != "id" {
                diags.push(Diagnostic::error(path, "Value for unconfigurable attribute"));
            }
            continue;
        }

        for other in &attr.conflicts_with {
            if map.get(*other).map(|o| !o.is_null()).unwrap_or(false) {
                diags.push(Diagnostic::error(
                    path.clone(),
                    format!("conflicts with {}", other),
                ));
            }
        }

        validate_value(&path, attr, &attr.ty, v, diags);
    }
}

fn validate_value(
    path: &str,
    attr: &Attribute,
    ty: &AttributeType,
    value: &DynamicValue,
    diags: &mut Vec<Diagnostic>,
) {
    let mismatch = |expected: &str| {
        Diagnostic::error(
            path,
            format!("expected {}, got {}", expected, value.type_name()),
        )
    };

    match (ty, value) {
        (AttributeType::String, DynamicValue::String(_))
        | (AttributeType::Bool, DynamicValue::Bool(_)) => {}
        (AttributeType::Int, DynamicValue::Number(n)) if n.is_i64() => {}
        (AttributeType::String, _) => return diags.push(mismatch("string")),
        (AttributeType::Bool, _) => return diags.push(mismatch("bool")),
        (AttributeType::Int, _) => return diags.push(mismatch("integer")),
        (AttributeType::List(elem) | AttributeType::Set(elem), DynamicValue::List(items)) => {
            if let Some(max) = attr.max_items {
                if items.len() > max {
                    diags.push(Diagnostic::error(
                        path,
                        format!("attribute supports {} item maximum, config has {} declared", max, items.len()),
                    ));
                }
            }
            for (i, item) in items.iter().enumerate() {
                let item_path = format!("{}[{}]", path, i);
                match elem.as_ref() {
                    AttributeType::Object(nested) => {
                        validate_object(&item_path, nested, item, diags)
                    }
                    elem_ty => validate_value(&item_path, attr, elem_ty, item, diags),
                }
            }
            return;
        }
        (AttributeType::List(_) | AttributeType::Set(_), _) => {
            return diags.push(mismatch("list"))
        }
        (AttributeType::Map(elem), DynamicValue::Map(entries)) => {
            for (k, v) in entries {
                let entry_path = format!("{}.{}", path, k);
                validate_value(&entry_path, attr, elem, v, diags);
            }
            return;
        }
        (AttributeType::Map(_), _) => return diags.push(mismatch("map")),
        (AttributeType::Object(nested), _) => {
            return validate_object(path, nested, value, diags);
        }
    }

    for validator in &attr.validators {
        if let Some(problem) = validator.check(value) {
            diags.push(Diagnostic::error(path, problem));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{int_value, list_value, make_state, string_value};

    fn alias_like() -> ResourceSchema {
        ResourceSchema::new("test_alias")
            .attribute(
                Attribute::required("name", AttributeType::String)
                    .validate(Validator::StringLenBetween(1, 8)),
            )
            .attribute(Attribute::required("vpc_id", AttributeType::String).force_new())
            .attribute(
                Attribute::optional("language", AttributeType::String)
                    .with_default(string_value("en"))
                    .validate(Validator::StringInSlice(vec!["en", "jp"])),
            )
            .attribute(Attribute::optional("doc", AttributeType::String).equivalent_json())
            .attribute(Attribute::computed("arn", AttributeType::String))
            .attribute(
                Attribute::optional_computed("owner", AttributeType::String).force_new(),
            )
            .attribute(
                Attribute::optional(
                    "strategy",
                    AttributeType::List(Box::new(AttributeType::Object(vec![
                        Attribute::required("type", AttributeType::String),
                    ]))),
                )
                .max_items(1),
            )
            .attribute(Attribute::optional(
                "params",
                AttributeType::Set(Box::new(AttributeType::String)),
            ))
    }

    #[test]
    fn test_validate_reports_problems() {
        let schema = alias_like();
        let config = make_state(vec![
            ("name", string_value("far-too-long-name")),
            ("language", string_value("fr")),
            ("arn", string_value("arn:aws:x")),
            ("bogus", int_value(1)),
            (
                "strategy",
                list_value(vec![make_state(vec![]), make_state(vec![])]),
            ),
        ]);
        let diags = schema.validate(&config);
        let attrs: Vec<String> = diags.iter().filter_map(|d| d.attribute.clone()).collect();

        assert!(attrs.contains(&"name".to_string()));
        assert!(attrs.contains(&"vpc_id".to_string()));
        assert!(attrs.contains(&"language".to_string()));
        assert!(attrs.contains(&"arn".to_string()));
        assert!(attrs.contains(&"bogus".to_string()));
        assert!(attrs.contains(&"strategy".to_string()));
        assert!(attrs.contains(&"strategy[0].type".to_string()));
    }

    #[test]
    fn test_validate_accepts_good_config() {
        let schema = alias_like();
        let config = make_state(vec![
            ("name", string_value("edge")),
            ("vpc_id", string_value("vpc-1")),
            ("doc", string_value(r#"{"a": 1}"#)),
        ]);
        assert!(schema.validate(&config).is_empty());
        assert!(schema.validate_strict(&config).is_ok());
    }

    #[test]
    fn test_json_validator() {
        let schema = ResourceSchema::new("t").attribute(
            Attribute::required("doc", AttributeType::String).validate(Validator::StringIsJson),
        );
        let bad = make_state(vec![("doc", string_value("{nope"))]);
        assert_eq!(schema.validate(&bad).len(), 1);
    }

    #[test]
    fn test_plan_create_applies_defaults() {
        let schema = alias_like();
        let proposed = make_state(vec![("name", string_value("edge"))]);
        let plan = schema.plan(None, &proposed);
        assert_eq!(plan.action, PlanAction::Create);
        assert_eq!(
            plan.planned_state.get("language"),
            Some(&string_value("en"))
        );
    }

    #[test]
    fn test_plan_update_carries_computed() {
        let schema = alias_like();
        let prior = make_state(vec![
            ("id", string_value("a-1")),
            ("name", string_value("edge")),
            ("vpc_id", string_value("vpc-1")),
            ("language", string_value("en")),
            ("arn", string_value("arn:aws:gamelift:r:a:alias/a-1")),
            ("owner", string_value("123456789012")),
        ]);
        let proposed = make_state(vec![
            ("name", string_value("core")),
            ("vpc_id", string_value("vpc-1")),
        ]);
        let plan = schema.plan(Some(&prior), &proposed);
        assert_eq!(plan.action, PlanAction::Update);
        assert_eq!(plan.changed, vec!["name".to_string()]);
        assert_eq!(plan.planned_state.get("id"), prior.get("id"));
        assert_eq!(plan.planned_state.get("arn"), prior.get("arn"));
        assert_eq!(plan.planned_state.get("owner"), prior.get("owner"));
    }

    #[test]
    fn test_plan_force_new_requires_replace() {
        let schema = alias_like();
        let prior = make_state(vec![
            ("id", string_value("a-1")),
            ("name", string_value("edge")),
            ("vpc_id", string_value("vpc-1")),
            ("language", string_value("en")),
        ]);
        let proposed = make_state(vec![
            ("name", string_value("edge")),
            ("vpc_id", string_value("vpc-2")),
        ]);
        let plan = schema.plan(Some(&prior), &proposed);
        assert_eq!(plan.action, PlanAction::Replace);
        assert_eq!(plan.requires_replace, vec!["vpc_id".to_string()]);
        assert!(!plan.planned_state.has("id"));
    }

    #[test]
    fn test_plan_suppresses_equivalent_json_and_set_order() {
        let schema = alias_like();
        let prior = make_state(vec![
            ("name", string_value("edge")),
            ("vpc_id", string_value("vpc-1")),
            ("language", string_value("en")),
            ("doc", string_value(r#"{"a":1,"b":[1,2]}"#)),
            (
                "params",
                list_value(vec![string_value("x"), string_value("y")]),
            ),
        ]);
        let proposed = make_state(vec![
            ("name", string_value("edge")),
            ("vpc_id", string_value("vpc-1")),
            ("doc", string_value("{\n  \"b\": [1, 2],\n  \"a\": 1\n}")),
            (
                "params",
                list_value(vec![string_value("y"), string_value("x")]),
            ),
        ]);
        let plan = schema.plan(Some(&prior), &proposed);
        assert_eq!(plan.action, PlanAction::NoOp, "changed: {:?}", plan.changed);
        assert_eq!(plan.planned_state.get("doc"), prior.get("doc"));
    }

    #[test]
    fn test_plan_delete() {
        let schema = alias_like();
        let prior = make_state(vec![("id", string_value("a-1"))]);
        let plan = schema.plan(Some(&prior), &DynamicValue::Null);
        assert_eq!(plan.action, PlanAction::Delete);
        assert!(plan.planned_state.is_null());
    }

    #[test]
    fn test_check_update_rejects_force_new() {
        let schema = alias_like();
        let prior = make_state(vec![
            ("vpc_id", string_value("vpc-1")),
            ("owner", string_value("111111111111")),
        ]);

        let same = make_state(vec![("vpc_id", string_value("vpc-1"))]);
        assert!(schema.check_update(&prior, &same).is_ok());

        let moved = make_state(vec![("vpc_id", string_value("vpc-2"))]);
        match schema.check_update(&prior, &moved) {
            Err(Error::ForceNewChanged { attribute, .. }) => assert_eq!(attribute, "vpc_id"),
            other => panic!("expected ForceNewChanged, got {:?}", other),
        }

        let new_owner = make_state(vec![
            ("vpc_id", string_value("vpc-1")),
            ("owner", string_value("222222222222")),
        ]);
        assert!(schema.check_update(&prior, &new_owner).is_err());
    }
}
