//! Stack template parsing.
//!
//! Bodies may be JSON or YAML. YAML short-form intrinsic tags (`!Ref`,
//! `!Equals`, ...) are rewritten into their long form so both syntaxes
//! reach the evaluator as the same JSON tree.

use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

use crate::error::{Result, StackError};

use super::types::{ConditionValue, TemplateDocument};

/// Parses a template body, evaluating its conditions against `parameters`.
///
/// Parameters missing from `parameters` fall back to the template's
/// declared `Default`.
///
/// # Errors
///
/// Returns `TemplateParse` if the body is not a JSON or YAML mapping or a
/// reported section has the wrong shape.
pub fn parse_template(
    stack: &str,
    body: &str,
    parameters: &HashMap<String, String>,
) -> Result<TemplateDocument> {
    let document = parse_body(body).map_err(|message| StackError::template(stack, message))?;
    let Value::Object(root) = document else {
        return Err(StackError::template(stack, "template is not a mapping").into());
    };

    let description = scalar_string(root.get("Description"));
    let format_version = scalar_string(root.get("AWSTemplateFormatVersion"));

    let rules: BTreeMap<String, Value> = section(&root, "Rules")
        .map_err(|message| StackError::template(stack, message))?
        .into_iter()
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();

    let condition_exprs =
        section(&root, "Conditions").map_err(|message| StackError::template(stack, message))?;
    let declared =
        section(&root, "Parameters").map_err(|message| StackError::template(stack, message))?;

    let mut effective: HashMap<String, String> = declared
        .iter()
        .filter_map(|(name, decl)| {
            scalar_string(decl.get("Default")).map(|default| (name.clone(), default))
        })
        .collect();
    effective.extend(parameters.iter().map(|(k, v)| (k.clone(), v.clone())));

    let mut evaluator = ConditionEvaluator::new(condition_exprs, &effective);
    let conditions = condition_exprs
        .iter()
        .map(|(name, expr)| {
            let value = evaluator
                .condition(name)
                .map_or_else(|| ConditionValue::Expression(expr.clone()), ConditionValue::Resolved);
            (name.clone(), value)
        })
        .collect();

    debug!(
        "Parsed template for {stack}: {} rule(s), {} condition(s)",
        rules.len(),
        condition_exprs.len()
    );

    Ok(TemplateDocument {
        description,
        format_version,
        rules,
        conditions,
    })
}

/// Parses a JSON or YAML body into a JSON tree.
fn parse_body(body: &str) -> std::result::Result<Value, String> {
    let trimmed = body.trim_start();
    if trimmed.starts_with('{') {
        if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
            return Ok(value);
        }
    }

    let yaml: serde_yaml::Value =
        serde_yaml::from_str(body).map_err(|e| format!("invalid template body: {e}"))?;
    Ok(yaml_to_json(yaml))
}

/// Returns a top-level mapping section, or an empty one when absent.
fn section<'a>(
    root: &'a Map<String, Value>,
    key: &str,
) -> std::result::Result<&'a Map<String, Value>, String> {
    static EMPTY: std::sync::OnceLock<Map<String, Value>> = std::sync::OnceLock::new();

    match root.get(key) {
        None | Some(Value::Null) => Ok(EMPTY.get_or_init(Map::new)),
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(format!("{key} section is not a mapping")),
    }
}

fn scalar_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn yaml_to_json(value: serde_yaml::Value) -> Value {
    use serde_yaml::Value as Yaml;

    match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map_or(Value::Null, Value::Number)
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(items.into_iter().map(yaml_to_json).collect()),
        Yaml::Mapping(mapping) => Value::Object(
            mapping
                .into_iter()
                .map(|(k, v)| (yaml_key(k), yaml_to_json(v)))
                .collect(),
        ),
        Yaml::Tagged(tagged) => {
            let serde_yaml::value::TaggedValue { tag, value } = *tagged;
            let tag = tag.to_string();
            expand_tag(tag.trim_start_matches('!'), yaml_to_json(value))
        }
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        other => match yaml_to_json(other) {
            Value::String(s) => s,
            json => json.to_string(),
        },
    }
}

/// Rewrites a short-form intrinsic into its long form.
fn expand_tag(tag: &str, value: Value) -> Value {
    let mut map = Map::new();
    match tag {
        "Ref" | "Condition" => {
            map.insert(tag.to_string(), value);
        }
        "GetAtt" => {
            let value = match value {
                Value::String(s) => match s.split_once('.') {
                    Some((resource, attribute)) => Value::Array(vec![
                        Value::String(resource.to_string()),
                        Value::String(attribute.to_string()),
                    ]),
                    None => Value::String(s),
                },
                other => other,
            };
            map.insert(String::from("Fn::GetAtt"), value);
        }
        other => {
            map.insert(format!("Fn::{other}"), value);
        }
    }
    Value::Object(map)
}

/// Evaluates template conditions with memoization and cycle detection.
struct ConditionEvaluator<'a> {
    expressions: &'a Map<String, Value>,
    parameters: &'a HashMap<String, String>,
    cache: HashMap<String, Option<bool>>,
    visiting: HashSet<String>,
}

impl<'a> ConditionEvaluator<'a> {
    fn new(expressions: &'a Map<String, Value>, parameters: &'a HashMap<String, String>) -> Self {
        Self {
            expressions,
            parameters,
            cache: HashMap::new(),
            visiting: HashSet::new(),
        }
    }

    fn condition(&mut self, name: &str) -> Option<bool> {
        if let Some(cached) = self.cache.get(name) {
            return *cached;
        }
        if !self.visiting.insert(name.to_string()) {
            debug!("Condition cycle through {name}");
            return None;
        }

        let expressions = self.expressions;
        let result = expressions.get(name).and_then(|expr| self.eval(expr));

        self.visiting.remove(name);
        self.cache.insert(name.to_string(), result);
        result
    }

    fn eval(&mut self, expr: &Value) -> Option<bool> {
        match expr {
            Value::Bool(b) => Some(*b),
            Value::Object(map) if map.len() == 1 => {
                let (function, args) = map.iter().next()?;
                match function.as_str() {
                    "Fn::Equals" => match args.as_array()?.as_slice() {
                        [left, right] => Some(self.scalar(left)? == self.scalar(right)?),
                        _ => None,
                    },
                    "Fn::Not" => match args.as_array()?.as_slice() {
                        [inner] => self.eval(inner).map(|b| !b),
                        _ => None,
                    },
                    "Fn::And" => {
                        let mut all = true;
                        for item in args.as_array()? {
                            all &= self.eval(item)?;
                        }
                        Some(all)
                    }
                    "Fn::Or" => {
                        let mut any = false;
                        for item in args.as_array()? {
                            any |= self.eval(item)?;
                        }
                        Some(any)
                    }
                    "Condition" => self.condition(args.as_str()?),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    fn scalar(&self, value: &Value) -> Option<String> {
        match value {
            Value::Object(map) if map.len() == 1 => match map.get("Ref") {
                Some(Value::String(name)) => self.parameters.get(name).cloned(),
                _ => None,
            },
            other => scalar_string(Some(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StacklensError;
    use serde_json::json;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_parse_yaml_with_short_form_tags() {
        let body = r"
AWSTemplateFormatVersion: '2010-09-09'
Description: Web tier
Parameters:
  Env:
    Type: String
    Default: dev
Conditions:
  IsProd: !Equals [!Ref Env, prod]
  IsNotProd: !Not [!Condition IsProd]
Resources:
  Bucket:
    Type: AWS::S3::Bucket
";
        let template = parse_template("web", body, &HashMap::new()).expect("valid template");

        assert_eq!(template.description.as_deref(), Some("Web tier"));
        assert_eq!(template.format_version.as_deref(), Some("2010-09-09"));
        assert_eq!(template.conditions["IsProd"], ConditionValue::Resolved(false));
        assert_eq!(template.conditions["IsNotProd"], ConditionValue::Resolved(true));
    }

    #[test]
    fn test_overrides_win_over_defaults() {
        let body = r#"{
  "Parameters": {"Env": {"Type": "String", "Default": "dev"}},
  "Conditions": {
    "IsProd": {"Fn::Equals": [{"Ref": "Env"}, "prod"]},
    "ProdAndEu": {"Fn::And": [{"Condition": "IsProd"}, {"Fn::Equals": [{"Ref": "Region"}, "eu"]}]}
  }
}"#;
        let template =
            parse_template("web", body, &params(&[("Env", "prod"), ("Region", "eu")]))
                .expect("valid template");

        assert_eq!(template.conditions["IsProd"], ConditionValue::Resolved(true));
        assert_eq!(template.conditions["ProdAndEu"], ConditionValue::Resolved(true));
    }

    #[test]
    fn test_undecidable_condition_keeps_expression() {
        let body = r#"{
  "Conditions": {
    "InUsEast": {"Fn::Equals": [{"Ref": "AWS::Region"}, "us-east-1"]},
    "Loop": {"Condition": "Loop"}
  }
}"#;
        let template = parse_template("web", body, &HashMap::new()).expect("valid template");

        assert_eq!(
            template.conditions["InUsEast"],
            ConditionValue::Expression(json!({"Fn::Equals": [{"Ref": "AWS::Region"}, "us-east-1"]}))
        );
        assert_eq!(
            template.conditions["Loop"],
            ConditionValue::Expression(json!({"Condition": "Loop"}))
        );
    }

    #[test]
    fn test_rules_are_kept_as_is() {
        let body = r"
Rules:
  ProdInstanceType:
    RuleCondition: !Equals [!Ref Env, prod]
    Assertions:
      - Assert: !Contains [[m5.large], !Ref InstanceType]
";
        let template = parse_template("web", body, &HashMap::new()).expect("valid template");

        let rule = &template.rules["ProdInstanceType"];
        assert_eq!(
            rule["RuleCondition"],
            json!({"Fn::Equals": [{"Ref": "Env"}, "prod"]})
        );
        assert_eq!(
            rule["Assertions"][0]["Assert"],
            json!({"Fn::Contains": [["m5.large"], {"Ref": "InstanceType"}]})
        );
    }

    #[test]
    fn test_get_att_short_form() {
        let value = expand_tag("GetAtt", Value::String(String::from("Bucket.Arn")));
        assert_eq!(value, json!({"Fn::GetAtt": ["Bucket", "Arn"]}));
    }

    #[test]
    fn test_malformed_body_is_parse_error() {
        let result = parse_template("web", "Resources: [unclosed", &HashMap::new());
        assert!(matches!(
            result,
            Err(StacklensError::Stack(StackError::TemplateParse { .. }))
        ));

        let result = parse_template("web", "- just\n- a list\n", &HashMap::new());
        assert!(matches!(
            result,
            Err(StacklensError::Stack(StackError::TemplateParse { .. }))
        ));
    }
}
