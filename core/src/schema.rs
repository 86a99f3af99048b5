//! Declared parameter kinds and bounds.
//!
//! The settings panels edit each known parameter through either a slider
//! (numeric, bounded, stepped) or a text field. The schema records those
//! declarations so the write path can clamp and validate values the same
//! way the panel widgets do, and so secrets are never echoed back.

use std::collections::BTreeMap;

use serde_yaml::Value;

use crate::codec::ParamValue;
use crate::error::{Result, SettingsError};
use crate::key::ParameterKey;

const MASK: &str = "********";


#[derive(Debug, Clone, PartialEq)]
pub enum ParamKind {
    /// Numeric value edited on a stepped slider.
    Slider { min: f64, max: f64, step: f64 },
    /// Free text. `required` text may not be empty; `secret` text is masked.
    Text { required: bool, secret: bool },
}


#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub label: String,
    pub kind: ParamKind,
}

impl ParamSpec {
    pub fn slider(label: &str, min: f64, max: f64, step: f64) -> Self {
        ParamSpec {
            label: label.into(),
            kind: ParamKind::Slider { min, max, step },
        }
    }

    pub fn text(label: &str) -> Self {
        ParamSpec {
            label: label.into(),
            kind: ParamKind::Text {
                required: false,
                secret: false,
            },
        }
    }

    pub fn required(mut self) -> Self {
        if let ParamKind::Text { required, .. } = &mut self.kind {
            *required = true;
        }
        self
    }

    pub fn secret(mut self) -> Self {
        if let ParamKind::Text { secret, .. } = &mut self.kind {
            *secret = true;
        }
        self
    }

    pub fn is_secret(&self) -> bool {
        matches!(self.kind, ParamKind::Text { secret: true, .. })
    }
}


/// Parameter declarations keyed by [`ParameterKey`].
#[derive(Debug, Clone, Default)]
pub struct Schema {
    specs: BTreeMap<ParameterKey, ParamSpec>,
}

impl Schema {
    pub fn new() -> Self {
        Schema::default()
    }

    /// The parameters the mowbot settings panels expose.
    pub fn mowbot() -> Self {
        let mut s = Schema::new();
        s.declare("ntrip_client.username", ParamSpec::text("Username").required());
        s.declare(
            "ntrip_client.password",
            ParamSpec::text("Password").required().secret(),
        );
        s.declare(
            "cmdvel_scaler_node.left_rate",
            ParamSpec::slider("Left Motor Rate", 0.0, 1.0, 0.01),
        );
        s.declare(
            "cmdvel_scaler_node.right_rate",
            ParamSpec::slider("Right Motor Rate", 0.0, 1.0, 0.01),
        );
        s.declare("kt_server_client_node.robot_serial", ParamSpec::text("Robot Serial"));
        s.declare("kt_server_client_node.client_id", ParamSpec::text("Client ID"));
        s.declare(
            "kt_server_client_node.client_secret",
            ParamSpec::text("Client Secret").secret(),
        );
        s.declare(
            "kt_server_client_node.robot_status_report_hz",
            ParamSpec::slider("Status Report Rate (Hz)", 0.0, 10.0, 1.0),
        );
        s
    }

    /// Add or replace a declaration. `key` must be dotted; built-in keys
    /// are literals, so a bad one is a programming error and is skipped.
    pub fn declare(&mut self, key: &str, spec: ParamSpec) {
        if let Ok(k) = ParameterKey::parse(key) {
            self.specs.insert(k, spec);
        }
    }

    pub fn get(&self, key: &ParameterKey) -> Option<&ParamSpec> {
        self.specs.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ParameterKey, &ParamSpec)> {
        self.specs.iter()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Validate `value` and bring it onto the declared grid.
    ///
    /// Slider values are clamped to `[min, max]` and snapped to `step`.
    /// Undeclared keys pass through untouched.
    pub fn normalize(&self, key: &ParameterKey, value: &ParamValue) -> Result<ParamValue> {
        let spec = match self.specs.get(key) {
            Some(spec) => spec,
            None => return Ok(value.clone()),
        };
        match spec.kind {
            ParamKind::Slider { min, max, step } => {
                let v = value.as_f64().ok_or_else(|| invalid(key, "expected a number"))?;
                Ok(snap(v, min, max, step, is_integer(value)))
            }
            ParamKind::Text { required, .. } => {
                let s = value.as_str().ok_or_else(|| invalid(key, "expected text"))?;
                if required && s.trim().is_empty() {
                    return Err(invalid(key, "must not be empty"));
                }
                Ok(value.clone())
            }
        }
    }

    /// Non-mutating range check. Returns a description of the problem when
    /// `value` would be changed or rejected by [`Schema::normalize`].
    pub fn check(&self, key: &ParameterKey, value: &ParamValue) -> Option<String> {
        match self.normalize(key, value) {
            Ok(normalized) if normalized.as_f64() != value.as_f64() => Some(format!(
                "{} is off the declared range or step, would be stored as {}",
                render(value),
                render(&normalized)
            )),
            Ok(_) => None,
            Err(e) => Some(e.to_string()),
        }
    }

    /// Render a value for an operator. Secrets are masked.
    pub fn display(&self, key: &ParameterKey, value: &ParamValue) -> String {
        match self.specs.get(key) {
            Some(spec) if spec.is_secret() => MASK.to_string(),
            _ => render(value),
        }
    }
}


fn invalid(key: &ParameterKey, reason: &str) -> SettingsError {
    SettingsError::InvalidValue {
        key: key.dotted(),
        reason: reason.to_string(),
    }
}


fn is_integer(value: &ParamValue) -> bool {
    value.is_i64() || value.is_u64()
}


/// Clamp into range then snap to the step grid. The grid is expressed as
/// an integer scale (`1 / step`) so `0.29` stays `0.29` rather than
/// `0.29000000000000004`.
fn snap(v: f64, min: f64, max: f64, step: f64, integer_input: bool) -> ParamValue {
    let clamped = v.max(min).min(max);
    if step <= 0.0 {
        return Value::from(clamped);
    }
    let snapped = if step >= 1.0 {
        (clamped / step).round() * step
    } else {
        let scale = (1.0 / step).round();
        (clamped * scale).round() / scale
    };
    if integer_input && snapped.fract() == 0.0 {
        Value::from(snapped as i64)
    } else {
        Value::from(snapped)
    }
}


/// Plain rendering of a scalar without YAML quoting.
pub fn render(value: &ParamValue) -> String {
    match value {
        Value::Null => "~".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}
