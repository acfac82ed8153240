//! Drivers: typed expressions that compute a constraint field from custom
//! properties.

use std::fmt;
use std::str::FromStr;

use mmdbind_spec::DataPath;
use serde::{Deserialize, Serialize};

use crate::error::DriverError;

/// Single-property driver variable reading a custom property of an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverVariable {
    /// Variable name referenced by the expression.
    pub name: String,
    /// Object the data path is relative to.
    pub target: String,
    /// Property read by the variable.
    pub data_path: DataPath,
}

impl DriverVariable {
    pub fn new(name: impl Into<String>, target: impl Into<String>, data_path: DataPath) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            data_path,
        }
    }
}

/// Driver expression.
///
/// Rendered the way the host stores scripted expressions:
///
/// ```
/// use mmdbind_rig::driver::DriverExpression;
///
/// let inverted: DriverExpression = "1-bind".parse().unwrap();
/// assert_eq!(inverted, DriverExpression::Inverted("bind".into()));
/// assert_eq!(inverted.to_string(), "1-bind");
/// assert_eq!(inverted.evaluate(0.25), 0.75);
///
/// let gated: DriverExpression = "(1-bind)*ik_fk".parse().unwrap();
/// assert_eq!(gated.variables(), vec!["bind", "ik_fk"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DriverExpression {
    /// `+var`
    Identity(String),
    /// `1-var`
    Inverted(String),
    /// `(1-a)*b`: product of single-variable terms.
    Product(Vec<DriverExpression>),
}

impl DriverExpression {
    /// Builds the identity or inverted expression over `variable`.
    pub fn over(variable: impl Into<String>, invert: bool) -> Self {
        if invert {
            DriverExpression::Inverted(variable.into())
        } else {
            DriverExpression::Identity(variable.into())
        }
    }

    /// `(1-gate)*term`: `term` scaled down to zero as `gate` goes to one.
    pub fn gated(gate: impl Into<String>, term: DriverExpression) -> Self {
        let mut terms = vec![DriverExpression::Inverted(gate.into())];
        match term {
            DriverExpression::Product(rest) => terms.extend(rest),
            single => terms.push(single),
        }
        DriverExpression::Product(terms)
    }

    /// Names of the variables the expression reads, in order.
    pub fn variables(&self) -> Vec<&str> {
        match self {
            DriverExpression::Identity(v) | DriverExpression::Inverted(v) => vec![v.as_str()],
            DriverExpression::Product(terms) => terms.iter().flat_map(|t| t.variables()).collect(),
        }
    }

    pub fn is_inverted(&self) -> bool {
        matches!(self, DriverExpression::Inverted(_))
    }

    /// Evaluates the expression with every variable set to `value`.
    pub fn evaluate(&self, value: f64) -> f64 {
        self.evaluate_with(|_| Some(value)).unwrap_or(value)
    }

    /// Evaluates the expression, reading each variable through `read`.
    /// `None` when any variable cannot be read.
    pub fn evaluate_with(&self, read: impl Fn(&str) -> Option<f64> + Copy) -> Option<f64> {
        match self {
            DriverExpression::Identity(v) => read(v),
            DriverExpression::Inverted(v) => read(v).map(|value| 1.0 - value),
            DriverExpression::Product(terms) => terms
                .iter()
                .try_fold(1.0, |acc, term| term.evaluate_with(read).map(|value| acc * value)),
        }
    }
}

impl fmt::Display for DriverExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverExpression::Identity(v) => write!(f, "+{}", v),
            DriverExpression::Inverted(v) => write!(f, "1-{}", v),
            DriverExpression::Product(terms) => {
                for (index, term) in terms.iter().enumerate() {
                    if index > 0 {
                        write!(f, "*")?;
                    }
                    match term {
                        DriverExpression::Identity(v) => write!(f, "{}", v)?,
                        other => write!(f, "({})", other)?,
                    }
                }
                Ok(())
            }
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

fn parse_term(term: &str) -> Option<DriverExpression> {
    let (invert, name) = if let Some(name) = term.strip_prefix("1-") {
        (true, name)
    } else if let Some(name) = term.strip_prefix('+') {
        (false, name)
    } else {
        (false, term)
    };
    is_identifier(name).then(|| DriverExpression::over(name, invert))
}

impl FromStr for DriverExpression {
    type Err = DriverError;

    /// Accepts `+var`, `var`, `1-var` and products of those joined by `*`,
    /// with parentheses around each factor optional (whitespace ignored).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unsupported = || DriverError::UnsupportedExpression(s.to_string());
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        if !compact.contains('*') {
            return parse_term(&compact).ok_or_else(unsupported);
        }

        let terms = compact
            .split('*')
            .map(|factor| {
                let inner = factor
                    .strip_prefix('(')
                    .and_then(|f| f.strip_suffix(')'))
                    .unwrap_or(factor);
                parse_term(inner)
            })
            .collect::<Option<Vec<_>>>()
            .ok_or_else(unsupported)?;
        Ok(DriverExpression::Product(terms))
    }
}

impl TryFrom<String> for DriverExpression {
    type Error = DriverError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DriverExpression> for String {
    fn from(value: DriverExpression) -> Self {
        value.to_string()
    }
}

/// Scripted driver on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    pub variables: Vec<DriverVariable>,
    pub expression: DriverExpression,
}

impl Driver {
    /// Creates a driver, checking that the expression reads only declared
    /// variables and that variable names are unique.
    pub fn new(
        variables: Vec<DriverVariable>,
        expression: DriverExpression,
    ) -> Result<Self, DriverError> {
        for (index, variable) in variables.iter().enumerate() {
            if variables[..index].iter().any(|v| v.name == variable.name) {
                return Err(DriverError::DuplicateVariable(variable.name.clone()));
            }
        }
        for name in expression.variables() {
            if !variables.iter().any(|v| v.name == name) {
                return Err(DriverError::UnknownVariable(name.to_string()));
            }
        }
        Ok(Self {
            variables,
            expression,
        })
    }

    /// Declared variable named `name`.
    pub fn variable(&self, name: &str) -> Option<&DriverVariable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// The last variable the expression reads. For gated expressions this
    /// is the term being gated.
    pub fn input(&self) -> Option<&DriverVariable> {
        self.expression
            .variables()
            .last()
            .and_then(|name| self.variable(name))
    }

    /// Evaluates the driver. `read` resolves a variable to its current
    /// value; `None` when an input cannot be read (the driver is invalid
    /// and leaves its field untouched).
    pub fn evaluate(&self, read: impl Fn(&DriverVariable) -> Option<f64>) -> Option<f64> {
        self.expression
            .evaluate_with(|name| self.variable(name).and_then(&read))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bind_variable() -> DriverVariable {
        DriverVariable::new(
            "mmdbind_influence",
            "Armature",
            DataPath::new("torso", "mmdbind_bind"),
        )
    }

    #[test]
    fn test_expression_parse_and_render() {
        let identity: DriverExpression = "+ik_fk".parse().unwrap();
        assert_eq!(identity, DriverExpression::Identity("ik_fk".into()));
        assert_eq!(identity.to_string(), "+ik_fk");

        let bare: DriverExpression = "ik_fk".parse().unwrap();
        assert_eq!(bare, identity);

        let inverted: DriverExpression = "1 - ik_fk".parse().unwrap();
        assert!(inverted.is_inverted());
        assert_eq!(inverted.to_string(), "1-ik_fk");
    }

    #[test]
    fn test_expression_rejects_arbitrary_python() {
        assert!("2*var".parse::<DriverExpression>().is_err());
        assert!("1-".parse::<DriverExpression>().is_err());
        assert!("__import__('os')".parse::<DriverExpression>().is_err());
    }

    #[test]
    fn test_product_expression_parse_and_render() {
        let gated: DriverExpression = "(1 - bind) * (1-ik_fk)".parse().unwrap();
        assert_eq!(
            gated,
            DriverExpression::gated("bind", DriverExpression::Inverted("ik_fk".into()))
        );
        assert_eq!(gated.to_string(), "(1-bind)*(1-ik_fk)");
        assert_eq!(gated.variables(), vec!["bind", "ik_fk"]);

        let direct: DriverExpression = "(1-bind)*ik_fk".parse().unwrap();
        assert_eq!(direct.to_string(), "(1-bind)*ik_fk");
        assert!(!direct.is_inverted());

        assert!("(1-bind)*".parse::<DriverExpression>().is_err());
        assert!("bind*(2)".parse::<DriverExpression>().is_err());
    }

    #[test]
    fn test_driver_requires_declared_variable() {
        let err = Driver::new(
            vec![bind_variable()],
            DriverExpression::over("other", false),
        )
        .unwrap_err();
        assert!(matches!(err, DriverError::UnknownVariable(name) if name == "other"));

        let err = Driver::new(
            vec![bind_variable(), bind_variable()],
            DriverExpression::over("mmdbind_influence", false),
        )
        .unwrap_err();
        assert!(matches!(err, DriverError::DuplicateVariable(_)));
    }

    #[test]
    fn test_driver_evaluate() {
        let driver = Driver::new(
            vec![bind_variable()],
            DriverExpression::over("mmdbind_influence", true),
        )
        .unwrap();
        assert_eq!(driver.evaluate(|_| Some(1.0)), Some(0.0));
        assert_eq!(driver.evaluate(|_| Some(0.0)), Some(1.0));
        assert_eq!(driver.evaluate(|_| None), None);
    }

    #[test]
    fn test_gated_driver_reads_every_variable() {
        let gate = DriverVariable::new("gate", "Armature", DataPath::new("torso", "mmdbind_bind"));
        let switch = DriverVariable::new("switch", "Armature", DataPath::new("hand", "IK_FK"));
        let expression =
            DriverExpression::gated("gate", DriverExpression::over("switch", false));

        let err = Driver::new(vec![switch.clone()], expression.clone()).unwrap_err();
        assert!(matches!(err, DriverError::UnknownVariable(name) if name == "gate"));

        let driver = Driver::new(vec![gate, switch], expression).unwrap();
        assert_eq!(driver.input().map(|v| v.name.as_str()), Some("switch"));
        let read = |v: &DriverVariable| match v.name.as_str() {
            "gate" => Some(0.75),
            _ => Some(0.5),
        };
        assert_eq!(driver.evaluate(read), Some(0.125));
        assert_eq!(driver.evaluate(|v| (v.name == "switch").then_some(1.0)), None);
    }

    #[test]
    fn test_driver_serde_uses_expression_string() {
        let driver = Driver::new(
            vec![bind_variable()],
            DriverExpression::over("mmdbind_influence", true),
        )
        .unwrap();
        let json = serde_json::to_value(&driver).unwrap();
        assert_eq!(json["expression"], "1-mmdbind_influence");
        let parsed: Driver = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, driver);
    }
}
