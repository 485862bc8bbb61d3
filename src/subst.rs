use crate::errors::RamError;
use crate::ramfile::{ConversionTemplate, DimensionSpec, SlaveSpec};
use serde_json::{Map, Value};
use std::fmt;

/// A slave specification with every placeholder resolved and every dimension
/// evaluated to a concrete pixel count. This is what the execution adapter
/// consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSlave {
    /// Concrete destination path.
    pub path: String,
    /// Target width in pixels.
    pub width: u32,
    /// Target height in pixels.
    pub height: u32,
}

impl fmt::Display for ResolvedSlave {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}x{}", self.path, self.width, self.height)
    }
}

/// Replaces every `{identifier}` placeholder in `template` with the matching
/// parameter rendered as text.
///
/// All placeholders must resolve; a brace pair with no closing `}` or an
/// empty `{}` is passed through verbatim.
///
/// # Errors
/// Fails with [`RamError::UnboundParameter`] naming the first identifier
/// absent from `params`.
pub fn resolve_string(template: &str, params: &Map<String, Value>) -> Result<String, RamError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            // No closing brace: not a placeholder
            out.push_str(&rest[start..]);
            return Ok(out);
        };
        let name = &after[..end];
        if name.is_empty() {
            out.push_str("{}");
        } else {
            let value = params
                .get(name)
                .ok_or_else(|| RamError::UnboundParameter(name.to_string()))?;
            out.push_str(&render(value));
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Renders a parameter value as substitution text: strings verbatim, scalars
/// via their canonical display, composites as compact JSON.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Evaluates a substituted dimension expression.
///
/// The grammar is deliberately tiny: unsigned numeric literals joined by `*`.
/// Nothing is executed; anything else (division, addition, identifiers,
/// parentheses, signs) is rejected. The result must come out as a positive
/// whole number.
///
/// # Errors
/// Fails with [`RamError::ExpressionError`] carrying the offending
/// expression.
pub fn eval_dimension(expr: &str) -> Result<u32, RamError> {
    let reject = || RamError::ExpressionError(expr.to_string());

    if expr.trim().is_empty() {
        return Err(reject());
    }

    let mut product = 1.0_f64;
    for factor in expr.split('*') {
        let literal = factor.trim();
        if literal.is_empty()
            || !literal.chars().all(|c| c.is_ascii_digit() || c == '.')
        {
            return Err(reject());
        }
        let value: f64 = literal.parse().map_err(|_| reject())?;
        product *= value;
    }

    if product < 1.0 || product.fract() != 0.0 || product > f64::from(u32::MAX) {
        return Err(reject());
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let pixels = product as u32;
    Ok(pixels)
}

/// Resolves one declared slave against a parameter bag, producing an
/// independently owned [`ResolvedSlave`]. The input spec is never mutated.
///
/// # Errors
/// Propagates [`RamError::UnboundParameter`] and [`RamError::ExpressionError`].
pub fn resolve_slave(
    spec: &SlaveSpec,
    params: &Map<String, Value>,
) -> Result<ResolvedSlave, RamError> {
    Ok(ResolvedSlave {
        path: resolve_string(&spec.path, params)?,
        width: resolve_dimension(&spec.width, params)?,
        height: resolve_dimension(&spec.height, params)?,
    })
}

fn resolve_dimension(
    spec: &DimensionSpec,
    params: &Map<String, Value>,
) -> Result<u32, RamError> {
    match spec {
        DimensionSpec::Literal(n) => Ok(*n),
        DimensionSpec::Expr(expr) => eval_dimension(&resolve_string(expr, params)?),
    }
}

/// Instantiates a template with a parameter bag: one resolved slave per
/// declared slave, in declaration order.
///
/// # Errors
/// Fails on the first slave whose path or dimensions cannot be resolved.
pub fn instantiate(
    template: &ConversionTemplate,
    params: &Map<String, Value>,
) -> Result<Vec<ResolvedSlave>, RamError> {
    template
        .slaves
        .iter()
        .map(|spec| resolve_slave(spec, params))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_resolve_string_substitutes_every_occurrence() {
        let bag = params(json!({ "h": 10 }));
        assert_eq!(resolve_string("{h} * 2", &bag).unwrap(), "10 * 2");
        assert_eq!(resolve_string("{h} * 2 * {h}", &bag).unwrap(), "10 * 2 * 10");
    }

    #[test]
    fn test_resolve_string_renders_strings_verbatim() {
        let bag = params(json!({ "n": "icon.png", "flag": true }));
        assert_eq!(resolve_string("out/{n}", &bag).unwrap(), "out/icon.png");
        assert_eq!(resolve_string("{flag}", &bag).unwrap(), "true");
    }

    #[test]
    fn test_resolve_string_unbound_parameter() {
        let bag = params(json!({ "h": 10 }));
        match resolve_string("{h} x {missing}", &bag) {
            Err(RamError::UnboundParameter(name)) => assert_eq!(name, "missing"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_resolve_string_leaves_bare_braces_alone() {
        let bag = params(json!({}));
        assert_eq!(resolve_string("no tokens", &bag).unwrap(), "no tokens");
        assert_eq!(resolve_string("open { only", &bag).unwrap(), "open { only");
        assert_eq!(resolve_string("empty {}", &bag).unwrap(), "empty {}");
    }

    #[test]
    fn test_eval_dimension_literals_and_products() {
        assert_eq!(eval_dimension("100").unwrap(), 100);
        assert_eq!(eval_dimension("50 * 2").unwrap(), 100);
        assert_eq!(eval_dimension("2 * 5 * 10").unwrap(), 100);
        assert_eq!(eval_dimension("1.5 * 100").unwrap(), 150);
    }

    #[test]
    fn test_eval_dimension_rejects_everything_else() {
        for expr in [
            "50 + 2", "50 / 2", "50 - 2", "w * 2", "50 * ", "", "  ",
            "(50) * 2", "-50", "1.5", "1e3", "50 * two",
        ] {
            assert!(
                matches!(eval_dimension(expr), Err(RamError::ExpressionError(_))),
                "{expr:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_instantiate_end_to_end() {
        let template = ConversionTemplate {
            name: "t".to_string(),
            slaves: vec![SlaveSpec {
                path: "out/{n}".to_string(),
                width: DimensionSpec::Expr("{w}".to_string()),
                height: DimensionSpec::Expr("{w} * 2".to_string()),
            }],
        };
        let bag = params(json!({ "n": "x.png", "w": 50 }));

        let slaves = instantiate(&template, &bag).unwrap();
        assert_eq!(
            slaves,
            vec![ResolvedSlave {
                path: "out/x.png".to_string(),
                width: 50,
                height: 100,
            }]
        );
    }

    #[test]
    fn test_instantiation_does_not_share_state() {
        let template = ConversionTemplate {
            name: "t".to_string(),
            slaves: vec![SlaveSpec {
                path: "{n}.png".to_string(),
                width: DimensionSpec::Literal(10),
                height: DimensionSpec::Literal(10),
            }],
        };

        let first = instantiate(&template, &params(json!({ "n": "a" }))).unwrap();
        let second = instantiate(&template, &params(json!({ "n": "b" }))).unwrap();

        assert_eq!(first[0].path, "a.png");
        assert_eq!(second[0].path, "b.png");
        // The stored spec still carries its placeholder
        assert_eq!(template.slaves[0].path, "{n}.png");
    }

    #[test]
    fn test_resolved_slave_display() {
        let slave = ResolvedSlave {
            path: "out/x.png".to_string(),
            width: 50,
            height: 100,
        };
        assert_eq!(slave.to_string(), "out/x.png 50x100");
    }
}
