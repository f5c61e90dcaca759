use std::fmt::Debug;

/// Turns the typed expression into a number.
///
/// The real expression parser lives outside this crate; anything implementing this
/// trait can be plugged into the [App](crate::app::App).
pub trait Evaluator: Debug {
    /// Returns `None` if the expression cannot be evaluated.
    fn evaluate(&self, expression: &str) -> Option<f64>;
}

/// Accepts a single decimal literal and nothing else.
#[derive(Copy, Clone, Debug, Default)]
pub struct LiteralEvaluator;

impl Evaluator for LiteralEvaluator {
    fn evaluate(&self, expression: &str) -> Option<f64> {
        let expression = expression.trim();
        let is_literal = !expression.is_empty()
            && expression
                .chars()
                .enumerate()
                .all(|(i, c)| c.is_ascii_digit() || c == '.' || (i == 0 && c == '-'));
        if is_literal {
            expression.parse().ok()
        } else {
            None
        }
    }
}
