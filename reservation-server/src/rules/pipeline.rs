//! Ordered rule chains
//!
//! A [`Pipeline`] is a list of named checks over a request-scoped context.
//! [`Pipeline::run`] executes them in insertion order and stops at the first
//! failure; nothing after a failing step runs.

use crate::utils::AppResult;

/// A single rule over the context `C`
pub type Step<C> = fn(&C) -> AppResult<()>;

/// Ordered, short-circuiting chain of named steps
pub struct Pipeline<C> {
    name: &'static str,
    steps: Vec<(&'static str, Step<C>)>,
}

impl<C> Pipeline<C> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            steps: Vec::new(),
        }
    }

    /// Append a step (builder style)
    pub fn step(mut self, label: &'static str, check: Step<C>) -> Self {
        self.steps.push((label, check));
        self
    }

    /// Append every step of another pipeline
    pub fn then(mut self, other: Pipeline<C>) -> Self {
        self.steps.extend(other.steps);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Step labels in execution order
    pub fn labels(&self) -> Vec<&'static str> {
        self.steps.iter().map(|(label, _)| *label).collect()
    }

    /// Run every step in order, returning the first failure
    pub fn run(&self, ctx: &C) -> AppResult<()> {
        for (label, check) in &self.steps {
            if let Err(err) = check(ctx) {
                tracing::debug!(
                    pipeline = self.name,
                    step = label,
                    code = %err.code,
                    error = %err,
                    "Rule rejected request"
                );
                return Err(err);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::AppError;
    use std::cell::RefCell;

    struct Ctx {
        value: i32,
        seen: RefCell<Vec<&'static str>>,
    }

    fn positive(ctx: &Ctx) -> AppResult<()> {
        ctx.seen.borrow_mut().push("positive");
        if ctx.value > 0 {
            Ok(())
        } else {
            Err(AppError::validation("must be positive"))
        }
    }

    fn small(ctx: &Ctx) -> AppResult<()> {
        ctx.seen.borrow_mut().push("small");
        if ctx.value < 10 {
            Ok(())
        } else {
            Err(AppError::validation("must be small"))
        }
    }

    fn pipeline() -> Pipeline<Ctx> {
        Pipeline::new("numbers")
            .step("positive", positive)
            .step("small", small)
    }

    fn ctx(value: i32) -> Ctx {
        Ctx {
            value,
            seen: RefCell::new(Vec::new()),
        }
    }

    #[test]
    fn test_all_steps_pass() {
        let c = ctx(5);
        assert!(pipeline().run(&c).is_ok());
        assert_eq!(*c.seen.borrow(), ["positive", "small"]);
    }

    #[test]
    fn test_first_failure_short_circuits() {
        let c = ctx(-1);
        let err = pipeline().run(&c).unwrap_err();
        assert_eq!(err.message, "must be positive");
        assert_eq!(*c.seen.borrow(), ["positive"]);
    }

    #[test]
    fn test_later_failure_is_reported() {
        let c = ctx(50);
        let err = pipeline().run(&c).unwrap_err();
        assert_eq!(err.message, "must be small");
    }

    #[test]
    fn test_then_appends_in_order() {
        let combined = Pipeline::new("combined")
            .step("small", small)
            .then(pipeline());
        assert_eq!(combined.name(), "combined");
        assert_eq!(combined.labels(), ["small", "positive", "small"]);
    }

    #[test]
    fn test_empty_pipeline_passes() {
        assert!(Pipeline::<Ctx>::new("empty").run(&ctx(0)).is_ok());
    }
}
