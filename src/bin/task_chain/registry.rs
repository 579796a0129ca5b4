use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TaskError {
    #[error("math domain error: {func}({args})")]
    Domain { func: String, args: String },

    #[error("math range error: {func}({args})")]
    Range { func: String, args: String },

    #[error("{func}() takes {expected} argument(s) ({given} given)")]
    Arity {
        func: String,
        expected: usize,
        given: usize,
    },

    #[error("unknown task function '{0}'")]
    UnknownFunction(String),
}

impl TaskError {
    fn domain(func: &str, args: &[f64]) -> Self {
        TaskError::Domain {
            func: func.to_string(),
            args: render_args(args),
        }
    }

    fn range(func: &str, args: &[f64]) -> Self {
        TaskError::Range {
            func: func.to_string(),
            args: render_args(args),
        }
    }
}

pub fn render_args(args: &[f64]) -> String {
    args.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(", ")
}

pub type TaskFn = fn(&[f64]) -> Result<f64, TaskError>;

struct Entry {
    arity: usize,
    func: TaskFn,
}

/// Task functions addressable by dotted name.
pub struct Registry {
    entries: HashMap<&'static str, Entry>,
}

impl Registry {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// `math.copysign`, `math.floor`, `math.sqrt`, `math.pow`, `math.fabs`.
    pub fn with_math() -> Self {
        let mut registry = Self::empty();
        registry.register("math.copysign", 2, |a| Ok(a[0].copysign(a[1])));
        registry.register("math.floor", 1, |a| {
            let floored = a[0].floor();
            if floored.is_finite() {
                Ok(floored)
            } else {
                Err(TaskError::range("math.floor", a))
            }
        });
        registry.register("math.sqrt", 1, |a| {
            if a[0] < 0.0 {
                Err(TaskError::domain("math.sqrt", a))
            } else {
                Ok(a[0].sqrt())
            }
        });
        registry.register("math.pow", 2, |a| {
            let (base, exp) = (a[0], a[1]);
            if (base == 0.0 && exp < 0.0) || (base < 0.0 && exp.fract() != 0.0) {
                return Err(TaskError::domain("math.pow", a));
            }
            let value = base.powf(exp);
            if value.is_infinite() && base.is_finite() && exp.is_finite() {
                return Err(TaskError::range("math.pow", a));
            }
            Ok(value)
        });
        registry.register("math.fabs", 1, |a| Ok(a[0].abs()));
        registry
    }

    pub fn register(&mut self, name: &'static str, arity: usize, func: TaskFn) {
        self.entries.insert(name, Entry { arity, func });
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn call(&self, name: &str, args: &[f64]) -> Result<f64, TaskError> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| TaskError::UnknownFunction(name.to_string()))?;
        if args.len() != entry.arity {
            return Err(TaskError::Arity {
                func: name.to_string(),
                expected: entry.arity,
                given: args.len(),
            });
        }
        (entry.func)(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_math_functions() {
        let math = Registry::with_math();
        assert_eq!(math.call("math.copysign", &[1.0, -1.0]), Ok(-1.0));
        assert_eq!(math.call("math.floor", &[1.0]), Ok(1.0));
        assert_eq!(math.call("math.floor", &[-1.5]), Ok(-2.0));
        assert_eq!(math.call("math.sqrt", &[16.0]), Ok(4.0));
        assert_eq!(math.call("math.pow", &[2.0, 10.0]), Ok(1024.0));
        assert_eq!(math.call("math.fabs", &[-3.5]), Ok(3.5));
    }

    #[test]
    fn test_sqrt_of_negative_is_domain_error() {
        let err = Registry::with_math().call("math.sqrt", &[-1.0]).unwrap_err();
        assert!(matches!(err, TaskError::Domain { .. }));
        assert_eq!(err.to_string(), "math domain error: math.sqrt(-1)");
    }

    #[test]
    fn test_pow_errors() {
        let math = Registry::with_math();
        assert!(matches!(math.call("math.pow", &[0.0, -1.0]), Err(TaskError::Domain { .. })));
        assert!(matches!(math.call("math.pow", &[-8.0, 0.5]), Err(TaskError::Domain { .. })));
        assert!(matches!(math.call("math.pow", &[10.0, 400.0]), Err(TaskError::Range { .. })));
        assert_eq!(math.call("math.pow", &[-2.0, 3.0]), Ok(-8.0));
    }

    #[test]
    fn test_arity_checked() {
        let err = Registry::with_math().call("math.floor", &[1.0, 2.0]).unwrap_err();
        assert_eq!(
            err,
            TaskError::Arity {
                func: "math.floor".into(),
                expected: 1,
                given: 2
            }
        );
    }

    #[test]
    fn test_unknown_function() {
        let math = Registry::with_math();
        assert!(!math.contains("math.tau"));
        assert_eq!(
            math.call("math.tau", &[]),
            Err(TaskError::UnknownFunction("math.tau".into()))
        );
    }

    #[test]
    fn test_custom_registration() {
        let mut registry = Registry::empty();
        registry.register("ops.double", 1, |a| Ok(a[0] * 2.0));
        assert_eq!(registry.call("ops.double", &[21.0]), Ok(42.0));
    }

    proptest! {
        #[test]
        fn prop_fabs_non_negative(x in -1e9f64..1e9) {
            let out = Registry::with_math().call("math.fabs", &[x]).unwrap();
            prop_assert!(out >= 0.0);
        }

        #[test]
        fn prop_floor_not_above_input(x in -1e9f64..1e9) {
            let out = Registry::with_math().call("math.floor", &[x]).unwrap();
            prop_assert!(out <= x);
            prop_assert!(x - out < 1.0);
        }
    }
}
