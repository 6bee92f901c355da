// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! Argument normalisation: resolves a call's positional and keyword
//! arguments against a routine's [`Signature`] into one canonical ordered
//! argument list, so that downstream stages never see how the caller
//! chose to invoke the routine.

use crate::enums::arg::Arg;
use crate::enums::error::BatchError;
use crate::structs::signature::Signature;

/// Resolves `positional` and `keyword` arguments into one `Arg` slot per
/// declared parameter, in declaration order.
///
/// Rules:
/// - any parameter may be supplied by position or by name, but not both
///   (`AmbiguousArgument`);
/// - keyword names must match a declared parameter (`UnknownParameter`);
/// - at most `n_params` positional arguments (`ExtraPositional`);
/// - unsupplied parameters become [`Arg::None`] - the kernel applies its
///   own default, the normaliser invents none.
pub fn normalize(
    signature: &Signature,
    positional: &[Arg],
    keyword: &[(&str, Arg)],
) -> Result<Vec<Arg>, BatchError> {
    let n_params = signature.n_params();
    if positional.len() > n_params {
        return Err(BatchError::ExtraPositional {
            routine: signature.name(),
            n_params,
            n_args: positional.len(),
        });
    }

    let mut slots: Vec<Arg> = vec![Arg::None; n_params];
    let mut supplied = vec![false; n_params];

    for (i, arg) in positional.iter().enumerate() {
        slots[i] = arg.clone();
        supplied[i] = true;
    }

    for (name, arg) in keyword {
        let pos = signature
            .position_of(name)
            .ok_or_else(|| BatchError::UnknownParameter {
                routine: signature.name(),
                name: (*name).to_string(),
            })?;
        if supplied[pos] {
            return Err(BatchError::AmbiguousArgument {
                param: signature.params()[pos].name,
            });
        }
        slots[pos] = arg.clone();
        supplied[pos] = true;
    }

    Ok(slots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::tensor::Tensor;

    fn sig() -> Signature {
        Signature::new("solve")
            .batched("a", 2)
            .batched("b", 1)
            .passthrough("lower")
    }

    fn t() -> Arg {
        Tensor::new([1], vec![1.0f64]).into()
    }

    #[test]
    fn test_positional_and_keyword_agree() {
        let by_pos = normalize(&sig(), &[t(), t(), Arg::Bool(true)], &[]).unwrap();
        let by_kw = normalize(
            &sig(),
            &[],
            &[("a", t()), ("b", t()), ("lower", Arg::Bool(true))],
        )
        .unwrap();
        assert_eq!(by_pos, by_kw);
    }

    #[test]
    fn test_mixed_binding() {
        let out = normalize(&sig(), &[t()], &[("lower", Arg::Bool(false))]).unwrap();
        assert!(out[0].tensor().is_some());
        assert!(out[1].is_none());
        assert_eq!(out[2].bool_(), Some(false));
    }

    #[test]
    fn test_ambiguous_argument() {
        let err = normalize(&sig(), &[t()], &[("a", t())]).unwrap_err();
        assert_eq!(err, BatchError::AmbiguousArgument { param: "a" });
    }

    #[test]
    fn test_unknown_parameter() {
        let err = normalize(&sig(), &[], &[("c", t())]).unwrap_err();
        assert!(matches!(err, BatchError::UnknownParameter { .. }));
    }

    #[test]
    fn test_extra_positional() {
        let args = [t(), t(), Arg::Bool(true), Arg::Bool(true)];
        let err = normalize(&sig(), &args, &[]).unwrap_err();
        assert!(matches!(err, BatchError::ExtraPositional { .. }));
    }
}
