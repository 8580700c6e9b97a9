use crate::Diagnostic;
use crate::Diagnostics;

/// Turn a merged partial config into the final, fully-typed config.
///
/// Implementations should report every problem they find rather than stopping
/// at the first one.
pub trait TryFromPartial: Sized {
    type Partial;

    fn try_from_partial(partial: Self::Partial) -> Result<Self, Vec<Diagnostic>>;
}

/// Cross-field checks that only make sense on the final config.
pub trait Validate {
    fn validate(&self) -> Vec<Diagnostic> {
        Vec::new()
    }
}

/// Convert, validate, and sort the outcome into success or failure.
///
/// `diagnostics` carries whatever the load/merge step already found. On
/// conversion failure a default config stands in so that cross-field
/// validation still runs and all errors surface in one pass.
pub fn finish<C>(partial: C::Partial, mut diagnostics: Vec<Diagnostic>) -> Result<(C, Diagnostics), Diagnostics>
where
    C: TryFromPartial + Validate + Default,
{
    let config = match C::try_from_partial(partial) {
        Ok(config) => config,
        Err(errors) => {
            diagnostics.extend(errors);
            C::default()
        }
    };

    diagnostics.extend(config.validate());

    let diagnostics = Diagnostics(diagnostics);
    if diagnostics.has_errors() {
        Err(diagnostics)
    } else {
        Ok((config, diagnostics))
    }
}
