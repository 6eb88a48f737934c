use crate::context::PathError;
use crate::damage::EvalError;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EnrichError {
    #[error("unconsumed keys {keyed:?} and arguments {positional:?}")]
    Unconsumed {
        keyed: Vec<String>,
        positional: Vec<String>,
    },
    #[error("no argument at index {index}")]
    MissingArgument { index: usize },
    #[error("missing required argument {key:?}")]
    MissingKey { key: String },
    #[error("unknown enricher {directive}")]
    UnknownDirective { directive: String },
    #[error("localization of {key:?} nests deeper than {limit} levels")]
    LocalizeDepth { key: String, limit: usize },
    #[error(transparent)]
    Path(#[from] PathError),
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error("{source} (context={context}, args={args})")]
    Annotated {
        context: String,
        args: String,
        #[source]
        source: Box<EnrichError>,
    },
}

impl EnrichError {
    /// The failure underneath any [`EnrichError::Annotated`] layers.
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::Annotated { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
