//! Error taxonomy for the GA engine.
//!
//! Contract violations (arity, length, size bounds) are reported
//! synchronously by the operator that detected them. Failures raised by the
//! problem-supplied fitness function are carried unmodified in
//! [`GaError::Evaluation`].

/// Convenience alias used throughout the crate.
pub type Result<T, E = GaError> = std::result::Result<T, E>;

/// Errors produced by the GA engine and its operators.
#[derive(Debug, thiserror::Error)]
pub enum GaError {
    /// An argument did not satisfy an operator's declared contract.
    #[error("invalid argument `{name}`: {message}")]
    InvalidArgument {
        name: &'static str,
        message: String,
    },

    /// A parent chromosome is shorter than the crossover supports.
    #[error(
        "{crossover}: a chromosome should have at least {min_length} genes, \
         {kind} has only {length} genes"
    )]
    ChromosomeTooShort {
        crossover: &'static str,
        min_length: usize,
        kind: &'static str,
        length: usize,
    },

    /// A crossover could not be applied to the given parents.
    #[error("{crossover}: {message}")]
    Crossover {
        crossover: &'static str,
        message: String,
    },

    /// A mutation could not be applied to the given chromosome.
    #[error("{mutation}: {message}")]
    Mutation {
        mutation: &'static str,
        message: String,
    },

    /// Parents could not be selected from the generation.
    #[error("{selection}: {message}")]
    Selection {
        selection: &'static str,
        message: String,
    },

    /// The reinsertion strategy cannot produce a valid next generation.
    #[error("{reinsertion}: {message}")]
    Reinsertion {
        reinsertion: &'static str,
        message: String,
    },

    /// A population size bound was violated.
    #[error("population: {0}")]
    Population(String),

    /// An operator required evaluated chromosomes.
    #[error("chromosome at index {index} has not been evaluated")]
    NotEvaluated { index: usize },

    /// The problem-supplied fitness function failed.
    #[error("fitness evaluation failed: {0}")]
    Evaluation(#[source] anyhow::Error),

    /// The orchestrator was asked to do something its state does not allow.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// No operator of the requested kind is registered under that name.
    #[error("unknown {kind} `{name}`")]
    UnknownOperator { kind: &'static str, name: String },

    /// The run configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl GaError {
    pub(crate) fn invalid_argument(name: &'static str, message: impl Into<String>) -> Self {
        GaError::InvalidArgument {
            name,
            message: message.into(),
        }
    }
}
