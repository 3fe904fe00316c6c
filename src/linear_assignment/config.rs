use crate::linear_assignment::cancellation::Cancellation;

#[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
pub enum Algorithm {
    #[default]
    Hungarian,
    ShortestAugmentingPath,
    SparseShortestAugmentingPath,
}

#[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
pub enum Objective {
    #[default]
    Minimize,
    Maximize,
}

/// Options for [`crate::linear_assignment::solve`].
#[derive(Default, Clone, Debug)]
pub struct SolverConfig {
    pub algorithm: Algorithm,
    pub objective: Objective,
    pub cancellation: Option<Cancellation>,
}

impl SolverConfig {
    pub fn new(algorithm: Algorithm) -> Self {
        Self { algorithm, ..Self::default() }
    }

    pub fn with_objective(mut self, objective: Objective) -> Self {
        self.objective = objective;
        self
    }

    pub fn with_cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = Some(cancellation);
        self
    }
}
