use crate::feature::{Enhancer, Gene};

/// Phenotypic weight of a gene. The evaluator scales gene scores by `exp(weight)`.
pub trait GeneWeightCalculator: Send + Sync {
    fn gene_weight(&self, gene: &Gene) -> f64;
}

/// How much an enhancer matters to the genes it may regulate.
pub trait EnhancerGeneRelevanceCalculator: Send + Sync {
    fn relevance(&self, enhancer: &Enhancer) -> f64;
}

/// Used when there is no phenotype context.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantGeneWeight(pub f64);

impl Default for ConstantGeneWeight {
    fn default() -> Self {
        Self(1.0)
    }
}

impl GeneWeightCalculator for ConstantGeneWeight {
    fn gene_weight(&self, _gene: &Gene) -> f64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantEnhancerRelevance(pub f64);

impl Default for ConstantEnhancerRelevance {
    fn default() -> Self {
        Self(0.1)
    }
}

impl EnhancerGeneRelevanceCalculator for ConstantEnhancerRelevance {
    fn relevance(&self, _enhancer: &Enhancer) -> f64 {
        self.0
    }
}
