mod clusters;
mod collections;
mod pairwise;
mod similarities;
mod traits;

pub use clusters::ClusterRepository;
pub use collections::CollectionRepository;
pub use pairwise::PairwiseRepository;
pub use similarities::SimilarityRepository;
pub use traits::TraitRepository;
