//! Genes are linked to GO terms and make up the annotations of the ontology
//!
//! - Each [`Gene`] has a unique numerical identifier, the NCBI Entrez Gene ID.
//! - Each gene holds the GO terms it is directly annotated to.
//! - Each GO term holds all genes that are annotated to it or to one of its
//!   descendants (the "true path rule").

mod gene;
pub use gene::{Gene, GeneId, Genes};
