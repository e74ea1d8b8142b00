pub mod annotations;
pub mod batch;
pub mod breakend;
pub mod contig_header;
pub mod dispatch;
pub mod error;
pub mod evaluator;
pub mod feature;
pub mod impact;
pub mod index;
pub mod intervals;
pub mod prioritizer;
pub mod projection;
pub mod relevance;
pub mod route;
pub mod route_data;
pub mod settings;
pub mod strand;
pub mod variant;

#[cfg(test)]
pub(crate) mod testing;
