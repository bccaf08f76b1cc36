//! Input side: turns book analysis documents into character graphs.

mod load;
mod parse;

pub use load::load_graph;
pub use parse::BookAnalysis;
