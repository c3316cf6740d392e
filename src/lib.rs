pub use mediaboost_content::*;
pub use mediaboost_core::*;
pub use mediaboost_dom as dom;
pub use mediaboost_graph::*;
