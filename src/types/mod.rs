pub mod product;
pub mod research;

pub use product::{
    Price, Product, ProductCandidate, ProductError, QueryKind, Rating, ResearchPlan,
    ResearchResponse, RetailerPrice,
};
pub use research::{PriceComparison, Recommendation};
