mod cache;
mod resolver;
mod response;

pub use cache::ResolutionCache;
pub use resolver::Resolver;
pub use response::partial_loss;
