pub mod category;
pub mod movie;

pub use category::{all_categories, Category};
pub use movie::{DownloadLink, Episode, MovieDetails, MovieSummary, Trailer};
