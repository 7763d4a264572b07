pub mod batch_repo;
pub mod sale_repo;

pub use batch_repo::BatchRepo;
pub use sale_repo::SaleRepo;
