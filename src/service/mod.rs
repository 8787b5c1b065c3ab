pub mod grant_batch;

pub use grant_batch::GrantBatchService;
