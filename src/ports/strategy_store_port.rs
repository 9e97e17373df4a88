//! Strategy configuration persistence port trait.

use crate::domain::error::AlgoblocksError;
use crate::domain::strategy::{StoredStrategy, StrategyConfig};

/// Named strategy configurations. Names are unique.
pub trait StrategyStorePort {
    fn create(&self, name: &str, config: &StrategyConfig) -> Result<(), AlgoblocksError>;

    fn list(&self) -> Result<Vec<StoredStrategy>, AlgoblocksError>;

    fn get(&self, name: &str) -> Result<Option<StoredStrategy>, AlgoblocksError>;

    fn rename(&self, name: &str, new_name: &str) -> Result<(), AlgoblocksError>;

    fn delete(&self, name: &str) -> Result<(), AlgoblocksError>;
}
