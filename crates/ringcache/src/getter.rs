//! Local data source for a cache group

use crate::error::Result;

/// Loads a value from the authoritative source on a cache miss
pub trait Getter: Send + Sync {
    /// Fetch the value for `key`
    fn get(&self, key: &str) -> Result<Vec<u8>>;
}

impl<F> Getter for F
where
    F: Fn(&str) -> Result<Vec<u8>> + Send + Sync,
{
    fn get(&self, key: &str) -> Result<Vec<u8>> {
        self(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn load(getter: &dyn Getter, key: &str) -> Result<Vec<u8>> {
        getter.get(key)
    }

    #[test]
    fn test_closure_getter() {
        let getter = |key: &str| -> Result<Vec<u8>> {
            if key == "Tom" {
                Ok(b"630".to_vec())
            } else {
                Err(Error::NotFound(key.to_string()))
            }
        };

        assert_eq!(load(&getter, "Tom").unwrap(), b"630");
        assert_eq!(
            load(&getter, "Ann").unwrap_err(),
            Error::NotFound("Ann".to_string())
        );
    }
}
