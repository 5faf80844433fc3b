use core::fmt::Debug;
use std::fmt::Display;

use crate::{GoError, GoResult};

/// The unique identifier of a GO term, e.g. `GO:0008150`
///
/// Internally the numerical part is stored as `u32`.
#[derive(Copy, Clone, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct GoTermId {
    inner: u32,
}

impl GoTermId {
    /// Returns the integer representation of the term ID
    pub fn as_u32(&self) -> u32 {
        self.inner
    }
}

impl TryFrom<&str> for GoTermId {
    type Error = GoError;

    /// Parses a `GO:0008150`-formatted string
    ///
    /// # Errors
    ///
    /// - [`GoError::InvalidInput`] if the `GO:` prefix is missing
    /// - [`GoError::ParseIntError`] if the numerical part is invalid
    ///
    /// # Examples
    ///
    /// ```
    /// use goenrich::GoTermId;
    ///
    /// let id = GoTermId::try_from("GO:0006915").unwrap();
    /// assert_eq!(id.as_u32(), 6915);
    /// assert!(GoTermId::try_from("HP:0006915").is_err());
    /// ```
    fn try_from(s: &str) -> GoResult<Self> {
        let Some(number) = s.trim().strip_prefix("GO:") else {
            return Err(GoError::InvalidInput(format!("invalid GO term ID `{s}`")));
        };
        Ok(GoTermId {
            inner: number.parse::<u32>()?,
        })
    }
}

impl From<u32> for GoTermId {
    fn from(inner: u32) -> Self {
        Self { inner }
    }
}

impl Debug for GoTermId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GoTermId({self})")
    }
}

impl Display for GoTermId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GO:{:07}", self.inner)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display_pads_zeros() {
        assert_eq!(GoTermId::from(8150u32).to_string(), "GO:0008150");
        assert_eq!(GoTermId::from(1_234_567u32).to_string(), "GO:1234567");
    }

    #[test]
    fn parse_round_trip() {
        let id = GoTermId::try_from(" GO:0005634").unwrap();
        assert_eq!(id, GoTermId::from(5634u32));
        assert_eq!(GoTermId::try_from(id.to_string().as_str()).unwrap(), id);
    }

    #[test]
    fn invalid_ids() {
        assert!(GoTermId::try_from("GO:00A5634").is_err());
        assert!(GoTermId::try_from("0005634").is_err());
        assert!(GoTermId::try_from("").is_err());
    }
}
