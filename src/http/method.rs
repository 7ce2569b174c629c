//! HTTP method codes.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ============================================================================
// Method
// ============================================================================

/// HTTP methods the bridge can issue.
///
/// The discriminants are the codes passed across the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// `POST`
    Post = 0,
    /// `PUT`
    Put = 1,
    /// `GET`
    #[default]
    Get = 2,
    /// `DELETE`
    Delete = 3,
}

impl Method {
    /// Returns the boundary code.
    #[inline]
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Returns the method name.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Get => "GET",
            Self::Delete => "DELETE",
        }
    }
}

impl TryFrom<i32> for Method {
    type Error = Error;

    fn try_from(code: i32) -> Result<Self> {
        match code {
            0 => Ok(Self::Post),
            1 => Ok(Self::Put),
            2 => Ok(Self::Get),
            3 => Ok(Self::Delete),
            _ => Err(Error::unknown_method(code)),
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Get => Self::GET,
            Method::Delete => Self::DELETE,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        for method in [Method::Post, Method::Put, Method::Get, Method::Delete] {
            assert_eq!(Method::try_from(method.code()).expect("known code"), method);
        }
    }

    #[test]
    fn test_unknown_code() {
        assert!(matches!(
            Method::try_from(4),
            Err(Error::UnknownMethod { code: 4 })
        ));
        assert!(Method::try_from(-1).is_err());
    }

    #[test]
    fn test_reqwest_conversion() {
        assert_eq!(reqwest::Method::from(Method::Delete), reqwest::Method::DELETE);
    }
}
