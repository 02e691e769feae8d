//! HTTP method as a typed enum.
//!
//! Covers the RFC 9110 standard methods. Which of them a host actually routes
//! is up to the host: see [`Host::methods`](crate::Host::methods).
//!
//! Methods reach the loader from two directions. Hosts and the wire speak
//! the strict uppercase form, parsed with [`FromStr`]. Controllers and `__mid`
//! descriptors are written by hand and spell verbs however they like, so
//! they go through [`Method::parse_loose`]. An unknown verb is an error
//! either way; it never silently widens a middleware to every method.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

// ── Method ────────────────────────────────────────────────────────────────────

/// A known HTTP method.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Method {
    Connect,
    Delete,
    Get,
    Head,
    Options,
    Patch,
    Post,
    Put,
    Trace,
}

impl Method {
    /// The verbs a typical router serves. `CONNECT` is left out.
    pub const ROUTABLE: [Method; 8] = [
        Self::Get,
        Self::Post,
        Self::Put,
        Self::Delete,
        Self::Patch,
        Self::Options,
        Self::Head,
        Self::Trace,
    ];

    /// Returns the uppercase wire representation (e.g. `"GET"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "CONNECT",
            Self::Delete  => "DELETE",
            Self::Get     => "GET",
            Self::Head    => "HEAD",
            Self::Options => "OPTIONS",
            Self::Patch   => "PATCH",
            Self::Post    => "POST",
            Self::Put     => "PUT",
            Self::Trace   => "TRACE",
        }
    }

    /// Parses a method name regardless of case (`"post"`, `"Post"`, `"POST"`).
    ///
    /// Controllers and middleware descriptors spell verbs loosely; the wire
    /// form stays strict through [`FromStr`].
    pub fn parse_loose(s: &str) -> Result<Self, Error> {
        s.to_ascii_uppercase().parse()
    }
}

// ── Parsing and display ───────────────────────────────────────────────────────

/// Parses an uppercase method string (e.g. `"GET"`). Case-sensitive per RFC 9110 §9.1.
impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CONNECT" => Ok(Self::Connect),
            "DELETE"  => Ok(Self::Delete),
            "GET"     => Ok(Self::Get),
            "HEAD"    => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            "PATCH"   => Ok(Self::Patch),
            "POST"    => Ok(Self::Post),
            "PUT"     => Ok(Self::Put),
            "TRACE"   => Ok(Self::Trace),
            _         => Err(Error::UnknownMethod(s.to_owned())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
