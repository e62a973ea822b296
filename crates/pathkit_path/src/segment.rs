//! Dynamic segment access.
//!
//! A bare name is read as a path segment unless it names a declared member
//! of [`PathChain`]. Declared names always win: a directory literally called
//! `join` cannot be reached through [`PathChain::get`] or [`segments!`] and
//! needs an explicit `join("join")`.
//!
//! [`segments!`]: crate::segments

use crate::builder::PathChain;
use crate::spec::{ErrorPath, PathResult};

/// Member names of [`PathChain`] that are never reinterpreted as segments.
pub const L_DECLARED_MEMBER_NAMES: &[&str] = &[
    "join",
    "cwd",
    "get",
    "mkdir",
    "touch",
    "chmod",
    "copy",
    "try_copy",
    "ls",
    "ls_async",
    "ls_glob",
    "is_file",
    "is_directory",
    "is_symlink",
    "execute",
    "execute_blocking",
    "execute_non_blocking",
    "to_string",
    "path",
    "mode",
    "with_mode",
    "has_queue",
    "pending_len",
    "pending",
    "take_pending",
];

/// How a dynamically accessed name is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumMemberAccess<'a> {
    /// Name of a declared member.
    Declared(&'static str),
    /// Plain path segment.
    Segment(&'a str),
}

/// Declared-name table lookup for dynamic access.
pub struct SegmentResolver;

impl SegmentResolver {
    /// Classify `name`; a raw-identifier prefix (`r#`) is stripped first.
    pub fn classify(name: &str) -> EnumMemberAccess<'_> {
        let name = name.strip_prefix("r#").unwrap_or(name);
        match L_DECLARED_MEMBER_NAMES.iter().find(|c| **c == name) {
            Some(c_declared) => EnumMemberAccess::Declared(c_declared),
            None => EnumMemberAccess::Segment(name),
        }
    }

    pub fn is_declared(name: &str) -> bool {
        matches!(Self::classify(name), EnumMemberAccess::Declared(_))
    }

    /// Join `name` onto `chain` unless it is a declared member name.
    pub fn resolve(chain: PathChain, name: &str) -> PathResult<PathChain> {
        match Self::classify(name) {
            EnumMemberAccess::Declared(c_declared) => {
                Err(ErrorPath::DeclaredMemberName(c_declared.to_string()))
            }
            EnumMemberAccess::Segment(segment) => Ok(chain.join(segment)),
        }
    }

    /// Resolve several names left to right; stops at the first declared name.
    pub fn resolve_chain<'a, I>(chain: PathChain, names: I) -> PathResult<PathChain>
    where
        I: IntoIterator<Item = &'a str>,
    {
        names
            .into_iter()
            .try_fold(chain, |chain, name| Self::resolve(chain, name))
    }
}

/// Build a path from bare identifiers: `segments!(root(); is.where.the.tree)`.
///
/// Expands to a [`PathResult`]; keywords are accepted as segments, declared
/// member names are rejected.
#[macro_export]
macro_rules! segments {
    ($root:expr; $($segment:ident).+) => {
        $crate::SegmentResolver::resolve_chain($root, [$(stringify!($segment)),+])
    };
}
