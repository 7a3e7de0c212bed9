use std::fmt::{Display, Formatter};
use std::ops::{BitAnd, BitOr};

/// Phase-identifying bitmask restricting which variables and functions are
/// accessible. A variable accessor carries the union of scopes it is legal
/// in; the linter holds the single scope it is currently walking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Scope(pub u16);

impl Scope {
    pub const NONE: Scope = Scope(0);
    pub const INIT: Scope = Scope(1 << 0);
    pub const RECV: Scope = Scope(1 << 1);
    pub const HASH: Scope = Scope(1 << 2);
    pub const HIT: Scope = Scope(1 << 3);
    pub const MISS: Scope = Scope(1 << 4);
    pub const PASS: Scope = Scope(1 << 5);
    pub const FETCH: Scope = Scope(1 << 6);
    pub const ERROR: Scope = Scope(1 << 7);
    pub const DELIVER: Scope = Scope(1 << 8);
    pub const LOG: Scope = Scope(1 << 9);
    pub const ANY: Scope = Scope(0x3ff);

    /// Scopes that see the backend request/response (`bereq`/`beresp`).
    pub const BACKEND: Scope = Scope(Self::MISS.0 | Self::PASS.0 | Self::FETCH.0);

    pub fn contains(self, other: Scope) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Maps a reserved lifecycle subroutine name to its scope.
    pub fn from_subroutine(name: &str) -> Option<Scope> {
        Some(match name {
            "vcl_recv" => Scope::RECV,
            "vcl_hash" => Scope::HASH,
            "vcl_hit" => Scope::HIT,
            "vcl_miss" => Scope::MISS,
            "vcl_pass" => Scope::PASS,
            "vcl_fetch" => Scope::FETCH,
            "vcl_error" => Scope::ERROR,
            "vcl_deliver" => Scope::DELIVER,
            "vcl_log" => Scope::LOG,
            _ => return None,
        })
    }

    /// Maps a lifecycle phase name (as used in boilerplate markers and
    /// `@scope:` annotations) to its scope.
    pub fn from_phase(name: &str) -> Option<Scope> {
        Some(match name.to_ascii_lowercase().as_str() {
            "init" => Scope::INIT,
            "recv" => Scope::RECV,
            "hash" => Scope::HASH,
            "hit" => Scope::HIT,
            "miss" => Scope::MISS,
            "pass" => Scope::PASS,
            "fetch" => Scope::FETCH,
            "error" => Scope::ERROR,
            "deliver" => Scope::DELIVER,
            "log" => Scope::LOG,
            _ => return None,
        })
    }

    /// Comma-separated phase names for a scope union, for error messages.
    pub fn phase_list(self) -> String {
        let mut names = Vec::new();
        for bit in 0..10u16 {
            let scope = Scope(1 << bit);
            if self.contains(scope) {
                names.push(scope.phase_name());
            }
        }
        names.join(", ")
    }

    pub fn phase_name(self) -> &'static str {
        match self {
            Scope::INIT => "init",
            Scope::RECV => "recv",
            Scope::HASH => "hash",
            Scope::HIT => "hit",
            Scope::MISS => "miss",
            Scope::PASS => "pass",
            Scope::FETCH => "fetch",
            Scope::ERROR => "error",
            Scope::DELIVER => "deliver",
            Scope::LOG => "log",
            _ => "mixed",
        }
    }
}

impl BitOr for Scope {
    type Output = Scope;

    fn bitor(self, rhs: Scope) -> Scope {
        Scope(self.0 | rhs.0)
    }
}

impl BitAnd for Scope {
    type Output = Scope;

    fn bitand(self, rhs: Scope) -> Scope {
        Scope(self.0 & rhs.0)
    }
}

impl Display for Scope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.phase_name())
    }
}

/// The nine reserved lifecycle subroutine names.
pub const LIFECYCLE_SUBROUTINES: &[&str] = &[
    "vcl_recv",
    "vcl_hash",
    "vcl_hit",
    "vcl_miss",
    "vcl_pass",
    "vcl_fetch",
    "vcl_error",
    "vcl_deliver",
    "vcl_log",
];

pub fn is_lifecycle_subroutine(name: &str) -> bool {
    LIFECYCLE_SUBROUTINES.contains(&name)
}
