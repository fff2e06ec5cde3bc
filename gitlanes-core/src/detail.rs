use crate::error::{Result, SourceError};
use chrono::{FixedOffset, TimeZone};
use git2::{Oid, Repository, Signature, Time};
use serde::{Deserialize, Serialize};

/// Author or committer of a commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub email: String,
    pub timestamp: i64,
    /// UTC offset as `+HHMM` / `-HHMM`
    pub timezone: String,
}

impl Person {
    fn from_signature(sig: &Signature) -> Self {
        let when = sig.when();
        Self {
            name: sig.name().unwrap_or("Unknown").to_string(),
            email: sig.email().unwrap_or("").to_string(),
            timestamp: when.seconds(),
            timezone: format_offset(&when),
        }
    }

    /// Local time in the signer's own zone, if representable
    pub fn local_time(&self) -> Option<String> {
        let minutes = parse_offset(&self.timezone)?;
        let offset = FixedOffset::east_opt(minutes * 60)?;
        offset
            .timestamp_opt(self.timestamp, 0)
            .single()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S %z").to_string())
    }
}

fn format_offset(time: &Time) -> String {
    let minutes = time.offset_minutes();
    let sign = if minutes < 0 { '-' } else { '+' };
    let minutes = minutes.abs();
    format!("{}{:02}{:02}", sign, minutes / 60, minutes % 60)
}

fn parse_offset(tz: &str) -> Option<i32> {
    let (sign, digits) = if let Some(rest) = tz.strip_prefix('+') {
        (1, rest)
    } else {
        (-1, tz.strip_prefix('-')?)
    };
    if digits.len() != 4 || !digits.is_ascii() {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    Some(sign * (hours * 60 + minutes))
}

/// Everything shown for a single clicked commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitDetail {
    pub sha: String,
    pub tree: String,
    pub parents: Vec<String>,
    pub author: Person,
    pub committer: Person,
    /// First line of the message
    pub message: String,
    pub full_message: String,
}

impl CommitDetail {
    /// Look `sha` up in `repo`; short (unambiguous) prefixes are accepted
    pub fn load(repo: &Repository, sha: &str) -> Result<Self> {
        let not_found = || SourceError::NotFound { sha: sha.to_string() };

        let commit = match Oid::from_str(sha) {
            Ok(oid) if sha.len() == 40 => repo.find_commit(oid).map_err(|_| not_found())?,
            _ => repo
                .revparse_single(sha)
                .and_then(|object| object.peel_to_commit())
                .map_err(|_| not_found())?,
        };

        let author = Person::from_signature(&commit.author());
        let committer = Person::from_signature(&commit.committer());

        Ok(Self {
            sha: commit.id().to_string(),
            tree: commit.tree_id().to_string(),
            parents: commit.parent_ids().map(|oid| oid.to_string()).collect(),
            author,
            committer,
            message: commit.summary().unwrap_or("").to_string(),
            full_message: commit.message().unwrap_or("").to_string(),
        })
    }
}
